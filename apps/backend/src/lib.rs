pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod entity;
pub mod error;
pub mod game_management;
pub mod jwt;
pub mod statistics;
pub mod test_support;
pub mod user_management;

pub use bootstrap::{connect_and_migrate, connect_and_migrate_once, init_tracing, load_dotenv};
pub use config::AppConfig;

use actix_web::web;

use game_management::{
    add_hand, cancel_game, create_game, delete_game, delete_hand, edit_hand, get_game, get_games,
    get_my_ongoing_games, update_target,
};
use jwt::JwtAuth;
use statistics::{get_duo_rankings, get_heatmap, get_player_statistics, get_statistics};
use user_management::{get_active_users, get_all_users, get_me, toggle_user};

/// Configure all routes for the application
///
/// Handlers expect `web::Data<DatabaseConnection>` and `web::Data<AppConfig>`
/// to be registered on the app.
pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(hello).service(
        web::scope("/api")
            .wrap(JwtAuth::new())
            .service(get_me)
            .service(get_my_ongoing_games)
            .service(get_active_users)
            .service(get_all_users)
            .service(toggle_user)
            .service(create_game)
            .service(get_games)
            .service(get_game)
            .service(delete_game)
            .service(cancel_game)
            .service(update_target)
            .service(add_hand)
            .service(edit_hand)
            .service(delete_hand)
            .service(get_statistics)
            .service(get_duo_rankings)
            .service(get_player_statistics)
            .service(get_heatmap),
    );
}

#[actix_web::get("/")]
async fn hello() -> impl actix_web::Responder {
    "Hello, Coinche!"
}
