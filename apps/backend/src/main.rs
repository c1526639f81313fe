use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

use coinche_backend::{
    configure_routes, connect_and_migrate_once, init_tracing, load_dotenv, AppConfig,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    info!(
        production = config.is_production,
        "Starting Coinche backend server..."
    );

    let db = connect_and_migrate_once(&config.database_url).await?;

    let bind_addr = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    let db = web::Data::new(db);

    info!(host = %bind_addr.0, port = bind_addr.1, "listening");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
