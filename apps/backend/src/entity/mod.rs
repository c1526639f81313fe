pub mod games;
pub mod game_players;
pub mod hands;
pub mod users;

pub use users::Entity as Users;
