pub mod game_detail;
pub mod game_request;
pub mod game_summary;
pub mod hand_request;
pub mod user_summary;
