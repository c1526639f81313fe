//! Statistics module
//!
//! Read-only reporting over every stored game. Rows are loaded once per
//! request and the figures are computed in [`aggregates`], [`duo_ranking`]
//! and [`heatmap`].

pub mod aggregates;
pub mod duo_ranking;
pub mod heatmap;

use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::{Datelike, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::entity::{games, users};
use crate::error::AppError;
use crate::jwt::require_user;
use crate::statistics::aggregates::Dataset;
use crate::statistics::duo_ranking::DuoRankingParams;

#[derive(Debug, Deserialize)]
pub struct DuoQuery {
    pub min_games: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[get("/statistics")]
pub async fn get_statistics(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_user(&req)?;
    let data = Dataset::load(&db).await?;

    Ok(HttpResponse::Ok().json(json!({
        "global": aggregates::global_stats(&data),
        "players": aggregates::player_stats(&data),
        "contracts": aggregates::contract_stats(&data),
        "trumps": aggregates::trump_stats(&data),
        "special_events": aggregates::special_event_stats(&data),
        "takers": aggregates::taker_stats(&data),
    })))
}

#[get("/statistics/duos")]
pub async fn get_duo_rankings(
    req: HttpRequest,
    query: web::Query<DuoQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_user(&req)?;

    let defaults = DuoRankingParams::default();
    let params = DuoRankingParams {
        min_games: query.min_games.unwrap_or(defaults.min_games),
        limit: query.limit.unwrap_or(defaults.limit),
        ..defaults
    };

    let data = Dataset::load(&db).await?;
    let rankings = duo_ranking::duo_rankings(&data, &params);
    Ok(HttpResponse::Ok().json(json!({ "duos": rankings, "params": params })))
}

#[get("/statistics/players/{user_id}")]
pub async fn get_player_statistics(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_user(&req)?;
    let user_id = path.into_inner();

    let player = users::Entity::find_by_id(user_id)
        .one(&**db)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    let data = Dataset::load(&db).await?;
    let matchups = aggregates::matchups(&data, user_id);

    Ok(HttpResponse::Ok().json(json!({
        "user_id": player.id,
        "name": player.display_name(),
        "opponents": matchups.opponents,
        "partners": matchups.partners,
    })))
}

#[get("/statistics/heatmap")]
pub async fn get_heatmap(
    req: HttpRequest,
    query: web::Query<HeatmapQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_user(&req)?;

    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let all_games = games::Entity::find().all(&**db).await?;
    let counts = heatmap::games_per_day(&all_games, year, month);
    let map = heatmap::build_heatmap(year, month, &counts).ok_or_else(|| {
        AppError::bad_request("INVALID_MONTH", format!("{year}-{month} is not a valid month"))
    })?;

    Ok(HttpResponse::Ok().json(map))
}
