//! Game management module
//!
//! This module contains the Coinche scoring rules, game lifecycle and the
//! HTTP handlers for games and their hands.

pub mod orchestration;
pub mod rules;
pub mod scoring;
pub mod state;

use std::collections::HashMap;

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::dto::game_detail::{GameDetail, GameInfo, HandEntry, PlayerEntry};
use crate::dto::game_request::{CreateGameRequest, TargetPointsRequest};
use crate::dto::game_summary::GameSummary;
use crate::dto::hand_request::HandRequest;
use crate::entity::{game_players, games, hands, users};
use crate::error::AppError;
use crate::game_management::rules::{seat_for_index, validate_roster, validate_target_points};
use crate::jwt::require_user;

/// Display names for a set of users
async fn load_user_names(
    db: &DatabaseConnection,
    user_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>, AppError> {
    let ids: Vec<Uuid> = user_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users
        .into_iter()
        .map(|u| (u.id, u.display_name().to_string()))
        .collect())
}

async fn find_game(db: &DatabaseConnection, game_id: Uuid) -> Result<games::Model, AppError> {
    games::Entity::find_by_id(game_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("GAME_NOT_FOUND", "Game not found"))
}

/// Only the creator of a game or an administrator may cancel or delete it
fn ensure_creator_or_admin(game: &games::Model, user: &users::Model) -> Result<(), AppError> {
    if game.created_by == user.id || user.is_admin {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only the creator of the game or an administrator can do this",
        ))
    }
}

/// Summaries for a list of games, keeping the order of `games_list`
async fn build_summaries(
    db: &DatabaseConnection,
    games_list: Vec<games::Model>,
    user_id: Uuid,
) -> Result<Vec<GameSummary>, AppError> {
    let game_ids: Vec<Uuid> = games_list.iter().map(|g| g.id).collect();
    let all_players = if game_ids.is_empty() {
        Vec::new()
    } else {
        game_players::Entity::find()
            .filter(game_players::Column::GameId.is_in(game_ids))
            .order_by_asc(game_players::Column::Position)
            .all(db)
            .await?
    };
    let names = load_user_names(db, all_players.iter().map(|p| p.user_id)).await?;

    let summaries = games_list
        .into_iter()
        .map(|game| {
            let players: Vec<&game_players::Model> = all_players
                .iter()
                .filter(|p| p.game_id == game.id)
                .collect();
            let team_names = |team: &str| -> Vec<String> {
                players
                    .iter()
                    .filter(|p| p.team == team)
                    .map(|p| names.get(&p.user_id).cloned().unwrap_or_default())
                    .collect()
            };

            GameSummary {
                id: game.id,
                state: game.state.clone(),
                score_a: game.points_team_a,
                score_b: game.points_team_b,
                target_points: game.target_points,
                team_a: team_names("A"),
                team_b: team_names("B"),
                is_player_in_game: players.iter().any(|p| p.user_id == user_id),
                created_at: game.created_at,
                updated_at: game.updated_at,
            }
        })
        .collect();

    Ok(summaries)
}

/// Full view of a game: rosters, hands and the running score
pub async fn build_game_detail(
    db: &DatabaseConnection,
    game: games::Model,
    user_id: Uuid,
) -> Result<GameDetail, AppError> {
    let players = state::load_players(db, game.id).await?;
    let game_hands = state::load_hands(db, game.id).await?;
    let names = load_user_names(
        db,
        players
            .iter()
            .map(|p| p.user_id)
            .chain(game_hands.iter().filter_map(|h| h.taker_user_id)),
    )
    .await?;

    let entry = |p: &game_players::Model| PlayerEntry {
        user_id: p.user_id,
        name: names.get(&p.user_id).cloned().unwrap_or_default(),
        team: p.team.clone(),
        position: p.position,
    };
    let team_a = players.iter().filter(|p| p.team == "A").map(entry).collect();
    let team_b = players.iter().filter(|p| p.team == "B").map(entry).collect();

    let totals = state::cumulative_totals(&game_hands);
    let hands = game_hands
        .into_iter()
        .zip(totals)
        .map(|(hand, (cumulative_a, cumulative_b))| HandEntry {
            taker_name: hand.taker_user_id.and_then(|id| names.get(&id).cloned()),
            id: hand.id,
            number: hand.number,
            taker_user_id: hand.taker_user_id,
            contract: hand.contract,
            trump: hand.trump,
            score_a: hand.score_team_a,
            score_b: hand.score_team_b,
            points_made_a: hand.points_made_team_a,
            points_made_b: hand.points_made_team_b,
            coinche: hand.coinche,
            surcoinche: hand.surcoinche,
            general: hand.general,
            belote_a: hand.belote_a,
            belote_b: hand.belote_b,
            capot_team: hand.capot_team,
            cumulative_a,
            cumulative_b,
            created_at: hand.created_at,
        })
        .collect();

    let can_add_hand =
        game.state == games::GameState::InProgress && state::is_participant(&players, user_id);

    Ok(GameDetail {
        game: GameInfo {
            id: game.id,
            created_by: game.created_by,
            state: game.state,
            score_a: game.points_team_a,
            score_b: game.points_team_b,
            target_points: game.target_points,
            created_at: game.created_at,
            updated_at: game.updated_at,
        },
        team_a,
        team_b,
        hands,
        can_add_hand,
    })
}

#[post("/games")]
pub async fn create_game(
    req: HttpRequest,
    body: web::Json<CreateGameRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let body = body.into_inner();

    validate_roster(&body.players)?;
    let target_points =
        validate_target_points(body.target_points.unwrap_or(config.default_target_points))?;

    let active = users::Entity::find()
        .filter(users::Column::Id.is_in(body.players))
        .filter(users::Column::IsActive.eq(true))
        .all(&**db)
        .await?;
    if active.len() != body.players.len() {
        return Err(AppError::bad_request(
            "INVALID_PLAYERS",
            "Every player must be an active user",
        ));
    }

    let game_id = Uuid::new_v4();
    let creator_id = user.id;
    let players = body.players;
    let game = db
        .transaction::<_, _, AppError>(move |txn| {
            Box::pin(async move {
                let now: DateTime<FixedOffset> = Utc::now().into();
                let game = games::ActiveModel {
                    id: Set(game_id),
                    created_by: Set(creator_id),
                    state: Set(games::GameState::InProgress),
                    points_team_a: Set(0),
                    points_team_b: Set(0),
                    target_points: Set(target_points),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;

                for (index, player_id) in players.iter().enumerate() {
                    let (team, position) = seat_for_index(index);
                    game_players::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        game_id: Set(game_id),
                        user_id: Set(*player_id),
                        team: Set(team.as_str().to_string()),
                        position: Set(position),
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(game)
            })
        })
        .await?;

    info!(game_id = %game.id, created_by = %user.id, target_points, "game created");
    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Created().json(detail))
}

#[get("/games")]
pub async fn get_games(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;

    let all_games = games::Entity::find()
        .order_by_desc(games::Column::CreatedAt)
        .all(&**db)
        .await?;
    let summaries = build_summaries(&db, all_games, user.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "games": summaries })))
}

#[get("/me/games")]
pub async fn get_my_ongoing_games(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;

    let game_ids: Vec<Uuid> = game_players::Entity::find()
        .filter(game_players::Column::UserId.eq(user.id))
        .all(&**db)
        .await?
        .into_iter()
        .map(|p| p.game_id)
        .collect();

    let ongoing = if game_ids.is_empty() {
        Vec::new()
    } else {
        games::Entity::find()
            .filter(games::Column::Id.is_in(game_ids))
            .filter(games::Column::State.eq(games::GameState::InProgress))
            .order_by_desc(games::Column::UpdatedAt)
            .all(&**db)
            .await?
    };
    let summaries = build_summaries(&db, ongoing, user.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "games": summaries })))
}

#[get("/games/{game_id}")]
pub async fn get_game(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let game = find_game(&db, path.into_inner()).await?;
    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[delete("/games/{game_id}")]
pub async fn delete_game(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let game = find_game(&db, path.into_inner()).await?;
    ensure_creator_or_admin(&game, &user)?;

    let game_id = game.id;
    db.transaction::<_, _, AppError>(move |txn| {
        Box::pin(async move {
            hands::Entity::delete_many()
                .filter(hands::Column::GameId.eq(game_id))
                .exec(txn)
                .await?;
            game_players::Entity::delete_many()
                .filter(game_players::Column::GameId.eq(game_id))
                .exec(txn)
                .await?;
            game.delete(txn).await?;
            Ok(())
        })
    })
    .await?;

    info!(game_id = %game_id, user_id = %user.id, "game deleted");
    Ok(HttpResponse::Ok().json(json!({ "deleted": game_id })))
}

#[post("/games/{game_id}/cancel")]
pub async fn cancel_game(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let game = find_game(&db, path.into_inner()).await?;
    ensure_creator_or_admin(&game, &user)?;

    let game = state::cancel_game(&**db, game).await?;
    info!(game_id = %game.id, user_id = %user.id, "game cancelled");
    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[put("/games/{game_id}/target")]
pub async fn update_target(
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<TargetPointsRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let game_id = path.into_inner();
    let target_points = validate_target_points(body.target_points)?;

    let (user_id, is_admin) = (user.id, user.is_admin);
    let game = db
        .transaction::<_, _, AppError>(move |txn| {
            Box::pin(async move {
                let game = state::lock_game(txn, game_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("GAME_NOT_FOUND", "Game not found"))?;
                let players = state::load_players(txn, game_id).await?;
                if !is_admin && !state::is_participant(&players, user_id) {
                    return Err(AppError::forbidden(
                        "Only players of this game can change its target",
                    ));
                }
                Ok(state::update_target_points(txn, game, target_points).await?)
            })
        })
        .await?;

    info!(game_id = %game.id, user_id = %user.id, target_points, "target points updated");
    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[post("/games/{game_id}/hands")]
pub async fn add_hand(
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<HandRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let game_id = path.into_inner();
    let request = body.into_inner();

    let user_id = user.id;
    let (game, _hand) = db
        .transaction::<_, _, AppError>(move |txn| {
            Box::pin(async move {
                orchestration::record_hand(txn, game_id, user_id, &request).await
            })
        })
        .await?;

    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Created().json(detail))
}

#[put("/games/{game_id}/hands/{hand_id}")]
pub async fn edit_hand(
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<HandRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let (game_id, hand_id) = path.into_inner();
    let request = body.into_inner();

    let user_id = user.id;
    let (game, _hand) = db
        .transaction::<_, _, AppError>(move |txn| {
            Box::pin(async move {
                orchestration::amend_hand(txn, game_id, hand_id, user_id, &request).await
            })
        })
        .await?;

    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[delete("/games/{game_id}/hands/{hand_id}")]
pub async fn delete_hand(
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let (game_id, hand_id) = path.into_inner();

    let user_id = user.id;
    let game = db
        .transaction::<_, _, AppError>(move |txn| {
            Box::pin(
                async move { orchestration::remove_hand(txn, game_id, hand_id, user_id).await },
            )
        })
        .await?;

    let detail = build_game_detail(&db, game, user.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}
