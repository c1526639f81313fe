//! Game state management module
//!
//! This module contains logic for managing game state transitions,
//! running totals, and game lifecycle management.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entity::{game_players, games, hands};
use crate::game_management::rules::derive_game_state;

/// Fetch a game and lock its row until the surrounding transaction ends
pub(crate) async fn lock_game<C: ConnectionTrait>(
    conn: &C,
    game_id: Uuid,
) -> Result<Option<games::Model>, DbErr> {
    games::Entity::find_by_id(game_id)
        .lock(LockType::Update)
        .one(conn)
        .await
}

pub(crate) async fn load_players<C: ConnectionTrait>(
    conn: &C,
    game_id: Uuid,
) -> Result<Vec<game_players::Model>, DbErr> {
    game_players::Entity::find()
        .filter(game_players::Column::GameId.eq(game_id))
        .order_by_asc(game_players::Column::Team)
        .order_by_asc(game_players::Column::Position)
        .all(conn)
        .await
}

pub(crate) async fn load_hands<C: ConnectionTrait>(
    conn: &C,
    game_id: Uuid,
) -> Result<Vec<hands::Model>, DbErr> {
    hands::Entity::find()
        .filter(hands::Column::GameId.eq(game_id))
        .order_by_asc(hands::Column::Number)
        .all(conn)
        .await
}

pub(crate) fn is_participant(players: &[game_players::Model], user_id: Uuid) -> bool {
    players.iter().any(|p| p.user_id == user_id)
}

/// Sum of every hand's score, per team
pub fn sum_hand_scores(hands: &[hands::Model]) -> (i32, i32) {
    hands.iter().fold((0, 0), |(a, b), hand| {
        (a + hand.score_team_a, b + hand.score_team_b)
    })
}

/// Running totals after each hand, in hand order
pub fn cumulative_totals(hands: &[hands::Model]) -> Vec<(i32, i32)> {
    hands
        .iter()
        .scan((0, 0), |(a, b), hand| {
            *a += hand.score_team_a;
            *b += hand.score_team_b;
            Some((*a, *b))
        })
        .collect()
}

/// Number for the next hand of a game (1-based)
pub fn next_hand_number(hands: &[hands::Model]) -> i32 {
    hands.iter().map(|h| h.number).max().unwrap_or(0) + 1
}

/// Recompute a game's totals from its hands and re-derive its state
pub(crate) async fn recompute_totals_and_update_game<C: ConnectionTrait>(
    conn: &C,
    game: games::Model,
) -> Result<games::Model, DbErr> {
    let hands = load_hands(conn, game.id).await?;
    let (points_a, points_b) = sum_hand_scores(&hands);
    let state = derive_game_state(&game.state, points_a, points_b, game.target_points);

    if state != game.state {
        info!(game_id = %game.id, ?state, points_a, points_b, "game state changed");
    }

    let now: DateTime<FixedOffset> = Utc::now().into();
    let mut game_model: games::ActiveModel = game.into();
    game_model.points_team_a = Set(points_a);
    game_model.points_team_b = Set(points_b);
    game_model.state = Set(state);
    game_model.updated_at = Set(now);
    game_model.update(conn).await
}

/// Change the target of a game; a finished game whose totals no longer
/// reach the target goes back in progress.
pub(crate) async fn update_target_points<C: ConnectionTrait>(
    conn: &C,
    game: games::Model,
    new_target: i32,
) -> Result<games::Model, DbErr> {
    let state = derive_game_state(
        &game.state,
        game.points_team_a,
        game.points_team_b,
        new_target,
    );

    let now: DateTime<FixedOffset> = Utc::now().into();
    let mut game_model: games::ActiveModel = game.into();
    game_model.target_points = Set(new_target);
    game_model.state = Set(state);
    game_model.updated_at = Set(now);
    game_model.update(conn).await
}

pub(crate) async fn cancel_game<C: ConnectionTrait>(
    conn: &C,
    game: games::Model,
) -> Result<games::Model, DbErr> {
    let now: DateTime<FixedOffset> = Utc::now().into();
    let mut game_model: games::ActiveModel = game.into();
    game_model.state = Set(games::GameState::Cancelled);
    game_model.updated_at = Set(now);
    game_model.update(conn).await
}
