//! Game orchestration module
//!
//! This module contains database-coupled orchestration logic for hand operations.
//! Every write runs inside the caller's transaction with the game row locked,
//! so hand numbers and running totals stay consistent under concurrent writes.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, ModelTrait, Set};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::hand_request::HandRequest;
use crate::entity::{game_players, games, hands};
use crate::error::AppError;
use crate::game_management::rules::{self, capot_team};
use crate::game_management::scoring::{
    score_hand, Contract, HandResult, Multiplier, ScoreResult, Team, TeamHand, Trump,
};
use crate::game_management::state;

/// A validated and scored hand, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHand {
    pub result: HandResult,
    pub score: ScoreResult,
    pub capot_team: Option<Team>,
}

impl PreparedHand {
    fn score_for(&self, team: Team) -> i32 {
        // Largest possible hand score is well inside i32
        self.score.get(team) as i32
    }
}

/// Validate a submitted hand against the game's roster and score it
pub fn prepare_hand(
    request: &HandRequest,
    players: &[game_players::Model],
) -> Result<PreparedHand, AppError> {
    let contract: Contract = request.contract.parse()?;
    let trump = request
        .trump
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse::<Trump>)
        .transpose()?;

    let pre_score_a = rules::validate_pre_score(request.score_team_a)?;
    let pre_score_b = rules::validate_pre_score(request.score_team_b)?;
    rules::validate_belotes(trump, request.belote_a, request.belote_b)?;

    let taker = players
        .iter()
        .find(|p| p.user_id == request.taker_user_id)
        .ok_or_else(|| {
            AppError::bad_request("INVALID_TAKER", "The taker is not a player of this game")
        })?;
    let taker_team: Team = taker.team.parse()?;

    let result = HandResult {
        taker_team,
        contract,
        trump,
        multiplier: Multiplier::from_flags(request.coinche, request.surcoinche),
        general: request.general,
        a: TeamHand {
            pre_score: pre_score_a,
            belote: request.belote_a,
        },
        b: TeamHand {
            pre_score: pre_score_b,
            belote: request.belote_b,
        },
    };
    let score = score_hand(&result)?;

    Ok(PreparedHand {
        result,
        score,
        capot_team: capot_team(pre_score_a, pre_score_b),
    })
}

/// Lock the game and load its roster, refusing users who do not play in it
async fn lock_for_participant(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    user_id: Uuid,
) -> Result<(games::Model, Vec<game_players::Model>), AppError> {
    let game = state::lock_game(txn, game_id)
        .await?
        .ok_or_else(|| AppError::not_found("GAME_NOT_FOUND", "Game not found"))?;

    let players = state::load_players(txn, game_id).await?;
    if !state::is_participant(&players, user_id) {
        return Err(AppError::forbidden(
            "Only players of this game can change its hands",
        ));
    }

    Ok((game, players))
}

async fn find_hand(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    hand_id: Uuid,
) -> Result<hands::Model, AppError> {
    hands::Entity::find_by_id(hand_id)
        .one(txn)
        .await?
        .filter(|hand| hand.game_id == game_id)
        .ok_or_else(|| AppError::not_found("HAND_NOT_FOUND", "Hand not found"))
}

fn ensure_not_cancelled(game: &games::Model) -> Result<(), AppError> {
    if game.state == games::GameState::Cancelled {
        return Err(AppError::conflict(
            "GAME_CANCELLED",
            "This game has been cancelled",
        ));
    }
    Ok(())
}

/// Record a new hand and refresh the game's totals
pub(crate) async fn record_hand(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    user_id: Uuid,
    request: &HandRequest,
) -> Result<(games::Model, hands::Model), AppError> {
    let (game, players) = lock_for_participant(txn, game_id, user_id).await?;

    if game.state != games::GameState::InProgress {
        return Err(AppError::conflict(
            "GAME_NOT_IN_PROGRESS",
            "Hands can only be added to a game in progress",
        ));
    }

    let prepared = prepare_hand(request, &players)?;
    let existing = state::load_hands(txn, game_id).await?;
    let number = state::next_hand_number(&existing);

    let hand = hands::ActiveModel {
        id: Set(Uuid::new_v4()),
        game_id: Set(game_id),
        number: Set(number),
        taker_user_id: Set(Some(request.taker_user_id)),
        contract: Set(prepared.result.contract.to_string()),
        trump: Set(prepared.result.trump.map(|t| t.to_string())),
        score_team_a: Set(prepared.score_for(Team::A)),
        score_team_b: Set(prepared.score_for(Team::B)),
        points_made_team_a: Set(i32::from(prepared.result.a.pre_score)),
        points_made_team_b: Set(i32::from(prepared.result.b.pre_score)),
        coinche: Set(request.coinche),
        surcoinche: Set(request.surcoinche),
        general: Set(request.general),
        belote_a: Set(i32::from(request.belote_a)),
        belote_b: Set(i32::from(request.belote_b)),
        capot_team: Set(prepared.capot_team.map(|t| t.as_str().to_string())),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;

    debug!(
        game_id = %game_id,
        hand_number = number,
        score_a = hand.score_team_a,
        score_b = hand.score_team_b,
        "hand recorded"
    );

    let game = state::recompute_totals_and_update_game(txn, game).await?;
    info!(game_id = %game_id, hand_id = %hand.id, user_id = %user_id, "hand added");
    Ok((game, hand))
}

/// Replace the content of an existing hand, keeping its number
pub(crate) async fn amend_hand(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    hand_id: Uuid,
    user_id: Uuid,
    request: &HandRequest,
) -> Result<(games::Model, hands::Model), AppError> {
    let (game, players) = lock_for_participant(txn, game_id, user_id).await?;
    ensure_not_cancelled(&game)?;

    let existing = find_hand(txn, game_id, hand_id).await?;
    let prepared = prepare_hand(request, &players)?;

    let mut hand: hands::ActiveModel = existing.into();
    hand.taker_user_id = Set(Some(request.taker_user_id));
    hand.contract = Set(prepared.result.contract.to_string());
    hand.trump = Set(prepared.result.trump.map(|t| t.to_string()));
    hand.score_team_a = Set(prepared.score_for(Team::A));
    hand.score_team_b = Set(prepared.score_for(Team::B));
    hand.points_made_team_a = Set(i32::from(prepared.result.a.pre_score));
    hand.points_made_team_b = Set(i32::from(prepared.result.b.pre_score));
    hand.coinche = Set(request.coinche);
    hand.surcoinche = Set(request.surcoinche);
    hand.general = Set(request.general);
    hand.belote_a = Set(i32::from(request.belote_a));
    hand.belote_b = Set(i32::from(request.belote_b));
    hand.capot_team = Set(prepared.capot_team.map(|t| t.as_str().to_string()));
    let hand = hand.update(txn).await?;

    let game = state::recompute_totals_and_update_game(txn, game).await?;
    info!(game_id = %game_id, hand_id = %hand_id, user_id = %user_id, "hand edited");
    Ok((game, hand))
}

/// Delete a hand and refresh the game's totals
pub(crate) async fn remove_hand(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    hand_id: Uuid,
    user_id: Uuid,
) -> Result<games::Model, AppError> {
    let (game, _players) = lock_for_participant(txn, game_id, user_id).await?;
    ensure_not_cancelled(&game)?;

    let hand = find_hand(txn, game_id, hand_id).await?;
    hand.delete(txn).await?;

    let game = state::recompute_totals_and_update_game(txn, game).await?;
    info!(game_id = %game_id, hand_id = %hand_id, user_id = %user_id, "hand deleted");
    Ok(game)
}
