//! Game rules module
//!
//! This module contains pure game rules, validation logic,
//! and rule enforcement mechanisms that depend only on
//! in-memory domain types and std.

use std::collections::HashSet;

use uuid::Uuid;

use crate::entity::games::GameState;
use crate::game_management::scoring::{Team, Trump, TOTAL_CARD_POINTS};

/// Number of players in a game
pub const PLAYER_COUNT: usize = 4;

/// Players per team
pub const TEAM_SIZE: usize = 2;

/// Target score used when a game is created without one
pub const DEFAULT_TARGET_POINTS: i32 = 1000;

/// Most belotes allowed in a hand under all-trump (one per suit)
pub const MAX_BELOTES_TOUT_ATOUT: u8 = 4;

/// Most belotes allowed in a hand with a single trump suit
pub const MAX_BELOTES_SINGLE_TRUMP: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    PreScoreOutOfRange(i32),
    BeloteNotAllowed,
    TooManyBelotes { max: u8 },
    PlayersNotDistinct,
    InvalidTargetPoints(i32),
}

impl RuleViolation {
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::PreScoreOutOfRange(_) => "INVALID_PRE_SCORE",
            RuleViolation::BeloteNotAllowed | RuleViolation::TooManyBelotes { .. } => {
                "INVALID_BELOTE"
            }
            RuleViolation::PlayersNotDistinct => "INVALID_PLAYERS",
            RuleViolation::InvalidTargetPoints(_) => "INVALID_TARGET_POINTS",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            RuleViolation::PreScoreOutOfRange(points) => {
                format!("Points made must be between 0 and {TOTAL_CARD_POINTS}, got {points}")
            }
            RuleViolation::BeloteNotAllowed => "No belote is allowed in Sans atout".to_string(),
            RuleViolation::TooManyBelotes { max } => {
                format!("At most {max} belote(s) in total (A+B) for this trump")
            }
            RuleViolation::PlayersNotDistinct => "Select 4 distinct players".to_string(),
            RuleViolation::InvalidTargetPoints(points) => {
                format!("Target points must be positive, got {points}")
            }
        }
    }
}

/// Validate a raw card-point total and narrow it for the scorer
pub fn validate_pre_score(points: i32) -> Result<u16, RuleViolation> {
    u16::try_from(points)
        .ok()
        .filter(|p| *p <= TOTAL_CARD_POINTS)
        .ok_or(RuleViolation::PreScoreOutOfRange(points))
}

/// Check the belote counts of both teams against the trump played
///
/// - Sans atout: no belote at all
/// - Tout atout: up to 4 in total (one per suit)
/// - A single trump suit (or none recorded): 1 in total
pub fn validate_belotes(trump: Option<Trump>, belote_a: u8, belote_b: u8) -> Result<(), RuleViolation> {
    let total = belote_a.saturating_add(belote_b);
    match trump {
        Some(Trump::SansAtout) => {
            if total > 0 {
                Err(RuleViolation::BeloteNotAllowed)
            } else {
                Ok(())
            }
        }
        Some(Trump::ToutAtout) => {
            if total > MAX_BELOTES_TOUT_ATOUT {
                Err(RuleViolation::TooManyBelotes {
                    max: MAX_BELOTES_TOUT_ATOUT,
                })
            } else {
                Ok(())
            }
        }
        _ => {
            if total > MAX_BELOTES_SINGLE_TRUMP {
                Err(RuleViolation::TooManyBelotes {
                    max: MAX_BELOTES_SINGLE_TRUMP,
                })
            } else {
                Ok(())
            }
        }
    }
}

/// Check a roster: four distinct users, first two on team A, last two on team B
pub fn validate_roster(players: &[Uuid; PLAYER_COUNT]) -> Result<(), RuleViolation> {
    let distinct: HashSet<&Uuid> = players.iter().collect();
    if distinct.len() != PLAYER_COUNT || players.iter().any(|p| p.is_nil()) {
        return Err(RuleViolation::PlayersNotDistinct);
    }
    Ok(())
}

/// Team and 1-based position for the player at `index` in a roster
pub fn seat_for_index(index: usize) -> (Team, i32) {
    let team = if index < TEAM_SIZE { Team::A } else { Team::B };
    (team, (index % TEAM_SIZE) as i32 + 1)
}

pub fn validate_target_points(target: i32) -> Result<i32, RuleViolation> {
    if target > 0 {
        Ok(target)
    } else {
        Err(RuleViolation::InvalidTargetPoints(target))
    }
}

/// The team that took every point while the other scored nothing, if any
pub fn capot_team(points_a: u16, points_b: u16) -> Option<Team> {
    if points_a == TOTAL_CARD_POINTS && points_b == 0 {
        Some(Team::A)
    } else if points_b == TOTAL_CARD_POINTS && points_a == 0 {
        Some(Team::B)
    } else {
        None
    }
}

/// Derive the state of a game from its totals
///
/// A cancelled game stays cancelled; otherwise it is finished as soon as one
/// team reaches the target and back in progress when neither does.
pub fn derive_game_state(current: &GameState, points_a: i32, points_b: i32, target: i32) -> GameState {
    match current {
        GameState::Cancelled => GameState::Cancelled,
        _ if points_a >= target || points_b >= target => GameState::Finished,
        _ => GameState::InProgress,
    }
}

/// The winning team of a finished game, `None` on a tie
pub fn winning_team(points_a: i32, points_b: i32) -> Option<Team> {
    match points_a.cmp(&points_b) {
        std::cmp::Ordering::Greater => Some(Team::A),
        std::cmp::Ordering::Less => Some(Team::B),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_management::scoring::Suit;

    #[test]
    fn test_validate_pre_score() {
        assert_eq!(validate_pre_score(0), Ok(0));
        assert_eq!(validate_pre_score(162), Ok(162));
        assert_eq!(
            validate_pre_score(163),
            Err(RuleViolation::PreScoreOutOfRange(163))
        );
        assert_eq!(
            validate_pre_score(-1),
            Err(RuleViolation::PreScoreOutOfRange(-1))
        );
    }

    #[test]
    fn test_validate_belotes_sans_atout() {
        assert!(validate_belotes(Some(Trump::SansAtout), 0, 0).is_ok());
        assert_eq!(
            validate_belotes(Some(Trump::SansAtout), 1, 0),
            Err(RuleViolation::BeloteNotAllowed)
        );
    }

    #[test]
    fn test_validate_belotes_tout_atout() {
        assert!(validate_belotes(Some(Trump::ToutAtout), 2, 2).is_ok());
        assert!(validate_belotes(Some(Trump::ToutAtout), 4, 0).is_ok());
        assert_eq!(
            validate_belotes(Some(Trump::ToutAtout), 3, 2),
            Err(RuleViolation::TooManyBelotes { max: 4 })
        );
    }

    #[test]
    fn test_validate_belotes_single_suit() {
        let coeur = Some(Trump::Suit(Suit::Coeur));
        assert!(validate_belotes(coeur, 1, 0).is_ok());
        assert!(validate_belotes(coeur, 0, 1).is_ok());
        assert!(validate_belotes(None, 0, 1).is_ok());
        assert_eq!(
            validate_belotes(coeur, 1, 1),
            Err(RuleViolation::TooManyBelotes { max: 1 })
        );
        assert_eq!(
            validate_belotes(None, 255, 255),
            Err(RuleViolation::TooManyBelotes { max: 1 })
        );
    }

    #[test]
    fn test_validate_roster() {
        let players = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        assert!(validate_roster(&players).is_ok());

        let duplicated = [players[0], players[1], players[2], players[0]];
        assert_eq!(
            validate_roster(&duplicated),
            Err(RuleViolation::PlayersNotDistinct)
        );

        let with_nil = [players[0], players[1], players[2], Uuid::nil()];
        assert_eq!(
            validate_roster(&with_nil),
            Err(RuleViolation::PlayersNotDistinct)
        );
    }

    #[test]
    fn test_seat_for_index() {
        assert_eq!(seat_for_index(0), (Team::A, 1));
        assert_eq!(seat_for_index(1), (Team::A, 2));
        assert_eq!(seat_for_index(2), (Team::B, 1));
        assert_eq!(seat_for_index(3), (Team::B, 2));
    }

    #[test]
    fn test_validate_target_points() {
        assert_eq!(validate_target_points(1000), Ok(1000));
        assert_eq!(validate_target_points(1), Ok(1));
        assert!(validate_target_points(0).is_err());
        assert!(validate_target_points(-500).is_err());
    }

    #[test]
    fn test_capot_team() {
        assert_eq!(capot_team(162, 0), Some(Team::A));
        assert_eq!(capot_team(0, 162), Some(Team::B));
        assert_eq!(capot_team(100, 62), None);
        assert_eq!(capot_team(162, 10), None);
    }

    #[test]
    fn test_derive_game_state() {
        assert_eq!(
            derive_game_state(&GameState::InProgress, 900, 500, 1000),
            GameState::InProgress
        );
        assert_eq!(
            derive_game_state(&GameState::InProgress, 1000, 500, 1000),
            GameState::Finished
        );
        assert_eq!(
            derive_game_state(&GameState::InProgress, 400, 1210, 1000),
            GameState::Finished
        );
        // Raising the target reopens a finished game
        assert_eq!(
            derive_game_state(&GameState::Finished, 1010, 500, 1500),
            GameState::InProgress
        );
        assert_eq!(
            derive_game_state(&GameState::Cancelled, 2000, 0, 1000),
            GameState::Cancelled
        );
    }

    #[test]
    fn test_winning_team() {
        assert_eq!(winning_team(1020, 800), Some(Team::A));
        assert_eq!(winning_team(700, 1100), Some(Team::B));
        assert_eq!(winning_team(1000, 1000), None);
    }

    #[test]
    fn test_rule_violation_codes() {
        assert_eq!(RuleViolation::BeloteNotAllowed.code(), "INVALID_BELOTE");
        assert_eq!(
            RuleViolation::PreScoreOutOfRange(200).code(),
            "INVALID_PRE_SCORE"
        );
        assert!(RuleViolation::TooManyBelotes { max: 4 }
            .detail()
            .contains('4'));
    }
}
