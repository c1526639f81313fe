//! Scoring module
//!
//! This module contains the pure hand scoring logic for Coinche. It takes a
//! reported hand (contract, trump, raw card points, belotes, coinche state)
//! and computes the points credited to each team. No I/O, no shared state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Card points available in a hand (including the last-trick bonus)
pub const TOTAL_CARD_POINTS: u16 = 162;

/// Raw points below which a numeric contract fails outright
pub const MIN_RAW_POINTS_TO_HOLD: u16 = 81;

/// Base awarded to the defenders on any failed contract
pub const FAILED_CONTRACT_BASE: u32 = 160;

/// Taker reward for a made capot
pub const CAPOT_POINTS: u32 = 500;

/// Taker reward for a made générale
pub const GENERALE_POINTS: u32 = 750;

/// Bonus for sweeping all 162 points
pub const SWEEP_BONUS: u32 = 90;

/// Smallest numeric contract
pub const MIN_CONTRACT: u16 = 80;

/// Largest numeric contract
pub const MAX_CONTRACT: u16 = 180;

/// Token used for the capot contract
pub const CAPOT_TOKEN: &str = "Capot";

/// Token used for the générale contract
pub const GENERALE_TOKEN: &str = "Générale";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("invalid team: {0}")]
    InvalidTeam(String),
    #[error("invalid contract: {0}")]
    InvalidContract(String),
    #[error("invalid trump: {0}")]
    InvalidTrump(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Team::A),
            "B" | "b" => Ok(Team::B),
            other => Err(ScoringError::InvalidTeam(other.to_string())),
        }
    }
}

/// The bid the taking team committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    Capot,
    Generale,
    Numeric(u16),
}

impl Contract {
    /// Build a numeric contract, rejecting anything that is not a step of 10
    /// between 80 and 180.
    pub fn numeric(value: u16) -> Result<Contract, ScoringError> {
        if is_valid_contract_value(value) {
            Ok(Contract::Numeric(value))
        } else {
            Err(ScoringError::InvalidContract(value.to_string()))
        }
    }

    /// Points the taker needs to hold the contract, counting a capot or
    /// générale as all 162 card points.
    pub fn required_points(self) -> u16 {
        match self {
            Contract::Capot | Contract::Generale => TOTAL_CARD_POINTS,
            Contract::Numeric(value) => value,
        }
    }
}

pub fn is_valid_contract_value(value: u16) -> bool {
    (MIN_CONTRACT..=MAX_CONTRACT).contains(&value) && value % 10 == 0
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contract::Capot => f.write_str(CAPOT_TOKEN),
            Contract::Generale => f.write_str(GENERALE_TOKEN),
            Contract::Numeric(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for Contract {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token {
            CAPOT_TOKEN => Ok(Contract::Capot),
            GENERALE_TOKEN => Ok(Contract::Generale),
            _ => token
                .parse::<u16>()
                .map_err(|_| ScoringError::InvalidContract(token.to_string()))
                .and_then(Contract::numeric),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Pique,
    Coeur,
    Carreau,
    Trefle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trump {
    Suit(Suit),
    SansAtout,
    ToutAtout,
}

impl Trump {
    /// Points a single belote declaration is worth under this trump
    pub fn belote_points(self) -> u32 {
        match self {
            Trump::ToutAtout => 10,
            _ => 20,
        }
    }
}

/// Belote value when no trump was recorded: the plain-suit value.
pub fn belote_points(trump: Option<Trump>) -> u32 {
    trump.map_or(20, Trump::belote_points)
}

impl fmt::Display for Trump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trump::Suit(Suit::Pique) => "Pique",
            Trump::Suit(Suit::Coeur) => "Coeur",
            Trump::Suit(Suit::Carreau) => "Carreau",
            Trump::Suit(Suit::Trefle) => "Trèfle",
            Trump::SansAtout => "Sans atout",
            Trump::ToutAtout => "Tout atout",
        };
        f.write_str(label)
    }
}

impl FromStr for Trump {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pique" => Ok(Trump::Suit(Suit::Pique)),
            "coeur" | "cœur" => Ok(Trump::Suit(Suit::Coeur)),
            "carreau" => Ok(Trump::Suit(Suit::Carreau)),
            "trèfle" | "trefle" => Ok(Trump::Suit(Suit::Trefle)),
            "sans atout" => Ok(Trump::SansAtout),
            "tout atout" => Ok(Trump::ToutAtout),
            _ => Err(ScoringError::InvalidTrump(s.trim().to_string())),
        }
    }
}

/// Opponents' challenge on the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplier {
    #[default]
    None,
    Coinche,
    Surcoinche,
}

impl Multiplier {
    /// Collapse the two submitted flags; a surcoinche always implies the
    /// coinche it answers, so it wins when both are set.
    pub fn from_flags(coinche: bool, surcoinche: bool) -> Multiplier {
        if surcoinche {
            Multiplier::Surcoinche
        } else if coinche {
            Multiplier::Coinche
        } else {
            Multiplier::None
        }
    }

    pub fn factor(self) -> u32 {
        match self {
            Multiplier::None => 1,
            Multiplier::Coinche => 2,
            Multiplier::Surcoinche => 4,
        }
    }
}

/// What one team reported for the hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamHand {
    pub pre_score: u16,
    pub belote: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandResult {
    pub taker_team: Team,
    pub contract: Contract,
    pub trump: Option<Trump>,
    pub multiplier: Multiplier,
    pub general: bool,
    pub a: TeamHand,
    pub b: TeamHand,
}

impl HandResult {
    pub fn team(&self, team: Team) -> TeamHand {
        match team {
            Team::A => self.a,
            Team::B => self.b,
        }
    }
}

/// Points credited to each team for a single hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub a: u32,
    pub b: u32,
}

impl ScoreResult {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::A => self.a,
            Team::B => self.b,
        }
    }

    fn get_mut(&mut self, team: Team) -> &mut u32 {
        match team {
            Team::A => &mut self.a,
            Team::B => &mut self.b,
        }
    }
}

/// Outcome of the contract-specific stage, before the shared pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BaseScore {
    taker: u32,
    defender: u32,
    /// Added to the defenders after the multiplier (fallen capot/générale)
    deferred_defender_bonus: u32,
}

impl BaseScore {
    fn made(taker: u32, defender: u32) -> Self {
        Self {
            taker,
            defender,
            deferred_defender_bonus: 0,
        }
    }
}

fn capot_base(taker_raw: u16) -> BaseScore {
    if taker_raw == TOTAL_CARD_POINTS {
        BaseScore::made(CAPOT_POINTS, 0)
    } else {
        BaseScore {
            taker: 0,
            defender: FAILED_CONTRACT_BASE * 2,
            deferred_defender_bonus: SWEEP_BONUS,
        }
    }
}

fn generale_base(taker_raw: u16, general: bool) -> BaseScore {
    if general && taker_raw == TOTAL_CARD_POINTS {
        BaseScore::made(GENERALE_POINTS, 0)
    } else {
        BaseScore {
            taker: 0,
            defender: FAILED_CONTRACT_BASE * 2,
            deferred_defender_bonus: SWEEP_BONUS * 2,
        }
    }
}

fn numeric_base(hand: &HandResult, value: u16) -> BaseScore {
    let taker = hand.team(hand.taker_team);
    let defender = hand.team(hand.taker_team.other());
    let contract = u32::from(value);
    let failed = BaseScore::made(0, FAILED_CONTRACT_BASE + contract);

    if taker.pre_score < MIN_RAW_POINTS_TO_HOLD {
        return failed;
    }

    let per_belote = belote_points(hand.trump);
    let taker_effective = u32::from(taker.pre_score) + per_belote * u32::from(taker.belote);

    let mut base = if taker_effective >= contract {
        BaseScore::made(
            contract + u32::from(taker.pre_score),
            u32::from(defender.pre_score),
        )
    } else {
        failed
    };

    // Sweep bonus runs on this path whether the contract was made or not
    if defender.pre_score == TOTAL_CARD_POINTS {
        base.defender += SWEEP_BONUS;
    } else if taker.pre_score == TOTAL_CARD_POINTS {
        base.taker += SWEEP_BONUS;
    }

    base
}

fn round_up_to_ten(value: u32) -> u32 {
    value.div_ceil(10) * 10
}

fn round_down_to_ten(value: u32) -> u32 {
    value / 10 * 10
}

/// Score a single hand.
///
/// Stages, in order:
/// 1. contract-specific base scores (capot, générale or numeric)
/// 2. coinche/surcoinche multiplier on whichever side is non-zero
/// 3. deferred bonus for a fallen capot/générale, credited to the defenders
/// 4. each team's own belote points, whatever the outcome
/// 5. taker rounded up, defenders rounded down, to a multiple of 10
///
/// # Errors
/// * `ScoringError::InvalidContract` when a numeric contract is outside
///   80..=180 or not a multiple of 10
pub fn score_hand(hand: &HandResult) -> Result<ScoreResult, ScoringError> {
    let taker_team = hand.taker_team;
    let defender_team = taker_team.other();
    let taker_raw = hand.team(taker_team).pre_score;

    let mut base = match hand.contract {
        Contract::Capot => capot_base(taker_raw),
        Contract::Generale => generale_base(taker_raw, hand.general),
        Contract::Numeric(value) => {
            if !is_valid_contract_value(value) {
                return Err(ScoringError::InvalidContract(value.to_string()));
            }
            numeric_base(hand, value)
        }
    };

    let factor = hand.multiplier.factor();
    if base.taker == 0 {
        base.defender *= factor;
    } else {
        base.taker *= factor;
    }

    base.defender += base.deferred_defender_bonus;

    let mut result = ScoreResult::default();
    *result.get_mut(taker_team) = base.taker;
    *result.get_mut(defender_team) = base.defender;

    let per_belote = belote_points(hand.trump);
    result.a += per_belote * u32::from(hand.a.belote);
    result.b += per_belote * u32::from(hand.b.belote);

    let taker_final = round_up_to_ten(result.get(taker_team));
    let defender_final = round_down_to_ten(result.get(defender_team));
    *result.get_mut(taker_team) = taker_final;
    *result.get_mut(defender_team) = defender_final;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(taker_team: Team, contract: Contract, a: u16, b: u16) -> HandResult {
        HandResult {
            taker_team,
            contract,
            trump: Some(Trump::Suit(Suit::Coeur)),
            multiplier: Multiplier::None,
            general: false,
            a: TeamHand {
                pre_score: a,
                belote: 0,
            },
            b: TeamHand {
                pre_score: b,
                belote: 0,
            },
        }
    }

    fn score(hand: HandResult) -> (u32, u32) {
        let result = score_hand(&hand).expect("valid hand should score");
        (result.a, result.b)
    }

    #[test]
    fn test_numeric_contract_made() {
        // 80 + 90 for the taker, defenders keep their raw 72 rounded down
        assert_eq!(score(hand(Team::A, Contract::Numeric(80), 90, 72)), (170, 70));
    }

    #[test]
    fn test_numeric_contract_below_81_fails_outright() {
        assert_eq!(score(hand(Team::A, Contract::Numeric(100), 60, 102)), (0, 260));
    }

    #[test]
    fn test_capot_made() {
        assert_eq!(score(hand(Team::A, Contract::Capot, 162, 0)), (500, 0));
    }

    #[test]
    fn test_capot_fallen_adds_deferred_bonus() {
        assert_eq!(score(hand(Team::A, Contract::Capot, 100, 62)), (0, 410));
    }

    #[test]
    fn test_coinche_doubles_taker_when_made() {
        let mut h = hand(Team::A, Contract::Numeric(80), 90, 0);
        h.multiplier = Multiplier::Coinche;
        assert_eq!(score(h), (340, 0));
    }

    #[test]
    fn test_belote_kept_on_failed_contract_under_tout_atout() {
        let mut h = hand(Team::A, Contract::Numeric(80), 60, 102);
        h.trump = Some(Trump::ToutAtout);
        h.a.belote = 2;
        h.b.belote = 1;
        // A: 0 + 20 → 20; B: 240 + 10 → 250
        assert_eq!(score(h), (20, 250));
    }

    #[test]
    fn test_taker_on_team_b_mirrors_team_a() {
        assert_eq!(score(hand(Team::B, Contract::Numeric(80), 72, 90)), (70, 170));
        assert_eq!(score(hand(Team::B, Contract::Capot, 0, 162)), (0, 500));
    }

    #[test]
    fn test_taker_rounds_up_and_defender_rounds_down() {
        // Taker 80 + 85 = 165 → 170, defender 77 → 70
        assert_eq!(score(hand(Team::A, Contract::Numeric(80), 85, 77)), (170, 70));
    }

    #[test]
    fn test_belote_counts_towards_holding_the_contract() {
        let mut h = hand(Team::A, Contract::Numeric(100), 85, 77);
        h.a.belote = 1;
        // Effective 105 holds 100; taker 185 + 20 belote = 205 → 210
        assert_eq!(score(h), (210, 70));
    }

    #[test]
    fn test_contract_failed_despite_81_points() {
        // 90 raw < 120 required: taker 0, defenders 160 + 120
        assert_eq!(score(hand(Team::A, Contract::Numeric(120), 90, 72)), (0, 280));
    }

    #[test]
    fn test_defender_belote_does_not_help_the_taker() {
        let mut h = hand(Team::A, Contract::Numeric(100), 90, 72);
        h.b.belote = 1;
        // Taker effective 90 < 100 → fail; defenders 260 + 20 belote
        assert_eq!(score(h), (0, 280));
    }

    #[test]
    fn test_numeric_sweep_bonus_when_made() {
        // 80 + 162 + 90 = 332 → 340
        assert_eq!(score(hand(Team::A, Contract::Numeric(80), 162, 0)), (340, 0));
    }

    #[test]
    fn test_numeric_sweep_bonus_applies_even_when_contract_failed() {
        // 162 < 170: contract fails (taker 0, defenders 330) yet the sweep
        // still credits the taker 90, which then takes the multiplier.
        let mut h = hand(Team::A, Contract::Numeric(170), 162, 0);
        assert_eq!(score(h), (90, 330));

        h.multiplier = Multiplier::Coinche;
        assert_eq!(score(h), (180, 330));
    }

    #[test]
    fn test_no_sweep_bonus_on_outright_failure() {
        // Taker under 81: defenders sweep but only get 160 + contract
        assert_eq!(score(hand(Team::A, Contract::Numeric(80), 0, 162)), (0, 240));
    }

    #[test]
    fn test_coinche_on_failed_contract_doubles_defenders() {
        let mut h = hand(Team::A, Contract::Numeric(100), 60, 102);
        h.multiplier = Multiplier::Coinche;
        assert_eq!(score(h), (0, 520));
    }

    #[test]
    fn test_surcoinche_quadruples() {
        let mut h = hand(Team::A, Contract::Numeric(80), 90, 72);
        h.multiplier = Multiplier::Surcoinche;
        // Taker 170 * 4 = 680, defenders keep 72 → 70
        assert_eq!(score(h), (680, 70));
    }

    #[test]
    fn test_surcoinche_wins_when_both_flags_set() {
        assert_eq!(Multiplier::from_flags(true, true), Multiplier::Surcoinche);
        assert_eq!(Multiplier::from_flags(true, false), Multiplier::Coinche);
        assert_eq!(Multiplier::from_flags(false, true), Multiplier::Surcoinche);
        assert_eq!(Multiplier::from_flags(false, false), Multiplier::None);
    }

    #[test]
    fn test_fallen_capot_bonus_added_after_multiplier() {
        let mut h = hand(Team::A, Contract::Capot, 150, 12);
        h.multiplier = Multiplier::Coinche;
        // 320 * 2 + 90
        assert_eq!(score(h), (0, 730));
    }

    #[test]
    fn test_capot_made_with_coinche() {
        let mut h = hand(Team::B, Contract::Capot, 0, 162);
        h.multiplier = Multiplier::Coinche;
        assert_eq!(score(h), (0, 1000));
    }

    #[test]
    fn test_generale_made_requires_declaration() {
        let mut h = hand(Team::A, Contract::Generale, 162, 0);
        h.general = true;
        assert_eq!(score(h), (750, 0));

        h.general = false;
        // Undeclared: fallen générale, 320 + 180
        assert_eq!(score(h), (0, 500));
    }

    #[test]
    fn test_generale_fallen_with_surcoinche() {
        let mut h = hand(Team::A, Contract::Generale, 140, 22);
        h.general = true;
        h.multiplier = Multiplier::Surcoinche;
        // 320 * 4 + 180
        assert_eq!(score(h), (0, 1460));
    }

    #[test]
    fn test_belote_added_on_capot() {
        let mut h = hand(Team::A, Contract::Capot, 162, 0);
        h.trump = Some(Trump::Suit(Suit::Pique));
        h.a.belote = 1;
        assert_eq!(score(h), (520, 0));
    }

    #[test]
    fn test_belote_without_trump_uses_suit_value() {
        let mut h = hand(Team::A, Contract::Numeric(80), 90, 72);
        h.trump = None;
        h.b.belote = 1;
        assert_eq!(score(h), (170, 90));
    }

    #[test]
    fn test_invalid_numeric_contract_is_rejected() {
        for value in [0, 70, 85, 190, 1000] {
            let h = hand(Team::A, Contract::Numeric(value), 90, 72);
            assert_eq!(
                score_hand(&h),
                Err(ScoringError::InvalidContract(value.to_string()))
            );
        }
    }

    #[test]
    fn test_scores_are_multiples_of_ten_and_one_side_multiplied() {
        let contracts = [
            Contract::Capot,
            Contract::Generale,
            Contract::Numeric(80),
            Contract::Numeric(110),
            Contract::Numeric(150),
            Contract::Numeric(180),
        ];
        let multipliers = [Multiplier::None, Multiplier::Coinche, Multiplier::Surcoinche];

        for contract in contracts {
            for multiplier in multipliers {
                for taker_points in [0u16, 40, 81, 95, 117, 145, 162] {
                    let mut h = hand(Team::A, contract, taker_points, 162 - taker_points);
                    h.multiplier = multiplier;
                    h.general = true;
                    let result = score_hand(&h).expect("valid hand");
                    assert_eq!(result.a % 10, 0, "{h:?}");
                    assert_eq!(result.b % 10, 0, "{h:?}");

                    let mut plain = h;
                    plain.multiplier = Multiplier::None;
                    let base = score_hand(&plain).expect("valid hand");
                    if multiplier != Multiplier::None {
                        assert!(
                            result.a == base.a || result.b == base.b,
                            "only one side should move: {h:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_contract_tokens() {
        assert_eq!("Capot".parse::<Contract>(), Ok(Contract::Capot));
        assert_eq!("Générale".parse::<Contract>(), Ok(Contract::Generale));
        assert_eq!(" 120 ".parse::<Contract>(), Ok(Contract::Numeric(120)));
        assert!("125".parse::<Contract>().is_err());
        assert!("capot".parse::<Contract>().is_err());
        assert!("".parse::<Contract>().is_err());
        assert_eq!(Contract::Generale.to_string(), "Générale");
        assert_eq!(Contract::Numeric(90).to_string(), "90");
    }

    #[test]
    fn test_parse_team_and_trump() {
        assert_eq!("A".parse::<Team>(), Ok(Team::A));
        assert_eq!("b".parse::<Team>(), Ok(Team::B));
        assert!("C".parse::<Team>().is_err());

        assert_eq!("Tout atout".parse::<Trump>(), Ok(Trump::ToutAtout));
        assert_eq!("sans atout".parse::<Trump>(), Ok(Trump::SansAtout));
        assert_eq!("Trèfle".parse::<Trump>(), Ok(Trump::Suit(Suit::Trefle)));
        assert!("Joker".parse::<Trump>().is_err());
        assert_eq!(Trump::SansAtout.to_string(), "Sans atout");
    }
}
