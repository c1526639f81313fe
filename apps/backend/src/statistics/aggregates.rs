//! Aggregate statistics over the stored games and hands
//!
//! Everything here works on rows already loaded into a [`Dataset`], so the
//! computations are plain iterator code and can be tested without a database.

use std::collections::{BTreeMap, HashMap};

use sea_orm::{ActiveEnum, DatabaseConnection, DbErr, EntityTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{game_players, games, hands, users};
use crate::game_management::rules::winning_team;
use crate::game_management::scoring::{Contract, Team};

/// Every row the statistics need
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<users::Model>,
    pub games: Vec<games::Model>,
    pub players: Vec<game_players::Model>,
    pub hands: Vec<hands::Model>,
}

impl Dataset {
    pub async fn load(db: &DatabaseConnection) -> Result<Self, DbErr> {
        Ok(Self {
            users: users::Entity::find().all(db).await?,
            games: games::Entity::find().all(db).await?,
            players: game_players::Entity::find().all(db).await?,
            hands: hands::Entity::find().all(db).await?,
        })
    }

    pub(crate) fn games_by_id(&self) -> HashMap<Uuid, &games::Model> {
        self.games.iter().map(|g| (g.id, g)).collect()
    }

    pub(crate) fn names(&self) -> HashMap<Uuid, String> {
        self.users
            .iter()
            .map(|u| (u.id, u.display_name().to_string()))
            .collect()
    }

    /// Team of each player, keyed by `(game_id, user_id)`
    pub(crate) fn seats(&self) -> HashMap<(Uuid, Uuid), Team> {
        self.players
            .iter()
            .filter_map(|p| Some(((p.game_id, p.user_id), p.team.parse().ok()?)))
            .collect()
    }

    /// Hands with a known taker, paired with the taker's team
    fn taken_hands(&self) -> Vec<(&hands::Model, Uuid, Team)> {
        let seats = self.seats();
        self.hands
            .iter()
            .filter_map(|h| {
                let taker = h.taker_user_id?;
                let team = *seats.get(&(h.game_id, taker))?;
                Some((h, taker, team))
            })
            .collect()
    }
}

pub(crate) fn is_finished(game: &games::Model) -> bool {
    game.state == games::GameState::Finished
}

pub(crate) fn team_points(game: &games::Model, team: Team) -> i32 {
    match team {
        Team::A => game.points_team_a,
        Team::B => game.points_team_b,
    }
}

fn raw_points(hand: &hands::Model, team: Team) -> i32 {
    match team {
        Team::A => hand.points_made_team_a,
        Team::B => hand.points_made_team_b,
    }
}

fn hand_score(hand: &hands::Model, team: Team) -> i32 {
    match team {
        Team::A => hand.score_team_a,
        Team::B => hand.score_team_b,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `part / whole` as a percentage rounded to 2 decimals, 0 when `whole` is 0
pub(crate) fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_to(part as f64 / whole as f64 * 100.0, 2)
    }
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        round_to(total / count as f64, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_games: usize,
    pub games_by_state: BTreeMap<String, usize>,
    pub total_hands: usize,
    pub total_active_users: usize,
    pub avg_hands_per_game: f64,
    pub avg_total_points: f64,
}

pub fn global_stats(data: &Dataset) -> GlobalStats {
    let mut games_by_state = BTreeMap::new();
    for game in &data.games {
        *games_by_state.entry(game.state.to_value()).or_insert(0) += 1;
    }

    // Games without any hand do not count towards the average
    let mut hands_per_game: HashMap<Uuid, usize> = HashMap::new();
    for hand in &data.hands {
        *hands_per_game.entry(hand.game_id).or_insert(0) += 1;
    }

    let finished: Vec<&games::Model> = data.games.iter().filter(|g| is_finished(g)).collect();
    let finished_points: f64 = finished
        .iter()
        .map(|g| f64::from(g.points_team_a + g.points_team_b))
        .sum();

    GlobalStats {
        total_games: data.games.len(),
        games_by_state,
        total_hands: data.hands.len(),
        total_active_users: data.users.iter().filter(|u| u.is_active).count(),
        avg_hands_per_game: average(data.hands.len() as f64, hands_per_game.len()),
        avg_total_points: average(finished_points, finished.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub user_id: Uuid,
    pub name: String,
    pub games_played: usize,
    pub games_finished: usize,
    pub games_won: usize,
    pub win_rate: f64,
    pub total_points_scored: i64,
    pub avg_points_per_game: f64,
}

/// Per-player record for active users, best winners first
pub fn player_stats(data: &Dataset) -> Vec<PlayerStats> {
    let games = data.games_by_id();
    let seats = data.seats();

    let mut stats: Vec<PlayerStats> = data
        .users
        .iter()
        .filter(|u| u.is_active)
        .map(|user| {
            let mut played = 0;
            let mut finished = 0;
            let mut won = 0;
            let mut points: i64 = 0;

            for ((game_id, _), team) in seats.iter().filter(|((_, uid), _)| *uid == user.id) {
                let Some(game) = games.get(game_id) else {
                    continue;
                };
                played += 1;
                points += i64::from(team_points(game, *team));
                if is_finished(game) {
                    finished += 1;
                    if winning_team(game.points_team_a, game.points_team_b) == Some(*team) {
                        won += 1;
                    }
                }
            }

            PlayerStats {
                user_id: user.id,
                name: user.display_name().to_string(),
                games_played: played,
                games_finished: finished,
                games_won: won,
                win_rate: rate(won, finished),
                total_points_scored: points,
                avg_points_per_game: average(points as f64, played),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.games_won
            .cmp(&a.games_won)
            .then(b.games_played.cmp(&a.games_played))
    });
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSuccess {
    pub contract: String,
    pub total: usize,
    pub success: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractStats {
    pub distribution: BTreeMap<String, usize>,
    pub success_rates: Vec<ContractSuccess>,
}

pub fn contract_stats(data: &Dataset) -> ContractStats {
    let mut distribution = BTreeMap::new();
    for hand in &data.hands {
        *distribution.entry(hand.contract.clone()).or_insert(0) += 1;
    }

    // (total, made) per numeric contract value
    let mut numeric: BTreeMap<u16, (usize, usize)> = BTreeMap::new();
    for (hand, _taker, team) in data.taken_hands() {
        let Ok(Contract::Numeric(value)) = hand.contract.parse::<Contract>() else {
            continue;
        };
        let entry = numeric.entry(value).or_insert((0, 0));
        entry.0 += 1;
        if raw_points(hand, team) >= i32::from(value) {
            entry.1 += 1;
        }
    }

    let success_rates = numeric
        .into_iter()
        .map(|(value, (total, success))| ContractSuccess {
            contract: value.to_string(),
            total,
            success,
            success_rate: rate(success, total),
        })
        .collect();

    ContractStats {
        distribution,
        success_rates,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrumpStats {
    pub distribution: BTreeMap<String, usize>,
    pub avg_points: BTreeMap<String, f64>,
}

pub fn trump_stats(data: &Dataset) -> TrumpStats {
    let mut totals: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for hand in &data.hands {
        let Some(trump) = &hand.trump else {
            continue;
        };
        let entry = totals.entry(trump.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += f64::from(hand.points_made_team_a + hand.points_made_team_b);
    }

    TrumpStats {
        distribution: totals.iter().map(|(t, (n, _))| (t.clone(), *n)).collect(),
        avg_points: totals
            .into_iter()
            .map(|(t, (n, sum))| (t, average(sum, n)))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialEventStats {
    pub coinches: usize,
    pub surcoinches: usize,
    pub capots: usize,
    pub capots_by_team: BTreeMap<String, usize>,
    pub generales: usize,
    pub total_belotes: i64,
    pub coinche_success_rate: f64,
}

pub fn special_event_stats(data: &Dataset) -> SpecialEventStats {
    let mut capots_by_team = BTreeMap::new();
    for team in data.hands.iter().filter_map(|h| h.capot_team.as_ref()) {
        *capots_by_team.entry(team.clone()).or_insert(0) += 1;
    }

    let coinched: Vec<(&hands::Model, Team)> = data
        .taken_hands()
        .into_iter()
        .filter(|(h, _, _)| h.coinche)
        .map(|(h, _, team)| (h, team))
        .collect();
    let coinche_won = coinched
        .iter()
        .filter(|(h, team)| hand_score(h, *team) > hand_score(h, team.other()))
        .count();

    SpecialEventStats {
        coinches: data.hands.iter().filter(|h| h.coinche).count(),
        surcoinches: data.hands.iter().filter(|h| h.surcoinche).count(),
        capots: capots_by_team.values().sum(),
        capots_by_team,
        generales: data.hands.iter().filter(|h| h.general).count(),
        total_belotes: data
            .hands
            .iter()
            .map(|h| i64::from(h.belote_a + h.belote_b))
            .sum(),
        coinche_success_rate: rate(coinche_won, coinched.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TakerStats {
    pub user_id: Uuid,
    pub name: String,
    pub times_taken: usize,
    pub contracts_made: usize,
    pub success_rate: f64,
    pub avg_points_made: f64,
}

pub fn taker_stats(data: &Dataset) -> Vec<TakerStats> {
    let names = data.names();

    // (taken, made, raw points) per taker
    let mut per_taker: HashMap<Uuid, (usize, usize, i64)> = HashMap::new();
    for (hand, taker, team) in data.taken_hands() {
        let entry = per_taker.entry(taker).or_insert((0, 0, 0));
        let raw = raw_points(hand, team);
        entry.0 += 1;
        entry.2 += i64::from(raw);
        let made = hand
            .contract
            .parse::<Contract>()
            .map(|c| raw >= i32::from(c.required_points()))
            .unwrap_or(false);
        if made {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<TakerStats> = per_taker
        .into_iter()
        .map(|(user_id, (taken, made, raw))| TakerStats {
            user_id,
            name: names.get(&user_id).cloned().unwrap_or_default(),
            times_taken: taken,
            contracts_made: made,
            success_rate: rate(made, taken),
            avg_points_made: average(raw as f64, taken),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.contracts_made
            .cmp(&a.contracts_made)
            .then(b.times_taken.cmp(&a.times_taken))
            .then(a.name.cmp(&b.name))
    });
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentStats {
    pub user_id: Uuid,
    pub name: String,
    pub games_played: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerStats {
    pub user_id: Uuid,
    pub name: String,
    pub games_played: usize,
    pub wins: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchups {
    pub opponents: Vec<OpponentStats>,
    pub partners: Vec<PartnerStats>,
}

#[derive(Default)]
struct Record {
    games: usize,
    wins: usize,
    losses: usize,
}

/// How `user_id` fared against and alongside every other player, over
/// finished games
pub fn matchups(data: &Dataset, user_id: Uuid) -> Matchups {
    let names = data.names();
    let games = data.games_by_id();
    let seats = data.seats();

    let mut against: HashMap<Uuid, Record> = HashMap::new();
    let mut with: HashMap<Uuid, Record> = HashMap::new();

    for ((game_id, _), my_team) in seats.iter().filter(|((_, uid), _)| *uid == user_id) {
        let Some(game) = games.get(game_id).filter(|g| is_finished(g)) else {
            continue;
        };
        let winner = winning_team(game.points_team_a, game.points_team_b);

        for ((_, other), other_team) in seats
            .iter()
            .filter(|((gid, uid), _)| gid == game_id && *uid != user_id)
        {
            let record = if other_team == my_team {
                with.entry(*other).or_default()
            } else {
                against.entry(*other).or_default()
            };
            record.games += 1;
            match winner {
                Some(team) if team == *my_team => record.wins += 1,
                Some(_) => record.losses += 1,
                None => {}
            }
        }
    }

    let name_of = |id: &Uuid| names.get(id).cloned().unwrap_or_default();

    let mut opponents: Vec<OpponentStats> = against
        .into_iter()
        .map(|(id, r)| OpponentStats {
            name: name_of(&id),
            user_id: id,
            games_played: r.games,
            wins: r.wins,
            losses: r.losses,
            win_rate: rate(r.wins, r.games),
        })
        .collect();
    opponents.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.games_played.cmp(&a.games_played))
            .then(a.name.cmp(&b.name))
    });

    let mut partners: Vec<PartnerStats> = with
        .into_iter()
        .map(|(id, r)| PartnerStats {
            name: name_of(&id),
            user_id: id,
            games_played: r.games,
            wins: r.wins,
            win_rate: rate(r.wins, r.games),
        })
        .collect();
    partners.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.games_played.cmp(&a.games_played))
            .then(a.name.cmp(&b.name))
    });

    Matchups {
        opponents,
        partners,
    }
}
