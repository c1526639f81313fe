//! Ranking of teammate pairs ("duos")
//!
//! Each finished game a duo played together yields a note of
//! `2 · team_points / (points_a + points_b)`, so 1.0 is an even game. Notes
//! are ordered most recent first and combined as
//!
//! ```text
//! score   = (Σ note^α · e^(λ·i) / Σ e^(λ·i)) · (1 − e^(−k·n))
//! display = A + B · ln(score)        (only when score > 0)
//! ```
//!
//! Recent games weigh more, and duos with few games are pulled down by the
//! confidence factor.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game_management::scoring::Team;
use crate::statistics::aggregates::{is_finished, round_to, team_points, Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuoRankingParams {
    pub alpha: f64,
    pub lambda: f64,
    pub k: f64,
    pub a: f64,
    pub b: f64,
    pub min_games: usize,
    /// 0 keeps every duo
    pub limit: usize,
}

impl Default for DuoRankingParams {
    fn default() -> Self {
        Self {
            alpha: 2.0,
            lambda: -0.2,
            k: 0.3,
            a: 100.0,
            b: 100.0,
            min_games: 1,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuoRanking {
    pub duo_name: String,
    pub user_ids: (Uuid, Uuid),
    pub games_played: usize,
    pub score_raw: f64,
    pub note_display: Option<f64>,
}

/// Weighted score of a duo; `notes` must be ordered most recent first
pub fn weighted_score(notes: &[f64], params: &DuoRankingParams) -> f64 {
    if notes.is_empty() {
        return 0.0;
    }

    let (num, den) = notes
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, note)| {
            let valued = if *note > 0.0 {
                note.powf(params.alpha)
            } else {
                0.0
            };
            let weight = (params.lambda * i as f64).exp();
            (num + valued * weight, den + weight)
        });

    let base = if den > 0.0 { num / den } else { 0.0 };
    let confidence = 1.0 - (-params.k * notes.len() as f64).exp();
    base * confidence
}

/// Rank every duo that played at least `min_games` finished games together
pub fn duo_rankings(data: &Dataset, params: &DuoRankingParams) -> Vec<DuoRanking> {
    let games = data.games_by_id();
    let names = data.names();

    // (updated_at, note) per duo, keyed with the smaller id first
    let mut notes: HashMap<(Uuid, Uuid), Vec<(DateTime<FixedOffset>, f64)>> = HashMap::new();

    for first in &data.players {
        let Some(game) = games.get(&first.game_id).filter(|g| is_finished(g)) else {
            continue;
        };
        let total = game.points_team_a + game.points_team_b;
        if total <= 0 {
            continue;
        }
        let Ok(team) = first.team.parse::<Team>() else {
            continue;
        };

        for second in data.players.iter().filter(|p| {
            p.game_id == first.game_id && p.team == first.team && p.user_id > first.user_id
        }) {
            let note = 2.0 * f64::from(team_points(game, team)) / f64::from(total);
            notes
                .entry((first.user_id, second.user_id))
                .or_default()
                .push((game.updated_at, note));
        }
    }

    let name_of = |id: &Uuid| names.get(id).cloned().unwrap_or_default();

    let mut rankings: Vec<DuoRanking> = notes
        .into_iter()
        .filter(|(_, history)| history.len() >= params.min_games)
        .map(|((first, second), mut history)| {
            history.sort_by(|a, b| b.0.cmp(&a.0));
            let values: Vec<f64> = history.iter().map(|(_, note)| *note).collect();
            let score = weighted_score(&values, params);
            let display = (score > 0.0).then(|| round_to(params.a + params.b * score.ln(), 2));

            DuoRanking {
                duo_name: format!("{} & {}", name_of(&first), name_of(&second)),
                user_ids: (first, second),
                games_played: values.len(),
                score_raw: round_to(score, 3),
                note_display: display,
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.score_raw
            .total_cmp(&a.score_raw)
            .then(b.games_played.cmp(&a.games_played))
            .then(a.duo_name.cmp(&b.duo_name))
    });
    if params.limit > 0 {
        rankings.truncate(params.limit);
    }
    rankings
}
