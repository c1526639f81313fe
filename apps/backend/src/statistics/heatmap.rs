//! Month activity heatmap: games created per day, laid out as weeks ×
//! weekdays with Monday first.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::entity::games;

const WEEKDAYS: [&str; 7] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"];

const MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    /// Weekday labels (columns)
    pub x: Vec<String>,
    /// Week labels (rows)
    pub y: Vec<String>,
    /// Games per cell; `None` for cells outside the month
    pub z: Vec<Vec<Option<usize>>>,
    pub text: Vec<Vec<String>>,
    pub title: String,
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Number of games created on each day of the month
pub fn games_per_day(games_list: &[games::Model], year: i32, month: u32) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for game in games_list {
        let date = game.created_at.date_naive();
        if date.year() == year && date.month() == month {
            *counts.entry(date.day()).or_insert(0) += 1;
        }
    }
    counts
}

fn cell_label(day: u32, month_name: &str, count: usize) -> String {
    let games = match count {
        0 => "Aucune partie".to_string(),
        1 => "1 partie".to_string(),
        n => format!("{n} parties"),
    };
    format!("{day:02} {month_name} : {games}")
}

/// Lay out a month; `None` when `year`/`month` is not a valid month
pub fn build_heatmap(year: i32, month: u32, counts: &HashMap<u32, usize>) -> Option<Heatmap> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last_day = days_in_month(year, month)?;
    let month_name = MONTHS[month as usize - 1];
    let offset = first.weekday().num_days_from_monday();

    let weeks = ((last_day - 1 + offset) / 7 + 1) as usize;
    let mut z = vec![vec![None; 7]; weeks];
    let mut text = vec![vec![String::new(); 7]; weeks];

    for day in 1..=last_day {
        let position = day - 1 + offset;
        let (week, weekday) = ((position / 7) as usize, (position % 7) as usize);
        let count = counts.get(&day).copied().unwrap_or(0);
        z[week][weekday] = Some(count);
        text[week][weekday] = cell_label(day, month_name, count);
    }

    Some(Heatmap {
        x: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        y: (1..=weeks).map(|w| format!("Semaine {w}")).collect(),
        z,
        text,
        title: format!("Activité du mois - {month_name} {year}"),
    })
}
