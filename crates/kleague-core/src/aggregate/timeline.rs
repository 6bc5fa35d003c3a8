// Time-ordered rollups: cumulative xG, form trend and the recent-games window.

use serde::Serialize;
use std::collections::HashMap;

use crate::metrics::DerivedEvent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XgPoint {
    /// Match minute (fractional).
    pub minute: f64,
    pub cumulative_xg: f64,
}

/// Running xG of `team`'s shot attempts by match time. Always starts with an
/// origin point at (0, 0).
pub fn cumulative_xg<'a, I>(events: I, team: &str) -> Vec<XgPoint>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut shots: Vec<&DerivedEvent> = events
        .into_iter()
        .filter(|e| e.team() == team && e.kind().is_shot_attempt())
        .collect();
    shots.sort_by(|a, b| a.normalized_time.total_cmp(&b.normalized_time));

    let mut points = Vec::with_capacity(shots.len() + 1);
    points.push(XgPoint {
        minute: 0.0,
        cumulative_xg: 0.0,
    });
    let mut running = 0.0;
    for shot in shots {
        running += shot.xg;
        points.push(XgPoint {
            minute: shot.normalized_time / 60.0,
            cumulative_xg: running,
        });
    }
    points
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormPoint {
    /// 1-based position in the trend.
    pub match_number: usize,
    pub game_id: String,
    pub goals: usize,
    pub xg: f64,
}

/// Goals and xG per game in the batch, in ascending game-id order.
pub fn form_trend<'a, I>(events: I) -> Vec<FormPoint>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut per_game: HashMap<&str, (usize, f64)> = HashMap::new();
    for e in events {
        let acc = per_game.entry(e.game_id()).or_insert((0, 0.0));
        if e.event.is_goal() {
            acc.0 += 1;
        }
        acc.1 += e.xg;
    }
    let mut games: Vec<(&str, (usize, f64))> = per_game.into_iter().collect();
    games.sort_by(|a, b| super::compare_game_ids(a.0, b.0));
    games
        .into_iter()
        .enumerate()
        .map(|(i, (game_id, (goals, xg)))| FormPoint {
            match_number: i + 1,
            game_id: game_id.to_string(),
            goals,
            xg,
        })
        .collect()
}

/// `team`'s `n` most recent game ids, newest first.
pub fn recent_game_ids<'a, I>(events: I, team: &str, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut ids = super::distinct_games(events.into_iter().filter(|e| e.team() == team));
    ids.sort_by(|a, b| super::compare_game_ids(b, a));
    ids.into_iter().take(n).map(str::to_string).collect()
}

/// `team`'s own events from its `n` most recent games, in batch order.
pub fn recent_window<'a>(events: &'a [DerivedEvent], team: &str, n: usize) -> Vec<&'a DerivedEvent> {
    let ids = recent_game_ids(events, team, n);
    events
        .iter()
        .filter(|e| e.team() == team && ids.iter().any(|id| id == e.game_id()))
        .collect()
}
