// Match totals, results, and league/team per-game averages.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::metrics::DerivedEvent;

// ---------------------------------------------------------------------------
// Match totals
// ---------------------------------------------------------------------------

/// Box-score figures for one side of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchTotals {
    pub goals: usize,
    pub xg: f64,
    pub shots: usize,
    pub on_target: usize,
    pub passes: usize,
    pub successful_passes: usize,
    /// Truncated integer percentage; 0 without passes.
    pub pass_accuracy: u32,
}

impl MatchTotals {
    pub fn compute<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a DerivedEvent>,
    {
        let mut totals = MatchTotals::default();
        for e in events {
            if e.event.is_goal() {
                totals.goals += 1;
            }
            totals.xg += e.xg;
            if e.kind().is_shot_attempt() {
                totals.shots += 1;
            }
            if e.event.is_on_target() {
                totals.on_target += 1;
            }
            if e.kind().is_pass() {
                totals.passes += 1;
                if e.event.is_successful() {
                    totals.successful_passes += 1;
                }
            }
        }
        totals.pass_accuracy = if totals.passes == 0 {
            0
        } else {
            (totals.successful_passes * 100 / totals.passes) as u32
        };
        totals
    }

    /// Totals for `team` within the batch.
    pub fn for_team<'a, I>(events: I, team: &str) -> Self
    where
        I: IntoIterator<Item = &'a DerivedEvent>,
    {
        MatchTotals::compute(events.into_iter().filter(|e| e.team() == team))
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn from_score(goals_for: usize, goals_against: usize) -> Self {
        use std::cmp::Ordering::*;
        match goals_for.cmp(&goals_against) {
            Greater => MatchResult::Win,
            Equal => MatchResult::Draw,
            Less => MatchResult::Loss,
        }
    }

    /// Korean label used in the chat context.
    pub fn label_ko(self) -> &'static str {
        match self {
            MatchResult::Win => "승리",
            MatchResult::Draw => "무승부",
            MatchResult::Loss => "패배",
        }
    }
}

// ---------------------------------------------------------------------------
// League averages
// ---------------------------------------------------------------------------

/// Mean per (game, team) pair over the whole dataset. Built once at load
/// and handed to consumers by reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub xg: f64,
    pub shots: f64,
    pub passes: f64,
}

impl LeagueAverages {
    pub fn compute<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a DerivedEvent>,
    {
        #[derive(Default)]
        struct Pair {
            xg: f64,
            shots: usize,
            passes: usize,
        }

        let mut pairs: BTreeMap<(&str, &str), Pair> = BTreeMap::new();
        for e in events {
            let pair = pairs.entry((e.game_id(), e.team())).or_default();
            pair.xg += e.xg;
            if e.kind().is_shot_attempt() {
                pair.shots += 1;
            }
            if e.kind().is_pass() {
                pair.passes += 1;
            }
        }

        if pairs.is_empty() {
            return LeagueAverages::default();
        }
        let n = pairs.len() as f64;
        LeagueAverages {
            xg: pairs.values().map(|p| p.xg).sum::<f64>() / n,
            shots: pairs.values().map(|p| p.shots as f64).sum::<f64>() / n,
            passes: pairs.values().map(|p| p.passes as f64).sum::<f64>() / n,
        }
    }
}

// ---------------------------------------------------------------------------
// Team averages
// ---------------------------------------------------------------------------

/// Per-game averages for one team over the games in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamAverages {
    pub games: usize,
    pub goals: f64,
    pub xg: f64,
    pub shots: f64,
    pub passes: f64,
}

impl TeamAverages {
    /// `None` when the team has no events in the batch.
    pub fn compute<'a, I>(events: I, team: &str) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DerivedEvent>,
    {
        let team_events: Vec<&DerivedEvent> =
            events.into_iter().filter(|e| e.team() == team).collect();
        let games = team_events
            .iter()
            .map(|e| e.game_id())
            .collect::<HashSet<_>>()
            .len();
        if games == 0 {
            return None;
        }
        let totals = MatchTotals::compute(team_events.iter().copied());
        let n = games as f64;
        Some(TeamAverages {
            games,
            goals: totals.goals as f64 / n,
            xg: totals.xg / n,
            shots: totals.shots as f64 / n,
            passes: totals.passes as f64 / n,
        })
    }
}
