// Per-round player statistics: position tags, match lineups and the
// season best XI.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::formation::Lineup;

// ---------------------------------------------------------------------------
// Position tag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PositionTag {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DF")]
    Defender,
    #[serde(rename = "MF")]
    Midfielder,
    #[serde(rename = "FW")]
    Forward,
    Bench,
}

impl PositionTag {
    /// Parse a statistics-table position. `대기` (and `Bench`/`SUB`) is the
    /// unused-substitute marker.
    pub fn from_label(label: &str) -> Option<PositionTag> {
        match label.trim() {
            "GK" => Some(PositionTag::Goalkeeper),
            "DF" => Some(PositionTag::Defender),
            "MF" => Some(PositionTag::Midfielder),
            "FW" => Some(PositionTag::Forward),
            "대기" | "Bench" | "SUB" => Some(PositionTag::Bench),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            PositionTag::Goalkeeper => "GK",
            PositionTag::Defender => "DF",
            PositionTag::Midfielder => "MF",
            PositionTag::Forward => "FW",
            PositionTag::Bench => "Bench",
        }
    }

    /// Sort key: goalkeeper, defence, midfield, attack, then bench.
    pub fn line_order(self) -> u8 {
        match self {
            PositionTag::Goalkeeper => 0,
            PositionTag::Defender => 1,
            PositionTag::Midfielder => 2,
            PositionTag::Forward => 3,
            PositionTag::Bench => 4,
        }
    }
}

impl fmt::Display for PositionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One player's line in one round's statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub round: u32,
    /// Full team name as printed in the table.
    pub team: String,
    pub player: String,
    pub position: PositionTag,
    /// Fractional minutes are kept as recorded.
    pub minutes: f64,
    pub shirt_number: Option<u32>,
}

/// Season minutes for one player, with the position they played most.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMinutes {
    pub player: String,
    pub position: PositionTag,
    pub minutes: f64,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Immutable per-round statistics table. Team lookups take a canonical team
/// key and match any full name containing it.
#[derive(Debug, Clone, Default)]
pub struct RosterTable {
    entries: Vec<RosterEntry>,
}

impl RosterTable {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        RosterTable { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn team_rows<'a>(&'a self, team_key: &'a str) -> impl Iterator<Item = &'a RosterEntry> + 'a {
        self.entries.iter().filter(move |e| e.team.contains(team_key))
    }

    /// All rows for one team in one round, bench included, in table order.
    pub fn match_entries<'a>(
        &'a self,
        round: u32,
        team_key: &'a str,
    ) -> impl Iterator<Item = &'a RosterEntry> + 'a {
        self.team_rows(team_key).filter(move |e| e.round == round)
    }

    /// Player → tag for a round. Later rows for the same player win.
    pub fn positions_for(&self, round: u32, team_key: &str) -> HashMap<String, PositionTag> {
        self.match_entries(round, team_key)
            .map(|e| (e.player.clone(), e.position))
            .collect()
    }

    /// Starting players of a round placed on their inferred formation.
    /// `None` when the round has no non-bench rows for the team.
    pub fn match_lineup(&self, round: u32, team_key: &str) -> Option<Lineup> {
        let players: Vec<(String, PositionTag)> = self
            .match_entries(round, team_key)
            .filter(|e| e.position != PositionTag::Bench)
            .map(|e| (e.player.clone(), e.position))
            .collect();
        if players.is_empty() {
            return None;
        }
        Some(Lineup::build(&players))
    }

    /// Total minutes per player across every round, most-played first.
    /// Each player's position is the one they logged most minutes in; ties
    /// keep whichever appeared first in the table.
    pub fn season_minutes(&self, team_key: &str) -> Vec<PlayerMinutes> {
        struct Acc {
            total: f64,
            by_position: Vec<(PositionTag, f64)>,
        }

        let mut order: Vec<String> = Vec::new();
        let mut acc: HashMap<String, Acc> = HashMap::new();
        for entry in self.team_rows(team_key) {
            let slot = acc.entry(entry.player.clone()).or_insert_with(|| {
                order.push(entry.player.clone());
                Acc {
                    total: 0.0,
                    by_position: Vec::new(),
                }
            });
            slot.total += entry.minutes;
            match slot.by_position.iter_mut().find(|(p, _)| *p == entry.position) {
                Some((_, m)) => *m += entry.minutes,
                None => slot.by_position.push((entry.position, entry.minutes)),
            }
        }

        let mut rows: Vec<PlayerMinutes> = order
            .into_iter()
            .filter_map(|player| {
                let a = acc.remove(&player)?;
                let mut dominant = a.by_position[0];
                for &(pos, mins) in &a.by_position[1..] {
                    if mins > dominant.1 {
                        dominant = (pos, mins);
                    }
                }
                Some(PlayerMinutes {
                    player,
                    position: dominant.0,
                    minutes: a.total,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.minutes.total_cmp(&a.minutes));
        rows
    }

    /// Season best XI: the most-used goalkeeper plus the ten most-used
    /// non-goalkeepers. `None` when there is no goalkeeper and fewer than
    /// ten others.
    pub fn best_eleven(&self, team_key: &str) -> Option<Lineup> {
        let minutes = self.season_minutes(team_key);
        let keeper = minutes
            .iter()
            .find(|m| m.position == PositionTag::Goalkeeper);
        let field: Vec<&PlayerMinutes> = minutes
            .iter()
            .filter(|m| m.position != PositionTag::Goalkeeper)
            .take(10)
            .collect();

        if keeper.is_none() && field.len() < 10 {
            debug!(team_key, field = field.len(), "not enough players for a best XI");
            return None;
        }

        let picks: Vec<(String, PositionTag)> = keeper
            .into_iter()
            .chain(field)
            .map(|m| (m.player.clone(), m.position))
            .collect();
        Some(Lineup::build(&picks))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
