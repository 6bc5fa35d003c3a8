// Explicit dataset initialization: derived events, the league-average
// snapshot, fixtures, the roster table and the absence list, built once
// after loading.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use kleague_core::absence::AbsenceTable;
use kleague_core::aggregate::{compare_game_ids, LeagueAverages};
use kleague_core::config::DataPaths;
use kleague_core::fixture::{match_options, Fixture, MatchOption};
use kleague_core::metrics::{derive, DerivedEvent};
use kleague_core::roster::RosterTable;

use crate::loader::{load_all, LoadError, RawData};

#[derive(Debug, Clone)]
pub struct Dataset {
    events: Vec<DerivedEvent>,
    league: LeagueAverages,
    fixtures: Vec<Fixture>,
    roster: RosterTable,
    absences: AbsenceTable,
}

impl Dataset {
    /// Load the configured CSV files under `base_dir` and initialize.
    pub fn load(base_dir: &Path, paths: &DataPaths) -> Result<Self, LoadError> {
        Ok(Dataset::initialize(load_all(base_dir, paths)?))
    }

    pub fn initialize(raw: RawData) -> Self {
        let events = derive(raw.events);
        let league = LeagueAverages::compute(&events);
        info!(
            events = events.len(),
            fixtures = raw.fixtures.len(),
            roster = raw.roster.len(),
            absences = raw.absences.len(),
            "dataset initialized"
        );
        info!(
            xg = league.xg,
            shots = league.shots,
            passes = league.passes,
            "league averages"
        );
        Dataset {
            events,
            league,
            fixtures: raw.fixtures,
            roster: RosterTable::new(raw.roster),
            absences: AbsenceTable::new(raw.absences),
        }
    }

    pub fn events(&self) -> &[DerivedEvent] {
        &self.events
    }

    pub fn league(&self) -> LeagueAverages {
        self.league
    }

    pub fn roster(&self) -> &RosterTable {
        &self.roster
    }

    pub fn absences(&self) -> &AbsenceTable {
        &self.absences
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Team names appearing in the event data, sorted.
    pub fn teams(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.team().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn fixture(&self, game_id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.game_id == game_id)
    }

    /// Every event of one game, in file order.
    pub fn game_events(&self, game_id: &str) -> Vec<DerivedEvent> {
        self.events
            .iter()
            .filter(|e| e.game_id() == game_id)
            .cloned()
            .collect()
    }

    /// Selector entries for `team`. Uses fixture metadata when present,
    /// otherwise one bare entry per game id in ascending order.
    pub fn match_options(&self, team: &str) -> Vec<MatchOption> {
        let options = match_options(&self.fixtures, team);
        if !options.is_empty() {
            return options;
        }
        let mut ids: Vec<&str> = self
            .events
            .iter()
            .filter(|e| e.team() == team)
            .map(|e| e.game_id())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        ids.sort_by(|a, b| compare_game_ids(a, b));
        ids.into_iter()
            .map(|id| MatchOption {
                game_id: id.to_string(),
                label: format!("Game {id}"),
            })
            .collect()
    }
}
