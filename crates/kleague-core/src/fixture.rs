// Fixture metadata (date, round, home/away) and match-selector labels.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub game_id: String,
    pub date: Option<NaiveDate>,
    pub round: Option<u32>,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn label_ko(self) -> &'static str {
        match self {
            Venue::Home => "홈",
            Venue::Away => "원정",
        }
    }
}

impl Fixture {
    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }

    /// Home when `team` is the listed home side, away otherwise.
    pub fn venue_for(&self, team: &str) -> Venue {
        if self.home == team {
            Venue::Home
        } else {
            Venue::Away
        }
    }

    pub fn opponent_of(&self, team: &str) -> &str {
        match self.venue_for(team) {
            Venue::Home => &self.away,
            Venue::Away => &self.home,
        }
    }

    /// Selector label, e.g. `vs 포항 스틸러스 (홈, 12R, 2024-05-04)`.
    pub fn label_for(&self, team: &str) -> String {
        let mut parts = vec![self.venue_for(team).label_ko().to_string()];
        if let Some(round) = self.round {
            parts.push(format!("{round}R"));
        }
        if let Some(date) = self.date {
            parts.push(date.format("%Y-%m-%d").to_string());
        }
        format!("vs {} ({})", self.opponent_of(team), parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOption {
    pub game_id: String,
    pub label: String,
}

/// Selectable games for `team`, by round then date. Fixtures without a
/// round sort first.
pub fn match_options(fixtures: &[Fixture], team: &str) -> Vec<MatchOption> {
    let mut own: Vec<&Fixture> = fixtures.iter().filter(|f| f.involves(team)).collect();
    own.sort_by_key(|f| (f.round.unwrap_or(0), f.date));
    own.into_iter()
        .map(|f| MatchOption {
            game_id: f.game_id.clone(),
            label: f.label_for(team),
        })
        .collect()
}
