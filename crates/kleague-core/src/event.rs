// Raw match events and the closed enumerations their labels parse into.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Pitch constants
// ---------------------------------------------------------------------------

/// Pitch length in metres (x axis, own goal-line at 0).
pub const PITCH_LENGTH: f64 = 105.0;

/// Pitch width in metres (y axis, left touchline at 0).
pub const PITCH_WIDTH: f64 = 68.0;

/// Value used for any coordinate the source did not provide.
pub const DEFAULT_COORDINATE: f64 = 50.0;

/// A location on the pitch in the 105x68 convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchPoint {
    pub x: f64,
    pub y: f64,
}

impl PitchPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Swap axes for the portrait pitch used by lineup and shot-map views.
    pub fn transposed(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl Default for PitchPoint {
    fn default() -> Self {
        Self::new(DEFAULT_COORDINATE, DEFAULT_COORDINATE)
    }
}

// ---------------------------------------------------------------------------
// Event kind
// ---------------------------------------------------------------------------

/// Action type of an event (`type_name` in the source data).
///
/// Labels the analytics never branch on are kept verbatim in `Other` so no
/// event is lost at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Pass,
    Shot,
    Goal,
    Duel,
    Tackle,
    Interception,
    Recovery,
    Other(String),
}

impl EventKind {
    /// Parse a source label. Matching is exact after trimming, as in the feed.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Pass" => EventKind::Pass,
            "Shot" => EventKind::Shot,
            "Goal" => EventKind::Goal,
            "Duel" => EventKind::Duel,
            "Tackle" => EventKind::Tackle,
            "Interception" => EventKind::Interception,
            "Recovery" => EventKind::Recovery,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EventKind::Pass => "Pass",
            EventKind::Shot => "Shot",
            EventKind::Goal => "Goal",
            EventKind::Duel => "Duel",
            EventKind::Tackle => "Tackle",
            EventKind::Interception => "Interception",
            EventKind::Recovery => "Recovery",
            EventKind::Other(s) => s,
        }
    }

    /// Shot attempts: both `Shot` and `Goal` rows count.
    pub fn is_shot_attempt(&self) -> bool {
        matches!(self, EventKind::Shot | EventKind::Goal)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, EventKind::Pass)
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        EventKind::from_label(&s)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.label().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result label of an event (`result_name` in the source data).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Successful,
    Unsuccessful,
    Goal,
    Saved,
    Other(String),
}

impl Outcome {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Successful" => Outcome::Successful,
            "Unsuccessful" => Outcome::Unsuccessful,
            "Goal" => Outcome::Goal,
            "Saved" => Outcome::Saved,
            other => Outcome::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Outcome::Successful => "Successful",
            Outcome::Unsuccessful => "Unsuccessful",
            Outcome::Goal => "Goal",
            Outcome::Saved => "Saved",
            Outcome::Other(s) => s,
        }
    }

    /// Goals and saved attempts both count as on target.
    pub fn is_on_target(&self) -> bool {
        matches!(self, Outcome::Goal | Outcome::Saved)
    }
}

impl From<String> for Outcome {
    fn from(s: String) -> Self {
        Outcome::from_label(&s)
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One raw action record, already parsed by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub game_id: String,
    pub team: String,
    pub player: String,
    /// 1 or 2.
    pub period: u8,
    /// Seconds since the start of `period`.
    pub time_seconds: f64,
    pub kind: EventKind,
    pub outcome: Option<Outcome>,
    pub start: PitchPoint,
    pub end: PitchPoint,
}

impl Event {
    pub fn is_goal(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Goal))
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Successful))
    }

    pub fn is_on_target(&self) -> bool {
        self.outcome.as_ref().is_some_and(Outcome::is_on_target)
    }

    pub fn is_forward_pass(&self) -> bool {
        self.kind.is_pass() && self.end.x > self.start.x
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_parse_to_variants() {
        assert_eq!(EventKind::from_label("Pass"), EventKind::Pass);
        assert_eq!(EventKind::from_label(" Goal "), EventKind::Goal);
        assert_eq!(Outcome::from_label("Saved"), Outcome::Saved);
    }

    #[test]
    fn unknown_labels_are_preserved() {
        let kind = EventKind::from_label("Clearance");
        assert_eq!(kind, EventKind::Other("Clearance".to_string()));
        assert_eq!(kind.label(), "Clearance");
        assert!(!kind.is_shot_attempt());
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert_eq!(EventKind::from_label("pass"), EventKind::Other("pass".into()));
    }

    #[test]
    fn shot_attempts_include_goals() {
        assert!(EventKind::Shot.is_shot_attempt());
        assert!(EventKind::Goal.is_shot_attempt());
        assert!(!EventKind::Pass.is_shot_attempt());
    }

    #[test]
    fn on_target_outcomes() {
        assert!(Outcome::Goal.is_on_target());
        assert!(Outcome::Saved.is_on_target());
        assert!(!Outcome::Successful.is_on_target());
    }

    #[test]
    fn kind_serializes_as_label() {
        let json = serde_json::to_string(&EventKind::Interception).unwrap();
        assert_eq!(json, "\"Interception\"");
        let back: EventKind = serde_json::from_str("\"Offside\"").unwrap();
        assert_eq!(back, EventKind::Other("Offside".into()));
    }

    #[test]
    fn transposed_swaps_axes() {
        let p = PitchPoint::new(5.0, 34.0).transposed();
        assert_eq!(p, PitchPoint::new(34.0, 5.0));
    }
}
