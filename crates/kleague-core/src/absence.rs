// Player absences: injuries, suspensions and call-ups from the season feed.
//
// The feed names clubs in English; callers pass the feed names for a team
// (see `teams::absence_feed_names`).

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Reason classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbsenceKind {
    Suspension,
    #[serde(rename = "International Duty")]
    InternationalDuty,
    Fitness,
    Injury,
}

const SUSPENSION_WORDS: [&str; 3] = ["card", "suspension", "red"];
const INTERNATIONAL_WORDS: [&str; 3] = ["international", "national", "selection"];

impl AbsenceKind {
    /// Classify a free-text reason, case-insensitively. Anything unrecognized
    /// is an injury.
    pub fn classify(reason: &str) -> Self {
        let r = reason.to_lowercase();
        if SUSPENSION_WORDS.iter().any(|w| r.contains(w)) {
            AbsenceKind::Suspension
        } else if INTERNATIONAL_WORDS.iter().any(|w| r.contains(w)) {
            AbsenceKind::InternationalDuty
        } else if r.contains("fitness") {
            AbsenceKind::Fitness
        } else {
            AbsenceKind::Injury
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AbsenceKind::Suspension => "Suspension",
            AbsenceKind::InternationalDuty => "International Duty",
            AbsenceKind::Fitness => "Fitness",
            AbsenceKind::Injury => "Injury",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Absence {
    /// Club name as written in the feed.
    pub team: String,
    pub player: String,
    pub reason: String,
    pub kind: AbsenceKind,
    pub games_missed: u32,
    pub start: Option<NaiveDate>,
    /// `None` while the player is still out.
    pub end: Option<NaiveDate>,
}

impl Absence {
    /// Out on `date`: started on or before it and not yet ended. An absence
    /// without a start date never matches.
    pub fn covers(&self, date: NaiveDate) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        start <= date && self.end.map_or(true, |end| end >= date)
    }
}

const DAY_FIRST_FORMATS: [&str; 7] = [
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%Y-%m-%d",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a feed date, day before month ("05/03/2024" is 5 March). ISO dates
/// are accepted too. A trailing time part is ignored.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let date_only = value.split_whitespace().next().unwrap_or(value);
    [value, date_only].into_iter().find_map(|candidate| {
        DAY_FIRST_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
    })
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AbsenceTable {
    entries: Vec<Absence>,
}

impl AbsenceTable {
    pub fn new(entries: Vec<Absence>) -> Self {
        AbsenceTable { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn team_rows<'a>(&'a self, feed_names: &'a [String]) -> impl Iterator<Item = &'a Absence> + 'a {
        self.entries
            .iter()
            .filter(move |a| feed_names.iter().any(|n| *n == a.team))
    }

    /// Every absence of the season for a team, most games missed first.
    /// Ties keep feed order.
    pub fn season(&self, feed_names: &[String]) -> Vec<Absence> {
        let mut rows: Vec<Absence> = self.team_rows(feed_names).cloned().collect();
        rows.sort_by(|a, b| b.games_missed.cmp(&a.games_missed));
        rows
    }

    /// Absences in effect on `date`, in feed order.
    pub fn on_date(&self, feed_names: &[String], date: NaiveDate) -> Vec<Absence> {
        let rows: Vec<Absence> = self
            .team_rows(feed_names)
            .filter(|a| a.covers(date))
            .cloned()
            .collect();
        debug!(%date, count = rows.len(), "absences on match date");
        rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn absence(team: &str, player: &str, reason: &str, games: u32, start: &str, end: &str) -> Absence {
        Absence {
            team: team.into(),
            player: player.into(),
            reason: reason.into(),
            kind: AbsenceKind::classify(reason),
            games_missed: games,
            start: parse_day_first(start),
            end: parse_day_first(end),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reasons_classify_by_keyword() {
        assert_eq!(AbsenceKind::classify("Red card"), AbsenceKind::Suspension);
        assert_eq!(AbsenceKind::classify("Yellow Card Suspension"), AbsenceKind::Suspension);
        assert_eq!(AbsenceKind::classify("National team"), AbsenceKind::InternationalDuty);
        assert_eq!(AbsenceKind::classify("U-23 Selection"), AbsenceKind::InternationalDuty);
        assert_eq!(AbsenceKind::classify("Lack of fitness"), AbsenceKind::Fitness);
        assert_eq!(AbsenceKind::classify("Hamstring injury"), AbsenceKind::Injury);
        assert_eq!(AbsenceKind::classify(""), AbsenceKind::Injury);
    }

    #[test]
    fn suspension_wins_over_other_keywords() {
        // Card words are checked first.
        assert_eq!(AbsenceKind::classify("Red card (international)"), AbsenceKind::Suspension);
        assert_eq!(AbsenceKind::InternationalDuty.label(), "International Duty");
    }

    #[test]
    fn dates_parse_day_first() {
        assert_eq!(parse_day_first("05/03/2024"), Some(date("2024-03-05")));
        assert_eq!(parse_day_first("5-3-2024"), Some(date("2024-03-05")));
        assert_eq!(parse_day_first("2024-03-05"), Some(date("2024-03-05")));
        assert_eq!(parse_day_first("05/03/2024 00:00"), Some(date("2024-03-05")));
        assert_eq!(parse_day_first("12 Apr 2024"), Some(date("2024-04-12")));
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("unknown"), None);
    }

    #[test]
    fn window_includes_both_bounds() {
        let a = absence("Ulsan HD FC", "A", "Knee", 3, "01/03/2024", "10/03/2024");
        assert!(a.covers(date("2024-03-01")));
        assert!(a.covers(date("2024-03-10")));
        assert!(!a.covers(date("2024-02-29")));
        assert!(!a.covers(date("2024-03-11")));
    }

    #[test]
    fn open_ended_absence_covers_every_later_date() {
        let a = absence("Ulsan HD FC", "A", "ACL", 20, "15/04/2024", "");
        assert!(a.end.is_none());
        assert!(a.covers(date("2024-04-15")));
        assert!(a.covers(date("2024-11-30")));
        assert!(!a.covers(date("2024-04-14")));
    }

    #[test]
    fn missing_start_never_matches() {
        let a = absence("Ulsan HD FC", "A", "Knee", 3, "", "10/03/2024");
        assert!(!a.covers(date("2024-03-05")));
    }

    #[test]
    fn season_list_sorted_by_games_missed() {
        let table = AbsenceTable::new(vec![
            absence("Ulsan HD FC", "A", "Knee", 2, "01/03/2024", "10/03/2024"),
            absence("Pohang Steelers", "P", "Knee", 30, "01/03/2024", ""),
            absence("Ulsan Hyundai", "B", "Red card", 1, "01/04/2024", "08/04/2024"),
            absence("Ulsan HD FC", "C", "ACL", 15, "01/05/2024", ""),
        ]);
        let season = table.season(&names(&["Ulsan HD FC", "Ulsan Hyundai"]));
        let order: Vec<&str> = season.iter().map(|a| a.player.as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);
        assert!(table.season(&[]).is_empty());
    }

    #[test]
    fn match_list_filters_team_and_date() {
        let table = AbsenceTable::new(vec![
            absence("Ulsan HD FC", "A", "Knee", 2, "01/03/2024", "10/03/2024"),
            absence("Ulsan HD FC", "B", "National team", 1, "20/03/2024", "27/03/2024"),
            absence("Ulsan HD FC", "C", "ACL", 15, "01/02/2024", ""),
            absence("Pohang Steelers", "P", "Knee", 30, "01/03/2024", ""),
        ]);
        let ulsan = names(&["Ulsan HD FC"]);
        let out: Vec<String> = table
            .on_date(&ulsan, date("2024-03-05"))
            .into_iter()
            .map(|a| a.player)
            .collect();
        assert_eq!(out, ["A", "C"]);
        assert!(table.on_date(&names(&["FC Seoul"]), date("2024-03-05")).is_empty());
    }
}
