// CSV loading for event data, fixture metadata, per-round player stats and
// the season absence list.
//
// Each file has a private reader-based loader so tests can feed in-memory
// CSV. Rows that fail to deserialize are skipped with a warning; only I/O
// and header failures abort a load.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use kleague_core::absence::{parse_day_first, Absence, AbsenceKind};
use kleague_core::config::DataPaths;
use kleague_core::event::{Event, EventKind, Outcome, PitchPoint, DEFAULT_COORDINATE};
use kleague_core::fixture::Fixture;
use kleague_core::roster::{PositionTag, RosterEntry};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Everything read from disk, before any derivation.
#[derive(Debug, Clone, Default)]
pub struct RawData {
    pub events: Vec<Event>,
    pub fixtures: Vec<Fixture>,
    pub roster: Vec<RosterEntry>,
    pub absences: Vec<Absence>,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawEvent {
    game_id: String,
    #[serde(alias = "team")]
    team_name_ko: String,
    #[serde(alias = "player", default)]
    player_name_ko: String,
    #[serde(default)]
    period_id: Option<f64>,
    #[serde(default)]
    time_seconds: Option<f64>,
    #[serde(alias = "type")]
    type_name: String,
    #[serde(alias = "result", default)]
    result_name: Option<String>,
    #[serde(default)]
    start_x: Option<f64>,
    #[serde(default)]
    start_y: Option<f64>,
    #[serde(default)]
    end_x: Option<f64>,
    #[serde(default)]
    end_y: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    game_id: String,
    #[serde(default)]
    game_date: Option<String>,
    #[serde(default)]
    game_day: Option<String>,
    home_team_name_ko: String,
    away_team_name_ko: String,
}

#[derive(Debug, Deserialize)]
struct RawStatRow {
    #[serde(rename = "라운드", alias = "round")]
    round: String,
    #[serde(rename = "팀명", alias = "team")]
    team: String,
    #[serde(rename = "선수명", alias = "player")]
    player: String,
    #[serde(rename = "포지션", alias = "position")]
    position: String,
    #[serde(rename = "출전시간(분)", alias = "minutes", default)]
    minutes: Option<String>,
    #[serde(rename = "등번호", alias = "shirt_number", default)]
    shirt_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAbsence {
    #[serde(rename = "Team", alias = "team")]
    team: String,
    #[serde(rename = "Ko_name", alias = "player")]
    player: String,
    #[serde(rename = "Reason", alias = "reason", default)]
    reason: String,
    #[serde(rename = "Games_Missed", alias = "games_missed", default)]
    games_missed: Option<String>,
    #[serde(rename = "Start_Date", alias = "start_date", default)]
    start_date: Option<String>,
    #[serde(rename = "End_Date", alias = "end_date", default)]
    end_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn coordinate(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(DEFAULT_COORDINATE)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Leading digits of a round label: "12R" -> 12, "라운드 3" -> 3, none -> 0.
pub(crate) fn round_number(label: &str) -> u32 {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Minutes played, fractions kept; anything non-numeric counts as 0.
fn minutes(value: Option<String>) -> f64 {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|m| m.is_finite() && *m > 0.0)
        .unwrap_or(0.0)
}

/// Whole games missed; blank or non-numeric counts as 0.
fn games_missed(value: Option<String>) -> u32 {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|g| g.is_finite() && *g > 0.0)
        .map_or(0, |g| g as u32)
}

/// Date part of `2024-03-01` or `2024-03-01 14:00:00`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_events_from_reader<R: Read>(rdr: R) -> Result<Vec<Event>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut events = Vec::new();
    for result in reader.deserialize::<RawEvent>() {
        match result {
            Ok(raw) => {
                let period = raw.period_id.filter(|p| p.is_finite()).unwrap_or(1.0);
                events.push(Event {
                    game_id: raw.game_id.trim().to_string(),
                    team: raw.team_name_ko.trim().to_string(),
                    player: raw.player_name_ko.trim().to_string(),
                    period: period.clamp(0.0, u8::MAX as f64) as u8,
                    time_seconds: raw.time_seconds.filter(|t| t.is_finite()).unwrap_or(0.0),
                    kind: EventKind::from_label(&raw.type_name),
                    outcome: non_blank(raw.result_name).map(|r| Outcome::from_label(&r)),
                    start: PitchPoint::new(coordinate(raw.start_x), coordinate(raw.start_y)),
                    end: PitchPoint::new(coordinate(raw.end_x), coordinate(raw.end_y)),
                });
            }
            Err(e) => warn!("skipping malformed event row: {}", e),
        }
    }
    Ok(events)
}

fn load_fixtures_from_reader<R: Read>(rdr: R) -> Result<Vec<Fixture>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut fixtures: Vec<Fixture> = Vec::new();
    for result in reader.deserialize::<RawFixture>() {
        match result {
            Ok(raw) => {
                let game_id = raw.game_id.trim().to_string();
                if fixtures.iter().any(|f| f.game_id == game_id) {
                    continue;
                }
                fixtures.push(Fixture {
                    game_id,
                    date: raw.game_date.as_deref().and_then(parse_date),
                    round: non_blank(raw.game_day).and_then(|d| d.parse::<f64>().ok()).map(|d| d as u32),
                    home: raw.home_team_name_ko.trim().to_string(),
                    away: raw.away_team_name_ko.trim().to_string(),
                });
            }
            Err(e) => warn!("skipping malformed match-info row: {}", e),
        }
    }
    Ok(fixtures)
}

fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawStatRow>() {
        match result {
            Ok(raw) => {
                let Some(position) = PositionTag::from_label(&raw.position) else {
                    warn!(
                        "skipping stats row for '{}': unknown position '{}'",
                        raw.player.trim(),
                        raw.position
                    );
                    continue;
                };
                entries.push(RosterEntry {
                    round: round_number(&raw.round),
                    team: raw.team.trim().to_string(),
                    player: raw.player.trim().to_string(),
                    position,
                    minutes: minutes(raw.minutes),
                    shirt_number: non_blank(raw.shirt_number).and_then(|n| n.parse().ok()),
                });
            }
            Err(e) => warn!("skipping malformed stats row: {}", e),
        }
    }
    Ok(entries)
}

fn load_absences_from_reader<R: Read>(rdr: R) -> Result<Vec<Absence>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut absences = Vec::new();
    for result in reader.deserialize::<RawAbsence>() {
        match result {
            Ok(raw) => {
                let reason = raw.reason.trim().to_string();
                absences.push(Absence {
                    team: raw.team.trim().to_string(),
                    player: raw.player.trim().to_string(),
                    kind: AbsenceKind::classify(&reason),
                    reason,
                    games_missed: games_missed(raw.games_missed),
                    start: raw.start_date.as_deref().and_then(parse_day_first),
                    end: raw.end_date.as_deref().and_then(parse_day_first),
                });
            }
            Err(e) => warn!("skipping malformed absence row: {}", e),
        }
    }
    Ok(absences)
}

// ---------------------------------------------------------------------------
// Public file-based loaders
// ---------------------------------------------------------------------------

/// Read a CSV file as text. UTF-8 (with or without BOM) is tried first;
/// files that are not valid UTF-8 are decoded as CP949, the legacy Korean
/// Windows encoding.
fn read_text(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(decode_csv_bytes(&bytes, path))
}

fn decode_csv_bytes(bytes: &[u8], path: &Path) -> String {
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text.into_owned();
    }
    // encoding_rs's EUC_KR is the WHATWG euc-kr, i.e. Windows code page 949.
    let (text, malformed) = encoding_rs::EUC_KR.decode_without_bom_handling(bytes);
    if malformed {
        warn!("{} is neither UTF-8 nor CP949; undecodable bytes replaced", path.display());
    } else {
        debug!("decoded {} as CP949", path.display());
    }
    text.into_owned()
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> LoadError + '_ {
    move |e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_events(path: &Path) -> Result<Vec<Event>, LoadError> {
    load_events_from_reader(read_text(path)?.as_bytes()).map_err(csv_error(path))
}

pub fn load_fixtures(path: &Path) -> Result<Vec<Fixture>, LoadError> {
    load_fixtures_from_reader(read_text(path)?.as_bytes()).map_err(csv_error(path))
}

pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, LoadError> {
    load_roster_from_reader(read_text(path)?.as_bytes()).map_err(csv_error(path))
}

pub fn load_absences(path: &Path) -> Result<Vec<Absence>, LoadError> {
    load_absences_from_reader(read_text(path)?.as_bytes()).map_err(csv_error(path))
}

/// Load every configured file. Paths are resolved against `base_dir`. The
/// event file is required; a missing match-info, stats or absence file
/// yields an empty table with a warning.
pub fn load_all(base_dir: &Path, paths: &DataPaths) -> Result<RawData, LoadError> {
    let events = load_events(&base_dir.join(&paths.events))?;
    info!("Loaded {} events from {}", events.len(), paths.events);

    let fixtures = match load_fixtures(&base_dir.join(&paths.matches)) {
        Ok(f) => f,
        Err(LoadError::Io { path, source }) => {
            warn!("match info unavailable at {}: {}", path, source);
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    info!("Loaded {} fixtures", fixtures.len());

    let roster = match load_roster(&base_dir.join(&paths.player_stats)) {
        Ok(r) => r,
        Err(LoadError::Io { path, source }) => {
            warn!("player stats unavailable at {}: {}", path, source);
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    info!("Loaded {} roster rows", roster.len());

    let absences = match load_absences(&base_dir.join(&paths.absences)) {
        Ok(a) => a,
        Err(LoadError::Io { path, source }) => {
            warn!("absence list unavailable at {}: {}", path, source);
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    info!("Loaded {} absences", absences.len());

    Ok(RawData {
        events,
        fixtures,
        roster,
        absences,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fill_blank_fields() {
        let csv = "\
game_id,team_name_ko,player_name_ko,period_id,time_seconds,type_name,result_name,start_x,start_y,end_x,end_y,action_id
126283,울산 HD FC,이청용,1,12.5,Pass,Successful,40.0,30.0,55.0,32.0,1
126283,울산 HD FC,주민규,,3000,Shot,,90.0,,,,2
";
        let events = load_events_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].kind, EventKind::Pass);
        assert_eq!(events[0].outcome, Some(Outcome::Successful));
        assert_eq!(events[0].end, PitchPoint::new(55.0, 32.0));

        let shot = &events[1];
        assert_eq!(shot.period, 1);
        assert_eq!(shot.outcome, None);
        assert_eq!(shot.start, PitchPoint::new(90.0, DEFAULT_COORDINATE));
        assert_eq!(shot.end, PitchPoint::new(DEFAULT_COORDINATE, DEFAULT_COORDINATE));
    }

    #[test]
    fn events_without_coordinate_columns_default() {
        let csv = "\
game_id,team_name_ko,player_name_ko,period_id,time_seconds,type_name,result_name
1,A,a,2,100,Tackle,Successful
";
        let events = load_events_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(events[0].period, 2);
        assert_eq!(events[0].start, PitchPoint::new(DEFAULT_COORDINATE, DEFAULT_COORDINATE));
    }

    #[test]
    fn malformed_event_rows_are_skipped() {
        let csv = "\
game_id,team_name_ko,player_name_ko,period_id,time_seconds,type_name,result_name,start_x,start_y,end_x,end_y
1,A,a,1,ten,Pass,Successful,1,1,1,1
1,A,a,1,10,Pass,Successful,1,1,1,1
";
        let events = load_events_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_seconds, 10.0);
    }

    #[test]
    fn fixtures_parse_dates_and_rounds() {
        let csv = "\
game_id,game_date,game_day,home_team_name_ko,away_team_name_ko
126283,2024-03-01 14:00:00,1,울산 HD FC,포항 스틸러스
126283,2024-03-01 14:00:00,1,울산 HD FC,포항 스틸러스
126290,,,강원FC,울산 HD FC
";
        let fixtures = load_fixtures_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(fixtures[0].round, Some(1));
        assert_eq!(fixtures[1].date, None);
        assert_eq!(fixtures[1].round, None);
    }

    #[test]
    fn roster_accepts_korean_headers() {
        let csv = "\
라운드,팀명,선수명,포지션,출전시간(분),등번호
12R,울산 HD FC,조현우,GK,90,21
12R,울산 HD FC,김민준,대기,-,
라운드 3,울산 HD FC,아무개,코치,90,1
";
        let entries = load_roster_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].round, 12);
        assert_eq!(entries[0].position, PositionTag::Goalkeeper);
        assert_eq!(entries[0].minutes, 90.0);
        assert_eq!(entries[0].shirt_number, Some(21));
        assert_eq!(entries[1].position, PositionTag::Bench);
        assert_eq!(entries[1].minutes, 0.0);
        assert_eq!(entries[1].shirt_number, None);
    }

    #[test]
    fn roster_accepts_english_headers() {
        let csv = "\
round,team,player,position,minutes,shirt_number
R7,포항 스틸러스,완델손,MF,85.6,10
";
        let entries = load_roster_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].round, 7);
        assert_eq!(entries[0].minutes, 85.6);
    }

    #[test]
    fn cp949_bytes_decode_before_parsing() {
        let csv = "라운드,팀명,선수명,포지션,출전시간(분)\n5R,포항 스틸러스,완델손,MF,90\n";
        let (bytes, _, unmappable) = encoding_rs::EUC_KR.encode(csv);
        assert!(!unmappable);
        assert!(std::str::from_utf8(&bytes).is_err());

        let text = decode_csv_bytes(&bytes, Path::new("stats.csv"));
        let entries = load_roster_from_reader(text.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].team, "포항 스틸러스");
        assert_eq!(entries[0].player, "완델손");
        assert_eq!(entries[0].round, 5);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("game_id,team_name_ko,type_name\n1,울산 HD FC,Pass\n".as_bytes());
        let text = decode_csv_bytes(&bytes, Path::new("raw.csv"));
        let events = load_events_from_reader(text.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].team, "울산 HD FC");
    }

    #[test]
    fn absences_parse_day_first_dates() {
        let csv = "\
Team,Name,Ko_name,Reason,Games_Missed,Start_Date,End_Date
Ulsan HD FC,Jo Hyeon-woo,조현우,Red Card,1.0,05/04/2024,12/04/2024
Ulsan HD FC,Kim Young-gwon,김영권,Knee injury,,20/05/2024,
";
        let absences = load_absences_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(absences.len(), 2);

        let red = &absences[0];
        assert_eq!(red.player, "조현우");
        assert_eq!(red.kind, AbsenceKind::Suspension);
        assert_eq!(red.games_missed, 1);
        assert_eq!(red.start, NaiveDate::from_ymd_opt(2024, 4, 5));
        assert_eq!(red.end, NaiveDate::from_ymd_opt(2024, 4, 12));

        let knee = &absences[1];
        assert_eq!(knee.kind, AbsenceKind::Injury);
        assert_eq!(knee.games_missed, 0);
        assert_eq!(knee.end, None);
    }

    #[test]
    fn round_labels() {
        assert_eq!(round_number("12R"), 12);
        assert_eq!(round_number("라운드 3"), 3);
        assert_eq!(round_number("-"), 0);
    }

    #[test]
    fn missing_event_file_is_io_error() {
        let err = load_events(Path::new("/nonexistent/raw_data.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
