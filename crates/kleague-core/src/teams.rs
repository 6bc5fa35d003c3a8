// Team name canonicalization and manager lookups.

use chrono::NaiveDate;

use crate::config::{ManagerConfig, SpeechProfile, DEFAULT_PROFILE};

/// Sponsor and suffix words stripped from full club names.
const NAME_NOISE: [&str; 10] = [
    "유나이티드",
    "모터스",
    "스틸러스",
    "시티즌",
    "현대",
    "하나",
    "FC",
    "HD",
    " ",
    "상무",
];

/// Key used when a name is empty or unknown.
pub const DEFAULT_TEAM_KEY: &str = "Default";

/// Reduce a full club name ("울산 HD FC") to its short key ("울산").
pub fn canonical_team_key(name: &str) -> String {
    if name.is_empty() {
        return DEFAULT_TEAM_KEY.to_string();
    }
    let mut key = name.to_string();
    for word in NAME_NOISE {
        key = key.replace(word, "");
    }
    for collapsed in ["김천", "제주"] {
        if key.contains(collapsed) {
            return collapsed.to_string();
        }
    }
    key
}

/// Manager in charge of `team_name` on `date`.
///
/// Tenures are checked in configured order; the first whose bounds contain
/// the date wins. Falls back to the team's current manager, and to `None`
/// for teams missing from the config.
pub fn manager_on<'a>(
    managers: &'a ManagerConfig,
    team_name: &str,
    date: Option<NaiveDate>,
) -> Option<&'a str> {
    let team = managers.teams.get(&canonical_team_key(team_name))?;
    let Some(date) = date else {
        return Some(&team.manager);
    };
    let dated = team.history.iter().find(|t| match (t.start, t.end) {
        (Some(start), Some(end)) => start <= date && date <= end,
        (None, Some(end)) => date <= end,
        (Some(start), None) => date >= start,
        (None, None) => false,
    });
    Some(dated.map_or(team.manager.as_str(), |t| t.name.as_str()))
}

/// Club names the absence feed uses for `team_name`; empty when unmapped.
pub fn absence_feed_names<'a>(managers: &'a ManagerConfig, team_name: &str) -> &'a [String] {
    managers
        .teams
        .get(&canonical_team_key(team_name))
        .map(|t| t.absence_names.as_slice())
        .unwrap_or(&[])
}

/// Speech profile for a manager, or the `Default` profile.
pub fn speech_profile<'a>(managers: &'a ManagerConfig, manager: &str) -> Option<&'a SpeechProfile> {
    managers
        .profiles
        .get(manager)
        .or_else(|| managers.profiles.get(DEFAULT_PROFILE))
}
