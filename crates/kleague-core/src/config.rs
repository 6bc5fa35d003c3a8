// Configuration loading and parsing (dashboard.toml, managers.toml, credentials.toml).

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataPaths,
    pub selection: SelectionConfig,
    pub llm: LlmConfig,
    pub managers: ManagerConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire dashboard.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DashboardFile {
    data: DataPaths,
    selection: SelectionConfig,
    llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Raw event feed (one row per action).
    pub events: String,
    /// Match info: date, round and home/away names per game.
    pub matches: String,
    /// Per-round player statistics (positions and minutes).
    pub player_stats: String,
    /// Season absence list (injuries, suspensions, call-ups). Optional.
    #[serde(default = "default_absences")]
    pub absences: String,
}

fn default_absences() -> String {
    "data/k_league_2024_integrated.csv".into()
}

/// Which slice of the data the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// A single game, both teams.
    Specific,
    /// The selected team's N most recent games.
    Recent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    pub team: String,
    pub mode: ViewMode,
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default = "default_recent_games")]
    pub recent_games: usize,
}

fn default_recent_games() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Number of most recent chat messages replayed into each prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_history_window() -> usize {
    5
}

// ---------------------------------------------------------------------------
// managers.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ManagerConfig {
    /// Keyed by canonical team key (see `teams::canonical_team_key`).
    #[serde(default)]
    pub teams: HashMap<String, TeamManagers>,
    /// Keyed by manager name; `Default` is required.
    #[serde(default)]
    pub profiles: HashMap<String, SpeechProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamManagers {
    /// Manager used when no dated tenure matches.
    pub manager: String,
    #[serde(default)]
    pub history: Vec<ManagerTenure>,
    /// Club names used by the absence feed ("Ulsan HD FC").
    #[serde(default)]
    pub absence_names: Vec<String>,
}

/// A dated spell in charge. Open-ended on either side when a bound is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerTenure {
    pub name: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// How a manager talks, used to build the chat persona.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct SpeechProfile {
    pub sentence_style: String,
    pub perspective: String,
    #[serde(default)]
    pub frequent_phrases: Vec<String>,
    #[serde(default)]
    pub avoid: Vec<String>,
}

/// Profile key used when a manager has no dedicated profile.
pub const DEFAULT_PROFILE: &str = "Default";

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/dashboard.toml`,
/// `config/managers.toml`, and (optionally) `config/credentials.toml`,
/// all relative to the given `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- dashboard.toml (required) ---
    let dashboard_path = config_dir.join("dashboard.toml");
    let dashboard: DashboardFile = parse_file(&dashboard_path)?;

    // --- managers.toml (required) ---
    let managers_path = config_dir.join("managers.toml");
    let managers: ManagerConfig = parse_file(&managers_path)?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        parse_file(&credentials_path)?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        data: dashboard.data,
        selection: dashboard.selection,
        llm: dashboard.llm,
        managers,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                info!("copied default config to {}", target.display());
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = read_file(path)?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let selection = &config.selection;
    if selection.team.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "selection.team".into(),
            message: "must not be empty".into(),
        });
    }

    if selection.recent_games == 0 {
        return Err(ConfigError::ValidationError {
            field: "selection.recent_games".into(),
            message: "must be > 0".into(),
        });
    }

    if selection.mode == ViewMode::Specific
        && selection.match_id.as_deref().map_or(true, |id| id.trim().is_empty())
    {
        return Err(ConfigError::ValidationError {
            field: "selection.match_id".into(),
            message: "required when mode = \"specific\"".into(),
        });
    }

    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.max_tokens".into(),
            message: "must be > 0".into(),
        });
    }

    if config.llm.history_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.history_window".into(),
            message: "must be > 0".into(),
        });
    }

    if !config.managers.profiles.contains_key(DEFAULT_PROFILE) {
        return Err(ConfigError::ValidationError {
            field: "profiles.Default".into(),
            message: "a Default speech profile is required".into(),
        });
    }

    for (team, managers) in &config.managers.teams {
        for tenure in &managers.history {
            if let (Some(start), Some(end)) = (tenure.start, tenure.end) {
                if start > end {
                    return Err(ConfigError::ValidationError {
                        field: format!("teams.{team}.history"),
                        message: format!("tenure of {} starts after it ends", tenure.name),
                    });
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
