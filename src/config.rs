//! Tracker configuration
//!
//! Series table (labels, URL templates, publication weekdays), local time
//! zone, probe settings and the data directory. Built once at startup and
//! never mutated during a run.
//!
//! Layering: defaults → optional TOML file → `DRAWSHEET_*` environment
//! variables → command-line flags (applied by the binary).

use chrono::{FixedOffset, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the candidate index in a URL template.
pub const INDEX_PLACEHOLDER: &str = "{n}";

/// America/Hermosillo (UTC-7, no daylight saving).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -7 * 60;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding state.json, latest.json and history.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Offset of the local calendar from UTC, in minutes
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    #[serde(default)]
    pub probe: ProbeConfig,

    /// Keep only the N most recent history entries (unbounded when unset)
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Series in enumeration order
    #[serde(default = "default_series")]
    pub series: Vec<SeriesConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_utc_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_series() -> Vec<SeriesConfig> {
    vec![
        SeriesConfig::mayor(),
        SeriesConfig::superior(),
        SeriesConfig::zodiaco(),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            probe: ProbeConfig::default(),
            history_limit: None,
            series: default_series(),
        }
    }
}

/// Existence probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Per-request timeout (HEAD and ranged GET each get the full budget)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Bytes requested by the ranged GET fallback
    #[serde(default = "default_range_bytes")]
    pub range_bytes: u64,
}

fn default_timeout_secs() -> u64 {
    12
}

fn default_user_agent() -> String {
    format!("drawsheet-tracker/{}", env!("CARGO_PKG_VERSION"))
}

fn default_range_bytes() -> u64 {
    81
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            range_bytes: default_range_bytes(),
        }
    }
}

/// One document series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Stable identifier used as the key in every persisted view
    pub id: String,
    /// Human-readable name
    pub label: String,
    /// Document location with `{n}` standing for the index
    pub url_template: String,
    /// Local weekdays on which a new document is expected
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
}

impl SeriesConfig {
    pub fn mayor() -> Self {
        Self {
            id: "mayor".into(),
            label: "Sorteo Mayor".into(),
            url_template: "https://lotenal.gob.mx/documentos/listapremios/mayor/mayor{n}.pdf"
                .into(),
            weekdays: vec![Weekday::Tue],
        }
    }

    pub fn superior() -> Self {
        Self {
            id: "superior".into(),
            label: "Sorteo Superior".into(),
            url_template:
                "https://lotenal.gob.mx/documentos/listapremios/superior/superior{n}.pdf".into(),
            weekdays: vec![Weekday::Fri],
        }
    }

    pub fn zodiaco() -> Self {
        Self {
            id: "zodiaco".into(),
            label: "Sorteo Zodiaco".into(),
            url_template: "https://lotenal.gob.mx/documentos/listapremios/zodiaco/zodiaco{n}.pdf"
                .into(),
            weekdays: vec![Weekday::Sun],
        }
    }

    /// Location of document `index`, or `None` when the template cannot
    /// produce one.
    pub fn location(&self, index: u64) -> Option<String> {
        if !self.url_template.contains(INDEX_PLACEHOLDER) {
            return None;
        }
        Some(
            self.url_template
                .replace(INDEX_PLACEHOLDER, &index.to_string()),
        )
    }
}

/// A series that will never be probed as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigGap {
    MissingPlaceholder { series: String },
    NoWeekdays { series: String },
}

impl fmt::Display for ConfigGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPlaceholder { series } => write!(
                f,
                "series '{}' has no {} in its url_template and will never be probed",
                series, INDEX_PLACEHOLDER
            ),
            Self::NoWeekdays { series } => write!(
                f,
                "series '{}' has no weekdays and will never be eligible",
                series
            ),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidOffset(i32),
    DuplicateSeries(String),
    EmptySeriesId,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
            Self::InvalidOffset(minutes) => {
                write!(f, "utc_offset_minutes out of range: {}", minutes)
            }
            Self::DuplicateSeries(id) => write!(f, "series '{}' is configured twice", id),
            Self::EmptySeriesId => write!(f, "series id must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DRAWSHEET_DATA_DIR") {
            if !v.trim().is_empty() {
                self.data_dir = PathBuf::from(v);
            }
        }
        if let Ok(v) = std::env::var("DRAWSHEET_UTC_OFFSET_MINUTES") {
            if let Ok(minutes) = v.trim().parse() {
                self.utc_offset_minutes = minutes;
            }
        }
        if let Ok(v) = std::env::var("DRAWSHEET_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = v.trim().parse::<u64>() {
                if secs > 0 {
                    self.probe.timeout_secs = secs;
                }
            }
        }
        if let Ok(v) = std::env::var("DRAWSHEET_HISTORY_LIMIT") {
            if let Ok(limit) = v.trim().parse::<usize>() {
                self.history_limit = if limit == 0 { None } else { Some(limit) };
            }
        }
    }

    pub fn local_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_minutes))
    }

    /// Hard errors: things that would make persisted views ambiguous.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.local_offset()?;
        let mut seen = HashSet::new();
        for series in &self.series {
            if series.id.trim().is_empty() {
                return Err(ConfigError::EmptySeriesId);
            }
            if !seen.insert(series.id.as_str()) {
                return Err(ConfigError::DuplicateSeries(series.id.clone()));
            }
        }
        Ok(())
    }

    /// Soft findings: series that stay fail-closed.
    pub fn gaps(&self) -> Vec<ConfigGap> {
        let mut gaps = Vec::new();
        for series in &self.series {
            if !series.url_template.contains(INDEX_PLACEHOLDER) {
                gaps.push(ConfigGap::MissingPlaceholder {
                    series: series.id.clone(),
                });
            }
            if series.weekdays.is_empty() {
                gaps.push(ConfigGap::NoWeekdays {
                    series: series.id.clone(),
                });
            }
        }
        gaps
    }

    pub fn series_ids(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.series_ids().collect::<Vec<_>>(),
            vec!["mayor", "superior", "zodiaco"]
        );
        assert_eq!(config.probe.timeout_secs, 12);
        assert_eq!(config.probe.range_bytes, 81);
        assert!(config.check().is_ok());
        assert!(config.gaps().is_empty());
    }

    #[test]
    fn test_location_formats_index() {
        let series = SeriesConfig::mayor();
        assert_eq!(
            series.location(6).as_deref(),
            Some("https://lotenal.gob.mx/documentos/listapremios/mayor/mayor6.pdf")
        );
    }

    #[test]
    fn test_location_without_placeholder_is_none() {
        let mut series = SeriesConfig::mayor();
        series.url_template = "https://example.invalid/mayor.pdf".into();
        assert_eq!(series.location(6), None);
    }

    #[test]
    fn test_local_offset_hermosillo() {
        let offset = AppConfig::default().local_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let config = AppConfig {
            utc_offset_minutes: 48 * 60,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.check(),
            Err(ConfigError::InvalidOffset(2880))
        ));
    }

    #[test]
    fn test_duplicate_series_rejected() {
        let mut config = AppConfig::default();
        config.series.push(SeriesConfig::mayor());
        assert!(matches!(
            config.check(),
            Err(ConfigError::DuplicateSeries(id)) if id == "mayor"
        ));
    }

    #[test]
    fn test_gaps_reported() {
        let mut config = AppConfig::default();
        config.series[1].weekdays.clear();
        config.series[2].url_template = "https://example.invalid/static.pdf".into();

        let gaps = config.gaps();
        assert_eq!(gaps.len(), 2);
        assert!(gaps.contains(&ConfigGap::NoWeekdays {
            series: "superior".into()
        }));
        assert!(gaps.contains(&ConfigGap::MissingPlaceholder {
            series: "zodiaco".into()
        }));
    }

    #[test]
    fn test_toml_partial_file() {
        let toml = r#"
            data_dir = "/var/lib/drawsheet"
            history_limit = 800

            [[series]]
            id = "mayor"
            label = "Sorteo Mayor"
            url_template = "https://example.invalid/mayor{n}.pdf"
            weekdays = ["Tue", "thursday"]
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/drawsheet"));
        assert_eq!(config.history_limit, Some(800));
        assert_eq!(config.utc_offset_minutes, DEFAULT_UTC_OFFSET_MINUTES);
        assert_eq!(config.probe.timeout_secs, 12);
        assert_eq!(config.series.len(), 1);
        assert_eq!(config.series[0].weekdays, vec![Weekday::Tue, Weekday::Thu]);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.series.len(), config.series.len());
        assert_eq!(parsed.series[2].weekdays, vec![Weekday::Sun]);
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = AppConfig::from_toml_file(Path::new("/nonexistent/drawsheet.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
