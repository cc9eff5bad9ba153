// src/config.rs

use clap::Parser;
use serde::Deserialize;
use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

use crate::payload::ImportTarget;

pub const DEFAULT_FILE: &str = "data.xlsx";
pub const DEFAULT_COMMENT: &str = "Imported from Excel";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Command-line flags. Every run parameter can also come from `--config`.
#[derive(Parser, Debug, Default)]
#[command(name = "dhis2push", about = "Send spreadsheet rows to a DHIS2 dataValueSets endpoint")]
pub struct Cli {
    /// YAML file with any of the settings below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API base URL, e.g. https://play.example.org/api
    #[arg(long, env = "DHIS2_URL")]
    pub url: Option<String>,

    #[arg(long, env = "DHIS2_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "DHIS2_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Spreadsheet or CSV to import
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    #[arg(long)]
    pub org_unit: Option<String>,

    /// Period identifier, e.g. 202301
    #[arg(long)]
    pub period: Option<String>,

    #[arg(long)]
    pub data_set: Option<String>,

    #[arg(long)]
    pub category_option_combo: Option<String>,

    /// Comment attached to every value; pass an empty string to omit it
    #[arg(long)]
    pub comment: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Build the payload and write it out instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Where --dry-run writes the payload (stdout if omitted)
    #[arg(long, requires = "dry_run")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required setting `{0}` (flag, environment or config file)")]
    Missing(&'static str),

    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Settings as they appear in the YAML file; all optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub file: Option<PathBuf>,
    pub sheet: Option<String>,
    pub org_unit: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub period: Option<String>,
    pub data_set: Option<String>,
    pub category_option_combo: Option<String>,
    pub comment: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `period: 202301` parses as a YAML integer; accept it as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Where and as whom to submit.
#[derive(Clone, PartialEq)]
pub struct ServerSettings {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSettings")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Fully resolved run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `None` only for dry runs that were given no server settings.
    pub server: Option<ServerSettings>,
    pub file: PathBuf,
    pub sheet: Option<String>,
    pub org_unit: String,
    pub period: String,
    pub data_set: String,
    pub category_option_combo: Option<String>,
    pub comment: Option<String>,
}

impl Config {
    /// Read `--config` if given, then overlay the flags.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, cli)
    }

    /// Flags win over the file; defaults fill what neither sets. Server
    /// settings are only required when the run will actually submit.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        fn pick<T: Clone>(flag: &Option<T>, file: Option<T>) -> Option<T> {
            flag.clone().or(file)
        }
        fn required<T>(value: Option<T>, name: &'static str) -> Result<T, ConfigError> {
            value.ok_or(ConfigError::Missing(name))
        }

        let raw_url = pick(&cli.url, file.url);
        let url = match raw_url {
            Some(raw) => Some(Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
                url: raw.clone(),
                source,
            })?),
            None => None,
        };
        let username = pick(&cli.username, file.username);
        let password = pick(&cli.password, file.password);
        let timeout = Duration::from_secs(
            pick(&cli.timeout_secs, file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let server = match (url, username, password) {
            (Some(url), Some(username), Some(password)) => Some(ServerSettings {
                url,
                username,
                password,
                timeout,
            }),
            _ if cli.dry_run => None,
            (url, username, _) => {
                required(url, "url")?;
                required(username, "username")?;
                return Err(ConfigError::Missing("password"));
            }
        };

        let comment = pick(&cli.comment, file.comment)
            .unwrap_or_else(|| DEFAULT_COMMENT.to_string());

        Ok(Config {
            server,
            file: pick(&cli.file, file.file).unwrap_or_else(|| PathBuf::from(DEFAULT_FILE)),
            sheet: pick(&cli.sheet, file.sheet),
            org_unit: required(pick(&cli.org_unit, file.org_unit), "org_unit")?,
            period: required(pick(&cli.period, file.period), "period")?,
            data_set: required(pick(&cli.data_set, file.data_set), "data_set")?,
            category_option_combo: pick(&cli.category_option_combo, file.category_option_combo),
            comment: (!comment.is_empty()).then_some(comment),
        })
    }

    /// Server settings, which every non-dry run has.
    pub fn server(&self) -> Result<&ServerSettings, ConfigError> {
        self.server.as_ref().ok_or(ConfigError::Missing("url"))
    }

    pub fn import_target(&self) -> ImportTarget {
        ImportTarget {
            org_unit: self.org_unit.clone(),
            period: self.period.clone(),
            data_set: self.data_set.clone(),
            category_option_combo: self.category_option_combo.clone(),
            comment: self.comment.clone(),
        }
    }
}
