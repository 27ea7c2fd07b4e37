//! Hyperparameters of tree learning and configuration of the server.
use std::{net::IpAddr, path::PathBuf, str::FromStr};

use thiserror_no_std::Error;

use crate::Verbosity;

/// Hyperparameters used when learning a regression tree.
///
/// - **leaf_percent**: a range holding at most `leaf_percent` percent of the
///   training examples becomes a leaf without any split attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSettings {
    pub leaf_percent: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self { leaf_percent: 10 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub address: IpAddr,
    /// `0` lets the system pick a free port.
    pub port: u16,
    /// Directory of the `<table>.csv` training tables.
    pub data_dir: PathBuf,
    /// Directory of the `<table>.dmp` stored trees.
    pub model_dir: PathBuf,
    /// Sessions served at the same time.
    pub max_sessions: usize,
    pub verbosity: Verbosity,
    pub tree: TreeSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            data_dir: PathBuf::from("."),
            model_dir: PathBuf::from("."),
            max_sessions: 8,
            verbosity: Verbosity::Info,
            tree: TreeSettings::default(),
        }
    }
}

pub const USAGE: &str = "regtree-server

  --address <ip>         Listening address (default: 127.0.0.1)
  --port <n>             Listening port (default: 8080)
  --data-dir <path>      Directory of the <table>.csv tables (default: .)
  --model-dir <path>     Directory of the <table>.dmp trees (default: .)
  --max-sessions <n>     Sessions served concurrently (default: 8)
  --verbosity <level>    silent, warning, info or debug (default: info)
  --leaf-percent <p>     Leaf size, in percent of the examples (default: 10)
  --help                 Print this message";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{0} expects a value")]
    MissingValue(String),

    #[error("invalid value `{value}` for {flag}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown argument `{0}`")]
    UnknownFlag(String),

    /// `--help` was given; the caller prints [`USAGE`].
    #[error("help requested")]
    HelpRequested,
}

impl ServerSettings {
    /// Reads `--flag value` pairs over the defaults. The program name must
    /// not be part of `args`.
    pub fn from_args<I>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut settings = Self::default();
        let mut it = args.into_iter();
        while let Some(flag) = it.next() {
            match flag.as_str() {
                "--address" => settings.address = parse_value(&flag, it.next())?,
                "--port" => settings.port = parse_value(&flag, it.next())?,
                "--data-dir" => settings.data_dir = parse_value(&flag, it.next())?,
                "--model-dir" => settings.model_dir = parse_value(&flag, it.next())?,
                "--max-sessions" => {
                    settings.max_sessions = parse_value(&flag, it.next())?;
                    if settings.max_sessions == 0 {
                        return Err(invalid(&flag, "0"));
                    }
                }
                "--verbosity" => settings.verbosity = parse_value(&flag, it.next())?,
                "--leaf-percent" => {
                    let percent: usize = parse_value(&flag, it.next())?;
                    if percent > 100 {
                        return Err(invalid(&flag, &percent.to_string()));
                    }
                    settings.tree.leaf_percent = percent;
                }
                "--help" | "-h" => return Err(SettingsError::HelpRequested),
                _ => return Err(SettingsError::UnknownFlag(flag)),
            }
        }
        Ok(settings)
    }
}

fn parse_value<T: FromStr>(flag: &str, value: Option<String>) -> Result<T, SettingsError> {
    let value = value.ok_or_else(|| SettingsError::MissingValue(flag.to_owned()))?;
    value.parse().map_err(|_| invalid(flag, &value))
}

fn invalid(flag: &str, value: &str) -> SettingsError {
    SettingsError::InvalidValue {
        flag: flag.to_owned(),
        value: value.to_owned(),
    }
}
