//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

const CONFIG_DIR_NAME: &str = "media-export";
const CONFIG_FILE_NAME: &str = "config.toml";

/// TOML-style file configuration for export defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// GraphQL endpoint serving the posts query.
    pub endpoint: Option<String>,
    /// Default number of posts to export (1..=100).
    pub count: Option<u32>,
    /// Default concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Per-file connect and read timeout in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Default directory the archive is saved to.
    pub output_dir: Option<PathBuf>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(count) = self.count
            && !(1..=100).contains(&count)
        {
            bail!("Invalid config value for `count`: {count}. Expected range: 1..=100");
        }

        if let Some(concurrency) = self.concurrency
            && !(1..=100).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=100");
        }

        if let Some(timeout) = self.fetch_timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!(
                "Invalid config value for `fetch_timeout_secs`: {timeout}. Expected range: 1..=3600"
            );
        }

        if let Some(endpoint) = &self.endpoint
            && endpoint.trim().is_empty()
        {
            bail!("Invalid config value for `endpoint`: must not be empty");
        }

        Ok(())
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

impl FromStr for VerbositySetting {
    type Err = anyhow::Error;

    fn from_str(label: &str) -> Result<Self> {
        [Self::Default, Self::Verbose, Self::Quiet, Self::Debug]
            .into_iter()
            .find(|setting| setting.as_str() == label)
            .context("Expected one of: default, verbose, quiet, debug")
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/media-export/config.toml`
/// 2. `$HOME/.config/media-export/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line_without_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "endpoint" => {
                let parsed = unquote(value)
                    .with_context(|| format!("Invalid `endpoint` value on line {line_number}"))?;
                cfg.endpoint = Some(parsed);
            }
            "count" => {
                let parsed = parse_unsigned::<u32>(value)
                    .with_context(|| format!("Invalid `count` value on line {line_number}"))?;
                cfg.count = Some(parsed);
            }
            "concurrency" => {
                let parsed = parse_unsigned::<u8>(value).with_context(|| {
                    format!("Invalid `concurrency` value on line {line_number}")
                })?;
                cfg.concurrency = Some(parsed);
            }
            "fetch_timeout_secs" => {
                let parsed = parse_unsigned::<u64>(value).with_context(|| {
                    format!("Invalid `fetch_timeout_secs` value on line {line_number}")
                })?;
                cfg.fetch_timeout_secs = Some(parsed);
            }
            "output_dir" => {
                let parsed = unquote(value).with_context(|| {
                    format!("Invalid `output_dir` value on line {line_number}")
                })?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "verbosity" => {
                let parsed = unquote(value).with_context(|| {
                    format!("Invalid `verbosity` value on line {line_number}")
                })?;
                cfg.verbosity = Some(parsed.parse::<VerbositySetting>().with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Cuts the line at the first `#` that sits outside a quoted string.
fn line_without_comment(line: &str) -> &str {
    let mut quotes = 0usize;
    let comment_start = line.find(|ch: char| {
        if ch == '"' {
            quotes += 1;
        }
        ch == '#' && quotes % 2 == 0
    });
    comment_start.map_or(line, |index| &line[..index])
}

fn unquote(raw_value: &str) -> Result<String> {
    raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_owned)
        .context("Expected double-quoted string")
}

fn parse_unsigned<T: TryFrom<u64>>(raw_value: &str) -> Result<T> {
    let value: u64 = raw_value
        .parse()
        .with_context(|| format!("Expected non-negative integer, got '{raw_value}'"))?;
    T::try_from(value).map_err(|_| anyhow!("Integer {value} is too large"))
}
