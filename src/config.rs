// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::clean::DEFAULT_SCORE_SEPARATOR;
use crate::fetch::DEFAULT_TIMEOUT;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const CONFIG_ENV: &str = "SCRAPER_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub clean: CleanSettings,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: None,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanSettings {
    pub score_separator: char,
}

impl Default for CleanSettings {
    fn default() -> Self {
        Self {
            score_separator: DEFAULT_SCORE_SEPARATOR,
        }
    }
}

/// One page to scrape and where its three tables go.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub raw_data_path: PathBuf,
    pub played_path: PathBuf,
    pub unplayed_path: PathBuf,
    /// Home/away strength tables are written here when set.
    #[serde(default)]
    pub strength_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("loading config {:?}", path))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("parsing YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("no sources configured");
        }
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be positive");
        }
        if self.clean.score_separator.is_ascii_digit() || self.clean.score_separator.is_whitespace() {
            bail!(
                "clean.score_separator {:?} cannot be a digit or whitespace",
                self.clean.score_separator
            );
        }
        let mut seen = HashSet::new();
        for src in &self.sources {
            if !seen.insert(src.name.as_str()) {
                bail!("duplicate source name `{}`", src.name);
            }
        }
        Ok(())
    }
}

/// First CLI argument, then `$SCRAPER_CONFIG`, then `config.yaml`.
pub fn config_path(arg: Option<String>) -> PathBuf {
    arg.or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
sources:
  - name: premier-league
    url: https://fbref.com/en/comps/9/schedule/Premier-League-Scores-and-Fixtures
    raw_data_path: data/prem_data.csv
    played_path: data/played.csv
    unplayed_path: data/unplayed.csv
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(cfg.fetch.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(cfg.fetch.user_agent, None);
        assert_eq!(cfg.clean.score_separator, '–');
        assert_eq!(cfg.sources.len(), 1);
        assert_eq!(cfg.sources[0].played_path, PathBuf::from("data/played.csv"));
        assert!(cfg.sources[0].strength_dir.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let text = format!(
            "fetch:\n  timeout_secs: 3\n  user_agent: fixtures-bot/1.0\nclean:\n  score_separator: \"-\"\n{MINIMAL}"
        );
        let cfg = Config::from_yaml(&text).unwrap();
        assert_eq!(cfg.fetch.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.fetch.user_agent.as_deref(), Some("fixtures-bot/1.0"));
        assert_eq!(cfg.clean.score_separator, '-');
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(Config::from_yaml("sources: []").is_err());
        assert!(Config::from_yaml(&format!("fetch:\n  timeout_secs: 0\n{MINIMAL}")).is_err());
        assert!(Config::from_yaml(&format!("clean:\n  score_separator: \"1\"\n{MINIMAL}")).is_err());
        assert!(Config::from_yaml(&format!("{MINIMAL}    colour: red\n")).is_err());

        let dup = format!("{MINIMAL}{}", MINIMAL.replace("sources:\n", ""));
        let err = Config::from_yaml(&dup).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate source name"), "{err:#}");
    }

    #[test]
    fn loads_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(MINIMAL.as_bytes())?;
        let cfg = Config::load(file.path())?;
        assert_eq!(cfg.sources[0].name, "premier-league");
        assert!(Config::load("does/not/exist.yaml").is_err());
        Ok(())
    }

    #[test]
    fn cli_argument_wins_for_config_path() {
        assert_eq!(config_path(Some("other.yaml".into())), PathBuf::from("other.yaml"));
    }
}
