use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from `.kubegone.yaml` or an explicit path.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
  /// Path of the known API catalog, used when `--catalog` is not provided
  #[serde(default)]
  pub catalog: Option<String>,

  /// API groups to skip in addition to those registered by CRDs and APIServices
  #[serde(default)]
  pub ignore_groups: Vec<String>,
}

const DEFAULT_CONFIG_FILE: &str = ".kubegone.yaml";

/// Resolves the configuration: an explicit `path` must exist, otherwise `.kubegone.yaml` in the
/// working directory is used when present
pub fn load(path: Option<&str>) -> Result<Config> {
  resolve(path.map(PathBuf::from), std::env::current_dir().ok())
}

fn resolve(explicit: Option<PathBuf>, working_dir: Option<PathBuf>) -> Result<Config> {
  match explicit {
    Some(path) => read(&path),
    None => match working_dir.map(|dir| dir.join(DEFAULT_CONFIG_FILE)) {
      Some(path) if path.is_file() => read(&path),
      _ => Ok(Config::default()),
    },
  }
}

fn read(path: &Path) -> Result<Config> {
  let contents =
    std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
  serde_yaml::from_str(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
}
