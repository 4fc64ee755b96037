use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Catalog of known API kinds
///
/// Keys are in the `<groupVersion>/<Kind>` format (i.e. `apps/v1/Deployment` or `v1/Pod`).
/// A served kind that is missing from the catalog is a candidate for having been removed.
#[derive(Clone, Debug, Default)]
pub struct KnownApis {
  keys: HashSet<String>,
}

/// On-disk shapes accepted for the catalog
///
/// Either a plain list of keys, or a mapping keyed by them where values are ignored
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
  Keys(Vec<String>),
  Map(BTreeMap<String, serde_yaml::Value>),
}

impl KnownApis {
  pub fn contains(&self, key: &str) -> bool {
    self.keys.contains(key)
  }

  pub fn len(&self) -> usize {
    self.keys.len()
  }

  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }

  /// Parses a catalog from YAML (or JSON) contents
  pub fn parse(contents: &str) -> Result<Self> {
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }

    let file: CatalogFile = serde_yaml::from_str(contents).context("Catalog must be a list or a mapping of keys")?;
    let catalog = match file {
      CatalogFile::Keys(keys) => keys.into_iter().collect(),
      CatalogFile::Map(map) => map.into_keys().collect(),
    };

    Ok(catalog)
  }

  /// Loads the catalog from the file at `path`
  pub fn load(path: &str) -> Result<Self> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read catalog file: {path}"))?;
    let catalog = Self::parse(&contents).with_context(|| format!("Failed to parse catalog file: {path}"))?;
    debug!("Loaded {} known APIs from {path}", catalog.len());

    Ok(catalog)
  }
}

impl<S: Into<String>> FromIterator<S> for KnownApis {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      keys: iter.into_iter().map(Into::into).collect(),
    }
  }
}
