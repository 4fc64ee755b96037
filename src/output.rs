use std::{fs::File, io::prelude::*};

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled, settings::Style};

use crate::detect::DeletedApi;

#[derive(Clone, Copy, Debug, Default, ValueEnum, Serialize, Deserialize)]
pub enum Format {
  /// JSON format used for logging or writing to a *.json file
  Json,
  /// Text format used for writing to stdout
  #[default]
  Text,
}

/// One row per live object found under a deleted API
#[derive(Debug, Tabled)]
#[tabled(rename_all = "UpperCase")]
struct DeletedRow {
  group: String,
  version: String,
  kind: String,
  namespace: String,
  name: String,
}

/// Renders the results as a text table, one row per deleted item
pub fn to_stdout_table(results: &[DeletedApi]) -> String {
  if results.is_empty() {
    return "No deleted APIs found\n".to_string();
  }

  let rows: Vec<DeletedRow> = results
    .iter()
    .flat_map(|api| {
      api.items.iter().map(move |item| DeletedRow {
        group: if api.group.is_empty() { "core".to_string() } else { api.group.clone() },
        version: api.version.clone(),
        kind: api.kind.clone(),
        namespace: item.namespace.clone().unwrap_or_else(|| "-".to_string()),
        name: item.name.clone(),
      })
    })
    .collect();

  let mut table = Table::new(rows);
  table.with(Style::sharp());

  format!("{table}\n")
}

pub fn render(results: &[DeletedApi], format: &Format) -> Result<String> {
  let output = match format {
    Format::Json => serde_json::to_string_pretty(results)?,
    Format::Text => to_stdout_table(results),
  };

  Ok(output)
}

pub fn output(results: &[DeletedApi], format: &Format, filename: &Option<String>) -> Result<()> {
  let output = render(results, format)?;

  match filename {
    Some(filename) => {
      let mut file = File::create(filename)?;
      file.write_all(output.as_bytes())?;
    }
    None => {
      println!("{output}");
    }
  }

  Ok(())
}
