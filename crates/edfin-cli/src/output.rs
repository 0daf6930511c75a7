//! Writing tables as JSON.

use std::{
  fs::File,
  io::{self, BufWriter, Write},
  path::Path,
};

use anyhow::Context as _;
use clap::ValueEnum;
use edfin_core::{Table, table::to_records};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
  /// One JSON array of row objects.
  #[default]
  Json,
  /// One JSON object per line.
  Ndjson,
}

/// Write `table` to `output`, or to stdout when `None`.
pub fn write_table(
  table: &Table,
  format: Format,
  output: Option<&Path>,
) -> anyhow::Result<()> {
  let records = to_records(table);
  match output {
    Some(path) => {
      let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
      let mut w = BufWriter::new(file);
      write_records(&mut w, &records, format)?;
      w.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    }
    None => {
      let mut w = io::stdout().lock();
      write_records(&mut w, &records, format)?;
      w.flush()?;
    }
  }
  Ok(())
}

fn write_records<W: Write>(
  w: &mut W,
  records: &[Map<String, Value>],
  format: Format,
) -> anyhow::Result<()> {
  match format {
    Format::Json => {
      serde_json::to_writer_pretty(&mut *w, records)?;
      writeln!(w)?;
    }
    Format::Ndjson => {
      for record in records {
        serde_json::to_writer(&mut *w, record)?;
        writeln!(w)?;
      }
    }
  }
  Ok(())
}
