//! Decoding a SQLite artifact into an Arrow-backed [`Table`].
//!
//! Each artifact holds one table, [`ARTIFACT_TABLE`]. Registry columns are
//! decoded to their declared type; SQLite's dynamic typing means a value may
//! be stored as any storage class, so every cell is coerced. Columns unknown
//! to the registry are typed by their first non-null value.

use std::path::Path;

use arrow::array::ArrayRef;
use edfin_core::{
  Table,
  table::{from_columns, integers, numerics, strings},
  variables::{ColumnType, lookup},
};
use rusqlite::{OpenFlags, types::Value};
use tracing::debug;

use crate::{Error, Result};

/// Name of the data table inside every artifact.
pub const ARTIFACT_TABLE: &str = "edfin";

const TABLE_EXISTS: &str =
  "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)";

type RawColumns = (Vec<String>, Vec<Vec<Value>>);

/// Read the artifact at `path` into memory.
pub async fn read_table(path: &Path) -> Result<Table> {
  let conn = tokio_rusqlite::Connection::open_with_flags(
    path,
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
  )
  .await?;

  let raw: Option<RawColumns> = conn
    .call(|conn| {
      let exists: bool =
        conn.query_row(TABLE_EXISTS, [ARTIFACT_TABLE], |r| r.get(0))?;
      if !exists {
        return Ok(None);
      }

      let mut stmt = conn.prepare(&format!("SELECT * FROM \"{ARTIFACT_TABLE}\""))?;
      let names: Vec<String> =
        stmt.column_names().into_iter().map(str::to_owned).collect();
      let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

      let mut rows = stmt.query([])?;
      while let Some(row) = rows.next()? {
        for (i, column) in values.iter_mut().enumerate() {
          column.push(row.get::<_, Value>(i)?);
        }
      }
      Ok(Some((names, values)))
    })
    .await?;

  let Some((names, values)) = raw else {
    return Err(Error::MissingTable {
      path:  path.to_owned(),
      table: ARTIFACT_TABLE,
    });
  };

  let columns = names.into_iter().zip(values).map(|(name, values)| {
    let kind = match lookup(&name) {
      Some(info) => info.kind,
      None => infer_type(&values),
    };
    let array = decode_column(kind, values);
    (name, array)
  });

  let table = from_columns(columns)?;
  debug!(
    path = %path.display(),
    rows = table.num_rows(),
    cols = table.num_columns(),
    "artifact decoded"
  );
  Ok(table)
}

/// Type of a column from its first non-null value; all-null columns are
/// treated as character.
fn infer_type(values: &[Value]) -> ColumnType {
  values
    .iter()
    .find_map(|value| match value {
      Value::Null => None,
      Value::Integer(_) => Some(ColumnType::Integer),
      Value::Real(_) => Some(ColumnType::Numeric),
      Value::Text(_) | Value::Blob(_) => Some(ColumnType::Character),
    })
    .unwrap_or(ColumnType::Character)
}

fn decode_column(kind: ColumnType, values: Vec<Value>) -> ArrayRef {
  let values = values.into_iter();
  match kind {
    ColumnType::Character => strings(values.map(to_text)),
    ColumnType::Integer => integers(values.map(to_integer)),
    ColumnType::Numeric => numerics(values.map(to_numeric)),
  }
}

// ── Cell coercion ───────────────────────────────────────────────────────────

fn to_text(value: Value) -> Option<String> {
  match value {
    Value::Null | Value::Blob(_) => None,
    Value::Integer(i) => Some(i.to_string()),
    Value::Real(f) => Some(f.to_string()),
    Value::Text(s) => Some(s),
  }
}

fn to_integer(value: Value) -> Option<i64> {
  match value {
    Value::Integer(i) => Some(i),
    Value::Real(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
    Value::Text(s) => {
      let s = s.trim();
      s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
          .ok()
          .filter(|f| f.is_finite() && f.fract() == 0.0)
          .map(|f| f as i64)
      })
    }
    _ => None,
  }
}

fn to_numeric(value: Value) -> Option<f64> {
  match value {
    Value::Integer(i) => Some(i as f64),
    Value::Real(f) => Some(f),
    Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
    _ => None,
  }
}
