//! Structured query parameters and their string DSL.
//!
//! Callers speak a small string language (`"2020:2022"`, `"KY,TN"`,
//! `"none"`). Each parameter is parsed exactly once into a value type here;
//! the engine only ever sees the parsed form.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  DatasetType, Error, Result,
  dataset::is_valid_year,
  states::is_valid_state_code,
};

/// The literal accepted by both the year and geography parameters to disable
/// filtering.
pub const ALL: &str = "all";

// ─── Years ───────────────────────────────────────────────────────────────────

/// Which school years to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearSpec {
  #[default]
  All,
  Single { year: i32 },
  /// Inclusive on both ends; `start <= end` is guaranteed by the parser.
  Range { start: i32, end: i32 },
}

impl YearSpec {
  pub fn matches(&self, year: i64) -> bool {
    match *self {
      Self::All => true,
      Self::Single { year: y } => year == i64::from(y),
      Self::Range { start, end } => {
        (i64::from(start)..=i64::from(end)).contains(&year)
      }
    }
  }
}

/// Parse one year token of `input`; errors name the whole input.
fn parse_year(token: &str, input: &str) -> Result<i32> {
  let year: i32 = token
    .parse()
    .map_err(|_| Error::YearNotInteger(input.to_owned()))?;
  if !is_valid_year(year) {
    return Err(Error::YearOutOfRange(year));
  }
  Ok(year)
}

impl FromStr for YearSpec {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if s == ALL {
      return Ok(Self::All);
    }
    if !s.contains(':') {
      return Ok(Self::Single { year: parse_year(s, s)? });
    }

    let parts: Vec<&str> = s.split(':').collect();
    let [start, end] = parts.as_slice() else {
      return Err(Error::MalformedRange(s.to_owned()));
    };
    let start = parse_year(start, s)?;
    let end = parse_year(end, s)?;
    if start > end {
      return Err(Error::ReversedRange {
        input: s.to_owned(),
        start,
        end,
      });
    }
    Ok(Self::Range { start, end })
  }
}

impl fmt::Display for YearSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str(ALL),
      Self::Single { year } => write!(f, "{year}"),
      Self::Range { start, end } => write!(f, "{start}:{end}"),
    }
  }
}

// ─── Geography ───────────────────────────────────────────────────────────────

/// Which states to keep. Codes are stored exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum GeoSpec {
  #[default]
  All,
  States(Vec<String>),
}

impl GeoSpec {
  pub fn matches(&self, state: &str) -> bool {
    match self {
      Self::All => true,
      Self::States(codes) => codes.iter().any(|c| c == state),
    }
  }
}

impl FromStr for GeoSpec {
  type Err = Error;

  /// Every invalid code is reported, not just the first.
  fn from_str(s: &str) -> Result<Self> {
    if s == ALL {
      return Ok(Self::All);
    }
    let codes: Vec<String> = s.split(',').map(str::to_owned).collect();
    let invalid: Vec<String> = codes
      .iter()
      .filter(|c| !is_valid_state_code(c))
      .cloned()
      .collect();
    if !invalid.is_empty() {
      return Err(Error::InvalidStates(invalid));
    }
    Ok(Self::States(codes))
  }
}

impl fmt::Display for GeoSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str(ALL),
      Self::States(codes) => f.write_str(&codes.join(",")),
    }
  }
}

// ─── CPI baseline ────────────────────────────────────────────────────────────

/// The school year whose dollars all currency columns are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "year", rename_all = "snake_case")]
pub enum CpiBaseline {
  #[default]
  None,
  Year(i32),
}

impl FromStr for CpiBaseline {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if s == "none" {
      return Ok(Self::None);
    }
    match s.parse::<i32>() {
      Ok(year) if is_valid_year(year) => Ok(Self::Year(year)),
      _ => Err(Error::InvalidCpiBaseline(s.to_owned())),
    }
  }
}

impl fmt::Display for CpiBaseline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::None => f.write_str("none"),
      Self::Year(year) => write!(f, "{year}"),
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// A fully validated request for [`crate::get_finance_data`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinanceQuery {
  pub years:   YearSpec,
  pub geo:     GeoSpec,
  pub dataset: DatasetType,
  pub cpi:     CpiBaseline,
}

impl FinanceQuery {
  /// Validate the four raw parameters. Fails on the first invalid one, in
  /// parameter order.
  pub fn parse(
    yr: &str,
    geo: &str,
    dataset_type: &str,
    cpi_adj: &str,
  ) -> Result<Self> {
    Ok(Self {
      years:   yr.parse()?,
      geo:     geo.parse()?,
      dataset: dataset_type.parse()?,
      cpi:     cpi_adj.parse()?,
    })
  }
}
