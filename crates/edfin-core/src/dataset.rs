//! Dataset variants and the fixed year domain of the panel.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// First school year in the panel (2011-12 is stored as `2012`).
pub const MIN_YEAR: i32 = 2012;
/// Last school year in the panel (2021-22).
pub const MAX_YEAR: i32 = 2022;

/// `true` if `year` lies in the panel's year domain.
pub fn is_valid_year(year: i32) -> bool { (MIN_YEAR..=MAX_YEAR).contains(&year) }

/// The two published column-set variants of the same row-level panel.
///
/// `Full` is a strict superset of `Skinny` on column names.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
  #[default]
  Skinny,
  Full,
}

impl DatasetType {
  pub const ALL: [Self; 2] = [Self::Skinny, Self::Full];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Skinny => "skinny",
      Self::Full => "full",
    }
  }

  /// The logical cache entry name for this variant. Also the file stem of
  /// the artifact on the remote host.
  pub fn cache_name(self) -> &'static str {
    match self {
      Self::Skinny => "edfin_skinny",
      Self::Full => "edfin_full",
    }
  }
}

impl fmt::Display for DatasetType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DatasetType {
  type Err = Error;

  /// Exact match only; `"Full"` or `" full"` are rejected.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "skinny" => Ok(Self::Skinny),
      "full" => Ok(Self::Full),
      other => Err(Error::InvalidDatasetType(other.to_owned())),
    }
  }
}
