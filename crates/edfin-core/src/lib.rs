//! Core types and query logic for the school district finance panel.
//!
//! This crate has no HTTP or database dependencies. It owns
//! parameter parsing, the column registry, the Arrow-backed table, CPI
//! normalization, and the query engine, which drives any
//! [`store::ArtifactStore`] backend.

pub mod cpi;
pub mod dataset;
pub mod error;
pub mod params;
pub mod query;
pub mod states;
pub mod store;
pub mod table;
pub mod variables;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dataset::DatasetType;
pub use error::{Error, Result};
pub use params::{CpiBaseline, FinanceQuery, GeoSpec, YearSpec};
pub use query::{FetchOptions, get_finance_data};
pub use states::get_valid_state_codes;
pub use table::Table;
pub use variables::list_variables;
