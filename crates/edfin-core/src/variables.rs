//! The static column registry for both dataset variants.
//!
//! Every column of the published artifacts is described once here. The CPI
//! rescale set and the post-load schema check are both derived from this
//! table, so there is no second hand-maintained column list to drift.

use serde::{Deserialize, Serialize};

use crate::{
  DatasetType, Error, Result, Table,
  dataset::MIN_YEAR,
  table::{from_columns, integers, strings},
};

/// School year column.
pub const YEAR: &str = "year";
/// Two-letter state code column.
pub const STATE: &str = "state";
/// School-year CPI-U factor column used by the normalizer.
pub const CPI_INDEX: &str = "cpi_sy12";

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Declared storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
  Character,
  Integer,
  Numeric,
}

impl ColumnType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Character => "character",
      Self::Integer => "integer",
      Self::Numeric => "numeric",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Id,
  Time,
  Geographic,
  Demographic,
  Revenue,
  Expenditure,
  Economic,
  Governance,
}

impl Category {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Id => "id",
      Self::Time => "time",
      Self::Geographic => "geographic",
      Self::Demographic => "demographic",
      Self::Revenue => "revenue",
      Self::Expenditure => "expenditure",
      Self::Economic => "economic",
      Self::Governance => "governance",
    }
  }
}

/// What a column measures. Only [`Unit::Dollars`] columns are rescaled by
/// CPI normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
  Dollars,
  Count,
  Percent,
  Index,
  Code,
  Text,
}

impl Unit {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Dollars => "dollars",
      Self::Count => "count",
      Self::Percent => "percent",
      Self::Index => "index",
      Self::Code => "code",
      Self::Text => "text",
    }
  }
}

/// Metadata for one artifact column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
  pub name:        &'static str,
  #[serde(rename = "type")]
  pub kind:        ColumnType,
  pub category:    Category,
  pub unit:        Unit,
  pub source:      &'static str,
  /// First school year with non-missing data.
  pub first_year:  i32,
  pub description: &'static str,
}

impl VariableInfo {
  pub fn is_currency(&self) -> bool { self.unit == Unit::Dollars }
}

// ─── Registry ────────────────────────────────────────────────────────────────

const F33: &str = "NCES F-33";
const CCD: &str = "NCES CCD";
const EDGE: &str = "NCES EDGE";
const SAIPE: &str = "Census SAIPE";
const ACS: &str = "Census ACS 5-year";
const BLS: &str = "BLS CPI-U";
const DERIVED: &str = "Derived";

const fn var(
  name: &'static str,
  kind: ColumnType,
  category: Category,
  unit: Unit,
  source: &'static str,
  first_year: i32,
  description: &'static str,
) -> VariableInfo {
  VariableInfo {
    name,
    kind,
    category,
    unit,
    source,
    first_year,
    description,
  }
}

const fn revenue(name: &'static str, description: &'static str) -> VariableInfo {
  var(name, ColumnType::Numeric, Category::Revenue, Unit::Dollars, F33, MIN_YEAR, description)
}

const fn spending(name: &'static str, description: &'static str) -> VariableInfo {
  var(name, ColumnType::Numeric, Category::Expenditure, Unit::Dollars, F33, MIN_YEAR, description)
}

use Category as C;
use ColumnType as T;

/// Columns present in both variants.
static SKINNY: [VariableInfo; 41] = [
  // ── Identifiers and time ────────────────────────────────────────────────
  var("ncesid", T::Character, C::Id, Unit::Code, CCD, MIN_YEAR, "NCES local education agency ID"),
  var("dist_name", T::Character, C::Id, Unit::Text, CCD, MIN_YEAR, "District name"),
  var(YEAR, T::Integer, C::Time, Unit::Code, DERIVED, MIN_YEAR, "School year, by spring year (2012 = 2011-12)"),
  // ── Geography ───────────────────────────────────────────────────────────
  var(STATE, T::Character, C::Geographic, Unit::Code, CCD, MIN_YEAR, "Two-letter state postal code"),
  var("city", T::Character, C::Geographic, Unit::Text, CCD, MIN_YEAR, "City of the district office"),
  var("county", T::Character, C::Geographic, Unit::Text, CCD, MIN_YEAR, "County of the district office"),
  var("cbsa", T::Character, C::Geographic, Unit::Text, EDGE, MIN_YEAR, "Core-based statistical area"),
  var("urbanicity", T::Character, C::Geographic, Unit::Text, EDGE, MIN_YEAR, "Urbanicity from the NCES locale code (city, suburb, town, rural)"),
  var("cong_dist", T::Character, C::Geographic, Unit::Code, EDGE, 2013, "Congressional district containing the district office"),
  // ── Demographics ────────────────────────────────────────────────────────
  var("enroll", T::Integer, C::Demographic, Unit::Count, F33, MIN_YEAR, "Fall membership (enrollment)"),
  var("pop_total", T::Integer, C::Demographic, Unit::Count, SAIPE, MIN_YEAR, "Estimated total population within district boundaries"),
  var("pop_5_17", T::Integer, C::Demographic, Unit::Count, SAIPE, MIN_YEAR, "Estimated population aged 5-17"),
  var("stpov_5_17", T::Integer, C::Demographic, Unit::Count, SAIPE, MIN_YEAR, "Estimated children aged 5-17 in families in poverty"),
  var("stpov_pct", T::Numeric, C::Demographic, Unit::Percent, SAIPE, MIN_YEAR, "Share of children aged 5-17 in families in poverty"),
  // ── Revenue ─────────────────────────────────────────────────────────────
  revenue("rev_local", "Local revenue, adjusted"),
  revenue("rev_state", "State revenue, adjusted"),
  revenue("rev_fed", "Federal revenue, adjusted"),
  revenue("rev_total", "Total revenue, adjusted"),
  revenue("rev_local_unadj", "Local revenue as reported, before adjustment"),
  revenue("rev_state_unadj", "State revenue as reported, before adjustment"),
  revenue("rev_fed_unadj", "Federal revenue as reported, before adjustment"),
  revenue("rev_total_unadj", "Total revenue as reported, before adjustment"),
  revenue("rev_local_pp", "Adjusted local revenue per pupil"),
  revenue("rev_state_pp", "Adjusted state revenue per pupil"),
  revenue("rev_fed_pp", "Adjusted federal revenue per pupil"),
  revenue("rev_total_pp", "Adjusted total revenue per pupil"),
  // ── Current expenditure summaries ───────────────────────────────────────
  spending("exp_cur_total", "Total current expenditure"),
  spending("exp_cur_instr", "Current expenditure on instruction"),
  spending("exp_cur_supp", "Current expenditure on support services"),
  spending("exp_cur_other", "Current expenditure on food services and enterprise operations"),
  spending("exp_cur_pp", "Total current expenditure per pupil"),
  spending("exp_cur_instr_pp", "Current instructional expenditure per pupil"),
  // ── Community economics ─────────────────────────────────────────────────
  var("mhi", T::Numeric, C::Economic, Unit::Dollars, ACS, MIN_YEAR, "Median household income"),
  var("mpv", T::Numeric, C::Economic, Unit::Dollars, ACS, MIN_YEAR, "Median value of owner-occupied housing"),
  var("ba_plus_pct", T::Numeric, C::Economic, Unit::Percent, ACS, MIN_YEAR, "Share of adults 25 and older with a bachelor's degree or higher"),
  var("unemp_rate", T::Numeric, C::Economic, Unit::Percent, ACS, MIN_YEAR, "Civilian unemployment rate"),
  var(CPI_INDEX, T::Numeric, C::Economic, Unit::Index, BLS, MIN_YEAR, "School-year CPI-U factor converting nominal dollars to SY2011-12 dollars"),
  // ── Governance ──────────────────────────────────────────────────────────
  var("dist_type", T::Character, C::Governance, Unit::Code, CCD, MIN_YEAR, "Local education agency type code"),
  var("sch_level", T::Character, C::Governance, Unit::Code, F33, MIN_YEAR, "School level code (elementary, secondary, unified)"),
  var("fiscal_dep", T::Character, C::Governance, Unit::Code, F33, MIN_YEAR, "Fiscal dependency code"),
  var("charter_agency", T::Character, C::Governance, Unit::Code, CCD, 2014, "Charter-only agency flag"),
];

/// Detailed expenditure columns present only in [`DatasetType::Full`].
static FULL_DETAIL: [VariableInfo; 48] = [
  // ── Salaries and benefits by function ───────────────────────────────────
  spending("exp_instr_sal", "Instruction salaries"),
  spending("exp_instr_ben", "Instruction employee benefits"),
  spending("exp_supp_stu_sal", "Student support salaries"),
  spending("exp_supp_stu_ben", "Student support employee benefits"),
  spending("exp_supp_instr_sal", "Instructional staff support salaries"),
  spending("exp_supp_instr_ben", "Instructional staff support employee benefits"),
  spending("exp_supp_gen_admin_sal", "General administration salaries"),
  spending("exp_supp_gen_admin_ben", "General administration employee benefits"),
  spending("exp_supp_sch_admin_sal", "School administration salaries"),
  spending("exp_supp_sch_admin_ben", "School administration employee benefits"),
  spending("exp_supp_ops_sal", "Operation and maintenance of plant salaries"),
  spending("exp_supp_ops_ben", "Operation and maintenance of plant employee benefits"),
  spending("exp_supp_trans_sal", "Student transportation salaries"),
  spending("exp_supp_trans_ben", "Student transportation employee benefits"),
  spending("exp_supp_other_sal", "Business, central and other support salaries"),
  spending("exp_supp_other_ben", "Business, central and other support employee benefits"),
  spending("exp_food_sal", "Food services salaries"),
  spending("exp_food_ben", "Food services employee benefits"),
  spending("exp_ent_sal", "Enterprise operations salaries"),
  spending("exp_ent_ben", "Enterprise operations employee benefits"),
  // ── Function totals ─────────────────────────────────────────────────────
  spending("exp_supp_stu_total", "Current expenditure on student support"),
  spending("exp_supp_instr_total", "Current expenditure on instructional staff support"),
  spending("exp_supp_gen_admin_total", "Current expenditure on general administration"),
  spending("exp_supp_sch_admin_total", "Current expenditure on school administration"),
  spending("exp_supp_ops_total", "Current expenditure on operation and maintenance of plant"),
  spending("exp_supp_trans_total", "Current expenditure on student transportation"),
  spending("exp_supp_other_total", "Current expenditure on business, central and other support"),
  spending("exp_food_total", "Current expenditure on food services"),
  spending("exp_ent_total", "Current expenditure on enterprise operations"),
  // ── Instruction objects ─────────────────────────────────────────────────
  spending("exp_instr_supplies", "Instructional supplies"),
  spending("exp_instr_purch_serv", "Instructional purchased services"),
  // ── Payments to other entities ──────────────────────────────────────────
  spending("exp_pay_private", "Payments to private schools"),
  spending("exp_pay_charter", "Payments to charter schools"),
  spending("exp_pay_other_lea", "Payments to other school systems"),
  spending("exp_pay_state", "Payments to state government"),
  spending("exp_pay_local", "Payments to local governments"),
  // ── Non-elementary-secondary programs ───────────────────────────────────
  spending("exp_nonel_comm", "Community services expenditure"),
  spending("exp_nonel_adult", "Adult education expenditure"),
  spending("exp_nonel_other", "Other non-elementary-secondary expenditure"),
  // ── Capital and debt ────────────────────────────────────────────────────
  spending("exp_cap_total", "Total capital outlay"),
  spending("exp_cap_constr", "Construction capital outlay"),
  spending("exp_cap_land", "Land and existing structures capital outlay"),
  spending("exp_cap_equip_instr", "Instructional equipment capital outlay"),
  spending("exp_cap_equip_other", "Other equipment capital outlay"),
  spending("exp_interest_ltd", "Interest on long-term debt"),
  // ── Totals by object ────────────────────────────────────────────────────
  spending("exp_total", "Total expenditure"),
  spending("exp_sal_total", "Total salaries and wages"),
  spending("exp_ben_total", "Total employee benefits"),
];

// ─── Lookups ─────────────────────────────────────────────────────────────────

/// The registry entries for `dataset`, skinny columns first.
pub fn variables(dataset: DatasetType) -> impl Iterator<Item = &'static VariableInfo> {
  let detail: &'static [VariableInfo] = match dataset {
    DatasetType::Skinny => &[],
    DatasetType::Full => &FULL_DETAIL,
  };
  SKINNY.iter().chain(detail)
}

/// Look up a column of either variant by name.
pub fn lookup(name: &str) -> Option<&'static VariableInfo> {
  variables(DatasetType::Full).find(|v| v.name == name)
}

/// Names of the dollar-denominated columns of `dataset`; the CPI rescale set.
pub fn currency_columns(dataset: DatasetType) -> impl Iterator<Item = &'static str> {
  variables(dataset).filter(|v| v.is_currency()).map(|v| v.name)
}

/// Fail if `table` lacks any registry column of `dataset`.
pub fn check_schema(table: &Table, dataset: DatasetType) -> Result<()> {
  let missing: Vec<String> = variables(dataset)
    .filter(|v| table.column_by_name(v.name).is_none())
    .map(|v| v.name.to_owned())
    .collect();
  if missing.is_empty() {
    Ok(())
  } else {
    Err(Error::SchemaMismatch {
      dataset: dataset.to_string(),
      missing,
    })
  }
}

/// Registry entries of `dataset`, optionally narrowed to an exact category
/// name. `"all"` disables the category filter; an unknown category simply
/// matches nothing.
pub fn select(
  dataset: DatasetType,
  category: &str,
) -> Vec<&'static VariableInfo> {
  variables(dataset)
    .filter(|v| category == "all" || v.category.as_str() == category)
    .collect()
}

/// The variable listing as a table.
///
/// `dataset_type` is validated exactly as in [`crate::FinanceQuery::parse`].
pub fn list_variables(dataset_type: &str, category: &str) -> Result<Table> {
  let dataset: DatasetType = dataset_type.parse()?;
  let rows = select(dataset, category);

  from_columns([
    ("variable", strings(rows.iter().map(|v| Some(v.name)))),
    ("type", strings(rows.iter().map(|v| Some(v.kind.as_str())))),
    ("category", strings(rows.iter().map(|v| Some(v.category.as_str())))),
    ("source", strings(rows.iter().map(|v| Some(v.source)))),
    (
      "first_year_available",
      integers(rows.iter().map(|v| Some(i64::from(v.first_year)))),
    ),
    ("description", strings(rows.iter().map(|v| Some(v.description)))),
    ("unit", strings(rows.iter().map(|v| Some(v.unit.as_str())))),
  ])
}
