//! Tests for the cache directory, the artifact decoder and
//! `CachedArtifactStore`, against temporary directories.

use std::{
  path::Path,
  sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use arrow::{
  array::{AsArray, Float64Array, Int64Array},
  datatypes::{DataType, Float64Type, Int64Type},
};
use chrono::TimeDelta;
use edfin_core::{
  DatasetType, FetchOptions, FinanceQuery, get_finance_data,
  store::ArtifactStore,
  variables::{CPI_INDEX, ColumnType, STATE, YEAR, variables},
};
use rusqlite::types::Value;
use tempfile::TempDir;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{method, path},
};

use crate::{
  ARTIFACT_TABLE, ArtifactUrls, CacheDir, CachedArtifactStore, Error, Fetcher,
  HttpFetcher, Result, read_table,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

const YEARS: [i64; 3] = [2020, 2021, 2022];
const STATES: [&str; 3] = ["KY", "TN", "OH"];

fn cpi_for(year: i64) -> f64 { 1.0 / (1.0 + 0.03 * (year - 2012) as f64) }

fn sql_type(kind: ColumnType) -> &'static str {
  match kind {
    ColumnType::Character => "TEXT",
    ColumnType::Integer => "INTEGER",
    ColumnType::Numeric => "REAL",
  }
}

/// Write an artifact holding every registry column of `dataset`, one row per
/// year and state.
fn write_artifact(dest: &Path, dataset: DatasetType) {
  let conn = rusqlite::Connection::open(dest).unwrap();
  let vars: Vec<_> = variables(dataset).collect();

  let columns = vars
    .iter()
    .map(|v| format!("\"{}\" {}", v.name, sql_type(v.kind)))
    .collect::<Vec<_>>()
    .join(", ");
  conn
    .execute_batch(&format!("CREATE TABLE {ARTIFACT_TABLE} ({columns})"))
    .unwrap();

  let placeholders = vec!["?"; vars.len()].join(", ");
  let insert = format!("INSERT INTO {ARTIFACT_TABLE} VALUES ({placeholders})");
  for year in YEARS {
    for state in STATES {
      let row = vars.iter().map(|v| match (v.name, v.kind) {
        (YEAR, _) => Value::Integer(year),
        (STATE, _) => Value::Text(state.to_owned()),
        (CPI_INDEX, _) => Value::Real(cpi_for(year)),
        (_, ColumnType::Character) => Value::Text(format!("{}-{state}", v.name)),
        (_, ColumnType::Integer) => Value::Integer(100),
        (_, ColumnType::Numeric) => Value::Real(1000.0),
      });
      conn
        .execute(&insert, rusqlite::params_from_iter(row))
        .unwrap();
    }
  }
}

fn artifact_bytes(dataset: DatasetType) -> Vec<u8> {
  let tmp = TempDir::new().unwrap();
  let file = tmp.path().join("artifact.sqlite");
  write_artifact(&file, dataset);
  std::fs::read(file).unwrap()
}

/// Writes fixture artifacts directly, or fails after leaving a partial file.
#[derive(Debug, Default)]
struct FakeFetcher {
  calls: AtomicUsize,
  fail:  AtomicBool,
}

impl FakeFetcher {
  fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl Fetcher for FakeFetcher {
  async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail.load(Ordering::SeqCst) {
      std::fs::write(dest, b"partial").unwrap();
      return Err(Error::Status {
        url:    url.to_owned(),
        status: 503,
      });
    }
    let dataset = if url.ends_with("edfin_full.sqlite") {
      DatasetType::Full
    } else {
      DatasetType::Skinny
    };
    write_artifact(dest, dataset);
    Ok(std::fs::metadata(dest).unwrap().len())
  }
}

fn fake_store(tmp: &TempDir) -> CachedArtifactStore<FakeFetcher> {
  CachedArtifactStore::with_fetcher(
    CacheDir::new(tmp.path().join("cache")),
    FakeFetcher::default(),
  )
}

fn file_names(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}

// ─── CacheDir ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_creates_the_directory_once() {
  let tmp = TempDir::new().unwrap();
  let dir = CacheDir::new(tmp.path().join("a").join("b"));
  assert!(!dir.root().exists());

  dir.ensure().await.unwrap();
  assert!(dir.root().is_dir());
  dir.ensure().await.unwrap();
  assert!(dir.root().is_dir());
}

#[test]
fn resolve_joins_the_artifact_name() {
  let dir = CacheDir::new("/var/cache/edfin");
  assert_eq!(
    dir.resolve("edfin_full"),
    Path::new("/var/cache/edfin/edfin_full.sqlite")
  );
  assert_eq!(
    dir.artifact_path(DatasetType::Skinny),
    Path::new("/var/cache/edfin/edfin_skinny.sqlite")
  );
}

#[tokio::test]
async fn missing_entry_is_not_current() {
  let tmp = TempDir::new().unwrap();
  let dir = CacheDir::new(tmp.path());
  assert!(dir.entry("edfin_skinny").await.unwrap().is_none());
  assert!(
    !dir
      .is_current("edfin_skinny", TimeDelta::days(30))
      .await
      .unwrap()
  );
  assert!(dir.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn freshness_boundary_is_strict() {
  let tmp = TempDir::new().unwrap();
  let dir = CacheDir::new(tmp.path());
  std::fs::write(dir.resolve("edfin_skinny"), b"x").unwrap();

  let entry = dir.entry("edfin_skinny").await.unwrap().unwrap();
  assert_eq!(entry.name, "edfin_skinny");
  let max_age = TimeDelta::days(30);

  let just_inside = entry.modified + max_age - TimeDelta::seconds(1);
  let exactly = entry.modified + max_age;
  assert!(dir.is_current_at("edfin_skinny", max_age, just_inside).await.unwrap());
  assert!(!dir.is_current_at("edfin_skinny", max_age, exactly).await.unwrap());
  assert!(
    !dir
      .is_current_at("edfin_skinny", max_age, exactly + TimeDelta::days(1))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn entries_lists_only_present_artifacts() {
  let tmp = TempDir::new().unwrap();
  let dir = CacheDir::new(tmp.path());
  std::fs::write(dir.resolve("edfin_full"), b"x").unwrap();
  std::fs::write(tmp.path().join("unrelated.txt"), b"x").unwrap();

  let entries = dir.entries().await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].name, "edfin_full");
}

// ─── Decoding ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn decodes_registry_types_with_coercion() {
  let tmp = TempDir::new().unwrap();
  let file = tmp.path().join("mixed.sqlite");
  {
    let conn = rusqlite::Connection::open(&file).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE edfin (year, state, enroll, rev_total, extra);
         INSERT INTO edfin VALUES (2020.0, 'KY', '350', 12, NULL);
         INSERT INTO edfin VALUES ('2021', 'TN', NULL, 'n/a', 1.5);",
      )
      .unwrap();
  }

  let table = read_table(&file).await.unwrap();
  assert_eq!(table.num_rows(), 2);
  let int64 = |name: &str| table.column_by_name(name).unwrap().as_primitive::<Int64Type>().clone();
  let float64 =
    |name: &str| table.column_by_name(name).unwrap().as_primitive::<Float64Type>().clone();
  assert_eq!(int64(YEAR), Int64Array::from(vec![Some(2020), Some(2021)]));
  assert_eq!(int64("enroll"), Int64Array::from(vec![Some(350), None]));
  assert_eq!(float64("rev_total"), Float64Array::from(vec![Some(12.0), None]));
  assert_eq!(float64("extra"), Float64Array::from(vec![None, Some(1.5)]));
  assert_eq!(
    table.schema().field_with_name(STATE).unwrap().data_type(),
    &DataType::Utf8
  );
}

#[tokio::test]
async fn artifact_without_data_table_is_rejected() {
  let tmp = TempDir::new().unwrap();
  let file = tmp.path().join("empty.sqlite");
  {
    let conn = rusqlite::Connection::open(&file).unwrap();
    conn.execute_batch("CREATE TABLE other (x)").unwrap();
  }
  let err = read_table(&file).await.unwrap_err();
  assert!(matches!(err, Error::MissingTable { .. }), "{err}");
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_before_download_is_not_cached() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp);
  assert!(!store.is_current(DatasetType::Skinny).await.unwrap());
  let err = store.load(DatasetType::Skinny).await.unwrap_err();
  assert!(matches!(err, Error::NotCached(_)));
}

#[tokio::test]
async fn download_then_load() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp);

  let entry = store.download(DatasetType::Full).await.unwrap();
  assert_eq!(entry.name, "edfin_full");
  assert_eq!(entry.path, store.cache_dir().artifact_path(DatasetType::Full));
  assert!(store.is_current(DatasetType::Full).await.unwrap());
  assert!(!store.is_current(DatasetType::Skinny).await.unwrap());

  let table = store.load(DatasetType::Full).await.unwrap();
  assert_eq!(table.num_rows(), YEARS.len() * STATES.len());
  assert_eq!(table.num_columns(), variables(DatasetType::Full).count());
}

#[tokio::test]
async fn zero_max_age_is_never_current() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp).max_age(TimeDelta::zero());
  store.download(DatasetType::Skinny).await.unwrap();
  assert!(!store.is_current(DatasetType::Skinny).await.unwrap());
}

#[tokio::test]
async fn failed_download_keeps_the_previous_artifact() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp);
  let path = store.cache_dir().artifact_path(DatasetType::Skinny);

  store.download(DatasetType::Skinny).await.unwrap();
  let before = std::fs::read(&path).unwrap();

  store.fetcher().fail.store(true, Ordering::SeqCst);
  let err = store.download(DatasetType::Skinny).await.unwrap_err();
  assert!(matches!(err, Error::Status { status: 503, .. }));

  assert_eq!(std::fs::read(&path).unwrap(), before);
  assert_eq!(
    file_names(store.cache_dir().root()),
    vec!["edfin_skinny.sqlite".to_owned()]
  );
  store.load(DatasetType::Skinny).await.unwrap();
}

#[tokio::test]
async fn concurrent_downloads_of_one_variant_are_serialised() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp);
  let (a, b) = tokio::join!(
    store.download(DatasetType::Skinny),
    store.download(DatasetType::Skinny)
  );
  a.unwrap();
  b.unwrap();
  assert_eq!(store.fetcher().calls(), 2);
  store.load(DatasetType::Skinny).await.unwrap();
}

// ─── Engine over the disk store ──────────────────────────────────────────────

#[tokio::test]
async fn engine_downloads_once_and_filters() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp);
  let query = FinanceQuery::parse("2020:2021", "KY,TN", "skinny", "none").unwrap();

  let first = get_finance_data(&store, &query, FetchOptions::default())
    .await
    .unwrap();
  let second = get_finance_data(&store, &query, FetchOptions::default())
    .await
    .unwrap();

  assert_eq!(first, second);
  assert_eq!(first.num_rows(), 2 * 2);
  assert_eq!(store.fetcher().calls(), 1);
}

#[tokio::test]
async fn engine_refresh_redownloads() {
  let tmp = TempDir::new().unwrap();
  let store = fake_store(&tmp);
  let query = FinanceQuery::parse("2022", "all", "full", "2020").unwrap();
  let refresh = FetchOptions {
    refresh: true,
    quiet:   true,
  };

  get_finance_data(&store, &query, refresh).await.unwrap();
  let table = get_finance_data(&store, &query, refresh).await.unwrap();

  assert_eq!(store.fetcher().calls(), 2);
  assert_eq!(table.num_rows(), STATES.len());
  assert!(table.column_by_name(edfin_core::cpi::ADJUSTMENT_INDEX).is_some());
}

// ─── HttpFetcher ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn http_fetcher_streams_the_body() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/edfin_skinny.sqlite"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(b"artifact".to_vec()))
    .expect(1)
    .mount(&server)
    .await;

  let tmp = TempDir::new().unwrap();
  let dest = tmp.path().join("out");
  let url = format!("{}/edfin_skinny.sqlite", server.uri());
  let bytes = HttpFetcher::new().unwrap().fetch(&url, &dest).await.unwrap();

  assert_eq!(bytes, 8);
  assert_eq!(std::fs::read(&dest).unwrap(), b"artifact");
}

#[tokio::test]
async fn http_fetcher_reports_status_and_url() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;

  let tmp = TempDir::new().unwrap();
  let dest = tmp.path().join("out");
  let url = format!("{}/missing.sqlite", server.uri());
  let err = HttpFetcher::new().unwrap().fetch(&url, &dest).await.unwrap_err();

  match &err {
    Error::Status { url: got, status } => {
      assert_eq!(*status, 404);
      assert_eq!(got, &url);
    }
    other => panic!("expected status error, got {other}"),
  }
  assert!(err.to_string().contains("missing.sqlite"));
  assert!(!dest.exists());
}

#[tokio::test]
async fn store_over_http_caches_between_queries() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/edfin_skinny.sqlite"))
    .respond_with(
      ResponseTemplate::new(200).set_body_bytes(artifact_bytes(DatasetType::Skinny)),
    )
    .expect(1)
    .mount(&server)
    .await;

  let tmp = TempDir::new().unwrap();
  let store = CachedArtifactStore::open(CacheDir::new(tmp.path()))
    .unwrap()
    .urls(ArtifactUrls {
      skinny: format!("{}/edfin_skinny.sqlite", server.uri()),
      full:   format!("{}/edfin_full.sqlite", server.uri()),
    });
  let query = FinanceQuery::parse("all", "OH", "skinny", "2022").unwrap();

  for _ in 0..2 {
    let table = get_finance_data(&store, &query, FetchOptions::default())
      .await
      .unwrap();
    assert_eq!(table.num_rows(), YEARS.len());
  }
}

#[tokio::test]
async fn http_failure_surfaces_through_the_engine() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let tmp = TempDir::new().unwrap();
  let store = CachedArtifactStore::open(CacheDir::new(tmp.path()))
    .unwrap()
    .urls(ArtifactUrls {
      skinny: format!("{}/edfin_skinny.sqlite", server.uri()),
      full:   format!("{}/edfin_full.sqlite", server.uri()),
    });
  let query = FinanceQuery::default();

  let err = get_finance_data(&store, &query, FetchOptions::default())
    .await
    .unwrap_err();
  assert!(matches!(err, edfin_core::Error::Store(_)));
  assert!(file_names(tmp.path()).is_empty());
}
