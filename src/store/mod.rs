//! CSV-backed historical store.
//!
//! Two append-only logs under the configured data directory - one for raw
//! current-conditions readings, one for daily observations - plus an
//! analysis artifact overwritten on each summary computation. There is no
//! schema versioning: adding a column requires a coordinated migration of
//! existing rows.

pub mod analysis;

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Days, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::{AnalysisSummary, CurrentConditions, Observation};
use crate::error::ServiceError;

const CURRENT_FILE: &str = "current_weather.csv";
const HISTORY_FILE: &str = "historical_weather.csv";
const ANALYSIS_FILE: &str = "weather_analysis.json";

pub struct CsvStore {
    current_path: PathBuf,
    history_path: PathBuf,
    analysis_path: PathBuf,
    /// Serializes appends and artifact writes. Single-process exclusion
    /// only; cross-process locking is out of scope.
    write_lock: Mutex<()>,
}

impl CsvStore {
    /// Open the store, creating the data directory and empty logs on first
    /// use. Header rows are derived from the record structs on the first
    /// append, so the logs cannot drift from the domain model.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let store = Self {
            current_path: data_dir.join(CURRENT_FILE),
            history_path: data_dir.join(HISTORY_FILE),
            analysis_path: data_dir.join(ANALYSIS_FILE),
            write_lock: Mutex::new(()),
        };
        touch(&store.current_path)?;
        touch(&store.history_path)?;
        Ok(store)
    }

    /// Record one live reading: append to the current-conditions log and
    /// derive the daily observation for the historical log.
    pub fn record(&self, conditions: &CurrentConditions) -> crate::error::Result<()> {
        let observation = conditions.to_observation();
        let _guard = self.write_lock.lock();
        append_row(&self.current_path, conditions)?;
        append_row(&self.history_path, &observation)?;
        debug!(city = %conditions.city, "recorded live reading");
        Ok(())
    }

    /// Append one observation to the historical log. Duplicate submissions
    /// create duplicate rows; idempotency is not guaranteed.
    pub fn append_observation(&self, observation: &Observation) -> crate::error::Result<()> {
        let _guard = self.write_lock.lock();
        append_row(&self.history_path, observation)
    }

    /// Full observation history in the log's natural (append) order.
    pub fn load_history(&self) -> crate::error::Result<Vec<Observation>> {
        read_log(&self.history_path)
    }

    /// Range query over the historical log, inclusive bounds, natural order.
    pub fn query(
        &self,
        city: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> crate::error::Result<Vec<Observation>> {
        let rows = self.load_history()?;
        Ok(rows
            .into_iter()
            .filter(|o| city.map_or(true, |c| o.city.as_deref() == Some(c)))
            .filter(|o| start.map_or(true, |s| o.date >= s))
            .filter(|o| end.map_or(true, |e| o.date <= e))
            .collect())
    }

    /// Tail of the current-conditions log.
    pub fn recent(
        &self,
        city: Option<&str>,
        limit: usize,
    ) -> crate::error::Result<Vec<CurrentConditions>> {
        let rows: Vec<CurrentConditions> = read_log::<CurrentConditions>(&self.current_path)?
            .into_iter()
            .filter(|c| city.map_or(true, |wanted| c.city == wanted))
            .collect();
        let skip = rows.len().saturating_sub(limit);
        Ok(rows.into_iter().skip(skip).collect())
    }

    /// Summarize the trailing `window_days` of history, optionally filtered
    /// by city. Fails with `DataUnavailable` when the filtered window is
    /// empty rather than producing statistics over an empty set. The
    /// resulting summary is also written to the analysis artifact,
    /// overwriting the previous one.
    pub fn summarize(
        &self,
        city: Option<&str>,
        window_days: u64,
    ) -> crate::error::Result<AnalysisSummary> {
        let cutoff = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(window_days))
            .ok_or_else(|| ServiceError::MalformedInput(format!("bad window: {window_days}")))?;

        let rows = self.query(city, Some(cutoff), None)?;
        let summary = analysis::summarize_observations(&rows).ok_or_else(|| {
            ServiceError::DataUnavailable("no data available for the specified period".to_string())
        })?;

        let json = serde_json::to_string_pretty(&summary)
            .context("failed to serialize analysis summary")?;
        {
            let _guard = self.write_lock.lock();
            fs::write(&self.analysis_path, json)
                .with_context(|| format!("failed to write {}", self.analysis_path.display()))?;
        }

        Ok(summary)
    }

    pub fn analysis_path(&self) -> &Path {
        &self.analysis_path
    }
}

fn touch(path: &Path) -> Result<()> {
    if !path.exists() {
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(())
}

fn append_row<T: Serialize>(path: &Path, row: &T) -> crate::error::Result<()> {
    // The first append into an empty log also writes the header row.
    let is_empty = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
        .map_err(ServiceError::Internal)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_empty)
        .from_writer(file);
    writer
        .serialize(row)
        .and_then(|()| writer.flush().map_err(Into::into))
        .map_err(|e| ServiceError::Internal(anyhow!("failed to append to {}: {e}", path.display())))
}

fn read_log<T: DeserializeOwned>(path: &Path) -> crate::error::Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))
        .map_err(ServiceError::Internal)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|e| {
            ServiceError::MalformedInput(format!("bad row in {}: {e}", path.display()))
        })?;
        rows.push(row);
    }
    Ok(rows)
}
