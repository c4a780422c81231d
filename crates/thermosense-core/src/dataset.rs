//! Training dataset loading and splitting.
//!
//! The advisory model is fitted offline on a tabular dataset with the fixed
//! header `battery_temp,ambient_temp,device_state,measured_health_impact`.
//! Loading is strict: a malformed row is a fatal warm-up error, never a
//! silently skipped one. Splitting is a seeded shuffle so a given
//! (dataset, seed) pair always reproduces the same train/holdout partition.

use std::fmt;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Expected CSV header, in order.
const HEADER: &str = "battery_temp,ambient_temp,device_state,measured_health_impact";

/// One labeled observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub battery_temp: f64,
    pub ambient_temp: f64,
    pub device_state: String,
    pub measured_health_impact: f64,
}

/// In-memory training dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<TrainingRow>,
}

/// Dataset loading failures. All are fatal at warm-up.
#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    /// First non-blank line did not match the expected header.
    BadHeader { found: String },
    /// A data row had the wrong column count or an unparsable number.
    BadRow { line: usize, content: String },
    /// File contained a header but no data rows.
    Empty,
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read dataset: {e}"),
            Self::BadHeader { found } => {
                write!(f, "bad dataset header {found:?} (expected {HEADER:?})")
            }
            Self::BadRow { line, content } => {
                write!(f, "bad dataset row at line {line}: {content:?}")
            }
            Self::Empty => write!(f, "dataset contains no data rows"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Dataset {
    /// Load a dataset from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_csv_str(&text)
    }

    /// Parse a dataset from CSV text with the fixed four-column header.
    pub fn from_csv_str(text: &str) -> Result<Self, DatasetError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(DatasetError::Empty)?;
        if header.trim() != HEADER {
            return Err(DatasetError::BadHeader {
                found: header.trim().to_string(),
            });
        }

        let mut rows = Vec::new();
        for (idx, line) in lines {
            let row = parse_row(line).ok_or_else(|| DatasetError::BadRow {
                line: idx + 1,
                content: line.to_string(),
            })?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct device states present in the dataset (unsorted, in
    /// first-seen order; the encoder sorts its own copy at fit time).
    pub fn device_states(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.device_state.as_str()) {
                seen.push(&row.device_state);
            }
        }
        seen
    }

    /// Seeded shuffle split into (train, holdout).
    ///
    /// `test_fraction` is clamped to `[0, 1]`. With a non-empty dataset the
    /// train side always keeps at least one row.
    pub fn split_train_test(&self, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let frac = test_fraction.clamp(0.0, 1.0);
        let mut n_test = (self.rows.len() as f64 * frac).round() as usize;
        if n_test >= self.rows.len() && !self.rows.is_empty() {
            n_test = self.rows.len() - 1;
        }

        let (test_idx, train_idx) = indices.split_at(n_test);
        let pick = |idx: &[usize]| Dataset {
            rows: idx.iter().map(|&i| self.rows[i].clone()).collect(),
        };
        (pick(train_idx), pick(test_idx))
    }

    /// Deterministic synthetic dataset for tests and demos.
    ///
    /// Impact grows with both temperatures and is highest while charging,
    /// mirroring the shape of real measured data closely enough to exercise
    /// the whole pipeline.
    pub fn synthetic(n: usize, seed: u64) -> Self {
        use rand::Rng;
        let mut rng = StdRng::seed_from_u64(seed);
        let states = ["charging", "discharging", "idle"];

        let rows = (0..n)
            .map(|i| {
                let battery_temp: f64 = rng.random_range(18.0..50.0);
                let ambient_temp: f64 = rng.random_range(10.0..40.0);
                let device_state = states[i % states.len()];
                let state_load = match device_state {
                    "charging" => 0.03,
                    "discharging" => 0.015,
                    _ => 0.0,
                };
                let impact = ((battery_temp - 20.0).max(0.0) * 0.002
                    + (ambient_temp - 15.0).max(0.0) * 0.001
                    + state_load
                    + rng.random_range(-0.004..0.004))
                .max(0.0);
                TrainingRow {
                    battery_temp,
                    ambient_temp,
                    device_state: device_state.to_string(),
                    measured_health_impact: impact,
                }
            })
            .collect();

        Self { rows }
    }
}

fn parse_row(line: &str) -> Option<TrainingRow> {
    let mut cols = line.split(',').map(str::trim);
    let battery_temp = cols.next()?.parse().ok()?;
    let ambient_temp = cols.next()?.parse().ok()?;
    let device_state = cols.next()?.to_string();
    let measured_health_impact = cols.next()?.parse().ok()?;
    if cols.next().is_some() || device_state.is_empty() {
        return None;
    }
    Some(TrainingRow {
        battery_temp,
        ambient_temp,
        device_state,
        measured_health_impact,
    })
}
