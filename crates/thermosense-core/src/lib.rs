//! # thermosense-core
//!
//! **Your laptop tells you when it is running too hot.**
//!
//! `thermosense-core` estimates thermal risk for a mobile device from live
//! sensor readings and turns the estimate into a human-readable safety tip.
//! It has two independent halves:
//!
//! - the **telemetry probe**: best-effort host telemetry (battery charge,
//!   battery temperature, CPU load, memory pressure, thermal-pressure level)
//!   with hardware-variant disambiguation. Every sensor degrades to `None`
//!   when it is missing or unauthorized; the probe never fails as a whole.
//! - the **advisory pipeline**: a fitted one-hot encoder plus a random-forest
//!   regressor map `(battery_temp, ambient_temp, device_state)` to a
//!   predicted health-impact score, a discrete alert level, and an advisory
//!   message produced through a pluggable text-completion backend.
//!
//! ## Quick start
//!
//! ```no_run
//! use thermosense_core::{AdvisoryEngine, AdvisoryInput, Dataset, ForestConfig};
//! use thermosense_core::advisory::tips::HeuristicCompletion;
//!
//! let dataset = Dataset::synthetic(200, 42);
//! let engine = AdvisoryEngine::train(
//!     &dataset,
//!     ForestConfig::default(),
//!     Box::new(HeuristicCompletion),
//! ).expect("training data is non-empty");
//!
//! let result = engine.advise(&AdvisoryInput {
//!     battery_temp: 42.3,
//!     ambient_temp: 35.0,
//!     device_state: "charging".into(),
//! }).expect("completion backend is infallible");
//! println!("{}: {}", result.alert_level, result.natural_language_tip);
//! ```
//!
//! ## Architecture
//!
//! Probe:    registry dump / power diagnostics / host counters → SensorReading
//! Pipeline: encode → predict → classify → generate tip → AdvisoryResult
//!
//! The encoder and forest are fitted once at warm-up and are read-only
//! afterwards, so a trained [`AdvisoryEngine`] can be shared across threads
//! without locking.

pub mod advisory;
pub mod dataset;
pub mod probe;

pub use advisory::alert::AlertLevel;
pub use advisory::encoder::OneHotEncoder;
pub use advisory::forest::{ForestConfig, RandomForest};
pub use advisory::tips::{CompletionError, HeuristicCompletion, TextCompletion, TipGenerator};
pub use advisory::{AdvisoryEngine, AdvisoryError, AdvisoryInput, AdvisoryResult, TrainError};
pub use dataset::{Dataset, DatasetError, TrainingRow};
pub use probe::commands::{DiagnosticCommands, SystemCommands};
pub use probe::{SensorReading, ThermalPressure, probe, probe_system};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
