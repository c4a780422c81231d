//! Advisory inference pipeline.
//!
//! Warm-up fits a one-hot encoder and a random-forest regressor from a
//! training dataset; after that the [`AdvisoryEngine`] is immutable and a
//! call runs encode → predict → classify → generate tip → assemble result.
//! The only side effect on the inference path is the completion call.

pub mod alert;
pub mod encoder;
pub mod forest;
pub mod tips;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use alert::AlertLevel;
use encoder::OneHotEncoder;
use forest::{ForestConfig, RandomForest};
use tips::{CompletionError, TextCompletion, TipGenerator};

/// Train/holdout split fraction used at warm-up.
const TEST_FRACTION: f64 = 0.2;
/// Seed for the split and the forest bootstrap, fixed for reproducibility.
const TRAIN_SEED: u64 = 42;

/// One advisory request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryInput {
    pub battery_temp: f64,
    pub ambient_temp: f64,
    /// `charging`, `discharging` or `idle`. Anything else is tolerated and
    /// encodes as an unknown category rather than being rejected.
    pub device_state: String,
}

/// One advisory response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResult {
    pub alert_level: AlertLevel,
    pub natural_language_tip: String,
    pub optional_action: Option<String>,
    /// Predicted health impact, rounded to 5 decimal places.
    pub predicted_health_impact: f64,
}

/// Per-request pipeline failure. Telemetry-style degradation does not apply
/// here: a failed advisory call returns no partial result.
#[derive(Debug)]
pub enum AdvisoryError {
    /// The text-completion capability failed; the whole call fails with it.
    Completion(CompletionError),
}

impl std::fmt::Display for AdvisoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completion(e) => write!(f, "tip generation failed: {e}"),
        }
    }
}

impl std::error::Error for AdvisoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Completion(e) => Some(e),
        }
    }
}

impl From<CompletionError> for AdvisoryError {
    fn from(e: CompletionError) -> Self {
        Self::Completion(e)
    }
}

/// Warm-up failure. Fatal at process start; the engine never serves
/// requests half-fitted.
#[derive(Debug)]
pub enum TrainError {
    /// Not enough rows to fit a model at all.
    NotEnoughRows { rows: usize, min: usize },
}

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEnoughRows { rows, min } => {
                write!(f, "dataset has {rows} rows, need at least {min} to train")
            }
        }
    }
}

impl std::error::Error for TrainError {}

/// Fitted advisory pipeline: encoder + forest + tip generation.
///
/// All fitted state is read-only after [`AdvisoryEngine::train`], so the
/// engine can be shared across threads (e.g. in an `Arc`) without locking.
pub struct AdvisoryEngine {
    encoder: OneHotEncoder,
    forest: RandomForest,
    generator: TipGenerator,
    completion: Box<dyn TextCompletion>,
}

impl AdvisoryEngine {
    /// Minimum dataset size accepted by [`AdvisoryEngine::train`].
    pub const MIN_TRAINING_ROWS: usize = 5;

    /// Fit the encoder and forest from `dataset` (80/20 seeded split; the
    /// encoder's category set comes from the full dataset, the forest from
    /// the training side).
    pub fn train(
        dataset: &Dataset,
        config: ForestConfig,
        completion: Box<dyn TextCompletion>,
    ) -> Result<Self, TrainError> {
        if dataset.len() < Self::MIN_TRAINING_ROWS {
            return Err(TrainError::NotEnoughRows {
                rows: dataset.len(),
                min: Self::MIN_TRAINING_ROWS,
            });
        }

        let encoder = OneHotEncoder::fit(&dataset.device_states());
        let (train, holdout) = dataset.split_train_test(TEST_FRACTION, TRAIN_SEED);

        let rows: Vec<Vec<f64>> = train
            .rows
            .iter()
            .map(|r| encoder.encode(&r.device_state, r.battery_temp, r.ambient_temp))
            .collect();
        let targets: Vec<f64> = train.rows.iter().map(|r| r.measured_health_impact).collect();
        let forest = RandomForest::fit(&rows, &targets, &config, TRAIN_SEED);

        if !holdout.is_empty() {
            let mae: f64 = holdout
                .rows
                .iter()
                .map(|r| {
                    let v = encoder.encode(&r.device_state, r.battery_temp, r.ambient_temp);
                    (forest.predict(&v) - r.measured_health_impact).abs()
                })
                .sum::<f64>()
                / holdout.len() as f64;
            log::info!(
                "advisory model fitted: {} trees on {} rows, holdout MAE {mae:.5} over {} rows",
                forest.n_trees(),
                train.len(),
                holdout.len()
            );
        }

        Ok(Self {
            encoder,
            forest,
            generator: TipGenerator::default(),
            completion,
        })
    }

    /// The fitted encoder (read-only).
    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    /// Predict the raw (unrounded) health impact for an input.
    pub fn predict_impact(&self, input: &AdvisoryInput) -> f64 {
        let features =
            self.encoder
                .encode(&input.device_state, input.battery_temp, input.ambient_temp);
        self.forest.predict(&features)
    }

    /// Run the full pipeline: encode → predict → classify → generate tip →
    /// assemble. Pure apart from the completion call.
    pub fn advise(&self, input: &AdvisoryInput) -> Result<AdvisoryResult, AdvisoryError> {
        let impact = self.predict_impact(input);
        let alert_level = AlertLevel::from_impact(impact);
        let natural_language_tip = self.generator.generate(
            self.completion.as_ref(),
            input.battery_temp,
            input.ambient_temp,
            &input.device_state,
            impact,
        )?;

        Ok(AdvisoryResult {
            alert_level,
            natural_language_tip,
            optional_action: alert_level.action().map(str::to_string),
            predicted_health_impact: round5(impact),
        })
    }
}

/// Round to 5 decimal places.
fn round5(v: f64) -> f64 {
    (v * 100_000.0).round() / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tips::HeuristicCompletion;

    /// Completion stub with a fixed answer.
    struct FixedTip(&'static str);

    impl TextCompletion for FixedTip {
        fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenBackend;

    impl TextCompletion for BrokenBackend {
        fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::TimedOut)
        }
    }

    fn trained_engine(completion: Box<dyn TextCompletion>) -> AdvisoryEngine {
        let dataset = Dataset::synthetic(200, 42);
        let config = ForestConfig {
            n_trees: 30,
            ..ForestConfig::default()
        };
        AdvisoryEngine::train(&dataset, config, completion).unwrap()
    }

    fn charging_input() -> AdvisoryInput {
        AdvisoryInput {
            battery_temp: 42.3,
            ambient_temp: 35.0,
            device_state: "charging".into(),
        }
    }

    #[test]
    fn train_rejects_tiny_datasets() {
        let dataset = Dataset::synthetic(3, 1);
        let Err(err) = AdvisoryEngine::train(
            &dataset,
            ForestConfig::default(),
            Box::new(HeuristicCompletion),
        ) else {
            panic!("training on 3 rows should fail");
        };
        assert!(matches!(err, TrainError::NotEnoughRows { rows: 3, .. }));
    }

    #[test]
    fn advise_assembles_a_consistent_result() {
        let engine = trained_engine(Box::new(FixedTip("keep it cool")));
        let result = engine.advise(&charging_input()).unwrap();

        assert_eq!(result.natural_language_tip, "keep it cool");
        assert_eq!(
            result.alert_level,
            AlertLevel::from_impact(engine.predict_impact(&charging_input()))
        );
        assert_eq!(
            result.optional_action.is_none(),
            result.alert_level == AlertLevel::Safe
        );
    }

    #[test]
    fn impact_is_rounded_to_five_decimals() {
        let engine = trained_engine(Box::new(FixedTip("x")));
        let result = engine.advise(&charging_input()).unwrap();
        let rescaled = result.predicted_health_impact * 100_000.0;
        assert!(
            (rescaled - rescaled.round()).abs() < 1e-9,
            "impact {} not rounded to 5 decimals",
            result.predicted_health_impact
        );
    }

    #[test]
    fn unknown_device_state_is_tolerated() {
        let engine = trained_engine(Box::new(FixedTip("x")));
        let result = engine
            .advise(&AdvisoryInput {
                battery_temp: 30.0,
                ambient_temp: 25.0,
                device_state: "hovering".into(),
            })
            .unwrap();
        assert!(!result.natural_language_tip.is_empty());
    }

    #[test]
    fn completion_failure_fails_the_whole_call() {
        let engine = trained_engine(Box::new(BrokenBackend));
        let err = engine.advise(&charging_input()).unwrap_err();
        assert!(matches!(
            err,
            AdvisoryError::Completion(CompletionError::TimedOut)
        ));
    }

    #[test]
    fn advise_is_deterministic_given_a_fixed_engine() {
        let engine = trained_engine(Box::new(HeuristicCompletion));
        let a = engine.advise(&charging_input()).unwrap();
        let b = engine.advise(&charging_input()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn round5_behaves() {
        assert_eq!(round5(0.123456789), 0.12346);
        assert_eq!(round5(0.1), 0.1);
        assert_eq!(round5(0.0), 0.0);
    }
}
