//! Fixed-threshold alert classification.

use serde::{Deserialize, Serialize};

/// Impact strictly above this is a danger.
const DANGER_THRESHOLD: f64 = 0.07;
/// Impact strictly above this (and not danger) is a warning.
const WARNING_THRESHOLD: f64 = 0.04;

/// Discrete alert level derived from a predicted health-impact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Safe,
    Warning,
    Danger,
}

impl AlertLevel {
    /// Classify an impact score. Boundaries are strict greater-than:
    /// exactly 0.07 is a warning, exactly 0.04 is safe.
    pub fn from_impact(impact: f64) -> Self {
        if impact > DANGER_THRESHOLD {
            Self::Danger
        } else if impact > WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Safe
        }
    }

    /// Recommended action for this level. `None` iff the level is safe.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Self::Danger => Some("Stop using the device and let it cool."),
            Self::Warning => Some("Reduce screen brightness and workload."),
            Self::Safe => None,
        }
    }

    /// Severity rank for monotonicity comparisons (safe < warning < danger).
    pub fn severity(&self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Warning => 1,
            Self::Danger => 2,
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Warning => write!(f, "warning"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_boundaries_round_down_in_severity() {
        assert_eq!(AlertLevel::from_impact(0.07), AlertLevel::Warning);
        assert_eq!(AlertLevel::from_impact(0.04), AlertLevel::Safe);
    }

    #[test]
    fn just_above_boundaries_escalate() {
        assert_eq!(AlertLevel::from_impact(0.0700001), AlertLevel::Danger);
        assert_eq!(AlertLevel::from_impact(0.0400001), AlertLevel::Warning);
    }

    #[test]
    fn extremes() {
        assert_eq!(AlertLevel::from_impact(0.0), AlertLevel::Safe);
        assert_eq!(AlertLevel::from_impact(-1.0), AlertLevel::Safe);
        assert_eq!(AlertLevel::from_impact(10.0), AlertLevel::Danger);
    }

    #[test]
    fn classification_is_monotonic_in_impact() {
        let mut last = 0;
        let mut impact = -0.01;
        while impact < 0.12 {
            let severity = AlertLevel::from_impact(impact).severity();
            assert!(
                severity >= last,
                "severity dropped from {last} to {severity} at impact {impact}"
            );
            last = severity;
            impact += 0.0005;
        }
    }

    #[test]
    fn action_is_none_iff_safe() {
        assert!(AlertLevel::Safe.action().is_none());
        assert!(AlertLevel::Warning.action().is_some());
        assert!(AlertLevel::Danger.action().is_some());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AlertLevel::Danger).unwrap(),
            "\"danger\""
        );
        let back: AlertLevel = serde_json::from_str("\"safe\"").unwrap();
        assert_eq!(back, AlertLevel::Safe);
    }
}
