//! Natural-language tip generation.
//!
//! Tips come from an external text-completion capability behind the
//! single-method [`TextCompletion`] trait. The generator owns the prompt
//! contract: a fixed few-shot block followed by the live values, truncated
//! to the backend's input limit, with the returned text capped in length.
//! A backend failure propagates to the pipeline; no placeholder tip is
//! invented here, so a broken generation backend stays visible.

use crate::advisory::alert::AlertLevel;

/// Few-shot block prepended to every prompt.
const FEW_SHOT: &str = "Given the data below, output a concise, actionable battery-safety tip.\n\
Example:\n\
- Battery: 45.0\u{b0}C, Ambient: 32.0\u{b0}C, State: Charging, Impact: 0.128 -> \
\"Danger: Unplug the charger and let the device cool down immediately.\"\n\n";

/// Default cap on generated tip length, in characters.
const DEFAULT_MAX_TIP_CHARS: usize = 200;

/// Text-completion failure.
#[derive(Debug)]
pub enum CompletionError {
    /// The backend reported an error.
    Backend(String),
    /// The backend did not answer within its deadline.
    TimedOut,
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "completion backend failed: {msg}"),
            Self::TimedOut => write!(f, "completion backend timed out"),
        }
    }
}

impl std::error::Error for CompletionError {}

/// Opaque text-completion capability: prompt in, bounded text out.
pub trait TextCompletion: Send + Sync {
    /// Complete `prompt` with a short generated continuation.
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Maximum prompt length the backend accepts, in characters. Prompts
    /// longer than this are truncated from the front so the live values at
    /// the tail survive.
    fn max_input_chars(&self) -> usize {
        2048
    }
}

/// Builds prompts and drives a [`TextCompletion`] backend.
#[derive(Debug, Clone)]
pub struct TipGenerator {
    max_tip_chars: usize,
}

impl Default for TipGenerator {
    fn default() -> Self {
        Self {
            max_tip_chars: DEFAULT_MAX_TIP_CHARS,
        }
    }
}

impl TipGenerator {
    /// Generate a safety tip for the given reading and predicted impact.
    ///
    /// No retries: a backend failure is returned as-is.
    pub fn generate(
        &self,
        backend: &dyn TextCompletion,
        battery_temp: f64,
        ambient_temp: f64,
        device_state: &str,
        impact: f64,
    ) -> Result<String, CompletionError> {
        let prompt = build_prompt(battery_temp, ambient_temp, device_state, impact);
        let prompt = truncate_tail_chars(&prompt, backend.max_input_chars());
        let tip = backend.complete(&prompt)?;
        Ok(truncate_head_chars(tip.trim(), self.max_tip_chars))
    }
}

/// Deterministic prompt: few-shot block + live values.
pub fn build_prompt(battery_temp: f64, ambient_temp: f64, device_state: &str, impact: f64) -> String {
    format!(
        "{FEW_SHOT}Battery: {battery_temp:.1}\u{b0}C, Ambient: {ambient_temp:.1}\u{b0}C, \
         State: {}, Impact: {impact:.3} ->",
        capitalize(device_state)
    )
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Keep at most the last `max` characters (char-boundary safe).
fn truncate_tail_chars(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    s.chars().skip(n - max).collect()
}

/// Keep at most the first `max` characters (char-boundary safe).
fn truncate_head_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Built-in deterministic backend.
///
/// Stands in for a generative model so the pipeline is runnable
/// self-contained: it reads the live values off the prompt tail and picks a
/// tip worded for that regime. Swap in a real backend through
/// [`TextCompletion`] for actual generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCompletion;

impl TextCompletion for HeuristicCompletion {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let impact = trailing_number(prompt, "Impact: ").unwrap_or(0.0);
        let battery_temp = trailing_number(prompt, "Battery: ").unwrap_or(0.0);
        let charging = trailing_word(prompt, "State: ") == Some("Charging");

        let tip = match AlertLevel::from_impact(impact) {
            AlertLevel::Danger if charging => {
                "Danger: Unplug the charger and let the device cool down immediately."
            }
            AlertLevel::Danger => {
                "Danger: Power the device down and move it somewhere cooler before using it again."
            }
            AlertLevel::Warning if battery_temp >= 40.0 => {
                "Warning: The battery is running hot; close heavy apps and keep the device ventilated."
            }
            AlertLevel::Warning => {
                "Warning: Thermal stress is building; lighten the workload and avoid direct sunlight."
            }
            AlertLevel::Safe => {
                "The device is operating within a safe thermal range; no action needed."
            }
        };
        Ok(tip.to_string())
    }
}

/// The word that follows the last occurrence of `label`. The last
/// occurrence is the live line; earlier ones belong to the few-shot block.
fn trailing_word<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let at = text.rfind(label)? + label.len();
    text[at..]
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .filter(|w| !w.is_empty())
}

/// Parse the number that follows the last occurrence of `label`.
fn trailing_number(text: &str, label: &str) -> Option<f64> {
    let at = text.rfind(label)? + label.len();
    let rest = &text[at..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
