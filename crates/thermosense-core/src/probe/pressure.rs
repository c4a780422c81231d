//! Thermal-pressure level parsing.
//!
//! Source text is the output of `sudo -n powermetrics -n 1 -s thermal`,
//! which prints a line like `Current pressure level: Nominal`. Anything
//! else (denied privilege, missing utility, changed output format) reads
//! as `None`.

use super::ThermalPressure;

const PRESSURE_LABEL: &str = "Current pressure level:";

/// Parse the coarse thermal-pressure level out of a power-diagnostics dump.
pub fn parse_pressure_level(output: &str) -> Option<ThermalPressure> {
    let at = output.find(PRESSURE_LABEL)?;
    let word = output[at + PRESSURE_LABEL.len()..]
        .split_whitespace()
        .next()?;
    match word {
        "Nominal" => Some(ThermalPressure::Nominal),
        "Elevated" => Some(ThermalPressure::Elevated),
        "Serious" => Some(ThermalPressure::Serious),
        "Critical" => Some(ThermalPressure::Critical),
        _ => None,
    }
}
