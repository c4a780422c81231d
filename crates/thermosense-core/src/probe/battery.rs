//! Smart-battery registry parsing.
//!
//! Works over the text dump of `ioreg -r -n AppleSmartBattery`. Temperature
//! units differ by hardware generation and the registry does not say which
//! one it is using, so the value is disambiguated by magnitude:
//!
//! - `raw > 2000` — hundredths of a degree Celsius (newer silicon,
//!   e.g. 3043 → 30.43 °C),
//! - otherwise — tenths of a Kelvin (older hardware).
//!
//! The `> 2000` cutoff is an observed heuristic with no documented hardware
//! justification; it is preserved exactly and pinned down in tests.

/// Extract the raw token following `"key" = ` anywhere in the dump.
fn registry_token<'a>(dump: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\"");
    for line in dump.lines() {
        let Some(at) = line.find(&needle) else {
            continue;
        };
        let rest = line[at + needle.len()..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let token = rest
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == ',' || c == '}')
            .next()
            .unwrap_or("");
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

/// Integer-valued registry property.
pub fn registry_int(dump: &str, key: &str) -> Option<i64> {
    registry_token(dump, key)?.parse().ok()
}

/// Boolean registry property (`Yes`/`No` in ioreg output).
pub fn registry_bool(dump: &str, key: &str) -> Option<bool> {
    match registry_token(dump, key)? {
        "Yes" | "true" => Some(true),
        "No" | "false" => Some(false),
        _ => None,
    }
}

/// Battery temperature in °C, rounded to one decimal, or `None` when the
/// property is absent or unparsable.
pub fn temp_celsius(dump: &str) -> Option<f64> {
    let raw = registry_int(dump, "Temperature")?;
    let celsius = if raw > 2000 {
        raw as f64 / 100.0
    } else {
        raw as f64 / 10.0 - 273.15
    };
    Some((celsius * 10.0).round() / 10.0)
}

/// Battery charge percent, or `None` when no battery is present.
///
/// Newer firmware reports `CurrentCapacity` directly as a percent
/// (`MaxCapacity` = 100); older firmware reports both in mAh. The ratio
/// handles either.
pub fn percent(dump: &str) -> Option<f64> {
    let current = registry_int(dump, "CurrentCapacity")?;
    let max = registry_int(dump, "MaxCapacity")?;
    if max <= 0 {
        return None;
    }
    Some((current as f64 / max as f64 * 100.0).clamp(0.0, 100.0))
}

/// Whether power is flowing into the battery. Prefers `IsCharging`, falls
/// back to `ExternalConnected`.
pub fn charging(dump: &str) -> Option<bool> {
    registry_bool(dump, "IsCharging").or_else(|| registry_bool(dump, "ExternalConnected"))
}
