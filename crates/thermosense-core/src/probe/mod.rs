//! Telemetry acquisition with per-field graceful degradation.
//!
//! `probe` queries OS sensors and external diagnostic utilities and returns
//! a structurally complete [`SensorReading`] every time: a sensor that is
//! missing, unauthorized, or times out reads as `None`, never as an error
//! or a missing field. There is no cross-call state — every call is an
//! independent idempotent read.

pub mod battery;
pub mod commands;
pub mod host;
pub mod pressure;

use serde::{Deserialize, Serialize};

use commands::{DiagnosticCommands, SystemCommands};

/// Coarse OS thermal-pressure level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThermalPressure {
    Nominal,
    Elevated,
    Serious,
    Critical,
}

impl std::fmt::Display for ThermalPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nominal => write!(f, "Nominal"),
            Self::Elevated => write!(f, "Elevated"),
            Self::Serious => write!(f, "Serious"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Point-in-time device telemetry snapshot.
///
/// Every field is independently optional except `cpu_load_percent` and
/// `mem_used_percent`, which the OS always provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub battery_percent: Option<f64>,
    pub charging: Option<bool>,
    pub battery_temp_celsius: Option<f64>,
    /// Always `None` on this platform family: the hardware does not expose
    /// the CPU die temperature to user space.
    pub cpu_temp_celsius: Option<f64>,
    pub thermal_pressure: Option<ThermalPressure>,
    pub cpu_load_percent: f64,
    pub mem_used_percent: f64,
}

/// Probe all sensors through the given diagnostic-command capability.
///
/// Each sub-reading is best-effort and independent; a failure in one never
/// affects the others and never escapes this function.
pub fn probe(commands: &dyn DiagnosticCommands) -> SensorReading {
    let battery_dump = commands.smart_battery_dump();
    let (battery_percent, charging, battery_temp_celsius) = match battery_dump.as_deref() {
        Some(dump) => (
            battery::percent(dump),
            battery::charging(dump),
            battery::temp_celsius(dump),
        ),
        None => {
            log::debug!("smart-battery registry unavailable");
            (None, None, None)
        }
    };

    let thermal_pressure = commands
        .thermal_pressure_dump()
        .as_deref()
        .and_then(pressure::parse_pressure_level);
    if thermal_pressure.is_none() {
        log::debug!("thermal-pressure diagnostics unavailable");
    }

    SensorReading {
        battery_percent,
        charging,
        battery_temp_celsius,
        cpu_temp_celsius: None,
        thermal_pressure,
        cpu_load_percent: host::cpu_load_percent(),
        mem_used_percent: host::mem_used_percent(),
    }
}

/// Probe using the real subprocess-backed commands with default timeouts.
pub fn probe_system() -> SensorReading {
    probe(&SystemCommands::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned-output stub; `None` fields model missing utilities.
    struct CannedCommands {
        battery: Option<&'static str>,
        thermal: Option<&'static str>,
    }

    impl DiagnosticCommands for CannedCommands {
        fn smart_battery_dump(&self) -> Option<String> {
            self.battery.map(str::to_string)
        }

        fn thermal_pressure_dump(&self) -> Option<String> {
            self.thermal.map(str::to_string)
        }
    }

    const BATTERY_DUMP: &str = "\
      \"CurrentCapacity\" = 84\n\
      \"MaxCapacity\" = 100\n\
      \"IsCharging\" = Yes\n\
      \"Temperature\" = 3043\n";

    #[test]
    fn full_reading_from_healthy_commands() {
        let commands = CannedCommands {
            battery: Some(BATTERY_DUMP),
            thermal: Some("Current pressure level: Elevated\n"),
        };
        let reading = probe(&commands);

        assert_eq!(reading.battery_percent, Some(84.0));
        assert_eq!(reading.charging, Some(true));
        assert_eq!(reading.battery_temp_celsius, Some(30.4));
        assert_eq!(reading.cpu_temp_celsius, None);
        assert_eq!(reading.thermal_pressure, Some(ThermalPressure::Elevated));
        assert!(reading.cpu_load_percent >= 0.0);
        assert!(reading.mem_used_percent > 0.0);
    }

    #[test]
    fn degrades_per_field_when_commands_are_missing() {
        let commands = CannedCommands {
            battery: None,
            thermal: None,
        };
        let reading = probe(&commands);

        assert_eq!(reading.battery_percent, None);
        assert_eq!(reading.charging, None);
        assert_eq!(reading.battery_temp_celsius, None);
        assert_eq!(reading.thermal_pressure, None);
        // Host counters must still succeed.
        assert!(reading.cpu_load_percent >= 0.0);
        assert!(reading.mem_used_percent >= 0.0);
    }

    #[test]
    fn partial_battery_dump_degrades_only_missing_fields() {
        let commands = CannedCommands {
            battery: Some("\"Temperature\" = 2982\n"),
            thermal: Some("garbage output"),
        };
        let reading = probe(&commands);

        assert_eq!(reading.battery_temp_celsius, Some(29.8));
        assert_eq!(reading.battery_percent, None);
        assert_eq!(reading.charging, None);
        assert_eq!(reading.thermal_pressure, None);
    }

    #[test]
    fn probe_is_idempotent_and_structurally_complete() {
        let commands = CannedCommands {
            battery: None,
            thermal: None,
        };
        let a = probe(&commands);
        let b = probe(&commands);

        for reading in [&a, &b] {
            let json = serde_json::to_value(reading).unwrap();
            let obj = json.as_object().unwrap();
            // Missing sensors serialize as null, never as missing keys.
            for key in [
                "battery_percent",
                "charging",
                "battery_temp_celsius",
                "cpu_temp_celsius",
                "thermal_pressure",
                "cpu_load_percent",
                "mem_used_percent",
            ] {
                assert!(obj.contains_key(key), "missing field {key}");
            }
            assert!(obj["battery_temp_celsius"].is_null());
            assert!(!obj["cpu_load_percent"].is_null());
        }
    }

    #[test]
    fn thermal_pressure_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&ThermalPressure::Serious).unwrap(),
            "\"Serious\""
        );
    }
}
