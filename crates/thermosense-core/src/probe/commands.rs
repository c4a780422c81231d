//! Diagnostic subprocess capability.
//!
//! The probe never spawns processes directly: it goes through
//! [`DiagnosticCommands`], so the parsing logic can be unit-tested against
//! canned command output. The real implementation bounds every call with a
//! timeout, and a timed-out command is indistinguishable from a missing one
//! (both read as `None`).

use std::io::Read;
use std::process::Stdio;
use std::time::{Duration, Instant};

/// Path to the ioreg binary on macOS.
const IOREG_PATH: &str = "/usr/sbin/ioreg";

/// Default timeout for the registry dump.
const REGISTRY_TIMEOUT: Duration = Duration::from_secs(2);

/// Default timeout for powermetrics, which itself samples for about a
/// second before printing anything.
const POWER_TIMEOUT: Duration = Duration::from_secs(6);

/// Raw text output of the two privileged diagnostic utilities the probe
/// relies on. Both calls are best-effort: `None` covers a missing binary,
/// denied privilege, non-zero exit, and timeout alike.
pub trait DiagnosticCommands: Send + Sync {
    /// Smart-battery registry dump (`ioreg -r -n AppleSmartBattery`).
    fn smart_battery_dump(&self) -> Option<String>;

    /// Thermal power-diagnostics dump
    /// (`sudo -n powermetrics -n 1 -s thermal`).
    fn thermal_pressure_dump(&self) -> Option<String>;
}

/// Real subprocess-backed implementation.
#[derive(Debug, Clone)]
pub struct SystemCommands {
    registry_timeout: Duration,
    power_timeout: Duration,
}

impl Default for SystemCommands {
    fn default() -> Self {
        Self {
            registry_timeout: REGISTRY_TIMEOUT,
            power_timeout: POWER_TIMEOUT,
        }
    }
}

impl SystemCommands {
    pub fn with_timeouts(registry_timeout: Duration, power_timeout: Duration) -> Self {
        Self {
            registry_timeout,
            power_timeout,
        }
    }
}

impl DiagnosticCommands for SystemCommands {
    fn smart_battery_dump(&self) -> Option<String> {
        run_command(
            IOREG_PATH,
            &["-r", "-n", "AppleSmartBattery"],
            self.registry_timeout,
        )
    }

    fn thermal_pressure_dump(&self) -> Option<String> {
        // -n: never prompt for a password; denied privilege fails fast.
        run_command(
            "sudo",
            &["-n", "powermetrics", "-n", "1", "-s", "thermal"],
            self.power_timeout,
        )
    }
}

/// Run a subprocess and return its stdout as text, or `None` on spawn
/// failure, non-zero exit, empty output, or timeout (the child is killed).
pub fn run_command(cmd: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = std::process::Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                let mut out = Vec::new();
                if let Some(mut stdout) = child.stdout.take() {
                    let _ = stdout.read_to_end(&mut out);
                }
                let s = String::from_utf8_lossy(&out).trim().to_string();
                return if s.is_empty() { None } else { Some(s) };
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    log::debug!("{cmd} exceeded {timeout:?}, killing");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(_) => return None,
        }
    }
}
