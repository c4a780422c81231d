//! Host CPU and memory counters.
//!
//! Unlike the battery and thermal readings these never degrade to `None`:
//! the OS process/resource counters are always available on a supported
//! platform. CPU load is sampled over a short fixed interval so a single
//! instantaneous spike does not dominate the reading.

use std::time::Duration;

use sysinfo::System;

/// Sampling window for the CPU load reading.
const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(300);

/// System-wide CPU load percent, averaged over the sampling window.
///
/// Blocks for the window duration: usage is a delta between two refreshes.
pub fn cpu_load_percent() -> f64 {
    let mut system = System::new();
    system.refresh_cpu_usage();
    std::thread::sleep(CPU_SAMPLE_INTERVAL);
    system.refresh_cpu_usage();
    f64::from(system.global_cpu_usage())
}

/// Used physical memory as a percent of total.
pub fn mem_used_percent() -> f64 {
    let mut system = System::new();
    system.refresh_memory();
    let total = system.total_memory();
    if total == 0 {
        return 0.0;
    }
    system.used_memory() as f64 / total as f64 * 100.0
}
