//! On-demand snapshots of the host environment.
//!
//! Nothing here is cached: every call reads the operating system again, so
//! `/api/info` always reports the instance as it is right now.

use std::time::Duration;

use serde::Serialize;
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Hostname used when the OS lookup fails or returns nothing
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// Current hostname, lossily decoded.
pub fn hostname() -> String {
    match hostname::get() {
        Ok(name) if !name.is_empty() => name.to_string_lossy().into_owned(),
        Ok(_) => UNKNOWN_HOSTNAME.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read hostname");
            UNKNOWN_HOSTNAME.to_string()
        }
    }
}

/// Target operating system, e.g. "linux"
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// Target architecture, e.g. "x86_64"
pub fn arch() -> &'static str {
    std::env::consts::ARCH
}

/// Memory totals in bytes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

impl MemorySnapshot {
    /// Build from one reading of total and free; `used` is derived from both.
    pub fn new(total: u64, free: u64) -> Self {
        Self {
            total,
            free,
            used: total.saturating_sub(free),
        }
    }

    pub fn read() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self::new(sys.total_memory(), sys.free_memory())
    }
}

/// One logical CPU as reported by the OS.
#[derive(Debug, Clone, Serialize)]
pub struct CpuSnapshot {
    pub model: String,
    /// Frequency in MHz
    pub speed: u64,
    /// Usage percentage over the sampling window, 0 to 100
    pub usage: f32,
}

/// Everything `/api/info` reports about the host.
#[derive(Debug, Clone)]
pub struct HostSnapshot {
    pub hostname: String,
    pub memory: MemorySnapshot,
    pub cpus: Vec<CpuSnapshot>,
    /// 1, 5 and 15 minute load averages
    pub load_average: [f64; 3],
}

impl HostSnapshot {
    /// Blocks for about `MINIMUM_CPU_UPDATE_INTERVAL` while CPU usage is
    /// sampled, so call it from a blocking context.
    pub fn read() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let cpus = sample_cpus(&mut sys, MINIMUM_CPU_UPDATE_INTERVAL);

        let load = System::load_average();

        Self {
            hostname: hostname(),
            memory: MemorySnapshot::new(sys.total_memory(), sys.free_memory()),
            cpus,
            load_average: [load.one, load.five, load.fifteen],
        }
    }
}

/// Read every CPU twice, `window` apart. Usage is a delta between two
/// readings; a single refresh always reports 0.
fn sample_cpus(sys: &mut System, window: Duration) -> Vec<CpuSnapshot> {
    sys.refresh_cpu_all();
    std::thread::sleep(window);
    sys.refresh_cpu_usage();

    sys.cpus()
        .iter()
        .map(|cpu| CpuSnapshot {
            model: cpu.brand().trim().to_string(),
            speed: cpu.frequency(),
            usage: cpu.cpu_usage(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_is_total_minus_free() {
        let mem = MemorySnapshot::new(8_000, 3_000);
        assert_eq!(mem.used, 5_000);
    }

    #[test]
    fn test_used_saturates() {
        let mem = MemorySnapshot::new(1_000, 2_000);
        assert_eq!(mem.used, 0);
    }

    #[test]
    fn test_hostname_is_not_empty() {
        assert!(!hostname().is_empty());
    }

    #[test]
    fn test_cpu_usage_is_sampled_over_a_window() {
        let mut sys = System::new();
        let start = std::time::Instant::now();
        let cpus = sample_cpus(&mut sys, MINIMUM_CPU_UPDATE_INTERVAL);
        assert!(start.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL);

        for cpu in &cpus {
            assert!(cpu.usage.is_finite(), "{cpu:?}");
            assert!((0.0..=100.0).contains(&cpu.usage), "{cpu:?}");
        }
    }

    #[test]
    fn test_host_snapshot_memory_is_consistent() {
        let snapshot = HostSnapshot::read();
        assert_eq!(
            snapshot.memory.used,
            snapshot.memory.total - snapshot.memory.free
        );
    }
}
