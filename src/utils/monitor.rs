#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

/// Process resource usage logged between pipeline phases when
/// `--monitor` is set. Long enrichment batches are where the memory
/// profile matters, so stats are sampled per phase rather than on a
/// timer.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: std::sync::Mutex<System>,
    pid: Pid,
    start_time: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        let pid = sysinfo::get_current_pid().expect("Failed to get current PID");

        Self {
            system: std::sync::Mutex::new(system),
            pid,
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn log_stats(&self, phase: &str) {
        if !self.enabled {
            return;
        }

        let Ok(mut system) = self.system.lock() else {
            return;
        };
        system.refresh_all();

        if let Some(process) = system.process(self.pid) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Elapsed: {:?}",
                phase,
                process.cpu_usage(),
                process.memory() / 1024 / 1024,
                self.start_time.elapsed()
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op stand-in when built without the CLI feature.
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
