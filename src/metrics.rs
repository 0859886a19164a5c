//! System metrics sampling for the panel displays.
//!
//! Wraps `sysinfo` for CPU/GPU temperature and CPU utilization, with its own
//! refresh interval decoupled from the render tick: the composer reads a
//! cached snapshot between refreshes and tolerates stale values.

use std::time::{Duration, Instant};

use log::warn;
use sysinfo::{Components, System};

use crate::config::TempUnit;

// =============================================================================
// Devices
// =============================================================================

/// The two monitored devices, each with its own half of the big panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Gpu,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Cpu, Device::Gpu];

    /// Region-name prefix for this device.
    pub fn name(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Gpu => "gpu",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Temperature unit selection per device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceUnits {
    pub cpu: TempUnit,
    pub gpu: TempUnit,
}

impl DeviceUnits {
    pub fn for_device(&self, device: Device) -> TempUnit {
        match device {
            Device::Cpu => self.cpu,
            Device::Gpu => self.gpu,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// One set of metric readings, temperatures already in the requested units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cpu_temp: i32,
    pub cpu_usage: i32,
    pub gpu_temp: i32,
    pub gpu_usage: i32,
}

impl MetricsSnapshot {
    /// Look up a metric by the name color expressions use.
    pub fn get(&self, metric: &str) -> Option<f32> {
        match metric {
            "cpu_temp" => Some(self.cpu_temp as f32),
            "cpu_usage" => Some(self.cpu_usage as f32),
            "gpu_temp" => Some(self.gpu_temp as f32),
            "gpu_usage" => Some(self.gpu_usage as f32),
            _ => None,
        }
    }

    pub fn temp(&self, device: Device) -> i32 {
        match device {
            Device::Cpu => self.cpu_temp,
            Device::Gpu => self.gpu_temp,
        }
    }

    pub fn usage(&self, device: Device) -> i32 {
        match device {
            Device::Cpu => self.cpu_usage,
            Device::Gpu => self.gpu_usage,
        }
    }
}

// =============================================================================
// Sampler
// =============================================================================

/// Cached system sensor reader.
///
/// GPU utilization has no portable `sysinfo` source and reads as zero; the
/// gradient paths treat it like any other metric.
pub struct MetricsSampler {
    components: Components,
    system: System,
    refresh_interval: Duration,
    last_refresh: Option<Instant>,
    cpu_temp_c: f32,
    gpu_temp_c: f32,
    cpu_usage: f32,
    gpu_usage: f32,
    warned_cpu_temp: bool,
    warned_gpu_temp: bool,
}

impl MetricsSampler {
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
            system: System::new(),
            refresh_interval: Duration::from_millis(500),
            last_refresh: None,
            cpu_temp_c: 0.0,
            gpu_temp_c: 0.0,
            cpu_usage: 0.0,
            gpu_usage: 0.0,
            warned_cpu_temp: false,
            warned_gpu_temp: false,
        }
    }

    /// Change how often the underlying sensors are re-read.
    pub fn set_refresh_interval(&mut self, interval: Duration) {
        self.refresh_interval = interval;
    }

    /// Current readings, refreshing the sensors when the cache is stale.
    pub fn sample(&mut self, units: DeviceUnits) -> MetricsSnapshot {
        let due = self
            .last_refresh
            .is_none_or(|t| t.elapsed() >= self.refresh_interval);
        if due {
            self.refresh();
            self.last_refresh = Some(Instant::now());
        }

        MetricsSnapshot {
            cpu_temp: units.cpu.from_celsius(self.cpu_temp_c).round() as i32,
            cpu_usage: self.cpu_usage.round() as i32,
            gpu_temp: units.gpu.from_celsius(self.gpu_temp_c).round() as i32,
            gpu_usage: self.gpu_usage.round() as i32,
        }
    }

    fn refresh(&mut self) {
        self.components.refresh(true);
        self.system.refresh_cpu_usage();

        match self.find_cpu_temp() {
            Some(temp) => self.cpu_temp_c = temp,
            None => {
                if !self.warned_cpu_temp {
                    warn!("no CPU temperature sensor found, reading as 0");
                    self.warned_cpu_temp = true;
                }
                self.cpu_temp_c = 0.0;
            }
        }

        match self.find_gpu_temp() {
            Some(temp) => self.gpu_temp_c = temp,
            None => {
                if !self.warned_gpu_temp {
                    warn!("no GPU temperature sensor found, reading as 0");
                    self.warned_gpu_temp = true;
                }
                self.gpu_temp_c = 0.0;
            }
        }

        self.cpu_usage = self.system.global_cpu_usage();
    }

    /// Find CPU temperature using common sensor label patterns.
    fn find_cpu_temp(&self) -> Option<f32> {
        self.components
            .iter()
            .find(|c| {
                let label = c.label().to_lowercase();
                label.contains("cpu")
                    || label.contains("package")
                    || label.contains("core")
                    || label.contains("tdie")
                    || label.contains("computer") // Fallback for some Windows systems
            })
            .and_then(|c| c.temperature())
    }

    /// Find GPU temperature using common sensor label patterns.
    fn find_gpu_temp(&self) -> Option<f32> {
        self.components
            .iter()
            .find(|c| {
                let label = c.label().to_lowercase();
                label.contains("gpu")
                    || label.contains("nvidia")
                    || label.contains("amd")
                    || label.contains("edge")
            })
            .and_then(|c| c.temperature())
    }

    /// All detected sensor labels with their current readings (diagnostics).
    pub fn list_sensors(&self) -> Vec<(String, f32)> {
        self.components
            .iter()
            .map(|c| (c.label().to_string(), c.temperature().unwrap_or(0.0)))
            .collect()
    }
}

impl Default for MetricsSampler {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
