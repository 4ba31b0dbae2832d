//! Sensor sources backed by the kernel's sysfs trees: hwmon for the primary
//! monitor, the first ACPI thermal zone for the fallback. Both report
//! millidegrees Celsius.

use crate::sensor_readings::{SensorKind, SensorRecord};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HWMON_ROOT: &str = "/sys/class/hwmon";
const THERMAL_ZONE_FILE: &str = "/sys/class/thermal/thermal_zone0/temp";

pub struct MonitorSource {
    root: PathBuf,
}

impl MonitorSource {
    pub fn new() -> Self {
        info!(root = HWMON_ROOT, "hardware monitor source attached");
        Self::with_root(HWMON_ROOT)
    }

    fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A machine without the class tree reads as "no sensors", not a failure.
    pub fn sensors(&mut self) -> Result<Vec<SensorRecord>> {
        let chips = match sorted_entries(&self.root) {
            Ok(chips) => chips,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err).context("Failed to scan hwmon class tree"),
        };

        let mut records = Vec::new();
        for chip in chips {
            collect_chip_temps(&chip, &mut records);
        }
        debug!(count = records.len(), "scanned hwmon temperature channels");
        Ok(records)
    }
}

pub struct ThermalZoneSource {
    zone_file: PathBuf,
}

impl ThermalZoneSource {
    pub fn new() -> Self {
        Self::with_zone_file(THERMAL_ZONE_FILE)
    }

    fn with_zone_file(path: impl Into<PathBuf>) -> Self {
        Self {
            zone_file: path.into(),
        }
    }

    /// A machine without the zone yields None; a zone that exists but cannot
    /// be read is an error.
    pub fn read_celsius(&mut self) -> Result<Option<f64>> {
        let raw = match fs::read_to_string(&self.zone_file) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read thermal zone {}", self.zone_file.display())
                });
            }
        };
        let millidegrees = raw
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Unparseable thermal zone reading {:?}", raw.trim()))?;
        Ok(Some(millidegrees as f64 / 1000.0))
    }
}

pub fn connect() -> Result<(MonitorSource, ThermalZoneSource)> {
    Ok((MonitorSource::new(), ThermalZoneSource::new()))
}

/// Channels come back in numeric order; single-channel read glitches are
/// skipped.
fn collect_chip_temps(chip: &Path, records: &mut Vec<SensorRecord>) {
    let chip_name = read_trimmed(&chip.join("name")).unwrap_or_else(|| {
        chip.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let Ok(entries) = sorted_entries(chip) else {
        return;
    };
    let mut channels: Vec<u32> = entries
        .iter()
        .filter_map(|entry| {
            entry
                .file_name()?
                .to_str()?
                .strip_prefix("temp")?
                .strip_suffix("_input")?
                .parse()
                .ok()
        })
        .collect();
    channels.sort_unstable();

    for channel in channels {
        let Some(value) = read_millidegrees(&chip.join(format!("temp{channel}_input"))) else {
            continue;
        };
        let name = read_trimmed(&chip.join(format!("temp{channel}_label")))
            .unwrap_or_else(|| format!("{chip_name} temp{channel}"));
        let max = read_millidegrees(&chip.join(format!("temp{channel}_max")))
            .or_else(|| read_millidegrees(&chip.join(format!("temp{channel}_crit"))))
            .unwrap_or(value);

        records.push(SensorRecord {
            name,
            kind: SensorKind::Temperature,
            value,
            max,
        });
    }
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn read_millidegrees(path: &Path) -> Option<f64> {
    let raw = fs::read_to_string(path).ok()?;
    let millidegrees = raw.trim().parse::<i64>().ok()?;
    Some(millidegrees as f64 / 1000.0)
}
