use anyhow::Result;
use tracing::debug;

use crate::sensor_readings::{SensorKind, SensorRecord, SensorSource, TempReading, TempReadings};
#[cfg(target_os = "linux")]
use crate::sysfs_sensors as platform;
#[cfg(windows)]
use crate::wmi_sensors as platform;

// Name fragments that pick the package-level readings out of the monitor's
// sensor list.
const CPU_SENSOR_NAME: &str = "CPU Package";
const GPU_SENSOR_NAME: &str = "GPU Core";

/// A queryable temperature source reporting a (cpu, gpu) pair; either side
/// may be absent.
pub trait SensorBackend {
    fn read(&mut self) -> Result<(Option<TempReading>, Option<TempReading>)>;
}

pub struct PrimaryMonitorBackend {
    source: platform::MonitorSource,
}

impl SensorBackend for PrimaryMonitorBackend {
    fn read(&mut self) -> Result<(Option<TempReading>, Option<TempReading>)> {
        let records = self.source.sensors()?;
        Ok(select_package_temps(&records))
    }
}

pub struct FallbackAcpiBackend {
    source: platform::ThermalZoneSource,
}

impl SensorBackend for FallbackAcpiBackend {
    fn read(&mut self) -> Result<(Option<TempReading>, Option<TempReading>)> {
        // The zone has no max concept; its one figure fills both fields.
        let cpu = self.source.read_celsius()?.map(|celsius| TempReading {
            current: celsius,
            max: celsius,
        });
        Ok((cpu, None))
    }
}

pub fn detect_backends() -> Result<(PrimaryMonitorBackend, FallbackAcpiBackend)> {
    let (monitor, zone) = platform::connect()?;
    Ok((
        PrimaryMonitorBackend { source: monitor },
        FallbackAcpiBackend { source: zone },
    ))
}

/// Polls the primary monitor first; the fallback is consulted only when the
/// primary yields neither reading. Backend errors propagate untouched.
pub fn read_temperatures(
    primary: &mut dyn SensorBackend,
    fallback: &mut dyn SensorBackend,
) -> Result<TempReadings> {
    let (cpu, gpu) = primary.read()?;
    if cpu.is_none() && gpu.is_none() {
        let (cpu, gpu) = fallback.read()?;
        debug!("primary monitor yielded nothing, read ACPI thermal zone");
        return Ok(TempReadings {
            cpu,
            gpu,
            source: SensorSource::FallbackAcpi,
        });
    }
    debug!("updated sensor readings");
    Ok(TempReadings {
        cpu,
        gpu,
        source: SensorSource::PrimaryMonitor,
    })
}

/// The first temperature sensor matching each name filter wins; a record
/// matching the CPU filter is never also considered for the GPU slot.
pub fn select_package_temps(
    records: &[SensorRecord],
) -> (Option<TempReading>, Option<TempReading>) {
    let mut cpu = None;
    let mut gpu = None;
    for record in records {
        if record.kind != SensorKind::Temperature {
            continue;
        }
        if record.name.contains(CPU_SENSOR_NAME) {
            if cpu.is_none() {
                cpu = Some(TempReading {
                    current: record.value,
                    max: record.max,
                });
            }
        } else if record.name.contains(GPU_SENSOR_NAME) && gpu.is_none() {
            gpu = Some(TempReading {
                current: record.value,
                max: record.max,
            });
        }
    }
    (cpu, gpu)
}
