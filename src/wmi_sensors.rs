//! Sensor sources backed by WMI: the hardware monitor's `Sensor` class for
//! the primary, the ACPI thermal zone (tenths of a Kelvin) for the fallback.

use crate::sensor_readings::{SensorKind, SensorRecord};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use wmi::{COMLibrary, WMIConnection};

const MONITOR_NAMESPACE: &str = "ROOT\\OpenHardwareMonitor";
const ACPI_NAMESPACE: &str = "ROOT\\WMI";

#[derive(Deserialize)]
#[serde(rename = "Sensor", rename_all = "PascalCase")]
struct MonitorSensorRow {
    name: String,
    sensor_type: String,
    value: Option<f32>,
    max: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename = "MSAcpi_ThermalZoneTemperature", rename_all = "PascalCase")]
struct ThermalZoneRow {
    current_temperature: u32,
}

pub struct MonitorSource {
    conn: WMIConnection,
}

impl MonitorSource {
    fn attach(com: COMLibrary) -> Result<Self> {
        let conn = WMIConnection::with_namespace_path(MONITOR_NAMESPACE, com)
            .context("Failed to connect to the hardware monitor namespace")?;
        info!(
            namespace = MONITOR_NAMESPACE,
            "hardware monitor connection established"
        );
        Ok(Self { conn })
    }

    /// Null readings come back as zero.
    pub fn sensors(&mut self) -> Result<Vec<SensorRecord>> {
        let rows: Vec<MonitorSensorRow> = self
            .conn
            .query()
            .context("Failed to query hardware monitor sensors")?;
        debug!(count = rows.len(), "queried hardware monitor sensors");

        Ok(rows
            .into_iter()
            .map(|row| SensorRecord {
                name: row.name,
                kind: kind_from_type_label(&row.sensor_type),
                value: f64::from(row.value.unwrap_or(0.0)),
                max: f64::from(row.max.unwrap_or(0.0)),
            })
            .collect())
    }
}

pub struct ThermalZoneSource {
    conn: WMIConnection,
}

impl ThermalZoneSource {
    fn attach(com: COMLibrary) -> Result<Self> {
        let conn = WMIConnection::with_namespace_path(ACPI_NAMESPACE, com)
            .context("Failed to connect to the ACPI namespace")?;
        Ok(Self { conn })
    }

    /// A machine exposing no zones yields None.
    pub fn read_celsius(&mut self) -> Result<Option<f64>> {
        let zones: Vec<ThermalZoneRow> = self
            .conn
            .query()
            .context("Failed to query the ACPI thermal zone")?;
        Ok(zones
            .into_iter()
            .next()
            .map(|zone| deci_kelvin_to_celsius(zone.current_temperature)))
    }
}

pub fn connect() -> Result<(MonitorSource, ThermalZoneSource)> {
    let com = COMLibrary::new().context("Failed to initialize COM")?;
    Ok((MonitorSource::attach(com)?, ThermalZoneSource::attach(com)?))
}

fn deci_kelvin_to_celsius(raw: u32) -> f64 {
    f64::from(raw) / 10.0 - 273.15
}

fn kind_from_type_label(label: &str) -> SensorKind {
    match label {
        l if l.contains("Temperature") => SensorKind::Temperature,
        l if l.contains("Voltage") => SensorKind::Voltage,
        l if l.contains("Clock") => SensorKind::Clock,
        l if l.contains("Load") => SensorKind::Load,
        l if l.contains("Fan") => SensorKind::Fan,
        l if l.contains("Flow") => SensorKind::Flow,
        l if l.contains("Control") => SensorKind::Control,
        l if l.contains("Level") => SensorKind::Level,
        l if l.contains("Power") => SensorKind::Power,
        l if l.contains("Data") => SensorKind::Data,
        _ => SensorKind::Other,
    }
}
