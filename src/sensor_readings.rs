#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TempReading {
    pub current: f64,
    pub max: f64,
}

/// `FallbackAcpi` also covers the case where the fallback itself had nothing
/// to report.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SensorSource {
    PrimaryMonitor,
    FallbackAcpi,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TempReadings {
    pub cpu: Option<TempReading>,
    pub gpu: Option<TempReading>,
    pub source: SensorSource,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(unused)]
pub enum SensorKind {
    Temperature,
    Voltage,
    Clock,
    Load,
    Fan,
    Flow,
    Control,
    Level,
    Power,
    Data,
    Other,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SensorRecord {
    pub name: String,
    pub kind: SensorKind,
    pub value: f64,
    pub max: f64,
}
