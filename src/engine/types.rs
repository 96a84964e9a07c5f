use chrono::{DateTime, Utc};
use serde::Serialize;

/// One raw cumulative-counter reading on a meter port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: i64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: i64) -> Self {
        Self { timestamp, value }
    }
}

/// A stored reading tagged with the meter port it was recorded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub meter_port: i64,
    pub timestamp: DateTime<Utc>,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemperatureReading {
    pub temperature: i64,
    pub timestamp: DateTime<Utc>,
    pub submeter_name: String,
}

/// Delta of a counter over `[from_timestamp, to_timestamp]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CondensedValue {
    pub from_timestamp: DateTime<Utc>,
    pub to_timestamp: DateTime<Utc>,
    pub value: i64,
}

/// Whole-window aggregate, produced when no resolution is requested.
///
/// The name is historical; `value` is an energy total, not a power average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AveragePower {
    pub value: i64,
    pub from_timestamp: DateTime<Utc>,
    pub to_timestamp: DateTime<Utc>,
    pub unit: Unit,
}

/// Time-ordered samples sharing a grouping key (a meter port or a submeter id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroup {
    pub key: i64,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VirtualEnergyMeasurement {
    pub consumption_acc_start: i64,
    pub consumption_acc_stop: i64,
    pub current: i64,
    pub voltage: i64,
    pub power_factor: i64,
    pub from_timestamp: DateTime<Utc>,
    pub to_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub meter_type: MeterKind,
    pub meter_name: String,
    pub resource_type: String,
    pub meterport_name: String,
    pub time_discrepancy_occurrence: DateTime<Utc>,
    pub time_discrepancy_sec: i64,
}

/// Measurement units a meter port can report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    #[serde(rename = "milliwatt*hour")]
    Energy,
    #[serde(rename = "milliwatt")]
    Power,
    #[serde(rename = "millivolt")]
    Voltage,
    #[serde(rename = "milliampere")]
    Current,
    #[serde(rename = "millihertz")]
    Frequency,
    #[serde(rename = "millidegrees_celsius")]
    Temperature,
    #[serde(rename = "parts_per_thousand")]
    PowerFactor,
    #[serde(rename = "millivolt_ampere")]
    ApparentPower,
    #[serde(rename = "millivolt_ampere_reactive")]
    ReactivePower,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Energy => "milliwatt*hour",
            Self::Power => "milliwatt",
            Self::Voltage => "millivolt",
            Self::Current => "milliampere",
            Self::Frequency => "millihertz",
            Self::Temperature => "millidegrees_celsius",
            Self::PowerFactor => "parts_per_thousand",
            Self::ApparentPower => "millivolt_ampere",
            Self::ReactivePower => "millivolt_ampere_reactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let unit = match raw.trim() {
            "milliwatt*hour" => Self::Energy,
            "milliwatt" => Self::Power,
            "millivolt" => Self::Voltage,
            "milliampere" => Self::Current,
            "millihertz" => Self::Frequency,
            "millidegrees_celsius" => Self::Temperature,
            "parts_per_thousand" => Self::PowerFactor,
            "millivolt_ampere" => Self::ApparentPower,
            "millivolt_ampere_reactive" => Self::ReactivePower,
            _ => return None,
        };
        Some(unit)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeterKind {
    #[serde(rename = "mainmeters")]
    Main,
    #[serde(rename = "submeters")]
    Sub,
}

impl MeterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "mainmeters",
            Self::Sub => "submeters",
        }
    }
}

/// Direction of the energy flow an aggregate is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerFlow {
    Consumption,
    Production,
}
