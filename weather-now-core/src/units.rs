//! Conversion of metric measurements into the user's display units.
//!
//! Every function here is a pure function of the raw value and the
//! [`UnitPreference`]; nothing is cached.

use serde::{Deserialize, Serialize};
use std::fmt;

const MPS_TO_KMH: f64 = 3.6;
const KMH_TO_MPH: f64 = 0.621371;
const MM_TO_IN: f64 = 0.0393701;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn label(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindUnit {
    #[default]
    Kmh,
    Mph,
}

impl WindUnit {
    pub fn label(&self) -> &'static str {
        match self {
            WindUnit::Kmh => "km/h",
            WindUnit::Mph => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationUnit {
    #[default]
    Millimeters,
    Inches,
}

impl PrecipitationUnit {
    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationUnit::Millimeters => "mm",
            PrecipitationUnit::Inches => "in",
        }
    }
}

/// The active display units. Session-scoped, never written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPreference {
    pub temperature: TemperatureUnit,
    pub wind: WindUnit,
    pub precipitation: PrecipitationUnit,
}

/// A converted value with its unit label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading<T> {
    pub value: T,
    pub unit: &'static str,
}

impl Reading<i64> {
    /// Compact temperature form used in forecast rows, e.g. `21°`.
    pub fn degrees(&self) -> String {
        format!("{}°", self.value)
    }
}

impl<T: fmt::Display> fmt::Display for Reading<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Round half-up (toward positive infinity on .5), so `-2.5` becomes `-2`.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn temperature(celsius: f64, prefs: &UnitPreference) -> Reading<i64> {
    let value = match prefs.temperature {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    };

    Reading { value: round_half_up(value), unit: prefs.temperature.label() }
}

/// Wind arrives in m/s. Rounded once, after the final conversion.
pub fn wind_speed(mps: f64, prefs: &UnitPreference) -> Reading<i64> {
    let kmh = mps * MPS_TO_KMH;
    let value = match prefs.wind {
        WindUnit::Kmh => kmh,
        WindUnit::Mph => kmh * KMH_TO_MPH,
    };

    Reading { value: round_half_up(value), unit: prefs.wind.label() }
}

/// Millimetres keep their native precision; inches get two decimals.
pub fn precipitation(mm: Option<f64>, prefs: &UnitPreference) -> Reading<String> {
    let mm = mm.unwrap_or(0.0);
    let value = match prefs.precipitation {
        PrecipitationUnit::Millimeters => mm.to_string(),
        PrecipitationUnit::Inches => format!("{:.2}", mm * MM_TO_IN),
    };

    Reading { value, unit: prefs.precipitation.label() }
}
