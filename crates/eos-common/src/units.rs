//! Display unit conversions.

use serde::{Deserialize, Serialize};

/// Unit conversion applied to decoded values before plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitConversion {
    /// Kelvin to Celsius: C = K - 273.15
    #[serde(rename = "K_to_C")]
    KToC,
    /// Pascal to hectoPascal: hPa = Pa / 100
    #[serde(rename = "Pa_to_hPa")]
    PaToHPa,
    /// Meters to kilometers: km = m / 1000
    #[serde(rename = "m_to_km")]
    MToKm,
    /// No conversion needed
    #[default]
    #[serde(rename = "none")]
    None,
}

impl UnitConversion {
    /// Parse a conversion name from config.
    pub fn from_name(s: &str) -> Self {
        match s {
            "K_to_C" => Self::KToC,
            "Pa_to_hPa" => Self::PaToHPa,
            "m_to_km" => Self::MToKm,
            _ => Self::None,
        }
    }

    /// Apply the unit conversion to a value.
    pub fn apply(&self, value: f32) -> f32 {
        match self {
            Self::KToC => value - 273.15,
            Self::PaToHPa => value / 100.0,
            Self::MToKm => value / 1000.0,
            Self::None => value,
        }
    }

    /// Display units after conversion, given the native units.
    pub fn display_units<'a>(&self, native: &'a str) -> &'a str {
        match self {
            Self::KToC => "C",
            Self::PaToHPa => "hPa",
            Self::MToKm => "km",
            Self::None => native,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_to_celsius() {
        let conv = UnitConversion::from_name("K_to_C");
        assert_eq!(conv, UnitConversion::KToC);
        assert!((conv.apply(273.15)).abs() < 1e-5);
    }

    #[test]
    fn test_pa_to_hpa() {
        assert_eq!(UnitConversion::PaToHPa.apply(101325.0), 1013.25);
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(UnitConversion::from_name("furlongs"), UnitConversion::None);
        assert_eq!(UnitConversion::None.apply(42.0), 42.0);
    }
}
