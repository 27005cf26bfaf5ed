//! Temperature units and conversions.
//!
//! Conversions pivot through Celsius. Same-unit conversions return the
//! input untouched so values never drift when no conversion is needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;
const FAHRENHEIT_OFFSET: f64 = 32.0;
const FAHRENHEIT_RATIO: f64 = 1.8;

/// A temperature scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Unit symbol as used in `unit_of_measurement` attributes.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "\u{b0}C",
            Self::Fahrenheit => "\u{b0}F",
            Self::Kelvin => "K",
        }
    }

    /// Parse a `unit_of_measurement` symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        [Self::Celsius, Self::Fahrenheit, Self::Kelvin]
            .into_iter()
            .find(|unit| unit.symbol() == symbol)
    }

    /// Convert an absolute temperature from `self` to `to`.
    #[must_use]
    pub fn convert(self, value: f64, to: Self) -> f64 {
        if self == to {
            return value;
        }
        let celsius = match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - FAHRENHEIT_OFFSET) / FAHRENHEIT_RATIO,
            Self::Kelvin => value - KELVIN_OFFSET,
        };
        match to {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * FAHRENHEIT_RATIO + FAHRENHEIT_OFFSET,
            Self::Kelvin => celsius + KELVIN_OFFSET,
        }
    }

    /// Convert a temperature *difference* from `self` to `to` (no offsets).
    #[must_use]
    pub fn convert_interval(self, delta: f64, to: Self) -> f64 {
        if self == to {
            return delta;
        }
        let celsius = match self {
            Self::Celsius | Self::Kelvin => delta,
            Self::Fahrenheit => delta / FAHRENHEIT_RATIO,
        };
        match to {
            Self::Celsius | Self::Kelvin => celsius,
            Self::Fahrenheit => celsius * FAHRENHEIT_RATIO,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "celsius" | "c" | "\u{b0}c" => Ok(Self::Celsius),
            "fahrenheit" | "f" | "\u{b0}f" => Ok(Self::Fahrenheit),
            "kelvin" | "k" => Ok(Self::Kelvin),
            _ => Err(UnknownUnitError(s.to_string())),
        }
    }
}

/// Returned when a temperature unit name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown temperature unit {0:?}")]
pub struct UnknownUnitError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    const UNITS: [TemperatureUnit; 3] = [
        TemperatureUnit::Celsius,
        TemperatureUnit::Fahrenheit,
        TemperatureUnit::Kelvin,
    ];

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn should_convert_known_reference_points() {
        use TemperatureUnit::{Celsius, Fahrenheit, Kelvin};
        assert_eq!(Celsius.convert(100.0, Fahrenheit), 212.0);
        assert_eq!(Fahrenheit.convert(32.0, Celsius), 0.0);
        assert_eq!(Kelvin.convert(293.15, Fahrenheit), 68.0);
        assert_eq!(Celsius.convert(30.0, Fahrenheit), 86.0);
        assert_close(Celsius.convert(0.0, Kelvin), 273.15);
    }

    #[test]
    fn should_be_inverse_consistent_for_every_pair() {
        for from in UNITS {
            for to in UNITS {
                for value in [-40.0, 0.0, 21.5, 68.0, 293.15, 1000.0] {
                    let back = to.convert(from.convert(value, to), from);
                    assert_close(back, value);
                }
            }
        }
    }

    #[test]
    fn should_convert_intervals_without_offset() {
        use TemperatureUnit::{Celsius, Fahrenheit, Kelvin};
        assert_eq!(Kelvin.convert_interval(-10.0, Fahrenheit), -18.0);
        assert_eq!(Celsius.convert_interval(20.0, Fahrenheit), 36.0);
        assert_eq!(Kelvin.convert_interval(5.0, Celsius), 5.0);
        assert_close(Fahrenheit.convert_interval(9.0, Celsius), 5.0);
    }

    #[test]
    fn should_leave_same_unit_values_untouched() {
        for unit in UNITS {
            assert_eq!(unit.convert(21.3, unit), 21.3);
            assert_eq!(unit.convert_interval(0.7, unit), 0.7);
        }
    }

    #[test]
    fn should_parse_symbols_and_names() {
        assert_eq!(TemperatureUnit::from_symbol("\u{b0}F"), Some(TemperatureUnit::Fahrenheit));
        assert_eq!(TemperatureUnit::from_symbol("garn"), None);
        assert_eq!("Celsius".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Celsius));
        assert!("rankine".parse::<TemperatureUnit>().is_err());
    }
}
