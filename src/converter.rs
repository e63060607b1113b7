//! Pure unit conversions behind `/converter`.

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

/// A unit that converts through a fixed factor to its base unit.
pub trait LinearUnit: Copy + FromStr<Err = ConvertError> {
    /// How many base units one of `self` is.
    fn factor(self) -> f64;
    fn symbol(self) -> &'static str;

    fn convert(value: f64, from: Self, to: Self) -> f64 {
        value * from.factor() / to.factor()
    }
}

macro_rules! linear_unit {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident ($label:tt, $symbol:literal, $factor:expr) [$($alias:literal),*]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
        pub enum $name {
            $(#[name = $label] $variant,)+
        }

        impl LinearUnit for $name {
            fn factor(self) -> f64 {
                match self {
                    $($name::$variant => $factor,)+
                }
            }

            fn symbol(self) -> &'static str {
                match self {
                    $($name::$variant => $symbol,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConvertError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_lowercase();
                $(
                    if needle == $symbol.to_lowercase()
                        || needle == $label.to_lowercase()
                        $(|| needle == $alias)*
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(ConvertError::UnknownUnit(s.trim().to_string()))
            }
        }
    };
}

linear_unit! {
    /// Base unit: metre.
    Length {
        Millimeter("Millimeter", "mm", 0.001) ["millimetre", "millimeters"],
        Centimeter("Centimeter", "cm", 0.01) ["centimetre", "centimeters"],
        Meter("Meter", "m", 1.0) ["metre", "meters"],
        Kilometer("Kilometer", "km", 1000.0) ["kilometre", "kilometers"],
        Inch("Inch", "in", 0.0254) ["inches", "\""],
        Foot("Foot", "ft", 0.3048) ["feet", "'"],
        Yard("Yard", "yd", 0.9144) ["yards"],
        Mile("Mile", "mi", 1609.344) ["miles"],
        NauticalMile("Nautical mile", "nmi", 1852.0) ["nm"],
    }
}

linear_unit! {
    /// Base unit: kilogram.
    Mass {
        Milligram("Milligram", "mg", 1e-6) ["milligrams"],
        Gram("Gram", "g", 0.001) ["grams"],
        Kilogram("Kilogram", "kg", 1.0) ["kilograms", "kilo"],
        Tonne("Tonne", "t", 1000.0) ["ton", "metric ton"],
        Ounce("Ounce", "oz", 0.028349523125) ["ounces"],
        Pound("Pound", "lb", 0.45359237) ["lbs", "pounds"],
        Stone("Stone", "st", 6.35029318) ["stones"],
    }
}

linear_unit! {
    /// Base unit: litre. Customary units are US.
    Volume {
        Milliliter("Milliliter", "ml", 0.001) ["millilitre"],
        Liter("Liter", "l", 1.0) ["litre", "liters"],
        CubicMeter("Cubic meter", "m3", 1000.0) ["m³"],
        Teaspoon("Teaspoon", "tsp", 0.00492892159375) [],
        Tablespoon("Tablespoon", "tbsp", 0.01478676478125) [],
        FluidOunce("Fluid ounce", "fl oz", 0.0295735295625) ["floz"],
        Cup("Cup", "cup", 0.2365882365) ["cups"],
        Pint("Pint", "pt", 0.473176473) ["pints"],
        Quart("Quart", "qt", 0.946352946) ["quarts"],
        Gallon("Gallon", "gal", 3.785411784) ["gallons"],
    }
}

linear_unit! {
    /// Base unit: second. A month is 1/12 of a Gregorian year.
    Time {
        Millisecond("Millisecond", "ms", 0.001) ["milliseconds"],
        Second("Second", "s", 1.0) ["sec", "seconds"],
        Minute("Minute", "min", 60.0) ["minutes"],
        Hour("Hour", "h", 3600.0) ["hr", "hours"],
        Day("Day", "d", 86400.0) ["days"],
        Week("Week", "wk", 604800.0) ["weeks"],
        Month("Month", "mo", 2629746.0) ["months"],
        Year("Year", "yr", 31556952.0) ["y", "years"],
    }
}

linear_unit! {
    /// Base unit: byte.
    DataSize {
        Bit("Bit", "bit", 0.125) ["bits"],
        Byte("Byte", "B", 1.0) ["bytes"],
        Kilobyte("Kilobyte", "kB", 1e3) [],
        Megabyte("Megabyte", "MB", 1e6) [],
        Gigabyte("Gigabyte", "GB", 1e9) [],
        Terabyte("Terabyte", "TB", 1e12) [],
        Kibibyte("Kibibyte", "KiB", 1024.0) [],
        Mebibyte("Mebibyte", "MiB", 1048576.0) [],
        Gibibyte("Gibibyte", "GiB", 1073741824.0) [],
        Tebibyte("Tebibyte", "TiB", 1099511627776.0) [],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Temperature {
    Celsius,
    Fahrenheit,
    Kelvin,
    #[name = "Réaumur"]
    Reaumur,
    Rankine,
}

impl Temperature {
    pub fn symbol(self) -> &'static str {
        match self {
            Temperature::Celsius => "°C",
            Temperature::Fahrenheit => "°F",
            Temperature::Kelvin => "K",
            Temperature::Reaumur => "°Ré",
            Temperature::Rankine => "°R",
        }
    }

    fn to_celsius(self, value: f64) -> f64 {
        match self {
            Temperature::Celsius => value,
            Temperature::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Temperature::Kelvin => value - 273.15,
            Temperature::Reaumur => value * 5.0 / 4.0,
            Temperature::Rankine => (value - 491.67) * 5.0 / 9.0,
        }
    }

    fn from_celsius(self, value: f64) -> f64 {
        match self {
            Temperature::Celsius => value,
            Temperature::Fahrenheit => value * 9.0 / 5.0 + 32.0,
            Temperature::Kelvin => value + 273.15,
            Temperature::Reaumur => value * 4.0 / 5.0,
            Temperature::Rankine => (value + 273.15) * 9.0 / 5.0,
        }
    }

    pub fn convert(value: f64, from: Temperature, to: Temperature) -> f64 {
        if from == to {
            return value;
        }
        to.from_celsius(from.to_celsius(value))
    }
}

impl FromStr for Temperature {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('°').to_lowercase().as_str() {
            "c" | "celsius" => Ok(Temperature::Celsius),
            "f" | "fahrenheit" => Ok(Temperature::Fahrenheit),
            "k" | "kelvin" => Ok(Temperature::Kelvin),
            "re" | "ré" | "reaumur" | "réaumur" => Ok(Temperature::Reaumur),
            "r" | "ra" | "rankine" => Ok(Temperature::Rankine),
            _ => Err(ConvertError::UnknownUnit(s.trim().to_string())),
        }
    }
}

/// Up to six decimals, trailing zeros dropped.
pub fn format_value(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e15 || value.abs() < 1e-6) {
        return format!("{:e}", value);
    }
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_temperature() {
        assert_eq!(
            Temperature::convert(0.0, Temperature::Celsius, Temperature::Fahrenheit),
            32.0
        );
        assert!(close(
            Temperature::convert(212.0, Temperature::Fahrenheit, Temperature::Kelvin),
            373.15
        ));
        assert!(close(
            Temperature::convert(0.0, Temperature::Kelvin, Temperature::Rankine),
            0.0
        ));
        assert!(close(
            Temperature::convert(80.0, Temperature::Reaumur, Temperature::Celsius),
            100.0
        ));
    }

    #[test]
    fn test_linear_units() {
        assert!(close(Length::convert(1.0, Length::Meter, Length::Centimeter), 100.0));
        assert!(close(Length::convert(1.0, Length::Mile, Length::Kilometer), 1.609344));
        assert!(close(Mass::convert(1.0, Mass::Pound, Mass::Gram), 453.59237));
        assert!(close(Time::convert(2.0, Time::Hour, Time::Minute), 120.0));
        assert!(close(DataSize::convert(1.0, DataSize::Kibibyte, DataSize::Bit), 8192.0));
        assert!(close(Volume::convert(1.0, Volume::Gallon, Volume::Quart), 4.0));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("cm".parse::<Length>().unwrap(), Length::Centimeter);
        assert_eq!("Feet".parse::<Length>().unwrap(), Length::Foot);
        assert_eq!("°F".parse::<Temperature>().unwrap(), Temperature::Fahrenheit);
        assert_eq!("MiB".parse::<DataSize>().unwrap(), DataSize::Mebibyte);
        assert_eq!("B".parse::<DataSize>().unwrap(), DataSize::Byte);
        assert_eq!(
            "parsec".parse::<Length>(),
            Err(ConvertError::UnknownUnit("parsec".into()))
        );
        assert!("furlong".parse::<Temperature>().is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(100.0), "100");
        assert_eq!(format_value(1.609344), "1.609344");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(0.0), "0");
    }
}
