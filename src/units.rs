//! SI unit helpers
//!
//! Units are plain strings on arrays, dimensions, tags and properties. These
//! helpers recognise SI units with an optional prefix and power (`mV`, `kHz`,
//! `mV^-2`), compound units (`mV/cm`, `kg*m^2`) and compute scaling factors
//! between compatible units.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ModelError, Result};

const PREFIXES: &str = "(Y|Z|E|P|T|G|M|k|h|da|d|c|m|u|n|p|f|a|z|y)";
const UNITS: &str = "(m|s|g|A|K|mol|cd|Hz|N|Pa|J|W|C|V|F|S|Wb|T|H|lm|lx|Bq|Gy|Sv|kat|l|L|Ohm|%|dB|rad)";
const POWER: &str = r"(\^[+-]?[1-9]\d*)";

static SI_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}?{}{}?$", PREFIXES, UNITS, POWER)).unwrap());

static COMPOUND_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let atomic = format!("{}?{}{}?", PREFIXES, UNITS, POWER);
    Regex::new(&format!(r"^({}(\*|/))+{}$", atomic, atomic)).unwrap()
});

/// An SI unit split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitUnit {
    pub prefix: Option<String>,
    pub unit: String,
    pub power: i32,
}

/// Is `unit` a single SI unit with optional prefix and power?
pub fn is_si_unit(unit: &str) -> bool {
    SI_UNIT_RE.is_match(unit.trim())
}

/// Is `unit` a product/quotient of SI units (`mV/cm`, `kg*m^2`)?
pub fn is_compound_si_unit(unit: &str) -> bool {
    COMPOUND_UNIT_RE.is_match(unit.trim())
}

/// Either a plain or a compound SI unit
pub fn is_valid_unit(unit: &str) -> bool {
    is_si_unit(unit) || is_compound_si_unit(unit)
}

/// Split a single SI unit into prefix, base unit and power
pub fn split_unit(unit: &str) -> Option<SplitUnit> {
    let caps = SI_UNIT_RE.captures(unit.trim())?;
    let power = match caps.get(3) {
        Some(p) => p.as_str().trim_start_matches('^').parse().ok()?,
        None => 1,
    };
    Some(SplitUnit {
        prefix: caps.get(1).map(|p| p.as_str().to_string()),
        unit: caps.get(2)?.as_str().to_string(),
        power,
    })
}

/// Split a compound unit into its atomic units, dropping the operators
pub fn split_compound_unit(unit: &str) -> Vec<String> {
    unit.trim()
        .split(['*', '/'])
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn prefix_exponent(prefix: Option<&str>) -> i32 {
    match prefix {
        Some("Y") => 24,
        Some("Z") => 21,
        Some("E") => 18,
        Some("P") => 15,
        Some("T") => 12,
        Some("G") => 9,
        Some("M") => 6,
        Some("k") => 3,
        Some("h") => 2,
        Some("da") => 1,
        Some("d") => -1,
        Some("c") => -2,
        Some("m") => -3,
        Some("u") => -6,
        Some("n") => -9,
        Some("p") => -12,
        Some("f") => -15,
        Some("a") => -18,
        Some("z") => -21,
        Some("y") => -24,
        _ => 0,
    }
}

/// Factor that converts a value in `origin` into `destination`.
///
/// Both units must share base unit and power, e.g. `mV` to `kV` is `1e-6`.
pub fn scaling(origin: &str, destination: &str) -> Result<f64> {
    let incompatible = || ModelError::IncompatibleUnits {
        from: origin.to_string(),
        to: destination.to_string(),
    };
    let from = split_unit(origin).ok_or_else(incompatible)?;
    let to = split_unit(destination).ok_or_else(incompatible)?;
    if from.unit != to.unit || from.power != to.power {
        return Err(incompatible());
    }

    let shift = prefix_exponent(from.prefix.as_deref()) - prefix_exponent(to.prefix.as_deref());
    // an exponent outside i32 has no meaningful factor
    let exponent = shift.checked_mul(from.power).ok_or_else(incompatible)?;
    Ok(10f64.powi(exponent))
}
