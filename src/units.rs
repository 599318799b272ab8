//! Unit-of-measure normalization between the two models.
//!
//! The acquisition server names units by their long enumerant form
//! (`NANOMETER`), the interchange schema by symbol (`nm`). The table below
//! is append-only: entries are never removed or renamed, so documents
//! written by older versions keep resolving. Units missing from the table
//! pass through unchanged in both directions.

use serde::{Deserialize, Serialize};

/// Physical dimension of a quantity on the source side.
///
/// The server stores each dimension in a separate quantity type, so a unit
/// coming back from the interchange side has to pick one before it can be
/// written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Length,
    Time,
    Power,
    Temperature,
    Pressure,
    Frequency,
    ElectricPotential,
}

struct UnitEntry {
    long_form: &'static str,
    symbol: &'static str,
    kind: QuantityKind,
}

const fn entry(long_form: &'static str, symbol: &'static str, kind: QuantityKind) -> UnitEntry {
    UnitEntry {
        long_form,
        symbol,
        kind,
    }
}

const UNIT_TABLE: &[UnitEntry] = &[
    entry("NANOMETER", "nm", QuantityKind::Length),
    entry("MICROMETER", "µm", QuantityKind::Length),
    entry("MILLIMETER", "mm", QuantityKind::Length),
    entry("SECOND", "s", QuantityKind::Time),
    entry("REFERENCEFRAME", "reference frame", QuantityKind::Length),
    entry("MILLISECOND", "ms", QuantityKind::Time),
    entry("MICROSECOND", "µs", QuantityKind::Time),
    entry("WATT", "W", QuantityKind::Power),
    entry("MILLIWATT", "mW", QuantityKind::Power),
    entry("CELSIUS", "°C", QuantityKind::Temperature),
    entry("KELVIN", "K", QuantityKind::Temperature),
    entry("MILLIBAR", "mbar", QuantityKind::Pressure),
    entry("ATMOSPHERE", "atm", QuantityKind::Pressure),
    entry("PASCAL", "Pa", QuantityKind::Pressure),
    entry("HERTZ", "Hz", QuantityKind::Frequency),
    entry("MEGAHERTZ", "MHz", QuantityKind::Frequency),
    entry("VOLT", "V", QuantityKind::ElectricPotential),
];

/// Converts a source long-form unit name to its interchange symbol.
pub fn to_symbol(long_form: &str) -> String {
    UNIT_TABLE
        .iter()
        .find(|e| e.long_form == long_form)
        .map(|e| e.symbol)
        .unwrap_or(long_form)
        .to_string()
}

/// Converts an interchange unit symbol back to the source long form.
pub fn to_long_form(symbol: &str) -> String {
    UNIT_TABLE
        .iter()
        .find(|e| e.symbol == symbol)
        .map(|e| e.long_form)
        .unwrap_or(symbol)
        .to_string()
}

/// Picks the source quantity type for a long-form unit.
///
/// Time units map to [`QuantityKind::Time`]; anything the table does not
/// know is written as a length.
pub fn quantity_kind(long_form: &str) -> QuantityKind {
    UNIT_TABLE
        .iter()
        .find(|e| e.long_form == long_form)
        .map(|e| e.kind)
        .unwrap_or(QuantityKind::Length)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE_VOCABULARY: [&str; 5] = [
        "NANOMETER",
        "MICROMETER",
        "MILLIMETER",
        "SECOND",
        "REFERENCEFRAME",
    ];

    #[test]
    fn core_vocabulary_round_trips() {
        for unit in CORE_VOCABULARY {
            assert_eq!(to_long_form(&to_symbol(unit)), unit);
        }
        for symbol in ["nm", "µm", "mm", "s", "reference frame"] {
            assert_eq!(to_symbol(&to_long_form(symbol)), symbol);
        }
    }

    #[test]
    fn unknown_units_pass_through() {
        assert_eq!(to_symbol("FURLONG"), "FURLONG");
        assert_eq!(to_long_form("furlong"), "furlong");
    }

    #[test]
    fn symbols_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for e in UNIT_TABLE {
            assert!(seen.insert(e.symbol), "duplicate symbol {}", e.symbol);
        }
    }

    #[test]
    fn second_is_time_everything_else_defaults_to_length() {
        assert_eq!(quantity_kind("SECOND"), QuantityKind::Time);
        assert_eq!(quantity_kind("NANOMETER"), QuantityKind::Length);
        assert_eq!(quantity_kind("SOMETHING_NEW"), QuantityKind::Length);
        assert_eq!(quantity_kind("MILLIWATT"), QuantityKind::Power);
    }
}
