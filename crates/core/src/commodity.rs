//! Supported commodities and their normal price ceilings.
//!
//! The ceiling table is built once on first use and shared read-only by every
//! engine that needs it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    Cabbage,
    Kale,
    Onion,
    Potatoes,
    Tomatoes,
}

impl Commodity {
    pub const ALL: [Commodity; 5] =
        [Self::Cabbage, Self::Kale, Self::Onion, Self::Potatoes, Self::Tomatoes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cabbage => "cabbage",
            Self::Kale => "kale",
            Self::Onion => "onion",
            Self::Potatoes => "potatoes",
            Self::Tomatoes => "tomatoes",
        }
    }

    pub fn allowed_names() -> Vec<String> {
        Self::ALL.iter().map(|commodity| commodity.as_str().to_string()).collect()
    }

    /// Parses caller input, ignoring surrounding whitespace and case.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|commodity| commodity.as_str() == normalized).ok_or_else(|| {
            DomainError::UnsupportedCommodity {
                given: raw.to_string(),
                allowed: Self::allowed_names(),
            }
        })
    }
}

impl FromStr for Commodity {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    Retail,
    Wholesale,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Wholesale => "wholesale",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "retail" => Ok(Self::Retail),
            "wholesale" => Ok(Self::Wholesale),
            _ => Err(DomainError::invalid_input(format!(
                "Invalid pricetype: '{raw}'. Allowed: 'retail', 'wholesale'"
            ))),
        }
    }
}

impl FromStr for PriceType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normal price ceiling per commodity, KES/kg.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdTable {
    ceilings: BTreeMap<Commodity, Decimal>,
}

static STANDARD_THRESHOLDS: OnceLock<ThresholdTable> = OnceLock::new();

impl ThresholdTable {
    pub fn standard() -> &'static ThresholdTable {
        STANDARD_THRESHOLDS.get_or_init(|| {
            Self::from_entries([
                (Commodity::Cabbage, Decimal::from(126)),
                (Commodity::Kale, Decimal::from(50)),
                (Commodity::Onion, Decimal::from(13)),
                (Commodity::Potatoes, Decimal::from(50)),
                (Commodity::Tomatoes, Decimal::from(64)),
            ])
        })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Commodity, Decimal)>) -> Self {
        Self { ceilings: entries.into_iter().collect() }
    }

    pub fn ceiling(&self, commodity: Commodity) -> Result<Decimal, DomainError> {
        self.ceilings.get(&commodity).copied().ok_or_else(|| DomainError::UnsupportedCommodity {
            given: commodity.as_str().to_string(),
            allowed: self.commodities().map(|c| c.as_str().to_string()).collect(),
        })
    }

    pub fn commodities(&self) -> impl Iterator<Item = Commodity> + '_ {
        self.ceilings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ceilings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ceilings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Commodity, PriceType, ThresholdTable};
    use crate::errors::DomainError;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(Commodity::parse("  Cabbage "), Ok(Commodity::Cabbage));
        assert_eq!("TOMATOES".parse::<Commodity>(), Ok(Commodity::Tomatoes));
    }

    #[test]
    fn parse_rejects_unknown_commodity_listing_exactly_the_supported_set() {
        let error = Commodity::parse("maize").expect_err("maize is not supported");

        match error {
            DomainError::UnsupportedCommodity { given, allowed } => {
                assert_eq!(given, "maize");
                assert_eq!(allowed, vec!["cabbage", "kale", "onion", "potatoes", "tomatoes"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn standard_table_covers_every_commodity() {
        let table = ThresholdTable::standard();

        assert_eq!(table.len(), Commodity::ALL.len());
        assert_eq!(table.ceiling(Commodity::Cabbage), Ok(Decimal::from(126)));
        assert_eq!(table.ceiling(Commodity::Onion), Ok(Decimal::from(13)));
        assert!(Commodity::ALL.iter().all(|c| table.ceiling(*c).is_ok()));
    }

    #[test]
    fn partial_table_rejects_missing_commodity() {
        let table = ThresholdTable::from_entries([(Commodity::Kale, Decimal::from(50))]);

        assert!(matches!(
            table.ceiling(Commodity::Onion),
            Err(DomainError::UnsupportedCommodity { .. })
        ));
    }

    #[test]
    fn price_type_parses_case_insensitively() {
        assert_eq!(PriceType::parse("Retail"), Ok(PriceType::Retail));
        assert_eq!(PriceType::parse(" WHOLESALE"), Ok(PriceType::Wholesale));
        assert!(matches!(PriceType::parse("farmgate"), Err(DomainError::InvalidInput(_))));
    }
}
