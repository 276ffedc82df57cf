//! Requested output fields.
//!
//! Callers name the metrics they need so the engine can skip calculators whose
//! output would be thrown away.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use stockroll_core::DomainError;

/// One output attribute of [`crate::InventoryInfo`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InventoryField {
    InventoryAvailableToSell,
    InventoryInStock,
    InventoryReserved,
    IsBackorder,
    IsLowQuantity,
    IsSoldOut,
}

impl InventoryField {
    pub const ALL: [InventoryField; 6] = [
        InventoryField::InventoryAvailableToSell,
        InventoryField::InventoryInStock,
        InventoryField::InventoryReserved,
        InventoryField::IsBackorder,
        InventoryField::IsLowQuantity,
        InventoryField::IsSoldOut,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InventoryField::InventoryAvailableToSell => "inventoryAvailableToSell",
            InventoryField::InventoryInStock => "inventoryInStock",
            InventoryField::InventoryReserved => "inventoryReserved",
            InventoryField::IsBackorder => "isBackorder",
            InventoryField::IsLowQuantity => "isLowQuantity",
            InventoryField::IsSoldOut => "isSoldOut",
        }
    }

    fn bit(self) -> u8 {
        match self {
            InventoryField::InventoryAvailableToSell => 1 << 0,
            InventoryField::InventoryInStock => 1 << 1,
            InventoryField::InventoryReserved => 1 << 2,
            InventoryField::IsBackorder => 1 << 3,
            InventoryField::IsLowQuantity => 1 << 4,
            InventoryField::IsSoldOut => 1 << 5,
        }
    }
}

impl core::fmt::Display for InventoryField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InventoryField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown inventory field '{s}'")))
    }
}

/// Set of requested fields.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct InventoryFields {
    mask: u8,
}

impl InventoryFields {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        InventoryField::ALL.into_iter().collect()
    }

    /// Parse field names as sent by callers. Unknown names are rejected.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, DomainError> {
        names.iter().map(|name| name.as_ref().parse::<InventoryField>()).collect()
    }

    pub fn with(mut self, field: InventoryField) -> Self {
        self.mask |= field.bit();
        self
    }

    pub fn contains(&self, field: InventoryField) -> bool {
        self.mask & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Whether any requested field is derived from available-to-sell.
    pub fn needs_available_to_sell(&self) -> bool {
        self.contains(InventoryField::InventoryAvailableToSell)
            || self.contains(InventoryField::IsBackorder)
            || self.contains(InventoryField::IsLowQuantity)
            || self.contains(InventoryField::IsSoldOut)
    }

    pub fn iter(&self) -> impl Iterator<Item = InventoryField> + '_ {
        InventoryField::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl FromIterator<InventoryField> for InventoryFields {
    fn from_iter<I: IntoIterator<Item = InventoryField>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

impl Serialize for InventoryFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for InventoryFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        InventoryFields::parse(&names).map_err(serde::de::Error::custom)
    }
}
