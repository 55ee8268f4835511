//! Shipping zones.
//!
//! A zone is the partition key for vendor shipping rates. The storefront ships
//! within Egypt, so the built-in catalog lists the 27 governorates; any other
//! non-empty code is still accepted as a zone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;

/// A normalized shipping zone code (trimmed, lower-case).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Zone(String);

impl Zone {
    /// Create a zone from a raw code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CommerceError> {
        let normalized = code.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CommerceError::InvalidZone(code.as_ref().to_string()));
        }
        Ok(Self(normalized))
    }

    /// The zone code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Catalog entry, if this is a known governorate.
    pub fn governorate(&self) -> Option<&'static Governorate> {
        governorate(&self.0)
    }

    /// Arabic display label, falling back to the code.
    pub fn label(&self) -> &str {
        self.governorate().map(|g| g.label).unwrap_or(&self.0)
    }

    /// English display label, falling back to the code.
    pub fn label_en(&self) -> &str {
        self.governorate().map(|g| g.label_en).unwrap_or(&self.0)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Zone {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::new(s)
    }
}

impl TryFrom<String> for Zone {
    type Error = CommerceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Zone::new(value)
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.0
    }
}

/// A governorate in the shipping catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Governorate {
    /// Zone code used in rate tables.
    pub code: &'static str,
    /// Arabic label.
    pub label: &'static str,
    /// English label.
    pub label_en: &'static str,
}

/// The 27 governorates of Egypt.
pub const GOVERNORATES: &[Governorate] = &[
    gov("cairo", "القاهرة", "Cairo"),
    gov("giza", "الجيزة", "Giza"),
    gov("alexandria", "الإسكندرية", "Alexandria"),
    gov("dakahlia", "الدقهلية", "Dakahlia"),
    gov("sharqia", "الشرقية", "Sharqia"),
    gov("qalyubia", "القليوبية", "Qalyubia"),
    gov("monufia", "المنوفية", "Monufia"),
    gov("gharbia", "الغربية", "Gharbia"),
    gov("kafr_el_sheikh", "كفر الشيخ", "Kafr El Sheikh"),
    gov("beheira", "البحيرة", "Beheira"),
    gov("damietta", "دمياط", "Damietta"),
    gov("port_said", "بورسعيد", "Port Said"),
    gov("ismailia", "الإسماعيلية", "Ismailia"),
    gov("suez", "السويس", "Suez"),
    gov("north_sinai", "شمال سيناء", "North Sinai"),
    gov("south_sinai", "جنوب سيناء", "South Sinai"),
    gov("red_sea", "البحر الأحمر", "Red Sea"),
    gov("fayoum", "الفيوم", "Fayoum"),
    gov("beni_suef", "بني سويف", "Beni Suef"),
    gov("minya", "المنيا", "Minya"),
    gov("asyut", "أسيوط", "Asyut"),
    gov("sohag", "سوهاج", "Sohag"),
    gov("qena", "قنا", "Qena"),
    gov("luxor", "الأقصر", "Luxor"),
    gov("aswan", "أسوان", "Aswan"),
    gov("new_valley", "الوادي الجديد", "New Valley"),
    gov("matrouh", "مطروح", "Matrouh"),
];

const fn gov(code: &'static str, label: &'static str, label_en: &'static str) -> Governorate {
    Governorate {
        code,
        label,
        label_en,
    }
}

/// Look up a governorate by zone code.
pub fn governorate(code: &str) -> Option<&'static Governorate> {
    GOVERNORATES.iter().find(|g| g.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_normalizes_code() {
        let zone = Zone::new("  Cairo ").unwrap();
        assert_eq!(zone.as_str(), "cairo");
    }

    #[test]
    fn test_empty_zone_rejected() {
        assert!(matches!(Zone::new("   "), Err(CommerceError::InvalidZone(_))));
    }

    #[test]
    fn test_labels() {
        let zone = Zone::new("port_said").unwrap();
        assert_eq!(zone.label_en(), "Port Said");
        assert_eq!(zone.label(), "بورسعيد");

        let unknown = Zone::new("riyadh").unwrap();
        assert!(unknown.governorate().is_none());
        assert_eq!(unknown.label(), "riyadh");
    }

    #[test]
    fn test_catalog_size_and_unique_codes() {
        assert_eq!(GOVERNORATES.len(), 27);
        let mut codes: Vec<&str> = GOVERNORATES.iter().map(|g| g.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 27);
    }

    #[test]
    fn test_zone_deserialize_validates() {
        let zone: Zone = serde_json::from_str("\"GIZA\"").unwrap();
        assert_eq!(zone.as_str(), "giza");
        assert!(serde_json::from_str::<Zone>("\"\"").is_err());
    }
}
