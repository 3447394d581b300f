use crate::geo::Location;
use crate::{Nation, ShortName};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Whether a province is a supply center, and if so, who owns it at the start of the game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SupplyCenter {
    /// The province is not a supply center.
    None,
    /// The province is a supply center, but is not any power's home center.
    Neutral,
    /// The province is a home supply center of the given power.
    Home(Nation),
}

/// A controllable area of the map. Provinces are the coarsest-grained addressable
/// location; some provinces are further divided into regions to capture coasts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Province {
    pub short_name: String,
    pub full_name: String,
    pub supply_center: SupplyCenter,
}

impl ShortName for Province {
    fn short_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.short_name)
    }
}

impl Province {
    /// Whether the province is a supply center, whether neutral or home to a power.
    pub fn is_supply_center(&self) -> bool {
        !matches!(self.supply_center, SupplyCenter::None)
    }
}

/// An identifier that references a province by its canonical short name.
///
/// Unlike `Province`, a `ProvinceKey` carries no information about the map and can
/// be constructed freely, e.g. when parsing order text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProvinceKey(String);

impl ProvinceKey {
    /// Create a new province key, normalizing to lowercase so that lookups are
    /// case-insensitive regardless of how the caller capitalized the input.
    pub fn new(s: impl Into<String>) -> Self {
        ProvinceKey(s.into().to_lowercase())
    }
}

impl ShortName for ProvinceKey {
    fn short_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }
}

impl fmt::Display for ProvinceKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl Location for ProvinceKey {
    type Province = ProvinceKey;

    fn province(&self) -> &Self::Province {
        self
    }
}

impl FromStr for ProvinceKey {
    type Err = crate::parser::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProvinceKey::new(s))
    }
}

impl From<&str> for ProvinceKey {
    fn from(s: &str) -> Self {
        ProvinceKey::new(s)
    }
}

impl From<String> for ProvinceKey {
    fn from(s: String) -> Self {
        ProvinceKey::new(s)
    }
}

impl From<&Province> for ProvinceKey {
    fn from(p: &Province) -> Self {
        ProvinceKey::new(p.short_name.clone())
    }
}

impl PartialEq<Province> for ProvinceKey {
    fn eq(&self, rhs: &Province) -> bool {
        self.0 == rhs.short_name.to_lowercase()
    }
}

impl PartialEq<ProvinceKey> for Province {
    fn eq(&self, rhs: &ProvinceKey) -> bool {
        rhs == self
    }
}
