use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A product attribute that reconciliation can be told to leave untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OmitField {
    Title,
    Description,
    Price,
    Stock,
    Categories,
    Packing,
    Variants,
    Image,
}

impl OmitField {
    pub const ALL: [OmitField; 8] = [
        OmitField::Title,
        OmitField::Description,
        OmitField::Price,
        OmitField::Stock,
        OmitField::Categories,
        OmitField::Packing,
        OmitField::Variants,
        OmitField::Image,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OmitField::Title => "title",
            OmitField::Description => "description",
            OmitField::Price => "price",
            OmitField::Stock => "stock",
            OmitField::Categories => "categories",
            OmitField::Packing => "packing",
            OmitField::Variants => "variants",
            OmitField::Image => "image",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for OmitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown omit field '{0}'")]
pub struct UnknownOmitField(pub String);

impl FromStr for OmitField {
    type Err = UnknownOmitField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        OmitField::ALL
            .into_iter()
            .find(|field| field.as_str() == needle)
            .ok_or_else(|| UnknownOmitField(s.to_string()))
    }
}

/// Set of [`OmitField`] flags.
///
/// Serializes as a JSON array of field names in canonical order.
/// Deserializing drops names that are not valid fields.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OmitFields(u8);

impl OmitFields {
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn contains(self, field: OmitField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn insert(&mut self, field: OmitField) {
        self.0 |= field.bit();
    }

    /// Copy of `self` with `field` added.
    #[must_use]
    pub fn with(mut self, field: OmitField) -> Self {
        self.insert(field);
        self
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = OmitField> {
        OmitField::ALL
            .into_iter()
            .filter(move |field| self.contains(*field))
    }

    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter().map(OmitField::as_str).collect()
    }

    /// Parse a list of field names, keeping only the valid ones.
    ///
    /// Returns the set together with the names that were rejected so the
    /// caller can report them.
    pub fn parse_lenient<I, S>(names: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty();
        let mut rejected = Vec::new();
        for name in names {
            match name.as_ref().parse::<OmitField>() {
                Ok(field) => set.insert(field),
                Err(UnknownOmitField(raw)) => rejected.push(raw),
            }
        }
        (set, rejected)
    }
}

impl fmt::Debug for OmitFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<OmitField> for OmitFields {
    fn from_iter<T: IntoIterator<Item = OmitField>>(iter: T) -> Self {
        let mut set = Self::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl Serialize for OmitFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(OmitField::as_str))
    }
}

impl<'de> Deserialize<'de> for OmitFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::parse_lenient(names).0)
    }
}
