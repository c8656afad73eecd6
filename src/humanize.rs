//! Byte sizes that read and print the way people write them ("64KB", "1.5GB")

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const KIB: u64 = 1024;

/// Unit suffixes paired with their multiplier, largest first.
const UNITS: &[(&str, u64)] = &[
    ("TB", KIB * KIB * KIB * KIB),
    ("GB", KIB * KIB * KIB),
    ("MB", KIB * KIB),
    ("KB", KIB),
    ("B", 1),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty size string")]
    Empty,

    #[error("invalid number in size '{0}'")]
    InvalidNumber(String),

    #[error("unknown size unit '{0}'")]
    InvalidUnit(String),
}

/// Number of bytes, parsed from either an integer or a suffixed string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub const fn kib(n: u64) -> Self {
        Self(n * KIB)
    }

    pub const fn mib(n: u64) -> Self {
        Self(n * KIB * KIB)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Saturates on 32-bit targets.
    pub fn as_usize(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit {
        "" | "B" => Some(1),
        "K" | "KB" | "KIB" => Some(KIB),
        "M" | "MB" | "MIB" => Some(KIB * KIB),
        "G" | "GB" | "GIB" => Some(KIB * KIB * KIB),
        "T" | "TB" | "TIB" => Some(KIB * KIB * KIB * KIB),
        _ => None,
    }
}

impl FromStr for ByteSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ParseError::Empty);
        }

        let split = normalized
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(normalized.len());
        let (number, unit) = normalized.split_at(split);

        let multiplier =
            unit_multiplier(unit.trim()).ok_or_else(|| ParseError::InvalidUnit(unit.to_string()))?;

        if let Ok(whole) = number.parse::<u64>() {
            return whole
                .checked_mul(multiplier)
                .map(ByteSize)
                .ok_or_else(|| ParseError::InvalidNumber(s.to_string()));
        }

        // Fractional sizes like "1.5GB" round down to whole bytes.
        let fractional: f64 = number
            .parse()
            .map_err(|_| ParseError::InvalidNumber(s.to_string()))?;
        if !fractional.is_finite() || fractional < 0.0 {
            return Err(ParseError::InvalidNumber(s.to_string()));
        }
        Ok(ByteSize((fractional * multiplier as f64) as u64))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(unit, size) in UNITS {
            if self.0 >= size && size > 1 {
                let whole = self.0 / size;
                let tenth = (self.0 % size) * 10 / size;
                return if tenth == 0 {
                    write!(f, "{whole}{unit}")
                } else {
                    write!(f, "{whole}.{tenth}{unit}")
                };
            }
        }
        write!(f, "{}B", self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(n) => Ok(ByteSize(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
