//! Domain enums shared between the API layer and storage
//!
//! The string forms of these enums are the literals used both in JSON payloads
//! and in the Postgres enum types declared by the migrations.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::CommonError;

/// Rest semantics applied before the next repetition of a set
///
/// Payloads may carry a literal that is not a known start type. It is kept as
/// [`StartType::Unknown`] so validation can report the offending value instead
/// of failing deserialization of the whole training.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StartType {
    #[default]
    None,
    Pause,
    Interval,
    Unknown(String),
}

impl StartType {
    pub fn as_str(&self) -> &str {
        match self {
            StartType::None => "None",
            StartType::Pause => "Pause",
            StartType::Interval => "Interval",
            StartType::Unknown(literal) => literal,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, StartType::Unknown(_))
    }

    /// Pause and interval starts need a seconds value
    pub fn requires_seconds(&self) -> bool {
        matches!(self, StartType::Pause | StartType::Interval)
    }
}

impl From<&str> for StartType {
    fn from(s: &str) -> Self {
        match s {
            "None" => StartType::None,
            "Pause" => StartType::Pause,
            "Interval" => StartType::Interval,
            other => StartType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for StartType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "None" | "Pause" | "Interval" => StartType::from(s.as_str()),
            _ => StartType::Unknown(s),
        }
    }
}

impl From<StartType> for String {
    fn from(start: StartType) -> Self {
        match start {
            StartType::Unknown(literal) => literal,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Swimming equipment used during a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equipment {
    Fins,
    Monofin,
    Snorkel,
    Board,
    Paddles,
}

impl Equipment {
    pub const ALL: [Equipment; 5] = [
        Equipment::Fins,
        Equipment::Monofin,
        Equipment::Snorkel,
        Equipment::Board,
        Equipment::Paddles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Equipment::Fins => "Fins",
            Equipment::Monofin => "Monofin",
            Equipment::Snorkel => "Snorkel",
            Equipment::Board => "Board",
            Equipment::Paddles => "Paddles",
        }
    }
}

impl FromStr for Equipment {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Equipment::ALL
            .into_iter()
            .find(|equipment| equipment.as_str() == s)
            .ok_or_else(|| CommonError::invalid("equipment", s))
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
