//! Fixed mood enumeration.
//!
//! # Invariants
//! - Exactly 12 values exist, with ordinals 0..=11 in declaration order.
//! - Names and ordinals are stable; they are persisted and shown to users.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Emotional state attachable to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mood {
    Happy = 0,
    Neutral = 1,
    Sad = 2,
    Excited = 3,
    Anxious = 4,
    Grateful = 5,
    Reflective = 6,
    Motivated = 7,
    Overwhelmed = 8,
    Peaceful = 9,
    Frustrated = 10,
    Hopeful = 11,
}

impl Mood {
    /// All moods in ordinal order.
    pub const ALL: [Mood; 12] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Excited,
        Mood::Anxious,
        Mood::Grateful,
        Mood::Reflective,
        Mood::Motivated,
        Mood::Overwhelmed,
        Mood::Peaceful,
        Mood::Frustrated,
        Mood::Hopeful,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Excited => "Excited",
            Mood::Anxious => "Anxious",
            Mood::Grateful => "Grateful",
            Mood::Reflective => "Reflective",
            Mood::Motivated => "Motivated",
            Mood::Overwhelmed => "Overwhelmed",
            Mood::Peaceful => "Peaceful",
            Mood::Frustrated => "Frustrated",
            Mood::Hopeful => "Hopeful",
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Resolves a mood from its fixed ordinal.
    pub fn from_ordinal(value: u8) -> Option<Mood> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the 12 moods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodParseError(pub String);

impl Display for MoodParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown mood `{}`", self.0)
    }
}

impl Error for MoodParseError {}

impl FromStr for Mood {
    type Err = MoodParseError;

    /// Parses the exact mood name (case-sensitive, as persisted).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mood| mood.as_str() == value)
            .ok_or_else(|| MoodParseError(value.to_string()))
    }
}
