//! Point naming
//!
//! Points keep their historical names (`apoint`, `perspurpose`, `af2point`,
//! `union`) on the wire and in the text corpus; in code they are an enum.

use crate::error::LookupError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Points of the octagram, one per letter `a..=x`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum MainPoint {
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X,
}

impl MainPoint {
    /// Number of main points
    pub const COUNT: usize = 24;

    /// All main points in letter order
    pub const ALL: [MainPoint; Self::COUNT] = [
        Self::A, Self::B, Self::C, Self::D, Self::E, Self::F, Self::G, Self::H,
        Self::I, Self::J, Self::K, Self::L, Self::M, Self::N, Self::O, Self::P,
        Self::Q, Self::R, Self::S, Self::T, Self::U, Self::V, Self::W, Self::X,
    ];

    /// Lowercase letter
    #[must_use]
    pub fn letter(self) -> char {
        // Variants are declared in letter order starting at 'a'.
        char::from(b'a' + self as u8)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Purpose points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    /// Spiritual line: b + d
    Sky,
    /// Material line: a + c
    Earth,
    /// Personal purpose: sky + earth
    Personal,
    /// Male line: f + i
    Male,
    /// Female line: g + h
    Female,
    /// Social purpose: male + female
    Social,
    /// General (spiritual) purpose: personal + social
    General,
    /// Planetary purpose: social + general
    Planetary,
}

impl Purpose {
    /// Number of purpose points
    pub const COUNT: usize = 8;

    /// All purposes in derivation order
    pub const ALL: [Purpose; Self::COUNT] = [
        Self::Sky,
        Self::Earth,
        Self::Personal,
        Self::Male,
        Self::Female,
        Self::Social,
        Self::General,
        Self::Planetary,
    ];

    /// Legacy name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sky => "skypoint",
            Self::Earth => "earthpoint",
            Self::Personal => "perspurpose",
            Self::Male => "malepoint",
            Self::Female => "femalepoint",
            Self::Social => "socialpurpose",
            Self::General => "generalpurpose",
            Self::Planetary => "planetarypurpose",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Ten-year segment of the age circle, between two octagram corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// a → f, ages 0..10
    Af,
    /// f → b, ages 10..20
    Fb,
    /// b → g, ages 20..30
    Bg,
    /// g → c, ages 30..40
    Gc,
    /// c → i, ages 40..50
    Ci,
    /// i → d, ages 50..60
    Id,
    /// d → h, ages 60..70
    Dh,
    /// h → a, ages 70..80
    Ha,
}

impl Segment {
    /// Number of segments in one cycle
    pub const COUNT: usize = 8;

    /// Segments in age order
    pub const ALL: [Segment; Self::COUNT] = [
        Self::Af,
        Self::Fb,
        Self::Bg,
        Self::Gc,
        Self::Ci,
        Self::Id,
        Self::Dh,
        Self::Ha,
    ];

    /// Corner the segment starts from
    #[must_use]
    pub fn start(self) -> MainPoint {
        match self {
            Self::Af => MainPoint::A,
            Self::Fb => MainPoint::F,
            Self::Bg => MainPoint::B,
            Self::Gc => MainPoint::G,
            Self::Ci => MainPoint::C,
            Self::Id => MainPoint::I,
            Self::Dh => MainPoint::D,
            Self::Ha => MainPoint::H,
        }
    }

    /// Corner the segment ends at
    #[must_use]
    pub fn end(self) -> MainPoint {
        match self {
            Self::Af => MainPoint::F,
            Self::Fb => MainPoint::B,
            Self::Bg => MainPoint::G,
            Self::Gc => MainPoint::C,
            Self::Ci => MainPoint::I,
            Self::Id => MainPoint::D,
            Self::Dh => MainPoint::H,
            Self::Ha => MainPoint::A,
        }
    }

    /// Two-letter prefix used in point names
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Af => "af",
            Self::Fb => "fb",
            Self::Bg => "bg",
            Self::Gc => "gc",
            Self::Ci => "ci",
            Self::Id => "id",
            Self::Dh => "dh",
            Self::Ha => "ha",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Position inside a segment
///
/// Offsets from the segment start: `Start` 0, `Two` 1.25, `One` 2.5,
/// `Three` 3.75, `Four` 5, `Five` 6.25, `Six` 8.75 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YearStep {
    /// Segment corner
    Start,
    /// Quarter point
    One,
    /// Eighth point
    Two,
    /// Three-eighths point
    Three,
    /// Midpoint
    Four,
    /// Five-eighths point
    Five,
    /// Seven-eighths point
    Six,
}

impl YearStep {
    /// Number of named steps per segment
    pub const COUNT: usize = 7;

    /// Steps in index order
    pub const ALL: [YearStep; Self::COUNT] = [
        Self::Start,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
    ];

    /// Digit suffix in point names
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Start => "",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Name of any point a matrix can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointKey {
    /// Octagram point
    Main(MainPoint),
    /// Purpose point
    Purpose(Purpose),
    /// Year forecast point
    Year(Segment, YearStep),
    /// Strength of the union (compatibility matrices only)
    Union,
}

impl PointKey {
    /// Every key carried by a personal matrix
    pub fn personal() -> impl Iterator<Item = PointKey> {
        MainPoint::ALL
            .into_iter()
            .map(PointKey::Main)
            .chain(Purpose::ALL.into_iter().map(PointKey::Purpose))
            .chain(Segment::ALL.into_iter().flat_map(|segment| {
                YearStep::ALL
                    .into_iter()
                    .map(move |step| PointKey::Year(segment, step))
            }))
    }

    /// Every key carried by a compatibility matrix
    pub fn compatibility() -> impl Iterator<Item = PointKey> {
        Self::personal().chain(std::iter::once(PointKey::Union))
    }

    /// Legacy name (`apoint`, `perspurpose`, `af2point`, `union`)
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Main(p) => format!("{}point", p.letter()),
            Self::Purpose(p) => p.name().to_string(),
            Self::Year(segment, step) => format!("{}{}point", segment.prefix(), step.suffix()),
            Self::Union => "union".to_string(),
        }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

static KEYS_BY_NAME: Lazy<HashMap<String, PointKey>> =
    Lazy::new(|| PointKey::compatibility().map(|k| (k.name(), k)).collect());

impl FromStr for PointKey {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KEYS_BY_NAME
            .get(s.trim())
            .copied()
            .ok_or_else(|| LookupError::UnknownPointKey(s.to_string()))
    }
}

impl Serialize for PointKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PointKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_follow_declaration_order() {
        assert_eq!(MainPoint::A.letter(), 'a');
        assert_eq!(MainPoint::O.letter(), 'o');
        assert_eq!(MainPoint::X.letter(), 'x');
        for (i, p) in MainPoint::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn legacy_names() {
        assert_eq!(PointKey::Main(MainPoint::A).to_string(), "apoint");
        assert_eq!(PointKey::Purpose(Purpose::Personal).to_string(), "perspurpose");
        assert_eq!(PointKey::Year(Segment::Af, YearStep::Start).to_string(), "afpoint");
        assert_eq!(PointKey::Year(Segment::Dh, YearStep::Two).to_string(), "dh2point");
        assert_eq!(PointKey::Union.to_string(), "union");
    }

    #[test]
    fn names_round_trip_and_are_unique() {
        let keys: Vec<PointKey> = PointKey::compatibility().collect();
        assert_eq!(keys.len(), MainPoint::COUNT + Purpose::COUNT + Segment::COUNT * YearStep::COUNT + 1);
        for key in keys {
            assert_eq!(key.name().parse::<PointKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_name_is_lookup_error() {
        assert_eq!(
            "zpoint".parse::<PointKey>(),
            Err(LookupError::UnknownPointKey("zpoint".to_string()))
        );
    }

    #[test]
    fn serde_uses_legacy_names() {
        let json = serde_json::to_string(&PointKey::Year(Segment::Gc, YearStep::Four)).unwrap();
        assert_eq!(json, "\"gc4point\"");
        let back: PointKey = serde_json::from_str("\"socialpurpose\"").unwrap();
        assert_eq!(back, PointKey::Purpose(Purpose::Social));
    }
}
