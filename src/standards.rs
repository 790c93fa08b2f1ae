//! Broadcast standards in force for a container.
//!
//! Several standards may be active at the same time: a single transport
//! stream can legally carry DVB and SCTE structures, or ISDB structures on
//! top of a Japanese profile.

use std::fmt::{self, Display, Formatter};
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Bit mask of broadcast standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Standards(u16);

impl Standards {
    pub const NONE: Standards = Standards(0x0000);
    /// ISO/IEC 13818-1, always implicitly active.
    pub const MPEG: Standards = Standards(0x0001);
    pub const DVB: Standards = Standards(0x0002);
    pub const SCTE: Standards = Standards(0x0004);
    pub const ATSC: Standards = Standards(0x0008);
    pub const ISDB: Standards = Standards(0x0010);
    /// Japanese extensions on top of ISDB.
    pub const JAPAN: Standards = Standards(0x0020);
    /// Brazilian extensions on top of ISDB.
    pub const ABNT: Standards = Standards(0x0040);
    /// DVB extensions used in Japan by some operators.
    pub const DVBJ: Standards = Standards(0x0080);

    const NAMES: [(Standards, &'static str); 8] = [
        (Standards::MPEG, "MPEG"),
        (Standards::DVB, "DVB"),
        (Standards::SCTE, "SCTE"),
        (Standards::ATSC, "ATSC"),
        (Standards::ISDB, "ISDB"),
        (Standards::JAPAN, "JAPAN"),
        (Standards::ABNT, "ABNT"),
        (Standards::DVBJ, "DVBJ"),
    ];

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn from_bits(bits: u16) -> Self {
        Standards(bits)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when all standards of `other` are in `self`.
    pub const fn contains(self, other: Standards) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when at least one standard is common to both sets.
    pub const fn intersects(self, other: Standards) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterates over the individual standards of the set.
    pub fn iter(self) -> impl Iterator<Item = Standards> {
        Self::NAMES
            .into_iter()
            .map(|(std, _)| std)
            .filter(move |std| self.contains(*std))
    }
}

impl BitOr for Standards {
    type Output = Standards;

    fn bitor(self, rhs: Standards) -> Standards {
        Standards(self.0 | rhs.0)
    }
}

impl BitOrAssign for Standards {
    fn bitor_assign(&mut self, rhs: Standards) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Standards {
    type Output = Standards;

    fn bitand(self, rhs: Standards) -> Standards {
        Standards(self.0 & rhs.0)
    }
}

impl Display for Standards {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(std, _)| self.contains(*std))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Error returned when parsing an unknown standard name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown standard '{0}'")]
pub struct UnknownStandard(pub String);

impl FromStr for Standards {
    type Err = UnknownStandard;

    /// Parses a comma or plus separated list such as `"dvb,scte"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Standards::NONE;
        for name in s.split([',', '+']).map(str::trim).filter(|n| !n.is_empty()) {
            let std = Self::NAMES
                .iter()
                .find(|(_, known)| known.eq_ignore_ascii_case(name))
                .map(|(std, _)| *std)
                .ok_or_else(|| UnknownStandard(name.to_string()))?;
            result |= std;
        }
        Ok(result)
    }
}
