//! Extended descriptor identifiers.
//!
//! The raw tag of a descriptor is ambiguous: DVB, ISDB, ATSC and SCTE reuse
//! the same values, private descriptors reuse them per vendor, and some tags
//! only mean something inside one kind of table. An [`Edid`] carries the tag
//! together with the scope it is valid in.

use crate::context::{DescriptorContext, Pds, TableId};
use crate::standards::Standards;
use std::fmt::{self, Display, Formatter};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Resolution forms, in the order they are tried during a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdidKind {
    TableSpecific,
    Private,
    Regular,
}

/// Extended descriptor identifier.
///
/// Two identifiers of different kinds never compare equal, even with the same
/// tag and standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Edid {
    /// Valid in any table, under any of the given standards.
    Regular { tag: u8, standards: Standards },
    /// Valid only when the given private data specifier is in force.
    Private {
        tag: u8,
        standards: Standards,
        pds: Pds,
    },
    /// Valid only inside the given table.
    TableSpecific {
        tag: u8,
        standards: Standards,
        table_id: TableId,
    },
}

impl Edid {
    pub const fn regular(tag: u8, standards: Standards) -> Self {
        Edid::Regular { tag, standards }
    }

    pub const fn private(tag: u8, standards: Standards, pds: Pds) -> Self {
        Edid::Private {
            tag,
            standards,
            pds,
        }
    }

    pub const fn table_specific(tag: u8, standards: Standards, table_id: TableId) -> Self {
        Edid::TableSpecific {
            tag,
            standards,
            table_id,
        }
    }

    pub fn tag(&self) -> u8 {
        match *self {
            Edid::Regular { tag, .. } | Edid::Private { tag, .. } | Edid::TableSpecific { tag, .. } => {
                tag
            }
        }
    }

    pub fn standards(&self) -> Standards {
        match *self {
            Edid::Regular { standards, .. }
            | Edid::Private { standards, .. }
            | Edid::TableSpecific { standards, .. } => standards,
        }
    }

    pub fn kind(&self) -> EdidKind {
        match self {
            Edid::Regular { .. } => EdidKind::Regular,
            Edid::Private { .. } => EdidKind::Private,
            Edid::TableSpecific { .. } => EdidKind::TableSpecific,
        }
    }

    /// Checks whether this registered identifier applies to `tag` found in
    /// the given context.
    ///
    /// A private identifier never matches when no private data specifier is
    /// in force, and a table-specific one never matches outside a table.
    pub fn matches(&self, tag: u8, context: &DescriptorContext) -> bool {
        if self.tag() != tag || !self.standards().intersects(context.standards) {
            return false;
        }
        match *self {
            Edid::Regular { .. } => true,
            Edid::Private { pds, .. } => pds != 0 && pds == context.pds,
            Edid::TableSpecific { table_id, .. } => context.table_id == Some(table_id),
        }
    }

    /// True when some lookup could match both identifiers in the same step.
    pub fn overlaps(&self, other: &Edid) -> bool {
        if self.tag() != other.tag() || !self.standards().intersects(other.standards()) {
            return false;
        }
        match (*self, *other) {
            (Edid::Regular { .. }, Edid::Regular { .. }) => true,
            (Edid::Private { pds: a, .. }, Edid::Private { pds: b, .. }) => a == b,
            (
                Edid::TableSpecific { table_id: a, .. },
                Edid::TableSpecific { table_id: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl Display for Edid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Edid::Regular { tag, standards } => write!(f, "Regular(0x{tag:02X}, {standards})"),
            Edid::Private {
                tag,
                standards,
                pds,
            } => write!(f, "Private(0x{tag:02X}, {standards}, pds 0x{pds:08X})"),
            Edid::TableSpecific {
                tag,
                standards,
                table_id,
            } => write!(f, "TableSpecific(0x{tag:02X}, {standards}, table 0x{table_id:02X})"),
        }
    }
}
