//! Ambient configuration threaded through every codec call.
//!
//! A [`Context`] is owned by the caller and only read here. A
//! [`DescriptorContext`] is the per-descriptor view used for registry
//! lookups: the active standards plus whatever the enclosing container knows
//! (table id, current private data specifier).

use crate::standards::Standards;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Private data specifier, the vendor discriminator of DVB private descriptors.
pub type Pds = u32;

/// Table id of an enclosing PSI/SI table.
pub type TableId = u8;

pub const PDS_NULL: Pds = 0;
pub const PDS_EACEM: Pds = 0x0000_0028;
pub const PDS_EUTELSAT: Pds = 0x0000_0055;

pub const TID_CAT: TableId = 0x01;
pub const TID_PMT: TableId = 0x02;
pub const TID_NIT_ACT: TableId = 0x40;
pub const TID_SDT_ACT: TableId = 0x42;
pub const TID_INT: TableId = 0x4C;
pub const TID_SCTE35_SIT: TableId = 0xFC;

/// Character set used to decode and encode strings in descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Charset {
    /// UTF-8, invalid sequences are replaced on decode.
    #[default]
    Utf8,
    /// ISO 8859-1, characters above U+00FF encode as '?'.
    Latin1,
}

impl Charset {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Latin1 => text
                .chars()
                .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Charset::Utf8 => write!(f, "UTF-8"),
            Charset::Latin1 => write!(f, "ISO-8859-1"),
        }
    }
}

/// Error returned when parsing an unknown character set name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown charset '{0}'")]
pub struct UnknownCharset(pub String);

impl FromStr for Charset {
    type Err = UnknownCharset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Charset::Utf8),
            "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Charset::Latin1),
            _ => Err(UnknownCharset(s.to_string())),
        }
    }
}

/// Caller-supplied configuration, read-only for the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Context {
    standards: Standards,
    default_pds: Pds,
    charset: Charset,
}

impl Context {
    pub fn new(standards: Standards) -> Self {
        Context {
            standards,
            ..Default::default()
        }
    }

    /// Sets the private data specifier assumed when a list carries none.
    pub fn with_default_pds(mut self, pds: Pds) -> Self {
        self.default_pds = pds;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Active standards. MPEG is always part of the result.
    pub fn standards(&self) -> Standards {
        self.standards | Standards::MPEG
    }

    pub fn add_standards(&mut self, standards: Standards) {
        self.standards |= standards;
    }

    pub fn default_pds(&self) -> Pds {
        self.default_pds
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Lookup scope for a descriptor found outside of any table.
    pub fn descriptor_context(&self) -> DescriptorContext {
        DescriptorContext {
            standards: self.standards(),
            pds: self.default_pds,
            table_id: None,
        }
    }
}

/// Everything a registry lookup needs to know about where a tag was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorContext {
    pub standards: Standards,
    /// Current private data specifier, `PDS_NULL` when none applies.
    pub pds: Pds,
    /// Enclosing table, `None` for a free-standing descriptor list.
    pub table_id: Option<TableId>,
}

impl DescriptorContext {
    pub fn new(standards: Standards) -> Self {
        DescriptorContext {
            standards: standards | Standards::MPEG,
            pds: PDS_NULL,
            table_id: None,
        }
    }

    pub fn with_pds(mut self, pds: Pds) -> Self {
        self.pds = pds;
        self
    }

    pub fn with_table_id(mut self, table_id: TableId) -> Self {
        self.table_id = Some(table_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpeg_is_implicit() {
        let ctx = Context::new(Standards::DVB);
        assert!(ctx.standards().contains(Standards::MPEG | Standards::DVB));
        assert!(
            DescriptorContext::new(Standards::NONE)
                .standards
                .contains(Standards::MPEG)
        );
    }

    #[test]
    fn test_descriptor_context_from_context() {
        let ctx = Context::new(Standards::DVB).with_default_pds(PDS_EACEM);
        let dctx = ctx.descriptor_context().with_table_id(TID_NIT_ACT);
        assert_eq!(dctx.pds, PDS_EACEM);
        assert_eq!(dctx.table_id, Some(TID_NIT_ACT));
    }

    #[test]
    fn test_charsets() {
        assert_eq!(Charset::Latin1.encode("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(Charset::Latin1.decode(&[b'c', 0xE9]), "cé");
        assert_eq!(Charset::Utf8.decode("café".as_bytes()), "café");
        assert_eq!(Charset::Latin1.encode("€"), vec![b'?']);
        assert_eq!("latin1".parse::<Charset>(), Ok(Charset::Latin1));
    }

    #[test]
    fn test_unknown_charset() {
        assert_eq!("UTF-8".parse::<Charset>(), Ok(Charset::Utf8));
        let err = "EBCDIC".parse::<Charset>().unwrap_err();
        assert_eq!(err, UnknownCharset("EBCDIC".to_string()));
        assert_eq!(err.to_string(), "unknown charset 'EBCDIC'");
    }
}
