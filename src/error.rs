//! Error types.
//!
//! Buffer operations never return errors: they set a sticky flag which the
//! wrappers in [`crate::descriptor`] check once after a whole
//! serialization or deserialization and turn into one of these values.

use crate::edid::Edid;
use thiserror::Error;

/// A binary payload could not be turned into a typed descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A read went past the end of the payload.
    #[error("descriptor 0x{tag:02X} truncated: {available} bytes of payload")]
    Truncated { tag: u8, available: usize },
    /// The payload was longer than the structure.
    #[error("descriptor 0x{tag:02X} has {extra} extraneous bytes")]
    TrailingData { tag: u8, extra: usize },
    /// The framing itself is invalid.
    #[error("invalid descriptor 0x{tag:02X}: {reason}")]
    Invalid { tag: u8, reason: String },
    /// A text-encoded descriptor loop is not valid base64.
    #[error("invalid base64 text: {0}")]
    InvalidBase64(String),
}

/// A typed descriptor could not be serialized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The payload does not fit in the descriptor framing.
    #[error("descriptor 0x{tag:02X} overflows its {capacity} bytes payload")]
    Overflow { tag: u8, capacity: usize },
    /// A raw payload is larger than the framing allows.
    #[error("descriptor 0x{tag:02X} payload is {size} bytes, max is 255")]
    PayloadTooLarge { tag: u8, size: usize },
}

/// Registration refused while building a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The identifier overlaps the scope of an earlier registration.
    #[error("{new} ({new_name}) conflicts with {existing} ({existing_name})")]
    Conflict {
        new: Edid,
        new_name: &'static str,
        existing: Edid,
        existing_name: &'static str,
    },
    /// The text element name is already used.
    #[error("duplicate element name '{0}'")]
    DuplicateName(&'static str),
}

/// A text element does not describe a valid structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("<{element}>: missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },
    #[error("<{element}>: invalid value '{value}' for attribute '{attribute}'")]
    InvalidValue {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("<{element}>: '{attribute}' must be in range {min} to {max}, got {value}")]
    OutOfRange {
        element: String,
        attribute: String,
        value: String,
        min: u64,
        max: u64,
    },
    #[error("<{element}>: '{attribute}' length must be in range {min} to {max}, got {length}")]
    InvalidLength {
        element: String,
        attribute: String,
        length: usize,
        min: usize,
        max: usize,
    },
    #[error("<{element}>: expected {min} to {max} <{child}> children, found {found}")]
    ChildCount {
        element: String,
        child: String,
        found: usize,
        min: usize,
        max: usize,
    },
    #[error("<{element}>: unexpected element <{found}>")]
    UnexpectedElement { element: String, found: String },
    #[error("unknown descriptor element <{0}>")]
    UnknownName(String),
    #[error("XML syntax error: {0}")]
    Syntax(String),
    /// The text form was valid but the binary form cannot hold it.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
