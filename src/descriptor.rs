//! The descriptor contract.
//!
//! Every concrete descriptor implements [`Descriptor`] (the object-safe part,
//! usable through `Box<dyn Descriptor>`) and [`DescriptorType`] (its static
//! identity and diagnostic display, used at registration). The framing rules
//! shared by all descriptors live in [`DescriptorExt`], so a concrete type only
//! deals with its payload.

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext};
use crate::display::TablesDisplay;
use crate::edid::Edid;
use crate::encoding::writer::{BitWriter, MAX_DESCRIPTOR_PAYLOAD};
use crate::error::{DecodeError, EncodeError, XmlError};
use crate::standards::Standards;
use crate::xml::Element;
use std::any::Any;
use std::fmt::Debug;

/// Text element name of descriptors with no registered type.
pub const GENERIC_DESCRIPTOR_NAME: &str = "generic_descriptor";

/// Tag and payload of one descriptor, as found on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawDescriptor {
    tag: u8,
    payload: Vec<u8>,
}

impl RawDescriptor {
    /// Builds a raw descriptor, refusing payloads the 8-bit length cannot hold.
    pub fn new(tag: u8, payload: Vec<u8>) -> Result<Self, EncodeError> {
        if payload.len() > MAX_DESCRIPTOR_PAYLOAD {
            return Err(EncodeError::PayloadTooLarge {
                tag,
                size: payload.len(),
            });
        }
        Ok(RawDescriptor { tag, payload })
    }

    /// Reads one descriptor from the start of `data`.
    ///
    /// Returns the descriptor and the number of bytes it used.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        match data {
            [] => Err(DecodeError::Invalid {
                tag: 0,
                reason: "empty input".to_string(),
            }),
            [tag] => Err(DecodeError::Truncated {
                tag: *tag,
                available: 0,
            }),
            [tag, length, rest @ ..] => {
                let length = *length as usize;
                if rest.len() < length {
                    return Err(DecodeError::Truncated {
                        tag: *tag,
                        available: rest.len(),
                    });
                }
                let raw = RawDescriptor {
                    tag: *tag,
                    payload: rest[..length].to_vec(),
                };
                Ok((raw, length + 2))
            }
        }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total size on the wire, including tag and length.
    pub fn size(&self) -> usize {
        self.payload.len() + 2
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        bytes.push(self.tag);
        bytes.push(self.payload.len() as u8);
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

/// Object-safe operations of a descriptor type.
///
/// The payload methods work on a shared sticky-error buffer and never return
/// errors themselves. They must not depend on values left from a previous
/// use of the instance: `deserialize_payload` and `analyze_xml` are always
/// preceded by `clear_content`.
pub trait Descriptor: Debug + Send + Sync {
    fn edid(&self) -> Edid;

    /// Element name of the text form.
    fn xml_name(&self) -> &'static str;

    /// Resets every field to its default value.
    fn clear_content(&mut self);

    /// Writes the payload, without tag and length.
    fn serialize_payload(&self, buf: &mut BitWriter, context: &Context);

    /// Reads the payload. Any failure is reported through the buffer's error
    /// flag.
    fn deserialize_payload(&mut self, buf: &mut BitReader, context: &Context);

    /// Fills the attributes and children of `root`, an element already named
    /// after [`xml_name`](Self::xml_name).
    fn build_xml(&self, root: &mut Element, context: &Context);

    /// Loads the content from its text form.
    fn analyze_xml(&mut self, element: &Element, context: &Context) -> Result<(), XmlError>;

    fn as_any(&self) -> &dyn Any;
}

/// Static identity of a registrable descriptor type.
pub trait DescriptorType: Descriptor + Default + 'static {
    const EDID: Edid;
    const XML_NAME: &'static str;

    /// Renders a payload for diagnostics without building an instance.
    ///
    /// Reads as much as it can and stops silently on the first short field;
    /// the caller dumps whatever was left unread.
    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, context: &DescriptorContext);

    /// Builds a new instance from its text form.
    fn from_xml(element: &Element, context: &Context) -> Result<Self, XmlError> {
        if element.name() != Self::XML_NAME {
            return Err(XmlError::UnexpectedElement {
                element: Self::XML_NAME.to_string(),
                found: element.name().to_string(),
            });
        }
        let mut descriptor = Self::default();
        descriptor.load_xml(element, context)?;
        Ok(descriptor)
    }
}

/// Framing wrappers shared by every descriptor.
pub trait DescriptorExt: Descriptor {
    /// Serializes into a raw descriptor.
    fn serialize(&self, context: &Context) -> Result<RawDescriptor, EncodeError> {
        let tag = self.edid().tag();
        let mut buf = BitWriter::new(MAX_DESCRIPTOR_PAYLOAD);
        self.serialize_payload(&mut buf, context);
        if buf.error() {
            return Err(EncodeError::Overflow {
                tag,
                capacity: MAX_DESCRIPTOR_PAYLOAD,
            });
        }
        RawDescriptor::new(tag, buf.finish())
    }

    /// Deserializes from a raw descriptor.
    ///
    /// The whole payload must be consumed. On failure the instance is left
    /// cleared.
    fn deserialize(&mut self, raw: &RawDescriptor, context: &Context) -> Result<(), DecodeError> {
        let tag = raw.tag();
        self.clear_content();
        if tag != self.edid().tag() {
            return Err(DecodeError::Invalid {
                tag,
                reason: format!("expected tag 0x{:02X}", self.edid().tag()),
            });
        }

        let mut buf = BitReader::new(raw.payload());
        self.deserialize_payload(&mut buf, context);

        let result = if buf.user_error() {
            Err(DecodeError::Invalid {
                tag,
                reason: format!("invalid {} content", self.xml_name()),
            })
        } else if buf.error() {
            Err(DecodeError::Truncated {
                tag,
                available: raw.payload().len(),
            })
        } else if !buf.end_of_read() {
            Err(DecodeError::TrailingData {
                tag,
                extra: buf.remaining_bytes().max(1),
            })
        } else {
            Ok(())
        };
        if result.is_err() {
            log::debug!("{} deserialization failed: {result:?}", self.xml_name());
            self.clear_content();
        }
        result
    }

    /// Replaces the content from a text form.
    ///
    /// An element with another name is refused before anything changes. Any
    /// later failure leaves the instance cleared.
    fn load_xml(&mut self, element: &Element, context: &Context) -> Result<(), XmlError> {
        if element.name() != self.xml_name() {
            return Err(XmlError::UnexpectedElement {
                element: self.xml_name().to_string(),
                found: element.name().to_string(),
            });
        }
        self.clear_content();
        let result = self.analyze_xml(element, context);
        if let Err(e) = &result {
            log::debug!("{} text decoding failed: {e}", self.xml_name());
            self.clear_content();
        }
        result
    }

    /// Builds the complete text form.
    fn to_xml(&self, context: &Context) -> Element {
        let mut root = Element::new(self.xml_name());
        self.build_xml(&mut root, context);
        root
    }
}

impl<T: Descriptor + ?Sized> DescriptorExt for T {}

impl dyn Descriptor {
    pub fn downcast_ref<T: Descriptor + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Opaque fallback for a tag with no matching registration.
///
/// Keeps the payload as-is so the descriptor survives a round trip through
/// either form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnknownDescriptor {
    pub tag: u8,
    pub payload: Vec<u8>,
}

impl UnknownDescriptor {
    pub fn new(tag: u8) -> Self {
        UnknownDescriptor {
            tag,
            payload: Vec::new(),
        }
    }

    /// Builds the fallback from its `<generic_descriptor>` text form.
    pub fn from_xml(element: &Element) -> Result<Self, XmlError> {
        let mut descriptor = UnknownDescriptor::default();
        descriptor.load_xml(element, &Context::default())?;
        Ok(descriptor)
    }
}

impl From<&RawDescriptor> for UnknownDescriptor {
    fn from(raw: &RawDescriptor) -> Self {
        UnknownDescriptor {
            tag: raw.tag(),
            payload: raw.payload().to_vec(),
        }
    }
}

impl Descriptor for UnknownDescriptor {
    fn edid(&self) -> Edid {
        Edid::regular(self.tag, Standards::NONE)
    }

    fn xml_name(&self) -> &'static str {
        GENERIC_DESCRIPTOR_NAME
    }

    // The tag is the identity of the fallback, only the payload is content.
    fn clear_content(&mut self) {
        self.payload.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_bytes(&self.payload);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.payload = buf.get_remaining_bytes();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("tag", self.tag, true);
        root.set_hexa_text(&self.payload);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.tag = element.get_int_attribute("tag", true, 0, 0, 0xFF)?;
        self.payload = element.get_hexa_text(0, MAX_DESCRIPTOR_PAYLOAD)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
