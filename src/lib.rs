//! # tsdesc
//!
//! Self-describing codec framework for MPEG transport stream descriptors.
//!
//! Every descriptor type knows how to clear itself, serialize and deserialize
//! its binary payload, and convert to and from a lossless XML form. Types are
//! found through a [`Registry`] keyed by an extended identifier ([`Edid`])
//! which qualifies the raw 8-bit tag with the standards, private data
//! specifier or table it is valid in.
//!
//! ## Quick start
//!
//! ```rust
//! use tsdesc::{Context, Descriptor, DescriptorExt, DescriptorList, Standards, registry};
//!
//! let ctx = Context::new(Standards::DVB);
//! let list = DescriptorList::parse(&[0x70, 0x01, 0x05], None);
//!
//! let descriptor = list.decode(0, registry::global(), &ctx).unwrap().unwrap();
//! assert_eq!(descriptor.xml_name(), "adaptation_field_data_descriptor");
//!
//! let xml = descriptor.to_xml(&ctx).to_xml_string().unwrap();
//! assert!(xml.contains(r#"adaptation_field_data_identifier="0x05""#));
//! ```
//!
//! ## Features
//!
//! - `serde` (default): `Serialize` on the text mirror and the built-in types
//! - `base64`: base64 input and output for descriptor lists
//! - `cli`: the `tsdesc` command line tool

pub mod bit_reader;
pub mod context;
pub mod descriptor;
pub mod descriptor_list;
pub mod descriptors;
pub mod display;
pub mod edid;
pub mod encoding;
pub mod error;
pub mod fmt;
pub mod registry;
pub mod registry_defaults;
pub mod standards;
pub mod xml;

pub use bit_reader::BitReader;
pub use context::{Charset, Context, DescriptorContext, Pds, TableId};
pub use descriptor::{Descriptor, DescriptorExt, DescriptorType, RawDescriptor, UnknownDescriptor};
pub use descriptor_list::DescriptorList;
pub use display::TablesDisplay;
pub use edid::{Edid, EdidKind};
pub use encoding::BitWriter;
pub use error::{DecodeError, EncodeError, RegistrationError, XmlError};
pub use registry::{Registration, Registry};
pub use standards::Standards;
pub use xml::Element;
