//! SCTE 35 splice descriptors.
//!
//! Splice descriptors reuse low tag values (0x00 to 0x04) which mean
//! something else in MPEG tables, so they are only valid inside a splice
//! information table.

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext, TID_SCTE35_SIT};
use crate::descriptor::{Descriptor, DescriptorType};
use crate::display::TablesDisplay;
use crate::edid::Edid;
use crate::encoding::writer::BitWriter;
use crate::error::XmlError;
use crate::fmt::four_cc;
use crate::standards::Standards;
use crate::xml::Element;

/// ASCII "CUEI", the identifier of all SCTE 35 splice descriptors.
pub const SPLICE_ID_CUEI: u32 = 0x4355_4549;

/// splice_avail_descriptor, tag 0x00 inside a splice information table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpliceAvailDescriptor {
    pub identifier: u32,
    pub provider_avail_id: u32,
}

impl Default for SpliceAvailDescriptor {
    fn default() -> Self {
        SpliceAvailDescriptor {
            identifier: SPLICE_ID_CUEI,
            provider_avail_id: 0,
        }
    }
}

impl Descriptor for SpliceAvailDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint32(self.identifier);
        buf.put_uint32(self.provider_avail_id);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.identifier = buf.get_uint32();
        self.provider_avail_id = buf.get_uint32();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("identifier", self.identifier, true);
        root.set_int_attribute("provider_avail_id", self.provider_avail_id, true);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.identifier =
            element.get_int_attribute("identifier", false, SPLICE_ID_CUEI, 0, u32::MAX)?;
        self.provider_avail_id = element.get_full_int_attribute("provider_avail_id", true)?;
        Ok(())
    }
}

impl DescriptorType for SpliceAvailDescriptor {
    const EDID: Edid = Edid::table_specific(0x00, Standards::SCTE, TID_SCTE35_SIT);
    const XML_NAME: &'static str = "splice_avail_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(8) {
            let identifier = buf.get_uint32();
            match four_cc(identifier) {
                Some(text) => disp.line(margin, format_args!("Identifier: 0x{identifier:08X} ({text})")),
                None => disp.line(margin, format_args!("Identifier: 0x{identifier:08X}")),
            }
            disp.line(margin, format_args!("Provider id: 0x{:08X}", buf.get_uint32()));
        }
    }
}
