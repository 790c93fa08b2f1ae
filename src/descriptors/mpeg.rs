//! MPEG system descriptors.

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext};
use crate::descriptor::{Descriptor, DescriptorType};
use crate::display::TablesDisplay;
use crate::edid::Edid;
use crate::encoding::writer::BitWriter;
use crate::error::XmlError;
use crate::standards::Standards;
use crate::xml::Element;

/// STD_descriptor (ISO/IEC 13818-1), tag 0x11.
///
/// Tells whether the leak method applies to the transfer from the transport
/// buffer to the multiplexing buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StdDescriptor {
    pub leak_valid: bool,
}

impl Descriptor for StdDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.leak_valid = false;
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_reserved(7);
        buf.put_bool(self.leak_valid);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        buf.skip_bits(7);
        self.leak_valid = buf.get_bool();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_bool_attribute("leak_valid", self.leak_valid);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.leak_valid = element.get_bool_attribute("leak_valid", true, false)?;
        Ok(())
    }
}

impl DescriptorType for StdDescriptor {
    const EDID: Edid = Edid::regular(0x11, Standards::MPEG);
    const XML_NAME: &'static str = "STD_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(1) {
            buf.skip_bits(7);
            let leak = buf.get_bool();
            disp.line(
                margin,
                format_args!("Link valid flag: {} ({})", u8::from(leak), if leak { "leak" } else { "vbv_delay" }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorExt, RawDescriptor};

    #[test]
    fn test_reserved_bits_are_ones() {
        let ctx = Context::default();
        let raw = StdDescriptor { leak_valid: true }.serialize(&ctx).unwrap();
        assert_eq!(raw.to_bytes(), vec![0x11, 0x01, 0xFF]);
        let raw = StdDescriptor { leak_valid: false }.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0xFE]);
    }

    #[test]
    fn test_decode_ignores_reserved_value() {
        let ctx = Context::default();
        let mut desc = StdDescriptor::default();
        desc.deserialize(&RawDescriptor::new(0x11, vec![0x01]).unwrap(), &ctx)
            .unwrap();
        assert!(desc.leak_valid);
    }

    #[test]
    fn test_display() {
        let mut disp = TablesDisplay::default();
        let data = [0xFE];
        let mut buf = BitReader::new(&data);
        StdDescriptor::display(&mut disp, &mut buf, "  ", &DescriptorContext::new(Standards::NONE));
        assert_eq!(disp.output(), "  Link valid flag: 0 (vbv_delay)\n");
    }
}
