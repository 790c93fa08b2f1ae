//! ISDB descriptors (ARIB STD-B10).

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext, TID_CAT, TID_PMT};
use crate::descriptor::{Descriptor, DescriptorType};
use crate::display::TablesDisplay;
use crate::edid::Edid;
use crate::encoding::writer::BitWriter;
use crate::error::XmlError;
use crate::fmt::format_hex_dec;
use crate::standards::Standards;
use crate::xml::Element;

use super::ca_system_name;

/// CA_EMM_TS_descriptor, tag 0xCA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CaEmmTsDescriptor {
    pub ca_system_id: u16,
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    /// Power-on time, in minutes.
    pub power_supply_period: u8,
}

impl Descriptor for CaEmmTsDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint16(self.ca_system_id);
        buf.put_uint16(self.transport_stream_id);
        buf.put_uint16(self.original_network_id);
        buf.put_uint8(self.power_supply_period);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.ca_system_id = buf.get_uint16();
        self.transport_stream_id = buf.get_uint16();
        self.original_network_id = buf.get_uint16();
        self.power_supply_period = buf.get_uint8();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("CA_system_id", self.ca_system_id, true);
        root.set_int_attribute("transport_stream_id", self.transport_stream_id, true);
        root.set_int_attribute("original_network_id", self.original_network_id, true);
        root.set_int_attribute("power_supply_period", self.power_supply_period, false);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.ca_system_id = element.get_full_int_attribute("CA_system_id", true)?;
        self.transport_stream_id = element.get_full_int_attribute("transport_stream_id", true)?;
        self.original_network_id = element.get_full_int_attribute("original_network_id", true)?;
        self.power_supply_period = element.get_full_int_attribute("power_supply_period", true)?;
        Ok(())
    }
}

impl DescriptorType for CaEmmTsDescriptor {
    const EDID: Edid = Edid::regular(0xCA, Standards::ISDB);
    const XML_NAME: &'static str = "CA_EMM_TS_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(7) {
            let ca_system_id = buf.get_uint16();
            disp.line(
                margin,
                format_args!("CA System Id: 0x{ca_system_id:04X} ({})", ca_system_name(ca_system_id)),
            );
            let tsid = buf.get_uint16();
            disp.line(margin, format_args!("Transport stream id: {}", format_hex_dec(tsid.into(), 4)));
            let onid = buf.get_uint16();
            disp.line(margin, format_args!("Original network id: {}", format_hex_dec(onid.into(), 4)));
            disp.line(margin, format_args!("Power-on time: {} minutes", buf.get_uint8()));
        }
    }
}

/// ISDB access_control_descriptor, tag 0xF6.
///
/// The PID is an ECM PID in a PMT and an EMM PID in a CAT.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IsdbAccessControlDescriptor {
    pub ca_system_id: u16,
    /// 3 bits, 7 when unused.
    pub transmission_type: u8,
    pub pid: u16,
    pub private_data: Vec<u8>,
}

impl Default for IsdbAccessControlDescriptor {
    fn default() -> Self {
        IsdbAccessControlDescriptor {
            ca_system_id: 0,
            transmission_type: 7,
            pid: 0x1FFF,
            private_data: Vec::new(),
        }
    }
}

fn transmission_type_name(value: u8) -> &'static str {
    match value {
        0 => "broadcast route and communication route",
        1 => "broadcast route only",
        2 => "communication route only",
        7 => "unspecified",
        _ => "reserved",
    }
}

impl Descriptor for IsdbAccessControlDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint16(self.ca_system_id);
        buf.put_bits(self.transmission_type.into(), 3);
        buf.put_pid(self.pid);
        buf.put_bytes(&self.private_data);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.ca_system_id = buf.get_uint16();
        self.transmission_type = buf.read_bits(3) as u8;
        self.pid = buf.get_pid();
        self.private_data = buf.get_remaining_bytes();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("CA_system_id", self.ca_system_id, true);
        root.set_int_attribute("transmission_type", self.transmission_type, false);
        root.set_int_attribute("PID", self.pid, true);
        root.add_hexa_text_child("private_data", &self.private_data, true);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.ca_system_id = element.get_full_int_attribute("CA_system_id", true)?;
        self.transmission_type = element.get_int_attribute("transmission_type", false, 7, 0, 7)?;
        self.pid = element.get_int_attribute("PID", true, 0, 0, 0x1FFF)?;
        self.private_data = element.get_hexa_text_child("private_data", false, 0, 255 - 4)?;
        Ok(())
    }
}

impl DescriptorType for IsdbAccessControlDescriptor {
    const EDID: Edid = Edid::regular(0xF6, Standards::ISDB);
    const XML_NAME: &'static str = "ISDB_access_control_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, context: &DescriptorContext) {
        if buf.can_read_bytes(4) {
            let kind = match context.table_id {
                Some(TID_CAT) => "EMM",
                Some(TID_PMT) => "ECM",
                _ => "CA",
            };
            let ca_system_id = buf.get_uint16();
            disp.line(
                margin,
                format_args!("CA System Id: 0x{ca_system_id:04X} ({})", ca_system_name(ca_system_id)),
            );
            let transmission_type = buf.read_bits(3) as u8;
            disp.line(
                margin,
                format_args!(
                    "Transmission type: {transmission_type} ({})",
                    transmission_type_name(transmission_type)
                ),
            );
            let pid = buf.get_pid();
            disp.line(margin, format_args!("{kind} PID: {}", format_hex_dec(pid.into(), 4)));
            disp.display_private_data("Private CA data", buf, usize::MAX, margin);
        }
    }
}

/// audio_component_descriptor, tag 0xC4.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AudioComponentDescriptor {
    /// 4 bits, 0x02 for audio.
    pub stream_content: u8,
    pub component_type: u8,
    pub component_tag: u8,
    pub stream_type: u8,
    /// 0xFF when the component is not part of a simulcast group.
    pub simulcast_group_tag: u8,
    pub main_component: bool,
    /// 2 bits.
    pub quality_indicator: u8,
    /// 3 bits.
    pub sampling_rate: u8,
    pub iso_639_language_code: String,
    /// Second language of a dual mono component.
    pub iso_639_language_code_2: Option<String>,
    pub text: String,
}

impl Default for AudioComponentDescriptor {
    fn default() -> Self {
        AudioComponentDescriptor {
            stream_content: 0x02,
            component_type: 0,
            component_tag: 0,
            stream_type: 0,
            simulcast_group_tag: 0xFF,
            main_component: true,
            quality_indicator: 0,
            sampling_rate: 0,
            iso_639_language_code: String::new(),
            iso_639_language_code_2: None,
            text: String::new(),
        }
    }
}

fn audio_component_type_name(component_type: u8) -> &'static str {
    match component_type {
        0x01 => "1/0 mode (single mono)",
        0x02 => "1/0 + 1/0 mode (dual mono)",
        0x03 => "2/0 mode (stereo)",
        0x04 => "2/1 mode",
        0x05 => "3/0 mode",
        0x06 => "2/2 mode",
        0x07 => "3/1 mode",
        0x08 => "3/2 mode",
        0x09 => "3/2 + LFE mode (3/2.1 mode)",
        0x40 => "Commentary for visually impaired",
        0x41 => "Audio for the hard of hearing",
        _ => "unknown",
    }
}

fn audio_stream_type_name(stream_type: u8) -> &'static str {
    match stream_type {
        0x03 => "MPEG-1 Audio",
        0x04 => "MPEG-2 Audio",
        0x0F => "MPEG-2 AAC Audio",
        0x11 => "MPEG-4 Audio",
        _ => "unknown",
    }
}

fn quality_indicator_name(quality: u8) -> &'static str {
    match quality {
        1 => "Mode 1",
        2 => "Mode 2",
        3 => "Mode 3",
        _ => "reserved",
    }
}

fn sampling_rate_name(rate: u8) -> &'static str {
    match rate {
        1 => "16 kHz",
        2 => "22.05 kHz",
        3 => "24 kHz",
        5 => "32 kHz",
        6 => "44.1 kHz",
        7 => "48 kHz",
        _ => "reserved",
    }
}

impl Descriptor for AudioComponentDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, context: &Context) {
        buf.put_reserved(4);
        buf.put_bits(self.stream_content.into(), 4);
        buf.put_uint8(self.component_type);
        buf.put_uint8(self.component_tag);
        buf.put_uint8(self.stream_type);
        buf.put_uint8(self.simulcast_group_tag);
        buf.put_bool(self.iso_639_language_code_2.is_some());
        buf.put_bool(self.main_component);
        buf.put_bits(self.quality_indicator.into(), 2);
        buf.put_bits(self.sampling_rate.into(), 3);
        buf.put_reserved(1);
        buf.put_language_code(&self.iso_639_language_code);
        if let Some(code) = &self.iso_639_language_code_2 {
            buf.put_language_code(code);
        }
        buf.put_string(context.charset(), &self.text);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, context: &Context) {
        buf.skip_bits(4);
        self.stream_content = buf.read_bits(4) as u8;
        self.component_type = buf.get_uint8();
        self.component_tag = buf.get_uint8();
        self.stream_type = buf.get_uint8();
        self.simulcast_group_tag = buf.get_uint8();
        let multilingual = buf.get_bool();
        self.main_component = buf.get_bool();
        self.quality_indicator = buf.read_bits(2) as u8;
        self.sampling_rate = buf.read_bits(3) as u8;
        buf.skip_bits(1);
        self.iso_639_language_code = buf.get_language_code();
        if multilingual {
            self.iso_639_language_code_2 = Some(buf.get_language_code());
        }
        self.text = buf.get_string(context.charset());
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("stream_content", self.stream_content, true);
        root.set_int_attribute("component_type", self.component_type, true);
        root.set_int_attribute("component_tag", self.component_tag, true);
        root.set_int_attribute("stream_type", self.stream_type, true);
        if self.simulcast_group_tag != 0xFF {
            root.set_int_attribute("simulcast_group_tag", self.simulcast_group_tag, true);
        }
        root.set_bool_attribute("main_component", self.main_component);
        root.set_int_attribute("quality_indicator", self.quality_indicator, false);
        root.set_int_attribute("sampling_rate", self.sampling_rate, false);
        root.set_attribute("ISO_639_language_code", self.iso_639_language_code.as_str());
        if let Some(code) = &self.iso_639_language_code_2 {
            root.set_attribute("ISO_639_language_code_2", code.as_str());
        }
        if !self.text.is_empty() {
            root.set_attribute("text", self.text.as_str());
        }
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.stream_content = element.get_int_attribute("stream_content", false, 0x02, 0, 0x0F)?;
        self.component_type = element.get_full_int_attribute("component_type", true)?;
        self.component_tag = element.get_full_int_attribute("component_tag", true)?;
        self.stream_type = element.get_full_int_attribute("stream_type", true)?;
        self.simulcast_group_tag = element.get_int_attribute("simulcast_group_tag", false, 0xFF, 0, 0xFF)?;
        self.main_component = element.get_bool_attribute("main_component", false, true)?;
        self.quality_indicator = element.get_int_attribute("quality_indicator", true, 0, 0, 3)?;
        self.sampling_rate = element.get_int_attribute("sampling_rate", true, 0, 0, 7)?;
        self.iso_639_language_code = element.get_attribute("ISO_639_language_code", true, "", 3, 3)?;
        self.iso_639_language_code_2 = if element.has_attribute("ISO_639_language_code_2") {
            Some(element.get_attribute("ISO_639_language_code_2", true, "", 3, 3)?)
        } else {
            None
        };
        self.text = element.get_attribute("text", false, "", 0, 255 - 9)?;
        Ok(())
    }
}

impl DescriptorType for AudioComponentDescriptor {
    const EDID: Edid = Edid::regular(0xC4, Standards::ISDB);
    const XML_NAME: &'static str = "audio_component_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if !buf.can_read_bytes(9) {
            return;
        }
        buf.skip_bits(4);
        let content = buf.read_bits(4);
        disp.line(margin, format_args!("Content type: {}", format_hex_dec(content, 1)));
        let component_type = buf.get_uint8();
        disp.line(
            margin,
            format_args!(
                "Component type: 0x{component_type:02X} ({})",
                audio_component_type_name(component_type)
            ),
        );
        let tag = buf.get_uint8();
        disp.line(margin, format_args!("Component tag: {}", format_hex_dec(tag.into(), 2)));
        let stream_type = buf.get_uint8();
        disp.line(
            margin,
            format_args!("Stream type: 0x{stream_type:02X} ({})", audio_stream_type_name(stream_type)),
        );
        let group = buf.get_uint8();
        let none = if group == 0xFF { ", none" } else { "" };
        disp.line(margin, format_args!("Simulcast group: 0x{group:02X} ({group}{none})"));
        let multilingual = buf.get_bool();
        disp.line(margin, format_args!("Main component: {}", buf.get_bool()));
        let quality = buf.read_bits(2) as u8;
        disp.line(
            margin,
            format_args!("Quality indicator: {quality} ({})", quality_indicator_name(quality)),
        );
        let rate = buf.read_bits(3) as u8;
        disp.line(margin, format_args!("Sampling rate: {rate} ({})", sampling_rate_name(rate)));
        buf.skip_bits(1);
        disp.line(margin, format_args!("Language code: \"{}\"", buf.get_language_code()));
        if multilingual && buf.can_read_bytes(3) {
            disp.line(margin, format_args!("Language code 2: \"{}\"", buf.get_language_code()));
        }
        let text = buf.get_string(disp.context().charset());
        disp.line(margin, format_args!("Text: \"{text}\""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorExt, RawDescriptor};

    fn isdb() -> Context {
        Context::new(Standards::ISDB)
    }

    #[test]
    fn test_ca_emm_ts() {
        let ctx = isdb();
        let desc = CaEmmTsDescriptor {
            ca_system_id: 0x0005,
            transport_stream_id: 0x7FE0,
            original_network_id: 0x0004,
            power_supply_period: 10,
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x00, 0x05, 0x7F, 0xE0, 0x00, 0x04, 0x0A]);

        let element = desc.to_xml(&ctx);
        assert_eq!(element.attribute("power_supply_period"), Some("10"));
        assert_eq!(CaEmmTsDescriptor::from_xml(&element, &ctx).unwrap(), desc);
    }

    #[test]
    fn test_access_control_pid_packing() {
        let ctx = isdb();
        let desc = IsdbAccessControlDescriptor {
            ca_system_id: 0x0005,
            transmission_type: 1,
            pid: 0x0123,
            private_data: vec![0xAB],
        };
        let raw = desc.serialize(&ctx).unwrap();
        // 001 + 0000100100011
        assert_eq!(raw.payload(), &[0x00, 0x05, 0x21, 0x23, 0xAB]);

        let mut decoded = IsdbAccessControlDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, desc);
    }

    #[test]
    fn test_access_control_xml_defaults() {
        let ctx = isdb();
        let element = Element::parse_xml(
            r#"<ISDB_access_control_descriptor CA_system_id="0x0005" PID="0x0100"/>"#,
        )
        .unwrap();
        let desc = IsdbAccessControlDescriptor::from_xml(&element, &ctx).unwrap();
        assert_eq!(desc.transmission_type, 7);
        assert_eq!(desc.pid, 0x0100);
        assert!(desc.private_data.is_empty());

        let mut bad = element.clone();
        bad.set_attribute("PID", "0x2000");
        assert!(matches!(
            IsdbAccessControlDescriptor::from_xml(&bad, &ctx),
            Err(XmlError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_access_control_load_clears_content_on_error() {
        let ctx = isdb();
        let mut desc = IsdbAccessControlDescriptor {
            ca_system_id: 0x0005,
            transmission_type: 1,
            pid: 0x0123,
            private_data: vec![],
        };
        let element = Element::parse_xml(r#"<ISDB_access_control_descriptor PID="0x0100"/>"#).unwrap();
        assert!(desc.load_xml(&element, &ctx).is_err());
        assert_eq!(desc, IsdbAccessControlDescriptor::default());
    }

    #[test]
    fn test_access_control_display_depends_on_table() {
        let data = [0x00, 0x05, 0xE1, 0x00];
        let render = |lookup: DescriptorContext| {
            let mut disp = TablesDisplay::default();
            let mut buf = BitReader::new(&data);
            IsdbAccessControlDescriptor::display(&mut disp, &mut buf, "", &lookup);
            disp.into_output()
        };
        let base = DescriptorContext::new(Standards::ISDB);
        assert!(render(base.with_table_id(TID_PMT)).contains("ECM PID: 0x0100 (256)"));
        assert!(render(base.with_table_id(TID_CAT)).contains("EMM PID: 0x0100 (256)"));
        assert!(render(base).contains("CA PID: 0x0100 (256)"));
        assert!(render(base).contains("Transmission type: 7 (unspecified)"));
    }

    #[test]
    fn test_truncated_is_rejected() {
        let ctx = isdb();
        let mut decoded = CaEmmTsDescriptor::default();
        let raw = RawDescriptor::new(0xCA, vec![0x00, 0x05, 0x7F]).unwrap();
        assert!(decoded.deserialize(&raw, &ctx).is_err());
    }

    fn stereo_with_two_languages() -> AudioComponentDescriptor {
        AudioComponentDescriptor {
            component_type: 0x03,
            component_tag: 0x10,
            stream_type: 0x0F,
            quality_indicator: 1,
            sampling_rate: 7,
            iso_639_language_code: "jpn".to_string(),
            iso_639_language_code_2: Some("eng".to_string()),
            text: "AB".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_audio_component() {
        let ctx = isdb();
        let desc = stereo_with_two_languages();
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(
            raw.payload(),
            &[0xF2, 0x03, 0x10, 0x0F, 0xFF, 0xDF, b'j', b'p', b'n', b'e', b'n', b'g', b'A', b'B']
        );

        let mut decoded = AudioComponentDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, desc);

        // Without a second language, the flag is cleared and the code is gone.
        let single = AudioComponentDescriptor {
            iso_639_language_code_2: None,
            text: String::new(),
            ..desc.clone()
        };
        let raw = single.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0xF2, 0x03, 0x10, 0x0F, 0xFF, 0x5F, b'j', b'p', b'n']);
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, single);
    }

    #[test]
    fn test_audio_component_xml() {
        let ctx = isdb();
        let desc = stereo_with_two_languages();
        let element = desc.to_xml(&ctx);
        assert!(element.attribute("simulcast_group_tag").is_none());
        assert_eq!(element.attribute("ISO_639_language_code_2"), Some("eng"));
        assert_eq!(AudioComponentDescriptor::from_xml(&element, &ctx).unwrap(), desc);

        let minimal = Element::parse_xml(
            r#"<audio_component_descriptor component_type="0x01" component_tag="0x10"
                 stream_type="0x0F" quality_indicator="3" sampling_rate="5"
                 ISO_639_language_code="jpn"/>"#,
        )
        .unwrap();
        let decoded = AudioComponentDescriptor::from_xml(&minimal, &ctx).unwrap();
        assert_eq!(decoded.stream_content, 0x02);
        assert_eq!(decoded.simulcast_group_tag, 0xFF);
        assert!(decoded.main_component);
        assert_eq!(decoded.iso_639_language_code_2, None);
    }

    #[test]
    fn test_audio_component_display() {
        let ctx = isdb();
        let raw = stereo_with_two_languages().serialize(&ctx).unwrap();
        let mut disp = TablesDisplay::new(ctx);
        let mut buf = BitReader::new(raw.payload());
        AudioComponentDescriptor::display(&mut disp, &mut buf, "", &DescriptorContext::new(Standards::ISDB));
        assert_eq!(
            disp.output(),
            "Content type: 0x2 (2)\n\
             Component type: 0x03 (2/0 mode (stereo))\n\
             Component tag: 0x10 (16)\n\
             Stream type: 0x0F (MPEG-2 AAC Audio)\n\
             Simulcast group: 0xFF (255, none)\n\
             Main component: true\n\
             Quality indicator: 1 (Mode 1)\n\
             Sampling rate: 7 (48 kHz)\n\
             Language code: \"jpn\"\n\
             Language code 2: \"eng\"\n\
             Text: \"AB\"\n"
        );
        assert!(buf.end_of_read());
    }
}
