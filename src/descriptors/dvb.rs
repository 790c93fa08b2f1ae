//! DVB descriptors (ETSI EN 300 468 and related), including the private
//! logical channel descriptors that share tag 0x83.

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext, PDS_EACEM, PDS_EUTELSAT, Pds, TID_INT};
use crate::descriptor::{Descriptor, DescriptorType};
use crate::display::TablesDisplay;
use crate::edid::Edid;
use crate::encoding::writer::BitWriter;
use crate::error::XmlError;
use crate::fmt::format_hex_dec;
use crate::standards::Standards;
use crate::xml::{Element, parse_int};

use super::ca_system_name;

/// network_name_descriptor, tag 0x40.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkNameDescriptor {
    pub name: String,
}

impl Descriptor for NetworkNameDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.name.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, context: &Context) {
        buf.put_string(context.charset(), &self.name);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, context: &Context) {
        self.name = buf.get_string(context.charset());
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_attribute("network_name", self.name.as_str());
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.name = element.get_attribute("network_name", true, "", 0, 255)?;
        Ok(())
    }
}

impl DescriptorType for NetworkNameDescriptor {
    const EDID: Edid = Edid::regular(0x40, Standards::DVB);
    const XML_NAME: &'static str = "network_name_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        let name = buf.get_string(disp.context().charset());
        disp.line(margin, format_args!("Name: \"{name}\""));
    }
}

/// One service of a [`ServiceListDescriptor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ServiceListEntry {
    pub service_id: u16,
    pub service_type: u8,
}

/// service_list_descriptor, tag 0x41.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ServiceListDescriptor {
    pub entries: Vec<ServiceListEntry>,
}

impl ServiceListDescriptor {
    /// Number of 3-byte entries that fit in a payload.
    pub const MAX_ENTRIES: usize = 85;
}

fn service_type_name(service_type: u8) -> &'static str {
    match service_type {
        0x01 => "Digital television service",
        0x02 => "Digital radio sound service",
        0x03 => "Teletext service",
        0x0C => "Data broadcast service",
        0x11 => "MPEG-2 HD digital television service",
        0x16 => "H.264/AVC SD digital television service",
        0x19 => "H.264/AVC HD digital television service",
        0x1F => "HEVC digital television service",
        _ => "unknown",
    }
}

impl Descriptor for ServiceListDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.entries.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        for entry in &self.entries {
            buf.put_uint16(entry.service_id);
            buf.put_uint8(entry.service_type);
        }
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        while buf.can_read() {
            let service_id = buf.get_uint16();
            let service_type = buf.get_uint8();
            self.entries.push(ServiceListEntry {
                service_id,
                service_type,
            });
        }
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        for entry in &self.entries {
            let e = root.add_element("service");
            e.set_int_attribute("service_id", entry.service_id, true);
            e.set_int_attribute("service_type", entry.service_type, true);
        }
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        element.check_children(&["service"])?;
        for child in element.get_children("service", 0, Self::MAX_ENTRIES)? {
            self.entries.push(ServiceListEntry {
                service_id: child.get_full_int_attribute("service_id", true)?,
                service_type: child.get_full_int_attribute("service_type", true)?,
            });
        }
        Ok(())
    }
}

impl DescriptorType for ServiceListDescriptor {
    const EDID: Edid = Edid::regular(0x41, Standards::DVB);
    const XML_NAME: &'static str = "service_list_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        while buf.can_read_bytes(3) {
            let service_id = buf.get_uint16();
            let service_type = buf.get_uint8();
            disp.line(
                margin,
                format_args!(
                    "Service id: {}, Type: {} ({})",
                    format_hex_dec(service_id.into(), 4),
                    format_hex_dec(service_type.into(), 2),
                    service_type_name(service_type)
                ),
            );
        }
    }
}

/// private_data_specifier_descriptor, tag 0x5F.
///
/// Sets the specifier used to interpret the private descriptors that follow
/// it in the same list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PrivateDataSpecifierDescriptor {
    pub pds: Pds,
}

fn pds_name(pds: Pds) -> &'static str {
    match pds {
        0x0000_0001 => "SES",
        0x0000_0002 => "BskyB",
        PDS_EACEM => "EACEM / EICTA",
        0x0000_0029 => "Nordig",
        0x0000_0040 => "CI+",
        PDS_EUTELSAT => "Eutelsat",
        0x0000_233A => "DTG / Ofcom",
        _ => "unknown",
    }
}

impl Descriptor for PrivateDataSpecifierDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.pds = 0;
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint32(self.pds);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.pds = buf.get_uint32();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("private_data_specifier", self.pds, true);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.pds = element.get_full_int_attribute("private_data_specifier", true)?;
        Ok(())
    }
}

impl DescriptorType for PrivateDataSpecifierDescriptor {
    const EDID: Edid = Edid::regular(0x5F, Standards::DVB);
    const XML_NAME: &'static str = "private_data_specifier_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(4) {
            let pds = buf.get_uint32();
            disp.line(margin, format_args!("Specifier: 0x{pds:08X} ({})", pds_name(pds)));
        }
    }
}

/// adaptation_field_data_descriptor, tag 0x70.
///
/// A bitmask of the data fields carried in the adaptation field of the
/// component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AdaptationFieldDataDescriptor {
    pub adaptation_field_data_identifier: u8,
}

const ADAPTATION_FIELD_DATA_NAMES: [&str; 8] = [
    "announcement switching data field",
    "AU_information data field",
    "PVR_assist_information data field",
    "tsap_timeline",
    "reserved",
    "reserved",
    "reserved",
    "reserved",
];

impl Descriptor for AdaptationFieldDataDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.adaptation_field_data_identifier = 0;
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint8(self.adaptation_field_data_identifier);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.adaptation_field_data_identifier = buf.get_uint8();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute(
            "adaptation_field_data_identifier",
            self.adaptation_field_data_identifier,
            true,
        );
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.adaptation_field_data_identifier =
            element.get_full_int_attribute("adaptation_field_data_identifier", true)?;
        Ok(())
    }
}

impl DescriptorType for AdaptationFieldDataDescriptor {
    const EDID: Edid = Edid::regular(0x70, Standards::DVB);
    const XML_NAME: &'static str = "adaptation_field_data_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(1) {
            let id = buf.get_uint8();
            disp.line(margin, format_args!("Adaptation field data identifier: 0x{id:02X}"));
            for (bit, name) in ADAPTATION_FIELD_DATA_NAMES.iter().enumerate() {
                if id & (1 << bit) != 0 {
                    disp.line(margin, format_args!("  0x{:02X} = {name}", 1u8 << bit));
                }
            }
        }
    }
}

/// ECM_repetition_rate_descriptor, tag 0x78.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EcmRepetitionRateDescriptor {
    pub ca_system_id: u16,
    /// In milliseconds.
    pub ecm_repetition_rate: u16,
    pub private_data: Vec<u8>,
}

impl Descriptor for EcmRepetitionRateDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.ca_system_id = 0;
        self.ecm_repetition_rate = 0;
        self.private_data.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint16(self.ca_system_id);
        buf.put_uint16(self.ecm_repetition_rate);
        buf.put_bytes(&self.private_data);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.ca_system_id = buf.get_uint16();
        self.ecm_repetition_rate = buf.get_uint16();
        self.private_data = buf.get_remaining_bytes();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("CA_system_id", self.ca_system_id, true);
        root.set_int_attribute("ECM_repetition_rate", self.ecm_repetition_rate, false);
        root.add_hexa_text_child("private_data", &self.private_data, true);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.ca_system_id = element.get_full_int_attribute("CA_system_id", true)?;
        self.ecm_repetition_rate = element.get_full_int_attribute("ECM_repetition_rate", true)?;
        self.private_data = element.get_hexa_text_child("private_data", false, 0, 255 - 4)?;
        Ok(())
    }
}

impl DescriptorType for EcmRepetitionRateDescriptor {
    const EDID: Edid = Edid::regular(0x78, Standards::DVB);
    const XML_NAME: &'static str = "ECM_repetition_rate_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(4) {
            let ca_system_id = buf.get_uint16();
            disp.line(
                margin,
                format_args!("CA System Id: 0x{ca_system_id:04X} ({})", ca_system_name(ca_system_id)),
            );
            disp.line(margin, format_args!("ECM repetition rate: {} ms", buf.get_uint16()));
            disp.display_private_data("Private data", buf, usize::MAX, margin);
        }
    }
}

/// One service of an [`EacemLogicalChannelNumberDescriptor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LogicalChannelNumber {
    pub service_id: u16,
    pub visible: bool,
    /// 10 bits.
    pub lcn: u16,
}

/// EACEM logical_channel_number_descriptor, private tag 0x83 under the
/// EACEM specifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EacemLogicalChannelNumberDescriptor {
    pub entries: Vec<LogicalChannelNumber>,
}

impl EacemLogicalChannelNumberDescriptor {
    pub const MAX_ENTRIES: usize = 63;
}

impl Descriptor for EacemLogicalChannelNumberDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.entries.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        for entry in &self.entries {
            buf.put_uint16(entry.service_id);
            buf.put_bool(entry.visible);
            buf.put_reserved(5);
            buf.put_bits(entry.lcn.into(), 10);
        }
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        while buf.can_read() {
            let service_id = buf.get_uint16();
            let visible = buf.get_bool();
            buf.skip_bits(5);
            let lcn = buf.read_bits(10) as u16;
            self.entries.push(LogicalChannelNumber {
                service_id,
                visible,
                lcn,
            });
        }
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        for entry in &self.entries {
            let e = root.add_element("service");
            e.set_int_attribute("service_id", entry.service_id, true);
            e.set_int_attribute("logical_channel_number", entry.lcn, false);
            e.set_bool_attribute("visible_service", entry.visible);
        }
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        element.check_children(&["service"])?;
        for child in element.get_children("service", 0, Self::MAX_ENTRIES)? {
            self.entries.push(LogicalChannelNumber {
                service_id: child.get_full_int_attribute("service_id", true)?,
                lcn: child.get_int_attribute("logical_channel_number", true, 0, 0, 0x03FF)?,
                visible: child.get_bool_attribute("visible_service", false, true)?,
            });
        }
        Ok(())
    }
}

impl DescriptorType for EacemLogicalChannelNumberDescriptor {
    const EDID: Edid = Edid::private(0x83, Standards::DVB, PDS_EACEM);
    const XML_NAME: &'static str = "eacem_logical_channel_number_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        while buf.can_read_bytes(4) {
            let service_id = buf.get_uint16();
            let visible = buf.get_bool();
            buf.skip_bits(5);
            let lcn = buf.read_bits(10);
            disp.line(
                margin,
                format_args!(
                    "Service Id: {}, Visible: {}, Channel number: {lcn}",
                    format_hex_dec(service_id.into(), 4),
                    if visible { "yes" } else { "no" }
                ),
            );
        }
    }
}

/// One service of an [`EutelsatChannelNumberDescriptor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EutelsatChannel {
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,
    /// 12 bits.
    pub ecn: u16,
}

/// eutelsat_channel_number_descriptor, private tag 0x83 under the Eutelsat
/// specifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EutelsatChannelNumberDescriptor {
    pub entries: Vec<EutelsatChannel>,
}

impl EutelsatChannelNumberDescriptor {
    pub const MAX_ENTRIES: usize = 31;
}

impl Descriptor for EutelsatChannelNumberDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.entries.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        for entry in &self.entries {
            buf.put_uint16(entry.original_network_id);
            buf.put_uint16(entry.transport_stream_id);
            buf.put_uint16(entry.service_id);
            buf.put_reserved(4);
            buf.put_bits(entry.ecn.into(), 12);
        }
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        while buf.can_read() {
            let original_network_id = buf.get_uint16();
            let transport_stream_id = buf.get_uint16();
            let service_id = buf.get_uint16();
            buf.skip_bits(4);
            let ecn = buf.read_bits(12) as u16;
            self.entries.push(EutelsatChannel {
                original_network_id,
                transport_stream_id,
                service_id,
                ecn,
            });
        }
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        for entry in &self.entries {
            let e = root.add_element("service");
            e.set_int_attribute("original_network_id", entry.original_network_id, true);
            e.set_int_attribute("transport_stream_id", entry.transport_stream_id, true);
            e.set_int_attribute("service_id", entry.service_id, true);
            e.set_int_attribute("eutelsat_channel_number", entry.ecn, false);
        }
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        element.check_children(&["service"])?;
        for child in element.get_children("service", 0, Self::MAX_ENTRIES)? {
            self.entries.push(EutelsatChannel {
                original_network_id: child.get_full_int_attribute("original_network_id", true)?,
                transport_stream_id: child.get_full_int_attribute("transport_stream_id", true)?,
                service_id: child.get_full_int_attribute("service_id", true)?,
                ecn: child.get_int_attribute("eutelsat_channel_number", true, 0, 0, 0x0FFF)?,
            });
        }
        Ok(())
    }
}

impl DescriptorType for EutelsatChannelNumberDescriptor {
    const EDID: Edid = Edid::private(0x83, Standards::DVB, PDS_EUTELSAT);
    const XML_NAME: &'static str = "eutelsat_channel_number_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        while buf.can_read_bytes(8) {
            let onid = buf.get_uint16();
            let tsid = buf.get_uint16();
            let service_id = buf.get_uint16();
            buf.skip_bits(4);
            let ecn = buf.read_bits(12);
            disp.line(
                margin,
                format_args!(
                    "Orig network Id: {}, TS Id: {}, Service Id: {}, Channel number: {ecn}",
                    format_hex_dec(onid.into(), 4),
                    format_hex_dec(tsid.into(), 4),
                    format_hex_dec(service_id.into(), 4)
                ),
            );
        }
    }
}

/// IP/MAC generic_stream_location_descriptor, tag 0x11 inside an INT.
///
/// Outside an INT, tag 0x11 is the MPEG STD_descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IpmacGenericStreamLocationDescriptor {
    pub interactive_network_id: u16,
    pub modulation_system_type: u8,
    pub modulation_system_id: u16,
    pub phy_stream_id: u16,
    pub selector_bytes: Vec<u8>,
}

const MODULATION_TYPE_NAMES: [(&str, u8); 4] =
    [("DVB-S2", 0), ("DVB-T2", 1), ("DVB-C2", 2), ("DVB-NGH", 3)];

fn modulation_type_name(value: u8) -> Option<&'static str> {
    MODULATION_TYPE_NAMES
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(name, _)| *name)
}

impl Descriptor for IpmacGenericStreamLocationDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint16(self.interactive_network_id);
        buf.put_uint8(self.modulation_system_type);
        buf.put_uint16(self.modulation_system_id);
        buf.put_uint16(self.phy_stream_id);
        buf.put_bytes(&self.selector_bytes);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        self.interactive_network_id = buf.get_uint16();
        self.modulation_system_type = buf.get_uint8();
        self.modulation_system_id = buf.get_uint16();
        self.phy_stream_id = buf.get_uint16();
        self.selector_bytes = buf.get_remaining_bytes();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        root.set_int_attribute("interactive_network_id", self.interactive_network_id, true);
        match modulation_type_name(self.modulation_system_type) {
            Some(name) => root.set_attribute("modulation_system_type", name),
            None => root.set_int_attribute("modulation_system_type", self.modulation_system_type, false),
        }
        root.set_int_attribute("modulation_system_id", self.modulation_system_id, true);
        root.set_int_attribute("PHY_stream_id", self.phy_stream_id, true);
        root.add_hexa_text_child("selector_bytes", &self.selector_bytes, true);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        self.interactive_network_id = element.get_full_int_attribute("interactive_network_id", true)?;
        let modulation = element.get_attribute("modulation_system_type", true, "", 1, 32)?;
        self.modulation_system_type = MODULATION_TYPE_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&modulation))
            .map(|(_, value)| *value)
            .or_else(|| parse_int(&modulation).and_then(|v| u8::try_from(v).ok()))
            .ok_or_else(|| XmlError::InvalidValue {
                element: element.name().to_string(),
                attribute: "modulation_system_type".to_string(),
                value: modulation.clone(),
            })?;
        self.modulation_system_id = element.get_full_int_attribute("modulation_system_id", false)?;
        self.phy_stream_id = element.get_full_int_attribute("PHY_stream_id", false)?;
        self.selector_bytes = element.get_hexa_text_child("selector_bytes", false, 0, 255 - 7)?;
        Ok(())
    }
}

impl DescriptorType for IpmacGenericStreamLocationDescriptor {
    const EDID: Edid = Edid::table_specific(0x11, Standards::DVB, TID_INT);
    const XML_NAME: &'static str = "IPMAC_generic_stream_location_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if buf.can_read_bytes(7) {
            let network_id = buf.get_uint16();
            disp.line(margin, format_args!("Interactive network id: {}", format_hex_dec(network_id.into(), 4)));
            let systype = buf.get_uint8();
            disp.line(
                margin,
                format_args!(
                    "Modulation system type: 0x{systype:X} ({})",
                    modulation_type_name(systype).unwrap_or("unknown")
                ),
            );
            let system_id = buf.get_uint16();
            disp.line(margin, format_args!("Modulation system id: {}", format_hex_dec(system_id.into(), 4)));
            let stream_id = buf.get_uint16();
            disp.line(margin, format_args!("Physical stream id: {}", format_hex_dec(stream_id.into(), 4)));
            disp.display_private_data("Selector bytes", buf, usize::MAX, margin);
        }
    }
}

/// One language of a [`SubtitlingDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubtitlingEntry {
    /// ISO-639 code, 3 characters.
    pub language_code: String,
    pub subtitling_type: u8,
    pub composition_page_id: u16,
    pub ancillary_page_id: u16,
}

/// subtitling_descriptor, tag 0x59.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubtitlingDescriptor {
    pub entries: Vec<SubtitlingEntry>,
}

impl SubtitlingDescriptor {
    pub const MAX_ENTRIES: usize = 31;
}

/// Component type names for stream_content 0x03, subtitles.
fn subtitling_type_name(subtitling_type: u8) -> &'static str {
    match subtitling_type {
        0x01 => "EBU Teletext subtitles",
        0x02 => "associated EBU Teletext",
        0x03 => "VBI data",
        0x10 => "DVB subtitles (normal) with no monitor aspect ratio criticality",
        0x11 => "DVB subtitles (normal) for display on 4:3 aspect ratio monitor",
        0x12 => "DVB subtitles (normal) for display on 16:9 aspect ratio monitor",
        0x13 => "DVB subtitles (normal) for display on 2.21:1 aspect ratio monitor",
        0x14 => "DVB subtitles (normal) for display on a high definition monitor",
        0x15 => "DVB subtitles (normal) with plano-stereoscopic disparity for display on a high definition monitor",
        0x16 => "DVB subtitles (normal) for display on an ultra high definition monitor",
        0x20 => "DVB subtitles (for the hard of hearing) with no monitor aspect ratio criticality",
        0x21 => "DVB subtitles (for the hard of hearing) for display on 4:3 aspect ratio monitor",
        0x22 => "DVB subtitles (for the hard of hearing) for display on 16:9 aspect ratio monitor",
        0x23 => "DVB subtitles (for the hard of hearing) for display on 2.21:1 aspect ratio monitor",
        0x24 => "DVB subtitles (for the hard of hearing) for display on a high definition monitor",
        0x25 => "DVB subtitles (for the hard of hearing) with plano-stereoscopic disparity for display on a high definition monitor",
        0x26 => "DVB subtitles (for the hard of hearing) for display on an ultra high definition monitor",
        0x30 => "open (in-vision) sign language interpretation for the deaf",
        0x31 => "closed sign language interpretation for the deaf",
        _ => "unknown",
    }
}

impl Descriptor for SubtitlingDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.entries.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        for entry in &self.entries {
            buf.put_language_code(&entry.language_code);
            buf.put_uint8(entry.subtitling_type);
            buf.put_uint16(entry.composition_page_id);
            buf.put_uint16(entry.ancillary_page_id);
        }
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        while buf.can_read() {
            let language_code = buf.get_language_code();
            let subtitling_type = buf.get_uint8();
            let composition_page_id = buf.get_uint16();
            let ancillary_page_id = buf.get_uint16();
            self.entries.push(SubtitlingEntry {
                language_code,
                subtitling_type,
                composition_page_id,
                ancillary_page_id,
            });
        }
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        for entry in &self.entries {
            let e = root.add_element("subtitling");
            e.set_attribute("language_code", entry.language_code.as_str());
            e.set_int_attribute("subtitling_type", entry.subtitling_type, true);
            e.set_int_attribute("composition_page_id", entry.composition_page_id, true);
            e.set_int_attribute("ancillary_page_id", entry.ancillary_page_id, true);
        }
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        element.check_children(&["subtitling"])?;
        for child in element.get_children("subtitling", 0, Self::MAX_ENTRIES)? {
            self.entries.push(SubtitlingEntry {
                language_code: child.get_attribute("language_code", true, "", 3, 3)?,
                subtitling_type: child.get_full_int_attribute("subtitling_type", true)?,
                composition_page_id: child.get_full_int_attribute("composition_page_id", true)?,
                ancillary_page_id: child.get_full_int_attribute("ancillary_page_id", true)?,
            });
        }
        Ok(())
    }
}

impl DescriptorType for SubtitlingDescriptor {
    const EDID: Edid = Edid::regular(0x59, Standards::DVB);
    const XML_NAME: &'static str = "subtitling_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        while buf.can_read_bytes(8) {
            let language = buf.get_language_code();
            let subtitling_type = buf.get_uint8();
            disp.line(
                margin,
                format_args!("Language: {language}, Type: {}", format_hex_dec(subtitling_type.into(), 2)),
            );
            disp.line(margin, format_args!("Type: {}", subtitling_type_name(subtitling_type)));
            let composition = buf.get_uint16();
            let ancillary = buf.get_uint16();
            disp.line(
                margin,
                format_args!(
                    "Composition page: {}, Ancillary page: {}",
                    format_hex_dec(composition.into(), 4),
                    format_hex_dec(ancillary.into(), 4)
                ),
            );
        }
    }
}

/// One OUI of a [`SsuDataBroadcastIdDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SsuOui {
    /// IEEE OUI, 24 bits.
    pub oui: u32,
    /// 4 bits.
    pub update_type: u8,
    /// 5 bits, absent when updates are not versioned.
    pub update_version: Option<u8>,
    pub selector: Vec<u8>,
}

/// data_broadcast_id_descriptor for system software update, tag 0x66.
///
/// Only the SSU form, data_broadcast_id 0x000A, is decoded. Any other id is
/// invalid content for this type and the descriptor stays opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SsuDataBroadcastIdDescriptor {
    pub entries: Vec<SsuOui>,
    pub private_data: Vec<u8>,
}

impl SsuDataBroadcastIdDescriptor {
    pub const DATA_BROADCAST_ID: u16 = 0x000A;
    pub const MAX_ENTRIES: usize = 42;
}

fn ssu_update_type_name(update_type: u8) -> &'static str {
    match update_type {
        0x00 => "proprietary update solution",
        0x01 => "standard update carousel (no notification) via broadcast",
        0x02 => "system software update with UNT via broadcast",
        0x03 => "system software update using return channel with UNT",
        _ => "reserved",
    }
}

impl Descriptor for SsuDataBroadcastIdDescriptor {
    descriptor_identity!();

    fn clear_content(&mut self) {
        self.entries.clear();
        self.private_data.clear();
    }

    fn serialize_payload(&self, buf: &mut BitWriter, _context: &Context) {
        buf.put_uint16(Self::DATA_BROADCAST_ID);
        buf.push_write_sequence_with_leading_length(8);
        for entry in &self.entries {
            buf.put_uint24(entry.oui);
            buf.put_reserved(4);
            buf.put_bits(entry.update_type.into(), 4);
            buf.put_reserved(2);
            buf.put_bool(entry.update_version.is_some());
            buf.put_bits(entry.update_version.unwrap_or(0x1F).into(), 5);
            match u8::try_from(entry.selector.len()) {
                Ok(length) => buf.put_uint8(length),
                Err(_) => buf.set_user_error(),
            }
            buf.put_bytes(&entry.selector);
        }
        buf.pop_write_sequence();
        buf.put_bytes(&self.private_data);
    }

    fn deserialize_payload(&mut self, buf: &mut BitReader, _context: &Context) {
        let data_broadcast_id = buf.get_uint16();
        if buf.error() {
            return;
        }
        if data_broadcast_id != Self::DATA_BROADCAST_ID {
            buf.set_user_error();
            return;
        }
        buf.push_read_size_from_length(8);
        while buf.can_read() {
            let oui = buf.get_uint24();
            buf.skip_bits(4);
            let update_type = buf.read_bits(4) as u8;
            buf.skip_bits(2);
            let versioned = buf.get_bool();
            let version = buf.read_bits(5) as u8;
            let length = buf.get_uint8() as usize;
            let selector = buf.get_bytes(length);
            self.entries.push(SsuOui {
                oui,
                update_type,
                update_version: versioned.then_some(version),
                selector,
            });
        }
        buf.pop_read_size();
        self.private_data = buf.get_remaining_bytes();
    }

    fn build_xml(&self, root: &mut Element, _context: &Context) {
        for entry in &self.entries {
            let e = root.add_element("OUI");
            e.set_attribute("OUI", format!("0x{:06X}", entry.oui));
            e.set_int_attribute("update_type", entry.update_type, true);
            if let Some(version) = entry.update_version {
                e.set_int_attribute("update_version", version, false);
            }
            e.add_hexa_text_child("selector", &entry.selector, true);
        }
        root.add_hexa_text_child("private_data", &self.private_data, true);
    }

    fn analyze_xml(&mut self, element: &Element, _context: &Context) -> Result<(), XmlError> {
        element.check_children(&["OUI", "private_data"])?;
        for child in element.get_children("OUI", 0, Self::MAX_ENTRIES)? {
            child.check_children(&["selector"])?;
            let update_version = if child.has_attribute("update_version") {
                Some(child.get_int_attribute("update_version", true, 0, 0, 0x1F)?)
            } else {
                None
            };
            self.entries.push(SsuOui {
                oui: child.get_int_attribute("OUI", true, 0, 0, 0x00FF_FFFF)?,
                update_type: child.get_int_attribute("update_type", true, 0, 0, 0x0F)?,
                update_version,
                selector: child.get_hexa_text_child("selector", false, 0, 255 - 9)?,
            });
        }
        self.private_data = element.get_hexa_text_child("private_data", false, 0, 255 - 3)?;
        Ok(())
    }
}

impl DescriptorType for SsuDataBroadcastIdDescriptor {
    const EDID: Edid = Edid::regular(0x66, Standards::DVB);
    const XML_NAME: &'static str = "SSU_data_broadcast_id_descriptor";

    fn display(disp: &mut TablesDisplay, buf: &mut BitReader, margin: &str, _context: &DescriptorContext) {
        if !buf.can_read_bytes(2) {
            return;
        }
        let data_broadcast_id = buf.get_uint16();
        let is_ssu = data_broadcast_id == Self::DATA_BROADCAST_ID;
        disp.line(
            margin,
            format_args!(
                "Data broadcast id: {} ({})",
                format_hex_dec(data_broadcast_id.into(), 4),
                if is_ssu { "System Software Update" } else { "unknown" }
            ),
        );
        if !is_ssu {
            disp.display_private_data("Selector bytes", buf, usize::MAX, margin);
            return;
        }

        let inner = format!("{margin}  ");
        if buf.can_read_bytes(1) {
            buf.push_read_size_from_length(8);
            while buf.can_read_bytes(6) {
                let oui = buf.get_uint24();
                disp.line(margin, format_args!("OUI: 0x{oui:06X}"));
                buf.skip_bits(4);
                let update_type = buf.read_bits(4) as u8;
                disp.line(
                    &inner,
                    format_args!("Update type: 0x{update_type:X} ({})", ssu_update_type_name(update_type)),
                );
                buf.skip_bits(2);
                let versioned = buf.get_bool();
                let version = buf.read_bits(5);
                if versioned {
                    disp.line(&inner, format_args!("Update version: {version}"));
                } else {
                    disp.line(&inner, "Update version: none");
                }
                let length = buf.get_uint8() as usize;
                disp.display_private_data("Selector data", buf, length, &inner);
            }
            buf.pop_read_size();
        }
        disp.display_private_data("Private data", buf, usize::MAX, margin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Charset, TID_NIT_ACT};
    use crate::descriptor::{DescriptorExt, RawDescriptor};
    use crate::error::DecodeError;

    fn dvb() -> Context {
        Context::new(Standards::DVB)
    }

    #[test]
    fn test_adaptation_field_data() {
        let ctx = dvb();
        let desc = AdaptationFieldDataDescriptor {
            adaptation_field_data_identifier: 0x05,
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x05]);

        let mut decoded = AdaptationFieldDataDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, desc);

        let element = desc.to_xml(&ctx);
        assert_eq!(element.attribute("adaptation_field_data_identifier"), Some("0x05"));
    }

    #[test]
    fn test_adaptation_field_data_display() {
        let mut disp = TablesDisplay::default();
        let data = [0x05];
        let mut buf = BitReader::new(&data);
        AdaptationFieldDataDescriptor::display(&mut disp, &mut buf, "", &DescriptorContext::new(Standards::DVB));
        assert_eq!(
            disp.output(),
            "Adaptation field data identifier: 0x05\n\
             \x20 0x01 = announcement switching data field\n\
             \x20 0x04 = PVR_assist_information data field\n"
        );
    }

    #[test]
    fn test_ecm_repetition_rate() {
        let ctx = dvb();
        let desc = EcmRepetitionRateDescriptor {
            ca_system_id: 0x1234,
            ecm_repetition_rate: 500,
            private_data: vec![],
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x12, 0x34, 0x01, 0xF4]);

        let mut decoded = EcmRepetitionRateDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, desc);

        let element = desc.to_xml(&ctx);
        assert_eq!(element.attribute("CA_system_id"), Some("0x1234"));
        assert_eq!(element.attribute("ECM_repetition_rate"), Some("500"));
        assert!(element.find_child("private_data").is_none());
    }

    #[test]
    fn test_ecm_repetition_rate_truncated() {
        let ctx = dvb();
        let raw = RawDescriptor::new(0x78, vec![0x12, 0x34, 0x01]).unwrap();
        let mut decoded = EcmRepetitionRateDescriptor {
            ca_system_id: 7,
            ecm_repetition_rate: 7,
            private_data: vec![7],
        };
        assert_eq!(
            decoded.deserialize(&raw, &ctx),
            Err(DecodeError::Truncated {
                tag: 0x78,
                available: 3
            })
        );
        assert_eq!(decoded, EcmRepetitionRateDescriptor::default());
    }

    #[test]
    fn test_ecm_private_data_limit() {
        let ctx = dvb();
        let mut element = Element::new("ECM_repetition_rate_descriptor");
        element.set_attribute("CA_system_id", "0x0100");
        element.set_attribute("ECM_repetition_rate", "100");
        element.add_hexa_text_child("private_data", &[0xAA; 252], false);
        assert!(matches!(
            EcmRepetitionRateDescriptor::from_xml(&element, &ctx),
            Err(XmlError::InvalidLength { max: 251, .. })
        ));
    }

    #[test]
    fn test_network_name_charsets() {
        let desc = NetworkNameDescriptor {
            name: "Réseau".to_string(),
        };
        let latin1 = Context::new(Standards::DVB).with_charset(Charset::Latin1);
        let raw = desc.serialize(&latin1).unwrap();
        assert_eq!(raw.payload(), &[b'R', 0xE9, b's', b'e', b'a', b'u']);

        let mut decoded = NetworkNameDescriptor::default();
        decoded.deserialize(&raw, &latin1).unwrap();
        assert_eq!(decoded, desc);

        let utf8 = dvb();
        assert_eq!(desc.serialize(&utf8).unwrap().payload().len(), 7);
    }

    #[test]
    fn test_network_name_too_long() {
        let desc = NetworkNameDescriptor {
            name: "x".repeat(256),
        };
        assert!(desc.serialize(&dvb()).is_err());
    }

    #[test]
    fn test_service_list() {
        let ctx = dvb();
        let desc = ServiceListDescriptor {
            entries: vec![
                ServiceListEntry {
                    service_id: 0x0101,
                    service_type: 0x01,
                },
                ServiceListEntry {
                    service_id: 0x0102,
                    service_type: 0x19,
                },
            ],
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x01, 0x01, 0x01, 0x01, 0x02, 0x19]);

        let element = desc.to_xml(&ctx);
        assert_eq!(element.children().len(), 2);
        assert_eq!(ServiceListDescriptor::from_xml(&element, &ctx).unwrap(), desc);

        // A partial entry is a truncation.
        let mut decoded = ServiceListDescriptor::default();
        let short = RawDescriptor::new(0x41, vec![0x01, 0x01, 0x01, 0x02]).unwrap();
        assert!(decoded.deserialize(&short, &ctx).is_err());
        assert!(decoded.entries.is_empty());
    }

    #[test]
    fn test_service_list_rejects_unknown_child() {
        let mut element = Element::new("service_list_descriptor");
        element.add_element("channel");
        assert!(matches!(
            ServiceListDescriptor::from_xml(&element, &dvb()),
            Err(XmlError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn test_logical_channel_number_bits() {
        let ctx = dvb();
        let desc = EacemLogicalChannelNumberDescriptor {
            entries: vec![LogicalChannelNumber {
                service_id: 0x1234,
                visible: true,
                lcn: 0x3FF,
            }],
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x12, 0x34, 0xFF, 0xFF]);

        let hidden = EacemLogicalChannelNumberDescriptor {
            entries: vec![LogicalChannelNumber {
                service_id: 0x0001,
                visible: false,
                lcn: 22,
            }],
        };
        let raw = hidden.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x00, 0x01, 0x7C, 0x16]);

        let mut decoded = EacemLogicalChannelNumberDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, hidden);
    }

    #[test]
    fn test_logical_channel_number_range() {
        let element = Element::parse_xml(
            r#"<eacem_logical_channel_number_descriptor>
                 <service service_id="1" logical_channel_number="1024"/>
               </eacem_logical_channel_number_descriptor>"#,
        )
        .unwrap();
        assert!(matches!(
            EacemLogicalChannelNumberDescriptor::from_xml(&element, &dvb()),
            Err(XmlError::OutOfRange { max: 0x3FF, .. })
        ));
    }

    #[test]
    fn test_eutelsat_channel_number() {
        let ctx = dvb();
        let desc = EutelsatChannelNumberDescriptor {
            entries: vec![EutelsatChannel {
                original_network_id: 0x0001,
                transport_stream_id: 0x0002,
                service_id: 0x0003,
                ecn: 0x123,
            }],
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(raw.payload(), &[0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0xF1, 0x23]);

        let element = desc.to_xml(&ctx);
        assert_eq!(EutelsatChannelNumberDescriptor::from_xml(&element, &ctx).unwrap(), desc);
    }

    #[test]
    fn test_ipmac_modulation_names() {
        let ctx = dvb();
        let desc = IpmacGenericStreamLocationDescriptor {
            interactive_network_id: 0x0A0B,
            modulation_system_type: 1,
            modulation_system_id: 0x0001,
            phy_stream_id: 0x0002,
            selector_bytes: vec![0xC0, 0xFF, 0xEE],
        };
        let element = desc.to_xml(&ctx);
        assert_eq!(element.attribute("modulation_system_type"), Some("DVB-T2"));
        assert_eq!(IpmacGenericStreamLocationDescriptor::from_xml(&element, &ctx).unwrap(), desc);

        let mut numeric = element.clone();
        numeric.set_attribute("modulation_system_type", "9");
        let decoded = IpmacGenericStreamLocationDescriptor::from_xml(&numeric, &ctx).unwrap();
        assert_eq!(decoded.modulation_system_type, 9);
        assert_eq!(decoded.to_xml(&ctx).attribute("modulation_system_type"), Some("9"));

        numeric.set_attribute("modulation_system_type", "DVB-X");
        assert!(IpmacGenericStreamLocationDescriptor::from_xml(&numeric, &ctx).is_err());
    }

    #[test]
    fn test_private_data_specifier_display() {
        let mut disp = TablesDisplay::default();
        let data = [0x00, 0x00, 0x00, 0x28];
        let mut buf = BitReader::new(&data);
        let lookup = DescriptorContext::new(Standards::DVB).with_table_id(TID_NIT_ACT);
        PrivateDataSpecifierDescriptor::display(&mut disp, &mut buf, "", &lookup);
        assert_eq!(disp.output(), "Specifier: 0x00000028 (EACEM / EICTA)\n");
    }

    #[test]
    fn test_subtitling() {
        let ctx = dvb();
        let desc = SubtitlingDescriptor {
            entries: vec![
                SubtitlingEntry {
                    language_code: "eng".to_string(),
                    subtitling_type: 0x10,
                    composition_page_id: 0x0001,
                    ancillary_page_id: 0x0002,
                },
                SubtitlingEntry {
                    language_code: "fra".to_string(),
                    subtitling_type: 0x20,
                    composition_page_id: 0x0003,
                    ancillary_page_id: 0x0003,
                },
            ],
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(
            raw.payload(),
            &[
                b'e', b'n', b'g', 0x10, 0x00, 0x01, 0x00, 0x02, //
                b'f', b'r', b'a', 0x20, 0x00, 0x03, 0x00, 0x03,
            ]
        );

        let mut decoded = SubtitlingDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, desc);

        let element = desc.to_xml(&ctx);
        assert_eq!(element.children()[0].attribute("language_code"), Some("eng"));
        assert_eq!(element.children()[1].attribute("subtitling_type"), Some("0x20"));
        assert_eq!(SubtitlingDescriptor::from_xml(&element, &ctx).unwrap(), desc);

        let bad = Element::parse_xml(
            r#"<subtitling_descriptor>
                 <subtitling language_code="en" subtitling_type="1"
                             composition_page_id="1" ancillary_page_id="1"/>
               </subtitling_descriptor>"#,
        )
        .unwrap();
        assert!(matches!(
            SubtitlingDescriptor::from_xml(&bad, &ctx),
            Err(XmlError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_subtitling_display() {
        let mut disp = TablesDisplay::default();
        let data = [b'e', b'n', b'g', 0x10, 0x00, 0x01, 0x00, 0x02, 0xFF];
        let mut buf = BitReader::new(&data);
        SubtitlingDescriptor::display(&mut disp, &mut buf, "", &DescriptorContext::new(Standards::DVB));
        assert_eq!(
            disp.output(),
            "Language: eng, Type: 0x10 (16)\n\
             Type: DVB subtitles (normal) with no monitor aspect ratio criticality\n\
             Composition page: 0x0001 (1), Ancillary page: 0x0002 (2)\n"
        );
        assert_eq!(buf.remaining_bytes(), 1);
    }

    #[test]
    fn test_ssu_data_broadcast_id() {
        let ctx = dvb();
        let desc = SsuDataBroadcastIdDescriptor {
            entries: vec![
                SsuOui {
                    oui: 0x00015A,
                    update_type: 0x1,
                    update_version: Some(3),
                    selector: vec![0xAB, 0xCD],
                },
                SsuOui {
                    oui: 0x000090,
                    update_type: 0x2,
                    update_version: None,
                    selector: vec![],
                },
            ],
            private_data: vec![0x01],
        };
        let raw = desc.serialize(&ctx).unwrap();
        assert_eq!(
            raw.payload(),
            &[
                0x00, 0x0A, 0x0E, // SSU, OUI loop length
                0x00, 0x01, 0x5A, 0xF1, 0xE3, 0x02, 0xAB, 0xCD, //
                0x00, 0x00, 0x90, 0xF2, 0xDF, 0x00, //
                0x01,
            ]
        );

        let mut decoded = SsuDataBroadcastIdDescriptor::default();
        decoded.deserialize(&raw, &ctx).unwrap();
        assert_eq!(decoded, desc);

        let element = desc.to_xml(&ctx);
        let first = &element.children()[0];
        assert_eq!(first.attribute("OUI"), Some("0x00015A"));
        assert_eq!(first.attribute("update_version"), Some("3"));
        assert!(element.children()[1].attribute("update_version").is_none());
        assert_eq!(SsuDataBroadcastIdDescriptor::from_xml(&element, &ctx).unwrap(), desc);
    }

    #[test]
    fn test_ssu_data_broadcast_id_rejects_other_ids() {
        let ctx = dvb();
        let mut decoded = SsuDataBroadcastIdDescriptor::default();

        let other = RawDescriptor::new(0x66, vec![0x01, 0x23, 0x00]).unwrap();
        assert!(matches!(
            decoded.deserialize(&other, &ctx),
            Err(DecodeError::Invalid { tag: 0x66, .. })
        ));

        // The OUI loop length runs past the payload.
        let short = RawDescriptor::new(0x66, vec![0x00, 0x0A, 0x06, 0x00, 0x01]).unwrap();
        assert!(matches!(
            decoded.deserialize(&short, &ctx),
            Err(DecodeError::Truncated { tag: 0x66, .. })
        ));
        assert_eq!(decoded, SsuDataBroadcastIdDescriptor::default());
    }

    #[test]
    fn test_ssu_data_broadcast_id_display() {
        let render = |data: &[u8]| {
            let mut disp = TablesDisplay::default();
            let mut buf = BitReader::new(data);
            SsuDataBroadcastIdDescriptor::display(&mut disp, &mut buf, "", &DescriptorContext::new(Standards::DVB));
            disp.into_output()
        };
        assert_eq!(
            render(&[0x00, 0x0A, 0x08, 0x00, 0x01, 0x5A, 0xF1, 0xE3, 0x02, 0xAB, 0xCD, 0x01]),
            "Data broadcast id: 0x000A (10) (System Software Update)\n\
             OUI: 0x00015A\n\
             \x20 Update type: 0x1 (standard update carousel (no notification) via broadcast)\n\
             \x20 Update version: 3\n\
             \x20 Selector data (2 bytes): AB CD\n\
             Private data (1 bytes): 01\n"
        );
        assert_eq!(
            render(&[0x01, 0x23, 0xFF]),
            "Data broadcast id: 0x0123 (291) (unknown)\n\
             Selector bytes (1 bytes): FF\n"
        );
    }
}
