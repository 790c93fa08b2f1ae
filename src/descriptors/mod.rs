//! Built-in descriptor types, one module per standard.
//!
//! Each type implements [`Descriptor`](crate::descriptor::Descriptor) and
//! [`DescriptorType`](crate::descriptor::DescriptorType) and is registered by
//! [`crate::registry_defaults::build_default_registry`].

/// Identity methods shared by every built-in `Descriptor` impl.
macro_rules! descriptor_identity {
    () => {
        fn edid(&self) -> $crate::edid::Edid {
            <Self as $crate::descriptor::DescriptorType>::EDID
        }

        fn xml_name(&self) -> &'static str {
            <Self as $crate::descriptor::DescriptorType>::XML_NAME
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

mod dvb;
mod isdb;
mod mpeg;
mod scte;

pub use dvb::*;
pub use isdb::*;
pub use mpeg::*;
pub use scte::*;

/// Name of a CA system, from the range its id falls in.
pub(crate) fn ca_system_name(ca_system_id: u16) -> &'static str {
    match ca_system_id {
        0x0100..=0x01FF => "MediaGuard",
        0x0500..=0x05FF => "Viaccess",
        0x0600..=0x06FF => "Irdeto",
        0x0900..=0x09FF => "NDS",
        0x0B00..=0x0BFF => "Conax",
        0x0D00..=0x0DFF => "CryptoWorks",
        0x1800..=0x18FF => "Nagravision",
        0x4AE0..=0x4AE1 => "DRE-Crypt",
        0x0005 => "ISDB (B-CAS)",
        _ => "unknown",
    }
}
