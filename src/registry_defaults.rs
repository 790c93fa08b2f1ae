//! Built-in registrations.
//!
//! Registration order matters: when several registrations of the same form
//! match a lookup, the one listed first here wins.

use crate::descriptors::{
    AdaptationFieldDataDescriptor, AudioComponentDescriptor, CaEmmTsDescriptor,
    EacemLogicalChannelNumberDescriptor, EcmRepetitionRateDescriptor,
    EutelsatChannelNumberDescriptor, IpmacGenericStreamLocationDescriptor,
    IsdbAccessControlDescriptor, NetworkNameDescriptor, PrivateDataSpecifierDescriptor,
    ServiceListDescriptor, SpliceAvailDescriptor, SsuDataBroadcastIdDescriptor, StdDescriptor,
    SubtitlingDescriptor,
};
use crate::registry::{Registration, Registry};

/// Every built-in descriptor type, in registration order.
pub fn default_registrations() -> Vec<Registration> {
    vec![
        // MPEG
        Registration::of::<StdDescriptor>(),
        // DVB
        Registration::of::<NetworkNameDescriptor>(),
        Registration::of::<ServiceListDescriptor>(),
        Registration::of::<SubtitlingDescriptor>(),
        Registration::of::<PrivateDataSpecifierDescriptor>(),
        Registration::of::<SsuDataBroadcastIdDescriptor>(),
        Registration::of::<AdaptationFieldDataDescriptor>(),
        Registration::of::<EcmRepetitionRateDescriptor>(),
        Registration::of::<EacemLogicalChannelNumberDescriptor>(),
        Registration::of::<EutelsatChannelNumberDescriptor>(),
        Registration::of::<IpmacGenericStreamLocationDescriptor>(),
        // ISDB
        Registration::of::<CaEmmTsDescriptor>(),
        Registration::of::<AudioComponentDescriptor>(),
        Registration::of::<IsdbAccessControlDescriptor>(),
        // SCTE
        Registration::of::<SpliceAvailDescriptor>(),
    ]
}

/// Builds a registry holding every built-in descriptor type.
///
/// Refused registrations are logged by [`Registry::register`] and skipped.
pub fn build_default_registry() -> Registry {
    let mut registry = Registry::new();
    for registration in default_registrations() {
        // Already logged, the earlier registration stays in force.
        let _ = registry.register(registration);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Charset, Context, DescriptorContext};
    use crate::descriptor::{DescriptorExt, RawDescriptor};
    use crate::display::TablesDisplay;
    use crate::edid::Edid;
    use crate::standards::Standards;

    /// The lookup context in which `edid` is the most specific match.
    fn lookup_for(edid: &Edid) -> DescriptorContext {
        match *edid {
            Edid::Regular { standards, .. } => DescriptorContext::new(standards),
            Edid::Private { standards, pds, .. } => DescriptorContext::new(standards).with_pds(pds),
            Edid::TableSpecific {
                standards,
                table_id,
                ..
            } => DescriptorContext::new(standards).with_table_id(table_id),
        }
    }

    /// Deterministic pseudo-random bytes.
    fn noise(length: usize) -> Vec<u8> {
        let mut state: u32 = 0x2545_F491;
        (0..length)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) as u8
            })
            .collect()
    }

    #[test]
    fn test_defaults_register_without_conflict() {
        let mut registry = Registry::new();
        for registration in default_registrations() {
            registry.register(registration).unwrap();
        }
        assert_eq!(registry.len(), default_registrations().len());
    }

    #[test]
    fn test_names_are_unique() {
        let registry = build_default_registry();
        for registration in default_registrations() {
            let found = registry.by_xml_name(registration.xml_name).unwrap();
            assert_eq!(found.edid, registration.edid);
        }
    }

    #[test]
    fn test_every_payload_prefix_is_handled() {
        let registry = build_default_registry();
        let data = noise(255);
        for registration in default_registrations() {
            let lookup = lookup_for(&registration.edid);
            // Latin-1 keeps decoded strings at their byte size.
            let ctx = Context::new(lookup.standards)
                .with_default_pds(lookup.pds)
                .with_charset(Charset::Latin1);
            let cleared = (registration.factory)().to_xml(&ctx);

            for length in 0..=data.len() {
                let raw = RawDescriptor::new(registration.edid.tag(), data[..length].to_vec()).unwrap();

                let mut disp = TablesDisplay::new(ctx);
                disp.display_descriptor(&registry, &raw, 0, &lookup, "");
                assert!(
                    disp.output().contains(registration.xml_name),
                    "{} with {length} bytes:\n{}",
                    registration.xml_name,
                    disp.output()
                );

                let mut descriptor = (registration.factory)();
                match descriptor.deserialize(&raw, &ctx) {
                    Ok(()) => assert!(
                        descriptor.serialize(&ctx).is_ok(),
                        "{} with {length} bytes",
                        registration.xml_name
                    ),
                    Err(_) => assert_eq!(
                        descriptor.to_xml(&ctx),
                        cleared,
                        "{} with {length} bytes",
                        registration.xml_name
                    ),
                }
            }
        }
    }

    #[test]
    fn test_short_payload_is_dumped_as_extra_data() {
        let registry = build_default_registry();
        let raw = RawDescriptor::new(0x78, vec![0x12, 0x34, 0x01]).unwrap();
        let mut disp = TablesDisplay::new(Context::new(Standards::DVB));
        disp.display_descriptor(&registry, &raw, 0, &DescriptorContext::new(Standards::DVB), "");
        assert_eq!(
            disp.output(),
            format!(
                "- Descriptor 0: ECM_repetition_rate_descriptor, tag 0x78 (120), 3 bytes\n\
                 \x20 Extraneous 3 bytes:\n\
                 \x20   0000:  12 34 01{}  .4.\n",
                " ".repeat(39)
            )
        );
    }
}
