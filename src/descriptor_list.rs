//! Descriptor loops.
//!
//! A [`DescriptorList`] keeps descriptors in their raw form, in wire order,
//! together with the private data specifier found before each of them. Typed
//! decoding happens per entry, so one bad descriptor never prevents the others
//! from being decoded.

use crate::context::{Context, DescriptorContext, Pds, TableId};
use crate::descriptor::{Descriptor, DescriptorExt, RawDescriptor, UnknownDescriptor};
use crate::descriptors::PrivateDataSpecifierDescriptor;
use crate::edid::Edid;
use crate::error::{DecodeError, EncodeError, XmlError};
use crate::registry::Registry;
use crate::xml::Element;

/// Tag of the DVB private_data_specifier_descriptor.
pub const TAG_PRIVATE_DATA_SPECIFIER: u8 = 0x5F;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    raw: RawDescriptor,
    /// Specifier set by an earlier descriptor of the list, if any.
    pds: Option<Pds>,
}

/// An ordered list of descriptors found in one place of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorList {
    table_id: Option<TableId>,
    entries: Vec<Entry>,
    /// Bytes of a last descriptor cut short, never re-serialized.
    truncated: Vec<u8>,
}

impl DescriptorList {
    /// Creates an empty list, inside the given table if any.
    pub fn new(table_id: Option<TableId>) -> Self {
        DescriptorList {
            table_id,
            entries: Vec::new(),
            truncated: Vec::new(),
        }
    }

    /// Splits a descriptor loop into raw descriptors.
    ///
    /// A last descriptor cut short stops the parsing. Its bytes are kept
    /// aside, see [`truncated_data`](Self::truncated_data).
    pub fn parse(data: &[u8], table_id: Option<TableId>) -> Self {
        let mut list = DescriptorList::new(table_id);
        let mut rest = data;
        while !rest.is_empty() {
            match RawDescriptor::parse(rest) {
                Ok((raw, used)) => {
                    list.push(raw);
                    rest = &rest[used..];
                }
                Err(err) => {
                    log::warn!("descriptor loop stops after {} descriptors: {err}", list.len());
                    list.truncated = rest.to_vec();
                    break;
                }
            }
        }
        list
    }

    /// Parses a base64-encoded descriptor loop.
    #[cfg(feature = "base64")]
    pub fn parse_base64(text: &str, table_id: Option<TableId>) -> Result<Self, DecodeError> {
        let data = data_encoding::BASE64
            .decode(text.trim().as_bytes())
            .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
        Ok(Self::parse(&data, table_id))
    }

    /// Base64 form of [`to_bytes`](Self::to_bytes).
    #[cfg(feature = "base64")]
    pub fn to_base64(&self) -> String {
        data_encoding::BASE64.encode(&self.to_bytes())
    }

    /// Trailing bytes which did not form a complete descriptor.
    pub fn truncated_data(&self) -> &[u8] {
        &self.truncated
    }

    pub fn table_id(&self) -> Option<TableId> {
        self.table_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RawDescriptor> {
        self.entries.get(index).map(|entry| &entry.raw)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawDescriptor> {
        self.entries.iter().map(|entry| &entry.raw)
    }

    fn current_pds(&self) -> Option<Pds> {
        let last = self.entries.last()?;
        specified_pds(&last.raw).or(last.pds)
    }

    /// Appends a raw descriptor.
    pub fn push(&mut self, raw: RawDescriptor) {
        let pds = self.current_pds();
        self.entries.push(Entry { raw, pds });
    }

    /// Serializes and appends a typed descriptor.
    ///
    /// A private descriptor is preceded by a private_data_specifier_descriptor
    /// when its specifier is not already in force.
    pub fn add_descriptor(
        &mut self,
        descriptor: &dyn Descriptor,
        context: &Context,
    ) -> Result<(), EncodeError> {
        if let Edid::Private { pds, .. } = descriptor.edid() {
            let current = self.current_pds().unwrap_or(context.default_pds());
            if current != pds {
                let specifier = PrivateDataSpecifierDescriptor { pds };
                self.push(specifier.serialize(context)?);
            }
        }
        let raw = descriptor.serialize(context)?;
        self.push(raw);
        Ok(())
    }

    /// Private data specifier in force for the descriptor at `index`.
    pub fn private_data_specifier(&self, index: usize, context: &Context) -> Pds {
        self.entries
            .get(index)
            .and_then(|entry| entry.pds)
            .unwrap_or(context.default_pds())
    }

    /// Lookup scope of the descriptor at `index`.
    pub fn descriptor_context(&self, index: usize, context: &Context) -> DescriptorContext {
        let lookup = context
            .descriptor_context()
            .with_pds(self.private_data_specifier(index, context));
        match self.table_id {
            Some(table_id) => lookup.with_table_id(table_id),
            None => lookup,
        }
    }

    /// Decodes the descriptor at `index` into its most specific type.
    pub fn decode(
        &self,
        index: usize,
        registry: &Registry,
        context: &Context,
    ) -> Option<Result<Box<dyn Descriptor>, DecodeError>> {
        let raw = self.get(index)?;
        let lookup = self.descriptor_context(index, context);
        Some(registry.decode(raw, &lookup, context))
    }

    /// Concatenated binary form of all descriptors.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.iter().flat_map(RawDescriptor::to_bytes).collect()
    }

    /// Adds the text form of every descriptor under `parent`.
    ///
    /// A descriptor that fails to decode is kept as `<generic_descriptor>`
    /// so no data is lost.
    pub fn to_xml(&self, registry: &Registry, context: &Context, parent: &mut Element) {
        for (index, raw) in self.iter().enumerate() {
            let element = match self.decode(index, registry, context) {
                Some(Ok(descriptor)) => descriptor.to_xml(context),
                Some(Err(err)) => {
                    log::warn!("descriptor {index} kept opaque: {err}");
                    UnknownDescriptor::from(raw).to_xml(context)
                }
                None => continue,
            };
            parent.push_child(element);
        }
    }

    /// Builds a list from the descriptor elements under `parent`.
    ///
    /// Invalid elements are skipped and returned with the list, the caller
    /// decides whether they are fatal.
    pub fn from_xml(
        parent: &Element,
        table_id: Option<TableId>,
        registry: &Registry,
        context: &Context,
    ) -> (Self, Vec<XmlError>) {
        let mut list = DescriptorList::new(table_id);
        let mut errors = Vec::new();
        for child in parent.children() {
            let added = registry
                .from_xml(child, context)
                .and_then(|descriptor| Ok(list.add_descriptor(descriptor.as_ref(), context)?));
            if let Err(err) = added {
                log::warn!("skipping <{}>: {err}", child.name());
                errors.push(err);
            }
        }
        (list, errors)
    }
}

fn specified_pds(raw: &RawDescriptor) -> Option<Pds> {
    match raw.payload() {
        [a, b, c, d, ..] if raw.tag() == TAG_PRIVATE_DATA_SPECIFIER => {
            Some(u32::from_be_bytes([*a, *b, *c, *d]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PDS_EACEM, PDS_EUTELSAT, TID_NIT_ACT};
    use crate::descriptors::{EacemLogicalChannelNumberDescriptor, LogicalChannelNumber};
    use crate::registry::global;
    use crate::standards::Standards;

    fn dvb() -> Context {
        Context::new(Standards::DVB)
    }

    #[test]
    fn test_parse_and_reserialize() {
        let bytes = [0x70, 0x01, 0x05, 0xE0, 0x00, 0x5F, 0x04, 0x00, 0x00, 0x00, 0x28];
        let list = DescriptorList::parse(&bytes, None);
        assert!(list.truncated_data().is_empty());
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).unwrap().payload(), &[] as &[u8]);
        assert_eq!(list.to_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_parse_truncated() {
        let bytes = [0x70, 0x01, 0x05, 0x41, 0x05, 0x00];
        let list = DescriptorList::parse(&bytes, None);
        assert_eq!(list.len(), 1);
        assert_eq!(list.truncated_data(), &[0x41, 0x05, 0x00]);
        assert_eq!(list.to_bytes(), vec![0x70, 0x01, 0x05]);
    }

    #[test]
    fn test_pds_tracking() {
        let ctx = dvb().with_default_pds(PDS_EUTELSAT);
        let bytes = [
            0x83, 0x00, // uses the default
            0x5F, 0x04, 0x00, 0x00, 0x00, 0x28, // EACEM from here
            0x83, 0x00,
        ];
        let list = DescriptorList::parse(&bytes, Some(TID_NIT_ACT));
        assert_eq!(list.private_data_specifier(0, &ctx), PDS_EUTELSAT);
        assert_eq!(list.private_data_specifier(1, &ctx), PDS_EUTELSAT);
        assert_eq!(list.private_data_specifier(2, &ctx), PDS_EACEM);

        let lookup = list.descriptor_context(2, &ctx);
        assert_eq!(lookup.pds, PDS_EACEM);
        assert_eq!(lookup.table_id, Some(TID_NIT_ACT));
    }

    #[test]
    fn test_private_descriptor_gets_specifier() {
        let ctx = dvb();
        let lcn = EacemLogicalChannelNumberDescriptor {
            entries: vec![LogicalChannelNumber {
                service_id: 0x0102,
                visible: true,
                lcn: 5,
            }],
        };
        let mut list = DescriptorList::default();
        list.add_descriptor(&lcn, &ctx).unwrap();
        list.add_descriptor(&lcn, &ctx).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0).unwrap().tag(), TAG_PRIVATE_DATA_SPECIFIER);

        let decoded = list.decode(2, global(), &ctx).unwrap().unwrap();
        assert_eq!(
            decoded.downcast_ref::<EacemLogicalChannelNumberDescriptor>(),
            Some(&lcn)
        );
    }

    #[test]
    fn test_bad_entry_stays_local() {
        let ctx = dvb();
        // ECM_repetition_rate needs 4 bytes, the middle one has 2.
        let bytes = [0x70, 0x01, 0x05, 0x78, 0x02, 0x01, 0x00, 0x70, 0x01, 0x01];
        let list = DescriptorList::parse(&bytes, None);
        assert!(list.decode(0, global(), &ctx).unwrap().is_ok());
        assert!(list.decode(1, global(), &ctx).unwrap().is_err());
        assert!(list.decode(2, global(), &ctx).unwrap().is_ok());
        assert!(list.decode(3, global(), &ctx).is_none());

        let mut root = Element::new("tsduck");
        list.to_xml(global(), &ctx, &mut root);
        let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "adaptation_field_data_descriptor",
                "generic_descriptor",
                "adaptation_field_data_descriptor"
            ]
        );

        let (back, errors) = DescriptorList::from_xml(&root, None, global(), &ctx);
        assert!(errors.is_empty());
        assert_eq!(back.to_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_from_xml_skips_invalid_elements() {
        let ctx = dvb();
        let root = Element::parse_xml(
            r#"<tsduck>
                 <adaptation_field_data_descriptor adaptation_field_data_identifier="0x01"/>
                 <adaptation_field_data_descriptor adaptation_field_data_identifier="0x100"/>
                 <no_such_descriptor/>
               </tsduck>"#,
        )
        .unwrap();
        let (list, errors) = DescriptorList::from_xml(&root, None, global(), &ctx);
        assert_eq!(list.to_bytes(), vec![0x70, 0x01, 0x01]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1], XmlError::UnknownName("no_such_descriptor".to_string()));
    }

    #[cfg(feature = "base64")]
    #[test]
    fn test_base64() {
        let list = DescriptorList::parse_base64("cAEF", None).unwrap();
        assert_eq!(list.to_bytes(), vec![0x70, 0x01, 0x05]);
        assert_eq!(list.to_base64(), "cAEF");
        assert!(matches!(
            DescriptorList::parse_base64("!!", None),
            Err(DecodeError::InvalidBase64(_))
        ));
    }
}
