//! Registry of descriptor types.
//!
//! A [`Registry`] maps extended identifiers and text element names to
//! descriptor factories. It is filled once, before any lookup, then only read.
//! The process-wide instance returned by [`global`] is built on first use from
//! [`crate::registry_defaults::build_default_registry`] and is immutable from
//! then on.
//!
//! Lookup of a tag found in some context is most-specific-first:
//! table-specific registrations, then private ones, then regular ones. When
//! nothing matches, callers fall back to [`UnknownDescriptor`].

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext};
use crate::descriptor::{
    Descriptor, DescriptorExt, DescriptorType, GENERIC_DESCRIPTOR_NAME, RawDescriptor,
    UnknownDescriptor,
};
use crate::display::TablesDisplay;
use crate::edid::{Edid, EdidKind};
use crate::error::{DecodeError, RegistrationError, XmlError};
use crate::xml::Element;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Creates a cleared instance of a descriptor type.
pub type Factory = fn() -> Box<dyn Descriptor>;

/// Renders a payload for diagnostics. See [`DescriptorType::display`].
pub type DisplayFn = fn(&mut TablesDisplay, &mut BitReader, &str, &DescriptorContext);

/// Everything the registry knows about one descriptor type.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub edid: Edid,
    pub xml_name: &'static str,
    pub factory: Factory,
    pub display: DisplayFn,
}

fn new_boxed<T: DescriptorType>() -> Box<dyn Descriptor> {
    Box::new(T::default())
}

impl Registration {
    pub fn of<T: DescriptorType>() -> Self {
        Registration {
            edid: T::EDID,
            xml_name: T::XML_NAME,
            factory: new_boxed::<T>,
            display: T::display,
        }
    }
}

/// Lookup tables from identifiers and names to registrations.
#[derive(Debug, Default)]
pub struct Registry {
    registrations: Vec<Registration>,
    /// Indexes into `registrations` per tag, in registration order.
    by_tag: BTreeMap<u8, Vec<usize>>,
    by_name: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Adds a registration.
    ///
    /// A registration whose scope overlaps an earlier one, or whose element
    /// name is already taken, is refused: the earlier one stays in force and
    /// the conflict is logged once here.
    pub fn register(&mut self, registration: Registration) -> Result<(), RegistrationError> {
        let tag = registration.edid.tag();
        let conflict = self
            .candidates(tag)
            .find(|existing| existing.edid.overlaps(&registration.edid));
        if let Some(existing) = conflict {
            let err = RegistrationError::Conflict {
                new: registration.edid,
                new_name: registration.xml_name,
                existing: existing.edid,
                existing_name: existing.xml_name,
            };
            log::error!("descriptor registration refused: {err}");
            return Err(err);
        }
        if registration.xml_name == GENERIC_DESCRIPTOR_NAME
            || self.by_name.contains_key(registration.xml_name)
        {
            let err = RegistrationError::DuplicateName(registration.xml_name);
            log::error!("descriptor registration refused: {err}");
            return Err(err);
        }

        let index = self.registrations.len();
        self.registrations.push(registration);
        self.by_tag.entry(tag).or_default().push(index);
        self.by_name.insert(registration.xml_name, index);
        log::trace!("registered {} as <{}>", registration.edid, registration.xml_name);
        Ok(())
    }

    /// Registers a descriptor type. Same rules as [`register`](Self::register).
    pub fn add<T: DescriptorType>(&mut self) -> Result<(), RegistrationError> {
        self.register(Registration::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// All registrations, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    fn candidates(&self, tag: u8) -> impl Iterator<Item = &Registration> {
        self.by_tag
            .get(&tag)
            .into_iter()
            .flatten()
            .map(move |&index| &self.registrations[index])
    }

    /// Finds the registration for `tag` found in `context`.
    ///
    /// Within one step, the earliest registration wins.
    pub fn resolve(&self, tag: u8, context: &DescriptorContext) -> Option<&Registration> {
        [EdidKind::TableSpecific, EdidKind::Private, EdidKind::Regular]
            .into_iter()
            .find_map(|kind| {
                self.candidates(tag)
                    .find(|r| r.edid.kind() == kind && r.edid.matches(tag, context))
            })
    }

    /// Registration for a text element name. Names match exactly.
    pub fn by_xml_name(&self, name: &str) -> Option<&Registration> {
        self.by_name.get(name).map(|&index| &self.registrations[index])
    }

    /// Creates a cleared instance for `tag` found in `context`, or the opaque
    /// fallback when no registration matches.
    pub fn create(&self, tag: u8, context: &DescriptorContext) -> Box<dyn Descriptor> {
        match self.resolve(tag, context) {
            Some(registration) => (registration.factory)(),
            None => {
                log::debug!("no registration for tag 0x{tag:02X} in {context:?}, keeping it opaque");
                Box::new(UnknownDescriptor::new(tag))
            }
        }
    }

    /// Decodes a raw descriptor into its most specific type.
    pub fn decode(
        &self,
        raw: &RawDescriptor,
        lookup: &DescriptorContext,
        context: &Context,
    ) -> Result<Box<dyn Descriptor>, DecodeError> {
        let mut descriptor = self.create(raw.tag(), lookup);
        descriptor.deserialize(raw, context)?;
        Ok(descriptor)
    }

    /// Builds a descriptor from its text form.
    ///
    /// `<generic_descriptor>` always gives the opaque fallback. Any other
    /// element must name a registered type.
    pub fn from_xml(
        &self,
        element: &Element,
        context: &Context,
    ) -> Result<Box<dyn Descriptor>, XmlError> {
        if element.name() == GENERIC_DESCRIPTOR_NAME {
            return Ok(Box::new(UnknownDescriptor::from_xml(element)?));
        }
        let registration = self
            .by_xml_name(element.name())
            .ok_or_else(|| XmlError::UnknownName(element.name().to_string()))?;
        let mut descriptor = (registration.factory)();
        descriptor.load_xml(element, context)?;
        Ok(descriptor)
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Process-wide registry holding every built-in descriptor type.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(crate::registry_defaults::build_default_registry)
}
