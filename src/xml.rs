//! Editable text mirror of descriptors.
//!
//! Each descriptor maps to one [`Element`]: scalar fields become attributes,
//! repeated entries become child elements and opaque byte arrays become
//! child elements holding hexadecimal text. Elements can be written to and
//! parsed from XML documents.

use crate::error::XmlError;
use data_encoding::{HEXUPPER, HEXUPPER_PERMISSIVE};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Unbounded child count for [`Element::get_children`].
pub const UNLIMITED: usize = usize::MAX;

/// One node of the text tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Element {
    name: String,
    /// Attributes in insertion order.
    attributes: Vec<(String, String)>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    children: Vec<Element>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    text: Option<String>,
}

/// Parses an unsigned integer in decimal or `0x` hexadecimal notation.
///
/// Digit group separators `,` and `_` are ignored.
pub fn parse_int(value: &str) -> Option<u64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        cleaned.parse::<u64>().ok()
    }
}

/// Decodes hexadecimal text, ignoring any whitespace.
pub fn parse_hexa(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    HEXUPPER_PERMISSIVE.decode(compact.as_bytes()).ok()
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attribute value, names compare case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing a previous value in place.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Sets an integer attribute, in decimal or in hexadecimal with the full
    /// width of `T` (`0x05` for a `u8`).
    pub fn set_int_attribute<T>(&mut self, name: &str, value: T, hexa: bool)
    where
        T: Copy + Into<u64>,
    {
        let value: u64 = value.into();
        let text = if hexa {
            format!("0x{:0width$X}", value, width = 2 * std::mem::size_of::<T>())
        } else {
            value.to_string()
        };
        self.set_attribute(name, text);
    }

    pub fn set_bool_attribute(&mut self, name: &str, value: bool) {
        self.set_attribute(name, if value { "true" } else { "false" });
    }

    fn missing(&self, attribute: &str) -> XmlError {
        XmlError::MissingAttribute {
            element: self.name.clone(),
            attribute: attribute.to_string(),
        }
    }

    fn invalid(&self, attribute: &str, value: &str) -> XmlError {
        XmlError::InvalidValue {
            element: self.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    /// Reads an integer attribute.
    ///
    /// A missing optional attribute yields `default`. Any present value must
    /// parse and fall in `min..=max`.
    pub fn get_int_attribute<T>(
        &self,
        name: &str,
        required: bool,
        default: T,
        min: T,
        max: T,
    ) -> Result<T, XmlError>
    where
        T: Copy + Into<u64> + TryFrom<u64>,
    {
        let Some(text) = self.attribute(name) else {
            return if required {
                Err(self.missing(name))
            } else {
                Ok(default)
            };
        };
        let value = parse_int(text).ok_or_else(|| self.invalid(name, text))?;
        let (min, max): (u64, u64) = (min.into(), max.into());
        if value < min || value > max {
            return Err(XmlError::OutOfRange {
                element: self.name.clone(),
                attribute: name.to_string(),
                value: text.to_string(),
                min,
                max,
            });
        }
        T::try_from(value).map_err(|_| self.invalid(name, text))
    }

    /// Reads an integer attribute over the full range of `T`.
    pub fn get_full_int_attribute<T>(&self, name: &str, required: bool) -> Result<T, XmlError>
    where
        T: Copy + Into<u64> + TryFrom<u64> + Default + Bounded,
    {
        self.get_int_attribute(name, required, T::default(), T::MIN_VALUE, T::MAX_VALUE)
    }

    pub fn get_bool_attribute(
        &self,
        name: &str,
        required: bool,
        default: bool,
    ) -> Result<bool, XmlError> {
        match self.attribute(name) {
            None if required => Err(self.missing(name)),
            None => Ok(default),
            Some(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(true),
                "false" | "no" | "0" | "off" => Ok(false),
                _ => Err(self.invalid(name, text)),
            },
        }
    }

    /// Reads a string attribute whose length, in characters, must be in
    /// `min_len..=max_len`.
    pub fn get_attribute(
        &self,
        name: &str,
        required: bool,
        default: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, XmlError> {
        let value = match self.attribute(name) {
            Some(text) => text.to_string(),
            None if required => return Err(self.missing(name)),
            None => return Ok(default.to_string()),
        };
        let length = value.chars().count();
        if length < min_len || length > max_len {
            return Err(XmlError::InvalidLength {
                element: self.name.clone(),
                attribute: name.to_string(),
                length,
                min: min_len,
                max: max_len,
            });
        }
        Ok(value)
    }

    pub fn add_element(&mut self, name: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// First child with the given name.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| child.name.eq_ignore_ascii_case(name))
    }

    /// All children with the given name, checking that there are between
    /// `min` and `max` of them.
    pub fn get_children(
        &self,
        name: &str,
        min: usize,
        max: usize,
    ) -> Result<Vec<&Element>, XmlError> {
        let found: Vec<&Element> = self
            .children
            .iter()
            .filter(|child| child.name.eq_ignore_ascii_case(name))
            .collect();
        if found.len() < min || found.len() > max {
            return Err(XmlError::ChildCount {
                element: self.name.clone(),
                child: name.to_string(),
                found: found.len(),
                min,
                max,
            });
        }
        Ok(found)
    }

    /// Fails on any child whose name is not in `allowed`.
    pub fn check_children(&self, allowed: &[&str]) -> Result<(), XmlError> {
        match self
            .children
            .iter()
            .find(|child| !allowed.iter().any(|a| child.name.eq_ignore_ascii_case(a)))
        {
            Some(child) => Err(XmlError::UnexpectedElement {
                element: self.name.clone(),
                found: child.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Sets the text of this element to the hexadecimal form of `data`.
    pub fn set_hexa_text(&mut self, data: &[u8]) {
        self.text = Some(HEXUPPER.encode(data));
    }

    /// Decodes the text of this element as hexadecimal, `min..=max` bytes.
    pub fn get_hexa_text(&self, min: usize, max: usize) -> Result<Vec<u8>, XmlError> {
        let text = self.text.as_deref().unwrap_or("");
        let data = parse_hexa(text).ok_or_else(|| self.invalid("#text", text))?;
        if data.len() < min || data.len() > max {
            return Err(XmlError::InvalidLength {
                element: self.name.clone(),
                attribute: "#text".to_string(),
                length: data.len(),
                min,
                max,
            });
        }
        Ok(data)
    }

    /// Adds a child element holding `data` as hexadecimal text.
    pub fn add_hexa_text_child(&mut self, name: &str, data: &[u8], only_if_not_empty: bool) {
        if !(only_if_not_empty && data.is_empty()) {
            self.add_element(name).set_hexa_text(data);
        }
    }

    /// Reads the hexadecimal text of the child `name`.
    ///
    /// A missing optional child yields an empty vector.
    pub fn get_hexa_text_child(
        &self,
        name: &str,
        required: bool,
        min: usize,
        max: usize,
    ) -> Result<Vec<u8>, XmlError> {
        let children = self.get_children(name, usize::from(required), 1)?;
        match children.first() {
            Some(child) => child.get_hexa_text(min, max),
            None => Ok(Vec::new()),
        }
    }

    /// Writes this element as an XML document.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| XmlError::Syntax(e.to_string()))?;
        self.write_xml(&mut writer)
            .map_err(|e| XmlError::Syntax(e.to_string()))?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    fn write_xml<W: std::io::Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() && self.text.is_none() {
            return writer.write_event(Event::Empty(start));
        }
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_xml(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))
    }

    /// Parses an XML document and returns its root element.
    pub fn parse_xml(input: &str) -> Result<Element, XmlError> {
        let syntax = |e: quick_xml::Error| XmlError::Syntax(e.to_string());

        let mut reader = Reader::from_str(input);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(syntax)? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Syntax("unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(syntax)?;
                    if let Some(top) = stack.last_mut() {
                        top.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text
                            .get_or_insert_with(String::new)
                            .push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Syntax("unclosed element".to_string()));
        }
        root.ok_or_else(|| XmlError::Syntax("no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element, XmlError> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| XmlError::Syntax(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| XmlError::Syntax(e.to_string()))?;
            element.attributes.push((key, value.into_owned()));
        }
        Ok(element)
    }

    fn attach(
        stack: &mut [Element],
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<(), XmlError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(XmlError::Syntax("multiple root elements".to_string())),
        }
        Ok(())
    }
}

/// Full value range of an integer attribute type.
pub trait Bounded {
    const MIN_VALUE: Self;
    const MAX_VALUE: Self;
}

macro_rules! impl_bounded {
    ($($t:ty),*) => {
        $(impl Bounded for $t {
            const MIN_VALUE: Self = <$t>::MIN;
            const MAX_VALUE: Self = <$t>::MAX;
        })*
    };
}

impl_bounded!(u8, u16, u32, u64);
