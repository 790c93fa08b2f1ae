//! Human-readable rendering of descriptors.
//!
//! [`TablesDisplay`] collects the diagnostic text of descriptor payloads.
//! Rendering works on the raw bytes through each type's display function, so
//! it shows payloads that would fail a strict decode, as far as they go.

use crate::bit_reader::BitReader;
use crate::context::{Context, DescriptorContext};
use crate::descriptor::RawDescriptor;
use crate::descriptor_list::DescriptorList;
use crate::fmt::hex_dump;
use crate::registry::Registry;
use std::fmt::{Display, Write};

/// Output sink for diagnostic rendering.
#[derive(Debug, Clone, Default)]
pub struct TablesDisplay {
    context: Context,
    out: String,
}

impl TablesDisplay {
    pub fn new(context: Context) -> Self {
        TablesDisplay {
            context,
            out: String::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Writes one line prefixed with `margin`.
    pub fn line(&mut self, margin: &str, text: impl Display) {
        // Writing to a String cannot fail.
        let _ = writeln!(self.out, "{margin}{text}");
    }

    /// Writes a raw block of text, which must end with a newline if not empty.
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }

    /// Displays up to `size` bytes of private data with a title, as a single
    /// line when short and as a hex dump otherwise.
    pub fn display_private_data(
        &mut self,
        title: &str,
        buf: &mut BitReader,
        size: usize,
        margin: &str,
    ) {
        let size = size.min(buf.remaining_bytes());
        let data = buf.get_bytes(size);
        if data.is_empty() {
            return;
        }
        if data.len() <= 8 {
            let hex: Vec<String> = data.iter().map(|b| format!("{b:02X}")).collect();
            self.line(margin, format_args!("{title} ({} bytes): {}", data.len(), hex.join(" ")));
        } else {
            self.line(margin, format_args!("{title} ({} bytes):", data.len()));
            let dump = hex_dump(&data, &format!("{margin}  "));
            self.raw(&dump);
        }
    }

    /// Dumps whatever the display function left unread.
    pub fn display_extra_data(&mut self, buf: &mut BitReader, margin: &str) {
        if buf.error() || buf.remaining_bytes() == 0 {
            return;
        }
        let extra = buf.get_remaining_bytes();
        self.line(margin, format_args!("Extraneous {} bytes:", extra.len()));
        let dump = hex_dump(&extra, &format!("{margin}  "));
        self.raw(&dump);
    }

    /// Displays one descriptor: a header line, then either the registered
    /// rendering or a hex dump of the payload.
    pub fn display_descriptor(
        &mut self,
        registry: &Registry,
        raw: &RawDescriptor,
        index: usize,
        lookup: &DescriptorContext,
        margin: &str,
    ) {
        let registration = registry.resolve(raw.tag(), lookup);
        let name = registration.map_or("unknown descriptor", |r| r.xml_name);
        self.line(
            margin,
            format_args!(
                "- Descriptor {index}: {name}, tag 0x{tag:02X} ({tag}), {size} bytes",
                tag = raw.tag(),
                size = raw.payload().len()
            ),
        );

        let inner = format!("{margin}  ");
        match registration {
            Some(registration) => {
                let mut buf = BitReader::new(raw.payload());
                (registration.display)(self, &mut buf, &inner, lookup);
                self.display_extra_data(&mut buf, &inner);
            }
            None => {
                let dump = hex_dump(raw.payload(), &inner);
                self.raw(&dump);
            }
        }
    }

    /// Displays every descriptor of a list, each with the private data
    /// specifier in force at its position.
    pub fn display_descriptor_list(&mut self, registry: &Registry, list: &DescriptorList, margin: &str) {
        let context = self.context;
        for (index, raw) in list.iter().enumerate() {
            let lookup = list.descriptor_context(index, &context);
            self.display_descriptor(registry, raw, index, &lookup, margin);
        }
    }
}
