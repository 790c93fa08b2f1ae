//! Example building a descriptor loop, printing it in every form, and
//! rebuilding it from its XML text.

use tsdesc::context::PDS_EACEM;
use tsdesc::descriptors::{EacemLogicalChannelNumberDescriptor, LogicalChannelNumber};
use tsdesc::*;

fn main() {
    let ctx = Context::new(Standards::DVB);

    // Build a list from typed descriptors. The private descriptor gets its
    // private_data_specifier_descriptor automatically.
    let mut list = DescriptorList::new(None);
    let lcn = EacemLogicalChannelNumberDescriptor {
        entries: vec![LogicalChannelNumber {
            service_id: 0x1234,
            visible: true,
            lcn: 5,
        }],
    };
    list.add_descriptor(&lcn, &ctx).unwrap();
    list.push(RawDescriptor::new(0xE0, vec![0xCA, 0xFE]).unwrap());

    let bytes = list.to_bytes();
    println!("Binary: {}", data_encoding::HEXUPPER.encode(&bytes));
    assert_eq!(list.private_data_specifier(1, &ctx), PDS_EACEM);

    // Diagnostic text
    let mut disp = TablesDisplay::new(ctx);
    disp.display_descriptor_list(registry::global(), &list, "  ");
    println!("\nDisplay:\n{}", disp.output());

    // XML text
    let mut root = Element::new("tsduck");
    list.to_xml(registry::global(), &ctx, &mut root);
    let document = root.to_xml_string().unwrap();
    println!("XML:\n{document}\n");

    // And back
    let parsed = Element::parse_xml(&document).unwrap();
    let (rebuilt, errors) = DescriptorList::from_xml(&parsed, None, registry::global(), &ctx);
    assert!(errors.is_empty());
    assert_eq!(rebuilt.to_bytes(), bytes);

    println!("Successfully round-tripped through XML!");
}

