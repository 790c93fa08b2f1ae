use clap::{Parser, ValueEnum};
use clap_num::maybe_hex;
use data_encoding::{HEXUPPER, HEXUPPER_PERMISSIVE};
use std::fs;
use std::io::{self, Read};
use std::process;
use tsdesc::{
    Charset, Context, DescriptorList, Element, Pds, Standards, TableId, TablesDisplay, registry,
};

#[derive(Parser)]
#[command(name = "tsdesc")]
#[command(about = "Decode and encode MPEG-TS descriptor loops")]
#[command(version)]
struct Cli {
    /// Descriptor loop, as hexadecimal or base64 (see --input-format).{n}
    /// With --from-xml, path of an XML file, or '-' for standard input.
    input: String,

    /// Encoding of the binary input
    #[arg(short, long, value_enum, default_value_t = InputFormat::Hex)]
    input_format: InputFormat,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Active standards, comma separated (mpeg, dvb, scte, atsc, isdb, ...)
    #[arg(short, long, default_value = "dvb")]
    standards: Standards,

    /// Default private data specifier
    #[arg(short, long, value_parser = maybe_hex::<Pds>, default_value_t = 0)]
    pds: Pds,

    /// Id of the table the descriptor loop comes from
    #[arg(short, long, value_parser = maybe_hex::<TableId>)]
    table_id: Option<TableId>,

    /// Character set of descriptor strings (utf-8, latin1)
    #[arg(short, long, default_value = "utf-8")]
    charset: Charset,

    /// Read an XML descriptor list and print its binary form
    #[arg(long)]
    from_xml: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Hex,
    Base64,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Xml,
    Json,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let ctx = Context::new(cli.standards)
        .with_default_pds(cli.pds)
        .with_charset(cli.charset);

    let result = if cli.from_xml {
        encode_xml(&cli, &ctx)
    } else {
        decode_binary(&cli, &ctx)
    };

    if let Err(message) = result {
        match cli.output {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "error",
                    "error": message,
                });
                println!("{}", output);
            }
            _ => eprintln!("{message}"),
        }
        process::exit(1);
    }
}

fn decode_binary(cli: &Cli, ctx: &Context) -> Result<(), String> {
    let compact: String = cli.input.chars().filter(|c| !c.is_whitespace()).collect();
    let list = match cli.input_format {
        InputFormat::Hex => {
            let data = HEXUPPER_PERMISSIVE
                .decode(compact.as_bytes())
                .map_err(|e| format!("Error decoding hexadecimal string: {e}"))?;
            DescriptorList::parse(&data, cli.table_id)
        }
        InputFormat::Base64 => DescriptorList::parse_base64(&compact, cli.table_id)
            .map_err(|e| format!("Error decoding base64 string: {e}"))?,
    };

    let truncated = list.truncated_data();
    if !truncated.is_empty() {
        log::warn!("{} bytes of truncated descriptor data ignored", truncated.len());
    }

    match cli.output {
        OutputFormat::Text => {
            let mut disp = TablesDisplay::new(*ctx);
            disp.display_descriptor_list(registry::global(), &list, "");
            if !truncated.is_empty() {
                disp.line("", format_args!("Truncated data: {}", HEXUPPER.encode(truncated)));
            }
            print!("{}", disp.output());
        }
        OutputFormat::Xml => {
            let mut root = Element::new("tsduck");
            list.to_xml(registry::global(), ctx, &mut root);
            let xml = root.to_xml_string().map_err(|e| e.to_string())?;
            println!("{xml}");
        }
        OutputFormat::Json => {
            let mut root = Element::new("tsduck");
            list.to_xml(registry::global(), ctx, &mut root);
            let output = serde_json::json!({
                "status": "success",
                "data": {
                    "descriptors": root.children(),
                    "truncated_data": HEXUPPER.encode(truncated),
                },
            });
            let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
            println!("{json}");
        }
    }
    Ok(())
}

fn encode_xml(cli: &Cli, ctx: &Context) -> Result<(), String> {
    let text = if cli.input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Error reading standard input: {e}"))?;
        text
    } else {
        fs::read_to_string(&cli.input).map_err(|e| format!("Error reading {}: {e}", cli.input))?
    };

    let root = Element::parse_xml(&text).map_err(|e| e.to_string())?;
    let (list, errors) = DescriptorList::from_xml(&root, cli.table_id, registry::global(), ctx);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(format!("Invalid XML descriptors:\n{}", messages.join("\n")));
    }

    let bytes = list.to_bytes();
    match cli.output {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "status": "success",
                "data": {
                    "hex": HEXUPPER.encode(&bytes),
                    "base64": list.to_base64(),
                },
            });
            let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        _ => match cli.input_format {
            InputFormat::Hex => println!("{}", HEXUPPER.encode(&bytes)),
            InputFormat::Base64 => println!("{}", list.to_base64()),
        },
    }
    Ok(())
}
