//! Read HTML on stdin, print the extracted content on stdout.
//!
//! Usage: `extract_stdin [txt|csv|json|xml|xmltei] < page.html`

use std::io::Read;
use std::process::ExitCode;

use textharvest::{extract_bytes_with_options, ExtractionOptions, OutputFormat};

fn main() -> ExitCode {
    env_logger::init();

    let format = match std::env::args().nth(1).as_deref() {
        None | Some("txt") => OutputFormat::Txt,
        Some("csv") => OutputFormat::Csv,
        Some("json") => OutputFormat::Json,
        Some("xml") => OutputFormat::Xml,
        Some("xmltei") => OutputFormat::XmlTei,
        Some(other) => {
            eprintln!("unknown output format: {other}");
            return ExitCode::FAILURE;
        }
    };

    let mut input = Vec::new();
    if std::io::stdin().read_to_end(&mut input).is_err() {
        eprintln!("failed to read stdin");
        return ExitCode::FAILURE;
    }

    let opts = ExtractionOptions::default();
    match extract_bytes_with_options(&input, &opts, format, false) {
        Some(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("no content extracted");
            ExitCode::FAILURE
        }
    }
}
