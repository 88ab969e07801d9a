use super::resolve_dialect;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

pub fn run(file: PathBuf, dialect: String, rows: u64) -> anyhow::Result<()> {
    let dialect = resolve_dialect(&dialect)?;

    let reader: Box<dyn Read> = if file.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(BufReader::new(File::open(&file)?))
    };

    let mut parser = csvkit::parse_reader(reader, dialect)?;
    let header: Vec<String> = parser
        .header()
        .map(|h| h.names().to_vec())
        .unwrap_or_default();
    if !header.is_empty() {
        println!("{}", header.join(" | "));
        println!("{}", "-".repeat(header.join(" | ").len()));
    }

    let mut printed = 0u64;
    while printed < rows {
        let Some(record) = parser.next_record()? else {
            break;
        };
        println!("{}", record.iter().collect::<Vec<_>>().join(" | "));
        printed += 1;
    }

    if printed == 0 {
        eprintln!("(no records)");
    } else if printed == rows {
        eprintln!("... (showing first {rows} records)");
    }

    Ok(())
}
