use super::resolve_dialect;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

pub fn run(file: PathBuf, dialect: String) -> anyhow::Result<()> {
    let dialect = resolve_dialect(&dialect)?;

    let reader: Box<dyn Read> = if file.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(BufReader::new(File::open(&file)?))
    };

    let mut parser = match csvkit::parse_reader(reader, dialect) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("invalid header: {e}");
            std::process::exit(1);
        }
    };

    let mut count: u64 = 0;
    loop {
        match parser.next_record() {
            Ok(Some(_)) => count += 1,
            Ok(None) => break,
            Err(e) => {
                eprintln!("invalid at record {}: {e}", count + 1);
                std::process::exit(1);
            }
        }
    }

    eprintln!("OK: {count} records parsed cleanly");
    Ok(())
}
