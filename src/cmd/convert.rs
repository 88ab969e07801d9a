use super::resolve_dialect;
use csvkit::{IoCharSink, PrintValue, Printer};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    from: String,
    to: String,
    progress: bool,
) -> anyhow::Result<()> {
    let from_dialect = resolve_dialect(&from)?;
    let to_dialect = resolve_dialect(&to)?;

    let reader: Box<dyn Read> = if file.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(BufReader::new(File::open(&file)?))
    };

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let start = Instant::now();
    let mut parser = csvkit::parse_reader(reader, from_dialect)?;
    let mut printer = Printer::new(IoCharSink::new(writer), to_dialect)?;

    let bar = if progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg} ({pos} records)")
                .expect("progress template is valid"),
        );
        pb.set_message("converting");
        Some(pb)
    } else {
        None
    };

    let mut count: u64 = 0;
    loop {
        let record = match parser.next_record()? {
            Some(r) => r,
            None => break,
        };
        printer.print_record(record.iter().map(PrintValue::Str))?;
        count += 1;
        if let Some(bar) = &bar {
            bar.set_position(count);
        }
    }
    printer.flush()?;

    if let Some(bar) = bar {
        bar.finish_with_message(format!("converted {count} records"));
    }

    eprintln!(
        "Converted {count} records from {from} to {to} in {:.2?}",
        start.elapsed()
    );

    Ok(())
}
