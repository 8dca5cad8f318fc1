use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use anyhow::Result;
use clap::Parser;
use onedd::GridReader;

/// Converts 1DD files to delimited text, one row per cell per day.
#[derive(Parser)]
struct Args {
    /// Input file paths (stdin if none)
    files: Vec<String>,
    /// Output file path (default: stdout)
    #[clap(short, long)]
    output: Option<String>,
    /// Field delimiter
    #[clap(short, long, default_value = "\t")]
    delimiter: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let d = &args.delimiter;
    writeln!(out, "date{d}latitude{d}longitude{d}precipitation")?;

    let paths: Vec<Option<&str>> = if args.files.is_empty() {
        vec![None]
    } else {
        args.files.iter().map(|p| Some(p.as_str())).collect()
    };
    for path in paths {
        let mut reader = GridReader::from_optional_path(path)?;
        for measurement in reader.measurements()? {
            let m = measurement?;
            let precipitation = m.precipitation.map(|v| v.to_string()).unwrap_or_default();
            writeln!(
                out,
                "{}{d}{}{d}{}{d}{}",
                m.date.format("%Y-%m-%d"),
                m.latitude,
                m.longitude,
                precipitation
            )?;
        }
        reader.close()?;
    }
    out.flush()?;
    Ok(())
}
