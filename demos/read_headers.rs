use std::fs::File;

use anyhow::Result;
use clap::Parser;
use onedd::read_header_fields;

/// Prints the header fields of a 1DD file.
#[derive(Parser)]
struct Args {
    /// Input file path
    #[clap(required = true)]
    path: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut file = File::open(&args.path)?;
    for (key, value) in read_header_fields(&mut file)? {
        println!("{} = {}", key, value);
    }
    Ok(())
}
