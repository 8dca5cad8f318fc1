use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use onedd::{Header, Writer, CELLS_PER_DAY, HEADER_SIZE, RECORD_SIZE};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Generates a well-formed 1DD file with random precipitation.
#[derive(Parser)]
struct Args {
    /// Output file path
    #[clap(required = true)]
    path: String,
    #[clap(long, default_value_t = 1997)]
    year: i32,
    #[clap(long, default_value_t = 1)]
    month: u32,
    /// Number of days (defaults to the length of the month)
    #[clap(long)]
    days: Option<usize>,
    /// Fraction of cells left without an observation
    #[clap(long, default_value_t = 0.05)]
    missing: f64,
    #[clap(long, default_value_t = -99999.0)]
    missing_value: f64,
    #[clap(long)]
    seed: Option<u64>,
}

fn days_in_month(year: i32, month: u32) -> Option<usize> {
    let first = chrono::NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(chrono::Months::new(1))?;
    usize::try_from((next - first).num_days()).ok()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let days = match args.days {
        Some(days) => days,
        None => days_in_month(args.year, args.month)
            .ok_or_else(|| anyhow::anyhow!("invalid month {}-{}", args.year, args.month))?,
    };
    let header = Header::new(args.year, args.month, days, args.missing_value);

    let mut writer = Writer::from_path(&args.path, &header)?;
    let mut rng = if let Some(seed) = args.seed {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_os_rng()
    };

    let start = Instant::now();
    let mut readings = vec![None; CELLS_PER_DAY];
    for _ in 0..days {
        for reading in readings.iter_mut() {
            *reading = if rng.random_bool(args.missing) {
                None
            } else {
                Some(rng.random_range(0.0..50.0f32))
            };
        }
        writer.write_day(&readings)?;
    }
    writer.finish()?;
    let elapsed = start.elapsed();

    let total_bytes = HEADER_SIZE + (days * RECORD_SIZE);

    eprintln!("Finished generating {} days", days);
    eprintln!("Elapsed time: {:?}", elapsed);
    eprintln!(
        "Bandwidth: {:.2} MB/s",
        total_bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );

    Ok(())
}
