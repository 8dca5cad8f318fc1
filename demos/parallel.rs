use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use onedd::{DayGrid, MmapReader, ParallelProcessor, ParallelReader};

/// Per-day mean and standard deviation of observed precipitation.
#[derive(Parser)]
struct Args {
    /// Input file path
    #[clap(required = true)]
    path: String,
    /// Number of threads (0 = all cores)
    #[clap(short = 'T', long, default_value_t = 0)]
    threads: usize,
}

/// Mean and sample standard deviation, or `None` with fewer than two values.
fn summarize(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, var.sqrt()))
}

#[derive(Clone, Default)]
pub struct DaySummary {
    local: Vec<(chrono::NaiveDate, f64, f64)>,
    global: Arc<Mutex<Vec<(chrono::NaiveDate, f64, f64)>>>,
}
impl DaySummary {
    pub fn rows(&self) -> Vec<(chrono::NaiveDate, f64, f64)> {
        let mut rows = self.global.lock().unwrap().clone();
        rows.sort_by_key(|row| row.0);
        rows
    }
}
impl ParallelProcessor for DaySummary {
    fn process_day(&mut self, day: DayGrid) -> onedd::Result<()> {
        let values: Vec<f64> = day.readings().iter().flatten().map(|v| f64::from(*v)).collect();
        match summarize(&values) {
            Some((mean, sd)) => self.local.push((day.date(), mean, sd)),
            None => tracing::debug!(date = %day.date(), observed = values.len(), "skipping sparse day"),
        }
        Ok(())
    }
    fn on_batch_complete(&mut self) -> onedd::Result<()> {
        let mut guard = self.global.lock().unwrap();
        guard.append(&mut self.local);
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let reader = MmapReader::new(&args.path)?;
    let proc = DaySummary::default();

    let start = Instant::now();
    reader.process_parallel(proc.clone(), args.threads)?;
    let elapsed = start.elapsed();

    println!("{:>10} {:>8} {:>8}", "date", "mean", "sd");
    for (date, mean, sd) in proc.rows() {
        println!("{:>10} {:>8.2} {:>8.2}", date.format("%Y-%m-%d"), mean, sd);
    }
    eprintln!("Processing duration: {:.5}s", elapsed.as_secs_f64());
    Ok(())
}
