use anyhow::Result;
use clap::Parser;
use onedd::{Coordinate, GridReader};

/// Prints the daily precipitation of one grid cell across 1DD files.
#[derive(Parser)]
struct Args {
    /// Latitude in degrees north
    #[clap(allow_negative_numbers = true)]
    latitude: f64,
    /// Longitude in degrees east
    #[clap(allow_negative_numbers = true)]
    longitude: f64,
    /// Input file paths
    #[clap(required = true)]
    files: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let target = Coordinate::new(args.latitude, args.longitude);

    println!("date\tlatitude\tlongitude\tprecipitation");
    for path in &args.files {
        let mut reader = GridReader::from_path(path)?;
        let coordinates = reader.coordinates()?;
        let scheme = coordinates.scheme();
        let cell = scheme
            .cell_index(target)
            .ok_or_else(|| anyhow::anyhow!("{:?} is not on the grid", target))?;
        let center = scheme.coordinate(cell);

        for day in reader.iter()? {
            let day = day?;
            let precipitation = day.readings()[cell]
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!(
                "{}\t{}\t{}\t{}",
                day.date(),
                center.latitude,
                center.longitude,
                precipitation
            );
        }
    }
    Ok(())
}
