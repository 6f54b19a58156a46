use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use flight_counter::{Airlines, FlightTally, Report};
use tracing_subscriber::EnvFilter;

/// Flight Counter
///
/// Prints the number of flights per airline found in a flight data file.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// The file containing the flight data
    #[clap(short, long, default_value = "flights10.dat")]
    flights: PathBuf,

    /// The file containing the airline data
    #[clap(short, long, default_value = "airlines.dat")]
    airlines: PathBuf,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let airlines = Airlines::from_path(&args.airlines)?;
    let tally = FlightTally::from_path(&args.flights, &airlines)?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", Report::new(&tally, &airlines))?;
    stdout.flush()
}
