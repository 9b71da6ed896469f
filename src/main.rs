use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};

use simplelog::{info, error, debug, LevelFilter, TerminalMode, ColorChoice, Config, TermLogger};

use epanet_wq::error::Result;
use epanet_wq::hydraulics::file::HydraulicFile;
use epanet_wq::input::NetworkFormat;
use epanet_wq::model::network::Network;
use epanet_wq::quality::output::{BinaryQualityWriter, QualityOutput, QualityResults, StatisticKind};
use epanet_wq::quality::QualitySim;

#[derive(Parser, Debug)]
#[command(
  author = "Abel Heinsbroek (Vitens N.V.)",
  version = "0.1.0",
  about = "Water quality transport, tank and pump energy simulation for EPANET networks, written in Rust"
)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Run a water quality simulation on a persisted hydraulic solution
  Run {
    /// Network file (.json or .msgpack/.mpk)
    network_file: String,
    /// Binary hydraulics file
    hydraulics_file: String,
    /// Output file: binary quality output, or .json/.mpk results
    output_file: String,
    /// Print verbose output during the simulation
    #[arg(short, long)]
    verbose: bool,
    /// Suppress all output except for errors
    #[arg(long)]
    quiet: bool,
  },
  /// Compute time statistics of a binary quality output file
  Stats {
    /// Binary quality output file
    output_file: String,
    /// Statistic to compute (average, minimum, maximum, range)
    #[arg(short, long, default_value = "average")]
    kind: StatisticKind,
  },
  /// Convert a network file to a different format
  Convert {
    /// Input file (.json or .msgpack/.mpk)
    input_file: String,
    /// Output file (.json or .msgpack/.mpk)
    output_file: String,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Determine log level based on command
  let log_level = match &cli.command {
    Commands::Run { quiet, verbose, .. } => {
      if *quiet { LevelFilter::Error }
      else if *verbose { LevelFilter::Debug }
      else { LevelFilter::Info }
    }
    _ => LevelFilter::Info,
  };

  // Initialize the logger with colors
  if TermLogger::init(log_level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto).is_err() {
    eprintln!("Failed to initialize logger");
  }

  let result = match cli.command {
    Commands::Run { network_file, hydraulics_file, output_file, .. } => {
      run_quality(&network_file, &hydraulics_file, &output_file)
    }
    Commands::Stats { output_file, kind } => print_statistics(&output_file, kind),
    Commands::Convert { input_file, output_file } => convert_network(&input_file, &output_file),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{}", e);
      ExitCode::FAILURE
    }
  }
}

/// Run the quality simulation of a network
fn run_quality(network_file: &str, hydraulics_file: &str, output_file: &str) -> Result<()> {
  let start_time = Instant::now();

  info!("Loading network from file: {}", network_file);
  let network = Network::read_file(network_file)?;
  let mut hydraulics = HydraulicFile::open(hydraulics_file)?;
  debug!("Inputs loaded in {:?}", start_time.elapsed());

  let start_time = Instant::now();
  let mut sim = QualitySim::new(&network)?;

  // structured results for .json/.mpk, binary quality output otherwise
  let periods = if NetworkFormat::from_path(Path::new(output_file)).is_ok() {
    let mut results = QualityResults::default();
    let periods = sim.simulate(&mut hydraulics, &mut results)?;
    network.write_results(&results, Some(sim.statistics()), output_file)?;
    periods
  } else {
    let mut writer = BinaryQualityWriter::create(output_file)?;
    sim.simulate(&mut hydraulics, &mut writer)?
  };
  info!("Simulated {} reporting periods in {:?}", periods, start_time.elapsed());

  let stats = sim.statistics();
  info!("Mass reacted: bulk {:.3}, wall {:.3}, tanks {:.3}; source inflow {:.3}", stats.bulk, stats.wall, stats.tank, stats.source);
  info!("Results written to {}", output_file);
  Ok(())
}

/// Print a time statistic of every node and link
fn print_statistics(output_file: &str, kind: StatisticKind) -> Result<()> {
  let mut output = QualityOutput::read(output_file)?;
  let stats = output.statistics(kind)?;
  info!("{:?} over {} of {} periods", kind, stats.periods, output.periods);

  println!("=== Nodes:");
  for (i, value) in stats.nodes.iter().enumerate() {
    println!("Node {}: {:.3}", i, value);
  }
  println!("=== Links:");
  for (i, value) in stats.links.iter().enumerate() {
    println!("Link {}: {:.3}", i, value);
  }
  Ok(())
}

/// Convert a network file to a different format
fn convert_network(input_file: &str, output_file: &str) -> Result<()> {
  let start_time = Instant::now();

  info!("Loading network from file: {}", input_file);
  let network = Network::read_file(input_file)?;

  let load_time = Instant::now();
  info!("Loaded network with {} nodes and {} links in {:?}",
    network.nodes.len(), network.links.len(), load_time.duration_since(start_time));

  info!("Converting to: {}", output_file);
  network.save_network(output_file)?;

  info!("Network saved in {:?}", load_time.elapsed());
  Ok(())
}
