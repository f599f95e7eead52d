use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use sat_pointing::config::{Config, SessionConfig};
use sat_pointing::output::{write_records, write_records_to_path, OutputFormat};

#[derive(Parser)]
#[command(name = "sat-pointing")]
#[command(about = "Antenna pointing angles from orbital element sets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a session file
    Validate { config: String },
    /// Generate pointing records for a session file
    Generate {
        config: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the output format of the session file
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Sample on the calling thread only
        #[arg(long)]
        sequential: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Generate {
            config,
            output,
            format,
            sequential,
        } => generate(&config, output, format, sequential),
    }
}

fn load_session(path: &str) -> Option<SessionConfig> {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            return None;
        }
    };
    match config.session() {
        Ok(session) => Some(session),
        Err(e) => {
            eprintln!("Invalid session: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(session) = load_session(path) else {
        return ExitCode::FAILURE;
    };

    let elements = &session.elements;
    println!("Session is valid ({} ticks)", session.tick_count);
    println!(
        "  satellite: {} ({}), epoch {}, period {:.2} min",
        elements.display_name(),
        elements.norad_id,
        elements.epoch,
        elements.period_minutes()
    );
    println!(
        "  station: {}{:.6}, {:.6}, {:.3} km",
        session
            .station_name
            .as_deref()
            .map(|n| format!("{} @ ", n))
            .unwrap_or_default(),
        session.observer.latitude_deg(),
        session.observer.longitude_deg(),
        session.observer.height_km()
    );
    println!(
        "  window: {} .. {} every {}",
        session.window.start,
        session.window.end,
        humantime::format_duration(session.window.cadence.to_std().unwrap_or_default())
    );
    match &session.refraction {
        Some(r) => println!(
            "  refraction: {} ({:.1} C, {:.2} mbar)",
            r.model, r.parameters.temperature_c, r.parameters.pressure_mbar
        ),
        None => println!("  refraction: disabled"),
    }
    if let Some(tilt) = &session.tilt {
        println!(
            "  tilt: {:.3} deg about azimuth {:.3}",
            tilt.angle_deg, tilt.axis_azimuth_deg
        );
    }
    println!("  output: {}", session.output.format);
    ExitCode::SUCCESS
}

fn generate(
    path: &str,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    sequential: bool,
) -> ExitCode {
    let Some(session) = load_session(path) else {
        return ExitCode::FAILURE;
    };

    let mut sampler = session.sampler().parallel(session.parallel && !sequential);
    let records = match sampler.run() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Sampling failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = session.output;
    if let Some(format) = format {
        options.format = format;
    }

    let written = match &output {
        Some(file) => write_records_to_path(file, records, &options),
        None => write_records(io::stdout().lock(), records, &options),
    };
    match written {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
