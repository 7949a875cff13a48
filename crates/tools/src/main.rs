use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use emissions::{CountryCode, EmissionType, RecordFilter, RecordOrdering, parse_country_list};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Emissions globe: encode records and run headless simulations")]
struct Args {
    /// Globe tuning JSON (falls back to GLOBE_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Country lookup JSON (default: built-in centroid table)
    #[arg(long, global = true)]
    lookup: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate a record file and print the render points as JSON
    Encode {
        /// Records as an API page or a bare array
        records: PathBuf,

        /// Keep only this year
        #[arg(long)]
        filter_year: Option<u16>,

        /// Comma separated country codes
        #[arg(long)]
        country: Option<String>,

        /// Gas code, e.g. CO2 or F_GASES
        #[arg(long)]
        emission_type: Option<EmissionType>,
    },

    /// Print filtered records, one line each
    List {
        records: PathBuf,

        /// Substring of a country code or activity
        #[arg(long)]
        search: Option<String>,

        /// Keep the last N years only
        #[arg(long)]
        recent: Option<u16>,

        /// Reference year for --recent (default: newest year in the file)
        #[arg(long)]
        as_of: Option<u16>,

        /// Sort keys, e.g. "-emissions,country"
        #[arg(long, default_value = "-year,country")]
        ordering: String,
    },

    /// Run the globe headlessly and print the final camera and loop counters
    Simulate {
        records: PathBuf,

        #[arg(long, default_value_t = 120)]
        frames: usize,

        /// Country code to focus before the first frame
        #[arg(long)]
        focus: Option<String>,

        /// Behave as if no drawing surface exists (server-side rendering)
        #[arg(long)]
        no_surface: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = real_main() {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| env::var("GLOBE_CONFIG").ok().map(PathBuf::from));
    let config = tools::load_config(config_path.as_deref())?;
    let lookup = tools::load_lookup(args.lookup.as_deref())?;

    match args.command {
        Command::Encode {
            records,
            filter_year,
            country,
            emission_type,
        } => {
            let batch = tools::load_records(&records)?;
            let filter = RecordFilter {
                year: filter_year,
                countries: match country {
                    Some(raw) => parse_country_list(&raw).map_err(|e| e.to_string())?,
                    None => Vec::new(),
                },
                emission_types: emission_type.into_iter().collect(),
                ..RecordFilter::default()
            };
            let points = tools::encode_points(&batch, &filter, &lookup)?;
            info!(records = batch.len(), points = points.len(), "encoded");
            print_json(&points)
        }
        Command::List {
            records,
            search,
            recent,
            as_of,
            ordering,
        } => {
            let batch = tools::load_records(&records)?;
            let mut filter = match recent {
                Some(years) => match as_of.or_else(|| tools::latest_year(&batch)) {
                    Some(year) => RecordFilter::recent(years, year),
                    None => RecordFilter::default(),
                },
                None => RecordFilter::default(),
            };
            filter.search = search;
            let ordering = RecordOrdering::parse(&ordering).map_err(|e| e.to_string())?;
            let lines = tools::list_records(&batch, &filter, &ordering);
            info!(records = batch.len(), listed = lines.len(), "listed");
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
        Command::Simulate {
            records,
            frames,
            focus,
            no_surface,
        } => {
            let batch = tools::load_records(&records)?;
            let focus = focus
                .as_deref()
                .map(CountryCode::parse)
                .transpose()
                .map_err(|e| e.to_string())?;
            let report = tools::simulate(&batch, lookup, config, frames, focus.as_ref(), !no_surface)?;
            print_json(&report)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
