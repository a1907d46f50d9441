//! Bedfinder CLI
//!
//! Works directly on the JSON data file the server uses with the
//! `json_file` backend: seed it, search it and manage bookings offline.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bedfinder_core::{
    seed::{ensure_sample_data, AdminSeed, SeedTargets},
    AdminProfile, AdminRepository, BedMatch, BlogRepository, BookingRepository, BookingStatus,
    HospitalRepository, JsonFileStore, RecordStore, SearchCriteria,
};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(
    name = "bedfinder-cli",
    version,
    about = "Inspect and maintain a Bedfinder JSON data file"
)]
struct Cli {
    /// Path of the JSON data file
    #[arg(long, env = "BEDFINDER_STORE", default_value = "hospital_data.json", global = true)]
    store: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Populate empty tables with sample hospitals, blog posts and an admin account
    Seed {
        #[arg(long, default_value = "admin")]
        admin_username: String,
        #[arg(long, env = "BEDFINDER_ADMIN_PASSWORD", default_value = "admin123")]
        admin_password: String,
    },
    /// Search hospitals and print matches as JSON
    Search(SearchArgs),
    /// Print one hospital as JSON
    Show { id: i64 },
    /// List bookings, optionally for one hospital
    Bookings {
        #[arg(long)]
        hospital: Option<i64>,
    },
    /// Set a booking's status (pending, confirmed, cancelled)
    SetStatus { booking_id: i64, status: BookingStatus },
    /// Create an admin account
    CreateAdmin {
        username: String,
        #[arg(long, env = "BEDFINDER_ADMIN_PASSWORD")]
        password: String,
    },
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    disease_type: Option<String>,
    #[arg(long)]
    bed_type: Option<String>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    max_fees: Option<f64>,
    /// Required facility; repeat for several
    #[arg(long = "facility")]
    facilities: Vec<String>,
    /// Only count bed types with free beds
    #[arg(long)]
    available: bool,
}

impl From<SearchArgs> for SearchCriteria {
    fn from(args: SearchArgs) -> Self {
        SearchCriteria {
            name: args.name,
            location: args.location,
            disease_type: args.disease_type,
            bed_type: args.bed_type,
            min_rating: args.min_rating,
            max_fees: args.max_fees,
            facilities: args.facilities,
            bed_match: if args.available {
                BedMatch::Available
            } else {
                BedMatch::Listed
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if cli.verbose {
                    "bedfinder_core=debug,bedfinder_cli=debug".into()
                } else {
                    "warn".into()
                }
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    run(cli, &mut stdout).await
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(&cli.store));
    let hospitals = HospitalRepository::new(Arc::clone(&store));
    let bookings = BookingRepository::new(Arc::clone(&store));
    let admins = AdminRepository::new(Arc::clone(&store));
    let blog = BlogRepository::new(store);

    match cli.command {
        Command::Seed {
            admin_username,
            admin_password,
        } => {
            let targets = SeedTargets {
                hospitals: &hospitals,
                admins: &admins,
                blog: &blog,
            };
            let report = ensure_sample_data(
                targets,
                AdminSeed {
                    username: &admin_username,
                    password: &admin_password,
                },
            )
            .await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Command::Search(args) => {
            let criteria = SearchCriteria::from(args);
            let matches = hospitals.search(&criteria).await?;
            let body = json!({ "total": matches.len(), "hospitals": matches });
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
        Command::Show { id } => {
            let hospital = hospitals
                .get_by_id(id)
                .await?
                .with_context(|| format!("no hospital with id {id}"))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&hospital)?)?;
        }
        Command::Bookings { hospital } => {
            let listed = match hospital {
                Some(id) => bookings.get_by_hospital(id).await?,
                None => bookings.get_all().await?,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&listed)?)?;
        }
        Command::SetStatus { booking_id, status } => {
            if !bookings.update_status(booking_id, status).await? {
                bail!("no booking with id {booking_id}");
            }
            writeln!(out, "booking {booking_id} is now {status}")?;
        }
        Command::CreateAdmin { username, password } => {
            if password.len() < 8 {
                bail!("admin password must be at least 8 characters");
            }
            let id = admins.create_admin(&username, &password).await?;
            let profile = AdminProfile { id, username };
            writeln!(out, "{}", serde_json::to_string_pretty(&profile)?)?;
        }
    }

    Ok(())
}
