//! Tipper Maint - fleet maintenance tracker
//!
//! Classifies each tipper as OK / DUE SOON / OVERDUE from its hour meter,
//! summarizes the fleet, and records services.
//!
//! # Usage
//!
//! ```bash
//! # Serve the dashboard API
//! tipper-maint serve --addr 0.0.0.0:8080
//!
//! # Print the fleet summary
//! tipper-maint summary
//!
//! # Onboard units from a JSON array of unit records
//! tipper-maint import --file units.json
//!
//! # Log a service
//! tipper-maint log-service --unit T3 --service-type 1000hrs --date 2025-03-01
//! ```
//!
//! # Environment Variables
//!
//! - `TIPPER_CONFIG`: Path to fleet_config.toml
//! - `TIPPER_SERVER_ADDR`: Server bind address (overrides config)
//! - `TIPPER_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use tipper_maint::api::{create_app, DashboardState};
use tipper_maint::{
    FleetConfig, FleetSnapshot, MaintenanceTracker, ServiceEvent, ServiceType, SledRepository,
    StatusKind, UnitRecord,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "tipper-maint")]
#[command(about = "Tipper fleet maintenance tracker")]
#[command(version)]
struct CliArgs {
    /// Path to fleet_config.toml (default: $TIPPER_CONFIG, then ./fleet_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the sled database directory from config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the dashboard HTTP API
    Serve {
        /// Override the server address (default: config, then "0.0.0.0:8080")
        #[arg(short, long, env = "TIPPER_SERVER_ADDR")]
        addr: Option<String>,
    },

    /// Print the fleet summary
    Summary,

    /// Onboard or replace units from a JSON array of unit records
    Import {
        #[arg(long)]
        file: PathBuf,
    },

    /// Record a completed service against a unit
    LogService {
        #[arg(long)]
        unit: String,

        /// Interval label from the config (e.g. "1000hrs") or "Other"
        #[arg(long)]
        service_type: String,

        /// Service date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Free-text notes (required for "Other")
        #[arg(long)]
        notes: Option<String>,

        /// Hours until the next service, for "Other" only
        #[arg(long)]
        interval_hours: Option<f64>,
    },
}

// ============================================================================
// Startup
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<FleetConfig> {
    match path {
        Some(p) => FleetConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(FleetConfig::load()),
    }
}

fn open_tracker(config: &FleetConfig, db_override: Option<PathBuf>) -> Result<MaintenanceTracker> {
    let db_path = db_override.unwrap_or_else(|| config.storage.db_path.clone());
    let repository = SledRepository::open(&db_path)
        .with_context(|| format!("Failed to open fleet database at {}", db_path.display()))?;
    info!(path = %db_path.display(), "Fleet database opened");
    Ok(MaintenanceTracker::from_config(Arc::new(repository), config))
}

// ============================================================================
// Commands
// ============================================================================

async fn serve(config: &FleetConfig, tracker: MaintenanceTracker, addr: Option<String>) -> Result<()> {
    let server_addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let app = create_app(DashboardState::new(tracker, config.fleet.clone()));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;

    info!(addr = %server_addr, fleet = %config.fleet.name, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn print_summary(config: &FleetConfig, snapshot: &FleetSnapshot) {
    let summary = &snapshot.summary;
    println!("{} ({})", config.fleet.name, config.fleet.site);
    println!(
        "Units: {}  Overdue: {}  Due soon: {}  OK: {}",
        summary.total,
        summary.count(StatusKind::Overdue),
        summary.count(StatusKind::DueSoon),
        summary.count(StatusKind::Ok)
    );
    println!();
    println!("{:<8} {:<28} {:>10} {:>10} {:>10}  STATUS", "ID", "LABEL", "CURRENT", "DUE AT", "REMAINING");
    for unit in &snapshot.units {
        let r = &unit.record;
        println!(
            "{:<8} {:<28} {:>10.0} {:>10.0} {:>10.0}  {}",
            r.id,
            r.label,
            r.current_meter,
            r.due_at_meter,
            r.remaining_hours(),
            unit.status
        );
    }

    for kind in [StatusKind::Overdue, StatusKind::DueSoon] {
        let ids = summary.ids(kind);
        if !ids.is_empty() {
            println!();
            println!("{}: {}", kind, ids.join(", "));
        }
    }

    let expiring: Vec<String> = summary
        .filters
        .iter()
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(category, ids)| format!("{} [{}]", category, ids.join(", ")))
        .collect();
    if !expiring.is_empty() {
        println!();
        println!("Filters expiring: {}", expiring.join("; "));
    }
}

fn import(tracker: &MaintenanceTracker, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<UnitRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse unit records from {}", file.display()))?;

    let count = tracker.import(&records).context("Import rejected")?;
    println!("Imported {} unit(s)", count);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;
    let tracker = open_tracker(&config, args.db)?;

    match args.command {
        SubCommand::Serve { addr } => serve(&config, tracker, addr).await?,
        SubCommand::Summary => {
            let snapshot = tracker.snapshot().context("Failed to load fleet")?;
            print_summary(&config, &snapshot);
        }
        SubCommand::Import { file } => import(&tracker, &file)?,
        SubCommand::LogService {
            unit,
            service_type,
            date,
            notes,
            interval_hours,
        } => {
            let event = ServiceEvent {
                unit_id: unit,
                service_type: ServiceType::parse(&service_type),
                date,
                notes,
                interval_hours,
            };
            let updated = tracker.log_service(&event).context("Service not logged")?;
            println!(
                "{}: serviced at {:.0}, next due at {:.0} ({})",
                updated.record.id,
                updated.record.last_service_meter,
                updated.record.due_at_meter,
                updated.status
            );
        }
    }

    Ok(())
}
