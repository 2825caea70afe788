//! `slots` CLI: compile availability into booking slots and plan slot updates.
//!
//! Every subcommand reads JSON (file or stdin) and writes pretty JSON (file or
//! stdout). Diagnostics go to stderr; set `RUST_LOG=debug` for detail.
//!
//! ## Usage
//!
//! ```sh
//! # Candidate slots for one day under the configured work hours
//! slots --settings settings.json candidates --date 2026-03-16
//!
//! # Availability calendar for a date range
//! slots --settings settings.json availability --from 2026-03-16 --to 2026-03-31
//!
//! # Selection → slot intervals (fails with a validation message if empty)
//! slots --settings settings.json compile -i selection.json -o slots.json
//!
//! # Slot intervals → editable selection
//! slots --settings settings.json decompile -i slots.json
//!
//! # Plan the update of a request's persisted slots
//! slots reconcile -i slots.json --current records.json
//!
//! # Apply the plan to a JSON file store
//! slots apply -i slots.json --store store.json --request-id req-1
//! ```

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::clock_time::parse_date;
use slot_engine::{
    apply_plan, compile, decompile, enable_all, find_booked_overlaps, reconcile, InMemorySlotStore,
    MonthAvailability, SchedulingSettings, SlotDraft, SlotRecord, SlotSelection,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compile availability into booking slots"
)]
struct Cli {
    /// Scheduling settings JSON file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate slots for one date
    Candidates {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Build the availability calendar for a date range
    Availability {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compile a selection into slot intervals
    Compile {
        /// Selection JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Slot length in minutes (settings default if omitted)
        #[arg(long)]
        duration: Option<u32>,
        /// Enable every candidate on every available day instead of reading `enabled`
        #[arg(long)]
        all: bool,
    },
    /// Turn slot intervals back into an editable selection
    Decompile {
        /// Slot intervals JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Plan deletes and creates for a request's persisted slots
    Reconcile {
        /// Desired slot intervals JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Current slot records JSON
        #[arg(long)]
        current: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Apply a reconciliation to a JSON file store
    Apply {
        /// Desired slot intervals JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Store file; created if missing
        #[arg(long)]
        store: String,
        /// Booking request whose slots are replaced
        #[arg(long)]
        request_id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Candidates { date, output } => {
            let candidates = settings
                .candidates_for(&date)
                .with_context(|| format!("Failed to generate candidates for {}", date))?;
            write_json(output.as_deref(), &candidates)?;
        }
        Commands::Availability { from, to, output } => {
            let availability = settings
                .availability_for_range(&from, &to)
                .context("Failed to build availability")?;
            write_json(output.as_deref(), &availability)?;
        }
        Commands::Compile {
            input,
            output,
            duration,
            all,
        } => {
            let mut selection: SlotSelection = read_json(input.as_deref())?;
            if selection.availability.is_empty() {
                selection.availability = availability_for(&settings, &selection)?;
            }
            if all {
                selection.enabled = enable_all(&selection.availability, &settings)?;
            }
            let duration = duration.unwrap_or(settings.default_slot_duration_minutes);
            let slots = compile(
                &selection.availability,
                &selection.enabled,
                duration,
                &settings.site_timezone,
            )
            .context("Failed to compile slots")?;
            info!(count = slots.len(), "compiled slots");
            write_json(output.as_deref(), &slots)?;
        }
        Commands::Decompile { input, output } => {
            let slots: Vec<SlotDraft> = read_json(input.as_deref())?;
            let selection = decompile(
                &slots,
                &settings.scheduling_availability,
                &settings.site_timezone,
            );
            write_json(output.as_deref(), &selection)?;
        }
        Commands::Reconcile {
            input,
            current,
            output,
        } => {
            let desired: Vec<SlotDraft> = read_json(input.as_deref())?;
            let current: Vec<SlotRecord> = read_json(Some(current.as_str()))?;
            warn_overlaps(&desired, &current);
            let plan = reconcile(&desired, &current);
            write_json(output.as_deref(), &plan)?;
        }
        Commands::Apply {
            input,
            store,
            request_id,
        } => {
            let desired: Vec<SlotDraft> = read_json(input.as_deref())?;
            let mut slot_store: InMemorySlotStore = if Path::new(&store).exists() {
                read_json(Some(store.as_str()))?
            } else {
                InMemorySlotStore::new()
            };
            let current = slot_store
                .records()
                .iter()
                .filter(|r| r.request_id == request_id)
                .cloned()
                .collect::<Vec<_>>();
            warn_overlaps(&desired, &current);

            let report = apply_plan(&mut slot_store, &request_id, &desired)
                .with_context(|| format!("Failed to apply slots for request {}", request_id))?;
            write_json(Some(store.as_str()), &slot_store)?;
            write_json(None, &report)?;
        }
    }

    Ok(())
}

fn load_settings(path: Option<&str>) -> Result<SchedulingSettings> {
    match path {
        Some(path) => {
            let json = read_input(Some(path))?;
            SchedulingSettings::from_json(&json)
                .with_context(|| format!("Invalid settings file: {}", path))
        }
        None => Ok(SchedulingSettings::default()),
    }
}

/// Availability for the dates a selection mentions, taken from the settings.
fn availability_for(
    settings: &SchedulingSettings,
    selection: &SlotSelection,
) -> Result<MonthAvailability> {
    let mut availability = MonthAvailability::new();
    for date in selection.enabled.keys() {
        let rule = match settings.scheduling_availability.get(date) {
            Some(rule) => rule.clone(),
            None => {
                settings.default_rule(parse_date(date)?)?
            }
        };
        availability.insert(date.clone(), rule);
    }
    Ok(availability)
}

fn warn_overlaps(desired: &[SlotDraft], current: &[SlotRecord]) {
    for overlap in find_booked_overlaps(desired, current) {
        warn!(
            booked_id = overlap.booked_id.as_str(),
            start = %overlap.desired.start,
            end = %overlap.desired.end,
            minutes = overlap.overlap_minutes,
            "desired slot overlaps a booked slot"
        );
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: Option<&str>) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| match path {
        Some(path) => format!("Invalid JSON in {}", path),
        None => "Invalid JSON on stdin".to_string(),
    })
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut pretty = serde_json::to_string_pretty(value)?;
    pretty.push('\n');
    write_output(path, &pretty)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
