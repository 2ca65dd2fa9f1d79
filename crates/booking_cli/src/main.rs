//! Command-line front end for the booking store.
//!
//! # Responsibility
//! - Wire configuration, logging, storage and notifier into one service.
//! - Edit the bookable slot schedule next to the booking store.
//! - Print results as pretty JSON so output can be piped into other tools.

use anyhow::{bail, Context, Result};
use booking_core::{
    flush_logging, init_logging, parse_booking_time, AppConfig, BookingFields, BookingNotifier,
    BookingService, BookingStatus, JsonFileStorage, NoopNotifier, PurgeRequest, SlotRange,
    SmtpNotifier, StoredBookingRepository, StoredTimeSlotRepository, TimeSlotRepository,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use log::error;
use serde_json::{json, Value};
use std::path::PathBuf;

type CliService =
    BookingService<StoredBookingRepository<JsonFileStorage>, Box<dyn BookingNotifier>>;
type CliSlots = StoredTimeSlotRepository<JsonFileStorage>;

/// Manage appointment bookings stored in a local JSON file
#[derive(Parser, Debug)]
#[command(version = booking_core::core_version(), about, long_about = None)]
struct Cli {
    /// Path to a TOML/JSON/YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a booking from key=value fields and send the notification
    Add {
        /// Booking fields, e.g. firstName=John date=2023-03-25
        #[arg(value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// List bookings in creation order
    List {
        /// Only bookings whose `date` field equals this value
        #[arg(long)]
        date: Option<String>,
    },

    /// Show one booking
    Get {
        #[arg(value_name = "BOOKING_ID")]
        id: String,
    },

    /// Replace every field of a booking (id and created_at are kept)
    Update {
        #[arg(value_name = "BOOKING_ID")]
        id: String,

        #[arg(value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Delete a booking
    Delete {
        #[arg(value_name = "BOOKING_ID")]
        id: String,
    },

    /// Find bookings by phone number, ignoring formatting
    FindPhone { phone: String },

    /// Show booking counts by status and how many are in the past
    Stats {
        /// Reference day (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Delete bookings dated at least N days ago
    Purge {
        /// Minimum age in days
        #[arg(long, default_value_t = 1)]
        days_old: u64,

        /// Only purge bookings with this status (repeatable)
        #[arg(long = "status")]
        statuses: Vec<String>,

        /// Reference day (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Delete bookings whose date and time started at least N hours ago
    PurgeCompleted {
        /// Minimum age in hours
        #[arg(long, default_value_t = 2)]
        hours_old: u64,

        /// Only purge bookings with this status (repeatable)
        #[arg(long = "status")]
        statuses: Vec<String>,

        /// Reference moment, e.g. 2025-06-10T14:00:00 (defaults to now)
        #[arg(long)]
        now: Option<NaiveDateTime>,
    },

    /// Manage the bookable time-slot schedule
    Slots {
        #[command(subcommand)]
        command: SlotCommands,
    },
}

#[derive(Subcommand, Debug)]
enum SlotCommands {
    /// Show the schedule, or one day of it
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Add regular slots for every day in a date range
    Generate {
        #[arg(long)]
        from: NaiveDate,

        /// Last day, inclusive
        #[arg(long)]
        to: NaiveDate,

        /// First slot of each day, e.g. 09:00
        #[arg(long, value_parser = parse_time_arg)]
        start: NaiveTime,

        /// Slots start before this time, e.g. 17:00
        #[arg(long, value_parser = parse_time_arg)]
        end: NaiveTime,

        #[arg(long, default_value_t = 60)]
        step_minutes: u32,
    },

    /// Replace the slots of one day
    Set {
        date: NaiveDate,

        #[arg(value_name = "TIME", required = true, value_parser = parse_time_arg)]
        times: Vec<NaiveTime>,
    },

    /// Remove every slot of one day
    Clear { date: NaiveDate },

    /// List dates that still offer slots
    Available {
        /// Window length in days after the reference day
        #[arg(long, default_value_t = 14)]
        days: u64,

        /// Reference day (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Drop days before the reference day
    Prune {
        /// Reference day (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging.level, config.logging.dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("initializing logging")?;

    let result = match cli.command {
        Commands::Slots { command } => {
            open_slots(&config).and_then(|mut repo| run_slots(&mut repo, command))
        }
        command => open_service(&config).and_then(|mut service| run(&mut service, command)),
    };
    if let Err(err) = &result {
        error!("event=cli_run module=cli status=error error={err:#}");
    }
    flush_logging();
    result
}

fn open_service(config: &AppConfig) -> Result<CliService> {
    let storage =
        JsonFileStorage::new(&config.storage.path).with_corrupt_policy(config.storage.on_corrupt);
    let repo = StoredBookingRepository::open(storage)
        .with_context(|| format!("opening {}", config.storage.path.display()))?;

    let notifier: Box<dyn BookingNotifier> = if config.notify.enabled {
        Box::new(
            SmtpNotifier::from_config(&config.notify.smtp, config.notify.service_label.clone())
                .context("configuring SMTP notifier")?,
        )
    } else {
        Box::new(NoopNotifier)
    };

    Ok(BookingService::new(repo, notifier))
}

fn open_slots(config: &AppConfig) -> Result<CliSlots> {
    let storage = JsonFileStorage::new(&config.storage.timeslots_path)
        .with_corrupt_policy(config.storage.on_corrupt);
    StoredTimeSlotRepository::open(storage)
        .with_context(|| format!("opening {}", config.storage.timeslots_path.display()))
}

fn run(service: &mut CliService, command: Commands) -> Result<()> {
    match command {
        Commands::Add { fields } => {
            let added = service.add_booking(parse_fields(&fields)?)?;
            print_json(&added)
        }
        Commands::List { date } => print_json(&service.list_bookings(date.as_deref())),
        Commands::Get { id } => match service.get_booking(&id) {
            Some(booking) => print_json(&booking),
            None => bail!("booking not found: {id}"),
        },
        Commands::Update { id, fields } => {
            let booking = service.update_booking(&id, parse_fields(&fields)?)?;
            print_json(&booking)
        }
        Commands::Delete { id } => {
            let removed = service.delete_booking(&id)?;
            print_json(&json!({ "deleted": removed.id }))
        }
        Commands::FindPhone { phone } => print_json(&service.find_by_phone(&phone)?),
        Commands::Stats { today } => print_json(&service.stats(today.unwrap_or_else(local_today))),
        Commands::Purge {
            days_old,
            statuses,
            today,
        } => {
            let mut request =
                PurgeRequest::older_than(today.unwrap_or_else(local_today), days_old);
            if !statuses.is_empty() {
                request = request.with_statuses(parse_statuses(&statuses)?);
            }
            purge(service, &request)
        }
        Commands::PurgeCompleted {
            hours_old,
            statuses,
            now,
        } => {
            let now = now.unwrap_or_else(|| Local::now().naive_local());
            let mut request = PurgeRequest::completed(now, hours_old);
            if !statuses.is_empty() {
                request = request.with_statuses(parse_statuses(&statuses)?);
            }
            purge(service, &request)
        }
        Commands::Slots { .. } => bail!("slot commands do not use the booking store"),
    }
}

fn purge(service: &mut CliService, request: &PurgeRequest) -> Result<()> {
    let removed = service.purge_past(request)?;
    print_json(&json!({
        "cutoff": request.cutoff.to_string(),
        "deleted": removed.len(),
    }))
}

fn run_slots(repo: &mut CliSlots, command: SlotCommands) -> Result<()> {
    match command {
        SlotCommands::List { date: Some(date) } => print_json(&json!({
            "date": date,
            "times": repo.slots_on(date),
        })),
        SlotCommands::List { date: None } => print_json(repo.schedule()),
        SlotCommands::Generate {
            from,
            to,
            start,
            end,
            step_minutes,
        } => {
            let range = SlotRange::hourly(from, to, start, end).with_step_minutes(step_minutes);
            let added = repo.generate(&range)?;
            print_json(&json!({ "added": added, "total": repo.schedule().slot_count() }))
        }
        SlotCommands::Set { date, times } => {
            repo.set_day(date, times)?;
            print_json(&json!({ "date": date, "times": repo.slots_on(date) }))
        }
        SlotCommands::Clear { date } => {
            let removed = repo.clear_day(date)?;
            print_json(&json!({ "date": date, "removed": removed }))
        }
        SlotCommands::Available { days, today } => {
            print_json(&repo.available_dates(today.unwrap_or_else(local_today), days))
        }
        SlotCommands::Prune { today } => {
            let removed = repo.prune_before(today.unwrap_or_else(local_today))?;
            print_json(&json!({ "removed": removed }))
        }
    }
}

fn parse_fields(pairs: &[String]) -> Result<BookingFields> {
    let mut fields = BookingFields::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got `{pair}`");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("field name cannot be empty in `{pair}`");
        }
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(fields)
}

fn parse_statuses(values: &[String]) -> Result<Vec<BookingStatus>> {
    values
        .iter()
        .map(|value| {
            BookingStatus::parse(value)
                .with_context(|| {
                    format!("unknown status `{value}`; expected pending|confirmed|cancelled")
                })
        })
        .collect()
}

fn parse_time_arg(value: &str) -> Result<NaiveTime, String> {
    parse_booking_time(value)
        .ok_or_else(|| format!("expected a time like 09:00 or 2:00 PM, got `{value}`"))
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
