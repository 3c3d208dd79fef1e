//! `rsvp`: command-line front end of the registration manager.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use registration::{Config, RawFields, RegistrationApp, export_file_name};
use rsvp_core::capacity::CapacityStatus;
use rsvp_core::record::Record;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const THANKS: &str = "Thanks! We'll be in touch with details.";
const REGISTRATION_UNAVAILABLE: &str = "Registration is currently unavailable.";
const ADMIN_UNAVAILABLE: &str = "Admin view is not configured.";

#[derive(Parser, Debug)]
#[command(name = "rsvp", version, about = "Event registration manager")]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the event and how many seats are left
    Status,

    /// Register for the event
    Register {
        /// Invite code (prompted for when omitted)
        #[arg(long)]
        invite_code: Option<String>,

        /// Full name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Additional form field, e.g. `--field role=Engineer`
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Organizer commands
    Admin {
        /// Admin password (prompted for when omitted)
        #[arg(long, global = true)]
        password: Option<String>,

        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Print every registration
    List {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write every registration as CSV
    Export {
        /// Output file, `-` for stdout (default `rsvps-YYYY-MM-DD.csv`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let config = Config::from_env().context("invalid configuration")?;
    let app = RegistrationApp::open(config);

    match cli.command {
        Command::Status => {
            status(&app);
            Ok(ExitCode::SUCCESS)
        }
        Command::Register {
            invite_code,
            name,
            email,
            fields,
        } => {
            let mut raw: RawFields = fields.into_iter().collect();
            raw.insert("name".to_string(), name);
            raw.insert("email".to_string(), email);
            register(&app, invite_code, &raw)
        }
        Command::Admin { password, command } => admin(&app, password, command),
    }
}

fn status(app: &RegistrationApp) {
    let event = &app.config().event;
    println!("{}", event.title);
    println!("{} · {}", event.date, event.city);
    println!("{}", event.tagline);
    println!();
    println!(
        "Registrations: {} / {}",
        app.registration_count(),
        event.registration_limit
    );

    let status = app.capacity_status();
    if let CapacityStatus::Open { seats_left } = status {
        println!("Seats left: {seats_left}");
    }
    if let Some(notice) = status.notice() {
        println!("{notice}");
    }
}

fn prompt_secret(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(secret) => Ok(secret),
        None => rpassword::prompt_password(prompt).context("could not read from terminal"),
    }
}

fn register(
    app: &RegistrationApp,
    invite_code: Option<String>,
    raw: &RawFields,
) -> Result<ExitCode> {
    if !app.invite_enabled() {
        eprintln!("{REGISTRATION_UNAVAILABLE}");
        return Ok(ExitCode::FAILURE);
    }

    let mut session = app.start_session();
    let code = prompt_secret(invite_code, "Invite code: ")?;
    if !app.verify_invite(&mut session, &code) {
        eprintln!("Invalid invite code.");
        return Ok(ExitCode::FAILURE);
    }

    if let Some(notice) = app.capacity_status().notice() {
        println!("{notice}");
    }

    match app.submit_registration(raw) {
        Ok(_) => {
            println!("{THANKS}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn admin(
    app: &RegistrationApp,
    password: Option<String>,
    command: AdminCommand,
) -> Result<ExitCode> {
    if !app.admin_enabled() {
        eprintln!("{ADMIN_UNAVAILABLE}");
        return Ok(ExitCode::FAILURE);
    }

    let mut session = app.start_session();
    let password = prompt_secret(password, "Admin password: ")?;
    if !app.verify_admin(&mut session, &password) {
        eprintln!("Incorrect password.");
        return Ok(ExitCode::FAILURE);
    }

    let records = app.load_records();
    match command {
        AdminCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_table(app, &records);
            }
        }
        AdminCommand::Export { out } => {
            let csv = app.export_csv(&records).context("could not encode export")?;
            let out = out
                .unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
            if out.as_os_str() == "-" {
                io::stdout().write_all(csv.as_bytes())?;
            } else {
                fs::write(&out, csv).with_context(|| format!("could not write {}", out.display()))?;
                println!("Exported {} registrations to {}", records.len(), out.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_table(app: &RegistrationApp, records: &[Record]) {
    let schema = &app.config().event.schema;
    println!("{}", schema.columns().collect::<Vec<_>>().join(" | "));
    for record in records {
        let row: Vec<_> = schema.columns().map(|c| record.value(c)).collect();
        println!("{}", row.join(" | "));
    }
    println!("{} registration(s)", records.len());
}
