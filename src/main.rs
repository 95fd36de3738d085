use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use infoctor_core::{CoreConfig, InteropService, PatientRecord, mllp_endpoint_from_lookup};

#[derive(Parser)]
#[command(name = "infoctor")]
#[command(about = "Infoctor EHR interoperability tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a patient record as a FHIR Patient resource
    ExportFhir {
        /// Patient record (JSON)
        record: PathBuf,
    },
    /// Read a FHIR Patient resource into a draft record
    ImportFhir {
        /// FHIR Patient resource (JSON)
        resource: PathBuf,
    },
    /// Print a patient record as an HL7 ADT^A01 message
    ExportHl7 {
        /// Patient record (JSON)
        record: PathBuf,
    },
    /// Read the PID segment of an HL7 message into a draft record
    ImportHl7 {
        /// HL7 message text
        message: PathBuf,
    },
    /// Send a patient record to an MLLP receiver and print the acknowledgment
    Send {
        /// Patient record (JSON)
        record: PathBuf,
        /// Receiver host (default: MLLP_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Receiver port (default: MLLP_PORT, then 2575)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Main entry point for the Infoctor interoperability CLI
///
/// # Environment Variables
/// - `INTEROP_SENDING_APPLICATION`, `INTEROP_SENDING_FACILITY`,
///   `INTEROP_RECEIVING_APPLICATION`, `INTEROP_RECEIVING_FACILITY`: `MSH-3` to `MSH-6`
/// - `MLLP_HOST` / `MLLP_PORT`: default receiver for `send`
/// - `RUST_LOG`: log filter (default directive `infoctor=info`)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("infoctor=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let env = |key: &str| std::env::var(key).ok();
    let cfg = Arc::new(CoreConfig::from_lookup(env)?);
    let service = InteropService::new(cfg);

    let cli = Cli::parse();
    match cli.command {
        Commands::ExportFhir { record } => {
            let record = read_record(&record)?;
            let document = service.export_fhir(&record)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::ImportFhir { resource } => {
            let text = read_text(&resource)?;
            let draft = service.import_fhir_str(&text)?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        Commands::ExportHl7 { record } => {
            let record = read_record(&record)?;
            // Segments are separated by CR on the wire; print one per line.
            println!("{}", service.export_hl7(&record)?.replace('\r', "\n"));
        }
        Commands::ImportHl7 { message } => {
            let text = read_text(&message)?;
            let draft = service.import_hl7(&text)?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        Commands::Send { record, host, port } => {
            let record = read_record(&record)?;
            let endpoint = mllp_endpoint_from_lookup(env)?;

            let host = host
                .or_else(|| endpoint.as_ref().map(|e| e.host.clone()))
                .context("no MLLP host given; pass --host or set MLLP_HOST")?;
            let port = port
                .or_else(|| endpoint.as_ref().map(|e| e.port))
                .unwrap_or(infoctor_core::constants::DEFAULT_MLLP_PORT);

            let ack = service.send_hl7(&host, port, &record).await?;
            println!("{}", ack.replace('\r', "\n"));
        }
    }

    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_record(path: &Path) -> anyhow::Result<PatientRecord> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid patient record", path.display()))
}
