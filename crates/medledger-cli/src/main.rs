//! medledger CLI - key management, co-signing, replay and chain verification.

use clap::{Parser, Subcommand};
use medledger_core::ActorKind;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod input;
mod output;

use commands::{canonicalize, keygen, replay, sign, verify};

#[derive(Parser)]
#[command(name = "medledger")]
#[command(about = "Dual-signed medical record ledger tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair and register it in key directory files
    Keygen {
        /// Actor namespace: patient or hospital
        #[arg(long)]
        kind: ActorKind,
        /// Actor identifier
        #[arg(long)]
        id: String,
        /// Public key directory (JSON object of id -> public key hex)
        #[arg(long)]
        registry: String,
        /// Secret key file (JSON object of id -> secret key hex)
        #[arg(long)]
        secrets: String,
    },
    /// Co-sign a transaction request with patient and hospital secret keys
    Sign {
        /// Request JSON file (or stdin if not provided)
        input: Option<String>,
        /// Patient secret key file
        #[arg(long)]
        patient_secrets: String,
        /// Hospital secret key file
        #[arg(long)]
        hospital_secrets: String,
    },
    /// Show the canonical signing message for a request
    Canonicalize {
        /// Request JSON file (or stdin if not provided)
        input: Option<String>,
        /// Print the SHA-256 digest instead of the bytes
        #[arg(long)]
        digest: bool,
    },
    /// Authorize and append signed transactions (JSON lines) to a fresh ledger
    Replay {
        /// Signed transactions, one JSON object per line
        input: String,
        /// Patient public key directory
        #[arg(long)]
        patients: String,
        /// Hospital public key directory
        #[arg(long)]
        hospitals: String,
        /// Write the resulting chain to this file
        #[arg(long)]
        export: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Exit with error code if any transaction is rejected
        #[arg(long)]
        strict: bool,
    },
    /// Verify hash linkage of an exported chain
    Verify {
        /// Exported chain file
        chain: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Keygen {
            kind,
            id,
            registry,
            secrets,
        } => keygen::run(kind, id, registry, secrets),
        Commands::Sign {
            input,
            patient_secrets,
            hospital_secrets,
        } => sign::run(input, patient_secrets, hospital_secrets),
        Commands::Canonicalize { input, digest } => canonicalize::run(input, digest),
        Commands::Replay {
            input,
            patients,
            hospitals,
            export,
            json,
            strict,
        } => replay::run(input, patients, hospitals, export, json, strict),
        Commands::Verify { chain, json } => verify::run(chain, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
