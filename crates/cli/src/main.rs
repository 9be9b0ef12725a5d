use clap::{Parser, Subcommand};
use diagnosis::InMemoryRules;
use intake_core::{AllowAll, ExportFormat, ExportService};
use intake_types::{CanonicalRecord, ExportConfig, Language, SystemClock, UuidGenerator};
use std::io::Write;
use terminology::Terminology;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Clinical data export engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one record file
    Export {
        /// Path to the record YAML file
        record: String,
        /// Path to a diagnosis rule table YAML file (optional)
        #[arg(long)]
        rules: Option<String>,
        /// Export format (see `intake formats`)
        #[arg(long, default_value = "gdt")]
        format: String,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<String>,
        /// Sender identifier for message headers
        #[arg(long, default_value = "INTAKE")]
        sender: String,
        /// Receiver identifier for message headers
        #[arg(long, default_value = "PVS")]
        receiver: String,
        /// Output language code (de or en)
        #[arg(long, default_value = "de")]
        language: String,
    },
    /// List the available export formats
    Formats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Export {
            record,
            rules,
            format,
            out,
            sender,
            receiver,
            language,
        }) => {
            let format: ExportFormat = format.parse()?;
            let record = CanonicalRecord::parse(&std::fs::read_to_string(&record)?)?;
            let rules = match rules {
                Some(path) => InMemoryRules::parse(&std::fs::read_to_string(&path)?)?,
                None => InMemoryRules::default(),
            };

            let config = ExportConfig::new(
                sender,
                receiver,
                "intake-export",
                env!("CARGO_PKG_VERSION"),
                Language::from_code(&language),
            )?;
            let service = ExportService::new(
                &config,
                &rules,
                &AllowAll,
                Terminology::builtin(),
                &SystemClock,
                &UuidGenerator,
            );

            let artifact = service.export(&record, format)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &artifact.bytes)?;
                    println!(
                        "Wrote {} ({} bytes, {})",
                        path,
                        artifact.bytes.len(),
                        artifact.mime_type
                    );
                }
                None => {
                    std::io::stdout().write_all(&artifact.bytes)?;
                }
            }
        }
        Some(Commands::Formats) => {
            for format in ExportFormat::all() {
                println!(
                    "{:<16} {:<24} {}",
                    format.to_string(),
                    format.mime_type(),
                    format.file_extension()
                );
            }
        }
        None => {
            println!("Use 'intake --help' for commands");
        }
    }

    Ok(())
}
