use anyhow::Context;
use clap::{Parser, Subcommand};
use retrace::engine::RetraceService;
use retrace::engine::cache::{EngineCacheConfig, discover_versions};
use retrace::engine::index::IndexBuilder;
use retrace::engine::types::VersionKey;
use retrace::logging;
use retrace::shared::config::CONFIG;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "retrace")]
#[command(about = "De-obfuscate Java/Android stack traces with ProGuard mappings", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a stack trace against one version's mapping
    Resolve {
        #[arg(long)]
        app: String,

        #[arg(long)]
        version_name: String,

        #[arg(long)]
        version_code: u64,

        /// Stack trace file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Build or load the sidecar index of a mapping file and print a summary
    Index {
        mapping: PathBuf,

        /// Rescan even if a valid sidecar exists
        #[arg(long)]
        force: bool,
    },
    /// List versions found under the data root
    Versions,
    /// Pre-warm engines for the most recent versions and print the summary
    Prewarm,
}

#[derive(Serialize)]
struct IndexSummary {
    mapping: String,
    classes: usize,
    source_file_size: u64,
    source_file_mtime: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&CONFIG.logging)?;
    info!(target: "retrace::cli", root = %CONFIG.data.root_dir, "Starting retrace");

    match args.command {
        Command::Resolve {
            app,
            version_name,
            version_code,
            input,
        } => {
            let text = match input {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let lines: Vec<String> = text.lines().map(str::to_string).collect();
            let key = VersionKey::new(app, version_name, version_code);

            let service = RetraceService::from_settings(&CONFIG);
            let resolution = service.resolve(&key, &lines)?;
            for line in &resolution.lines {
                println!("{}", line);
            }
            if !resolution.resolved {
                eprintln!("No mapping for {}; trace left unresolved", key);
            }
        }
        Command::Index { mapping, force } => {
            let index = IndexBuilder::build(&mapping, force)
                .with_context(|| format!("indexing {}", mapping.display()))?;
            let summary = IndexSummary {
                mapping: mapping.display().to_string(),
                classes: index.len(),
                source_file_size: index.source_file_size(),
                source_file_mtime: index.source_file_mtime(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Versions => {
            let config = EngineCacheConfig::from(&**CONFIG);
            let versions = discover_versions(&config.root_dir)
                .with_context(|| format!("scanning {}", config.root_dir.display()))?;
            println!("{}", serde_json::to_string_pretty(&versions)?);
        }
        Command::Prewarm => {
            let service = RetraceService::from_settings(&CONFIG);
            let summary = service.on_application_ready();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
