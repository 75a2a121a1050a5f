//! `filtersnap` command line entry point.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use filtersnap_endpoint::{C_ENDPOINT_URL_DEFAULT, C_ENV_ENDPOINT_URL};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "filtersnap",
    version,
    about = "Export dashboard worksheet data with its active filters to xlsx"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SnapshotArgs {
    /// Dashboard snapshot JSON.
    #[arg(long, env = "FILTERSNAP_SNAPSHOT")]
    snapshot: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List worksheets available for export.
    Worksheets {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
    /// Show the active dashboard filters.
    Filters {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Print summaries as JSON.
        #[arg(long)]
        json: bool,
        /// Re-render whenever the snapshot's filters change.
        #[arg(long)]
        watch: bool,
        /// Worksheet whose filter-change events drive `--watch`.
        #[arg(long)]
        worksheet: Option<String>,
        /// Snapshot polling interval for `--watch`.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Export a worksheet with its filter summary to xlsx.
    Export {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Worksheet to export; defaults to the first one.
        #[arg(long)]
        worksheet: Option<String>,
        /// Directory receiving `<worksheet>_filtered_data.xlsx`.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Talk to the remote filter-data endpoint.
    Endpoint {
        /// Endpoint URL.
        #[arg(long, env = C_ENV_ENDPOINT_URL, default_value = C_ENDPOINT_URL_DEFAULT)]
        url: String,
        #[command(subcommand)]
        action: EndpointAction,
    },
}

#[derive(Subcommand, Debug)]
enum EndpointAction {
    /// GET and print the endpoint's JSON.
    Get,
    /// POST a JSON file to the endpoint.
    Post {
        /// JSON body file.
        #[arg(long)]
        body: PathBuf,
    },
}

/// Install the stderr subscriber; `RUST_LOG` directives are kept.
fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("filtersnap={level}")
            .parse()
            .context("invalid log directive")?,
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Worksheets { snapshot } => commands::run_worksheets(&snapshot.snapshot),
        Commands::Filters {
            snapshot,
            json,
            watch,
            worksheet,
            interval_ms,
        } => commands::run_filters(
            &snapshot.snapshot,
            &commands::SpecFiltersOptions {
                if_json: json,
                if_watch: watch,
                worksheet,
                interval_ms,
            },
        ),
        Commands::Export {
            snapshot,
            worksheet,
            out_dir,
        } => commands::run_export(&snapshot.snapshot, worksheet.as_deref(), &out_dir),
        Commands::Endpoint { url, action } => match action {
            EndpointAction::Get => commands::run_endpoint_get(&url),
            EndpointAction::Post { body } => commands::run_endpoint_post(&url, &body),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_defaults_to_current_directory() {
        let cli = Cli::try_parse_from([
            "filtersnap",
            "export",
            "--snapshot",
            "dashboard.json",
            "--worksheet",
            "Sales",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                snapshot,
                worksheet,
                out_dir,
            } => {
                assert_eq!(snapshot.snapshot, PathBuf::from("dashboard.json"));
                assert_eq!(worksheet.as_deref(), Some("Sales"));
                assert_eq!(out_dir, PathBuf::from("."));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbosity_flags_are_global() {
        let cli = Cli::try_parse_from(["filtersnap", "endpoint", "-vv", "get"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Endpoint {
                action: EndpointAction::Get,
                ..
            }
        ));
    }
}
