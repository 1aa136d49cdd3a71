// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! sigstat - statistics and exports for an encrypted Signal Desktop store.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod attachments;
mod dashboard;
mod export;
mod list;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sigstat_config::ConfigOverrides;
use sigstat_config::model::{ExportFormat, SigstatConfig};
use sigstat_core::SigstatError;
use tracing::error;

/// sigstat - statistics, dashboards and exports for Signal Desktop.
#[derive(Parser, Debug)]
#[command(name = "sigstat", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file only.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Signal Desktop data directory.
    #[arg(long, global = true)]
    store_dir: Option<String>,

    /// Include disappearing messages.
    #[arg(long, global = true)]
    include_expiring: bool,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List private and group conversations.
    ListConversations(ListArgs),
    /// Export every conversation as CSV, JSON or a raw SQL dump.
    Export(ExportArgs),
    /// Serve the interactive statistics dashboard.
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Show conversation ids (base64 for groups).
    #[arg(long, overrides_with = "hide_id")]
    show_id: bool,
    #[arg(long)]
    hide_id: bool,

    /// Show the number of messages per conversation (default).
    #[arg(long, overrides_with = "hide_message_count")]
    show_message_count: bool,
    #[arg(long)]
    hide_message_count: bool,

    /// Disable colors.
    #[arg(long)]
    plain: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output format: csv, json or sql.
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// Export directory.
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Copy attachment files as well.
    #[arg(long, overrides_with = "no_attachments")]
    attachments: bool,
    #[arg(long)]
    no_attachments: bool,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    /// Address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Port to bind.
    #[arg(long)]
    port: Option<u16>,
}

/// Resolve a `--x/--no-x` flag pair against its default.
fn flag_pair(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            store_dir: self.store_dir.clone(),
            include_expiring: self.include_expiring.then_some(true),
            log_level: self.log_level.clone(),
            ..ConfigOverrides::default()
        };
        match &self.command {
            Commands::Export(args) => overrides.output_dir = args.output_dir.clone(),
            Commands::Dashboard(args) => {
                overrides.bind_address = args.bind.clone();
                overrides.port = args.port;
            }
            Commands::ListConversations(_) => {}
        }
        overrides
    }
}

async fn run(cli: Cli, config: SigstatConfig) -> Result<(), SigstatError> {
    match cli.command {
        Commands::ListConversations(args) => {
            let options = list::ListOptions {
                show_id: flag_pair(args.show_id, args.hide_id, false),
                show_message_count: flag_pair(args.show_message_count, args.hide_message_count, true),
                plain: args.plain,
            };
            list::run_list(&config, &options).await
        }
        Commands::Export(args) => {
            let format = args.format.unwrap_or(config.export.format);
            let attachments = flag_pair(args.attachments, args.no_attachments, config.export.attachments);
            export::run_export(&config, format, attachments).await
        }
        Commands::Dashboard(_) => dashboard::run_dashboard(&config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match sigstat_config::load_and_validate(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(errors) => {
            sigstat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli, config).await {
        error!(error = %e, "command failed");
        eprintln!("sigstat: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sigstat={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flag_pairs_fall_back_to_default() {
        assert!(flag_pair(false, false, true));
        assert!(!flag_pair(false, false, false));
        assert!(flag_pair(true, false, false));
        assert!(!flag_pair(false, true, true));
    }

    #[test]
    fn global_flags_become_overrides() {
        let cli = Cli::parse_from([
            "sigstat",
            "export",
            "--store-dir",
            "/tmp/Signal",
            "--include-expiring",
            "-f",
            "json",
            "-o",
            "out",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.store_dir.as_deref(), Some("/tmp/Signal"));
        assert_eq!(overrides.include_expiring, Some(true));
        assert_eq!(overrides.output_dir.as_deref(), Some("out"));
        match cli.command {
            Commands::Export(args) => assert_eq!(args.format, Some(ExportFormat::Json)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn include_expiring_unset_leaves_config_alone() {
        let cli = Cli::parse_from(["sigstat", "list-conversations", "--hide-message-count"]);
        assert_eq!(cli.overrides().include_expiring, None);
    }

    #[test]
    fn unknown_export_format_is_rejected() {
        assert!(Cli::try_parse_from(["sigstat", "export", "-f", "xml"]).is_err());
    }

    #[test]
    fn dashboard_bind_overrides() {
        let cli = Cli::parse_from(["sigstat", "dashboard", "--bind", "0.0.0.0", "--port", "9000"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.bind_address.as_deref(), Some("0.0.0.0"));
        assert_eq!(overrides.port, Some(9000));
    }
}
