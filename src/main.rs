mod config;
mod core;
mod domain;
mod infrastructure;
mod modules;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::{OpsError, RunReport};
use crate::infrastructure::cluster::{ClusterClient, ClusterHealth};
use crate::infrastructure::http::HttpTransport;
use crate::infrastructure::mail::Mailer;

#[derive(Debug, Parser)]
#[command(
    name = "sonde",
    version,
    about = "Sonde: operations CLI for a clustered search service"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to $SONDE_CONFIG or ~/.config/sonde/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cluster user (overrides config)
    #[arg(long, short = 'u', global = true)]
    username: Option<String>,

    /// Cluster password; prompted for when not given anywhere
    #[arg(long, global = true, env = "SONDE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Debug level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create storage, RAM and CPU monitors for every host in a CSV file
    Monitors {
        /// CSV file whose first column holds the host names
        #[arg(long, short = 'f')]
        csv_file: PathBuf,

        /// Print the definitions as JSON without contacting the cluster
        #[arg(long)]
        dry_run: bool,
    },
    /// Set refresh_interval on today's daily indices
    RefreshInterval {
        /// Beats version embedded in the index names (e.g. 7.9.0)
        #[arg(long, short = 'b')]
        beats_version: String,

        /// Interval to apply (overrides config)
        #[arg(long, short = 'i')]
        interval: Option<String>,
    },
    /// Export the configured log search to a `;`-separated CSV file
    Export {
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Mail the CSV to the configured recipients
        #[arg(long)]
        email: bool,
    },
    /// Send an HTML mail to the configured recipients
    Email {
        #[arg(long, short = 's', required_unless_present = "check")]
        subject: Option<String>,

        /// File holding the HTML body
        #[arg(long, required_unless_present = "check")]
        body_file: Option<PathBuf>,

        #[arg(long, short = 'a')]
        attachment: Option<PathBuf>,

        /// Only check that the SMTP server accepts connections
        #[arg(long)]
        check: bool,
    },
    /// Resolve the active endpoint and print the cluster health
    Health,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose, args.json_logs);

    match run(args).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!("{err:#}");
            match err.downcast_ref::<OpsError>() {
                Some(ops) => {
                    if ops.is_fatal() {
                        error!("Cluster is not usable, no operation was attempted");
                    }
                    ops.exit_code()
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Runs the selected command and returns the process exit status.
async fn run(args: Args) -> Result<u8> {
    let config = config::load(args.config.as_deref()).context("loading configuration")?;

    match &args.command {
        Command::Monitors { csv_file, dry_run } => {
            let hosts = modules::monitors::read_hosts(csv_file)
                .with_context(|| format!("reading hosts from {}", csv_file.display()))?;
            if *dry_run {
                println!("{}", modules::monitors::render_plan(&hosts, &config.monitors)?);
                return Ok(0);
            }
            let (client, _) = open_cluster(&args, &config).await?;
            let report = modules::monitors::submit_all(&client, &hosts, &config.monitors).await;
            Ok(finish(&report))
        }
        Command::RefreshInterval {
            beats_version,
            interval,
        } => {
            let interval = interval
                .as_deref()
                .unwrap_or(&config.settings.refresh_interval);
            let indices = modules::refresh::daily_indices(
                &config.settings.index_templates,
                beats_version,
                Local::now().date_naive(),
            );
            let (client, _) = open_cluster(&args, &config).await?;
            let report = modules::refresh::apply_refresh_interval(&client, &indices, interval).await;
            Ok(finish(&report))
        }
        Command::Export { output, email } => {
            let mailer = if *email {
                Some(Mailer::new(config.mail()?)?)
            } else {
                None
            };
            let today = Local::now().date_naive();
            let (client, _) = open_cluster(&args, &config).await?;
            let written =
                modules::export::export_logs(&client, &config.export, today, output).await?;
            if let Some(mailer) = mailer {
                let subject = format!("{} export {}", config.export.dataset, today);
                let body = modules::email::export_notice(written, &file_name(output));
                mailer.send(&subject, &body, Some(output.as_path())).await?;
            }
            Ok(0)
        }
        Command::Email {
            subject,
            body_file,
            attachment,
            check,
        } => {
            let mailer = Mailer::new(config.mail()?)?;
            if *check {
                mailer.check_server().await?;
                return Ok(0);
            }
            let (Some(subject), Some(body_file)) = (subject, body_file) else {
                return Err(OpsError::Config("--subject and --body-file are required".into()).into());
            };
            modules::email::send_file(&mailer, subject, body_file, attachment.as_deref()).await?;
            Ok(0)
        }
        Command::Health => {
            let (client, health) = open_cluster(&args, &config).await?;
            println!(
                "{} {} {}",
                client.endpoint(),
                health.cluster_name,
                health.status
            );
            Ok(0)
        }
    }
}

async fn open_cluster(
    args: &Args,
    config: &Config,
) -> Result<(ClusterClient<HttpTransport>, ClusterHealth)> {
    let username = args
        .username
        .clone()
        .unwrap_or_else(|| config.cluster.username.clone());
    let password = resolve_password(args, config, &username)?;
    let transport = HttpTransport::new(&config.cluster.transport_config(username, password))?;
    Ok(modules::health::open_cluster(transport, &config.cluster).await?)
}

/// `--password` / `SONDE_PASSWORD`, then the config file, then an interactive prompt.
fn resolve_password(args: &Args, config: &Config, username: &str) -> Result<String> {
    if let Some(password) = args.password.clone().or_else(|| config.cluster.password.clone()) {
        return Ok(password);
    }
    let password = dialoguer::Password::new()
        .with_prompt(format!("User '{}' password", username))
        .allow_empty_password(true)
        .interact()
        .context("reading password")?;
    Ok(password)
}

fn finish(report: &RunReport) -> u8 {
    for item in report.failures() {
        warn!("{}: {}", item.label, item.detail);
    }
    info!("{}", report.summary());
    report.exit_status()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
