use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use mien_client::{AuthClient, AuthSession, RestClient};
use mien_core::SessionSummary;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod browser;
mod compare;
mod config;
mod export;

use config::Config;

#[derive(Parser)]
#[command(name = "mien", about = "Mien admin CLI — browse, compare and export capture sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in against the auth provider
    Login {
        /// Admin email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored auth session
    Logout,
    /// List stored sessions
    List {
        /// Case-insensitive substring filter over name and id
        #[arg(long)]
        filter: Option<String>,
        /// Browse the trash instead of the live collection
        #[arg(long)]
        trash: bool,
    },
    /// Show one session's summary and measurement history
    Show { id: i64 },
    /// Delete sessions (moved to the trash by the backend)
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Restore a session from the trash
    Restore { id: i64 },
    /// Compare sessions side by side
    Compare {
        #[arg(required = true, num_args = 2..)]
        ids: Vec<i64>,
        /// Also write a comparison chart PNG here
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Export one session as an artifact file
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        id: i64,
        /// Output path (defaults to Report_<name>_<date>.<ext>)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormat {
    Csv,
    Pdf,
    Chart,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Login { email } => login(&config, email).await,
        Commands::Logout => {
            AuthSession::sign_out()?;
            println!("signed out");
            Ok(())
        }
        Commands::List { filter, trash } => list(&config, filter, trash).await,
        Commands::Show { id } => show(&config, id).await,
        Commands::Delete { ids, yes } => delete(&config, &ids, yes).await,
        Commands::Restore { id } => restore(&config, id).await,
        Commands::Compare { ids, chart } => compare_cmd(&config, &ids, chart).await,
        Commands::Export { format, id, out } => export_cmd(&config, format, id, out).await,
    }
}

/// Admin operations gate on a live provider session.
fn rest_client(config: &Config) -> Result<RestClient> {
    let session =
        AuthSession::load()?.context("not signed in — run `mien login` first")?;
    Ok(RestClient::new(&config.api_url)?.with_token(session.access_token))
}

async fn login(config: &Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("email: ")?,
    };
    let password = prompt("password: ")?;

    let client = AuthClient::new(&config.auth_url)?;
    match client.sign_in(&email, &password).await {
        Ok(session) => {
            session.save()?;
            println!("signed in as {email}");
            Ok(())
        }
        // Auth failures surface inline, short, and stop the operation.
        Err(e) => bail!("sign-in failed: {e}"),
    }
}

async fn list(config: &Config, filter: Option<String>, trash: bool) -> Result<()> {
    let client = rest_client(config)?;
    let sessions = if trash {
        client.list_trash().await?
    } else {
        client.list_sessions().await?
    };

    let query = filter.unwrap_or_default();
    let visible = browser::filter_sessions(&sessions, &query);
    print!("{}", browser::session_table(&visible));
    println!(
        "{} of {} session(s){}",
        visible.len(),
        sessions.len(),
        if trash { " in trash" } else { "" }
    );
    Ok(())
}

async fn show(config: &Config, id: i64) -> Result<()> {
    let client = rest_client(config)?;
    let detail = client.session_detail(id).await?;
    let summary = SessionSummary::from_measurements(&detail.data);
    println!("{}", browser::summary_block(&detail.info, &summary));
    print!("{}", browser::measurement_table(&detail.data));
    Ok(())
}

async fn delete(config: &Config, ids: &[i64], yes: bool) -> Result<()> {
    if !yes {
        let answer = prompt(&format!("delete {} session(s)? [y/N] ", ids.len()))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("aborted");
            return Ok(());
        }
    }

    let client = rest_client(config)?;
    // All deletes go out concurrently and join all-or-nothing: one
    // failure rejects the batch with no partial-result handling.
    futures_util::future::try_join_all(ids.iter().map(|id| client.delete_session(*id)))
        .await
        .context("bulk delete aborted")?;
    println!("deleted {} session(s)", ids.len());
    Ok(())
}

async fn restore(config: &Config, id: i64) -> Result<()> {
    let client = rest_client(config)?;
    client.restore_session(id).await?;
    println!("restored session {id}");
    Ok(())
}

async fn compare_cmd(config: &Config, ids: &[i64], chart: Option<PathBuf>) -> Result<()> {
    let client = rest_client(config)?;
    let details = compare::fetch_details(&client, ids)
        .await
        .context("comparison aborted")?;

    if let Some(path) = chart {
        let series = export::chart::comparison_series(&details);
        let img = export::chart::render("ENGAGEMENT COMPARISON", &series)?;
        export::chart::save_png(&img, &path)?;
        println!("chart written to {}", path.display());
    }

    let report = compare::group_report(details);
    print!("{}", compare::report_table(&report));
    Ok(())
}

async fn export_cmd(
    config: &Config,
    format: ExportFormat,
    id: i64,
    out: Option<PathBuf>,
) -> Result<()> {
    let client = rest_client(config)?;
    let detail = client.session_detail(id).await?;

    let path = match format {
        ExportFormat::Csv => {
            let path =
                out.unwrap_or_else(|| export::default_file_name(&detail.info, "csv").into());
            export::write_artifact(&path, export::csv::render(&detail)?.as_bytes())?;
            path
        }
        ExportFormat::Pdf => {
            let path =
                out.unwrap_or_else(|| export::default_file_name(&detail.info, "pdf").into());
            export::write_artifact(&path, &export::pdf::render(&detail, Local::now())?)?;
            path
        }
        ExportFormat::Chart => {
            let path =
                out.unwrap_or_else(|| export::default_file_name(&detail.info, "png").into());
            let series = export::chart::session_series(&detail);
            let title = format!("SESSION {id}");
            let img = export::chart::render(&title, &series)?;
            export::chart::save_png(&img, &path)?;
            path
        }
    };
    println!("exported to {}", path.display());
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
