// Banana Manga - manga catalog and reader over a simulated storage server
// Entry point and command-line setup

use anyhow::Result;
use banana_manga::services::LatencySettings;
use banana_manga::storage::Latency;
use banana_manga::{app, commands};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browse and manage the Banana Manga catalog
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding the database and settings
    #[arg(short, long, env = "BANANA_MANGA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Admin password; unlocks the admin commands for this run
    #[arg(short, long, env = "BANANA_MANGA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip the simulated storage latency
    #[arg(long)]
    no_latency: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, data directory and sync status
    Info,
    /// List all titles, newest first
    List,
    /// Show the latest chapter releases
    Latest,
    /// Show a title and its chapters
    Show { title_id: String },
    /// Open a chapter in the reader
    Read { title_id: String, chapter_id: String },
    /// Toggle dark mode
    DarkMode,
    /// Show current settings
    Settings,
    /// Configure the simulated storage latency
    SetLatency {
        #[arg(long)]
        read_ms: u64,
        #[arg(long)]
        write_ms: u64,
        /// Disable the simulated latency entirely
        #[arg(long)]
        disabled: bool,
    },
    /// [admin] Change the admin password used from the next start
    SetPassword { password: String },
    /// [admin] Create a title
    AddTitle {
        name: String,
        cover_image_url: String,
    },
    /// [admin] Delete a title and all of its chapters
    DeleteTitle { id: String },
    /// [admin] Add a chapter; pages are comma-separated image URLs
    AddChapter {
        title_id: String,
        chapter_label: String,
        image_urls: String,
    },
    /// [admin] Delete a chapter
    DeleteChapter { id: String },
    /// [admin] Show the activity log
    Logs,
    /// [admin] Clear the activity log
    ClearLogs,
    /// [admin] Export the database to a dated JSON file
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// [admin] Replace the database with an exported JSON file
    Import { file: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banana_manga=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Banana Manga");

    let data_dir = app::resolve_data_dir(cli.data_dir)?;
    let latency_override = cli.no_latency.then(Latency::none);
    let state = app::setup(data_dir, latency_override).await?;

    if let Some(password) = cli.password.as_deref() {
        state.login(password).await?;
    }

    match cli.command {
        Commands::Info => print_json(&commands::get_app_info(&state).await?)?,
        Commands::List => print_json(&commands::list_titles(&state).await?)?,
        Commands::Latest => print_json(&commands::latest_releases(&state).await?)?,
        Commands::Show { title_id } => {
            print_json(&commands::show_title(&state, &title_id).await?)?
        }
        Commands::Read {
            title_id,
            chapter_id,
        } => print_json(&commands::read_chapter(&state, &title_id, &chapter_id).await?)?,
        Commands::DarkMode => {
            let dark_mode = commands::toggle_dark_mode(&state).await?;
            println!("Dark mode {}", if dark_mode { "on" } else { "off" });
        }
        Commands::Settings => print_json(&commands::get_settings(&state).await?)?,
        Commands::SetLatency {
            read_ms,
            write_ms,
            disabled,
        } => {
            commands::update_latency_settings(
                &state,
                LatencySettings {
                    enabled: !disabled,
                    read_ms,
                    write_ms,
                },
            )
            .await?;
            println!("Latency settings saved");
        }
        Commands::SetPassword { password } => {
            commands::change_admin_password(&state, password).await?;
            println!("Admin password updated");
        }
        Commands::AddTitle {
            name,
            cover_image_url,
        } => print_json(&commands::add_title(&state, name, cover_image_url).await?)?,
        Commands::DeleteTitle { id } => {
            let title = commands::delete_title(&state, &id).await?;
            println!("Deleted title {} ({})", title.name, title.id);
        }
        Commands::AddChapter {
            title_id,
            chapter_label,
            image_urls,
        } => print_json(
            &commands::add_chapter(&state, title_id, chapter_label, image_urls).await?,
        )?,
        Commands::DeleteChapter { id } => {
            let chapter = commands::delete_chapter(&state, &id).await?;
            println!("Deleted chapter {} ({})", chapter.chapter_label, chapter.id);
        }
        Commands::Logs => print_json(&commands::list_logs(&state).await?)?,
        Commands::ClearLogs => {
            commands::clear_logs(&state).await?;
            println!("Activity log cleared");
        }
        Commands::Export { out } => {
            let path = commands::export_database(&state, out).await?;
            println!("Backup written to {}", path);
        }
        Commands::Import { file } => {
            commands::import_database(&state, &file).await?;
            println!("Database restored successfully!");
        }
    }

    Ok(())
}
