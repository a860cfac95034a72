//! Noteshare CLI
//!
//! Command-line interface for noteshare - a shared catalog of study
//! notes. Commands that mutate the catalog authenticate with the
//! credentials given via `--user`/`--password` (or the NOTESHARE_USER
//! and NOTESHARE_PASSWORD environment variables).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use noteshare_core::{Caller, Store, StoreError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "noteshare")]
#[command(about = "Noteshare - a shared catalog of study notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Username for commands that need a signed-in user
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Password matching --user (also the password for `register`)
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store (first-time setup, seeds demo data)
    Init,
    /// Register a new account (password taken from --password)
    Register {
        /// Username for the new account
        username: String,
        /// Contact email
        email: String,
    },
    /// Upload a note file with metadata
    Upload {
        /// File to upload
        file: PathBuf,
        /// Note title
        #[arg(short, long)]
        title: String,
        /// Category (e.g. "Computer Science")
        #[arg(short, long)]
        category: String,
        /// Subject within the category
        #[arg(short, long)]
        subject: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Search the catalog
    #[command(alias = "list")]
    Search {
        /// Text to match against title, subject, and tags
        query: Option<String>,
        /// Category filter ("All" for no filter)
        #[arg(short, long, default_value = "All")]
        category: String,
        /// Sort mode: recent, popular, or rating
        #[arg(short, long, default_value = "recent")]
        sort: String,
    },
    /// Show a note with its ratings
    Show {
        /// Note id
        id: i64,
    },
    /// Download a note's file
    Download {
        /// Note id
        id: i64,
        /// Target path (defaults to the uploaded file name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Rate a note, replacing any previous rating you gave it
    Rate {
        /// Note id
        id: i64,
        /// Rating value
        rating: i64,
        /// Optional review text
        #[arg(short, long)]
        review: Option<String>,
    },
    /// Delete a note (uploader or admin only)
    #[command(alias = "rm")]
    Delete {
        /// Note id
        id: i64,
    },
    /// List catalog categories
    Categories,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, upload_dir)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config management works without opening the store
    if let Commands::Config { command } = &cli.command {
        return commands::config::run(command.clone(), &output);
    }

    // Credentials, with environment fallback
    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var("NOTESHARE_USER").ok());
    let password = cli
        .password
        .clone()
        .or_else(|| std::env::var("NOTESHARE_PASSWORD").ok());

    let mut store = Store::open()?;
    tracing::debug!(db = %store.config().sqlite_path().display(), "store opened");

    match cli.command {
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Init => commands::init::run(&mut store, &output),
        Commands::Register { username, email } => {
            let Some(password) = password else {
                anyhow::bail!("--password is required to register an account");
            };
            commands::user::register(&mut store, &username, &password, &email, &output)
        }
        Commands::Upload {
            file,
            title,
            category,
            subject,
            description,
            tags,
        } => {
            let caller = resolve_caller(&store, &user, &password)?;
            commands::note::upload(
                &mut store,
                &caller,
                file,
                title,
                category,
                subject,
                description,
                &tags,
                &output,
            )
        }
        Commands::Search {
            query,
            category,
            sort,
        } => commands::note::search(&store, query.as_deref().unwrap_or(""), &category, &sort, &output),
        Commands::Show { id } => commands::note::show(&store, id, &output),
        Commands::Download { id, out } => {
            let caller = resolve_caller(&store, &user, &password)?;
            commands::note::download(&mut store, &caller, id, out, &output)
        }
        Commands::Rate { id, rating, review } => {
            let caller = resolve_caller(&store, &user, &password)?;
            commands::rate::rate(&mut store, &caller, id, rating, review.as_deref(), &output)
        }
        Commands::Delete { id } => {
            let caller = resolve_caller(&store, &user, &password)?;
            commands::note::delete(&mut store, &caller, id, &output)
        }
        Commands::Categories => commands::note::categories(&store, &output),
    }
}

/// Authenticate the invocation's credentials against the store
///
/// Missing credentials map to `Unauthenticated`, bad ones surface as
/// `AuthenticationFailed` from the store.
fn resolve_caller(
    store: &Store,
    user: &Option<String>,
    password: &Option<String>,
) -> Result<Caller, StoreError> {
    let (Some(user), Some(password)) = (user, password) else {
        return Err(StoreError::Unauthenticated);
    };

    let account = store.authenticate(user, password)?;
    Ok(Caller::from(&account))
}
