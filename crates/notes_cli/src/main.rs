use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use analytics::AnalyticsSnapshot;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use config::{AppConfig, ConfigStore};
use core_types::NoteId;
use lexicon::{AnnotatorOptions, HeuristicAnnotator};
use note_store::{
    NewNoteOptions, NotePatch, NoteStore, SearchField, SearchOptions, StoreOptions,
    StorePaths,
};
use secrets::BodyCipher;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notes")]
#[command(author, version, about = "Personal notes with encryption, backups and content analysis")]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding config.json (default: platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Overrides the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a note
    Add {
        title: String,

        /// Note body (read from stdin when omitted)
        #[arg(short, long)]
        body: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        /// Tag to attach (repeatable). Tags are inferred when none are given
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Encrypt the body at rest
        #[arg(long, conflicts_with = "plain")]
        encrypt: bool,

        /// Store in plain text even if encryption is on by default
        #[arg(long)]
        plain: bool,
    },

    /// Print a note by id or title
    Show { note: String },

    /// Change fields of an existing note
    Edit {
        id: NoteId,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        body: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        /// Replace tags (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,

        #[arg(long, conflicts_with = "decrypt")]
        encrypt: bool,

        #[arg(long)]
        decrypt: bool,
    },

    /// Delete a note
    Rm { id: NoteId },

    /// Substring search
    Search {
        query: String,

        /// Field to search (repeatable, default: all)
        #[arg(short, long = "field", value_enum)]
        fields: Vec<FieldArg>,

        #[arg(long)]
        case_sensitive: bool,
    },

    /// Notes related to the given one
    Similar {
        id: NoteId,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Collection statistics
    Stats,

    /// List backup snapshots, newest first
    Backups,

    /// Replace the collection with a backup snapshot
    Restore { snapshot: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Title,
    Body,
    Tags,
}

impl From<FieldArg> for SearchField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Title => SearchField::Title,
            FieldArg::Body => SearchField::Body,
            FieldArg::Tags => SearchField::Tags,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_store = match &cli.config_dir {
        Some(dir) => ConfigStore::from_dir(dir),
        None => ConfigStore::from_default_location()?,
    };
    let mut config = config_store.load_or_init()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let data_dir = config.data_dir()?;
    let _guard = init_local_logger(&data_dir.join("logs"));
    info!(config = %config_store.path().display(), "notes starting");

    let store = open_store(&config)?;

    match cli.command {
        Commands::Add {
            title,
            body,
            category,
            tags,
            encrypt,
            plain,
        } => {
            let body = match body {
                Some(body) => body,
                None => read_stdin()?,
            };
            let options = NewNoteOptions {
                category,
                tags: Some(tags),
                encrypt: encrypt_flag(encrypt, plain),
            };
            print_json(&store.add(&title, &body, options)?)
        }
        Commands::Show { note } => {
            match store.find_by_key(&note)? {
                Some(found) => print_json(&found),
                None => bail!("no note matches `{note}`"),
            }
        }
        Commands::Edit {
            id,
            title,
            body,
            category,
            tags,
            encrypt,
            decrypt,
        } => {
            let patch = NotePatch {
                title,
                body,
                category,
                tags,
                encrypt: encrypt_flag(encrypt, decrypt),
            };
            print_json(&store.update(id, patch)?)
        }
        Commands::Rm { id } => print_json(&store.remove(id)?),
        Commands::Search {
            query,
            fields,
            case_sensitive,
        } => {
            let mut options = SearchOptions {
                case_sensitive,
                ..SearchOptions::default()
            };
            if !fields.is_empty() {
                options.fields = fields.into_iter().map(SearchField::from).collect();
            }
            print_json(&store.search(&query, &options)?)
        }
        Commands::Similar { id, limit } => print_json(&store.similar_to(id, limit)?),
        Commands::Stats => print_json(&AnalyticsSnapshot::from_store(&store, Utc::now())?),
        Commands::Backups => print_json(&store.list_backups()?),
        Commands::Restore { snapshot } => {
            let created = store.restore_backup(&snapshot)?;
            print_json(&serde_json::json!({
                "restored": snapshot,
                "previous_backup": created.map(|backup| backup.path),
            }))
        }
    }
}

fn open_store(config: &AppConfig) -> Result<NoteStore> {
    let paths = StorePaths::new(config.collection_path()?, config.backup_dir()?);
    let annotator = HeuristicAnnotator::new(AnnotatorOptions {
        max_tags: config.analysis.max_auto_tags,
        summary_max_len: config.analysis.summary_max_len,
    });
    let mut store = NoteStore::new(paths, Arc::new(annotator)).with_options(StoreOptions {
        encrypt_by_default: config.security.encrypt_by_default,
        backup_retention: config.backups.retain,
    });

    match std::env::var(&config.security.key_env) {
        Ok(passphrase) if !passphrase.is_empty() => {
            let cipher = BodyCipher::new(passphrase).context("failed to set up note encryption")?;
            store = store.with_cipher(cipher);
        }
        _ => debug!(key_env = %config.security.key_env, "no encryption key configured"),
    }
    Ok(store)
}

/// `Some(true)` / `Some(false)` for an explicit flag, `None` to defer to defaults.
fn encrypt_flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn read_stdin() -> Result<String> {
    let mut body = String::new();
    io::stdin()
        .read_to_string(&mut body)
        .context("failed to read note body from stdin")?;
    Ok(body)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "notes.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,notes_cli=debug,note_store=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
