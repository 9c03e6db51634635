use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::filters::{FilterExpr, parse_filter};
use crate::operations::{
    AutoSaveOutcome, DeleteRequest, ExportTarget, ListQuery, SaveOutcome, SaveRequest,
    SearchQuery, Section, SessionEndInput, VaultContext, auto_save, delete_conversations,
    export_conversations, get_conversation, list_conversations, parse_date_bound,
    rebuild_index, save_conversation, search_conversations,
};
use crate::store::FsStore;
use crate::utils::{ExportFormat, get_vault_dir, save_config};

#[derive(Parser)]
#[command(name = "session-vault")]
#[command(version = "0.1.0")]
#[command(about = "Save, search and export AI coding session transcripts", long_about = None)]
pub struct Cli {
    /// Vault root (defaults to $VAULT_DIR, then ~/.session-vault)
    #[arg(long, global = true, value_name = "DIR")]
    pub vault_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a JSONL transcript into the vault
    Save {
        /// Path to the session transcript
        transcript: PathBuf,
        /// Project directory the session ran in (defaults to the current directory)
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
        /// Tag to attach; repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Save from a SessionEnd hook payload read on stdin
    AutoSave,
    /// List saved conversations, newest first
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Filter expression, e.g. "tag:auth AND since:2026-01-01"
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Search summaries, notes, tags and transcripts
    Search {
        query: String,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// YYYY-MM-DD or RFC 3339
        #[arg(long)]
        from: Option<String>,
        /// YYYY-MM-DD (inclusive) or RFC 3339
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one conversation by id or id prefix
    Get {
        id: String,
        /// full, decisions, code or errors
        #[arg(long, default_value = "full")]
        section: Section,
    },
    /// Delete conversations (preview unless --confirm)
    Delete {
        ids: Vec<String>,
        /// Age such as 30d, 12h or 6m
        #[arg(long)]
        older_than: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        confirm: bool,
    },
    /// Export one conversation, or `all`
    Export {
        target: String,
        /// md or json (defaults to the configured format)
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Rebuild the index from metadata files
    Rebuild,
    /// Show or change the vault configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let root = match cli.vault_dir {
        Some(dir) => dir,
        None => get_vault_dir()?,
    };
    tracing::debug!(root = %root.display(), "opening vault");
    let ctx = VaultContext::open(root);

    match cli.command {
        Commands::Save { transcript, project, session_id, tags, note } => {
            let project_path = match project {
                Some(project) => project,
                None => env::current_dir()
                    .context("Failed to determine the current directory")?
                    .to_string_lossy()
                    .into_owned(),
            };
            let request = SaveRequest {
                transcript_path: transcript,
                project_path,
                session_id,
                tags: tags.into_iter().collect(),
                note,
            };
            match save_conversation(&ctx, &request)? {
                SaveOutcome::Saved(record) => print_json(&record)?,
                SaveOutcome::Empty => print_json(&json!({
                    "status": "empty",
                    "message": "No messages found in transcript",
                }))?,
            }
        }
        Commands::AutoSave => auto_save_from_stdin(&ctx)?,
        Commands::List { project, tag, filter, limit, offset } => {
            let query =
                ListQuery { project, tag, filter: parse_filter_arg(filter)?, limit, offset };
            print_json(&list_conversations(&ctx, &query)?)?;
        }
        Commands::Search { query, project, tag, from, to, filter } => {
            let query = SearchQuery {
                query,
                project,
                tag,
                date_from: from.as_deref().map(|d| parse_date_bound(d, false)).transpose()?,
                date_to: to.as_deref().map(|d| parse_date_bound(d, true)).transpose()?,
                filter: parse_filter_arg(filter)?,
            };
            print_json(&search_conversations(&ctx, &query)?)?;
        }
        Commands::Get { id, section } => {
            print_json(&get_conversation(&ctx, &id, section)?)?;
        }
        Commands::Delete { ids, older_than, tag, confirm } => {
            let request = DeleteRequest { ids, older_than, tag, confirm };
            print_json(&delete_conversations(&ctx, &request)?)?;
        }
        Commands::Export { target, format, output } => {
            let format = format.unwrap_or(ctx.config.default_export_format);
            let files =
                export_conversations(&ctx, &ExportTarget::parse(&target), format, &output)?;
            print_json(&json!({ "exported": files.len(), "files": files }))?;
        }
        Commands::Rebuild => {
            let count = rebuild_index(&ctx)?;
            print_json(&json!({ "status": "rebuilt", "conversations": count }))?;
        }
        Commands::Config { action } => configure(ctx, action.unwrap_or(ConfigAction::Show))?,
    }

    Ok(())
}

fn auto_save_from_stdin(ctx: &VaultContext<FsStore>) -> Result<()> {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw).context("Failed to read hook input from stdin")?;
    let input: SessionEndInput =
        serde_json::from_str(&raw).context("Hook input is not a SessionEnd JSON payload")?;

    match auto_save(ctx, &input)? {
        AutoSaveOutcome::Saved(record) => print_json(&record),
        AutoSaveOutcome::Skipped(reason) => bail!("Auto-save skipped: {}", reason),
    }
}

fn configure(mut ctx: VaultContext<FsStore>, action: ConfigAction) -> Result<()> {
    if let ConfigAction::Set { key, value } = action {
        ctx.config.set(&key, &value)?;
        save_config(&ctx.store, &ctx.config)?;
    }
    print_json(&ctx.config)
}

fn parse_filter_arg(filter: Option<String>) -> Result<FilterExpr> {
    match filter {
        Some(filter) => parse_filter(&filter).context("Invalid --filter expression"),
        None => Ok(FilterExpr::default()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
