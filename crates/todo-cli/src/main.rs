mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use todo_store::{FileKeyValueStore, PersistenceError, TodoError, TodoList, TodoStore};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TodoConfig;

const EMPTY_LIST_MESSAGE: &str = "No todos available. Add one to get started!";
const EMPTY_TEXT_WARNING: &str = "Please enter a valid todo.";
const SHORT_ID_LEN: usize = 8;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Personal to-do list")]
#[command(version)]
struct Cli {
    /// Directory holding the stored list
    #[arg(long, env = "TODO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage key the list is kept under
    #[arg(long, env = "TODO_STORAGE_KEY")]
    key: Option<String>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the list
    List,
    /// Add a todo
    Add {
        /// Todo text
        text: Vec<String>,
    },
    /// Toggle a todo between done and not done
    Done {
        /// Id or unique id prefix
        id: String,
    },
    /// Change the text of a todo; no text leaves it unchanged
    Edit {
        /// Id or unique id prefix
        id: String,
        /// New text
        text: Vec<String>,
    },
    /// Remove a todo
    Remove {
        /// Id or unique id prefix
        id: String,
    },
}

/// Store diagnostics stay out of the terminal unless asked for; failed
/// writes reach the user as warnings instead.
fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn,todo_store=off"
    }
}

fn init_tracing(debug: bool) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(debug))),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = TodoConfig::resolve(cli.data_dir, cli.key)?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        key = %config.storage_key,
        "Opening todo list"
    );

    let store =
        TodoStore::new(FileKeyValueStore::new(&config.data_dir)).with_key(&config.storage_key);
    let mut errors = store.subscribe_errors();
    let current = store.load().await;

    let list = match cli.command.unwrap_or(Commands::List) {
        Commands::List => current,
        Commands::Add { text } => match store.add(&text.join(" ")).await {
            Ok(list) => list,
            Err(TodoError::EmptyText) => {
                eprintln!("{} {}", "Warning:".yellow().bold(), EMPTY_TEXT_WARNING);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Done { id } => match lookup(&current, &id) {
            Some(id) => store.toggle_complete(&id).await,
            None => current,
        },
        Commands::Edit { id, text } => match lookup(&current, &id) {
            Some(id) => {
                let text = text.join(" ");
                let new_text = (!text.is_empty()).then_some(text.as_str());
                store.edit(&id, new_text).await
            }
            None => current,
        },
        Commands::Remove { id } => match lookup(&current, &id) {
            Some(id) => store.remove(&id).await,
            None => current,
        },
    };

    while let Ok(error) = errors.try_recv() {
        if is_user_facing(&error) {
            eprintln!("{} {}", "Warning:".yellow().bold(), error);
        }
    }

    print!("{}", render(&list));
    Ok(())
}

/// Unreadable stored lists are only logged; the user just sees an empty list
fn is_user_facing(error: &PersistenceError) -> bool {
    matches!(error, PersistenceError::Write(_))
}

fn lookup(list: &TodoList, id: &str) -> Option<String> {
    let found = resolve_id(list, id);
    if found.is_none() {
        eprintln!("{} no single todo matches {:?}", "Warning:".yellow().bold(), id);
    }
    found
}

/// Accept either a full id or a prefix that matches exactly one item
fn resolve_id(list: &TodoList, id: &str) -> Option<String> {
    if list.contains(id) {
        return Some(id.to_string());
    }
    if id.is_empty() {
        return None;
    }

    let mut matches = list.iter().filter(|item| item.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Some(item.id.clone()),
        _ => None,
    }
}

fn render(list: &TodoList) -> String {
    if list.is_empty() {
        return format!("{}\n", EMPTY_LIST_MESSAGE.red());
    }

    let mut output = String::new();
    for item in list {
        let short_id: String = item.id.chars().take(SHORT_ID_LEN).collect();
        if item.completed {
            output.push_str(&format!(
                "{} {} {}\n",
                "[x]".green(),
                short_id.dimmed(),
                item.text.dimmed().strikethrough()
            ));
        } else {
            output.push_str(&format!("[ ] {} {}\n", short_id.dimmed(), item.text));
        }
    }
    output.push_str(&format!("\n{}\n", list.summary()));
    output
}
