//! Command-line front end for the noteassist engine.
//!
//! # Commands
//!
//! - `predict <prefix>`: build a model from a note and print the suggested
//!   next word for `<prefix>`
//! - `model`: print the model built from a note, one prefix per line
//! - `notes`: list stored notes, optionally filtered by a search term
//! - `delete <id>`: remove a stored note
//!
//! `predict` and `model` read the note from `--note <id>` (the note store),
//! `--file`, or stdin when neither is given. The sampling policy comes from
//! the config file unless `--policy` is set.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use noteassist::config::APP_NAME;
use noteassist::note::{sort_notes, Notebook};
use noteassist::{predict, Config, FileStore, Model, Preferences, SamplingPolicy};

#[derive(Parser, Debug)]
#[command(name = "noteassist")]
#[command(about = "Next-word prediction from your own notes")]
#[command(version)]
struct Args {
    /// Note to learn from (defaults to stdin)
    #[arg(short, long, global = true, conflicts_with = "note")]
    file: Option<PathBuf>,

    /// Stored note to learn from, by id
    #[arg(short, long, global = true)]
    note: Option<String>,

    /// Override the configured sampling policy
    #[arg(long, global = true)]
    policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest the word following PREFIX
    Predict { prefix: String },
    /// Print every prefix with its candidates
    Model {
        /// Only print the first N prefixes
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List stored notes in the preferred order
    Notes {
        /// Only notes containing this text, ignoring case
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Delete a stored note
    Delete { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    MaxFrequency,
    Laplace,
}

impl From<PolicyArg> for SamplingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::MaxFrequency => SamplingPolicy::MaxFrequency,
            PolicyArg::Laplace => SamplingPolicy::Laplace,
        }
    }
}

fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn read_note(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let Some(id) = &args.note else {
        return Ok(read_input(args.file.as_deref())?);
    };

    let store = FileStore::for_app(APP_NAME)?;
    let notebook = Notebook::load(&store)?;
    match notebook.find(id) {
        Some(note) => Ok(note.text.clone()),
        None => Err(format!("no note with id {id}").into()),
    }
}

/// Load the notebook with blank notes dropped, saving it back if any were.
fn load_notebook(store: &FileStore) -> Result<Notebook, Box<dyn std::error::Error>> {
    let mut notebook = Notebook::load(store)?;
    let pruned = notebook.prune_empty();
    if pruned > 0 {
        info!(pruned, "removed blank notes");
        notebook.save(store)?;
    }
    Ok(notebook)
}

fn list_notes(search: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::for_app(APP_NAME)?;
    let notebook = load_notebook(&store)?;
    let prefs = Preferences::load(&store);

    let mut notes = notebook.search(search.unwrap_or_default());
    sort_notes(&mut notes, prefs.sorting);
    for note in notes {
        println!("{}\t{}", note.id, note.title);
    }
    Ok(())
}

fn delete_note(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::for_app(APP_NAME)?;
    let mut notebook = load_notebook(&store)?;
    match notebook.remove(id) {
        Some(note) => {
            notebook.save(&store)?;
            info!(id, title = %note.title, "note deleted");
        }
        None => warn!(id, "no such note"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    // Persist defaults so users get a concrete config.toml on first run.
    if let Err(err) = config.save() {
        warn!("failed to persist config defaults: {err}");
    }

    match &args.command {
        Command::Notes { search } => return list_notes(search.as_deref()),
        Command::Delete { id } => return delete_note(id),
        Command::Predict { .. } | Command::Model { .. } => {}
    }

    let policy = args.policy.map_or(config.policy, SamplingPolicy::from);
    let text = read_note(&args)?;

    let Some(model) = Model::from_text(&text) else {
        info!("note has fewer than two words, no model available");
        return Ok(());
    };

    match args.command {
        Command::Predict { prefix } => {
            match predict(&prefix, &model, policy, &mut rand::thread_rng()) {
                Some(candidate) => println!("{}", candidate.word),
                None => info!(prefix = %prefix, "no suggestion"),
            }
        }
        Command::Model { limit } => {
            for (prefix, candidates) in model.iter().take(limit.unwrap_or(usize::MAX)) {
                let list: Vec<String> = candidates
                    .iter()
                    .map(|c| format!("{}×{}", c.word, c.count))
                    .collect();
                println!("{prefix}: {}", list.join(", "));
            }
        }
        Command::Notes { .. } | Command::Delete { .. } => {}
    }

    Ok(())
}
