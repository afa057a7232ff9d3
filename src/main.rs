//! Terminal host: edit a line-based draft with debounced autosave.
//!
//! Each stdin line is appended to the draft and fed through a
//! `FormPersister`. Commands: `:save` writes immediately, `:clear` discards
//! the stored draft, `:status` prints the saver state, `:quit` exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use autosave::{AutosaveSettings, DraftStore, FileStore, FormPersister, KvStore};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Draft {
    lines: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(name = "autosave", about = "Edit a draft with debounced autosave")]
struct Args {
    /// JSON file backing the key-value store.
    #[arg(long, env = "AUTOSAVE_STORE_PATH", default_value = "autosave.json")]
    store: PathBuf,

    /// Store key for the draft.
    #[arg(long, env = "AUTOSAVE_KEY", default_value = "draft")]
    key: String,

    /// Quiet period before saving; overrides `AUTOSAVE_DELAY_MS`.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Only save on `:save`.
    #[arg(long)]
    disabled: bool,
}

fn build_persister(store: &Arc<dyn KvStore>, key: &str, delay: Duration, enabled: bool) -> FormPersister<Draft> {
    let mut persister = FormPersister::new(Arc::clone(store), key)
        .with_delay(delay)
        .with_empty_check(|draft: &Draft| draft.lines.is_empty());
    persister.set_enabled(enabled);
    persister
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = AutosaveSettings::from_env();
    let delay = args.delay_ms.map_or(settings.delay(), Duration::from_millis);
    let enabled = settings.enabled && !args.disabled;

    let store: Arc<dyn KvStore> = Arc::new(FileStore::new(&args.store));
    let mut draft = DraftStore::init(Arc::clone(&store), args.key.as_str(), Draft::default());
    let mut persister = build_persister(&store, &args.key, delay, enabled);
    let mut current = draft.value().clone();

    tracing::info!(
        store = %args.store.display(),
        key = %args.key,
        restored_lines = current.lines.len(),
        delay = ?delay,
        enabled,
        "autosave ready"
    );
    for line in &current.lines {
        println!("{line}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" => break,
            ":save" => {
                if draft.save(current.clone()).is_ok() {
                    println!("saved {} lines", current.lines.len());
                }
            }
            ":clear" => {
                if draft.clear().is_ok() {
                    persister.teardown();
                    persister = build_persister(&store, &args.key, delay, enabled);
                    current = draft.value().clone();
                    println!("draft cleared");
                }
            }
            ":status" => {
                let status = persister.status();
                println!(
                    "phase={:?} saving={} last_saved_lines={}",
                    persister.phase(),
                    status.is_saving,
                    status.last_saved.map_or(0, |d| d.lines.len())
                );
            }
            _ => {
                current.lines.push(line);
                persister.observe(current.clone());
            }
        }
    }

    // Pending debounced work is discarded on teardown; flush explicitly instead.
    persister.teardown();
    if persister.last_saved().as_ref() != Some(&current) && !current.lines.is_empty() {
        let lines = current.lines.len();
        match draft.save(current) {
            Ok(()) => println!("saved {lines} lines"),
            Err(e) => eprintln!("final save failed: {e}"),
        }
    }
    Ok(())
}
