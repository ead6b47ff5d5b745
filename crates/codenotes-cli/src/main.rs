use anyhow::{Context, Result, bail};
use codenotes_config::{Config, DocumentFilter};
use codenotes_engine::{
    AnchorId, AnnotationStore, ContentChange, Range, load_annotations, save_annotations,
};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

/// One event from a recorded editor session
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SessionEvent {
    Open {
        document: String,
        text: String,
    },
    Annotate {
        document: String,
        range: Range,
        annotation: String,
    },
    Copy {
        document: String,
        range: Range,
    },
    Change {
        document: String,
        changes: Vec<ContentChange>,
    },
    Remove {
        id: AnchorId,
    },
    Rename {
        from: String,
        to: String,
    },
}

impl SessionEvent {
    fn documents(&self) -> Vec<&str> {
        match self {
            SessionEvent::Open { document, .. }
            | SessionEvent::Annotate { document, .. }
            | SessionEvent::Copy { document, .. }
            | SessionEvent::Change { document, .. } => vec![document.as_str()],
            SessionEvent::Rename { from, to } => vec![from.as_str(), to.as_str()],
            SessionEvent::Remove { .. } => vec![],
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct ReplayStats {
    applied: usize,
    skipped: usize,
}

/// Feed session events to the store in order
fn replay(
    store: &mut AnnotationStore,
    events: Vec<SessionEvent>,
    filter: &DocumentFilter,
) -> ReplayStats {
    let mut stats = ReplayStats::default();

    for event in events {
        if let Some(ignored) = event
            .documents()
            .into_iter()
            .find(|document| !filter.is_tracked(document))
        {
            log::debug!("skipping event for ignored document {ignored}");
            stats.skipped += 1;
            continue;
        }

        let outcome = match event {
            SessionEvent::Open { document, text } => {
                store.open_document(document, &text);
                Ok(())
            }
            SessionEvent::Annotate {
                document,
                range,
                annotation,
            } => store
                .annotate(&document, range, annotation)
                .map(|id| log::info!("annotated {document} as {id}")),
            SessionEvent::Copy { document, range } => {
                store.copy(&document, &range);
                Ok(())
            }
            SessionEvent::Change { document, changes } => {
                let summary = store.apply_changes(&document, &changes);
                if !summary.removed.is_empty() || !summary.pasted.is_empty() {
                    log::info!(
                        "{document}: {} removed, {} pasted",
                        summary.removed.len(),
                        summary.pasted.len()
                    );
                }
                Ok(())
            }
            SessionEvent::Remove { id } => store.remove(id).map(|_| ()),
            SessionEvent::Rename { from, to } => {
                store.rename_document(&from, &to);
                Ok(())
            }
        };

        match outcome {
            Ok(()) => stats.applied += 1,
            Err(e) => {
                log::warn!("skipping event: {e}");
                stats.skipped += 1;
            }
        }
    }

    stats
}

/// Replay a session file on top of the saved annotations and save the result
fn replay_session(
    session_path: &Path,
    annotations_path: &Path,
    filter: &DocumentFilter,
) -> Result<(AnnotationStore, ReplayStats)> {
    let session = fs::read_to_string(session_path)
        .with_context(|| format!("Failed to read session file {}", session_path.display()))?;
    let events: Vec<SessionEvent> = serde_json::from_str(&session)
        .with_context(|| format!("Failed to parse session file {}", session_path.display()))?;

    let mut store = AnnotationStore::from_anchors(load_annotations(annotations_path)?);
    let stats = replay(&mut store, events, filter);
    save_annotations(annotations_path, store.anchors())?;
    Ok((store, stats))
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: codenotes-cli <session.json> [annotations.json]");
        process::exit(2);
    }

    let config = Config::load()?;
    let annotations_path = match (args.get(2), &config) {
        (Some(path), _) => PathBuf::from(path),
        (None, Some(config)) => config.annotations_path.clone(),
        (None, None) => bail!(
            "No annotations file given and no config file at {}",
            Config::config_path().display()
        ),
    };
    log::info!("Using annotations file {}", annotations_path.display());

    let filter = match &config {
        Some(config) => config.document_filter()?,
        None => DocumentFilter::default(),
    };
    let (store, stats) = replay_session(Path::new(&args[1]), &annotations_path, &filter)?;

    for anchor in store.anchors() {
        println!(
            "{}\t{}:{}:{}-{}:{}\t{}",
            anchor.id,
            anchor.document,
            anchor.start_line,
            anchor.start_offset,
            anchor.end_line,
            anchor.end_offset,
            anchor.annotation
        );
    }
    log::info!(
        "Replayed {} events ({} skipped), {} annotations saved",
        stats.applied,
        stats.skipped,
        store.len()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
