use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::thread;

/// Plain text notes file, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct NotesStore {
    path: PathBuf,
}

impl NotesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the notes. A missing file is an empty note.
    pub fn load(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err).with_context(|| format!("read {}", self.path.display())),
        }
    }

    /// Write `text` to a sibling temp file and rename it over the notes file.
    pub fn save(&self, text: &str) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, text).with_context(|| format!("write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }

    /// Start a writer thread so saves never run on the UI thread.
    pub fn spawn_writer(&self) -> Result<NotesWriter> {
        let (tx, rx) = channel::<String>();
        let store = self.clone();
        thread::Builder::new()
            .name("notes-writer".into())
            .spawn(move || {
                while let Ok(mut text) = rx.recv() {
                    // Only the newest text matters when edits pile up.
                    if let Some(latest) = rx.try_iter().last() {
                        text = latest;
                    }
                    if let Err(err) = store.save(&text) {
                        tracing::warn!(?err, "failed to save notes");
                    }
                }
                tracing::debug!("notes writer exiting");
            })
            .context("spawn notes writer")?;
        Ok(NotesWriter { tx })
    }
}

/// Handle used by the UI to queue a save. Dropping the last handle stops the
/// writer thread after it finishes pending work.
#[derive(Debug, Clone)]
pub struct NotesWriter {
    tx: Sender<String>,
}

impl NotesWriter {
    pub fn save(&self, text: String) {
        if self.tx.send(text).is_err() {
            tracing::warn!("notes writer is gone; edit not saved");
        }
    }
}
