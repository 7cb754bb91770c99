//! Keeps a [`ControllerDb`] in sync with its directory.
//!
//! Change notifications are treated as hints only: any reported change leads
//! to a full reload of the directory, never to an incremental patch.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::store::{ControllerDb, ReloadReport};
use crate::error::{JoyError, Result};

/// Source of "the directory may have changed" notifications.
pub trait ChangeSource {
    /// Returns true if something changed since the previous call.
    fn changed(&mut self) -> io::Result<bool>;

    /// Takes the current state as the baseline without reporting a change.
    fn reset(&mut self) -> io::Result<()> {
        self.changed().map(|_| ())
    }
}

type Fingerprint = BTreeMap<OsString, (u64, Option<SystemTime>)>;

/// Detects changes by comparing name, size and mtime of every entry.
#[derive(Debug)]
pub struct PollingWatcher {
    dir: PathBuf,
    last: Option<Fingerprint>,
}

impl PollingWatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: None,
        }
    }

    fn fingerprint(&self) -> io::Result<Fingerprint> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // A missing directory is just an empty one.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Fingerprint::new()),
            Err(e) => return Err(e),
        };

        let mut fingerprint = Fingerprint::new();
        for entry in entries {
            let entry = entry?;
            let stamp = entry
                .metadata()
                .map(|m| (m.len(), m.modified().ok()))
                .unwrap_or((0, None));
            fingerprint.insert(entry.file_name(), stamp);
        }
        Ok(fingerprint)
    }
}

impl ChangeSource for PollingWatcher {
    fn changed(&mut self) -> io::Result<bool> {
        let current = self.fingerprint()?;
        let changed = self.last.as_ref() != Some(&current);
        self.last = Some(current);
        Ok(changed)
    }
}

/// Drives reloads of a shared [`ControllerDb`] from a [`ChangeSource`].
pub struct Reconciler<S = PollingWatcher> {
    db: Arc<ControllerDb>,
    source: Option<S>,
    reloads: u64,
}

impl Reconciler<PollingWatcher> {
    /// Reconciler that polls the database directory.
    pub fn polling(db: Arc<ControllerDb>) -> Self {
        let watcher = PollingWatcher::new(db.dir());
        Self::new(db, watcher)
    }
}

impl<S: ChangeSource> Reconciler<S> {
    pub fn new(db: Arc<ControllerDb>, source: S) -> Self {
        Self {
            db,
            source: Some(source),
            reloads: 0,
        }
    }

    /// The database this reconciler keeps up to date.
    pub fn db(&self) -> &Arc<ControllerDb> {
        &self.db
    }

    /// Number of reloads performed so far, including the initial one.
    pub const fn reload_count(&self) -> u64 {
        self.reloads
    }

    /// True until [`Reconciler::finalize`] is called.
    pub const fn is_watching(&self) -> bool {
        self.source.is_some()
    }

    /// Creates the directory and performs the initial load.
    ///
    /// On failure the database is left empty, so every lookup misses, and the
    /// error is returned for the caller to report.
    pub fn initialize(&mut self) -> Result<ReloadReport> {
        let result = self.try_initialize();
        if let Err(err) = &result {
            warn!(dir = %self.db.dir().display(), error = %err, "Failed to load profile database");
            self.db.clear();
        }
        result
    }

    fn try_initialize(&mut self) -> Result<ReloadReport> {
        self.db.ensure_dir()?;
        if let Some(source) = self.source.as_mut() {
            source
                .reset()
                .map_err(|e| JoyError::io(self.db.dir(), e))?;
        }
        self.on_directory_changed()
    }

    /// Reloads the whole directory.
    pub fn on_directory_changed(&mut self) -> Result<ReloadReport> {
        let report = self.db.reload()?;
        self.reloads += 1;
        Ok(report)
    }

    /// Checks the change source once and reloads if it reported a change.
    pub fn poll(&mut self) -> Result<Option<ReloadReport>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        let changed = source
            .changed()
            .map_err(|e| JoyError::io(self.db.dir(), e))?;
        if !changed {
            return Ok(None);
        }
        debug!(dir = %self.db.dir().display(), "Directory changed, reloading");
        self.on_directory_changed().map(Some)
    }

    /// Polls every `interval` until `shutdown` resolves, calling `on_reload`
    /// after each reload. Errors are logged and polling continues.
    pub async fn run<F, R>(&mut self, interval: Duration, shutdown: F, mut on_reload: R)
    where
        F: Future<Output = ()>,
        R: FnMut(&ReloadReport),
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            dir = %self.db.dir().display(),
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Watching profile directory"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => match self.poll() {
                    Ok(Some(report)) => on_reload(&report),
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "Failed to reconcile profile directory"),
                },
            }
        }

        debug!(reloads = self.reloads, "Stopped watching profile directory");
    }

    /// Stops watching. The loaded profiles stay available.
    pub fn finalize(&mut self) {
        if self.source.take().is_some() {
            debug!(dir = %self.db.dir().display(), "Reconciler finalized");
        }
    }
}
