//! In-memory profile map backed by a directory of profile files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use super::codec;
use super::filename::{is_profile_file, make_filename};
use super::key::{Key, PinnedFields};
use super::profile::Profile;
use crate::error::{JoyError, Result};

/// Profiles keyed by identity, iterated in key order.
pub type ProfileMap = BTreeMap<Key, Profile>;

/// Outcome of a directory scan.
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Number of profiles admitted into the map.
    pub loaded: usize,
    /// Profile files that were read, whether or not they were admitted.
    pub files_processed: Vec<PathBuf>,
    /// Entries ignored because of their type, extension or name.
    pub skipped: Vec<PathBuf>,
    /// Non-fatal problems: malformed files, duplicate keys, unreadable files.
    pub issues: Vec<JoyError>,
}

impl ReloadReport {
    /// Returns true if any file was rejected.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Number of files that decoded to an already loaded key.
    pub fn duplicate_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|e| matches!(e, JoyError::DuplicateKey { .. }))
            .count()
    }

    /// Serializable view for reporting.
    pub fn summary(&self) -> ReloadSummary {
        ReloadSummary {
            loaded: self.loaded,
            files_processed: self.files_processed.len(),
            skipped: self.skipped.len(),
            issues: self.issues.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Counts and messages of a [`ReloadReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    pub loaded: usize,
    pub files_processed: usize,
    pub skipped: usize,
    pub issues: Vec<String>,
}

/// Builds a fresh map from every profile file in `dir`.
///
/// Entries are visited in file-name order, so when two files decode to the
/// same key the one whose name sorts first is kept. Malformed files are
/// reported and left out; they never contribute a partial profile.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn scan_directory(dir: &Path) -> Result<(ProfileMap, ReloadReport)> {
    debug!("Scanning profile directory");

    let mut map = ProfileMap::new();
    let mut report = ReloadReport::default();

    let listing = fs::read_dir(dir).map_err(|e| JoyError::io(dir, e))?;
    let entries = collect_entries(dir, listing.map(|entry| entry.map(|e| e.path())), &mut report);

    for path in entries {
        // Follows symlinks; dangling links and directories are skipped.
        let is_file = fs::metadata(&path).is_ok_and(|m| m.is_file());
        if !is_file || !is_profile_file(&path) {
            trace!(path = %path.display(), "Skipping entry");
            report.skipped.push(path);
            continue;
        }

        report.files_processed.push(path.clone());

        let (key, profile) = match load_file(&path) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to load profile");
                report.issues.push(err);
                continue;
            }
        };

        if let Some(existing) = map.get(&key) {
            let first = existing.path().map(Path::to_path_buf).unwrap_or_default();
            warn!(
                key = %key,
                first = %first.display(),
                duplicate = %path.display(),
                "Duplicate profile, keeping the first one"
            );
            report.issues.push(JoyError::DuplicateKey {
                key,
                first,
                second: path,
            });
            continue;
        }

        debug!(key = %key, path = %path.display(), axes = profile.axis_count(), "Loaded profile");
        map.insert(key, profile);
    }

    report.loaded = map.len();
    Ok((map, report))
}

/// Sorted entry paths. An unreadable entry is recorded in the report and skipped.
fn collect_entries(
    dir: &Path,
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
    report: &mut ReloadReport,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "Failed to read directory entry");
                report.issues.push(JoyError::io(dir, err));
            }
        }
    }
    paths.sort();
    paths
}

/// Reads and decodes one profile file; the returned profile remembers `path`.
pub fn load_file(path: &Path) -> Result<(Key, Profile)> {
    let text = fs::read_to_string(path).map_err(|e| JoyError::io(path, e))?;
    let (key, profile) = codec::decode(&text).map_err(|source| JoyError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((key, profile.with_path(path.to_path_buf())))
}

/// Looks up the profile for `query`.
///
/// An exact key wins. Otherwise the first stored key, in key order, that
/// matches `query` under the wildcard rule is returned.
pub fn find_in<'a>(map: &'a ProfileMap, query: &Key) -> Option<(&'a Key, &'a Profile)> {
    if let Some(entry) = map.get_key_value(query) {
        return Some(entry);
    }
    map.iter().find(|(key, _)| key.matches(query))
}

/// Controller profile database.
///
/// The map is held as an immutable snapshot that [`ControllerDb::reload`]
/// replaces wholesale. `save` and `remove` only touch the directory; their
/// effect becomes visible after the next reload.
#[derive(Debug)]
pub struct ControllerDb {
    dir: PathBuf,
    profiles: RwLock<Arc<ProfileMap>>,
}

impl ControllerDb {
    /// Creates an empty database for `dir`. No I/O happens until `reload`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            profiles: RwLock::new(Arc::new(ProfileMap::new())),
        }
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the backing directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| JoyError::io(&self.dir, e))
    }

    /// Current snapshot. Holding it keeps a consistent view across reloads.
    pub fn snapshot(&self) -> Arc<ProfileMap> {
        Arc::clone(&self.profiles.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn replace(&self, map: ProfileMap) {
        *self.profiles.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(map);
    }

    /// Rescans the directory and swaps in the new map.
    ///
    /// On an unreadable directory the previous snapshot is left untouched and
    /// the error is returned.
    pub fn reload(&self) -> Result<ReloadReport> {
        let (map, report) = scan_directory(&self.dir)?;
        info!(
            dir = %self.dir.display(),
            loaded = report.loaded,
            issues = report.issues.len(),
            "Loaded {} profile(s)",
            report.loaded
        );
        self.replace(map);
        Ok(report)
    }

    /// Drops every loaded profile.
    pub fn clear(&self) {
        self.replace(ProfileMap::new());
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Finds the profile for a connected device; `0` and `""` mean unknown.
    pub fn find(&self, vendor: u16, product: u16, version: u16, name: &str) -> Option<(Key, Profile)> {
        self.find_key(&Key::from_raw(vendor, product, version, name))
    }

    /// Same as [`ControllerDb::find`] with a prepared key.
    pub fn find_key(&self, query: &Key) -> Option<(Key, Profile)> {
        let snapshot = self.snapshot();
        let found = find_in(&snapshot, query).map(|(k, p)| (k.clone(), p.clone()));
        trace!(query = %query, found = found.is_some(), "Profile lookup");
        found
    }

    /// All loaded profiles in key order.
    pub fn list(&self) -> Vec<(Key, Profile)> {
        self.snapshot()
            .iter()
            .map(|(k, p)| (k.clone(), p.clone()))
            .collect()
    }

    /// Writes `profile` under a file name derived from the pinned identity
    /// fields and returns it with its new path.
    ///
    /// An existing file with the same derived name is overwritten.
    pub fn save(
        &self,
        vendor: u16,
        product: u16,
        version: u16,
        name: &str,
        profile: Profile,
        pinned: PinnedFields,
    ) -> Result<Profile> {
        let key = Key::from_raw(vendor, product, version, name).pinned(pinned);
        self.save_key(&key, profile)
    }

    /// Same as [`ControllerDb::save`] with a prepared key.
    pub fn save_key(&self, key: &Key, profile: Profile) -> Result<Profile> {
        if key.is_wildcard() {
            return Err(JoyError::InvalidIdentity);
        }
        let path = self.path_for(key)?;

        self.ensure_dir()?;
        fs::write(&path, codec::encode(key, &profile)).map_err(|e| JoyError::io(&path, e))?;
        info!(key = %key, path = %path.display(), "Saved profile");

        Ok(profile.with_path(path))
    }

    /// Deletes a profile file, given its name or its path inside the directory.
    ///
    /// Only files a reload would read are accepted; other files in the
    /// directory are left alone.
    pub fn remove(&self, filename: &Path) -> Result<PathBuf> {
        let path = if filename.is_absolute() || filename.parent() == Some(self.dir.as_path()) {
            filename.to_path_buf()
        } else {
            self.dir.join(filename)
        };

        if path.parent() != Some(self.dir.as_path()) || path.file_name().is_none() {
            return Err(JoyError::OutsideDatabase { path });
        }
        if !is_profile_file(&path) {
            return Err(JoyError::InvalidArgument(format!(
                "Not a profile file: {}",
                path.display()
            )));
        }

        fs::remove_file(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JoyError::NotFound { path: path.clone() }
            } else {
                JoyError::io(&path, e)
            }
        })?;
        info!(path = %path.display(), "Removed profile");
        Ok(path)
    }

    /// Deletes the file `save` would write for this identity.
    pub fn remove_identity(&self, vendor: u16, product: u16, version: u16, name: &str) -> Result<PathBuf> {
        let key = Key::from_raw(vendor, product, version, name);
        let path = self.path_for(&key)?;
        self.remove(&path)
    }

    /// Full path of the file that stores `key`.
    pub fn path_for(&self, key: &Key) -> Result<PathBuf> {
        let filename = make_filename(
            key.vendor().unwrap_or(0),
            key.product().unwrap_or(0),
            key.version().unwrap_or(0),
            key.name().unwrap_or(""),
        )?;
        Ok(self.dir.join(filename))
    }
}
