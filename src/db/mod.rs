//! Controller configuration database.
//!
//! Maps a joystick's hardware identity to a saved axis-calibration profile.
//! Profiles live as one editable text file each in a flat directory; the
//! in-memory map is rebuilt from that directory whenever it changes.

mod axis;
mod codec;
mod filename;
mod key;
mod keyfile;
mod profile;
mod store;
mod watch;

pub use axis::{Axis, AxisCalibration, UnknownAxis};
pub use codec::{decode, encode, DecodeError, MATCH_GROUP};
pub use filename::{
    is_editor_temp, is_profile_file, make_filename, sanitize_name, EDITOR_TEMP_MARKER,
    FILE_EXTENSION,
};
pub use key::{Key, PinnedFields};
pub use keyfile::{KeyFile, KeyFileError};
pub use profile::Profile;
pub use store::{
    find_in, load_file, scan_directory, ControllerDb, ProfileMap, ReloadReport, ReloadSummary,
};
pub use watch::{ChangeSource, PollingWatcher, Reconciler};
