//! Conversion between a `(Key, Profile)` pair and profile file text.
//!
//! ```text
//! # 1234:5678:0001 My Controller
//! [match]
//! vendor=1234
//! product=5678
//! version=0001
//! name=My Controller
//!
//! [ABS_X]
//! min=-32768
//! max=32767
//! fuzz=16
//! flat=128
//! res=0
//! flat_type=center
//! ```
//!
//! Unset identity fields are left out of `[match]` entirely.

use thiserror::Error;

use super::axis::{Axis, AxisCalibration, UnknownAxis};
use super::key::Key;
use super::keyfile::{KeyFile, KeyFileError};
use super::profile::Profile;

/// Name of the identity section.
pub const MATCH_GROUP: &str = "match";

/// Reasons a profile file cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Syntax(#[from] KeyFileError),

    #[error("no [match] section")]
    MissingMatch,

    #[error("section [{0}] is not a known axis")]
    UnknownAxis(String),

    #[error("[{group}] {key}: '{value}' is not a hexadecimal number")]
    InvalidHex {
        group: String,
        key: String,
        value: String,
    },

    #[error("[{group}] {key}: '{value}' is not an integer")]
    InvalidInteger {
        group: String,
        key: String,
        value: String,
    },
}

impl From<UnknownAxis> for DecodeError {
    fn from(err: UnknownAxis) -> Self {
        Self::UnknownAxis(err.0)
    }
}

/// Parses profile file text.
pub fn decode(text: &str) -> Result<(Key, Profile), DecodeError> {
    let doc = KeyFile::parse(text)?;

    if !doc.has_group(MATCH_GROUP) {
        return Err(DecodeError::MissingMatch);
    }

    let key = Key::new(
        get_hex(&doc, "vendor")?,
        get_hex(&doc, "product")?,
        get_hex(&doc, "version")?,
        doc.get(MATCH_GROUP, "name").map(str::to_string),
    );

    let mut profile = Profile::new();
    for group in doc.groups().filter(|&g| g != MATCH_GROUP) {
        let axis: Axis = group.parse()?;
        let calibration = AxisCalibration {
            min: get_int(&doc, group, "min")?,
            max: get_int(&doc, group, "max")?,
            fuzz: get_int(&doc, group, "fuzz")?,
            flat: get_int(&doc, group, "flat")?,
            res: get_int(&doc, group, "res")?,
            flat_centered: matches!(doc.get(group, "flat_type"), Some("center" | "centered")),
        };
        profile.set_axis(axis, calibration);
    }

    Ok((key, profile))
}

/// Renders a profile file. `decode(&encode(k, p))` yields `(k, p)` back,
/// apart from the profile's path which is not part of the file.
pub fn encode(key: &Key, profile: &Profile) -> String {
    let mut doc = KeyFile::new();
    doc.set_comment(key.to_string());
    doc.add_group(MATCH_GROUP);

    if let Some(vendor) = key.vendor() {
        doc.set(MATCH_GROUP, "vendor", format!("{vendor:04x}"));
    }
    if let Some(product) = key.product() {
        doc.set(MATCH_GROUP, "product", format!("{product:04x}"));
    }
    if let Some(version) = key.version() {
        doc.set(MATCH_GROUP, "version", format!("{version:04x}"));
    }
    if let Some(name) = key.name() {
        doc.set(MATCH_GROUP, "name", name);
    }

    for (axis, cal) in profile.axes() {
        let group = axis.name();
        doc.set(group, "min", cal.min.to_string());
        doc.set(group, "max", cal.max.to_string());
        doc.set(group, "fuzz", cal.fuzz.to_string());
        doc.set(group, "flat", cal.flat.to_string());
        doc.set(group, "res", cal.res.to_string());
        if cal.flat_centered {
            doc.set(group, "flat_type", "center");
        }
    }

    doc.to_text()
}

/// Reads a 16-bit hex field; empty, zero and out-of-range values are unset.
fn get_hex(doc: &KeyFile, key: &str) -> Result<Option<u16>, DecodeError> {
    let Some(raw) = doc.get(MATCH_GROUP, key) else {
        return Ok(None);
    };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex {
            group: MATCH_GROUP.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(u16::from_str_radix(value, 16).ok())
}

fn get_int(doc: &KeyFile, group: &str, key: &str) -> Result<i32, DecodeError> {
    let Some(raw) = doc.get(group, key) else {
        return Ok(0);
    };
    raw.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidInteger {
            group: group.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
        })
}
