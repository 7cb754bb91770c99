//! Controller identity keys and wildcard matching.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::JoyError;

/// Identity of a controller as stored in the `[match]` section of a profile.
///
/// Every field is independently optional. An unset field acts as a wildcard
/// when matching, but equality and ordering stay structural: two keys are equal
/// only if all four fields are equal, including which ones are unset.
///
/// Ordering is lexicographic over `(vendor, product, version, name)` with unset
/// fields sorting first, the same order the numeric sentinel `0` and the empty
/// name would give.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Key {
    vendor: Option<u16>,
    product: Option<u16>,
    version: Option<u16>,
    name: Option<String>,
}

impl Key {
    /// Creates a key from optional fields. `Some(0)` and `Some("")` are unset.
    pub fn new(
        vendor: Option<u16>,
        product: Option<u16>,
        version: Option<u16>,
        name: Option<String>,
    ) -> Self {
        Self {
            vendor: vendor.filter(|&v| v != 0),
            product: product.filter(|&v| v != 0),
            version: version.filter(|&v| v != 0),
            name: name.filter(|n| !n.is_empty()),
        }
    }

    /// Creates a key from the raw device identity, where `0` and `""` mean unset.
    pub fn from_raw(vendor: u16, product: u16, version: u16, name: &str) -> Self {
        Self::new(
            Some(vendor),
            Some(product),
            Some(version),
            Some(name.to_string()),
        )
    }

    /// The key that matches every identity.
    pub fn wildcard() -> Self {
        Self::default()
    }

    pub const fn vendor(&self) -> Option<u16> {
        self.vendor
    }

    pub const fn product(&self) -> Option<u16> {
        self.product
    }

    pub const fn version(&self) -> Option<u16> {
        self.version
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns true if no field is set.
    pub const fn is_wildcard(&self) -> bool {
        self.vendor.is_none()
            && self.product.is_none()
            && self.version.is_none()
            && self.name.is_none()
    }

    /// Wildcard match: every field pair is compatible when either side is
    /// unset or both hold the same value.
    pub fn matches(&self, other: &Self) -> bool {
        compatible(self.vendor, other.vendor)
            && compatible(self.product, other.product)
            && compatible(self.version, other.version)
            && compatible(self.name.as_deref(), other.name.as_deref())
    }

    /// Keeps only the fields selected by `pinned`.
    pub fn pinned(&self, pinned: PinnedFields) -> Self {
        Self {
            vendor: self.vendor.filter(|_| pinned.vendor),
            product: self.product.filter(|_| pinned.product),
            version: self.version.filter(|_| pinned.version),
            name: self.name.clone().filter(|_| pinned.name),
        }
    }
}

fn compatible<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x}:{:04x}",
            self.vendor.unwrap_or(0),
            self.product.unwrap_or(0),
            self.version.unwrap_or(0)
        )?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// Selects which identity fields a saved profile should match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PinnedFields {
    pub vendor: bool,
    pub product: bool,
    pub version: bool,
    pub name: bool,
}

impl PinnedFields {
    pub const ALL: Self = Self {
        vendor: true,
        product: true,
        version: true,
        name: true,
    };

    pub const NONE: Self = Self {
        vendor: false,
        product: false,
        version: false,
        name: false,
    };
}

impl Default for PinnedFields {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromStr for PinnedFields {
    type Err = JoyError;

    /// Parses `all`, `none`, or a comma separated list of field names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => return Ok(Self::ALL),
            "none" | "" => return Ok(Self::NONE),
            _ => {}
        }

        let mut pinned = Self::NONE;
        for field in s.split(',').map(str::trim) {
            match field {
                "vendor" => pinned.vendor = true,
                "product" => pinned.product = true,
                "version" => pinned.version = true,
                "name" => pinned.name = true,
                other => {
                    return Err(JoyError::InvalidArgument(format!(
                        "unknown identity field '{other}' (expected vendor, product, version or name)"
                    )));
                }
            }
        }
        Ok(pinned)
    }
}
