//! Colour theme preference.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Dark is the default; anything unrecognised reads as dark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Stored preference, or dark.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_item(keys::THEME) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "Could not read theme preference");
                Self::default()
            }
        }
    }

    /// Persist the preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.set_item(keys::THEME, self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(format!("unknown theme: {s}")),
        }
    }
}
