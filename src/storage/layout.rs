//! Storage layout strategies
//!
//! Where an upload lands is a single decision, so it lives here: a path
//! strategy selected by configuration rather than separate upload paths
//! per deployment.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;

/// Where uploaded files are placed beneath the base directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLayout {
    /// `<base>/<filename>`
    Flat,
    /// `<base>/<YYYY>/<MM>/<DD>/<filename>`
    Date,
    /// `<base>[/<user>]/<YYYY>/<MM>/<DD>/<filename>`
    UserDate,
}

impl StorageLayout {
    /// Computes the destination path for an uploaded file.
    ///
    /// The filename is used verbatim; nothing here rejects traversal
    /// sequences. An empty user contributes no path segment.
    pub fn destination(&self, base: &Path, user: &str, filename: &str, date: NaiveDate) -> PathBuf {
        let mut dest = base.to_path_buf();

        match self {
            StorageLayout::Flat => {}
            StorageLayout::Date => dest.push(date_segments(date)),
            StorageLayout::UserDate => {
                if !user.is_empty() {
                    dest.push(user);
                }
                dest.push(date_segments(date));
            }
        }

        dest.push(filename);
        dest
    }
}

/// Zero-padded `YYYY/MM/DD` path segments.
fn date_segments(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

impl FromStr for StorageLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(StorageLayout::Flat),
            "date" => Ok(StorageLayout::Date),
            "user-date" => Ok(StorageLayout::UserDate),
            other => Err(format!("unknown storage layout: {}", other)),
        }
    }
}
