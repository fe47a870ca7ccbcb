//! CSV catalog output.

use std::{
    fs::{File, OpenOptions},
    path::Path,
};

use tracing::{Span, field, info, instrument};

use crate::{
    entry::{CatalogEntry, header},
    error::{CatalogError, Result},
};

/// How an existing catalog file is treated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WriteMode {
    /// Refuse to touch an existing file.
    #[default]
    Create,
    /// Replace an existing file.
    Overwrite,
    /// Add rows to an existing file; the header is only written to a new or
    /// empty file.
    Append,
}

impl WriteMode {
    /// Selects a mode from the command-line flags.
    ///
    /// `overwrite` takes precedence; the CLI rejects both flags together.
    #[must_use]
    pub const fn from_flags(overwrite: bool, append: bool) -> Self {
        match (overwrite, append) {
            (true, _) => Self::Overwrite,
            (false, true) => Self::Append,
            (false, false) => Self::Create,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::Append => "append",
        }
    }
}

/// Writes `entries` to `path` as CSV using the catalog header.
///
/// Returns the number of rows written, excluding the header.
///
/// # Errors
/// Returns [`CatalogError::AlreadyExists`] when `mode` is
/// [`WriteMode::Create`] and `path` exists, [`CatalogError::Io`] when the file
/// cannot be opened, and [`CatalogError::Csv`] when a row cannot be written.
///
/// # Examples
/// ```
/// # use fre_catalog::{CatalogEntry, CatalogField, WriteMode, write_catalog_csv};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("catalog.csv");
/// let mut entry = CatalogEntry::new();
/// entry.set(CatalogField::VariableId, "tas");
///
/// assert_eq!(write_catalog_csv(&[entry.clone()], &path, WriteMode::Create)?, 1);
/// assert_eq!(write_catalog_csv(&[entry], &path, WriteMode::Append)?, 1);
/// assert_eq!(std::fs::read_to_string(&path)?.lines().count(), 3);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "catalog.write_csv",
    err,
    skip(entries, path),
    fields(path = %path.display(), mode = mode.label(), header_written = field::Empty),
)]
pub fn write_catalog_csv(entries: &[CatalogEntry], path: &Path, mode: WriteMode) -> Result<usize> {
    let io_error = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    let (file, write_header) = match mode {
        WriteMode::Create => {
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|source| match source.kind() {
                    std::io::ErrorKind::AlreadyExists => CatalogError::AlreadyExists {
                        path: path.to_path_buf(),
                    },
                    _ => io_error(source),
                })?;
            (file, true)
        }
        WriteMode::Overwrite => (File::create(path).map_err(io_error)?, true),
        WriteMode::Append => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(io_error)?;
            let empty = file.metadata().map_err(io_error)?.len() == 0;
            (file, empty)
        }
    };
    Span::current().record("header_written", write_header);

    let csv_error = |source| CatalogError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_writer(file);
    if write_header {
        writer.write_record(header()).map_err(csv_error)?;
    }
    for entry in entries {
        writer.write_record(entry.to_record()).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)?;
    info!(rows = entries.len(), "catalog rows written");
    Ok(entries.len())
}
