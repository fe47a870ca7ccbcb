//! JSON catalog descriptor templates.
//!
//! The descriptor is an ESM collection description that points at the CSV
//! through its `catalog_file` key. Everything else in the template is copied
//! verbatim.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{CatalogError, Result};

/// Key rewritten with the CSV location.
pub const CATALOG_FILE_KEY: &str = "catalog_file";

const BUILTIN_TEMPLATE: &str = include_str!("../cats/gfdl_template.json");
const BUILTIN_ORIGIN: &str = "<builtin gfdl template>";

/// Parsed descriptor template.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogTemplate {
    origin: PathBuf,
    document: Map<String, Value>,
}

impl CatalogTemplate {
    /// Returns the template shipped with the crate.
    ///
    /// # Errors
    /// Returns [`CatalogError::Template`] if the embedded document is not
    /// valid JSON.
    ///
    /// # Examples
    /// ```
    /// use fre_catalog::CatalogTemplate;
    ///
    /// let template = CatalogTemplate::builtin()?;
    /// assert!(template.document().contains_key("aggregation_control"));
    /// # Ok::<(), fre_catalog::CatalogError>(())
    /// ```
    pub fn builtin() -> Result<Self> {
        Self::parse(PathBuf::from(BUILTIN_ORIGIN), BUILTIN_TEMPLATE)
    }

    /// Reads a template from `path`.
    ///
    /// # Errors
    /// Returns [`CatalogError::Io`] if the file cannot be read,
    /// [`CatalogError::Template`] if it is not JSON, and
    /// [`CatalogError::InvalidTemplate`] if it is not a JSON object.
    #[instrument(name = "catalog.load_template", err, skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path.to_path_buf(), &raw)
    }

    fn parse(origin: PathBuf, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|source| CatalogError::Template {
            path: origin.clone(),
            source,
        })?;
        match value {
            Value::Object(document) => Ok(Self { origin, document }),
            _ => Err(CatalogError::InvalidTemplate { path: origin }),
        }
    }

    /// Where the template was read from.
    #[must_use]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// The template document as parsed.
    #[must_use]
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Clones the template with `catalog_file` set to `csv_path`.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    /// use fre_catalog::CatalogTemplate;
    ///
    /// let template = CatalogTemplate::builtin()?;
    /// let rendered = template.render(Path::new("/tmp/catalog.csv"));
    /// assert_eq!(rendered["catalog_file"], "/tmp/catalog.csv");
    /// # Ok::<(), fre_catalog::CatalogError>(())
    /// ```
    #[must_use]
    pub fn render(&self, csv_path: &Path) -> Value {
        let mut document = self.document.clone();
        document.insert(
            CATALOG_FILE_KEY.to_owned(),
            Value::String(csv_path.to_string_lossy().into_owned()),
        );
        Value::Object(document)
    }

    /// Renders the descriptor for `csv_path` and writes it to `json_path`
    /// with two-space indentation.
    ///
    /// # Errors
    /// Returns [`CatalogError::Io`] when the file cannot be created or
    /// flushed and [`CatalogError::Template`] if serialisation fails.
    #[instrument(
        name = "catalog.write_descriptor",
        err,
        skip(self, csv_path, json_path),
        fields(json_path = %json_path.display(), template = %self.origin.display()),
    )]
    pub fn write(&self, csv_path: &Path, json_path: &Path) -> Result<()> {
        let io_error = |source| CatalogError::Io {
            path: json_path.to_path_buf(),
            source,
        };
        let file = File::create(json_path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.render(csv_path)).map_err(|source| {
            CatalogError::Template {
                path: json_path.to_path_buf(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        debug!("descriptor written");
        Ok(())
    }
}
