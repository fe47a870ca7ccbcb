//! Search filters applied to crawled catalog entries.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    entry::{CatalogEntry, CatalogField},
    error::{CatalogError, Result},
};

/// Chunk label marking output that must never be catalogued.
pub const DO_NOT_USE: &str = "DO_NOT_USE";

/// Required and excluded column values.
///
/// An entry is kept when every `require` pair matches exactly and no `ignore`
/// pair matches. A field may carry several ignored values.
///
/// # Examples
/// ```
/// use fre_catalog::{CatalogEntry, CatalogField, CatalogFilter};
///
/// let filter = CatalogFilter::new().require(CatalogField::Frequency, "monthly");
/// let mut entry = CatalogEntry::new();
/// entry.set(CatalogField::Frequency, "monthly");
/// assert!(filter.matches(&entry));
/// entry.set(CatalogField::Frequency, "daily");
/// assert!(!filter.matches(&entry));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogFilter {
    require: BTreeMap<CatalogField, String>,
    ignore: BTreeMap<CatalogField, BTreeSet<String>>,
}

impl CatalogFilter {
    /// Creates a filter that keeps every entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter that drops chunks labelled [`DO_NOT_USE`].
    #[must_use]
    pub fn default_ignores() -> Self {
        Self::new().ignore(CatalogField::ChunkFreq, DO_NOT_USE)
    }

    /// Requires `field` to equal `value`.
    #[must_use]
    pub fn require(mut self, field: CatalogField, value: impl Into<String>) -> Self {
        self.require.insert(field, value.into());
        self
    }

    /// Drops entries whose `field` equals `value`, in addition to any value
    /// already ignored for that field.
    #[must_use]
    pub fn ignore(mut self, field: CatalogField, value: impl Into<String>) -> Self {
        self.ignore.entry(field).or_default().insert(value.into());
        self
    }

    /// Adds the realm/frequency/chunk requirements exposed on the command
    /// line. `None` leaves the column unconstrained.
    #[must_use]
    pub fn with_search(
        self,
        realm: Option<&str>,
        frequency: Option<&str>,
        chunk: Option<&str>,
    ) -> Self {
        [
            (CatalogField::ModelingRealm, realm),
            (CatalogField::Frequency, frequency),
            (CatalogField::ChunkFreq, chunk),
        ]
        .into_iter()
        .fold(self, |filter, (field, value)| match value {
            Some(value) => filter.require(field, value),
            None => filter,
        })
    }

    /// Returns the required pairs.
    #[must_use]
    pub fn required(&self) -> &BTreeMap<CatalogField, String> {
        &self.require
    }

    /// Returns the excluded values per field.
    #[must_use]
    pub fn ignored(&self) -> &BTreeMap<CatalogField, BTreeSet<String>> {
        &self.ignore
    }

    /// Returns whether `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        let required = self
            .require
            .iter()
            .all(|(field, value)| entry.get(*field) == Some(value.as_str()));
        let ignored = self
            .ignore
            .iter()
            .any(|(field, values)| {
                entry
                    .get(*field)
                    .is_some_and(|value| values.contains(value))
            });
        required && !ignored
    }
}

/// Parses a `FIELD=VALUE` expression.
///
/// # Errors
/// Returns [`CatalogError::InvalidFilter`] when the `=` is missing or either
/// side is empty, and [`CatalogError::UnknownField`] for unknown columns.
///
/// # Examples
/// ```
/// use fre_catalog::{CatalogField, parse_filter_pair};
///
/// let (field, value) = parse_filter_pair("chunk_freq=DO_NOT_USE")?;
/// assert_eq!(field, CatalogField::ChunkFreq);
/// assert_eq!(value, "DO_NOT_USE");
/// # Ok::<(), fre_catalog::CatalogError>(())
/// ```
pub fn parse_filter_pair(raw: &str) -> Result<(CatalogField, String)> {
    let invalid = || CatalogError::InvalidFilter {
        raw: raw.to_owned(),
    };
    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(invalid());
    }
    Ok((name.parse()?, value.to_owned()))
}
