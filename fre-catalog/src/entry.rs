//! Catalog columns and the per-file metadata record.

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::CatalogError;

/// Column of the data catalog.
///
/// Variants are declared in header order; the derived ordering follows it.
///
/// # Examples
/// ```
/// use fre_catalog::CatalogField;
///
/// let field: CatalogField = "chunk_freq".parse()?;
/// assert_eq!(field, CatalogField::ChunkFreq);
/// assert_eq!(field.as_str(), "chunk_freq");
/// # Ok::<(), fre_catalog::CatalogError>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CatalogField {
    /// Activity (MIP) the experiment belongs to.
    ActivityId,
    /// Institution that produced the data.
    InstitutionId,
    /// Model name.
    SourceId,
    /// Experiment name.
    ExperimentId,
    /// Sampling frequency such as `monthly` or `daily`.
    Frequency,
    /// Model component, e.g. `atmos_cmip`.
    ModelingRealm,
    /// CMOR table.
    TableId,
    /// Ensemble member.
    MemberId,
    /// Grid label.
    GridLabel,
    /// Variable name.
    VariableId,
    /// Time range covered by the file.
    TemporalSubset,
    /// Length of the time-series chunk, e.g. `5yr`.
    ChunkFreq,
    /// FRE platform the experiment ran on.
    Platform,
    /// pp output kind (`ts` or `av`).
    CellMethods,
    /// Absolute path of the file.
    Path,
}

impl CatalogField {
    /// Every column in header order.
    pub const ALL: [Self; 15] = [
        Self::ActivityId,
        Self::InstitutionId,
        Self::SourceId,
        Self::ExperimentId,
        Self::Frequency,
        Self::ModelingRealm,
        Self::TableId,
        Self::MemberId,
        Self::GridLabel,
        Self::VariableId,
        Self::TemporalSubset,
        Self::ChunkFreq,
        Self::Platform,
        Self::CellMethods,
        Self::Path,
    ];

    /// Column name as written in the CSV header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActivityId => "activity_id",
            Self::InstitutionId => "institution_id",
            Self::SourceId => "source_id",
            Self::ExperimentId => "experiment_id",
            Self::Frequency => "frequency",
            Self::ModelingRealm => "modeling_realm",
            Self::TableId => "table_id",
            Self::MemberId => "member_id",
            Self::GridLabel => "grid_label",
            Self::VariableId => "variable_id",
            Self::TemporalSubset => "temporal_subset",
            Self::ChunkFreq => "chunk_freq",
            Self::Platform => "platform",
            Self::CellMethods => "cell_methods",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for CatalogField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownField { name: s.to_owned() })
    }
}

/// Returns the catalog header in column order.
///
/// # Examples
/// ```
/// let header = fre_catalog::header();
/// assert_eq!(header.first(), Some(&"activity_id"));
/// assert_eq!(header.last(), Some(&"path"));
/// ```
#[must_use]
pub fn header() -> Vec<&'static str> {
    CatalogField::ALL.iter().map(|field| field.as_str()).collect()
}

/// Metadata gathered for a single model output file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogEntry {
    values: BTreeMap<CatalogField, String>,
}

impl CatalogEntry {
    /// Creates an entry with every column unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored for `field`.
    #[must_use]
    pub fn get(&self, field: CatalogField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Stores `value` for `field`, replacing any previous value.
    pub fn set(&mut self, field: CatalogField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Stores `value` for `field` only if the column is still unset.
    pub fn set_if_absent(&mut self, field: CatalogField, value: impl Into<String>) {
        self.values.entry(field).or_insert_with(|| value.into());
    }

    /// Returns the row in header order, rendering unset columns as empty
    /// strings.
    ///
    /// # Examples
    /// ```
    /// use fre_catalog::{CatalogEntry, CatalogField};
    ///
    /// let mut entry = CatalogEntry::new();
    /// entry.set(CatalogField::VariableId, "tas");
    /// let record = entry.to_record();
    /// assert_eq!(record.len(), CatalogField::ALL.len());
    /// assert_eq!(record[9], "tas");
    /// assert_eq!(record[0], "");
    /// ```
    #[must_use]
    pub fn to_record(&self) -> Vec<&str> {
        CatalogField::ALL
            .iter()
            .map(|field| self.get(*field).unwrap_or_default())
            .collect()
    }
}
