//! Error types for catalog construction.
//!
//! Every failure carries the path it concerns so the CLI can report it
//! without further context, and maps onto a stable [`CatalogErrorCode`].

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant { .. } => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error produced while crawling, filtering, or writing a catalog.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The project directory could not be read.
    #[error("failed to crawl `{path}`: {source}")]
    Crawl {
        /// Directory that could not be listed.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The CSV exists and neither overwrite nor append was requested.
    #[error("catalog `{path}` already exists; pass --overwrite or --append")]
    AlreadyExists {
        /// Existing catalog file.
        path: PathBuf,
    },
    /// Reading or writing a file failed.
    #[error("i/o error on `{path}`: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The CSV writer failed.
    #[error("failed to write catalog rows to `{path}`: {source}")]
    Csv {
        /// CSV file being written.
        path: PathBuf,
        /// Error raised by the `csv` crate.
        #[source]
        source: csv::Error,
    },
    /// The descriptor template is not valid JSON, or could not be serialised.
    #[error("failed to process catalog template `{path}`: {source}")]
    Template {
        /// Template or descriptor path.
        path: PathBuf,
        /// Error raised by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The descriptor template parsed but is not a JSON object.
    #[error("catalog template `{path}` must be a JSON object")]
    InvalidTemplate {
        /// Offending template.
        path: PathBuf,
    },
    /// A filter named a column that does not exist.
    #[error("unknown catalog field `{name}`")]
    UnknownField {
        /// Name supplied by the caller.
        name: String,
    },
    /// A filter expression was not of the form `FIELD=VALUE`.
    #[error("invalid filter `{raw}`; expected FIELD=VALUE")]
    InvalidFilter {
        /// Raw expression supplied by the caller.
        raw: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`CatalogError`] variants.
    enum CatalogErrorCode for CatalogError {
        /// The project directory could not be read.
        Crawl => Crawl => "CATALOG_CRAWL_FAILED",
        /// The CSV exists and no write mode allowed replacing it.
        AlreadyExists => AlreadyExists => "CATALOG_ALREADY_EXISTS",
        /// Reading or writing a file failed.
        Io => Io => "CATALOG_IO",
        /// The CSV writer failed.
        Csv => Csv => "CATALOG_CSV",
        /// The descriptor template is not valid JSON.
        Template => Template => "CATALOG_TEMPLATE_PARSE",
        /// The descriptor template is not a JSON object.
        InvalidTemplate => InvalidTemplate => "CATALOG_INVALID_TEMPLATE",
        /// A filter named an unknown column.
        UnknownField => UnknownField => "CATALOG_UNKNOWN_FIELD",
        /// A filter expression was malformed.
        InvalidFilter => InvalidFilter => "CATALOG_INVALID_FILTER",
    }
}

/// Convenient alias for results returned by the catalog API.
pub type Result<T> = core::result::Result<T, CatalogError>;
