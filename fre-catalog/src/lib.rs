//! Data catalog builder for FRE post-processed model output.
//!
//! Crawls a `pp/` directory tree, recovers catalog columns from the directory
//! layout and filenames, and writes a CSV catalog alongside a JSON descriptor
//! whose `catalog_file` points at it.

mod builder;
mod crawler;
mod entry;
mod error;
mod filter;
mod paths;
mod template;
mod writer;

pub use crate::{
    builder::{CatalogOutput, CatalogRequest, build_catalog},
    crawler::crawl_local,
    entry::{CatalogEntry, CatalogField, header},
    error::{CatalogError, CatalogErrorCode, Result},
    filter::{CatalogFilter, DO_NOT_USE, parse_filter_pair},
    template::{CATALOG_FILE_KEY, CatalogTemplate},
    writer::{WriteMode, write_catalog_csv},
};
