//! Behavioural tests for crawling a pp tree and writing the catalog pair.

mod common;

use std::fs;
use std::path::Path;

use fre_catalog::{
    CATALOG_FILE_KEY, CatalogError, CatalogField, CatalogFilter, CatalogRequest, WriteMode,
    build_catalog, crawl_local, header,
};
use fre_test_support::tracing::capture;
use rstest::rstest;
use serde_json::Value;

use common::{PP_FILES, pp_tree};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_owned).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_owned).collect());
    }
    Ok((headers, rows))
}

#[rstest]
fn crawl_skips_noise_static_and_do_not_use() -> TestResult {
    let tree = pp_tree();
    let entries = crawl_local(&tree.pp, &CatalogFilter::default_ignores())?;
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|entry| {
        entry
            .get(CatalogField::Path)
            .is_some_and(|path| path.ends_with(".nc") && !path.contains("static"))
    }));
    assert!(
        entries
            .iter()
            .all(|entry| entry.get(CatalogField::Platform) == Some("gfdl.ncrc5-intel23-prod-openmp"))
    );
    Ok(())
}

#[rstest]
fn crawl_without_ignores_keeps_do_not_use_chunks() -> TestResult {
    let tree = pp_tree();
    let entries = crawl_local(&tree.pp, &CatalogFilter::new())?;
    assert_eq!(entries.len(), PP_FILES.len() - 1);
    Ok(())
}

#[rstest]
fn crawl_returns_entries_sorted_by_path() -> TestResult {
    let tree = pp_tree();
    let entries = crawl_local(&tree.pp, &CatalogFilter::new())?;
    let paths: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry.get(CatalogField::Path))
        .collect();
    let mut sorted = paths.clone();
    sorted.sort_unstable();
    assert_eq!(paths, sorted);
    Ok(())
}

#[rstest]
#[case::realm_only(Some("atmos_cmip"), None, None, 3)]
#[case::realm_and_freq(Some("atmos_cmip"), Some("monthly"), None, 2)]
#[case::full_search(Some("atmos_cmip"), Some("monthly"), Some("5yr"), 2)]
#[case::ocean(Some("ocean_monthly"), Some("monthly"), Some("10yr"), 1)]
#[case::no_match(Some("land"), None, None, 0)]
fn search_filters_narrow_the_catalog(
    #[case] realm: Option<&str>,
    #[case] frequency: Option<&str>,
    #[case] chunk: Option<&str>,
    #[case] expected: usize,
) -> TestResult {
    let tree = pp_tree();
    let filter = CatalogFilter::default_ignores().with_search(realm, frequency, chunk);
    let entries = crawl_local(&tree.pp, &filter)?;
    assert_eq!(entries.len(), expected);
    Ok(())
}

#[rstest]
fn extra_ignores_add_to_the_default_set() -> TestResult {
    let tree = pp_tree();
    let filter = CatalogFilter::default_ignores()
        .ignore(CatalogField::ChunkFreq, "10yr")
        .ignore(CatalogField::Frequency, "daily");
    let entries = crawl_local(&tree.pp, &filter)?;
    let chunks: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry.get(CatalogField::ChunkFreq))
        .collect();
    assert_eq!(chunks, ["5yr", "5yr"]);
    Ok(())
}

#[rstest]
fn parent_components_are_folded_out_of_paths() -> TestResult {
    let tree = pp_tree();
    fs::create_dir_all(tree.dir.path().join("extra"))?;
    let relative = tree.pp.strip_prefix(tree.dir.path())?;
    let input = tree.dir.path().join("extra/..").join(relative);
    let output = tree.dir.path().join("extra/../cat");

    let result = build_catalog(&CatalogRequest::new(&input, &output))?;
    assert_eq!(result.csv_path, tree.dir.path().join("cat.csv"));
    assert_eq!(result.json_path, tree.dir.path().join("cat.json"));

    let (headers, rows) = read_csv(&result.csv_path)?;
    let path_column = headers.iter().position(|name| name == "path");
    let platform_column = headers.iter().position(|name| name == "platform");
    for row in &rows {
        let path = path_column.and_then(|index| row.get(index)).map(String::as_str);
        assert!(path.is_some_and(|path| path.starts_with(&*tree.pp.to_string_lossy())));
        assert!(path.is_some_and(|path| !path.contains("/../")));
        let platform = platform_column.and_then(|index| row.get(index)).map(String::as_str);
        assert_eq!(platform, Some("gfdl.ncrc5-intel23-prod-openmp"));
    }

    let descriptor: Value = serde_json::from_str(&fs::read_to_string(&result.json_path)?)?;
    assert_eq!(
        descriptor[CATALOG_FILE_KEY].as_str(),
        result.csv_path.to_str()
    );
    Ok(())
}

#[rstest]
fn crawl_of_missing_directory_fails() {
    let tree = pp_tree();
    let err = match crawl_local(&tree.dir.path().join("absent"), &CatalogFilter::new()) {
        Ok(_) => panic!("crawl of a missing directory must fail"),
        Err(err) => err,
    };
    assert!(matches!(err, CatalogError::Crawl { .. }));
}

#[rstest]
fn build_writes_csv_with_header_and_matching_descriptor() -> TestResult {
    let tree = pp_tree();
    let output = tree.dir.path().join("catalogs/piControl");
    let result = build_catalog(&CatalogRequest::new(&tree.pp, &output))?;

    assert_eq!(result.entries, 4);
    assert!(result.csv_path.is_absolute());
    assert_eq!(result.csv_path, tree.dir.path().join("catalogs/piControl.csv"));
    assert_eq!(result.json_path, tree.dir.path().join("catalogs/piControl.json"));

    let (headers, rows) = read_csv(&result.csv_path)?;
    assert_eq!(headers, header());
    assert_eq!(rows.len(), 4);

    let descriptor: Value = serde_json::from_str(&fs::read_to_string(&result.json_path)?)?;
    assert_eq!(
        descriptor[CATALOG_FILE_KEY].as_str(),
        result.csv_path.to_str()
    );
    assert_eq!(descriptor["assets"]["column_name"], "path");
    Ok(())
}

#[rstest]
fn build_refuses_existing_catalog_without_mode() -> TestResult {
    let tree = pp_tree();
    let output = tree.dir.path().join("cat");
    build_catalog(&CatalogRequest::new(&tree.pp, &output))?;

    let err = match build_catalog(&CatalogRequest::new(&tree.pp, &output)) {
        Ok(_) => panic!("second build must refuse to replace the catalog"),
        Err(err) => err,
    };
    assert!(matches!(err, CatalogError::AlreadyExists { .. }));
    assert_eq!(err.code().as_str(), "CATALOG_ALREADY_EXISTS");
    Ok(())
}

#[rstest]
fn refused_build_leaves_existing_pair_untouched() -> TestResult {
    let tree = pp_tree();
    let template = tree.dir.path().join("custom.json");
    fs::write(&template, r#"{"id": "custom", "catalog_file": ""}"#)?;
    let output = tree.dir.path().join("cat");
    let first = build_catalog(&CatalogRequest {
        template: Some(template),
        ..CatalogRequest::new(&tree.pp, &output)
    })?;
    let descriptor_before = fs::read_to_string(&first.json_path)?;
    let catalog_before = fs::read_to_string(&first.csv_path)?;

    let result = build_catalog(&CatalogRequest::new(&tree.pp, &output));
    assert!(matches!(result, Err(CatalogError::AlreadyExists { .. })));
    assert_eq!(fs::read_to_string(&first.json_path)?, descriptor_before);
    assert_eq!(fs::read_to_string(&first.csv_path)?, catalog_before);

    let descriptor: Value = serde_json::from_str(&descriptor_before)?;
    assert_eq!(descriptor["id"], "custom");
    Ok(())
}

#[rstest]
#[case::overwrite(WriteMode::Overwrite, 4)]
#[case::append(WriteMode::Append, 8)]
fn build_honours_write_mode(#[case] mode: WriteMode, #[case] expected_rows: usize) -> TestResult {
    let tree = pp_tree();
    let output = tree.dir.path().join("cat");
    build_catalog(&CatalogRequest::new(&tree.pp, &output))?;

    let request = CatalogRequest {
        mode,
        ..CatalogRequest::new(&tree.pp, &output)
    };
    let result = build_catalog(&request)?;
    let (headers, rows) = read_csv(&result.csv_path)?;
    assert_eq!(headers, header());
    assert_eq!(rows.len(), expected_rows);
    Ok(())
}

#[rstest]
fn build_uses_custom_template() -> TestResult {
    let tree = pp_tree();
    let template = tree.dir.path().join("template.json");
    fs::write(&template, r#"{"id": "custom", "catalog_file": "placeholder.csv"}"#)?;

    let request = CatalogRequest {
        template: Some(template),
        ..CatalogRequest::new(&tree.pp, tree.dir.path().join("custom"))
    };
    let result = build_catalog(&request)?;
    let descriptor: Value = serde_json::from_str(&fs::read_to_string(&result.json_path)?)?;
    assert_eq!(descriptor["id"], "custom");
    assert_eq!(
        descriptor[CATALOG_FILE_KEY].as_str(),
        result.csv_path.to_str()
    );
    Ok(())
}

#[rstest]
fn build_reports_progress_through_tracing() -> TestResult {
    let tree = pp_tree();
    let request = CatalogRequest::new(&tree.pp, tree.dir.path().join("traced"));
    let (result, layer) = capture(|| build_catalog(&request));
    result?;

    let messages = layer.messages();
    for expected in ["crawling project directory", "JSON generated", "CSV generated"] {
        assert!(
            messages.iter().any(|message| message == expected),
            "missing `{expected}` in {messages:?}"
        );
    }
    let span = match layer.span("catalog.crawl") {
        Some(span) => span,
        None => panic!("crawl span must be recorded"),
    };
    assert_eq!(span.fields.get("entries").map(String::as_str), Some("4"));
    Ok(())
}
