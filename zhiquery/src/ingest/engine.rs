use ignore::WalkBuilder;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::processor::DatasetProcessor;
use crate::config::QueryConfig;
use crate::errors::{ZhiError, ZhiResult};
use crate::filters::should_include_dataset;
use crate::metrics::IngestMetrics;
use crate::parser;
use crate::predicate::Predicate;
use crate::results::ResultSet;

/// Lists the dataset files directly inside `config.dataset_dir`, sorted by path
pub fn discover_datasets(config: &QueryConfig) -> ZhiResult<Vec<PathBuf>> {
    let dir = &config.dataset_dir;
    let metadata = std::fs::metadata(dir).map_err(|e| ZhiError::from_io(dir, e))?;
    if !metadata.is_dir() {
        return Err(ZhiError::config_error(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut walker = WalkBuilder::new(dir);
    walker
        .max_depth(Some(1))
        .follow_links(true)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false);

    let mut datasets = Vec::new();
    for entry in walker.build() {
        let entry = entry.map_err(|err| {
            let message = err.to_string();
            match err.into_io_error() {
                Some(io_err) => ZhiError::from_io(dir, io_err),
                None => ZhiError::config_error(message),
            }
        })?;
        if entry.depth() == 0 {
            continue;
        }
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            warn!("Skipping non-file entry: {}", entry.path().display());
            continue;
        }
        if should_include_dataset(entry.path(), &config.file_extensions, &config.ignore_patterns) {
            datasets.push(entry.into_path());
        } else {
            debug!("Skipping excluded dataset: {}", entry.path().display());
        }
    }

    datasets.sort();
    debug!("Found {} dataset files in {}", datasets.len(), dir.display());
    Ok(datasets)
}

/// Compiles filter tokens; an empty token list is a syntax error
pub fn compile_filter<S: AsRef<str>>(tokens: &[S]) -> ZhiResult<Predicate> {
    let predicate = parser::compile(tokens)?;
    debug!("Compiled filter: {:?}", predicate);
    Ok(predicate)
}

/// Compiles the configured filter, then ingests every dataset with it
pub fn query(config: &QueryConfig) -> ZhiResult<ResultSet> {
    let predicate = compile_filter(&config.filter)?;
    run(config, predicate)
}

/// Ingests every dataset of `config` concurrently with an already compiled predicate
pub fn run(config: &QueryConfig, predicate: Predicate) -> ZhiResult<ResultSet> {
    run_with_metrics(config, predicate, IngestMetrics::new())
}

/// Like [`run`], reporting into the given metrics.
///
/// Each dataset file is one task on a pool of `config.thread_count` workers.
/// A task builds its accepted records locally and takes the result lock only
/// to append them. The first fatal error stops the run and is returned. Once
/// all tasks have joined, the records are sorted by growth rate.
pub fn run_with_metrics(
    config: &QueryConfig,
    predicate: Predicate,
    metrics: IngestMetrics,
) -> ZhiResult<ResultSet> {
    info!(
        "Starting ingestion of {} with filter: {:?}",
        config.dataset_dir.display(),
        predicate
    );

    let datasets = discover_datasets(config)?;
    let processor = DatasetProcessor::with_metrics(predicate, config.skip_non_finite, metrics);
    let results = Mutex::new(ResultSet::new());

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.thread_count.get())
        .build()?;

    pool.install(|| {
        datasets
            .par_iter()
            .with_max_len(1)
            .try_for_each(|path| -> ZhiResult<()> {
                let dataset_result = processor.process_file(path)?;
                let mut shared = results.lock().unwrap_or_else(PoisonError::into_inner);
                shared.add_dataset_result(dataset_result);
                processor.metrics().record_merge();
                Ok(())
            })
    })?;

    let mut result = results.into_inner().unwrap_or_else(PoisonError::into_inner);
    result.sort_by_growth_rate();

    processor.metrics().log_stats();
    info!(
        "Ingestion complete. Accepted {} of {} rows from {} files",
        result.len(),
        result.rows_scanned,
        result.files_scanned
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SyntaxError;
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    const HEADER: &str = "RegionID,SizeRank,RegionName,RegionType,StateName,State,City,Metro,CountyName,m1";

    fn write_dataset(dir: &std::path::Path, name: &str, rows: &[(u64, &str, f64, f64)]) {
        let mut content = format!("{}\n", HEADER);
        for (zip_code, state, from, to) in rows {
            let mut values = vec![from.to_string(); 12];
            values.push(to.to_string());
            content.push_str(&format!(
                "1,0,{},zip,{},{},Town,Metro,County,{}\n",
                zip_code,
                state,
                state,
                values.join(",")
            ));
        }
        fs::write(dir.join(name), content).unwrap();
    }

    fn config_for(dir: &std::path::Path) -> QueryConfig {
        QueryConfig {
            thread_count: NonZeroUsize::new(2).unwrap(),
            ..QueryConfig::new(dir)
        }
    }

    #[test]
    fn test_discover_datasets_filters_and_sorts() {
        let dir = tempdir().unwrap();
        write_dataset(dir.path(), "b.csv", &[]);
        write_dataset(dir.path(), "a.csv", &[]);
        write_dataset(dir.path(), "c_raw.csv", &[]);
        fs::write(dir.path().join(".hidden.csv"), "").unwrap();
        fs::write(dir.path().join("bundle.zip"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_dataset(&dir.path().join("nested"), "d.csv", &[]);

        let names = |config: &QueryConfig| -> Vec<String> {
            discover_datasets(config)
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        let config = QueryConfig {
            ignore_patterns: vec!["*_raw.csv".to_string()],
            ..config_for(dir.path())
        };
        assert_eq!(names(&config), vec![".hidden.csv", "a.csv", "b.csv", "bundle.zip"]);

        let config = QueryConfig {
            file_extensions: Some(vec!["csv".to_string()]),
            ignore_patterns: vec!["*_raw.csv".to_string(), ".*".to_string()],
            ..config_for(dir.path())
        };
        assert_eq!(names(&config), vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let config = config_for(&dir.path().join("nope"));
        assert!(matches!(
            discover_datasets(&config),
            Err(ZhiError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn test_run_merges_and_sorts() {
        let dir = tempdir().unwrap();
        write_dataset(dir.path(), "a.csv", &[(1, "CA", 100.0, 130.0), (2, "NY", 100.0, 105.0)]);
        write_dataset(dir.path(), "b.csv", &[(3, "CA", 100.0, 110.0), (4, "CA", 100.0, 90.0)]);

        let metrics = IngestMetrics::new();
        let result = run_with_metrics(
            &config_for(dir.path()),
            Predicate::state("ca"),
            metrics.clone(),
        )
        .unwrap();

        let zips: Vec<u64> = result.iter().map(|r| r.zip_code).collect();
        assert_eq!(zips, vec![4, 3, 1]);
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.rows_scanned, 4);
        assert_eq!(metrics.get_stats().merges, 2);
    }

    #[test]
    fn test_query_rejects_bad_filter_before_reading() {
        let dir = tempdir().unwrap();
        let config = config_for(&dir.path().join("does-not-exist"))
            .with_filter(["[", "ZipCode:1"]);
        let err = query(&config).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_query_without_filter_is_syntax_error() {
        let dir = tempdir().unwrap();
        write_dataset(dir.path(), "a.csv", &[(1, "CA", 100.0, 130.0), (2, "NY", 100.0, 105.0)]);
        let err = query(&config_for(dir.path())).unwrap_err();
        assert!(matches!(err, ZhiError::Syntax(SyntaxError::EmptyTokens)));
    }

    #[test]
    fn test_fatal_error_aborts_run() {
        let dir = tempdir().unwrap();
        write_dataset(dir.path(), "a.csv", &[(1, "CA", 100.0, 130.0)]);
        fs::write(
            dir.path().join("b.csv"),
            format!("{}\n1,0,notazip,zip,CA,CA,Town,Metro,County,1\n", HEADER),
        )
        .unwrap();

        let config = config_for(dir.path()).with_filter(["[", "State:ca", "]"]);
        let err = query(&config).unwrap_err();
        assert!(matches!(err, ZhiError::InvalidZipCode { .. }));
    }
}
