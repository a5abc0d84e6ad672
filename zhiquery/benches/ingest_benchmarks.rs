use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::{fs::File, io::Write, num::NonZeroUsize};
use tempfile::tempdir;
use zhiquery::{growth_rate, ingest::query, parser, QueryConfig, Record};

const HEADER: &str = "RegionID,SizeRank,RegionName,RegionType,StateName,State,City,Metro,CountyName";

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    rows_per_file: usize,
) -> std::io::Result<()> {
    for i in 0..file_count {
        let file_path = dir.path().join(format!("Zip_zhvi_{}.csv", i));
        let mut file = File::create(file_path)?;
        writeln!(file, "{}", HEADER)?;
        for j in 0..rows_per_file {
            let values: Vec<String> = (0..240)
                .map(|month| if month < j % 24 { 0 } else { 90_000 + month * 150 + j * 10 })
                .map(|v| v.to_string())
                .collect();
            writeln!(
                file,
                "{},{},{},zip,CA,{},City,Metro,County,{}",
                j,
                j,
                i * 100_000 + j,
                if j % 2 == 0 { "CA" } else { "OR" },
                values.join(",")
            )?;
        }
    }
    Ok(())
}

fn create_base_config(dir: &tempfile::TempDir) -> QueryConfig {
    QueryConfig {
        thread_count: NonZeroUsize::new(1).unwrap(),
        ..QueryConfig::new(dir.path()).with_filter([
            "[", "State:ca", "and", "[", "GrowthRate:1.5", "or", "Price:100000", "]", "]",
        ])
    }
}

fn bench_filter_parsing(c: &mut Criterion) {
    let expressions: Vec<Vec<&str>> = vec![
        vec!["[", "ZipCode:94103", "]"],
        vec!["[", "State:CA", "and", "City:Oakland", "or", "Price:500000", "]"],
        vec![
            "[", "State:CA", "and", "[", "GrowthRate:5", "or", "[", "Price:300000", "and",
            "[", "County:Alameda", "]", "]", "]", "]",
        ],
    ];

    let mut group = c.benchmark_group("Filter Parsing");
    for (i, tokens) in expressions.iter().enumerate() {
        group.bench_function(format!("expression_{}", i), |b| {
            b.iter(|| black_box(parser::parse(black_box(tokens)).unwrap()));
        });
    }
    group.finish();
}

fn bench_growth_and_predicate(c: &mut Criterion) {
    let mut values = vec![0.0; 17];
    values.extend((0..223).map(|m| 80_000.0 + m as f64 * 125.0));
    let record = Record::new("bench.csv", 94103, "San Francisco", "CA", "San Francisco", values.clone());
    let predicate = parser::compile(&[
        "[", "State:ca", "and", "[", "GrowthRate:1.5", "or", "Price:100000", "]", "]",
    ])
    .unwrap();

    let mut group = c.benchmark_group("Record Evaluation");
    group.bench_function("growth_rate", |b| {
        b.iter(|| black_box(growth_rate(black_box(&values))));
    });
    group.bench_function("predicate", |b| {
        b.iter(|| black_box(predicate.matches(black_box(&record))));
    });
    group.finish();
}

fn bench_file_scaling(c: &mut Criterion) {
    let file_counts = vec![1, 10, 50];

    let mut group = c.benchmark_group("File Scaling");
    for &count in &file_counts {
        let dir = tempdir().unwrap();
        create_test_files(&dir, count, 100).unwrap();
        let config = create_base_config(&dir);

        group.bench_function(format!("files_{}", count), |b| {
            b.iter(|| black_box(query(&config).unwrap()));
        });
    }
    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 32, 200).unwrap();

    let mut group = c.benchmark_group("Thread Scaling");
    for threads in [1, 2, 4, 8] {
        let config = QueryConfig {
            thread_count: NonZeroUsize::new(threads).unwrap(),
            ..create_base_config(&dir)
        };
        group.bench_function(format!("threads_{}", threads), |b| {
            b.iter(|| black_box(query(&config).unwrap()));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_filter_parsing, bench_growth_and_predicate,
              bench_file_scaling, bench_thread_scaling
}

criterion_main!(benches);
