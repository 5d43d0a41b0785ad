//! Performance benchmarks for catalog core operations
//!
//! Run with: `cargo bench -p catalog-core`
//!
//! These benchmarks measure critical path performance:
//! - Forest building from flat records (tree endpoint)
//! - CSV parsing and import planning
//! - Full replace import into the JSON file store
//! - Cycle guard walks over a deep chain

use catalog_core::db::{CategoryStore, JsonFileStore, MemoryStore};
use catalog_core::models::NewCategory;
use catalog_core::services::import::plan_from_bytes;
use catalog_core::services::{build_forest, BulkImporter, CycleGuard, ImportFormat};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Balanced hierarchy: 10 roots, each child id `i` hangs under `i / 10`
fn generate_records(count: i64) -> Vec<NewCategory> {
    (1..=count)
        .map(|id| {
            let parent = if id <= 10 { None } else { Some(id / 10) };
            NewCategory::new(id, format!("Category {}", id), parent)
        })
        .collect()
}

/// CSV export of `generate_records`, with every other parent given by name
fn generate_csv(count: i64) -> String {
    let mut csv = String::from("id,name,image,parent\n");
    for record in generate_records(count) {
        let parent = match record.parent {
            Some(p) if record.id % 2 == 0 => format!("\"Category {}\"", p),
            Some(p) => p.to_string(),
            None => String::new(),
        };
        csv.push_str(&format!("{},\"{}\",,{}\n", record.id, record.name, parent));
    }
    csv
}

/// Benchmark forest building for the tree endpoint
///
/// Target: well under 1ms for 1000 records
fn bench_build_forest(c: &mut Criterion) {
    let records = generate_records(1000);

    c.bench_function("build_forest_1000", |b| {
        b.iter(|| black_box(build_forest(black_box(&records), None)))
    });
}

/// Benchmark CSV parse + normalize + dedup + parent resolution
fn bench_import_plan(c: &mut Criterion) {
    let csv = generate_csv(1000).into_bytes();

    c.bench_function("plan_csv_1000_rows", |b| {
        b.iter(|| {
            let plan = plan_from_bytes(ImportFormat::DelimitedText, csv.clone()).unwrap();
            black_box(plan)
        })
    });
}

/// Benchmark the full replace into a JSON file store
fn bench_import_replace(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let csv = generate_csv(1000).into_bytes();

    let mut group = c.benchmark_group("import_replace");
    group.sample_size(10); // Fewer samples for disk-bound operations

    group.bench_function("json_store_1000_rows", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let temp_dir = TempDir::new().unwrap();
                let store = Arc::new(
                    JsonFileStore::open(temp_dir.path().join("categories.json"))
                        .await
                        .unwrap(),
                );
                let importer = BulkImporter::new(store);

                let mut total = std::time::Duration::ZERO;
                for _ in 0..iters {
                    let plan = plan_from_bytes(ImportFormat::DelimitedText, csv.clone()).unwrap();

                    let start = std::time::Instant::now();
                    let report = importer.apply(plan).await.unwrap();
                    total += start.elapsed();

                    black_box(report);
                }
                total
            })
        });
    });

    group.finish();
}

/// Benchmark the ancestor walk over a 500-deep chain
fn bench_cycle_guard(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let chain: Vec<NewCategory> = (1..=500)
        .map(|id| NewCategory::new(id, format!("Level {}", id), (id > 1).then(|| id - 1)))
        .collect();
    let store = MemoryStore::with_categories(chain).unwrap();

    c.bench_function("cycle_guard_depth_500", |b| {
        b.iter(|| {
            rt.block_on(async {
                let guard = CycleGuard::new(&store as &dyn CategoryStore);
                // Moving the root under the deepest leaf walks the whole chain
                black_box(guard.check(1, 500).await.is_err())
            })
        })
    });
}

criterion_group!(
    benches,
    bench_build_forest,
    bench_import_plan,
    bench_import_replace,
    bench_cycle_guard
);
criterion_main!(benches);
