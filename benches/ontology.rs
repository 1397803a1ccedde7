use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ncda::term::InformationContentKind;
use ncda::Ontology;

fn build_ontology_benchmark(c: &mut Criterion) {
    c.bench_function("build ontology", |b| {
        b.iter(|| {
            Ontology::from_obo(black_box("tests/data/doid.obo"))
                .expect("requires a valid OBO file")
                .len()
        })
    });
}

fn ancestors_benchmark(c: &mut Criterion) {
    let ontology = Ontology::from_files(
        "tests/data/doid.obo",
        Some("tests/data/disease_doid.csv"),
    )
    .expect("requires valid test data");

    c.bench_function("common ancestors", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for a in &ontology {
                for other in &ontology {
                    count += a.all_common_ancestor_ids(&other).len();
                }
            }
            count
        })
    });

    c.bench_function("max information content", |b| {
        b.iter(|| ontology.max_information_content(black_box(&InformationContentKind::Annotation)))
    });
}

criterion_group! {
    name = ontology;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(5));
    targets = build_ontology_benchmark, ancestors_benchmark
}
criterion_main!(ontology);
