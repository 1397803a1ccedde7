use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rayon::prelude::*;

use ncda::alignment::{similarity_matrix, AlignmentMethod, AlignmentScoring, SequenceSimilarity};
use ncda::similarity::{disease_similarity_matrix, Builtins, StandardCombiner};
use ncda::term::InformationContentKind;
use ncda::{Ontology, RnaKind, SequenceSet};

fn sequential(set: &SequenceSet, method: &dyn SequenceSimilarity) -> f32 {
    let records = set.records();
    let mut total = 0.0;
    for a in records {
        for b in records {
            total += method.calculate(a, b);
        }
    }
    total
}

fn parallel(set: &SequenceSet, method: &(dyn SequenceSimilarity + Sync)) -> f32 {
    let records = set.records();
    records
        .par_iter()
        .map(|a| {
            records
                .iter()
                .map(|b| method.calculate(a, b))
                .sum::<f32>()
        })
        .sum()
}

fn alignment_benchmark(c: &mut Criterion) {
    let set = SequenceSet::from_csv(RnaKind::Lncrna, "tests/data/lncrna_sequences.csv").unwrap();
    let mirna = SequenceSet::from_csv(RnaKind::Mirna, "tests/data/mirna_sequences.csv").unwrap();

    for method in [AlignmentMethod::Global, AlignmentMethod::Local] {
        let aligner = method.with_scoring(AlignmentScoring::default());
        c.bench_function(&format!("{method:?} sequential"), |b| {
            b.iter(|| sequential(black_box(&set), aligner.as_ref()))
        });
        c.bench_function(&format!("{method:?} parallel"), |b| {
            b.iter(|| parallel(black_box(&set), aligner.as_ref()))
        });
        c.bench_function(&format!("{method:?} matrix"), |b| {
            b.iter(|| similarity_matrix(black_box(&mirna), &aligner))
        });
    }
}

fn disease_benchmark(c: &mut Criterion) {
    let ontology = Ontology::from_files(
        "tests/data/doid.obo",
        Some("tests/data/disease_doid.csv"),
    )
    .unwrap();

    for method in ["graphic", "lin", "wang"] {
        let similarity = Builtins::new(method, InformationContentKind::Intrinsic).unwrap();
        c.bench_function(&format!("disease matrix {method}"), |b| {
            b.iter(|| {
                disease_similarity_matrix(
                    black_box(&ontology),
                    &similarity,
                    &StandardCombiner::default(),
                )
            })
        });
    }
}

criterion_group! {
    name = similarity;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(5));
    targets = alignment_benchmark, disease_benchmark
}
criterion_main!(similarity);
