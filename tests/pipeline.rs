use std::fs;
use std::path::Path;

use ncda::folds::Folds;
use ncda::kmer::KmerEmbedding;
use ncda::merge::MergeStrategy;
use ncda::pipeline::{self, Stage};
use ncda::{LabeledMatrix, NcdaError, PipelineConfig, RnaKind};

const FIXTURES: [&str; 5] = [
    "doid.obo",
    "disease_doid.csv",
    "mirna_sequences.csv",
    "lncrna_sequences.csv",
    "associations.csv",
];

fn setup(dir: &Path) -> PipelineConfig {
    for name in FIXTURES {
        fs::copy(Path::new("tests/data").join(name), dir.join(name)).unwrap();
    }
    let mut config = PipelineConfig::from_toml(
        r#"
        [kmer]
        k = 3
        max_len = 8
        dim = 8
        epochs = 2

        [folds]
        k = 3
        seed = 7

        [model]
        projection_size = 8
        hidden_size = 8
        epochs = 3
        batch_size = 8
        "#,
    )
    .unwrap();
    config.paths.data_dir = dir.to_path_buf();
    config
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[test]
fn rna_similarity_matrices() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let written = pipeline::similarity(&config).unwrap();
    // piRNA and circRNA have no sequences
    assert_eq!(written.len(), 2);

    for kind in [RnaKind::Mirna, RnaKind::Lncrna] {
        let m = LabeledMatrix::from_csv(config.paths.rna_similarity(kind)).unwrap();
        assert_eq!(m.nrows(), m.ncols());
        assert!(m.is_symmetric(1e-6));
        assert!(m.is_normalized());
        for i in 0..m.nrows() {
            assert_eq!(m.get(i, i), Some(1.0));
        }
    }
    let mirna = LabeledMatrix::from_csv(config.paths.rna_similarity(RnaKind::Mirna)).unwrap();
    // the let-7 paralogs are the most similar pair
    let a = mirna.row_index("hsa-let-7a").unwrap();
    let b = mirna.row_index("hsa-let-7b").unwrap();
    let c = mirna.row_index("hsa-mir-155").unwrap();
    assert!(mirna.get(a, b).unwrap() > mirna.get(a, c).unwrap());
}

#[test]
fn merged_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path());
    pipeline::similarity(&config).unwrap();

    let view = pipeline::merge(&config).unwrap();
    assert_eq!(view.matrix().dim(), (8, 8));
    assert_eq!(view.labels()[0], "hsa-mir-21");
    assert_eq!(view.labels()[5], "MALAT1");

    config.similarity.merge = MergeStrategy::Padded;
    let view = pipeline::merge(&config).unwrap();
    assert_eq!(view.matrix().dim(), (8, 5));
}

#[test]
fn disease_similarity() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let m = pipeline::disease(&config).unwrap();
    assert_eq!(m.nrows(), 8);
    assert!(m.is_symmetric(1e-6));
    assert!(m.is_normalized());

    let breast = m.row_index("Breast Neoplasms").unwrap();
    let tumor = m.row_index("Breast Tumor").unwrap();
    let lung = m.row_index("Lung Neoplasms").unwrap();
    let crohn = m.row_index("Crohn Disease").unwrap();
    let rare = m.row_index("Rare Syndrome").unwrap();

    // obsolete DOID is replaced by breast cancer
    assert!((m.get(breast, tumor).unwrap() - 1.0).abs() < 1e-6);
    assert!(m.get(breast, lung).unwrap() > m.get(breast, crohn).unwrap());
    assert_eq!(m.get(rare, breast), Some(0.0));
    assert_eq!(m.get(rare, rare), Some(1.0));

    let written = LabeledMatrix::from_csv(config.paths.disease_similarity()).unwrap();
    assert!(config.paths.disease_similarity().ends_with("d2d_do.csv"));
    assert_eq!(written.row_labels(), m.row_labels());
}

#[test]
fn adjacency_counts_unique_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    pipeline::similarity(&config).unwrap();
    pipeline::merge(&config).unwrap();
    pipeline::disease(&config).unwrap();

    let adjacency = pipeline::adjacency(&config).unwrap();
    // 12 rows, one duplicate
    assert_eq!(adjacency.count(), 11);
    assert!((adjacency.matrix().sum() - 11.0).abs() < f32::EPSILON);
    assert_eq!(adjacency.matrix().dim(), (8, 8));
}

#[test]
fn adjacency_with_unknown_rna() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    pipeline::similarity(&config).unwrap();
    pipeline::merge(&config).unwrap();
    pipeline::disease(&config).unwrap();

    let mut associations = fs::read_to_string(config.paths.associations()).unwrap();
    associations.push_str("hsa-mir-999,Neoplasms\n");
    fs::write(config.paths.associations(), associations).unwrap();

    assert!(matches!(
        pipeline::adjacency(&config),
        Err(NcdaError::UnknownIdentifier(id)) if id == "hsa-mir-999"
    ));
}

#[test]
fn kmer_embeddings() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let written = pipeline::kmer(&config).unwrap();
    assert_eq!(written.len(), 2);
    for kind in [RnaKind::Mirna, RnaKind::Lncrna] {
        let embedding = KmerEmbedding::from_json(config.paths.kmer_embedding(kind, 8)).unwrap();
        assert_eq!(embedding.dim(), 8);
        let vectors = embedding.sequence_vectors();
        assert_eq!(vectors.ncols(), 8);
        assert_eq!(vectors.nrows(), embedding.sequence_ids().len());
        assert!(embedding
            .segment_to_sequence()
            .iter()
            .all(|idx| *idx < embedding.sequence_ids().len()));
        assert!(embedding.segments().iter().all(|s| s.len() == 8));
    }
}

#[test]
fn full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    pipeline::run_all(&config).unwrap();

    let folds = Folds::from_json(config.paths.folds()).unwrap();
    assert_eq!(folds.len(), 3);
    assert_eq!(folds.n_records(), 11);
    let mut validation: Vec<usize> = folds.iter().flat_map(|f| f.validation.clone()).collect();
    validation.sort_unstable();
    assert_eq!(validation, (0..11).collect::<Vec<usize>>());

    for fold in 0..3 {
        assert!(config.paths.model_weights(fold).exists());
    }
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.paths.report()).unwrap()).unwrap();
    assert_eq!(report["folds"].as_array().unwrap().len(), 3);
    let auroc = report["mean"]["auroc"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&auroc));
}

#[test]
fn deterministic_reruns() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let deterministic = [
        Stage::Similarity,
        Stage::Merge,
        Stage::Disease,
        Stage::Adjacency,
        Stage::Kmer,
        Stage::Folds,
    ];
    let outputs = [
        config.paths.rna_similarity(RnaKind::Mirna),
        config.paths.rna_similarity(RnaKind::Lncrna),
        config.paths.merged_similarity(),
        config.paths.disease_similarity(),
        config.paths.adjacency(),
        config.paths.kmer_embedding(RnaKind::Mirna, 8),
        config.paths.kmer_embedding(RnaKind::Lncrna, 8),
        config.paths.folds(),
    ];

    for stage in deterministic {
        stage.run(&config).unwrap();
    }
    let first: Vec<Vec<u8>> = outputs.iter().map(|p| read(p)).collect();

    for stage in deterministic {
        stage.run(&config).unwrap();
    }
    for (path, content) in outputs.iter().zip(&first) {
        assert_eq!(&read(path), content, "{} changed", path.display());
    }
}

#[test]
fn missing_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::default();
    config.paths.data_dir = dir.path().to_path_buf();

    assert!(matches!(
        pipeline::similarity(&config),
        Err(NcdaError::InvalidInput(_))
    ));
    assert!(matches!(
        pipeline::disease(&config),
        Err(NcdaError::CannotOpenFile(_))
    ));
}

#[test]
fn train_names_missing_embeddings() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path());
    for stage in &Stage::ALL[..Stage::ALL.len() - 1] {
        stage.run(&config).unwrap();
    }

    config.kmer.dim = 32;
    let Err(NcdaError::CannotOpenFile(message)) = pipeline::train(&config) else {
        panic!("training without embeddings must fail");
    };
    assert!(message.contains("kmer_embedding_mirna_32.json"));
    assert!(message.contains("kmer_embedding_lncrna_32.json"));
}
