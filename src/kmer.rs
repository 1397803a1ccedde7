//! K-mer tokenization and k-mer embedding pretraining
//!
//! Every ncRNA sequence is split into overlapping k-mers (stride 1). The
//! k-mers are mapped to ids of a [`Vocabulary`], the id sequences are split
//! into fixed-size, zero-padded segments, and [`Word2Vec`] learns one vector
//! per k-mer. The result is stored as a [`KmerEmbedding`].
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{usize_to_f32, LabeledMatrix, NcdaError, NcdaResult, RnaKind, SequenceSet};

mod word2vec;
pub use word2vec::{Word2Vec, Word2VecConfig};

/// Token of the padding id `0`
pub const PAD_TOKEN: &str = "<pad>";

/// Splits sequences into overlapping k-mers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerTokenizer {
    k: usize,
    max_len: usize,
}

impl KmerTokenizer {
    /// Constructs a new tokenizer
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if `k` or `max_len` is `0`
    pub fn new(k: usize, max_len: usize) -> NcdaResult<Self> {
        if k == 0 || max_len == 0 {
            return Err(NcdaError::InvalidInput(
                "k and max_len must be positive".to_string(),
            ));
        }
        Ok(Self { k, max_len })
    }

    /// Length of the k-mers
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of tokens per segment
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Returns all overlapping k-mers of the sequence
    ///
    /// Sequences shorter than `k` yield a single token, the whole sequence.
    /// Empty sequences yield no tokens.
    ///
    /// ```
    /// use ncda::kmer::KmerTokenizer;
    ///
    /// let tokenizer = KmerTokenizer::new(3, 10).unwrap();
    /// assert_eq!(tokenizer.tokenize("ACGUA"), vec!["ACG", "CGU", "GUA"]);
    /// assert_eq!(tokenizer.tokenize("AC"), vec!["AC"]);
    /// ```
    pub fn tokenize<'a>(&self, sequence: &'a str) -> Vec<&'a str> {
        if sequence.is_empty() {
            return Vec::new();
        }
        if sequence.len() < self.k {
            return vec![sequence];
        }
        (0..=sequence.len() - self.k)
            .filter_map(|start| sequence.get(start..start + self.k))
            .collect()
    }

    /// Splits token ids into segments of `max_len`, the last segment is
    /// right-padded with `0`
    ///
    /// Every input produces at least one segment.
    pub fn segments(&self, ids: &[u32]) -> Vec<Vec<u32>> {
        if ids.is_empty() {
            return vec![vec![0; self.max_len]];
        }
        ids.chunks(self.max_len)
            .map(|chunk| {
                let mut segment = chunk.to_vec();
                segment.resize(self.max_len, 0);
                segment
            })
            .collect()
    }
}

/// Mapping of k-mer tokens to ids
///
/// Id `0` is reserved for padding, all other ids are assigned in sorted
/// token order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, u32>,
}

impl Vocabulary {
    /// Builds the vocabulary of all tokens
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(tokens: I) -> Self {
        let sorted: BTreeSet<&str> = tokens.into_iter().filter(|t| *t != PAD_TOKEN).collect();
        let tokens: Vec<String> = std::iter::once(PAD_TOKEN)
            .chain(sorted)
            .map(str::to_string)
            .collect();
        Self::from_tokens(tokens)
    }

    fn from_tokens(tokens: Vec<String>) -> Self {
        let ids = tokens
            .iter()
            .zip(0u32..)
            .map(|(token, id)| (token.clone(), id))
            .collect();
        Self { tokens, ids }
    }

    /// Number of tokens, including padding
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the vocabulary only holds the padding token
    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 1
    }

    /// Returns the id of a token
    pub fn id(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    /// Returns the token of an id
    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Maps tokens to ids, unknown tokens map to padding
    pub fn encode(&self, tokens: &[&str]) -> Vec<u32> {
        tokens
            .iter()
            .map(|token| self.id(token).unwrap_or(0))
            .collect()
    }

    /// All tokens, ordered by id
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Pretrained k-mer vectors of one [`RnaKind`]
///
/// # Examples
///
/// ```
/// use ncda::kmer::{KmerEmbedding, KmerTokenizer, Word2VecConfig};
/// use ncda::{RnaKind, RnaRecord, SequenceSet};
///
/// let mut set = SequenceSet::new(RnaKind::Mirna);
/// set.push(RnaRecord::new("mir-1", "ACGUACGUAA")).unwrap();
/// set.push(RnaRecord::new("mir-2", "GGUACG")).unwrap();
///
/// let tokenizer = KmerTokenizer::new(3, 4).unwrap();
/// let config = Word2VecConfig { dim: 8, ..Default::default() };
/// let embedding = KmerEmbedding::train(&set, tokenizer, config).unwrap();
///
/// assert_eq!(embedding.dim(), 8);
/// assert_eq!(embedding.segments().len(), 3);
/// assert_eq!(embedding.segment_to_sequence(), &[0, 0, 1]);
/// assert_eq!(embedding.sequence_vectors().dim(), (2, 8));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmerEmbedding {
    kind: RnaKind,
    k: usize,
    max_len: usize,
    dim: usize,
    sequence_ids: Vec<String>,
    vocabulary: Vec<String>,
    vectors: Vec<Vec<f32>>,
    segments: Vec<Vec<u32>>,
    segment_to_sequence: Vec<usize>,
}

impl KmerEmbedding {
    /// Tokenizes all sequences of the set and trains the k-mer vectors
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the word2vec configuration is invalid
    pub fn train(set: &SequenceSet, tokenizer: KmerTokenizer, config: Word2VecConfig) -> NcdaResult<Self> {
        let tokens: Vec<Vec<&str>> = set
            .iter()
            .map(|record| tokenizer.tokenize(record.sequence()))
            .collect();
        let vocabulary = Vocabulary::new(tokens.iter().flatten().copied());
        let corpus: Vec<Vec<u32>> = tokens.iter().map(|t| vocabulary.encode(t)).collect();

        let mut segments = Vec::new();
        let mut segment_to_sequence = Vec::new();
        for (idx, ids) in corpus.iter().enumerate() {
            for segment in tokenizer.segments(ids) {
                segments.push(segment);
                segment_to_sequence.push(idx);
            }
        }

        info!(
            "Training {}-mer embeddings of {} {} sequences: {} tokens, {} segments",
            tokenizer.k(),
            set.len(),
            set.kind(),
            vocabulary.len(),
            segments.len()
        );
        let model = Word2Vec::train(&corpus, vocabulary.len(), config)?;

        Ok(Self {
            kind: set.kind(),
            k: tokenizer.k(),
            max_len: tokenizer.max_len(),
            dim: model.dim(),
            sequence_ids: set.ids(),
            vocabulary: vocabulary.tokens().to_vec(),
            vectors: model.vectors(),
            segments,
            segment_to_sequence,
        })
    }

    /// Default file name, e.g. `kmer_embedding_mirna_64.json`
    pub fn file_name(kind: RnaKind, dim: usize) -> String {
        format!("kmer_embedding_{kind}_{dim}.json")
    }

    /// The ncRNA type of the embedded sequences
    pub fn kind(&self) -> RnaKind {
        self.kind
    }

    /// Length of the k-mers
    pub fn k(&self) -> usize {
        self.k
    }

    /// Size of the k-mer vectors
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Tokens per segment
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// The vocabulary, ordered by id
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::from_tokens(self.vocabulary.clone())
    }

    /// Returns the vector of a k-mer
    pub fn vector(&self, token: &str) -> Option<&[f32]> {
        let id = self.vocabulary.iter().position(|t| t == token)?;
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// All zero-padded segments of token ids
    pub fn segments(&self) -> &[Vec<u32>] {
        &self.segments
    }

    /// Index of the sequence each segment belongs to
    pub fn segment_to_sequence(&self) -> &[usize] {
        &self.segment_to_sequence
    }

    /// The identifiers of the embedded sequences
    pub fn sequence_ids(&self) -> &[String] {
        &self.sequence_ids
    }

    /// Returns the mean k-mer vector of every sequence
    ///
    /// Padding is ignored. Sequences without tokens get a zero vector.
    pub fn sequence_vectors(&self) -> LabeledMatrix {
        let columns: Vec<String> = (0..self.dim).map(|i| format!("e{i}")).collect();
        let mut matrix = LabeledMatrix::zeros(self.sequence_ids.clone(), columns);
        let mut sums = vec![vec![0.0f32; self.dim]; self.sequence_ids.len()];
        let mut counts = vec![0usize; self.sequence_ids.len()];

        for (segment, seq_idx) in self.segments.iter().zip(&self.segment_to_sequence) {
            for id in segment.iter().filter(|id| **id != 0) {
                let Some(vector) = self.vectors.get(*id as usize) else {
                    continue;
                };
                for (sum, v) in sums[*seq_idx].iter_mut().zip(vector) {
                    *sum += v;
                }
                counts[*seq_idx] += 1;
            }
        }

        for (row, (sum, count)) in sums.iter().zip(&counts).enumerate() {
            if *count == 0 {
                continue;
            }
            for (col, value) in sum.iter().enumerate() {
                matrix.set(row, col, value / usize_to_f32(*count));
            }
        }
        matrix
    }

    /// Writes the embedding as JSON
    ///
    /// # Errors
    ///
    /// [`NcdaError::Io`] or [`NcdaError::Json`] if the file can't be written
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> NcdaResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Reads an embedding from JSON
    ///
    /// # Errors
    ///
    /// - [`NcdaError::CannotOpenFile`] if the file can't be opened
    /// - [`NcdaError::Json`] if the content is not a valid embedding
    /// - [`NcdaError::DimensionMismatch`] if a vector does not have `dim` values
    pub fn from_json<P: AsRef<Path>>(path: P) -> NcdaResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|_| NcdaError::CannotOpenFile(path.display().to_string()))?;
        let embedding: Self = serde_json::from_reader(BufReader::new(file))?;
        if let Some(vector) = embedding.vectors.iter().find(|v| v.len() != embedding.dim) {
            return Err(NcdaError::DimensionMismatch {
                expected: embedding.dim,
                found: vector.len(),
            });
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RnaRecord;

    #[test]
    fn tokenize_edge_cases() {
        let tokenizer = KmerTokenizer::new(4, 3).unwrap();
        assert!(tokenizer.tokenize("").is_empty());
        assert_eq!(tokenizer.tokenize("ACGU"), vec!["ACGU"]);
        assert_eq!(tokenizer.tokenize("ACG"), vec!["ACG"]);
        assert_eq!(tokenizer.tokenize("ACGUA").len(), 2);
        assert!(KmerTokenizer::new(0, 3).is_err());
    }

    #[test]
    fn segments_are_padded() {
        let tokenizer = KmerTokenizer::new(3, 3).unwrap();
        assert_eq!(tokenizer.segments(&[1, 2, 3, 4]), vec![vec![1, 2, 3], vec![4, 0, 0]]);
        assert_eq!(tokenizer.segments(&[]), vec![vec![0, 0, 0]]);
        assert_eq!(tokenizer.segments(&[5, 6, 7]), vec![vec![5, 6, 7]]);
    }

    #[test]
    fn vocabulary_order() {
        let vocab = Vocabulary::new(["GGA", "ACG", "GGA", "CCC"]);
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.id(PAD_TOKEN), Some(0));
        assert_eq!(vocab.id("ACG"), Some(1));
        assert_eq!(vocab.id("CCC"), Some(2));
        assert_eq!(vocab.token(3), Some("GGA"));
        assert_eq!(vocab.encode(&["GGA", "UUU"]), vec![3, 0]);
    }

    fn set() -> SequenceSet {
        let mut set = SequenceSet::new(RnaKind::Pirna);
        for (id, seq) in [
            ("piR-1", "UGAGGUAGUAGGUUGUAUAGUU"),
            ("piR-2", "UGAGGUAGUAGGUUGUGUGGUU"),
            ("piR-3", "AC"),
            ("piR-4", ""),
        ] {
            set.push(RnaRecord::new(id, seq)).unwrap();
        }
        set
    }

    #[test]
    fn embedding_dimensions() {
        let tokenizer = KmerTokenizer::new(3, 8).unwrap();
        let config = Word2VecConfig {
            dim: 16,
            epochs: 2,
            ..Default::default()
        };
        let embedding = KmerEmbedding::train(&set(), tokenizer, config).unwrap();
        assert!(embedding.vectors.iter().all(|v| v.len() == 16));
        assert_eq!(embedding.vector("UGA").map(<[f32]>::len), Some(16));
        // 20 tokens -> 3 segments, 1 token -> 1, empty -> 1
        assert_eq!(embedding.segment_to_sequence(), &[0, 0, 0, 1, 1, 1, 2, 3]);

        let vectors = embedding.sequence_vectors();
        assert_eq!(vectors.dim(), (4, 16));
        assert!(vectors.row(3).unwrap().iter().all(|v| *v == 0.0));
        assert!(vectors.row(0).unwrap().iter().any(|v| *v != 0.0));
    }

    #[test]
    fn json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let tokenizer = KmerTokenizer::new(3, 8).unwrap();
        let config = Word2VecConfig {
            dim: 4,
            epochs: 1,
            ..Default::default()
        };
        let embedding = KmerEmbedding::train(&set(), tokenizer, config).unwrap();
        let path = dir.path().join(KmerEmbedding::file_name(RnaKind::Pirna, 4));
        assert!(path.ends_with("kmer_embedding_pirna_4.json"));
        embedding.to_json(&path).unwrap();
        let restored = KmerEmbedding::from_json(&path).unwrap();
        assert_eq!(restored.segments(), embedding.segments());
        assert_eq!(restored.vocabulary(), embedding.vocabulary());
        for (a, b) in restored.vectors.iter().flatten().zip(embedding.vectors.iter().flatten()) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}
