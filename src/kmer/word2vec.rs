//! Skip-gram word2vec with negative sampling
//!
//! A small, single-threaded implementation that trains k-mer vectors on
//! the tokenized ncRNA sequences. All randomness comes from one seeded
//! [`ChaCha8Rng`], so training is reproducible.
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{usize_to_f32, NcdaError, NcdaResult};

/// Hyperparameters of the word2vec training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Word2VecConfig {
    /// Size of the token vectors
    pub dim: usize,
    /// Maximum distance between center and context token
    pub window: usize,
    /// Number of negative samples per context token
    pub negative: usize,
    /// Passes over the corpus
    pub epochs: usize,
    /// Initial learning rate, decays linearly
    pub learning_rate: f32,
    /// Random seed
    pub seed: u64,
}

impl Default for Word2VecConfig {
    fn default() -> Self {
        Self {
            dim: 64,
            window: 5,
            negative: 5,
            epochs: 5,
            learning_rate: 0.025,
            seed: 42,
        }
    }
}

/// Noise distribution exponent of the unigram table
const NOISE_EXPONENT: f64 = 0.75;
/// Lower bound of the learning rate, relative to the initial rate
const MIN_LEARNING_RATE: f32 = 1e-4;
/// Dot products beyond this value saturate the sigmoid
const MAX_EXP: f32 = 6.0;

/// Trained word2vec model
#[derive(Debug, Clone)]
pub struct Word2Vec {
    config: Word2VecConfig,
    vocab_size: usize,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl Word2Vec {
    /// Trains token vectors on the corpus
    ///
    /// `corpus` holds the token ids of every sentence, ids must be smaller
    /// than `vocab_size`. The id `0` is padding: it is never trained and its
    /// vector stays zero.
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if `dim` is `0` or a token id is out of range
    pub fn train(corpus: &[Vec<u32>], vocab_size: usize, config: Word2VecConfig) -> NcdaResult<Self> {
        if config.dim == 0 {
            return Err(NcdaError::InvalidInput(
                "embedding dimension must be positive".to_string(),
            ));
        }
        let dim = config.dim;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut counts = vec![0usize; vocab_size];
        for id in corpus.iter().flatten() {
            let Some(count) = counts.get_mut(*id as usize) else {
                return Err(NcdaError::InvalidInput(format!(
                    "token id {id} exceeds vocabulary size {vocab_size}"
                )));
            };
            *count += 1;
        }
        if let Some(pad) = counts.first_mut() {
            *pad = 0;
        }

        let scale = 0.5 / usize_to_f32(dim);
        let mut input: Vec<f32> = (0..vocab_size * dim)
            .map(|_| (rng.gen::<f32>() - 0.5) * 2.0 * scale)
            .collect();
        let pad = dim.min(input.len());
        input[..pad].fill(0.0);
        let output = vec![0.0f32; vocab_size * dim];

        let mut model = Self {
            config,
            vocab_size,
            input,
            output,
        };

        // counts are `usize`, the precision loss of large counts is irrelevant for sampling
        #[allow(clippy::cast_precision_loss)]
        let weights: Vec<f64> = counts
            .iter()
            .map(|c| (*c as f64).powf(NOISE_EXPONENT))
            .collect();
        let Ok(noise) = WeightedIndex::new(&weights) else {
            debug!("Empty corpus, no word2vec training");
            return Ok(model);
        };

        let total_words: usize = counts.iter().sum::<usize>() * config.epochs;
        let mut processed = 0usize;
        let mut grad = vec![0.0f32; dim];

        for epoch in 0..config.epochs {
            let mut loss = 0.0f32;
            for sentence in corpus {
                for (pos, center) in sentence.iter().enumerate() {
                    if *center == 0 {
                        continue;
                    }
                    let progress = usize_to_f32(processed) / usize_to_f32(total_words.max(1));
                    let lr = (config.learning_rate * (1.0 - progress))
                        .max(config.learning_rate * MIN_LEARNING_RATE);
                    processed += 1;

                    // dynamic window as in the reference word2vec
                    let shrink = if config.window > 0 {
                        rng.gen_range(0..config.window)
                    } else {
                        0
                    };
                    let window = config.window - shrink;
                    let start = pos.saturating_sub(window);
                    let end = (pos + window + 1).min(sentence.len());

                    for ctx_pos in start..end {
                        let context = sentence[ctx_pos];
                        if ctx_pos == pos || context == 0 {
                            continue;
                        }
                        grad.fill(0.0);
                        for n in 0..=config.negative {
                            let (target, label) = if n == 0 {
                                (context as usize, 1.0)
                            } else {
                                let sample = noise.sample(&mut rng);
                                if sample == context as usize {
                                    continue;
                                }
                                (sample, 0.0)
                            };
                            let f = model.dot(*center as usize, target);
                            let pred = sigmoid(f);
                            loss -= if label > 0.0 {
                                pred.max(1e-7).ln()
                            } else {
                                (1.0 - pred).max(1e-7).ln()
                            };
                            let g = (label - pred) * lr;
                            model.update(*center as usize, target, g, &mut grad);
                        }
                        let row = *center as usize * dim;
                        for (w, d) in model.input[row..row + dim].iter_mut().zip(&grad) {
                            *w += d;
                        }
                    }
                }
            }
            trace!("word2vec epoch {epoch}: loss {loss}");
        }
        debug!(
            "Trained {} token vectors of size {} for {} epochs",
            vocab_size, dim, config.epochs
        );
        Ok(model)
    }

    fn dot(&self, center: usize, target: usize) -> f32 {
        let dim = self.config.dim;
        self.input[center * dim..(center + 1) * dim]
            .iter()
            .zip(&self.output[target * dim..(target + 1) * dim])
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Accumulates the input gradient and updates the output vector of `target`
    fn update(&mut self, center: usize, target: usize, g: f32, grad: &mut [f32]) {
        let dim = self.config.dim;
        let input = &self.input[center * dim..(center + 1) * dim];
        let output = &mut self.output[target * dim..(target + 1) * dim];
        for ((acc, out), inp) in grad.iter_mut().zip(output.iter_mut()).zip(input) {
            *acc += g * *out;
            *out += g * inp;
        }
    }

    /// Number of tokens
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Size of the token vectors
    pub fn dim(&self) -> usize {
        self.config.dim
    }

    /// Returns the vector of a token
    pub fn vector(&self, id: u32) -> Option<&[f32]> {
        let dim = self.config.dim;
        let start = (id as usize).checked_mul(dim)?;
        self.input.get(start..start + dim)
    }

    /// Returns all token vectors, one row per token id
    pub fn vectors(&self) -> Vec<Vec<f32>> {
        self.input
            .chunks(self.config.dim)
            .map(<[f32]>::to_vec)
            .collect()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-MAX_EXP, MAX_EXP)).exp())
}

#[cfg(test)]
mod test {
    use super::*;

    fn corpus() -> Vec<Vec<u32>> {
        vec![
            vec![1, 2, 3, 4, 1, 2, 3, 4],
            vec![2, 3, 4, 5, 2, 3],
            vec![5, 1, 5, 1, 5],
        ]
    }

    fn config() -> Word2VecConfig {
        Word2VecConfig {
            dim: 8,
            window: 2,
            negative: 3,
            epochs: 3,
            learning_rate: 0.05,
            seed: 7,
        }
    }

    #[test]
    fn vector_shape() {
        let model = Word2Vec::train(&corpus(), 6, config()).unwrap();
        let vectors = model.vectors();
        assert_eq!(vectors.len(), 6);
        assert!(vectors.iter().all(|v| v.len() == 8));
        assert!(vectors[0].iter().all(|v| *v == 0.0));
        assert!(model.vector(6).is_none());
    }

    #[test]
    fn seeded_training_is_reproducible() {
        let a = Word2Vec::train(&corpus(), 6, config()).unwrap();
        let b = Word2Vec::train(&corpus(), 6, config()).unwrap();
        assert_eq!(a.vectors(), b.vectors());

        let c = Word2Vec::train(&corpus(), 6, Word2VecConfig { seed: 8, ..config() }).unwrap();
        assert_ne!(a.vectors(), c.vectors());
    }

    #[test]
    fn invalid_input() {
        assert!(Word2Vec::train(&corpus(), 3, config()).is_err());
        assert!(Word2Vec::train(&corpus(), 6, Word2VecConfig { dim: 0, ..config() }).is_err());
    }

    #[test]
    fn empty_corpus() {
        let model = Word2Vec::train(&[], 1, config()).unwrap();
        assert_eq!(model.vectors(), vec![vec![0.0; 8]]);
    }
}
