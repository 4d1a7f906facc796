//! Autoregressive verse generation.
//!
//! Each step re-encodes the whole output, keeps the trailing context
//! window, asks the model for a distribution, reweights it by temperature
//! and draws one word. Steps are strictly sequential.

use crate::error::{DiwanError, Result};
use crate::model::Predictor;
use crate::vocab::Vocabulary;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{debug, warn};

/// Added to every probability before taking its logarithm.
pub const EPSILON: f64 = 1e-7;

/// Why generation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// All requested steps were taken.
    Completed,
    /// The model returned an error.
    ModelFailed,
    /// The sampled id has no word in the vocabulary.
    UnknownToken,
    /// The model returned nothing usable to sample from.
    DegenerateDistribution,
}

/// Seed text followed by the sampled words.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedText {
    text: String,
    seed_len: usize,
    tokens: Vec<String>,
    stop: StopReason,
}

impl GeneratedText {
    fn new(seed: &str) -> Self {
        Self {
            text: seed.to_string(),
            seed_len: seed.len(),
            tokens: Vec::new(),
            stop: StopReason::Completed,
        }
    }

    fn push(&mut self, word: &str) {
        self.text.push(' ');
        self.text.push_str(word);
        self.tokens.push(word.to_string());
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn seed(&self) -> &str {
        &self.text[..self.seed_len]
    }

    /// Words appended after the seed, in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop
    }

    /// True when generation ended before taking every step.
    pub fn stopped_early(&self) -> bool {
        self.stop != StopReason::Completed
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for GeneratedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for GeneratedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Generation settings.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Words to append.
    pub steps: usize,
    /// Below 1 sharpens toward the most likely word, above 1 flattens.
    pub temperature: f32,
    /// Context window the model expects, including the predicted slot.
    pub max_len: usize,
    /// Fixed RNG seed for reproducible output.
    pub rng_seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            temperature: 1.0,
            max_len: 16,
            rng_seed: None,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        validate(self.temperature, self.max_len)
    }
}

fn validate(temperature: f32, max_len: usize) -> Result<()> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(DiwanError::InvalidTemperature(temperature));
    }
    if max_len < 1 {
        return Err(DiwanError::InvalidContextWindow(max_len));
    }
    Ok(())
}

/// Runs a [`GenerationConfig`] against a model and vocabulary.
#[derive(Clone, Debug, Default)]
pub struct Sampler {
    config: GenerationConfig,
}

impl Sampler {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn run<P: Predictor>(&self, model: &P, vocab: &Vocabulary, seed_text: &str) -> Result<GeneratedText> {
        let c = &self.config;
        match c.rng_seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                generate_with_rng(model, vocab, seed_text, c.steps, c.temperature, c.max_len, &mut rng)
            }
            None => generate(model, vocab, seed_text, c.steps, c.temperature, c.max_len),
        }
    }
}

/// Extend `seed_text` by up to `steps` sampled words using the thread RNG.
pub fn generate<P: Predictor>(
    model: &P,
    vocab: &Vocabulary,
    seed_text: &str,
    steps: usize,
    temperature: f32,
    max_len: usize,
) -> Result<GeneratedText> {
    let mut rng = rand::thread_rng();
    generate_with_rng(model, vocab, seed_text, steps, temperature, max_len, &mut rng)
}

/// Same as [`generate`] with a caller supplied RNG.
///
/// Only invalid `temperature` or `max_len` produce an error. Any failure
/// once sampling has started ends generation and returns what was produced
/// so far, with the cause recorded in [`GeneratedText::stop_reason`].
pub fn generate_with_rng<P: Predictor, R: Rng + ?Sized>(
    model: &P,
    vocab: &Vocabulary,
    seed_text: &str,
    steps: usize,
    temperature: f32,
    max_len: usize,
    rng: &mut R,
) -> Result<GeneratedText> {
    validate(temperature, max_len)?;

    let mut out = GeneratedText::new(seed_text);
    for step in 0..steps {
        let ids = vocab.encode(out.as_str());
        let context = left_pad(&ids, max_len - 1);

        let probs = match model.predict(&context) {
            Ok(probs) => probs,
            Err(e) => {
                warn!(step, error = %e, "model query failed, stopping early");
                out.stop = StopReason::ModelFailed;
                break;
            }
        };

        let weights = apply_temperature(&probs, temperature)?;
        let Some(id) = sample_index(&weights, rng) else {
            warn!(step, len = weights.len(), "no usable distribution, stopping early");
            out.stop = StopReason::DegenerateDistribution;
            break;
        };

        let Some(word) = vocab.word(id) else {
            warn!(step, id, "sampled id has no word, stopping early");
            out.stop = StopReason::UnknownToken;
            break;
        };

        debug!(step, id, word, "sampled");
        out.push(word);
    }
    Ok(out)
}

/// Keep the trailing `window` ids, left-padding with 0 to exactly `window`.
pub fn left_pad(ids: &[usize], window: usize) -> Vec<usize> {
    let tail = &ids[ids.len().saturating_sub(window)..];
    let mut padded = vec![0; window - tail.len()];
    padded.extend_from_slice(tail);
    padded
}

/// Reweight a distribution by temperature and renormalize it.
///
/// Computes `exp(ln(p + EPSILON) / temperature)` normalized to sum to 1.
/// Negative or NaN inputs count as zero probability.
pub fn apply_temperature(probs: &[f32], temperature: f32) -> Result<Vec<f32>> {
    validate(temperature, 1)?;
    if probs.is_empty() {
        return Ok(Vec::new());
    }

    let t = temperature as f64;
    let scaled: Vec<f64> = probs
        .iter()
        .map(|&p| {
            let p = if p.is_nan() { 0.0 } else { (p as f64).max(0.0) };
            (p + EPSILON).ln() / t
        })
        .collect();

    // shift by the max so exp never overflows; cancels on renormalization
    let max = scaled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scaled.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    Ok(exp.iter().map(|&e| (e / sum) as f32).collect())
}

/// Draw one index with probability proportional to its weight.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let dist = WeightedIndex::new(weights).ok()?;
    Some(dist.sample(rng))
}
