use diwan_core::model::{MarkovModel, ModelArgs, Predictor};
use diwan_core::sampler::{generate, generate_with_rng, GenerationConfig, Sampler, StopReason};
use diwan_core::{DiwanError, Result, Vocabulary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::{Cell, RefCell};

/// Always puts all probability mass on one id.
struct Fixed {
    id: usize,
    size: usize,
}

impl Predictor for Fixed {
    fn predict(&self, _context: &[usize]) -> Result<Vec<f32>> {
        let mut probs = vec![0.0; self.size];
        probs[self.id] = 1.0;
        Ok(probs)
    }
}

/// Succeeds a fixed number of times, then errors.
struct FailsAfter {
    ok_calls: usize,
    calls: Cell<usize>,
}

impl Predictor for FailsAfter {
    fn predict(&self, _context: &[usize]) -> Result<Vec<f32>> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n >= self.ok_calls {
            return Err(DiwanError::Prediction("backend went away".into()));
        }
        Ok(vec![0.0, 0.0, 1.0, 0.0])
    }
}

/// Records every context it is asked about.
struct Recording {
    seen: RefCell<Vec<Vec<usize>>>,
}

impl Predictor for Recording {
    fn predict(&self, context: &[usize]) -> Result<Vec<f32>> {
        self.seen.borrow_mut().push(context.to_vec());
        Ok(vec![0.0, 0.0, 1.0, 0.0])
    }
}

fn vocab() -> Vocabulary {
    Vocabulary::from_word_index([("dil", 1), ("hai", 2), ("yeh", 3)]).unwrap()
}

#[test]
fn deterministic_model_repeats_its_word() {
    let model = Fixed { id: 2, size: 4 };
    let mut rng = StdRng::seed_from_u64(7);
    let out = generate_with_rng(&model, &vocab(), "dil", 3, 1.0, 10, &mut rng).unwrap();
    assert_eq!(out.as_str(), "dil hai hai hai");
    assert_eq!(out.tokens(), ["hai", "hai", "hai"]);
    assert_eq!(out.seed(), "dil");
    assert_eq!(out.stop_reason(), StopReason::Completed);
}

#[test]
fn zero_steps_returns_seed_unchanged() {
    let model = Fixed { id: 2, size: 4 };
    let out = generate(&model, &vocab(), "Dil, kya?", 0, 0.8, 5).unwrap();
    assert_eq!(out.to_string(), "Dil, kya?");
    assert!(out.tokens().is_empty());
}

#[test]
fn never_appends_more_than_steps() {
    let model = MarkovModel::uniform(ModelArgs { vocab_size: 4 });
    let mut rng = StdRng::seed_from_u64(11);
    for steps in 0..12 {
        let out = generate_with_rng(&model, &vocab(), "yeh", steps, 1.3, 4, &mut rng).unwrap();
        assert!(out.tokens().len() <= steps);
    }
}

#[test]
fn model_failure_returns_partial_text() {
    let model = FailsAfter { ok_calls: 2, calls: Cell::new(0) };
    let out = generate(&model, &vocab(), "dil", 5, 1.0, 4).unwrap();
    assert_eq!(out.as_str(), "dil hai hai");
    assert_eq!(out.stop_reason(), StopReason::ModelFailed);
    assert!(out.stopped_early());
}

#[test]
fn padding_id_ends_generation() {
    // id 0 is padding and never maps to a word
    let model = Fixed { id: 0, size: 4 };
    let out = generate(&model, &vocab(), "dil", 4, 1.0, 4).unwrap();
    assert_eq!(out.as_str(), "dil");
    assert_eq!(out.stop_reason(), StopReason::UnknownToken);
}

#[test]
fn id_beyond_vocabulary_ends_generation() {
    let model = Fixed { id: 6, size: 8 };
    let out = generate(&model, &vocab(), "dil", 4, 1.0, 4).unwrap();
    assert_eq!(out.stop_reason(), StopReason::UnknownToken);
    assert!(out.tokens().is_empty());
}

#[test]
fn empty_distribution_ends_generation() {
    struct Empty;
    impl Predictor for Empty {
        fn predict(&self, _context: &[usize]) -> Result<Vec<f32>> {
            Ok(Vec::new())
        }
    }
    let out = generate(&Empty, &vocab(), "dil", 3, 1.0, 4).unwrap();
    assert_eq!(out.stop_reason(), StopReason::DegenerateDistribution);
    assert_eq!(out.as_str(), "dil");
}

#[test]
fn context_is_left_padded_and_truncated() {
    let model = Recording { seen: RefCell::new(Vec::new()) };
    let mut rng = StdRng::seed_from_u64(3);
    generate_with_rng(&model, &vocab(), "dil yeh", 3, 1.0, 4, &mut rng).unwrap();
    let seen = model.seen.borrow();
    assert_eq!(seen[0], vec![0, 1, 3]);
    assert_eq!(seen[1], vec![1, 3, 2]);
    assert_eq!(seen[2], vec![3, 2, 2]);
}

#[test]
fn unknown_seed_words_are_dropped_from_context() {
    let model = Recording { seen: RefCell::new(Vec::new()) };
    generate(&model, &vocab(), "ishq dil", 1, 1.0, 4).unwrap();
    assert_eq!(model.seen.borrow()[0], vec![0, 0, 1]);
}

#[test]
fn window_of_one_sends_empty_context() {
    let model = Recording { seen: RefCell::new(Vec::new()) };
    let out = generate(&model, &vocab(), "dil", 2, 1.0, 1).unwrap();
    assert_eq!(out.tokens().len(), 2);
    assert!(model.seen.borrow().iter().all(|c| c.is_empty()));
}

#[test]
fn rejects_invalid_preconditions_before_querying() {
    let model = FailsAfter { ok_calls: 0, calls: Cell::new(0) };
    assert!(matches!(
        generate(&model, &vocab(), "dil", 3, 0.0, 4),
        Err(DiwanError::InvalidTemperature(_))
    ));
    assert!(matches!(
        generate(&model, &vocab(), "dil", 3, -0.5, 4),
        Err(DiwanError::InvalidTemperature(_))
    ));
    assert!(matches!(
        generate(&model, &vocab(), "dil", 3, 1.0, 0),
        Err(DiwanError::InvalidContextWindow(0))
    ));
    assert_eq!(model.calls.get(), 0);
}

#[test]
fn low_temperature_converges_to_argmax() {
    struct Skewed;
    impl Predictor for Skewed {
        fn predict(&self, _context: &[usize]) -> Result<Vec<f32>> {
            Ok(vec![0.0, 0.3, 0.45, 0.25])
        }
    }

    let vocab = vocab();
    let mut rng = StdRng::seed_from_u64(42);
    let count_hai = |temperature: f32, rng: &mut StdRng| {
        let out = generate_with_rng(&Skewed, &vocab, "", 400, temperature, 2, rng).unwrap();
        out.tokens().iter().filter(|w| *w == "hai").count()
    };

    let cold = count_hai(0.05, &mut rng);
    let warm = count_hai(1.0, &mut rng);
    assert!(cold > 390, "cold run picked the mode {} times", cold);
    assert!(warm < 250, "warm run picked the mode {} times", warm);
    assert!(cold > warm);
}

#[test]
fn seeded_sampler_is_reproducible() {
    let model = MarkovModel::uniform(ModelArgs { vocab_size: 4 });
    let config = GenerationConfig { steps: 8, temperature: 1.2, max_len: 5, rng_seed: Some(99) };
    let sampler = Sampler::new(config);
    let a = sampler.run(&model, &vocab(), "shaam").unwrap();
    let b = sampler.run(&model, &vocab(), "shaam").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.tokens().len(), 8);
}

#[test]
fn boxed_models_are_predictors() {
    let model: Box<dyn Predictor> = Box::new(Fixed { id: 3, size: 4 });
    let out = generate(&model, &vocab(), "dil", 2, 1.0, 3).unwrap();
    assert_eq!(out.as_str(), "dil yeh yeh");
}
