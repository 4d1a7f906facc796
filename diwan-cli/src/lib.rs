//! Command handlers behind the `diwan` binary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use diwan_core::card::{encode_png, CardRenderer, CardSpec};
use diwan_core::model::{MarkovModel, ModelArgs, Predictor};
use diwan_core::sampler::{GenerationConfig, Sampler};
use diwan_core::Vocabulary;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "diwan", author, version, about = "Generate verse and render it onto poetry cards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extend a seed word into verse
    Generate(GenerateArgs),
    /// Render given text onto a card
    Card(CardArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CardOptions {
    /// Line drawn under the verse, after a "~" marker
    #[arg(long, default_value = "AI Poet")]
    pub attribution: String,

    /// JSON file overriding the default card look
    #[arg(long)]
    pub card_config: Option<PathBuf>,

    /// Font files to try before the configured ones
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Word index JSON: {"word": id, ...}
    #[arg(long)]
    pub vocab: PathBuf,

    /// Transition table JSON: {"rows": [[...], ...]}. Uniform when omitted
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Starting text
    #[arg(long)]
    pub seed: String,

    /// Number of words to append
    #[arg(long, default_value_t = 20)]
    pub steps: usize,

    /// Sampling temperature
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f32,

    /// Context window including the predicted slot
    #[arg(long, default_value_t = 16)]
    pub max_len: usize,

    /// Fixed RNG seed for reproducible output
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Also render the verse to this PNG file
    #[arg(long)]
    pub card: Option<PathBuf>,

    #[command(flatten)]
    pub card_options: CardOptions,
}

#[derive(Args, Debug)]
pub struct CardArgs {
    /// Verse to draw
    #[arg(long)]
    pub text: String,

    /// Output PNG file
    #[arg(long)]
    pub out: PathBuf,

    #[command(flatten)]
    pub card_options: CardOptions,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => {
            let verse = run_generate(&args)?;
            println!("{}", verse);
        }
        Command::Card(args) => run_card(&args)?,
    }
    Ok(())
}

/// Generate verse, optionally writing a card, and return the text.
pub fn run_generate(args: &GenerateArgs) -> Result<String> {
    let vocab = Vocabulary::load_json(&args.vocab)
        .with_context(|| format!("loading vocabulary from {}", args.vocab.display()))?;

    let model: Box<dyn Predictor> = match &args.model {
        Some(path) => Box::new(
            MarkovModel::load_json(path)
                .with_context(|| format!("loading model table from {}", path.display()))?,
        ),
        None => {
            info!(vocab_size = vocab.size(), "no model given, sampling uniformly");
            Box::new(MarkovModel::uniform(ModelArgs { vocab_size: vocab.size() }))
        }
    };

    let config = GenerationConfig {
        steps: args.steps,
        temperature: args.temperature,
        max_len: args.max_len,
        rng_seed: args.rng_seed,
    };
    let verse = Sampler::new(config).run(&model, &vocab, &args.seed)?;
    if verse.stopped_early() {
        warn!(reason = ?verse.stop_reason(), words = verse.tokens().len(), "generation stopped early");
    }

    if let Some(out) = &args.card {
        write_card(verse.as_str(), out, &args.card_options)?;
    }
    Ok(verse.into_string())
}

pub fn run_card(args: &CardArgs) -> Result<()> {
    write_card(&args.text, &args.out, &args.card_options)
}

fn load_spec(options: &CardOptions) -> Result<CardSpec> {
    let mut spec = match &options.card_config {
        Some(path) => CardSpec::load_json(path)
            .with_context(|| format!("loading card config from {}", path.display()))?,
        None => CardSpec::default(),
    };
    spec.verse_fonts = prepend(&options.fonts, &spec.verse_fonts);
    spec.attribution_fonts = prepend(&options.fonts, &spec.attribution_fonts);
    Ok(spec)
}

fn prepend(first: &[PathBuf], rest: &[PathBuf]) -> Vec<PathBuf> {
    first.iter().chain(rest).cloned().collect()
}

fn write_card(text: &str, out: &Path, options: &CardOptions) -> Result<()> {
    let spec = load_spec(options)?;
    let img = CardRenderer::new(spec).render(text, &options.attribution);
    let bytes = encode_png(&img)?;
    fs::write(out, bytes).with_context(|| format!("writing card to {}", out.display()))?;
    info!(path = %out.display(), "card written");
    Ok(())
}
