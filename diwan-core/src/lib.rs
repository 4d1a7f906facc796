//! Library crate exposing the verse sampler and card renderer used by the
//! `diwan` binary.
//!
//! Both halves are independent: [`sampler`] extends a seed string token by
//! token from any [`model::Predictor`], and [`card`] rasterizes a string onto
//! a framed square card.

pub mod card;
pub mod error;
pub mod model;
pub mod sampler;
pub mod vocab;

pub use card::{encode_png, render, CardRenderer, CardSpec};
pub use error::{DiwanError, Result};
pub use model::{MarkovModel, ModelArgs, Predictor};
pub use sampler::{generate, GeneratedText, GenerationConfig, Sampler, StopReason};
pub use vocab::{OovPolicy, Vocabulary};
