use crate::error::{DiwanError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Anything that can produce a next-token distribution.
///
/// `context` always has the fixed window length chosen by the caller and is
/// left-padded with id 0. The returned vector is indexed by token id and
/// should have one entry per id in the vocabulary, padding slot included.
pub trait Predictor {
    fn predict(&self, context: &[usize]) -> Result<Vec<f32>>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, context: &[usize]) -> Result<Vec<f32>> {
        (**self).predict(context)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, context: &[usize]) -> Result<Vec<f32>> {
        (**self).predict(context)
    }
}

/// Shape of a model.
#[derive(Clone, Debug)]
pub struct ModelArgs {
    /// Number of token ids, padding slot included.
    pub vocab_size: usize,
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self { vocab_size: 1024 }
    }
}

impl ModelArgs {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Deserialize)]
struct TableFile {
    rows: Vec<Vec<f32>>,
}

/// First-order transition table over token ids.
///
/// Row `i` holds the next-token distribution after token `i`. Row 0 doubles
/// as the start distribution used when the context is entirely padding.
#[derive(Clone, Debug)]
pub struct MarkovModel {
    pub args: ModelArgs,
    table: Array2<f32>, // vocab_size x vocab_size
}

impl MarkovModel {
    /// Every word equally likely after every token. The padding id gets no
    /// mass unless it is the only id.
    pub fn uniform(args: ModelArgs) -> Self {
        let n = args.vocab_size.max(1);
        let mut table = Array2::<f32>::zeros((n, n));
        for mut row in table.axis_iter_mut(Axis(0)) {
            fill_uniform(row.as_slice_mut());
        }
        Self { args: ModelArgs { vocab_size: n }, table }
    }

    /// Build from raw row weights. Rows are normalized; an all-zero row
    /// becomes uniform over the non-padding ids.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(DiwanError::Model("table has no rows".into()));
        }
        let mut table = Array2::<f32>::zeros((n, n));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(DiwanError::Model(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if let Some(bad) = row.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(DiwanError::Model(format!("row {} has invalid weight {}", i, bad)));
            }
            table.row_mut(i).assign(&Array1::from(row.clone()));
        }

        let sums = table.sum_axis(Axis(1));
        for (mut row, &sum) in table.axis_iter_mut(Axis(0)).zip(sums.iter()) {
            if sum > 0.0 {
                row.mapv_inplace(|w| w / sum);
            } else {
                fill_uniform(row.as_slice_mut());
            }
        }

        let args = ModelArgs { vocab_size: n };
        Ok(Self { args, table })
    }

    /// Load `{"rows": [[...], ...]}` from disk.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let file: TableFile = serde_json::from_str(&raw)?;
        Self::from_rows(file.rows)
    }

    pub fn vocab_size(&self) -> usize {
        self.table.nrows()
    }
}

fn fill_uniform(row: Option<&mut [f32]>) {
    let Some(row) = row else { return };
    match row.len() {
        0 => {}
        1 => row[0] = 1.0,
        n => {
            row[0] = 0.0;
            row[1..].fill(1.0 / (n - 1) as f32);
        }
    }
}

impl Predictor for MarkovModel {
    fn predict(&self, context: &[usize]) -> Result<Vec<f32>> {
        let last = context.iter().rev().copied().find(|&id| id != 0).unwrap_or(0);
        if last >= self.table.nrows() {
            return Err(DiwanError::Prediction(format!(
                "token id {} is outside a table of {} ids",
                last,
                self.table.nrows()
            )));
        }
        Ok(self.table.row(last).to_vec())
    }
}
