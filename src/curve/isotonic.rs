//! Weighted pool-adjacent-violators for a non-increasing fit

/// Result of an isotonic fit
#[derive(Debug, Clone, PartialEq)]
pub struct IsotonicFit {
    /// Fitted value per input, non-increasing
    pub values: Vec<f64>,
    /// Largest absolute change applied to any input
    pub max_correction: f64,
    /// Number of block merges performed
    pub merges: usize,
}

struct Block {
    value: f64,
    weight: f64,
    len: usize,
}

/// Fit a non-increasing sequence to `values` (ordered by increasing line)
///
/// Zero total weight in a pooled block falls back to an unweighted mean.
pub fn fit_non_increasing(values: &[f64], weights: &[f64]) -> IsotonicFit {
    debug_assert_eq!(values.len(), weights.len());

    let mut blocks: Vec<Block> = Vec::with_capacity(values.len());
    let mut merges = 0;

    for (&value, &weight) in values.iter().zip(weights) {
        blocks.push(Block {
            value,
            weight,
            len: 1,
        });
        while blocks.len() >= 2 {
            let last = blocks.len() - 1;
            if blocks[last - 1].value >= blocks[last].value {
                break;
            }
            let (Some(right), Some(left)) = (blocks.pop(), blocks.pop()) else {
                break;
            };
            blocks.push(pool(left, right));
            merges += 1;
        }
    }

    let mut fitted = Vec::with_capacity(values.len());
    for block in &blocks {
        fitted.extend(std::iter::repeat(block.value).take(block.len));
    }
    let max_correction = values
        .iter()
        .zip(&fitted)
        .map(|(raw, fit)| (raw - fit).abs())
        .fold(0.0, f64::max);

    IsotonicFit {
        values: fitted,
        max_correction,
        merges,
    }
}

fn pool(left: Block, right: Block) -> Block {
    let weight = left.weight + right.weight;
    let value = if weight > 0.0 {
        (left.value * left.weight + right.value * right.weight) / weight
    } else {
        (left.value * left.len as f64 + right.value * right.len as f64)
            / (left.len + right.len) as f64
    };
    Block {
        value,
        weight,
        len: left.len + right.len,
    }
}
