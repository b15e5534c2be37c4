//! Fixed-memory uniform sample of a stream (Algorithm R)

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Reservoir {
    capacity: usize,
    seen: u64,
    items: Vec<f64>,
}

impl Reservoir {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            seen: 0,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Offer one value; kept with probability capacity / seen
    pub fn offer<R: Rng + ?Sized>(&mut self, value: f64, rng: &mut R) {
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(value);
            return;
        }
        let slot = rng.gen_range(0..self.seen);
        if slot < self.capacity as u64 {
            self.items[slot as usize] = value;
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn into_sorted(mut self) -> Vec<f64> {
        self.items.sort_by(f64::total_cmp);
        self.items
    }
}

/// Percentile of sorted values with linear interpolation, `q` in [0, 1]
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let t = pos - lo as f64;
            sorted[lo] + t * (sorted[hi] - sorted[lo])
        }
    }
}
