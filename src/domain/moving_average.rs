//! Trailing simple moving average.
//!
//! O(n) sliding window over closing prices. Missing closes are skipped: the
//! mean at `i` is taken over the valid closes among the last `window` bars
//! ending at `i`. Before the window fills, whatever bars exist are used, so the
//! value at `i` never depends on data after `i`.
//!
//! The window sum is compensated (Neumaier) so adding and removing prices does
//! not accumulate rounding error, and a window whose valid closes are all equal
//! yields that close exactly. Two windows over a flat stretch therefore compare
//! equal and never register a crossover.

use super::price::valid_price;

/// Running sum with Neumaier error compensation.
#[derive(Debug, Clone, Copy, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

pub fn trailing_means(closes: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut window_sum = CompensatedSum::default();
    let mut window_count = 0usize;
    // latest valid close and the index where its run of equal closes began;
    // gaps do not break a run
    let mut run: Option<(f64, usize)> = None;

    for (i, close) in closes.iter().enumerate() {
        if let Some(price) = valid_price(*close) {
            window_sum.add(price);
            window_count += 1;
            run = match run {
                Some((value, start)) if value == price => Some((value, start)),
                _ => Some((price, i)),
            };
        }
        if i >= window {
            if let Some(old) = valid_price(closes[i - window]) {
                window_sum.add(-old);
                window_count -= 1;
            }
        }

        let window_start = (i + 1).saturating_sub(window);
        if window_count == 0 {
            window_sum = CompensatedSum::default();
            values.push(None);
        } else if let Some((value, _)) = run.filter(|&(_, start)| start <= window_start) {
            values.push(Some(value));
        } else {
            values.push(Some(window_sum.value() / window_count as f64));
        }
    }

    values
}
