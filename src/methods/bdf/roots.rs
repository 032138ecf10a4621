//! Zero-crossing detection for host root functions.

use crate::Float;

/// Root function bookkeeping between integration requests.
#[derive(Clone, Debug, Default)]
pub(crate) struct Roots {
    /// Left end of the interval not yet searched.
    pub t_lo: Float,
    /// Root function values at `t_lo`. Empty when root finding is disabled.
    pub g_lo: Vec<Float>,
    g_hi: Vec<Float>,
    g_mid: Vec<Float>,
    /// `g_lo` holds values for the current history.
    pub primed: bool,
    info: Vec<i32>,
}

impl Roots {
    pub fn new(count: usize) -> Self {
        Self {
            t_lo: 0.0,
            g_lo: vec![0.0; count],
            g_hi: vec![0.0; count],
            g_mid: vec![0.0; count],
            primed: false,
            info: vec![0; count],
        }
    }

    pub fn count(&self) -> usize {
        self.g_lo.len()
    }

    /// Direction of each crossing reported by the last root return.
    pub fn info(&self) -> &[i32] {
        &self.info
    }

    pub fn clear_info(&mut self) {
        self.info.fill(0);
    }

    /// Evaluate the root functions at `t` through `eval` and make `t` the start
    /// of the next search.
    pub fn prime<G>(&mut self, t: Float, mut eval: G)
    where
        G: FnMut(Float, &mut [Float]),
    {
        eval(t, &mut self.g_lo);
        self.t_lo = t;
        self.primed = true;
    }

    /// Search `(t_lo, t_hi]` for a zero crossing, where `eval(t, g)` fills `g` with
    /// the root functions at `t`.
    ///
    /// On a crossing, bisects to an interval shorter than `ttol` and returns its
    /// right end, which becomes the start of the next search. Without a crossing
    /// the whole interval counts as searched.
    pub fn find<G>(&mut self, t_hi: Float, ttol: Float, mut eval: G) -> Option<Float>
    where
        G: FnMut(Float, &mut [Float]),
    {
        if self.count() == 0 || t_hi <= self.t_lo {
            return None;
        }
        eval(t_hi, &mut self.g_hi);
        if !any_crossing(&self.g_lo, &self.g_hi) {
            self.t_lo = t_hi;
            std::mem::swap(&mut self.g_lo, &mut self.g_hi);
            return None;
        }

        let (mut lo, mut hi) = (self.t_lo, t_hi);
        while hi - lo > ttol {
            let mid = lo + 0.5 * (hi - lo);
            if mid <= lo || mid >= hi {
                break;
            }
            eval(mid, &mut self.g_mid);
            if any_crossing(&self.g_lo, &self.g_mid) {
                hi = mid;
                std::mem::swap(&mut self.g_hi, &mut self.g_mid);
            } else {
                lo = mid;
                std::mem::swap(&mut self.g_lo, &mut self.g_mid);
            }
        }

        for ((info, lo), hi) in self.info.iter_mut().zip(&self.g_lo).zip(&self.g_hi) {
            *info = if crosses(*lo, *hi) {
                if hi > lo { 1 } else { -1 }
            } else {
                0
            };
        }
        self.t_lo = hi;
        std::mem::swap(&mut self.g_lo, &mut self.g_hi);
        Some(hi)
    }
}

/// A sign change from `lo` to `hi`. A function that starts at exactly zero has
/// not crossed yet.
fn crosses(lo: Float, hi: Float) -> bool {
    (lo < 0.0 && hi >= 0.0) || (lo > 0.0 && hi <= 0.0)
}

fn any_crossing(lo: &[Float], hi: &[Float]) -> bool {
    lo.iter().zip(hi).any(|(l, h)| crosses(*l, *h))
}
