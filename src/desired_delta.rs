// The MIT License (MIT)
//
// Copyright (c) 2016 AT&T
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! The single shared `(count, stamp)` register demand flows through.
//! Positive count means warmer tasks are wanted, negative means cooler,
//! zero means nothing to do. Writers never accumulate into this cell --
//! the latest stamp always wins. Deliberately not a channel: the demand
//! this cell carries is "what do we want right now", not a queue of
//! requests that all need delivering.

use std::sync::Mutex;
use std::time::Instant;

pub struct DesiredDelta {
    cell: Mutex<(i64, Instant)>,
}

impl DesiredDelta {
    pub fn new() -> Self {
        DesiredDelta { cell: Mutex::new((0, Instant::now())) }
    }

    pub fn read(&self) -> (i64, Instant) {
        *self.cell.lock().unwrap()
    }

    /// Runs `f` against the cell under its lock, atomically. Used both by
    /// the controller-write adapter (which conditionally overwrites) and by
    /// the Scheduler Agent's resourceOffers handler (which unconditionally
    /// computes and writes a residual in the same critical section it read
    /// the original value from).
    pub fn with_lock<F, R>(&self, f: F) -> R
        where F: FnOnce(&mut (i64, Instant)) -> R
    {
        let mut guard = self.cell.lock().unwrap();
        f(&mut *guard)
    }

    /// The controller-write adapter: writes `n` iff the clock has moved
    /// forward since the last recorded stamp. Both the warmer and cooler
    /// callbacks handed to the external Controller Loop call this same
    /// method -- direction is carried entirely in the sign of `n`.
    pub fn write_latest(&self, n: i64) {
        self.with_lock(|cell| {
            let now = Instant::now();
            if now > cell.1 {
                cell.0 = n;
                cell.1 = now;
            }
        });
    }
}

/// Computes the residual left in `DesiredDelta` after an offer batch of
/// total capacity `usable_capacity` is applied against a demand of
/// `signed_count`. Retains the sign of the pre-offer count; magnitude is
/// what remains unfulfilled, down to zero. Pulled out of `with_lock` calls
/// so it can be unit tested without a mutex in the loop.
pub fn residual(signed_count: i64, usable_capacity: i64) -> i64 {
    let n = signed_count.abs();
    let fulfilled = usable_capacity.min(n);
    let left = n - fulfilled;
    if signed_count < 0 { -left } else { left }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fresh_cell_starts_at_zero() {
        let dd = DesiredDelta::new();
        assert_eq!(dd.read().0, 0);
    }

    #[test]
    fn write_latest_is_visible_to_read() {
        let dd = DesiredDelta::new();
        dd.write_latest(5);
        assert_eq!(dd.read().0, 5);
    }

    #[test]
    fn stamp_never_decreases_across_writes() {
        let dd = DesiredDelta::new();
        let (_, s0) = dd.read();
        dd.write_latest(3);
        let (_, s1) = dd.read();
        assert!(s1 >= s0);
        thread::sleep(Duration::from_millis(1));
        dd.write_latest(-3);
        let (_, s2) = dd.read();
        assert!(s2 >= s1);
    }

    #[test]
    fn full_fill_leaves_zero_residual() {
        // scenario 1: simple warm, N=3, A=4
        assert_eq!(residual(3, 4), 0);
    }

    #[test]
    fn partial_fill_retains_sign_and_remainder() {
        // scenario 2: N=5, A=2 -> residual 3
        assert_eq!(residual(5, 2), 3);
    }

    #[test]
    fn superseded_demand_uses_latest_sign() {
        // scenario 3: controller writes 10 then -4 before any offer; A=3
        assert_eq!(residual(-4, 3), -1);
    }

    #[test]
    fn zero_demand_has_no_residual() {
        assert_eq!(residual(0, 10), 0);
    }

    #[test]
    fn residual_sign_matches_input_sign_or_is_zero() {
        for &(n, a) in &[(7, 2), (-7, 2), (1, 100), (-1, 100), (0, 5)] {
            let r = residual(n, a);
            assert!(r == 0 || r.signum() == n.signum());
        }
    }
}
