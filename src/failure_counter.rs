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

/// A floor-clamped running count of (failures - successes - starting)
/// tasks. `max_failures == -1` disables tripping entirely.
#[derive(Debug)]
pub struct FailureCounter {
    count: u32,
    max_failures: i32,
}

/// What a status update means for the counter: it either nudges it up or
/// down, or is irrelevant (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Increment,
    Decrement,
    None,
}

impl FailureCounter {
    pub fn new(max_failures: i32) -> Self {
        FailureCounter { count: 0, max_failures: max_failures }
    }

    /// Applies `effect` and reports whether the counter has now reached the
    /// configured threshold. Never trips when `max_failures == -1`.
    pub fn apply(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::Increment => self.count += 1,
            Effect::Decrement => self.count = self.count.saturating_sub(1),
            Effect::None => {}
        }
        self.max_failures >= 0 && self.count >= self.max_failures as u32
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_starts_at_zero() {
        assert_eq!(FailureCounter::new(3).count(), 0);
    }

    #[test]
    fn never_goes_negative() {
        let mut fc = FailureCounter::new(3);
        assert!(!fc.apply(Effect::Decrement));
        assert_eq!(fc.count(), 0);
    }

    #[test]
    fn trips_exactly_at_threshold() {
        let mut fc = FailureCounter::new(3);
        assert!(!fc.apply(Effect::Increment));
        assert!(!fc.apply(Effect::Increment));
        assert!(fc.apply(Effect::Increment));
        assert_eq!(fc.count(), 3);
    }

    #[test]
    fn decrements_offset_increments() {
        let mut fc = FailureCounter::new(3);
        fc.apply(Effect::Increment);
        fc.apply(Effect::Increment);
        fc.apply(Effect::Decrement);
        assert_eq!(fc.count(), 1);
    }

    #[test]
    fn disabled_threshold_never_trips() {
        let mut fc = FailureCounter::new(-1);
        for _ in 0..1000 {
            assert!(!fc.apply(Effect::Increment));
        }
    }
}
