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

//! The periodic control-loop side of the actuator. The control algorithm
//! itself (PID, sampling, history) is an external collaborator; this module
//! only defines the interface it is driven through and the adapter that
//! turns its warmer/cooler calls into `DesiredDelta` writes.

use std::sync::Arc;
use std::time::Duration;

use desired_delta::DesiredDelta;
use errors::Result;

/// One tick's signed task counts, as produced by the external control
/// algorithm: positive asks for warmer tasks, negative for cooler tasks.
pub trait ControllerLoop: Send {
    /// Pulls one value from the metric source and one from the target
    /// source, computes the signed task count, and reports it through
    /// `sink`. Called once per tick by whatever drives this loop; never
    /// called concurrently with itself.
    fn tick(&mut self, sink: &ControllerWriteAdapter) -> Result<()>;

    /// Seconds between ticks; also caps the Coordinator's supervision
    /// poll interval.
    fn delay_secs(&self) -> f64;
}

/// What a `ControllerLoop` calls to report its output. Both warmer and
/// cooler flow through the same `write_latest` call -- direction is the
/// sign of `n`, not which method is invoked -- because they share one
/// cell and "latest stamp wins" only makes sense if there is exactly one
/// writer path.
pub struct ControllerWriteAdapter {
    desired_delta: Arc<DesiredDelta>,
}

impl ControllerWriteAdapter {
    pub fn new(desired_delta: Arc<DesiredDelta>) -> Self {
        ControllerWriteAdapter { desired_delta: desired_delta }
    }

    /// `n > 0` asks for warmer tasks, `n < 0` asks for cooler tasks,
    /// `n == 0` asks for nothing.
    pub fn write(&self, n: i64) {
        self.desired_delta.write_latest(n);
    }
}

pub fn tick_interval(delay_secs: f64) -> Duration {
    Duration::from_millis((delay_secs.max(0.0) * 1000.0) as u64)
}

/// A source of metric or target values. Modeled as a trait object instead
/// of a bare `Iterator` so it can be driven from behind an `Arc`/`Mutex`
/// on a supervised thread without fighting the borrow checker; a failure
/// to produce a value is the source's own responsibility to surface as an
/// error rather than silently stalling the loop.
pub trait ValueSource: Send {
    fn next_value(&mut self) -> Result<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use desired_delta::DesiredDelta;

    #[test]
    fn write_positive_is_a_warm_request() {
        let dd = Arc::new(DesiredDelta::new());
        let adapter = ControllerWriteAdapter::new(dd.clone());
        adapter.write(4);
        assert_eq!(dd.read().0, 4);
    }

    #[test]
    fn write_negative_is_a_cool_request() {
        let dd = Arc::new(DesiredDelta::new());
        let adapter = ControllerWriteAdapter::new(dd.clone());
        adapter.write(-2);
        assert_eq!(dd.read().0, -2);
    }

    #[test]
    fn tick_interval_never_negative() {
        assert_eq!(tick_interval(-5.0), Duration::from_millis(0));
    }

    #[test]
    fn tick_interval_converts_fractional_seconds() {
        assert_eq!(tick_interval(1.5), Duration::from_millis(1500));
    }
}
