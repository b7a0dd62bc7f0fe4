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

//! What the Scheduler Agent needs from a cluster-manager driver, reduced to
//! the four calls it actually makes. `mesos_adapter::ClientDriver` wraps a
//! real `mesos::SchedulerClient`; `driver::fake::FakeDriver` stands in for
//! it in tests.

use errors::Result;
use task_builder::TaskDescriptor;

pub trait Driver: Send + Sync {
    fn launch_tasks(&self, offer_id: &str, tasks: Vec<TaskDescriptor>) -> Result<()>;
    fn decline_offer(&self, offer_id: &str) -> Result<()>;
    fn revive_offers(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
}

/// In-memory `Driver` for tests. Public (not `#[cfg(test)]`) so both unit
/// tests and the `tests/` integration suite can use it without a Cargo
/// feature flag.
pub mod fake {
    use std::sync::Mutex;

    use errors::Result;
    use task_builder::TaskDescriptor;
    use super::Driver;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Launch { offer_id: String, task_ids: Vec<String> },
        Decline { offer_id: String },
        Revive,
        Stop,
    }

    /// Records every call made to it, in order, so tests can assert on the
    /// decline/launch pattern a `resourceOffers` batch produced without
    /// standing up a real master.
    #[derive(Default)]
    pub struct FakeDriver {
        calls: Mutex<Vec<Call>>,
    }

    impl FakeDriver {
        pub fn new() -> Self {
            FakeDriver { calls: Mutex::new(Vec::new()) }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Driver for FakeDriver {
        fn launch_tasks(&self, offer_id: &str, tasks: Vec<TaskDescriptor>) -> Result<()> {
            let ids = tasks.iter().map(|t| t.task_id.clone()).collect();
            self.calls.lock().unwrap().push(Call::Launch {
                offer_id: offer_id.to_string(),
                task_ids: ids,
            });
            Ok(())
        }

        fn decline_offer(&self, offer_id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Decline { offer_id: offer_id.to_string() });
            Ok(())
        }

        fn revive_offers(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Revive);
            Ok(())
        }

        fn stop(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Stop);
            Ok(())
        }
    }
}
