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

//! The hot path: turns offer batches into launched or declined offers,
//! reading and updating `DesiredDelta` exactly once per batch, and trips
//! the failure counter on bad status updates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use callbacks::{FrameworkCallbacks, TaskStatus};
use config::TaskTemplate;
use desired_delta::{self, DesiredDelta};
use driver::Driver;
use errors::Result;
use failure_counter::{Effect, FailureCounter};
use offer::Offer;
use offer_matcher;
use task_builder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Warmer,
    Cooler,
}

/// Implements `FrameworkCallbacks` against a `Driver`, a shared
/// `DesiredDelta`, and a `TaskTemplate`. One instance per framework run;
/// `mesos_adapter` owns the real driver handle and forwards every
/// `mesos::Scheduler` callback into this.
pub struct SchedulerAgent<D: Driver> {
    driver: D,
    desired_delta: Arc<DesiredDelta>,
    template: TaskTemplate,
    max_failures: i32,
    failures: Mutex<FailureCounter>,
    ready_tx: Sender<String>,
    task_seq: AtomicUsize,
}

impl<D: Driver> SchedulerAgent<D> {
    pub fn new(
        driver: D,
        desired_delta: Arc<DesiredDelta>,
        template: TaskTemplate,
        max_failures: i32,
        ready_tx: Sender<String>,
    ) -> Self {
        SchedulerAgent {
            driver: driver,
            desired_delta: desired_delta,
            template: template,
            max_failures: max_failures,
            failures: Mutex::new(FailureCounter::new(max_failures)),
            ready_tx: ready_tx,
            task_seq: AtomicUsize::new(0),
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.failures.lock().unwrap().count()
    }

    /// Exposes the underlying driver so callers (mainly tests) can inspect
    /// what was launched/declined/revived/stopped without the agent having
    /// to mirror that bookkeeping itself.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: Driver> FrameworkCallbacks for SchedulerAgent<D> {
    fn registered(&self, framework_id: &str) -> Result<()> {
        info!("registered with master, framework_id={}", framework_id);
        // Best-effort: if the Coordinator already gave up waiting and
        // dropped its receiver, there is nothing left to signal. The
        // Coordinator needs the id itself (not just a readiness pulse) so
        // it can persist it under `relay_mesos.framework.<name>`.
        let _ = self.ready_tx.send(framework_id.to_string());
        Ok(())
    }

    fn resource_offers(&self, offers: &[Offer]) -> Result<()> {
        debug!("got {} resource offers", offers.len());
        let (usable, declinable) = offer_matcher::partition(offers, &self.template.resources)?;

        for offer in &declinable {
            self.driver.decline_offer(&offer.offer_id)?;
        }

        if usable.is_empty() {
            debug!("none of the offers had enough relevant resources");
            return Ok(());
        }

        let total_capacity: i64 = usable.iter().map(|&(_, c)| c).sum();
        debug!(
            "{} usable offers, total capacity {}",
            usable.len(),
            total_capacity
        );

        let (command, n_to_launch) = self.desired_delta.with_lock(|cell| {
            let (signed_count, _) = *cell;
            let command = if signed_count > 0 && self.template.warmer.is_some() {
                Some(Command::Warmer)
            } else if signed_count < 0 && self.template.cooler.is_some() {
                Some(Command::Cooler)
            } else {
                None
            };
            let n = signed_count.abs().min(total_capacity);
            let new_residual = desired_delta::residual(signed_count, total_capacity);
            *cell = (new_residual, Instant::now());
            (command, n)
        });

        let command = match command {
            Some(c) => c,
            None => {
                for &(offer, _) in &usable {
                    self.driver.decline_offer(&offer.offer_id)?;
                }
                return Ok(());
            }
        };
        let command_str: &str = match command {
            Command::Warmer => self.template.warmer.as_ref().unwrap(),
            Command::Cooler => self.template.cooler.as_ref().unwrap(),
        };

        let mut remaining = n_to_launch;
        for &(offer, capacity) in &usable {
            if remaining <= 0 {
                self.driver.decline_offer(&offer.offer_id)?;
                continue;
            }
            let take = capacity.min(remaining);
            let mut tasks = Vec::with_capacity(take as usize);
            for _ in 0..take {
                let seq = self.task_seq.fetch_add(1, Ordering::Relaxed) as u64;
                tasks.push(task_builder::build(seq, offer, command_str, &self.template));
            }
            debug!("launching {} tasks on offer {}", take, offer.offer_id);
            self.driver.launch_tasks(&offer.offer_id, tasks)?;
            remaining -= take;
        }

        self.driver.revive_offers()?;
        Ok(())
    }

    fn status_update(&self, task_id: &str, status: TaskStatus) -> Result<()> {
        debug!("task status update: {} -> {:?}", task_id, status);
        if self.max_failures == -1 {
            return Ok(());
        }
        let effect = match status {
            TaskStatus::Failed | TaskStatus::Lost => Effect::Increment,
            TaskStatus::Finished | TaskStatus::Starting => Effect::Decrement,
            _ => Effect::None,
        };
        let tripped = self.failures.lock().unwrap().apply(effect);
        if tripped {
            let count = self.failure_count();
            error!("max allowable number of failures reached: {}", count);
            self.driver.stop()?;
            return Err(::errors::ErrorKind::MaxFailuresReached(count).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver::fake::FakeDriver;
    use resource::{OfferedResource, OfferedValue, ResourceRequirement};
    use std::sync::mpsc;

    fn template(warmer: Option<&str>, cooler: Option<&str>) -> TaskTemplate {
        TaskTemplate {
            framework_name: "fw".to_string(),
            warmer: warmer.map(|s| s.to_string()),
            cooler: cooler.map(|s| s.to_string()),
            resources: ResourceRequirement::new().with_scalar("cpus", 1.0).with_scalar("mem", 128.0),
            uris: vec![],
            env: vec![],
            container: None,
        }
    }

    fn offer_with(id: &str, cpus: f64, mem: f64) -> Offer {
        Offer {
            offer_id: id.to_string(),
            slave_id: format!("slave-{}", id),
            hostname: format!("{}.example.com", id),
            resources: vec![
                OfferedResource { name: "cpus".to_string(), value: OfferedValue::Scalar(cpus) },
                OfferedResource { name: "mem".to_string(), value: OfferedValue::Scalar(mem) },
            ],
        }
    }

    fn agent(max_failures: i32) -> (SchedulerAgent<FakeDriver>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        let agent = SchedulerAgent::new(
            FakeDriver::new(),
            Arc::new(DesiredDelta::new()),
            template(Some("echo W"), Some("echo C")),
            max_failures,
            tx,
        );
        (agent, rx)
    }

    #[test]
    fn registered_signals_readiness() {
        let (agent, rx) = agent(-1);
        agent.registered("fw-123").unwrap();
        rx.recv_timeout(::std::time::Duration::from_millis(100)).unwrap();
    }

    #[test]
    fn simple_warm_scenario_launches_exactly_the_requested_count() {
        let (agent, _rx) = agent(-1);
        agent.desired_delta.write_latest(3);
        agent.resource_offers(&[offer_with("o1", 4.0, 512.0)]).unwrap();

        let calls = agent.driver.calls();
        assert_eq!(calls.len(), 2); // one launch, then a revive
        match &calls[0] {
            ::driver::fake::Call::Launch { offer_id, task_ids } => {
                assert_eq!(offer_id, "o1");
                assert_eq!(task_ids.len(), 3);
            }
            other => panic!("expected a launch call, got {:?}", other),
        }
        assert_eq!(calls[1], ::driver::fake::Call::Revive);
        assert_eq!(agent.desired_delta.read().0, 0);
    }

    #[test]
    fn partial_fill_leaves_a_same_signed_residual() {
        let (agent, _rx) = agent(-1);
        agent.desired_delta.write_latest(5);
        agent.resource_offers(&[offer_with("o1", 2.0, 256.0)]).unwrap();
        assert_eq!(agent.desired_delta.read().0, 3);
    }

    #[test]
    fn superseded_demand_uses_the_latest_sign() {
        let (agent, _rx) = agent(-1);
        agent.desired_delta.write_latest(10);
        agent.desired_delta.write_latest(-4);
        agent.resource_offers(&[offer_with("o1", 3.0, 384.0)]).unwrap();

        let calls = agent.driver.calls();
        match &calls[0] {
            ::driver::fake::Call::Launch { task_ids, .. } => assert_eq!(task_ids.len(), 3),
            other => panic!("expected a launch call, got {:?}", other),
        }
        assert_eq!(agent.desired_delta.read().0, -1);
    }

    #[test]
    fn all_offers_unusable_declines_everything_and_launches_nothing() {
        let (agent, _rx) = agent(-1);
        agent.desired_delta.write_latest(5);
        agent.resource_offers(&[offer_with("o1", 0.1, 8.0)]).unwrap();

        let calls = agent.driver.calls();
        assert_eq!(calls, vec![::driver::fake::Call::Decline { offer_id: "o1".to_string() }]);
        assert_eq!(agent.desired_delta.read().0, 5);
    }

    #[test]
    fn no_demand_declines_usable_offers_too() {
        let (agent, _rx) = agent(-1);
        agent.resource_offers(&[offer_with("o1", 4.0, 512.0)]).unwrap();
        let calls = agent.driver.calls();
        assert_eq!(calls, vec![::driver::fake::Call::Decline { offer_id: "o1".to_string() }]);
    }

    #[test]
    fn max_failures_trips_on_the_configured_threshold() {
        let (agent, _rx) = agent(3);
        assert!(agent.status_update("t1", TaskStatus::Failed).is_ok());
        assert!(agent.status_update("t2", TaskStatus::Failed).is_ok());
        let result = agent.status_update("t3", TaskStatus::Failed);
        assert!(result.is_err());
        assert_eq!(agent.driver.calls(), vec![::driver::fake::Call::Stop]);
    }

    #[test]
    fn disabled_max_failures_never_trips() {
        let (agent, _rx) = agent(-1);
        for i in 0..50 {
            assert!(agent.status_update(&format!("t{}", i), TaskStatus::Failed).is_ok());
        }
        assert!(agent.driver.calls().is_empty());
    }

    #[test]
    fn finished_and_starting_decrement_the_counter() {
        let (agent, _rx) = agent(2);
        agent.status_update("t1", TaskStatus::Failed).unwrap();
        agent.status_update("t1", TaskStatus::Finished).unwrap();
        agent.status_update("t2", TaskStatus::Failed).unwrap();
        assert_eq!(agent.failure_count(), 1);
        assert!(agent.driver.calls().is_empty());
    }
}
