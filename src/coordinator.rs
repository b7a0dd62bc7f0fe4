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

//! Top-level lifecycle: spawns the Scheduler Agent and the Controller Loop
//! as named, supervised threads, owns the shared `DesiredDelta` cell,
//! watches for worker death or propagated errors, and persists framework
//! identity across restarts. Named threads mirror the one-thread-per-
//! subsystem convention the rest of this codebase uses for its workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use config::Config;
use controller::ControllerWriteAdapter;
use desired_delta::DesiredDelta;
use errors::{Error, ErrorKind, Result, ResultExt};
use framework_identity;
use kv_store::KvStore;

/// Handed to the closure that runs the Scheduler Agent worker: the shared
/// demand cell to read from, a sender carrying the framework id back to
/// the Coordinator once `registered` fires (readiness and the id to
/// persist travel together -- there's nothing else worth signaling
/// readiness with), and a sender any uncaught error must be forwarded
/// through.
pub struct SchedulerWorkerArgs {
    pub desired_delta: Arc<DesiredDelta>,
    pub ready: Sender<String>,
    pub errors: Sender<Error>,
}

/// Handed to the closure that runs the Controller Loop worker: a
/// write-only view onto the shared demand cell, a ready signal, and the
/// same error-forwarding sender as the scheduler side.
pub struct ControllerWorkerArgs {
    pub sink: ControllerWriteAdapter,
    pub ready: Sender<()>,
    pub errors: Sender<Error>,
}

pub struct Coordinator {
    config: Config,
    desired_delta: Arc<DesiredDelta>,
    shutdown_requested: Arc<AtomicBool>,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        Coordinator {
            config: config,
            desired_delta: Arc::new(DesiredDelta::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn desired_delta(&self) -> Arc<DesiredDelta> {
        self.desired_delta.clone()
    }

    /// Installs a `SIGTERM`/`SIGINT` handler that flips the shutdown flag
    /// this Coordinator's supervision loop polls. Best-effort: if a handler
    /// is already installed in this process, the error is logged and
    /// startup continues, since signal-based shutdown is a convenience on
    /// top of the exception-channel path, not the only way to stop.
    pub fn install_signal_handler(&self) {
        let flag = self.shutdown_requested.clone();
        if let Err(e) = ::ctrlc::set_handler(move || {
            warn!("received shutdown signal");
            flag.store(true, Ordering::SeqCst);
        }) {
            warn!("could not install signal handler: {}", e);
        }
    }

    /// Runs the full lifecycle: validates config, starts both workers named
    /// `"scheduler-agent"` and `"controller-loop"`, waits on each ready
    /// signal bounded by `init_timeout_secs`, persists the framework id
    /// the scheduler agent registered with, then supervises until either
    /// worker reports an error, the driver stops cleanly, or a signal
    /// arrives -- deleting the persisted id again once supervision ends
    /// cleanly.
    ///
    /// `run_scheduler`/`run_controller` each take ownership of their
    /// `*WorkerArgs` and block for the lifetime of the worker; in
    /// production they wrap a real `mesos_adapter` driver loop, in tests
    /// a `FakeDriver`-backed stand-in.
    pub fn run<KV, SF, CF, RF>(
        &self,
        kv: &KV,
        run_scheduler: SF,
        run_controller: CF,
        revive_offers: RF,
    ) -> Result<()>
    where
        KV: KvStore,
        SF: FnOnce(SchedulerWorkerArgs) + Send + 'static,
        CF: FnOnce(ControllerWorkerArgs) + Send + 'static,
        RF: Fn() -> Result<()>,
    {
        self.config.validate()?;

        let existing_id = framework_identity::load(kv, &self.config.mesos_framework_name)?;
        if let Some(ref id) = existing_id {
            info!("recovered persisted framework id {}", id);
        }

        let (error_tx, error_rx) = mpsc::channel::<Error>();
        let (scheduler_ready_tx, scheduler_ready_rx) = mpsc::channel::<String>();
        let (controller_ready_tx, controller_ready_rx) = mpsc::channel::<()>();

        let scheduler_args = SchedulerWorkerArgs {
            desired_delta: self.desired_delta.clone(),
            ready: scheduler_ready_tx,
            errors: error_tx.clone(),
        };
        let scheduler_handle = thread::Builder::new()
            .name("scheduler-agent".to_string())
            .spawn(move || run_scheduler(scheduler_args))
            .chain_err(|| "failed to spawn scheduler-agent thread")?;

        let init_timeout = Duration::from_millis((self.config.init_timeout_secs.max(0.0) * 1000.0) as u64);
        let framework_id = match scheduler_ready_rx.recv_timeout(init_timeout) {
            Ok(id) => id,
            Err(_) => {
                error!("scheduler agent did not register within {}s", self.config.init_timeout_secs);
                framework_identity::forget(kv, &self.config.mesos_framework_name)?;
                return Err(ErrorKind::RegistrationTimeout(self.config.init_timeout_secs).into());
            }
        };
        // Created on first registration, rewritten on subsequent (recovered)
        // runs -- `persist` always just overwrites the one key, so "create
        // if new, overwrite if recovering" needs no branch here.
        framework_identity::persist(kv, &self.config.mesos_framework_name, &framework_id)?;
        info!("persisted framework id {}", framework_id);

        let controller_args = ControllerWorkerArgs {
            sink: ControllerWriteAdapter::new(self.desired_delta.clone()),
            ready: controller_ready_tx,
            errors: error_tx,
        };
        let controller_handle = thread::Builder::new()
            .name("controller-loop".to_string())
            .spawn(move || run_controller(controller_args))
            .chain_err(|| "failed to spawn controller-loop thread")?;

        if let Err(_) = controller_ready_rx.recv_timeout(init_timeout) {
            error!("controller loop did not start within {}s", self.config.init_timeout_secs);
            framework_identity::forget(kv, &self.config.mesos_framework_name)?;
            return Err(ErrorKind::RegistrationTimeout(self.config.init_timeout_secs).into());
        }

        let result = self.supervise(&error_rx, revive_offers);

        let _ = scheduler_handle.join();
        let _ = controller_handle.join();

        if result.is_ok() {
            framework_identity::forget(kv, &self.config.mesos_framework_name)?;
            info!("deleted persisted framework id on clean shutdown");
        }

        result
    }

    /// Polls at `min(5s, delay)`: exits on a forwarded worker error or a
    /// signal, and otherwise nudges the driver to revive offers whenever
    /// there is still unfulfilled demand sitting in `DesiredDelta`, so a
    /// quiet offer stream doesn't leave demand stranded until the next
    /// scheduled revive inside `resourceOffers`.
    fn supervise<RF>(&self, error_rx: &Receiver<Error>, revive_offers: RF) -> Result<()>
    where
        RF: Fn() -> Result<()>,
    {
        let interval = Duration::from_millis(
            (self.config.supervision_interval_secs().max(0.0) * 1000.0) as u64,
        );
        loop {
            if self.shutdown_requested.load(Ordering::SeqCst) {
                info!("shutting down on signal");
                return Ok(());
            }
            match error_rx.recv_timeout(interval) {
                Ok(e) => {
                    error!("a worker reported a fatal error: {}", e);
                    return Err(e);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.desired_delta.read().0 != 0 {
                        if let Err(e) = revive_offers() {
                            warn!("failed to revive offers from supervision loop: {}", e);
                        }
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("both workers have exited");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kv_store::InMemoryKvStore;
    use std::thread;
    use std::time::Duration;

    fn config() -> Config {
        let mut c = Config::default();
        c.mesos_master = "zk://localhost:2181/mesos".to_string();
        c.init_timeout_secs = 1.0;
        c.delay_secs = 0.05;
        c
    }

    #[test]
    fn registration_timeout_is_fatal_and_rolls_back_identity() {
        let kv = InMemoryKvStore::new();
        let coordinator = Coordinator::new(config());
        let result = coordinator.run(
            &kv,
            |_args: SchedulerWorkerArgs| {
                // never signals ready
                thread::sleep(Duration::from_secs(5));
            },
            |args: ControllerWorkerArgs| {
                let _ = args.ready.send(());
            },
            || Ok(()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn worker_error_is_forwarded_and_ends_the_run() {
        let kv = InMemoryKvStore::new();
        let coordinator = Coordinator::new(config());
        let result = coordinator.run(
            &kv,
            |args: SchedulerWorkerArgs| {
                let _ = args.ready.send("fw-test".to_string());
                let _ = args.errors.send(ErrorKind::MaxFailuresReached(3).into());
            },
            |args: ControllerWorkerArgs| {
                let _ = args.ready.send(());
            },
            || Ok(()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn clean_shutdown_when_both_workers_exit_without_error() {
        let kv = InMemoryKvStore::new();
        let coordinator = Coordinator::new(config());
        let result = coordinator.run(
            &kv,
            |args: SchedulerWorkerArgs| {
                let _ = args.ready.send("fw-test".to_string());
            },
            |args: ControllerWorkerArgs| {
                let _ = args.ready.send(());
            },
            || Ok(()),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn registration_persists_the_framework_id_and_clean_shutdown_deletes_it() {
        let kv = InMemoryKvStore::new();
        let coordinator = Coordinator::new(config());
        assert_eq!(framework_identity::load(&kv, &config().mesos_framework_name).unwrap(), None);

        let result = coordinator.run(
            &kv,
            |args: SchedulerWorkerArgs| {
                let _ = args.ready.send("fw-from-master".to_string());
            },
            |args: ControllerWorkerArgs| {
                let _ = args.ready.send(());
            },
            || Ok(()),
        );
        assert!(result.is_ok());
        assert_eq!(framework_identity::load(&kv, &config().mesos_framework_name).unwrap(), None);
    }

    #[test]
    fn persisted_id_survives_a_fatal_worker_error() {
        let kv = InMemoryKvStore::new();
        let coordinator = Coordinator::new(config());
        let result = coordinator.run(
            &kv,
            |args: SchedulerWorkerArgs| {
                let _ = args.ready.send("fw-from-master".to_string());
                let _ = args.errors.send(ErrorKind::MaxFailuresReached(3).into());
            },
            |args: ControllerWorkerArgs| {
                let _ = args.ready.send(());
            },
            || Ok(()),
        );
        assert!(result.is_err());
        assert_eq!(
            framework_identity::load(&kv, &config().mesos_framework_name).unwrap(),
            Some("fw-from-master".to_string())
        );
    }

    #[test]
    fn revive_is_invoked_while_demand_is_unfulfilled() {
        let kv = InMemoryKvStore::new();
        let mut cfg = config();
        cfg.delay_secs = 0.01;
        let coordinator = Coordinator::new(cfg);
        let dd = coordinator.desired_delta();
        dd.write_latest(5);
        let revive_calls = Arc::new(::std::sync::atomic::AtomicUsize::new(0));
        let revive_calls_clone = revive_calls.clone();
        let dd_for_worker = dd.clone();
        let result = coordinator.run(
            &kv,
            move |args: SchedulerWorkerArgs| {
                let _ = args.ready.send("fw-test".to_string());
                // hold the worker open long enough for a few supervision
                // ticks to land, then let the run end cleanly.
                thread::sleep(Duration::from_millis(60));
                let _ = dd_for_worker;
            },
            |args: ControllerWorkerArgs| {
                let _ = args.ready.send(());
            },
            move || {
                revive_calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );
        assert!(result.is_ok());
        assert!(revive_calls.load(Ordering::SeqCst) > 0);
    }
}
