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

//! Bridges the real `mesos` crate onto `FrameworkCallbacks`/`Driver`. This
//! is the only module in the crate that imports `mesos::proto`; everything
//! upstream of it (Offer Matcher, Task Builder, Scheduler Agent) works
//! against the plain types in `offer`, `task_builder`, and `callbacks`.

pub mod convert;

use std::sync::mpsc::Sender;
use std::sync::Arc;

use mesos::proto::{ExecutorID, FrameworkID, InverseOffer, Offer as ProtoOffer, OfferID, SlaveID,
                   TaskStatus as ProtoTaskStatus};
use mesos::{Scheduler, SchedulerClient};

use callbacks::FrameworkCallbacks;
use driver::Driver;
use errors::{catch_and_forward, Error, ErrorKind, Result};
use task_builder::TaskDescriptor;

/// Implements the real `mesos::Scheduler` trait, forwarding every callback
/// into an `Arc<A>`. `mesos-rs` folds registration and re-registration into
/// a single `subscribed` call; we surface both to the agent by calling
/// `registered` the first time and `reregistered` on any subsequent call,
/// tracked with a plain bool since this type is only ever driven by the
/// one thread `run_protobuf_scheduler` owns.
///
/// Every callback body runs through `errors::catch_and_forward` so an
/// uncaught error (most importantly the `MaxFailuresReached` error the
/// agent's `status_update` raises once the failure counter trips) reaches
/// the Coordinator's exception channel instead of being swallowed as a
/// log line, per the "a crashed callback cannot leave the Coordinator
/// unaware" guarantee.
pub struct ProtobufScheduler<A: FrameworkCallbacks> {
    agent: Arc<A>,
    errors: Sender<Error>,
    seen_subscribed: bool,
}

impl<A: FrameworkCallbacks> ProtobufScheduler<A> {
    pub fn new(agent: Arc<A>, errors: Sender<Error>) -> Self {
        ProtobufScheduler { agent: agent, errors: errors, seen_subscribed: false }
    }
}

impl<A: FrameworkCallbacks> Scheduler for ProtobufScheduler<A> {
    fn subscribed(&mut self, client: &SchedulerClient, framework_id: &FrameworkID, _heartbeat_interval_seconds: Option<f64>) {
        let already_subscribed = self.seen_subscribed;
        self.seen_subscribed = true;
        let agent = &self.agent;
        let _ = catch_and_forward("scheduler-agent", &self.errors, || {
            if already_subscribed {
                agent.reregistered()
            } else {
                agent.registered(framework_id.get_value())
            }
        });
        if let Err(e) = client.reconcile(vec![]) {
            warn!("initial reconcile failed: {}", e);
        }
    }

    fn inverse_offers(&mut self, client: &SchedulerClient, inverse_offers: Vec<&InverseOffer>) {
        let ids = inverse_offers.iter().map(|o| o.get_id().clone()).collect();
        if let Err(e) = client.decline(ids, None) {
            warn!("declining inverse offers failed: {}", e);
        }
    }

    fn offers(&mut self, _client: &SchedulerClient, offers: Vec<&ProtoOffer>) {
        let converted: Vec<_> = offers.iter().map(|o| convert::offer_from_proto(o)).collect();
        let agent = &self.agent;
        let _ = catch_and_forward("scheduler-agent", &self.errors, || agent.resource_offers(&converted));
    }

    fn rescind(&mut self, _client: &SchedulerClient, offer_id: &OfferID) {
        let agent = &self.agent;
        let _ = catch_and_forward("scheduler-agent", &self.errors, || agent.offer_rescinded(offer_id.get_value()));
    }

    fn update(&mut self, _client: &SchedulerClient, status: &ProtoTaskStatus) {
        let task_id = status.get_task_id().get_value().to_string();
        let mapped = convert::task_status_from_proto(status.get_state());
        let agent = &self.agent;
        let _ = catch_and_forward("scheduler-agent", &self.errors, || agent.status_update(&task_id, mapped));
    }

    fn message(&mut self, _client: &SchedulerClient, _slave_id: &SlaveID, _executor_id: &ExecutorID, _data: Vec<u8>) {
        let agent = &self.agent;
        let _ = catch_and_forward("scheduler-agent", &self.errors, || agent.framework_message());
    }

    fn failure(&mut self, _client: &SchedulerClient, slave_id: Option<&SlaveID>, _executor_id: Option<&ExecutorID>, _status: Option<i32>) {
        match slave_id {
            Some(id) => warn!("slave lost: {}", id.get_value()),
            None => warn!("executor lost"),
        }
    }

    fn error(&mut self, _client: &SchedulerClient, message: String) {
        error!("mesos reported an error: {}", message);
    }

    fn heartbeat(&mut self, _client: &SchedulerClient) {
        debug!("heartbeat");
    }

    fn disconnected(&mut self) {
        warn!("disconnected from master");
    }
}

/// Wraps a real `SchedulerClient` as a `Driver`. The crate this is
/// grounded on exposes `launch`/`decline`/`kill`/`reconcile`; `revive` and
/// a clean `teardown` are assumed to exist with the same
/// `(args..., Option<Filters>) -> Result<_, String>` shape, since they are
/// not exercised anywhere in the code this module was grounded on.
pub struct ClientDriver {
    client: SchedulerClient,
}

impl ClientDriver {
    pub fn new(client: SchedulerClient) -> Self {
        ClientDriver { client: client }
    }
}

impl Driver for ClientDriver {
    fn launch_tasks(&self, offer_id: &str, tasks: Vec<TaskDescriptor>) -> Result<()> {
        let mut oid = OfferID::new();
        oid.set_value(offer_id.to_string());
        let infos = tasks.iter().map(convert::task_info_from_descriptor).collect();
        self.client.launch(vec![oid], infos, None)
            .map(|_| ())
            .map_err(|e| ErrorKind::WorkerFailure("scheduler-agent".to_string(), e).into())
    }

    fn decline_offer(&self, offer_id: &str) -> Result<()> {
        let mut oid = OfferID::new();
        oid.set_value(offer_id.to_string());
        self.client.decline(vec![oid], None)
            .map(|_| ())
            .map_err(|e| ErrorKind::WorkerFailure("scheduler-agent".to_string(), e).into())
    }

    fn revive_offers(&self) -> Result<()> {
        self.client.revive(vec![])
            .map(|_| ())
            .map_err(|e| ErrorKind::WorkerFailure("scheduler-agent".to_string(), e).into())
    }

    fn stop(&self) -> Result<()> {
        self.client.teardown()
            .map(|_| ())
            .map_err(|e| ErrorKind::WorkerFailure("scheduler-agent".to_string(), e).into())
    }
}
