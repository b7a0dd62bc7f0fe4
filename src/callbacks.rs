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

//! The five callbacks a cluster-manager driver invokes on its scheduler,
//! expressed as a trait instead of duck-typed subclassing. `mesos_adapter`
//! implements the real `mesos::Scheduler` trait and forwards into this one;
//! tests drive implementors of this trait directly, with no protobuf or
//! network layer in the way.

use errors::Result;
use offer::Offer;

/// Coarse status a task can report. Only `Finished`/`Starting` and
/// `Failed`/`Lost` matter to the failure counter; everything else is
/// `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
    Other,
}

pub trait FrameworkCallbacks {
    fn registered(&self, framework_id: &str) -> Result<()>;

    fn reregistered(&self) -> Result<()> {
        Ok(())
    }

    fn resource_offers(&self, offers: &[Offer]) -> Result<()>;

    fn status_update(&self, task_id: &str, status: TaskStatus) -> Result<()>;

    fn offer_rescinded(&self, offer_id: &str) -> Result<()> {
        debug!("offer rescinded: {}", offer_id);
        Ok(())
    }

    /// Recovery from a lost/unreachable slave is the controller's job: it
    /// will see the effect on the metric and issue fresh demand next tick.
    fn framework_message(&self) -> Result<()> {
        Ok(())
    }
}
