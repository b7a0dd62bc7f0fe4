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

//! Error kinds for the whole crate, one per failure mode a caller needs to
//! distinguish (config validation, registration timeout, a worker dying,
//! the failure-count trip wire). Transient driver hiccups are logged and
//! recovered inline rather than raised here.

use std::sync::mpsc::Sender;

error_chain! {
    errors {
        /// Missing master URI, an unrecognized resource key, or a resource
        /// kind the Offer Matcher / Task Builder doesn't know how to handle.
        Configuration(msg: String) {
            description("configuration error")
            display("configuration error: {}", msg)
        }
        /// The Scheduler Agent did not signal ready within `init_timeout`.
        RegistrationTimeout(seconds: f64) {
            description("registration timed out")
            display("scheduler agent did not register within {}s", seconds)
        }
        /// Either worker panicked or returned an error that escaped its
        /// catch shim.
        WorkerFailure(worker: String, msg: String) {
            description("worker failure")
            display("worker '{}' failed: {}", worker, msg)
        }
        /// FailureCounter reached `max_failures`; the driver has been
        /// stopped.
        MaxFailuresReached(count: u32) {
            description("max failures reached")
            display("max allowable number of failures reached: {}", count)
        }
    }
}

/// Wraps a fallible callback body so that any error it returns is logged and
/// forwarded down `sender` before being handed back to the caller. Callbacks
/// invoked by an external driver must never let an error vanish silently,
/// since the only thing watching for worker death is the Coordinator's
/// supervision loop reading this same channel.
pub fn catch_and_forward<F>(worker: &str, sender: &Sender<Error>, mut body: F) -> Result<()>
    where F: FnMut() -> Result<()>
{
    match body() {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{} raised an error: {}", worker, e);
            let _ = sender.send(e.clone_for_forward());
            Err(e)
        }
    }
}

impl Error {
    /// `error_chain::Error` isn't `Clone`; we only need enough of it to
    /// forward a description across the exception channel; that's good
    /// enough for the Coordinator, which never inspects anything beyond
    /// `Display`.
    fn clone_for_forward(&self) -> Error {
        ErrorKind::WorkerFailure("unknown".into(), self.to_string()).into()
    }
}
