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

//! Persists the Mesos framework id across restarts so a relaunch
//! re-registers instead of registering fresh, letting a scheduler recover
//! its old tasks after a crash within `failover_timeout_secs`.

use kv_store::KvStore;
use errors::Result;

fn path(framework_name: &str) -> String {
    format!("relay_mesos.framework.{}", framework_name)
}

pub fn load(store: &KvStore, framework_name: &str) -> Result<Option<String>> {
    store.get(&path(framework_name))
}

pub fn persist(store: &KvStore, framework_name: &str, framework_id: &str) -> Result<()> {
    store.set(&path(framework_name), framework_id)
}

pub fn forget(store: &KvStore, framework_name: &str) -> Result<()> {
    store.delete(&path(framework_name))
}
