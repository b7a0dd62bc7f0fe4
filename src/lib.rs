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

//! An autoscaling bridge between a periodic feedback-control loop and a
//! Mesos cluster resource manager. A `Coordinator` spawns a `ControllerLoop`
//! worker that writes signed task demand into a shared `DesiredDelta`, and a
//! `SchedulerAgent` worker that reads it on every resource-offer batch and
//! translates it into launched or declined tasks.
//!
//! Everything through `scheduler_agent` is protocol-agnostic: it knows
//! nothing about protobuf, a network, or a real Mesos master. `mesos_adapter`
//! is the one place that bridges those pure types onto the real `mesos`
//! crate's `Scheduler` trait and `SchedulerClient`.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate ctrlc;
extern crate mesos;
extern crate protobuf;
extern crate rand;

pub mod callbacks;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod desired_delta;
pub mod driver;
pub mod errors;
pub mod failure_counter;
pub mod framework_identity;
pub mod kv_store;
pub mod mesos_adapter;
pub mod offer;
pub mod offer_matcher;
pub mod resource;
pub mod scheduler_agent;
pub mod task_builder;
