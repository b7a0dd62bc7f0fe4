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

//! Explicit configuration surface. Populating a `Config` -- from a CLI, a
//! file, environment variables, whatever -- is the embedding binary's job,
//! not this crate's.

use std::collections::HashMap;

use errors::{ErrorKind, Result};
use resource::ResourceRequirement;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DockerNetwork {
    Host,
    Bridge,
    None,
}

impl Default for DockerNetwork {
    fn default() -> Self {
        DockerNetwork::Bridge
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VolumeMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeMount {
    pub host_path: String,
    pub container_path: String,
    pub mode: VolumeMode,
}

/// Container options, present only when `docker_image` is set.
#[derive(Clone, Debug, Default)]
pub struct ContainerConfig {
    pub docker_image: String,
    pub docker_network: DockerNetwork,
    pub force_pull_image: bool,
    pub volumes: Vec<VolumeMount>,
    pub docker_parameters: HashMap<String, String>,
}

/// Everything the Coordinator, Scheduler Agent, and Task Builder need,
/// gathered into one explicit struct. Every field here is named in the
/// configuration surface this crate documents; nothing is loaded from a
/// file or the environment by this crate itself.
#[derive(Clone, Debug)]
pub struct Config {
    pub mesos_master: String,
    pub mesos_framework_name: String,
    pub mesos_framework_principal: Option<String>,
    pub mesos_framework_role: Option<String>,
    pub mesos_checkpoint: bool,
    pub failover_timeout_secs: f64,
    pub init_timeout_secs: f64,
    pub delay_secs: f64,

    pub warmer: Option<String>,
    pub cooler: Option<String>,
    pub mesos_task_resources: ResourceRequirement,
    pub mesos_environment: Vec<(String, String)>,
    pub uris: Vec<String>,

    pub container: Option<ContainerConfig>,

    /// -1 disables failure-triggered shutdown.
    pub max_failures: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mesos_master: String::new(),
            mesos_framework_name: "framework".to_string(),
            mesos_framework_principal: None,
            mesos_framework_role: None,
            mesos_checkpoint: false,
            failover_timeout_secs: 60.0 * 60.0 * 4.0,
            init_timeout_secs: 20.0,
            delay_secs: 1.0,
            warmer: None,
            cooler: None,
            mesos_task_resources: ResourceRequirement::new(),
            mesos_environment: Vec::new(),
            uris: Vec::new(),
            container: None,
            max_failures: -1,
        }
    }
}

impl Config {
    /// Start-up validation: a master URI is required; an empty resource
    /// requirement is a warning, not a hard failure, since some clusters
    /// genuinely offer unconstrained slaves.
    pub fn validate(&self) -> Result<()> {
        if self.mesos_master.trim().is_empty() {
            return Err(ErrorKind::Configuration("mesos_master is required".to_string()).into());
        }
        if self.mesos_task_resources.is_empty() {
            warn!(
                "mesos_task_resources is empty for framework '{}'; tasks may not start on slaves",
                self.mesos_framework_name
            );
        }
        self.mesos_task_resources.validate()?;
        Ok(())
    }

    /// `min(5s, delay)`, the supervision loop's poll interval.
    pub fn supervision_interval_secs(&self) -> f64 {
        self.delay_secs.min(5.0)
    }

    /// The immutable slice of this config the Task Builder needs. Kept
    /// separate from `Config` so the builder never sees `mesos_master`,
    /// timeouts, or anything else that isn't part of a launched task.
    pub fn task_template(&self) -> TaskTemplate {
        TaskTemplate {
            framework_name: self.mesos_framework_name.clone(),
            warmer: self.warmer.clone(),
            cooler: self.cooler.clone(),
            resources: self.mesos_task_resources.clone(),
            uris: self.uris.clone(),
            env: self.mesos_environment.clone(),
            container: self.container.clone(),
        }
    }
}

/// What every warmer/cooler task instance is built from, independent of
/// anything the Coordinator or Scheduler Agent otherwise track.
#[derive(Clone, Debug)]
pub struct TaskTemplate {
    pub framework_name: String,
    pub warmer: Option<String>,
    pub cooler: Option<String>,
    pub resources: ResourceRequirement,
    pub uris: Vec<String>,
    pub env: Vec<(String, String)>,
    pub container: Option<ContainerConfig>,
}
