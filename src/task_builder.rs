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

//! Builds a protocol-agnostic task descriptor from a concrete offer, a
//! chosen command, and a `TaskTemplate`. Kept free of `mesos::proto` types
//! for the same reason `offer_matcher` is: it should be testable without a
//! master, a driver, or any network I/O. `mesos_adapter::convert` is
//! responsible for turning what this module produces into real protobuf.

use std::collections::HashMap;

use config::TaskTemplate;
use offer::Offer;
use resource::{RequirementValue, Span};

#[derive(Clone, Debug, PartialEq)]
pub enum BuiltResource {
    Scalar { name: String, value: f64 },
    Ranges { name: String, spans: Vec<Span> },
    Set { name: String, items: Vec<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskDescriptor {
    pub task_id: String,
    pub slave_id: String,
    pub name: String,
    pub command: String,
    pub uris: Vec<String>,
    pub env: Vec<(String, String)>,
    pub container: Option<::config::ContainerConfig>,
    pub resources: Vec<BuiltResource>,
}

/// Builds one task against `offer`, numbering it `seq` within the current
/// `resourceOffers` batch. `seq` plus the offer id plus a random 63-bit
/// component make the id unique within this framework instance; nothing
/// here promises uniqueness across instances.
pub fn build(seq: u64, offer: &Offer, command: &str, template: &TaskTemplate) -> TaskDescriptor {
    build_with_env(seq, offer, command, template, &process_env())
}

/// Testable variant that takes the interpolation environment explicitly
/// instead of reading the real process environment.
pub fn build_with_env(
    seq: u64,
    offer: &Offer,
    command: &str,
    template: &TaskTemplate,
    env: &HashMap<String, String>,
) -> TaskDescriptor {
    let task_id = format!("{}.{}.{}", seq, offer.offer_id, random_component());
    let name = if !template.framework_name.is_empty() {
        format!("relay.mesos task: {}: {}", template.framework_name, task_id)
    } else {
        format!("relay.mesos task: {}", task_id)
    };

    let resources = template.resources.iter().map(|(name, req)| match *req {
        RequirementValue::Scalar(v) => BuiltResource::Scalar { name: name.clone(), value: v },
        RequirementValue::Ranges(ref spans) => {
            BuiltResource::Ranges { name: name.clone(), spans: spans.clone() }
        }
        RequirementValue::Set(ref items) => {
            BuiltResource::Set { name: name.clone(), items: items.clone() }
        }
    }).collect();

    TaskDescriptor {
        task_id: task_id,
        slave_id: offer.slave_id.clone(),
        name: name,
        command: interpolate(command, env),
        uris: template.uris.clone(),
        env: template.env.clone(),
        container: template.container.clone(),
        resources: resources,
    }
}

fn process_env() -> HashMap<String, String> {
    ::std::env::vars().collect()
}

fn random_component() -> u64 {
    ::rand::random::<u64>() & ((1u64 << 63) - 1)
}

/// Replaces every `{VAR}` occurrence in `command` with `env["VAR"]`, left
/// untouched if the variable isn't present. No escaping, no nesting --
/// matches the simple named-substitution the command strings are written
/// against.
fn interpolate(command: &str, env: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(command.len());
    let bytes = command.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = command[i + 1..].find('}') {
                let var = &command[i + 1..i + 1 + end];
                if !var.is_empty() && var.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    if let Some(val) = env.get(var) {
                        out.push_str(val);
                    } else {
                        out.push_str(&command[i..i + 2 + end]);
                    }
                    i += 2 + end;
                    continue;
                }
            }
        }
        let ch = command[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}
