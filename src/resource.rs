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

use std::collections::BTreeMap;

use errors::{ErrorKind, Result};

/// An inclusive `[begin, end]` span, as Mesos range resources advertise them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub begin: i64,
    pub end: i64,
}

impl Span {
    pub fn width(&self) -> i64 {
        (self.end - self.begin + 1).max(0)
    }
}

/// What a single task instance needs from a resource, keyed by resource name.
#[derive(Clone, Debug, PartialEq)]
pub enum RequirementValue {
    Scalar(f64),
    Ranges(Vec<Span>),
    Set(Vec<String>),
}

/// What an offer actually advertises for a resource.
#[derive(Clone, Debug, PartialEq)]
pub enum OfferedValue {
    Scalar(f64),
    Ranges(Vec<Span>),
    Set(Vec<String>),
}

/// The resources a single warmer/cooler task instance consumes. Partitioned
/// into scalar, range, and set kinds per the Mesos resource model; any other
/// kind encountered either here or in an offer is a configuration error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceRequirement {
    requirements: BTreeMap<String, RequirementValue>,
}

impl ResourceRequirement {
    pub fn new() -> Self {
        ResourceRequirement { requirements: BTreeMap::new() }
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> Self {
        self.requirements.insert(name.to_string(), RequirementValue::Scalar(value));
        self
    }

    pub fn with_ranges(mut self, name: &str, spans: Vec<Span>) -> Self {
        self.requirements.insert(name.to_string(), RequirementValue::Ranges(spans));
        self
    }

    pub fn with_set(mut self, name: &str, items: Vec<String>) -> Self {
        self.requirements.insert(name.to_string(), RequirementValue::Set(items));
        self
    }

    pub fn get(&self, name: &str) -> Option<&RequirementValue> {
        self.requirements.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> ::std::collections::btree_map::Iter<String, RequirementValue> {
        self.requirements.iter()
    }

    /// Every key this requirement names is a recognized kind. This is
    /// the start-up-time half of the "unrecognized resource key" check;
    /// the offer-time half lives in the Offer Matcher, since an offer can
    /// advertise a resource kind under a name we don't ask for (which is
    /// fine) or a mismatched kind for a name we do ask for (which isn't).
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.requirements {
            match *value {
                RequirementValue::Scalar(v) if v < 0.0 => {
                    return Err(ErrorKind::Configuration(
                        format!("resource '{}' has a negative scalar requirement", name)).into());
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// One resource line item as advertised by an offer.
#[derive(Clone, Debug, PartialEq)]
pub struct OfferedResource {
    pub name: String,
    pub value: OfferedValue,
}
