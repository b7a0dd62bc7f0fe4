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

//! Decides how many identical task instances an offer can support. Kept free
//! of any Mesos protobuf types so it stays a pure, trivially testable
//! function of plain data; `mesos_adapter::convert` is responsible for
//! translating a real `mesos::proto::Offer` into the `Offer`/
//! `OfferedResource` values this module consumes.

use errors::{ErrorKind, Result};
use offer::Offer;
use resource::{OfferedResource, OfferedValue, RequirementValue, ResourceRequirement};

/// How many copies of `requirement` the given resources can host, or an
/// error if a requirement key names a resource kind this matcher does not
/// know how to reconcile against what was offered.
pub fn capacity(offered: &[OfferedResource], requirement: &ResourceRequirement) -> Result<i64> {
    let mut capacity: Option<i64> = None;

    for resource in offered {
        let required = match requirement.get(&resource.name) {
            Some(r) => r,
            None => continue, // we don't care about this resource
        };

        let contribution = match (&resource.value, required) {
            (&OfferedValue::Scalar(oval), &RequirementValue::Scalar(reqval)) => {
                if reqval > oval {
                    0
                } else if reqval <= 0.0 {
                    i64::max_value()
                } else {
                    (oval / reqval).floor() as i64
                }
            }
            (&OfferedValue::Ranges(ref ospans), &RequirementValue::Ranges(ref rspans)) => {
                let offered_width: i64 = ospans.iter().map(|s| s.width()).sum();
                let needed_width: i64 = rspans.iter().map(|s| s.width()).sum();
                if needed_width == 0 {
                    continue;
                }
                offered_width / needed_width
            }
            (&OfferedValue::Set(ref oset), &RequirementValue::Set(ref rset)) => {
                if rset.iter().all(|item| oset.contains(item)) {
                    1
                } else {
                    0
                }
            }
            _ => {
                return Err(ErrorKind::Configuration(format!(
                    "resource '{}' was offered as a kind that does not match the requirement's kind",
                    resource.name
                )).into());
            }
        };

        capacity = Some(match capacity {
            None => contribution,
            Some(c) => c.min(contribution),
        });

        if capacity == Some(0) {
            return Ok(0);
        }
    }

    Ok(capacity.unwrap_or(0))
}

/// Partitions `offers` into the ones that can host at least one task
/// (paired with how many) and the ones that must be declined outright.
pub fn partition<'a>(
    offers: &'a [Offer],
    requirement: &ResourceRequirement,
) -> Result<(Vec<(&'a Offer, i64)>, Vec<&'a Offer>)> {
    let mut usable = Vec::new();
    let mut declinable = Vec::new();

    for offer in offers {
        let cap = capacity(&offer.resources, requirement)?;
        if cap > 0 {
            usable.push((offer, cap));
        } else {
            declinable.push(offer);
        }
    }

    Ok((usable, declinable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource::Span;

    fn scalar(name: &str, value: f64) -> OfferedResource {
        OfferedResource { name: name.to_string(), value: OfferedValue::Scalar(value) }
    }

    #[test]
    fn exact_scalar_fit_yields_capacity_one() {
        let offered = vec![scalar("cpus", 1.0), scalar("mem", 128.0)];
        let req = ResourceRequirement::new().with_scalar("cpus", 1.0).with_scalar("mem", 128.0);
        assert_eq!(capacity(&offered, &req).unwrap(), 1);
    }

    #[test]
    fn short_scalar_yields_capacity_zero() {
        let offered = vec![scalar("cpus", 4.0), scalar("mem", 64.0)];
        let req = ResourceRequirement::new().with_scalar("cpus", 1.0).with_scalar("mem", 128.0);
        assert_eq!(capacity(&offered, &req).unwrap(), 0);
    }

    #[test]
    fn capacity_is_bound_by_the_scarcest_resource() {
        let offered = vec![scalar("cpus", 4.0), scalar("mem", 512.0)];
        let req = ResourceRequirement::new().with_scalar("cpus", 1.0).with_scalar("mem", 128.0);
        assert_eq!(capacity(&offered, &req).unwrap(), 4);
    }

    #[test]
    fn resource_we_do_not_require_is_ignored() {
        let offered = vec![scalar("cpus", 4.0), scalar("disk", 999.0)];
        let req = ResourceRequirement::new().with_scalar("cpus", 1.0);
        assert_eq!(capacity(&offered, &req).unwrap(), 4);
    }

    #[test]
    fn no_overlapping_resources_yields_zero() {
        let offered = vec![scalar("disk", 999.0)];
        let req = ResourceRequirement::new().with_scalar("cpus", 1.0);
        assert_eq!(capacity(&offered, &req).unwrap(), 0);
    }

    #[test]
    fn ranges_match_by_total_width() {
        let offered = vec![OfferedResource {
            name: "ports".to_string(),
            value: OfferedValue::Ranges(vec![Span { begin: 31000, end: 31009 }]), // width 10
        }];
        let req = ResourceRequirement::new()
            .with_ranges("ports", vec![Span { begin: 0, end: 1 }]); // width 2
        assert_eq!(capacity(&offered, &req).unwrap(), 5);
    }

    #[test]
    fn sets_match_by_subset_containment() {
        let offered = vec![OfferedResource {
            name: "disks".to_string(),
            value: OfferedValue::Set(vec!["sda1".to_string(), "sda2".to_string()]),
        }];
        let req = ResourceRequirement::new().with_set("disks", vec!["sda1".to_string()]);
        assert_eq!(capacity(&offered, &req).unwrap(), 1);

        let req_missing = ResourceRequirement::new().with_set("disks", vec!["sdb1".to_string()]);
        assert_eq!(capacity(&offered, &req_missing).unwrap(), 0);
    }

    #[test]
    fn mismatched_kind_is_a_configuration_error() {
        let offered = vec![scalar("cpus", 4.0)];
        let req = ResourceRequirement::new().with_set("cpus", vec!["x".to_string()]);
        assert!(capacity(&offered, &req).is_err());
    }

    fn offer(id: &str, resources: Vec<OfferedResource>) -> Offer {
        Offer {
            offer_id: id.to_string(),
            slave_id: format!("slave-{}", id),
            hostname: format!("{}.example.com", id),
            resources: resources,
        }
    }

    #[test]
    fn partition_splits_usable_from_declinable() {
        let offers = vec![
            offer("o1", vec![scalar("cpus", 4.0), scalar("mem", 512.0)]),
            offer("o2", vec![scalar("cpus", 0.1), scalar("mem", 8.0)]),
        ];
        let req = ResourceRequirement::new().with_scalar("cpus", 1.0).with_scalar("mem", 128.0);
        let (usable, declinable) = partition(&offers, &req).unwrap();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].0.offer_id, "o1");
        assert_eq!(usable[0].1, 4);
        assert_eq!(declinable.len(), 1);
        assert_eq!(declinable[0].offer_id, "o2");
    }
}
