extern crate relay_mesos;

use std::sync::mpsc;
use std::sync::Arc;

use relay_mesos::callbacks::{FrameworkCallbacks, TaskStatus};
use relay_mesos::config::TaskTemplate;
use relay_mesos::desired_delta::DesiredDelta;
use relay_mesos::driver::fake::{Call, FakeDriver};
use relay_mesos::framework_identity;
use relay_mesos::kv_store::InMemoryKvStore;
use relay_mesos::offer::Offer;
use relay_mesos::resource::{OfferedResource, OfferedValue, ResourceRequirement};
use relay_mesos::scheduler_agent::SchedulerAgent;

fn template() -> TaskTemplate {
    TaskTemplate {
        framework_name: "e2e".to_string(),
        warmer: Some("echo W".to_string()),
        cooler: Some("echo C".to_string()),
        resources: ResourceRequirement::new().with_scalar("cpus", 1.0).with_scalar("mem", 128.0),
        uris: vec![],
        env: vec![],
        container: None,
    }
}

fn offer_with(id: &str, cpus: f64, mem: f64) -> Offer {
    Offer {
        offer_id: id.to_string(),
        slave_id: format!("slave-{}", id),
        hostname: format!("{}.example.com", id),
        resources: vec![
            OfferedResource { name: "cpus".to_string(), value: OfferedValue::Scalar(cpus) },
            OfferedResource { name: "mem".to_string(), value: OfferedValue::Scalar(mem) },
        ],
    }
}

fn agent_with(desired_delta: Arc<DesiredDelta>, max_failures: i32) -> SchedulerAgent<FakeDriver> {
    let (tx, _rx) = mpsc::channel();
    SchedulerAgent::new(FakeDriver::new(), desired_delta, template(), max_failures, tx)
}

#[test]
fn scenario_simple_warm() {
    let desired_delta = Arc::new(DesiredDelta::new());
    desired_delta.write_latest(3);
    let agent = agent_with(desired_delta.clone(), -1);

    agent.resource_offers(&[offer_with("o1", 4.0, 512.0)]).unwrap();

    let calls = agent.driver().calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Launch { offer_id, task_ids } => {
            assert_eq!(offer_id, "o1");
            assert_eq!(task_ids.len(), 3);
        }
        other => panic!("expected launch, got {:?}", other),
    }
    assert_eq!(calls[1], Call::Revive);
    assert_eq!(desired_delta.read().0, 0);
}

#[test]
fn scenario_partial_fill() {
    let desired_delta = Arc::new(DesiredDelta::new());
    desired_delta.write_latest(5);
    let agent = agent_with(desired_delta.clone(), -1);

    agent.resource_offers(&[offer_with("o1", 2.0, 256.0)]).unwrap();

    assert_eq!(desired_delta.read().0, 3);
}

#[test]
fn scenario_superseded_demand() {
    let desired_delta = Arc::new(DesiredDelta::new());
    desired_delta.write_latest(10);
    desired_delta.write_latest(-4);
    let agent = agent_with(desired_delta.clone(), -1);

    agent.resource_offers(&[offer_with("o1", 3.0, 384.0)]).unwrap();

    let calls = agent.driver().calls();
    match &calls[0] {
        Call::Launch { task_ids, .. } => assert_eq!(task_ids.len(), 3),
        other => panic!("expected launch, got {:?}", other),
    }
    assert_eq!(desired_delta.read().0, -1);
}

#[test]
fn scenario_all_offers_unusable() {
    let desired_delta = Arc::new(DesiredDelta::new());
    desired_delta.write_latest(5);
    let agent = agent_with(desired_delta.clone(), -1);

    agent.resource_offers(&[offer_with("o1", 0.1, 8.0)]).unwrap();

    assert_eq!(agent.driver().calls(), vec![Call::Decline { offer_id: "o1".to_string() }]);
    assert_eq!(desired_delta.read().0, 5);
}

#[test]
fn scenario_failure_trip_stops_the_driver() {
    let agent = agent_with(Arc::new(DesiredDelta::new()), 3);

    assert!(agent.status_update("t1", TaskStatus::Failed).is_ok());
    assert!(agent.status_update("t2", TaskStatus::Failed).is_ok());
    assert!(agent.status_update("t3", TaskStatus::Failed).is_err());

    assert_eq!(agent.driver().calls(), vec![Call::Stop]);
}

#[test]
fn scenario_failover_recovery_rewrites_not_recreates() {
    let kv = InMemoryKvStore::new();
    assert_eq!(framework_identity::load(&kv, "e2e").unwrap(), None);

    framework_identity::persist(&kv, "e2e", "fw-0001").unwrap();
    assert_eq!(framework_identity::load(&kv, "e2e").unwrap(), Some("fw-0001".to_string()));

    // Coordinator restarts, sees the persisted id, registers with it, then
    // rewrites the same key rather than creating a new entry under a
    // different path.
    let recovered = framework_identity::load(&kv, "e2e").unwrap().unwrap();
    assert_eq!(recovered, "fw-0001");
    framework_identity::persist(&kv, "e2e", &recovered).unwrap();
    assert_eq!(framework_identity::load(&kv, "e2e").unwrap(), Some("fw-0001".to_string()));
}
