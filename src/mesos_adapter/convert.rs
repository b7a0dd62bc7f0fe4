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

//! Protobuf <-> plain-data conversions. Everything in here is pure and
//! one-directional: offers come in as protobuf and go out as `Offer`;
//! task descriptors come in as `TaskDescriptor` and go out as protobuf.
//! Nothing here talks to a client or a socket.

use protobuf;

use mesos::proto::{CommandInfo, ContainerInfo, ContainerInfo_DockerInfo, ContainerInfo_DockerInfo_Network,
                   ContainerInfo_Type, Environment, Environment_Variable, Offer as ProtoOffer, Parameter, Resource,
                   SlaveID, TaskID, TaskInfo, TaskState as MesosTaskState, Value_Range, Value_Scalar, Value_Set,
                   Value_Type, Volume, Volume_Mode};

use callbacks::TaskStatus;
use config::{ContainerConfig, DockerNetwork};
use offer::Offer;
use resource::{OfferedResource, OfferedValue, Span};
use task_builder::{BuiltResource, TaskDescriptor};

pub fn offer_from_proto(offer: &ProtoOffer) -> Offer {
    let resources = offer.get_resources().iter().map(resource_from_proto).collect();
    Offer {
        offer_id: offer.get_id().get_value().to_string(),
        slave_id: offer.get_slave_id().get_value().to_string(),
        hostname: offer.get_hostname().to_string(),
        resources: resources,
    }
}

fn resource_from_proto(resource: &Resource) -> OfferedResource {
    let value = match resource.get_field_type() {
        Value_Type::SCALAR => OfferedValue::Scalar(resource.get_scalar().get_value()),
        Value_Type::RANGES => {
            let spans = resource.get_ranges().get_range().iter()
                .map(|r| Span { begin: r.get_begin() as i64, end: r.get_end() as i64 })
                .collect();
            OfferedValue::Ranges(spans)
        }
        Value_Type::SET => {
            let items = resource.get_set().get_item().iter().map(|s| s.to_string()).collect();
            OfferedValue::Set(items)
        }
        _ => OfferedValue::Set(Vec::new()),
    };
    OfferedResource { name: resource.get_name().to_string(), value: value }
}

/// The mapping `status_update` needs; every Mesos terminal/transitional
/// state not explicitly named collapses to `Other`, which the Scheduler
/// Agent's failure counter ignores.
pub fn task_status_from_proto(state: MesosTaskState) -> TaskStatus {
    match state {
        MesosTaskState::TASK_STAGING => TaskStatus::Staging,
        MesosTaskState::TASK_STARTING => TaskStatus::Starting,
        MesosTaskState::TASK_RUNNING => TaskStatus::Running,
        MesosTaskState::TASK_FINISHED => TaskStatus::Finished,
        MesosTaskState::TASK_FAILED => TaskStatus::Failed,
        MesosTaskState::TASK_KILLED => TaskStatus::Killed,
        MesosTaskState::TASK_LOST => TaskStatus::Lost,
        _ => TaskStatus::Other,
    }
}

pub fn task_info_from_descriptor(descriptor: &TaskDescriptor) -> TaskInfo {
    let mut task_id = TaskID::new();
    task_id.set_value(descriptor.task_id.clone());

    let mut slave_id = SlaveID::new();
    slave_id.set_value(descriptor.slave_id.clone());

    let mut command = CommandInfo::new();
    command.set_shell(true);
    command.set_value(descriptor.command.clone());
    if !descriptor.uris.is_empty() {
        let uris = descriptor.uris.iter().map(|u| {
            let mut uri = ::mesos::proto::CommandInfo_URI::new();
            uri.set_value(u.clone());
            uri
        }).collect();
        command.set_uris(protobuf::RepeatedField::from_vec(uris));
    }
    if !descriptor.env.is_empty() {
        let vars = descriptor.env.iter().map(|&(ref k, ref v)| {
            let mut var = Environment_Variable::new();
            var.set_name(k.clone());
            var.set_value(v.clone());
            var
        }).collect();
        let mut env = Environment::new();
        env.set_variables(protobuf::RepeatedField::from_vec(vars));
        command.set_environment(env);
    }

    let mut task_info = TaskInfo::new();
    task_info.set_name(descriptor.name.clone());
    task_info.set_task_id(task_id);
    task_info.set_slave_id(slave_id);
    task_info.set_command(command);
    task_info.set_resources(protobuf::RepeatedField::from_vec(
        descriptor.resources.iter().map(resource_to_proto).collect(),
    ));

    if let Some(ref container) = descriptor.container {
        task_info.set_container(container_info_to_proto(container));
    }

    task_info
}

fn resource_to_proto(resource: &BuiltResource) -> Resource {
    let mut out = Resource::new();
    match *resource {
        BuiltResource::Scalar { ref name, value } => {
            out.set_name(name.clone());
            out.set_field_type(Value_Type::SCALAR);
            let mut scalar = Value_Scalar::new();
            scalar.set_value(value);
            out.set_scalar(scalar);
        }
        BuiltResource::Ranges { ref name, ref spans } => {
            out.set_name(name.clone());
            out.set_field_type(Value_Type::RANGES);
            let ranges = spans.iter().map(|s| {
                let mut r = Value_Range::new();
                r.set_begin(s.begin as u64);
                r.set_end(s.end as u64);
                r
            }).collect();
            let mut ranges_field = ::mesos::proto::Value_Ranges::new();
            ranges_field.set_range(protobuf::RepeatedField::from_vec(ranges));
            out.set_ranges(ranges_field);
        }
        BuiltResource::Set { ref name, ref items } => {
            out.set_name(name.clone());
            out.set_field_type(Value_Type::SET);
            let mut set_field = Value_Set::new();
            set_field.set_item(protobuf::RepeatedField::from_vec(items.clone()));
            out.set_set(set_field);
        }
    }
    out.set_role("*".to_string());
    out
}

fn container_info_to_proto(container: &ContainerConfig) -> ContainerInfo {
    let mut docker = ContainerInfo_DockerInfo::new();
    docker.set_image(container.docker_image.clone());
    docker.set_force_pull_image(container.force_pull_image);
    docker.set_network(match container.docker_network {
        DockerNetwork::Host => ContainerInfo_DockerInfo_Network::HOST,
        DockerNetwork::Bridge => ContainerInfo_DockerInfo_Network::BRIDGE,
        DockerNetwork::None => ContainerInfo_DockerInfo_Network::NONE,
    });
    if !container.docker_parameters.is_empty() {
        let params = container.docker_parameters.iter().map(|(k, v)| {
            let mut p = Parameter::new();
            p.set_key(k.clone());
            p.set_value(v.clone());
            p
        }).collect();
        docker.set_parameters(protobuf::RepeatedField::from_vec(params));
    }

    let mut info = ContainerInfo::new();
    info.set_field_type(ContainerInfo_Type::DOCKER);
    info.set_docker(docker);
    if !container.volumes.is_empty() {
        let volumes = container.volumes.iter().map(|v| {
            let mut vol = Volume::new();
            vol.set_host_path(v.host_path.clone());
            vol.set_container_path(v.container_path.clone());
            vol.set_mode(match v.mode {
                ::config::VolumeMode::ReadOnly => Volume_Mode::RO,
                ::config::VolumeMode::ReadWrite => Volume_Mode::RW,
            });
            vol
        }).collect();
        info.set_volumes(protobuf::RepeatedField::from_vec(volumes));
    }
    info
}
