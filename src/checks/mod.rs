pub mod container;
pub mod metadata;

use serde_json::Value;

use crate::config::ChecksConfig;
use crate::error::GraderError;
use crate::parser::ParsedObject;
use crate::registry::CheckRegistry;

/// Registers the built-in catalog. Order here is the report order.
pub fn register_all(
    registry: &mut CheckRegistry,
    config: &ChecksConfig,
) -> Result<(), GraderError> {
    container::register(registry, config)?;
    metadata::register(registry, config)?;
    Ok(())
}

/// The workload kinds that carry a pod template. Adding a kind means adding a
/// variant and its template path below; the matches are exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Pod,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    CronJob,
    ReplicationController,
}

impl WorkloadKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Pod" => Some(WorkloadKind::Pod),
            "Deployment" => Some(WorkloadKind::Deployment),
            "StatefulSet" => Some(WorkloadKind::StatefulSet),
            "DaemonSet" => Some(WorkloadKind::DaemonSet),
            "ReplicaSet" => Some(WorkloadKind::ReplicaSet),
            "Job" => Some(WorkloadKind::Job),
            "CronJob" => Some(WorkloadKind::CronJob),
            "ReplicationController" => Some(WorkloadKind::ReplicationController),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadKind::Pod => "Pod",
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::ReplicaSet => "ReplicaSet",
            WorkloadKind::Job => "Job",
            WorkloadKind::CronJob => "CronJob",
            WorkloadKind::ReplicationController => "ReplicationController",
        }
    }

    fn pod_spec(self, data: &Value) -> Option<&Value> {
        match self {
            WorkloadKind::Pod => data.get("spec"),
            WorkloadKind::Deployment
            | WorkloadKind::StatefulSet
            | WorkloadKind::DaemonSet
            | WorkloadKind::ReplicaSet
            | WorkloadKind::Job
            | WorkloadKind::ReplicationController => {
                data.get("spec")?.get("template")?.get("spec")
            }
            WorkloadKind::CronJob => data
                .get("spec")?
                .get("jobTemplate")?
                .get("spec")?
                .get("template")?
                .get("spec"),
        }
    }
}

/// Non-owning view over an object's pod template: init containers in declared
/// order followed by regular containers. Zero containers is a real state that
/// some checks report on; a workload kind with a malformed or missing spec
/// yields an empty list rather than an error.
pub struct PodTemplate<'a> {
    pub kind: WorkloadKind,
    containers: Vec<&'a Value>,
}

impl<'a> PodTemplate<'a> {
    /// Returns `None` for kinds without a pod template (Service, ConfigMap, …),
    /// which the engine treats as "not applicable", never as a failure.
    pub fn extract(object: &'a ParsedObject) -> Option<Self> {
        let kind = WorkloadKind::from_kind(&object.kind)?;
        let mut containers = Vec::new();
        if let Some(spec) = kind.pod_spec(&object.data) {
            containers.extend(array_items(spec, "initContainers"));
            containers.extend(array_items(spec, "containers"));
        }
        Some(PodTemplate { kind, containers })
    }

    pub fn containers(&self) -> &[&'a Value] {
        &self.containers
    }
}

fn array_items<'a>(spec: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    spec.get(key).and_then(Value::as_array).into_iter().flatten()
}

pub fn container_name(container: &Value) -> &str {
    container
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
}

#[cfg(test)]
pub(crate) fn parse_one(manifest: &str) -> ParsedObject {
    crate::parser::parse_manifest(manifest).unwrap().remove(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_pod() {
        let object = parse_one(
            r#"
kind: Pod
metadata:
  name: p
spec:
  initContainers:
    - name: setup
  containers:
    - name: app
    - name: sidecar
"#,
        );
        let template = PodTemplate::extract(&object).unwrap();
        assert_eq!(template.kind, WorkloadKind::Pod);
        let names: Vec<&str> = template
            .containers()
            .iter()
            .map(|c| container_name(c))
            .collect();
        assert_eq!(names, vec!["setup", "app", "sidecar"]);
    }

    #[test]
    fn test_extract_nested_template_kinds() {
        for kind in [
            "Deployment",
            "StatefulSet",
            "DaemonSet",
            "ReplicaSet",
            "Job",
            "ReplicationController",
        ] {
            let manifest = format!(
                "kind: {kind}\nmetadata:\n  name: w\nspec:\n  template:\n    spec:\n      containers:\n        - name: app\n"
            );
            let object = parse_one(&manifest);
            let template = PodTemplate::extract(&object).unwrap();
            assert_eq!(template.containers().len(), 1, "kind {kind}");
        }
    }

    #[test]
    fn test_extract_cronjob_template() {
        let object = parse_one(
            r#"
kind: CronJob
metadata:
  name: nightly
spec:
  jobTemplate:
    spec:
      template:
        spec:
          containers:
            - name: job
"#,
        );
        let template = PodTemplate::extract(&object).unwrap();
        assert_eq!(template.kind, WorkloadKind::CronJob);
        assert_eq!(template.containers().len(), 1);
    }

    #[test]
    fn test_non_workload_kinds_have_no_template() {
        for kind in ["Service", "ConfigMap", "Secret"] {
            let object = parse_one(&format!("kind: {kind}\nmetadata:\n  name: x\n"));
            assert!(PodTemplate::extract(&object).is_none());
        }
    }

    #[test]
    fn test_workload_without_spec_yields_zero_containers() {
        let object = parse_one("kind: Deployment\nmetadata:\n  name: empty\n");
        let template = PodTemplate::extract(&object).unwrap();
        assert!(template.containers().is_empty());
    }
}
