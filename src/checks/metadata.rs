use regex::Regex;
use tracing::warn;

use crate::config::ChecksConfig;
use crate::error::GraderError;
use crate::parser::ParsedObject;
use crate::registry::CheckRegistry;
use crate::scorecard::{CheckResult, Grade};

pub fn register(registry: &mut CheckRegistry, config: &ChecksConfig) -> Result<(), GraderError> {
    let compiled = compile_labels(config);
    registry.register_object_check(
        "required-labels",
        "Makes sure that every object carries the configured labels, optionally \
         matching a pattern.",
        required_labels(compiled),
    )
}

struct CompiledLabel {
    key: String,
    pattern: Option<Regex>,
}

fn compile_labels(config: &ChecksConfig) -> Vec<CompiledLabel> {
    config
        .required_labels
        .iter()
        .map(|label| CompiledLabel {
            key: label.key.clone(),
            pattern: label.pattern.as_ref().map(|p| {
                Regex::new(p).unwrap_or_else(|e| {
                    warn!(
                        pattern = %p,
                        key = %label.key,
                        "invalid regex pattern for required label, \
                         falling back to literal match: {e}"
                    );
                    Regex::new(&regex::escape(p)).unwrap()
                })
            }),
        })
        .collect()
}

/// Patterns are compiled once above; the rule only reads them per object.
fn required_labels(compiled: Vec<CompiledLabel>) -> impl Fn(&ParsedObject) -> CheckResult {
    move |object| {
        let mut result = CheckResult::ok();

        for label in &compiled {
            match object.labels.get(&label.key) {
                None => {
                    result.add_comment(
                        "",
                        &format!("Label '{}' is missing", label.key),
                        "Add the label so that the object can be selected and attributed consistently",
                    );
                    result.grade = Grade::Critical;
                }
                Some(value) => {
                    if let Some(pattern) = &label.pattern {
                        if !pattern.is_match(value) {
                            result.add_comment(
                                "",
                                &format!(
                                    "Label '{}' value '{value}' does not match pattern '{}'",
                                    label.key,
                                    pattern.as_str()
                                ),
                                "Change the label value to match the required pattern",
                            );
                            result.grade = Grade::Critical;
                        }
                    }
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::parse_one;
    use crate::config::RequiredLabel;

    fn config(labels: Vec<RequiredLabel>) -> ChecksConfig {
        ChecksConfig {
            required_labels: labels,
            ..ChecksConfig::default()
        }
    }

    fn check(labels: Vec<RequiredLabel>) -> impl Fn(&ParsedObject) -> CheckResult {
        required_labels(compile_labels(&config(labels)))
    }

    #[test]
    fn test_no_required_labels_is_ok() {
        let object = parse_one("kind: Service\nmetadata:\n  name: s\n");
        let result = check(Vec::new())(&object);
        assert_eq!(result.grade, Grade::AllOk);
    }

    #[test]
    fn test_missing_label_is_critical() {
        let object = parse_one("kind: Service\nmetadata:\n  name: s\n");
        let result = check(vec![RequiredLabel {
            key: "team".to_string(),
            pattern: None,
        }])(&object);
        assert_eq!(result.grade, Grade::Critical);
        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].path, "");
    }

    #[test]
    fn test_pattern_match() {
        let object = parse_one(
            "kind: Service\nmetadata:\n  name: s\n  labels:\n    team: platform\n",
        );
        let matching = check(vec![RequiredLabel {
            key: "team".to_string(),
            pattern: Some("^[a-z]+$".to_string()),
        }]);
        assert_eq!(matching(&object).grade, Grade::AllOk);

        let failing = check(vec![RequiredLabel {
            key: "team".to_string(),
            pattern: Some("^[0-9]+$".to_string()),
        }]);
        assert_eq!(failing(&object).grade, Grade::Critical);
    }

    #[test]
    fn test_numeric_label_value_is_evaluated() {
        let object = parse_one(
            "kind: Service\nmetadata:\n  name: s\n  labels:\n    version: 2\n",
        );
        let result = check(vec![RequiredLabel {
            key: "version".to_string(),
            pattern: Some("^[0-9]+$".to_string()),
        }])(&object);
        assert_eq!(result.grade, Grade::AllOk);
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_literal() {
        let object = parse_one(
            "kind: Service\nmetadata:\n  name: s\n  labels:\n    team: a(b\n",
        );
        let result = check(vec![RequiredLabel {
            key: "team".to_string(),
            pattern: Some("a(b".to_string()),
        }])(&object);
        assert_eq!(result.grade, Grade::AllOk);
    }
}
