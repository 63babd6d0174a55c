use tracing::debug;

use crate::checks::PodTemplate;
use crate::parser::ParsedObject;
use crate::registry::{CheckFn, CheckRegistry};
use crate::scorecard::{ObjectScore, Scorecard, TestScore};

/// Runs the registered checks over a parsed object set. Holds only a borrow of
/// the read-only registry; a fresh [`Scorecard`] is produced per call.
pub struct ScoreEngine<'a> {
    registry: &'a CheckRegistry,
}

impl<'a> ScoreEngine<'a> {
    pub fn new(registry: &'a CheckRegistry) -> Self {
        Self { registry }
    }

    pub fn score(&self, objects: &[ParsedObject]) -> Scorecard {
        let mut card = Scorecard::default();

        for object in objects {
            let ignore = object.ignore_filter();
            if ignore.object_ignored() {
                debug!(
                    kind = %object.kind,
                    name = %object.name,
                    "object ignored via annotation"
                );
                continue;
            }

            let template = PodTemplate::extract(object);
            let mut checks = Vec::new();

            for check in self.registry.enumerate() {
                if ignore.check_ignored(&check.meta.name) {
                    debug!(
                        kind = %object.kind,
                        name = %object.name,
                        check = %check.meta.name,
                        "check ignored via annotation"
                    );
                    continue;
                }
                let result = match &check.func {
                    CheckFn::Object(func) => func(object),
                    CheckFn::Pod(func) => match &template {
                        Some(template) => func(template),
                        None => continue,
                    },
                };
                checks.push(TestScore {
                    check: check.meta.clone(),
                    grade: result.grade,
                    comments: result.comments,
                });
            }

            card.push(ObjectScore {
                kind: object.kind.clone(),
                name: object.name.clone(),
                namespace: object.namespace.clone(),
                checks,
            });
        }

        card
    }
}
