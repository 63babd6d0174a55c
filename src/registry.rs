use serde::Serialize;

use crate::checks::PodTemplate;
use crate::error::GraderError;
use crate::parser::ParsedObject;
use crate::scorecard::CheckResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckMeta {
    pub name: String,
    pub doc: String,
}

pub enum CheckFn {
    /// Runs once per parsed object.
    Object(Box<dyn Fn(&ParsedObject) -> CheckResult + Send + Sync>),
    /// Runs once per object that yields a pod template. The engine performs
    /// the extraction; objects without a template are skipped.
    Pod(Box<dyn Fn(&PodTemplate<'_>) -> CheckResult + Send + Sync>),
}

pub struct Check {
    pub meta: CheckMeta,
    pub func: CheckFn,
}

impl Check {
    pub fn target(&self) -> &'static str {
        match self.func {
            CheckFn::Object(_) => "object",
            CheckFn::Pod(_) => "pod",
        }
    }
}

/// The check catalog. Built once at startup and then only read; the engine
/// borrows it for the duration of a run.
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Check>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_object_check<F>(
        &mut self,
        name: &str,
        doc: &str,
        func: F,
    ) -> Result<(), GraderError>
    where
        F: Fn(&ParsedObject) -> CheckResult + Send + Sync + 'static,
    {
        self.register(name, doc, CheckFn::Object(Box::new(func)))
    }

    pub fn register_pod_check<F>(
        &mut self,
        name: &str,
        doc: &str,
        func: F,
    ) -> Result<(), GraderError>
    where
        F: Fn(&PodTemplate<'_>) -> CheckResult + Send + Sync + 'static,
    {
        self.register(name, doc, CheckFn::Pod(Box::new(func)))
    }

    fn register(&mut self, name: &str, doc: &str, func: CheckFn) -> Result<(), GraderError> {
        if self.checks.iter().any(|check| check.meta.name == name) {
            return Err(GraderError::DuplicateCheck(name.to_string()));
        }
        self.checks.push(Check {
            meta: CheckMeta {
                name: name.to_string(),
                doc: doc.to_string(),
            },
            func,
        });
        Ok(())
    }

    /// The catalog in registration order, used for both execution and for
    /// generating the `--list-checks` documentation.
    pub fn enumerate(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
