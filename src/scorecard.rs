use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::CheckMeta;

/// Graded severity of one check result. The numeric encoding is part of the
/// report format and is relied on by exit-code thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Grade {
    Critical = 1,
    Warning = 5,
    AllOk = 10,
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> u8 {
        grade as u8
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(Grade::Critical),
            5 => Ok(Grade::Warning),
            10 => Ok(Grade::AllOk),
            other => Err(format!("invalid grade value {other}")),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grade::Critical => "CRITICAL",
            Grade::Warning => "WARNING",
            Grade::AllOk => "OK",
        })
    }
}

/// One remediation finding. `path` is the container name, or empty for
/// object-wide findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub path: String,
    pub summary: String,
    pub description: String,
}

/// What a check function produces for one object. The engine tags it with the
/// check's metadata to form a [`TestScore`]. Every invocation gets a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub grade: Grade,
    pub comments: Vec<Comment>,
}

impl CheckResult {
    pub fn ok() -> Self {
        Self {
            grade: Grade::AllOk,
            comments: Vec::new(),
        }
    }

    pub fn add_comment(&mut self, path: &str, summary: &str, description: &str) {
        self.comments.push(Comment {
            path: path.to_string(),
            summary: summary.to_string(),
            description: description.to_string(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestScore {
    pub check: CheckMeta,
    pub grade: Grade,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectScore {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub checks: Vec<TestScore>,
}

/// All scores for one run, in parse order. Objects sharing kind/name/namespace
/// stay separate entries, which matters for expanded "List" inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scorecard(pub Vec<ObjectScore>);

impl Scorecard {
    pub fn push(&mut self, score: ObjectScore) {
        self.0.push(score);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectScore> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The worst grade in the card, if any checks ran at all.
    pub fn lowest_grade(&self) -> Option<Grade> {
        self.iter()
            .flat_map(|object| &object.checks)
            .map(|score| score.grade)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_numeric_encoding() {
        assert_eq!(serde_json::to_value(Grade::Critical).unwrap(), 1);
        assert_eq!(serde_json::to_value(Grade::Warning).unwrap(), 5);
        assert_eq!(serde_json::to_value(Grade::AllOk).unwrap(), 10);

        for grade in [Grade::Critical, Grade::Warning, Grade::AllOk] {
            let encoded = serde_json::to_value(grade).unwrap();
            let decoded: Grade = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, grade);
        }

        assert!(serde_json::from_value::<Grade>(serde_json::json!(7)).is_err());
    }

    #[test]
    fn test_grade_ordering() {
        assert!(Grade::Critical < Grade::Warning);
        assert!(Grade::Warning < Grade::AllOk);
    }

    #[test]
    fn test_lowest_grade() {
        let mut card = Scorecard::default();
        assert_eq!(card.lowest_grade(), None);

        let score = |grade| TestScore {
            check: CheckMeta {
                name: "c".to_string(),
                doc: String::new(),
            },
            grade,
            comments: Vec::new(),
        };
        card.push(ObjectScore {
            kind: "Pod".to_string(),
            name: "a".to_string(),
            namespace: String::new(),
            checks: vec![score(Grade::AllOk), score(Grade::Warning)],
        });
        assert_eq!(card.lowest_grade(), Some(Grade::Warning));
    }
}
