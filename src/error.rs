use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraderError {
    #[error("duplicate check name '{0}'")]
    DuplicateCheck(String),
    #[error("failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("manifest document has no kind")]
    MissingKind,
    #[error("failed to load config: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
