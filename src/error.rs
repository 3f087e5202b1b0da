use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("cannot resolve a package: {message}")]
    PackageResolution { message: String },

    #[error("no active resource; pick up a page class first")]
    NoActiveResource,

    #[error("current resource is not a Java source file: {}", .path.display())]
    ResourceTypeMismatch { path: PathBuf },

    #[error("current resource is not a class (found {kind})")]
    UnsupportedKind { kind: String },

    #[error("unsupported construct in class body: {what}")]
    UnsupportedConstruct { what: String },

    #[error("malformed source: {message}")]
    MalformedSource { message: String },

    #[error("field '{name}' already exists in {class}")]
    NameConflict { name: String, class: String },

    #[error("argument '{key}' already set on @{annotation}")]
    ArgumentConflict { key: String, annotation: String },

    #[error("malformed locator '{spec}': {reason}")]
    MalformedArgument { spec: String, reason: String },

    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("page already exists: {}", .path.display())]
    PageExists { path: PathBuf },

    #[error("unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("{command}: missing required option --{param}")]
    MissingArgument { command: String, param: String },

    #[error("{command}: {message}")]
    InvalidArguments { command: String, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScaffoldError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
