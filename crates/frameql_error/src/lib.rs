use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Classification for errors surfaced to callers.
///
/// Statement handlers and API callers branch on this, so new variants should
/// only be added when a caller can do something different with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// A create was attempted on a name that is already bound.
    RelationAlreadyExists,
    /// Name isn't bound in the catalog.
    RelationNotFound,
    /// Name is bound, but to a different kind of relation (e.g. DROP VIEW on a
    /// table).
    WrongRelationType,
    /// No reader registered for the requested format.
    UnsupportedFormat,
    /// An option required by the chosen format was not provided.
    MissingRequiredOption,
    /// An option was provided with a value that couldn't be used.
    InvalidOption,
    /// Published dataset doesn't exist (or was unpublished).
    SourceNotFound,
    /// The accelerated backend was requested but isn't available in this
    /// process.
    AcceleratedBackendUnavailable,
    /// A lazy relation would read from itself, directly or through other
    /// lazy relations.
    CyclicReference,
    /// Failed to parse or plan a statement.
    Parse,
    /// Failed to read underlying data.
    Io,
    #[default]
    Other,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RelationAlreadyExists => "relation already exists",
            Self::RelationNotFound => "relation not found",
            Self::WrongRelationType => "wrong relation type",
            Self::UnsupportedFormat => "unsupported format",
            Self::MissingRequiredOption => "missing required option",
            Self::InvalidOption => "invalid option",
            Self::SourceNotFound => "source not found",
            Self::AcceleratedBackendUnavailable => "accelerated backend unavailable",
            Self::CyclicReference => "cyclic relation reference",
            Self::Parse => "parse error",
            Self::Io => "io error",
            Self::Other => "error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

#[derive(Debug)]
struct DbErrorInner {
    kind: ErrorKind,
    msg: String,
    source: Option<Box<dyn Error + Send + Sync>>,
    /// Additional key/value pairs providing context for the error.
    fields: Vec<(String, String)>,
    backtrace: Backtrace,
}

impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                kind: ErrorKind::Other,
                msg: msg.into(),
                source: None,
                fields: Vec::new(),
                backtrace: Backtrace::capture(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.inner.kind = kind;
        self
    }

    /// Attach a key/value pair to the error.
    pub fn with_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn relation_already_exists(name: impl fmt::Display) -> Self {
        Self::new(format!("Relation '{name}' already exists"))
            .with_kind(ErrorKind::RelationAlreadyExists)
    }

    pub fn relation_not_found(name: impl fmt::Display) -> Self {
        Self::new(format!("Missing relation '{name}'")).with_kind(ErrorKind::RelationNotFound)
    }

    pub fn unsupported_format(format: impl fmt::Display) -> Self {
        Self::new(format!("Unsupported format '{format}'")).with_kind(ErrorKind::UnsupportedFormat)
    }

    pub fn missing_option(key: impl fmt::Display) -> Self {
        Self::new(format!("Missing required option '{key}'"))
            .with_kind(ErrorKind::MissingRequiredOption)
    }

    pub fn invalid_option(key: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(format!("Invalid value for option '{key}': {reason}"))
            .with_kind(ErrorKind::InvalidOption)
    }

    pub fn source_not_found(name: impl fmt::Display) -> Self {
        Self::new(format!("Missing published dataset '{name}'"))
            .with_kind(ErrorKind::SourceNotFound)
    }

    pub fn cyclic_reference(name: impl fmt::Display) -> Self {
        Self::new(format!("Relation '{name}' cannot reference itself"))
            .with_kind(ErrorKind::CyclicReference)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(msg).with_kind(ErrorKind::Parse)
    }

    pub fn io(msg: impl Into<String>, source: std::io::Error) -> Self {
        Self::with_source(msg, Box::new(source)).with_kind(ErrorKind::Io)
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn message(&self) -> &str {
        &self.inner.msg
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Errors stemming from invalid statement options or formats, as opposed to
    /// conflicts with existing catalog state.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.inner.kind,
            ErrorKind::UnsupportedFormat
                | ErrorKind::MissingRequiredOption
                | ErrorKind::InvalidOption
        )
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.inner.backtrace
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        for (key, value) in &self.inner.fields {
            write!(f, "\n  {key}: {value}")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }

        if self.inner.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\nBacktrace: {}", self.inner.backtrace)?;
        }

        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for DbError {
    fn from(value: fmt::Error) -> Self {
        Self::with_source("Format error", Box::new(value))
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::io("IO error", value)
    }
}

/// Attach context to an error.
pub trait ResultExt<T, E> {
    /// Wrap the error with a message, keeping the original as the source.
    fn context(self, msg: &'static str) -> Result<T, DbError>;
}

impl<T, E: Error + Send + Sync + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn context(self, msg: &'static str) -> Result<T, DbError> {
        self.map_err(|e| DbError::with_source(msg, Box::new(e)))
    }
}

pub trait OptionExt<T> {
    /// Errors if the value is None, using `msg` to describe what was missing.
    fn required(self, msg: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::new(format!("Missing required value: {msg}"))),
        }
    }
}
