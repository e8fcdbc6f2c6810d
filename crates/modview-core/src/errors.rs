use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Schema resolution
    /// The codec has no mapping for a change-tree key or output step
    UnknownChild,

    // Payload translation
    /// A payload is structurally inconsistent with its codec
    Deserialization,

    // Collaborator defects
    /// A collaborator broke a contract the engine relies on
    InvariantViolation,

    // Input / configuration
    InvalidInput,
    InvalidConfig,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownChild => "ERR_UNKNOWN_CHILD",
            ExErrorKind::Deserialization => "ERR_DESERIALIZATION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context about where in the change
/// tree or output addressing scheme the failure happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    key: Option<String>,
    step: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key: None,
            step: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add change-tree key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add output step context
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the change-tree key context, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the output step context, if any
    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(step) = &self.step {
            write!(f, " (step: {})", step)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised while resolving, deserializing and projecting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    // ===== Schema resolution =====
    /// A change-tree key has no counterpart in the parent codec
    #[error("Codec {codec} has no child for key {key}")]
    UnknownChild { codec: String, key: String },

    /// An output step has no counterpart in the parent codec
    #[error("Codec {codec} has no child for step {step}")]
    UnknownStep { codec: String, step: String },

    // ===== Payload translation =====
    /// Payload body does not match the shape the codec expects
    #[error("Codec {codec} expected a {expected} payload, found {found}")]
    PayloadMismatch {
        codec: String,
        expected: String,
        found: String,
    },

    /// A payload child is not declared by the codec's schema
    #[error("Codec {codec} does not declare payload child {key}")]
    UndeclaredPayloadChild { codec: String, key: String },

    // ===== Collaborator defects =====
    /// An unmodified change-tree node reached the kind resolver
    #[error("Unmodified node {key} cannot be projected")]
    UnmodifiedNode { key: String },

    /// An object step decomposed into no change-tree hops
    #[error("Step {step} decomposed into zero change-tree hops")]
    EmptyStepDecomposition { step: String },

    /// A step decomposition produced a transparent target codec
    #[error("Step {step} resolved to a transparent codec")]
    TransparentStepTarget { step: String },

    /// An aggregate-only operation was invoked on another codec kind
    #[error("Codec {codec} is not an aggregate codec")]
    NotAnAggregate { codec: String },

    // ===== Input / configuration =====
    /// Schema definition declares the same child twice
    #[error("Schema node {parent} declares child {name} more than once")]
    DuplicateSchemaChild { parent: String, name: String },

    /// Configuration text could not be parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Conversion from ProjectionError to ExError
impl From<ProjectionError> for ExError {
    fn from(err: ProjectionError) -> Self {
        let message = err.to_string();
        match err {
            ProjectionError::UnknownChild { codec, key } => {
                ExError::new(ExErrorKind::UnknownChild)
                    .with_op("resolve_child")
                    .with_key(key)
                    .with_message(format!("Unknown child (codec {})", codec))
            }

            ProjectionError::UnknownStep { codec, step } => {
                ExError::new(ExErrorKind::UnknownChild)
                    .with_op("child_for_step")
                    .with_step(step)
                    .with_message(format!("Unknown step (codec {})", codec))
            }

            ProjectionError::PayloadMismatch { .. } => ExError::new(ExErrorKind::Deserialization)
                .with_op("deserialize")
                .with_message(message),

            ProjectionError::UndeclaredPayloadChild { key, .. } => {
                ExError::new(ExErrorKind::Deserialization)
                    .with_op("deserialize")
                    .with_key(key)
                    .with_message(message)
            }

            ProjectionError::UnmodifiedNode { key } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_op("resolve_kind")
                    .with_key(key)
                    .with_message(message)
            }

            ProjectionError::EmptyStepDecomposition { step }
            | ProjectionError::TransparentStepTarget { step } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_op("lookup")
                    .with_step(step)
                    .with_message(message)
            }

            ProjectionError::NotAnAggregate { .. } => {
                ExError::new(ExErrorKind::InvariantViolation).with_message(message)
            }

            ProjectionError::DuplicateSchemaChild { .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("build_schema")
                    .with_message(message)
            }

            ProjectionError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Deserialization).with_message(err.to_string())
    }
}
