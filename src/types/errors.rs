use std::fmt;

// === HostError ===

/// Errors reported by the host tab platform.
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// No live tab has the given handle.
    TabNotFound(i64),
    /// The host rejected or failed an operation.
    Failed(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::TabNotFound(handle) => write!(f, "Host tab not found: {}", handle),
            HostError::Failed(msg) => write!(f, "Host operation failed: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}

// === StoreError ===

/// Errors related to reading or writing the persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Failed to serialize or deserialize the snapshot.
    SerializationError(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::SerializationError(msg) => {
                write!(f, "Snapshot serialization error: {}", msg)
            }
            StoreError::DatabaseError(msg) => write!(f, "Snapshot database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// === EngineError ===

/// Errors returned by workspace commands and event handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine has not finished restoring.
    NotReady,
    /// The provided group index is out of bounds.
    InvalidGroupIndex(usize),
    /// The tab is not a member of the given group.
    TabNotInGroup { tab: i64, group: usize },
    /// A host platform call failed.
    Host(HostError),
    /// Persisting or loading the snapshot failed.
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotReady => write!(f, "Workspace engine is not ready"),
            EngineError::InvalidGroupIndex(index) => write!(f, "Invalid group index: {}", index),
            EngineError::TabNotInGroup { tab, group } => {
                write!(f, "Tab {} is not in group {}", tab, group)
            }
            EngineError::Host(err) => write!(f, "{}", err),
            EngineError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Host(err) => Some(err),
            EngineError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for EngineError {
    fn from(err: HostError) -> Self {
        EngineError::Host(err)
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
