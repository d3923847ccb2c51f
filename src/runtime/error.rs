use std::fmt;

/// Enumerates the stages of a catalog sync in which a fatal error can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Configure,
    Fetch,
    Normalize,
    Persist,
}

/// Typed failures raised by the sync pipeline. Every instance is fatal for the job.
///
/// Carried inside [`anyhow::Error`]; callers recover the variant with `downcast_ref`.
#[derive(Debug)]
pub enum SyncError {
    /// A required credential is absent from the environment.
    MissingCredential { variable: &'static str },
    /// The provider wrapped an explicit error indicator where a list was expected.
    Provider {
        endpoint: String,
        page: u32,
        message: String,
    },
    /// The provider answered with something that is neither a list nor an error object.
    UnexpectedPayload { endpoint: String, page: u32 },
    /// A record is missing a required field or has the wrong shape.
    InvalidRecord {
        catalog: &'static str,
        position: usize,
        reason: String,
    },
    /// The blob store rejected a directory creation or a file write.
    Persist {
        catalog: &'static str,
        source: anyhow::Error,
    },
}

impl SyncError {
    pub fn stage(&self) -> SyncStage {
        match self {
            SyncError::MissingCredential { .. } => SyncStage::Configure,
            SyncError::Provider { .. } | SyncError::UnexpectedPayload { .. } => SyncStage::Fetch,
            SyncError::InvalidRecord { .. } => SyncStage::Normalize,
            SyncError::Persist { .. } => SyncStage::Persist,
        }
    }

    /// Stage an arbitrary job failure belongs to. Untyped failures come from the
    /// transport, so they are attributed to [`SyncStage::Fetch`].
    pub fn stage_of(err: &anyhow::Error) -> SyncStage {
        err.downcast_ref::<SyncError>()
            .map(SyncError::stage)
            .unwrap_or(SyncStage::Fetch)
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncStage::Configure => "configure",
            SyncStage::Fetch => "fetch",
            SyncStage::Normalize => "normalize",
            SyncStage::Persist => "persist",
        })
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::MissingCredential { variable } => {
                write!(f, "environment variable {variable} is required")
            }
            SyncError::Provider {
                endpoint,
                page,
                message,
            } => write!(f, "provider error on {endpoint} page {page}: {message}"),
            SyncError::UnexpectedPayload { endpoint, page } => {
                write!(f, "{endpoint} page {page} did not return a JSON array")
            }
            SyncError::InvalidRecord {
                catalog,
                position,
                reason,
            } => write!(f, "invalid {catalog} record at position {position}: {reason}"),
            SyncError::Persist { catalog, source } => {
                write!(f, "failed to persist {catalog} catalog: {source}")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Persist { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
