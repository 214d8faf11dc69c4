use thiserror::Error;

/// Failure reported by (or while reaching) the hosted backend.
///
/// The backend only reports free-form messages, so the variant is derived
/// from the message text with [`RemoteError::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Permission(String),

    /// The table or relation does not exist (feature not provisioned).
    #[error("{0}")]
    MissingRelation(String),

    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("timeout") {
            Self::Timeout(message)
        } else if lower.contains("failed to fetch") || lower.contains("network") {
            Self::Network(message)
        } else if lower.contains("does not exist") || lower.contains("relation") {
            Self::MissingRelation(message)
        } else if lower.contains("permission") || lower.contains("denied") || lower.contains("rls")
        {
            Self::Permission(message)
        } else {
            Self::Other(message)
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Timeout(m)
            | Self::Network(m)
            | Self::Permission(m)
            | Self::MissingRelation(m)
            | Self::Other(m) => m,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Timeouts and connectivity failures.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network",
            Self::Permission(_) => "permission",
            Self::MissingRelation(_) => "missing_relation",
            Self::Other(_) => "other",
        }
    }
}
