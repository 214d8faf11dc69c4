use thiserror::Error;

/// Local key/value storage errors.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// Storage is disabled or cannot be opened.
    #[error("local storage unavailable: {0}")]
    Unavailable(String),

    #[error("local storage full")]
    QuotaExceeded,

    #[error("local storage failed: {0}")]
    Other(String),
}

/// Client-local string key/value storage.
///
/// Synchronous on purpose: the store is local and small, and callers treat
/// every failure as best-effort.
pub trait LocalStorePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}

#[cfg(test)]
mockall::mock! {
    pub LocalStore {}

    impl LocalStorePort for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;
        fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;
        fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn mock_store_reports_quota_errors() {
        let mut store = MockLocalStore::new();
        store
            .expect_set()
            .with(eq("k"), eq("v"))
            .returning(|_, _| Err(LocalStoreError::QuotaExceeded));

        let err = store.set("k", "v").unwrap_err();

        assert_eq!(err.to_string(), "local storage full");
    }
}
