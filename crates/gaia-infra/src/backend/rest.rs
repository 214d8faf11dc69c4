use std::sync::Arc;

use async_trait::async_trait;
use gaia_core::ports::{AdminFlagPort, ProfileStorePort, RemoteError};
use gaia_core::{ProfileRecord, UserId};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::{classify_transport, ensure_success};
use super::BackendClient;

async fn read_rows<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<Vec<T>, RemoteError> {
    let response = request.send().await.map_err(|e| classify_transport(&e))?;
    let response = ensure_success(response).await?;
    response
        .json::<Vec<T>>()
        .await
        .map_err(|e| RemoteError::Other(format!("invalid row payload: {e}")))
}

/// Profile rows, one per user, keyed by `id`.
pub struct HttpProfileStore {
    client: Arc<BackendClient>,
    table: String,
}

impl HttpProfileStore {
    pub fn new(client: Arc<BackendClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ProfileStorePort for HttpProfileStore {
    async fn fetch(
        &self,
        user_id: &UserId,
        columns: &[&str],
    ) -> Result<Option<ProfileRecord>, RemoteError> {
        let select = columns.join(",");
        let id_filter = format!("eq.{user_id}");
        let request = self
            .client
            .request(Method::GET, &self.client.rest_url(&self.table))
            .query(&[("select", select.as_str()), ("id", id_filter.as_str()), ("limit", "1")]);

        let mut rows: Vec<ProfileRecord> = read_rows(request).await?;
        debug!(table = %self.table, found = !rows.is_empty(), "profile row fetched");
        Ok(rows.pop())
    }

    async fn upsert(&self, row: Map<String, Value>) -> Result<Option<ProfileRecord>, RemoteError> {
        let request = self
            .client
            .request(Method::POST, &self.client.rest_url(&self.table))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[Value::Object(row)]);

        let mut rows: Vec<ProfileRecord> = read_rows(request).await?;
        Ok(rows.pop())
    }
}

/// Admin marker table: a row with the user's id grants admin.
pub struct HttpAdminTable {
    client: Arc<BackendClient>,
    table: String,
}

impl HttpAdminTable {
    pub fn new(client: Arc<BackendClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl AdminFlagPort for HttpAdminTable {
    async fn has_admin_row(&self, user_id: &UserId) -> Result<bool, RemoteError> {
        let user_filter = format!("eq.{user_id}");
        let request = self
            .client
            .request(Method::GET, &self.client.rest_url(&self.table))
            .query(&[("select", "user_id"), ("user_id", user_filter.as_str()), ("limit", "1")]);

        let rows: Vec<Value> = read_rows(request).await?;
        Ok(!rows.is_empty())
    }
}
