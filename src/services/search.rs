//! Client for the Solr search index.

use super::http::{build_client, join_url, send, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

#[cfg(test)]
use mockall::automock;

const SERVICE: &str = "solr";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Internal ids of objects carrying the given external source id
    async fn query_by_source_id(&self, source_id: &str) -> Result<Vec<String>, ServiceError>;

    async fn find_document(&self, pid: &str) -> Result<Option<Value>, ServiceError>;

    async fn query(&self, q: &str, rows: usize) -> Result<Vec<Value>, ServiceError>;

    async fn delete_document(&self, pid: &str) -> Result<(), ServiceError>;

    async fn add_document(&self, doc: &Value) -> Result<(), ServiceError>;

    async fn commit(&self) -> Result<(), ServiceError>;
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(default)]
    docs: Vec<Value>,
}

pub struct SolrIndex {
    client: Client,
    base_url: String,
}

impl SolrIndex {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(SERVICE)?,
            base_url: base_url.to_string(),
        })
    }

    async fn select(&self, params: &[(&str, String)]) -> Result<Vec<Value>, ServiceError> {
        let request = self
            .client
            .get(join_url(&self.base_url, "select"))
            .query(params)
            .query(&[("wt", "json")]);
        let response = send(SERVICE, request).await?;
        let parsed: SelectResponse = response.json().await.map_err(|err| ServiceError::InvalidResponse {
            service: SERVICE,
            message: err.to_string(),
        })?;
        Ok(parsed.response.docs)
    }

    async fn update(&self, body: Value) -> Result<(), ServiceError> {
        let request = self.client.post(join_url(&self.base_url, "update")).json(&body);
        send(SERVICE, request).await?;
        Ok(())
    }
}

/// Quote a value as a Solr phrase
fn phrase(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait]
impl SearchIndex for SolrIndex {
    async fn query_by_source_id(&self, source_id: &str) -> Result<Vec<String>, ServiceError> {
        let docs = self
            .select(&[
                ("q", format!("source_id_t:{}", phrase(source_id))),
                ("fl", "id".to_string()),
            ])
            .await?;
        Ok(docs
            .iter()
            .filter_map(|doc| doc.get("id").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    async fn find_document(&self, pid: &str) -> Result<Option<Value>, ServiceError> {
        let mut docs = self
            .select(&[("q", format!("id:{}", phrase(pid))), ("rows", "1".to_string())])
            .await?;
        Ok(if docs.is_empty() { None } else { Some(docs.remove(0)) })
    }

    async fn query(&self, q: &str, rows: usize) -> Result<Vec<Value>, ServiceError> {
        self.select(&[("q", q.to_string()), ("rows", rows.to_string())]).await
    }

    async fn delete_document(&self, pid: &str) -> Result<(), ServiceError> {
        self.update(json!({ "delete": { "id": pid } })).await
    }

    async fn add_document(&self, doc: &Value) -> Result<(), ServiceError> {
        self.update(json!({ "add": { "doc": doc } })).await
    }

    async fn commit(&self) -> Result<(), ServiceError> {
        self.update(json!({ "commit": {} })).await
    }
}

/// Internal ids for every source id, in lookup order
pub async fn druids_by_source_id<S: AsRef<str>>(
    search: &dyn SearchIndex,
    source_ids: &[S],
) -> Result<Vec<String>, ServiceError> {
    let mut druids = Vec::new();
    for source_id in source_ids {
        druids.extend(search.query_by_source_id(source_id.as_ref()).await?);
    }
    Ok(druids)
}
