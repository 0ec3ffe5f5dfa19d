//! Client for the Fedora 3 object repository REST API, plus the metadata
//! publish hook exposed by the DOR services application.

use super::http::{build_client, join_url, read_text, send, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

#[cfg(test)]
use mockall::automock;

const SERVICE: &str = "fedora";
const PUBLISH_SERVICE: &str = "dor services";
const FOXML_FORMAT: &str = "info:fedora/fedora-system:FOXML-1.1";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectRepository: Send + Sync {
    async fn object_exists(&self, pid: &str) -> Result<bool, ServiceError>;

    /// Raw datastream content, `None` when the object has no such datastream.
    ///
    /// A missing object is `NotFound`, not `None`.
    async fn datastream_content(&self, pid: &str, dsid: &str) -> Result<Option<String>, ServiceError>;

    async fn replace_datastream(&self, pid: &str, dsid: &str, content: &str) -> Result<(), ServiceError>;

    async fn delete_object(&self, pid: &str) -> Result<(), ServiceError>;

    /// FOXML archive export of a whole object
    async fn export_object(&self, pid: &str) -> Result<String, ServiceError>;

    /// Ingest a FOXML document, returning the pid Fedora assigned
    async fn ingest_object(&self, foxml: &str) -> Result<String, ServiceError>;

    /// Re-publish derived public metadata for an object
    async fn publish_metadata(&self, pid: &str) -> Result<(), ServiceError>;
}

pub struct FedoraRepository {
    client: Client,
    base_url: String,
    services_url: String,
    user: Option<String>,
    password: Option<String>,
}

impl FedoraRepository {
    pub fn new(base_url: &str, services_url: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(SERVICE)?,
            base_url: base_url.to_string(),
            services_url: services_url.to_string(),
            user: None,
            password: None,
        })
    }

    pub fn with_credentials(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.user = user;
        self.password = password;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.user {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    fn object_url(&self, pid: &str) -> String {
        join_url(&self.base_url, &format!("objects/{pid}"))
    }

    fn datastream_url(&self, pid: &str, dsid: &str) -> String {
        join_url(&self.base_url, &format!("objects/{pid}/datastreams/{dsid}"))
    }
}

#[async_trait]
impl ObjectRepository for FedoraRepository {
    async fn object_exists(&self, pid: &str) -> Result<bool, ServiceError> {
        let request = self
            .authorize(self.client.get(self.object_url(pid)))
            .query(&[("format", "xml")]);
        match send(SERVICE, request).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn datastream_content(&self, pid: &str, dsid: &str) -> Result<Option<String>, ServiceError> {
        let url = join_url(&self.datastream_url(pid, dsid), "content");
        match send(SERVICE, self.authorize(self.client.get(url))).await {
            Ok(response) => read_text(SERVICE, response).await.map(Some),
            Err(err) if err.is_not_found() => {
                // Fedora answers 404 for a missing object and a missing datastream alike
                if self.object_exists(pid).await? {
                    Ok(None)
                } else {
                    Err(ServiceError::not_found(format!("object {pid}")))
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn replace_datastream(&self, pid: &str, dsid: &str, content: &str) -> Result<(), ServiceError> {
        let request = self
            .authorize(self.client.put(self.datastream_url(pid, dsid)))
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(content.to_string());
        send(SERVICE, request).await?;
        Ok(())
    }

    async fn delete_object(&self, pid: &str) -> Result<(), ServiceError> {
        send(SERVICE, self.authorize(self.client.delete(self.object_url(pid)))).await?;
        Ok(())
    }

    async fn export_object(&self, pid: &str) -> Result<String, ServiceError> {
        let url = join_url(&self.object_url(pid), "export");
        let request = self
            .authorize(self.client.get(url))
            .query(&[("format", FOXML_FORMAT), ("context", "archive")]);
        let response = send(SERVICE, request).await?;
        read_text(SERVICE, response).await
    }

    async fn ingest_object(&self, foxml: &str) -> Result<String, ServiceError> {
        let request = self
            .authorize(self.client.post(self.object_url("new")))
            .query(&[("format", FOXML_FORMAT)])
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(foxml.to_string());
        let response = send(SERVICE, request).await?;
        let pid = read_text(SERVICE, response).await?.trim().to_string();
        if pid.is_empty() {
            return Err(ServiceError::InvalidResponse {
                service: SERVICE,
                message: "ingest returned an empty pid".to_string(),
            });
        }
        Ok(pid)
    }

    async fn publish_metadata(&self, pid: &str) -> Result<(), ServiceError> {
        let url = join_url(&self.services_url, &format!("objects/{pid}/publish"));
        send(PUBLISH_SERVICE, self.client.post(url)).await?;
        Ok(())
    }
}
