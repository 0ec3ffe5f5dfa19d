//! Client for the workflow status service.
//!
//! The service speaks XML over REST. A workflow document looks like
//! `<workflow id="assemblyWF"><process name="jp2-create" status="waiting"/>...</workflow>`
//! and the queue endpoint answers `<objects count="2"><object id="druid:..."/>...</objects>`.

use super::http::{build_client, join_url, read_text, send, xml_escape, xml_unescape, ServiceError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::LazyLock;

#[cfg(test)]
use mockall::automock;

const SERVICE: &str = "workflow service";

static ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(process|object)\b([^>]*?)/?>").expect("element pattern is valid")
});
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*"([^"]*)""#).expect("attribute pattern is valid")
});

#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Status of one step; a step absent from the workflow is `NotFound`
    async fn workflow_status(
        &self,
        repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
    ) -> Result<String, ServiceError>;

    async fn update_workflow_status(
        &self,
        repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
        status: &str,
    ) -> Result<(), ServiceError>;

    async fn update_workflow_error_status(
        &self,
        repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
        message: &str,
    ) -> Result<(), ServiceError>;

    /// Objects that completed `completed` and are waiting at `waiting`
    async fn objects_for_workstep(
        &self,
        completed: &str,
        waiting: &str,
        repo: &str,
        workflow: &str,
    ) -> Result<Vec<String>, ServiceError>;

    async fn delete_workflow(&self, repo: &str, druid: &str, workflow: &str) -> Result<(), ServiceError>;
}

pub struct HttpWorkflowService {
    client: Client,
    base_url: String,
}

impl HttpWorkflowService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(SERVICE)?,
            base_url: base_url.to_string(),
        })
    }

    fn workflow_url(&self, repo: &str, druid: &str, workflow: &str) -> String {
        join_url(&self.base_url, &format!("{repo}/objects/{druid}/workflows/{workflow}"))
    }

    async fn put_process(&self, url: String, body: String) -> Result<(), ServiceError> {
        let request = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(body);
        send(SERVICE, request).await?;
        Ok(())
    }
}

#[async_trait]
impl WorkflowService for HttpWorkflowService {
    async fn workflow_status(
        &self,
        repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
    ) -> Result<String, ServiceError> {
        let url = self.workflow_url(repo, druid, workflow);
        let response = send(SERVICE, self.client.get(url)).await?;
        let body = read_text(SERVICE, response).await?;

        elements(&body, "process")
            .into_iter()
            .find(|attrs| attrs.get("name").map(String::as_str) == Some(step))
            .and_then(|attrs| attrs.get("status").cloned())
            .ok_or_else(|| ServiceError::not_found(format!("{workflow}:{step} for {druid}")))
    }

    async fn update_workflow_status(
        &self,
        repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
        status: &str,
    ) -> Result<(), ServiceError> {
        let url = join_url(&self.workflow_url(repo, druid, workflow), step);
        let body = format!(
            r#"<process name="{}" status="{}"/>"#,
            xml_escape(step),
            xml_escape(status)
        );
        self.put_process(url, body).await
    }

    async fn update_workflow_error_status(
        &self,
        repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
        message: &str,
    ) -> Result<(), ServiceError> {
        let url = join_url(&self.workflow_url(repo, druid, workflow), step);
        let body = format!(
            r#"<process name="{}" status="error" errorMessage="{}"/>"#,
            xml_escape(step),
            xml_escape(message)
        );
        self.put_process(url, body).await
    }

    async fn objects_for_workstep(
        &self,
        completed: &str,
        waiting: &str,
        repo: &str,
        workflow: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let url = join_url(&self.base_url, "workflow_queue");
        let request = self.client.get(url).query(&[
            ("waiting", format!("{repo}:{workflow}:{waiting}")),
            ("completed", format!("{repo}:{workflow}:{completed}")),
        ]);
        let response = send(SERVICE, request).await?;
        let body = read_text(SERVICE, response).await?;

        Ok(elements(&body, "object")
            .into_iter()
            .filter_map(|mut attrs| attrs.remove("id"))
            .collect())
    }

    async fn delete_workflow(&self, repo: &str, druid: &str, workflow: &str) -> Result<(), ServiceError> {
        let url = self.workflow_url(repo, druid, workflow);
        send(SERVICE, self.client.delete(url)).await?;
        Ok(())
    }
}

/// Attributes of every `<name .../>` element in `xml`
fn elements(xml: &str, name: &str) -> Vec<HashMap<String, String>> {
    ELEMENT
        .captures_iter(xml)
        .filter(|caps| &caps[1] == name)
        .map(|caps| {
            ATTRIBUTE
                .captures_iter(&caps[2])
                .map(|attr| (attr[1].to_string(), xml_unescape(&attr[2])))
                .collect()
        })
        .collect()
}
