// In-memory service fakes shared by unit tests

use crate::services::{ObjectRepository, SearchIndex, ServiceError, Services, WorkflowService};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

fn boom(what: &str) -> ServiceError {
    ServiceError::Http {
        service: "fake",
        status: 500,
        url: format!("fake://{what}"),
        body: "internal error".to_string(),
    }
}

/// Workflow fake keyed by (druid, workflow, step)
#[derive(Default)]
pub struct FakeWorkflowService {
    pub statuses: Mutex<BTreeMap<(String, String, String), String>>,
    pub queue: Mutex<BTreeMap<String, Vec<String>>>,
    pub failing: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeWorkflowService {
    pub fn set_status(&self, druid: &str, workflow: &str, step: &str, status: &str) {
        self.statuses.lock().unwrap().insert(
            (druid.to_string(), workflow.to_string(), step.to_string()),
            status.to_string(),
        );
    }

    pub fn status(&self, druid: &str, workflow: &str, step: &str) -> Option<String> {
        self.statuses
            .lock()
            .unwrap()
            .get(&(druid.to_string(), workflow.to_string(), step.to_string()))
            .cloned()
    }

    pub fn fail_for(&self, druid: &str) {
        self.failing.lock().unwrap().insert(druid.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, druid: &str, call: String) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.lock().unwrap().contains(druid) {
            return Err(boom(&call));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowService for FakeWorkflowService {
    async fn workflow_status(
        &self,
        _repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
    ) -> Result<String, ServiceError> {
        self.check(druid, format!("status {druid} {workflow}:{step}"))?;
        self.status(druid, workflow, step)
            .ok_or_else(|| ServiceError::not_found(format!("{workflow}:{step}")))
    }

    async fn update_workflow_status(
        &self,
        _repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
        status: &str,
    ) -> Result<(), ServiceError> {
        self.check(druid, format!("update {druid} {workflow}:{step}={status}"))?;
        self.set_status(druid, workflow, step, status);
        Ok(())
    }

    async fn update_workflow_error_status(
        &self,
        _repo: &str,
        druid: &str,
        workflow: &str,
        step: &str,
        _message: &str,
    ) -> Result<(), ServiceError> {
        self.check(druid, format!("error {druid} {workflow}:{step}"))?;
        self.set_status(druid, workflow, step, "error");
        Ok(())
    }

    async fn objects_for_workstep(
        &self,
        _completed: &str,
        waiting: &str,
        _repo: &str,
        _workflow: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.calls.lock().unwrap().push(format!("queue {waiting}"));
        Ok(self.queue.lock().unwrap().get(waiting).cloned().unwrap_or_default())
    }

    async fn delete_workflow(&self, _repo: &str, druid: &str, workflow: &str) -> Result<(), ServiceError> {
        self.check(druid, format!("delete-workflow {druid} {workflow}"))?;
        self.statuses
            .lock()
            .unwrap()
            .retain(|(d, w, _), _| !(d == druid && w == workflow));
        Ok(())
    }
}

/// Repository fake: objects map pid -> datastreams
#[derive(Default)]
pub struct FakeRepository {
    pub objects: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    pub failing: Mutex<HashSet<String>>,
    pub published: Mutex<Vec<String>>,
    pub ingested: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub fn add_object(&self, pid: &str, datastreams: &[(&str, &str)]) {
        self.objects.lock().unwrap().insert(
            pid.to_string(),
            datastreams
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }

    pub fn datastream(&self, pid: &str, dsid: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(pid)
            .and_then(|ds| ds.get(dsid).cloned())
    }

    pub fn contains(&self, pid: &str) -> bool {
        self.objects.lock().unwrap().contains_key(pid)
    }

    pub fn fail_for(&self, pid: &str) {
        self.failing.lock().unwrap().insert(pid.to_string());
    }

    fn check(&self, pid: &str) -> Result<(), ServiceError> {
        if self.failing.lock().unwrap().contains(pid) {
            return Err(boom(pid));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectRepository for FakeRepository {
    async fn object_exists(&self, pid: &str) -> Result<bool, ServiceError> {
        self.check(pid)?;
        Ok(self.contains(pid))
    }

    async fn datastream_content(&self, pid: &str, dsid: &str) -> Result<Option<String>, ServiceError> {
        self.check(pid)?;
        if !self.contains(pid) {
            return Err(ServiceError::not_found(format!("object {pid}")));
        }
        Ok(self.datastream(pid, dsid))
    }

    async fn replace_datastream(&self, pid: &str, dsid: &str, content: &str) -> Result<(), ServiceError> {
        self.check(pid)?;
        let mut objects = self.objects.lock().unwrap();
        let datastreams = objects
            .get_mut(pid)
            .ok_or_else(|| ServiceError::not_found(pid.to_string()))?;
        datastreams.insert(dsid.to_string(), content.to_string());
        Ok(())
    }

    async fn delete_object(&self, pid: &str) -> Result<(), ServiceError> {
        self.check(pid)?;
        self.objects
            .lock()
            .unwrap()
            .remove(pid)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(pid.to_string()))
    }

    async fn export_object(&self, pid: &str) -> Result<String, ServiceError> {
        self.check(pid)?;
        if !self.contains(pid) {
            return Err(ServiceError::not_found(pid.to_string()));
        }
        Ok(format!(r#"<foxml:digitalObject PID="{pid}"/>"#))
    }

    async fn ingest_object(&self, foxml: &str) -> Result<String, ServiceError> {
        let pid = foxml
            .split("PID=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap_or("druid:zz999zz9999")
            .to_string();
        self.check(&pid)?;
        self.ingested.lock().unwrap().push(pid.clone());
        self.add_object(&pid, &[]);
        Ok(pid)
    }

    async fn publish_metadata(&self, pid: &str) -> Result<(), ServiceError> {
        self.check(pid)?;
        self.published.lock().unwrap().push(pid.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSearchIndex {
    pub docs: Mutex<BTreeMap<String, Value>>,
    pub commits: Mutex<usize>,
}

impl FakeSearchIndex {
    pub fn add(&self, doc: Value) {
        let id = doc["id"].as_str().unwrap_or_default().to_string();
        self.docs.lock().unwrap().insert(id, doc);
    }

    pub fn commit_count(&self) -> usize {
        *self.commits.lock().unwrap()
    }
}

#[async_trait]
impl SearchIndex for FakeSearchIndex {
    async fn query_by_source_id(&self, source_id: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc["source_id_t"].as_str() == Some(source_id))
            .filter_map(|doc| doc["id"].as_str().map(str::to_string))
            .collect())
    }

    async fn find_document(&self, pid: &str) -> Result<Option<Value>, ServiceError> {
        Ok(self.docs.lock().unwrap().get(pid).cloned())
    }

    async fn query(&self, _q: &str, rows: usize) -> Result<Vec<Value>, ServiceError> {
        Ok(self.docs.lock().unwrap().values().take(rows).cloned().collect())
    }

    async fn delete_document(&self, pid: &str) -> Result<(), ServiceError> {
        self.docs.lock().unwrap().remove(pid);
        Ok(())
    }

    async fn add_document(&self, doc: &Value) -> Result<(), ServiceError> {
        self.add(doc.clone());
        Ok(())
    }

    async fn commit(&self) -> Result<(), ServiceError> {
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
}

pub struct FakeServices {
    pub workflow: Arc<FakeWorkflowService>,
    pub repository: Arc<FakeRepository>,
    pub search: Arc<FakeSearchIndex>,
}

impl FakeServices {
    pub fn new() -> Self {
        Self {
            workflow: Arc::new(FakeWorkflowService::default()),
            repository: Arc::new(FakeRepository::default()),
            search: Arc::new(FakeSearchIndex::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            workflow: self.workflow.clone(),
            repository: self.repository.clone(),
            search: self.search.clone(),
            repo: "dor".to_string(),
        }
    }
}
