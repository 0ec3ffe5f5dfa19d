//! HTTP contract tests for the service clients
//!
//! Each client is pointed at a wiremock server so requests and responses are
//! checked without any real repository services.

use dor_admin::services::{
    FedoraRepository, HttpWorkflowService, ObjectRepository, SearchIndex, SolrIndex, WorkflowService,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DRUID: &str = "druid:aa000aa0001";

const WORKFLOW_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workflow repository="dor" objectId="druid:aa000aa0001" id="assemblyWF">
  <process name="start-assembly" status="completed" lifecycle="pipelined"/>
  <process name="jp2-create" status="error" errorMessage="Integration testing"/>
</workflow>"#;

#[tokio::test]
async fn test_workflow_status_reads_process_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/dor/objects/{DRUID}/workflows/assemblyWF")))
        .respond_with(ResponseTemplate::new(200).set_body_string(WORKFLOW_XML))
        .mount(&server)
        .await;

    let client = HttpWorkflowService::new(&server.uri()).unwrap();

    let status = client
        .workflow_status("dor", DRUID, "assemblyWF", "start-assembly")
        .await
        .unwrap();
    assert_eq!(status, "completed");

    let missing = client
        .workflow_status("dor", DRUID, "assemblyWF", "exif-collect")
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_workflow_status_http_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = HttpWorkflowService::new(&server.uri()).unwrap();
    let err = client
        .workflow_status("dor", DRUID, "assemblyWF", "jp2-create")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_workflow_error_status_sends_process_xml() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/dor/objects/{DRUID}/workflows/assemblyWF/jp2-create")))
        .and(body_string(
            r#"<process name="jp2-create" status="error" errorMessage="Integration testing"/>"#,
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpWorkflowService::new(&server.uri()).unwrap();
    client
        .update_workflow_error_status("dor", DRUID, "assemblyWF", "jp2-create", "Integration testing")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_workflow_status_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = HttpWorkflowService::new(&server.uri()).unwrap();
    let err = client
        .update_workflow_status("dor", DRUID, "assemblyWF", "jp2-create", "waiting")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn test_objects_for_workstep_queries_queue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workflow_queue"))
        .and(query_param("waiting", "dor:assemblyWF:jp2-create"))
        .and(query_param("completed", "dor:assemblyWF:start-assembly"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<objects count="2"><object id="druid:aa000aa0001" url="x"/><object id="druid:bb111bb1111"/></objects>"#,
        ))
        .mount(&server)
        .await;

    let client = HttpWorkflowService::new(&server.uri()).unwrap();
    let druids = client
        .objects_for_workstep("start-assembly", "jp2-create", "dor", "assemblyWF")
        .await
        .unwrap();
    assert_eq!(druids, vec!["druid:aa000aa0001", "druid:bb111bb1111"]);
}

#[tokio::test]
async fn test_repository_datastream_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{DRUID}/datastreams/rightsMetadata/content")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<rightsMetadata/>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{DRUID}/datastreams/missing/content")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{DRUID}")))
        .and(query_param("format", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<objectProfile/>"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/objects/{DRUID}/datastreams/rightsMetadata")))
        .and(body_string("<rightsMetadata>new</rightsMetadata>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let repository = FedoraRepository::new(&server.uri(), &server.uri()).unwrap();

    assert_eq!(
        repository.datastream_content(DRUID, "rightsMetadata").await.unwrap().as_deref(),
        Some("<rightsMetadata/>")
    );
    assert_eq!(repository.datastream_content(DRUID, "missing").await.unwrap(), None);
    repository
        .replace_datastream(DRUID, "rightsMetadata", "<rightsMetadata>new</rightsMetadata>")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_datastream_of_missing_object_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let repository = FedoraRepository::new(&server.uri(), &server.uri()).unwrap();
    let err = repository
        .datastream_content("druid:zz999zz9999", "rightsMetadata")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("object druid:zz999zz9999"));
}

#[tokio::test]
async fn test_repository_object_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{DRUID}")))
        .and(query_param("format", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<objectProfile/>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{DRUID}/export")))
        .and(query_param("context", "archive"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<foxml:digitalObject/>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/objects/new"))
        .and(body_string_contains("digitalObject"))
        .respond_with(ResponseTemplate::new(201).set_body_string("druid:aa000aa0001\n"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/objects/{DRUID}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/services/objects/{DRUID}/publish")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let services_url = format!("{}/services", server.uri());
    let repository = FedoraRepository::new(&server.uri(), &services_url)
        .unwrap()
        .with_credentials(Some("fedoraAdmin".to_string()), Some("secret".to_string()));

    assert!(repository.object_exists(DRUID).await.unwrap());
    assert!(!repository.object_exists("druid:zz999zz9999").await.unwrap());
    assert_eq!(repository.export_object(DRUID).await.unwrap(), "<foxml:digitalObject/>");
    assert_eq!(repository.ingest_object("<foxml:digitalObject/>").await.unwrap(), DRUID);
    repository.delete_object(DRUID).await.unwrap();
    repository.publish_metadata(DRUID).await.unwrap();
}

#[tokio::test]
async fn test_solr_queries_and_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/select"))
        .and(query_param("q", "source_id_t:\"revs-01\""))
        .and(query_param("wt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": 1, "docs": [{ "id": DRUID }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(body_json(json!({ "delete": { "id": DRUID } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(body_json(json!({ "commit": {} })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let index = SolrIndex::new(&server.uri()).unwrap();

    assert_eq!(index.query_by_source_id("revs-01").await.unwrap(), vec![DRUID]);
    index.delete_document(DRUID).await.unwrap();
    index.commit().await.unwrap();
}
