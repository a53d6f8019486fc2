//! Tests for CuraEngineClient HTTP operations

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path, query_param},
};

use super::client::{CuraEngineClient, StaticSession};
use super::types::{ImportForm, ProfilePatch, ProfileUpload};
use crate::error::{CuraEngineError, ErrorKind, ValidationError};
use crate::services::config::CuraEngineConfig;

// NOTE: API keys in this file are fake values used to check header handling.

fn client(server: &MockServer, api_key: Option<&str>) -> CuraEngineClient {
    let config = CuraEngineConfig {
        base_url: server.uri(),
        ..CuraEngineConfig::default()
    };
    CuraEngineClient::new(&config, Arc::new(StaticSession::new(api_key.map(str::to_string))))
        .expect("client should build")
}

/// Test profile listing preserving server order
#[tokio::test]
async fn test_list_profiles_keeps_server_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slicing/cura_engine/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "normal": {"displayName": "Normal", "default": true, "resource": "http://localhost/api/slicing/cura_engine/profiles/normal"},
                "fine": {"displayName": "Fine", "description": "0.1mm", "resource": "http://localhost/api/slicing/cura_engine/profiles/fine"},
                "draft": {"resource": "http://localhost/api/slicing/cura_engine/profiles/draft"}
            }"#,
            "application/json",
        ))
        .mount(&mock_server)
        .await;

    let profiles = client(&mock_server, None)
        .list_profiles()
        .await
        .expect("Should list profiles");

    let keys: Vec<&str> = profiles.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["normal", "fine", "draft"]);
    assert_eq!(profiles["normal"].default, Some(true));
    assert_eq!(profiles["fine"].description.as_deref(), Some("0.1mm"));
    assert_eq!(profiles["draft"].display_name, None);
    assert_eq!(profiles["draft"].default, None);
}

/// Test requests carrying the session API key header
#[tokio::test]
async fn test_requests_carry_the_session_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slicing/cura_engine/profiles"))
        .and(header("X-Api-Key", "test-api-key-fake-value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let profiles = client(&mock_server, Some("test-api-key-fake-value"))
        .list_profiles()
        .await
        .expect("Should list profiles with API key");
    assert!(profiles.is_empty());
}

/// Test profile update against a relative resource locator
#[tokio::test]
async fn test_update_profile_patches_relative_resource() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/slicing/cura_engine/profiles/fine"))
        .and(body_json(json!({"default": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server, None)
        .update_profile("api/slicing/cura_engine/profiles/fine", ProfilePatch::make_default())
        .await
        .expect("Should patch profile");
}

/// Test profile deletion against an absolute resource locator
#[tokio::test]
async fn test_delete_profile_absolute_resource() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/slicing/cura_engine/profiles/draft"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resource = format!("{}/api/slicing/cura_engine/profiles/draft", mock_server.uri());
    client(&mock_server, None)
        .delete_profile(&resource)
        .await
        .expect("Should delete profile");
}

/// Test error handling for HTTP 5xx errors
#[tokio::test]
async fn test_server_error_is_a_network_kind_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server, None)
        .delete_profile("api/slicing/cura_engine/profiles/draft")
        .await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(
        matches!(&err, CuraEngineError::Http { status: 500, body } if body == "Internal server error"),
        "unexpected error: {err:?}"
    );
}

/// Test the engine path check request body
#[tokio::test]
async fn test_path_check_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/util/test"))
        .and(body_json(json!({
            "command": "path",
            "path": "/usr/bin/CuraEngine",
            "check_type": "file",
            "check_access": "x"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": false,
            "exists": true,
            "typeok": true,
            "access": false
        })))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server, None)
        .test_path("/usr/bin/CuraEngine")
        .await
        .expect("Should test path");

    assert!(!response.result);
    assert!(response.exists);
    assert!(response.typeok);
    assert!(!response.access);
}

/// Test profile values fetched by profile id
#[tokio::test]
async fn test_profile_values_query_the_profile_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plugin/cura_engine/getProfileDict"))
        .and(query_param("profile_id", "fine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "layer_height": 0.1,
            "support_enable": false
        })))
        .mount(&mock_server)
        .await;

    let values = client(&mock_server, None)
        .profile_values("fine")
        .await
        .expect("Should load profile values");

    assert_eq!(values.get("layer_height"), Some(&json!(0.1)));
    assert_eq!(values.get("support_enable"), Some(&json!(false)));
}

/// Test editor schema decoding in category order
#[tokio::test]
async fn test_editor_schema_keeps_category_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plugin/cura_engine/getProfileEditorStruct"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "speed": {"print_speed": {"type": "float", "default": 50, "unit": "mm/s"}},
                "adhesion": {"adhesion_type": {"type": "enum", "default": "skirt", "options": [{"value": "skirt", "label": "Skirt"}, {"value": "brim", "label": "Brim"}]}}
            }"#,
            "application/json",
        ))
        .mount(&mock_server)
        .await;

    let schema = client(&mock_server, None)
        .editor_schema()
        .await
        .expect("Should load editor structure");

    let categories: Vec<&str> = schema.categories().map(|(name, _)| name).collect();
    assert_eq!(categories, vec!["speed", "adhesion"]);
    assert_eq!(schema.len(), 2);
}

/// Test a rejected editor save mapping to a validation error
#[tokio::test]
async fn test_rejected_save_is_a_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/plugin/cura_engine/profileEditorSave"))
        .and(body_json(json!({
            "profile_id": "fine",
            "profile_data": {"layer_height": -1.0}
        })))
        .respond_with(ResponseTemplate::new(400).set_body_string("layer_height out of range"))
        .mount(&mock_server)
        .await;

    let mut values = serde_json::Map::new();
    values.insert("layer_height".into(), json!(-1.0));

    let err = client(&mock_server, None)
        .save_profile_values("fine", &values)
        .await
        .expect_err("Save should be rejected");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::Rejected {
            status: 400,
            message: "layer_height out of range".into()
        })
    );
}

/// Test import multipart carrying the file and only the set fields
#[tokio::test]
async fn test_import_sends_file_and_set_fields_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/plugin/cura_engine/import"))
        .and(body_string_contains("name=\"file\"; filename=\"fast.ini\""))
        .and(body_string_contains("name=\"allowOverwrite\""))
        .and(body_string_contains("name=\"displayName\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": "http://localhost/api/slicing/cura_engine/profiles/fast",
            "name": "fast",
            "displayName": "Fast",
            "description": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let form = ImportForm {
        allow_overwrite: true,
        name: Some("fast".into()),
        display_name: Some("Fast".into()),
        description: None,
        make_default: false,
    };
    let upload = ProfileUpload {
        file_name: "fast.ini".into(),
        contents: b"[profile]\nlayer_height = 0.3\n".to_vec(),
    };

    let imported = client(&mock_server, None)
        .import_profile(upload, &form)
        .await
        .expect("Should import profile");

    assert_eq!(imported.name, "fast");
    assert_eq!(imported.display_name.as_deref(), Some("Fast"));

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording is enabled");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"description\""));
    assert!(!body.contains("name=\"default\""));
}

/// Test error handling for an import conflict
#[tokio::test]
async fn test_import_conflict_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/plugin/cura_engine/import"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Profile fast already exists"))
        .mount(&mock_server)
        .await;

    let form = ImportForm {
        allow_overwrite: false,
        name: Some("fast".into()),
        display_name: None,
        description: None,
        make_default: false,
    };
    let upload = ProfileUpload {
        file_name: "fast.ini".into(),
        contents: Vec::new(),
    };

    let err = client(&mock_server, None)
        .import_profile(upload, &form)
        .await
        .expect_err("Import should conflict");

    assert_eq!(err.code(), "REJECTED");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("already exists"), "unexpected: {err}");
}

/// Test error handling for an unreachable server
#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let config = CuraEngineConfig {
        base_url: "http://127.0.0.1:9".into(),
        request_timeout_secs: 2,
        ..CuraEngineConfig::default()
    };
    let client = CuraEngineClient::new(&config, Arc::new(StaticSession::anonymous()))
        .expect("client should build");

    let err = client.list_profiles().await.expect_err("Nothing listens on port 9");
    assert!(matches!(err, CuraEngineError::Network(_)));
    assert_eq!(err.kind(), ErrorKind::Network);
}

/// Test client construction with an invalid base URL
#[test]
fn test_invalid_base_url_is_reported() {
    let config = CuraEngineConfig {
        base_url: "not a url".into(),
        ..CuraEngineConfig::default()
    };
    let result = CuraEngineClient::new(&config, Arc::new(StaticSession::anonymous()));
    assert!(matches!(result, Err(CuraEngineError::InvalidUrl { .. })));
}
