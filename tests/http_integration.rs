//! Integration tests for the management API client using wiremock
//!
//! These tests run the client against mocked endpoints and check the
//! request shapes and the handling of response codes.

use serde_json::json;
use sitecfg::azure::client::{ArmClient, SiteTarget};
use sitecfg::azure::http::{api_status, format_api_error};
use sitecfg::site::fetcher::read_web_app;
use sitecfg::site::remote::RemoteServiceClient;
use sitecfg::site::stack::{ApplicationStack, OsFamily};
use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE_PATH: &str =
    "/subscriptions/test-sub/resourceGroups/test-rg/providers/Microsoft.Web/sites/test-app";

fn client_for(server: &MockServer, slot: Option<&str>) -> ArmClient {
    let target = SiteTarget {
        endpoint: server.uri(),
        subscription_id: "test-sub".to_string(),
        resource_group: "test-rg".to_string(),
        name: "test-app".to_string(),
        slot: slot.map(str::to_string),
        scm_domain: "scm.example.net".to_string(),
        scm_endpoint: Some(format!("{}/scm", server.uri())),
    };
    ArmClient::new(target, "test-token").expect("client should build")
}

mod read_tests {
    use super::*;

    /// App settings are read through the list endpoint and unwrapped
    #[tokio::test]
    async fn test_list_app_settings_unwraps_properties() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/config/appsettings/list", SITE_PATH)))
            .and(query_param("api-version", "2023-12-01"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "appsettings",
                "properties": {"FOO": "bar", "FUNCTIONS_EXTENSION_VERSION": "~4"}
            })))
            .mount(&server)
            .await;

        let settings = client_for(&server, None)
            .list_app_settings()
            .await
            .expect("Request should succeed");

        assert_eq!(settings.len(), 2);
        assert_eq!(settings["FOO"], "bar");
    }

    /// A missing backup configuration reads as None
    #[tokio::test]
    async fn test_backup_404_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/config/backup/list", SITE_PATH)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "BackupNotFound", "message": "not found"}
            })))
            .mount(&server)
            .await;

        let backup = client_for(&server, None)
            .get_backup()
            .await
            .expect("404 should not be an error");
        assert_eq!(backup, None);
    }

    /// Slot reads go under /slots, sticky names stay on the production site
    #[tokio::test]
    async fn test_slot_routes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/slots/staging/config/web", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"alwaysOn": true}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/config/slotConfigNames", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"appSettingNames": ["FOO"], "connectionStringNames": []}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("staging"));
        let config = client.get_site_config().await.expect("config read");
        assert_eq!(config.always_on, Some(true));

        let sticky = client.get_sticky_settings().await.expect("sticky read");
        assert_eq!(sticky.app_setting_names, vec!["FOO".to_string()]);
    }

    /// Full read path into the flat model
    #[tokio::test]
    async fn test_read_web_app() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SITE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "test-app",
                "kind": "functionapp,linux",
                "properties": {"enabled": true, "httpsOnly": true}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/config/web", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"linuxFxVersion": "PYTHON|3.11", "alwaysOn": true}
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}/config/appsettings/list", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {
                    "FUNCTIONS_EXTENSION_VERSION": "~4",
                    "FUNCTIONS_WORKER_RUNTIME": "python",
                    "WEBSITE_HEALTHCHECK_MAXPINGFAILURES": "5",
                    "FOO": "bar"
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/config/slotConfigNames", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": {}})))
            .mount(&server)
            .await;

        for list in ["connectionstrings", "azurestorageaccounts", "authsettings"] {
            Mock::given(method("POST"))
                .and(path(format!("{}/config/{}/list", SITE_PATH, list)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": {}})))
                .mount(&server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path(format!("{}/config/logs", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": {}})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}/config/backup/list", SITE_PATH)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let app = read_web_app(&client_for(&server, None), None)
            .await
            .expect("read should succeed");

        assert_eq!(app.name, "test-app");
        assert_eq!(app.os, OsFamily::Linux);
        assert!(app.https_only);
        assert_eq!(app.functions_extension_version.as_deref(), Some("~4"));
        assert_eq!(
            app.site_config.application_stack,
            Some(ApplicationStack::Python { version: "3.11".into() })
        );
        assert_eq!(app.site_config.health_check_eviction_time_in_min, Some(5));
        assert_eq!(app.app_settings.len(), 1);
        assert_eq!(app.backup, None);
        assert_eq!(app.auth_settings, None);
        assert_eq!(app.auth_settings_v2, None);
    }
}

mod write_tests {
    use super::*;
    use sitecfg::site::auth_v2::expand_auth_settings_v2;
    use sitecfg::site::settings::AppSettingsMap;

    /// App settings are written wrapped in a properties envelope
    #[tokio::test]
    async fn test_update_app_settings_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/config/appsettings", SITE_PATH)))
            .and(body_json(json!({"properties": {"FOO": "bar"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"FOO": "bar"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings: AppSettingsMap = [("FOO".to_string(), "bar".to_string())].into_iter().collect();
        client_for(&server, None)
            .update_app_settings(&settings)
            .await
            .expect("write should succeed");
    }

    /// Auth v2 settings are written to their own config document
    #[tokio::test]
    async fn test_update_auth_settings_v2_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/config/authsettingsV2", SITE_PATH)))
            .and(body_json(json!({"properties": {"platform": {"enabled": false}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": {}})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server, None)
            .update_auth_settings_v2(&expand_auth_settings_v2(None))
            .await
            .expect("write should succeed");
    }

    /// Deleting an absent backup is not an error
    #[tokio::test]
    async fn test_delete_backup_tolerates_404() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/config/backup", SITE_PATH)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server, None)
            .delete_backup()
            .await
            .expect("404 should be tolerated");
    }

    /// Zip deploy posts the archive to the deployment host
    #[tokio::test]
    async fn test_zip_deploy_uploads_archive() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/scm/api/zipdeploy"))
            .and(header("content-type", "application/zip"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let archive = std::env::temp_dir().join(format!("sitecfg-{}.zip", uuid::Uuid::new_v4()));
        std::fs::write(&archive, b"PK\x03\x04").expect("write archive");

        let result = client_for(&server, None).zip_deploy(&archive).await;
        std::fs::remove_file(&archive).ok();
        result.expect("deploy should succeed");
    }
}

mod error_tests {
    use super::*;

    /// 403 surfaces as a status the caller can inspect
    #[tokio::test]
    async fn test_403_is_permission_denied() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/config/logs", SITE_PATH)))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "AuthorizationFailed", "message": "secret details"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .get_logs()
            .await
            .expect_err("403 should fail");

        assert_eq!(api_status(&err).map(|s| s.as_u16()), Some(403));
        let message = format_api_error(&err);
        assert!(message.starts_with("Permission denied"));
        assert!(!message.contains("secret details"));
    }

    /// 429 surfaces as rate limiting
    #[tokio::test]
    async fn test_429_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SITE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server, None).get_site().await.expect_err("429 should fail");
        assert!(format_api_error(&err).contains("Rate limit"));
    }

    /// Malformed JSON is a parse error, not a status error
    #[tokio::test]
    async fn test_malformed_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SITE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, None).get_site().await.expect_err("parse should fail");
        assert_eq!(api_status(&err), None);
        assert!(format!("{:#}", err).contains("Failed to parse response JSON"));
    }
}
