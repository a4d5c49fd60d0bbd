use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use surat_keluar::domain::ports::ConfigProvider;
use surat_keluar::utils::validation::Validate;
use surat_keluar::{AppConfig, AppError, AuthService, LocalStorage, RestBackend};
use tempfile::TempDir;

/// Login stores the session even when the last_login update is refused.
#[tokio::test]
async fn test_login_whoami_logout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/auth/v1/token")
            .query_param("grant_type", "password")
            .header("apikey", "anon-key")
            .json_body(json!({"email": "admin@lpm.ac.id", "password": "rahasia"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "access_token": "jwt-abc",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-abc",
                "user": {"id": "8f7e", "email": "admin@lpm.ac.id", "role": "authenticated"}
            }));
    });
    let last_login_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/admin")
            .query_param("email", "eq.admin@lpm.ac.id")
            .header("authorization", "Bearer jwt-abc");
        then.status(403)
            .header("Content-Type", "application/json")
            .json_body(json!({"message": "permission denied for table admin"}));
    });
    let user_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/auth/v1/user")
            .header("authorization", "Bearer jwt-abc");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"id": "8f7e", "email": "admin@lpm.ac.id"}));
    });
    let logout_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/auth/v1/logout")
            .header("authorization", "Bearer jwt-abc");
        then.status(204);
    });

    let backend = RestBackend::new(server.url(""), "anon-key");
    let auth = AuthService::new(backend, LocalStorage::new(temp_dir.path()));

    let session = auth.login("admin@lpm.ac.id", "rahasia").await?;
    token_mock.assert();
    last_login_mock.assert();
    assert_eq!(session.user.display_name(), "Admin");
    assert!(temp_dir.path().join("session.json").exists());

    let user = auth.whoami().await?;
    user_mock.assert();
    assert_eq!(user.email, "admin@lpm.ac.id");

    auth.logout().await?;
    logout_mock.assert();
    assert!(!temp_dir.path().join("session.json").exists());
    assert!(matches!(auth.whoami().await, Err(AppError::NotAuthenticated)));
    Ok(())
}

#[tokio::test]
async fn test_rejected_credentials() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/auth/v1/token");
        then.status(400)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }));
    });

    let backend = RestBackend::new(server.url(""), "anon-key");
    let auth = AuthService::new(backend, LocalStorage::new(temp_dir.path()));

    match auth.login("admin@lpm.ac.id", "salah").await {
        Err(AppError::BackendError { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid login credentials");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!temp_dir.path().join("session.json").exists());
    Ok(())
}

#[test]
fn test_config_file_with_env_substitution() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("surat.toml");
    std::env::set_var("SURAT_TEST_ANON_KEY", "key-from-env");
    std::fs::write(
        &path,
        r#"
[backend]
url = "https://example.supabase.co"
anon_key = "${SURAT_TEST_ANON_KEY}"

[institution]
code = "071073/LPM"

[app]
items_per_page = 25
"#,
    )?;

    let config = AppConfig::from_file(&path)?;
    config.validate()?;

    assert_eq!(config.anon_key(), "key-from-env");
    assert_eq!(config.items_per_page(), 25);
    assert_eq!(config.min_search_chars(), 2);
    assert_eq!(config.recent_recipient_limit(), 5);
    assert_eq!(config.search_recipient_limit(), 10);
    assert_eq!(config.request_timeout().as_secs(), 30);
    Ok(())
}

#[test]
fn test_unresolved_placeholder_fails_validation() -> Result<()> {
    let config = AppConfig::from_toml_str(
        r#"
[backend]
url = "https://example.supabase.co"
anon_key = "${SURAT_TEST_UNSET_VARIABLE}"
"#,
    )?;

    assert!(config.validate().is_err());
    Ok(())
}
