//! RTM token endpoint integration tests.

// Test code is allowed to use expect/unwrap for assertions
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use anyhow::Result;
use token_service::models::{RtmRole, TokenResponse};
use token_service::signer::SignerError;
use token_test_utils::{RecordingSigner, SignerCall, TestTokenServer, TEST_APP_ID};

fn now() -> u32 {
    chrono::Utc::now().timestamp() as u32
}

async fn post_rtm(server: &TestTokenServer, body: &str) -> Result<(u16, TokenResponse)> {
    let response = reqwest::Client::new()
        .post(format!("{}/fetch_rtm_token", server.url()))
        .body(body.to_string())
        .send()
        .await?;

    let status = response.status().as_u16();
    let body: TokenResponse = response.json().await?;
    Ok((status, body))
}

#[tokio::test]
async fn test_rtm_token_success() -> Result<()> {
    let server = TestTokenServer::spawn().await?;

    let before = now();
    let (status, body) = post_rtm(&server, r#"{"uid":"user42"}"#).await?;
    let after = now();

    assert_eq!(status, 200);
    assert_eq!(body.code, "200");
    assert!(!body.token.is_empty());

    match server.signer().calls().as_slice() {
        [SignerCall::Rtm {
            app_id,
            user_id,
            role,
            expire_at,
        }] => {
            assert_eq!(app_id, TEST_APP_ID);
            assert_eq!(user_id, "user42");
            assert_eq!(*role, RtmRole::RtmUser);
            assert!(*expire_at >= before + 72_000 && *expire_at <= after + 72_000);
            assert_eq!(body.token, format!("rtm:user42:1:{}", expire_at));
        }
        other => panic!("unexpected signer calls: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_rtm_wrong_type_names_field() -> Result<()> {
    let server = TestTokenServer::spawn().await?;

    let (status, body) = post_rtm(&server, r#"{"uid":42}"#).await?;

    assert_eq!(status, 400);
    assert_eq!(
        body.token,
        "Bad request. Wrong type provided for field uid of RtmTokenRequest: got number 42, expected string"
    );
    assert!(server.signer().calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rtm_malformed_json_never_signs() -> Result<()> {
    let server = TestTokenServer::spawn().await?;

    for body in ["", "{\"uid\":", "user42"] {
        let (status, response) = post_rtm(&server, body).await?;
        assert_eq!(status, 400, "body {:?}", body);
        assert_eq!(response.token, "Bad request.");
    }

    assert!(server.signer().calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rtm_missing_or_blank_uid_rejected() -> Result<()> {
    let server = TestTokenServer::spawn().await?;

    for body in ["{}", r#"{"uid":""}"#, r#"{"uid":"   "}"#, r#"{"uid":null}"#] {
        let (status, response) = post_rtm(&server, body).await?;
        assert_eq!(status, 400, "body {:?}", body);
        assert!(response.token.starts_with("Bad request. Invalid uid"));
    }

    assert!(server.signer().calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rtm_signer_failure_is_server_error() -> Result<()> {
    let server = TestTokenServer::spawn_with(
        RecordingSigner::failing(SignerError::Internal("boom".to_string())),
        &[],
    )
    .await?;

    let (status, body) = post_rtm(&server, r#"{"uid":"user42"}"#).await?;

    assert_eq!(status, 500);
    assert_eq!(body.code, "500");
    assert_eq!(body.token, "Failed to build token");

    Ok(())
}

#[tokio::test]
async fn test_rtm_configured_ttl() -> Result<()> {
    let server =
        TestTokenServer::spawn_with(RecordingSigner::echoing(), &[("RTM_TOKEN_TTL_SECONDS", "3600")])
            .await?;

    let before = now();
    post_rtm(&server, r#"{"uid":"user42"}"#).await?;
    let after = now();

    match server.signer().calls().as_slice() {
        [SignerCall::Rtm { expire_at, .. }] => {
            assert!(*expire_at >= before + 3600 && *expire_at <= after + 3600);
        }
        other => panic!("unexpected signer calls: {other:?}"),
    }

    Ok(())
}
