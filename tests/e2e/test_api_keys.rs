use crate::e2e::helpers;

use exam_audio::infrastructure::repositories::{ApiKeyRepository, ApiKeyStore};
use helpers::assertions::assert_counts;
use helpers::mocks::{mount_gemini_audio, mount_gemini_status, mount_storage_ok};
use helpers::DbTestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_context::test_context;

fn repository(ctx: &DbTestContext) -> ApiKeyRepository {
    ApiKeyRepository::new(Arc::new(ctx.pool.clone()))
}

#[test_context(DbTestContext)]
#[tokio::test]
async fn it_should_list_active_keys_healthiest_first(ctx: &DbTestContext) {
    let noisy = ctx.fixtures.create_key("gemini", "noisy", 4).await.unwrap();
    let healthy = ctx.fixtures.create_key("gemini", "healthy", 0).await.unwrap();
    ctx.fixtures.create_inactive_key("gemini", "revoked").await.unwrap();
    ctx.fixtures.create_key("other", "elsewhere", 0).await.unwrap();

    let keys = repository(ctx).find_active("gemini").await.unwrap();

    let ids: Vec<_> = keys.iter().map(|k| k.id).collect();
    assert_eq!(ids, vec![healthy.id, noisy.id]);
    assert_eq!(keys[0].secret_value, "healthy");
    assert!(keys.iter().all(|k| k.is_active));
}

#[test_context(DbTestContext)]
#[tokio::test]
async fn it_should_provision_keys_with_initial_state(ctx: &DbTestContext) {
    let revoked = ctx.fixtures.create_inactive_key("gemini", "revoked").await.unwrap();
    let repo = repository(ctx);

    let stored = repo.find_by_id(revoked.id).await.unwrap().unwrap();
    assert_eq!(stored.secret_value, "revoked");
    assert!(!stored.is_active);
    assert!(stored.last_used_at.is_none());
    assert!(repo.find_by_id(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

#[test_context(DbTestContext)]
#[tokio::test]
async fn it_should_update_key_health(ctx: &DbTestContext) {
    let key = ctx.fixtures.create_key("gemini", "key-a", 2).await.unwrap();
    let repo = repository(ctx);

    repo.increment_error_count(key.id).await.unwrap();
    assert_eq!(ctx.fixtures.key_state(key.id).await.unwrap(), (true, 3));

    repo.reset_error_count(key.id).await.unwrap();
    assert_eq!(ctx.fixtures.key_state(key.id).await.unwrap(), (true, 0));
    let stored = repo.find_by_id(key.id).await.unwrap().unwrap();
    assert!(stored.last_used_at.is_some());

    repo.deactivate(key.id).await.unwrap();
    assert_eq!(ctx.fixtures.key_state(key.id).await.unwrap(), (false, 0));
    assert!(repo.find_active("gemini").await.unwrap().is_empty());
}

#[test_context(DbTestContext)]
#[tokio::test]
async fn it_should_deactivate_forbidden_key_during_batch(ctx: &DbTestContext) {
    let revoked = ctx.fixtures.create_key("gemini", "key-a", 0).await.unwrap();
    let working = ctx.fixtures.create_key("gemini", "key-b", 1).await.unwrap();
    mount_gemini_status(&ctx.provider, "key-a", 403).await;
    mount_gemini_audio(&ctx.provider, "key-b").await;
    mount_storage_ok(&ctx.storage).await;

    let response = ctx
        .client
        .post(
            "/api/tts/batch",
            &json!({
                "items": [{ "itemKey": "q1", "text": "Hello world" }],
                "voice": "Kore"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_counts(response.body.as_ref().unwrap(), 1, 1);

    let (active, _) = ctx.fixtures.key_state(revoked.id).await.unwrap();
    assert!(!active);
    // Success clears the counter
    assert_eq!(ctx.fixtures.key_state(working.id).await.unwrap(), (true, 0));
}

#[test_context(DbTestContext)]
#[tokio::test]
async fn it_should_fail_batch_when_database_has_no_keys(ctx: &DbTestContext) {
    ctx.fixtures.create_inactive_key("gemini", "revoked").await.unwrap();

    let response = ctx
        .client
        .post(
            "/api/tts/batch",
            &json!({
                "items": [{ "itemKey": "q1", "text": "Hello world" }],
                "voice": "Kore"
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_error_message("no API keys");
}
