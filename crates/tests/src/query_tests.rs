use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn lawyer_listing_shows_submitted_cases() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-g", "lawyer").await;
    let other = create_user(&app, "lawyer-h", "lawyer").await;
    let first = submit_case(&app, &lawyer, "First").await;
    let second = submit_case(&app, &lawyer, "Second").await;
    submit_case(&app, &other, "Someone else's").await;

    let (status, resp) = get(&app, &format!("/get-cases/{lawyer}")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = resp["cases"].as_array().unwrap().iter().map(|c| c["id"].clone()).collect();
    assert_eq!(ids, vec![json!(first), json!(second)]);

    let (_, history) = get(&app, &format!("/case-history/{lawyer}")).await;
    assert_eq!(history["cases"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reviewer_listing_shows_queue() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-q", "lawyer").await;
    let registrar = create_reviewer(&app, "registrar-q", "registrar", 0).await;
    let case_id = submit_case(&app, &lawyer, "Queued").await;
    submit_case(&app, &lawyer, "Not forwarded").await;

    post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;

    let (status, resp) = get(&app, &format!("/get-cases/{registrar}")).await;
    assert_eq!(status, StatusCode::OK);
    let cases = resp["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0]["id"], case_id);
    assert_eq!(cases[0]["assigned_registrar"], registrar);
}

#[tokio::test]
async fn stale_queue_ids_are_skipped() {
    let app = test_app();
    let registrar = create_reviewer(&app, "registrar-stale", "registrar", 3).await;

    let (status, resp) = get(&app, &format!("/get-cases/{registrar}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(resp["cases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_user_listing_is_not_found() {
    let app = test_app();
    let missing = uuid::Uuid::new_v4();
    let (status, _) = get(&app, &format!("/get-cases/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn single_case_lookup() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-c", "lawyer").await;
    let case_id = submit_case(&app, &lawyer, "Lookup").await;

    let (status, resp) = get(&app, &format!("/case/{case_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(resp.get("message").is_none());
    assert_eq!(resp["case"]["id"], case_id);
    assert_eq!(resp["case"]["client"], "Acme Holdings");

    let missing = uuid::Uuid::new_v4();
    let (status, resp) = get(&app, &format!("/case/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["message"], "Case not found");

    let (status, _) = get(&app, "/case/12345").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registrar_verification_view_matches_case_projection() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-v", "lawyer").await;
    let case_id = submit_case(&app, &lawyer, "Verification view").await;

    let (status, resp) = get(&app, &format!("/registrar/case-verification/{case_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["case"], fetch_case(&app, &case_id).await);
}

#[tokio::test]
async fn stamp_queue_lookup_requires_queue_membership() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-k", "lawyer").await;
    create_reviewer(&app, "registrar-k", "registrar", 0).await;
    let reporter = create_reviewer(&app, "reporter-k", "stamp-reporter", 0).await;
    let other = create_reviewer(&app, "reporter-other", "stamp-reporter", 5).await;
    let case_id = submit_case(&app, &lawyer, "Stamp me").await;
    post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    post_empty(&app, &format!("/registrar/case-assignment/{case_id}")).await;

    let uri = format!("/case-stamp-verif/{case_id}");
    let (status, resp) = post_json(&app, &uri, &json!({ "user_id": reporter })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["case"]["id"], case_id);

    let (status, resp) = post_json(&app, &uri, &json!({ "user_id": other })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["message"], "Case not found in user's cases");
}

#[tokio::test]
async fn registrar_dashboard_counts_queue() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-b", "lawyer").await;
    let registrar = create_reviewer(&app, "registrar-board", "registrar", 0).await;
    for subject in ["one", "two"] {
        let case_id = submit_case(&app, &lawyer, subject).await;
        post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    }

    let (status, resp) = get(&app, &format!("/registrar/{registrar}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({ "name": "registrar-board", "total_cases": 2, "notifications": 0 }));

    let (status, resp) = get(&app, &format!("/registrar/{lawyer}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["message"], "Registrar not found");
}

#[tokio::test]
async fn lawyer_notifications_are_scoped_to_the_lawyer() {
    let app = test_app();
    let mine = create_user(&app, "lawyer-mine", "lawyer").await;
    let theirs = create_user(&app, "lawyer-theirs", "lawyer").await;
    let my_case = submit_case(&app, &mine, "Mine").await;
    let their_case = submit_case(&app, &theirs, "Theirs").await;

    post_json(&app, &format!("/case/{my_case}/reject"), &json!({ "reason": "a" })).await;
    post_json(&app, &format!("/case/{their_case}/reject"), &json!({ "reason": "b" })).await;

    let notes = lawyer_notifications(&app, &mine).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["message"], "Case rejected: a");
}

#[tokio::test]
async fn health_reports_memory_store() {
    let app = test_app();
    let (status, resp) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["status"], "ok");
    assert_eq!(resp["store"], "memory");
    assert_eq!(resp["db"], "connected");
    assert_eq!(resp["archive"], "local");
    assert_eq!(resp["staging"], app.state.staging.root().display().to_string());
}
