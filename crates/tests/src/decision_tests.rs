use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;

/// Lawyer, one reviewer per role, and a case taken through the registrar
/// and stamp-reporter stages. Returns `(lawyer, reporter_sign, case_id)`.
async fn case_at_stamp_reporter(app: &TestApp) -> (String, String, String) {
    let lawyer = create_user(app, "lawyer-d", "lawyer").await;
    create_reviewer(app, "registrar-d", "registrar", 0).await;
    let reporter = signup(app, "reporter-d", "stamp-reporter").await;
    let sign = reporter["digital_sign"].as_str().unwrap().to_string();

    let case_id = submit_case(app, &lawyer, "Contract breach").await;
    post_empty(app, &format!("/case/{case_id}/send-to-registrar")).await;
    post_empty(app, &format!("/registrar/case-assignment/{case_id}")).await;
    (lawyer, sign, case_id)
}

#[tokio::test]
async fn reject_sets_status_and_notifies_lawyer_once() {
    let app = test_app();
    let (lawyer, _, case_id) = case_at_stamp_reporter(&app).await;

    let body = json!({ "reason": "missing exhibit B" });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/reject"), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["message"], "Case rejected successfully");

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["status"], "Rejected");
    assert_eq!(case["rejected"]["status"], true);
    assert_eq!(case["rejected"]["reason"], "missing exhibit B");

    let notes = lawyer_notifications(&app, &lawyer).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["message"], "Case rejected: missing exhibit B");
    assert_eq!(notes[0]["case_id"], case_id);
}

#[tokio::test]
async fn replayed_reject_does_not_duplicate_notification() {
    let app = test_app();
    let (lawyer, _, case_id) = case_at_stamp_reporter(&app).await;
    let uri = format!("/case/{case_id}/reject");
    let body = json!({ "reason": "late filing" });

    post_json(&app, &uri, &body).await;
    let (status, _) = post_json(&app, &uri, &body).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(lawyer_notifications(&app, &lawyer).await.len(), 1);
}

#[tokio::test]
async fn reject_books_case_against_the_stamp_reporter() {
    let app = test_app();
    let (lawyer, _, case_id) = case_at_stamp_reporter(&app).await;
    let case = fetch_case(&app, &case_id).await;
    let reporter = case["assigned_stamp_reporter"].as_str().unwrap().to_string();

    post_json(&app, &format!("/case/{case_id}/reject"), &json!({ "reason": "x" })).await;

    let (_, closed) = get(&app, &format!("/all-cases/{reporter}")).await;
    assert_eq!(closed["cases"][0]["id"], case_id);

    let (_, closed) = get(&app, &format!("/all-cases/{lawyer}")).await;
    let ids: Vec<_> = closed["cases"].as_array().unwrap().iter().map(|c| c["id"].clone()).collect();
    assert!(ids.contains(&json!(case_id)));
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let app = test_app();
    let (_, _, case_id) = case_at_stamp_reporter(&app).await;

    let (status, resp) =
        post_json(&app, &format!("/case/{case_id}/reject"), &json!({ "reason": "" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp["field_errors"]["reason"], "Reason for rejection is required");

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["status"], "Pending");
}

#[tokio::test]
async fn reject_unknown_case_is_not_found() {
    let app = test_app();
    let missing = uuid::Uuid::new_v4();
    let (status, _) =
        post_json(&app, &format!("/case/{missing}/reject"), &json!({ "reason": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accept_with_wrong_signature_changes_nothing() {
    let app = test_app();
    let (lawyer, _, case_id) = case_at_stamp_reporter(&app).await;
    create_reviewer(&app, "clerk-d", "bench-clerk", 0).await;

    let body = json!({ "digital_signature": "forged-signature" });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/accept"), &body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp["message"], "Invalid digital signature");

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["status"], "Pending");
    assert_eq!(case["approved"], false);
    assert!(case["assigned_bench_clerk"].is_null());
    assert!(lawyer_notifications(&app, &lawyer).await.is_empty());
}

#[tokio::test]
async fn accept_before_stamp_assignment_is_not_found() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-n", "lawyer").await;
    let case_id = submit_case(&app, &lawyer, "Unassigned").await;

    let body = json!({ "digital_signature": "anything" });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/accept"), &body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["message"], "Stamp reporter not found");
}

#[tokio::test]
async fn accept_verifies_and_hands_off_to_bench_clerk() {
    let app = test_app();
    let (lawyer, sign, case_id) = case_at_stamp_reporter(&app).await;
    let clerk = create_reviewer(&app, "clerk-v", "bench-clerk", 0).await;

    let body = json!({ "digital_signature": sign });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/accept"), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["assigned_bench_clerk"], clerk);

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["status"], "Verified");
    assert_eq!(case["approved"], true);
    assert_eq!(case["assigned_bench_clerk"], clerk);

    let expected = format!(
        "Case 'Contract breach' (ID: {case_id}) has been verified by the stamp reporter."
    );
    let lawyer_notes = lawyer_notifications(&app, &lawyer).await;
    assert_eq!(lawyer_notes.len(), 1);
    assert_eq!(lawyer_notes[0]["message"], expected);

    let clerk_notes = reviewer_notifications(&app, &clerk).await;
    assert_eq!(clerk_notes.len(), 1);
    assert_eq!(clerk_notes[0]["message"], expected);

    let (_, queue) = get(&app, &format!("/get-cases/{clerk}")).await;
    assert_eq!(queue["cases"][0]["id"], case_id);
}

#[tokio::test]
async fn accept_without_bench_clerks_still_verifies() {
    let app = test_app();
    let (_, sign, case_id) = case_at_stamp_reporter(&app).await;

    let body = json!({ "digital_signature": sign });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/accept"), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(resp["assigned_bench_clerk"].is_null());

    assert_eq!(fetch_case(&app, &case_id).await["status"], "Verified");
}

#[tokio::test]
async fn decision_fans_out_to_everyone_who_handled_the_case() {
    let app = test_app();
    let (lawyer, sign, case_id) = case_at_stamp_reporter(&app).await;
    let clerk = create_reviewer(&app, "clerk-j", "bench-clerk", 0).await;
    let judge = create_reviewer(&app, "judge-j", "judge", 0).await;

    post_json(&app, &format!("/case/{case_id}/accept"), &json!({ "digital_signature": sign })).await;
    post_empty(&app, &format!("/case/{case_id}/send-to-judge")).await;

    let body = json!({ "decision": "Dismissed", "reason": "lack of standing" });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/decision"), &body).await;
    assert_eq!(status, StatusCode::OK);

    let deliveries = resp["deliveries"].as_array().unwrap();
    assert_eq!(deliveries.len(), 5);
    assert!(deliveries.iter().all(|d| d["delivered"] == true));
    let roles: Vec<_> = deliveries.iter().map(|d| d["recipient_role"].as_str().unwrap()).collect();
    assert_eq!(roles, ["lawyer", "registrar", "stamp-reporter", "bench-clerk", "judge"]);

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["status"], "Dismissed");
    assert_eq!(case["decision_reason"], "lack of standing");

    let expected = format!(
        "Case 'Contract breach' (ID: {case_id}) has been Dismissed. Reason: lack of standing"
    );
    let lawyer_notes = lawyer_notifications(&app, &lawyer).await;
    assert!(lawyer_notes.iter().any(|n| n["message"] == expected));
    assert!(reviewer_notifications(&app, &judge).await.iter().any(|n| n["message"] == expected));
    assert!(reviewer_notifications(&app, &clerk).await.iter().any(|n| n["message"] == expected));
}

#[tokio::test]
async fn decision_without_judge_assignment_is_allowed() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-p", "lawyer").await;
    let case_id = submit_case(&app, &lawyer, "Early ruling").await;

    let body = json!({ "decision": "Settled", "reason": "parties agreed" });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/decision"), &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["deliveries"].as_array().unwrap().len(), 1);
    assert_eq!(fetch_case(&app, &case_id).await["status"], "Settled");
}

#[tokio::test]
async fn decision_requires_both_fields() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-q", "lawyer").await;
    let case_id = submit_case(&app, &lawyer, "Incomplete ruling").await;

    let body = json!({ "decision": "Granted" });
    let (status, resp) = post_json(&app, &format!("/case/{case_id}/decision"), &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp["field_errors"]["reason"].is_string());
}
