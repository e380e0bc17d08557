use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;

/// Lawyer L files C with no attachments; the registrar pool is R1 (empty
/// queue) and R2 (two queued cases); C goes to R1 and is then rejected.
#[tokio::test]
async fn submit_assign_reject_walkthrough() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-l", "lawyer").await;
    let r1 = create_reviewer(&app, "registrar-r1", "registrar", 0).await;
    let r2 = create_reviewer(&app, "registrar-r2", "registrar", 2).await;

    // Intake
    let (status, resp) = submit_case_with_files(&app, &lawyer, "Title dispute", &[]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["user"]["pending_cases"], 1);
    let case_id = resp["case_id"].as_str().unwrap().to_string();
    assert_eq!(fetch_case(&app, &case_id).await["status"], "Pending");

    // Least-loaded registrar
    let (status, resp) = post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["assigned_reviewer"], r1);
    assert_eq!(resp["reviewer_cases"], json!([case_id]));

    let (_, r1_cases) = get(&app, &format!("/get-cases/{r1}")).await;
    let r1_ids: Vec<_> = r1_cases["cases"].as_array().unwrap().iter().map(|c| c["id"].clone()).collect();
    assert_eq!(r1_ids, vec![json!(case_id)]);

    let (_, dashboard) = get(&app, &format!("/registrar/{r2}")).await;
    assert_eq!(dashboard["total_cases"], 2);

    // Rejection
    let (status, _) = post_json(
        &app,
        &format!("/case/{case_id}/reject"),
        &json!({ "reason": "incomplete" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetch_case(&app, &case_id).await["status"], "Rejected");

    let notes = lawyer_notifications(&app, &lawyer).await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0]["message"].as_str().unwrap().contains("incomplete"));

    // The rejection lands on R1's ledger, not R2's.
    let (_, closed) = get(&app, &format!("/all-cases/{r1}")).await;
    assert_eq!(closed["cases"][0]["id"], case_id);
    let (_, closed) = get(&app, &format!("/all-cases/{r2}")).await;
    assert!(closed["cases"].as_array().unwrap().is_empty());
}
