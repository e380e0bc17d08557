use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::*;

#[tokio::test]
async fn submit_without_files_creates_pending_case() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-l", "lawyer").await;

    let (status, resp) = submit_case_with_files(&app, &lawyer, "Land dispute", &[]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["message"], "Case submitted successfully");
    assert_eq!(resp["user"]["user_id"], lawyer);
    assert_eq!(resp["user"]["pending_cases"], 1);

    let case = fetch_case(&app, resp["case_id"].as_str().unwrap()).await;
    assert_eq!(case["status"], "Pending");
    assert_eq!(case["user_id"], lawyer);
    assert_eq!(case["case_subject"], "Land dispute");
    assert_eq!(case["filed_date"], "2025-03-03 10:00:00");
    assert_eq!(case["approved"], false);
    assert_eq!(case["rejected"]["status"], false);
    assert!(case["assigned_registrar"].is_null());
    assert_eq!(case["file_cids"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn pending_count_grows_per_submission() {
    let app = test_app();
    let lawyer = create_user(&app, "busy-lawyer", "lawyer").await;

    submit_case(&app, &lawyer, "First").await;
    let (_, resp) = submit_case_with_files(&app, &lawyer, "Second", &[]).await;
    assert_eq!(resp["user"]["pending_cases"], 2);
}

#[tokio::test]
async fn attachments_are_archived_and_empty_ones_skipped() {
    let app = test_app();
    let lawyer = create_user(&app, "filer", "lawyer").await;

    let files: [(&str, &[u8]); 3] = [
        ("petition.pdf", b"%PDF-1.4 petition"),
        ("empty.txt", b""),
        ("exhibit-a.txt", b"exhibit a contents"),
    ];
    let (status, resp) = submit_case_with_files(&app, &lawyer, "With exhibits", &files).await;
    assert_eq!(status, StatusCode::CREATED);

    let case = fetch_case(&app, resp["case_id"].as_str().unwrap()).await;
    let cids = case["file_cids"].as_array().unwrap();
    assert_eq!(cids.len(), 2);
    for cid in cids {
        assert!(cid.as_str().unwrap().starts_with("bafk"), "unexpected cid {cid}");
    }
    assert_ne!(cids[0], cids[1]);
}

#[tokio::test]
async fn attachments_are_staged_under_user_and_case() {
    let app = test_app();
    let lawyer = create_user(&app, "stager", "lawyer").await;

    let files: [(&str, &[u8]); 1] = [("brief.txt", b"the brief")];
    let (_, resp) = submit_case_with_files(&app, &lawyer, "Staged", &files).await;
    let case_id = resp["case_id"].as_str().unwrap();

    let staged = app.state.staging.root().join(&lawyer).join(case_id).join("brief.txt");
    let contents = tokio::fs::read(&staged).await.unwrap();
    assert_eq!(contents, b"the brief");
}

#[tokio::test]
async fn identical_attachments_are_stored_once() {
    let app = test_app();
    let lawyer = create_user(&app, "twins", "lawyer").await;

    let files: [(&str, &[u8]); 2] = [("a.txt", b"same bytes"), ("b.txt", b"same bytes")];
    let (_, resp) = submit_case_with_files(&app, &lawyer, "Duplicates", &files).await;

    let case = fetch_case(&app, resp["case_id"].as_str().unwrap()).await;
    assert_eq!(case["file_cids"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_filed_date_is_a_validation_error() {
    let app = test_app();
    let lawyer = create_user(&app, "dater", "lawyer").await;

    let fields = [
        ("user_id", lawyer.as_str()),
        ("filed_date", "2025-03-03"),
        ("case_subject", "Bad date"),
    ];
    let (status, resp) = post_multipart(&app, "/submit-case", &fields, &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp["field_errors"]["filed_date"].is_string());
}

#[tokio::test]
async fn filed_date_weekday_is_not_checked_against_the_date() {
    let app = test_app();
    let lawyer = create_user(&app, "off-by-a-day", "lawyer").await;

    let fields = [
        ("user_id", lawyer.as_str()),
        ("filed_date", "Tue, 03 Mar 2025 10:00:00 GMT"),
        ("case_subject", "Wrong weekday"),
    ];
    let (status, resp) = post_multipart(&app, "/submit-case", &fields, &[]).await;
    assert_eq!(status, StatusCode::CREATED);

    let case = fetch_case(&app, resp["case_id"].as_str().unwrap()).await;
    assert_eq!(case["filed_date"], "2025-03-03 10:00:00");
}

#[tokio::test]
async fn missing_subject_is_a_validation_error() {
    let app = test_app();
    let lawyer = create_user(&app, "forgetful", "lawyer").await;

    let fields = [("user_id", lawyer.as_str()), ("filed_date", FILED_DATE)];
    let (status, resp) = post_multipart(&app, "/submit-case", &fields, &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp["field_errors"]["case_subject"].is_string());
}

#[tokio::test]
async fn unknown_lawyer_is_not_found() {
    let app = test_app();
    let ghost = uuid::Uuid::new_v4().to_string();

    let (status, resp) = submit_case_with_files(&app, &ghost, "Nobody", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["message"], "Lawyer not found");
}

#[tokio::test]
async fn reviewers_cannot_file_cases() {
    let app = test_app();
    let registrar = create_user(&app, "not-a-lawyer", "registrar").await;

    let (status, _) = submit_case_with_files(&app, &registrar, "Wrong role", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
