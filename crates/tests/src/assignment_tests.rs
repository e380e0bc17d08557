use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::*;

#[tokio::test]
async fn least_loaded_registrar_is_picked() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-l", "lawyer").await;
    let busy = create_reviewer(&app, "registrar-busy", "registrar", 2).await;
    let idle = create_reviewer(&app, "registrar-idle", "registrar", 0).await;
    let case_id = submit_case(&app, &lawyer, "Land dispute").await;

    let (status, resp) = post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["stage"], "registrar");
    assert_eq!(resp["assigned_reviewer"], idle);
    assert_eq!(resp["reviewer_cases"], serde_json::json!([case_id]));
    assert_ne!(resp["assigned_reviewer"], busy);

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["assigned_registrar"], idle);
}

#[tokio::test]
async fn ties_go_to_the_earliest_signup() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-t", "lawyer").await;
    let first = create_reviewer(&app, "registrar-first", "registrar", 1).await;
    create_reviewer(&app, "registrar-second", "registrar", 1).await;
    let case_id = submit_case(&app, &lawyer, "Tie").await;

    let (_, resp) = post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    assert_eq!(resp["assigned_reviewer"], first);
}

#[tokio::test]
async fn retried_assignment_does_not_duplicate_queue_entry() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-r", "lawyer").await;
    create_reviewer(&app, "registrar-a", "registrar", 0).await;
    create_reviewer(&app, "registrar-b", "registrar", 0).await;
    let case_id = submit_case(&app, &lawyer, "Retry").await;
    let uri = format!("/case/{case_id}/send-to-registrar");

    let (_, first) = post_empty(&app, &uri).await;
    let (status, second) = post_empty(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["assigned_reviewer"], first["assigned_reviewer"]);
    assert_eq!(second["reviewer_cases"], serde_json::json!([case_id]));

    let assignee = first["assigned_reviewer"].as_str().unwrap();
    let (_, listing) = get(&app, &format!("/get-cases/{assignee}")).await;
    assert_eq!(listing["cases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn each_case_goes_to_the_currently_least_loaded() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-m", "lawyer").await;
    let a = create_reviewer(&app, "registrar-a", "registrar", 0).await;
    let b = create_reviewer(&app, "registrar-b", "registrar", 0).await;

    let mut assignees = Vec::new();
    for subject in ["one", "two", "three", "four"] {
        let case_id = submit_case(&app, &lawyer, subject).await;
        let (_, resp) = post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
        assignees.push(resp["assigned_reviewer"].as_str().unwrap().to_string());
    }

    assert_eq!(assignees.iter().filter(|id| **id == a).count(), 2);
    assert_eq!(assignees.iter().filter(|id| **id == b).count(), 2);
}

#[tokio::test]
async fn empty_pool_is_not_found() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-e", "lawyer").await;
    let case_id = submit_case(&app, &lawyer, "Nobody home").await;

    let (status, resp) = post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["kind"], "NotFound");

    let case = fetch_case(&app, &case_id).await;
    assert!(case["assigned_registrar"].is_null());
}

#[tokio::test]
async fn unknown_case_is_not_found() {
    let app = test_app();
    create_reviewer(&app, "registrar-u", "registrar", 0).await;

    let missing = uuid::Uuid::new_v4();
    let (status, resp) = post_empty(&app, &format!("/case/{missing}/send-to-registrar")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["message"], "Case not found");
}

#[tokio::test]
async fn malformed_case_id_is_bad_request() {
    let app = test_app();
    let (status, _) = post_empty(&app, "/case/not-a-uuid/send-to-registrar").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stamp_reporter_and_judge_stages_fill_their_own_fields() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-s", "lawyer").await;
    let registrar = create_reviewer(&app, "registrar-s", "registrar", 0).await;
    let reporter = create_reviewer(&app, "reporter-s", "stamp-reporter", 0).await;
    let judge = create_reviewer(&app, "judge-s", "judge", 0).await;
    let case_id = submit_case(&app, &lawyer, "Staged").await;

    post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;
    let (status, resp) =
        post_empty(&app, &format!("/registrar/case-assignment/{case_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["stage"], "stamp-reporter");
    assert_eq!(resp["assigned_reviewer"], reporter);

    let (status, resp) = post_empty(&app, &format!("/case/{case_id}/send-to-judge")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["assigned_reviewer"], judge);

    let case = fetch_case(&app, &case_id).await;
    assert_eq!(case["assigned_registrar"], registrar);
    assert_eq!(case["assigned_stamp_reporter"], reporter);
    assert_eq!(case["judge_registrar"], judge);
    assert!(case["assigned_bench_clerk"].is_null());
}

#[tokio::test]
async fn forwarding_to_registrar_books_the_lawyer_ledger() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-f", "lawyer").await;
    create_reviewer(&app, "registrar-f", "registrar", 0).await;
    let case_id = submit_case(&app, &lawyer, "Forwarded").await;

    post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await;

    let token = login(&app, "lawyer-f").await;
    let (_, profile) = get_with_token(&app, "/me", &token).await;
    assert_eq!(profile["pending_cases"], 1);
    assert_eq!(profile["verified_cases"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_assignments_split_evenly() {
    let app = test_app();
    let lawyer = create_user(&app, "lawyer-c", "lawyer").await;
    let a = create_reviewer(&app, "registrar-a", "registrar", 0).await;
    let b = create_reviewer(&app, "registrar-b", "registrar", 0).await;

    let mut case_ids = Vec::new();
    for i in 0..8 {
        case_ids.push(submit_case(&app, &lawyer, &format!("Parallel {i}")).await);
    }

    let mut tasks = tokio::task::JoinSet::new();
    for case_id in case_ids {
        let app = app.clone();
        tasks.spawn(async move {
            post_empty(&app, &format!("/case/{case_id}/send-to-registrar")).await
        });
    }

    let mut assignees = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (status, resp) = joined.unwrap();
        assert_eq!(status, StatusCode::OK, "assignment failed: {resp}");
        assignees.push(resp["assigned_reviewer"].as_str().unwrap().to_string());
    }

    let to_a = assignees.iter().filter(|id| **id == a).count();
    let to_b = assignees.iter().filter(|id| **id == b).count();
    assert_eq!((to_a, to_b), (4, 4));

    for reviewer in [&a, &b] {
        let (_, listing) = get(&app, &format!("/get-cases/{reviewer}")).await;
        assert_eq!(listing["cases"].as_array().unwrap().len(), 4);
    }
}
