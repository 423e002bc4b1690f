use std::time::Duration;

use mockito::{Matcher, Server};
use timesheet_api::{ApiError, JiraClient, JiraConfig};

const JQL: &str = "assignee = currentUser() AND updated >= startOfWeek()";
const BASIC_AUTH: &str = "Basic bWVAYWNtZS50ZXN0OmppcmEtc2VjcmV0";

fn client_for(server: &Server) -> JiraClient {
    let config = JiraConfig::new(server.url(), "me@acme.test", "jira-secret")
        .with_cooldown(Duration::ZERO)
        .with_timeout(Duration::from_secs(5));
    JiraClient::new(config).expect("client should build")
}

#[tokio::test]
async fn search_issues_sends_basic_auth_and_projects_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/api/3/search")
        .match_header("authorization", BASIC_AUTH)
        .match_header("accept", "application/json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("jql".into(), JQL.into()),
            Matcher::UrlEncoded("fields".into(), "summary,parent".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "startAt": 0,
                "total": 2,
                "issues": [
                    {"id": "10001", "key": "FND-1", "fields": {"summary": "Quarterly close",
                        "parent": {"id": "9000", "fields": {"summary": "Finance epic"}}}},
                    {"id": "10002", "key": "FND-2", "fields": {"summary": "Code review"}}
                ]
            }"#,
        )
        .create_async()
        .await;

    let issues = client_for(&server).search_issues(JQL).await.expect("search");

    mock.assert_async().await;
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].id, "10001");
    assert_eq!(issues[0].key, "FND-1");
    assert_eq!(issues[0].title, "Quarterly close");
    assert_eq!(issues[0].epic.as_deref(), Some("Finance epic"));
    assert_eq!(issues[1].epic, None);
}

#[tokio::test]
async fn search_issues_missing_summary_is_validation_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"issues":[{"id":"10001","key":"FND-1","fields":{}}]}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .search_issues(JQL)
        .await
        .expect_err("schema mismatch must fail");
    assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn search_issues_unauthorized_is_authentication_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("Unauthorized")
        .create_async()
        .await;

    let err = client_for(&server).search_issues(JQL).await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)), "got {err:?}");
}

#[tokio::test]
async fn search_issues_bad_request_keeps_status_and_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"errorMessages":["Error in the JQL Query"],"errors":{}}"#)
        .create_async()
        .await;

    match client_for(&server).search_issues(JQL).await.unwrap_err() {
        ApiError::Http { status, code, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(code.as_deref(), Some("Error in the JQL Query"));
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_myself_reads_identity() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/api/3/myself")
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"accountId":"5b10a2844c20165700ede21g","emailAddress":"me@acme.test",
                "displayName":"Pat Example","active":true,"timeZone":"Australia/Sydney"}"#,
        )
        .create_async()
        .await;

    let me = client_for(&server).get_myself().await.expect("identity");

    mock.assert_async().await;
    assert_eq!(me.account_id, "5b10a2844c20165700ede21g");
    assert_eq!(me.email_address, "me@acme.test");
    assert_eq!(me.display_name, "Pat Example");
}

#[tokio::test]
async fn get_myself_without_account_id_is_validation_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/myself")
        .with_status(200)
        .with_body(r#"{"emailAddress":"me@acme.test","displayName":"Pat"}"#)
        .create_async()
        .await;

    let err = client_for(&server).get_myself().await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
}
