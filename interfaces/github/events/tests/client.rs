use std::time::Duration;

use interfaces_github_events::index::{FetchRepoError, GitHubClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&server.uri(), "secret", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetches_commits_with_bearer_token() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/cat/commits"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sha": "abc", "commit": {"message": "first"}},
            {"sha": "def", "commit": {"message": "second"}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let commits = client_for(&server).fetch_repo_commits("octo/cat").await?;

    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0]["sha"], "abc");
    Ok(())
}

#[tokio::test]
async fn fetches_events_of_any_type() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/cat/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"type": "PushEvent", "created_at": "2024-05-01T10:00:30Z", "id": "2"},
            {"type": "SomeBrandNewEvent", "created_at": "2024-05-01T10:00:00Z", "id": "1"}
        ])))
        .mount(&server)
        .await;

    let events = client_for(&server).fetch_repo_events("octo/cat").await?;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, "PushEvent");
    assert_eq!(events[1].event_type, "SomeBrandNewEvent");
    assert_eq!(events[1].created_at, "2024-05-01T10:00:00Z");
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/missing/events"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_repo_events("octo/missing")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchRepoError::ResponseStatus { .. }));
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/cat/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_repo_events("octo/cat")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchRepoError::ResponseDecode { .. }));
}

#[tokio::test]
async fn reachability_reports_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/cat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"full_name": "octo/cat"})))
        .mount(&server)
        .await;

    let result = client_for(&server).check_repo_reachable("octo/cat").await;

    assert!(result.accessible);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn reachability_catches_status_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/private"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client_for(&server).check_repo_reachable("octo/private").await;

    assert!(!result.accessible);
    let error = result.error.unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("403"));
}

#[tokio::test]
async fn reachability_catches_transport_errors() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = GitHubClient::new(&uri, "secret", Duration::from_secs(2)).unwrap();
    let result = client.check_repo_reachable("octo/cat").await;

    assert!(!result.accessible);
    assert!(!result.error.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn slow_responses_time_out_as_send_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/slow/commits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = GitHubClient::new(&server.uri(), "secret", Duration::from_secs(1)).unwrap();
    let err = client.fetch_repo_commits("octo/slow").await.unwrap_err();

    match err {
        FetchRepoError::RequestSend { source } => assert!(source.is_timeout()),
        other => panic!("unexpected error: {other}"),
    }
}
