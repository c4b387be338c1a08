mod common;

use common::*;
use harbor_ops::error::HarborError;
use harbor_ops::logging::Logger;
use harbor_ops::operations::{CheckStatus, ImageChecker, ImageMover, MoveOutcome};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_any_delete(server: &MockServer, status: u16) {
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/repositories/.+/tags/.+$"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn move_pulls_retags_pushes_and_deletes() {
    let server = MockServer::start().await;
    mock_projects_exist(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/repositories/library/team/app/tags/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let outcome = mover
        .move_image("library/team/app:1.0", "team/app:1.0")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Moved {
            from: "library/team/app:1.0".to_string(),
            to: "team/app:1.0".to_string(),
        }
    );

    let registry = registry_address(&server);
    assert_eq!(
        engine.calls(),
        vec![
            format!("pull {}/library/team/app:1.0", registry),
            format!("tag sha256:abc {}/team/app:1.0", registry),
            format!("push {}/team/app:1.0", registry),
        ]
    );
}

#[tokio::test]
async fn move_without_pulled_image_is_a_silent_no_op() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let engine = FakeEngine::empty();
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let outcome = mover.move_image("team/app", "other/app").await.unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Skipped {
            reference: "team/app".to_string()
        }
    );
    assert_eq!(engine.calls().len(), 1);
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn missing_target_project_is_created_before_push() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/api/projects"))
        .and(query_param("project_name", "fresh"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    mock_any_delete(&server, 200).await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    mover.move_image("team/app", "fresh/app").await.unwrap();
    assert!(engine.calls().iter().any(|call| call.starts_with("push ")));
}

#[tokio::test]
async fn moving_an_image_onto_itself_is_refused_before_pulling() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let err = mover.move_image("team/app", "team/app:latest").await.unwrap_err();
    assert!(matches!(err, HarborError::Validation(_)));

    // `nginx` normalizes into the default project
    let err = mover.move_image("library/nginx:v1", "nginx:v1").await;
    assert!(matches!(err, Err(HarborError::Validation(_))));

    assert!(engine.calls().is_empty());
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn failed_delete_leaves_the_pushed_copy() {
    let server = MockServer::start().await;
    mock_projects_exist(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/repositories/team/app/tags/latest"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let err = mover.move_image("team/app", "other/app").await.unwrap_err();

    match err {
        HarborError::DeleteMismatch { reference, status } => {
            assert_eq!(reference, "team/app");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error {:?}", other),
    }
    let pushed = format!("push {}/other/app:latest", registry_address(&server));
    assert!(engine.calls().contains(&pushed));
}

#[tokio::test]
async fn batch_continues_past_a_failing_image() {
    let server = MockServer::start().await;
    mock_projects_exist(&server).await;
    mock_any_delete(&server, 200).await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc").failing_on("/lib/two");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let moves = ["one", "two", "three"]
        .into_iter()
        .map(|name| (format!("lib/{}", name), format!("apps/{}", name)));
    let report = mover.move_all(moves).await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.moved, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].reference, "lib/two");
    assert!(matches!(report.failures[0].error, HarborError::Engine(_)));

    let registry = registry_address(&server);
    assert!(engine.calls().contains(&format!("push {}/apps/three:latest", registry)));
}

#[tokio::test]
async fn flatten_moves_nested_repositories_to_last_two_segments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(query_param("name", "library"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "project_id": 1, "name": "library" }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/repositories"))
        .and(query_param("project_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "library/nginx" },
            { "name": "library/team/app" },
            { "name": "library/a/b/c" }
        ])))
        .mount(&server)
        .await;
    mock_projects_exist(&server).await;
    mock_any_delete(&server, 200).await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc").failing_on("library/team/app");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let report = mover.flatten("library").await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.moved, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].reference, "library/team/app");
    assert!(!report.is_clean());

    let registry = registry_address(&server);
    assert!(engine.calls().contains(&format!("push {}/b/c:latest", registry)));
    assert!(!engine.calls().iter().any(|call| call.contains("library/nginx")));
}

#[tokio::test]
async fn flatten_of_unknown_project_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let engine = FakeEngine::with_image("sha256:abc");
    let mover = ImageMover::new(&client, &engine, quiet_parser(), Logger::new_quiet());

    let err = mover.flatten("ghost").await.unwrap_err();
    assert!(matches!(err, HarborError::ProjectNotFound(_)));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn check_looks_up_normalized_tag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/repositories/library/nginx/tags/latest"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/repositories/team/app/tags/2.0"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let checker = ImageChecker::new(&client, quiet_parser());

    assert!(checker.check_image("nginx").await.unwrap());
    assert!(checker.check_image("registry.example.com/library/nginx").await.unwrap());
    assert!(!checker.check_image("team/app:2.0").await.unwrap());
}

#[tokio::test]
async fn check_records_unparseable_references_and_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/repositories/library/nginx/tags/latest"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/repositories/team/app/tags/2.0"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let checker = ImageChecker::new(&client, quiet_parser());

    let references: Vec<String> = ["nginx:1.19", "nginx", "team/app:2.0"]
        .into_iter()
        .map(String::from)
        .collect();
    let report = checker.check_all(&references).await;

    assert_eq!(report.entries.len(), 3);
    assert!(matches!(
        report.entries[0].1,
        CheckStatus::Failed(HarborError::Parse(_))
    ));
    assert!(matches!(report.entries[1].1, CheckStatus::Present));
    assert!(matches!(report.entries[2].1, CheckStatus::Missing));
    assert_eq!(report.failed(), 1);
    assert_eq!(report.missing(), 1);
    assert!(!report.is_clean());
}
