//! Unit tests for the github_client crate.

use super::*; // Import items from lib.rs
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> GitHubClient {
    let octocrab = octocrab::Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .personal_token("ghp_test_token".to_string())
        .build()
        .unwrap();
    GitHubClient::new(octocrab)
}

#[tokio::test]
async fn test_request_posts_remaining_params_as_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/terraform-aws-vpc/labels"))
        .and(body_json(json!({
            "name": "major",
            "description": "Release: major (x.0.0)",
            "color": "94FFA4"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "name": "major"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .request(
            "POST /repos/{owner}/{repo}/labels",
            &json!({
                "owner": "acme",
                "repo": "terraform-aws-vpc",
                "name": "major",
                "description": "Release: major (x.0.0)",
                "color": "94FFA4"
            }),
        )
        .await;

    if let Err(e) = &result {
        eprintln!("request error: {e:?}");
    }
    assert_eq!(result.unwrap()["name"], "major");
}

#[tokio::test]
async fn test_request_sends_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/acme/vpc"))
        .and(header("authorization", "Bearer ghp_test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "vpc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .request(
            "PATCH /repos/{owner}/{repo}",
            &json!({"owner": "acme", "repo": "vpc", "allow_auto_merge": true}),
        )
        .await;

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
}

#[tokio::test]
async fn test_request_get_uses_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/vpc/labels"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "major"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .request(
            "GET /repos/{owner}/{repo}/labels",
            &json!({"owner": "acme", "repo": "vpc", "per_page": 100}),
        )
        .await
        .unwrap();

    assert_eq!(result, json!([{"name": "major"}]));
}

#[tokio::test]
async fn test_request_empty_body_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/vpc/labels/major"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .request(
            "DELETE /repos/{owner}/{repo}/labels/{name}",
            &json!({"owner": "acme", "repo": "vpc", "name": "major"}),
        )
        .await
        .unwrap();

    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn test_request_already_exists_is_detectable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/cloud-native-toolkit/template-terraform-module/generate"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Repository creation failed.",
            "errors": [{
                "resource": "Repository",
                "code": "custom",
                "field": "name",
                "message": "name already exists on this account"
            }],
            "documentation_url": "https://docs.github.com/rest/repos/repos#create-a-repository-using-a-template"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let error = client
        .request(
            "POST /repos/{template_owner}/{template_repo}/generate",
            &json!({
                "template_owner": "cloud-native-toolkit",
                "template_repo": "template-terraform-module",
                "owner": "acme",
                "name": "terraform-aws-vpc"
            }),
        )
        .await
        .unwrap_err();

    assert!(error.is_already_exists(), "unexpected error: {error:?}");
    assert_eq!(error.status(), Some(422));
}

#[tokio::test]
async fn test_request_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/acme/vpc/branches/gh-pages/protection"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let error = client
        .request(
            "PUT /repos/{owner}/{repo}/branches/{branch}/protection",
            &json!({"owner": "acme", "repo": "vpc", "branch": "gh-pages", "enforce_admins": true}),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, Error::NotFound), "unexpected error: {error:?}");
}

#[tokio::test]
async fn test_request_invalid_route_makes_no_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let error = client
        .request("POST /repos/{owner}/{repo}/releases", &json!({"owner": "acme"}))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::InvalidRoute { .. }));
}

#[tokio::test]
async fn test_create_token_client() {
    let token = SecretString::from("ghp_test_token".to_string());

    let result = create_token_client(&token);

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_token_client_with_invalid_base_uri() {
    let token = SecretString::from("ghp_test_token".to_string());

    let result = create_token_client_with_base_uri(&token, "not a uri");

    assert!(matches!(result, Err(Error::AuthError(_))));
}

#[test]
fn test_validation_message() {
    assert_eq!(
        validation_message(&json!({"code": "custom", "message": "name already exists on this account"})),
        "name already exists on this account"
    );
    assert_eq!(validation_message(&json!("plain")), "plain");
    assert_eq!(
        validation_message(&json!({"code": "missing_field", "field": "name"})),
        r#"{"code":"missing_field","field":"name"}"#
    );
}
