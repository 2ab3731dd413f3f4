use jsonapi_binding::mock::MockTransport;
use jsonapi_binding::{
    BindingConfig, Method, RawResponse, ResourceObject, TransportError, TypedBinding, WireDocument,
};
use jsonapi_sample::clients::AuthorClient;
use jsonapi_sample::error::AuthorError;
use jsonapi_sample::lifecycle::{next_response, BindingSystem};
use jsonapi_sample::model::Author;
use serde_json::json;

const BASE: &str = "https://api.example.com";

fn author_document(id: &str, name: &str) -> WireDocument {
    WireDocument::single(
        ResourceObject::new("authors", id)
            .with_attribute("name", name)
            .with_attribute("birthYear", 1815),
    )
}

/// Full flow over a mocked transport: open, load, rename, shut down.
#[tokio::test]
async fn test_load_and_rename_author() {
    let mock = MockTransport::new();
    mock.expect_get(format!("{BASE}/authors/17"))
        .return_document(author_document("17", "Ada"));
    mock.expect_patch(format!("{BASE}/authors/17"))
        .return_document(author_document("17", "Ada Lovelace"));

    let mut system = BindingSystem::with_transport(mock.clone()).expect("system starts");
    let handle = system
        .open(BindingConfig::new(BASE, "/authors/17"))
        .expect("binding opens");
    let authors = AuthorClient::new(handle.client().clone());

    assert!(next_response(handle.events()).await.unwrap());
    let author = authors.author().await.unwrap();
    assert_eq!(author.id.as_deref(), Some("17"));
    assert_eq!(author.name, "Ada");
    assert_eq!(author.birth_year, Some(1815));

    authors.rename("Ada Lovelace").await.unwrap();
    assert!(next_response(handle.events()).await.unwrap());
    authors.check().await.unwrap();
    assert_eq!(authors.author().await.unwrap().name, "Ada Lovelace");

    drop(authors);
    system.shutdown().await.unwrap();

    let calls = mock.calls();
    let patch = &calls[1];
    assert_eq!(patch.method, Method::Patch);
    let body = patch.body.as_ref().unwrap().to_value().unwrap();
    assert_eq!(body["data"]["attributes"]["name"], json!("Ada Lovelace"));
    assert_eq!(body["data"]["id"], json!("17"));
    mock.verify();
}

#[tokio::test]
async fn test_create_author_posts_the_model() {
    let mock = MockTransport::new();
    mock.expect_get(format!("{BASE}/authors"))
        .return_ok(RawResponse::empty(204));
    mock.expect_post(format!("{BASE}/authors")).return_ok(
        RawResponse::new(201, author_document("42", "Grace")).with_header("Location", "/authors/42"),
    );

    let mut system = BindingSystem::with_transport(mock.clone()).unwrap();
    let handle = system.open(BindingConfig::new(BASE, "/authors")).unwrap();
    let authors = AuthorClient::new(handle.client().clone());

    // Nothing to load from an empty reply.
    assert!(!next_response(handle.events()).await.unwrap());
    assert!(matches!(authors.author().await, Err(AuthorError::NotLoaded)));

    authors
        .create_author(Author::new("Grace").with_birth_year(1906))
        .await
        .unwrap();
    assert!(next_response(handle.events()).await.unwrap());
    assert_eq!(authors.author().await.unwrap().id.as_deref(), Some("42"));

    drop(authors);
    system.shutdown().await.unwrap();

    let calls = mock.calls();
    let post = &calls[1];
    assert_eq!(post.method, Method::Post);
    let body = post.body.as_ref().unwrap().to_value().unwrap();
    assert_eq!(body["data"]["type"], json!("authors"));
    assert_eq!(body["data"]["attributes"], json!({ "name": "Grace", "birthYear": 1906 }));
    mock.verify();
}

#[tokio::test]
async fn test_failed_request_is_reported_by_check() {
    let mock = MockTransport::new();
    mock.expect_get(format!("{BASE}/authors/17"))
        .return_document(author_document("17", "Ada"));
    mock.expect_delete(format!("{BASE}/authors/17"))
        .return_err(TransportError::Status {
            path: format!("{BASE}/authors/17"),
            status: 403,
            response: RawResponse::empty(403),
        });

    let mut system = BindingSystem::with_transport(mock.clone()).unwrap();
    let handle = system.open(BindingConfig::new(BASE, "/authors/17")).unwrap();
    let authors = AuthorClient::new(handle.client().clone());
    assert!(next_response(handle.events()).await.unwrap());

    authors.remove().await.unwrap();
    assert!(!next_response(handle.events()).await.unwrap());
    assert!(matches!(authors.check().await, Err(AuthorError::RequestFailed(m)) if m.contains("403")));

    // The previously loaded author is still there.
    assert_eq!(authors.model().await.unwrap().unwrap().name, "Ada");

    drop(authors);
    system.shutdown().await.unwrap();
    mock.verify();
}
