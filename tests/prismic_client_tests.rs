use serde_json::json;
use spacetraveling::client::{ContentSource, FetchError, PrismicClient};
use spacetraveling::config::{ClientConfig, PreviewData};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/api/v2/documents/search";

fn endpoint(server: &MockServer) -> String {
    format!("{}/api/v2", server.uri())
}

fn document(uid: &str, title: &str) -> serde_json::Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "post",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "last_publication_date": "2021-03-25T19:27:35+0000",
        "data": {
            "title": title,
            "subtitle": "Pensando em sincronização",
            "author": "Joseph Oliveira",
            "banner": { "url": "https://images.prismic.io/banner.png" },
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        { "type": "paragraph", "text": "Lorem ipsum dolor", "spans": [] }
                    ]
                }
            ]
        }
    })
}

async fn mount_master_ref(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "refs": [
                { "id": "preview-1", "ref": "other", "isMasterRef": false },
                { "id": "master", "ref": "master-ref", "isMasterRef": true }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn get_by_type_queries_master_ref_and_keeps_next_page() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    let next_page = format!("{}{}?ref=master-ref&page=2&pageSize=2", server.uri(), SEARCH_PATH);
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("ref", "master-ref"))
        .and(query_param("q", "[[at(document.type,\"post\")]]"))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total_pages": 2,
            "next_page": next_page,
            "results": [document("um", "Primeiro"), document("dois", "Segundo")]
        })))
        .mount(&server)
        .await;

    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();
    let listing = client.get_by_type("post", 2).await.unwrap();

    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.items[0].id, "um");
    assert_eq!(listing.items[0].title, "Primeiro");
    assert_eq!(
        listing.items[0].published_at.as_deref(),
        Some("2021-03-15T19:25:28+0000")
    );
    assert_eq!(listing.next_page_token.as_deref(), Some(next_page.as_str()));
}

#[tokio::test]
async fn get_all_by_type_follows_every_page() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    let next_page = format!("{}{}?ref=master-ref&page=2&pageSize=2", server.uri(), SEARCH_PATH);
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "total_pages": 2,
            "next_page": null,
            "results": [document("tres", "Terceiro")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "[[at(document.type,\"post\")]]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total_pages": 2,
            "next_page": next_page,
            "results": [document("um", "Primeiro"), document("dois", "Segundo")]
        })))
        .mount(&server)
        .await;

    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();
    let all = client.get_all_by_type("post", 2).await.unwrap();

    let ids: Vec<_> = all.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["um", "dois", "tres"]);
}

#[tokio::test]
async fn get_by_uid_maps_article_or_none() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "[[at(my.post.uid,\"como-utilizar-hooks\")]]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [document("como-utilizar-hooks", "Como utilizar Hooks")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "[[at(my.post.uid,\"missing\")]]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();

    let article = client
        .get_by_uid("post", "como-utilizar-hooks")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(article.id, "como-utilizar-hooks");
    assert_eq!(article.title, "Como utilizar Hooks");
    assert_eq!(article.sections.len(), 1);
    assert_eq!(article.sections[0].heading, "Proin et varius");
    assert!(article.is_edited());

    assert!(client.get_by_uid("post", "missing").await.unwrap().is_none());
    assert!(client.get_by_uid("post", "").await.unwrap().is_none());
}

#[tokio::test]
async fn access_token_is_sent_with_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .and(query_param("access_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "refs": [{ "id": "master", "ref": "master-ref", "isMasterRef": true }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("access_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(endpoint(&server)).with_access_token("secret");
    let client = PrismicClient::new(config).unwrap();
    let listing = client.get_by_type("post", 2).await.unwrap();

    assert!(listing.items.is_empty());
    assert!(!listing.has_more());
}

#[tokio::test]
async fn error_status_is_reported_without_query() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = ClientConfig::new(endpoint(&server)).with_access_token("secret");
    let client = PrismicClient::new(config).unwrap();

    match client.get_by_type("post", 2).await {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.ends_with(SEARCH_PATH));
            assert!(!url.contains("secret"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_master_ref_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "refs": [] })))
        .mount(&server)
        .await;

    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();
    assert!(matches!(
        client.get_by_type("post", 2).await,
        Err(FetchError::MissingRef)
    ));
}

#[tokio::test]
async fn preview_ref_replaces_master_ref() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("ref", "preview-ref"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [document("rascunho", "Rascunho")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(endpoint(&server)).with_preview(PreviewData {
        reference: "preview-ref".to_string(),
    });
    let client = PrismicClient::new(config).unwrap();

    let article = client.get_by_uid("post", "rascunho").await.unwrap();
    assert_eq!(article.map(|a| a.title).as_deref(), Some("Rascunho"));
}

#[tokio::test]
async fn page_token_for_another_host_is_rejected() {
    let server = MockServer::start().await;
    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();

    assert!(matches!(
        client
            .get_page("https://elsewhere.example.com/api/v2/documents/search?page=2")
            .await,
        Err(FetchError::InvalidUrl(_))
    ));
    assert!(matches!(
        client.get_page("not a url").await,
        Err(FetchError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn page_token_for_another_port_is_rejected() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&other)
        .await;

    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();
    let token = format!("{}{}?page=2", other.uri(), SEARCH_PATH);

    assert!(matches!(
        client.get_page(&token).await,
        Err(FetchError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn page_token_on_the_endpoint_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next_page": null,
            "results": [document("tres", "Terceiro")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PrismicClient::new(ClientConfig::new(endpoint(&server))).unwrap();
    let token = format!("{}{}?ref=master-ref&page=2", server.uri(), SEARCH_PATH);
    let listing = client.get_page(&token).await.unwrap();

    assert_eq!(listing.items[0].id, "tres");
    assert!(!listing.has_more());
}
