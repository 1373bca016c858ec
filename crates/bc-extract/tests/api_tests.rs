//! Tests de integración contra un servidor HTTP simulado: paginación
//! completa, política de reintento tras 401 y listado de compañías.
//!
//! El cliente es bloqueante; dentro del runtime de tokio (que necesita
//! wiremock) cada escenario corre en `spawn_blocking`.

use bc_core::{CompanyRepository, EntityExtractor, EtlError};
use bc_extract::{ApiConfig, BcClient, BcRepository, PaginatedExtractor, SharedClient, TokenManager};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server_uri: &str) -> ApiConfig {
    ApiConfig { tenant_id: "t1".into(),
                client_id: "client".into(),
                client_secret: "secret".into(),
                scope: "api://bc/.default".into(),
                environment: "test".into(),
                login_url: server_uri.into(),
                api_url: server_uri.into() }
}

fn client_for(server_uri: &str) -> (SharedClient, String) {
    let config = test_config(server_uri);
    let http = reqwest::blocking::Client::new();
    let tokens = TokenManager::new(config.clone(), http.clone());
    (BcClient::new(http, tokens).into_shared(), config.base_url().to_string())
}

fn extractor_for(server_uri: &str) -> PaginatedExtractor {
    let (client, base_url) = client_for(server_uri);
    PaginatedExtractor::new(client, base_url)
}

fn repository_for(server_uri: &str) -> BcRepository {
    let (client, base_url) = client_for(server_uri);
    BcRepository::new(client, base_url)
}

async fn mount_token_grant(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/t1/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!({"access_token": "tok-1", "expires_in": 3600, "token_type": "Bearer"})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn page(rows: Vec<Value>, next_link: Option<String>) -> Value {
    let mut body = json!({ "value": rows });
    if let Some(link) = next_link {
        body["@odata.nextLink"] = json!(link);
    }
    body
}

fn customer_rows(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(|i| json!({"id": format!("c{i}"), "name": format!("Cliente {i}")})).collect()
}

#[tokio::test]
async fn three_page_extraction_returns_all_rows_in_server_order() {
    let server = MockServer::start().await;
    mount_token_grant(&server, 1).await;

    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/companies(A)/customers"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(page(customer_rows(0..5), Some(format!("{base}/page2")))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(page(customer_rows(5..8), Some(format!("{base}/page3")))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(customer_rows(8..10), None)))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let dataset = tokio::task::spawn_blocking(move || {
        extractor_for(&uri).extract("customers", "A")
    }).await.unwrap().unwrap();

    assert_eq!(dataset.len(), 10);
    let ids: Vec<&str> = dataset.rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn single_401_triggers_exactly_one_reauthentication() {
    let server = MockServer::start().await;
    // un 401 inicial fuerza un segundo grant
    mount_token_grant(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/companies(A)/customers"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies(A)/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(customer_rows(0..2), None)))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let dataset = tokio::task::spawn_blocking(move || {
        extractor_for(&uri).extract("customers", "A")
    }).await.unwrap().unwrap();

    assert_eq!(dataset.len(), 2);
}

#[tokio::test]
async fn repeated_401_fails_with_auth_without_third_attempt() {
    let server = MockServer::start().await;
    mount_token_grant(&server, 2).await;

    // exactamente dos intentos: el original y el reintento post-reauth
    Mock::given(method("GET"))
        .and(path("/companies(A)/customers"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        extractor_for(&uri).extract("customers", "A")
    }).await.unwrap().unwrap_err();

    assert!(matches!(err, EtlError::Auth(_)));
}

#[tokio::test]
async fn blank_company_id_fails_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        extractor_for(&uri).extract("customers", "   ")
    }).await.unwrap().unwrap_err();

    assert!(matches!(err, EtlError::InvalidArgument(_)));
}

#[tokio::test]
async fn token_is_cached_across_extractions() {
    let server = MockServer::start().await;
    // dos extracciones, un único grant
    mount_token_grant(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/companies(A)/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], None)))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut extractor = extractor_for(&uri);
        extractor.extract("projects", "A").unwrap();
        extractor.extract("projects", "A").unwrap();
    }).await.unwrap();
}

#[tokio::test]
async fn repository_and_extractor_share_one_token_grant() {
    let server = MockServer::start().await;
    // listado de compañías + extracción: un único grant para ambos
    mount_token_grant(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(page(vec![json!({"id": "A", "name": "Alfa"})], None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies(A)/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(customer_rows(0..3), None)))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let (client, base_url) = client_for(&uri);
        let mut repository = BcRepository::new(client.clone(), base_url.clone());
        let mut extractor = PaginatedExtractor::new(client, base_url);

        let companies = repository.companies().unwrap();
        assert_eq!(companies.len(), 1);
        let dataset = extractor.extract("customers", &companies[0].id).unwrap();
        assert_eq!(dataset.len(), 3);
    }).await.unwrap();
}

#[tokio::test]
async fn server_error_surfaces_as_extraction_with_context() {
    let server = MockServer::start().await;
    mount_token_grant(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/companies(B)/projects"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        extractor_for(&uri).extract("projects", "B")
    }).await.unwrap().unwrap_err();

    match err {
        EtlError::Extraction { entity, company_id, .. } => {
            assert_eq!(entity, "projects");
            assert_eq!(company_id, "B");
        }
        other => panic!("expected Extraction error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_grant_surfaces_as_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(400)
            .set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        extractor_for(&uri).extract("customers", "A")
    }).await.unwrap().unwrap_err();

    assert!(matches!(err, EtlError::Auth(_)));
}

#[tokio::test]
async fn company_listing_follows_pagination() {
    let server = MockServer::start().await;
    mount_token_grant(&server, 1).await;

    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(page(vec![json!({"id": "A", "name": "Alfa"}),
                                     json!({"id": "B", "name": "Beta"})],
                                Some(format!("{base}/companies-p2")))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies-p2"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(page(vec![json!({"id": "C", "name": "Gamma", "country": "ES"})], None)))
        .mount(&server)
        .await;

    let uri = server.uri();
    let companies = tokio::task::spawn_blocking(move || {
        repository_for(&uri).companies()
    }).await.unwrap().unwrap();

    assert_eq!(companies.len(), 3);
    assert_eq!(companies[2].id, "C");
    assert_eq!(companies[2].extra.get("country").unwrap(), "ES");
}
