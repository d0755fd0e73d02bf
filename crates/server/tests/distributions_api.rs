use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{AppState, app};
use services::services::{
    api_client::{ApiError, ApiService},
    config::ApiConfig,
    data_source::DistributionApi,
};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = DBService::new().await.unwrap();
    app(AppState::new(db))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn lists_first_page_with_defaults() {
    let (status, body) = get(test_app().await, "/api/distributions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(ids(&body).len(), 8);
    assert_eq!(body["data"][0]["deliveryChannel"], "Direct Distribution");
}

#[tokio::test]
async fn filters_by_completed_status() {
    let (status, body) = get(test_app().await, "/api/distributions?status=Completed").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|d| d["status"] == "Completed")
    );
}

#[tokio::test]
async fn combines_filters_and_ignores_empty_values() {
    let (status, body) = get(
        test_app().await,
        "/api/distributions?region=North&aidType=Food&status=&deliveryChannel=",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(ids(&body), vec!["dist-001", "dist-007"]);
}

#[tokio::test]
async fn status_with_space_is_decoded() {
    let (_, body) = get(test_app().await, "/api/distributions?status=In%20Progress").await;
    assert_eq!(body["total"], 2);
    assert_eq!(ids(&body), vec!["dist-002", "dist-007"]);
}

#[tokio::test]
async fn paginates_with_total_before_slicing() {
    let (status, body) = get(test_app().await, "/api/distributions?page=2&limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 3);
    assert_eq!(ids(&body), vec!["dist-004", "dist-005", "dist-006"]);

    let (_, past_end) = get(test_app().await, "/api/distributions?page=5&limit=3").await;
    assert_eq!(past_end["total"], 8);
    assert!(past_end["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn returns_single_distribution_with_beneficiaries() {
    let (status, body) = get(test_app().await, "/api/distributions/dist-001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "dist-001");
    assert_eq!(body["data"]["beneficiaries"], 150);
    assert_eq!(body["data"]["beneficiaryList"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["beneficiaryList"][0]["name"], "Amina Yusuf");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (status, body) = get(test_app().await, "/api/distributions/dist-999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "error": "Distribution not found" }));
}

#[tokio::test]
async fn invalid_query_is_bad_request() {
    let (status, body) = get(test_app().await, "/api/distributions?status=Lost").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

    let (status, _) = get(test_app().await, "/api/distributions?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn allows_any_origin() {
    let response = test_app()
        .await
        .oneshot(
            Request::get("/api/distributions")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn api_service_talks_to_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = test_app().await;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = ApiService::new(&ApiConfig::new(format!("http://{addr}"))).unwrap();

    let page = client
        .get_distributions(&db::models::distribution::DistributionFilters {
            region: Some("North".to_string()),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.limit, 2);
    assert_eq!(page.data.len(), 2);
    assert!(page.data.iter().all(|d| d.region == "North"));

    let one = client.get_distribution_by_id("dist-004").await.unwrap();
    assert_eq!(one.id, "dist-004");
    assert_eq!(one.beneficiary_list.map(|list| list.len()), Some(2));

    let missing = client.get_distribution_by_id("dist-404").await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}
