use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use marquee::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_app(tmdb: &MockServer) -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.static_path = "does-not-exist".to_string();
    config.tmdb.base_url = tmdb.uri();
    config.tmdb.api_key = Some("test-key".to_string());
    config.tmdb.request_timeout_seconds = 2;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;

    let state = marquee::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    marquee::api::router(state)
        .await
        .expect("Failed to build router")
}

async fn mount_fight_club(tmdb: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 550,
            "title": "Fight Club",
            "overview": "An insomniac office worker and a soap maker form an underground club.",
            "poster_path": "/abc.jpg",
            "vote_average": 8.4,
            "genres": [{"id": 18, "name": "Drama"}],
            "credits": {
                "cast": (0..12).map(|i| json!({"name": format!("Actor {i}")})).collect::<Vec<_>>(),
                "crew": (0..8).map(|i| json!({"name": format!("Crew {i}")})).collect::<Vec<_>>()
            },
            "videos": {"results": [
                {"site": "YouTube", "key": "a"},
                {"site": "Vimeo", "key": "b"},
                {"site": "YouTube", "key": "c"}
            ]},
            "similar": {"results": (0..10).map(|i| json!({"id": i})).collect::<Vec<_>>()}
        })))
        .mount(tmdb)
        .await;
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn request(method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn admin_cookie(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/login",
            Some(json!({"username": "admin", "password": "admin123"})),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_add_list_duplicate_delete() {
    let tmdb = MockServer::start().await;
    mount_fight_club(&tmdb).await;
    let app = spawn_app(&tmdb).await;
    let cookie = admin_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/add",
            Some(json!({"movie_id": 550, "category": "Featured"})),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["message"], "Recommendation added successfully");
    let recommendation_id = body["data"]["recommendation_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/add",
            Some(json!({"movie_id": "550"})),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Movie already exists in recommendations");

    let response = app
        .clone()
        .oneshot(request("GET", "/recommendations", None, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["count"], 1);
    let record = &body["data"]["results"][0];
    assert_eq!(record["movie_id"], 550);
    assert_eq!(record["movie_title"], "Fight Club");
    assert_eq!(record["category"], "Featured");
    assert_eq!(record["is_active"], true);
    assert!(record["image_url"].as_str().unwrap().ends_with("/abc.jpg"));

    let response = app
        .clone()
        .oneshot(request("GET", "/admin/dashboard", None, Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["stats"]["recommendations"], 1);
    assert_eq!(body["data"]["stats"]["active_recommendations"], 1);
    assert_eq!(
        body["data"]["recent_recommendations"][0]["movie_title"],
        "Fight Club"
    );

    let delete_uri = format!("/admin/delete/{recommendation_id}");
    let response = app
        .clone()
        .oneshot(request("DELETE", &delete_uri, None, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["message"], "Recommendation deleted successfully");

    let response = app
        .clone()
        .oneshot(request("DELETE", &delete_uri, None, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Recommendation not found");

    let response = app
        .oneshot(request("GET", "/admin/recommendations", None, Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_add_unknown_movie_leaves_store_unchanged() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&tmdb)
        .await;
    let app = spawn_app(&tmdb).await;
    let cookie = admin_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/add",
            Some(json!({"movie_id": 999_999})),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Movie not found in TMDB");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/add",
            Some(json!({"description": "no id"})),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Movie ID is required");

    let response = app
        .oneshot(request("GET", "/recommendations", None, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_anonymous_add_never_reaches_upstream() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&tmdb)
        .await;
    let app = spawn_app(&tmdb).await;

    let response = app
        .oneshot(request(
            "POST",
            "/admin/add",
            Some(json!({"movie_id": 550})),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_delete_leaves_recommendation_in_place() {
    let tmdb = MockServer::start().await;
    mount_fight_club(&tmdb).await;
    let app = spawn_app(&tmdb).await;
    let cookie = admin_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/add",
            Some(json!({"movie_id": 550})),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let recommendation_id = body["data"]["recommendation_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/admin/delete/{recommendation_id}"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication required");

    let response = app
        .oneshot(request("GET", "/recommendations", None, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["id"], recommendation_id);
    assert_eq!(body["data"]["results"][0]["movie_id"], 550);
}

#[tokio::test]
async fn test_browse_endpoints_proxy_upstream() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "results": [{"id": 1, "title": "Popular Movie"}]
        })))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "fight club"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [{"id": 550, "title": "Fight Club"}]
        })))
        .mount(&tmdb)
        .await;
    let app = spawn_app(&tmdb).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/popular?page=2", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["results"][0]["title"], "Popular Movie");

    let response = app
        .clone()
        .oneshot(request("GET", "/trending", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "TMDB service is unavailable");

    let response = app
        .oneshot(request("GET", "/search?query=fight%20club", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["results"][0]["id"], 550);
}

#[tokio::test]
async fn test_movie_details_are_trimmed() {
    let tmdb = MockServer::start().await;
    mount_fight_club(&tmdb).await;
    Mock::given(method("GET"))
        .and(path("/movie/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&tmdb)
        .await;
    let app = spawn_app(&tmdb).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/movie/550", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let movie = &body["data"];
    assert_eq!(movie["title"], "Fight Club");
    assert_eq!(movie["cast"].as_array().unwrap().len(), 10);
    assert_eq!(movie["crew"].as_array().unwrap().len(), 5);
    assert_eq!(movie["videos"].as_array().unwrap().len(), 2);
    assert_eq!(movie["similar"].as_array().unwrap().len(), 6);

    let response = app
        .oneshot(request("GET", "/api/movie/1", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
