mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{bearer, test_app, UniverseBuilder, TEST_OWNER};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        json!(null)
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_needs_no_token() {
    let (app, _) = test_app();
    let (status, body) = send(app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn universe_routes_reject_missing_or_bad_tokens() {
    let (app, _) = test_app();
    let (status, body) = send(app.clone(), "GET", "/universe", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);

    let (status, _) = send(
        app,
        "GET",
        "/universe",
        Some("Bearer tester.badsignature"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_201_with_the_universe() {
    let (app, _) = test_app();
    let (status, body) = send(
        app,
        "POST",
        "/universe",
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "name": "Alpha", "seed": "S1", "difficulty": "beginner" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    assert_eq!(body["universe"]["name"], "Alpha");
    assert_eq!(body["universe"]["difficulty"], "beginner");
    assert_eq!(body["universe"]["status"], "running");
    assert!(body["universe"]["currentState"]["_scaleFactor"].is_number());
}

#[tokio::test]
async fn bad_difficulty_is_a_400() {
    let (app, _) = test_app();
    let (status, body) = send(
        app,
        "POST",
        "/universe",
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "difficulty": "nightmare" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("difficulty"));
}

#[tokio::test]
async fn listings_are_scoped_to_the_caller() {
    let (app, state) = test_app();
    let mine = UniverseBuilder::new().build();
    let theirs = UniverseBuilder::new().with_owner("someone-else").build();
    state.store.insert(&mine).unwrap();
    state.store.insert(&theirs).unwrap();

    let (status, body) = send(app, "GET", "/universe", Some(&bearer(TEST_OWNER)), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["universes"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], mine.id.to_string());
}

#[tokio::test]
async fn foreign_universes_read_as_not_found() {
    let (app, state) = test_app();
    let theirs = UniverseBuilder::new().with_owner("someone-else").build();
    state.store.insert(&theirs).unwrap();

    let uri = format!("/universe/{}", theirs.id);
    let (status, body) = send(app, "GET", &uri, Some(&bearer(TEST_OWNER)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn malformed_universe_ids_are_a_400() {
    let (app, _) = test_app();
    let (status, _) = send(
        app,
        "GET",
        "/universe/not-a-uuid",
        Some(&bearer(TEST_OWNER)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn simulate_advances_persists_and_reports() {
    let (app, state) = test_app();
    let universe = UniverseBuilder::new().with_seed("api-sim").build();
    state.store.insert(&universe).unwrap();

    let uri = format!("/universe/{}/simulate", universe.id);
    let (status, body) = send(
        app,
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "steps": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["stepsExecuted"], 10);
    assert!(body["stats"]["ageGyr"].as_f64().unwrap() > 0.0);
    assert!(body["predictions"]["overallRisk"].is_number());
    assert!(body["warnings"].is_array());

    // The run was persisted under a bumped version.
    let (stored, version) = state.store.load(universe.id).unwrap();
    assert_eq!(version, 2);
    assert_eq!(stored.metrics.total_steps_run, 10);
}

#[tokio::test]
async fn non_numeric_steps_are_a_400() {
    let (app, state) = test_app();
    let universe = UniverseBuilder::new().build();
    state.store.insert(&universe).unwrap();

    let uri = format!("/universe/{}/simulate", universe.id);
    let (status, body) = send(
        app,
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "steps": "many" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("steps"));
}

#[tokio::test]
async fn simulating_an_ended_universe_is_a_400() {
    let (app, state) = test_app();
    let mut universe = UniverseBuilder::new().with_seed("ended").build();
    universe.current_state.scale_factor = 2e9;
    state.store.insert(&universe).unwrap();

    let uri = format!("/universe/{}/simulate", universe.id);
    let (status, _) = send(
        app.clone(),
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "steps": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK); // the run that ends the universe

    let (status, body) = send(
        app,
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "steps": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ended"));
}

#[tokio::test]
async fn resolve_anomaly_full_flow() {
    let (app, state) = test_app();
    let mut universe = UniverseBuilder::new().with_seed("resolve-flow").build();
    // Drive until the generator has produced something to resolve.
    for _ in 0..20 {
        if !universe.anomalies.is_empty() || universe.is_ended() {
            break;
        }
        universe.current_state.age = 6e9;
        universe.current_state.galaxy_count = 2e11;
        universe.current_state.star_count = 1e20;
        cosmogenesis_core::orchestrator::run(&mut universe, 100, None).unwrap();
    }
    assert!(!universe.anomalies.is_empty(), "no anomalies to resolve");
    let target = universe.anomalies[0].id;
    state.store.insert(&universe).unwrap();

    let uri = format!("/universe/{}/resolve-anomaly", universe.id);
    let (status, body) = send(
        app.clone(),
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "anomalyId": target })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resolution"]["anomalyId"], target.to_string());

    // Resolving again violates the business rules.
    let (status, _) = send(
        app.clone(),
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "anomalyId": target })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown ids are 404, missing ids are 400.
    let (status, _) = send(
        app.clone(),
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "anomalyId": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app, "POST", &uri, Some(&bearer(TEST_OWNER)), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn read_endpoints_serve_projections() {
    let (app, state) = test_app();
    let mut universe = UniverseBuilder::new().with_seed("projections").build();
    cosmogenesis_core::orchestrator::run(&mut universe, 10, None).unwrap();
    state.store.insert(&universe).unwrap();

    for suffix in ["stats", "anomalies", "predictions", "end-conditions"] {
        let uri = format!("/universe/{}/{}", universe.id, suffix);
        let (status, body) = send(app.clone(), "GET", &uri, Some(&bearer(TEST_OWNER)), None).await;
        assert_eq!(status, StatusCode::OK, "GET {suffix} failed");
        assert_eq!(body["ok"], true, "GET {suffix} not ok");
    }

    let uri = format!("/universe/{}/stats", universe.id);
    let (_, body) = send(app.clone(), "GET", &uri, Some(&bearer(TEST_OWNER)), None).await;
    assert_eq!(body["stats"]["status"], "running");

    let uri = format!("/universe/{}/end-conditions", universe.id);
    let (_, body) = send(app, "GET", &uri, Some(&bearer(TEST_OWNER)), None).await;
    assert_eq!(body["status"]["ended"], false);
}

#[tokio::test]
async fn cleanup_endpoint_reports_removed_and_remaining() {
    let (app, state) = test_app();
    let universe = UniverseBuilder::new().build();
    state.store.insert(&universe).unwrap();

    let uri = format!("/universe/{}/cleanup-anomalies", universe.id);
    let (status, body) = send(
        app.clone(),
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "keepRecentMinutes": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 0);
    assert_eq!(body["remaining"], 0);

    let (status, _) = send(
        app,
        "POST",
        &uri,
        Some(&bearer(TEST_OWNER)),
        Some(json!({ "keepRecentMinutes": "soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_acknowledges_and_removes() {
    let (app, state) = test_app();
    let universe = UniverseBuilder::new().build();
    state.store.insert(&universe).unwrap();

    let uri = format!("/universe/{}", universe.id);
    let (status, body) = send(app.clone(), "DELETE", &uri, Some(&bearer(TEST_OWNER)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], universe.id.to_string());

    let (status, _) = send(app, "GET", &uri, Some(&bearer(TEST_OWNER)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
