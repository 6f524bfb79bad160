// API Integration Tests
//
// Purpose: Exercise every endpoint through the router, including error bodies
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use soil_suitability_rust::{create_router, AppState, Thresholds};
    use tower::ServiceExt; // for oneshot

    // Helper: Create test app with built-in thresholds
    fn create_test_app() -> axum::Router {
        create_router(AppState::new(Thresholds::default()))
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // =========================================================================
    // Section 1: Health Check
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["message"].is_string());
        assert!(body["timestamp"].is_string());
    }

    // =========================================================================
    // Section 2: Single Analysis
    // =========================================================================

    #[tokio::test]
    async fn test_analyze_wet_clay() {
        let request = post_json(
            "/api/analyze-suitability",
            &json!({"soil_data": {"LL": 60, "PL": 25, "PI": 35, "F": 60, "NMC": 30, "OMC%": 18}}),
        );
        let response = create_test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["classification"], "CH - Clay of High Plasticity");
        assert_eq!(body["suitability"], "UNSUITABLE");
        assert!(body["risks"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r.as_str().unwrap().starts_with("Swelling risk")));
        assert_eq!(body["parameters"]["OMC%"], 18.0);
    }

    #[tokio::test]
    async fn test_analyze_form_payload() {
        let request = post_json(
            "/api/analyze-suitability",
            &json!({"soil_data": {
                "LL": "", "PL": "", "PI": "",
                "G": "10", "CS": "30", "MS": "30", "FS": "20", "F": "10",
                "OMC%": "12", "MDD (kN/m3)": "18", "NMC (%)": "11"
            }}),
        );
        let response = create_test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["classification"], "SW - Well-graded Sand");
        assert_eq!(body["suitability"], "SUITABLE");
        assert_eq!(body["risks"], json!([]));
        assert_eq!(
            body["recommendations"],
            json!(["Proceed with standard foundation design as per IS codes"])
        );
    }

    #[tokio::test]
    async fn test_repeated_request_served_from_cache() {
        let state = AppState::new(Thresholds::default());
        let app = create_router(state.clone());
        let payload = json!({"soil_data": {"F": 70, "LL": 40, "PI": 20}});

        let first = app
            .clone()
            .oneshot(post_json("/api/analyze-suitability", &payload))
            .await
            .unwrap();
        let first = json_response(first).await;

        state.cache.run_pending_tasks().await;
        assert_eq!(state.cache.entry_count(), 1);

        let second = app
            .oneshot(post_json("/api/analyze-suitability", &payload))
            .await
            .unwrap();
        assert_eq!(json_response(second).await, first);
    }

    // =========================================================================
    // Section 3: Error Responses
    // =========================================================================

    #[tokio::test]
    async fn test_empty_soil_data_is_400() {
        let response = create_test_app()
            .oneshot(post_json("/api/analyze-suitability", &json!({"soil_data": {}})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_response(response).await;
        assert_eq!(body["error"], "no parameters supplied");
        assert_eq!(body["kind"], "no_parameters");
    }

    #[tokio::test]
    async fn test_missing_soil_data_is_400() {
        let response = create_test_app()
            .oneshot(post_json("/api/analyze-suitability", &json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_response(response).await["kind"], "no_parameters");
    }

    #[tokio::test]
    async fn test_out_of_range_is_422_with_fields() {
        let response = create_test_app()
            .oneshot(post_json(
                "/api/analyze-suitability",
                &json!({"soil_data": {"LL": 130, "F": -3, "G": "lots"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_response(response).await;
        assert_eq!(body["kind"], "invalid_values");
        assert!(body["error"].is_string());

        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["LL", "G", "F"]);
        assert_eq!(body["fields"][0]["reason"], "out_of_range");
        assert_eq!(body["fields"][1]["reason"], "non_numeric");
    }

    #[tokio::test]
    async fn test_malformed_json_has_error_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze-suitability")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"soil_data\": "))
            .unwrap();
        let response = create_test_app().oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
        let body = json_response(response).await;
        assert_eq!(body["kind"], "malformed_request");
        assert!(body["error"].is_string());
    }

    // =========================================================================
    // Section 4: Batch Analysis
    // =========================================================================

    #[tokio::test]
    async fn test_batch_mixed_outcomes() {
        let payload = json!({"samples": [
            {"LL": 60, "PL": 25, "PI": 35, "F": 60, "NMC": 30, "OMC%": 18},
            {},
            {"G": 40, "CS": 20, "MS": 20, "FS": 25, "F": 10},
            {"MDD": 45}
        ]});
        let response = create_test_app()
            .oneshot(post_json("/api/analyze-suitability/batch", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);

        assert_eq!(results[0]["ok"], true);
        assert_eq!(results[0]["result"]["suitability"], "UNSUITABLE");
        assert_eq!(results[1]["ok"], false);
        assert_eq!(results[1]["kind"], "no_parameters");
        assert_eq!(results[2]["index"], 2);
        assert!(results[2]["result"]["risks"][0]
            .as_str()
            .unwrap()
            .starts_with("Grading data anomaly"));
        assert_eq!(results[3]["kind"], "invalid_values");
        assert_eq!(results[3]["fields"][0]["field"], "MDD");

        assert_eq!(body["summary"]["total"], 4);
        assert_eq!(body["summary"]["analyzed"], 2);
        assert_eq!(body["summary"]["rejected"], 2);
    }

    #[tokio::test]
    async fn test_batch_too_large() {
        let samples: Vec<Value> = (0..1001).map(|_| json!({"F": 60})).collect();
        let response = create_test_app()
            .oneshot(post_json("/api/analyze-suitability/batch", &json!({ "samples": samples })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_response(response).await["kind"], "bad_request");
    }
}
