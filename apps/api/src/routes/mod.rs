pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analysis))
        .route("/api/v1/plan", post(handlers::handle_plan))
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    fn app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        build_router(AppState::new(config))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn scenario(constraints: Value) -> Value {
        json!({
            "resume_skills": ["Python"],
            "requirements": [
                {"skill": "Python", "tier": "required"},
                {"skill": "SQL", "tier": "preferred"},
                {"skill": "Docker", "tier": "bonus"}
            ],
            "remediation": [
                {"skill": "SQL", "time_months": 2.0, "cost_dollars": 100.0},
                {"skill": "Docker", "time_months": 1.0, "cost_dollars": 50.0}
            ],
            "constraints": constraints
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["similarity_backend"], "levenshtein");
    }

    #[tokio::test]
    async fn test_analysis_endpoint_scores_and_ranks_gaps() {
        let (status, body) = post_json(
            "/api/v1/analysis",
            scenario(json!({"time_budget_months": 2.0, "cost_budget_dollars": 120.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let score = body["score"].as_f64().unwrap();
        assert!((score - 0.526).abs() < 0.001);
        assert_eq!(body["gaps"][0]["skill"], "sql");
        assert_eq!(body["gaps"][1]["skill"], "docker");
        assert_eq!(body["verdicts"]["python"]["kind"], "present_exact");
        assert!(body["analysis_id"].is_string());
        assert_eq!(body["recommendations"][0]["skill"], "sql");
        assert_eq!(body["recommendations"][0]["tier"], "preferred");
        assert_eq!(
            body["recommendations"][0]["resources"][0]["platform"],
            "Coursera"
        );
        assert!(body["recommendations"][1]["resume_bullet"]
            .as_str()
            .unwrap()
            .starts_with("Deployed scalable infrastructure using docker"));
    }

    #[tokio::test]
    async fn test_plan_endpoint_selects_sql() {
        let (status, body) = post_json(
            "/api/v1/plan",
            scenario(json!({"time_budget_months": 2.0, "cost_budget_dollars": 120.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"]["selected"], json!(["sql"]));
        assert_eq!(body["plan"]["method"], "exact");
        let projected = body["projected_score"].as_f64().unwrap();
        assert!(projected > body["analysis"]["score"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn test_plan_endpoint_rejects_negative_budget() {
        let (status, body) = post_json(
            "/api/v1/plan",
            scenario(json!({"time_budget_months": -1.0, "cost_budget_dollars": 120.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_CONSTRAINTS");
    }

    #[tokio::test]
    async fn test_analysis_endpoint_rejects_empty_requirements() {
        let (status, body) = post_json(
            "/api/v1/analysis",
            json!({"resume_skills": ["Rust"], "requirements": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_optimize_endpoint_strict_unreachable_is_422() {
        let (status, body) = post_json(
            "/api/v1/optimize",
            json!({
                "gaps": [
                    {"skill": "spark", "tier": "required", "weight": 1.0,
                     "estimated_time_months": 6.0, "estimated_cost_dollars": 0.0}
                ],
                "constraints": {"time_budget_months": 1.0, "cost_budget_dollars": 0.0},
                "strict": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INFEASIBLE_SINGLETON");
    }

    #[tokio::test]
    async fn test_optimize_endpoint_returns_plan() {
        let (status, body) = post_json(
            "/api/v1/optimize",
            json!({
                "gaps": [
                    {"skill": "sql", "tier": "preferred", "weight": 0.6,
                     "estimated_time_months": 2.0, "estimated_cost_dollars": 100.0},
                    {"skill": "docker", "tier": "bonus", "weight": 0.3,
                     "estimated_time_months": 1.0, "estimated_cost_dollars": 50.0}
                ],
                "constraints": {"time_budget_months": 2.0, "cost_budget_dollars": 120.0},
                "approximate_only": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected"], json!(["sql"]));
        assert_eq!(body["method"], "approximate");
        assert_eq!(body["fallback_reason"], "exact solver disabled");
    }
}
