//! HTTP 入口
//!
//! | 方法 | 路径 | 说明 |
//! |---|---|---|
//! | GET | `/learn/:topic` | 首次访问时运行自动链，返回快照 |
//! | GET | `/learn/:topic/status` | 只读当前快照 |
//! | POST | `/learn/:topic/retry` | 重试单个阶段 |
//! | POST | `/learn/:topic/paper` | 根据样卷生成试卷 |
//! | GET | `/health` | 健康检查 |

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::models::Stage;
use crate::orchestrator::{RetryScope, SessionRegistry};
use crate::services::GenerationService;
use crate::workflow::SessionSnapshot;

// ========== 请求 / 响应 ==========

#[derive(Debug, Clone, Deserialize)]
pub struct RetryBody {
    pub stage: Stage,
    /// 是否继续运行后续阶段
    #[serde(default)]
    pub chain: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperBody {
    #[serde(default)]
    pub sample_paper: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

// ========== 共享状态 ==========

pub struct AppState {
    pub registry: SessionRegistry,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: SessionRegistry::from_config(GenerationService::from_config(config), config),
        }
    }

    pub fn with_service(service: GenerationService) -> Self {
        Self {
            registry: SessionRegistry::new(service),
        }
    }
}

// ========== 错误映射 ==========

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Precondition(String),
    Generation(String),
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InputPrecondition { .. } => ApiError::Precondition(err.to_string()),
            _ => ApiError::Generation(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Precondition(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Generation(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// ========== 路由 ==========

/// 创建 HTTP 路由
///
/// # 参数
/// - `state`: 共享状态（会话注册表）
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/learn/:topic", get(handle_learn))
        .route("/learn/:topic/status", get(handle_status))
        .route("/learn/:topic/retry", post(handle_retry))
        .route("/learn/:topic/paper", post(handle_paper))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ========== 处理函数 ==========

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.registry.len().await,
    })
}

/// `GET /learn/:topic`
///
/// 自动链全部失败时返回 502 和唯一的阻塞错误
async fn handle_learn(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    if topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic must not be empty".to_string()));
    }

    let session = state.registry.get_or_create(&topic).await;
    let snapshot = session.ensure_started().await;

    if snapshot.all_failed {
        let message = snapshot
            .blocking_error
            .clone()
            .unwrap_or_else(|| format!("Could not generate any learning content for \"{}\"", topic));
        warn!("❌ [{}] 所有阶段均失败", topic);
        return Err(ApiError::Generation(message));
    }

    Ok(Json(snapshot))
}

async fn handle_status(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state
        .registry
        .get(&topic)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session for topic \"{}\"", topic)))?;
    Ok(Json(session.snapshot()))
}

async fn handle_retry(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
    Json(body): Json<RetryBody>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state
        .registry
        .get(&topic)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session for topic \"{}\"", topic)))?;

    let scope = if body.chain {
        RetryScope::Chain
    } else {
        RetryScope::StageOnly
    };
    info!("🔁 [{}] 收到重试请求: {} ({:?})", topic, body.stage, scope);

    let snapshot = session.retry(body.stage, scope).await?;
    Ok(Json(snapshot))
}

async fn handle_paper(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
    Json(body): Json<PaperBody>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state
        .registry
        .get(&topic)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session for topic \"{}\"", topic)))?;

    session.generate_paper(&body.sample_paper).await?;
    Ok(Json(session.snapshot()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Method, Request},
    };
    use tower::util::ServiceExt;

    use super::*;
    use crate::clients::testing::{Reply, ScriptedClient};
    use crate::models::payload::fixtures::valid_quiz;
    use crate::services::{RetryPolicy, TaskExecutor};

    fn state(client: Arc<ScriptedClient>) -> AppState {
        AppState::with_service(GenerationService::with_executor(TaskExecutor::new(
            client,
            RetryPolicy::new(2, Duration::ZERO),
            Duration::from_secs(5),
        )))
    }

    fn happy_client() -> Arc<ScriptedClient> {
        let client = Arc::new(ScriptedClient::new());
        client.push("theory", Reply::text(r#"{"theory": "Big O bounds growth."}"#));
        client.push("flowchart", Reply::text(r#"{"flowchart": "Growth -> Bound"}"#));
        client.push("quiz", Reply::text(serde_json::to_string(&valid_quiz()).unwrap()));
        client
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let router = create_router(state(Arc::new(ScriptedClient::new())));

        let response = router.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_learn_runs_chain_for_decoded_topic() {
        let client = happy_client();
        let router = create_router(state(client.clone()));

        let response = router.oneshot(get("/learn/Big%20O%20Notation")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["topic"], "Big O Notation");
        assert_eq!(json["theory"]["status"], "succeeded");
        assert_eq!(json["quiz"]["result"]["value"]["quiz"].as_array().unwrap().len(), 15);
        assert_eq!(json["paperEnabled"], true);
        assert!(client.prompts("theory")[0].contains("Big O Notation"));
    }

    #[tokio::test]
    async fn test_learn_all_failed_returns_502() {
        let router = create_router(state(Arc::new(ScriptedClient::new())));

        let response = router.oneshot(get("/learn/Graphs")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Graphs"));
    }

    #[tokio::test]
    async fn test_status_unknown_topic_is_404() {
        let router = create_router(state(Arc::new(ScriptedClient::new())));

        let response = router.oneshot(get("/learn/Trees/status")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_paper_before_flowchart_is_422() {
        let client = Arc::new(ScriptedClient::new());
        let state = Arc::new(state(client.clone()));
        state.registry.get_or_create("Graphs").await;
        let router = Router::new()
            .route("/learn/:topic/paper", post(handle_paper))
            .with_state(state);

        let response = router
            .oneshot(post_json(
                "/learn/Graphs/paper",
                serde_json::json!({ "samplePaper": "Q1. Define a graph [5]" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_retry_quiz_after_learn() {
        let client = Arc::new(ScriptedClient::new());
        client.push("theory", Reply::text(r#"{"theory": "T"}"#));
        client.push("flowchart", Reply::text(r#"{"flowchart": "F"}"#));
        let router = create_router(state(client.clone()));

        let response = router.clone().oneshot(get("/learn/Heaps")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["quiz"]["status"], "failed");

        client.push("quiz", Reply::text(serde_json::to_string(&valid_quiz()).unwrap()));
        let response = router
            .oneshot(post_json(
                "/learn/Heaps/retry",
                serde_json::json!({ "stage": "quiz" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["quiz"]["status"], "succeeded");
        assert_eq!(client.call_count("theory"), 1);
    }

    #[tokio::test]
    async fn test_chain_retry_reruns_quiz_from_new_flowchart() {
        let client = Arc::new(ScriptedClient::new());
        client.push("theory", Reply::text(r#"{"theory": "T"}"#));
        client.push("quiz", Reply::text(serde_json::to_string(&valid_quiz()).unwrap()));
        let router = create_router(state(client.clone()));

        let response = router.clone().oneshot(get("/learn/Tries")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["flowchart"]["status"], "failed");

        client.push("flowchart", Reply::text(r#"{"flowchart": "Prefix -> Node -> Word"}"#));
        client.push("quiz", Reply::text(serde_json::to_string(&valid_quiz()).unwrap()));
        let response = router
            .oneshot(post_json(
                "/learn/Tries/retry",
                serde_json::json!({ "stage": "flowchart", "chain": true }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["flowchart"]["status"], "succeeded");
        assert_eq!(json["quiz"]["status"], "succeeded");
        assert_eq!(client.call_count("theory"), 1);
        assert_eq!(client.call_count("quiz"), 2);
        assert!(client
            .prompts("quiz")
            .last()
            .unwrap()
            .contains("Prefix -> Node -> Word"));
    }

    #[tokio::test]
    async fn test_paper_retry_without_sample_is_422() {
        let client = happy_client();
        let router = create_router(state(client.clone()));

        let response = router.clone().oneshot(get("/learn/Heaps")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(post_json(
                "/learn/Heaps/retry",
                serde_json::json!({ "stage": "paper" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("samplePaper"));
        assert_eq!(client.call_count("paper"), 0);
    }
}
