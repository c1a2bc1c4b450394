//! Local stand-in for the cloud translation endpoint

#![allow(dead_code)]

use axum::{
    extract::{Json, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tsv_translator::TranslatorConfig;

/// What the mock answers to one request
pub enum Reply {
    /// 200 with this JSON body
    Json(Value),
    /// Error status with an optional Retry-After header
    Status(u16, Option<&'static str>),
}

/// Decides the reply from the zero-based call number and the request texts
pub type Responder = Arc<dyn Fn(usize, &[String]) -> Reply + Send + Sync>;

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub query: HashMap<String, String>,
    pub key: Option<String>,
    pub region: Option<String>,
    pub user_agent: Option<String>,
    pub body: Value,
    pub texts: Vec<String>,
    pub at: Instant,
}

#[derive(Clone)]
struct MockState {
    responder: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running mock service
pub struct MockTranslator {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTranslator {
    /// Start the mock on an ephemeral local port
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(usize, &[String]) -> Reply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responder: Arc::new(responder),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/translate", post(translate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{}", addr),
            requests,
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Client configuration pointed at this mock, without pacing or jitter
    pub fn config(&self) -> TranslatorConfig {
        TranslatorConfig {
            api_key: "test-key".to_string(),
            region: "test-region".to_string(),
            endpoint: self.endpoint.clone(),
            sleep_between_batches_ms: 0,
            retry_max_jitter_ms: 0,
            max_retries: 3,
            ..Default::default()
        }
    }
}

async fn translate(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let texts: Vec<String> = body
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| item["text"].as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let call = {
        let mut requests = state.requests.lock().unwrap();
        requests.push(RecordedRequest {
            query,
            key: header_value("Ocp-Apim-Subscription-Key"),
            region: header_value("Ocp-Apim-Subscription-Region"),
            user_agent: header_value("User-Agent"),
            body: body.clone(),
            texts: texts.clone(),
            at: Instant::now(),
        });
        requests.len() - 1
    };

    match (state.responder)(call, &texts) {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Status(code, retry_after) => {
            let status = StatusCode::from_u16(code).unwrap();
            let mut response = (status, "mock error").into_response();
            if let Some(retry_after) = retry_after {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static(retry_after));
            }
            response
        }
    }
}

/// Service-shaped response body with one translation per text
pub fn translations_body<I, S>(texts: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Array(
        texts
            .into_iter()
            .map(|t| {
                let text: String = t.into();
                json!({ "translations": [{ "text": text, "to": "uk" }] })
            })
            .collect(),
    )
}

/// Responder that prefixes every text with `[uk] `, keeping mask tokens
pub fn prefixing(_call: usize, texts: &[String]) -> Reply {
    Reply::Json(translations_body(texts.iter().map(|t| format!("[uk] {}", t))))
}
