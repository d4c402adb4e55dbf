//! Minimal ACE control plane served by axum on an ephemeral port

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use beam_orchestrations::ace_client::AceClientConfig;

pub const MOCK_TOKEN: &str = "tok-123";

/// One request as the mock received it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct MockAce {
    requests: Mutex<Vec<Recorded>>,
    replies: Mutex<HashMap<String, (StatusCode, String)>>,
}

impl MockAce {
    /// Set the reply for requests whose `action` field equals `action`
    pub fn reply(&self, action: &str, status: StatusCode, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(action.to_string(), (status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests other than the login
    pub fn action_requests(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.body["action"] != "login")
            .collect()
    }
}

async fn handle(
    State(mock): State<Arc<MockAce>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let action = body["action"].as_str().unwrap_or_default().to_string();
    mock.requests.lock().unwrap().push(Recorded {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if let Some(reply) = mock.replies.lock().unwrap().get(&action) {
        return reply.clone();
    }
    if action == "login" {
        (StatusCode::OK, format!(r#"{{"auth":"{}"}}"#, MOCK_TOKEN))
    } else {
        (StatusCode::OK, String::new())
    }
}

/// Start the mock and return it with a client config pointing at it
pub async fn start_mock_ace() -> (Arc<MockAce>, AceClientConfig) {
    let mock = Arc::new(MockAce::default());
    let app = Router::new()
        .route("/aec/api.php", post(handle))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = AceClientConfig {
        host: format!("http://{}/aec/api.php", addr),
        account: "acme".to_string(),
        api_key: "secret-key".to_string(),
        request_timeout: Duration::from_secs(5),
    };
    (mock, config)
}
