//! Client for the ACE control plane
//!
//! Every BEAM action is a JSON POST to one per-account endpoint. The client
//! sends exactly one request per call and never retries; sequencing and
//! polling belong to [`crate::lifecycle`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ActionError;

/// Constant `subject` of every BEAM request
pub const SUBJECT: &str = "beam";

const API_PATH: &str = "/aec/api.php";

/// Connection settings for one ACE account
#[derive(Debug, Clone)]
pub struct AceClientConfig {
    /// Control plane host, or a full endpoint URL
    pub host: String,
    pub account: String,
    pub api_key: String,
    /// Upper bound on a single request
    pub request_timeout: Duration,
}

impl AceClientConfig {
    /// Resolve the action endpoint. A bare host maps to the standard HTTPS
    /// API path; anything with a scheme is used verbatim.
    pub fn endpoint(&self) -> String {
        if self.host.contains("://") {
            self.host.clone()
        } else {
            format!("https://{}{}", self.host.trim_end_matches('/'), API_PATH)
        }
    }
}

/// The remote actions a BEAM lifecycle is built from
#[async_trait]
pub trait RemoteActions: Send + Sync {
    /// Issue one action and normalize the answer
    async fn perform(
        &self,
        action: BeamAction,
        descriptor: &ResourceDescriptor,
    ) -> Result<InstanceResult, ActionError>;

    async fn clone_model(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Clone, descriptor).await
    }

    async fn change_model(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Change, descriptor).await
    }

    async fn create_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Create, descriptor).await
    }

    async fn start_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Start, descriptor).await
    }

    async fn lock_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Lock, descriptor).await
    }

    async fn unlock_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Unlock, descriptor).await
    }

    async fn instance_status(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Status, descriptor).await
    }

    async fn stop_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Stop, descriptor).await
    }

    async fn suspend_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Suspend, descriptor).await
    }

    async fn resume_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Resume, descriptor).await
    }

    async fn drop_instance(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Drop, descriptor).await
    }

    async fn delete_model(&self, descriptor: &ResourceDescriptor) -> Result<InstanceResult, ActionError> {
        self.perform(BeamAction::Delete, descriptor).await
    }
}

/// How the response body of an action is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyPolicy {
    /// The body carries nothing useful; success is the status code alone
    Ignored,
    /// An empty body is a bare acknowledgement
    Optional,
    /// The body must decode
    Required,
}

pub(crate) fn body_policy(action: BeamAction) -> BodyPolicy {
    match action {
        BeamAction::Clone | BeamAction::Change | BeamAction::Delete => BodyPolicy::Ignored,
        BeamAction::Status => BodyPolicy::Required,
        _ => BodyPolicy::Optional,
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    action: &'static str,
    user: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActionRequest<'a> {
    auth: &'a str,
    action: &'static str,
    subject: &'static str,
    account: &'a str,
    template: &'a str,
    program: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
}

impl<'a> ActionRequest<'a> {
    pub(crate) fn new(
        auth: &'a str,
        account: &'a str,
        action: BeamAction,
        descriptor: &'a ResourceDescriptor,
    ) -> Self {
        let mut request = Self {
            auth,
            action: action.wire_name(),
            subject: SUBJECT,
            account,
            template: &descriptor.template,
            program: &descriptor.program,
            domain: None,
            region: None,
            provider: None,
            param: None,
            data: None,
        };

        match action {
            BeamAction::Clone | BeamAction::Change => {
                request.domain = Some(descriptor.domain.as_str());
                request.region = Some(descriptor.region.as_str());
                request.provider = Some(descriptor.category.as_str());
                if action == BeamAction::Change {
                    request.data = Some(descriptor.param.as_str());
                }
            }
            BeamAction::Create => {
                request.domain = Some(descriptor.domain.as_str());
                request.param = Some(descriptor.param.as_str());
            }
            BeamAction::Status => {
                request.domain = Some(descriptor.domain.as_str());
            }
            _ => {}
        }

        request
    }
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    status: String,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

/// Decode an action response body according to `policy`
pub(crate) fn decode_body(
    action: BeamAction,
    policy: BodyPolicy,
    body: &str,
) -> Result<InstanceResult, ActionError> {
    let body = body.trim();
    if policy == BodyPolicy::Ignored {
        return Ok(InstanceResult::acknowledged());
    }
    if body.is_empty() {
        return match policy {
            BodyPolicy::Required => Err(ActionError::Malformed {
                action,
                message: "empty response body".to_string(),
            }),
            _ => Ok(InstanceResult::acknowledged()),
        };
    }

    let decoded: ActionResponse = serde_json::from_str(body).map_err(|e| ActionError::Malformed {
        action,
        message: e.to_string(),
    })?;

    let entity_id = match decoded.id {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(id)) => id,
        Some(serde_json::Value::Number(id)) => id.to_string(),
        Some(other) => {
            return Err(ActionError::Malformed {
                action,
                message: format!("unexpected id value: {}", other),
            })
        }
    };

    Ok(InstanceResult::new(decoded.status, entity_id))
}

/// Authenticated ACE session
#[derive(Clone)]
pub struct AceClient {
    http: reqwest::Client,
    endpoint: String,
    account: String,
    token: String,
}

impl std::fmt::Debug for AceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AceClient")
            .field("endpoint", &self.endpoint)
            .field("account", &self.account)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AceClient {
    /// Log in and return a client bound to the session token
    pub async fn connect(config: &AceClientConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        tracing::info!(endpoint = %endpoint, account = %config.account, "Opening ACE session");

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let response = http
            .post(&endpoint)
            .json(&LoginRequest {
                action: "login",
                user: &config.account,
                secret: &config.api_key,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach ACE control plane at {}", endpoint))?;

        if !response.status().is_success() {
            anyhow::bail!("ACE login rejected: HTTP {}", response.status());
        }

        let login: LoginResponse = response
            .json()
            .await
            .context("ACE login response did not carry an auth token")?;

        tracing::info!(account = %config.account, "ACE session established");

        Ok(Self {
            http,
            endpoint,
            account: config.account.clone(),
            token: login.auth,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteActions for AceClient {
    async fn perform(
        &self,
        action: BeamAction,
        descriptor: &ResourceDescriptor,
    ) -> Result<InstanceResult, ActionError> {
        descriptor.validate_for(action)?;

        tracing::debug!(
            action = %action,
            template = %descriptor.template,
            program = %descriptor.program,
            "Sending ACE action"
        );

        let request = ActionRequest::new(&self.token, &self.account, action, descriptor);
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ActionError::Transport {
                action,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(action = %action, http_status = status.as_u16(), "ACE action rejected");
            return Err(ActionError::Rejected {
                action,
                status: status.as_u16(),
            });
        }

        let policy = body_policy(action);
        let body = match policy {
            BodyPolicy::Ignored => String::new(),
            _ => response.text().await.map_err(|e| ActionError::Transport {
                action,
                message: e.to_string(),
            })?,
        };
        let result = decode_body(action, policy, &body)?;

        tracing::debug!(
            action = %action,
            status = %result.status,
            entity_id = %result.entity_id,
            "ACE action completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("base", "app1")
            .with_domain("app1.example")
            .with_placement("eu", "aws")
            .with_param("cfg")
    }

    fn request_json(action: BeamAction) -> serde_json::Value {
        let d = descriptor();
        serde_json::to_value(ActionRequest::new("tok", "acme", action, &d)).unwrap()
    }

    fn keys(value: &serde_json::Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_clone_request_carries_placement() {
        let json = request_json(BeamAction::Clone);
        assert_eq!(json["action"], "clone");
        assert_eq!(json["subject"], "beam");
        assert_eq!(json["provider"], "aws");
        assert_eq!(json["region"], "eu");
        assert_eq!(json["domain"], "app1.example");
        assert!(json.get("param").is_none());
    }

    #[test]
    fn test_change_request_sends_param_as_data() {
        let json = request_json(BeamAction::Change);
        assert_eq!(json["data"], "cfg");
        assert!(json.get("param").is_none());
    }

    #[test]
    fn test_create_and_status_requests() {
        let create = request_json(BeamAction::Create);
        assert_eq!(
            keys(&create),
            vec!["account", "action", "auth", "domain", "param", "program", "subject", "template"]
        );

        let status = request_json(BeamAction::Status);
        assert_eq!(
            keys(&status),
            vec!["account", "action", "auth", "domain", "program", "subject", "template"]
        );
    }

    #[test]
    fn test_instance_actions_send_identity_only() {
        for action in [
            BeamAction::Start,
            BeamAction::Lock,
            BeamAction::Unlock,
            BeamAction::Stop,
            BeamAction::Suspend,
            BeamAction::Resume,
            BeamAction::Drop,
            BeamAction::Delete,
        ] {
            let json = request_json(action);
            assert_eq!(
                keys(&json),
                vec!["account", "action", "auth", "program", "subject", "template"],
                "unexpected fields for {}",
                action
            );
        }
    }

    #[test]
    fn test_decode_structured_body() {
        let result = decode_body(
            BeamAction::Create,
            BodyPolicy::Optional,
            r#"{"status":"creating","id":"i-42"}"#,
        )
        .unwrap();
        assert_eq!(result, InstanceResult::new("creating", "i-42"));

        let numeric = decode_body(BeamAction::Start, BodyPolicy::Optional, r#"{"status":"starting","id":7}"#)
            .unwrap();
        assert_eq!(numeric.entity_id, "7");
    }

    #[test]
    fn test_empty_body_is_an_acknowledgement_unless_required() {
        let ack = decode_body(BeamAction::Lock, BodyPolicy::Optional, "  ").unwrap();
        assert!(ack.is_acknowledged());

        let err = decode_body(BeamAction::Status, BodyPolicy::Required, "").unwrap_err();
        assert!(matches!(err, ActionError::Malformed { action: BeamAction::Status, .. }));
    }

    #[test]
    fn test_missing_status_is_malformed() {
        let err = decode_body(BeamAction::Status, BodyPolicy::Required, r#"{"id":"i-42"}"#).unwrap_err();
        assert!(matches!(err, ActionError::Malformed { .. }));

        let err = decode_body(BeamAction::Stop, BodyPolicy::Optional, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ActionError::Malformed { action: BeamAction::Stop, .. }));
    }

    #[test]
    fn test_ignored_body_is_never_parsed() {
        let result = decode_body(BeamAction::Clone, BodyPolicy::Ignored, "not json").unwrap();
        assert!(result.is_acknowledged());
        assert_eq!(body_policy(BeamAction::Delete), BodyPolicy::Ignored);
    }

    #[test]
    fn test_endpoint_resolution() {
        let mut config = AceClientConfig {
            host: "ace.example.com".to_string(),
            account: "acme".to_string(),
            api_key: "k".to_string(),
            request_timeout: Duration::from_secs(5),
        };
        assert_eq!(config.endpoint(), "https://ace.example.com/aec/api.php");

        config.host = "http://127.0.0.1:9000/api".to_string();
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/api");
    }
}
