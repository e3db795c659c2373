//! Agent 基础契约：配置、消息、Agent trait 与 BasicAgent
//!
//! AgentConfig 中的模型参数（温度、token 上限、超时等）只透传给外部模型层，
//! 本 crate 不做任何推理调用。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::AgentError;

/// 随消息一起传入的上下文（任意 JSON 对象）
pub type MessageContext = Map<String, Value>;

/// Agent 配置（对应配置文件的 [agent] 段）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub version: String,

    /// 云平台项目与区域，仅透传
    pub project_id: String,
    pub location: String,

    pub model_name: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,

    pub system_prompt: String,
    pub max_retries: u32,
    /// 单次请求超时（秒）
    pub timeout_secs: f64,

    pub enable_safety: bool,
    pub enable_logging: bool,
    pub custom_parameters: Map<String, Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "modular-agent".to_string(),
            description: String::new(),
            version: "1.0.0".to_string(),
            project_id: String::new(),
            location: "us-central1".to_string(),
            model_name: "gemini-pro".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 0.9,
            top_k: 40,
            system_prompt: String::new(),
            max_retries: 3,
            timeout_secs: 30.0,
            enable_safety: true,
            enable_logging: true,
            custom_parameters: Map::new(),
        }
    }
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// 校验必填项与数值范围
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.project_id.trim().is_empty() {
            return Err(AgentError::config("project_id", "project_id is required"));
        }
        if self.name.trim().is_empty() {
            return Err(AgentError::config("name", "Agent name is required"));
        }
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("max_tokens", f64::from(self.max_tokens), 1.0, 8192.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("top_k", f64::from(self.top_k), 1.0, 100.0)?;
        check_range("max_retries", f64::from(self.max_retries), 0.0, 10.0)?;
        check_range("timeout_secs", self.timeout_secs, 1.0, 300.0)?;
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), AgentError> {
    if value.is_nan() || value < min || value > max {
        return Err(AgentError::validation(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

/// 消息角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条会话消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AgentMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: Map::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Agent 状态快照
#[derive(Clone, Debug, Serialize)]
pub struct AgentStatus {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub config: AgentConfig,
}

/// 所有 Agent 实现的公共契约
#[async_trait]
pub trait Agent: Send {
    fn id(&self) -> &str;

    fn config(&self) -> &AgentConfig;

    /// 处理一条消息并返回回复文本
    async fn process_message(
        &mut self,
        message: &str,
        context: Option<&MessageContext>,
    ) -> Result<String, AgentError>;
}

/// 最简单的 Agent：回显输入并记录会话历史
pub struct BasicAgent {
    id: String,
    config: AgentConfig,
    created_at: DateTime<Utc>,
    history: Vec<AgentMessage>,
}

impl BasicAgent {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let id = Uuid::new_v4().to_string();
        tracing::info!("Initialized agent '{}' with ID: {}", config.name, id);
        Ok(Self {
            id,
            config,
            created_at: Utc::now(),
            history: Vec::new(),
        })
    }

    pub fn add_message(&mut self, message: AgentMessage) {
        tracing::debug!("Added message to history: {}", message.id);
        self.history.push(message);
    }

    /// 最近 limit 条消息；None 或 Some(0) 返回全部
    pub fn history(&self, limit: Option<usize>) -> &[AgentMessage] {
        match limit {
            Some(n) if n > 0 => &self.history[self.history.len().saturating_sub(n)..],
            _ => &self.history,
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("Cleared session history");
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            id: self.id.clone(),
            name: self.config.name.clone(),
            created_at: self.created_at,
            message_count: self.history.len(),
            config: self.config.clone(),
        }
    }

    /// 最近 10 条消息，每行 "role: content"
    pub fn conversation_summary(&self) -> String {
        if self.history.is_empty() {
            return "No conversation history available.".to_string();
        }
        self.history(Some(10))
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Agent for BasicAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn process_message(
        &mut self,
        message: &str,
        context: Option<&MessageContext>,
    ) -> Result<String, AgentError> {
        if message.trim().is_empty() {
            return Err(AgentError::Agent {
                agent_id: self.id.clone(),
                message: "Failed to process message: empty input".to_string(),
            });
        }

        let mut user = AgentMessage::user(message);
        if let Some(ctx) = context {
            user.metadata = ctx.clone();
        }
        self.add_message(user);

        let response = format!("Agent \"{}\" received: {}", self.config.name, message);
        self.add_message(AgentMessage::assistant(response.clone()));

        tracing::info!("Processed message for agent: {}", self.config.name);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentConfig {
        AgentConfig::new("test-agent", "test-project")
    }

    #[test]
    fn test_config_defaults_are_valid() {
        let cfg = config();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.model_name, "gemini-pro");
        assert_eq!(cfg.max_tokens, 1024);
    }

    #[test]
    fn test_config_requires_project_id() {
        let cfg = AgentConfig::new("test-agent", "");
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, AgentError::Config { key: Some(ref k), .. } if k == "project_id"));
    }

    #[test]
    fn test_config_rejects_out_of_range_temperature() {
        let mut cfg = config();
        cfg.temperature = 2.5;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, AgentError::Validation { ref field, .. } if field == "temperature"));

        cfg.temperature = 1.0;
        cfg.top_k = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let parsed: Result<AgentConfig, _> =
            serde_json::from_str(r#"{"name": "a", "project_id": "p", "bogus": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_basic_agent_rejects_invalid_config() {
        assert!(BasicAgent::new(AgentConfig::new("", "p")).is_err());
    }

    #[tokio::test]
    async fn test_basic_agent_echo_and_history() {
        let mut agent = BasicAgent::new(config()).unwrap();
        let reply = agent.process_message("Hello", None).await.unwrap();
        assert_eq!(reply, "Agent \"test-agent\" received: Hello");

        assert_eq!(agent.history(None).len(), 2);
        assert_eq!(agent.history(Some(1))[0].role, Role::Assistant);
        assert_eq!(agent.status().message_count, 2);
        assert_eq!(
            agent.conversation_summary(),
            "user: Hello\nassistant: Agent \"test-agent\" received: Hello"
        );

        agent.clear_history();
        assert_eq!(agent.conversation_summary(), "No conversation history available.");
    }

    #[tokio::test]
    async fn test_basic_agent_keeps_context_as_metadata() {
        let mut agent = BasicAgent::new(config()).unwrap();
        let mut ctx = MessageContext::new();
        ctx.insert("channel".into(), Value::String("cli".into()));
        agent.process_message("hi", Some(&ctx)).await.unwrap();
        assert_eq!(agent.history(None)[0].metadata["channel"], "cli");
    }

    #[test]
    fn test_history_limit_larger_than_len() {
        let agent = BasicAgent::new(config()).unwrap();
        assert!(agent.history(Some(5)).is_empty());
    }

    #[tokio::test]
    async fn test_history_zero_limit_returns_all() {
        let mut agent = BasicAgent::new(config()).unwrap();
        agent.process_message("one", None).await.unwrap();
        agent.process_message("two", None).await.unwrap();

        assert_eq!(agent.history(Some(0)).len(), 4);
        assert_eq!(agent.history(Some(3)).len(), 3);
        assert_eq!(agent.history(Some(3))[0].content, "Agent \"test-agent\" received: one");
    }

    #[tokio::test]
    async fn test_empty_message_is_agent_error() {
        let mut agent = BasicAgent::new(config()).unwrap();
        let err = agent.process_message("   ", None).await.unwrap_err();

        assert!(matches!(err, AgentError::Agent { ref agent_id, .. } if agent_id == agent.id()));
        assert_eq!(err.code(), "AGENT_ERROR");
        assert!(agent.history(None).is_empty());
    }
}
