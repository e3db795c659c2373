//! ModularAgent：短期记忆 + 长期记忆 + 感知 / 推理 / 行动流水线
//!
//! 每次 process_message：
//! 1. 首次调用时初始化全部组件（只初始化一次，失败则下次重试）
//! 2. 用户输入写入短期记忆
//! 3. 感知记录附加最近对话，依次跑感知 → 推理 → 行动
//! 4. 回复写入短期记忆并返回
//!
//! 任一环节出错都只记录日志，调用方拿到固定的道歉语；需要区分错误类型时用 `try_process`。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::config::{AppConfig, MemorySection};
use crate::core::{Agent, AgentConfig, AgentError, AgentStatus, MessageContext};
use crate::memory::{KnowledgeBackend, LongTermMemory, ShortTermMemory};
use crate::pipeline::{ActionModule, PerceptionModule, ReasoningModule};

pub const APOLOGY_RESPONSE: &str =
    "I apologize, but I encountered an error while processing your message.";

/// 惰性初始化的组件集合
struct Components {
    short_term: ShortTermMemory,
    long_term: Arc<LongTermMemory>,
    perception: PerceptionModule,
    reasoning: ReasoningModule,
    action: ActionModule,
}

pub struct ModularAgent {
    id: String,
    config: AgentConfig,
    memory: MemorySection,
    backend: KnowledgeBackend,
    created_at: DateTime<Utc>,
    components: Option<Components>,
}

impl ModularAgent {
    pub fn new(config: AgentConfig, memory: MemorySection) -> Result<Self, AgentError> {
        config.validate()?;
        let backend = memory.knowledge_backend();
        let id = Uuid::new_v4().to_string();
        tracing::info!("Created modular agent '{}' with ID: {}", config.name, id);
        Ok(Self {
            id,
            config,
            memory,
            backend,
            created_at: Utc::now(),
            components: None,
        })
    }

    pub fn from_app_config(cfg: &AppConfig) -> Result<Self, AgentError> {
        cfg.validate()?;
        Self::new(cfg.agent.clone(), cfg.memory.clone())
    }

    /// 替换知识库后端（如测试中使用内存存储），需在首次处理消息前调用
    pub fn with_backend(mut self, backend: KnowledgeBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.components.is_some()
    }

    fn ensure_initialized(&mut self) -> Result<&mut Components, AgentError> {
        if self.components.is_none() {
            let long_term = Arc::new(LongTermMemory::open(&self.backend)?);
            self.components = Some(Components {
                short_term: ShortTermMemory::new(self.memory.short_term_capacity),
                reasoning: ReasoningModule::new(Some(Arc::clone(&long_term))),
                long_term,
                perception: PerceptionModule::new(),
                action: ActionModule::new(),
            });
            tracing::info!("Initialized pipeline for agent '{}'", self.config.name);
        }
        self.components
            .as_mut()
            .ok_or_else(|| AgentError::Pipeline("components not initialized".into()))
    }

    /// 跑一次完整流水线，返回具体错误而不是道歉语
    pub fn try_process(&mut self, text: &str) -> Result<String, AgentError> {
        let context_lines = self.memory.context_lines;
        let c = self.ensure_initialized()?;

        c.short_term.add(text, "user");

        let mut perception = c.perception.process(text);
        perception.context = Some(c.short_term.recent(context_lines));
        tracing::debug!(
            "Perceived intent {:?} with {} entities",
            perception.intent,
            perception.entities.len()
        );

        let decision = c.reasoning.process(&perception);
        tracing::debug!(
            "Decided {:?} ({:?}) confidence {}",
            decision.action,
            decision.params.response_type,
            decision.confidence
        );

        let response = c.action.process(&decision);
        c.short_term.add(&response, "assistant");
        Ok(response)
    }

    /// 短期记忆；未初始化时为 None
    pub fn short_term(&self) -> Option<&ShortTermMemory> {
        self.components.as_ref().map(|c| &c.short_term)
    }

    pub fn long_term(&mut self) -> Result<Arc<LongTermMemory>, AgentError> {
        Ok(Arc::clone(&self.ensure_initialized()?.long_term))
    }

    pub fn remember_fact(&mut self, key: &str, value: Value) -> Result<(), AgentError> {
        self.long_term()?.store_fact(key, value)
    }

    pub fn recall_fact(&mut self, key: &str) -> Result<Option<Value>, AgentError> {
        Ok(self.long_term()?.get_fact(key))
    }

    pub fn teach_pattern(&mut self, trigger: &str, response: &str) -> Result<(), AgentError> {
        self.long_term()?.store_pattern(trigger, response)
    }

    pub fn matching_patterns(&mut self, text: &str) -> Result<Vec<String>, AgentError> {
        Ok(self.long_term()?.find_matching_patterns(text))
    }

    pub fn set_preference(&mut self, key: &str, value: Value) -> Result<(), AgentError> {
        self.long_term()?.store_preference(key, value)
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            id: self.id.clone(),
            name: self.config.name.clone(),
            created_at: self.created_at,
            message_count: self.short_term().map_or(0, ShortTermMemory::len),
            config: self.config.clone(),
        }
    }
}

#[async_trait]
impl Agent for ModularAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// 永不返回 Err：所有错误在此降级为道歉语
    async fn process_message(
        &mut self,
        message: &str,
        _context: Option<&MessageContext>,
    ) -> Result<String, AgentError> {
        match self.try_process(message) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!(
                    code = e.code(),
                    agent = %self.config.name,
                    "Failed to process message: {}",
                    e
                );
                Ok(APOLOGY_RESPONSE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::pipeline::action::{ACKNOWLEDGMENT_TEMPLATE, GREETING_TEMPLATE};
    use serde_json::json;
    use tempfile::TempDir;

    fn in_memory_agent() -> ModularAgent {
        ModularAgent::new(AgentConfig::new("test", "test-project"), MemorySection::default())
            .unwrap()
            .with_backend(KnowledgeBackend::InMemory)
    }

    #[tokio::test]
    async fn test_hello_end_to_end() {
        let mut agent = in_memory_agent();
        assert!(!agent.is_initialized());

        let reply = agent.process_message("Hello", None).await.unwrap();
        assert_eq!(reply, GREETING_TEMPLATE);

        let lines: Vec<_> = agent.short_term().unwrap().entries().collect();
        assert_eq!(
            lines,
            vec!["user: Hello".to_string(), format!("assistant: {GREETING_TEMPLATE}")]
        );
    }

    #[tokio::test]
    async fn test_init_happens_once() {
        let mut agent = in_memory_agent();
        agent.process_message("I like cats", None).await.unwrap();
        agent.remember_fact("pet", json!("cat")).unwrap();
        agent.process_message("hi", None).await.unwrap();

        // 第二次调用不会重建长期记忆
        assert_eq!(agent.recall_fact("pet").unwrap(), Some(json!("cat")));
        assert_eq!(agent.short_term().unwrap().len(), 4);
        assert_eq!(agent.status().message_count, 4);
    }

    #[tokio::test]
    async fn test_short_term_bounded() {
        let mut memory = MemorySection::default();
        memory.short_term_capacity = 3;
        let mut agent = ModularAgent::new(AgentConfig::new("test", "p"), memory)
            .unwrap()
            .with_backend(KnowledgeBackend::InMemory);

        for _ in 0..5 {
            agent.process_message("I like cats", None).await.unwrap();
        }
        let st = agent.short_term().unwrap();
        assert_eq!(st.len(), 3);
        assert_eq!(st.recent(1), format!("assistant: {ACKNOWLEDGMENT_TEMPLATE}"));
    }

    #[tokio::test]
    async fn test_corrupt_knowledge_base_yields_apology() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "{broken").unwrap();

        let mut agent = in_memory_agent().with_backend(KnowledgeBackend::JsonFile(path));
        let reply = agent.process_message("Hello", None).await.unwrap();
        assert_eq!(reply, APOLOGY_RESPONSE);
        assert!(!agent.is_initialized());

        let err = agent.try_process("Hello").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn test_patterns_through_agent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        let mut agent = in_memory_agent().with_backend(KnowledgeBackend::JsonFile(path.clone()));

        agent.teach_pattern("weather", "Check the forecast.").unwrap();
        agent.set_preference("tone", json!("casual")).unwrap();
        assert_eq!(
            agent.matching_patterns("How's the WEATHER?").unwrap(),
            vec!["Check the forecast."]
        );

        // 推理阶段不查询长期记忆
        let reply = agent.process_message("How's the weather?", None).await.unwrap();
        assert!(reply.starts_with("That's a good question"));

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["preferences"]["tone"], "casual");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ModularAgent::new(AgentConfig::new("test", ""), MemorySection::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
