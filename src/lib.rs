//! modular-agent - 模块化智能体示例
//!
//! 模块划分：
//! - **agent**: ModularAgent 编排器（短期记忆 → 感知 → 推理 → 行动 → 短期记忆）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误分类、Agent 契约（AgentConfig / AgentMessage / Agent trait / BasicAgent）
//! - **memory**: 短期滚动记忆、长期记忆、可替换的知识库存储
//! - **observability**: tracing 日志初始化
//! - **pipeline**: 感知、推理、行动三个阶段

pub mod agent;
pub mod config;
pub mod core;
pub mod memory;
pub mod observability;
pub mod pipeline;

pub use agent::{ModularAgent, APOLOGY_RESPONSE};
pub use crate::core::{Agent, AgentConfig, AgentError, BasicAgent, ErrorKind};
