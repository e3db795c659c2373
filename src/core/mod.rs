//! 核心层：错误分类、Agent 契约（配置 / 消息 / trait / BasicAgent）

pub mod agent;
pub mod error;

pub use agent::{
    Agent, AgentConfig, AgentMessage, AgentStatus, BasicAgent, MessageContext, Role,
};
pub use error::{AgentError, ErrorKind};
