//! 记忆层：短期（最近对话行）、长期（事实 / 模式 / 偏好）、知识库存储

pub mod long_term;
pub mod short_term;
pub mod store;

pub use long_term::LongTermMemory;
pub use short_term::ShortTermMemory;
pub use store::{
    InMemoryStore, JsonFileStore, KnowledgeBackend, KnowledgeBase, KnowledgeStore, Section,
};
