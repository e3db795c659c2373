//! 长期记忆：事实、触发模式与用户偏好，跨会话保存
//!
//! 建立在 KnowledgeStore 之上；每次写入都立即 flush 整个文档。
//! 内部持有互斥锁，可通过 Arc 与推理阶段共享。

use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::core::AgentError;
use crate::memory::store::{KnowledgeBackend, KnowledgeStore, Section};

pub struct LongTermMemory {
    store: Mutex<Box<dyn KnowledgeStore>>,
}

impl LongTermMemory {
    pub fn new(store: Box<dyn KnowledgeStore>) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// 按后端打开存储；JSON 文件损坏时在这里失败
    pub fn open(backend: &KnowledgeBackend) -> Result<Self, AgentError> {
        Ok(Self::new(backend.open()?))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn KnowledgeStore>> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 写入后立即 flush；flush 失败时恢复旧值（新键则移除），内存与磁盘保持一致
    fn put_and_flush(&self, section: Section, key: &str, value: Value) -> Result<(), AgentError> {
        let mut store = self.lock();
        let previous = store
            .document_mut()
            .section_mut(section)
            .insert(key.to_string(), value);

        if let Err(e) = store.flush() {
            let map = store.document_mut().section_mut(section);
            match previous {
                Some(old) => {
                    map.insert(key.to_string(), old);
                }
                // 新键位于末尾，remove 不会打乱其余键的顺序
                None => {
                    map.remove(key);
                }
            }
            tracing::warn!("Rolled back '{}' after failed flush: {}", key, e);
            return Err(e);
        }
        Ok(())
    }

    pub fn store_fact(&self, key: &str, value: Value) -> Result<(), AgentError> {
        tracing::debug!("Storing fact: {}", key);
        self.put_and_flush(Section::Facts, key, value)
    }

    pub fn get_fact(&self, key: &str) -> Option<Value> {
        self.lock().get(Section::Facts, key)
    }

    pub fn store_pattern(&self, trigger: &str, response: &str) -> Result<(), AgentError> {
        tracing::debug!("Storing pattern: {}", trigger);
        self.put_and_flush(Section::Patterns, trigger, Value::String(response.to_string()))
    }

    /// 返回所有触发词（忽略大小写）出现在 text 中的模式的回复，按存储顺序，不排序
    pub fn find_matching_patterns(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.lock()
            .entries(Section::Patterns)
            .into_iter()
            .filter(|(trigger, _)| haystack.contains(&trigger.to_lowercase()))
            .map(|(_, response)| match response {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()
    }

    pub fn store_preference(&self, key: &str, value: Value) -> Result<(), AgentError> {
        self.put_and_flush(Section::Preferences, key, value)
    }

    pub fn get_preference(&self, key: &str) -> Option<Value> {
        self.lock().get(Section::Preferences, key)
    }

    /// 从后端重新加载（丢弃未写回的内存状态）
    pub fn reload(&self) -> Result<(), AgentError> {
        self.lock().load()
    }
}

impl std::fmt::Debug for LongTermMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongTermMemory").finish_non_exhaustive()
    }
}
