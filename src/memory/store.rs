//! 知识库存储：可替换的键值存储抽象
//!
//! 文档结构固定为三个顶层映射 `{"facts": {}, "patterns": {}, "preferences": {}}`。
//! JsonFileStore 每次 flush 整体重写文件，不加锁；多个进程写同一路径会互相覆盖。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::AgentError;

/// 文档中的三个顶层映射
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Facts,
    Patterns,
    Preferences,
}

/// 持久化文档；缺失的段按空映射处理，映射保持写入顺序
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub facts: Map<String, Value>,
    #[serde(default)]
    pub patterns: Map<String, Value>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl KnowledgeBase {
    pub fn section(&self, section: Section) -> &Map<String, Value> {
        match section {
            Section::Facts => &self.facts,
            Section::Patterns => &self.patterns,
            Section::Preferences => &self.preferences,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Map<String, Value> {
        match section {
            Section::Facts => &mut self.facts,
            Section::Patterns => &mut self.patterns,
            Section::Preferences => &mut self.preferences,
        }
    }
}

/// 键值存储 trait：get / put 操作内存中的文档，load / flush 负责与后端同步
pub trait KnowledgeStore: Send {
    fn document(&self) -> &KnowledgeBase;

    fn document_mut(&mut self) -> &mut KnowledgeBase;

    /// 从后端重新读取整个文档
    fn load(&mut self) -> Result<(), AgentError>;

    /// 将整个文档写回后端
    fn flush(&self) -> Result<(), AgentError>;

    fn get(&self, section: Section, key: &str) -> Option<Value> {
        self.document().section(section).get(key).cloned()
    }

    /// 同名键覆盖旧值（保留其原有位置）
    fn put(&mut self, section: Section, key: &str, value: Value) {
        self.document_mut()
            .section_mut(section)
            .insert(key.to_string(), value);
    }

    fn entries(&self, section: Section) -> Vec<(String, Value)> {
        self.document()
            .section(section)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// 纯内存实现：load / flush 为空操作，适合测试
#[derive(Debug, Default)]
pub struct InMemoryStore {
    doc: KnowledgeBase,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KnowledgeStore for InMemoryStore {
    fn document(&self) -> &KnowledgeBase {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut KnowledgeBase {
        &mut self.doc
    }

    fn load(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    fn flush(&self) -> Result<(), AgentError> {
        Ok(())
    }
}

/// 单文件 JSON 实现
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: KnowledgeBase,
}

impl JsonFileStore {
    /// 打开知识库文件；不存在时创建父目录并写入空文档，内容损坏或路径不是文件时返回错误
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            doc: KnowledgeBase::default(),
        };
        if store.path.is_file() {
            store.load()?;
        } else if store.path.exists() {
            return Err(AgentError::Persistence(format!(
                "knowledge base path is not a file: {}",
                store.path().display()
            )));
        } else {
            store.flush()?;
            tracing::info!("Created knowledge base at {:?}", store.path());
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KnowledgeStore for JsonFileStore {
    fn document(&self) -> &KnowledgeBase {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut KnowledgeBase {
        &mut self.doc
    }

    fn load(&mut self) -> Result<(), AgentError> {
        let data = std::fs::read_to_string(&self.path)?;
        self.doc = if data.trim().is_empty() {
            KnowledgeBase::default()
        } else {
            serde_json::from_str(&data)?
        };
        tracing::debug!(
            "Loaded knowledge base {:?}: {} facts, {} patterns",
            self.path,
            self.doc.facts.len(),
            self.doc.patterns.len()
        );
        Ok(())
    }

    fn flush(&self) -> Result<(), AgentError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.doc)?)?;
        Ok(())
    }
}

/// 按配置选择的存储后端
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KnowledgeBackend {
    JsonFile(PathBuf),
    InMemory,
}

impl KnowledgeBackend {
    pub fn open(&self) -> Result<Box<dyn KnowledgeStore>, AgentError> {
        match self {
            KnowledgeBackend::JsonFile(path) => Ok(Box::new(JsonFileStore::open(path)?)),
            KnowledgeBackend::InMemory => Ok(Box::new(InMemoryStore::new())),
        }
    }
}
