//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `AGENT__*` 覆盖（双下划线表示嵌套，如 `AGENT__AGENT__PROJECT_ID=demo`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::{AgentConfig, AgentError};
use crate::memory::{short_term, KnowledgeBackend};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub memory: MemorySection,
    pub logging: LoggingSection,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AgentError> {
        self.agent.validate()?;
        let json_backend = self.memory.backend == BackendKind::Json;
        if json_backend && self.memory.storage_path.as_os_str().is_empty() {
            return Err(AgentError::config(
                "memory.storage_path",
                "storage_path is required for json backend",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Json,
    Memory,
}

/// [memory] 段：知识库位置与短期记忆容量
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    pub backend: BackendKind,
    pub storage_path: PathBuf,
    pub short_term_capacity: usize,
    /// 附加到感知记录的最近对话行数
    pub context_lines: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            backend: BackendKind::Json,
            storage_path: PathBuf::from("data/knowledge_base.json"),
            short_term_capacity: short_term::DEFAULT_CAPACITY,
            context_lines: 5,
        }
    }
}

impl MemorySection {
    pub fn knowledge_backend(&self) -> KnowledgeBackend {
        match self.backend {
            BackendKind::Json => KnowledgeBackend::JsonFile(self.storage_path.clone()),
            BackendKind::Memory => KnowledgeBackend::InMemory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

/// [logging] 段：级别与输出格式；RUST_LOG 优先
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Console,
        }
    }
}

/// 从 config 目录加载配置，环境变量 AGENT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 AGENT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, AgentError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(AgentError::config(
                "config_path",
                format!("Configuration file not found: {}", path.display()),
            ));
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let cfg: AppConfig = builder.build()?.try_deserialize()?;
    Ok(cfg)
}
