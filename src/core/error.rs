//! Agent 错误类型与错误分类
//!
//! 所有可失败操作返回 `Result<_, AgentError>`；ModularAgent 在边界处根据 ErrorKind
//! 记录日志并降级为固定道歉语，调用方也可以通过 `try_process` 拿到具体错误。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（配置、校验、持久化、流水线）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Config error ({}): {message}", .key.as_deref().unwrap_or("-"))]
    Config {
        key: Option<String>,
        message: String,
    },

    #[error("Validation error ({field}): {message}")]
    Validation { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Agent error ({agent_id}): {message}")]
    Agent { agent_id: String, message: String },
}

/// 错误大类：区分持久化失败与流水线逻辑失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Validation,
    Persistence,
    Pipeline,
    Agent,
}

impl AgentError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: Some(key.into()),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Config { .. } => ErrorKind::Config,
            AgentError::Validation { .. } => ErrorKind::Validation,
            AgentError::Io(_) | AgentError::Json(_) | AgentError::Persistence(_) => {
                ErrorKind::Persistence
            }
            AgentError::Pipeline(_) => ErrorKind::Pipeline,
            AgentError::Agent { .. } => ErrorKind::Agent,
        }
    }

    /// 日志中使用的稳定错误码
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Config => "CONFIG_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Persistence => "PERSISTENCE_ERROR",
            ErrorKind::Pipeline => "PIPELINE_ERROR",
            ErrorKind::Agent => "AGENT_ERROR",
        }
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::Config {
            key: None,
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_and_json_are_persistence() {
        let io = AgentError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.kind(), ErrorKind::Persistence);
        assert_eq!(io.code(), "PERSISTENCE_ERROR");

        let json = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert_eq!(AgentError::from(json).kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_display_includes_key() {
        let err = AgentError::config("project_id", "project_id is required");
        assert_eq!(err.to_string(), "Config error (project_id): project_id is required");
        assert_eq!(err.code(), "CONFIG_ERROR");

        let err = AgentError::Pipeline("boom".into());
        assert_eq!(err.kind(), ErrorKind::Pipeline);
    }
}
