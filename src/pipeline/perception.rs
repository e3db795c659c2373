//! 感知阶段：原始文本 -> 结构化感知记录（意图 + 实体）

use serde::{Deserialize, Serialize};

/// 粗粒度意图；按 question > greeting > statement 的优先级判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Question,
    Greeting,
    Statement,
}

/// 以 `@` / `#` 开头的词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Entity {
    Username(String),
    Hashtag(String),
}

/// 单次请求的感知结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub text: String,
    /// 小写、去首尾空白
    pub normalized: String,
    /// 原文字符数
    pub length: usize,
    pub intent: Intent,
    pub entities: Vec<Entity>,
    /// 由 ModularAgent 附加的最近对话
    pub context: Option<String>,
}

const GREETING_TOKENS: &[&str] = &["hello", "hi"];

#[derive(Debug, Default, Clone)]
pub struct PerceptionModule;

impl PerceptionModule {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, raw_text: &str) -> Perception {
        let normalized = raw_text.trim().to_lowercase();
        Perception {
            text: raw_text.to_string(),
            length: raw_text.chars().count(),
            intent: classify_intent(&normalized),
            entities: extract_entities(raw_text),
            normalized,
            context: None,
        }
    }
}

fn classify_intent(normalized: &str) -> Intent {
    if normalized.contains('?') {
        return Intent::Question;
    }
    let is_greeting = normalized
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETING_TOKENS.contains(&word));
    if is_greeting {
        Intent::Greeting
    } else {
        Intent::Statement
    }
}

/// 按空白切词；`@` 后为用户名，`#` 后为话题，不去除附带的标点
fn extract_entities(text: &str) -> Vec<Entity> {
    text.split_whitespace()
        .filter_map(|token| {
            if let Some(name) = token.strip_prefix('@') {
                (!name.is_empty()).then(|| Entity::Username(name.to_string()))
            } else if let Some(tag) = token.strip_prefix('#') {
                (!tag.is_empty()).then(|| Entity::Hashtag(tag.to_string()))
            } else {
                None
            }
        })
        .collect()
}
