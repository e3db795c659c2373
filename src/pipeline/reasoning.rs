//! 推理阶段：感知记录 -> 行动决策
//!
//! 规则表按 question → greeting → default 的顺序遍历，第一条匹配的规则生效；
//! default 永远匹配，必须放在最后。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::memory::LongTermMemory;
use crate::pipeline::perception::{Intent, Perception};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Respond,
    NoAction,
}

/// 回复类别，对应 ActionModule 的模板表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    Informative,
    Greeting,
    Acknowledgment,
    /// 模板表之外的类别，渲染为通用回复
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    pub response_type: ResponseCategory,
    pub topic: Option<String>,
}

impl ActionParams {
    pub fn respond_with(response_type: ResponseCategory) -> Self {
        Self {
            response_type,
            topic: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: ActionType,
    pub params: ActionParams,
    /// [0, 1]
    pub confidence: f32,
}

/// 规则键：具体意图或兜底
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKey {
    Intent(Intent),
    Default,
}

impl RuleKey {
    fn matches(&self, intent: Intent) -> bool {
        match self {
            RuleKey::Intent(i) => *i == intent,
            RuleKey::Default => true,
        }
    }
}

type Handler = fn(&Perception) -> Decision;

pub struct ReasoningModule {
    rules: Vec<(RuleKey, Handler)>,
    /// 持有但目前不参与决策
    long_term: Option<Arc<LongTermMemory>>,
}

impl ReasoningModule {
    pub fn new(long_term: Option<Arc<LongTermMemory>>) -> Self {
        Self {
            rules: vec![
                (RuleKey::Intent(Intent::Question), handle_question as Handler),
                (RuleKey::Intent(Intent::Greeting), handle_greeting as Handler),
                (RuleKey::Default, handle_default as Handler),
            ],
            long_term,
        }
    }

    pub fn process(&self, perception: &Perception) -> Decision {
        for (key, handler) in &self.rules {
            if key.matches(perception.intent) {
                tracing::debug!("Reasoning rule {:?} fired", key);
                return handler(perception);
            }
        }
        // 规则表以 Default 结尾，不会走到这里
        handle_default(perception)
    }

    pub fn rule_order(&self) -> Vec<RuleKey> {
        self.rules.iter().map(|(k, _)| *k).collect()
    }

    pub fn long_term(&self) -> Option<&Arc<LongTermMemory>> {
        self.long_term.as_ref()
    }
}

impl Default for ReasoningModule {
    fn default() -> Self {
        Self::new(None)
    }
}

fn handle_question(_: &Perception) -> Decision {
    Decision {
        action: ActionType::Respond,
        params: ActionParams::respond_with(ResponseCategory::Informative),
        confidence: 0.9,
    }
}

fn handle_greeting(_: &Perception) -> Decision {
    Decision {
        action: ActionType::Respond,
        params: ActionParams::respond_with(ResponseCategory::Greeting),
        confidence: 0.95,
    }
}

fn handle_default(_: &Perception) -> Decision {
    Decision {
        action: ActionType::Respond,
        params: ActionParams::respond_with(ResponseCategory::Acknowledgment),
        confidence: 0.6,
    }
}
