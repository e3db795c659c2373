//! 三段式流水线：感知 → 推理 → 行动

pub mod action;
pub mod perception;
pub mod reasoning;

pub use action::ActionModule;
pub use perception::{Entity, Intent, Perception, PerceptionModule};
pub use reasoning::{
    ActionParams, ActionType, Decision, ReasoningModule, ResponseCategory, RuleKey,
};
