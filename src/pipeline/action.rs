//! 行动阶段：决策 -> 回复文本

use crate::pipeline::reasoning::{ActionType, Decision, ResponseCategory};

pub const INFORMATIVE_TEMPLATE: &str =
    "That's a good question about {topic}. Let me share what I know.";
pub const GREETING_TEMPLATE: &str = "Hello! How can I help you today?";
pub const ACKNOWLEDGMENT_TEMPLATE: &str = "I understand. Tell me more.";
pub const GENERIC_TEMPLATE: &str = "I see. Please go on.";
pub const UNKNOWN_ACTION_RESPONSE: &str = "I'm not sure how to respond to that.";
pub const DEFAULT_TOPIC: &str = "that topic";

#[derive(Debug, Default, Clone)]
pub struct ActionModule;

impl ActionModule {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, decision: &Decision) -> String {
        if decision.action != ActionType::Respond {
            return UNKNOWN_ACTION_RESPONSE.to_string();
        }
        let template = template_for(&decision.params.response_type);
        if template.contains("{topic}") {
            let topic = decision.params.topic.as_deref().unwrap_or(DEFAULT_TOPIC);
            template.replace("{topic}", topic)
        } else {
            template.to_string()
        }
    }
}

fn template_for(category: &ResponseCategory) -> &'static str {
    match category {
        ResponseCategory::Informative => INFORMATIVE_TEMPLATE,
        ResponseCategory::Greeting => GREETING_TEMPLATE,
        ResponseCategory::Acknowledgment => ACKNOWLEDGMENT_TEMPLATE,
        ResponseCategory::Other(_) => GENERIC_TEMPLATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reasoning::ActionParams;

    fn respond(category: ResponseCategory, topic: Option<&str>) -> Decision {
        Decision {
            action: ActionType::Respond,
            params: ActionParams {
                response_type: category,
                topic: topic.map(str::to_string),
            },
            confidence: 1.0,
        }
    }

    #[test]
    fn test_greeting_template() {
        let out = ActionModule::new().process(&respond(ResponseCategory::Greeting, None));
        assert_eq!(out, GREETING_TEMPLATE);
    }

    #[test]
    fn test_topic_substitution() {
        let action = ActionModule::new();
        let out = action.process(&respond(ResponseCategory::Informative, Some("Rust")));
        assert_eq!(out, "That's a good question about Rust. Let me share what I know.");

        let out = action.process(&respond(ResponseCategory::Informative, None));
        assert!(out.contains(DEFAULT_TOPIC));
        assert!(!out.contains("{topic}"));
    }

    #[test]
    fn test_unknown_category_uses_generic() {
        let out = ActionModule::new()
            .process(&respond(ResponseCategory::Other("poem".into()), None));
        assert_eq!(out, GENERIC_TEMPLATE);
    }

    #[test]
    fn test_no_action() {
        let mut d = respond(ResponseCategory::Greeting, None);
        d.action = ActionType::NoAction;
        assert_eq!(ActionModule::new().process(&d), UNKNOWN_ACTION_RESPONSE);
    }
}
