//! Guardrail responses for off-topic messages

/// Politely decline an off-topic message and steer back to privacy topics.
/// Purely static; no LLM call.
pub fn handle_off_topic(_message: &str) -> String {
    "I'm a privacy policy assistant, so that's outside what I can help with.\n\n\
     I can answer questions about privacy policies and data practices: \
     what data a company collects, who it's shared with, or how long it's kept. \
     Analyze a policy and ask away!"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_to_privacy_topics() {
        let answer = handle_off_topic("Tell me a joke");
        assert!(answer.contains("privacy policy assistant"));
        assert!(answer.contains("data practices"));
    }
}
