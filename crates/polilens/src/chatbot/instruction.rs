//! Tool-usage responses for INSTRUCTION intents

const PROJECT_DESCRIPTION: &str = "This project analyzes website privacy policies in real-time.
It extracts policy text, classifies privacy risks using AI,
and explains them in simple language for users.";

/// Answer a question about the tool itself. Purely static; no LLM call.
pub fn handle_instruction_query(message: &str) -> String {
    format!(
        "{}\n\nYou asked:\n\"{}\"\n\nYou can:\n\
         \u{2022} Ask questions about the privacy policy\n\
         \u{2022} Understand privacy risks\n\
         \u{2022} See explanations in simple terms",
        PROJECT_DESCRIPTION, message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_the_question_and_describes_the_tool() {
        let answer = handle_instruction_query("What is this tool?");
        assert!(answer.contains("analyzes website privacy policies"));
        assert!(answer.contains("\"What is this tool?\""));
        assert!(answer.contains("Ask questions about the privacy policy"));
    }
}
