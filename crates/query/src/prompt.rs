pub const CONTEXT_HEADER: &str = "Context:\n";
pub const QUESTION_HEADER: &str = "\n\nQuestion:\n";

/// Returned by `ask` when retrieval finds nothing; the generator is not called.
pub const NO_INFORMATION_ANSWER: &str =
    "I could not find any relevant information in the uploaded documents to answer your question.";

/// Returned by `ask` when the generator fails or times out.
pub const GENERATION_FAILED_ANSWER: &str =
    "Error: Could not generate a response due to an API issue.";

pub const SYSTEM_INSTRUCTION: &str = "You are an expert study assistant. Answer the user's question \
using only the provided context. Do not use any external knowledge. Synthesize the information \
from the context into a clear, concise, and helpful answer. If the answer is not found within \
the context, state clearly that you cannot answer the question with the given information.";

#[must_use]
pub fn build_user_prompt(query: &str, context: &str) -> String {
    format!("{CONTEXT_HEADER}{context}{QUESTION_HEADER}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_places_context_before_question() {
        let prompt = build_user_prompt("Where do birds fly?", "birds fly south.");
        assert_eq!(
            prompt,
            "Context:\nbirds fly south.\n\nQuestion:\nWhere do birds fly?"
        );
    }

    #[test]
    fn system_instruction_restricts_to_context() {
        assert!(SYSTEM_INSTRUCTION.contains("only the provided context"));
        assert!(SYSTEM_INSTRUCTION.contains("cannot answer"));
    }
}
