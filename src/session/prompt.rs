// Prompt builder
//
// Fixed instruction-style template. The question is embedded verbatim;
// nothing is escaped, so a question containing "\nAnswer:" reaches the model
// as written.

/// Cue the model completes after
pub const ANSWER_CUE: &str = "Answer:";

/// `"{instruction}: {question}\nAnswer:"`
pub fn build_prompt(instruction: &str, question: &str) -> String {
    format!("{instruction}: {question}\n{ANSWER_CUE}")
}
