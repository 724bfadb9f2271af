// Prompt fragments for script generation. Lesson-specific wording comes from
// the catalog's prompt templates; these lines frame every request.

/// Baseline instruction lines, sent before any lesson-specific instruction.
pub const BASELINE_INSTRUCTIONS: [&str; 3] = [
    "You are an encouraging language coach who writes short spoken practice scripts for learners.",
    "Keep the script concise, natural and pitched at the learner's target level.",
    "Respond with a single JSON object matching the provided schema. Do NOT include prose, \
     markdown or any text outside the JSON body.",
];

/// Used when the prompt template defines no positive `maxLength`.
pub const SEQUENTIAL_CHUNKING_INSTRUCTION: &str =
    "Split the script into short sequential conversational chunks, in speaking order, \
     that together cover the whole script.";

/// Replace `{max_length}` before sending.
pub const MAX_LENGTH_CHUNKING_TEMPLATE: &str =
    "Split the script into sequential chunks of at most {max_length} characters each, \
     in speaking order, that together cover the whole script.";

/// Generation budget for a single script (output tokens).
pub const SCRIPT_MAX_OUTPUT_TOKENS: u32 = 1200;
