//! Script request builder: assembles instructions, learner context and the
//! output contract for one provider call.

use serde_json::{json, Value};

use crate::models::lesson::LessonTemplate;
use crate::models::prompt::PromptTemplate;
use crate::script::payload::GenerateScriptCommand;
use crate::script::prompts::{
    BASELINE_INSTRUCTIONS, MAX_LENGTH_CHUNKING_TEMPLATE, SCRIPT_MAX_OUTPUT_TOKENS,
    SEQUENTIAL_CHUNKING_INSTRUCTION,
};
use crate::script::provider::ScriptRequest;
use crate::script::template::{render_template, ReplacementValues};

pub fn build_script_request(
    lesson: &LessonTemplate,
    prompt: &PromptTemplate,
    command: &GenerateScriptCommand,
    subject: &str,
) -> ScriptRequest {
    let values = ReplacementValues::new(lesson, command, subject);

    let mut instructions: Vec<String> =
        BASELINE_INSTRUCTIONS.iter().map(|s| s.to_string()).collect();
    instructions.push(chunking_instruction(prompt));
    if let Some(system_prompt) = &prompt.system_prompt {
        instructions.push(render_template(system_prompt, &values));
    }

    let guidance = render_template(&prompt.user_prompt, &values);
    let required_fields = if lesson.required_personalization_fields.is_empty() {
        "None".to_string()
    } else {
        lesson.required_personalization_fields.join(", ")
    };

    let mut context = vec![
        format!("Lesson title: {}", lesson.title),
        format!("Lesson subtitle: {}", lesson.subtitle),
        format!("Target level: {}", command.target_level),
        format!("Language code: {}", command.language_code),
    ];
    if !values.summary().is_empty() {
        context.push(format!("Learner personalization: {}", values.summary()));
    }
    context.push(format!("Required personalization fields: {required_fields}"));
    context.push(format!("Prompt guidance: {guidance}"));
    if let Some(label) = prompt.chunking_strategy.as_ref().and_then(|c| c.label()) {
        context.push(format!("Chunking strategy: {label}"));
    }

    ScriptRequest {
        system: join_segments(&instructions),
        user: join_segments(&context),
        output_schema: script_output_schema(),
        max_output_tokens: SCRIPT_MAX_OUTPUT_TOKENS,
    }
}

fn chunking_instruction(prompt: &PromptTemplate) -> String {
    match prompt
        .chunking_strategy
        .as_ref()
        .and_then(|c| c.max_length_limit())
    {
        Some(max_length) => {
            MAX_LENGTH_CHUNKING_TEMPLATE.replace("{max_length}", &max_length.to_string())
        }
        None => SEQUENTIAL_CHUNKING_INSTRUCTION.to_string(),
    }
}

/// Drops blank segments and joins the rest with newlines.
fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strict output contract: `{fullText, chunks: [{order, text}]}` and nothing else.
pub fn script_output_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["fullText", "chunks"],
        "properties": {
            "fullText": {"type": "string"},
            "chunks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["order", "text"],
                    "properties": {
                        "order": {"type": "integer", "minimum": 0},
                        "text": {"type": "string"}
                    }
                }
            }
        }
    })
}
