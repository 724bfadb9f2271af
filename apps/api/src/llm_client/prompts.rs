// Structured-output tool definition. The model is forced to call this tool,
// so its `input` is the script payload.

pub const SCRIPT_TOOL_NAME: &str = "submit_practice_script";

pub const SCRIPT_TOOL_DESCRIPTION: &str = "Submit the finished practice script: the full text \
    plus its ordered chunks. Call this exactly once.";
