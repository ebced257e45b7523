// Shared prompt fragments. Feature modules keep their own prompts.rs alongside them.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "Output STRICT JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
