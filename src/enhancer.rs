use std::sync::Arc;

use crate::error::EnhancementError;
use crate::gemini::{GenerateContent, DEFAULT_MODEL};

const META_PROMPT_HEAD: &str = r#"
You are an expert prompt engineer. Your task is to take a user's raw, unstructured, or incomplete prompt and rewrite it into a professional, structured, and optimized prompt suitable for high-quality AI generation.

The enhanced prompt MUST be clear, concise, and well-organized. It should include the following sections if the user's input provides enough information to infer them. If a section is not applicable, omit it.

- **Task:** A clear and concise definition of the primary goal.
- **Context:** Relevant background information the AI needs to understand the request.
- **Role:** The persona the AI should adopt (e.g., "Act as a senior marketing copywriter...").
- **Constraints:** Specific limitations or rules to follow (e.g., word count, tone, what to avoid).
- **Format:** Instructions on how the output should be structured (e.g., "Use Markdown for headings," "Provide the output as a JSON object...").
- **Example:** (If helpful) A brief example to clarify the desired output.

Your final output must ONLY be the enhanced prompt text, professionally formatted using Markdown. Do not include any conversational introductions, explanations, or text like "Here is the enhanced prompt:". Start directly with the enhanced prompt.

**User's Raw Prompt:**
---
"#;

const META_PROMPT_TAIL: &str = "\n---\n";

/// Wraps the raw prompt, unchanged, in the rewriting instructions.
pub fn build_meta_prompt(raw: &str) -> String {
    let mut prompt = String::with_capacity(META_PROMPT_HEAD.len() + raw.len() + META_PROMPT_TAIL.len());
    prompt.push_str(META_PROMPT_HEAD);
    prompt.push_str(raw);
    prompt.push_str(META_PROMPT_TAIL);
    prompt
}

/// Turns raw prompts into structured ones through a generation backend.
#[derive(Clone)]
pub struct Enhancer {
    backend: Arc<dyn GenerateContent>,
    model: String,
}

impl Enhancer {
    pub fn new(backend: Arc<dyn GenerateContent>) -> Self {
        Self {
            backend,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes exactly one generation call. Callers pass non-blank text.
    pub async fn enhance(&self, raw: &str) -> Result<String, EnhancementError> {
        let prompt = build_meta_prompt(raw);

        let text = match self.backend.generate(&self.model, &prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "enhancement request failed");
                return Err(EnhancementError::from(&err));
            }
        };

        let trimmed = text.as_deref().map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            tracing::warn!("generation returned no text");
            return Err(EnhancementError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }
}
