//! Instruction templates sent to the model.

use crate::core::models::RewriteMode;

/// Maximum number of characters of user text embedded in a prompt.
pub const MAX_INPUT_CHARS: usize = 20_000;

/// Remove control characters (keeping newlines and tabs) and hard-truncate.
#[must_use]
pub fn sanitize_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_INPUT_CHARS)
        .collect()
}

const SIMPLE_INSTRUCTION: &str = "Rewrite the message below in simpler, more accessible language while keeping the meaning intact. Respond with only the rewritten message, no extra commentary.";

const GENZ_INSTRUCTION: &str = "You are a Gen Z content creator. Rewrite the message below using a casual, relatable tone that reflects Gen Z language and humor. Keep it understandable and avoid slang that might confuse readers. Respond with only the rewritten message, no extra commentary.";

const HUMOR_INSTRUCTION: &str = "Roast the message below in a playful, witty, and light-hearted manner, as if a person was humorously responding to the request. The roast should make fun of the situation or the request, but keep it light-hearted and harmless. Do not mention AI or anything about your abilities, just focus on humorously reacting to the message. Respond with only the rewritten message, no extra commentary.";

const CORPORATE_INSTRUCTION: &str = "Rewrite the message below in a professional, corporate tone, making it sound more formal and polished. Use formal business language and ensure the message remains clear and appropriate for a professional setting. Respond with only the rewritten message, do not write it in an email format since this is for chat, no extra commentary.";

/// Persona used for replies to direct messages.
pub const CONVERSATION_INSTRUCTION: &str = "You're a sassy, humorous, but helpful virtual assistant. Reply playfully to this user message, but still provide useful info if needed. Avoid being robotic. No extra commentary. Think snarky but charming:";

const ANNOTATION_INSTRUCTION: &str = "Add sassy, humorous comments to the following text. Keep the original text unchanged, just insert comments where appropriate using inline reviewer notes. Make it fun but insightful:";

/// Build the rewrite prompt for a slash-command invocation.
#[must_use]
pub fn build_rewrite_prompt(text: &str, mode: RewriteMode) -> String {
    let instruction = match mode {
        RewriteMode::Simple => SIMPLE_INSTRUCTION,
        RewriteMode::GenZ => GENZ_INSTRUCTION,
        RewriteMode::Humor => HUMOR_INSTRUCTION,
        RewriteMode::Corporate => CORPORATE_INSTRUCTION,
    };

    format!(
        "{instruction}\n\nOriginal message:\n{}",
        sanitize_input(text)
    )
}

/// Build the prompt used to answer a direct message.
#[must_use]
pub fn build_conversation_prompt(user_message: &str) -> String {
    format!("{CONVERSATION_INSTRUCTION}\n\n{}", sanitize_input(user_message))
}

/// Build the prompt that asks for sassy inline comments on a document.
#[must_use]
pub fn build_annotation_prompt(text: &str) -> String {
    format!("{ANNOTATION_INSTRUCTION}\n\n{}", sanitize_input(text))
}
