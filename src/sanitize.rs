/// Upper bound, in characters, for any text sent to or read back from the model.
pub const MAX_TEXT_CHARS: usize = 20_000;

/// Removes NUL characters and silently truncates to [`MAX_TEXT_CHARS`].
pub fn safe_text(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '\0')
        .take(MAX_TEXT_CHARS)
        .collect()
}

/// Sanitizes and trims a prompt. `None` means there is nothing to send.
pub fn prepare_prompt(prompt: &str) -> Option<String> {
    let sanitized = safe_text(prompt);
    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
