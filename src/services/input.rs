use crate::error::CoreError;

/// Rejects text that is empty after trimming.
pub fn validate(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::EmptyInput);
    }
    Ok(())
}

/// Splits on `\n` only. Lines are kept verbatim (blank lines and `\r`
/// included); empty segments left by trailing line breaks are dropped.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();

    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
}

/// Validates and splits in one step.
pub fn collect(text: &str) -> Result<Vec<&str>, CoreError> {
    validate(text)?;
    Ok(split_lines(text))
}
