//! Text clean-up for user supplied fields.

/// Trim, drop control characters and collapse runs of whitespace.
pub fn sanitize_text(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace())
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitized text, or `None` when nothing is left.
pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize_text).filter(|s| !s.is_empty())
}
