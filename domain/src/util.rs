//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Cap `s` at `max_bytes`, appending a marker that reports the full size.
pub fn cap_output(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    format!(
        "{}\n\n[truncated at {} bytes, total: {} bytes]",
        truncate_str(s, max_bytes),
        max_bytes,
        s.len()
    )
}

/// Short single-line preview for logs and result messages.
pub fn preview(s: &str, max_chars: usize) -> String {
    let single_line = s.replace('\n', "\\n");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let truncated: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
