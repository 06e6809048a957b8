pub fn truncate_chars(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{}...", truncated.trim_end())
}

pub fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("うずまきナルト", 4), "うずまき...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn log_truncation_marks_the_cut() {
        assert_eq!(truncate_for_log("abcdef", 3), "abc... (truncated)");
    }
}
