pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
