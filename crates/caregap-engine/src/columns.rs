//! Case-insensitive column resolution.
//!
//! Mapping configs name columns the way an operator typed them into a
//! portal export months ago; the actual sheet may differ in case or stray
//! whitespace. Absence is a normal outcome here, never an error.

/// Resolve a configured logical column name to a header index.
///
/// `None`, empty, and the literal "none" (any case) are immediate misses.
/// An exact header match wins; otherwise the first case-insensitive,
/// whitespace-trimmed match does.
pub fn resolve_column(headers: &[String], logical: Option<&str>) -> Option<usize> {
    let logical = logical?;
    let trimmed = logical.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return None;
    }
    if let Some(idx) = headers.iter().position(|header| header == logical) {
        return Some(idx);
    }
    let wanted = trimmed.to_lowercase();
    headers
        .iter()
        .position(|header| header.trim().to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec![
            "Member ID".to_string(),
            " Care Gap ".to_string(),
            "DOB".to_string(),
        ]
    }

    #[test]
    fn exact_match_wins() {
        assert_eq!(resolve_column(&headers(), Some("Member ID")), Some(0));
    }

    #[test]
    fn falls_back_to_case_insensitive_trimmed_match() {
        assert_eq!(resolve_column(&headers(), Some("member id")), Some(0));
        assert_eq!(resolve_column(&headers(), Some("care gap")), Some(1));
    }

    #[test]
    fn none_and_empty_are_immediate_misses() {
        assert_eq!(resolve_column(&headers(), None), None);
        assert_eq!(resolve_column(&headers(), Some("")), None);
        assert_eq!(resolve_column(&headers(), Some("  ")), None);
        assert_eq!(resolve_column(&headers(), Some("none")), None);
        assert_eq!(resolve_column(&headers(), Some("NONE")), None);
    }

    #[test]
    fn unknown_column_is_a_miss() {
        assert_eq!(resolve_column(&headers(), Some("Insurance")), None);
    }
}
