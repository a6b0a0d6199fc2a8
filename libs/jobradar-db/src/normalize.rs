/// Canonical form used for every company/title comparison and as the
/// record unique-key component: lower-cased, anything outside
/// `[a-z0-9\s]` stripped, whitespace runs collapsed to single spaces,
/// trimmed. Deterministic and idempotent.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;

    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if ch.is_whitespace() && !last_was_space && !out.is_empty() {
            out.push(' ');
            last_was_space = true;
        }
        // Any other character (punctuation, symbols, non-ASCII) is dropped.
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Check-Point"), "checkpoint");
        assert_eq!(normalize("monday.com"), "mondaycom");
        assert_eq!(normalize("Google (Israel) Ltd."), "google israel ltd");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  Senior   Software\tEngineer  "), "senior software engineer");
    }

    #[test]
    fn is_idempotent() {
        for s in ["  Wix.com!! ", "Sr. Dev-Ops Engineer", "", "a  b   c"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize(" - "), "");
    }
}
