/// Normalize optional documentation text.
///
/// Absent, empty and whitespace-only text all become `None`. Anything else is
/// trimmed, with `\r\n` and lone `\r` line endings turned into `\n`.
pub fn normalize_doc(text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.replace("\r\n", "\n").replace('\r', "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_blank() {
        assert_eq!(normalize_doc(None), None);
        assert_eq!(normalize_doc(Some("")), None);
        assert_eq!(normalize_doc(Some(" \n\t ")), None);
    }

    #[test]
    fn test_trims_and_unifies_line_endings() {
        assert_eq!(
            normalize_doc(Some("  Find a pet.\r\nBy id.\rFast.  ")),
            Some("Find a pet.\nBy id.\nFast.".to_string())
        );
    }
}
