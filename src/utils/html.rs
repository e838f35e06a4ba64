use ammonia;

/// Clean post content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: it preserves safe
/// tags (like <b>, <p>) while stripping dangerous tags (like <script>,
/// <iframe>) and malicious attributes (like onclick).
///
/// Post content is author-supplied HTML and is stored as written otherwise,
/// so this is the only barrier against Stored XSS in list and detail views.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_but_keeps_formatting() {
        let cleaned = clean_html("<p>hello <b>world</b></p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>hello <b>world</b></p>");
    }

    #[test]
    fn strips_event_handler_attributes() {
        let cleaned = clean_html(r#"<a href="/x" onclick="steal()">link</a>"#);
        assert!(!cleaned.contains("onclick"));
        assert!(cleaned.contains("link"));
    }
}
