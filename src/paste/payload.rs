//! Image names and the text inserted into the document.

use super::PasteError;

/// Component of a scope name marking Markdown-family syntaxes.
const MARKDOWN_SCOPE_PART: &str = "markdown";

/// The text to insert for an image at `relative_path`.
///
/// Markdown documents get an image tag; anything else gets the bare
/// path.
pub fn insertion_payload(relative_path: &str, scope: &str) -> String {
    if is_markdown_scope(scope) {
        format!("![]({relative_path})")
    } else {
        relative_path.to_string()
    }
}

/// Whether any scope in a space-separated scope list is Markdown-like
/// (`text.html.markdown`, `text.html.markdown.gfm`, `text.markdown`, ...).
pub fn is_markdown_scope(scope: &str) -> bool {
    scope
        .split_whitespace()
        .any(|name| name.split('.').any(|part| part == MARKDOWN_SCOPE_PART))
}

/// Reject names that would not stay a single file inside the assets
/// directory.
pub fn validate_name(name: &str) -> Result<(), PasteError> {
    let reason = if name.trim().is_empty() {
        "name is empty"
    } else if name.contains(['/', '\\']) {
        "name contains a path separator"
    } else if name == "." || name == ".." {
        "name is a relative directory"
    } else if name.contains('\0') {
        "name contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(PasteError::InvalidName(format!("{name:?}: {reason}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_gets_image_tag() {
        assert_eq!(
            insertion_payload("figs/foo.png", "text.html.markdown meta.paragraph.markdown"),
            "![](figs/foo.png)"
        );
    }

    #[test]
    fn non_markdown_gets_bare_path() {
        assert_eq!(insertion_payload("figs/foo.png", "text.plain"), "figs/foo.png");
        assert_eq!(insertion_payload("figs/foo.png", "text.tex.latex"), "figs/foo.png");
        assert_eq!(insertion_payload("figs/foo.png", ""), "figs/foo.png");
    }

    #[test]
    fn markdown_family_variants() {
        assert!(is_markdown_scope("text.html.markdown.gfm"));
        assert!(is_markdown_scope("text.markdown"));
        assert!(!is_markdown_scope("text.html.basic"));
        assert!(!is_markdown_scope("source.markdownlint"));
    }

    #[test]
    fn plain_names_are_accepted() {
        assert!(validate_name("foo").is_ok());
        assert!(validate_name("screen shot 2").is_ok());
        assert!(validate_name("v1.2").is_ok());
        assert!(validate_name("..hidden").is_ok());
    }

    #[test]
    fn unsafe_names_are_rejected() {
        for name in ["", "   ", "a/b", "..\\x", "../escape", ".", "..", "nul\0"] {
            let err = validate_name(name).unwrap_err();
            assert!(matches!(err, PasteError::InvalidName(_)), "{name:?} accepted");
        }
    }
}
