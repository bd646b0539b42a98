//! Comment and blank-line removal.
//!
//! This is a textual regex pass, not a lexer: comment delimiters that appear
//! inside string literals are stripped like any other, and a Python
//! triple-quoted string standing alone on its lines is treated as a
//! docstring even when it is a real literal. CRLF line endings are
//! normalised to `\n` first.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language::Language;

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern"));
static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)//.*$").expect("line comment pattern"));
static HASH_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)#.*$").expect("hash comment pattern"));
static DOUBLE_DOCSTRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*"""(?s:.*?)"""[ \t]*$"#).expect("docstring pattern")
});
static SINGLE_DOCSTRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*'''(?s:.*?)'''[ \t]*$").expect("docstring pattern")
});

/// Remove comments for `language`, then drop lines that are blank after
/// trimming. An unknown language (`None`) only gets the blank-line pass.
pub fn strip_comments(code: &str, language: Option<Language>) -> String {
    let code = normalise_newlines(code);
    let code = code.as_ref();
    let stripped = match language {
        Some(Language::Python) => {
            let without_hash = HASH_COMMENT.replace_all(code, "");
            let without_double = DOUBLE_DOCSTRING.replace_all(&without_hash, "");
            SINGLE_DOCSTRING.replace_all(&without_double, "").into_owned()
        }
        Some(_) => {
            let without_blocks = BLOCK_COMMENT.replace_all(code, "");
            LINE_COMMENT.replace_all(&without_blocks, "").into_owned()
        }
        None => code.to_string(),
    };

    drop_blank_lines(&stripped)
}

fn normalise_newlines(code: &str) -> Cow<'_, str> {
    if code.contains('\r') {
        Cow::Owned(code.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(code)
    }
}

fn drop_blank_lines(code: &str) -> String {
    code.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_code_before_line_comment_verbatim() {
        let out = strip_comments("x=1; // set x", Some(Language::Cpp));
        assert_eq!(out, "x=1; ");
        assert_eq!(out.trim_end(), "x=1;");
    }

    #[test]
    fn removes_multiline_block_comments() {
        let code = "int a = 1;\n/* first\n   second */\nint b = 2; /* tail */\n";
        let out = strip_comments(code, Some(Language::Java));
        assert_eq!(out, "int a = 1;\nint b = 2; ");
    }

    #[test]
    fn block_comment_is_non_greedy() {
        let code = "a /* one */ b /* two */ c";
        assert_eq!(strip_comments(code, Some(Language::Go)), "a  b  c");
    }

    #[test]
    fn drops_lines_that_become_blank() {
        let code = "// header\n\nfn main() {}\n    // indented\n";
        assert_eq!(strip_comments(code, Some(Language::Rust)), "fn main() {}");
    }

    #[test]
    fn python_hash_comments_and_docstrings() {
        let code = "def f(x):\n    \"\"\"Doc\n    more.\"\"\"\n    return x  # identity\n    '''single'''\n";
        let out = strip_comments(code, Some(Language::Python));
        assert_eq!(out, "def f(x):\n    return x  ");
    }

    #[test]
    fn crlf_docstrings_are_stripped() {
        let code = "def f():\r\n    \"\"\"Doc.\"\"\"\r\n    return 1\r\n";
        assert_eq!(
            strip_comments(code, Some(Language::Python)),
            "def f():\n    return 1"
        );
    }

    #[test]
    fn crlf_line_comments_match_lf_output() {
        let crlf = "int a = 1; // one\r\n// gone\r\nint b = 2;\r\n";
        let lf = crlf.replace("\r\n", "\n");
        assert_eq!(
            strip_comments(crlf, Some(Language::Cpp)),
            strip_comments(&lf, Some(Language::Cpp))
        );
    }

    #[test]
    fn python_does_not_touch_slashes() {
        let code = "a = 4 // 2";
        assert_eq!(strip_comments(code, Some(Language::Python)), "a = 4 // 2");
    }

    #[test]
    fn unknown_language_only_drops_blank_lines() {
        let code = "a // b\n\n   \n# c";
        assert_eq!(strip_comments(code, None), "a // b\n# c");
    }

    #[test]
    fn string_literals_are_not_protected() {
        // Known limitation: the URL's `//` starts a "comment".
        let code = r#"let url = "http://example.com";"#;
        assert_eq!(
            strip_comments(code, Some(Language::JavaScript)),
            r#"let url = "http:"#
        );
    }

    #[test]
    fn stripping_twice_changes_nothing() {
        let code = "/* lead */\nint x = 0; // x\n\nreturn x;\n";
        let once = strip_comments(code, Some(Language::Cpp));
        assert_eq!(strip_comments(&once, Some(Language::Cpp)), once);
    }
}
