//! Source languages understood by the comparison and review engines.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A supported source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Cpp,
    Java,
    Go,
    Rust,
}

impl Language {
    /// Every supported language, in declaration order.
    pub const ALL: [Language; 7] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Cpp,
        Language::Java,
        Language::Go,
        Language::Rust,
    ];

    /// The lowercase tag used on the command line and in config files.
    pub fn tag(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }

    /// Guess the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" | "tsx" => Some(Language::TypeScript),
            "py" | "pyi" => Some(Language::Python),
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    /// Go and Rust write loop headers without parentheses.
    pub(crate) fn has_bare_loop_headers(self) -> bool {
        matches!(self, Language::Go | Language::Rust)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "js" => "javascript",
            "ts" => "typescript",
            "py" => "python",
            "c++" => "cpp",
            "rs" => "rust",
            "golang" => "go",
            other => other,
        };
        Language::ALL
            .into_iter()
            .find(|lang| lang.tag() == alias)
            .ok_or_else(|| Error::UnknownLanguage(s.to_string()))
    }
}
