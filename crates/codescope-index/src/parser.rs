//! Language detection and the cached parser pool.
//!
//! Extensions map to languages through a closed table; each language gets
//! one lazily initialized `tree_sitter::Parser`, cached for the pool's
//! lifetime. Parse trees are ephemeral — callers must not retain one past
//! the extraction of a single file. Grammars are immutable and shared.

use crate::languages;
use codescope_core::CodescopeError;
use std::collections::HashMap;
use tree_sitter::{Parser, Tree};

/// A supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    TypeScript,
    JavaScript,
    Python,
    Go,
    Rust,
    Java,
    C,
    Cpp,
    CSharp,
    Php,
    Ruby,
    Swift,
    Kotlin,
}

impl Lang {
    /// The closed extension table. `.h` defaults to C.
    pub fn from_extension(ext: &str) -> Option<Lang> {
        match ext {
            "ts" | "tsx" => Some(Lang::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Lang::JavaScript),
            "py" | "pyw" => Some(Lang::Python),
            "go" => Some(Lang::Go),
            "rs" => Some(Lang::Rust),
            "java" => Some(Lang::Java),
            "c" | "h" => Some(Lang::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" => Some(Lang::Cpp),
            "cs" => Some(Lang::CSharp),
            "php" => Some(Lang::Php),
            "rb" | "rake" => Some(Lang::Ruby),
            "swift" => Some(Lang::Swift),
            "kt" | "kts" => Some(Lang::Kotlin),
            _ => None,
        }
    }

    /// Detect the language of a path from its extension.
    pub fn from_path(path: &str) -> Option<Lang> {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())?;
        Self::from_extension(&ext.to_lowercase())
    }

    /// Like [`Lang::from_path`], but an unknown extension is an error.
    pub fn detect(path: &str) -> Result<Lang, CodescopeError> {
        Self::from_path(path).ok_or_else(|| CodescopeError::LanguageUnsupported(path.to_string()))
    }

    /// Stable language tag stored on nodes and file records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::TypeScript => "typescript",
            Lang::JavaScript => "javascript",
            Lang::Python => "python",
            Lang::Go => "go",
            Lang::Rust => "rust",
            Lang::Java => "java",
            Lang::C => "c",
            Lang::Cpp => "cpp",
            Lang::CSharp => "csharp",
            Lang::Php => "php",
            Lang::Ruby => "ruby",
            Lang::Swift => "swift",
            Lang::Kotlin => "kotlin",
        }
    }

    pub fn all() -> &'static [Lang] {
        &[
            Lang::TypeScript,
            Lang::JavaScript,
            Lang::Python,
            Lang::Go,
            Lang::Rust,
            Lang::Java,
            Lang::C,
            Lang::Cpp,
            Lang::CSharp,
            Lang::Php,
            Lang::Ruby,
            Lang::Swift,
            Lang::Kotlin,
        ]
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One cached parser per language.
pub struct ParserPool {
    parsers: HashMap<Lang, Parser>,
}

impl ParserPool {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Parse `content` as `lang`, initializing the parser on first use.
    pub fn parse(&mut self, content: &[u8], lang: Lang) -> Result<Tree, CodescopeError> {
        if !self.parsers.contains_key(&lang) {
            let mut parser = Parser::new();
            let grammar = languages::spec_for(lang).grammar();
            parser
                .set_language(&grammar)
                .map_err(|e| CodescopeError::ParseFailure {
                    path: String::new(),
                    message: format!("grammar init for {lang}: {e}"),
                })?;
            self.parsers.insert(lang, parser);
        }

        let parser = self.parsers.get_mut(&lang).expect("parser just inserted");
        parser
            .parse(content, None)
            .ok_or_else(|| CodescopeError::ParseFailure {
                path: String::new(),
                message: format!("{lang} parser produced no tree"),
            })
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new()
    }
}
