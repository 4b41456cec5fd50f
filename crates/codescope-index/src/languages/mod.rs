//! Per-language pattern sets.
//!
//! Each language supplies its grammar, ordered definition and reference
//! patterns, the qualified-name separator, and its export rule. Adding a
//! language is: extend the extension table in `parser`, add a module here
//! with a grammar and pattern sets, and register it in `spec_for`.
//!
//! Query conventions: definition patterns capture the whole definition as
//! `@def` and its name as `@name` (omitted where the grammar makes the name
//! kind unreliable — the extractor then derives it from the `name` field or
//! the first identifier child). An optional `@scope` capture prefixes the
//! qualified name (used for Rust `impl` blocks). Reference patterns capture
//! the referenced name as `@ref` and an optional explicit `@qualifier`.

pub mod c;
pub mod cpp;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod kotlin;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;
pub mod swift;
pub mod typescript;

use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

/// A definition pattern: one query yielding nodes of one kind.
pub struct DefPattern {
    pub kind: NodeKind,
    pub query: &'static str,
}

/// A reference pattern: one query yielding unresolved references of one
/// edge kind.
pub struct RefPattern {
    pub kind: EdgeKind,
    pub query: &'static str,
}

/// How a language marks a definition as exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRule {
    /// Visibility keyword at the start of the definition (Rust `pub`).
    PubKeyword,
    /// An `export_statement` ancestor (TypeScript/JavaScript).
    ExportAncestor,
    /// Uppercase first letter (Go).
    UppercaseName,
    /// No leading underscore (Python, Ruby).
    NoLeadingUnderscore,
    /// Exported only with an explicit `public` modifier (Java, C#; the
    /// default visibility in both is narrower than public).
    PublicModifier,
    /// Exported unless a `private`/`protected`/`fileprivate` modifier is
    /// present (PHP, Swift, Kotlin — public/internal by default).
    NotPrivateModifier,
    /// Exported unless the definition has file-local `static` linkage (C,
    /// C++ free functions).
    NotFileStatic,
}

/// Everything the pipeline needs to know about one language.
pub struct LanguageSpec {
    pub lang: Lang,
    grammar_fn: fn() -> tree_sitter::Language,
    pub def_patterns: &'static [DefPattern],
    pub ref_patterns: &'static [RefPattern],
    /// Qualified-name separator ("." or "::").
    pub separator: &'static str,
    pub export_rule: ExportRule,
    /// Method names remapped to the constructor kind.
    pub constructor_names: &'static [&'static str],
    /// Method names remapped to the destructor kind.
    pub destructor_names: &'static [&'static str],
}

impl LanguageSpec {
    pub fn grammar(&self) -> tree_sitter::Language {
        (self.grammar_fn)()
    }

    pub(crate) const fn new(
        lang: Lang,
        grammar_fn: fn() -> tree_sitter::Language,
        def_patterns: &'static [DefPattern],
        ref_patterns: &'static [RefPattern],
        separator: &'static str,
        export_rule: ExportRule,
        constructor_names: &'static [&'static str],
        destructor_names: &'static [&'static str],
    ) -> Self {
        Self {
            lang,
            grammar_fn,
            def_patterns,
            ref_patterns,
            separator,
            export_rule,
            constructor_names,
            destructor_names,
        }
    }
}

/// The pattern set for a language.
pub fn spec_for(lang: Lang) -> &'static LanguageSpec {
    match lang {
        Lang::TypeScript => &typescript::SPEC,
        Lang::JavaScript => &javascript::SPEC,
        Lang::Python => &python::SPEC,
        Lang::Go => &go::SPEC,
        Lang::Rust => &rust::SPEC,
        Lang::Java => &java::SPEC,
        Lang::C => &c::SPEC,
        Lang::Cpp => &cpp::SPEC,
        Lang::CSharp => &csharp::SPEC,
        Lang::Php => &php::SPEC,
        Lang::Ruby => &ruby::SPEC,
        Lang::Swift => &swift::SPEC,
        Lang::Kotlin => &kotlin::SPEC,
    }
}
