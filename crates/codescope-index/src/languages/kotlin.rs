//! Kotlin pattern set (tree-sitter-kotlin-ng).
//!
//! Name kinds vary between Kotlin grammar generations, so the definition
//! patterns capture only `@def` and the extractor derives the name from the
//! `name` field or the first identifier-like child.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::NodeKind;

fn grammar() -> tree_sitter::Language {
    tree_sitter_kotlin_ng::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_declaration) @def",
    },
    DefPattern {
        kind: NodeKind::Module,
        query: "(object_declaration) @def",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_declaration) @def",
    },
];

const REFS: &[RefPattern] = &[];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Kotlin,
    grammar,
    DEFS,
    REFS,
    ".",
    // Public by default; a private/protected modifier opts out.
    ExportRule::NotPrivateModifier,
    &["constructor"],
    &[],
);
