//! Ruby pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_ruby::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class name: (constant) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Module,
        query: "(module name: (constant) @name) @def",
    },
    // Top-level defs stay functions; class nesting remaps them to methods.
    DefPattern {
        kind: NodeKind::Function,
        query: "(method name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(singleton_method name: (identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call method: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(superclass (constant) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Ruby,
    grammar,
    DEFS,
    REFS,
    ".",
    ExportRule::NoLeadingUnderscore,
    &["initialize"],
    &[],
);
