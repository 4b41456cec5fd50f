//! Swift pattern set. Kept intentionally lean: class-like declarations,
//! protocols, functions, and direct calls.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_swift::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    // The Swift grammar parses class, struct, enum, and actor declarations
    // as class_declaration.
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_declaration name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Interface,
        query: "(protocol_declaration name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_declaration name: (simple_identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[RefPattern {
    kind: EdgeKind::Calls,
    query: "(call_expression (simple_identifier) @ref)",
}];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Swift,
    grammar,
    DEFS,
    REFS,
    ".",
    // Internal by default; private/fileprivate stay out of the index's
    // export set.
    ExportRule::NotPrivateModifier,
    &["init"],
    &["deinit"],
);
