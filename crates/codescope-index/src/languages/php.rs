//! PHP pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_php::LANGUAGE_PHP.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_declaration name: (name) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Interface,
        query: "(interface_declaration name: (name) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Trait,
        query: "(trait_declaration name: (name) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_definition name: (name) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_declaration name: (name) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(namespace_use_clause (qualified_name) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(function_call_expression function: (name) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(base_clause (name) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Implements,
        query: "(class_interface_clause (name) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Php,
    grammar,
    DEFS,
    REFS,
    ".",
    // Methods are public unless marked private/protected.
    ExportRule::NotPrivateModifier,
    &["__construct"],
    &["__destruct"],
);
