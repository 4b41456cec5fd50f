//! Java pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_java::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Interface,
        query: "(interface_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Enum,
        query: "(enum_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Constructor,
        query: "(constructor_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Field,
        query: "(field_declaration declarator: (variable_declarator name: (identifier) @name)) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_declaration (scoped_identifier) @ref)",
    },
    // Qualified invocations first so the dedupe keeps the qualifier.
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(method_invocation object: (identifier) @qualifier name: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(method_invocation name: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(object_creation_expression type: (type_identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(superclass (type_identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Implements,
        query: "(super_interfaces (type_list (type_identifier) @ref))",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Java,
    grammar,
    DEFS,
    REFS,
    ".",
    // Package-private is the default; only `public` escapes the file's
    // neighborhood.
    ExportRule::PublicModifier,
    &[],
    &[],
);
