//! Rust pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_rust::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    // Impl methods first so they win the position dedupe over the plain
    // function pattern; @scope prefixes the qualified name with the type.
    DefPattern {
        kind: NodeKind::Method,
        query: "(impl_item type: (type_identifier) @scope \
                 body: (declaration_list (function_item name: (identifier) @name) @def))",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_item name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Struct,
        query: "(struct_item name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Enum,
        query: "(enum_item name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Trait,
        query: "(trait_item name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Module,
        query: "(mod_item name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Constant,
        query: "(const_item name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Variable,
        query: "(static_item name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::TypeAlias,
        query: "(type_item name: (type_identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(use_declaration argument: (_) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (scoped_identifier name: (identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (field_expression \
                 value: (identifier) @qualifier \
                 field: (field_identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (field_expression \
                 value: (self) @qualifier \
                 field: (field_identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Implements,
        query: "(impl_item trait: (type_identifier) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Rust,
    grammar,
    DEFS,
    REFS,
    "::",
    ExportRule::PubKeyword,
    &["new"],
    &[],
);
