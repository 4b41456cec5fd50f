//! C# pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_c_sharp::LANGUAGE.into()
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
        kind: NodeKind::Struct,
        query: "(struct_declaration name: (identifier) @name) @def",
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
        kind: NodeKind::Property,
        query: "(property_declaration name: (identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(using_directive (qualified_name) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(using_directive (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(invocation_expression function: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(invocation_expression function: (member_access_expression \
                 name: (identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(base_list (identifier) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::CSharp,
    grammar,
    DEFS,
    REFS,
    ".",
    // Members default to private; only explicit `public` is exported.
    ExportRule::PublicModifier,
    &[],
    &[],
);
