//! Go pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_declaration name: (identifier) @name) @def",
    },
    // Receiver type scopes the method; pointer receivers first, then value
    // receivers, then a fallback without a recognized receiver shape.
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_declaration receiver: (parameter_list (parameter_declaration \
                 type: (pointer_type (type_identifier) @scope))) \
                 name: (field_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_declaration receiver: (parameter_list (parameter_declaration \
                 type: (type_identifier) @scope)) \
                 name: (field_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_declaration name: (field_identifier) @name) @def",
    },
    // Struct and interface specs first; the bare type_spec fallback below
    // only survives the position dedupe for plain aliases.
    DefPattern {
        kind: NodeKind::Struct,
        query: "(type_spec name: (type_identifier) @name type: (struct_type)) @def",
    },
    DefPattern {
        kind: NodeKind::Interface,
        query: "(type_spec name: (type_identifier) @name type: (interface_type)) @def",
    },
    DefPattern {
        kind: NodeKind::TypeAlias,
        query: "(type_spec name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Constant,
        query: "(const_spec name: (identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_spec path: (interpreted_string_literal) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (selector_expression \
                 operand: (identifier) @qualifier \
                 field: (field_identifier) @ref))",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Go,
    grammar,
    DEFS,
    REFS,
    ".",
    ExportRule::UppercaseName,
    &[],
    &[],
);
