//! C pattern set (.c and .h — headers default to C, not C++).

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_c::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_definition declarator: (function_declarator \
                 declarator: (identifier) @name)) @def",
    },
    // Body required so forward declarations don't produce nodes.
    DefPattern {
        kind: NodeKind::Struct,
        query: "(struct_specifier name: (type_identifier) @name \
                 body: (field_declaration_list)) @def",
    },
    DefPattern {
        kind: NodeKind::Enum,
        query: "(enum_specifier name: (type_identifier) @name \
                 body: (enumerator_list)) @def",
    },
    DefPattern {
        kind: NodeKind::TypeAlias,
        query: "(type_definition declarator: (type_identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(preproc_include path: (string_literal) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(preproc_include path: (system_lib_string) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (identifier) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::C,
    grammar,
    DEFS,
    REFS,
    ".",
    // `static` functions have internal linkage and never cross files.
    ExportRule::NotFileStatic,
    &[],
    &[],
);
