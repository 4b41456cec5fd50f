//! JavaScript pattern set (.js/.jsx/.mjs/.cjs).

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_javascript::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(lexical_declaration (variable_declarator \
                 name: (identifier) @name \
                 value: [(arrow_function) (function_expression)])) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_definition name: (property_identifier) @name) @def",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_statement source: (string) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (member_expression \
                 object: (identifier) @qualifier \
                 property: (property_identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (member_expression \
                 object: (this) @qualifier \
                 property: (property_identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(new_expression constructor: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(class_heritage (identifier) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::JavaScript,
    grammar,
    DEFS,
    REFS,
    ".",
    ExportRule::ExportAncestor,
    &["constructor"],
    &[],
);

#[cfg(test)]
mod tests {
    use crate::extractor::extract_file;
    use crate::parser::{Lang, ParserPool};
    use crate::queries::QueryEngine;
    use codescope_core::{EdgeKind, NodeKind};

    #[test]
    fn commonjs_style_file_extracts_functions_and_calls() {
        let mut pool = ParserPool::new();
        let mut engine = QueryEngine::new();
        let out = extract_file(
            "lib/util.js",
            b"function greet(name) { return format(name); }\nfunction format(n) { return n; }\n",
            Lang::JavaScript,
            &mut pool,
            &mut engine,
        )
        .unwrap();

        assert_eq!(
            out.nodes
                .iter()
                .filter(|n| n.kind == NodeKind::Function)
                .count(),
            2
        );
        assert!(out
            .references
            .iter()
            .any(|r| r.kind == EdgeKind::Calls && r.reference_name == "format"));
    }
}
