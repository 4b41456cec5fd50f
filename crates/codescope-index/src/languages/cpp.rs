//! C++ pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_cpp::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_specifier name: (type_identifier) @name \
                 body: (field_declaration_list)) @def",
    },
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
    // Inline member functions are remapped to methods via class nesting.
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_definition declarator: (function_declarator \
                 declarator: (identifier) @name)) @def",
    },
    DefPattern {
        kind: NodeKind::Method,
        query: "(function_definition declarator: (function_declarator \
                 declarator: (field_identifier) @name)) @def",
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
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call_expression function: (field_expression \
                 field: (field_identifier) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(base_class_clause (type_identifier) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Cpp,
    grammar,
    DEFS,
    REFS,
    "::",
    // Same internal-linkage rule as C for file-scope statics; member
    // access sections are positional and stay best-effort.
    ExportRule::NotFileStatic,
    &[],
    &[],
);

#[cfg(test)]
mod tests {
    use crate::extractor::extract_file;
    use crate::parser::{Lang, ParserPool};
    use crate::queries::QueryEngine;
    use codescope_core::{EdgeKind, NodeKind};

    #[test]
    fn class_with_base_and_inline_method() {
        let mut pool = ParserPool::new();
        let mut engine = QueryEngine::new();
        let out = extract_file(
            "src/svc.cpp",
            br#"
class AuthService : public BaseService {
  public:
    bool login() { return validate(); }
    bool validate() { return true; }
};
"#,
            Lang::Cpp,
            &mut pool,
            &mut engine,
        )
        .unwrap();

        let class = out.nodes.iter().find(|n| n.kind == NodeKind::Class).unwrap();
        assert_eq!(class.name, "AuthService");

        let login = out.nodes.iter().find(|n| n.name == "login").unwrap();
        assert_eq!(login.qualified_name, "AuthService::login");
        assert_eq!(login.kind, NodeKind::Method);

        assert!(out
            .references
            .iter()
            .any(|r| r.kind == EdgeKind::Extends && r.reference_name == "BaseService"));
    }
}
