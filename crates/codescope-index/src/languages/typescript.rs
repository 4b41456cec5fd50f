//! TypeScript/TSX pattern set.
//!
//! Uses the TSX grammar (a superset of TypeScript) so `.ts` and `.tsx`
//! are handled by a single parser.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_declaration name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Interface,
        query: "(interface_declaration name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Enum,
        query: "(enum_declaration name: (identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::TypeAlias,
        query: "(type_alias_declaration name: (type_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_declaration name: (identifier) @name) @def",
    },
    // Arrow functions and function expressions bound to a const/let name.
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
    // Interface members are signatures, not definitions.
    DefPattern {
        kind: NodeKind::Method,
        query: "(method_signature name: (property_identifier) @name) @def",
    },
    DefPattern {
        kind: NodeKind::Module,
        query: "(internal_module name: (identifier) @name) @def",
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
    // `this.helper()` participates in the class-hierarchy pass.
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
    // JSX usage references components by name.
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(jsx_self_closing_element name: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(jsx_opening_element name: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(extends_clause [(identifier) (type_identifier)] @ref)",
    },
    RefPattern {
        kind: EdgeKind::Implements,
        query: "(implements_clause (type_identifier) @ref)",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::TypeScript,
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

    fn extract(source: &str) -> crate::extractor::FileExtraction {
        let mut pool = ParserPool::new();
        let mut engine = QueryEngine::new();
        extract_file("src/auth.ts", source.as_bytes(), Lang::TypeScript, &mut pool, &mut engine)
            .unwrap()
    }

    #[test]
    fn class_with_methods_gets_qualified_names() {
        let out = extract(
            r#"
export interface TokenValidator {
    validate(token: string): boolean;
}

export class AuthService implements TokenValidator {
    validate(token: string): boolean {
        return token.length > 0;
    }

    login(user: string): void {
        this.validate(user);
    }
}
"#,
        );

        let class = out
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Class)
            .unwrap();
        assert_eq!(class.name, "AuthService");
        assert!(class.is_exported);

        let login = out
            .nodes
            .iter()
            .find(|n| n.name == "login")
            .unwrap();
        assert_eq!(login.kind, NodeKind::Method);
        assert_eq!(login.qualified_name, "AuthService.login");

        let implements = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Implements)
            .unwrap();
        assert_eq!(implements.reference_name, "TokenValidator");

        let call = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Calls && r.simple_name() == "validate")
            .unwrap();
        assert_eq!(call.qualifier.as_deref(), Some("this"));
    }

    #[test]
    fn constructor_kind_is_remapped() {
        let out = extract(
            r#"
class Box {
    constructor(size: number) {}
}
"#,
        );
        let ctor = out
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Constructor)
            .unwrap();
        assert_eq!(ctor.qualified_name, "Box.constructor");
    }

    #[test]
    fn arrow_function_bound_to_const_is_a_node() {
        let out = extract("export const handler = (req: Request) => req.url;\n");
        let handler = out.nodes.iter().find(|n| n.name == "handler").unwrap();
        assert_eq!(handler.kind, NodeKind::Function);
        assert!(handler.is_exported);
    }

    #[test]
    fn unexported_symbols_are_private() {
        let out = extract("function internal(): void {}\n");
        let f = out.nodes.iter().find(|n| n.name == "internal").unwrap();
        assert!(!f.is_exported);
    }

    #[test]
    fn imports_attach_to_the_file_node() {
        let out = extract("import { a } from './b';\n");
        let import = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Imports)
            .unwrap();
        assert_eq!(import.reference_name, "./b");
        assert_eq!(import.source_node_id, out.file_node.id);
    }

    #[test]
    fn extends_reference_is_extracted() {
        let out = extract("class Child extends Base {}\n");
        let ext = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Extends)
            .unwrap();
        assert_eq!(ext.reference_name, "Base");
    }

    #[test]
    fn jsx_usage_references_component() {
        let mut pool = ParserPool::new();
        let mut engine = QueryEngine::new();
        let out = extract_file(
            "src/App.tsx",
            b"const App = () => <Sidebar title=\"x\" />;\n",
            Lang::TypeScript,
            &mut pool,
            &mut engine,
        )
        .unwrap();
        assert!(out
            .references
            .iter()
            .any(|r| r.kind == EdgeKind::Calls && r.reference_name == "Sidebar"));
    }
}
