//! Python pattern set.

use super::{DefPattern, ExportRule, LanguageSpec, RefPattern};
use crate::parser::Lang;
use codescope_core::{EdgeKind, NodeKind};

fn grammar() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

const DEFS: &[DefPattern] = &[
    DefPattern {
        kind: NodeKind::Class,
        query: "(class_definition name: (identifier) @name) @def",
    },
    // Functions nested in a class are remapped to methods by the extractor.
    DefPattern {
        kind: NodeKind::Function,
        query: "(function_definition name: (identifier) @name) @def",
    },
    // Module-level assignments; ALL_CAPS names become constants.
    DefPattern {
        kind: NodeKind::Variable,
        query: "(module (expression_statement (assignment left: (identifier) @name) @def))",
    },
];

const REFS: &[RefPattern] = &[
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_statement name: (dotted_name) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_statement name: (aliased_import name: (dotted_name) @ref))",
    },
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_from_statement module_name: (dotted_name) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Imports,
        query: "(import_from_statement module_name: (relative_import) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call function: (identifier) @ref)",
    },
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call function: (attribute \
                 object: (identifier) @qualifier \
                 attribute: (identifier) @ref))",
    },
    // `url_for("login")` names its target by endpoint string; surfaced as
    // a reference so the flask resolver can bind it to the handler.
    RefPattern {
        kind: EdgeKind::Calls,
        query: "(call function: (identifier) @fn \
                 arguments: (argument_list (string) @ref) \
                 (#eq? @fn \"url_for\"))",
    },
    RefPattern {
        kind: EdgeKind::Extends,
        query: "(class_definition superclasses: (argument_list (identifier) @ref))",
    },
];

pub static SPEC: LanguageSpec = LanguageSpec::new(
    Lang::Python,
    grammar,
    DEFS,
    REFS,
    ".",
    ExportRule::NoLeadingUnderscore,
    &["__init__"],
    &["__del__"],
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
        extract_file("app/models.py", source.as_bytes(), Lang::Python, &mut pool, &mut engine)
            .unwrap()
    }

    #[test]
    fn class_methods_and_constructor() {
        let out = extract(
            r#"
class User(Base):
    def __init__(self, name):
        self.name = name

    def greet(self):
        return self.render(self.name)

    def render(self, text):
        return text
"#,
        );

        let class = out.nodes.iter().find(|n| n.kind == NodeKind::Class).unwrap();
        assert_eq!(class.name, "User");

        let ctor = out
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Constructor)
            .unwrap();
        assert_eq!(ctor.qualified_name, "User.__init__");

        let greet = out.nodes.iter().find(|n| n.name == "greet").unwrap();
        assert_eq!(greet.kind, NodeKind::Method);

        let extends = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Extends)
            .unwrap();
        assert_eq!(extends.reference_name, "Base");

        let call = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Calls && r.simple_name() == "render")
            .unwrap();
        assert_eq!(call.qualifier.as_deref(), Some("self"));
    }

    #[test]
    fn imports_and_relative_imports() {
        let out = extract("import os.path\nfrom .auth import validate\n");
        let names: Vec<&str> = out
            .references
            .iter()
            .filter(|r| r.kind == EdgeKind::Imports)
            .map(|r| r.reference_name.as_str())
            .collect();
        assert!(names.contains(&"os.path"));
        assert!(names.contains(&".auth"));
    }

    #[test]
    fn underscore_names_are_private() {
        let out = extract("def _hidden():\n    pass\n\ndef visible():\n    pass\n");
        let hidden = out.nodes.iter().find(|n| n.name == "_hidden").unwrap();
        let visible = out.nodes.iter().find(|n| n.name == "visible").unwrap();
        assert!(!hidden.is_exported);
        assert!(visible.is_exported);
    }

    #[test]
    fn url_for_argument_becomes_a_reference() {
        let out = extract(
            "def build_link():\n    return url_for(\"login\", next=\"/home\")\n",
        );
        // Both the call itself and its endpoint string surface.
        assert!(out
            .references
            .iter()
            .any(|r| r.kind == EdgeKind::Calls && r.reference_name == "url_for"));
        assert!(out
            .references
            .iter()
            .any(|r| r.kind == EdgeKind::Calls && r.reference_name == "login"));
        // Other string-bearing calls are not affected.
        let other = extract("def noop():\n    print(\"hello\")\n");
        assert!(!other
            .references
            .iter()
            .any(|r| r.reference_name == "hello"));
    }

    #[test]
    fn module_constants_are_remapped() {
        let out = extract("MAX_RETRIES = 5\ncursor = None\n");
        let max = out.nodes.iter().find(|n| n.name == "MAX_RETRIES").unwrap();
        assert_eq!(max.kind, NodeKind::Constant);
        let cursor = out.nodes.iter().find(|n| n.name == "cursor").unwrap();
        assert_eq!(cursor.kind, NodeKind::Variable);
    }
}
