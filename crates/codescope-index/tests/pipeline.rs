//! End-to-end pipeline tests over real project directories.

use codescope_core::{CancelToken, EdgeKind, NodeKind, WarningKind};
use codescope_graph::{find_circular_dependencies, GraphQuery};
use codescope_index::Project;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn import_cycle_between_two_files_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "import { b } from './b';\nexport function a() {}\n");
    write(dir.path(), "b.ts", "import { a } from './a';\nexport function b() {}\n");

    let mut project = Project::init(dir.path()).unwrap();
    let summary = project.index(None).unwrap();
    assert_eq!(summary.files_added, 2);
    assert!(summary.errors.is_empty());

    let files = project.store().get_nodes_by_kind(NodeKind::File).unwrap();
    assert_eq!(files.len(), 2);

    let cycles = find_circular_dependencies(project.store()).unwrap();
    assert_eq!(cycles.len(), 1);
    let mut members = cycles[0].clone();
    members.sort();
    assert_eq!(members, vec!["a.ts", "b.ts"]);
}

#[test]
fn sync_after_rename_reports_add_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "old.ts", "export function f() {}\n");

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();

    let before = project.store().get_nodes_by_name("f").unwrap();
    assert_eq!(before.len(), 1);
    let old_id = before[0].id.clone();
    assert_eq!(before[0].file_path, "old.ts");

    std::fs::rename(dir.path().join("old.ts"), dir.path().join("new.ts")).unwrap();

    let summary = project.sync(None).unwrap();
    assert_eq!(summary.files_added, 1);
    assert_eq!(summary.files_modified, 0);
    assert_eq!(summary.files_removed, 1);

    let after = project.store().get_nodes_by_name("f").unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].file_path, "new.ts");
    assert_ne!(after[0].id, old_id);
    assert!(project.store().get_node_by_id(&old_id).unwrap().is_none());
}

#[test]
fn oversized_file_is_skipped_with_warning_and_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let big = format!("export function big() {{}}\n{}\n", "// padding\n".repeat(100));
    write(dir.path(), "big.ts", &big);
    write(dir.path(), "small.ts", "export function small() {}\n");

    let mut project = Project::init(dir.path()).unwrap();
    let mut config = project.config().clone();
    config.max_file_size = 64;
    project.update_config(config).unwrap();

    let summary = project.index(None).unwrap();
    assert_eq!(summary.files_added, 1);
    let oversized: Vec<_> = summary
        .errors
        .iter()
        .filter(|w| w.kind == WarningKind::OversizedFile)
        .collect();
    assert_eq!(oversized.len(), 1);
    assert_eq!(oversized[0].path, "big.ts");
    assert!(project.store().get_nodes_by_name("big").unwrap().is_empty());

    // Still skipped on the next sync; nothing new happens.
    let again = project.sync(None).unwrap();
    assert_eq!(again.files_added, 0);
    assert_eq!(again.files_modified, 0);
    assert!(again
        .errors
        .iter()
        .any(|w| w.kind == WarningKind::OversizedFile && w.path == "big.ts"));
}

#[test]
fn parse_errors_are_contained_per_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ok.ts", "export function fine() {}\n");
    write(
        dir.path(),
        "broken.ts",
        "export function ok() {}\nexport function broken( {\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    let summary = project.index(None).unwrap();

    // Both files are indexed; the broken one carries a warning.
    assert_eq!(summary.files_added, 2);
    assert!(summary
        .errors
        .iter()
        .any(|w| w.kind == WarningKind::ParseFailure && w.path == "broken.ts"));

    let files = project.store().get_nodes_by_kind(NodeKind::File).unwrap();
    assert!(files.iter().any(|f| f.file_path == "broken.ts"));
    // Nodes before the error region survive.
    assert!(!project.store().get_nodes_by_name("ok").unwrap().is_empty());
}

#[test]
fn unchanged_sync_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "svc.ts",
        "export class Svc {\n    run() { this.step(); }\n    step() {}\n}\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();

    let nodes_before = project.store().node_count().unwrap();
    let edges_before = project.store().edge_count().unwrap();
    let files_before = project.store().file_count().unwrap();
    let stamps_before: Vec<_> = project
        .store()
        .get_nodes_by_file("svc.ts")
        .unwrap()
        .into_iter()
        .map(|n| (n.id, n.updated_at))
        .collect();

    let summary = project.sync(None).unwrap();
    assert_eq!(summary.files_added, 0);
    assert_eq!(summary.files_modified, 0);
    assert_eq!(summary.files_removed, 0);
    assert_eq!(summary.files_checked, 1);

    assert_eq!(project.store().node_count().unwrap(), nodes_before);
    assert_eq!(project.store().edge_count().unwrap(), edges_before);
    assert_eq!(project.store().file_count().unwrap(), files_before);

    let stamps_after: Vec<_> = project
        .store()
        .get_nodes_by_file("svc.ts")
        .unwrap()
        .into_iter()
        .map(|n| (n.id, n.updated_at))
        .collect();
    assert_eq!(stamps_before, stamps_after);
}

#[test]
fn resolver_pass_confidences() {
    let dir = tempfile::tempdir().unwrap();
    // Local pass: sibling top-level functions.
    write(
        dir.path(),
        "local.ts",
        "export function entry() { helper(); }\nfunction helper() {}\n",
    );
    // Class pass: this-qualified sibling methods.
    write(
        dir.path(),
        "svc.ts",
        "export class AuthService {\n    login() { this.validate(); }\n    validate() {}\n}\n",
    );
    // Import pass: a call into an imported file's export.
    write(
        dir.path(),
        "uses.ts",
        "import { shared } from './lib';\nexport function use_it() { shared(); }\n",
    );
    write(dir.path(), "lib.ts", "export function shared() {}\n");

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();

    let helper = &store.get_nodes_by_name("helper").unwrap()[0];
    let local_edge = &store
        .get_incoming_edges(&helper.id, Some(&[EdgeKind::Calls]))
        .unwrap()[0];
    assert!((local_edge.confidence - 1.0).abs() < f64::EPSILON);
    assert_eq!(local_edge.resolved_by.as_deref(), Some("local"));

    let validate = &store.get_nodes_by_name("validate").unwrap()[0];
    let class_edge = &store
        .get_incoming_edges(&validate.id, Some(&[EdgeKind::Calls]))
        .unwrap()[0];
    assert!((class_edge.confidence - 0.95).abs() < f64::EPSILON);
    assert_eq!(class_edge.resolved_by.as_deref(), Some("class"));

    let shared = &store.get_nodes_by_name("shared").unwrap()[0];
    let import_edge = &store
        .get_incoming_edges(&shared.id, Some(&[EdgeKind::Calls]))
        .unwrap()[0];
    assert!((import_edge.confidence - 0.9).abs() < f64::EPSILON);
    assert_eq!(import_edge.resolved_by.as_deref(), Some("import"));
}

#[test]
fn global_fallback_breaks_ties_by_path_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "caller.ts", "export function go() { dup(); }\n");
    write(
        dir.path(),
        "x/first.ts",
        "export class HolderA { dup() {} }\n",
    );
    write(
        dir.path(),
        "y/second.ts",
        "export class HolderB { dup() {} }\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();

    let go = &store.get_nodes_by_name("go").unwrap()[0];
    let calls = store
        .get_outgoing_edges(&go.id, Some(&[EdgeKind::Calls]))
        .unwrap();
    assert_eq!(calls.len(), 1);
    let edge = &calls[0];
    assert!(edge.is_resolved());
    assert!((edge.confidence - 0.5).abs() < f64::EPSILON);
    assert_eq!(edge.resolved_by.as_deref(), Some("global"));

    let target = store
        .get_node_by_id(edge.target_id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(target.file_path, "x/first.ts");
}

#[test]
fn unresolved_references_keep_their_symbol() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "app.ts",
        "export function main() { phantom(); }\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();

    let unresolved = project.store().unresolved_edges().unwrap();
    let phantom: Vec<_> = unresolved
        .iter()
        .filter(|e| e.target_symbol == "phantom")
        .collect();
    assert_eq!(phantom.len(), 1);
    assert!(!phantom[0].is_resolved());
}

#[test]
fn forward_discovery_resolves_old_references_to_new_nodes() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "app.ts",
        "export function main() { later(); }\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    assert_eq!(project.store().unresolved_edges().unwrap().len(), 1);

    // The missing function appears in a new file; sync resolves the old
    // reference without touching app.ts.
    write(dir.path(), "late.ts", "export function later() {}\n");
    let summary = project.sync(None).unwrap();
    assert_eq!(summary.files_added, 1);

    let later = &project.store().get_nodes_by_name("later").unwrap()[0];
    let incoming = project
        .store()
        .get_incoming_edges(&later.id, Some(&[EdgeKind::Calls]))
        .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].file_path, "app.ts");
}

#[test]
fn every_node_reaches_its_file_through_contains() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "deep.ts",
        "export class Outer {\n    inner() { return 1; }\n}\nexport function top() {}\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();
    let graph = GraphQuery::new(store);

    for node in store.get_nodes_by_file("deep.ts").unwrap() {
        if node.kind == NodeKind::File {
            continue;
        }
        let ancestors = graph.ancestors(&node.id).unwrap();
        let last = ancestors.last().expect("non-file node must have ancestors");
        assert_eq!(last.kind, NodeKind::File, "chain for {} must end at the file", node.name);
    }
}

#[test]
fn flask_routes_are_extracted_when_detected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "requirements.txt", "flask==3.0\n");
    write(
        dir.path(),
        "app.py",
        "from flask import Flask\n\napp = Flask(__name__)\n\n@app.route(\"/login\")\ndef login():\n    return \"ok\"\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();

    let routes = project.store().get_nodes_by_kind(NodeKind::Route).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name, "/login");
    assert_eq!(routes[0].signature.as_deref(), Some("handler: login"));

    // Derived nodes hang off their file like everything else.
    let graph = GraphQuery::new(project.store());
    let ancestors = graph.ancestors(&routes[0].id).unwrap();
    assert_eq!(ancestors.last().unwrap().kind, NodeKind::File);
}

#[test]
fn react_components_resolve_jsx_references() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "package.json", "{\"dependencies\":{\"react\":\"^18.0.0\"}}\n");
    write(
        dir.path(),
        "src/ui.tsx",
        "export function Sidebar() {\n    return <div />;\n}\n",
    );
    write(
        dir.path(),
        "src/app.tsx",
        "export function App() {\n    return <Sidebar />;\n}\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();

    let components = store.get_nodes_by_kind(NodeKind::Component).unwrap();
    assert!(components.iter().any(|c| c.name == "Sidebar"));

    let app = store
        .get_nodes_by_name("App")
        .unwrap()
        .into_iter()
        .find(|n| n.kind == NodeKind::Function)
        .unwrap();
    let calls = store
        .get_outgoing_edges(&app.id, Some(&[EdgeKind::Calls]))
        .unwrap();
    let sidebar_edge = calls
        .iter()
        .find(|e| e.target_symbol == "Sidebar")
        .unwrap();
    assert!(sidebar_edge.is_resolved());
    assert_eq!(sidebar_edge.resolved_by.as_deref(), Some("react"));
    assert!((sidebar_edge.confidence - 0.8).abs() < f64::EPSILON);
}

#[test]
fn cancellation_stops_at_file_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "export function a() {}\n");
    write(dir.path(), "b.ts", "export function b() {}\n");

    let mut project = Project::init(dir.path()).unwrap();
    let token = CancelToken::new();
    token.cancel();

    let summary = project.index(Some(&token)).unwrap();
    assert_eq!(summary.files_added, 0);
    assert_eq!(summary.files_checked, 2);
    assert_eq!(project.store().node_count().unwrap(), 0);
}

#[test]
fn impact_radius_spans_files_through_imports() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "core.ts", "export function core() {}\n");
    write(
        dir.path(),
        "mid.ts",
        "import { core } from './core';\nexport function mid() { core(); }\n",
    );
    write(
        dir.path(),
        "top.ts",
        "import { mid } from './mid';\nexport function top() { mid(); }\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();

    let core = &store.get_nodes_by_name("core").unwrap()[0];
    let graph = GraphQuery::new(store);

    let at1 = graph.impact_radius(&core.id, 1).unwrap();
    let at2 = graph.impact_radius(&core.id, 2).unwrap();
    assert!(at1.iter().any(|e| e.node.name == "mid" && e.depth == 1));
    assert!(!at1.iter().any(|e| e.node.name == "top"));
    assert!(at2.iter().any(|e| e.node.name == "top" && e.depth == 2));
    // Monotone growth.
    assert!(at2.len() >= at1.len());
}

#[test]
fn index_file_validates_path_language_and_size() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.ts", "export function good() {}\n");
    write(dir.path(), "legacy.pas", "unit Legacy;\n");
    write(dir.path(), "huge.ts", &"// x\n".repeat(1000));

    let mut project = Project::init(dir.path()).unwrap();
    let mut config = project.config().clone();
    config.max_file_size = 256;
    project.update_config(config).unwrap();

    let summary = project.index_file(Path::new("good.ts")).unwrap();
    assert_eq!(summary.files_added, 1);
    assert_eq!(project.store().get_nodes_by_name("good").unwrap().len(), 1);

    let escape = project.index_file(Path::new("../outside.ts"));
    assert!(matches!(
        escape,
        Err(codescope_core::CodescopeError::PathEscape(_))
    ));

    let unsupported = project.index_file(Path::new("legacy.pas"));
    assert!(matches!(
        unsupported,
        Err(codescope_core::CodescopeError::LanguageUnsupported(_))
    ));

    let oversized = project.index_file(Path::new("huge.ts"));
    assert!(matches!(
        oversized,
        Err(codescope_core::CodescopeError::OversizedFile { .. })
    ));
}

#[test]
fn modified_file_replaces_its_slice_exactly() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "m.ts", "export function before() {}\n");

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    assert_eq!(project.store().get_nodes_by_name("before").unwrap().len(), 1);

    write(dir.path(), "m.ts", "export function after() {}\n");
    let summary = project.sync(None).unwrap();
    assert_eq!(summary.files_modified, 1);
    assert_eq!(summary.files_added, 0);

    // No stragglers from the previous version of the file.
    assert!(project.store().get_nodes_by_name("before").unwrap().is_empty());
    assert_eq!(project.store().get_nodes_by_name("after").unwrap().len(), 1);
    let nodes = project.store().get_nodes_by_file("m.ts").unwrap();
    assert_eq!(nodes.len(), 2); // the file node and `after`
}

#[test]
fn url_for_reference_resolves_to_route_handler() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "requirements.txt", "flask==3.0\n");
    write(
        dir.path(),
        "views.py",
        "from flask import Flask\n\napp = Flask(__name__)\n\n@app.route(\"/login\")\ndef login():\n    return \"ok\"\n",
    );
    write(
        dir.path(),
        "emails.py",
        "from flask import url_for\n\ndef build_link():\n    return url_for(\"login\")\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();

    let build_link = &store.get_nodes_by_name("build_link").unwrap()[0];
    let calls = store
        .get_outgoing_edges(&build_link.id, Some(&[EdgeKind::Calls]))
        .unwrap();

    // The endpoint string resolves to the decorated handler function.
    let endpoint_edge = calls
        .iter()
        .find(|e| e.target_symbol == "login")
        .expect("url_for argument should surface as a reference");
    assert!(endpoint_edge.is_resolved());
    assert_eq!(endpoint_edge.resolved_by.as_deref(), Some("flask"));
    assert!((endpoint_edge.confidence - 0.85).abs() < f64::EPSILON);

    let target = store
        .get_node_by_id(endpoint_edge.target_id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(target.name, "login");
    assert_eq!(target.kind, NodeKind::Function);
    assert_eq!(target.file_path, "views.py");

    // The url_for call itself has no target in the project and stays put.
    let url_for_edge = calls.iter().find(|e| e.target_symbol == "url_for").unwrap();
    assert!(!url_for_edge.is_resolved());
}

#[test]
fn import_pass_skips_unexported_symbols() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Caller.java",
        "import util.Helpers;\n\npublic class Caller {\n    public void go() {\n        hidden();\n    }\n}\n",
    );
    write(
        dir.path(),
        "util/Helpers.java",
        "public class Helpers {\n    private void hidden() {}\n}\n",
    );

    let mut project = Project::init(dir.path()).unwrap();
    project.index(None).unwrap();
    let store = project.store();

    let hidden = &store.get_nodes_by_name("hidden").unwrap()[0];
    assert!(!hidden.is_exported);

    // The import edge itself resolves, but the private method is not a
    // legitimate cross-file target: resolution falls through to the
    // global fallback instead of the import pass.
    let incoming = store
        .get_incoming_edges(&hidden.id, Some(&[EdgeKind::Calls]))
        .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].resolved_by.as_deref(), Some("global"));
    assert!((incoming[0].confidence - 0.5).abs() < f64::EPSILON);
}
