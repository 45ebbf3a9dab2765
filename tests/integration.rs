use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn folio_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_folio"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn build(fixture: &str, out: &Path, extra: &[&str]) -> Output {
    folio_cmd(fixture).arg("build").arg("--output").arg(out).args(extra).output().unwrap()
}

fn read_document(out: &Path) -> Value {
    let content = std::fs::read_to_string(out.join("Documentation.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn items<'v>(doc: &'v Value, page: usize) -> &'v Vec<Value> {
    doc["pages"][page - 1]["items"].as_array().unwrap()
}

fn page_text(doc: &Value, page: usize) -> String {
    items(doc, page)
        .iter()
        .filter(|item| item["op"] == "text")
        .map(|item| item["text"].as_str().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn forward_references_get_page_numbers() {
    let out = tempfile::tempdir().unwrap();
    let run = build("forward", out.path(), &[]);
    assert!(run.status.success(), "build failed: {}", stderr(&run));
    assert!(stderr(&run).contains("(2 pass(es))"), "{}", stderr(&run));
    assert!(!stderr(&run).contains("Unresolved"), "{}", stderr(&run));

    let doc = read_document(out.path());
    assert_eq!(doc["pages"].as_array().unwrap().len(), 5);
    assert_eq!(doc["destinations"]["toplevel-README.rdoc"], 1);
    assert_eq!(doc["destinations"]["toplevel-guide.rdoc"], 2);
    assert_eq!(doc["destinations"]["classmod-Engine"], 4);
    assert_eq!(doc["destinations"]["classmod-Storage"], 5);

    assert!(page_text(&doc, 1).contains(
        "Start with \\hyperref[classmod-Engine]{Engine} [p.~\\hyperref[classmod-Engine]{4}]."
    ));
    assert!(page_text(&doc, 2).contains(
        "See \\hyperref[toplevel-README.rdoc]{README.rdoc} [p.~\\hyperref[toplevel-README.rdoc]{1}] and \\hyperref[classmod-Storage]{Storage} [p.~\\hyperref[classmod-Storage]{5}]."
    ));

    let overview = page_text(&doc, 3);
    assert!(overview.contains("\\texttt{Engine\\#run} \\hfill \\hyperref[method-Engine-#run]{4}"));
    assert!(overview.contains("\\texttt{Storage\\-::open} \\hfill \\hyperref[method-Storage-::open]{5}"));

    let engine = page_text(&doc, 4);
    assert!(engine.starts_with("Class\nEngine"));
    assert!(engine.contains("writes through \\hyperref[classmod-Storage]{Storage} [p.~\\hyperref[classmod-Storage]{5}]."));
    assert!(engine.contains(
        "Calls \\hyperref[method-Storage-::open]{Storage.open} [p.~\\hyperref[method-Storage-::open]{5}] first."
    ));
    assert!(page_text(&doc, 5).starts_with("Module\nStorage"));

    for page in 1..=5 {
        assert!(!page_text(&doc, page).contains("???"), "page {page} has a placeholder");
        assert_eq!(doc["pages"][page - 1]["footer"], page.to_string());
    }

    let landing = std::fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(landing.contains("<title>Forward Demo</title>"));
}

#[test]
fn no_show_pages_prints_plain_links() {
    let out = tempfile::tempdir().unwrap();
    let run = build("forward", out.path(), &["--no-show-pages"]);
    assert!(run.status.success(), "build failed: {}", stderr(&run));

    let doc = read_document(out.path());
    let engine = page_text(&doc, 4);
    assert!(engine.contains("writes through \\hyperref[classmod-Storage]{Storage}."));
    assert!(!engine.contains("[p.~"));
}

#[test]
fn lists_render_markers_and_boxes() {
    let out = tempfile::tempdir().unwrap();
    let run = build("lists", out.path(), &[]);
    assert!(run.status.success(), "build failed: {}", stderr(&run));
    assert!(stderr(&run).contains("(1 pass(es))"), "{}", stderr(&run));

    let doc = read_document(out.path());
    let page = items(&doc, 1);
    let count = |op: &str| page.iter().filter(|item| item["op"] == op).count();
    assert_eq!(count("circle"), 1);
    assert_eq!(count("rectangle"), 1);
    assert!(count("line") >= 4);

    let text = page_text(&doc, 1);
    assert!(text.contains("1.\nunpack"));
    assert!(text.contains("2.\ninstall"));
    assert!(text.contains("\\textbf{path}"));
    assert!(text.contains("folio build\nfolio resolve"));
}

#[test]
fn unknown_list_kind_is_fatal() {
    let out = tempfile::tempdir().unwrap();
    let run = build("invalid", out.path(), &[]);
    assert_eq!(run.status.code(), Some(1));
    assert!(stderr(&run).contains("# Error: Invalid Model"), "{}", stderr(&run));
    assert!(!out.path().join("Documentation.json").exists());
}

#[test]
fn missing_model_is_reported() {
    let out = tempfile::tempdir().unwrap();
    let run = build("forward", out.path(), &["--model", "nowhere.json"]);
    assert_eq!(run.status.code(), Some(1));
    assert!(stderr(&run).contains("# Error: Model Not Found"), "{}", stderr(&run));
    assert!(stderr(&run).contains("`nowhere.json` does not exist."));
}

#[test]
fn malformed_config_is_not_ignored() {
    let out = tempfile::tempdir().unwrap();
    let run = build("invalid", out.path(), &["--config", "bad.toml"]);
    assert_eq!(run.status.code(), Some(1));
    assert!(stderr(&run).contains("# Error: Invalid TOML"), "{}", stderr(&run));

    let run = build("invalid", out.path(), &["--config", "missing.toml"]);
    assert_eq!(run.status.code(), Some(1));
    assert!(stderr(&run).contains("# Error: Config Not Found"), "{}", stderr(&run));
}

#[test]
fn resolve_lists_and_looks_up_anchors() {
    let all = folio_cmd("forward").arg("resolve").output().unwrap();
    assert!(all.status.success(), "resolve failed: {}", stderr(&all));
    let listed = String::from_utf8(all.stdout).unwrap();
    for anchor in ["toplevel-README.rdoc", "classmod-Engine", "method-Engine-#run", "method-Storage-::open"] {
        assert!(listed.lines().any(|line| line == anchor), "missing {anchor} in:\n{listed}");
    }

    let one = folio_cmd("forward").args(["resolve", "open", "--context", "Storage"]).output().unwrap();
    assert!(one.status.success(), "resolve failed: {}", stderr(&one));
    assert_eq!(String::from_utf8(one.stdout).unwrap().trim(), "method-Storage-::open");

    let missing = folio_cmd("forward").args(["resolve", "Gearbox"]).output().unwrap();
    assert_eq!(missing.status.code(), Some(1));
}
