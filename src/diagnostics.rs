use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::Anchor;

/// Turns bold on in terminals.
const BOLD: &str = "\x1b[1m";
/// Resets terminal attributes.
const RESET: &str = "\x1b[0m";

/// Print a markdown block to stderr, headings in bold.
fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Print the end-of-run report for references that never resolved.
pub fn print_unresolved(unresolved: &[Anchor]) {
    print_markdown(&render_unresolved(unresolved));
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::Backend { operation, reason } => format!("\
# Error: Layout Failed

The layout backend failed during `{operation}`: {reason}

No output was written.
"),

        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `--config` path, or drop the flag to use `{CONFIG_FILE}` from the working directory.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::Json(e) => format!("\
# Error: Invalid Model

{e}

## Fix

The documentation model must be JSON with `pages` and `classes`. List kinds
are limited to `bullet`, `number`, `label`, `note`, `ualpha`, and `lalpha`.
"),

        Error::ModelNotFound { path } => format!("\
# Error: Model Not Found

`{}` does not exist.

## Fix

Point `model` in `{CONFIG_FILE}` or `--model` at the extractor's JSON output.
", path.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),

        Error::UnbalancedList { entity, event } => format!("\
# Error: Unbalanced List

A {event} was found in `{entity}` while no list was open.

## Fix

The documentation model is inconsistent. Regenerate it with the extractor.
"),

        Error::UnknownPaperSize { name } => format!("\
# Error: Unknown Paper Size

`{name}` is not a supported paper size.

## Fix

Use one of `A4`, `A5`, `Letter`, or `Legal`.
"),
    };
}

/// Render the warning block listing anchors whose page was never known.
///
/// The document is still written; these references show `???` as page.
pub fn render_unresolved(unresolved: &[Anchor]) -> String {
    let mut out = format!("\
# Warning: Unresolved References

{} reference(s) still have no page after the final pass.

## Anchors

", unresolved.len());
    for anchor in unresolved {
        let _ = writeln!(out, "- `{anchor}`");
    }
    return out;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn every_error_renders_a_heading() {
        let errors = [
            Error::Backend { operation: "go_to_page", reason: "page 9 does not exist".to_string() },
            Error::ConfigNotFound { path: PathBuf::from("custom.toml") },
            Error::ModelNotFound { path: PathBuf::from("docs.json") },
            Error::UnbalancedList { entity: "classmod-Foo".to_string(), event: "list end" },
            Error::UnknownPaperSize { name: "B5".to_string() },
        ];
        for error in &errors {
            assert!(render_error(error).starts_with("# Error: "), "{error}");
        }
    }

    #[test]
    fn model_not_found_names_the_path() {
        let md = render_error(&Error::ModelNotFound { path: PathBuf::from("out/docs.json") });
        assert!(md.contains("`out/docs.json` does not exist."));
        assert!(md.contains("## Fix"));
    }

    #[test]
    fn unresolved_report_lists_anchors() {
        let md = render_unresolved(&[Anchor("classmod-Ghost".to_string()), Anchor("method-A-#b".to_string())]);
        assert!(md.starts_with("# Warning: Unresolved References"));
        assert!(md.contains("2 reference(s)"));
        assert!(md.contains("- `classmod-Ghost`\n- `method-A-#b`\n"));
    }
}
