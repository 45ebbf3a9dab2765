//! CLI commands for folio: build and resolve.

use std::path::Path;
use std::process::ExitCode;

use crate::config::{Config, Overrides};
use crate::diagnostics;
use crate::error;
use crate::generator;
use crate::layout::PagedLayout;
use crate::model::Documentation;
use crate::resolver::{ModelIndex, NameResolver as _};

/// File name of the laid-out document inside the output directory.
pub const DOCUMENT_FILE: &str = "Documentation.json";

/// File name of the landing page inside the output directory.
pub const LANDING_PAGE: &str = "index.html";

/// Title used when neither the config nor the model names the project.
const DEFAULT_TITLE: &str = "Documentation";

/// Render the documentation model into the output directory.
///
/// References that are still unknown after the last pass are reported on
/// stderr but do not fail the build.
///
/// # Errors
///
/// Returns errors from config or model loading, from layout, or from
/// writing the output files.
pub fn build(config_path: Option<&Path>, overrides: Overrides) -> Result<(), error::Error> {
    let config = load_config(config_path)?.apply(overrides)?;
    let doc = Documentation::load(&config.model)?;
    let index = ModelIndex::new(&doc);
    let paper_size = config.paper_size;

    let generation = generator::generate(&doc, &index, config.options(), config.main_page.as_deref(), || {
        return PagedLayout::new(paper_size);
    })?;
    if !generation.unresolved.is_empty() {
        diagnostics::print_unresolved(&generation.unresolved);
    }

    let document = generation.backend.finish();
    std::fs::create_dir_all(&config.output)?;
    document.write(&config.output.join(DOCUMENT_FILE))?;

    let title = config.title.as_deref().or(doc.title.as_deref()).unwrap_or(DEFAULT_TITLE);
    std::fs::write(config.output.join(LANDING_PAGE), landing_page(title))?;

    let pages = document.pages.len();
    eprintln!(
        "Wrote {pages} pages to {} ({} pass(es))",
        config.output.join(DOCUMENT_FILE).display(),
        generation.passes
    );
    return Ok(());
}

/// Escape text for HTML element content and attribute values.
fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    return out;
}

/// A minimal HTML page pointing at the generated document.
fn landing_page(title: &str) -> String {
    let title = html_escape(title);
    return format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<p><a href=\"{DOCUMENT_FILE}\">{DOCUMENT_FILE}</a></p>
</body>
</html>
"
    );
}

/// `--config` if given, otherwise `.folio.toml` in the working directory.
fn load_config(config_path: Option<&Path>) -> Result<Config, error::Error> {
    return match config_path {
        Some(path) => Config::load_file(path),
        None => Config::load(Path::new(".")),
    };
}

/// List every anchor in the model, or print the anchor a name resolves to.
///
/// `context` is the qualified name of the class or module the name is
/// looked up from, as if it appeared in that container's documentation.
///
/// # Errors
///
/// Returns errors from config or model loading.
pub fn resolve(
    config_path: Option<&Path>,
    overrides: Overrides,
    name: Option<&str>,
    context: Option<&str>,
) -> Result<ExitCode, error::Error> {
    let config = load_config(config_path)?.apply(overrides)?;
    let doc = Documentation::load(&config.model)?;
    let index = ModelIndex::new(&doc);

    let Some(name) = name else {
        for entity in index.entities() {
            println!("{}", entity.anchor());
        }
        return Ok(ExitCode::SUCCESS);
    };

    let scope = match context {
        None => None,
        Some(full_name) => {
            let Some(found) = doc.classes.iter().find(|c| return c.full_name == full_name) else {
                eprintln!("`{full_name}` is not a documented class or module");
                return Ok(ExitCode::FAILURE);
            };
            Some(found)
        },
    };

    return match index.resolve(name, scope) {
        Some(entity) => {
            println!("{}", entity.anchor());
            Ok(ExitCode::SUCCESS)
        },
        None => {
            eprintln!("`{name}` does not name a documented entity");
            Ok(ExitCode::FAILURE)
        },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_page_links_document() {
        let html = landing_page("Tools & <Things>");
        assert!(html.contains("<title>Tools &amp; &lt;Things&gt;</title>"));
        assert!(html.contains("<a href=\"Documentation.json\">"));
    }
}
