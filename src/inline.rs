//! Escaping and inline rendering of text runs into backend markup.
//!
//! Everything here is a pure function of its input. Reference resolution is
//! plugged in through [`InlineHandler`] so this module stays free of state.

use crate::model::Inline;

/// Opening and closing markup for bold spans.
pub const BOLD: (&str, &str) = ("\\textbf{", "}");

/// Opening and closing markup for italic spans.
pub const EMPHASIS: (&str, &str) = ("\\textit{", "}");

/// Opening and closing markup for monospaced spans.
pub const TELETYPE: (&str, &str) = ("\\texttt{", "}");

/// Receives the parts of an inline flow that need more than escaping.
pub trait InlineHandler {
    /// Render an explicit reference token.
    fn reference(&mut self, name: &str, label: Option<&str>) -> String;

    /// Render a plain text run.
    fn text(&mut self, run: &str) -> String;
}

/// Handler that escapes everything and never links.
#[cfg(test)]
pub struct PlainText;

#[cfg(test)]
impl InlineHandler for PlainText {
    fn reference(&mut self, name: &str, label: Option<&str>) -> String {
        return escape(label.unwrap_or(name));
    }

    fn text(&mut self, run: &str) -> String {
        return escape(run);
    }
}

/// Escape every character the backend markup reserves.
///
/// Works in a single left-to-right pass, so replacement text is never
/// escaped a second time.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("LaTeX") {
            out.push_str("\\LaTeX{}");
            rest = rest.get("LaTeX".len()..).unwrap_or("");
            continue;
        }
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '$' | '#' | '%' | '&' | '{' | '}' | '^' | '~' => {
                out.push('\\');
                out.push(c);
            },
            '_' => out.push_str("\\textunderscore{}"),
            '\u{a9}' => out.push_str("\\copyright{}"),
            _ => out.push(c),
        }
        rest = rest.get(c.len_utf8()..).unwrap_or("");
    }

    return out;
}

/// Allow line breaks before namespace separators in long qualified names.
pub fn hyphenate_namespaces(escaped: &str) -> String {
    return escaped.replace("::", "\\-::");
}

/// Render an external hyperlink. Prepends `http://` when the URL has no scheme.
pub fn make_url(url: &str, label: Option<&str>) -> String {
    let url = if url.contains(':') {
        url.to_string()
    } else {
        format!("http://{url}")
    };
    let target = url.replace('%', "\\%").replace('#', "\\#");

    return match label {
        None => format!("\\url{{{target}}}"),
        Some(label) => format!("\\href{{{target}}}{{{}}}", escape(label)),
    };
}

/// Convert a token flow into backend markup.
pub fn render_inlines(tokens: &[Inline], handler: &mut dyn InlineHandler) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Inline::Bold(children) => wrap(&mut out, BOLD, &render_inlines(children, handler)),
            Inline::Code(code) => wrap(&mut out, TELETYPE, &escape(code)),
            Inline::Emphasis(children) => wrap(&mut out, EMPHASIS, &render_inlines(children, handler)),
            Inline::Hyperlink { label, url } => out.push_str(&make_url(url, label.as_deref())),
            Inline::Reference { label, name } => out.push_str(&handler.reference(name, label.as_deref())),
            Inline::Text(run) => out.push_str(&handler.text(run)),
        }
    }
    return out;
}

/// Append `body` enclosed in a tag pair.
fn wrap(out: &mut String, (open, close): (&str, &str), body: &str) {
    out.push_str(open);
    out.push_str(body);
    out.push_str(close);
}
