//! DOM text and link helpers shared by the locator and extractor.

use scraper::{ElementRef, Node};
use url::Url;

/// Elements whose text never shows on screen.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements rendered on their own line.
const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "menu", "nav", "ol", "option", "p", "pre", "section",
    "summary", "table", "td", "th", "tr", "ul",
];

/// Approximates the browser's `innerText` for an element.
///
/// Whitespace inside text runs collapses to single spaces; `<br>` and block
/// boundaries become line breaks. The result has one trimmed, non-empty
/// line per visual line.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);

    raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_collapsed(out, text),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut last_space = out.ends_with(' ');
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(c);
            last_space = false;
        }
    }
}

/// Visible text of `element` followed by that of up to `depth - 1` of its
/// ancestors, innermost first. `depth` counts the element itself.
pub fn ancestor_text(element: ElementRef<'_>, depth: usize) -> String {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .take(depth)
        .map(inner_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the first non-blank line of `raw`, trimmed.
///
/// Listing markup often stacks name, discount badge and price in one
/// element separated by line breaks; the name comes first.
pub fn clean_title(raw: &str) -> String {
    raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_else(|| raw.trim()).to_string()
}

/// Resolves `href` against the page URL.
///
/// Returns `None` for empty, fragment-only and non-navigational links
/// (`javascript:`, `mailto:`, `tel:`, inline `data:` placeholders) and for
/// anything that does not end up as an absolute http(s) URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"].iter().any(|p| lower.starts_with(p)) {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" if resolved.host_str().is_some() => Some(resolved.to_string()),
        _ => None,
    }
}
