//! Queryable HTML document
//!
//! Thin layer over `scraper::Html` that never fails on absent elements:
//! every lookup on missing markup yields `None` or an empty list, so a site
//! returning partial HTML degrades field by field instead of page by page.

use scraper::{ElementRef, Html, Selector};

/// Parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse raw HTML; malformed markup is repaired by the parser
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// All elements matching `css`, in document order
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match selector(css) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    /// The `n`th (zero-based) element matching `css`
    pub fn nth(&self, css: &str, n: usize) -> Option<ElementRef<'_>> {
        let sel = selector(css)?;
        self.html.select(&sel).nth(n)
    }

    pub fn count(&self, css: &str) -> usize {
        match selector(css) {
            Some(sel) => self.html.select(&sel).count(),
            None => 0,
        }
    }

    /// Trimmed text of the first match, `None` if absent or blank
    pub fn text(&self, css: &str) -> Option<String> {
        self.nth(css, 0).map(|el| element_text(&el)).filter(|t| !t.is_empty())
    }

    /// Trimmed text of the `n`th match, `None` if absent or blank
    pub fn nth_text(&self, css: &str, n: usize) -> Option<String> {
        self.nth(css, n).map(|el| element_text(&el)).filter(|t| !t.is_empty())
    }

    /// Attribute of the first match
    pub fn attr(&self, css: &str, name: &str) -> Option<String> {
        self.nth(css, 0).and_then(|el| element_attr(&el, name))
    }
}

/// Elements matching `css` inside `scope`
pub fn scoped<'a>(scope: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Trimmed text content of an element
pub fn element_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

/// Trimmed, non-empty attribute value
pub fn element_attr(el: &ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Clean and trim text
pub fn clean_text(text: &str) -> String {
    text.trim().to_string()
}

/// Resolve protocol-relative (`//host/x`) and root-relative (`/x`) links
/// against `base`. Anything else is returned unchanged.
pub fn absolutize(base: &str, href: &str) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "invalid selector");
            None
        }
    }
}
