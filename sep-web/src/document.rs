//! Selector-based navigation over a parsed page.
//!
//! Extraction code only talks to [`HtmlDocument`], so it can run against
//! fixture implementations as well as the real parser.

use crate::{Result, WebError};
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as visible.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "template"];

/// The few operations extraction needs from an HTML document.
pub trait HtmlDocument {
    /// Value of `attr` for every element matching `selector`, in document
    /// order; `None` where the element lacks the attribute.
    fn select_attr(&self, selector: &str, attr: &str) -> Result<Vec<Option<String>>>;

    /// Concatenated visible text of the first element matching `selector`.
    fn select_text(&self, selector: &str) -> Result<Option<String>>;

    /// Visible text nodes of the first element matching `selector`, each
    /// trimmed, empty ones dropped, joined by `separator`.
    fn select_text_joined(&self, selector: &str, separator: &str) -> Result<Option<String>>;

    fn exists(&self, selector: &str) -> Result<bool>;

    /// Detach every element matching `selector` below the first element
    /// matching `scope`. Returns how many were removed.
    fn remove_within(&mut self, scope: &str, selector: &str) -> Result<usize>;
}

/// [`HtmlDocument`] backed by `scraper`.
pub struct ScraperDocument {
    html: Html,
}

impl ScraperDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    fn first(&self, css: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = parse_selector(css)?;
        Ok(self.html.select(&sel).next())
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| WebError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn collect_visible<'a>(el: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push(text),
            Node::Element(e) if INVISIBLE_TAGS.contains(&e.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_visible(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn visible_text(el: ElementRef<'_>) -> Vec<&str> {
    let mut out = Vec::new();
    collect_visible(el, &mut out);
    out
}

impl HtmlDocument for ScraperDocument {
    fn select_attr(&self, selector: &str, attr: &str) -> Result<Vec<Option<String>>> {
        let sel = parse_selector(selector)?;
        Ok(self
            .html
            .select(&sel)
            .map(|el| el.value().attr(attr).map(str::to_string))
            .collect())
    }

    fn select_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(self.first(selector)?.map(|el| visible_text(el).concat()))
    }

    fn select_text_joined(&self, selector: &str, separator: &str) -> Result<Option<String>> {
        Ok(self.first(selector)?.map(|el| {
            visible_text(el)
                .into_iter()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(separator)
        }))
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.first(selector)?.is_some())
    }

    fn remove_within(&mut self, scope: &str, selector: &str) -> Result<usize> {
        let target = parse_selector(selector)?;
        let Some(root) = self.first(scope)? else {
            return Ok(0);
        };
        let ids: Vec<_> = root
            .select(&target)
            .filter(|el| el.id() != root.id())
            .map(|el| el.id())
            .collect();

        for id in &ids {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }
        Ok(ids.len())
    }
}
