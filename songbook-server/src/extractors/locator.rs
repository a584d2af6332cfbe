//! Content locators
//!
//! A locator finds chord-sheet text inside a fetched page and normalizes it to
//! bracket notation. Site extractors hold an ordered list of locators and take
//! the first result, so supporting a new page layout means adding a locator,
//! not touching the resolver.

use once_cell::sync::Lazy;
use regex::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::Element;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Chord symbol as rendered by tab sites: root, accidental, qualities, bass
static CHORD_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-G][b#]?(m|maj|min|dim|aug|sus|add|[b#]?\d{1,2})*(/[A-G][b#]?)?$")
        .expect("chord shape regex is valid")
});

static UGAPP_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)window\.UGAPP_DATA\s*=\s*(\{.*?\});").expect("UGAPP_DATA regex is valid")
});

static UG_CHORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[ch\](.*?)\[/ch\]").expect("UG chord regex is valid"));

static UG_TAB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[tab\](.*?)\[/tab\]").expect("UG tab regex is valid"));

/// Finds chord-sheet text in a page
pub trait ContentLocator: Send + Sync {
    /// Locator name for diagnostics
    fn name(&self) -> &'static str;

    /// Extract bracket-notation text, or `None` when this strategy finds nothing usable
    fn locate(&self, html: &str) -> Option<String>;
}

/// Run locators in order, returning the first hit
pub fn locate_first(locators: &[Box<dyn ContentLocator>], html: &str) -> Option<String> {
    locators.iter().find_map(|locator| {
        let found = locator.locate(html);
        debug!(
            locator = locator.name(),
            found = found.is_some(),
            "Content locator finished"
        );
        found
    })
}

/// Whether span text looks like a chord symbol
pub fn is_chord_shaped(text: &str) -> bool {
    CHORD_SHAPE_RE.is_match(text.trim())
}

// ============================================================================
// Chord span density
// ============================================================================

/// UI chrome that leaks into page text; matched case-insensitively
const CHROME_PHRASES: &[&str] = &[
    "subscribe",
    "sign up",
    "sign in",
    "log in",
    "download pdf",
    "report bad tab",
    "add to favorites",
    "upgrade to plus",
    "try plus",
    "songsterr plus",
    "privacy policy",
    "terms of service",
    "cookie",
    "all rights reserved",
    "advertisement",
    "show more",
    "back to top",
];

/// Elements whose text never belongs to a chord sheet
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "svg", "button", "nav", "header", "footer", "head",
];

/// Elements that start a new line when serialized
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "li", "ul", "ol", "pre", "section", "article", "main", "tr", "h1", "h2", "h3",
    "h4", "h5", "h6",
];

/// Share of all chord spans a container must hold to be picked
const DENSITY_SHARE_PERCENT: usize = 80;

/// Locates the element holding the most chord-shaped `<span>`s
///
/// Chord-site markup renders each chord as a short `<span>` among lyric text
/// nodes, without stable class names. The tightest element holding at least
/// 80% of the page's chord spans is serialized with spans turned into
/// `[Chord]`. Pages without chord spans fall back to `<main>`, then `<body>`.
pub struct ChordSpanLocator {
    min_chars: usize,
}

impl ChordSpanLocator {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl ContentLocator for ChordSpanLocator {
    fn name(&self) -> &'static str {
        "chord-span-density"
    }

    fn locate(&self, html: &str) -> Option<String> {
        let document = Document::from(html);

        let container = densest_chord_container(&document)
            .or_else(|| first_named(&document, "main"))
            .or_else(|| first_named(&document, "body"))?;

        let mut raw = String::new();
        serialize_node(&container, &mut raw);
        let text = clean_page_text(&raw);

        (text.chars().count() > self.min_chars).then_some(text)
    }
}

fn densest_chord_container<'a>(document: &'a Document) -> Option<Node<'a>> {
    let mut counts: HashMap<usize, usize> = HashMap::new();

    for span in document
        .find(Element)
        .filter(|n| n.name() == Some("span") && is_chord_shaped(&n.text()))
    {
        let mut ancestor = span.parent();
        while let Some(node) = ancestor {
            if node.name().is_some() {
                *counts.entry(node.index()).or_default() += 1;
            }
            ancestor = node.parent();
        }
    }

    // Ancestors always count at least as many spans as their descendants, so
    // take the deepest element that still holds most of them
    let max = counts.values().copied().max()?;
    let threshold = max * DENSITY_SHARE_PERCENT / 100;

    counts
        .into_iter()
        .filter(|&(_, count)| count > 0 && count >= threshold)
        .filter_map(|(index, count)| {
            let node = document.nth(index)?;
            Some((depth(&node), count, node))
        })
        .max_by_key(|(depth, count, node)| (*depth, *count, std::cmp::Reverse(node.index())))
        .map(|(_, _, node)| node)
}

fn depth(node: &Node) -> usize {
    std::iter::successors(node.parent(), |n| n.parent()).count()
}

fn first_named<'a>(document: &'a Document, name: &str) -> Option<Node<'a>> {
    document.find(Element).find(|n| n.name() == Some(name))
}

/// Serialize a subtree to text, converting chord spans to bracket notation
fn serialize_node(node: &Node, out: &mut String) {
    if let Some(text) = node.as_text() {
        // Indentation between tags
        if !(text.trim().is_empty() && text.contains('\n')) {
            out.push_str(text);
        }
        return;
    }

    let Some(name) = node.name() else {
        return;
    };

    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    match name {
        "br" => out.push('\n'),
        "span" if is_chord_shaped(&node.text()) => {
            out.push('[');
            out.push_str(node.text().trim());
            out.push(']');
        }
        _ if BLOCK_ELEMENTS.contains(&name) => {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            for child in node.children() {
                serialize_node(&child, out);
            }
            out.push('\n');
        }
        _ => {
            for child in node.children() {
                serialize_node(&child, out);
            }
        }
    }
}

/// Trim line ends, drop UI chrome, collapse blank runs to one blank line
pub fn clean_page_text(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
            continue;
        }
        if is_chrome(line) {
            continue;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

fn is_chrome(line: &str) -> bool {
    let lower = line.to_lowercase();
    CHROME_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

// ============================================================================
// Embedded JSON
// ============================================================================

/// JSON pointer paths known to hold tab content, tried in order
const TAB_CONTENT_PATHS: &[&str] = &[
    "/store/page/data/tab_view/wiki_tab/content",
    "/data/tab_view/wiki_tab/content",
    "/tab_view/wiki_tab/content",
    "/store/page/data/tab/content",
];

/// Reads tab content from the page's embedded application state
///
/// The state is either assigned to `window.UGAPP_DATA` in a script or stored
/// HTML-escaped in the `data-content` attribute of the `.js-store` element.
pub struct EmbeddedJsonLocator;

impl ContentLocator for EmbeddedJsonLocator {
    fn name(&self) -> &'static str {
        "embedded-json"
    }

    fn locate(&self, html: &str) -> Option<String> {
        embedded_state_blobs(html)
            .iter()
            .filter_map(|blob| match serde_json::from_str::<Value>(blob) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(error = %e, "Embedded page state is not valid JSON");
                    None
                }
            })
            .find_map(|state| tab_content(&state))
            .map(|content| convert_ug_markup(&content))
            .filter(|text| !text.is_empty())
    }
}

fn embedded_state_blobs(html: &str) -> Vec<String> {
    let mut blobs = Vec::new();

    if let Some(captures) = UGAPP_DATA_RE.captures(html) {
        blobs.push(captures[1].to_string());
    }

    let document = Document::from(html);
    blobs.extend(
        document
            .find(Element)
            .filter(|n| has_class(n, "js-store"))
            .filter_map(|n| n.attr("data-content").map(str::to_string)),
    );

    blobs
}

/// First non-empty string at a known content path
pub fn tab_content(state: &Value) -> Option<String> {
    TAB_CONTENT_PATHS
        .iter()
        .filter_map(|path| state.pointer(path).and_then(Value::as_str))
        .find(|content| !content.trim().is_empty())
        .map(str::to_string)
}

/// Convert `[ch]Am[/ch]` to `[Am]` and unwrap `[tab]` blocks
pub fn convert_ug_markup(content: &str) -> String {
    let chords = UG_CHORD_RE.replace_all(content, "[$1]");
    let unwrapped = UG_TAB_RE.replace_all(&chords, "$1");
    unwrapped.replace("\r\n", "\n").trim().to_string()
}

// ============================================================================
// Container selectors
// ============================================================================

/// A simple element selector
#[derive(Debug, Clone, Copy)]
pub enum ContainerSelector {
    /// `name[class*="fragment"]`
    ClassContains(&'static str, &'static str),
    /// `name.class`
    Class(&'static str, &'static str),
    /// `[attr="value"]`
    Attr(&'static str, &'static str),
    /// `ancestor descendant`
    Descendant(&'static str, &'static str),
}

impl ContainerSelector {
    pub fn matches(&self, node: &Node) -> bool {
        match *self {
            ContainerSelector::ClassContains(name, fragment) => {
                node.name() == Some(name)
                    && node.attr("class").is_some_and(|c| c.contains(fragment))
            }
            ContainerSelector::Class(name, class) => {
                node.name() == Some(name) && has_class(node, class)
            }
            ContainerSelector::Attr(attr, value) => node.attr(attr) == Some(value),
            ContainerSelector::Descendant(ancestor, name) => {
                node.name() == Some(name)
                    && std::iter::successors(node.parent(), |n| n.parent())
                        .any(|a| a.name() == Some(ancestor))
            }
        }
    }
}

fn has_class(node: &Node, class: &str) -> bool {
    node.attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Tab page containers, most specific first
pub const TAB_CONTAINER_SELECTORS: &[ContainerSelector] = &[
    ContainerSelector::ClassContains("pre", "js-tab-content"),
    ContainerSelector::Class("pre", "js-tab-content"),
    ContainerSelector::Attr("data-name", "tab-content"),
    ContainerSelector::ClassContains("code", "tab"),
    ContainerSelector::Descendant("pre", "code"),
];

/// Takes the text of the first selector whose matches carry enough text
pub struct SelectorLocator {
    selectors: &'static [ContainerSelector],
    min_chars: usize,
}

impl SelectorLocator {
    pub fn new(selectors: &'static [ContainerSelector], min_chars: usize) -> Self {
        Self {
            selectors,
            min_chars,
        }
    }
}

impl ContentLocator for SelectorLocator {
    fn name(&self) -> &'static str {
        "container-selector"
    }

    fn locate(&self, html: &str) -> Option<String> {
        let document = Document::from(html);

        self.selectors.iter().find_map(|selector| {
            let text: String = document
                .find(Element)
                .filter(|n| selector.matches(n))
                .map(|n| n.text())
                .collect();
            let text = convert_ug_markup(&text);
            (text.chars().count() > self.min_chars).then_some(text)
        })
    }
}
