//! Owned, mutable page tree that mount points and widgets operate on.
//!
//! Pages are parsed as well-formed XHTML. Namespace prefixes and declarations are
//! kept, so a page serializes back to the same qualified names. Mounted markup is
//! parsed into elements when it is well-formed and kept as [`PageNode::Raw`] otherwise.

use crate::error::StudioResult;
use kitstudio_markup::escape_html;

/// Child-index path from the root element. The root itself is `[]`.
pub type NodePath = Vec<usize>;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Synthetic root used to parse markup fragments.
const FRAGMENT_ROOT: &str = "kit-fragment";

/// Elements whose text content is emitted unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq)]
pub enum PageNode {
    Element(PageElement),
    Text(String),
    /// Trusted markup, emitted as-is.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<PageNode>,
}

impl PageElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: PageElement) -> Self {
        self.children.push(PageNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(PageNode::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Replace the value in place, or append a new attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(k, _)| k != name);
        self.attributes.len() != before
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let next = match self.attr("class").filter(|c| !c.trim().is_empty()) {
            Some(existing) => format!("{} {}", existing.trim(), class),
            None => class.to_string(),
        };
        self.set_attr("class", next);
    }

    pub fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attr("class") else {
            return;
        };
        let tokens: Vec<&str> = existing.split_whitespace().filter(|t| *t != class).collect();
        if tokens.is_empty() {
            self.remove_attr("class");
        } else {
            let next = tokens.join(" ");
            self.set_attr("class", next);
        }
    }

    /// Replace all children with one trusted markup node.
    pub fn set_inner_raw(&mut self, markup: impl Into<String>) {
        self.children = vec![PageNode::Raw(markup.into())];
    }

    /// Replace all children with `markup`, parsed into nodes when it is well-formed.
    ///
    /// Markup that does not parse is kept as a single raw node.
    pub fn set_inner_markup(&mut self, markup: impl Into<String>) {
        let markup = markup.into();
        match parse_fragment(&markup) {
            Some(nodes) => self.children = nodes,
            None => {
                tracing::debug!(element = %self.name, "markup is not well-formed, keeping it raw");
                self.set_inner_raw(markup);
            }
        }
    }

    /// Replace all children with one text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![PageNode::Text(text.into())];
    }

    /// Concatenated text and raw content of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Inner markup as it would be serialized.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &self.name, &mut out);
        }
        out
    }
}

fn collect_text(element: &PageElement, out: &mut String) {
    for child in &element.children {
        match child {
            PageNode::Element(el) => collect_text(el, out),
            PageNode::Text(t) | PageNode::Raw(t) => out.push_str(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    doctype: bool,
    root: PageElement,
}

impl Page {
    pub fn new(root: PageElement) -> Self {
        Self {
            doctype: false,
            root,
        }
    }

    /// Parse a well-formed XHTML page. Comments and processing instructions are dropped.
    pub fn parse(source: &str) -> StudioResult<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(source, options)?;
        let root = convert_element(doc.root_element());

        let doctype = source
            .trim_start()
            .get(..9)
            .map(|s| s.eq_ignore_ascii_case("<!doctype"))
            .unwrap_or(false);

        Ok(Self { doctype, root })
    }

    pub fn root(&self) -> &PageElement {
        &self.root
    }

    pub fn element(&self, path: &[usize]) -> Option<&PageElement> {
        let mut el = &self.root;
        for &i in path {
            match el.children.get(i)? {
                PageNode::Element(child) => el = child,
                _ => return None,
            }
        }
        Some(el)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut PageElement> {
        let mut el = &mut self.root;
        for &i in path {
            match el.children.get_mut(i)? {
                PageNode::Element(child) => el = child,
                _ => return None,
            }
        }
        Some(el)
    }

    /// Paths of every matching element, in document order.
    pub fn find_all<P>(&self, predicate: P) -> Vec<NodePath>
    where
        P: Fn(&PageElement) -> bool,
    {
        let mut out = Vec::new();
        let mut path = Vec::new();
        walk(&self.root, &mut path, &predicate, &mut out);
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodePath> {
        self.find_all(|el| el.id() == Some(id)).into_iter().next()
    }

    /// Nearest element at or above `path` that matches.
    pub fn closest<P>(&self, path: &[usize], predicate: P) -> Option<NodePath>
    where
        P: Fn(&PageElement) -> bool,
    {
        (0..=path.len())
            .rev()
            .find(|&len| self.element(&path[..len]).map(&predicate).unwrap_or(false))
            .map(|len| path[..len].to_vec())
    }

    /// Matching elements strictly below `path`, in document order.
    pub fn descendants<P>(&self, path: &[usize], predicate: P) -> Vec<NodePath>
    where
        P: Fn(&PageElement) -> bool,
    {
        let Some(start) = self.element(path) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut current = path.to_vec();
        for (i, child) in start.children.iter().enumerate() {
            if let PageNode::Element(el) = child {
                current.push(i);
                walk(el, &mut current, &predicate, &mut out);
                current.pop();
            }
        }
        out
    }

    /// The first `<body>` element, or the root when there is none.
    pub fn body_path(&self) -> NodePath {
        self.find_all(|el| el.name == "body")
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    pub fn append_to_body(&mut self, element: PageElement) {
        let body = self.body_path();
        if let Some(body) = self.element_mut(&body) {
            body.children.push(PageNode::Element(element));
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if self.doctype {
            out.push_str("<!DOCTYPE html>\n");
        }
        write_element(&self.root, &mut out);
        out
    }
}

/// Parse trusted markup into nodes. `None` when it is not well-formed.
pub fn parse_fragment(markup: &str) -> Option<Vec<PageNode>> {
    let wrapped = format!("<{0}>{1}</{0}>", FRAGMENT_ROOT, markup);
    let doc = roxmltree::Document::parse(&wrapped).ok()?;
    Some(convert_element(doc.root_element()).children)
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> PageElement {
    let tag = node.tag_name();
    let mut element = PageElement::new(qualified_name(node, tag.namespace(), tag.name()));

    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE || inherits_namespace(node, ns) {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        element.attributes.push((name, ns.uri().to_string()));
    }

    for attr in node.attributes() {
        element.attributes.push((
            qualified_name(node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(PageNode::Element(convert_element(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(PageNode::Text(text.to_string()));
            }
        }
    }
    element
}

/// `prefix:local` when the namespace is bound to a prefix in scope.
fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

/// The parent element already declares the same binding.
fn inherits_namespace(node: roxmltree::Node<'_, '_>, ns: &roxmltree::Namespace<'_>) -> bool {
    node.parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .any(|p| p.name() == ns.name() && p.uri() == ns.uri())
        })
        .unwrap_or(false)
}

fn walk<P>(el: &PageElement, path: &mut NodePath, predicate: &P, out: &mut Vec<NodePath>)
where
    P: Fn(&PageElement) -> bool,
{
    if predicate(el) {
        out.push(path.clone());
    }
    for (i, child) in el.children.iter().enumerate() {
        if let PageNode::Element(child) = child {
            path.push(i);
            walk(child, path, predicate, out);
            path.pop();
        }
    }
}

fn write_element(el: &PageElement, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    if el.children.is_empty() && VOID_ELEMENTS.contains(&el.name.as_str()) {
        return;
    }

    for child in &el.children {
        write_node(child, &el.name, out);
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn write_node(node: &PageNode, parent: &str, out: &mut String) {
    match node {
        PageNode::Element(el) => write_element(el, out),
        PageNode::Text(text) if RAW_TEXT_ELEMENTS.contains(&parent) => out.push_str(text),
        PageNode::Text(text) => out.push_str(&escape_html(text)),
        PageNode::Raw(markup) => out.push_str(markup),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"/><style>a > b { color: red; }</style></head><body><p class="lead">Tom &amp; Jerry</p><br/></body></html>"#;

    #[test]
    fn parse_and_serialize_round_trip() {
        let page = Page::parse(PAGE).unwrap();
        assert_eq!(
            page.to_html(),
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><style>a > b { color: red; }</style></head><body><p class=\"lead\">Tom &amp; Jerry</p><br></body></html>"
        );
    }

    #[test]
    fn class_helpers() {
        let mut el = PageElement::new("div").with_attr("class", "a b");
        el.add_class("c");
        el.add_class("a");
        assert_eq!(el.attr("class"), Some("a b c"));
        el.remove_class("b");
        assert_eq!(el.attr("class"), Some("a c"));
        el.remove_class("a");
        el.remove_class("c");
        assert_eq!(el.attr("class"), None);
    }

    #[test]
    fn closest_and_descendants() {
        let page = Page::parse(
            r#"<div id="outer" data-widget="tabs"><ul><li id="one" class="tab"/><li id="two" class="tab"/></ul></div>"#,
        )
        .unwrap();
        let two = page.find_by_id("two").unwrap();
        let tabs = page
            .closest(&two, |el| el.attr("data-widget") == Some("tabs"))
            .unwrap();
        assert_eq!(tabs, Vec::<usize>::new());
        let found = page.descendants(&tabs, |el| el.has_class("tab"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn namespaces_and_prefixes_round_trip() {
        let source = r##"<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en"><body><svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#icon"/></svg></body></html>"##;
        let page = Page::parse(source).unwrap();
        assert_eq!(
            page.to_html(),
            r##"<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en"><body><svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#icon"></use></svg></body></html>"##
        );
        assert_eq!(page.root().attr("xml:lang"), Some("en"));
        assert_eq!(page.body_path(), vec![0]);
    }

    #[test]
    fn inner_markup_is_parsed_when_well_formed() {
        let mut el = PageElement::new("section");
        el.set_inner_markup(r#"<button id="go" data-action="modal-open">Go &amp; see</button>"#);
        assert!(matches!(&el.children[0], PageNode::Element(b) if b.id() == Some("go")));
        assert_eq!(el.inner_html(), r#"<button id="go" data-action="modal-open">Go &amp; see</button>"#);

        el.set_inner_markup("<p>unclosed<br></p>");
        assert_eq!(el.children, vec![PageNode::Raw("<p>unclosed<br></p>".to_string())]);
    }

    #[test]
    fn body_falls_back_to_root() {
        let mut page = Page::parse("<main/>").unwrap();
        page.append_to_body(PageElement::new("aside"));
        assert_eq!(page.to_html(), "<main><aside></aside></main>");
    }
}
