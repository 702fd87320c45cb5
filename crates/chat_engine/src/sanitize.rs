use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use url::Url;

/// Elements kept as-is (minus attributes).
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "div", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "li", "ol", "p", "pre", "span", "strong", "table", "tbody", "td", "th", "thead", "tr",
    "u", "ul",
];

/// Elements removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &[
    "embed", "head", "iframe", "math", "noscript", "object", "script", "style", "svg", "template",
    "title",
];

const VOID_TAGS: &[&str] = &["br", "hr"];

const LINK_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Allow-list sanitizer for backend-supplied answer markup.
///
/// Unknown elements are unwrapped (their children survive), comments are
/// dropped, all attributes except a vetted `href` on `<a>` are removed and
/// text is re-escaped on output.
#[derive(Debug, Clone, Default)]
pub struct MarkupSanitizer {
    base_url: Option<Url>,
}

impl MarkupSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative links are resolved against `base_url`; without one they are dropped.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).ok(),
        }
    }

    pub fn sanitize(&self, markup: &str) -> String {
        let fragment = Html::parse_fragment(markup);
        let mut out = String::with_capacity(markup.len());
        for child in fragment.root_element().children() {
            self.visit_node(child, &mut out);
        }
        out
    }

    fn visit_node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match node.value() {
            Node::Text(text) => push_escaped(out, text, false),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, out);
                }
            }
            _ => {}
        }
    }

    fn visit_element(&self, element: ElementRef<'_>, out: &mut String) {
        let tag = element.value().name().to_ascii_lowercase();
        if DROPPED_TAGS.contains(&tag.as_str()) {
            return;
        }
        if !ALLOWED_TAGS.contains(&tag.as_str()) {
            self.visit_children(element, out);
            return;
        }

        out.push('<');
        out.push_str(&tag);
        if tag == "a" {
            if let Some(href) = element
                .value()
                .attr("href")
                .and_then(|raw| self.resolve_link(raw))
            {
                out.push_str(" href=\"");
                push_escaped(out, &href, true);
                out.push_str("\" rel=\"noopener noreferrer\"");
            }
        }
        out.push('>');

        if VOID_TAGS.contains(&tag.as_str()) {
            return;
        }
        self.visit_children(element, out);
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }

    fn visit_children(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            self.visit_node(child, out);
        }
    }

    /// Resolves a link reference against the base url and keeps it only when
    /// its scheme is allowed.
    pub fn resolve_link(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base_url.as_ref()?.join(trimmed).ok()?,
            Err(_) => return None,
        };
        LINK_SCHEMES
            .contains(&url.scheme())
            .then(|| url.to_string())
    }
}

fn push_escaped(out: &mut String, text: &str, in_attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
