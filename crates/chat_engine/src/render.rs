use crate::MarkupSanitizer;

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}

/// Sanitizes untrusted answer markup and converts it to Markdown for a terminal.
pub fn render_for_terminal(
    sanitizer: &MarkupSanitizer,
    converter: &dyn Converter,
    markup: &str,
) -> String {
    let safe = sanitizer.sanitize(markup);
    converter.to_markdown(&safe).trim().to_string()
}
