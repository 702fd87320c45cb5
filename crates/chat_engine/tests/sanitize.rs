use chat_engine::MarkupSanitizer;
use pretty_assertions::assert_eq;

fn clean(markup: &str) -> String {
    MarkupSanitizer::new().sanitize(markup)
}

#[test]
fn keeps_allowed_markup() {
    assert_eq!(
        clean("<p>Hola <strong>mundo</strong><br>adiós</p>"),
        "<p>Hola <strong>mundo</strong><br>adiós</p>"
    );
}

#[test]
fn drops_scripts_and_styles_with_contents() {
    assert_eq!(
        clean("<p>a</p><script>alert(1)</script><style>p{}</style>"),
        "<p>a</p>"
    );
}

#[test]
fn strips_attributes_and_event_handlers() {
    assert_eq!(
        clean(r#"<p class="text-red-600" onclick="evil()">Lo siento</p>"#),
        "<p>Lo siento</p>"
    );
    assert_eq!(clean(r#"<img src="x" onerror="evil()">"#), "");
}

#[test]
fn unwraps_unknown_elements() {
    assert_eq!(
        clean("<custom-tag>hola <b>allí</b></custom-tag>"),
        "hola <b>allí</b>"
    );
}

#[test]
fn removes_comments_and_reescapes_text() {
    assert_eq!(
        clean("<!-- secreto --><p>1 &lt; 2 &amp; 3</p>"),
        "<p>1 &lt; 2 &amp; 3</p>"
    );
}

#[test]
fn vets_link_targets() {
    assert_eq!(
        clean(r#"<a href="javascript:alert(1)">x</a>"#),
        "<a>x</a>"
    );
    assert_eq!(
        clean(r#"<a href="https://example.com/a?b=1&c=2" target="_blank">x</a>"#),
        r#"<a href="https://example.com/a?b=1&amp;c=2" rel="noopener noreferrer">x</a>"#
    );
    assert_eq!(clean(r#"<a href="/docs/a.pdf">doc</a>"#), "<a>doc</a>");
}

#[test]
fn resolves_relative_links_against_base() {
    let sanitizer = MarkupSanitizer::with_base_url("http://localhost:8000");
    assert_eq!(
        sanitizer.sanitize(r#"<a href="/docs/a.pdf">doc</a>"#),
        r#"<a href="http://localhost:8000/docs/a.pdf" rel="noopener noreferrer">doc</a>"#
    );
}

#[test]
fn resolve_link_vets_standalone_references() {
    let sanitizer = MarkupSanitizer::with_base_url("http://localhost:8000");
    assert_eq!(
        sanitizer.resolve_link("/api/documents/formulario.pdf").as_deref(),
        Some("http://localhost:8000/api/documents/formulario.pdf")
    );
    assert_eq!(
        sanitizer.resolve_link("https://example.com/a.pdf").as_deref(),
        Some("https://example.com/a.pdf")
    );
    assert_eq!(sanitizer.resolve_link("javascript:alert(1)"), None);
    assert_eq!(MarkupSanitizer::new().resolve_link("/api/documents/a.pdf"), None);
}
