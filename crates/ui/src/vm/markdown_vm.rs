use std::collections::{HashMap, HashSet};

use pulldown_cmark::{Event, Options, Parser, TagEnd};

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options
}

/// Lesson body (markdown, possibly with inline HTML) as sanitized HTML.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let parser = Parser::new_ext(input, parser_options());
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "code", "pre", "blockquote", "ul",
        "ol", "li", "a", "h1", "h2", "h3", "h4", "table", "thead", "tbody", "tr", "th", "td",
        "del",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

/// First `max_chars` characters of the rendered text, for list previews.
#[must_use]
pub fn plain_excerpt(input: &str, max_chars: usize) -> String {
    let mut text = String::new();
    for event in Parser::new_ext(input, parser_options()) {
        match event {
            Event::Text(chunk) | Event::Code(chunk) => text.push_str(&chunk),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::BlockQuote(_)
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => {
                if !text.ends_with(' ') && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }

    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut excerpt: String = text.chars().take(max_chars).collect();
    excerpt.truncate(excerpt.trim_end().len());
    excerpt.push('…');
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown_and_strips_scripts() {
        let html = markdown_to_html("## Salamu\n\n**Habari** yako?<script>alert(1)</script>");
        assert!(html.contains("<h2>Salamu</h2>"));
        assert!(html.contains("<strong>Habari</strong>"));
        assert!(!html.contains("script"));
    }

    #[test]
    fn links_keep_only_href() {
        let html = sanitize_html(r#"<a href="https://example.net" onclick="x()">link</a>"#);
        assert!(html.contains(r#"href="https://example.net""#));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn excerpt_flattens_and_truncates() {
        assert_eq!(plain_excerpt("# Title\n\nBody text", 50), "Title Body text");
        assert_eq!(plain_excerpt("Habari za asubuhi", 6), "Habari…");
    }
}
