//! Rich-text editors — one per section, with a sanitizing insertion path.
//!
//! Markup from the service or from the user never lands in an editor
//! verbatim: only attribute-free formatting tags survive, `script` and
//! `style` elements are dropped with their content, and stray angle
//! brackets in text are escaped.

/// Formatting tags kept by the sanitizer.
const ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "strong",
    "b",
    "em",
    "i",
    "u",
    "s",
    "ol",
    "ul",
    "li",
    "h1",
    "h2",
    "h3",
    "blockquote",
];

/// Elements removed together with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Tags that end a line in the plain-text view.
const BLOCK_TAGS: &[&str] = &["p", "li", "h1", "h2", "h3", "blockquote", "ul", "ol"];

#[derive(Debug, Clone, Default)]
pub struct RichTextEditor {
    placeholder: String,
    html: String,
}

impl RichTextEditor {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            html: String::new(),
        }
    }

    pub fn set_html(&mut self, markup: &str) {
        self.html = sanitize_html(markup);
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty()
    }

    /// Text with tags removed and block elements on their own lines.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for token in Tokenizer::new(&self.html) {
            match token {
                Token::Text(text) => out.push_str(&decode_entities(text)),
                Token::Tag(tag) => {
                    let ends_line = tag.name == "br"
                        || (tag.closing && BLOCK_TAGS.contains(&tag.name.as_str()));
                    if ends_line && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                Token::Comment => {}
            }
        }
        out.trim_end().to_string()
    }
}

/// Reduces arbitrary markup to the allowed formatting subset.
pub fn sanitize_html(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut skipping: Option<String> = None;

    for token in Tokenizer::new(markup) {
        if let Some(element) = &skipping {
            if let Token::Tag(tag) = &token {
                if tag.closing && &tag.name == element {
                    skipping = None;
                }
            }
            continue;
        }

        match token {
            Token::Text(text) => push_escaped(&mut out, text),
            Token::Comment => {}
            Token::Tag(tag) => {
                if DROPPED_ELEMENTS.contains(&tag.name.as_str()) {
                    if !tag.closing && !tag.self_closing {
                        skipping = Some(tag.name);
                    }
                } else if ALLOWED_TAGS.contains(&tag.name.as_str()) {
                    match (tag.name.as_str(), tag.closing) {
                        ("br", _) => out.push_str("<br>"),
                        (name, true) => {
                            out.push_str("</");
                            out.push_str(name);
                            out.push('>');
                        }
                        (name, false) => {
                            out.push('<');
                            out.push_str(name);
                            out.push('>');
                        }
                    }
                }
            }
        }
    }

    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

// ────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    Tag(Tag),
    Comment,
}

/// Splits markup into text runs, tags and comments. A `<` that does not
/// start a well-formed tag is returned as text.
struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn parse_tag(body: &str) -> Option<Tag> {
        let (closing, body) = match body.strip_prefix('/') {
            Some(stripped) => (true, stripped),
            None => (false, body),
        };
        let self_closing = body.trim_end().ends_with('/');
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if name.is_empty() || !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(Tag {
            name: name.to_ascii_lowercase(),
            closing,
            self_closing,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.rest;
        if rest.is_empty() {
            return None;
        }

        if let Some(after) = rest.strip_prefix("<!--") {
            let consumed = after.find("-->").map(|i| i + 3).unwrap_or(after.len());
            self.rest = &after[consumed..];
            return Some(Token::Comment);
        }

        if let Some(after) = rest.strip_prefix('<') {
            if let Some(close) = after.find('>') {
                if let Some(tag) = Self::parse_tag(&after[..close]) {
                    self.rest = &after[close + 1..];
                    return Some(Token::Tag(tag));
                }
            }
            // Not a tag: emit the bracket as text.
            self.rest = after;
            return Some(Token::Text(&rest[..1]));
        }

        let end = rest.find('<').unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(Token::Text(&rest[..end]))
    }
}
