//! Response markup parsing
//!
//! The backend answers with lightly formatted markup (bold text, links,
//! line breaks). Rather than injecting it verbatim, the response is parsed
//! into styled inline runs that the UI renders with regular widgets. The
//! same runs produce the plain-text form that is handed to speech synthesis.
//!
//! Only a small allow-list of tags carries meaning; everything else is
//! dropped while keeping its text. `script` and `style` bodies are removed
//! entirely and links survive only for `http`, `https`, `mailto` and
//! `file` targets.

/// Character styling applied to a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
}

/// A single inline element of a parsed response
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain or styled text
    Text { text: String, style: TextStyle },
    /// Hyperlink with its visible text
    Link {
        text: String,
        href: String,
        style: TextStyle,
    },
    /// Forced line break (`<br>`, newline, block boundary)
    LineBreak,
}

/// Parsed response markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markup {
    inlines: Vec<Inline>,
}

impl Markup {
    /// Parse response markup into inline runs
    pub fn parse(source: &str) -> Self {
        let mut parser = Parser::default();
        let mut rest = source;

        while let Some(idx) = rest.find('<') {
            parser.text(&rest[..idx]);
            let candidate = &rest[idx..];

            if let Some(comment) = candidate.strip_prefix("<!--") {
                rest = match comment.find("-->") {
                    Some(end) => &comment[end + 3..],
                    None => "",
                };
                continue;
            }

            let starts_tag = candidate[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');

            match candidate.find('>') {
                Some(end) if starts_tag => {
                    rest = &candidate[end + 1..];
                    if let Some(element) = parser.tag(&candidate[1..end]) {
                        rest = skip_raw_text(rest, element);
                    }
                }
                _ => {
                    parser.text("<");
                    rest = &candidate[1..];
                }
            }
        }
        parser.text(rest);

        parser.finish()
    }

    /// The parsed inline runs in display order
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }

    /// Text content with markup removed, line breaks as `\n`
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text { text, .. } | Inline::Link { text, .. } => out.push_str(text),
                Inline::LineBreak => out.push('\n'),
            }
        }
        out
    }
}

/// Skip the body of a raw-text element up to and including its closing tag
///
/// Script and style bodies are not markup, so a `<` inside them must not
/// start a tag. Without a closing tag the rest of the input is dropped.
fn skip_raw_text<'a>(rest: &'a str, element: &str) -> &'a str {
    let closing = format!("</{}", element);
    // ASCII lowercasing keeps byte offsets intact
    let lower = rest.to_ascii_lowercase();

    let mut from = 0;
    while let Some(found) = lower[from..].find(&closing) {
        let start = from + found;
        let after = start + closing.len();
        let boundary = lower[after..]
            .chars()
            .next()
            .map_or(true, |c| c == '>' || c == '/' || c.is_whitespace());
        if boundary {
            return match rest[after..].find('>') {
                Some(end) => &rest[after + end + 1..],
                None => "",
            };
        }
        from = after;
    }

    ""
}

#[derive(Default)]
struct Parser {
    inlines: Vec<Inline>,
    bold: u32,
    italic: u32,
    underline: u32,
    code: u32,
    link: Option<String>,
}

impl Parser {
    fn style(&self) -> TextStyle {
        TextStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
            code: self.code > 0,
        }
    }

    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }

        let decoded = decode_entities(raw);
        for (i, line) in decoded.split('\n').enumerate() {
            if i > 0 {
                self.inlines.push(Inline::LineBreak);
            }
            self.push_run(&line.replace('\r', ""));
        }
    }

    fn push_run(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let style = self.style();
        match (self.inlines.last_mut(), &self.link) {
            (Some(Inline::Text { text: last, style: s }), None) if *s == style => {
                last.push_str(text);
            }
            (
                Some(Inline::Link {
                    text: last,
                    href,
                    style: s,
                }),
                Some(current),
            ) if *s == style && href == current => {
                last.push_str(text);
            }
            (_, None) => self.inlines.push(Inline::Text {
                text: text.to_string(),
                style,
            }),
            (_, Some(href)) => {
                let href = href.clone();
                self.inlines.push(Inline::Link {
                    text: text.to_string(),
                    href,
                    style,
                });
            }
        }
    }

    fn block_break(&mut self) {
        if !matches!(self.inlines.last(), None | Some(Inline::LineBreak)) {
            self.inlines.push(Inline::LineBreak);
        }
    }

    /// Apply one tag; returns the element name when a raw-text body follows
    fn tag(&mut self, body: &str) -> Option<&'static str> {
        if body.starts_with('!') || body.starts_with('?') {
            return None;
        }

        let (closing, body) = match body.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        let counter = match name.as_str() {
            "b" | "strong" => Some(&mut self.bold),
            "i" | "em" => Some(&mut self.italic),
            "u" | "ins" => Some(&mut self.underline),
            "code" | "pre" | "kbd" => Some(&mut self.code),
            _ => None,
        };
        if let Some(counter) = counter {
            if closing {
                *counter = counter.saturating_sub(1);
            } else if !body.trim_end().ends_with('/') {
                *counter += 1;
            }
            return None;
        }

        match name.as_str() {
            "script" if !closing => return Some("script"),
            "style" if !closing => return Some("style"),
            "br" => self.inlines.push(Inline::LineBreak),
            "p" | "div" | "li" | "ul" | "ol" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_break()
            }
            "a" if closing => self.link = None,
            "a" => {
                self.link = attribute(body, "href").filter(|href| is_safe_href(href));
            }
            "img" if !closing => {
                if let Some(alt) = attribute(body, "alt") {
                    self.push_run(&alt);
                }
            }
            _ => {}
        }
        None
    }

    fn finish(mut self) -> Markup {
        while matches!(self.inlines.last(), Some(Inline::LineBreak)) {
            self.inlines.pop();
        }
        Markup {
            inlines: self.inlines,
        }
    }
}

fn is_safe_href(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    ["http://", "https://", "mailto:", "file:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Find an attribute value inside a tag body (`a href='x' target=_blank`)
fn attribute(body: &str, wanted: &str) -> Option<String> {
    let mut rest = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric());

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }

        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace() || c == '/')
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(after_eq) => {
                let after_eq = after_eq.trim_start();
                match after_eq.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let inner = &after_eq[1..];
                        let end = inner.find(quote).unwrap_or(inner.len());
                        rest = inner.get(end + 1..).unwrap_or("");
                        &inner[..end]
                    }
                    _ => {
                        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                        rest = &after_eq[end..];
                        &after_eq[..end]
                    }
                }
            }
            None => "",
        };

        if key.eq_ignore_ascii_case(wanted) {
            return Some(decode_entities(value));
        }
    }
}

/// Decode the character references a browser would resolve in text content
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        let candidate = &rest[idx..];

        let decoded = candidate
            .char_indices()
            .take(12)
            .find(|(_, c)| *c == ';')
            .and_then(|(end, _)| resolve_entity(&candidate[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    out
}

fn resolve_entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
