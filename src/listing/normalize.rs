// src/listing/normalize.rs
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

/// Text node that separates the listed servers from the full ones.
pub const FULL_SERVER_MARKER: &str = "Full server";

/// Literal rewrites applied, in order, before scanning.
const REPLACEMENTS: [(&str, &str); 5] = [
    (
        "<table border='1'><tr><td><b>Players</b></td><td><b>Type</b></td><td><b>Name</b></td><td><b>Terrain</b></td></tr>",
        "",
    ),
    ("rorserver://", ""),
    ("user:pass@", ""),
    ("<td valign='middle'>password</td>", "<td valign='middle'>True</td>"),
    ("<td valign='middle'></td>", "<td valign='middle'>False</td>"),
];

lazy_static! {
    static ref MARKUP: Regex =
        Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>").unwrap();
    static ref HREF: Regex =
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    /// Link target of a host cell.
    Host(String),
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Host(s) => s,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenStreams {
    pub primary: Vec<Token>,
    pub secondary: Vec<Token>,
}

pub fn normalize_listing(raw: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(raw.to_string(), |text, (from, to)| text.replace(from, to))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Primary,
    Secondary,
}

/// Scratch state for scanning one listing. Build a fresh one per fetch.
#[derive(Debug)]
pub struct ListingScanner {
    mode: Mode,
    streams: TokenStreams,
}

impl ListingScanner {
    pub fn new() -> Self {
        Self {
            mode: Mode::Primary,
            streams: TokenStreams::default(),
        }
    }

    /// Walks text nodes and tags in document order.
    pub fn scan(mut self, html: &str) -> TokenStreams {
        let mut cursor = 0;
        for m in MARKUP.captures_iter(html) {
            let whole = match m.get(0) {
                Some(whole) => whole,
                None => continue,
            };
            self.text(&html[cursor..whole.start()]);
            cursor = whole.end();

            let name = match m.get(2) {
                Some(name) => name.as_str(),
                None => continue, // comment
            };
            if !name.eq_ignore_ascii_case("a") {
                continue;
            }
            let closing = m.get(1).map_or(false, |slash| !slash.as_str().is_empty());
            if !closing {
                self.start_link(m.get(3).map_or("", |attrs| attrs.as_str()));
            }
        }
        self.text(&html[cursor..]);

        debug!(
            "Scanned listing: {} primary tokens, {} secondary tokens",
            self.streams.primary.len(),
            self.streams.secondary.len()
        );
        self.streams
    }

    fn text(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        let data = decode_entities(raw);
        if self.mode == Mode::Primary && data.trim() == FULL_SERVER_MARKER {
            debug!("Found full server marker, switching to secondary table");
            self.mode = Mode::Secondary;
            return;
        }
        self.push(Token::Text(data));
    }

    /// The link target becomes a host token ahead of the link's own text.
    fn start_link(&mut self, attrs: &str) {
        let href = HREF.captures(attrs).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .or_else(|| c.get(3))
                .map(|v| v.as_str())
        });
        if let Some(href) = href {
            self.push(Token::Host(decode_entities(href).replace('/', "")));
        }
    }

    fn push(&mut self, token: Token) {
        match self.mode {
            Mode::Primary => self.streams.primary.push(token),
            Mode::Secondary => self.streams.secondary.push(token),
        }
    }
}

impl Default for ListingScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
