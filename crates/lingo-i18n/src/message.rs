//! Message template parsing and formatting.
//!
//! Templates use the MediaWiki message syntax:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `$1`, `$2`, ... | Positional parameter |
//! | `{{PLURAL:$1\|one\|other}}` | Plural form chosen by the locale's rule |
//! | `{{PLURAL:$1\|..\|1=exactly one}}` | Explicit form for an exact count |
//! | `{{GENDER:$2\|male\|female\|unknown}}` | Gender form |
//! | `[https://example.com label]` | External link (wikilinks only) |
//! | `[[Target\|label]]` | Internal link (wikilinks only) |
//!
//! A template is parsed once into a [`Message`] and can then be formatted
//! as plain text or as sanitized markup.
//!
//! # Invariants
//!
//! 1. **Parsing never fails**: malformed or unknown constructs are kept as
//!    literal text.
//! 2. **Markup output is escaped**: in [`Format::Markup`] every piece of
//!    literal text and every parameter value is HTML-escaped; the only tags
//!    produced are `<a href="..">` anchors built from link syntax.
//! 3. **Text output is never escaped**: [`Format::Text`] returns the literal
//!    characters, intended for text-content assignment.
//! 4. **Missing parameters are visible**: `$3` with two parameters renders
//!    as `$3`.

use std::fmt::Write as _;

use v_htmlescape::escape;

use crate::param::Param;
use crate::plural::{PluralCount, PluralRule};

/// Output flavor of a formatted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Literal characters for text-content assignment.
    Text,
    /// Escaped markup with safe anchors, for markup assignment.
    Markup,
}

#[derive(Debug, Clone, PartialEq)]
struct Form {
    /// Exact count this form is reserved for (`1=..`).
    explicit: Option<i64>,
    body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    /// One-based parameter index.
    Placeholder(usize),
    Plural {
        arg: Vec<Node>,
        forms: Vec<Form>,
    },
    Gender {
        arg: Vec<Node>,
        forms: Vec<Vec<Node>>,
    },
    ExternalLink {
        url: String,
        label: Vec<Node>,
    },
    WikiLink {
        target: String,
        label: Vec<Node>,
    },
}

/// A parsed message template.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    nodes: Vec<Node>,
}

impl Message {
    /// Parse a template. Link syntax is recognized only when `wikilinks`
    /// is set; otherwise brackets are literal text.
    #[must_use]
    pub fn parse(template: &str, wikilinks: bool) -> Self {
        let mut parser = Parser {
            src: template,
            pos: 0,
            wikilinks,
        };
        Self {
            nodes: parser.sequence(Stop::End),
        }
    }

    /// Format the message with positional parameters.
    #[must_use]
    pub fn format(&self, params: &[Param], rule: &PluralRule, format: Format) -> String {
        let ctx = RenderCtx { params, rule };
        let mut out = String::new();
        ctx.render(&self.nodes, format, &mut out);
        out
    }
}

// ── Parser ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    /// Inside `{{NAME:..}}`: `|` or `}}`.
    TemplatePart,
    /// Inside `[url ..]`: `]`.
    LinkLabel,
    /// Inside `[[target|..]]`: `]]`.
    WikiLabel,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    wikilinks: bool,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn at_stop(&self, stop: Stop) -> bool {
        let rest = self.rest();
        match stop {
            Stop::End => false,
            Stop::TemplatePart => rest.starts_with('|') || rest.starts_with("}}"),
            Stop::LinkLabel => rest.starts_with(']'),
            Stop::WikiLabel => rest.starts_with("]]"),
        }
    }

    fn sequence(&mut self, stop: Stop) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while self.pos < self.src.len() && !self.at_stop(stop) {
            let parsed = if self.rest().starts_with("{{") {
                self.template()
            } else if self.rest().starts_with('$') {
                self.placeholder()
            } else if self.wikilinks && self.rest().starts_with("[[") {
                self.wiki_link()
            } else if self.wikilinks && self.rest().starts_with('[') {
                self.external_link()
            } else {
                None
            };

            match parsed {
                Some(node) => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(std::mem::take(&mut text)));
                    }
                    nodes.push(node);
                }
                None => {
                    // `pos` is always on a char boundary.
                    if let Some(ch) = self.rest().chars().next() {
                        text.push(ch);
                        self.pos += ch.len_utf8();
                    }
                }
            }
        }

        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }
        nodes
    }

    fn placeholder(&mut self) -> Option<Node> {
        let rest = &self.rest()[1..];
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let index = rest[..len].parse::<usize>().ok().filter(|i| *i > 0)?;
        self.pos += 1 + len;
        Some(Node::Placeholder(index))
    }

    fn template(&mut self) -> Option<Node> {
        let start = self.pos;
        let node = self.template_inner();
        if node.is_none() {
            self.pos = start;
        }
        node
    }

    fn template_inner(&mut self) -> Option<Node> {
        self.pos += 2;
        let colon = self.rest().find(':')?;
        let name = self.rest()[..colon].trim().to_ascii_uppercase();
        if name != "PLURAL" && name != "GENDER" {
            return None;
        }
        self.pos += colon + 1;

        let arg = self.sequence(Stop::TemplatePart);
        let mut forms = Vec::new();
        loop {
            let rest = self.rest();
            if rest.starts_with("}}") {
                self.pos += 2;
                break;
            }
            if rest.starts_with('|') {
                self.pos += 1;
                forms.push(self.sequence(Stop::TemplatePart));
                continue;
            }
            // Unterminated template.
            return None;
        }

        Some(if name == "PLURAL" {
            Node::Plural {
                arg,
                forms: forms.into_iter().map(split_explicit).collect(),
            }
        } else {
            Node::Gender { arg, forms }
        })
    }

    fn external_link(&mut self) -> Option<Node> {
        let start = self.pos;
        self.pos += 1;
        let rest = self.rest();
        let url_len = rest
            .find(|c: char| c.is_whitespace() || c == ']')
            .unwrap_or(rest.len());
        let url = &rest[..url_len];
        if !is_external_url(url) {
            self.pos = start;
            return None;
        }
        let url = url.to_owned();
        self.pos += url_len;

        let rest = self.rest();
        let space = rest.len() - rest.trim_start().len();
        self.pos += space;
        let label = self.sequence(Stop::LinkLabel);
        if !self.rest().starts_with(']') {
            self.pos = start;
            return None;
        }
        self.pos += 1;
        let label = if label.is_empty() {
            vec![Node::Text(url.clone())]
        } else {
            label
        };
        Some(Node::ExternalLink { url, label })
    }

    fn wiki_link(&mut self) -> Option<Node> {
        let start = self.pos;
        self.pos += 2;
        let rest = self.rest();
        let Some(target_len) = rest.find(['|', ']']) else {
            self.pos = start;
            return None;
        };
        let target = rest[..target_len].trim().to_owned();
        self.pos += target_len;

        let label = if self.rest().starts_with('|') {
            self.pos += 1;
            self.sequence(Stop::WikiLabel)
        } else {
            Vec::new()
        };
        if target.is_empty() || !self.rest().starts_with("]]") {
            self.pos = start;
            return None;
        }
        self.pos += 2;
        let label = if label.is_empty() {
            vec![Node::Text(target.clone())]
        } else {
            label
        };
        Some(Node::WikiLink { target, label })
    }
}

fn is_external_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["https://", "http://", "//", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

// ── Rendering ───────────────────────────────────────────────────────

struct RenderCtx<'a> {
    params: &'a [Param],
    rule: &'a PluralRule,
}

impl RenderCtx<'_> {
    fn render(&self, nodes: &[Node], format: Format, out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => push(out, text, format),
                Node::Placeholder(index) => match self.params.get(index - 1) {
                    Some(param) => push(out, &param.to_string(), format),
                    None => {
                        let _ = write!(out, "${index}");
                    }
                },
                Node::Plural { arg, forms } => {
                    if let Some(form) = self.plural_form(arg, forms) {
                        self.render(form, format, out);
                    }
                }
                Node::Gender { arg, forms } => {
                    if let Some(form) = gender_form(&self.plain(arg), forms) {
                        self.render(form, format, out);
                    }
                }
                Node::ExternalLink { url, label } => {
                    self.anchor(url, label, format, out);
                }
                Node::WikiLink { target, label } => {
                    let href = format!("./{}", target.replace(' ', "_"));
                    self.anchor(&href, label, format, out);
                }
            }
        }
    }

    fn anchor(&self, href: &str, label: &[Node], format: Format, out: &mut String) {
        if format == Format::Markup {
            let _ = write!(out, "<a href=\"{}\">", escape(href));
            self.render(label, format, out);
            out.push_str("</a>");
        } else {
            self.render(label, format, out);
        }
    }

    fn plain(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        self.render(nodes, Format::Text, &mut out);
        out
    }

    fn plural_form<'n>(&self, arg: &[Node], forms: &'n [Form]) -> Option<&'n [Node]> {
        let count = Param::Text(self.plain(arg))
            .as_count()
            .unwrap_or(PluralCount::whole(0));

        let mut regular: Vec<&'n [Node]> = Vec::with_capacity(forms.len());
        for form in forms {
            match form.explicit {
                Some(n) if !count.fractional && n == count.integer => return Some(&form.body),
                Some(_) => {}
                None => regular.push(&form.body),
            }
        }
        self.rule.select_count(count, &regular).copied()
    }
}

/// Strip an explicit count prefix (`1=text`) from a plural form.
fn split_explicit(mut body: Vec<Node>) -> Form {
    if let Some(Node::Text(first)) = body.first_mut()
        && let Some((number, rest)) = first.split_once('=')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
        && let Ok(count) = number.parse::<i64>()
    {
        let rest = rest.to_owned();
        if rest.is_empty() {
            body.remove(0);
        } else {
            *first = rest;
        }
        return Form {
            explicit: Some(count),
            body,
        };
    }
    Form {
        explicit: None,
        body,
    }
}

fn gender_form<'n>(gender: &str, forms: &'n [Vec<Node>]) -> Option<&'n [Node]> {
    let last = forms.last()?;
    let index = match gender.trim() {
        "male" => 0,
        "female" => 1,
        _ => 2,
    };
    Some(forms.get(index).unwrap_or(last))
}

fn push(out: &mut String, text: &str, format: Format) {
    match format {
        Format::Text => out.push_str(text),
        Format::Markup => {
            let _ = write!(out, "{}", escape(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(template: &str, params: &[Param]) -> String {
        Message::parse(template, true).format(params, &PluralRule::English, Format::Text)
    }

    fn markup(template: &str, params: &[Param]) -> String {
        Message::parse(template, true).format(params, &PluralRule::English, Format::Markup)
    }

    #[test]
    fn positional_parameters() {
        let params = [Param::from("Alice"), Param::from("Bob")];
        assert_eq!(text("$2 met $1", &params), "Bob met Alice");
    }

    #[test]
    fn missing_parameter_left_visible() {
        assert_eq!(text("a $1 b $3", &[Param::from("x")]), "a x b $3");
    }

    #[test]
    fn dollar_without_digits_is_literal() {
        assert_eq!(text("costs $ 5 or $x", &[]), "costs $ 5 or $x");
        assert_eq!(text("$0", &[Param::from("x")]), "$0");
    }

    #[test]
    fn plural_english() {
        let template = "Found $1 {{PLURAL:$1|result|results}}";
        assert_eq!(text(template, &[Param::from(1)]), "Found 1 result");
        assert_eq!(text(template, &[Param::from(0)]), "Found 0 results");
        assert_eq!(text(template, &[Param::from(10)]), "Found 10 results");
    }

    #[test]
    fn plural_explicit_form_wins() {
        let template = "{{PLURAL:$1|$1 ഫലം|$1 ഫലങ്ങൾ|1=ഒരു ഫലം}} കണ്ടെത്തി";
        assert_eq!(text(template, &[Param::from(1)]), "ഒരു ഫലം കണ്ടെത്തി");
        assert_eq!(text(template, &[Param::from(10)]), "10 ഫലങ്ങൾ കണ്ടെത്തി");
    }

    #[test]
    fn plural_fractional_count_is_plural() {
        let template = "Found $1 {{PLURAL:$1|result|results}}";
        assert_eq!(text(template, &[Param::from(1.5)]), "Found 1.5 results");
        assert_eq!(text(template, &[Param::from("1.5")]), "Found 1.5 results");
        assert_eq!(text(template, &[Param::from(1.0)]), "Found 1 result");

        let explicit = "{{PLURAL:$1|$1 item|$1 items|1=one item}}";
        assert_eq!(text(explicit, &[Param::from(1.5)]), "1.5 items");
        assert_eq!(text(explicit, &[Param::from(1)]), "one item");
    }

    #[test]
    fn plural_literal_count() {
        assert_eq!(text("{{PLURAL:1|box|boxes}}", &[]), "box");
        assert_eq!(text("{{plural:3|box|boxes}}", &[]), "boxes");
    }

    #[test]
    fn gender_forms() {
        let template = "$1 changed {{GENDER:$2|his|her|their}} profile picture";
        let render = |name: &str, gender: &str| {
            text(template, &[Param::from(name), Param::from(gender)])
        };
        assert_eq!(render("Bob", "male"), "Bob changed his profile picture");
        assert_eq!(render("Alice", "female"), "Alice changed her profile picture");
        assert_eq!(render("Sam", ""), "Sam changed their profile picture");
    }

    #[test]
    fn gender_two_forms_falls_back_to_last() {
        assert_eq!(
            text("{{GENDER:$1|he|she}}", &[Param::from("unknown")]),
            "she"
        );
    }

    #[test]
    fn unknown_or_unterminated_template_is_literal() {
        assert_eq!(text("{{SITENAME}} x", &[]), "{{SITENAME}} x");
        assert_eq!(text("{{PLURAL:$1|a", &[Param::from(1)]), "{{PLURAL:1|a");
    }

    #[test]
    fn external_link_markup() {
        let out = markup("See [https://example.com the docs].", &[]);
        assert!(out.starts_with("See <a href=\""), "{out}");
        assert!(out.ends_with("\">the docs</a>."), "{out}");
        assert!(out.contains("example.com"), "{out}");
    }

    #[test]
    fn external_link_text_mode_keeps_label_only() {
        assert_eq!(
            text("See [https://example.com the docs].", &[]),
            "See the docs."
        );
    }

    #[test]
    fn link_label_is_escaped() {
        let out = markup("[https://example.com <script>alert(1)</script>]", &[]);
        assert!(out.starts_with("<a href="), "{out}");
        assert!(out.contains("&lt;script&gt;"), "{out}");
        assert!(!out.contains("<script>"), "{out}");
    }

    #[test]
    fn wiki_link() {
        let out = markup("Read [[Main Page|the main page]]", &[]);
        assert!(out.contains("Main_Page"), "{out}");
        assert!(out.ends_with(">the main page</a>"), "{out}");
        assert_eq!(text("Read [[Main Page]]", &[]), "Read Main Page");
    }

    #[test]
    fn brackets_literal_without_wikilinks() {
        let message = Message::parse("[https://example.com docs]", false);
        assert_eq!(
            message.format(&[], &PluralRule::English, Format::Markup),
            escape("[https://example.com docs]").to_string()
        );
        assert_eq!(
            message.format(&[], &PluralRule::English, Format::Text),
            "[https://example.com docs]"
        );
    }

    #[test]
    fn non_url_bracket_is_literal() {
        assert_eq!(text("[not a link]", &[]), "[not a link]");
    }

    #[test]
    fn markup_escapes_text_and_params() {
        let out = markup("<b>$1</b>", &[Param::from("<i>x</i>")]);
        assert!(!out.contains('<'), "{out}");
        assert!(out.contains("&lt;b&gt;"), "{out}");
        assert!(out.contains("&lt;i&gt;"), "{out}");
    }

    #[test]
    fn text_mode_is_verbatim() {
        assert_eq!(
            text("<script>alert($1)</script>", &[Param::from("1")]),
            "<script>alert(1)</script>"
        );
    }

    #[test]
    fn link_inside_plural_form() {
        let out = text(
            "{{PLURAL:$1|one [https://a.example file]|many [https://b.example files]}}",
            &[Param::from(2)],
        );
        assert_eq!(out, "many files");
    }
}
