//! Rich text fragments and their normalization into styled runs.
//!
//! Question and option text arrives in one of three shapes: a Delta op list
//! produced by the editor widget, an HTML fragment limited to a handful of
//! inline tags, or plain text. [`RichContent::normalize`] turns any of them
//! into an ordered list of [`StyledRun`]s, the atomic unit the layout code
//! works with.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Font scale applied to superscript and subscript runs.
pub const SCRIPT_SIZE_FACTOR: f32 = 0.7;

/// Vertical shift (layout units) applied to superscript and subscript runs.
pub const SCRIPT_SHIFT: f32 = 2.0;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn tag_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)").expect("tag name pattern is valid")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(nbsp|amp|lt|gt|quot);").expect("entity pattern is valid"))
}

fn newline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n]+").expect("newline pattern is valid"))
}

fn unterminated_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<\s*/?[A-Za-z][^>]*$").expect("open tag pattern is valid"))
}

/// A text fragment in one of the supported source representations.
///
/// Deserialization is untagged: `{"ops": [...]}` is a Delta, `{"html": "..."}`
/// is markup, and a bare JSON string is plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichContent {
    /// Ordered insert operations with optional inline attributes.
    Delta { ops: Vec<DeltaOp> },
    /// Markup using `<strong>`, `<em>`, `<u>`, `<sup>`, `<sub>`, `<p>`, `<br>`.
    Html { html: String },
    /// Unformatted text.
    PlainText(String),
}

impl RichContent {
    /// Create plain text content.
    pub fn plain(text: impl Into<String>) -> Self {
        RichContent::PlainText(text.into())
    }

    /// Create HTML content.
    pub fn html(markup: impl Into<String>) -> Self {
        RichContent::Html {
            html: markup.into(),
        }
    }

    /// Create Delta content.
    pub fn delta(ops: Vec<DeltaOp>) -> Self {
        RichContent::Delta { ops }
    }

    /// Normalize into styled runs, reporting content that cannot be interpreted.
    pub fn try_normalize(&self) -> Result<Vec<StyledRun>> {
        match self {
            RichContent::Delta { ops } => {
                if !ops.iter().any(|op| op.insert.as_text().is_some()) {
                    return Err(Error::MalformedRichContent(
                        "delta contains no text inserts".to_string(),
                    ));
                }
                Ok(normalize_delta(ops))
            }
            RichContent::Html { html } => {
                if unterminated_tag_regex().is_match(html) {
                    return Err(Error::MalformedRichContent(format!(
                        "unterminated tag in fragment: {}",
                        truncate_for_log(html)
                    )));
                }
                Ok(normalize_html(html))
            }
            RichContent::PlainText(text) if text.is_empty() => Ok(Vec::new()),
            RichContent::PlainText(text) => Ok(vec![StyledRun::plain(text.clone())]),
        }
    }

    /// Normalize into styled runs.
    ///
    /// Malformed content degrades to a single unformatted run holding its
    /// plain-text extraction (possibly nothing), so the result always
    /// concatenates to [`RichContent::plain_text`].
    pub fn normalize(&self) -> Vec<StyledRun> {
        match self.try_normalize() {
            Ok(runs) => runs,
            Err(e) => {
                log::warn!("{}; falling back to plain text", e);
                let text = self.plain_text();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![StyledRun::plain(text)]
                }
            }
        }
    }

    /// Extract the unformatted text, independently of run normalization.
    pub fn plain_text(&self) -> String {
        match self {
            RichContent::Delta { ops } => ops
                .iter()
                .filter_map(|op| op.insert.as_text())
                .map(collapse_newlines)
                .collect(),
            RichContent::Html { html } => {
                let stripped = tag_regex().replace_all(html, "");
                decode_entities(&stripped).trim().to_string()
            }
            RichContent::PlainText(text) => text.clone(),
        }
    }

    /// Whether the content has no visible text.
    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty()
    }
}

impl Default for RichContent {
    fn default() -> Self {
        RichContent::PlainText(String::new())
    }
}

impl From<&str> for RichContent {
    fn from(text: &str) -> Self {
        RichContent::plain(text)
    }
}

impl From<String> for RichContent {
    fn from(text: String) -> Self {
        RichContent::PlainText(text)
    }
}

/// Normalize content into styled runs.
pub fn normalize(content: &RichContent) -> Vec<StyledRun> {
    content.normalize()
}

/// Concatenate run text, ignoring formatting.
pub fn runs_plain_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// A single Delta operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaOp {
    /// Inserted text or an embed object.
    pub insert: DeltaInsert,

    /// Inline formatting for the insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<DeltaAttributes>,
}

impl DeltaOp {
    /// Create an unformatted text insert.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            insert: DeltaInsert::Text(text.into()),
            attributes: None,
        }
    }

    /// Create a formatted text insert.
    pub fn styled(text: impl Into<String>, attributes: DeltaAttributes) -> Self {
        Self {
            insert: DeltaInsert::Text(text.into()),
            attributes: Some(attributes),
        }
    }
}

/// Payload of a Delta insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaInsert {
    /// Plain string insert.
    Text(String),
    /// Embedded object (image, formula); not laid out as text.
    Embed(serde_json::Value),
}

impl DeltaInsert {
    /// The inserted string, if this is a text insert.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DeltaInsert::Text(text) => Some(text),
            DeltaInsert::Embed(_) => None,
        }
    }
}

/// Inline attributes recognized on Delta inserts. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaAttributes {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}

impl DeltaAttributes {
    /// Bold attribute set.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Italic attribute set.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Script attribute set.
    pub fn script(script: Script) -> Self {
        Self {
            script: Some(script),
            ..Default::default()
        }
    }
}

/// Delta `script` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Sub,
    Super,
    #[serde(other)]
    Unknown,
}

impl From<Option<Script>> for ScriptOffset {
    fn from(script: Option<Script>) -> Self {
        match script {
            Some(Script::Super) => ScriptOffset::Super,
            Some(Script::Sub) => ScriptOffset::Sub,
            Some(Script::Unknown) | None => ScriptOffset::None,
        }
    }
}

/// Baseline placement of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptOffset {
    #[default]
    None,
    Super,
    Sub,
}

impl ScriptOffset {
    /// Vertical offset from the line baseline; negative moves up the page.
    pub fn vertical_offset(self) -> f32 {
        match self {
            ScriptOffset::None => 0.0,
            ScriptOffset::Super => -SCRIPT_SHIFT,
            ScriptOffset::Sub => SCRIPT_SHIFT,
        }
    }

    /// Font size multiplier for the run.
    pub fn size_factor(self) -> f32 {
        match self {
            ScriptOffset::None => 1.0,
            ScriptOffset::Super | ScriptOffset::Sub => SCRIPT_SIZE_FACTOR,
        }
    }
}

/// A span of text sharing one formatting state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub script: ScriptOffset,
}

impl StyledRun {
    /// Create a run with no formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Whether two runs carry identical formatting.
    pub fn same_style(&self, other: &StyledRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.script == other.script
    }
}

fn collapse_newlines(text: &str) -> String {
    newline_regex().replace_all(text, " ").into_owned()
}

fn normalize_delta(ops: &[DeltaOp]) -> Vec<StyledRun> {
    let mut runs = Vec::with_capacity(ops.len());
    for op in ops {
        let Some(insert) = op.insert.as_text() else {
            log::debug!("Skipping non-text delta insert");
            continue;
        };
        let text = collapse_newlines(insert);
        if text.is_empty() {
            continue;
        }
        let attrs = op.attributes.clone().unwrap_or_default();
        runs.push(StyledRun {
            text,
            bold: attrs.bold,
            italic: attrs.italic,
            underline: attrs.underline,
            script: attrs.script.into(),
        });
    }
    runs
}

/// Open-tag counters for the inline tags that carry formatting.
#[derive(Debug, Default)]
struct HtmlStyle {
    bold: u32,
    italic: u32,
    underline: u32,
    sup: u32,
    sub: u32,
}

impl HtmlStyle {
    fn apply(&mut self, tag: &str) {
        let Some(caps) = tag_name_regex().captures(tag) else {
            return;
        };
        let closing = !caps[1].is_empty();
        let counter = match caps[2].to_ascii_lowercase().as_str() {
            "strong" | "b" => &mut self.bold,
            "em" | "i" => &mut self.italic,
            "u" => &mut self.underline,
            "sup" => &mut self.sup,
            "sub" => &mut self.sub,
            _ => return,
        };
        if closing {
            *counter = counter.saturating_sub(1);
        } else if !tag.trim_end_matches('>').trim_end().ends_with('/') {
            *counter += 1;
        }
    }

    fn run(&self, text: String) -> StyledRun {
        let script = if self.sup > 0 {
            ScriptOffset::Super
        } else if self.sub > 0 {
            ScriptOffset::Sub
        } else {
            ScriptOffset::None
        };
        StyledRun {
            text,
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
            script,
        }
    }
}

fn normalize_html(html: &str) -> Vec<StyledRun> {
    // entities decode over the tag-stripped text, as in `plain_text`
    let mut style = HtmlStyle::default();
    let mut raw = String::new();
    let mut spans: Vec<(usize, StyledRun)> = Vec::new();
    let mut last = 0;

    let mut push_raw = |raw: &mut String, style: &HtmlStyle, text: &str| {
        if text.is_empty() {
            return;
        }
        spans.push((raw.len(), style.run(String::new())));
        raw.push_str(text);
    };
    for tag in tag_regex().find_iter(html) {
        push_raw(&mut raw, &style, &html[last..tag.start()]);
        style.apply(tag.as_str());
        last = tag.end();
    }
    push_raw(&mut raw, &style, &html[last..]);

    let mut runs: Vec<StyledRun> = Vec::new();
    let mut cursor = 0;
    for entity in entity_regex().find_iter(&raw) {
        push_styled(&mut runs, &spans, &raw, cursor, entity.start());
        let decoded = decode_entities(entity.as_str());
        push_run(&mut runs, span_style(&spans, entity.start()), decoded);
        cursor = entity.end();
    }
    push_styled(&mut runs, &spans, &raw, cursor, raw.len());

    trim_runs(&mut runs);
    runs
}

/// Style of the span covering byte `offset` of the joined text.
fn span_style(spans: &[(usize, StyledRun)], offset: usize) -> &StyledRun {
    let index = spans.partition_point(|(start, _)| *start <= offset);
    &spans[index.saturating_sub(1)].1
}

/// Push `raw[from..to]`, split along span boundaries.
fn push_styled(
    runs: &mut Vec<StyledRun>,
    spans: &[(usize, StyledRun)],
    raw: &str,
    from: usize,
    to: usize,
) {
    for (i, (start, template)) in spans.iter().enumerate() {
        let end = spans.get(i + 1).map_or(raw.len(), |(next, _)| *next);
        let (lo, hi) = ((*start).max(from), end.min(to));
        if lo < hi {
            push_run(runs, template, raw[lo..hi].to_string());
        }
    }
}

fn push_run(runs: &mut Vec<StyledRun>, template: &StyledRun, text: String) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(prev) if prev.same_style(template) => prev.text.push_str(&text),
        _ => runs.push(StyledRun {
            text,
            ..template.clone()
        }),
    }
}

/// Trim leading whitespace of the first run and trailing whitespace of the
/// last, dropping runs that become empty.
fn trim_runs(runs: &mut Vec<StyledRun>) {
    while let Some(first) = runs.first_mut() {
        let trimmed = first.text.trim_start();
        if trimmed.is_empty() {
            runs.remove(0);
        } else {
            first.text = trimmed.to_string();
            break;
        }
    }
    while let Some(last) = runs.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.is_empty() {
            runs.pop();
        } else {
            last.text = trimmed.to_string();
            break;
        }
    }
}

/// Decode the five entities the editor emits, in a single pass.
pub fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &regex::Captures| {
            match &caps[1] {
                "nbsp" => " ",
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                _ => "\"",
            }
            .to_string()
        })
        .into_owned()
}

fn truncate_for_log(text: &str) -> String {
    match text.char_indices().nth(40) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_single_run() {
        let runs = RichContent::plain("Hello world").normalize();
        assert_eq!(runs, vec![StyledRun::plain("Hello world")]);
        assert!(RichContent::plain("").normalize().is_empty());
    }

    #[test]
    fn test_delta_newlines_collapse() {
        let content = RichContent::delta(vec![DeltaOp::text("Line one\n\nLine two\n")]);
        let runs = content.normalize();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Line one Line two ");
        assert_eq!(runs_plain_text(&runs), content.plain_text());
    }

    #[test]
    fn test_delta_attributes() {
        let content = RichContent::delta(vec![
            DeltaOp::text("H"),
            DeltaOp::styled("2", DeltaAttributes::script(Script::Sub)),
            DeltaOp::text("O is "),
            DeltaOp::styled("water", DeltaAttributes::bold()),
        ]);
        let runs = content.normalize();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[1].script, ScriptOffset::Sub);
        assert!(runs[3].bold);
        assert!(!runs[3].italic);
    }

    #[test]
    fn test_empty_delta_is_malformed() {
        let content = RichContent::delta(Vec::new());
        assert!(matches!(
            content.try_normalize(),
            Err(Error::MalformedRichContent(_))
        ));
        assert!(content.normalize().is_empty());
    }

    #[test]
    fn test_html_nesting() {
        let content = RichContent::html("<p>A <strong>bold <em>mix</em></strong> end</p>");
        let runs = content.normalize();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0].text, "A ");
        assert!(runs[1].bold && !runs[1].italic);
        assert!(runs[2].bold && runs[2].italic);
        assert_eq!(runs[3].text, " end");
        assert!(!runs[3].bold);
    }

    #[test]
    fn test_html_entities_and_trim() {
        let content = RichContent::html("  <p>&lt;tag&gt; &amp;&nbsp;&quot;q&quot; </p><br>");
        let runs = content.normalize();
        assert_eq!(runs_plain_text(&runs), "<tag> & \"q\"");
        assert_eq!(content.plain_text(), "<tag> & \"q\"");
    }

    #[test]
    fn test_html_entity_split_by_tag() {
        let content = RichContent::html("&am<b>p;</b> x &l<i>t;");
        let runs = content.normalize();
        assert_eq!(runs_plain_text(&runs), content.plain_text());
        assert_eq!(content.plain_text(), "& x <");
        // the entity takes the style where it starts
        assert!(!runs[0].bold);
        assert_eq!(runs[0].text, "& x <");
    }

    #[test]
    fn test_html_entity_single_pass() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_html_unknown_tags_discarded() {
        let content = RichContent::html("<span class=\"x\">E = mc<sup>2</sup></span>");
        let runs = content.normalize();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "2");
        assert_eq!(runs[1].script, ScriptOffset::Super);
    }

    #[test]
    fn test_html_unterminated_tag_falls_back() {
        let content = RichContent::html("x < y and <strong");
        assert!(content.try_normalize().is_err());
        let runs = content.normalize();
        assert_eq!(runs_plain_text(&runs), content.plain_text());
    }

    #[test]
    fn test_untagged_deserialize() {
        let delta: RichContent =
            serde_json::from_str(r#"{"ops":[{"insert":"a","attributes":{"italic":true}}]}"#)
                .unwrap();
        assert!(matches!(delta, RichContent::Delta { .. }));

        let html: RichContent = serde_json::from_str(r#"{"html":"<em>a</em>"}"#).unwrap();
        assert!(matches!(html, RichContent::Html { .. }));

        let plain: RichContent = serde_json::from_str(r#""a""#).unwrap();
        assert_eq!(plain, RichContent::plain("a"));
    }

    #[test]
    fn test_script_offsets() {
        assert_eq!(ScriptOffset::Super.vertical_offset(), -2.0);
        assert_eq!(ScriptOffset::Sub.vertical_offset(), 2.0);
        assert_eq!(ScriptOffset::None.size_factor(), 1.0);
        assert!((ScriptOffset::Super.size_factor() - 0.7).abs() < f32::EPSILON);
    }
}
