//! crates/torah_study_core/src/webhook.rs
//!
//! Parses the raw text blob returned by the external generation service into
//! a structured source record. The input is unstructured, loosely-labeled
//! bilingual text: labels may be bold-markdown, plain, or absent, and both
//! English and Hebrew label variants occur. Every field is extracted through
//! an ordered chain of attempts, falling through to the next attempt or a
//! heuristic default; missing optional fields never raise an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::commentary::select_commentaries;
use crate::domain::{CommentaryConfig, Language, ParsedWebhookSource, SEFARIA_DOMAIN};

/// Placeholder titles used only when no explicit title and no range could be
/// recovered.
pub const FALLBACK_TITLE_EN: &str = "Torah Source";
pub const FALLBACK_TITLE_HE: &str = "מקור תורני";

/// A domain variant the generation service keeps producing; normalized to
/// the canonical host before validation.
const WRONG_DOMAIN_VARIANT: &str = "sefaria.org.il";

const TITLE_EN_LABELS: &[&str] = &["english", "english title", "אנגלית"];
const TITLE_HE_LABELS: &[&str] = &["hebrew", "hebrew title", "עברית"];
const RANGE_LABELS: &[&str] = &["source range", "range", "טווח המקור", "טווח"];
const FROM_LABELS: &[&str] = &["from", "מ", "החל מ"];
const TO_LABELS: &[&str] = &["to", "עד"];
const EXCERPT_EN_LABELS: &[&str] = &["text excerpt", "excerpt", "source text", "text"];
const EXCERPT_HE_LABELS: &[&str] = &["קטע המקור", "קטע", "טקסט"];
const REFLECTION_EN_LABELS: &[&str] = &[
    "reflection prompt",
    "reflection question",
    "reflection",
    "question",
];
const REFLECTION_HE_LABELS: &[&str] = &["שאלה להרהור", "שאלת הרהור", "שאלה"];
const TIME_LABELS: &[&str] = &["estimated time", "time", "זמן משוער", "זמן"];
const COMMENTARY_LABELS: &[&str] = &[
    "suggested commentaries",
    "commentaries",
    "commentary",
    "פרשנים",
    "מפרשים",
];
const LINK_LABELS: &[&str] = &["working link", "link", "url", "קישור"];

/// Every label that can open a section; block extraction stops at the next
/// line whose prefix matches one of these.
const KNOWN_HEADERS: &[&str] = &[
    "english",
    "english title",
    "hebrew",
    "hebrew title",
    "אנגלית",
    "עברית",
    "source range",
    "range",
    "טווח המקור",
    "טווח",
    "from",
    "to",
    "מ",
    "עד",
    "החל מ",
    "text excerpt",
    "excerpt",
    "source text",
    "text",
    "קטע המקור",
    "קטע",
    "טקסט",
    "reflection prompt",
    "reflection question",
    "reflection",
    "question",
    "שאלה להרהור",
    "שאלת הרהור",
    "שאלה",
    "estimated time",
    "time",
    "זמן משוער",
    "זמן",
    "suggested commentaries",
    "commentaries",
    "commentary",
    "פרשנים",
    "מפרשים",
    "working link",
    "link",
    "url",
    "קישור",
];

static MD_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\((https?://[^)\s]+)\)").unwrap());
static BARE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>()\[\]]+").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static LIST_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+[.)]\s*|[-*•]\s*)").unwrap());

//=========================================================================================
// Line and Label Primitives
//=========================================================================================

/// Splits a line into `(label, value)` around its first colon, with
/// bold-markdown markers stripped from both sides.
fn split_label_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim().trim_start_matches('*').trim_start();
    let (prefix, value) = trimmed.split_once(':')?;
    let label = prefix.trim_end_matches('*').trim().to_lowercase();
    if label.is_empty() || label.chars().count() > 40 {
        return None;
    }
    let value = value.trim_start_matches('*').trim().trim_end_matches('*').trim();
    Some((label, value.to_string()))
}

fn is_section_header(line: &str) -> bool {
    split_label_line(line)
        .map(|(label, _)| KNOWN_HEADERS.contains(&label.as_str()))
        .unwrap_or(false)
}

/// First single-line value carrying one of `labels`. Labels are tried in
/// order, so more specific synonyms must come first in the list.
fn labeled_line(text: &str, labels: &[&str]) -> Option<String> {
    for label in labels {
        for line in text.lines() {
            if let Some((found, value)) = split_label_line(line) {
                if found == *label && !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// A labeled multi-line block: the value on the label's own line plus every
/// following line up to the next known section header or end of text.
fn labeled_block(text: &str, labels: &[&str]) -> Option<String> {
    for label in labels {
        let mut lines = text.lines();
        while let Some(line) = lines.next() {
            let matched = split_label_line(line)
                .map(|(found, _)| found == *label)
                .unwrap_or(false);
            if !matched {
                continue;
            }
            let mut block = Vec::new();
            if let Some((_, value)) = split_label_line(line) {
                if !value.is_empty() {
                    block.push(value);
                }
            }
            for rest in lines.by_ref() {
                if is_section_header(rest) {
                    break;
                }
                block.push(rest.trim().to_string());
            }
            let joined = block.join("\n").trim().to_string();
            if !joined.is_empty() {
                return Some(joined);
            }
            break;
        }
    }
    None
}

//=========================================================================================
// Sanitizer
//=========================================================================================

/// Cleans one extracted free-text field: markdown links keep their text,
/// bare URLs and link-metadata lines are dropped, HTML tags are stripped,
/// and runs of whitespace collapse. Runs on every textual field before it
/// is considered final.
pub fn sanitize_text(raw: &str) -> String {
    let without_md_links = MD_LINK_RE.replace_all(raw, "$1");
    let without_urls = BARE_URL_RE.replace_all(&without_md_links, "");
    let without_tags = HTML_TAG_RE.replace_all(&without_urls, "");

    let kept_lines: Vec<&str> = without_tags
        .lines()
        .filter(|line| {
            split_label_line(line)
                .map(|(label, _)| !LINK_LABELS.contains(&label.as_str()))
                .unwrap_or(true)
        })
        .collect();

    let rejoined = kept_lines.join("\n");
    let collapsed_spaces = SPACE_RUN_RE.replace_all(&rejoined, " ");
    let collapsed_blanks = BLANK_RUN_RE.replace_all(&collapsed_spaces, "\n\n");
    collapsed_blanks.trim().to_string()
}

fn sanitize_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| sanitize_text(&v))
        .filter(|v| !v.is_empty())
}

//=========================================================================================
// Link Extraction
//=========================================================================================

/// Normalizes a candidate link: canonical host, decoded commas, no `texts/`
/// path segment, trailing punctuation dropped.
fn normalize_link(raw: &str) -> String {
    let mut link = raw.trim().trim_end_matches(['.', ',', ')', ']']).to_string();
    link = link.replace(WRONG_DOMAIN_VARIANT, SEFARIA_DOMAIN);
    link = link.replace("%2C", ",").replace("%2c", ",");
    link = link.replace("/texts/", "/");
    link
}

/// Ordered link attempts: markdown-link syntax, then a labeled "Working
/// Link" line, then a bare URL scan. The result is rejected (empty) unless
/// the canonical domain survives normalization.
fn extract_link(text: &str) -> String {
    let candidate = MD_LINK_RE
        .captures(text)
        .map(|caps| caps[2].to_string())
        .or_else(|| {
            labeled_line(text, LINK_LABELS)
                .and_then(|value| BARE_URL_RE.find(&value).map(|m| m.as_str().to_string()))
        })
        .or_else(|| BARE_URL_RE.find(text).map(|m| m.as_str().to_string()));

    match candidate {
        Some(raw) => {
            let normalized = normalize_link(&raw);
            if normalized.contains(SEFARIA_DOMAIN) {
                normalized
            } else {
                String::new()
            }
        }
        None => String::new(),
    }
}

//=========================================================================================
// Range Extraction
//=========================================================================================

fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Derives a human-readable range from the canonical link's last path
/// segment: decoded, underscores to spaces, dotted chapter/verse refs
/// rejoined with colons (`Genesis.1.1-2.3` becomes `Genesis 1:1-2:3`).
fn range_from_link(link: &str) -> Option<String> {
    if link.is_empty() {
        return None;
    }
    let path = link.split(['?', '#']).next()?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment.contains(SEFARIA_DOMAIN) {
        return None;
    }
    let decoded = percent_decode(segment).replace('_', " ");
    let mut parts = decoded.split('.');
    let book = parts.next()?.trim().to_string();
    if book.is_empty() {
        return None;
    }
    let numbers: Vec<&str> = parts.collect();
    if numbers.is_empty() {
        Some(book)
    } else {
        Some(format!("{} {}", book, numbers.join(":")))
    }
}

//=========================================================================================
// Commentary Splitting
//=========================================================================================

/// Splits a labeled commentary block into clean entries: bullet and
/// numbering prefixes and markdown emphasis stripped, short fragments
/// dropped, capped at two entries.
fn split_commentaries(block: &str) -> Vec<String> {
    block
        .split(['\n', ';', '•'])
        .map(|piece| {
            let stripped = LIST_PREFIX_RE.replace(piece, "");
            stripped.trim_matches('*').trim().to_string()
        })
        .filter(|entry| entry.chars().count() > 2)
        .take(2)
        .collect()
}

//=========================================================================================
// The Parser
//=========================================================================================

/// Parses the external generation service's raw output. Carries the request
/// context so that missing fields can round-trip the caller's own input
/// (estimated time) or defer to topic-based classification (commentaries).
pub struct WebhookParser {
    language: Language,
    requested_minutes: u32,
    topic: String,
}

impl WebhookParser {
    pub fn new(language: Language, requested_minutes: u32, topic: impl Into<String>) -> Self {
        Self {
            language,
            requested_minutes,
            topic: topic.into(),
        }
    }

    pub fn parse(&self, raw: &str) -> ParsedWebhookSource {
        let sefaria_link = extract_link(raw);
        let source_range = self.extract_range(raw, &sefaria_link);

        let title_en = labeled_line(raw, TITLE_EN_LABELS);
        let title_he = labeled_line(raw, TITLE_HE_LABELS);
        let (title, title_recovered) = self.resolve_title(&title_en, &title_he, &source_range);

        let mut text_excerpt = sanitize_opt(labeled_block(raw, EXCERPT_EN_LABELS));
        let mut text_excerpt_he = sanitize_opt(labeled_block(raw, EXCERPT_HE_LABELS));
        if text_excerpt.is_none() && text_excerpt_he.is_none() {
            let fallback = sanitize_opt(heuristic_excerpt(raw));
            match self.language {
                Language::He => text_excerpt_he = fallback,
                Language::En => text_excerpt = fallback,
            }
        }

        let mut reflection_prompt = sanitize_opt(labeled_block(raw, REFLECTION_EN_LABELS));
        let mut reflection_prompt_he = sanitize_opt(labeled_block(raw, REFLECTION_HE_LABELS));
        if reflection_prompt.is_none() && reflection_prompt_he.is_none() {
            let fallback = sanitize_opt(first_question_line(raw));
            match self.language {
                Language::He => reflection_prompt_he = fallback,
                Language::En => reflection_prompt = fallback,
            }
        }

        let estimated_time = labeled_line(raw, TIME_LABELS)
            .and_then(|value| NUMBER_RE.find(&value).map(|m| m.as_str().to_string()))
            .and_then(|digits| digits.parse::<u32>().ok())
            .filter(|&minutes| minutes > 0)
            .unwrap_or(self.requested_minutes);

        let mut commentaries = labeled_block(raw, COMMENTARY_LABELS)
            .map(|block| split_commentaries(&block))
            .unwrap_or_default();
        if commentaries.is_empty() {
            commentaries = select_commentaries(&CommentaryConfig {
                topic_selected: self.topic.clone(),
                source_title: title.clone(),
                source_range: source_range.clone(),
                excerpt: text_excerpt
                    .clone()
                    .or_else(|| text_excerpt_he.clone())
                    .unwrap_or_default(),
            });
        }

        ParsedWebhookSource {
            title,
            title_he: sanitize_opt(title_he),
            source_range,
            text_excerpt,
            text_excerpt_he,
            reflection_prompt,
            reflection_prompt_he,
            commentaries,
            estimated_time,
            sefaria_link,
            title_recovered,
        }
    }

    /// Range precedence: an explicitly labeled range block wins over a
    /// From/To pair even when both are present in the same text. This
    /// ordering is a preserved contract; do not reorder without product
    /// confirmation. The link-derived guess is last.
    fn extract_range(&self, raw: &str, link: &str) -> String {
        if let Some(labeled) = labeled_line(raw, RANGE_LABELS) {
            return sanitize_text(&labeled);
        }

        let from = labeled_line(raw, FROM_LABELS);
        let to = labeled_line(raw, TO_LABELS);
        if let (Some(from), Some(to)) = (from, to) {
            let connector = match self.language {
                Language::He => "עד",
                Language::En => "to",
            };
            return sanitize_text(&format!("{} {} {}", from, connector, to));
        }

        range_from_link(link)
            .map(|range| sanitize_text(&range))
            .unwrap_or_default()
    }

    fn resolve_title(
        &self,
        title_en: &Option<String>,
        title_he: &Option<String>,
        range: &str,
    ) -> (String, bool) {
        let preferred = match self.language {
            Language::He => title_he.clone().or_else(|| title_en.clone()),
            Language::En => title_en.clone().or_else(|| title_he.clone()),
        };
        if let Some(title) = preferred.map(|t| sanitize_text(&t)).filter(|t| !t.is_empty()) {
            return (title, true);
        }
        if !range.is_empty() {
            return (range.to_string(), true);
        }
        let placeholder = match self.language {
            Language::He => FALLBACK_TITLE_HE,
            Language::En => FALLBACK_TITLE_EN,
        };
        (placeholder.to_string(), false)
    }
}

/// The no-label excerpt heuristic: the first blank-line-delimited paragraph
/// longer than 40 characters that carries no URL and does not itself look
/// like a section heading.
fn heuristic_excerpt(raw: &str) -> Option<String> {
    raw.split("\n\n")
        .map(str::trim)
        .find(|paragraph| {
            paragraph.chars().count() > 40
                && !paragraph.contains("http")
                && !paragraph
                    .lines()
                    .next()
                    .map(is_section_header)
                    .unwrap_or(false)
                && !paragraph.trim_end().ends_with(':')
        })
        .map(str::to_string)
}

/// The no-label reflection heuristic: the first line ending in a question
/// mark.
fn first_question_line(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|line| line.ends_with('?') && line.chars().count() > 1)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> WebhookParser {
        WebhookParser::new(Language::En, 15, "Torah")
    }

    #[test]
    fn labeled_range_beats_from_to() {
        let raw = "Source Range: Genesis 1:1-2\nFrom: Genesis 1:1\nTo: Genesis 1:2\n";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.source_range, "Genesis 1:1-2");
    }

    #[test]
    fn from_to_pair_synthesizes_a_range() {
        let raw = "From: Genesis 1:1\nTo: Genesis 1:2\n";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.source_range, "Genesis 1:1 to Genesis 1:2");
    }

    #[test]
    fn hebrew_from_to_uses_the_hebrew_connector() {
        let raw = "From: בראשית א:א\nTo: בראשית א:ב\n";
        let parsed = WebhookParser::new(Language::He, 15, "Torah").parse(raw);
        assert_eq!(parsed.source_range, "בראשית א:א עד בראשית א:ב");
    }

    #[test]
    fn range_derived_from_link_when_nothing_else_exists() {
        let raw = "Here is your study text.\nhttps://www.sefaria.org/Genesis.1.1-2.3\n";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.source_range, "Genesis 1:1-2:3");
    }

    #[test]
    fn link_segment_underscores_become_spaces() {
        let raw = "https://www.sefaria.org/Pirkei_Avot.1.1";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.source_range, "Pirkei Avot 1:1");
    }

    #[test]
    fn bold_labeled_titles_are_extracted() {
        let raw = "**English:** The Beginning of Everything\n**Hebrew:** ראשית הכל\n";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.title, "The Beginning of Everything");
        assert_eq!(parsed.title_he.as_deref(), Some("ראשית הכל"));
        assert!(parsed.title_recovered);
    }

    #[test]
    fn title_falls_back_to_range_then_placeholder() {
        let with_range = "Source Range: Exodus 3:1-15\n";
        let parsed = parser().parse(with_range);
        assert_eq!(parsed.title, "Exodus 3:1-15");
        assert!(parsed.title_recovered);

        let bare = "no labels here";
        let parsed = parser().parse(bare);
        assert_eq!(parsed.title, FALLBACK_TITLE_EN);
        assert!(!parsed.title_recovered);

        let parsed_he = WebhookParser::new(Language::He, 15, "x").parse(bare);
        assert_eq!(parsed_he.title, FALLBACK_TITLE_HE);
    }

    #[test]
    fn labeled_excerpt_is_bounded_by_the_next_header() {
        let raw = "Text Excerpt: In the beginning God created\nthe heaven and the earth.\nReflection Prompt: What does beginning mean to you?\n";
        let parsed = parser().parse(raw);
        assert_eq!(
            parsed.text_excerpt.as_deref(),
            Some("In the beginning God created\nthe heaven and the earth.")
        );
        assert_eq!(
            parsed.reflection_prompt.as_deref(),
            Some("What does beginning mean to you?")
        );
    }

    #[test]
    fn excerpt_heuristic_takes_first_long_plain_paragraph() {
        let raw = "Overview:\n\nshort line\n\nRabbi Akiva taught that love of one's fellow is the great principle of the Torah, and the sages built on this.\n\nhttps://www.sefaria.org/x\n";
        let parsed = parser().parse(raw);
        let excerpt = parsed.text_excerpt.expect("heuristic should fire");
        assert!(excerpt.starts_with("Rabbi Akiva taught"));
    }

    #[test]
    fn reflection_heuristic_takes_first_question_line() {
        let raw = "A teaching about kindness.\nHow will you practice this today?\nMore prose.";
        let parsed = parser().parse(raw);
        assert_eq!(
            parsed.reflection_prompt.as_deref(),
            Some("How will you practice this today?")
        );
    }

    #[test]
    fn estimated_time_parses_or_round_trips_the_request() {
        let parsed = parser().parse("Estimated Time: 25 minutes\n");
        assert_eq!(parsed.estimated_time, 25);

        let parsed = parser().parse("no time field");
        assert_eq!(parsed.estimated_time, 15);
    }

    #[test]
    fn markdown_link_is_preferred_and_normalized() {
        let raw = "[Bereshit on Sefaria](https://www.sefaria.org.il/texts/Genesis.1.1%2C2)\nhttps://example.com/other";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.sefaria_link, "https://www.sefaria.org/Genesis.1.1,2");
    }

    #[test]
    fn working_link_line_is_used_when_no_markdown_link() {
        let raw = "Working Link: https://www.sefaria.org/Exodus.3.1\n";
        let parsed = parser().parse(raw);
        assert_eq!(parsed.sefaria_link, "https://www.sefaria.org/Exodus.3.1");
    }

    #[test]
    fn non_canonical_links_are_rejected() {
        let parsed = parser().parse("see https://torah.example.com/Genesis.1.1");
        assert_eq!(parsed.sefaria_link, "");
    }

    #[test]
    fn commentary_block_is_split_cleaned_and_capped() {
        let raw = "Commentaries:\n- **Rashi**\n- Ibn Ezra\n- Sforno\n";
        let parsed = parser().parse(raw);
        assert_eq!(
            parsed.commentaries,
            vec!["Rashi".to_string(), "Ibn Ezra".to_string()]
        );
    }

    #[test]
    fn numbered_and_semicolon_lists_also_split() {
        let raw = "Commentaries: 1. Mishnah Berurah; 2. Taz\n";
        let parsed = parser().parse(raw);
        assert_eq!(
            parsed.commentaries,
            vec!["Mishnah Berurah".to_string(), "Taz".to_string()]
        );
    }

    #[test]
    fn empty_commentary_block_defers_to_the_selector() {
        let raw = "English: Shabbat Candles\nSource Range: Shulchan Aruch, Orach Chaim 263\n";
        let parsed = WebhookParser::new(Language::En, 15, "Halacha").parse(raw);
        assert_eq!(
            parsed.commentaries,
            vec!["Mishnah Berurah".to_string(), "Shach".to_string()]
        );
    }

    #[test]
    fn spiritual_topic_keeps_deferred_commentaries_empty() {
        let raw = "English: Finding Meaning\n";
        let parsed = WebhookParser::new(Language::En, 15, "Spiritual Growth").parse(raw);
        assert!(parsed.commentaries.is_empty());
    }

    #[test]
    fn sanitizer_strips_links_tags_and_metadata_lines() {
        let cleaned = sanitize_text(
            "See [Rashi here](https://www.sefaria.org/x) for more.\nURL:\nhttps://www.sefaria.org/raw\n<b>bold</b> text   spaced",
        );
        assert_eq!(cleaned, "See Rashi here for more.\n\nbold text spaced");
    }

    #[test]
    fn garbage_input_is_unusable_but_never_panics() {
        let parsed = parser().parse("xx");
        assert_eq!(parsed.title, FALLBACK_TITLE_EN);
        assert!(parsed.source_range.is_empty());
        assert!(parsed.text_excerpt.is_none());
        assert!(!parsed.is_usable());
    }

    #[test]
    fn full_bilingual_blob_parses_every_field() {
        let raw = "\
**English:** The Burning Bush
**Hebrew:** הסנה הבוער
**Source Range:** Exodus 3:1-15
**Text Excerpt:** Moses saw that the bush burned with fire, and the bush was not consumed. He turned aside to see this great sight.
**Reflection Prompt:** When have you turned aside to notice something holy?
**Estimated Time:** 20
**Commentaries:**
- Rashi
- Ramban
**Working Link:** https://www.sefaria.org/Exodus.3.1-15
";
        let parsed = WebhookParser::new(Language::En, 15, "Torah").parse(raw);
        assert_eq!(parsed.title, "The Burning Bush");
        assert_eq!(parsed.title_he.as_deref(), Some("הסנה הבוער"));
        assert_eq!(parsed.source_range, "Exodus 3:1-15");
        assert!(parsed.text_excerpt.as_deref().unwrap().starts_with("Moses saw"));
        assert_eq!(
            parsed.reflection_prompt.as_deref(),
            Some("When have you turned aside to notice something holy?")
        );
        assert_eq!(parsed.estimated_time, 20);
        assert_eq!(parsed.commentaries.len(), 2);
        assert_eq!(parsed.sefaria_link, "https://www.sefaria.org/Exodus.3.1-15");
        assert!(parsed.is_usable());
    }
}
