//! Dual-line description contract
//!
//! Every segment description handed downstream has exactly two lines:
//!
//! ```text
//! Prompt: <visual / mood description, no musical vocabulary>
//! Music Style: <tempo, key, instrumentation>
//! ```
//!
//! Each line is at most [`MAX_LINE_CHARS`] characters including its label.
//! [`DescriptionRepair`] turns any input, including nothing at all, into text
//! that satisfies [`validate_dual_output_description`].

use crate::lexicon::KeywordLexicon;
use crate::templates::TemplateTables;
use crate::types::{Intensity, SegmentType};
use std::sync::Arc;
use tracing::debug;

/// Maximum characters per line (label included)
pub const MAX_LINE_CHARS: usize = 280;

pub const PROMPT_LABEL: &str = "Prompt:";
pub const STYLE_LABEL: &str = "Music Style:";

/// Prompt body used when the templates have no mood for a segment type
const FALLBACK_MOOD: &str = "steady, understated visuals";

/// Check the dual-line contract
///
/// True only if the text is exactly two lines, the first starting with
/// `Prompt:` and the second with `Music Style:`, both with a non-empty body
/// and within the length limit.
pub fn validate_dual_output_description(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() != 2 {
        return false;
    }
    is_valid_line(lines[0], PROMPT_LABEL) && is_valid_line(lines[1], STYLE_LABEL)
}

fn is_valid_line(line: &str, label: &str) -> bool {
    line.chars().count() <= MAX_LINE_CHARS
        && line
            .strip_prefix(label)
            .map(|body| !body.trim().is_empty())
            .unwrap_or(false)
}

/// Segment facts used to synthesize missing lines
#[derive(Debug, Clone, Copy)]
pub struct DescriptionContext<'a> {
    pub segment_type: SegmentType,
    pub intensity: Intensity,
    pub reason: &'a str,
    pub duration_seconds: f64,
}

/// Which repair tier was applied (for logging and tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairTier {
    /// Input already satisfied the contract
    PassThrough,
    /// Both labeled lines found but reformatted
    Reformatted,
    /// One labeled line kept, the other synthesized
    PartialSynthesis,
    /// Both lines synthesized
    FullSynthesis,
}

/// Repairs or synthesizes dual-line descriptions from template tables
#[derive(Debug, Clone)]
pub struct DescriptionRepair {
    lexicon: Arc<KeywordLexicon>,
    templates: Arc<TemplateTables>,
}

impl DescriptionRepair {
    pub fn new(lexicon: Arc<KeywordLexicon>, templates: Arc<TemplateTables>) -> Self {
        Self { lexicon, templates }
    }

    /// Produce a contract-valid description; never returns an empty string
    pub fn repair(&self, raw: Option<&str>, ctx: &DescriptionContext<'_>) -> String {
        self.repair_with_tier(raw, ctx).0
    }

    /// As [`repair`](Self::repair), also reporting the tier applied
    pub fn repair_with_tier(
        &self,
        raw: Option<&str>,
        ctx: &DescriptionContext<'_>,
    ) -> (String, RepairTier) {
        let text = raw.unwrap_or("").trim();

        if validate_dual_output_description(text) && !self.prompt_is_musical(text) {
            return (text.to_string(), RepairTier::PassThrough);
        }

        let mut prompt: Option<String> = None;
        let mut style: Option<String> = None;
        for line in text.lines() {
            if prompt.is_none() {
                if let Some(body) = extract_labeled(line, PROMPT_LABEL) {
                    // `Prompt: ... Music Style: ...` on a single line
                    let (head, inline_style) = split_inline_style(&body);
                    if style.is_none() {
                        style = inline_style;
                    }
                    prompt = head;
                    continue;
                }
            }
            if style.is_none() {
                if let Some(body) = extract_labeled(line, STYLE_LABEL) {
                    style = Some(body);
                }
            }
        }

        if let Some(body) = &prompt {
            if self.lexicon.contains_musical_vocabulary(body) {
                debug!(prompt = %body, "Discarding prompt line with musical vocabulary");
                prompt = None;
            }
        }

        let tier = match (&prompt, &style) {
            (Some(_), Some(_)) => RepairTier::Reformatted,
            (None, None) => RepairTier::FullSynthesis,
            _ => RepairTier::PartialSynthesis,
        };

        let prompt = prompt.unwrap_or_else(|| self.synthesize_prompt(ctx));
        let style = style.unwrap_or_else(|| self.synthesize_style(ctx));
        debug!(?tier, segment_type = %ctx.segment_type, "Repaired description");

        (compose(&prompt, &style), tier)
    }

    /// Visual/mood body for the `Prompt:` line
    ///
    /// Includes the segment reason only when it is free of musical vocabulary.
    pub fn synthesize_prompt(&self, ctx: &DescriptionContext<'_>) -> String {
        let mood = self
            .templates
            .style_for(ctx.segment_type)
            .map(|s| s.visual_mood.trim())
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MOOD);

        let reason = single_line(ctx.reason);
        if reason.is_empty() || self.lexicon.contains_musical_vocabulary(&reason) {
            capitalize(mood)
        } else {
            format!("{}; {}", capitalize(&reason), mood)
        }
    }

    /// Tempo/key/instrumentation body for the `Music Style:` line
    pub fn synthesize_style(&self, ctx: &DescriptionContext<'_>) -> String {
        let dynamics = self.templates.dynamics_for(ctx.intensity);
        let progression = self.templates.progression_for(ctx.duration_seconds);

        match self.templates.style_for(ctx.segment_type) {
            Some(style) => format!(
                "{} BPM, {}, {}, {} dynamics, {} progression",
                style.bpm[ctx.intensity.index()],
                style.key,
                style.instruments,
                dynamics,
                progression
            ),
            None => format!(
                "90 BPM, C major, light instrumental bed, {} dynamics, {} progression",
                dynamics, progression
            ),
        }
    }

    fn prompt_is_musical(&self, text: &str) -> bool {
        text.lines()
            .next()
            .and_then(|line| line.strip_prefix(PROMPT_LABEL))
            .map(|body| self.lexicon.contains_musical_vocabulary(body))
            .unwrap_or(false)
    }
}

/// Pull the body out of a labeled line, tolerating markdown decoration
/// (`**Prompt:**`, `- Prompt:`, `# Music Style:`) and label casing
fn extract_labeled(line: &str, label: &str) -> Option<String> {
    let stripped = line.trim().trim_start_matches(['*', '-', '#', '>', '_', ' ']);
    let head = stripped.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let body = stripped[label.len()..]
        .trim_start_matches(['*', '_'])
        .trim()
        .trim_end_matches(['*', '_'])
        .trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

/// Split a prompt body at an inline `Music Style:` label
///
/// Returns the prompt part (if any text precedes the label) and the style
/// body (if any text follows it).
fn split_inline_style(body: &str) -> (Option<String>, Option<String>) {
    let lowered = body.to_ascii_lowercase();
    let label = STYLE_LABEL.to_ascii_lowercase();
    let Some(at) = lowered.find(&label) else {
        return (Some(body.to_string()), None);
    };

    let non_empty = |text: &str| (!text.is_empty()).then(|| text.to_string());
    let head = body[..at]
        .trim_end_matches(|c: char| c.is_whitespace() || "*_|-#".contains(c))
        .trim();
    let tail = body[at + label.len()..]
        .trim_start_matches(['*', '_'])
        .trim();
    (non_empty(head), non_empty(tail))
}

fn compose(prompt: &str, style: &str) -> String {
    format!(
        "{}\n{}",
        truncate_chars(&format!("{} {}", PROMPT_LABEL, single_line(prompt)), MAX_LINE_CHARS),
        truncate_chars(&format!("{} {}", STYLE_LABEL, single_line(style)), MAX_LINE_CHARS)
    )
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
