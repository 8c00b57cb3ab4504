//! Paragraph classification.
//!
//! Word documents rarely say outright what a paragraph is, so each question is
//! answered by a cascade of heuristics: style names first, then the raw
//! numbering properties, then the rendered text itself. Later steps cover what
//! earlier ones miss; the order matters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::docx::model::{Paragraph, ParagraphStyle};
use crate::org::refs::{run_text_with_tokens, splice_text, ResolvedReferences};

pub const MAX_HEADING_LEVEL: u8 = 9;
/// Word numbering defines levels 0 through 8.
pub const MAX_LIST_LEVEL: usize = 8;

static HEADING_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"heading\s*(\d+)").expect("heading suffix"));
static STYLE_LEVEL_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ([2-9])$").expect("style level suffix"));

static BULLET_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^[•·▪▫‣⁃]\s+", r"^[o*+−-]\s+", r"^[◦◉○●]\s+"]
        .iter()
        .map(|p| Regex::new(p).expect("bullet pattern"))
        .collect()
});
static NUMBERED_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d+\.\s+",
        r"^\d+\)\s+",
        r"^[a-zA-Z]\.\s+",
        r"^[a-zA-Z]\)\s+",
        r"^[ivxlIVXL]+\.\s+",
        r"^[IVXL]+\)\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("numbered pattern"))
    .collect()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn markers(self) -> &'static [Regex] {
        match self {
            Self::Ordered => &NUMBERED_RES,
            Self::Unordered => &BULLET_RES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Heading {
        level: u8,
        text: String,
    },
    CenteredHeading {
        text: String,
    },
    ListItem {
        kind: ListKind,
        level: usize,
        text: String,
    },
    BoldSegmented {
        bold_parts: Vec<String>,
        regular_parts: Vec<String>,
    },
    Plain {
        text: String,
    },
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::CenteredHeading { .. } => "centered_heading",
            Self::ListItem { .. } => "list_item",
            Self::BoldSegmented { .. } => "bold_segmented",
            Self::Plain { .. } => "plain",
        }
    }
}

/// Classify one paragraph whose references were already resolved.
/// `None` when the paragraph has no visible text.
pub fn classify(paragraph: &Paragraph, refs: &ResolvedReferences) -> Option<Classification> {
    let text = splice_text(paragraph, refs);
    if text.trim().is_empty() {
        return None;
    }

    if let Some((kind, level)) = detect_list(paragraph) {
        return Some(Classification::ListItem {
            kind,
            level,
            text: clean_list_text(&text, kind),
        });
    }

    if let Some(level) = paragraph.style.as_ref().and_then(heading_level) {
        return Some(Classification::Heading {
            level,
            text: text.trim().to_string(),
        });
    }

    if is_centered(paragraph) {
        return Some(Classification::CenteredHeading {
            text: text.trim().to_string(),
        });
    }

    if paragraph.has_bold() {
        let (bold_parts, regular_parts) = bold_segments(paragraph, refs);
        return Some(Classification::BoldSegmented {
            bold_parts,
            regular_parts,
        });
    }

    Some(Classification::Plain { text })
}

/// Outline level of a heading style, `None` for body styles.
pub fn heading_level(style: &ParagraphStyle) -> Option<u8> {
    let name = style.name.trim().to_lowercase();
    let id = style.id.trim().to_lowercase();

    for candidate in [&name, &id] {
        if let Some(level) = exact_heading_level(candidate) {
            return Some(level);
        }
    }
    if let Some(level) = HEADING_SUFFIX_RE
        .captures(&name)
        .and_then(|c| c[1].parse::<u8>().ok())
        .filter(|l| (1..=MAX_HEADING_LEVEL).contains(l))
    {
        return Some(level);
    }
    if name == "title" || name == "subtitle" {
        return Some(1);
    }
    None
}

fn exact_heading_level(normalized: &str) -> Option<u8> {
    let digits = normalized
        .strip_prefix("heading ")
        .or_else(|| normalized.strip_prefix("heading"))?;
    if digits.len() != 1 {
        return None;
    }
    digits
        .parse::<u8>()
        .ok()
        .filter(|l| (1..=MAX_HEADING_LEVEL).contains(l))
}

/// List kind and zero-based nesting level, first matching heuristic wins.
pub fn detect_list(paragraph: &Paragraph) -> Option<(ListKind, usize)> {
    list_from_style(paragraph)
        .or_else(|| list_from_numbering(paragraph))
        .or_else(|| list_from_text(&paragraph.text()))
}

fn list_from_style(paragraph: &Paragraph) -> Option<(ListKind, usize)> {
    let style = paragraph.style.as_ref()?;
    let name = style.name.to_lowercase();
    if !name.contains("list") {
        return None;
    }
    // "unordered" contains "ordered": bullets must be checked first.
    let kind = if name.contains("bullet") || name.contains("unordered") {
        ListKind::Unordered
    } else if name.contains("number") || name.contains("ordered") {
        ListKind::Ordered
    } else {
        return None;
    };
    let level = match style.ilvl {
        Some(ilvl) => clamp_list_level(ilvl),
        None => STYLE_LEVEL_SUFFIX_RE
            .captures(name.trim_end())
            .and_then(|c| c[1].parse::<usize>().ok())
            .map(|n| n - 1)
            .unwrap_or(0),
    };
    Some((kind, level))
}

fn clamp_list_level(ilvl: i32) -> usize {
    (ilvl.max(0) as usize).min(MAX_LIST_LEVEL)
}

fn list_from_numbering(paragraph: &Paragraph) -> Option<(ListKind, usize)> {
    let num = paragraph.numbering.as_ref()?;
    let level = clamp_list_level(num.ilvl.unwrap_or(0));
    if num.num_id.is_some() {
        Some((ListKind::Ordered, level))
    } else if num.ilvl.is_some() {
        Some((ListKind::Unordered, level))
    } else {
        None
    }
}

fn list_from_text(raw: &str) -> Option<(ListKind, usize)> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if BULLET_RES.iter().any(|re| re.is_match(text)) {
        return Some((ListKind::Unordered, 0));
    }
    if NUMBERED_RES.iter().any(|re| re.is_match(text)) {
        return Some((ListKind::Ordered, 0));
    }
    if raw.starts_with("    ") || raw.starts_with('\t') {
        return Some((ListKind::Unordered, 1));
    }
    None
}

/// Strip the list marker families of `kind` from the start of `text`.
pub fn clean_list_text(text: &str, kind: ListKind) -> String {
    let mut out = text.trim().to_string();
    for re in kind.markers() {
        out = re.replace(&out, "").into_owned();
    }
    out.trim().to_string()
}

pub fn is_centered(paragraph: &Paragraph) -> bool {
    paragraph
        .alignment
        .as_deref()
        .is_some_and(|jc| jc.trim().eq_ignore_ascii_case("center"))
}

/// Consecutive bold runs and consecutive regular runs, each merged into one part.
/// Reference tokens stay with the run they follow.
pub fn bold_segments(
    paragraph: &Paragraph,
    refs: &ResolvedReferences,
) -> (Vec<String>, Vec<String>) {
    let mut bold_parts: Vec<String> = Vec::new();
    let mut regular_parts: Vec<String> = Vec::new();
    let mut current_bold: Option<String> = None;
    let mut current_regular: Option<String> = None;

    for (i, run) in paragraph.runs.iter().enumerate() {
        let text = run_text_with_tokens(paragraph, refs, i);
        if run.bold {
            if let Some(part) = current_regular.take() {
                regular_parts.push(part);
            }
            current_bold.get_or_insert_with(String::new).push_str(&text);
        } else {
            if let Some(part) = current_bold.take() {
                bold_parts.push(part);
            }
            current_regular.get_or_insert_with(String::new).push_str(&text);
        }
    }
    bold_parts.extend(current_bold);
    regular_parts.extend(current_regular);
    (bold_parts, regular_parts)
}
