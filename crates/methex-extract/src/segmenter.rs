//! Section segmentation by heading detection.
//!
//! A heading is either a short standalone line ("Case Presentation",
//! "2. Discussion:", "## BACKGROUND") or an inline label at the start of a
//! line ("CASE REPORT: A 45-year-old ..."). Only headings present in the
//! lexicon open a section. The output always covers the whole text.

use serde::Serialize;
use std::collections::HashMap;

use methex_common::{SectionLabel, SegmenterConfig};
use methex_lexicon::HeadingRule;

/// A labelled span of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub label: SectionLabel,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

pub struct SectionSegmenter {
    /// normalised heading -> label
    headings: HashMap<String, SectionLabel>,
    max_heading_chars: usize,
}

impl SectionSegmenter {
    pub fn new(headings: &[HeadingRule], config: &SegmenterConfig) -> Self {
        let headings = headings
            .iter()
            .map(|h| (normalise_heading(&h.phrase), h.label))
            .filter(|(phrase, _)| !phrase.is_empty())
            .collect();
        Self { headings, max_heading_chars: config.max_heading_chars }
    }

    pub fn heading_count(&self) -> usize {
        self.headings.len()
    }

    /// Split `text` into ordered, non-overlapping sections that cover it.
    pub fn segment(&self, text: &str) -> Vec<Section> {
        let mut starts: Vec<(usize, SectionLabel)> = Vec::new();

        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            if let Some(label) = self.heading_label(line) {
                starts.push((offset, label));
            }
            offset += line.len();
        }

        match starts.first() {
            None => starts.push((0, SectionLabel::Other)),
            Some((first, _)) if *first > 0 => starts.insert(0, (0, SectionLabel::Other)),
            Some(_) => {}
        }

        starts
            .iter()
            .enumerate()
            .map(|(i, &(start, label))| {
                let end = starts.get(i + 1).map_or(text.len(), |(next, _)| *next);
                Section {
                    label,
                    start_offset: start,
                    end_offset: end,
                    text: text[start..end].to_string(),
                }
            })
            .collect()
    }

    /// Label of the heading this line carries, if any.
    fn heading_label(&self, line: &str) -> Option<SectionLabel> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.chars().count() <= self.max_heading_chars {
            if let Some(label) = self.headings.get(&normalise_heading(trimmed)) {
                return Some(*label);
            }
        }

        // Inline form: "CASE PRESENTATION: A 45-year-old..."
        let (prefix, rest) = trimmed.split_once(':')?;
        if rest.trim().is_empty() || prefix.chars().count() > self.max_heading_chars {
            return None;
        }
        self.headings.get(&normalise_heading(prefix)).copied()
    }
}

/// Lowercase, drop markdown markers, leading numbering ("2.", "2.1", "IV.")
/// and trailing punctuation, collapse whitespace.
fn normalise_heading(raw: &str) -> String {
    let stripped = raw
        .trim()
        .trim_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace())
        .trim_end_matches(|c: char| c == ':' || c == '.' || c.is_whitespace());

    let mut words = stripped.split_whitespace().peekable();
    if let Some(first) = words.peek() {
        if is_numbering(first) {
            words.next();
        }
    }

    words
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_numbering(token: &str) -> bool {
    let body = token.trim_end_matches(['.', ')']);
    if body.is_empty() {
        return false;
    }
    let numeric = body.chars().all(|c| c.is_ascii_digit() || c == '.');
    let roman = token.len() > body.len()
        && body.chars().all(|c| matches!(c.to_ascii_lowercase(), 'i' | 'v' | 'x'));
    numeric || roman
}

#[cfg(test)]
mod tests {
    use super::*;
    use methex_lexicon::LexiconStore;

    fn segmenter() -> SectionSegmenter {
        SectionSegmenter::new(&LexiconStore::embedded().headings, &SegmenterConfig::default())
    }

    fn labels(sections: &[Section]) -> Vec<SectionLabel> {
        sections.iter().map(|s| s.label).collect()
    }

    #[test]
    fn test_no_heading_is_single_other_section() {
        let text = "A 30-year-old man presented with cyanosis.";
        let sections = segmenter().segment(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, SectionLabel::Other);
        assert_eq!(sections[0].text, text);
    }

    #[test]
    fn test_empty_text() {
        let sections = segmenter().segment("");
        assert_eq!(sections.len(), 1);
        assert_eq!((sections[0].start_offset, sections[0].end_offset), (0, 0));
    }

    #[test]
    fn test_headings_open_sections() {
        let text = "Title line\nIntroduction\nBackground text.\n2. Case Presentation:\nThe case.\nDISCUSSION\nWe discuss.\n";
        let sections = segmenter().segment(text);
        assert_eq!(
            labels(&sections),
            vec![
                SectionLabel::Other,
                SectionLabel::Background,
                SectionLabel::CasePresentation,
                SectionLabel::Discussion,
            ]
        );
        assert!(sections[2].text.starts_with("2. Case Presentation:"));
    }

    #[test]
    fn test_sections_cover_text_without_overlap() {
        let text = "Abstract\nShort.\n## Case report\nBody text here.\nConclusion\nEnd.";
        let sections = segmenter().segment(text);
        assert_eq!(sections[0].start_offset, 0);
        assert_eq!(sections.last().unwrap().end_offset, text.len());
        for pair in sections.windows(2) {
            assert_eq!(pair[0].end_offset, pair[1].start_offset);
        }
        let joined: String = sections.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_inline_heading() {
        let text = "CASE PRESENTATION: A 45-year-old woman was seen.\nDiscussion: Dapsone is common.";
        let sections = segmenter().segment(text);
        assert_eq!(labels(&sections), vec![SectionLabel::CasePresentation, SectionLabel::Discussion]);
    }

    #[test]
    fn test_long_line_mentioning_heading_word_is_not_heading() {
        let text = "The discussion with the family was long and covered the prognosis in detail.";
        assert_eq!(labels(&segmenter().segment(text)), vec![SectionLabel::Other]);
    }

    #[test]
    fn test_roman_numbering_stripped() {
        assert_eq!(normalise_heading("IV. Discussion"), "discussion");
        assert_eq!(normalise_heading("**Case Report**"), "case report");
        assert_eq!(normalise_heading("Vitamin"), "vitamin");
    }
}
