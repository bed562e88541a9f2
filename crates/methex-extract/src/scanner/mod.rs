//! Candidate Scanner: per field, every rule hit in every section.
//!
//! All candidates are kept for scoring. Hits of the same field at the same
//! site are collapsed by the matcher (longest, then most specific). Numeric
//! values outside the configured bounds are dropped here.

mod value;

use tracing::debug;

use methex_common::{BoundsConfig, FieldType};
use methex_lexicon::{CompiledRules, LexiconStore, Rule, RuleMatch};

use crate::candidate::{Candidate, FieldValue, Mention};
use crate::segmenter::Section;

/// Location of a causal-relation phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CausalSpan {
    pub start: usize,
    pub end: usize,
    pub section_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub candidates: Vec<Candidate>,
    pub symptoms: Vec<Mention>,
    pub routes: Vec<Mention>,
    /// Values in minutes
    pub times: Vec<Mention>,
    pub causal: Vec<CausalSpan>,
}

pub struct CandidateScanner {
    fields: Vec<(FieldType, CompiledRules)>,
    symptoms: CompiledRules,
    routes: CompiledRules,
    times: CompiledRules,
    causal: CompiledRules,
    bounds: BoundsConfig,
}

impl CandidateScanner {
    pub fn new(lexicon: &LexiconStore, bounds: BoundsConfig) -> methex_lexicon::Result<Self> {
        let fields = FieldType::ALL
            .iter()
            .map(|&field| Ok((field, CompiledRules::compile(lexicon.rules_for(field).to_vec())?)))
            .collect::<methex_lexicon::Result<Vec<_>>>()?;

        let causal_rules = lexicon
            .causal_phrases
            .iter()
            .map(|p| Rule::phrase(p, p, 1.0))
            .collect();

        Ok(Self {
            fields,
            symptoms: CompiledRules::compile(lexicon.symptoms.clone())?,
            routes: CompiledRules::compile(lexicon.routes.clone())?,
            times: CompiledRules::compile(lexicon.time_to_improvement.clone())?,
            causal: CompiledRules::compile(causal_rules)?,
            bounds,
        })
    }

    /// Total compiled rules, causal phrases included.
    pub fn rule_count(&self) -> usize {
        self.fields.iter().map(|(_, r)| r.len()).sum::<usize>()
            + self.symptoms.len()
            + self.routes.len()
            + self.times.len()
            + self.causal.len()
    }

    pub fn scan(&self, sections: &[Section]) -> ScanOutput {
        let mut out = ScanOutput::default();

        for (index, section) in sections.iter().enumerate() {
            for (field, rules) in &self.fields {
                for m in rules.find_all(&section.text) {
                    if let Some(candidate) = self.candidate(*field, rules, &m, index, section) {
                        out.candidates.push(candidate);
                    }
                }
            }

            out.symptoms.extend(label_mentions(&self.symptoms, index, section));
            out.routes.extend(label_mentions(&self.routes, index, section));

            for m in self.times.find_all(&section.text) {
                let rule = self.times.rule(m.rule);
                let Some(minutes) = m
                    .value
                    .and_then(|(s, e)| value::parse_numeric(&section.text[s..e], rule.multiplier, false))
                else {
                    continue;
                };
                out.times.push(mention(FieldValue::Number(minutes), &m, index, section));
            }

            out.causal.extend(self.causal.find_all(&section.text).into_iter().map(|m| CausalSpan {
                start: section.start_offset + m.start,
                end: section.start_offset + m.end,
                section_index: index,
            }));
        }

        out
    }

    fn candidate(
        &self,
        field: FieldType,
        rules: &CompiledRules,
        m: &RuleMatch,
        section_index: usize,
        section: &Section,
    ) -> Option<Candidate> {
        let rule = rules.rule(m.rule);
        let raw_value = section.text[m.start..m.end].to_string();

        let normalized_value = if field.is_numeric() {
            let Some((s, e)) = m.value else {
                debug!(%field, raw = %raw_value, "discarding candidate without a captured value");
                return None;
            };
            let whole_years = field == FieldType::Age;
            let Some(number) = value::parse_numeric(&section.text[s..e], rule.multiplier, whole_years) else {
                debug!(%field, raw = %raw_value, "discarding unparseable candidate");
                return None;
            };
            if let Some(bounds) = self.bounds.for_field(field) {
                if !bounds.contains(number) {
                    debug!(%field, value = number, min = bounds.min, max = bounds.max,
                        "discarding out-of-range candidate");
                    return None;
                }
            }
            FieldValue::Number(number)
        } else {
            FieldValue::Label(rule.label.clone()?)
        };

        Some(Candidate {
            field_type: field,
            raw_value,
            normalized_value,
            section_label: section.label,
            section_index,
            offset: section.start_offset + m.start,
            end_offset: section.start_offset + m.end,
            pattern_specificity: m.specificity,
        })
    }
}

fn label_mentions(rules: &CompiledRules, section_index: usize, section: &Section) -> Vec<Mention> {
    rules
        .find_all(&section.text)
        .into_iter()
        .filter_map(|m| {
            let label = rules.rule(m.rule).label.clone()?;
            Some(mention(FieldValue::Label(label), &m, section_index, section))
        })
        .collect()
}

fn mention(value: FieldValue, m: &RuleMatch, section_index: usize, section: &Section) -> Mention {
    Mention {
        value,
        section_label: section.label,
        section_index,
        offset: section.start_offset + m.start,
        end_offset: section.start_offset + m.end,
        specificity: m.specificity,
    }
}
