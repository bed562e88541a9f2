//! Compiled rule matching.
//!
//! Phrase rules go into a single Aho-Corasick automaton
//! (`MatchKind::LeftmostLongest`, ASCII case-insensitive) so "methylene blue"
//! wins over "blue" at the same position. Regex rules are run one by one.
//! Both kinds feed the same overlap collapse.

use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;

use crate::rules::{Rule, RuleKind};
use crate::Result;

/// A single rule hit, offsets relative to the scanned text.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Index of the rule in its [`CompiledRules`]
    pub rule: usize,
    pub start: usize,
    pub end: usize,
    /// Span of capture group 1, for numeric rules
    pub value: Option<(usize, usize)>,
    pub specificity: f64,
}

impl RuleMatch {
    /// The span that identifies "the same site": the captured value if there
    /// is one, the whole match otherwise.
    pub fn site(&self) -> (usize, usize) {
        self.value.unwrap_or((self.start, self.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A rule list ready for matching.
pub struct CompiledRules {
    rules: Vec<Rule>,
    automaton: Option<AhoCorasick>,
    /// automaton pattern index -> rule index
    phrase_index: Vec<usize>,
    regexes: Vec<(usize, Regex)>,
    /// rule index -> compiled `exclude` pattern
    excludes: Vec<Option<Regex>>,
}

impl std::fmt::Debug for CompiledRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRules")
            .field("phrases", &self.phrase_index.len())
            .field("regexes", &self.regexes.len())
            .finish()
    }
}

impl CompiledRules {
    pub fn compile(rules: Vec<Rule>) -> Result<Self> {
        let mut phrases: Vec<&str> = Vec::new();
        let mut phrase_index = Vec::new();
        let mut regexes = Vec::new();
        let mut excludes = Vec::with_capacity(rules.len());

        for (idx, rule) in rules.iter().enumerate() {
            rule.validate()?;
            excludes.push(rule.exclude.as_deref().map(Regex::new).transpose()?);
            match rule.kind {
                RuleKind::Phrase => {
                    phrases.push(rule.pattern.as_str());
                    phrase_index.push(idx);
                }
                RuleKind::Regex => regexes.push((idx, Regex::new(&rule.pattern)?)),
            }
        }

        let automaton = if phrases.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostLongest)
                    .ascii_case_insensitive(true)
                    .build(&phrases)?,
            )
        };

        Ok(Self { rules, automaton, phrase_index, regexes, excludes })
    }

    pub fn rule(&self, idx: usize) -> &Rule {
        &self.rules[idx]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All hits in `text`, overlapping hits at the same site collapsed.
    /// Output is ordered by site start.
    pub fn find_all(&self, text: &str) -> Vec<RuleMatch> {
        let mut matches = Vec::new();

        if let Some(automaton) = &self.automaton {
            for mat in automaton.find_iter(text) {
                if !is_word_bounded(text, mat.start(), mat.end()) {
                    continue;
                }
                let rule = self.phrase_index[mat.pattern().as_usize()];
                if self.is_excluded(rule, &text[mat.start()..mat.end()]) {
                    continue;
                }
                matches.push(RuleMatch {
                    rule,
                    start: mat.start(),
                    end: mat.end(),
                    value: None,
                    specificity: self.rules[rule].specificity,
                });
            }
        }

        for (rule, re) in &self.regexes {
            for caps in re.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if whole.as_str().is_empty() || self.is_excluded(*rule, whole.as_str()) {
                    continue;
                }
                matches.push(RuleMatch {
                    rule: *rule,
                    start: whole.start(),
                    end: whole.end(),
                    value: caps.get(1).map(|m| (m.start(), m.end())),
                    specificity: self.rules[*rule].specificity,
                });
            }
        }

        collapse_overlapping(matches)
    }

    fn is_excluded(&self, rule: usize, matched: &str) -> bool {
        self.excludes
            .get(rule)
            .and_then(Option::as_ref)
            .is_some_and(|re| re.is_match(matched))
    }
}

/// Collapse overlapping hits to one per site: longest match first, then the
/// more specific rule, then the earlier rule.
pub fn collapse_overlapping(mut matches: Vec<RuleMatch>) -> Vec<RuleMatch> {
    if matches.is_empty() {
        return matches;
    }

    matches.sort_by(|a, b| {
        a.site().0.cmp(&b.site().0)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| b.specificity.total_cmp(&a.specificity))
            .then_with(|| a.rule.cmp(&b.rule))
    });

    let mut result = Vec::with_capacity(matches.len());
    let mut last_end = 0;

    for m in matches {
        let (start, end) = m.site();
        if start >= last_end {
            last_end = end;
            result.push(m);
        }
    }

    result
}

/// Phrase hits must not start or end inside a word. A trailing plural "s" is
/// tolerated ("nitrates" for "nitrate").
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    if before.is_some_and(|c| c.is_alphanumeric()) {
        return false;
    }

    let mut after = match text.get(end..) {
        Some(rest) => rest.chars(),
        None => return false,
    };
    match after.next() {
        None => true,
        Some('s') | Some('S') => after.next().map_or(true, |c| !c.is_alphanumeric()),
        Some(c) => !c.is_alphanumeric(),
    }
}
