//! Word tokens with clause numbering, used for causal-proximity distances.

/// A word or number token. Decimals ("42.3") stay one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    /// Increments whenever the gap before this token contains `.`, `;`, `!` or `?`
    pub clause: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    tokens: Vec<Token>,
}

impl TokenIndex {
    pub fn new(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut clause = 0;
        let mut gap_has_boundary = false;
        let mut chars = text.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if !is_word_char(c) {
                if matches!(c, '.' | ';' | '!' | '?') {
                    gap_has_boundary = true;
                }
                continue;
            }

            let numeric = c.is_ascii_digit();
            let mut end = start + c.len_utf8();
            while let Some(&(idx, next)) = chars.peek() {
                if is_word_char(next) {
                    end = idx + next.len_utf8();
                    chars.next();
                    continue;
                }
                // keep the decimal point inside "42.3"
                if numeric && next == '.' && text[idx + 1..].starts_with(|d: char| d.is_ascii_digit()) {
                    end = idx + 1;
                    chars.next();
                    continue;
                }
                break;
            }

            if gap_has_boundary && !tokens.is_empty() {
                clause += 1;
            }
            gap_has_boundary = false;
            tokens.push(Token { start, end, clause });
        }

        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    /// First and last index of the tokens overlapping `[start, end)`.
    pub fn span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let first = self.tokens.partition_point(|t| t.end <= start);
        let last = self.tokens.partition_point(|t| t.start < end);
        if first < last {
            Some((first, last - 1))
        } else {
            None
        }
    }

    /// Whether tokens `a` and `b` fall in the same clause.
    pub fn same_clause(&self, a: usize, b: usize) -> bool {
        match (self.tokens.get(a), self.tokens.get(b)) {
            (Some(x), Some(y)) => x.clause == y.clause,
            _ => false,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words<'a>(text: &'a str, index: &TokenIndex) -> Vec<&'a str> {
        (0..index.len())
            .filter_map(|i| index.get(i))
            .map(|t| &text[t.start..t.end])
            .collect()
    }

    #[test]
    fn test_decimal_is_one_token() {
        let text = "MetHb was 42.3% today.";
        let index = TokenIndex::new(text);
        assert_eq!(words(text, &index), vec!["MetHb", "was", "42.3", "today"]);
        assert!(index.same_clause(0, 3));
    }

    #[test]
    fn test_sentence_ends_clause() {
        let text = "after benzocaine. Dapsone; later";
        let index = TokenIndex::new(text);
        assert!(index.same_clause(0, 1));
        assert!(!index.same_clause(1, 2));
        assert!(!index.same_clause(2, 3));
    }

    #[test]
    fn test_span_lookup() {
        let text = "due to topical benzocaine spray";
        let index = TokenIndex::new(text);
        let start = text.find("benzocaine").unwrap();
        assert_eq!(index.span(start, start + "benzocaine".len()), Some((3, 3)));
        assert_eq!(index.span(0, 6), Some((0, 1)));
        assert_eq!(index.span(text.len(), text.len()), None);
    }
}
