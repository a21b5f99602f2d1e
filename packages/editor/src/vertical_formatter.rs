//! # Vertical Formatter
//!
//! Normalizes blank lines in a token stream without touching anything on a
//! line: leading newlines are dropped and runs of newlines are capped so at
//! most one blank line separates content.

use hcledit_parser::{Token, TokenKind};

/// Longest run of newline tokens kept; two newlines make one blank line.
pub const MAX_CONSECUTIVE_NEWLINES: usize = 2;

pub fn vertical_format(tokens: Vec<Token>) -> Vec<Token> {
    remove_duplicated_newlines(trim_leading_newlines(tokens))
}

/// Drop newline tokens at the very start of the stream.
pub fn trim_leading_newlines(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .skip_while(|token| token.is(TokenKind::Newline))
        .collect()
}

/// Drop every newline past the [`MAX_CONSECUTIVE_NEWLINES`]th in a row.
pub fn remove_duplicated_newlines(tokens: Vec<Token>) -> Vec<Token> {
    // state: newlines seen since the last other token
    let mut newlines = 0usize;
    let mut out = Vec::with_capacity(tokens.len());

    for token in tokens {
        if token.is(TokenKind::Newline) {
            if newlines == MAX_CONSECUTIVE_NEWLINES {
                continue;
            }
            newlines += 1;
        } else {
            newlines = 0;
        }
        out.push(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcledit_parser::{render, tokenize};
    use proptest::prelude::*;

    fn format_source(source: &str) -> String {
        render(&vertical_format(tokenize(source).unwrap()))
    }

    #[test]
    fn test_trims_leading_newlines() {
        assert_eq!(format_source("\n\n\na = 1\n"), "a = 1\n");
    }

    #[test]
    fn test_collapses_blank_line_runs() {
        assert_eq!(format_source("a = 1\n\n\n\nb = 2\n"), "a = 1\n\nb = 2\n");
    }

    #[test]
    fn test_single_blank_lines_untouched() {
        let source = "a = 1\n\nb {\n  c = 2\n}\n";
        assert_eq!(format_source(source), source);
    }

    #[test]
    fn test_trailing_newlines_are_collapsed_not_trimmed() {
        assert_eq!(format_source("a = 1\n\n\n"), "a = 1\n\n");
    }

    #[test]
    fn test_horizontal_whitespace_untouched() {
        let source = "a   =  1 # c\n\n\n\n  b =2\n";
        assert_eq!(format_source(source), "a   =  1 # c\n\n  b =2\n");
    }

    #[test]
    fn test_comments_reset_the_run() {
        assert_eq!(format_source("# a\n\n# b\n\n\n"), "# a\n\n# b\n\n");
    }

    fn token() -> impl Strategy<Value = Token> {
        prop_oneof![
            3 => Just(Token::new(TokenKind::Newline, "\n")),
            1 => "[a-z]{1,3}".prop_map(|text| Token::new(TokenKind::Ident, text)),
            1 => Just(Token::new(TokenKind::Comment, "# c").with_leading(" ")),
        ]
    }

    fn newline_runs(tokens: &[Token]) -> impl Iterator<Item = usize> + '_ {
        tokens
            .split(|token| !token.is(TokenKind::Newline))
            .map(|run| run.len())
    }

    proptest! {
        #[test]
        fn prop_idempotent(tokens in prop::collection::vec(token(), 0..40)) {
            let once = vertical_format(tokens);
            let twice = vertical_format(once.clone());
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_blank_line_bound(tokens in prop::collection::vec(token(), 0..40)) {
            let formatted = vertical_format(tokens);
            prop_assert!(!formatted.first().is_some_and(|t| t.is(TokenKind::Newline)));
            prop_assert!(newline_runs(&formatted).all(|len| len <= MAX_CONSECUTIVE_NEWLINES));
        }

        #[test]
        fn prop_other_tokens_kept_in_order(tokens in prop::collection::vec(token(), 0..40)) {
            let others = |tokens: &[Token]| -> Vec<Token> {
                tokens.iter().filter(|t| !t.is(TokenKind::Newline)).cloned().collect()
            };
            let before = others(&tokens);
            let formatted = vertical_format(tokens);
            prop_assert_eq!(others(&formatted), before);
        }
    }
}
