use crate::error::{ParseError, ParseResult, Position};
use logos::{Lexer, Logos};
use std::fmt;

/// Token kinds of the HCL native syntax.
///
/// Horizontal whitespace is not a token: it is kept in [`Token::leading`]
/// so the stream stays lossless.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t]+|\r")]
pub enum TokenKind {
    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\r\n]*")]
    #[regex(r"//[^\r\n]*")]
    #[token("/*", block_comment)]
    Comment,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[token("\"", quoted_string)]
    QuotedString,

    #[regex(r"<<-?[a-zA-Z_][a-zA-Z0-9_-]*\r?\n", heredoc)]
    Heredoc,

    // Symbols
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("=")]
    Equal,

    #[token("==")]
    EqualEqual,

    #[token("!=")]
    NotEqual,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    And,

    #[token("||")]
    Or,

    #[token("!")]
    Bang,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("?")]
    Question,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("...")]
    Ellipsis,

    #[token("=>")]
    FatArrow,

    /// End of input. Never produced by the lexer itself; appended by
    /// [`tokenize`] to carry trailing whitespace.
    Eof,
}

impl TokenKind {
    pub fn is_open_bracket(self) -> bool {
        matches!(self, TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen)
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(self, TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Newline => "newline",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::QuotedString => "string literal",
            TokenKind::Heredoc => "heredoc",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Equal => "'='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::NotEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::LessEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// A lexical token together with the whitespace in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub leading: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: String::new(),
        }
    }

    pub fn with_leading(mut self, leading: impl Into<String>) -> Self {
        self.leading = leading.into();
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Byte length of the token including its leading whitespace.
    pub fn len(&self) -> usize {
        self.leading.len() + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.text);
    }
}

/// Concatenate the exact bytes of a token sequence.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(Token::len).sum());
    for token in tokens {
        token.write_to(&mut out);
    }
    out
}

/// Split source text into a lossless token stream terminated by [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut last_end = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.map_err(|_| {
            ParseError::lexer_error(
                Position::locate(source, span.start),
                describe_invalid(&source[span.clone()]),
            )
        })?;
        tokens.push(Token {
            kind,
            text: source[span.clone()].to_string(),
            leading: source[last_end..span.start].to_string(),
        });
        last_end = span.end;
    }

    tokens.push(Token::new(TokenKind::Eof, "").with_leading(&source[last_end..]));
    Ok(tokens)
}

fn describe_invalid(slice: &str) -> String {
    if slice.starts_with('"') {
        "unterminated string literal".to_string()
    } else if slice.starts_with("/*") {
        "unterminated block comment".to_string()
    } else if slice.starts_with("<<") {
        "unterminated heredoc".to_string()
    } else {
        format!("unexpected character sequence {:?}", slice)
    }
}

fn block_comment(lex: &mut Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

fn quoted_string(lex: &mut Lexer<TokenKind>) -> bool {
    match scan_template(lex.remainder().as_bytes(), 0) {
        Some(end) => {
            lex.bump(end);
            true
        }
        None => false,
    }
}

/// Scan a template body starting just after its opening quote.
///
/// Returns the index just past the closing quote. Interpolation and
/// directive sequences may contain nested strings and braces.
fn scan_template(bytes: &[u8], mut i: usize) -> Option<usize> {
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if depth == 0 => return None,
            b'"' if depth == 0 => return Some(i + 1),
            b'"' => i = scan_template(bytes, i + 1)?,
            b'$' | b'%' if bytes.get(i + 1) == Some(&bytes[i]) && bytes.get(i + 2) == Some(&b'{') => {
                // `$${` and `%%{` are literal escapes
                i += 3;
            }
            b'$' | b'%' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
            }
            b'{' if depth > 0 => {
                depth += 1;
                i += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn heredoc(lex: &mut Lexer<TokenKind>) -> bool {
    let marker = lex
        .slice()
        .trim_start_matches("<<")
        .trim_start_matches('-')
        .trim_end();
    let marker = marker.to_string();

    let rest = lex.remainder();
    let mut line_start = 0;
    while line_start <= rest.len() {
        let line_end = rest[line_start..]
            .find('\n')
            .map(|idx| line_start + idx)
            .unwrap_or(rest.len());
        let line = rest[line_start..line_end].trim_end_matches('\r');
        if line.trim_start() == marker {
            lex.bump(line_start + line.len());
            return true;
        }
        if line_end == rest.len() {
            break;
        }
        line_start = line_end + 1;
    }
    false
}
