//! Message text tokenizer.
//!
//! Splits raw message content into plain text, inline code and fenced code
//! blocks for rendering. Tokenizing never fails: any input, however
//! malformed, degrades to plain text, and the produced spans partition the
//! input exactly (see [`tokenize_with_source`]).
//!
//! # Rules
//!
//! Scanning runs left to right. At each backtick:
//!
//! - A run of three or more backticks opens a fence. The fence closes at the
//!   next triple backtick. If no closing fence exists, the whole run is plain
//!   text and scanning continues after it.
//! - A single backtick followed by one or more non-backtick characters and
//!   another backtick is inline code. Line breaks may appear inside.
//! - Anything else is plain text.
//!
//! Inside a fence, a first line made of a single token without whitespace
//! or backticks is the language tag (empty means no language). If the inner
//! text has no such first line, all of it is code.

const FENCE: &str = "```";

/// A rendered piece of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    /// Literal text.
    Plain(&'a str),
    /// Inline code with its backticks stripped.
    InlineCode(&'a str),
    /// Fenced code block with its fences and language line stripped.
    FencedCode {
        /// Language tag, if present and non-empty.
        language: Option<&'a str>,
        /// Code between the language line and the closing fence.
        code: &'a str,
    },
}

impl<'a> Span<'a> {
    /// True for inline and fenced code.
    pub fn is_code(&self) -> bool {
        !matches!(self, Span::Plain(_))
    }

    /// Displayed text, without markers or language tag.
    pub fn text(&self) -> &'a str {
        match *self {
            Span::Plain(text) | Span::InlineCode(text) => text,
            Span::FencedCode { code, .. } => code,
        }
    }
}

/// A span together with the exact source slice it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Parsed span.
    pub span: Span<'a>,
    /// Source text including markers.
    pub source: &'a str,
}

/// Split `content` into spans.
pub fn tokenize(content: &str) -> Vec<Span<'_>> {
    tokenize_with_source(content).into_iter().map(|token| token.span).collect()
}

/// Split `content` into spans, keeping the source slice of each.
///
/// Concatenating every `source` in order yields `content`. No token has an
/// empty source and no two `Plain` spans are adjacent.
pub fn tokenize_with_source(content: &str) -> Vec<Token<'_>> {
    let bytes = content.as_bytes();
    let mut tokens = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = content[cursor..].find('`') {
        let start = cursor + offset;
        let run = bytes[start..].iter().take_while(|&&b| b == b'`').count();

        let matched = if run >= FENCE.len() {
            fenced_at(content, start)
        } else {
            inline_at(content, start)
        };

        match matched {
            Some((span, end)) => {
                flush_plain(content, plain_start, start, &mut tokens);
                tokens.push(Token { span, source: &content[start..end] });
                plain_start = end;
                cursor = end;
            },
            // Unclosed fence markers never seed an inline span
            None if run >= FENCE.len() => cursor = start + run,
            None => cursor = start + 1,
        }
    }

    flush_plain(content, plain_start, content.len(), &mut tokens);
    tokens
}

/// Fenced block opening at `start`. Returns the span and the end offset.
fn fenced_at(content: &str, start: usize) -> Option<(Span<'_>, usize)> {
    let inner_start = start + FENCE.len();
    let inner_len = content[inner_start..].find(FENCE)?;
    let inner = &content[inner_start..inner_start + inner_len];
    let (language, code) = split_language(inner);

    Some((Span::FencedCode { language, code }, inner_start + inner_len + FENCE.len()))
}

/// Inline span opening at `start`. Returns the span and the end offset.
fn inline_at(content: &str, start: usize) -> Option<(Span<'_>, usize)> {
    let text_start = start + 1;
    let text_len = content[text_start..].find('`')?;
    if text_len == 0 {
        return None;
    }

    Some((Span::InlineCode(&content[text_start..text_start + text_len]), text_start + text_len + 1))
}

fn split_language(inner: &str) -> (Option<&str>, &str) {
    let Some(newline) = inner.find('\n') else {
        return (None, inner);
    };

    let line = &inner[..newline];
    let tag = line.strip_suffix('\r').unwrap_or(line);
    if tag.chars().any(|c| c.is_whitespace() || c == '`') {
        return (None, inner);
    }

    let language = if tag.is_empty() { None } else { Some(tag) };
    (language, &inner[newline + 1..])
}

fn flush_plain<'a>(content: &'a str, start: usize, end: usize, tokens: &mut Vec<Token<'a>>) {
    if start < end {
        let text = &content[start..end];
        tokens.push(Token { span: Span::Plain(text), source: text });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_with_language() {
        assert_eq!(tokenize("```js\nconst x=1;\n```"), vec![Span::FencedCode {
            language: Some("js"),
            code: "const x=1;\n"
        }]);
    }

    #[test]
    fn inline_code_between_plain() {
        assert_eq!(tokenize("run `foo()` now"), vec![
            Span::Plain("run "),
            Span::InlineCode("foo()"),
            Span::Plain(" now"),
        ]);
    }

    #[test]
    fn unterminated_inline_is_plain() {
        assert_eq!(tokenize("a `b"), vec![Span::Plain("a `b")]);
    }

    #[test]
    fn empty_input_has_no_spans() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn empty_language_is_absent() {
        assert_eq!(tokenize("```\nx\n```"), vec![Span::FencedCode { language: None, code: "x\n" }]);
    }

    #[test]
    fn crlf_after_language() {
        assert_eq!(tokenize("```rs\r\nfn f() {}\r\n```"), vec![Span::FencedCode {
            language: Some("rs"),
            code: "fn f() {}\r\n"
        }]);
    }

    #[test]
    fn fence_without_line_break_is_all_code() {
        assert_eq!(tokenize("```print(1)```"), vec![Span::FencedCode {
            language: None,
            code: "print(1)"
        }]);
    }

    #[test]
    fn first_line_with_spaces_is_code() {
        assert_eq!(tokenize("```let x = 1;\ny\n```"), vec![Span::FencedCode {
            language: None,
            code: "let x = 1;\ny\n"
        }]);
    }

    #[test]
    fn fence_wins_over_inline() {
        let spans = tokenize("see\n```py\n`x`\n```\ndone");
        assert_eq!(spans, vec![
            Span::Plain("see\n"),
            Span::FencedCode { language: Some("py"), code: "`x`\n" },
            Span::Plain("\ndone"),
        ]);
    }

    #[test]
    fn shortest_fence_closes() {
        let spans = tokenize("```a``` and ```b```");
        assert_eq!(spans, vec![
            Span::FencedCode { language: None, code: "a" },
            Span::Plain(" and "),
            Span::FencedCode { language: None, code: "b" },
        ]);
    }

    #[test]
    fn unclosed_fence_stays_plain() {
        assert_eq!(tokenize("```js\nno end `x"), vec![Span::Plain("```js\nno end `x")]);
        assert_eq!(tokenize("````x`"), vec![Span::Plain("````x`")]);
    }

    #[test]
    fn double_backtick_falls_back_to_inline() {
        assert_eq!(tokenize("``x`"), vec![Span::Plain("`"), Span::InlineCode("x")]);
    }

    #[test]
    fn inline_spans_line_breaks() {
        assert_eq!(tokenize("`a\nb`"), vec![Span::InlineCode("a\nb")]);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let input = "héllo `wörld` ✓";
        let tokens = tokenize_with_source(input);
        let rebuilt: String = tokens.iter().map(|t| t.source).collect();
        assert_eq!(rebuilt, input);
        assert_eq!(tokens[1].span, Span::InlineCode("wörld"));
    }

    #[test]
    fn span_helpers() {
        let fenced = Span::FencedCode { language: Some("js"), code: "x" };
        assert!(fenced.is_code());
        assert_eq!(fenced.text(), "x");
        assert!(!Span::Plain("p").is_code());
        assert_eq!(Span::InlineCode("c").text(), "c");
    }
}
