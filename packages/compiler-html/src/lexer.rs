//! Lexer for pasted HTML fragments using logos
//!
//! Tags are lexed whole; attributes are split out by the fragment parser.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"<![^>]*>")] // Doctype, comments and CDATA
pub enum HtmlToken<'src> {
    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*\s*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim()
    })]
    CloseTag(&'src str),

    /// Full source of an opening tag, `<` and `>` included
    #[regex(r"<[a-zA-Z][^>]*>", |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokenize an HTML fragment. A `<` that starts no tag is kept as text.
pub fn tokenize(source: &str) -> Vec<HtmlToken<'_>> {
    let mut lexer = HtmlToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => tokens.push(HtmlToken::Text(lexer.slice())),
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_and_text() {
        let tokens = tokenize("<p class=\"a\">Hi</p>");
        assert_eq!(
            tokens,
            vec![
                HtmlToken::OpenTag("<p class=\"a\">"),
                HtmlToken::Text("Hi"),
                HtmlToken::CloseTag("p"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = tokenize("<!DOCTYPE html><!-- note --><br>");
        assert_eq!(tokens, vec![HtmlToken::OpenTag("<br>")]);
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tokens = tokenize("a < b");
        let text: String = tokens
            .iter()
            .map(|t| match t {
                HtmlToken::Text(s) => *s,
                _ => "",
            })
            .collect();
        assert_eq!(text, "a < b");
    }
}
