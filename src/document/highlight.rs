//! Syntax scopes for code lines
//!
//! Code is run through syntect's bundled grammars and each run of text is
//! tagged with a coarse token kind derived from its scope stack. Parse state
//! carries across the lines of one block, so multi-line comments and strings
//! stay classified. Languages without a grammar produce plain tokens.

use std::sync::LazyLock;

use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};

use super::types::{CodeToken, TokenKind};

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Grammar lookup token for a fence language
fn grammar_token(language: &str) -> &str {
    match language {
        "ts" | "typescript" | "tsx" | "jsx" | "javascript" => "js",
        "shell" | "console" | "terminal" | "zsh" | "bash" => "sh",
        "python" => "py",
        "yml" => "yaml",
        "csharp" => "cs",
        "markdown" => "md",
        other => other,
    }
}

/// Line-by-line tokenizer for one code block
pub(crate) struct Highlighter {
    state: Option<(ParseState, ScopeStack)>,
}

impl Highlighter {
    pub(crate) fn new(language: &str) -> Self {
        let state = SYNTAXES
            .find_syntax_by_token(grammar_token(language))
            .map(|syntax| (ParseState::new(syntax), ScopeStack::new()));
        Self { state }
    }

    /// Tokens for the next line. Concatenated token text equals `text`.
    pub(crate) fn line(&mut self, text: &str) -> Vec<CodeToken> {
        let Some((state, stack)) = &mut self.state else {
            return vec![CodeToken::plain(text)];
        };

        // Grammars are loaded for newline-terminated input
        let input = format!("{}\n", text);
        let ops = match state.parse_line(&input, &SYNTAXES) {
            Ok(ops) => ops,
            Err(e) => {
                tracing::debug!("Highlighting stopped: {}", e);
                self.state = None;
                return vec![CodeToken::plain(text)];
            }
        };

        let mut tokens = Vec::new();
        let mut last = 0;
        for (offset, op) in ops {
            let offset = offset.min(text.len());
            if offset > last {
                push_token(&mut tokens, classify(stack), &text[last..offset]);
                last = offset;
            }
            if let Err(e) = stack.apply(&op) {
                tracing::debug!("Ignoring scope operation: {:?}", e);
            }
        }
        if last < text.len() {
            push_token(&mut tokens, classify(stack), &text[last..]);
        }

        tokens
    }

    /// Feed a line whose tokens are not shown, keeping parse state in step
    pub(crate) fn advance(&mut self, text: &str) {
        self.line(text);
    }
}

fn push_token(tokens: &mut Vec<CodeToken>, kind: TokenKind, text: &str) {
    match tokens.last_mut() {
        Some(last) if last.kind == kind => last.text.push_str(text),
        _ => tokens.push(CodeToken {
            kind,
            text: text.to_string(),
        }),
    }
}

/// Token kind for the scope stack at the current position
fn classify(stack: &ScopeStack) -> TokenKind {
    let scopes: Vec<String> = stack.as_slice().iter().map(|s| s.build_string()).collect();

    // Delimiters inside comments and strings belong to them
    if scopes.iter().any(|s| s.starts_with("comment")) {
        return TokenKind::Comment;
    }
    if scopes.iter().any(|s| s.starts_with("string")) {
        return TokenKind::String;
    }

    scopes
        .iter()
        .rev()
        .find_map(|s| scope_kind(s))
        .unwrap_or(TokenKind::Plain)
}

fn scope_kind(scope: &str) -> Option<TokenKind> {
    let kind = if scope.starts_with("constant.numeric") {
        TokenKind::Number
    } else if scope.starts_with("constant") {
        TokenKind::Constant
    } else if scope.starts_with("keyword.operator") {
        TokenKind::Operator
    } else if scope.starts_with("keyword") || scope.starts_with("storage") {
        TokenKind::Keyword
    } else if scope.starts_with("entity.name.function")
        || scope.starts_with("support.function")
        || scope.starts_with("variable.function")
    {
        TokenKind::Function
    } else if scope.starts_with("entity.name")
        || scope.starts_with("support.type")
        || scope.starts_with("support.class")
    {
        TokenKind::Type
    } else if scope.starts_with("punctuation") {
        TokenKind::Punctuation
    } else {
        return None;
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(tokens: &[CodeToken]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn has(tokens: &[CodeToken], kind: TokenKind, text: &str) -> bool {
        tokens.iter().any(|t| t.kind == kind && t.text.contains(text))
    }

    #[test]
    fn test_rust_line() {
        let line = "let x = 42; // note";
        let tokens = Highlighter::new("rust").line(line);

        assert_eq!(joined(&tokens), line);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Keyword && t.text.trim() == "let"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Number && t.text.trim() == "42"));
        assert!(has(&tokens, TokenKind::Comment, "note"));
    }

    #[test]
    fn test_typescript_uses_javascript_grammar() {
        let line = "const s = \"hi\";";
        let tokens = Highlighter::new("ts").line(line);

        assert_eq!(joined(&tokens), line);
        assert!(has(&tokens, TokenKind::String, "hi"));
        assert!(has(&tokens, TokenKind::Keyword, "const"));
    }

    #[test]
    fn test_state_carries_across_lines() {
        let mut highlighter = Highlighter::new("rust");
        highlighter.line("/* start");
        highlighter.advance("");

        let tokens = highlighter.line("still comment");
        assert_eq!(tokens, vec![CodeToken { kind: TokenKind::Comment, text: "still comment".to_string() }]);
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let tokens = Highlighter::new("text").line("just words");
        assert_eq!(tokens, vec![CodeToken::plain("just words")]);

        let tokens = Highlighter::new("no-such-language").line("x = 1");
        assert_eq!(tokens, vec![CodeToken::plain("x = 1")]);
    }
}
