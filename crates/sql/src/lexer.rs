// Copyright 2026 the strataq authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::parser::{ParseError, ParseErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(String),
    Str(String),
    Star,
    Comma,
    LParen,
    RParen,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// Tokenizes `src`. `--` introduces a line comment; whitespace is skipped.
pub fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line = 1usize;
    let mut col = 1usize;

    macro_rules! advance {
        () => {{
            if chars[i] == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            i += 1;
        }};
    }

    while i < chars.len() {
        let c = chars[i];

        if c == '-' && i + 1 < chars.len() && chars[i + 1] == '-' {
            while i < chars.len() && chars[i] != '\n' {
                advance!();
            }
            continue;
        }
        if c.is_whitespace() {
            advance!();
            continue;
        }

        let (start_line, start_col) = (line, col);

        match c {
            '*' => {
                tokens.push(Token { kind: TokenKind::Star, line: start_line, col: start_col });
                advance!();
            }
            ',' => {
                tokens.push(Token { kind: TokenKind::Comma, line: start_line, col: start_col });
                advance!();
            }
            '(' => {
                tokens.push(Token { kind: TokenKind::LParen, line: start_line, col: start_col });
                advance!();
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::RParen, line: start_line, col: start_col });
                advance!();
            }
            '=' => {
                tokens.push(Token { kind: TokenKind::Eq, line: start_line, col: start_col });
                advance!();
            }
            '!' => {
                advance!();
                if i < chars.len() && chars[i] == '=' {
                    advance!();
                    tokens.push(Token { kind: TokenKind::Neq, line: start_line, col: start_col });
                } else {
                    return Err(ParseError {
                        kind: ParseErrorKind::Syntax,
                        message: "expected '=' after '!'".to_string(),
                        line: start_line,
                        col: start_col,
                    });
                }
            }
            '<' => {
                advance!();
                if i < chars.len() && chars[i] == '=' {
                    advance!();
                    tokens.push(Token { kind: TokenKind::Le, line: start_line, col: start_col });
                } else {
                    tokens.push(Token { kind: TokenKind::Lt, line: start_line, col: start_col });
                }
            }
            '>' => {
                advance!();
                if i < chars.len() && chars[i] == '=' {
                    advance!();
                    tokens.push(Token { kind: TokenKind::Ge, line: start_line, col: start_col });
                } else {
                    tokens.push(Token { kind: TokenKind::Gt, line: start_line, col: start_col });
                }
            }
            '\'' => {
                advance!();
                let mut s = String::new();
                loop {
                    if i >= chars.len() {
                        return Err(ParseError {
                            kind: ParseErrorKind::Syntax,
                            message: "unterminated string literal".to_string(),
                            line: start_line,
                            col: start_col,
                        });
                    }
                    if chars[i] == '\'' {
                        if i + 1 < chars.len() && chars[i + 1] == '\'' {
                            s.push('\'');
                            advance!();
                            advance!();
                            continue;
                        }
                        advance!();
                        break;
                    }
                    s.push(chars[i]);
                    advance!();
                }
                tokens.push(Token { kind: TokenKind::Str(s), line: start_line, col: start_col });
            }
            c if c.is_ascii_digit() => {
                let mut s = String::new();
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    s.push(chars[i]);
                    advance!();
                }
                tokens.push(Token { kind: TokenKind::Number(s), line: start_line, col: start_col });
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut s = String::new();
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                    s.push(chars[i]);
                    advance!();
                }
                tokens.push(Token { kind: TokenKind::Ident(s), line: start_line, col: start_col });
            }
            other => {
                return Err(ParseError {
                    kind: ParseErrorKind::Syntax,
                    message: format!("unexpected character '{other}'"),
                    line: start_line,
                    col: start_col,
                });
            }
        }
    }

    tokens.push(Token { kind: TokenKind::Eof, line, col });
    Ok(tokens)
}
