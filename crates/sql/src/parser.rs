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

use thiserror::Error;

use crate::ast::{AggArg, AggCall, AggFunc, CmpOp, Expr, Literal, OrderItem, SelectItem, SelectStmt};
use crate::lexer::{lex, Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    Syntax,
    UnsupportedFeature,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind:?} error at line {line}, column {col}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub col: usize,
}

type Result<T> = std::result::Result<T, ParseError>;

pub fn parse(sql: &str) -> Result<SelectStmt> {
    let tokens = lex(sql)?;
    let mut parser = Parser { tokens, pos: 0 };
    let stmt = parser.parse_select()?;
    parser.expect_eof()?;
    Ok(stmt)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        let tok = self.peek();
        ParseError { kind, message: message.into(), line: tok.line, col: tok.col }
    }

    fn syntax_err(&self, message: impl Into<String>) -> ParseError {
        self.err(ParseErrorKind::Syntax, message)
    }

    fn peek_ident_upper(&self) -> Option<String> {
        match &self.peek().kind {
            TokenKind::Ident(s) => Some(s.to_ascii_uppercase()),
            _ => None,
        }
    }

    /// Consumes the next token if it is the identifier `kw` (case-insensitive).
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.peek_ident_upper().as_deref() == Some(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.syntax_err(format!("expected keyword {kw}")))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.advance().kind {
            TokenKind::Ident(s) => Ok(s),
            other => Err(self.syntax_err(format!("expected identifier, found {other:?}"))),
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        if matches!(self.peek().kind, TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.syntax_err("unexpected trailing input"))
        }
    }

    fn is_keyword_boundary(&self) -> bool {
        matches!(
            self.peek_ident_upper().as_deref(),
            Some("FROM" | "WHERE" | "GROUP" | "ORDER" | "LIMIT" | "AND" | "OR" | "AS")
        ) || matches!(self.peek().kind, TokenKind::Eof)
    }

    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.expect_keyword("SELECT")?;
        let select_list = self.parse_select_list()?;
        self.expect_keyword("FROM")?;
        let table = self.expect_ident()?;

        let selection = if self.eat_keyword("WHERE") {
            Some(self.parse_or()?)
        } else {
            None
        };

        let group_by = if self.eat_keyword("GROUP") {
            self.expect_keyword("BY")?;
            self.parse_ident_list()?
        } else {
            Vec::new()
        };

        let order_by = if self.eat_keyword("ORDER") {
            self.expect_keyword("BY")?;
            self.parse_order_list()?
        } else {
            Vec::new()
        };

        let limit = if self.eat_keyword("LIMIT") {
            Some(self.parse_unsigned_integer()?)
        } else {
            None
        };

        Ok(SelectStmt {
            select_list,
            table,
            selection,
            group_by,
            order_by,
            limit,
        })
    }

    fn parse_select_list(&mut self) -> Result<Vec<SelectItem>> {
        if matches!(self.peek().kind, TokenKind::Star) {
            self.advance();
            return Ok(vec![SelectItem::Wildcard]);
        }
        if self.is_keyword_boundary() {
            return Err(self.syntax_err("empty select list"));
        }

        let mut items = Vec::new();
        loop {
            items.push(self.parse_select_item()?);
            if matches!(self.peek().kind, TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        if let Some(func) = self.peek_agg_func() {
            self.advance();
            if !matches!(self.peek().kind, TokenKind::LParen) {
                return Err(self.syntax_err("expected '(' after aggregate function"));
            }
            self.advance();
            let arg = if matches!(self.peek().kind, TokenKind::Star) {
                self.advance();
                AggArg::Star
            } else {
                AggArg::Column(self.expect_ident()?)
            };
            if !matches!(self.peek().kind, TokenKind::RParen) {
                return Err(self.syntax_err("expected ')' to close aggregate call"));
            }
            self.advance();
            if arg == AggArg::Star && func != AggFunc::Count {
                return Err(self.err(
                    ParseErrorKind::UnsupportedFeature,
                    format!("{}(*) is not supported", func.name()),
                ));
            }
            let call = AggCall { func, arg };
            let alias = self.parse_optional_alias()?;
            return Ok(SelectItem::Aggregate { call, alias });
        }

        let name = self.expect_ident()?;
        let alias = self.parse_optional_alias()?;
        Ok(SelectItem::Column { name, alias })
    }

    fn peek_agg_func(&self) -> Option<AggFunc> {
        match self.peek_ident_upper().as_deref() {
            Some("COUNT") => Some(AggFunc::Count),
            Some("SUM") => Some(AggFunc::Sum),
            Some("AVG") => Some(AggFunc::Avg),
            Some("MIN") => Some(AggFunc::Min),
            Some("MAX") => Some(AggFunc::Max),
            _ => None,
        }
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>> {
        if self.eat_keyword("AS") {
            Ok(Some(self.expect_ident()?))
        } else {
            Ok(None)
        }
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut items = vec![self.expect_ident()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            items.push(self.expect_ident()?);
        }
        Ok(items)
    }

    fn parse_order_list(&mut self) -> Result<Vec<OrderItem>> {
        let mut items = vec![self.parse_order_item()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            items.push(self.parse_order_item()?);
        }
        Ok(items)
    }

    fn parse_order_item(&mut self) -> Result<OrderItem> {
        let column = self.expect_ident()?;
        let desc = if self.eat_keyword("DESC") {
            true
        } else {
            self.eat_keyword("ASC");
            false
        };
        Ok(OrderItem { column, desc })
    }

    fn parse_unsigned_integer(&mut self) -> Result<u64> {
        match self.advance().kind {
            TokenKind::Number(s) if !s.contains('.') => s
                .parse::<u64>()
                .map_err(|_| self.syntax_err(format!("invalid integer literal '{s}'"))),
            other => Err(self.syntax_err(format!("expected integer literal, found {other:?}"))),
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("OR") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_predicate()?;
        while self.eat_keyword("AND") {
            let right = self.parse_predicate()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_predicate(&mut self) -> Result<Expr> {
        if matches!(self.peek().kind, TokenKind::LParen) {
            self.advance();
            let inner = self.parse_or()?;
            if !matches!(self.peek().kind, TokenKind::RParen) {
                return Err(self.syntax_err("expected ')'"));
            }
            self.advance();
            return Ok(inner);
        }

        let left = self.parse_atom()?;

        if let Some(op) = self.peek_cmp_op() {
            self.advance();
            let right = self.parse_atom()?;
            return Ok(Expr::Cmp { op, left: Box::new(left), right: Box::new(right) });
        }

        if self.eat_keyword("IN") {
            if !matches!(self.peek().kind, TokenKind::LParen) {
                return Err(self.syntax_err("expected '(' after IN"));
            }
            self.advance();
            let mut list = vec![self.parse_literal()?];
            while matches!(self.peek().kind, TokenKind::Comma) {
                self.advance();
                list.push(self.parse_literal()?);
            }
            if !matches!(self.peek().kind, TokenKind::RParen) {
                return Err(self.syntax_err("expected ')' to close IN list"));
            }
            self.advance();
            return Ok(Expr::In { expr: Box::new(left), list });
        }

        if self.eat_keyword("BETWEEN") {
            let low = self.parse_atom()?;
            self.expect_keyword("AND")?;
            let high = self.parse_atom()?;
            return Ok(Expr::Between {
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            });
        }

        if self.eat_keyword("LIKE") {
            let pattern = match self.advance().kind {
                TokenKind::Str(s) => s,
                other => return Err(self.syntax_err(format!("expected string after LIKE, found {other:?}"))),
            };
            let prefix = self.require_prefix_pattern(&pattern)?;
            return Ok(Expr::Like { expr: Box::new(left), prefix });
        }

        Err(self.syntax_err("expected comparison operator, IN, BETWEEN, or LIKE"))
    }

    /// Only `'prefix%'` patterns are supported (a single trailing `%`, no
    /// other wildcard anywhere). Anything else is an unsupported feature.
    fn require_prefix_pattern(&self, pattern: &str) -> Result<String> {
        let wildcard_count = pattern.matches('%').count();
        let underscore_count = pattern.matches('_').count();
        if wildcard_count == 1 && underscore_count == 0 && pattern.ends_with('%') {
            Ok(pattern.trim_end_matches('%').to_string())
        } else {
            Err(self.err(
                ParseErrorKind::UnsupportedFeature,
                format!("LIKE pattern '{pattern}' is not a supported prefix-only pattern"),
            ))
        }
    }

    fn peek_cmp_op(&self) -> Option<CmpOp> {
        match self.peek().kind {
            TokenKind::Eq => Some(CmpOp::Eq),
            TokenKind::Neq => Some(CmpOp::Ne),
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::Le => Some(CmpOp::Le),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::Ge => Some(CmpOp::Ge),
            _ => None,
        }
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match &self.peek().kind {
            TokenKind::Ident(_) => Ok(Expr::Column(self.expect_ident()?)),
            TokenKind::Number(_) | TokenKind::Str(_) => Ok(Expr::Literal(self.parse_literal()?)),
            other => Err(self.syntax_err(format!("expected column or literal, found {other:?}"))),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        match self.advance().kind {
            TokenKind::Number(s) => {
                if s.contains('.') {
                    s.parse::<f64>()
                        .map(Literal::Float)
                        .map_err(|_| self.syntax_err(format!("invalid numeric literal '{s}'")))
                } else {
                    s.parse::<i64>()
                        .map(Literal::Int)
                        .map_err(|_| self.syntax_err(format!("invalid numeric literal '{s}'")))
                }
            }
            TokenKind::Str(s) => Ok(Literal::Str(s)),
            other => Err(self.syntax_err(format!("expected literal, found {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_select() {
        let stmt = parse("SELECT userId, event FROM events WHERE userId = 'u1'").unwrap();
        assert_eq!(stmt.table, "events");
        assert_eq!(stmt.select_list.len(), 2);
        assert!(stmt.selection.is_some());
    }

    #[test]
    fn is_case_insensitive() {
        let stmt = parse("select * from events where ts between 1 and 2").unwrap();
        assert_eq!(stmt.select_list, vec![SelectItem::Wildcard]);
    }

    #[test]
    fn line_comments_are_skipped() {
        let stmt = parse("SELECT * -- comment\nFROM events").unwrap();
        assert_eq!(stmt.table, "events");
    }

    #[test]
    fn empty_select_list_is_syntax_error() {
        let err = parse("SELECT FROM events").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn non_prefix_like_is_unsupported_feature() {
        let err = parse("SELECT * FROM events WHERE event LIKE '%abc'").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedFeature);
        let err2 = parse("SELECT * FROM events WHERE event LIKE 'a%b'").unwrap_err();
        assert_eq!(err2.kind, ParseErrorKind::UnsupportedFeature);
    }

    #[test]
    fn string_escape_handles_doubled_quote() {
        let stmt = parse("SELECT * FROM events WHERE event = 'it''s'").unwrap();
        match stmt.selection {
            Some(Expr::Cmp { right, .. }) => {
                assert_eq!(*right, Expr::Literal(Literal::Str("it's".to_string())));
            }
            _ => panic!("expected comparison"),
        }
    }

    #[test]
    fn aggregate_calls_and_group_by_order_by_limit() {
        let stmt = parse(
            "SELECT region, COUNT(*) AS c FROM events GROUP BY region ORDER BY c DESC LIMIT 5",
        )
        .unwrap();
        assert_eq!(stmt.group_by, vec!["region".to_string()]);
        assert_eq!(stmt.order_by[0].desc, true);
        assert_eq!(stmt.limit, Some(5));
    }

    #[test]
    fn parenthesized_boolean_expression() {
        let stmt =
            parse("SELECT * FROM events WHERE (userId = 'u1' OR userId = 'u2') AND event = 'click'")
                .unwrap();
        assert!(matches!(stmt.selection, Some(Expr::And(..))));
    }
}
