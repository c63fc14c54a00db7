//! Recursive-descent parser for template expressions

use serde_json::Value;

use super::ExprError;
use super::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::lexer::{Token, tokenize};
use super::value::number;

/// Deepest expression tree the parser will build
const MAX_DEPTH: usize = 64;

/// Parse an expression. Blank input parses to `Expr::Undefined`.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Ok(Expr::Undefined);
    }

    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.assignment()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(parser.error(format!("unexpected {}", describe(token)))),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier '{}'", name),
        Token::Number(n) => format!("number {}", n),
        Token::Str(s) => format!("string '{}'", s),
        Token::Punct(p) => format!("'{}'", p),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.at(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), ExprError> {
        if self.eat(punct) {
            return Ok(());
        }
        let found = self.peek().map(describe).unwrap_or_else(|| "end of expression".to_string());
        Err(self.error(format!("expected '{}' but found {}", punct, found)))
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::syntax(self.source, message)
    }

    /// Step one level deeper into the tree being built
    fn descend(&mut self) -> Result<(), ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn assignment(&mut self) -> Result<Expr, ExprError> {
        self.descend()?;
        let expr = self.assignment_inner()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn assignment_inner(&mut self) -> Result<Expr, ExprError> {
        let target = self.conditional()?;
        if !self.eat("=") {
            return Ok(target);
        }
        match target {
            Expr::Ident(name) => Ok(Expr::Assign(name, Box::new(self.assignment()?))),
            _ => Err(self.error("invalid assignment target")),
        }
    }

    fn conditional(&mut self) -> Result<Expr, ExprError> {
        let test = self.logical_or()?;
        if !self.eat("?") {
            return Ok(test);
        }
        let then = self.assignment()?;
        self.expect(":")?;
        let otherwise = self.assignment()?;
        Ok(Expr::Conditional(Box::new(test), Box::new(then), Box::new(otherwise)))
    }

    fn logical_or(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.logical_and()?;
        while self.eat("||") {
            self.descend()?;
            let right = self.logical_and()?;
            left = Expr::Logical(LogicalOp::Or, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.binary(0)?;
        while self.eat("&&") {
            self.descend()?;
            let right = self.binary(0)?;
            left = Expr::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    /// Precedence climbing over the binary operator levels
    fn binary(&mut self, level: usize) -> Result<Expr, ExprError> {
        const LEVELS: &[&[(&str, BinaryOp)]] = &[
            &[
                ("===", BinaryOp::StrictEq),
                ("!==", BinaryOp::StrictNotEq),
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::NotEq),
            ],
            &[("<=", BinaryOp::Le), (">=", BinaryOp::Ge), ("<", BinaryOp::Lt), (">", BinaryOp::Gt)],
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            &[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("%", BinaryOp::Rem)],
        ];

        let Some(operators) = LEVELS.get(level) else {
            return self.unary();
        };

        let depth = self.depth;
        let mut left = self.binary(level + 1)?;
        'outer: loop {
            for (punct, op) in operators.iter() {
                if self.eat(punct) {
                    self.descend()?;
                    let right = self.binary(level + 1)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            self.depth = depth;
            return Ok(left);
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = if self.eat("!") {
            UnaryOp::Not
        } else if self.eat("-") {
            UnaryOp::Negate
        } else if self.eat("+") {
            UnaryOp::Plus
        } else if matches!(self.peek(), Some(Token::Ident(name)) if name == "typeof") {
            self.pos += 1;
            UnaryOp::TypeOf
        } else {
            return self.postfix();
        };
        self.descend()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut expr = self.primary()?;
        loop {
            if !self.at(".") && !self.at("[") && !self.at("(") {
                self.depth = depth;
                return Ok(expr);
            }
            self.descend()?;
            if self.eat(".") {
                match self.next() {
                    Some(Token::Ident(name)) => expr = Expr::Member(Box::new(expr), name),
                    other => {
                        let found = other.as_ref().map(describe).unwrap_or_else(|| "end of expression".into());
                        return Err(self.error(format!("expected property name but found {}", found)));
                    }
                }
            } else if self.eat("[") {
                let index = self.assignment()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat("(") {
                let args = self.list(")")?;
                expr = Expr::Call(Box::new(expr), args);
            }
        }
    }

    fn list(&mut self, close: &str) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.assignment()?);
            if !self.eat(",") {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn object(&mut self) -> Result<Expr, ExprError> {
        let mut entries = Vec::new();
        while !self.eat("}") {
            let key = match self.next() {
                Some(Token::Ident(name)) => name,
                Some(Token::Str(text)) => text,
                Some(Token::Number(n)) => super::value::format_number(n),
                other => {
                    let found = other.as_ref().map(describe).unwrap_or_else(|| "end of expression".into());
                    return Err(self.error(format!("expected property key but found {}", found)));
                }
            };
            self.expect(":")?;
            entries.push((key, self.assignment()?));
            if !self.eat(",") {
                self.expect("}")?;
                break;
            }
        }
        Ok(Expr::Object(entries))
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => number(n).map(Expr::Literal).map_err(|e| self.error(e.to_string())),
            Some(Token::Str(text)) => Ok(Expr::Literal(Value::String(text))),
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Undefined,
                _ => Expr::Ident(name),
            }),
            Some(Token::Punct("(")) => {
                let inner = self.assignment()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(Token::Punct("[")) => Ok(Expr::Array(self.list("]")?)),
            Some(Token::Punct("{")) => self.object(),
            Some(token) => Err(self.error(format!("unexpected {}", describe(&token)))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}
