//! Recursive-descent parser for distance templates and compiled expressions
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := number | '@' slot | ident ['(' args ')'] | '(' expr ')'
//! ```

use super::{BinOp, Expr, Slot};
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f32),
    Ident(String),
    Slot(Slot),
    LParen,
    RParen,
    Comma,
    Op(char),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Num(v) => format!("number {v}"),
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Slot(slot) => format!("placeholder {slot}"),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Comma => "','".into(),
            Self::Op(c) => format!("'{c}'"),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn slot_from_name(name: &str) -> Result<Slot, ParseError> {
    match name {
        "pos" => Ok(Slot::Pos),
        "fnc" => Ok(Slot::Fnc),
        "in1" => Ok(Slot::In1),
        "in2" => Ok(Slot::In2),
        _ => name
            .strip_prefix("par")
            .and_then(|n| n.parse().ok())
            .map(Slot::Par)
            .ok_or_else(|| ParseError::UnknownSlot(name.to_string())),
    }
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(&(offset, c)) = chars.get(i) {
        match c {
            c if c.is_whitespace() => i += 1,
            '(' | ')' | ',' | '+' | '-' | '*' | '/' => {
                let token = match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    op => Token::Op(op),
                };
                tokens.push((offset, token));
                i += 1;
            }
            '@' => {
                let start = i + 1;
                let mut end = start;
                while chars.get(end).is_some_and(|&(_, c)| is_ident_char(c)) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().map(|&(_, c)| c).collect();
                tokens.push((offset, Token::Slot(slot_from_name(&name)?)));
                i = end;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = i;
                let mut prev = ' ';
                // digits, one optional fraction, optional signed exponent
                while let Some(&(_, c)) = chars.get(end) {
                    let exponent_sign = (c == '-' || c == '+') && (prev == 'e' || prev == 'E');
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                        prev = c;
                        end += 1;
                    } else {
                        break;
                    }
                }
                let text: String = chars[i..end].iter().map(|&(_, c)| c).collect();
                let value = text
                    .parse::<f32>()
                    .map_err(|_| ParseError::InvalidNumber(text.clone()))?;
                tokens.push((offset, Token::Num(value)));
                i = end;
            }
            c if is_ident_char(c) => {
                let mut end = i;
                while chars.get(end).is_some_and(|&(_, c)| is_ident_char(c)) {
                    end += 1;
                }
                let name: String = chars[i..end].iter().map(|&(_, c)| c).collect();
                tokens.push((offset, Token::Ident(name)));
                i = end;
            }
            found => return Err(ParseError::UnexpectedChar { found, offset }),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn error(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.peek().map_or_else(|| "end of input".into(), Token::describe),
            expected,
            offset: self.offset(),
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParseError> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn binary_op(&self, ops: [char; 2]) -> Option<BinOp> {
        match self.peek() {
            Some(Token::Op(c)) if ops.contains(c) => Some(match c {
                '+' => BinOp::Add,
                '-' => BinOp::Sub,
                '*' => BinOp::Mul,
                _ => BinOp::Div,
            }),
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.binary_op(['+', '-']) {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.binary_op(['*', '/']) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek() == Some(&Token::Op('-')) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().cloned();
        match token {
            Some(Token::Num(v)) => {
                self.pos += 1;
                Ok(Expr::Num(v))
            }
            Some(Token::Slot(slot)) => {
                self.pos += 1;
                Ok(Expr::Slot(slot))
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                if self.peek() != Some(&Token::LParen) {
                    return Ok(Expr::Var(name));
                }
                self.pos += 1;
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    args.push(self.expr()?);
                    while self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        args.push(self.expr()?);
                    }
                }
                self.expect(&Token::RParen, "',' or ')'")?;
                Ok(Expr::Call { name, args })
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.error("an operand")),
        }
    }
}

/// Parse a template or a rendered expression.
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(src)?,
        pos: 0,
        end: src.len(),
    };
    let expr = parser.expr()?;
    if parser.peek().is_some() {
        return Err(parser.error("end of input"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_with_slots() {
        let e = parse("Torus(@pos, float2(@par0, @par1))").unwrap();
        let Expr::Call { name, args } = e else {
            panic!("expected call");
        };
        assert_eq!(name, "Torus");
        assert_eq!(args[0], Expr::Slot(Slot::Pos));
        assert!(matches!(&args[1], Expr::Call { name, args } if name == "float2" && args.len() == 2));
    }

    #[test]
    fn test_precedence_and_associativity() {
        let e = parse("a - b - c * d").unwrap();
        let expected = Expr::binary(
            BinOp::Sub,
            Expr::binary(BinOp::Sub, Expr::var("a"), Expr::var("b")),
            Expr::binary(BinOp::Mul, Expr::var("c"), Expr::var("d")),
        );
        assert_eq!(e, expected);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("1000000.0").unwrap(), Expr::Num(1e6));
        assert_eq!(parse("1e-7").unwrap(), Expr::Num(1e-7));
        assert_eq!(parse(".5").unwrap(), Expr::Num(0.5));
        assert_eq!(parse("-2").unwrap(), Expr::Neg(Box::new(Expr::Num(2.0))));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("@foo"), Err(ParseError::UnknownSlot("foo".into())));
        assert!(matches!(parse("Sphere(@pos"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(parse("a $ b"), Err(ParseError::UnexpectedChar { found: '$', .. })));
        assert!(matches!(parse("1.2.3"), Err(ParseError::InvalidNumber(_))));
        assert!(parse("a b").is_err());
    }
}
