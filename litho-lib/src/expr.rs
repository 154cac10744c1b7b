//! Safe evaluation of phase expressions `phi(t)`.
//!
//! The grammar is a small, closed set:
//!
//! ```text
//! expr ::= number | 't' | 'pi' | 'sin'(expr) | 'cos'(expr)
//!          | expr (+|-|*|/|%|**|//) expr | (+|-) expr | '(' expr ')'
//! ```
//!
//! Nothing else is accepted: no other identifiers, no function calls other
//! than `sin`/`cos`, no assignment, no runtime code evaluation of any kind.
//! [`eval_phi`] never fails — a syntactically or semantically invalid
//! expression (including an empty string) evaluates to `0.0`, matching the
//! `except Exception: return 0.0` fallback of the expression this module is
//! a safe reimplementation of.

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    FloorDiv,
    LParen,
    RParen,
    Eos,
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    fn new(input: &str) -> Self {
        Tokenizer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn next_token(&mut self) -> Result<Token, String> {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            return Ok(Token::Eos);
        }

        let ch = self.chars[self.pos];

        if ch == '(' {
            self.pos += 1;
            return Ok(Token::LParen);
        }
        if ch == ')' {
            self.pos += 1;
            return Ok(Token::RParen);
        }
        if ch == '+' {
            self.pos += 1;
            return Ok(Token::Plus);
        }
        if ch == '-' {
            self.pos += 1;
            return Ok(Token::Minus);
        }
        if ch == '*' {
            self.pos += 1;
            if self.pos < self.chars.len() && self.chars[self.pos] == '*' {
                self.pos += 1;
                return Ok(Token::Pow);
            }
            return Ok(Token::Star);
        }
        if ch == '/' {
            self.pos += 1;
            if self.pos < self.chars.len() && self.chars[self.pos] == '/' {
                self.pos += 1;
                return Ok(Token::FloorDiv);
            }
            return Ok(Token::Slash);
        }
        if ch == '%' {
            self.pos += 1;
            return Ok(Token::Percent);
        }

        if ch.is_ascii_digit() || ch == '.' {
            return self.read_number();
        }

        if ch.is_ascii_alphabetic() {
            let start = self.pos;
            self.pos += 1;
            while self.pos < self.chars.len()
                && (self.chars[self.pos].is_ascii_alphanumeric() || self.chars[self.pos] == '_')
            {
                self.pos += 1;
            }
            let name: String = self.chars[start..self.pos].iter().collect();
            return Ok(Token::Ident(name));
        }

        Err(format!("unrecognized character '{ch}' at position {}", self.pos))
    }

    fn read_number(&mut self) -> Result<Token, String> {
        let start = self.pos;

        while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos < self.chars.len() && self.chars[self.pos] == '.' {
            self.pos += 1;
            while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        if self.pos < self.chars.len()
            && (self.chars[self.pos] == 'e' || self.chars[self.pos] == 'E')
        {
            self.pos += 1;
            if self.pos < self.chars.len()
                && (self.chars[self.pos] == '+' || self.chars[self.pos] == '-')
            {
                self.pos += 1;
            }
            while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }

        let s: String = self.chars[start..self.pos].iter().collect();
        s.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| format!("invalid number '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sin,
    Cos,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    FloorDiv,
}

/// Phase-expression AST. Only three node kinds exist: literals, the `t`
/// variable, and applications (unary sign, binary arithmetic, or sin/cos).
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Lit(f64),
    Var,
    Neg(Box<Expr>),
    Call(Func, Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokenizer: Tokenizer,
    current: Token,
}

impl Parser {
    fn new(input: &str) -> Result<Self, String> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Parser { tokenizer, current })
    }

    fn advance(&mut self) -> Result<(), String> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_add_sub()
    }

    fn parse_add_sub(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_mul_div()?;
        loop {
            let op = match self.current {
                Token::Plus => Op::Add,
                Token::Minus => Op::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_mul_div()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul_div(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current {
                Token::Star => Op::Mul,
                Token::Slash => Op::Div,
                Token::Percent => Op::Mod,
                Token::FloorDiv => Op::FloorDiv,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        match self.current {
            Token::Plus => {
                self.advance()?;
                self.parse_unary()
            }
            Token::Minus => {
                self.advance()?;
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_pow(),
        }
    }

    // '**' is right-associative and binds tighter than unary minus on its
    // right operand only through the usual recursive-descent recursion.
    fn parse_pow(&mut self) -> Result<Expr, String> {
        let base = self.parse_primary()?;
        if self.current == Token::Pow {
            self.advance()?;
            let exp = self.parse_unary()?;
            return Ok(Expr::Binary(Op::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.current.clone() {
            Token::Num(n) => {
                self.advance()?;
                Ok(Expr::Lit(n))
            }
            Token::Ident(name) => {
                self.advance()?;
                match name.as_str() {
                    "t" => Ok(Expr::Var),
                    "pi" => Ok(Expr::Lit(std::f64::consts::PI)),
                    "sin" | "cos" => {
                        if self.current != Token::LParen {
                            return Err(format!("expected '(' after '{name}'"));
                        }
                        self.advance()?;
                        let inner = self.parse_expr()?;
                        if self.current != Token::RParen {
                            return Err("expected ')'".to_string());
                        }
                        self.advance()?;
                        let func = if name == "sin" { Func::Sin } else { Func::Cos };
                        Ok(Expr::Call(func, Box::new(inner)))
                    }
                    other => Err(format!("unknown identifier '{other}'")),
                }
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                if self.current != Token::RParen {
                    return Err("expected ')'".to_string());
                }
                self.advance()?;
                Ok(inner)
            }
            ref other => Err(format!("unexpected token {other:?}")),
        }
    }
}

fn eval_ast(expr: &Expr, t: f64) -> f64 {
    match expr {
        Expr::Lit(v) => *v,
        Expr::Var => t,
        Expr::Neg(inner) => -eval_ast(inner, t),
        Expr::Call(Func::Sin, inner) => eval_ast(inner, t).sin(),
        Expr::Call(Func::Cos, inner) => eval_ast(inner, t).cos(),
        Expr::Binary(op, lhs, rhs) => {
            let a = eval_ast(lhs, t);
            let b = eval_ast(rhs, t);
            match op {
                Op::Add => a + b,
                Op::Sub => a - b,
                Op::Mul => a * b,
                Op::Div => a / b,
                Op::Mod => a - b * (a / b).floor(),
                Op::Pow => a.powf(b),
                Op::FloorDiv => (a / b).floor(),
            }
        }
    }
}

/// Evaluate `phi(t)` for the given phase-expression string.
///
/// Returns `0.0` on any syntax error, semantic error (unknown identifier,
/// disallowed node), or empty input — the expression is never allowed to
/// propagate a panic or an error to the caller.
pub fn eval_phi(expr: &str, t: f64) -> f64 {
    if expr.trim().is_empty() {
        return 0.0;
    }
    match Parser::new(expr).and_then(|mut p| {
        let ast = p.parse_expr()?;
        if p.current != Token::Eos {
            return Err(format!("trailing input after expression: {expr}"));
        }
        Ok(ast)
    }) {
        Ok(ast) => {
            let v = eval_ast(&ast, t);
            if v.is_finite() {
                v
            } else {
                0.0
            }
        }
        Err(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_pi() {
        assert!((eval_phi("pi", 0.0) - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(eval_phi("2", 0.0), 2.0);
    }

    #[test]
    fn uses_t() {
        assert_eq!(eval_phi("t", 3.5), 3.5);
        assert_eq!(eval_phi("2*t+1", 2.0), 5.0);
    }

    #[test]
    fn trig_calls() {
        assert!((eval_phi("sin(0)", 0.0)).abs() < 1e-12);
        assert!((eval_phi("cos(0)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval_phi("sin(pi/2)", 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn arithmetic_operators() {
        assert_eq!(eval_phi("7 % 3", 0.0), 1.0);
        assert_eq!(eval_phi("7 // 2", 0.0), 3.0);
        assert_eq!(eval_phi("2 ** 3", 0.0), 8.0);
        assert_eq!(eval_phi("-t", 4.0), -4.0);
    }

    #[test]
    fn precedence_and_parens() {
        assert_eq!(eval_phi("(1+2)*3", 0.0), 9.0);
        assert_eq!(eval_phi("1+2*3", 0.0), 7.0);
        assert_eq!(eval_phi("2**2**3", 0.0), 256.0); // right-associative
    }

    #[test]
    fn unknown_identifier_falls_back_to_zero() {
        assert_eq!(eval_phi("tan(t)", 1.0), 0.0);
        assert_eq!(eval_phi("foo", 1.0), 0.0);
    }

    #[test]
    fn malformed_expression_falls_back_to_zero() {
        assert_eq!(eval_phi("sin(", 0.0), 0.0);
        assert_eq!(eval_phi("1 +", 0.0), 0.0);
        assert_eq!(eval_phi(")(", 0.0), 0.0);
    }

    #[test]
    fn empty_expression_is_zero() {
        assert_eq!(eval_phi("", 0.0), 0.0);
        assert_eq!(eval_phi("   ", 0.0), 0.0);
    }
}
