//! The guard expression mini-language.
//!
//! Expressions are whitespace-tokenized: `&&`, `||`, `!`, `(` and `)` are
//! operators, every other token is an accessor identifier resolved against
//! the host at evaluation time. Because tokens are split on whitespace,
//! accessor names cannot contain spaces and operators must be separated by
//! spaces (`"approved && ! rejected"`).
//!
//! There is no operator precedence: a flat chain evaluates left to right,
//! so `a || b && c` means `(a || b) && c`. Grouping requires explicit
//! parentheses, which nest arbitrarily. `&&` and `||` short-circuit.
//!
//! Evaluation resolves identifiers through a caller-supplied resolver,
//! which is where the accessor allow-list is enforced; the parser itself
//! never touches the host.

use crate::error::GuardError;

/// Parsed guard expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardExpr {
    /// A zero-argument host accessor, by name.
    Accessor(String),
    Not(Box<GuardExpr>),
    And(Box<GuardExpr>, Box<GuardExpr>),
    Or(Box<GuardExpr>, Box<GuardExpr>),
}

impl GuardExpr {
    /// Parse a whitespace-tokenized expression.
    pub fn parse(expression: &str) -> Result<GuardExpr, GuardError> {
        let mut parser = Parser {
            expression,
            tokens: expression.split_whitespace().collect(),
            pos: 0,
        };
        let expr = parser.expr()?;
        if let Some(trailing) = parser.peek() {
            return Err(parser.malformed(format!("unexpected trailing `{}`", trailing)));
        }
        Ok(expr)
    }

    /// Evaluate with short-circuit semantics, resolving each accessor
    /// through `resolve`.
    pub fn eval<F>(&self, resolve: &mut F) -> Result<bool, GuardError>
    where
        F: FnMut(&str) -> Result<bool, GuardError>,
    {
        match self {
            GuardExpr::Accessor(name) => resolve(name),
            GuardExpr::Not(inner) => Ok(!inner.eval(resolve)?),
            GuardExpr::And(lhs, rhs) => Ok(lhs.eval(resolve)? && rhs.eval(resolve)?),
            GuardExpr::Or(lhs, rhs) => Ok(lhs.eval(resolve)? || rhs.eval(resolve)?),
        }
    }
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn malformed(&self, reason: impl Into<String>) -> GuardError {
        GuardError::Malformed {
            expression: self.expression.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // expr := primary (("&&" | "||") primary)*
    fn expr(&mut self) -> Result<GuardExpr, GuardError> {
        let mut node = self.primary()?;
        loop {
            match self.peek() {
                Some("&&") => {
                    self.pos += 1;
                    let rhs = self.primary()?;
                    node = GuardExpr::And(Box::new(node), Box::new(rhs));
                }
                Some("||") => {
                    self.pos += 1;
                    let rhs = self.primary()?;
                    node = GuardExpr::Or(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // primary := "(" expr ")" | "!" primary | identifier
    fn primary(&mut self) -> Result<GuardExpr, GuardError> {
        match self.advance() {
            None => Err(self.malformed("unexpected end of expression")),
            Some("(") => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(")") => Ok(inner),
                    _ => Err(self.malformed("missing closing parenthesis")),
                }
            }
            Some("!") => Ok(GuardExpr::Not(Box::new(self.primary()?))),
            Some(token @ (")" | "&&" | "||")) => {
                Err(self.malformed(format!("unexpected `{}`", token)))
            }
            Some(identifier) => Ok(GuardExpr::Accessor(identifier.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn eval_with(expression: &str, values: &[(&str, bool)]) -> Result<bool, GuardError> {
        let table: BTreeMap<&str, bool> = values.iter().copied().collect();
        GuardExpr::parse(expression)?.eval(&mut |name| {
            table
                .get(name)
                .copied()
                .ok_or_else(|| GuardError::AccessorUnsupported {
                    name: name.to_string(),
                })
        })
    }

    #[test]
    fn single_accessor() {
        assert_eq!(eval_with("approved", &[("approved", true)]), Ok(true));
        assert_eq!(eval_with("approved", &[("approved", false)]), Ok(false));
    }

    #[test]
    fn conjunction_with_negation() {
        // The shape used throughout real definition sets.
        let values = [("approved", true), ("rejected", false)];
        assert_eq!(eval_with("approved && ! rejected", &values), Ok(true));
        let values = [("approved", true), ("rejected", true)];
        assert_eq!(eval_with("approved && ! rejected", &values), Ok(false));
    }

    #[test]
    fn flat_chain_evaluates_left_to_right() {
        // No precedence: a || b && c groups as (a || b) && c.
        let values = [("a", true), ("b", false), ("c", false)];
        assert_eq!(eval_with("a || b && c", &values), Ok(false));
        let values = [("a", false), ("b", true), ("c", true)];
        assert_eq!(eval_with("a || b && c", &values), Ok(true));
    }

    #[test]
    fn explicit_parentheses_group() {
        let values = [("a", true), ("b", false), ("c", false)];
        assert_eq!(eval_with("a || ( b && c )", &values), Ok(true));
        let values = [("a", false), ("b", true), ("c", true)];
        assert_eq!(eval_with("( a || b ) && c", &values), Ok(true));
    }

    #[test]
    fn nested_parentheses() {
        let values = [("a", false), ("b", false), ("c", true), ("d", true)];
        assert_eq!(eval_with("a || ( b || ( c && d ) )", &values), Ok(true));
    }

    #[test]
    fn short_circuit_skips_right_hand_side() {
        // The unresolvable accessor is never reached.
        assert_eq!(eval_with("a || missing", &[("a", true)]), Ok(true));
        assert_eq!(eval_with("a && missing", &[("a", false)]), Ok(false));
    }

    #[test]
    fn unresolvable_accessor_is_an_error() {
        assert_eq!(
            eval_with("missing", &[]),
            Err(GuardError::AccessorUnsupported {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn malformed_expressions() {
        assert!(matches!(
            GuardExpr::parse(""),
            Err(GuardError::Malformed { .. })
        ));
        assert!(matches!(
            GuardExpr::parse("a &&"),
            Err(GuardError::Malformed { .. })
        ));
        assert!(matches!(
            GuardExpr::parse("&& a"),
            Err(GuardError::Malformed { .. })
        ));
        assert!(matches!(
            GuardExpr::parse("( a"),
            Err(GuardError::Malformed { .. })
        ));
        assert!(matches!(
            GuardExpr::parse("a b"),
            Err(GuardError::Malformed { .. })
        ));
        assert!(matches!(
            GuardExpr::parse("a ) b"),
            Err(GuardError::Malformed { .. })
        ));
    }

    #[test]
    fn parse_produces_expected_ast() {
        let expr = GuardExpr::parse("approved && ! rejected").unwrap();
        assert_eq!(
            expr,
            GuardExpr::And(
                Box::new(GuardExpr::Accessor("approved".to_string())),
                Box::new(GuardExpr::Not(Box::new(GuardExpr::Accessor(
                    "rejected".to_string()
                )))),
            )
        );
    }
}
