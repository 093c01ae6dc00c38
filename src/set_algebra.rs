/*!
# Set Algebra
Contains the expression language for combining variant key sets by label.
The grammar, from loosest to tightest binding:

```text
expression := intersect ('|' intersect)*
intersect  := unary ('&' unary)*
unary      := '~' unary | LABEL | '(' expression ')'
```

so `~` binds tighter than `&`, which binds tighter than `|`, and parentheses override.
Complement is relative to the union of every set in the evaluation context.
*/
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

use crate::comparator::ComparisonError;
use crate::data_types::variants::VariantKey;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Token {
    /// A set label
    Ident(String),
    /// `&`
    Intersect,
    /// `|`
    Union,
    /// `~`
    Complement,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(label) => write!(f, "\"{label}\""),
            Token::Intersect => write!(f, "'&'"),
            Token::Union => write!(f, "'|'"),
            Token::Complement => write!(f, "'~'"),
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'")
        }
    }
}

/// Splits an expression string into tokens.
/// Labels are runs of ASCII alphanumerics and underscores, matching the `{mapper}_{caller}`
/// convention; anything else outside the five operators is rejected.
fn tokenize(expression_text: &str) -> Result<Vec<Token>, ComparisonError> {
    let mut tokens = vec![];
    let mut chars = expression_text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            },
            '&' => {
                chars.next();
                tokens.push(Token::Intersect);
            },
            '|' => {
                chars.next();
                tokens.push(Token::Union);
            },
            '~' => {
                chars.next();
                tokens.push(Token::Complement);
            },
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            },
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            },
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut label = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        label.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(label));
            },
            _ => {
                return Err(ComparisonError::Configuration {
                    reason: format!("unexpected character '{c}' in set expression")
                });
            }
        };
    }
    Ok(tokens)
}

/// A parsed set expression over labeled key sets
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SetExpression {
    /// A set label leaf
    Reference(String),
    /// `~expression`
    Complement(Box<SetExpression>),
    /// `left & right`
    Intersect(Box<SetExpression>, Box<SetExpression>),
    /// `left | right`
    Union(Box<SetExpression>, Box<SetExpression>)
}

impl SetExpression {
    /// Parses an expression string into a tree.
    /// # Arguments
    /// * `expression_text` - for example `"(a & b) | ~c"`
    /// # Errors
    /// * `Configuration` for empty input, stray characters, or any grammar violation
    pub fn parse(expression_text: &str) -> Result<SetExpression, ComparisonError> {
        let tokens = tokenize(expression_text)?;
        if tokens.is_empty() {
            return Err(ComparisonError::Configuration {
                reason: "set expression is empty".to_string()
            });
        }

        let mut parser = Parser {
            tokens: &tokens,
            position: 0
        };
        let expression = parser.parse_union()?;
        if let Some(token) = parser.peek() {
            return Err(ComparisonError::Configuration {
                reason: format!("unexpected {token} after the end of the set expression")
            });
        }
        Ok(expression)
    }

    /// Returns every label the expression mentions, sorted and de-duplicated
    pub fn referenced_labels(&self) -> BTreeSet<String> {
        let mut labels = BTreeSet::new();
        self.collect_labels(&mut labels);
        labels
    }

    fn collect_labels(&self, labels: &mut BTreeSet<String>) {
        match self {
            SetExpression::Reference(label) => {
                labels.insert(label.clone());
            },
            SetExpression::Complement(inner) => inner.collect_labels(labels),
            SetExpression::Intersect(left, right) |
            SetExpression::Union(left, right) => {
                left.collect_labels(labels);
                right.collect_labels(labels);
            }
        };
    }

    /// True if any node is a complement, which makes evaluation depend on the full universe
    pub fn uses_complement(&self) -> bool {
        match self {
            SetExpression::Reference(_) => false,
            SetExpression::Complement(_) => true,
            SetExpression::Intersect(left, right) |
            SetExpression::Union(left, right) => {
                left.uses_complement() || right.uses_complement()
            }
        }
    }

    /// Evaluates the expression over the given context.
    /// # Arguments
    /// * `sets` - key sets by label; for complements, this must hold every set of the universe
    /// # Errors
    /// * `Configuration` if a referenced label is absent from the context
    pub fn evaluate(&self, sets: &IndexMap<&str, &FxHashSet<VariantKey>>) -> Result<FxHashSet<VariantKey>, ComparisonError> {
        match self {
            SetExpression::Reference(label) => {
                match sets.get(label.as_str()) {
                    Some(keys) => Ok((*keys).clone()),
                    None => Err(ComparisonError::Configuration {
                        reason: format!("unknown set label in expression: \"{label}\"")
                    })
                }
            },
            SetExpression::Complement(inner) => {
                let excluded = inner.evaluate(sets)?;
                let mut universe: FxHashSet<VariantKey> = Default::default();
                for keys in sets.values() {
                    universe.extend(keys.iter().cloned());
                }
                Ok(universe.difference(&excluded).cloned().collect())
            },
            SetExpression::Intersect(left, right) => {
                let left_keys = left.evaluate(sets)?;
                let right_keys = right.evaluate(sets)?;
                Ok(left_keys.intersection(&right_keys).cloned().collect())
            },
            SetExpression::Union(left, right) => {
                let mut left_keys = left.evaluate(sets)?;
                left_keys.extend(right.evaluate(sets)?);
                Ok(left_keys)
            }
        }
    }
}

/// Recursive descent over the token stream
struct Parser<'a> {
    tokens: &'a [Token],
    position: usize
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn parse_union(&mut self) -> Result<SetExpression, ComparisonError> {
        let mut expression = self.parse_intersect()?;
        while matches!(self.peek(), Some(Token::Union)) {
            self.position += 1;
            let right = self.parse_intersect()?;
            expression = SetExpression::Union(Box::new(expression), Box::new(right));
        }
        Ok(expression)
    }

    fn parse_intersect(&mut self) -> Result<SetExpression, ComparisonError> {
        let mut expression = self.parse_unary()?;
        while matches!(self.peek(), Some(Token::Intersect)) {
            self.position += 1;
            let right = self.parse_unary()?;
            expression = SetExpression::Intersect(Box::new(expression), Box::new(right));
        }
        Ok(expression)
    }

    fn parse_unary(&mut self) -> Result<SetExpression, ComparisonError> {
        if matches!(self.peek(), Some(Token::Complement)) {
            self.position += 1;
            let inner = self.parse_unary()?;
            Ok(SetExpression::Complement(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<SetExpression, ComparisonError> {
        match self.advance() {
            Some(Token::Ident(label)) => Ok(SetExpression::Reference(label.clone())),
            Some(Token::OpenParen) => {
                let inner = self.parse_union()?;
                match self.advance() {
                    Some(Token::CloseParen) => Ok(inner),
                    _ => Err(ComparisonError::Configuration {
                        reason: "missing closing parenthesis in set expression".to_string()
                    })
                }
            },
            Some(token) => Err(ComparisonError::Configuration {
                reason: format!("unexpected {token} in set expression")
            }),
            None => Err(ComparisonError::Configuration {
                reason: "set expression ended unexpectedly".to_string()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(label: &str) -> Box<SetExpression> {
        Box::new(SetExpression::Reference(label.to_string()))
    }

    fn snp_key(position: u64) -> VariantKey {
        VariantKey::new("1".to_string(), position, "A".to_string(), "T".to_string())
    }

    fn key_set(positions: &[u64]) -> FxHashSet<VariantKey> {
        positions.iter().map(|&p| snp_key(p)).collect()
    }

    #[test]
    fn test_parse_precedence() {
        // '&' binds tighter than '|'
        let expression = SetExpression::parse("a | b & c").unwrap();
        assert_eq!(expression, SetExpression::Union(
            reference("a"),
            Box::new(SetExpression::Intersect(reference("b"), reference("c")))
        ));

        // '~' binds tighter than '&'
        let expression = SetExpression::parse("~a & b").unwrap();
        assert_eq!(expression, SetExpression::Intersect(
            Box::new(SetExpression::Complement(reference("a"))),
            reference("b")
        ));
    }

    #[test]
    fn test_parse_parentheses() {
        let expression = SetExpression::parse("~(a | b)").unwrap();
        assert_eq!(expression, SetExpression::Complement(
            Box::new(SetExpression::Union(reference("a"), reference("b")))
        ));

        let expression = SetExpression::parse("(a | b) & c").unwrap();
        assert_eq!(expression, SetExpression::Intersect(
            Box::new(SetExpression::Union(reference("a"), reference("b"))),
            reference("c")
        ));
    }

    #[test]
    fn test_parse_chained_operators() {
        // left associative chains
        let expression = SetExpression::parse("a | b | c").unwrap();
        assert_eq!(expression, SetExpression::Union(
            Box::new(SetExpression::Union(reference("a"), reference("b"))),
            reference("c")
        ));

        let expression = SetExpression::parse("~~a").unwrap();
        assert_eq!(expression, SetExpression::Complement(
            Box::new(SetExpression::Complement(reference("a")))
        ));
    }

    #[test]
    fn test_parse_failures() {
        let failing_expressions = [
            "", "   ", "a &", "& a", "(a", "a b", ") a", "a @ b", "a ~ b"
        ];
        for expression_text in failing_expressions.iter() {
            let result = SetExpression::parse(expression_text);
            assert!(
                matches!(result, Err(ComparisonError::Configuration { .. })),
                "expected \"{expression_text}\" to fail, got {result:?}"
            );
        }
    }

    #[test]
    fn test_referenced_labels() {
        let expression = SetExpression::parse("(b & a) | ~b").unwrap();
        let labels: Vec<String> = expression.referenced_labels().into_iter().collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert!(expression.uses_complement());
        assert!(!SetExpression::parse("a & b").unwrap().uses_complement());
    }

    #[test]
    fn test_evaluate_operators() {
        let first = key_set(&[100, 200]);
        let second = key_set(&[200, 300]);
        let third = key_set(&[400]);
        let sets: IndexMap<&str, &FxHashSet<VariantKey>> = [
            ("a", &first), ("b", &second), ("c", &third)
        ].into_iter().collect();

        let shared = SetExpression::parse("a & b").unwrap().evaluate(&sets).unwrap();
        assert_eq!(shared, key_set(&[200]));

        let combined = SetExpression::parse("a | b").unwrap().evaluate(&sets).unwrap();
        assert_eq!(combined, key_set(&[100, 200, 300]));

        // complement runs against the union of everything in the context
        let outside = SetExpression::parse("~a").unwrap().evaluate(&sets).unwrap();
        assert_eq!(outside, key_set(&[300, 400]));

        let nested = SetExpression::parse("(a | b) & ~b").unwrap().evaluate(&sets).unwrap();
        assert_eq!(nested, key_set(&[100]));
    }

    #[test]
    fn test_evaluate_unknown_label() {
        let first = key_set(&[100]);
        let sets: IndexMap<&str, &FxHashSet<VariantKey>> = [("a", &first)].into_iter().collect();
        let result = SetExpression::parse("a & missing").unwrap().evaluate(&sets);
        assert!(matches!(result, Err(ComparisonError::Configuration { .. })));
    }
}
