//! Command templates and positional slot substitution.
//!
//! A template is an ordered sequence of tokens, each either a literal
//! argument or a substitution slot. Substitution is strictly positional:
//! the i-th slot (left to right) takes the i-th value of a record. Slots
//! carry no payload and no names.
//!
//! # Template strings
//!
//! On the CLI surface a template is a single shell-quoted string, split
//! with `shell-words`:
//!
//! - the token `{}` marks a slot
//! - the token `{{}}` renders as a literal `{}` argument

use crate::error::{FanoutError, Result};
use std::fmt;

/// A single token in a command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A literal argument, passed through unchanged.
    Literal(String),
    /// A substitution slot. Its position is its only meaning.
    Slot,
}

/// An ordered command template with at least one substitution slot.
///
/// The slot positions are fixed at construction; a `Template` is immutable
/// for the lifetime of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Create a template from an explicit token sequence.
    ///
    /// Fails with `InvalidTemplate` if the sequence is empty or contains
    /// no slots.
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(FanoutError::InvalidTemplate(
                "template is empty".to_string(),
            ));
        }
        if !tokens.iter().any(|t| matches!(t, Token::Slot)) {
            return Err(FanoutError::InvalidTemplate(
                "template contains no {} slots".to_string(),
            ));
        }
        Ok(Self { tokens })
    }

    /// Parse a template from a single shell-quoted string.
    ///
    /// # Examples
    ///
    /// ```text
    /// gzip -k {}          -> [gzip] [-k] [slot]
    /// cp {} {}            -> [cp] [slot] [slot]
    /// printf '%s\n' {{}}  -> [printf] [%s\n] [{}]
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let words = shell_words::split(input).map_err(|e| {
            FanoutError::InvalidTemplate(format!("failed to parse '{}': {}", input, e))
        })?;

        let tokens = words
            .into_iter()
            .map(|word| match word.as_str() {
                "{}" => Token::Slot,
                "{{}}" => Token::Literal("{}".to_string()),
                _ => Token::Literal(word),
            })
            .collect();

        Self::new(tokens)
    }

    /// Number of substitution slots in the template.
    pub fn slot_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Slot))
            .count()
    }

    /// The template's token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Substitute one record into the template, yielding a concrete argv.
    ///
    /// Walks the template in order, keeping literals and filling each slot
    /// with the next value of `record`. Pure; no side effects.
    ///
    /// Batch validation guarantees `record.len() == self.slot_count()`
    /// before this is ever called.
    pub fn substitute(&self, record: &[String]) -> BuiltCommand {
        debug_assert_eq!(record.len(), self.slot_count());

        let mut index = 0;
        let mut argv = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match token {
                Token::Literal(s) => argv.push(s.clone()),
                Token::Slot => {
                    argv.push(record[index].clone());
                    index += 1;
                }
            }
        }
        BuiltCommand { argv }
    }
}

/// The concrete argument vector for one child process.
///
/// Produced by [`Template::substitute`]; retained by the runner only long
/// enough to report it in an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommand {
    argv: Vec<String>,
}

impl BuiltCommand {
    /// The full argument vector, program included.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The program to execute (first argv element).
    ///
    /// Always present: templates reject empty token sequences.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// The arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

impl fmt::Display for BuiltCommand {
    /// Shell-quoted rendering, suitable for copy-paste reproduction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_words::join(&self.argv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_single_slot() {
        let template = Template::parse("echo {}").unwrap();
        assert_eq!(
            template.tokens(),
            &[Token::Literal("echo".to_string()), Token::Slot]
        );
        assert_eq!(template.slot_count(), 1);
    }

    #[test]
    fn test_parse_multi_slot_with_quoting() {
        let template = Template::parse("convert {} -resize '50%' {}").unwrap();
        assert_eq!(template.slot_count(), 2);
        assert_eq!(
            template.tokens()[2],
            Token::Literal("-resize".to_string())
        );
        assert_eq!(template.tokens()[3], Token::Literal("50%".to_string()));
    }

    #[test]
    fn test_parse_escaped_slot_is_literal() {
        let template = Template::parse("grep {{}} {}").unwrap();
        assert_eq!(
            template.tokens(),
            &[
                Token::Literal("grep".to_string()),
                Token::Literal("{}".to_string()),
                Token::Slot,
            ]
        );
        assert_eq!(template.slot_count(), 1);
    }

    #[test]
    fn test_parse_rejects_template_without_slots() {
        let err = Template::parse("echo hello").unwrap_err();
        assert!(matches!(err, crate::error::FanoutError::InvalidTemplate(_)));
    }

    #[test]
    fn test_parse_rejects_empty_template() {
        let err = Template::parse("").unwrap_err();
        assert!(matches!(err, crate::error::FanoutError::InvalidTemplate(_)));
    }

    #[test]
    fn test_parse_rejects_unmatched_quote() {
        let err = Template::parse("echo \"unmatched {}").unwrap_err();
        assert!(matches!(err, crate::error::FanoutError::InvalidTemplate(_)));
    }

    #[test]
    fn test_substitute_preserves_literals_and_fills_slots_in_order() {
        let template = Template::new(vec![
            Token::Literal("hey".to_string()),
            Token::Slot,
            Token::Literal("name".to_string()),
            Token::Slot,
            Token::Slot,
        ])
        .unwrap();

        let command = template.substitute(&strings(&["my", "is", "drew"]));
        assert_eq!(command.argv(), &strings(&["hey", "my", "name", "is", "drew"]));

        let command = template.substitute(&strings(&["joels", "aint", "drew"]));
        assert_eq!(
            command.argv(),
            &strings(&["hey", "joels", "name", "aint", "drew"])
        );
    }

    #[test]
    fn test_built_command_program_and_args() {
        let template = Template::parse("echo {}").unwrap();
        let command = template.substitute(&strings(&["hello"]));
        assert_eq!(command.program(), "echo");
        assert_eq!(command.args(), &strings(&["hello"]));
    }

    #[test]
    fn test_built_command_display_quotes_arguments() {
        let template = Template::parse("echo {}").unwrap();
        let command = template.substitute(&strings(&["hello world"]));
        assert_eq!(command.to_string(), "echo 'hello world'");
    }
}
