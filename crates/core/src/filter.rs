//! Command filter.
//!
//! Removes operators named in a [`RemovalRules`] table, together with the
//! operands they consume, from a content stream token sequence.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::{PdfError, Result};
use crate::model::Token;

/// Operator name to declared operand count.
///
/// The default table lists the text-showing operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRules {
    arities: FxHashMap<SmolStr, usize>,
}

impl RemovalRules {
    /// An empty table; the filter removes nothing.
    pub fn empty() -> Self {
        Self {
            arities: FxHashMap::default(),
        }
    }

    /// `Tj`, `TJ` and `'` take one operand, `"` takes three
    /// (word spacing, character spacing, string).
    pub fn text_showing() -> Self {
        Self::empty()
            .with("Tj", 1)
            .with("TJ", 1)
            .with("'", 1)
            .with("\"", 3)
    }

    /// Text-showing operators with `"` declared at arity 1.
    ///
    /// Matches older tools that listed every text operator at arity 1. The
    /// filter still drops the full operand group of a matched operator, so
    /// the output is the same as [`text_showing`](Self::text_showing) for
    /// well-formed streams; only malformed `"` with fewer than three
    /// operands is accepted.
    pub fn legacy() -> Self {
        Self::text_showing().with("\"", 1)
    }

    pub fn with(mut self, operator: &str, arity: usize) -> Self {
        self.arities.insert(SmolStr::new(operator), arity);
        self
    }

    pub fn without(mut self, operator: &str) -> Self {
        self.arities.remove(operator);
        self
    }

    /// Declared arity, or `None` when the operator is kept.
    pub fn arity(&self, operator: &str) -> Option<usize> {
        self.arities.get(operator).copied()
    }

    pub fn len(&self) -> usize {
        self.arities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arities.is_empty()
    }

    /// Operator names, sorted.
    pub fn operators(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.arities.keys().map(SmolStr::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RemovalRules {
    fn default() -> Self {
        Self::text_showing()
    }
}

/// Applies [`RemovalRules`] to token sequences.
#[derive(Debug, Clone, Default)]
pub struct CommandFilter {
    rules: RemovalRules,
}

impl CommandFilter {
    pub fn new(rules: RemovalRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RemovalRules {
        &self.rules
    }

    /// Filter a token sequence.
    pub fn filter(&self, tokens: Vec<Token>) -> Result<Vec<Token>> {
        self.filter_counted(tokens).map(|(out, _)| out)
    }

    /// Filter a token sequence, also returning how many operators were removed.
    ///
    /// A matched operator drops every operand pushed since the previous
    /// operator. Fewer operands than its declared arity is an error, never a
    /// partial removal.
    pub fn filter_counted(&self, tokens: Vec<Token>) -> Result<(Vec<Token>, usize)> {
        let mut out = Vec::with_capacity(tokens.len());
        // Start of the current operand group in `out`.
        let mut group_start = 0;
        let mut removed = 0;

        for token in tokens {
            let Token::Operator(name) = &token else {
                out.push(token);
                continue;
            };

            match self.rules.arity(name) {
                Some(arity) => {
                    let available = out.len() - group_start;
                    if available < arity {
                        return Err(PdfError::StructuralRemoval {
                            operator: name.clone(),
                            arity,
                            available,
                        });
                    }
                    tracing::trace!(operator = %name, operands = available, "removing operator");
                    out.truncate(group_start);
                    removed += 1;
                }
                None => {
                    out.push(token);
                    group_start = out.len();
                }
            }
        }

        Ok((out, removed))
    }
}
