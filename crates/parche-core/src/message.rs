//! Control messages: typed token sequences with pattern matching.
//!
//! Boxes exchange two kinds of data: continuous sample-rate signals and
//! discrete [`Message`]s. A message is an immutable, ordered, non-empty
//! sequence of [`Token`]s. Messages are cheap to clone (shared storage) and a
//! single instance may be delivered to any number of inlets; handlers never
//! mutate one in place.
//!
//! Handlers inspect an incoming message with [`Message::matches`] before
//! reading, so a typed read ([`Message::float_at`], [`Message::symbol_at`])
//! failing on a kind mismatch indicates a bug in the handler, not bad input.

#[cfg(not(feature = "std"))]
use alloc::{string::String, sync::Arc};
#[cfg(feature = "std")]
use std::sync::Arc;

/// A single typed element of a message.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// The unit trigger value.
    Bang,
    /// A numeric value.
    Float(f64),
    /// A textual value (object names, selectors like `"set"` or `"stop"`).
    Symbol(String),
}

impl Token {
    /// Returns the kind of this token.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Bang => TokenKind::Bang,
            Token::Float(_) => TokenKind::Float,
            Token::Symbol(_) => TokenKind::Symbol,
        }
    }
}

/// The kind of a [`Token`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A [`Token::Bang`].
    Bang,
    /// A [`Token::Float`].
    Float,
    /// A [`Token::Symbol`].
    Symbol,
}

/// One position of a message pattern.
///
/// Patterns compare token kinds positionally and are length-exact;
/// [`TokenPattern::Any`] is the wildcard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenPattern {
    /// Matches a bang token.
    Bang,
    /// Matches a float token.
    Float,
    /// Matches a symbol token.
    Symbol,
    /// Matches any token.
    Any,
}

impl TokenPattern {
    fn accepts(self, token: &Token) -> bool {
        match self {
            TokenPattern::Any => true,
            TokenPattern::Bang => token.kind() == TokenKind::Bang,
            TokenPattern::Float => token.kind() == TokenKind::Float,
            TokenPattern::Symbol => token.kind() == TokenKind::Symbol,
        }
    }
}

/// Error from a typed token read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageError {
    /// The token at `index` had a different kind than the read expected.
    WrongKind {
        /// Position of the offending token.
        index: usize,
        /// Kind the read expected.
        expected: TokenKind,
        /// Kind actually present.
        found: TokenKind,
    },
    /// The read was past the end of the message.
    OutOfBounds {
        /// Position the read asked for.
        index: usize,
        /// Number of tokens in the message.
        len: usize,
    },
}

impl core::fmt::Display for MessageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MessageError::WrongKind {
                index,
                expected,
                found,
            } => write!(
                f,
                "token {index} has kind {found:?}, expected {expected:?}"
            ),
            MessageError::OutOfBounds { index, len } => {
                write!(f, "token index {index} out of bounds (message has {len})")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MessageError {}

/// An immutable sequence of [`Token`]s.
///
/// Messages are non-empty; the empty message exists only as an internal
/// control sentinel ([`Message::empty`]) and is never delivered to handlers
/// by the engine. Cloning shares the underlying token storage.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    tokens: Arc<[Token]>,
}

impl Message {
    /// A message holding exactly one bang.
    pub fn bang() -> Self {
        Self::from_tokens([Token::Bang])
    }

    /// A message holding one float.
    pub fn float(value: f64) -> Self {
        Self::from_tokens([Token::Float(value)])
    }

    /// A message of float tokens, one per input value.
    pub fn floats(values: &[f64]) -> Self {
        Self {
            tokens: values.iter().map(|&v| Token::Float(v)).collect(),
        }
    }

    /// A message holding one symbol.
    pub fn symbol(value: &str) -> Self {
        Self::from_tokens([Token::Symbol(value.into())])
    }

    /// A message of symbol tokens, one per input string.
    pub fn symbols(values: &[&str]) -> Self {
        Self {
            tokens: values.iter().map(|&v| Token::Symbol(v.into())).collect(),
        }
    }

    /// Builds a message from explicit tokens.
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// The internal control sentinel: a message with no tokens.
    ///
    /// Used as a placeholder value inside the runtime (e.g. an I/O completion
    /// with no payload); never delivered to message handlers.
    pub fn empty() -> Self {
        Self {
            tokens: Arc::from([]),
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True only for the internal [`empty`](Self::empty) sentinel.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The underlying token slice.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// True iff the message is exactly one bang token.
    pub fn is_bang(&self) -> bool {
        matches!(&*self.tokens, [Token::Bang])
    }

    /// Compares token kinds against `pattern` positionally.
    ///
    /// The pattern must cover the whole message: lengths differing is a
    /// non-match, not an error.
    pub fn matches(&self, pattern: &[TokenPattern]) -> bool {
        self.tokens.len() == pattern.len()
            && self
                .tokens
                .iter()
                .zip(pattern.iter())
                .all(|(t, p)| p.accepts(t))
    }

    /// Reads the float at `index`.
    pub fn float_at(&self, index: usize) -> Result<f64, MessageError> {
        match self.tokens.get(index) {
            Some(Token::Float(v)) => Ok(*v),
            Some(other) => Err(MessageError::WrongKind {
                index,
                expected: TokenKind::Float,
                found: other.kind(),
            }),
            None => Err(MessageError::OutOfBounds {
                index,
                len: self.tokens.len(),
            }),
        }
    }

    /// Reads the symbol at `index`.
    pub fn symbol_at(&self, index: usize) -> Result<&str, MessageError> {
        match self.tokens.get(index) {
            Some(Token::Symbol(s)) => Ok(s),
            Some(other) => Err(MessageError::WrongKind {
                index,
                expected: TokenKind::Symbol,
                found: other.kind(),
            }),
            None => Err(MessageError::OutOfBounds {
                index,
                len: self.tokens.len(),
            }),
        }
    }

    /// True if the first token is the given selector symbol.
    ///
    /// Convenience for handlers switching on messages like `[stop]` or
    /// `[set 3 0.5]`.
    pub fn selector_is(&self, selector: &str) -> bool {
        matches!(self.tokens.first(), Some(Token::Symbol(s)) if s == selector)
    }
}

impl core::fmt::Display for Message {
    /// Space-joined tokens, the way a patch file would spell them.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                Token::Bang => f.write_str("bang")?,
                Token::Float(v) => write!(f, "{v}")?,
                Token::Symbol(s) => f.write_str(s)?,
            }
        }
        Ok(())
    }
}
