//! # Parse Results
//!
//! An envelope over a single-event source yields one value; an envelope
//! over a batch source (SQS, SNS, Kinesis) yields one value per record.
//! [`ParseResult`] keeps that distinction in the type so flattening is a
//! total operation instead of a runtime type check.

/// Either a single validated value or an ordered sequence of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<T> {
    /// Exactly one value.
    Single(T),
    /// Zero or more values, in source order.
    Many(Vec<T>),
}

impl<T> ParseResult<T> {
    /// Apply a fallible `f` to every contained value. Stops at the first
    /// error; no partial result is returned.
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<ParseResult<U>, E> {
        match self {
            Self::Single(v) => f(v).map(ParseResult::Single),
            Self::Many(vs) => vs
                .into_iter()
                .map(f)
                .collect::<Result<Vec<_>, _>>()
                .map(ParseResult::Many),
        }
    }

    /// Flatten into a vector. A single value becomes a one-element vector.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Single(v) => vec![v],
            Self::Many(vs) => vs,
        }
    }

    /// Number of contained values.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(vs) => vs.len(),
        }
    }

    /// True only for an empty `Many`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> IntoIterator for ParseResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}
