//! Results of extraction steps that degrade instead of failing.

/// A value that was either fully extracted or replaced by a fallback.
///
/// Text and metadata extraction never abort a document. When they fail the
/// fallback value (empty text, empty metadata) is kept together with the
/// reason, so callers can tell "nothing there" from "could not read it".
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Extraction succeeded.
    Complete(T),
    /// Extraction failed; `value` is the fallback.
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    /// Build a degraded outcome.
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    /// The extracted or fallback value.
    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Why extraction failed, if it did.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Transform the value, keeping the degradation reason.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Complete(value) => Outcome::Complete(f(value)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}
