//! `Outcome<T, E>`: an explicit `Success`/`Failure` sum type.
//!
//! Used at fallible boundaries that must be testable without exception
//! capture — the Validator and Invoice Engine return this rather than
//! `std::result::Result` so test code can match on the variant directly
//! and so `map`/`and_then` chains make short-circuiting visible at the
//! call site.

/// Sum type with variants `Success(T)` and `Failure(E)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Success(T),
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Apply `f` to a `Success` value; short-circuits on `Failure`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Outcome::Success(t) => Outcome::Success(f(t)),
            Outcome::Failure(e) => Outcome::Failure(e),
        }
    }

    /// Apply `f` to a `Failure` value; short-circuits on `Success`.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Outcome::Success(t) => Outcome::Success(t),
            Outcome::Failure(e) => Outcome::Failure(f(e)),
        }
    }

    /// Chain a further fallible step; short-circuits on `Failure`.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U, E>) -> Outcome<U, E> {
        match self {
            Outcome::Success(t) => f(t),
            Outcome::Failure(e) => Outcome::Failure(e),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(t) => Some(t),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(self) -> Option<E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }
}

impl<T, E> From<std::result::Result<T, E>> for Outcome<T, E> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(t) => Outcome::Success(t),
            Err(e) => Outcome::Failure(e),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for std::result::Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(t) => Ok(t),
            Outcome::Failure(e) => Err(e),
        }
    }
}
