//! Shared error type for the Geneva optimization engine.
//!
//! Geneva's error taxonomy (see `spec.md` §7) distinguishes configuration
//! errors (fatal at setup), evaluation errors (per-individual, recovered by
//! the engine), and processing-phase errors (task failures surfaced from the
//! thread pool). All three share this single enum so callers can match on
//! [`ErrorCode`] without caring which layer raised the error.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

pub type GenevaResult<T> = Result<T, GenevaError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidConfig,
    InvalidParameter,
    Engine,
    Evaluation,
    ThreadPool,
    Random,
    Io,
    Multiple,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

#[derive(Debug)]
pub enum GenevaError {
    InvalidConfig {
        message: ErrString,
    },
    InvalidParameter {
        message: ErrString,
    },
    Engine {
        message: ErrString,
    },
    Evaluation {
        message: ErrString,
    },
    ThreadPool {
        message: ErrString,
    },
    Random {
        message: ErrString,
    },
    Io {
        message: ErrString,
    },

    Multiple(MultiDisplay),

    Context {
        context: ErrorContext,
        source: Box<GenevaError>,
    },
}

impl GenevaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::Engine { .. } => ErrorCode::Engine,
            Self::Evaluation { .. } => ErrorCode::Evaluation,
            Self::ThreadPool { .. } => ErrorCode::ThreadPool,
            Self::Random { .. } => ErrorCode::Random,
            Self::Io { .. } => ErrorCode::Io,
            Self::Multiple(_) => ErrorCode::Multiple,
            Self::Context { .. } => ErrorCode::Context,
        }
    }

    pub fn with_context(self, msg: impl Into<String>) -> Self {
        GenevaError::Context {
            context: ErrorContext::new(msg),
            source: Box::new(self),
        }
    }
}

impl Display for GenevaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { message } => write!(f, "invalid configuration: {}", message),
            Self::InvalidParameter { message } => write!(f, "invalid parameter: {}", message),
            Self::Engine { message } => write!(f, "engine error: {}", message),
            Self::Evaluation { message } => write!(f, "evaluation error: {}", message),
            Self::ThreadPool { message } => write!(f, "thread pool error: {}", message),
            Self::Random { message } => write!(f, "random number factory error: {}", message),
            Self::Io { message } => write!(f, "io error: {}", message),
            Self::Multiple(m) => write!(f, "multiple errors:\n{}", m),
            Self::Context {
                context, source, ..
            } => write!(f, "{}\ncaused by: {}", context, source),
        }
    }
}

impl std::error::Error for GenevaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ErrorContext {
    message: String,
}

impl ErrorContext {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorContext {}

#[derive(Debug)]
pub struct MultiDisplay(Vec<GenevaError>);

impl Display for MultiDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}] {} (code: {:?})", i, e, e.code())?;
        }
        Ok(())
    }
}

impl From<Vec<GenevaError>> for GenevaError {
    fn from(v: Vec<GenevaError>) -> Self {
        GenevaError::Multiple(MultiDisplay(v))
    }
}

/// Ergonomic `.context(...)` extension, in the style the teacher's
/// `radiate-error` crate provides.
pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> GenevaResult<T>;
    fn with_context<F: FnOnce() -> String>(self, f: F) -> GenevaResult<T>;
}

impl<T, E: Into<GenevaError>> ResultExt<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> GenevaResult<T> {
        self.map_err(|e| e.into().with_context(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> GenevaResult<T> {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[doc(hidden)]
pub mod __private {
    #[inline]
    #[cold]
    #[must_use]
    pub fn must_use<E>(e: E) -> E {
        e
    }
}

#[macro_export]
macro_rules! geneva_err {
    (InvalidConfig: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::InvalidConfig { message: format!($fmt, $($arg),*).into() })
    };
    (InvalidParameter: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::InvalidParameter { message: format!($fmt, $($arg),*).into() })
    };
    (Engine: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::Engine { message: format!($fmt, $($arg),*).into() })
    };
    (Evaluation: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::Evaluation { message: format!($fmt, $($arg),*).into() })
    };
    (ThreadPool: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::ThreadPool { message: format!($fmt, $($arg),*).into() })
    };
    (Random: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::Random { message: format!($fmt, $($arg),*).into() })
    };
    (Io: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::GenevaError::Io { message: format!($fmt, $($arg),*).into() })
    };
}

#[macro_export]
macro_rules! geneva_bail {
    ($($tt:tt)+) => { return Err($crate::geneva_err!($($tt)+)) };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($tt:tt)+) => {
        if !$cond { $crate::geneva_bail!($($tt)+); }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = GenevaError::InvalidConfig {
            message: "n_parents must be positive".into(),
        };
        assert!(err.to_string().contains("n_parents must be positive"));
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
    }

    #[test]
    fn context_chains_source() {
        let base = geneva_err!(Engine: "evaluation phase returned no individuals");
        let wrapped = base.with_context("halting optimization run");
        let rendered = wrapped.to_string();
        assert!(rendered.contains("halting optimization run"));
        assert!(rendered.contains("evaluation phase returned no individuals"));
    }

    #[test]
    fn multiple_formats_each_entry() {
        let errs: GenevaError = vec![
            geneva_err!(Evaluation: "objective panicked"),
            geneva_err!(ThreadPool: "worker 2 died"),
        ]
        .into();
        let rendered = errs.to_string();
        assert!(rendered.contains("[0]"));
        assert!(rendered.contains("[1]"));
    }
}
