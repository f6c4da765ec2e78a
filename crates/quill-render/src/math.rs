//! Failure-safe adapter over the KaTeX layout engine.
//!
//! The engine is treated as an external collaborator: it may reject input,
//! but the adapter never panics and never lets a failure escape past the
//! presenter. On error the caller falls back to showing the delimited
//! source text verbatim with an error indicator class.

use thiserror::Error;

/// Errors surfaced by the layout engine. Always recoverable: the caller
/// renders the literal source instead.
#[derive(Debug, Clone, Error)]
pub enum MathError {
    #[error("math engine rejected input: {0}")]
    Engine(String),
    #[error("invalid engine options: {0}")]
    Options(String),
}

impl From<katex::Error> for MathError {
    fn from(err: katex::Error) -> Self {
        MathError::Engine(err.to_string())
    }
}

impl From<katex::opts::OptsBuilderError> for MathError {
    fn from(err: katex::opts::OptsBuilderError) -> Self {
        MathError::Options(err.to_string())
    }
}

/// Layout engine seam. Production rendering goes through [`KatexEngine`];
/// tests substitute stubs to exercise both sides of the fallback contract.
pub trait MathEngine: Send + Sync {
    fn render(&self, tex: &str, display: bool) -> Result<String, MathError>;
}

/// KaTeX-backed engine, configured for best-effort rendering: invalid TeX
/// becomes error-colored output rather than a hard failure, and embedded
/// commands get no escalated privileges.
#[derive(Debug, Default, Clone, Copy)]
pub struct KatexEngine;

impl MathEngine for KatexEngine {
    fn render(&self, tex: &str, display: bool) -> Result<String, MathError> {
        let opts = katex::Opts::builder()
            .display_mode(display)
            .throw_on_error(false)
            .trust(false)
            .build()
            .map_err(MathError::from)?;
        katex::render_with_opts(tex, &opts).map_err(MathError::from)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{MathEngine, MathError};

    /// Engine that wraps input in a recognizable marker.
    pub struct EchoEngine;

    impl MathEngine for EchoEngine {
        fn render(&self, tex: &str, display: bool) -> Result<String, MathError> {
            Ok(format!("<math display=\"{display}\">{tex}</math>"))
        }
    }

    /// Engine that rejects everything.
    pub struct FailingEngine;

    impl MathEngine for FailingEngine {
        fn render(&self, _tex: &str, _display: bool) -> Result<String, MathError> {
            Err(MathError::Engine("engine unavailable".to_string()))
        }
    }
}
