// SPDX-License-Identifier: MIT

//! User-facing error display: what went wrong, and how to fix it.
//!
//! Library crates return precise `thiserror` enums; at the CLI boundary
//! those get wrapped here with the context and suggestions a human
//! reading a terminal actually needs.

use std::fmt;

#[derive(Debug)]
pub struct LoomError {
    pub message: String,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LoomError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for LoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for LoomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[allow(dead_code)]
impl LoomError {
    /// A job paused on an ambiguous design query.
    pub fn needs_selection(candidates: &[loom_orchestrator::Candidate]) -> Self {
        let mut err = LoomError::new(format!(
            "design query matched {} candidates",
            candidates.len()
        ))
        .with_context("the locator cannot pick one design DB on its own")
        .with_suggestion("re-run with --select <path> naming the candidate to use");
        for candidate in candidates {
            err = err.with_context(format!(
                "{} ({} bytes, modified {})",
                candidate.path, candidate.size, candidate.mtime
            ));
        }
        err
    }

    /// A job reached a terminal failure; point at the debug bundle.
    pub fn job_failed(run_dir: &std::path::Path, error_type: loom_core::ErrorType) -> Self {
        LoomError::new(format!("job failed: {error_type}"))
            .with_context(format!("run dir: {}", run_dir.display()))
            .with_suggestion(format!(
                "inspect the debug bundle: {}",
                run_dir.join("debug_bundle").join("index.json").display()
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_suggestions() {
        let err = LoomError::new("something broke")
            .with_context("first context")
            .with_suggestion("try this");
        let output = format!("{err}");
        assert!(output.contains("error: something broke"));
        assert!(output.contains("-> first context"));
        assert!(output.contains("1. try this"));
    }

    #[test]
    fn needs_selection_lists_every_candidate() {
        let candidates = vec![loom_orchestrator::Candidate {
            path: "/designs/chip.enc".to_string(),
            mtime: "2026-01-01T00:00:00Z".to_string(),
            size: 42,
        }];
        let err = LoomError::needs_selection(&candidates);
        let output = format!("{err}");
        assert!(output.contains("/designs/chip.enc"));
    }
}
