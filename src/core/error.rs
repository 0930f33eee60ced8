//! Error types for presite operations.
//!
//! The crate uses a two-layer approach: [`PresiteError`] is the structured
//! domain error raised by core operations, while `anyhow::Error` carries it
//! (plus filesystem context) up to the CLI boundary. [`user_friendly_error`]
//! converts whatever arrives at that boundary into an [`ErrorContext`] with
//! an actionable suggestion for terminal display.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Structured errors raised by presite operations.
///
/// Note what is deliberately absent: there is no variant for missing or
/// malformed data-tree entries. The resolver maps both to a sentinel value
/// instead of an error, so an incomplete `data/` tree never aborts a build.
#[derive(Error, Debug)]
pub enum PresiteError {
    /// The given project root does not exist or is not a directory.
    #[error("Project directory not found: {path}")]
    ProjectNotFound {
        /// Path the user asked to build
        path: String,
    },

    /// The project has no `input/` directory to discover files in.
    #[error("Project has no input directory: {path}")]
    InputDirMissing {
        /// Expected location of the input directory
        path: String,
    },

    /// The renderer failed on a specific input file.
    ///
    /// Fatal to the whole build pass; there is no per-file isolation or
    /// retry. Callers wanting partial builds must wrap per-file work
    /// themselves.
    #[error("Failed to render {file}: {reason}")]
    RenderError {
        /// Input-relative path of the file that failed
        file: String,
        /// Renderer-provided failure description
        reason: String,
    },

    /// A renderer asked to read a path outside the project root.
    #[error("Render read escapes the project directory: {path}")]
    PathEscapesProject {
        /// The offending relative path
        path: String,
    },

    /// Filesystem operation failure with path context.
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// The operation that failed (e.g., "clear output", "write output")
        operation: String,
        /// The path involved
        path: String,
    },

    /// Generic error wrapper for miscellaneous failures.
    #[error("{message}")]
    Other {
        /// The error message
        message: String,
    },
}

/// An error paired with user-facing display context.
///
/// Produced by [`user_friendly_error`] at the CLI boundary and rendered
/// with [`ErrorContext::display`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: PresiteError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`PresiteError`].
    #[must_use]
    pub const fn new(error: PresiteError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    ///
    /// Suggestions should be actionable steps; they are displayed in green
    /// to draw attention.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details about the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with color.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with suggestions.
///
/// Recognizes [`PresiteError`] variants and common [`std::io::Error`] kinds;
/// anything else falls through to a generic context carrying the full error
/// chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(presite_error) = error.downcast_ref::<PresiteError>() {
        return contextualize(presite_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(PresiteError::Other {
                    message: format!("{error:#}"),
                })
                .with_suggestion(
                    "Check file ownership or run with permissions that can write the output directory",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(PresiteError::Other {
                    message: format!("{error:#}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    ErrorContext::new(PresiteError::Other {
        message: format!("{error:#}"),
    })
}

fn contextualize(error: &PresiteError) -> ErrorContext {
    match error {
        PresiteError::ProjectNotFound { path } => ErrorContext::new(PresiteError::ProjectNotFound {
            path: path.clone(),
        })
        .with_suggestion("Pass the path of a project directory containing an input/ tree"),

        PresiteError::InputDirMissing { path } => ErrorContext::new(PresiteError::InputDirMissing {
            path: path.clone(),
        })
        .with_suggestion("Create an input/ directory with your template files")
        .with_details("A presite project is laid out as input/, data/, and output/ under one root"),

        PresiteError::RenderError { file, reason } => ErrorContext::new(PresiteError::RenderError {
            file: file.clone(),
            reason: reason.clone(),
        })
        .with_suggestion("Fix the template error; run with --verbose for the full render trace"),

        PresiteError::PathEscapesProject { path } => {
            ErrorContext::new(PresiteError::PathEscapesProject { path: path.clone() })
                .with_details("Templates may only read files inside the project directory")
        }

        PresiteError::FileSystemError { operation, path } => {
            ErrorContext::new(PresiteError::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            })
            .with_suggestion("Check disk space and directory permissions")
        }

        PresiteError::Other { message } => ErrorContext::new(PresiteError::Other {
            message: message.clone(),
        }),
    }
}
