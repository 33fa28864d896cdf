//! Error types for the editor

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] scribe_parser::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A submit is already in flight")]
    SubmitInFlight,

    #[error("Submit #{0} is no longer current")]
    StaleSubmit(u64),

    #[error("File '{file_name}' is not an image ({mime_type})")]
    NotAnImage {
        file_name: String,
        mime_type: String,
    },
}

/// Input rejected before anything is sent
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: Field,
}

impl ValidationError {
    pub fn new(field: Field) -> Self {
        Self { field }
    }
}

/// The input a [`ValidationError`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
    CommentText,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => write!(f, "Title"),
            Field::Body => write!(f, "Body"),
            Field::CommentText => write!(f, "Comment text"),
        }
    }
}
