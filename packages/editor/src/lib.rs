//! # Scribe Editor
//!
//! Editing engine for a single post.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup ⇄ Document                   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession + mutations             │
//! │  - Apply structured edits with validation   │
//! │  - Re-serialize the body on every edit      │
//! │  - Track dirty / saving / saved / error     │
//! │  - Validate before any submit               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ sync: SubmitTicket → REST API → SavedPost   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use scribe_editor::{EditSession, SavedPost, SessionState};
//!
//! let mut session = EditSession::new();
//! session.set_title("Hello");
//! session.replace_body("<p>World</p>").unwrap();
//!
//! let ticket = session.begin_submit().unwrap();
//! assert_eq!(session.state(), SessionState::Saving);
//!
//! // ... send ticket.draft to the server ...
//!
//! session
//!     .complete_submit(
//!         ticket.id,
//!         SavedPost {
//!             post_id: "42".to_string(),
//!             title: "Hello".to_string(),
//!             body: "<p>World</p>".to_string(),
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(session.state(), SessionState::Saved);
//! ```

mod attachment;
mod errors;
mod mutations;
mod session;

pub use attachment::{mime_from_extension, ImageFile};
pub use errors::{EditorError, Field, ValidationError};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use session::{Draft, EditSession, SavedPost, SessionOrigin, SessionState, SubmitTicket};

// Re-export common types for convenience
pub use scribe_parser::{Block, Document, HeadingLevel, Image, ImageSource, Inline, Mark, Marks};
