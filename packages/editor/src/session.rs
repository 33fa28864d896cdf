//! # Edit Session
//!
//! Tracks one author's in-progress post: title, document tree, serialized
//! body, optional cover image, and where the post stands against the server.
//!
//! ```text
//!  Empty ──edit──┐
//!                ▼
//! Editing ──edit──▶ Dirty ──begin_submit──▶ Saving ──complete──▶ Saved
//!                     ▲                       │                    │
//!                     └──────edit──── Error ◀─┘ fail       reset ──▶ Empty
//! ```
//!
//! The session never performs I/O itself. A caller takes a [`SubmitTicket`]
//! from [`EditSession::begin_submit`], sends the request, then reports the
//! outcome with [`EditSession::complete_submit`] or
//! [`EditSession::fail_submit`]. Only one ticket is live at a time.

use std::fmt;

use scribe_parser::{parse, serialize, Document, ImageSource, Image, PLACEHOLDER_BODY};
use tracing::{debug, warn};

use crate::{EditorError, Field, ImageFile, Mutation, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Fresh session, body is the placeholder
    Empty,
    /// Existing post loaded, not modified yet
    Editing,
    Dirty,
    Saving,
    Saved,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Empty => "empty",
            SessionState::Editing => "editing",
            SessionState::Dirty => "dirty",
            SessionState::Saving => "saving",
            SessionState::Saved => "saved",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Whether a submit creates a post or updates one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOrigin {
    New,
    Existing { post_id: String },
}

/// Snapshot of the content being submitted
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub title: String,
    pub body: String,
    pub cover_image: Option<ImageFile>,
}

/// One in-flight write
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub id: u64,
    pub origin: SessionOrigin,
    pub draft: Draft,
}

/// Server's view of the post after a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPost {
    pub post_id: String,
    pub title: String,
    pub body: String,
}

/// Editable state of a single post
#[derive(Debug, Clone)]
pub struct EditSession {
    title: String,
    document: Document,
    /// Always `serialize(&document)`
    body: String,
    cover_image: Option<ImageFile>,
    dirty: bool,
    state: SessionState,
    origin: SessionOrigin,
    last_error: Option<String>,

    /// State to fall back to when an error is dismissed on clean content
    resume_state: SessionState,
    in_flight: Option<u64>,
    next_ticket: u64,
    edited_while_saving: bool,
}

impl EditSession {
    /// Create an empty session for a new post
    pub fn new() -> Self {
        let document = Document::new();
        Self {
            title: String::new(),
            body: serialize(&document),
            document,
            cover_image: None,
            dirty: false,
            state: SessionState::Empty,
            origin: SessionOrigin::New,
            last_error: None,
            resume_state: SessionState::Empty,
            in_flight: None,
            next_ticket: 1,
            edited_while_saving: false,
        }
    }

    /// Open an existing post for editing
    pub fn for_post(
        post_id: impl Into<String>,
        title: impl Into<String>,
        body: &str,
    ) -> Result<Self, EditorError> {
        let document = parse(body)?;
        let mut session = Self::new();
        session.title = title.into();
        session.body = serialize(&document);
        session.document = document;
        session.origin = SessionOrigin::Existing {
            post_id: post_id.into(),
        };
        session.state = SessionState::Editing;
        session.resume_state = SessionState::Editing;
        Ok(session)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialized body, kept in sync with every edit
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn cover_image(&self) -> Option<&ImageFile> {
        self.cover_image.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.state == SessionState::Saving
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn origin(&self) -> &SessionOrigin {
        &self.origin
    }

    pub fn post_id(&self) -> Option<&str> {
        match &self.origin {
            SessionOrigin::New => None,
            SessionOrigin::Existing { post_id } => Some(post_id),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title == self.title {
            return;
        }
        self.title = title;
        self.touch();
    }

    /// Apply a structured edit to the body
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        mutation.apply(&mut self.document)?;
        self.body = serialize(&self.document);
        self.touch();
        Ok(())
    }

    /// Replace the whole body with markup emitted by the editing surface.
    ///
    /// Markup equal to the current content is not an edit.
    pub fn replace_body(&mut self, markup: &str) -> Result<(), EditorError> {
        let document = parse(markup)?;
        if document == self.document {
            return Ok(());
        }
        self.body = serialize(&document);
        self.document = document;
        self.touch();
        Ok(())
    }

    pub fn insert_image(&mut self, index: usize, source: ImageSource) -> Result<(), EditorError> {
        self.apply(Mutation::InsertImage {
            index,
            image: Image::new(source),
        })
    }

    pub fn set_cover_image(&mut self, image: Option<ImageFile>) -> Result<(), EditorError> {
        if let Some(file) = &image {
            file.ensure_image()?;
        }
        if image == self.cover_image {
            return Ok(());
        }
        self.cover_image = image;
        self.touch();
        Ok(())
    }

    /// Check that the content may be submitted
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new(Field::Title));
        }
        if self.body == PLACEHOLDER_BODY || self.document.is_blank() {
            return Err(ValidationError::new(Field::Body));
        }
        Ok(())
    }

    /// Enter `Saving` and hand out the ticket for the write.
    ///
    /// Fails without changing state when a submit is already in flight or
    /// the content does not validate.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, EditorError> {
        if self.state == SessionState::Saving {
            warn!(ticket = ?self.in_flight, "Submit rejected, one is already in flight");
            return Err(EditorError::SubmitInFlight);
        }
        self.validate()?;

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        self.edited_while_saving = false;
        if self.state != SessionState::Error {
            self.resume_state = self.state;
        }
        self.state = SessionState::Saving;

        debug!(ticket = id, origin = ?self.origin, "Submit started");

        Ok(SubmitTicket {
            id,
            origin: self.origin.clone(),
            draft: Draft {
                title: self.title.trim().to_string(),
                body: self.body.clone(),
                cover_image: self.cover_image.clone(),
            },
        })
    }

    /// Record a successful write.
    ///
    /// The server's title and body replace local content, unless the author
    /// kept editing while the request was out; those edits are kept and the
    /// session lands in `Dirty`.
    pub fn complete_submit(&mut self, ticket_id: u64, saved: SavedPost) -> Result<(), EditorError> {
        self.finish_ticket(ticket_id)?;

        self.origin = SessionOrigin::Existing {
            post_id: saved.post_id,
        };
        self.last_error = None;

        if self.edited_while_saving {
            debug!(ticket = ticket_id, "Submit completed, keeping edits made while saving");
            self.dirty = true;
            self.state = SessionState::Dirty;
            return Ok(());
        }

        match parse(&saved.body) {
            Ok(document) => {
                self.body = serialize(&document);
                self.document = document;
            }
            Err(err) => {
                warn!(error = %err, "Saved body does not parse, keeping local content");
            }
        }
        self.title = saved.title;
        self.dirty = false;
        self.state = SessionState::Saved;

        debug!(ticket = ticket_id, "Submit completed");
        Ok(())
    }

    /// Record a failed write. Content and dirty flag are left as they were.
    pub fn fail_submit(
        &mut self,
        ticket_id: u64,
        message: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.finish_ticket(ticket_id)?;

        let message = message.into();
        warn!(ticket = ticket_id, error = %message, "Submit failed");

        self.last_error = Some(message);
        self.state = SessionState::Error;
        Ok(())
    }

    /// Clear a displayed error and return to the last stable state
    pub fn dismiss_error(&mut self) {
        if self.state != SessionState::Error {
            return;
        }
        self.last_error = None;
        self.state = if self.dirty {
            SessionState::Dirty
        } else {
            self.resume_state
        };
    }

    /// Start over with an empty post ("write another").
    ///
    /// Any write still in flight becomes stale.
    pub fn reset(&mut self) {
        let next_ticket = self.next_ticket;
        *self = Self::new();
        self.next_ticket = next_ticket;
        debug!("Session reset");
    }

    fn finish_ticket(&mut self, ticket_id: u64) -> Result<(), EditorError> {
        match self.in_flight {
            Some(current) if current == ticket_id => {
                self.in_flight = None;
                Ok(())
            }
            _ => {
                warn!(ticket = ticket_id, "Ignoring outcome of stale submit");
                Err(EditorError::StaleSubmit(ticket_id))
            }
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        match self.state {
            SessionState::Saving => self.edited_while_saving = true,
            _ => {
                self.state = SessionState::Dirty;
                self.last_error = None;
            }
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
