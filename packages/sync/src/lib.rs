//! # Scribe Sync
//!
//! Ties local edit sessions to posts and comments stored by the REST API.
//!
//! ```text
//! EditSession ──begin_submit──▶ Publisher ──▶ PostClient ──▶ Transport ──▶ API
//!      ▲                                                          │
//!      └────────── complete_submit / fail_submit ◀────────────────┘
//! ```
//!
//! - Every operation is one request, never retried.
//! - Validation and parse errors are raised before anything is sent.
//! - The server is authoritative: successful writes return its copy.
//! - Auth comes from an injected [`AuthProvider`] snapshot.

pub mod auth;
pub mod comments;
pub mod confirm;
pub mod error;
pub mod http;
pub mod models;
pub mod posts;
pub mod publish;
pub mod transport;
pub mod upload;

pub use auth::{
    ApiAuthProvider, AuthProvider, AuthSession, Registration, Role, StaticAuthProvider,
};
pub use comments::{can_modify, CommentClient};
pub use confirm::{AssumeYes, Confirm, DeleteOutcome};
pub use error::{SyncError, SyncResult};
pub use http::HttpTransport;
pub use models::{Comment, CommentId, Post, PostId, UserId};
pub use posts::{can_modify_post, PostClient, PostUpdate};
pub use publish::Publisher;
pub use transport::{
    ApiRequest, FormPart, FormValue, Method, RequestBody, Transport, TransportError,
};
pub use upload::{EmbedUploader, ImageUploader};
