//! Comments on posts.

use std::sync::Arc;

use scribe_editor::{Field, ValidationError};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::auth::{AuthProvider, AuthSession};
use crate::confirm::{Confirm, DeleteOutcome};
use crate::error::{SyncError, SyncResult};
use crate::models::{decode_list, decode_record, unwrap_envelope, Comment, CommentId, PostId};
use crate::transport::{ApiRequest, Transport, TransportError};

/// Whether `session` may edit or delete `comment`: its author or an admin.
///
/// Advisory only; the server has the final word.
pub fn can_modify(comment: &Comment, session: Option<&AuthSession>) -> bool {
    match session {
        Some(session) => {
            session.is_admin() || comment.author_id.as_ref() == Some(&session.user_id)
        }
        None => false,
    }
}

fn validate_text(text: &str) -> SyncResult<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::new(Field::CommentText).into());
    }
    Ok(text)
}

/// Client for `/comments`
#[derive(Clone)]
pub struct CommentClient {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthProvider>,
}

impl CommentClient {
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { transport, auth }
    }

    fn session(&self) -> SyncResult<AuthSession> {
        self.auth.current_session().ok_or(SyncError::AuthRequired)
    }

    pub async fn create(&self, post_id: &PostId, text: &str) -> SyncResult<Comment> {
        let text = validate_text(text)?;
        let session = self.session()?;

        let request = ApiRequest::post("/comments")
            .json(json!({ "postId": post_id, "comment": text }))
            .bearer(Some(session.token.clone()));

        let response = self.transport.request(request).await.map_err(|err| {
            warn!(post_id = %post_id, error = %err, "Creating comment failed");
            SyncError::from(err)
        })?;

        let mut comment: Comment = decode_record(response)?;
        comment.post_id.get_or_insert_with(|| post_id.clone());
        comment.author_id.get_or_insert(session.user_id);
        if comment.text.is_empty() {
            comment.text = text.to_string();
        }

        info!(post_id = %post_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    pub async fn update(&self, id: &CommentId, text: &str) -> SyncResult<Comment> {
        let text = validate_text(text)?;
        let session = self.session()?;

        let request = ApiRequest::patch(format!("/comments/{}", id))
            .json(json!({ "comment": text }))
            .bearer(Some(session.token));

        let response = self.transport.request(request).await.map_err(|err| {
            warn!(comment_id = %id, error = %err, "Updating comment failed");
            SyncError::from(err)
        })?;

        let mut response = unwrap_envelope(response);
        if let serde_json::Value::Object(map) = &mut response {
            map.entry("id").or_insert_with(|| json!(id));
            if !map.contains_key("comment") && !map.contains_key("text") {
                map.insert("comment".to_string(), json!(text));
            }
        }

        let comment = decode_record(response)?;
        info!(comment_id = %id, "Comment updated");
        Ok(comment)
    }

    /// Delete a comment after explicit confirmation
    pub async fn delete(&self, id: &CommentId, confirm: &dyn Confirm) -> SyncResult<DeleteOutcome> {
        let session = self.session()?;

        if !confirm.confirm(&format!("Delete comment {}?", id)) {
            debug!(comment_id = %id, "Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let request = ApiRequest::delete(format!("/comments/{}", id)).bearer(Some(session.token));
        self.transport.request(request).await.map_err(|err| {
            warn!(comment_id = %id, error = %err, "Deleting comment failed");
            SyncError::from(err)
        })?;

        info!(comment_id = %id, "Comment deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Comments on a post; a post without comments yields an empty list
    pub async fn list(&self, post_id: &PostId) -> SyncResult<Vec<Comment>> {
        let bearer = self.auth.current_session().map(|session| session.token);
        let request = ApiRequest::get(format!("/comments/{}", post_id)).bearer(bearer);

        let mut comments: Vec<Comment> = match self.transport.request(request).await {
            Ok(response) => decode_list(response)?,
            Err(TransportError::Http { status: 404, .. }) => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        for comment in &mut comments {
            comment.post_id.get_or_insert_with(|| post_id.clone());
        }
        Ok(comments)
    }
}
