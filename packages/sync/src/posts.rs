//! Post lifecycle: create, read, update, delete and list.

use std::sync::Arc;

use scribe_editor::{Field, ImageFile, ValidationError};
use scribe_parser::{parse, PLACEHOLDER_BODY};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{AuthProvider, AuthSession};
use crate::confirm::{Confirm, DeleteOutcome};
use crate::error::{SyncError, SyncResult};
use crate::models::{decode_list, decode_record, unwrap_envelope, Post, PostId, UserId};
use crate::transport::{ApiRequest, FormPart, Transport, TransportError};

/// Fields to change on an existing post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Sent as `description`, the field the API stores bodies in
    #[serde(rename = "description", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PostUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    fn validate(&self) -> SyncResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(body) = &self.body {
            validate_body(body)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_title(title: &str) -> SyncResult<()> {
    if title.trim().is_empty() {
        return Err(ValidationError::new(Field::Title).into());
    }
    Ok(())
}

/// Body must parse and hold something besides the placeholder
pub(crate) fn validate_body(body: &str) -> SyncResult<()> {
    let document = parse(body)?;
    if body.trim() == PLACEHOLDER_BODY || document.is_blank() {
        return Err(ValidationError::new(Field::Body).into());
    }
    Ok(())
}

/// Whether `session` may edit or delete `post` (advisory, the server decides)
pub fn can_modify_post(post: &Post, session: Option<&AuthSession>) -> bool {
    match session {
        Some(session) => {
            session.is_admin() || post.author_id.as_ref() == Some(&session.user_id)
        }
        None => false,
    }
}

/// Fill fields the server left out of a write response with what was sent
fn with_sent_fields(value: Value, title: Option<&str>, body: Option<&str>) -> Value {
    let mut value = unwrap_envelope(value);

    if let Value::Object(map) = &mut value {
        if let Some(title) = title {
            map.entry("title").or_insert_with(|| Value::from(title));
        }
        if let Some(body) = body {
            let has_body = ["body", "content", "description"]
                .iter()
                .any(|key| map.get(*key).is_some_and(|value| !value.is_null()));
            if !has_body {
                map.insert("description".to_string(), Value::from(body));
            }
        }
    }

    value
}

/// Client for `/posts`
#[derive(Clone)]
pub struct PostClient {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthProvider>,
}

impl PostClient {
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { transport, auth }
    }

    fn session(&self) -> SyncResult<AuthSession> {
        self.auth.current_session().ok_or(SyncError::AuthRequired)
    }

    fn bearer(&self) -> Option<String> {
        self.auth.current_session().map(|session| session.token)
    }

    /// Publish a new post.
    ///
    /// The server assigns the id; the returned post is what it stored.
    pub async fn create(
        &self,
        title: &str,
        body: &str,
        image: Option<&ImageFile>,
    ) -> SyncResult<Post> {
        validate_title(title)?;
        validate_body(body)?;
        if let Some(file) = image {
            file.ensure_image()?;
        }
        let session = self.session()?;

        let title = title.trim();
        let mut parts = vec![
            FormPart::text("title", title),
            FormPart::text("description", body),
            FormPart::text("username", session.username.clone().unwrap_or_default()),
        ];
        if let Some(file) = image {
            parts.push(FormPart::file("image", file.clone()));
        }

        let request = ApiRequest::post("/posts")
            .form(parts)
            .bearer(Some(session.token));

        let response = self.transport.request(request).await.map_err(|err| {
            warn!(error = %err, "Creating post failed");
            SyncError::from(err)
        })?;

        let post: Post = decode_record(with_sent_fields(response, Some(title), Some(body)))?;
        info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// Fetch a single post; anonymous callers are allowed
    pub async fn fetch_one(&self, id: &PostId) -> SyncResult<Post> {
        debug!(post_id = %id, "Fetching post");

        let request = ApiRequest::get(format!("/posts/post/{}", id)).bearer(self.bearer());
        let response = self.transport.request(request).await?;
        decode_record(response)
    }

    /// Change an existing post. The server enforces owner-or-admin.
    pub async fn update(&self, id: &PostId, update: &PostUpdate) -> SyncResult<Post> {
        update.validate()?;
        let session = self.session()?;

        let request = ApiRequest::patch(format!("/posts/{}", id))
            .json(serde_json::to_value(update)?)
            .bearer(Some(session.token));

        let response = self.transport.request(request).await.map_err(|err| {
            warn!(post_id = %id, error = %err, "Updating post failed");
            SyncError::from(err)
        })?;

        let mut response =
            with_sent_fields(response, update.title.as_deref(), update.body.as_deref());
        if let Value::Object(map) = &mut response {
            map.entry("id").or_insert_with(|| Value::from(id.as_str()));
        }

        let post: Post = decode_record(response)?;
        info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Delete a post after explicit confirmation. There is no undo.
    pub async fn delete(&self, id: &PostId, confirm: &dyn Confirm) -> SyncResult<DeleteOutcome> {
        let session = self.session()?;

        if !confirm.confirm(&format!("Delete post {}? This cannot be undone.", id)) {
            debug!(post_id = %id, "Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let request = ApiRequest::delete(format!("/posts/{}", id)).bearer(Some(session.token));
        self.transport.request(request).await.map_err(|err| {
            warn!(post_id = %id, error = %err, "Deleting post failed");
            SyncError::from(err)
        })?;

        info!(post_id = %id, "Post deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Posts written by `user_id`; an author without posts yields an empty list
    pub async fn list_by_author(&self, user_id: &UserId) -> SyncResult<Vec<Post>> {
        let request = ApiRequest::get(format!("/posts/{}", user_id)).bearer(self.bearer());

        match self.transport.request(request).await {
            Ok(response) => decode_list(response),
            Err(TransportError::Http { status: 404, .. }) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list_all(&self) -> SyncResult<Vec<Post>> {
        let request = ApiRequest::get("/posts").bearer(self.bearer());
        let response = self.transport.request(request).await?;
        decode_list(response)
    }
}
