//! Submitting an edit session to the server.

use scribe_editor::{EditSession, SavedPost, SessionOrigin};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::SyncResult;
use crate::models::{Post, PostId};
use crate::posts::{PostClient, PostUpdate};

/// Drives one submit: ticket, request, outcome
#[derive(Clone)]
pub struct Publisher {
    posts: PostClient,
}

impl Publisher {
    pub fn new(posts: PostClient) -> Self {
        Self { posts }
    }

    /// Create or update the post behind `session`.
    ///
    /// The lock is released while the request is out, so the author can
    /// keep editing. A second submit in the meantime is rejected by the
    /// session without reaching the network.
    pub async fn submit(&self, session: &Mutex<EditSession>) -> SyncResult<Post> {
        let ticket = session.lock().await.begin_submit()?;
        let draft = &ticket.draft;

        let result = match &ticket.origin {
            SessionOrigin::New => {
                self.posts
                    .create(&draft.title, &draft.body, draft.cover_image.as_ref())
                    .await
            }
            SessionOrigin::Existing { post_id } => {
                let update = PostUpdate::full(draft.title.clone(), draft.body.clone());
                self.posts.update(&PostId::new(post_id.as_str()), &update).await
            }
        };

        let mut session = session.lock().await;
        match result {
            Ok(post) => {
                let saved = SavedPost {
                    post_id: post.id.to_string(),
                    title: post.title.clone(),
                    body: post.body.clone(),
                };
                if let Err(err) = session.complete_submit(ticket.id, saved) {
                    debug!(error = %err, post_id = %post.id, "Session moved on before the save landed");
                }
                Ok(post)
            }
            Err(err) => {
                if let Err(stale) = session.fail_submit(ticket.id, err.to_string()) {
                    warn!(error = %stale, "Session moved on before the failure landed");
                }
                Err(err)
            }
        }
    }
}
