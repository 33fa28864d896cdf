//! In-memory stand-in for the REST API.
//!
//! Routes mirror the real server closely enough to exercise ownership
//! checks and 404 handling, and every request is recorded.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use scribe_sync::{
    ApiRequest, AuthSession, CommentClient, FormValue, Method, PostClient, RequestBody,
    StaticAuthProvider, Transport, TransportError,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

pub const CREATED_AT: &str = "2024-05-01T10:00:00.000Z";

/// Build an unsigned JWT carrying the claims the client reads
pub fn token(user_id: u64, role: &str, username: &str) -> String {
    let payload = json!({
        "id": user_id,
        "role": role,
        "username": username,
        "firstName": "Test",
        "lastName": "User",
    });
    format!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.sig",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

pub fn auth(user_id: u64, role: &str) -> Arc<StaticAuthProvider> {
    Arc::new(StaticAuthProvider::from_token(&token(user_id, role, "ada")).unwrap())
}

pub fn anonymous() -> Arc<StaticAuthProvider> {
    Arc::new(StaticAuthProvider::anonymous())
}

pub fn posts(server: &Arc<FakeServer>, auth: Arc<StaticAuthProvider>) -> PostClient {
    PostClient::new(server.clone(), auth)
}

pub fn comments(server: &Arc<FakeServer>, auth: Arc<StaticAuthProvider>) -> CommentClient {
    CommentClient::new(server.clone(), auth)
}

#[derive(Default)]
struct State {
    calls: Vec<ApiRequest>,
    posts: BTreeMap<u64, Value>,
    comments: BTreeMap<u64, Value>,
    users: Vec<String>,
    next_post_id: u64,
    next_comment_id: u64,
    fail_next: Option<TransportError>,
    answer_next: Option<Value>,
}

pub struct FakeServer {
    state: Mutex<State>,
    gate: Option<Arc<Notify>>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Requests are recorded, then held until `gate` is notified
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::build(Some(gate)))
    }

    fn build(gate: Option<Arc<Notify>>) -> Self {
        Self {
            state: Mutex::new(State {
                next_post_id: 42,
                next_comment_id: 100,
                ..State::default()
            }),
            gate,
        }
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Answer the next request with `err` instead of routing it
    pub fn fail_next(&self, err: TransportError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    /// Answer the next request with `value` instead of routing it
    pub fn answer_next(&self, value: Value) {
        self.state.lock().unwrap().answer_next = Some(value);
    }

    fn route(&self, request: &ApiRequest) -> Result<Value, TransportError> {
        let mut state = self.state.lock().unwrap();
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["user", "login"]) => {
                let body = json_body(request);
                if body["password"] == "secret" {
                    Ok(json!({
                        "data": token(7, "author", "ada"),
                        "message": "Login successful",
                    }))
                } else {
                    Err(TransportError::http(401, "Invalid credentials"))
                }
            }
            (Method::Post, ["user", "register"]) => {
                let body = json_body(request);
                let email = body["email"].as_str().unwrap_or_default().to_string();
                if email.is_empty() || body["password"].as_str().unwrap_or_default().is_empty() {
                    return Err(TransportError::http(400, "All fields are required"));
                }
                if state.users.contains(&email) {
                    return Err(TransportError::http(409, "User already exists"));
                }
                state.users.push(email.clone());
                Ok(json!({
                    "data": {
                        "id": 8 + state.users.len(),
                        "email": email,
                        "fname": body["fname"],
                        "lname": body["lname"],
                    },
                    "message": "User registered successfully",
                }))
            }
            (Method::Post, ["user", "logout"]) => Ok(json!({"message": "Logged out"})),

            (Method::Post, ["posts"]) => {
                let caller = caller(request)?;
                let id = state.next_post_id;
                state.next_post_id += 1;

                let image_url = match &request.body {
                    RequestBody::Form(parts) => parts.iter().find_map(|part| match &part.value {
                        FormValue::File(file) => {
                            Some(format!("https://cdn.test/{}", file.file_name))
                        }
                        FormValue::Text(_) => None,
                    }),
                    _ => None,
                };

                let post = json!({
                    "id": id,
                    "title": request.form_text("title"),
                    "description": request.form_text("description"),
                    "username": request.form_text("username"),
                    "user_id": caller.user_id.as_str().parse::<u64>().unwrap(),
                    "image_url": image_url,
                    "created_at": CREATED_AT,
                });
                state.posts.insert(id, post.clone());
                Ok(post)
            }
            (Method::Get, ["posts"]) => Ok(Value::Array(state.posts.values().cloned().collect())),
            (Method::Get, ["posts", "post", id]) => lookup(&state.posts, id)
                .cloned()
                .ok_or_else(|| TransportError::http(404, "Post not found")),
            (Method::Get, ["posts", user_id]) => {
                let posts: Vec<Value> = state
                    .posts
                    .values()
                    .filter(|post| id_of(&post["user_id"]) == *user_id)
                    .cloned()
                    .collect();
                if posts.is_empty() {
                    Err(TransportError::http(404, "No posts found"))
                } else {
                    Ok(Value::Array(posts))
                }
            }
            (Method::Patch, ["posts", id]) => {
                let caller = caller(request)?;
                let body = json_body(request);
                let post = lookup_mut(&mut state.posts, id)
                    .ok_or_else(|| TransportError::http(404, "Post not found"))?;
                authorize(&caller, &post["user_id"])?;

                for field in ["title", "description"] {
                    if let Some(value) = body.get(field) {
                        post[field] = value.clone();
                    }
                }
                Ok(post.clone())
            }
            (Method::Delete, ["posts", id]) => {
                let caller = caller(request)?;
                let post = lookup(&state.posts, id)
                    .ok_or_else(|| TransportError::http(404, "Post not found"))?;
                authorize(&caller, &post["user_id"])?;

                let key = post["id"].as_u64().unwrap();
                state.posts.remove(&key);
                Ok(json!({"message": "Post deleted"}))
            }

            (Method::Post, ["comments"]) => {
                let caller = caller(request)?;
                let body = json_body(request);
                let id = state.next_comment_id;
                state.next_comment_id += 1;

                let comment = json!({
                    "id": id,
                    "post_id": body["postId"],
                    "user_id": caller.user_id.as_str().parse::<u64>().unwrap(),
                    "comment": body["comment"],
                    "created_at": CREATED_AT,
                });
                state.comments.insert(id, comment.clone());
                Ok(comment)
            }
            (Method::Get, ["comments", post_id]) => {
                let comments: Vec<Value> = state
                    .comments
                    .values()
                    .filter(|comment| id_of(&comment["post_id"]) == *post_id)
                    .cloned()
                    .collect();
                if comments.is_empty() {
                    Err(TransportError::http(404, "No comments found"))
                } else {
                    Ok(Value::Array(comments))
                }
            }
            (Method::Patch, ["comments", id]) => {
                let caller = caller(request)?;
                let body = json_body(request);
                let comment = lookup_mut(&mut state.comments, id)
                    .ok_or_else(|| TransportError::http(404, "Comment not found"))?;
                authorize(&caller, &comment["user_id"])?;

                comment["comment"] = body["comment"].clone();
                Ok(comment.clone())
            }
            (Method::Delete, ["comments", id]) => {
                let caller = caller(request)?;
                let comment = lookup(&state.comments, id)
                    .ok_or_else(|| TransportError::http(404, "Comment not found"))?;
                authorize(&caller, &comment["user_id"])?;

                let key = comment["id"].as_u64().unwrap();
                state.comments.remove(&key);
                Ok(json!({"message": "Comment deleted"}))
            }

            _ => Err(TransportError::http(404, "Route not found")),
        }
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn request(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let (injected, canned) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(request.clone());
            (state.fail_next.take(), state.answer_next.take())
        };

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match (injected, canned) {
            (Some(err), _) => Err(err),
            (None, Some(value)) => Ok(value),
            (None, None) => self.route(&request),
        }
    }
}

fn json_body(request: &ApiRequest) -> Value {
    match &request.body {
        RequestBody::Json(body) => body.clone(),
        _ => Value::Null,
    }
}

fn caller(request: &ApiRequest) -> Result<AuthSession, TransportError> {
    request
        .bearer
        .as_deref()
        .and_then(|token| AuthSession::from_token(token).ok())
        .ok_or_else(|| TransportError::http(401, "Unauthorized"))
}

fn authorize(caller: &AuthSession, owner: &Value) -> Result<(), TransportError> {
    if caller.is_admin() || id_of(owner) == caller.user_id.as_str() {
        Ok(())
    } else {
        Err(TransportError::http(403, "Forbidden"))
    }
}

fn id_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn lookup<'a>(records: &'a BTreeMap<u64, Value>, id: &str) -> Option<&'a Value> {
    id.parse::<u64>().ok().and_then(|id| records.get(&id))
}

fn lookup_mut<'a>(records: &'a mut BTreeMap<u64, Value>, id: &str) -> Option<&'a mut Value> {
    id.parse::<u64>().ok().and_then(move |id| records.get_mut(&id))
}
