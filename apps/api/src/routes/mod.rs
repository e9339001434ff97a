pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::chat::handlers as chat;
use crate::community::handlers as community;
use crate::files;
use crate::kids::handlers as kids;
use crate::records::handlers as records;
use crate::state::AppState;
use crate::users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/users", post(users::create_user))
        .route("/api/v1/users/:user_id", get(users::get_user))
        // Kids
        .route("/api/v1/kids", get(kids::list_kids).post(kids::create_kid))
        .route(
            "/api/v1/kids/:kid_id",
            get(kids::get_kid)
                .put(kids::update_kid)
                .delete(kids::delete_kid),
        )
        .route("/api/v1/kids/:kid_id/dashboard", get(kids::get_dashboard))
        // Records. The second segment is a discriminant for GET/POST and
        // a record id for DELETE; the handlers parse it accordingly.
        .route("/api/v1/kids/:kid_id/records", get(records::list_records))
        .route(
            "/api/v1/kids/:kid_id/records/:arg",
            get(records::list_typed_records)
                .post(records::create_typed_record)
                .delete(records::delete_record),
        )
        // Chat
        .route(
            "/api/v1/chat/sessions",
            get(chat::list_sessions).post(chat::create_session),
        )
        .route(
            "/api/v1/chat/sessions/:session_id/messages",
            get(chat::list_messages).post(chat::post_message),
        )
        // Community
        .route(
            "/api/v1/community/posts",
            get(community::list_posts).post(community::create_post),
        )
        .route(
            "/api/v1/community/posts/:post_id",
            get(community::get_post).delete(community::delete_post),
        )
        .route(
            "/api/v1/community/posts/:post_id/comments",
            post(community::create_comment),
        )
        .route(
            "/api/v1/community/comments/:comment_id",
            delete(community::delete_comment),
        )
        .route(
            "/api/v1/community/posts/:post_id/like",
            put(community::like_post).delete(community::unlike_post),
        )
        // Files
        .route("/api/v1/files/upload", post(files::upload_file))
        .with_state(state)
}
