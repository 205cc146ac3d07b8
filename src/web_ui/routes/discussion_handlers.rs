//! Discussion board handlers.
//!
//! The step functions here are composed into per-route chains by
//! [`super::chain`]; the `axum` handlers at the bottom pick the chain for
//! each route.

use axum::{
    extract::{Form, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::entities::{comment, discussion, user};
use crate::db::{DiscussionPatch, NewDiscussion, PopulatedDiscussion};
use crate::error::{Result, ServerError};
use crate::state::AppState;

use super::chain::{run_chain, Action, ChainRequest, Locals, Step};
use super::utils::{
    flash_from_query, format_relative_time, get_current_user, page_context, render_template,
};

/// Where the collection lives; also the target after create and delete
pub const DISCUSSIONS_PATH: &str = "/discussions";

const DELETE_FAILED_REDIRECT: &str = "/discussions?error=delete_failed";

const SIGN_IN_REDIRECT: &str = "/login?error=login_required";

/// Body of the create and update forms.
///
/// There is deliberately no `author` field: the author comes from the
/// session on create and can never be changed through an update.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct DiscussionForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Comma-separated labels
    pub tags: Option<String>,
}

impl DiscussionForm {
    fn into_new(self) -> NewDiscussion {
        NewDiscussion {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
        }
    }

    fn into_patch(self) -> DiscussionPatch {
        DiscussionPatch {
            title: self.title,
            description: self.description,
            category: self.category,
            tags: self.tags.as_deref().map(parse_tags),
        }
    }
}

/// Split a comma-separated tag field, keeping submission order
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comment info for templates
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommentView {
    pub id: i32,
    pub author_id: i32,
    pub content: String,
    pub created_at: String,
}

/// Discussion info for templates
#[derive(Debug, Clone, serde::Serialize)]
pub struct DiscussionView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub author: String,
    pub author_id: i32,
    pub category: String,
    pub tags: Vec<String>,
    /// Tags as they appear in the edit form
    pub tags_input: String,
    pub views: i64,
    pub comments: Vec<CommentView>,
    pub created_at: String,
    pub updated_at: String,
}

impl DiscussionView {
    fn new(
        discussion: discussion::Model,
        author: Option<&user::Model>,
        comments: &[comment::Model],
    ) -> Self {
        let author = author
            .map(|u| u.display_name.clone().unwrap_or_else(|| u.username.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        let comments = comments
            .iter()
            .map(|c| CommentView {
                id: c.id,
                author_id: c.author_id,
                content: c.content.clone(),
                created_at: format_relative_time(c.created_at),
            })
            .collect();

        let tags = discussion.tags.0;
        Self {
            id: discussion.id,
            title: discussion.title,
            description: discussion.description,
            author,
            author_id: discussion.author_id,
            category: discussion.category,
            tags_input: tags.join(", "),
            tags,
            views: discussion.views,
            comments,
            created_at: format_relative_time(discussion.created_at),
            updated_at: format_relative_time(discussion.updated_at),
        }
    }

    fn populated(populated: PopulatedDiscussion) -> Self {
        Self::new(
            populated.discussion,
            populated.author.as_ref(),
            &populated.comments,
        )
    }
}

fn not_found(id: i32) -> ServerError {
    ServerError::NotFound(format!("Discussion {} not found", id))
}

fn sign_in_first() -> Step {
    Step::Respond(Redirect::to(SIGN_IN_REDIRECT).into_response())
}

// =============================================================================
// Chain steps
// =============================================================================

/// Empty creation form
pub fn new_form(request: &ChainRequest) -> Step {
    let context = page_context("new-discussion", "New Discussion", request.user.as_ref());
    Step::Respond(render_template("discussions/new.html", &context))
}

/// Persist a new discussion authored by the signed-in user
pub async fn create(state: &AppState, request: &ChainRequest, locals: &mut Locals) -> Result<Step> {
    let Some(author) = request.user.as_ref() else {
        return Ok(sign_in_first());
    };

    let fields = request.form.clone().unwrap_or_default().into_new();
    let created = state.discussions.create(fields, author).await?;
    tracing::info!("Discussion {} created by {}", created.id, author.username);

    locals.redirect = Some(DISCUSSIONS_PATH.to_string());
    locals.discussion = Some(DiscussionView::new(created, Some(author), &[]));
    Ok(Step::Continue)
}

/// Redirect if an earlier step asked for one
pub fn redirect_view(locals: &mut Locals) -> Step {
    match locals.redirect.take() {
        Some(path) => Step::Respond(Redirect::to(&path).into_response()),
        None => Step::Continue,
    }
}

/// Load every discussion with its author
pub async fn index(state: &AppState, locals: &mut Locals) -> Result<Step> {
    let discussions = state.discussions.find_all().await?;
    tracing::debug!("Listing {} discussions", discussions.len());

    locals.discussions = Some(
        discussions
            .into_iter()
            .map(|(disc, author)| DiscussionView::new(disc, author.as_ref(), &[]))
            .collect(),
    );
    Ok(Step::Continue)
}

pub fn index_view(request: &ChainRequest, locals: &Locals) -> Step {
    let mut context = page_context("discussions", "All Discussions", request.user.as_ref());
    context.insert("discussions", locals.discussions.as_deref().unwrap_or_default());
    context.insert("error", &request.flash);
    Step::Respond(render_template("discussions/index.html", &context))
}

/// Load one discussion and count the view
pub async fn show(state: &AppState, request: &ChainRequest, locals: &mut Locals) -> Result<Step> {
    let id = request.discussion_id()?;
    let mut found = state
        .discussions
        .find_by_id(id, true)
        .await?
        .ok_or_else(|| not_found(id))?;

    found.discussion = state
        .discussions
        .save_views(found.discussion)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::debug!("Discussion {} viewed ({} views)", id, found.discussion.views);

    locals.discussion = Some(DiscussionView::populated(found));
    Ok(Step::Continue)
}

pub fn show_view(request: &ChainRequest, locals: &Locals) -> Result<Step> {
    let discussion = locals.discussion.as_ref().ok_or_else(|| {
        ServerError::Internal("show view reached without a discussion".to_string())
    })?;

    let mut context = page_context(
        "discussion-details",
        "Discussion Details",
        request.user.as_ref(),
    );
    context.insert("discussion", discussion);
    Ok(Step::Respond(render_template("discussions/show.html", &context)))
}

/// Edit form pre-filled with the stored discussion
pub async fn edit(state: &AppState, request: &ChainRequest) -> Result<Step> {
    let id = request.discussion_id()?;
    let found = state
        .discussions
        .find_by_id(id, true)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut context = page_context("edit-discussion", "Edit Discussion", request.user.as_ref());
    context.insert("discussion", &DiscussionView::populated(found));
    Ok(Step::Respond(render_template("discussions/edit.html", &context)))
}

/// Apply the submitted fields, leaving everything else as stored
pub async fn update(state: &AppState, request: &ChainRequest, locals: &mut Locals) -> Result<Step> {
    let Some(editor) = request.user.as_ref() else {
        return Ok(sign_in_first());
    };
    let id = request.discussion_id()?;
    let patch = request.form.clone().unwrap_or_default().into_patch();

    let (updated, author) = state
        .discussions
        .find_by_id_and_update(id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("Discussion {} updated by {}", id, editor.username);

    locals.redirect = Some(format!("{}/{}", DISCUSSIONS_PATH, id));
    locals.discussion = Some(DiscussionView::new(updated, author.as_ref(), &[]));
    Ok(Step::Continue)
}

/// Remove a discussion. Signed-in requests always continue to the listing;
/// a store failure is logged and reported through the redirect instead of
/// an error page.
pub async fn delete(state: &AppState, request: &ChainRequest, locals: &mut Locals) -> Result<Step> {
    let Some(remover) = request.user.as_ref() else {
        return Ok(sign_in_first());
    };
    locals.redirect = Some(DISCUSSIONS_PATH.to_string());

    // A non-numeric id names nothing, so there is nothing to delete
    let Ok(id) = request.discussion_id() else {
        return Ok(Step::Continue);
    };

    match state.discussions.find_by_id_and_delete(id).await {
        Ok(true) => tracing::info!("Discussion {} deleted by {}", id, remover.username),
        Ok(false) => tracing::debug!("Discussion {} already gone", id),
        Err(e) => {
            tracing::error!("Error deleting discussion {}: {}", id, e);
            locals.redirect = Some(DELETE_FAILED_REDIRECT.to_string());
        }
    }
    Ok(Step::Continue)
}

// =============================================================================
// Routes
// =============================================================================

/// List discussions (GET /discussions)
pub async fn list_discussions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let request = ChainRequest {
        user: get_current_user(&state, &headers).await,
        flash: flash_from_query(&query, "error").map(str::to_string),
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::Index, Action::IndexView]).await
}

/// New discussion page (GET)
pub async fn new_discussion_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let request = ChainRequest {
        user: get_current_user(&state, &headers).await,
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::NewForm]).await
}

/// Create a new discussion (POST)
pub async fn create_discussion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<DiscussionForm>,
) -> Response {
    let request = ChainRequest {
        form: Some(form),
        user: get_current_user(&state, &headers).await,
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::Create, Action::RedirectView]).await
}

/// View a discussion
pub async fn discussion_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = ChainRequest {
        id: Some(id),
        user: get_current_user(&state, &headers).await,
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::Show, Action::ShowView]).await
}

/// Edit page (GET)
pub async fn edit_discussion_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = ChainRequest {
        id: Some(id),
        user: get_current_user(&state, &headers).await,
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::Edit]).await
}

/// Save edits (POST /update or PUT)
pub async fn update_discussion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<DiscussionForm>,
) -> Response {
    let request = ChainRequest {
        id: Some(id),
        form: Some(form),
        user: get_current_user(&state, &headers).await,
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::Update, Action::RedirectView]).await
}

/// Delete a discussion (POST /delete or DELETE)
pub async fn delete_discussion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = ChainRequest {
        id: Some(id),
        user: get_current_user(&state, &headers).await,
        ..Default::default()
    };
    run_chain(&state, &request, &[Action::Delete, Action::RedirectView]).await
}
