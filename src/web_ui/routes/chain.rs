//! Handler chains.
//!
//! A route is an ordered list of [`Action`]s. Each action either fills in
//! [`Locals`] and lets the next one run, or ends the request with a
//! response. Errors stop the chain and go to the central error page.

use axum::response::{IntoResponse, Response};

use crate::db::entities::user;
use crate::error::{Result, ServerError};
use crate::state::AppState;

use super::discussion_handlers::{self as steps, DiscussionForm, DiscussionView};

/// One step of a discussion route
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    NewForm,
    Create,
    RedirectView,
    Index,
    IndexView,
    Show,
    ShowView,
    Edit,
    Update,
    Delete,
}

/// What a step decided
pub enum Step {
    Continue,
    Respond(Response),
}

/// Results handed from one step to the next
#[derive(Debug, Default)]
pub struct Locals {
    pub redirect: Option<String>,
    pub discussion: Option<DiscussionView>,
    pub discussions: Option<Vec<DiscussionView>>,
}

/// The parsed request a chain works on
#[derive(Debug, Default)]
pub struct ChainRequest {
    /// Raw `:id` route parameter
    pub id: Option<String>,
    pub form: Option<DiscussionForm>,
    /// The signed-in user, if any
    pub user: Option<user::Model>,
    /// Message carried over from a previous redirect
    pub flash: Option<String>,
}

impl ChainRequest {
    /// The route id as a discussion key. Anything that is not an integer
    /// cannot name a discussion, so it is reported as not found.
    pub fn discussion_id(&self) -> Result<i32> {
        let raw = self.id.as_deref().unwrap_or_default();
        raw.parse()
            .map_err(|_| ServerError::NotFound(format!("Discussion {} not found", raw)))
    }
}

async fn run_step(
    state: &AppState,
    request: &ChainRequest,
    locals: &mut Locals,
    action: Action,
) -> Result<Step> {
    match action {
        Action::NewForm => Ok(steps::new_form(request)),
        Action::Create => steps::create(state, request, locals).await,
        Action::RedirectView => Ok(steps::redirect_view(locals)),
        Action::Index => steps::index(state, locals).await,
        Action::IndexView => Ok(steps::index_view(request, locals)),
        Action::Show => steps::show(state, request, locals).await,
        Action::ShowView => steps::show_view(request, locals),
        Action::Edit => steps::edit(state, request).await,
        Action::Update => steps::update(state, request, locals).await,
        Action::Delete => steps::delete(state, request, locals).await,
    }
}

/// Run `actions` in order until one responds
pub async fn run_chain(state: &AppState, request: &ChainRequest, actions: &[Action]) -> Response {
    let mut locals = Locals::default();

    for &action in actions {
        match run_step(state, request, &mut locals, action).await {
            Ok(Step::Continue) => continue,
            Ok(Step::Respond(response)) => return response,
            Err(e) => {
                if matches!(e, ServerError::NotFound(_)) {
                    tracing::warn!("{:?}: {}", action, e);
                }
                return e.into_response();
            }
        }
    }

    ServerError::Internal(format!("handler chain {:?} produced no response", actions))
        .into_response()
}
