//! HTTP route handlers

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::{Draft, Record};
use crate::page::{view, PageController, PanelError, SubmitOutcome};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use uuid::Uuid;

// ============================================================================
// Health Check
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============================================================================
// Page
// ============================================================================

/// Fresh page load: fetch the list once and start a new page session.
///
/// A failing fetch is not handled here; it becomes the error page.
pub async fn load_page(State(state): State<AppState>) -> Result<Redirect> {
    let controller = PageController::load(state.api.as_ref()).await?;
    let id = state.sessions.create(controller).await;
    Ok(Redirect::to(&page_path(&id)))
}

pub async fn show_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = parse_page_id(&id)?;
    let html = state
        .sessions
        .update(&id, |page| {
            let notification = page.take_notification();
            view::render_page(&id, page, notification.as_ref())
        })
        .await?;
    Ok(Html(html))
}

/// Current list of a page as JSON
pub async fn list_records(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Record>>> {
    let id = parse_page_id(&id)?;
    let records = state
        .sessions
        .update(&id, |page| page.records().to_vec())
        .await?;
    Ok(Json(records))
}

// ============================================================================
// Creation panel
// ============================================================================

pub async fn open_panel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_page_id(&id)?;
    state.sessions.update(&id, |page| page.open()).await?;
    Ok(Redirect::to(&page_path(&id)))
}

pub async fn close_panel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_page_id(&id)?;
    let closed = state
        .sessions
        .update(&id, |page| page.close().map_err(|e| (e, page.panel().name())))
        .await?;
    if let Err((e, panel)) = closed {
        tracing::debug!("Ignoring close for page {} (panel {}): {}", id, panel, e);
    }
    Ok(Redirect::to(&page_path(&id)))
}

/// Submit the creation form.
///
/// The create request runs in its own task so it settles even if the client
/// goes away; the page stays `Submitting` until then and refuses further
/// submits.
pub async fn submit_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(draft): Form<Draft>,
) -> Result<Redirect> {
    let id = parse_page_id(&id)?;
    let redirect = Redirect::to(&page_path(&id));

    let payload = match state
        .sessions
        .update(&id, |page| {
            page.begin_submit(draft)
                .map_err(|e| (e, page.panel().name()))
        })
        .await?
    {
        Ok(payload) => payload,
        Err((PanelError::InvalidDraft(_), _)) => return Ok(redirect),
        Err((e, panel)) => {
            tracing::debug!("Ignoring submit for page {} (panel {}): {}", id, panel, e);
            return Ok(redirect);
        }
    };

    let api = state.api.clone();
    let sessions = state.sessions.clone();
    let task = tokio::spawn(async move {
        let result = api.create_record(&payload).await;
        sessions
            .update(&id, move |page| page.complete_submit(result))
            .await
    });

    match task.await {
        Ok(Ok(Ok(SubmitOutcome::Created))) => {}
        Ok(Ok(Ok(SubmitOutcome::Failed))) => {
            tracing::warn!("Create request for page {} failed", id);
        }
        Ok(Ok(Err(e))) => tracing::warn!("Create result for page {} not applied: {}", id, e),
        Ok(Err(e)) => tracing::warn!("Page {} went away during create: {}", id, e),
        Err(e) => tracing::error!("Create task for page {} panicked: {}", id, e),
    }

    Ok(redirect)
}

// ============================================================================
// Helpers
// ============================================================================

fn page_path(id: &Uuid) -> String {
    format!("/pages/{}", id)
}

fn parse_page_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::SessionNotFound(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::client::testing::{CreateMode, MockMemoirApi};
    use crate::client::MemoirApi;
    use crate::session::SessionStore;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
        Router,
    };
    use std::sync::Arc;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn app_with(api: Arc<MockMemoirApi>) -> (Router, Arc<SessionStore>) {
        let sessions = Arc::new(SessionStore::new(chrono::Duration::minutes(60), 100));
        let state = AppState {
            api: api as Arc<dyn MemoirApi>,
            sessions: sessions.clone(),
        };
        (create_router(state), sessions)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_form(uri: &str, form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Load the page and return its path
    async fn load(app: &Router) -> String {
        let response = send(app, get("/")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        location(&response)
    }

    async fn records(app: &Router, page: &str) -> Vec<Record> {
        let response = send(app, get(&format!("{}/records", page))).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(Arc::new(MockMemoirApi::new(vec![])));
        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_load_renders_initial_list() {
        let api = Arc::new(MockMemoirApi::new(vec![Record::new("a", "1")]));
        let (app, sessions) = app_with(api.clone());

        let page = load(&app).await;
        assert!(page.starts_with("/pages/"));
        assert_eq!(sessions.len().await, 1);

        let response = send(&app, get(&page)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<td>a</td><td>1</td>"));
        assert_eq!(records(&app, &page).await, vec![Record::new("a", "1")]);

        // Viewing the page again does not refetch
        send(&app, get(&page)).await;
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_each_load_is_a_new_page() {
        let api = Arc::new(MockMemoirApi::new(vec![]));
        let (app, sessions) = app_with(api.clone());

        let first = load(&app).await;
        let second = load(&app).await;
        assert_ne!(first, second);
        assert_eq!(sessions.len().await, 2);
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_is_error_page() {
        let (app, sessions) = app_with(Arc::new(MockMemoirApi::failing_list()));

        let response = send(&app, get("/")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("Something went wrong"));
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_appends_and_closes_panel() {
        let api = Arc::new(MockMemoirApi::new(vec![Record::new("a", "1")]));
        let (app, _) = app_with(api.clone());
        let page = load(&app).await;

        let response = send(&app, post(&format!("{}/panel/open", page))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(body_text(send(&app, get(&page)).await).await.contains("<aside"));

        let response = send(
            &app,
            post_form(&format!("{}/records", page), "label=b&value=2"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), page);

        assert_eq!(
            records(&app, &page).await,
            vec![Record::new("a", "1"), Record::new("b", "2")]
        );
        let html = body_text(send(&app, get(&page)).await).await;
        assert!(!html.contains("<aside"));
        assert!(html.contains("<td>b</td><td>2</td>"));
    }

    #[tokio::test]
    async fn test_create_failure_notifies_once_and_keeps_draft() {
        let api = Arc::new(
            MockMemoirApi::new(vec![Record::new("a", "1")]).with_create_mode(CreateMode::Fail),
        );
        let (app, _) = app_with(api.clone());
        let page = load(&app).await;

        send(&app, post(&format!("{}/panel/open", page))).await;
        send(
            &app,
            post_form(&format!("{}/records", page), "label=b&value=2"),
        )
        .await;

        assert_eq!(records(&app, &page).await, vec![Record::new("a", "1")]);

        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains(crate::page::CREATE_FAILED_MESSAGE));
        assert!(html.contains("<aside"));
        assert!(html.contains("value=\"b\""));
        assert!(html.contains("value=\"2\""));

        let html = body_text(send(&app, get(&page)).await).await;
        assert!(!html.contains(crate::page::CREATE_FAILED_MESSAGE));
        assert!(html.contains("value=\"b\""));
    }

    #[tokio::test]
    async fn test_missing_fields_never_reach_api() {
        let api = Arc::new(MockMemoirApi::new(vec![]));
        let (app, _) = app_with(api.clone());
        let page = load(&app).await;

        send(&app, post(&format!("{}/panel/open", page))).await;
        send(&app, post_form(&format!("{}/records", page), "label=&value=2")).await;
        send(&app, post_form(&format!("{}/records", page), "value=2")).await;

        assert_eq!(api.create_calls(), 0);
        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains(&format!(
            "role=\"alert\">{}</div>",
            crate::models::LABEL_REQUIRED
        )));
        assert!(records(&app, &page).await.is_empty());
    }

    #[tokio::test]
    async fn test_close_then_reopen_discards_draft() {
        let api = Arc::new(MockMemoirApi::new(vec![]));
        let (app, _) = app_with(api.clone());
        let page = load(&app).await;

        send(&app, post(&format!("{}/panel/open", page))).await;
        send(&app, post_form(&format!("{}/records", page), "label=abandoned&value=")).await;
        send(&app, post(&format!("{}/panel/close", page))).await;
        send(&app, post(&format!("{}/panel/open", page))).await;

        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains("<aside"));
        assert!(!html.contains("abandoned"));
    }

    #[tokio::test]
    async fn test_submit_while_closed_is_ignored() {
        let api = Arc::new(MockMemoirApi::new(vec![]));
        let (app, _) = app_with(api.clone());
        let page = load(&app).await;

        let response = send(
            &app,
            post_form(&format!("{}/records", page), "label=b&value=2"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(api.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_refused() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(MockMemoirApi::new(vec![]).with_gate(gate.clone()));
        let (app, _) = app_with(api.clone());
        let page = load(&app).await;
        send(&app, post(&format!("{}/panel/open", page))).await;

        let first = tokio::spawn({
            let app = app.clone();
            let uri = format!("{}/records", page);
            async move { app.oneshot(post_form(&uri, "label=b&value=2")).await.unwrap() }
        });
        while api.create_calls() == 0 {
            tokio::task::yield_now().await;
        }

        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains("Saving&hellip;"));

        let second = send(
            &app,
            post_form(&format!("{}/records", page), "label=b&value=2"),
        )
        .await;
        assert_eq!(second.status(), StatusCode::SEE_OTHER);
        assert_eq!(api.create_calls(), 1);

        gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first.status(), StatusCode::SEE_OTHER);
        assert_eq!(records(&app, &page).await, vec![Record::new("b", "2")]);
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let (app, _) = app_with(Arc::new(MockMemoirApi::new(vec![])));

        let response = send(&app, get(&format!("/pages/{}", Uuid::new_v4()))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page expired"));

        let response = send(&app, get("/pages/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, post(&format!("/pages/{}/panel/open", Uuid::new_v4()))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
