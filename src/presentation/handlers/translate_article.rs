use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::application::ports::TranslationProvider;
use crate::application::services::ArticleTranslationRequest;
use crate::domain::Language;
use crate::presentation::state::AppState;

use super::error::error_response;

#[derive(Debug, Deserialize)]
pub struct TranslateArticleRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Omitted or `"auto"` lets the backend detect it.
    #[serde(default)]
    pub source_language: Option<String>,
    pub target_language: String,
}

/// Interactive single-article translation. Provider failures never fail the
/// request; the affected fields come back untranslated.
#[tracing::instrument(skip(state, request), fields(target = %request.target_language))]
pub async fn translate_article_handler<P>(
    State(state): State<AppState<P>>,
    Json(request): Json<TranslateArticleRequest>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let target_language = match request.target_language.parse::<Language>() {
        Ok(language) => language,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let source_language = match request.source_language.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) if code.eq_ignore_ascii_case("auto") => None,
        Some(code) => match code.parse::<Language>() {
            Ok(language) => Some(language),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
    };
    if request.title.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "title must not be empty");
    }

    let translation = state
        .article_translator
        .translate_article(ArticleTranslationRequest {
            title: request.title,
            description: request.description,
            content: request.content,
            source_language,
            target_language,
        })
        .await;

    (StatusCode::OK, Json(translation)).into_response()
}
