//! The upload page.

use askama::Template;
use axum::response::Html;
use emolens_models::Endpoint;

use crate::error::ApiResult;
use crate::render::ResultView;
use crate::templates::Page;
use crate::workflow::Notice;

/// Render the page with the given notices and result.
pub fn render_page(
    selected: Endpoint,
    notices: &[Notice],
    result: Option<&ResultView>,
) -> ApiResult<Html<String>> {
    let body = Page::new(selected, notices, result).render()?;
    Ok(Html(body))
}

/// Empty upload form.
pub async fn index() -> ApiResult<Html<String>> {
    render_page(Endpoint::default(), &[], None)
}
