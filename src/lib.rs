pub mod compose;
pub mod config;
pub mod elements;
pub mod error;
pub mod github;
pub mod hydrate;
pub mod layout;
pub mod notebook;
pub mod page;
pub mod rich_text;
pub mod route;
pub mod source;
pub mod template;

use std::future::Future;

use maud::{Markup, PreEscaped};

use crate::compose::compose;
use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::hydrate::{hydrate, MountedPage};
use crate::layout::{base_layout, Assets};
use crate::route::Route;
use crate::source::{fetch_page, ContentSource};

/// Fetches, composes and hydrates one page view into a full HTML document.
///
/// Blocks still pending when `cancelled` resolves keep their placeholder.
pub async fn render_route<S, C>(
    config: &SiteConfig,
    assets: &Assets,
    source: &S,
    route: &Route,
    cancelled: C,
) -> Result<Markup, FetchError>
where
    S: ContentSource,
    C: Future<Output = ()>,
{
    let page = fetch_page(source, route).await?;
    let composed = compose(&page, route, config);
    let mut mounted = MountedPage::mount(&composed);
    let report = hydrate(&mut mounted, &composed.pending, source, cancelled).await;

    tracing::info!(
        class = %route.class,
        id = %route.id,
        loaded = report.loaded,
        failed = report.failed,
        cancelled = report.cancelled,
        "Rendered page"
    );

    Ok(base_layout(
        &composed.document_title,
        config,
        assets,
        PreEscaped(mounted.into_html()),
    ))
}
