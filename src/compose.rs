use chrono::NaiveDate;
use maud::{html, Markup};

use crate::config::SiteConfig;
use crate::elements::{brief_line, render_element, PendingScript, RenderContext};
use crate::page::Page;
use crate::route::Route;

/// A page rendered into its container markup, before hydration.
pub struct ComposedPage {
    /// Page title after placeholder expansion.
    pub title: String,
    pub document_title: String,
    pub body: Markup,
    pub pending: Vec<PendingScript>,
}

pub fn compose(page: &Page, route: &Route, config: &SiteConfig) -> ComposedPage {
    let ctx = RenderContext::new(config, route, page);
    let title = ctx.resolver().placeholders().title().to_string();

    let mut pending = Vec::new();
    let mut fragments = Vec::with_capacity(page.elements.len());
    for (index, element) in page.elements.iter().enumerate() {
        let fragment = render_element(element, &ctx, index);
        pending.extend(fragment.pending);
        fragments.push(fragment.markup);
    }

    let body = html! {
        (render_header(&title, page, route))
        @if !page.brief.is_empty() {
            section class="abstract" {
                h2 class="abstract-title" { "Abstract" }
                ol class="abstract-list" {
                    @for line in &page.brief {
                        li { (brief_line(line)) }
                    }
                }
            }
        }
        div class="elements" {
            @for fragment in &fragments { (fragment) }
        }
    };

    tracing::debug!(
        class = %route.class,
        id = %route.id,
        elements = page.elements.len(),
        pending = pending.len(),
        "Composed page"
    );

    ComposedPage {
        document_title: config.document_title_for(&title),
        title,
        body,
        pending,
    }
}

fn render_header(title: &str, page: &Page, route: &Route) -> Markup {
    let page_type = page.page_type.as_deref().filter(|t| !t.trim().is_empty());
    html! {
        header class="page-header" {
            h1 class="page-title" { (title) }
            div class="chips" {
                span class="chip chip-class" { (route.class) }
                @if let Some(page_type) = page_type {
                    span class="chip chip-type" { (page_type) }
                }
                @if let Some(date) = &page.date {
                    span class="chip chip-date" {
                        time datetime=[iso_date(date)] { (date) }
                    }
                }
            }
        }
    }
}

/// ISO form of the hand-written date formats notebook pages use.
pub fn iso_date(raw: &str) -> Option<String> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%m-%d-%y",
        "%m-%d-%Y",
        "%m/%d/%Y",
        "%m/%d/%y",
        "%B %d, %Y",
    ];
    let trimmed = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}
