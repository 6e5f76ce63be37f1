//! Element renderer registry.
//!
//! Normalized type tags map to an [`ElementKind`]; [`render_element`]
//! dispatches each kind to its renderer. Every renderer takes the element,
//! the shared [`RenderContext`] and the element's position, and returns a
//! [`Fragment`]: the section markup plus any script blocks left pending for
//! the hydrator.

use std::collections::HashMap;

use lazy_static::lazy_static;
use maud::{html, Markup, PreEscaped};
use regex::Regex;

use crate::config::SiteConfig;
use crate::page::{BriefElement, Element, Item, MediaElement, Page, TextElement, UnknownElement};
use crate::rich_text::{format, format_paragraphs};
use crate::route::Route;
use crate::template::Resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Synopsis,
    DesignBrief,
    Notes,
    Pdf,
    Video,
    Script,
    Image,
}

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, ElementKind> = HashMap::from([
        ("synopsis", ElementKind::Synopsis),
        ("designbrief", ElementKind::DesignBrief),
        ("notes", ElementKind::Notes),
        ("pdf", ElementKind::Pdf),
        ("video", ElementKind::Video),
        ("script", ElementKind::Script),
        ("image", ElementKind::Image),
        ("images", ElementKind::Image),
    ]);
}

/// Lowercases and drops all whitespace: `"Design Brief"` → `"designbrief"`.
pub fn normalize_tag(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ElementKind {
    pub fn from_tag(raw: &str) -> Option<Self> {
        REGISTRY.get(normalize_tag(raw).as_str()).copied()
    }

    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Synopsis => "synopsis",
            ElementKind::DesignBrief => "designbrief",
            ElementKind::Notes => "notes",
            ElementKind::Pdf => "pdf",
            ElementKind::Video => "video",
            ElementKind::Script => "script",
            ElementKind::Image => "image",
        }
    }
}

pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub route: &'a Route,
    pub page: &'a Page,
    resolver: Resolver<'a>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a SiteConfig, route: &'a Route, page: &'a Page) -> Self {
        Self {
            config,
            route,
            page,
            resolver: Resolver::new(config, page, route),
        }
    }

    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    fn resolve_item(&self, item: &Item) -> Option<String> {
        item.src.as_deref().and_then(|src| self.resolver.resolve(src))
    }
}

/// A script block whose text is loaded after the page is mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScript {
    pub block_id: String,
    pub locator: String,
    pub language: Option<String>,
}

pub enum BlockContent<'t> {
    Pending,
    Loaded(&'t str),
    Failed(&'t str),
}

impl PendingScript {
    pub fn markup(&self, content: BlockContent<'_>) -> Markup {
        code_markup(&self.block_id, self.language.as_deref(), Some(&self.locator), content)
    }
}

pub struct Fragment {
    pub markup: Markup,
    pub pending: Vec<PendingScript>,
}

impl From<Markup> for Fragment {
    fn from(markup: Markup) -> Self {
        Self {
            markup,
            pending: Vec::new(),
        }
    }
}

pub fn render_element(element: &Element, ctx: &RenderContext<'_>, index: usize) -> Fragment {
    match element {
        Element::Synopsis(text) => {
            render_text(ElementKind::Synopsis, "Synopsis", text, index).into()
        }
        Element::DesignBrief(brief) => render_design_brief(brief, index).into(),
        Element::Notes(text) => render_text(ElementKind::Notes, "Notes", text, index).into(),
        Element::Pdf(media) => render_pdf(media, ctx, index).into(),
        Element::Video(media) => render_video(media, ctx, index).into(),
        Element::Script(media) => render_script(media, ctx, index),
        Element::Image(media) => render_images(media, ctx, index).into(),
        Element::Unknown(unknown) => render_unknown(unknown, index).into(),
    }
}

fn section(kind_class: &str, index: usize, title: &str, body: Markup) -> Markup {
    html! {
        section class={ "element element-" (kind_class) } id={ "element-" (index) } {
            h2 class="element-title" { (title) }
            (body)
        }
    }
}

fn card(text: &str) -> Markup {
    html! {
        div class="card" { (PreEscaped(format_paragraphs(text))) }
    }
}

fn first_label<'e>(candidates: &[Option<&'e String>], fallback: &'e str) -> &'e str {
    candidates
        .iter()
        .flatten()
        .map(|value| value.as_str())
        .find(|value| !value.trim().is_empty())
        .unwrap_or(fallback)
}

fn render_text(kind: ElementKind, fallback: &str, text: &TextElement, index: usize) -> Markup {
    let title = match kind {
        ElementKind::Notes => first_label(&[text.title.as_ref(), text.label.as_ref()], fallback),
        _ => first_label(&[text.title.as_ref()], fallback),
    };
    section(kind.tag(), index, title, card(&text.content))
}

fn render_design_brief(brief: &BriefElement, index: usize) -> Markup {
    let title = first_label(&[brief.title.as_ref()], "Design Brief");
    let body = match &brief.entries {
        Some(entries) => html! {
            @for entry in entries { (card(entry)) }
        },
        None => card(&brief.content),
    };
    section(ElementKind::DesignBrief.tag(), index, title, body)
}

fn media_title<'e>(media: &'e MediaElement, fallback: &'e str) -> &'e str {
    first_label(&[media.title.as_ref(), media.label.as_ref()], fallback)
}

fn empty_note(message: &str) -> Markup {
    html! { p class="card empty-state" { (message) } }
}

fn file_name(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn render_pdf(media: &MediaElement, ctx: &RenderContext<'_>, index: usize) -> Markup {
    let zoom = &ctx.config.pdf_zoom_level;
    let documents: Vec<(&Item, String)> = media
        .items
        .iter()
        .filter_map(|item| ctx.resolve_item(item).map(|src| (item, src)))
        .collect();

    let body = html! {
        @if documents.is_empty() {
            (empty_note("No documents attached."))
        } @else {
            div class="media-list" {
                @for (item, src) in &documents {
                    @let label = first_label(&[item.label.as_ref()], "PDF");
                    figure class="media pdf-item" {
                        iframe class="pdf-viewer" src={ (src) "#zoom=" (zoom) } title=(label) loading="lazy" {}
                        figcaption class="media-caption" {
                            span class="media-label" { (label) }
                            div class="media-actions" {
                                a class="btn" href=(src) target="_blank" rel="noopener noreferrer" { "Open in new tab" }
                                a class="btn" href=(src) download=(file_name(item.src.as_deref().unwrap_or(src.as_str()))) { "Download" }
                            }
                        }
                    }
                }
            }
        }
    };
    section(ElementKind::Pdf.tag(), index, media_title(media, "PDF"), body)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Hosted video rewritten to the provider's embed locator.
    Embed(String),
    /// Direct file played by a native `<video>` element.
    Native(String),
    Frame(String),
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "ogv", "mov", "m4v"];

pub fn classify_video(src: &str) -> VideoSource {
    lazy_static! {
        static ref YOUTUBE_RE: Regex = Regex::new(
            r"(?i)^https?://(?:www\.|m\.)?(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
        )
        .unwrap();
        static ref VIMEO_RE: Regex =
            Regex::new(r"(?i)^https?://(?:www\.)?vimeo\.com/(?:video/)?(\d+)(?:[/?#]|$)").unwrap();
    }

    if let Some(caps) = YOUTUBE_RE.captures(src) {
        return VideoSource::Embed(format!("https://www.youtube.com/embed/{}", &caps[1]));
    }
    if let Some(caps) = VIMEO_RE.captures(src) {
        return VideoSource::Embed(format!("https://player.vimeo.com/video/{}", &caps[1]));
    }

    let path = src.split(['?', '#']).next().unwrap_or(src).to_ascii_lowercase();
    let is_native = path
        .rsplit_once('.')
        .map(|(_, ext)| VIDEO_EXTENSIONS.contains(&ext))
        .unwrap_or(false);
    if is_native {
        VideoSource::Native(src.to_string())
    } else {
        VideoSource::Frame(src.to_string())
    }
}

fn render_video(media: &MediaElement, ctx: &RenderContext<'_>, index: usize) -> Markup {
    let videos: Vec<(&Item, String)> = media
        .items
        .iter()
        .filter_map(|item| ctx.resolve_item(item).map(|src| (item, src)))
        .collect();

    let body = html! {
        @if videos.is_empty() {
            (empty_note("No videos attached."))
        } @else {
            div class="media-list" {
                @for (item, src) in &videos {
                    @let label = first_label(&[item.label.as_ref()], "Video");
                    figure class="media video-item" {
                        @match classify_video(src) {
                            VideoSource::Embed(embed) => {
                                iframe class="video-embed" src=(embed) title=(label)
                                    allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                                    allowfullscreen {}
                            }
                            VideoSource::Native(file) => {
                                video class="video-player" controls preload="metadata" src=(file) {
                                    a href=(file) { "Download video" }
                                }
                            }
                            VideoSource::Frame(other) => {
                                iframe class="video-frame" src=(other) title=(label) allowfullscreen {}
                            }
                        }
                        figcaption class="media-caption" {
                            span class="media-label" { (label) }
                        }
                    }
                }
            }
        }
    };
    section(ElementKind::Video.tag(), index, media_title(media, "Video"), body)
}

lazy_static! {
    static ref LANGUAGES: HashMap<&'static str, &'static str> = HashMap::from([
        ("py", "python"),
        ("js", "javascript"),
        ("mjs", "javascript"),
        ("cjs", "javascript"),
        ("ts", "typescript"),
        ("cpp", "cpp"),
        ("cc", "cpp"),
        ("cxx", "cpp"),
        ("hpp", "cpp"),
        ("h", "c"),
        ("c", "c"),
        ("java", "java"),
        ("json", "json"),
        ("md", "markdown"),
        ("html", "html"),
        ("css", "css"),
        ("rs", "rust"),
        ("sh", "bash"),
    ]);
}

/// Language name for a reference's file extension, if it is a known one.
pub fn infer_language(src: &str) -> Option<&'static str> {
    let name = file_name(src).to_ascii_lowercase();
    let (_, ext) = name.rsplit_once('.')?;
    LANGUAGES.get(ext).copied()
}

pub fn block_id(element_index: usize, item_index: usize) -> String {
    let suffix: u32 = rand::random();
    format!("script-{element_index}-{item_index}-{:06x}", suffix & 0x00ff_ffff)
}

fn code_markup(
    block_id: &str,
    language: Option<&str>,
    locator: Option<&str>,
    content: BlockContent<'_>,
) -> Markup {
    let class = language.map(|lang| format!("language-{lang}"));
    match content {
        BlockContent::Pending => html! {
            code id=(block_id) class=[class] data-src=[locator] data-state="pending" {
                "Loading " (locator.unwrap_or_default()) "…"
            }
        },
        BlockContent::Loaded(text) => html! {
            code id=(block_id) class=[class] data-src=[locator] { (text) }
        },
        BlockContent::Failed(message) => html! {
            code id=(block_id) class=[class] data-src=[locator] data-state="failed" { (message) }
        },
    }
}

fn render_script(media: &MediaElement, ctx: &RenderContext<'_>, index: usize) -> Fragment {
    let mut pending = Vec::new();
    let mut blocks = Vec::new();

    for (item_index, item) in media.items.iter().enumerate() {
        let language = item
            .language
            .clone()
            .or_else(|| item.src.as_deref().and_then(infer_language).map(str::to_string));
        let id = block_id(index, item_index);
        let locator = ctx.resolve_item(item);

        let code = match (&item.code, &locator) {
            (Some(code), _) => {
                code_markup(&id, language.as_deref(), None, BlockContent::Loaded(code))
            }
            (None, Some(locator)) => {
                let block = PendingScript {
                    block_id: id.clone(),
                    locator: locator.clone(),
                    language: language.clone(),
                };
                let markup = block.markup(BlockContent::Pending);
                pending.push(block);
                markup
            }
            (None, None) => continue,
        };

        let label = first_label(
            &[item.label.as_ref()],
            language.as_deref().unwrap_or("Script"),
        )
        .to_string();
        blocks.push(html! {
            figure class="media script-item" {
                figcaption class="media-caption" {
                    span class="media-label" { (label) }
                    @if let Some(lang) = &language {
                        span class="chip chip-language" { (lang) }
                    }
                    div class="media-actions" {
                        button type="button" class="btn copy-btn" data-target=(id) { "Copy" }
                        @if let Some(src) = &locator {
                            a class="btn" href=(src) download=(file_name(item.src.as_deref().unwrap_or(src.as_str()))) { "Download" }
                        }
                    }
                }
                pre class="code-block" { (code) }
            }
        });
    }

    let body = html! {
        @if blocks.is_empty() {
            (empty_note("No scripts attached."))
        } @else {
            div class="media-list" {
                @for block in &blocks { (block) }
            }
        }
    };

    Fragment {
        markup: section(ElementKind::Script.tag(), index, media_title(media, "Script"), body),
        pending,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAlignment {
    Left,
    Right,
    Centered,
}

/// Described items alternate left/right among themselves; undescribed items
/// are centered and do not advance the alternation.
pub fn image_alignments(items: &[Item]) -> Vec<ImageAlignment> {
    let mut described = 0usize;
    items
        .iter()
        .map(|item| {
            if item.description.is_none() {
                return ImageAlignment::Centered;
            }
            let alignment = if described % 2 == 0 {
                ImageAlignment::Left
            } else {
                ImageAlignment::Right
            };
            described += 1;
            alignment
        })
        .collect()
}

fn render_images(media: &MediaElement, ctx: &RenderContext<'_>, index: usize) -> Markup {
    let images: Vec<(&Item, String)> = media
        .items
        .iter()
        .filter_map(|item| ctx.resolve_item(item).map(|src| (item, src)))
        .collect();
    let resolved_items: Vec<Item> = images.iter().map(|(item, _)| (*item).clone()).collect();
    let alignments = image_alignments(&resolved_items);
    let page_title = ctx.resolver().placeholders().title();

    let body = html! {
        @if images.is_empty() {
            (empty_note("No images attached."))
        } @else {
            div class="image-gallery" {
                @for ((item, src), alignment) in images.iter().zip(alignments) {
                    @let alt = first_label(&[item.alt.as_ref(), item.label.as_ref()], page_title);
                    @match (alignment, &item.description) {
                        (ImageAlignment::Left | ImageAlignment::Right, Some(description)) => {
                            div class={ "image-row " (if alignment == ImageAlignment::Left { "image-left" } else { "image-right" }) } {
                                figure class="image-figure" {
                                    img src=(src) alt=(alt) loading="lazy";
                                    figcaption class="media-caption" {
                                        span class="media-label" { (first_label(&[item.label.as_ref()], "Image")) }
                                    }
                                }
                                div class="image-description" { (PreEscaped(format_paragraphs(description))) }
                            }
                        }
                        _ => {
                            figure class="image-figure image-centered" {
                                img src=(src) alt=(alt) loading="lazy";
                                @if let Some(label) = item.label.as_ref().filter(|l| !l.trim().is_empty()) {
                                    figcaption class="media-caption" {
                                        span class="media-label" { (label) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    section(ElementKind::Image.tag(), index, media_title(media, "Images"), body)
}

fn render_unknown(unknown: &UnknownElement, index: usize) -> Markup {
    let title = first_label(&[unknown.title.as_ref(), unknown.label.as_ref()], "Unknown Element");
    let body = html! {
        div class="card" {
            @if unknown.kind.trim().is_empty() {
                p class="muted" { "This element has no type." }
            } @else {
                p class="muted" { "Unsupported element type: " code { (unknown.kind) } }
            }
        }
    };
    section("unknown", index, title, body)
}

/// Formatted brief line for the abstract list.
pub fn brief_line(raw: &str) -> Markup {
    PreEscaped(format(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use serde_json::json;

    fn render(element: serde_json::Value) -> Fragment {
        let config = SiteConfig {
            base_path: "/site".into(),
            ..SiteConfig::default()
        };
        let route = Route {
            class: "August".into(),
            id: "08-28-25".into(),
        };
        let page = Page {
            title: Some("Drive day".into()),
            ..Page::default()
        };
        let element = Element::from_value(&element);
        let ctx = RenderContext::new(&config, &route, &page);
        render_element(&element, &ctx, 3)
    }

    fn html_of(element: serde_json::Value) -> String {
        render(element).markup.into_string()
    }

    #[test]
    fn registry_normalizes_tags() {
        assert_eq!(ElementKind::from_tag("Design Brief"), Some(ElementKind::DesignBrief));
        assert_eq!(ElementKind::from_tag("designbrief"), Some(ElementKind::DesignBrief));
        assert_eq!(ElementKind::from_tag("Images"), Some(ElementKind::Image));
        assert_eq!(ElementKind::from_tag("\tPDF\n"), Some(ElementKind::Pdf));
        assert_eq!(ElementKind::from_tag("gallery"), None);
    }

    #[test]
    fn synopsis_renders_single_card() {
        let html = html_of(json!({"type": "synopsis", "content": "We built **two** arms"}));
        assert!(
            html.contains(r#"<section class="element element-synopsis" id="element-3">"#),
            "got: {html}"
        );
        assert!(html.contains(r#"<h2 class="element-title">Synopsis</h2>"#), "got: {html}");
        assert!(html.contains("<p>We built <strong>two</strong> arms</p>"), "got: {html}");
        assert_eq!(html.matches(r#"class="card""#).count(), 1);
    }

    #[test]
    fn design_brief_renders_card_per_item_in_order() {
        let html = html_of(json!({"type": "Design Brief", "items": ["first", "second", "third"]}));
        assert_eq!(html.matches(r#"class="card""#).count(), 3);
        let first = html.find("first").expect("first");
        let second = html.find("second").expect("second");
        let third = html.find("third").expect("third");
        assert!(first < second && second < third, "got: {html}");
    }

    #[test]
    fn notes_title_falls_back_through_label() {
        assert!(html_of(json!({"type": "notes", "label": "Log"})).contains(">Log</h2>"));
        assert!(
            html_of(json!({"type": "notes", "title": "Ideas", "label": "Log"})).contains(">Ideas</h2>")
        );
        assert!(html_of(json!({"type": "notes"})).contains(">Notes</h2>"));
    }

    #[test]
    fn pdf_embeds_viewer_with_actions() {
        let html = html_of(json!({
            "type": "pdf",
            "items": [{"src": "resources/{class}/plan v2.pdf", "label": "Plan"}]
        }));
        assert!(
            html.contains(r#"src="/site/resources/August/plan%20v2.pdf#zoom=page-width""#),
            "got: {html}"
        );
        assert!(html.contains(r#"target="_blank""#), "got: {html}");
        assert!(html.contains(r#"download="plan v2.pdf""#), "got: {html}");
        assert!(html.contains("Open in new tab") && html.contains("Download"), "got: {html}");
    }

    #[test]
    fn classifies_videos() {
        assert_eq!(
            classify_video("https://www.youtube.com/watch?t=3&v=dQw4w9WgXcQ"),
            VideoSource::Embed("https://www.youtube.com/embed/dQw4w9WgXcQ".into())
        );
        assert_eq!(
            classify_video("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            VideoSource::Embed("https://www.youtube.com/embed/dQw4w9WgXcQ".into())
        );
        assert_eq!(
            classify_video("https://vimeo.com/76979871"),
            VideoSource::Embed("https://player.vimeo.com/video/76979871".into())
        );
        assert_eq!(
            classify_video("/site/resources/run.MP4"),
            VideoSource::Native("/site/resources/run.MP4".into())
        );
        assert_eq!(
            classify_video("https://drive.google.com/file/d/xyz/preview"),
            VideoSource::Frame("https://drive.google.com/file/d/xyz/preview".into())
        );
        assert!(matches!(
            classify_video("https://www.youtube.com/watch?v=short"),
            VideoSource::Frame(_)
        ));
    }

    #[test]
    fn video_renders_by_classification() {
        let html = html_of(json!({"type": "video", "items": [
            {"src": "https://youtu.be/dQw4w9WgXcQ"},
            {"src": "clip.mp4", "label": "Test run"},
            {"src": "https://example.com/player"}
        ]}));
        assert!(
            html.contains(r#"class="video-embed" src="https://www.youtube.com/embed/dQw4w9WgXcQ""#),
            "got: {html}"
        );
        assert!(
            html.contains(
                r#"<video class="video-player" controls preload="metadata" src="/site/clip.mp4">"#
            ),
            "got: {html}"
        );
        assert!(
            html.contains(r#"class="video-frame" src="https://example.com/player""#),
            "got: {html}"
        );
    }

    #[test]
    fn infers_languages_from_extensions() {
        assert_eq!(infer_language("resources/main.py"), Some("python"));
        assert_eq!(infer_language("src/index.ts"), Some("typescript"));
        assert_eq!(infer_language("notes.xyz"), None);
        assert_eq!(infer_language("Makefile"), None);
    }

    #[test]
    fn inline_script_is_escaped_and_not_pending() {
        let fragment = render(json!({
            "type": "script",
            "items": [{"code": "if a < b: print(\"x\")", "language": "python"}]
        }));
        let html = fragment.markup.into_string();
        assert!(fragment.pending.is_empty());
        assert!(html.contains("if a &lt; b: print(&quot;x&quot;)"), "got: {html}");
        assert!(html.contains(r#"class="language-python""#), "got: {html}");
        assert!(html.contains(r#"class="btn copy-btn" data-target="script-3-0-"#), "got: {html}");
    }

    #[test]
    fn referenced_script_is_pending() {
        let fragment = render(json!({"type": "script", "items": [
            {"src": "resources/{class}/{id}/main.py"},
            {"src": "tools/build.xyz", "label": "Build"}
        ]}));
        assert_eq!(fragment.pending.len(), 2);
        let first = &fragment.pending[0];
        assert_eq!(first.locator, "/site/resources/August/08-28-25/main.py");
        assert_eq!(first.language.as_deref(), Some("python"));
        assert!(first.block_id.starts_with("script-3-0-"));
        assert_eq!(fragment.pending[1].language, None);
        assert_ne!(fragment.pending[0].block_id, fragment.pending[1].block_id);

        let html = fragment.markup.into_string();
        assert!(html.contains(&first.markup(BlockContent::Pending).into_string()), "got: {html}");
        assert!(html.contains(r#"data-state="pending""#), "got: {html}");
    }

    #[test]
    fn image_alignment_alternates_only_described_items() {
        let items = vec![
            Item {
                description: Some("a".into()),
                ..Item::default()
            },
            Item::default(),
            Item {
                description: Some("b".into()),
                ..Item::default()
            },
            Item::default(),
        ];
        assert_eq!(
            image_alignments(&items),
            vec![
                ImageAlignment::Left,
                ImageAlignment::Centered,
                ImageAlignment::Right,
                ImageAlignment::Centered,
            ]
        );
    }

    #[test]
    fn images_alias_renders_gallery() {
        let html = html_of(json!({"type": "images", "items": [
            {"src": "a.png", "description": "left side"},
            {"src": "b.png"},
            {"src": "c.png", "description": "right side", "alt": "C"},
        ]}));
        let left = html.find("image-row image-left").expect("left row");
        let centered = html.find("image-figure image-centered").expect("centered figure");
        let right = html.find("image-row image-right").expect("right row");
        assert!(left < centered && centered < right, "got: {html}");
        assert!(html.contains(r#"alt="Drive day""#), "got: {html}");
        assert!(html.contains(r#"alt="C""#), "got: {html}");
    }

    #[test]
    fn unknown_types_fall_back() {
        let html = html_of(json!({"type": "Spreadsheet"}));
        assert!(html.contains("element-unknown"), "got: {html}");
        assert!(html.contains(">Unknown Element</h2>"), "got: {html}");
        assert!(html.contains("<code>Spreadsheet</code>"), "got: {html}");
    }

    #[test]
    fn missing_optional_fields_degrade_gracefully() {
        let html = html_of(json!({"type": "pdf"}));
        assert!(html.contains("No documents attached."), "got: {html}");
        let html = html_of(json!({"type": "image", "items": [{"label": "no src"}]}));
        assert!(html.contains("No images attached."), "got: {html}");
    }
}
