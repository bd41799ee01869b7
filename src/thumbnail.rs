use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::event::{EventDescriptor, EventType};
use crate::image_backend::{Credentials, ImageBackend};
use crate::markup::{
    escape_xml, truncate_chars, BLUE, CANVAS_HEIGHT, CANVAS_WIDTH, DARK_BG, DEEP_BG, FONT_SANS,
    GREEN, LIGHT_TEXT, MUTED_TEXT, PURPLE, YELLOW,
};
use crate::panel::render_panel;
use crate::sink::{OutputFormat, OutputSink};
use crate::slug::slugify;
use crate::text_layout::parse_title;
use crate::theme::classify;

pub const MAX_TAGS: usize = 4;
pub const MAX_TAG_CHARS: usize = 18;
pub const MAX_INFO_CHARS: usize = 34;

const TAG_COLORS: [&str; MAX_TAGS] = [BLUE, GREEN, YELLOW, PURPLE];
const LEFT: u32 = 60;
const LEFT_COLUMN_RIGHT: u32 = 750;
const PANEL_ORIGIN: (u32, u32) = (790, 118);
const BADGE_TOP: u32 = 148;
const TITLE_FIRST_BASELINE: u32 = 248;
const TITLE_LINE_PITCH: u32 = 56;
const INFO_BAR_TOP: u32 = 640;
const INFO_COLUMNS: [u32; 3] = [60, 400, 740];

/// A finished thumbnail: remote raster or locally assembled SVG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailDocument {
    Png(Vec<u8>),
    Svg(String),
}

impl ThumbnailDocument {
    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Png(_) => OutputFormat::Png,
            Self::Svg(_) => OutputFormat::Svg,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Png(bytes) => bytes,
            Self::Svg(markup) => markup.as_bytes(),
        }
    }
}

/// How thumbnails are produced, decided once when the composer is built.
#[derive(Debug, Clone)]
pub enum GenerationStrategy {
    /// Try the hosted model first, fall back to the local SVG on any failure.
    Remote(ImageBackend),
    LocalOnly,
}

impl GenerationStrategy {
    pub fn from_credentials(
        credentials: Option<Credentials>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self> {
        match credentials {
            Some(credentials) => Ok(Self::Remote(ImageBackend::with_timeout(
                endpoint,
                credentials,
                timeout,
            )?)),
            None => Ok(Self::LocalOnly),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSource {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Skipped {
        slug: String,
        pinned: PathBuf,
    },
    Written {
        slug: String,
        path: PathBuf,
        format: OutputFormat,
        source: ThumbnailSource,
        sha256: String,
    },
}

#[derive(Debug, Clone)]
pub struct ThumbnailComposer {
    strategy: GenerationStrategy,
    sink: OutputSink,
}

impl ThumbnailComposer {
    pub fn new(strategy: GenerationStrategy, sink: OutputSink) -> Self {
        Self { strategy, sink }
    }

    /// Produces and stores the thumbnail for one event.
    ///
    /// A pinned PNG short-circuits with no writes. Remote failures never
    /// surface here; only the final write can fail.
    pub async fn compose(&self, descriptor: &EventDescriptor) -> Result<GenerationOutcome> {
        let slug = slugify(&descriptor.title);
        if self.sink.is_pinned(&slug) {
            let pinned = self.sink.path_for(&slug, OutputFormat::Png);
            info!(path = %pinned.display(), "thumbnail already exists, skipping");
            return Ok(GenerationOutcome::Skipped { slug, pinned });
        }

        let (document, source) = match self.try_remote(descriptor).await {
            Some(png) => (ThumbnailDocument::Png(png), ThumbnailSource::Remote),
            None => (
                ThumbnailDocument::Svg(render_local_svg(descriptor)),
                ThumbnailSource::Local,
            ),
        };

        let path = self.sink.write(&slug, &document)?;
        info!(path = %path.display(), ?source, "thumbnail saved");
        Ok(GenerationOutcome::Written {
            slug,
            path,
            format: document.format(),
            source,
            sha256: sha256_hex(document.as_bytes()),
        })
    }

    async fn try_remote(&self, descriptor: &EventDescriptor) -> Option<Vec<u8>> {
        let GenerationStrategy::Remote(backend) = &self.strategy else {
            debug!("no image API credentials, rendering locally");
            return None;
        };

        info!(
            endpoint = backend.endpoint(),
            title = %descriptor.title,
            "requesting remote thumbnail"
        );
        match backend.generate(&descriptor.title).await {
            Ok(png) => Some(png),
            Err(error) => {
                warn!("remote thumbnail unavailable ({error:#}); falling back to local render");
                None
            }
        }
    }
}

/// Assembles the complete local SVG for `descriptor`. Deterministic: equal
/// descriptors give byte-identical output.
pub fn render_local_svg(descriptor: &EventDescriptor) -> String {
    let theme = classify(&descriptor.title, &descriptor.tags);
    let title = parse_title(&descriptor.title);

    let mut svg = String::with_capacity(16 * 1024);
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{CANVAS_WIDTH}\" height=\"{CANVAS_HEIGHT}\" viewBox=\"0 0 {CANVAS_WIDTH} {CANVAS_HEIGHT}\" data-theme=\"{}\">\n",
        theme.keyword()
    ));
    svg.push_str(&format!("<title>{}</title>\n", escape_xml(&descriptor.title)));
    push_background(&mut svg);
    push_branding(&mut svg);

    // Badges
    let mut badge_x = LEFT;
    if let Some(lecture) = title.lecture {
        badge_x = push_badge(&mut svg, badge_x, &lecture.label(), YELLOW, DARK_BG) + 12;
    }
    let (type_fill, type_text) = event_type_colors(descriptor.event_type);
    push_badge(
        &mut svg,
        badge_x,
        descriptor.event_type.badge_label(),
        type_fill,
        type_text,
    );

    svg.push_str("<g class=\"title\">\n");
    for (index, line) in title.lines.iter().enumerate() {
        svg.push_str(&format!(
            "<text x=\"{LEFT}\" y=\"{}\" fill=\"{LIGHT_TEXT}\" font-family=\"{FONT_SANS}\" font-size=\"46\" font-weight=\"bold\">{}</text>\n",
            TITLE_FIRST_BASELINE + index as u32 * TITLE_LINE_PITCH,
            escape_xml(line)
        ));
    }
    svg.push_str("</g>\n");

    let last_baseline =
        TITLE_FIRST_BASELINE + title.lines.len().saturating_sub(1) as u32 * TITLE_LINE_PITCH;
    push_tags(&mut svg, last_baseline + 38, &descriptor.tags);

    svg.push_str(&format!(
        "<g class=\"panel\" transform=\"translate({},{})\">\n",
        PANEL_ORIGIN.0, PANEL_ORIGIN.1
    ));
    svg.push_str(&render_panel(theme));
    svg.push_str("</g>\n");

    push_info_bar(&mut svg, descriptor);
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"{}\" width=\"{CANVAS_WIDTH}\" height=\"6\" fill=\"url(#accent)\"/>\n",
        CANVAS_HEIGHT - 6
    ));
    svg.push_str("</svg>\n");
    svg
}

fn push_background(svg: &mut String) {
    svg.push_str(&format!(
        "<defs>\n\
         <linearGradient id=\"bg\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"100%\">\n\
         <stop offset=\"0%\" stop-color=\"{DARK_BG}\"/>\n\
         <stop offset=\"100%\" stop-color=\"{DEEP_BG}\"/>\n\
         </linearGradient>\n\
         <linearGradient id=\"accent\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"0%\">\n\
         <stop offset=\"0%\" stop-color=\"{YELLOW}\"/>\n\
         <stop offset=\"100%\" stop-color=\"{BLUE}\"/>\n\
         </linearGradient>\n\
         </defs>\n"
    ));
    svg.push_str(&format!(
        "<rect width=\"{CANVAS_WIDTH}\" height=\"{CANVAS_HEIGHT}\" fill=\"url(#bg)\"/>\n"
    ));
    for (cx, cy, r, color, opacity) in [
        (100, 120, 60, BLUE, "0.15"),
        (1180, 600, 80, YELLOW, "0.1"),
        (200, 600, 45, GREEN, "0.1"),
        (1100, 150, 35, BLUE, "0.2"),
    ] {
        svg.push_str(&format!(
            "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{color}\" opacity=\"{opacity}\"/>\n"
        ));
    }
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{CANVAS_WIDTH}\" height=\"6\" fill=\"url(#accent)\"/>\n"
    ));
}

fn push_branding(svg: &mut String) {
    svg.push_str(&format!(
        "<text x=\"{LEFT}\" y=\"78\" fill=\"{YELLOW}\" font-family=\"{FONT_SANS}\" font-size=\"30\" font-weight=\"bold\" letter-spacing=\"8\">SIMG</text>\n"
    ));
    svg.push_str(&format!(
        "<text x=\"{LEFT}\" y=\"104\" fill=\"{LIGHT_TEXT}\" font-family=\"{FONT_SANS}\" font-size=\"15\" opacity=\"0.7\">Semillero de Investigación en Modelos Generativos</text>\n"
    ));
    svg.push_str(&format!(
        "<line x1=\"{LEFT}\" y1=\"124\" x2=\"440\" y2=\"124\" stroke=\"url(#accent)\" stroke-width=\"2\" opacity=\"0.5\"/>\n"
    ));
}

/// Draws a pill badge at `x` and returns its right edge.
fn push_badge(svg: &mut String, x: u32, label: &str, fill: &str, text: &str) -> u32 {
    let width = label.chars().count() as u32 * 11 + 32;
    svg.push_str(&format!(
        "<rect x=\"{x}\" y=\"{BADGE_TOP}\" width=\"{width}\" height=\"34\" rx=\"17\" fill=\"{fill}\" opacity=\"0.9\"/>\n"
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"{text}\" font-family=\"{FONT_SANS}\" font-size=\"15\" font-weight=\"bold\" letter-spacing=\"2\">{}</text>\n",
        x + width / 2,
        BADGE_TOP + 22,
        escape_xml(label)
    ));
    x + width
}

fn event_type_colors(event_type: EventType) -> (&'static str, &'static str) {
    match event_type {
        EventType::InPerson => (BLUE, LIGHT_TEXT),
        EventType::Virtual => (GREEN, LIGHT_TEXT),
        EventType::Hybrid => (YELLOW, DARK_BG),
    }
}

fn push_tags(svg: &mut String, top: u32, tags: &[String]) {
    if tags.is_empty() {
        return;
    }
    svg.push_str("<g class=\"tags\">\n");
    let mut x = LEFT;
    for (tag, color) in tags.iter().take(MAX_TAGS).zip(TAG_COLORS) {
        let label = truncate_chars(tag, MAX_TAG_CHARS);
        let width = label.chars().count() as u32 * 9 + 28;
        if x + width > LEFT_COLUMN_RIGHT {
            break;
        }
        let text_color = if color == YELLOW { DARK_BG } else { LIGHT_TEXT };
        svg.push_str(&format!(
            "<rect x=\"{x}\" y=\"{top}\" width=\"{width}\" height=\"30\" rx=\"15\" fill=\"{color}\" opacity=\"0.85\"/>\n"
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"{text_color}\" font-family=\"{FONT_SANS}\" font-size=\"14\">{}</text>\n",
            x + width / 2,
            top + 20,
            escape_xml(&label)
        ));
        x += width + 10;
    }
    svg.push_str("</g>\n");
}

fn push_info_bar(svg: &mut String, descriptor: &EventDescriptor) {
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"{INFO_BAR_TOP}\" width=\"{CANVAS_WIDTH}\" height=\"{}\" fill=\"{DARK_BG}\" opacity=\"0.9\"/>\n",
        CANVAS_HEIGHT - INFO_BAR_TOP - 6
    ));
    let entries = [
        ("DATE", descriptor.date.display()),
        ("TIME", descriptor.time.clone()),
        ("LOCATION", location_label(descriptor)),
    ];
    for ((label, value), x) in entries.iter().zip(INFO_COLUMNS) {
        svg.push_str(&format!(
            "<text x=\"{x}\" y=\"{}\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_SANS}\" font-size=\"11\" letter-spacing=\"2\">{label}</text>\n",
            INFO_BAR_TOP + 24
        ));
        svg.push_str(&format!(
            "<text x=\"{x}\" y=\"{}\" fill=\"{}\" font-family=\"{FONT_SANS}\" font-size=\"18\">{}</text>\n",
            INFO_BAR_TOP + 50,
            if *label == "DATE" { YELLOW } else { LIGHT_TEXT },
            escape_xml(&truncate_chars(value, MAX_INFO_CHARS))
        ));
    }
}

/// Explicit location, else the meeting host, else a type-based placeholder.
pub fn location_label(descriptor: &EventDescriptor) -> String {
    if let Some(location) = &descriptor.location {
        return location.clone();
    }
    if let Some(host) = descriptor
        .meeting_link
        .as_ref()
        .and_then(|link| link.host_str())
    {
        return host.trim_start_matches("www.").to_owned();
    }
    match descriptor.event_type {
        EventType::Virtual => "Online".to_owned(),
        EventType::InPerson | EventType::Hybrid => "Location TBA".to_owned(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::{
        location_label, render_local_svg, GenerationOutcome, GenerationStrategy,
        ThumbnailComposer, ThumbnailSource,
    };
    use crate::event::{EventDescriptor, EventType, RawEventFields};
    use crate::image_backend::{Credentials, DEFAULT_ENDPOINT};
    use crate::markup::{BLUE, DARK_BG, GREEN, LIGHT_TEXT, PURPLE, YELLOW};
    use crate::sink::{OutputFormat, OutputSink};

    fn descriptor(title: &str, event_type: &str, tags: &[&str]) -> EventDescriptor {
        EventDescriptor::from_raw(
            RawEventFields {
                title: title.to_owned(),
                date: Some("2026-02-27".to_owned()),
                event_type: Some(event_type.to_owned()),
                tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
                ..RawEventFields::default()
            },
            NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"),
        )
    }

    #[test]
    fn lecture_example_renders_cuda_card() {
        let event = descriptor(
            "Lecture 5 - GPU Memory Coalescing",
            "in-person",
            &["CUDA", "Performance"],
        );
        let svg = render_local_svg(&event);
        assert!(svg.contains("data-theme=\"cuda\""));
        assert!(svg.contains(">LECTURE 5</text>"));
        assert!(svg.contains(">IN-PERSON</text>"));
        assert!(svg.contains(">GPU Memory Coalescing</text>"));
        assert!(svg.contains(">Feb 27, 2026</text>"));
        assert!(svg.contains(">CUDA</text>"));
        assert!(svg.contains(">Performance</text>"));
        assert!(svg.contains("kernel profile"));
    }

    #[test]
    fn neural_example_contains_graph() {
        let event = descriptor(
            "Diffusion Models for Medical Imaging",
            "virtual",
            &["neural", "diffusion"],
        );
        let svg = render_local_svg(&event);
        assert!(svg.contains("data-theme=\"neural\""));
        assert!(svg.contains("class=\"edges\""));
        assert!(svg.contains(">VIRTUAL</text>"));
        assert!(svg.contains(">Online</text>"));
        assert!(!svg.contains("LECTURE"));
    }

    #[test]
    fn local_render_is_byte_identical() {
        let event = descriptor("NumPy & Pandas <Workshop>", "hybrid", &["python"]);
        assert_eq!(render_local_svg(&event), render_local_svg(&event.clone()));
    }

    #[test]
    fn user_text_is_escaped() {
        let event = descriptor("NumPy & Pandas <Workshop>", "hybrid", &["a<b"]);
        let svg = render_local_svg(&event);
        assert!(svg.contains("NumPy &amp; Pandas &lt;Workshop&gt;"));
        assert!(svg.contains(">a&lt;b</text>"));
        assert!(!svg.contains("<Workshop>"));
    }

    #[test]
    fn only_four_tags_are_drawn() {
        let event = descriptor("Reading group", "in-person", &["a", "b", "c", "d", "e"]);
        let svg = render_local_svg(&event);
        assert!(svg.contains(">d</text>"));
        assert!(!svg.contains(">e</text>"));
    }

    fn attribute_values<'a>(markup: &'a str, element: &str, attribute: &str) -> Vec<&'a str> {
        let needle = format!(" {attribute}=\"");
        markup
            .split(element)
            .skip(1)
            .filter_map(|rest| {
                let tag = &rest[..rest.find('>')?];
                let start = tag.find(&needle)? + needle.len();
                Some(&tag[start..start + tag[start..].find('"')?])
            })
            .collect()
    }

    #[test]
    fn tag_colours_cycle_in_fixed_order() {
        let event = descriptor("Reading group", "in-person", &["a", "b", "c", "d"]);
        let svg = render_local_svg(&event);
        let start = svg.find("<g class=\"tags\">").expect("tags group");
        let end = start + svg[start..].find("</g>").expect("tags group end");
        let tags = &svg[start..end];

        assert_eq!(attribute_values(tags, "<rect", "fill"), vec![BLUE, GREEN, YELLOW, PURPLE]);
        assert_eq!(
            attribute_values(tags, "<text", "fill"),
            vec![LIGHT_TEXT, LIGHT_TEXT, DARK_BG, LIGHT_TEXT]
        );
    }

    #[test]
    fn long_info_values_are_truncated() {
        let mut event = descriptor("Reading group", "in-person", &[]);
        event.location = Some(
            "Universidad Nacional de Colombia, Bogotá, Edificio 404 Yu Takeuchi".to_owned(),
        );
        let svg = render_local_svg(&event);
        assert!(svg.contains(">Universidad Nacional de Colombia,…</text>"));
    }

    #[test]
    fn location_prefers_explicit_then_meeting_host() {
        let mut event = descriptor("Remote", "virtual", &[]);
        assert_eq!(location_label(&event), "Online");
        event.meeting_link = Some("https://www.zoom.us/j/123".parse().expect("url"));
        assert_eq!(location_label(&event), "zoom.us");
        event.location = Some("Room 202-405".to_owned());
        assert_eq!(location_label(&event), "Room 202-405");

        let in_person = descriptor("Local", "in-person", &[]);
        assert_eq!(location_label(&in_person), "Location TBA");
        assert_eq!(in_person.event_type, EventType::InPerson);
    }

    #[test]
    fn strategy_follows_credentials() {
        let local =
            GenerationStrategy::from_credentials(None, DEFAULT_ENDPOINT, Duration::from_secs(5))
                .expect("strategy");
        assert!(!local.is_remote());

        let credentials = Credentials::from_values(Some("k".into()), Some("m".into()));
        let remote = GenerationStrategy::from_credentials(
            credentials,
            DEFAULT_ENDPOINT,
            Duration::from_secs(5),
        )
        .expect("strategy");
        assert!(remote.is_remote());
    }

    #[tokio::test]
    async fn compose_writes_svg_without_credentials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let composer =
            ThumbnailComposer::new(GenerationStrategy::LocalOnly, OutputSink::new(dir.path()));
        let event = descriptor("Lecture 5 - GPU Memory Coalescing", "in-person", &["CUDA"]);

        let outcome = composer.compose(&event).await.expect("compose");
        let GenerationOutcome::Written {
            slug,
            path,
            format,
            source,
            sha256,
        } = outcome
        else {
            panic!("expected a written thumbnail");
        };
        assert_eq!(slug, "lecture-5-gpu-memory-coalescing");
        assert_eq!(format, OutputFormat::Svg);
        assert_eq!(source, ThumbnailSource::Local);
        assert_eq!(sha256.len(), 64);
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("lecture-5-gpu-memory-coalescing.svg")
        );
        assert_eq!(
            fs::read_to_string(&path).expect("read svg"),
            render_local_svg(&event)
        );
    }

    #[tokio::test]
    async fn pinned_png_is_never_touched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = dir.path().join("gpu-intro.png");
        fs::write(&png, b"hand-picked").expect("seed png");
        let composer =
            ThumbnailComposer::new(GenerationStrategy::LocalOnly, OutputSink::new(dir.path()));
        let event = descriptor("GPU Intro", "in-person", &[]);

        for _ in 0..2 {
            let outcome = composer.compose(&event).await.expect("compose");
            assert!(matches!(outcome, GenerationOutcome::Skipped { .. }));
        }
        assert_eq!(fs::read(&png).expect("read png"), b"hand-picked");
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 1);
    }
}
