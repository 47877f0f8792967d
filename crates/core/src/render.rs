use crate::{EmoteConfig, EmoteRecord, EmoteRef, Segment};
use serde::Serialize;

const SEVENTV_PAGE_BASE: &str = "https://7tv.app/emotes";

/// Presentation options taken from [`EmoteConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub emote_display_size: u32,
    pub show_preview_on_hover: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&EmoteConfig::default())
    }
}

impl From<&EmoteConfig> for RenderOptions {
    fn from(config: &EmoteConfig) -> Self {
        Self {
            emote_display_size: config.emote_display_size,
            show_preview_on_hover: config.show_preview_on_hover,
        }
    }
}

/// Receives segments in order; implemented by whatever draws messages
pub trait RenderSink {
    fn literal(&mut self, text: &str);

    fn emote(&mut self, emote: &EmoteRef, options: &RenderOptions);
}

pub fn render<S: RenderSink + ?Sized>(segments: &[Segment], options: &RenderOptions, sink: &mut S) {
    for segment in segments {
        match segment {
            Segment::Literal { text } => sink.literal(text),
            Segment::Emote(emote) => sink.emote(emote, options),
        }
    }
}

/// Tooltip contents for a hovered emote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverPreview {
    pub name: String,
    pub preview_url: String,
    pub creator_line: String,
}

impl HoverPreview {
    /// `None` when previews are switched off
    pub fn for_emote(record: &EmoteRecord, options: &RenderOptions) -> Option<Self> {
        options.show_preview_on_hover.then(|| Self {
            name: record.name().to_string(),
            preview_url: record.preview_url().to_string(),
            creator_line: format!("by {}", record.creator_label()),
        })
    }
}

/// Links offered from an emote's context menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmoteLinks {
    pub page_url: String,
    pub image_1x: String,
    pub image_2x: String,
    pub image_4x: String,
}

impl EmoteLinks {
    pub fn for_record(record: &EmoteRecord, extension: &str) -> Self {
        let base = record.asset_base_url();
        Self {
            page_url: format!("{SEVENTV_PAGE_BASE}/{}", record.source_id()),
            image_1x: format!("{base}/1x.{extension}"),
            image_2x: format!("{base}/2x.{extension}"),
            image_4x: format!("{base}/4x.{extension}"),
        }
    }
}

/// Renders segments as an HTML fragment with inline `<img>` emotes
#[derive(Debug, Default)]
pub struct HtmlSink {
    out: String,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl RenderSink for HtmlSink {
    fn literal(&mut self, text: &str) {
        push_escaped(&mut self.out, text);
    }

    fn emote(&mut self, emote: &EmoteRef, options: &RenderOptions) {
        let record = &emote.record;
        self.out.push_str("<img class=\"emote\" src=\"");
        push_escaped(&mut self.out, record.asset_url());
        self.out.push_str("\" alt=\"");
        push_escaped(&mut self.out, &emote.name);
        self.out.push_str("\" title=\"");
        push_escaped(&mut self.out, &emote.name);
        self.out.push_str(&format!(
            "\" draggable=\"false\" style=\"height:{}px;width:auto;vertical-align:middle;margin:0 2px;display:inline-block\"",
            options.emote_display_size
        ));
        if let Some(preview) = HoverPreview::for_emote(record, options) {
            self.out.push_str(" data-preview-url=\"");
            push_escaped(&mut self.out, &preview.preview_url);
            self.out.push_str("\" data-creator=\"");
            push_escaped(&mut self.out, &preview.creator_line);
            self.out.push('"');
        }
        self.out.push('>');
    }
}

/// Replaces each emote with its name, the way rendered emotes revert to their alt text
#[derive(Debug, Default)]
pub struct PlainTextSink {
    out: String,
}

impl PlainTextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl RenderSink for PlainTextSink {
    fn literal(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn emote(&mut self, emote: &EmoteRef, _options: &RenderOptions) {
        self.out.push_str(&emote.name);
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
