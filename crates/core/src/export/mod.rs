//! Storyboard document export.
//!
//! A [`DocumentExporter`] turns a [`StoryboardSheet`] into a downloadable,
//! paginated document. [`PdfDocumentExporter`] is the one the server uses.
//! [`HtmlDocumentExporter`] writes a self-contained print-ready HTML page
//! instead, where `@page` sets paper size and margins and the browser does
//! the pagination. Both re-encode item images as JPEG at the configured
//! quality.

use std::fmt::Write as _;

use ::image::codecs::jpeg::JpegEncoder;
use ::image::DynamicImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::media::ImagePayload;
use crate::storyboard::StoryboardItem;

mod pdf;

pub use pdf::PdfDocumentExporter;

/* --------------------------------------------------------------------------
   Options
   -------------------------------------------------------------------------- */

pub const DEFAULT_FILE_STEM: &str = "storyboard";
pub const DEFAULT_MARGIN_IN: f32 = 0.5;
pub const DEFAULT_IMAGE_QUALITY: f32 = 0.98;

/// Sheet width in CSS pixels (8.5 in at 96 DPI), matching the on-screen preview.
pub const SHEET_WIDTH_PX: u32 = 816;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    Letter,
    Legal,
    A4,
}

impl PageSize {
    /// Portrait width and height in inches.
    pub fn dimensions_in(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (8.5, 11.0),
            PageSize::Legal => (8.5, 14.0),
            PageSize::A4 => (8.27, 11.69),
        }
    }

    fn css_name(self) -> &'static str {
        match self {
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
            PageSize::A4 => "A4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub vertical_in: f32,
    pub horizontal_in: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// File name without extension.
    pub file_stem: String,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    /// JPEG quality in `(0, 1]`.
    pub image_quality: f32,
    /// Keep each item block and the footer on a single page.
    pub avoid_page_breaks: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_stem: DEFAULT_FILE_STEM.to_string(),
            page_size: PageSize::Letter,
            orientation: Orientation::Portrait,
            margins: Margins {
                vertical_in: DEFAULT_MARGIN_IN,
                horizontal_in: DEFAULT_MARGIN_IN,
            },
            image_quality: DEFAULT_IMAGE_QUALITY,
            avoid_page_breaks: true,
        }
    }
}

impl ExportOptions {
    /// Page width and height in inches after orientation.
    pub fn page_dimensions_in(&self) -> (f32, f32) {
        let (w, h) = self.page_size.dimensions_in();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// JPEG encoder quality, 1..=100.
    pub fn jpeg_quality(&self) -> u8 {
        (self.image_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Validate export options before rendering.
///
/// - `file_stem` must be non-empty and free of path separators.
/// - `image_quality` must be finite and in `(0, 1]`.
/// - Margins must be finite, non-negative and leave printable area.
pub fn validate_export_options(options: &ExportOptions) -> Result<(), CoreError> {
    let stem = options.file_stem.trim();
    if stem.is_empty() {
        return Err(CoreError::Validation(
            "Export file name must not be empty".to_string(),
        ));
    }
    if stem.contains(['/', '\\']) {
        return Err(CoreError::Validation(format!(
            "Export file name must not contain path separators, got '{stem}'"
        )));
    }
    let q = options.image_quality;
    if !q.is_finite() || q <= 0.0 || q > 1.0 {
        return Err(CoreError::Validation(format!(
            "image_quality must be in (0, 1], got {q}"
        )));
    }

    let (width, height) = options.page_dimensions_in();
    let Margins {
        vertical_in,
        horizontal_in,
    } = options.margins;
    for m in [vertical_in, horizontal_in] {
        if !m.is_finite() || m < 0.0 {
            return Err(CoreError::Validation(format!(
                "Margins must be non-negative numbers, got {m}"
            )));
        }
    }
    if vertical_in * 2.0 >= height || horizontal_in * 2.0 >= width {
        return Err(CoreError::Validation(
            "Margins leave no printable area".to_string(),
        ));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
   Sheet content
   -------------------------------------------------------------------------- */

/// Editable header and footer text of the storyboard sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetBranding {
    /// Stacked company-name lines in the header block.
    pub company_name_lines: Vec<String>,
    pub contact_line: String,
    pub footer_note: String,
    /// Small print under each item's price.
    pub pricing_note: String,
}

impl Default for SheetBranding {
    fn default() -> Self {
        Self {
            company_name_lines: vec![
                "YOUR".to_string(),
                "COMPANY".to_string(),
                "promotions".to_string(),
            ],
            contact_line: "Sales Contact | sales@example.com | (555) 010-0100".to_string(),
            footer_note: "Pricing for setups are based on specific logo placements for \
                          quotation purposes; subject to change with finalized artwork and \
                          design. Pricing for freight is based on entire order shipping to a \
                          single location; subject to change if multiple locations required. \
                          Pricing is valid for 30 days."
                .to_string(),
            pricing_note: "Pricing includes a left chest embroidered logo, all setup fees and freight"
                .to_string(),
        }
    }
}

/// Snapshot of everything that goes on the sheet.
#[derive(Debug, Clone)]
pub struct StoryboardSheet {
    pub branding: SheetBranding,
    pub items: Vec<StoryboardItem>,
}

/// A rendered, downloadable document.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Failed to render document: {0}")]
    Render(String),
}

/// Renders a storyboard sheet into a paginated document.
pub trait DocumentExporter: Send + Sync {
    fn export(
        &self,
        sheet: &StoryboardSheet,
        options: &ExportOptions,
    ) -> Result<ExportedDocument, ExportError>;
}

/* --------------------------------------------------------------------------
   HTML exporter
   -------------------------------------------------------------------------- */

pub const EMPTY_SHEET_PLACEHOLDER: &str = "Add items from the dashboard to see them here";

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDocumentExporter;

impl DocumentExporter for HtmlDocumentExporter {
    fn export(
        &self,
        sheet: &StoryboardSheet,
        options: &ExportOptions,
    ) -> Result<ExportedDocument, ExportError> {
        validate_export_options(options)?;
        let html = render_html(sheet, options).map_err(|e| ExportError::Render(e.to_string()))?;

        tracing::info!(
            items = sheet.items.len(),
            bytes = html.len(),
            "Rendered storyboard document"
        );

        Ok(ExportedDocument {
            file_name: format!("{}.html", options.file_stem.trim()),
            mime_type: "text/html; charset=utf-8",
            bytes: html.into_bytes(),
        })
    }
}

fn render_html(sheet: &StoryboardSheet, options: &ExportOptions) -> Result<String, std::fmt::Error> {
    let orientation = match options.orientation {
        Orientation::Portrait => "portrait",
        Orientation::Landscape => "landscape",
    };
    let avoid = if options.avoid_page_breaks {
        "break-inside: avoid; page-break-inside: avoid;"
    } else {
        ""
    };

    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html><head><meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{}</title>", escape_html(options.file_stem.trim()))?;
    writeln!(out, "<style>")?;
    writeln!(
        out,
        "@page {{ size: {} {orientation}; margin: {}in {}in; }}",
        options.page_size.css_name(),
        options.margins.vertical_in,
        options.margins.horizontal_in,
    )?;
    writeln!(
        out,
        "body {{ margin: 0; font-family: sans-serif; color: #0f172a; }}\n\
         .sheet {{ width: {SHEET_WIDTH_PX}px; margin: 0 auto; }}\n\
         .brand div {{ font-size: 48px; font-weight: 900; text-transform: uppercase; line-height: 0.85; }}\n\
         .brand div:last-child {{ font-weight: 400; text-transform: none; }}\n\
         .rule {{ height: 4px; background: #b91c1c; margin: 8px 0 32px; }}\n\
         .divider {{ height: 6px; background: #1e293b; margin: 32px 0; {avoid} }}\n\
         .item {{ display: flex; gap: 32px; {avoid} }}\n\
         .item .text {{ flex: 1.2; }}\n\
         .item .media {{ flex: 0.8; text-align: right; }}\n\
         .item img {{ max-height: 350px; max-width: 100%; }}\n\
         .title {{ font-size: 20px; font-weight: 700; text-transform: uppercase; }}\n\
         .features {{ white-space: pre-wrap; font-size: 14px; line-height: 1.6; }}\n\
         .price {{ font-size: 18px; font-weight: 700; margin-top: 16px; }}\n\
         .note {{ font-size: 14px; }}\n\
         .empty {{ border: 2px dashed #e2e8f0; color: #94a3b8; padding: 96px; text-align: center; }}\n\
         .footer {{ background: #1a2b4b; color: #fff; padding: 24px; text-align: center; margin-top: 32px; {avoid} }}\n\
         .footer .disclaimer {{ font-size: 10px; font-style: italic; color: #e2e8f0; }}\n\
         .footer .contact {{ font-size: 14px; font-weight: 700; border-top: 1px solid rgba(255,255,255,0.2); padding-top: 12px; }}"
    )?;
    writeln!(out, "</style></head><body><div class=\"sheet\">")?;

    writeln!(out, "<div class=\"brand\">")?;
    for line in &sheet.branding.company_name_lines {
        writeln!(out, "<div>{}</div>", escape_html(line))?;
    }
    writeln!(out, "</div><div class=\"rule\"></div>")?;

    if sheet.items.is_empty() {
        writeln!(out, "<div class=\"empty\">{EMPTY_SHEET_PLACEHOLDER}</div>")?;
    }
    for (index, item) in sheet.items.iter().enumerate() {
        if index > 0 {
            writeln!(out, "<div class=\"divider\"></div>")?;
        }
        let src = embedded_image(item.image().payload(), options.jpeg_quality());
        writeln!(out, "<div class=\"item\" data-item-id=\"{}\">", item.id())?;
        writeln!(out, "<div class=\"text\">")?;
        writeln!(out, "<div class=\"title\">{}</div>", escape_html(&item.title))?;
        writeln!(out, "<div class=\"features\">{}</div>", escape_html(&item.features))?;
        if !item.description.is_empty() {
            writeln!(out, "<p>{}</p>", escape_html(&item.description))?;
        }
        writeln!(out, "<div class=\"price\">{}</div>", escape_html(&item.price))?;
        writeln!(
            out,
            "<div class=\"note\">{}</div>",
            escape_html(&sheet.branding.pricing_note)
        )?;
        writeln!(out, "</div>")?;
        writeln!(
            out,
            "<div class=\"media\"><img src=\"{src}\" alt=\"{}\"></div>",
            escape_html(&item.title)
        )?;
        writeln!(out, "</div>")?;
    }

    writeln!(out, "<div class=\"footer\">")?;
    writeln!(
        out,
        "<div class=\"disclaimer\">{}</div>",
        escape_html(&sheet.branding.footer_note)
    )?;
    writeln!(
        out,
        "<div class=\"contact\">{}</div>",
        escape_html(&sheet.branding.contact_line)
    )?;
    writeln!(out, "</div>")?;
    writeln!(out, "</div></body></html>")?;
    Ok(out)
}

/// Data URL for an item image, re-encoded as JPEG. Falls back to the
/// original bytes when the payload cannot be decoded.
fn embedded_image(payload: &ImagePayload, quality: u8) -> String {
    match encode_jpeg(payload.data(), quality) {
        Ok(jpeg) => format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)),
        Err(err) => {
            tracing::debug!(
                error = %err,
                mime_type = payload.mime_type(),
                "Embedding image without re-encoding"
            );
            payload.data_url()
        }
    }
}

/// A baseline JPEG with its pixel size.
#[derive(Debug, Clone)]
pub struct JpegImage {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Decode any supported image and write it as baseline JPEG.
pub fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>, ::image::ImageError> {
    jpeg_image(data, quality).map(|jpeg| jpeg.bytes)
}

/// Like [`encode_jpeg`], keeping the dimensions for layout.
pub fn jpeg_image(data: &[u8], quality: u8) -> Result<JpegImage, ::image::ImageError> {
    let decoded = ::image::load_from_memory(data)?;
    // JPEG has no alpha channel.
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))?;
    Ok(JpegImage {
        width,
        height,
        bytes,
    })
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
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
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
