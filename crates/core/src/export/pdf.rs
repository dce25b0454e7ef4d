//! PDF rendering of the storyboard sheet.
//!
//! Objects are written directly with `lopdf`. Text uses the standard
//! Helvetica faces in WinAnsi encoding, so no font is embedded, and item
//! images go in as `DCTDecode` JPEG streams.
//!
//! Layout is a single column of blocks (header, items, footer) flowed down
//! the printable area. A block is a list of rows; a row never splits, and a
//! block marked `keep_together` moves to a fresh page as a whole when it
//! does not fit in what is left of the current one.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use super::{
    jpeg_image, validate_export_options, DocumentExporter, ExportError, ExportOptions,
    ExportedDocument, SheetBranding, StoryboardSheet, EMPTY_SHEET_PLACEHOLDER,
};
use crate::media::ImagePayload;
use crate::storyboard::StoryboardItem;

const POINTS_PER_INCH: f32 = 72.0;
/// CSS pixels are 1/96 in.
const POINTS_PER_PIXEL: f32 = 0.75;
/// Mean Helvetica advance as a fraction of the font size. Used for wrapping.
const AVG_GLYPH_WIDTH: f32 = 0.52;
const LINE_HEIGHT: f32 = 1.3;

const IMAGE_MAX_HEIGHT: f32 = 262.0;
const TEXT_COLUMN_SHARE: f32 = 0.58;
const COLUMN_GAP: f32 = 24.0;
const SECTION_GAP: f32 = 24.0;

const INK: Rgb = Rgb(0.06, 0.09, 0.16);
const MUTED: Rgb = Rgb(0.58, 0.64, 0.72);
const ACCENT: Rgb = Rgb(0.73, 0.11, 0.11);
const NAVY: Rgb = Rgb(0.10, 0.17, 0.29);
const PALE: Rgb = Rgb(0.89, 0.91, 0.94);
const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

const BRAND: TextStyle = TextStyle::new(30.0, Face::Bold, INK);
const BRAND_TAGLINE: TextStyle = TextStyle::new(30.0, Face::Regular, INK);
const TITLE: TextStyle = TextStyle::new(15.0, Face::Bold, INK);
const BODY: TextStyle = TextStyle::new(10.5, Face::Regular, INK);
const PRICE: TextStyle = TextStyle::new(13.0, Face::Bold, INK);
const NOTE: TextStyle = TextStyle::new(8.5, Face::Regular, INK);
const PLACEHOLDER: TextStyle = TextStyle::new(10.5, Face::Regular, MUTED);
const DISCLAIMER: TextStyle = TextStyle::new(7.5, Face::Regular, PALE);
const CONTACT: TextStyle = TextStyle::new(10.5, Face::Bold, WHITE);

/// Renders the sheet as a PDF with real pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDocumentExporter;

impl DocumentExporter for PdfDocumentExporter {
    fn export(
        &self,
        sheet: &StoryboardSheet,
        options: &ExportOptions,
    ) -> Result<ExportedDocument, ExportError> {
        validate_export_options(options)?;
        let (bytes, pages) = render_pdf(sheet, options)?;

        tracing::info!(
            items = sheet.items.len(),
            pages,
            bytes = bytes.len(),
            "Rendered storyboard PDF"
        );

        Ok(ExportedDocument {
            file_name: format!("{}.pdf", options.file_stem.trim()),
            mime_type: "application/pdf",
            bytes,
        })
    }
}

fn render_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Render(err.to_string())
}

/// Returns the document bytes and its page count.
fn render_pdf(
    sheet: &StoryboardSheet,
    options: &ExportOptions,
) -> Result<(Vec<u8>, usize), ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let mut xobjects = Dictionary::new();

    let mut layout = Layout::new(options);
    let width = layout.content_width;

    layout.place(&brand_block(&sheet.branding, width));
    if sheet.items.is_empty() {
        layout.place(&placeholder_block(width));
    }
    for (index, item) in sheet.items.iter().enumerate() {
        if index > 0 {
            layout.place(&divider_block(width));
        }
        let image = embed_image(
            &mut doc,
            &mut xobjects,
            item.image().payload(),
            options.jpeg_quality(),
        );
        layout.place(&item_block(
            item,
            &sheet.branding.pricing_note,
            image.as_ref(),
            width,
            options.avoid_page_breaks,
        ));
    }
    layout.place(&footer_block(
        &sheet.branding,
        width,
        options.avoid_page_breaks,
    ));

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(layout.page_width.round() as i64),
        Object::Integer(layout.page_height.round() as i64),
    ];
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in layout.finish() {
        let content = Content { operations }.encode().map_err(render_error)?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }
    let page_count = kids.len();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(render_error)?;
    Ok((bytes, page_count))
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// An image XObject registered in the page resources.
struct PlacedImage {
    name: String,
    width_px: u32,
    height_px: u32,
}

/// Re-encode the payload as JPEG and register it. Undecodable payloads are
/// left out of the document; the item still renders its text.
fn embed_image(
    doc: &mut Document,
    xobjects: &mut Dictionary,
    payload: &ImagePayload,
    quality: u8,
) -> Option<PlacedImage> {
    let jpeg = match jpeg_image(payload.data(), quality) {
        Ok(jpeg) => jpeg,
        Err(err) => {
            tracing::debug!(
                error = %err,
                mime_type = payload.mime_type(),
                "Leaving undecodable image out of the PDF"
            );
            return None;
        }
    };

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(jpeg.width),
            "Height" => i64::from(jpeg.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        jpeg.bytes,
    );
    let id = doc.add_object(stream);
    let name = format!("Im{}", xobjects.len() + 1);
    xobjects.set(name.clone(), id);

    Some(PlacedImage {
        name,
        width_px: jpeg.width,
        height_px: jpeg.height,
    })
}

/* --------------------------------------------------------------------------
   Layout model
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
struct Rgb(f32, f32, f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    face: Face,
    color: Rgb,
}

impl TextStyle {
    const fn new(size: f32, face: Face, color: Rgb) -> Self {
        Self { size, face, color }
    }

    fn line_height(self) -> f32 {
        self.size * LINE_HEIGHT
    }

    fn text_width(self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * AVG_GLYPH_WIDTH
    }
}

/// Something drawn relative to the top-left corner of its row.
enum Mark {
    Text {
        x: f32,
        style: TextStyle,
        text: String,
    },
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Image {
        x: f32,
        width: f32,
        height: f32,
        name: String,
    },
}

/// A horizontal strip of the page.
///
/// `reach` is how far below the row top its marks extend. It exceeds
/// `height` when an image sits beside the following rows.
struct Row {
    height: f32,
    reach: f32,
    marks: Vec<Mark>,
}

impl Row {
    fn gap(height: f32) -> Self {
        Self {
            height,
            reach: 0.0,
            marks: Vec::new(),
        }
    }

    fn text(style: TextStyle, x: f32, text: String) -> Self {
        let height = style.line_height();
        let marks = if text.is_empty() {
            Vec::new()
        } else {
            vec![Mark::Text { x, style, text }]
        };
        Self {
            height,
            reach: height,
            marks,
        }
    }

    fn fill(height: f32, bar: f32, width: f32, color: Rgb) -> Self {
        Self {
            height,
            reach: height,
            marks: vec![Mark::Fill {
                x: 0.0,
                y: (height - bar) / 2.0,
                width,
                height: bar,
                color,
            }],
        }
    }

    /// Paint the full row width behind the existing marks.
    fn on_background(mut self, width: f32, color: Rgb) -> Self {
        self.marks.insert(
            0,
            Mark::Fill {
                x: 0.0,
                y: 0.0,
                width,
                height: self.height,
                color,
            },
        );
        self.reach = self.reach.max(self.height);
        self
    }
}

struct Block {
    rows: Vec<Row>,
    keep_together: bool,
}

impl Block {
    /// Vertical space the block's marks need, trailing gaps excluded.
    fn extent(&self) -> f32 {
        let mut top = 0.0_f32;
        let mut bottom = 0.0_f32;
        for row in &self.rows {
            bottom = bottom.max(top + row.reach);
            top += row.height;
        }
        bottom
    }
}

/// Flows blocks down the printable area, page after page.
struct Layout {
    page_width: f32,
    page_height: f32,
    margin_left: f32,
    margin_top: f32,
    content_width: f32,
    content_height: f32,
    finished: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    /// Distance of the next row below the top of the printable area.
    cursor: f32,
    /// Lowest point drawn on the current page.
    floor: f32,
}

impl Layout {
    fn new(options: &ExportOptions) -> Self {
        let (width_in, height_in) = options.page_dimensions_in();
        let margins = options.margins;
        Self {
            page_width: width_in * POINTS_PER_INCH,
            page_height: height_in * POINTS_PER_INCH,
            margin_left: margins.horizontal_in * POINTS_PER_INCH,
            margin_top: margins.vertical_in * POINTS_PER_INCH,
            content_width: (width_in - 2.0 * margins.horizontal_in) * POINTS_PER_INCH,
            content_height: (height_in - 2.0 * margins.vertical_in) * POINTS_PER_INCH,
            finished: Vec::new(),
            ops: Vec::new(),
            cursor: 0.0,
            floor: 0.0,
        }
    }

    fn remaining(&self) -> f32 {
        self.content_height - self.cursor
    }

    fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.ops));
        self.cursor = 0.0;
        self.floor = 0.0;
    }

    fn place(&mut self, block: &Block) {
        if block.keep_together && self.cursor > 0.0 && block.extent() > self.remaining() {
            self.new_page();
        }
        for row in &block.rows {
            // A block taller than a page still breaks, between rows.
            if self.cursor > 0.0 && row.reach > self.remaining() {
                self.new_page();
            }
            self.draw(row);
            self.floor = self.floor.max(self.cursor + row.reach);
            self.cursor += row.height;
        }
        self.cursor = self.cursor.max(self.floor);
    }

    fn draw(&mut self, row: &Row) {
        let top = self.page_height - self.margin_top - self.cursor;
        let left = self.margin_left;
        for mark in &row.marks {
            match mark {
                Mark::Text { x, style, text } => self.ops.extend([
                    fill_color(style.color),
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![style.face.resource().into(), real(style.size)]),
                    Operation::new("Td", vec![real(left + x), real(top - style.size)]),
                    Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
                    Operation::new("ET", vec![]),
                ]),
                Mark::Fill {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => self.ops.extend([
                    fill_color(*color),
                    Operation::new(
                        "re",
                        vec![
                            real(left + x),
                            real(top - y - height),
                            real(*width),
                            real(*height),
                        ],
                    ),
                    Operation::new("f", vec![]),
                ]),
                Mark::Image {
                    x,
                    width,
                    height,
                    name,
                } => self.ops.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            real(*width),
                            real(0.0),
                            real(0.0),
                            real(*height),
                            real(left + x),
                            real(top - height),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
                    Operation::new("Q", vec![]),
                ]),
            }
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.ops);
        self.finished
    }
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn fill_color(Rgb(r, g, b): Rgb) -> Operation {
    Operation::new("rg", vec![real(r), real(g), real(b)])
}

/* --------------------------------------------------------------------------
   Blocks
   -------------------------------------------------------------------------- */

fn brand_block(branding: &SheetBranding, width: f32) -> Block {
    let last = branding.company_name_lines.len().saturating_sub(1);
    let mut rows: Vec<Row> = branding
        .company_name_lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == last {
                Row::text(BRAND_TAGLINE, 0.0, line.clone())
            } else {
                Row::text(BRAND, 0.0, line.to_uppercase())
            }
        })
        .collect();
    rows.push(Row::fill(12.0, 3.0, width, ACCENT));
    rows.push(Row::gap(SECTION_GAP));
    Block {
        rows,
        keep_together: true,
    }
}

fn placeholder_block(width: f32) -> Block {
    let mut rows = vec![Row::gap(72.0)];
    rows.extend(centered(EMPTY_SHEET_PLACEHOLDER, PLACEHOLDER, width));
    rows.push(Row::gap(72.0));
    Block {
        rows,
        keep_together: true,
    }
}

fn divider_block(width: f32) -> Block {
    Block {
        rows: vec![
            Row::gap(SECTION_GAP),
            Row::fill(5.0, 5.0, width, INK),
            Row::gap(SECTION_GAP),
        ],
        keep_together: true,
    }
}

/// Text column on the left, image on the right aligned with the title.
fn item_block(
    item: &StoryboardItem,
    pricing_note: &str,
    image: Option<&PlacedImage>,
    width: f32,
    keep_together: bool,
) -> Block {
    let text_width = width * TEXT_COLUMN_SHARE;
    let mut rows = paragraph(&item.title.to_uppercase(), TITLE, text_width);
    rows.push(Row::gap(4.0));
    rows.extend(paragraph(&item.features, BODY, text_width));
    if !item.description.is_empty() {
        rows.push(Row::gap(6.0));
        rows.extend(paragraph(&item.description, BODY, text_width));
    }
    rows.push(Row::gap(10.0));
    rows.extend(paragraph(&item.price, PRICE, text_width));
    rows.extend(paragraph(pricing_note, NOTE, text_width));

    if let Some(image) = image {
        let column = width - text_width - COLUMN_GAP;
        let natural_width = image.width_px as f32 * POINTS_PER_PIXEL;
        let natural_height = image.height_px as f32 * POINTS_PER_PIXEL;
        let scale = (column / natural_width)
            .min(IMAGE_MAX_HEIGHT / natural_height)
            .min(1.0);
        let (image_width, image_height) = (natural_width * scale, natural_height * scale);
        if rows.is_empty() {
            rows.push(Row::gap(0.0));
        }
        let first = &mut rows[0];
        first.marks.push(Mark::Image {
            x: width - image_width,
            width: image_width,
            height: image_height,
            name: image.name.clone(),
        });
        first.reach = first.reach.max(image_height);
    }

    Block {
        rows,
        keep_together,
    }
}

fn footer_block(branding: &SheetBranding, width: f32, keep_together: bool) -> Block {
    let mut rows = vec![Row::gap(18.0)];
    rows.extend(centered(&branding.footer_note, DISCLAIMER, width - 36.0));
    rows.push(Row::gap(8.0));
    rows.push(Row::fill(9.0, 0.5, width, MUTED));
    rows.extend(centered(&branding.contact_line, CONTACT, width - 36.0));
    rows.push(Row::gap(18.0));

    let mut rows: Vec<Row> = rows
        .into_iter()
        .map(|row| row.on_background(width, NAVY))
        .collect();
    rows.insert(0, Row::gap(SECTION_GAP));
    Block {
        rows,
        keep_together,
    }
}

fn paragraph(text: &str, style: TextStyle, width: f32) -> Vec<Row> {
    wrap(text, style, width)
        .into_iter()
        .map(|line| Row::text(style, 0.0, line))
        .collect()
}

/// Wrapped lines centred in `width`, which is itself centred in the page.
fn centered(text: &str, style: TextStyle, width: f32) -> Vec<Row> {
    wrap(text, style, width)
        .into_iter()
        .map(|line| {
            let x = (width - style.text_width(&line)) / 2.0;
            Row::text(style, x.max(0.0) + 18.0, line)
        })
        .collect()
}

/// Greedy word wrap on estimated glyph widths. Newlines start a new line;
/// words longer than a line are split.
fn wrap(text: &str, style: TextStyle, width: f32) -> Vec<String> {
    let max_chars = ((width / (style.size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;
        for word in source_line.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(chars.drain(..max_chars).collect());
            }
            if line_len > 0 && line_len + 1 + chars.len() > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line_len += chars.len();
            line.extend(chars);
        }
        lines.push(line);
    }
    lines
}

/// Encode text for the WinAnsi standard fonts. Characters outside the
/// encoding become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|ch| !ch.is_control())
        .map(|ch| match ch {
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            ch if (ch as u32) < 0x80 || (0xA0..=0xFF).contains(&(ch as u32)) => ch as u8,
            _ => b'?',
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
