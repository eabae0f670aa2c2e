use crate::domain::model::{column_union, normalize, Record};
use crate::utils::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
pub const NO_DATA_MARKER: &str = "No data available.";

/// Page geometry and type sizes, in PDF points.
#[derive(Debug, Clone)]
pub struct PdfLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_x: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub header_size: f32,
    pub row_size: f32,
    pub title_gap: f32,
    pub subtitle_gap: f32,
    pub header_gap: f32,
    pub row_height: f32,
    /// Points per character when budgeting cell text.
    pub char_width: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        // A4 portrait
        Self {
            page_width: 595.2756,
            page_height: 841.8898,
            margin_x: 40.0,
            margin_top: 60.0,
            margin_bottom: 60.0,
            title_size: 16.0,
            subtitle_size: 10.0,
            header_size: 10.0,
            row_size: 9.0,
            title_gap: 24.0,
            subtitle_gap: 30.0,
            header_gap: 16.0,
            row_height: 14.0,
            char_width: 6.0,
        }
    }
}

impl PdfLayout {
    fn title_y(&self) -> f32 {
        self.page_height - self.margin_top
    }

    fn body_y(&self) -> f32 {
        self.title_y() - self.title_gap - self.subtitle_gap
    }

    /// Rows that fit below the header band; the same on every page.
    pub fn rows_per_page(&self) -> usize {
        let first_row = self.body_y() - self.header_gap;
        if first_row < self.margin_bottom {
            return 1;
        }
        ((first_row - self.margin_bottom) / self.row_height).floor() as usize + 1
    }

    pub fn column_width(&self, columns: usize) -> f32 {
        (self.page_width - 2.0 * self.margin_x) / columns.max(1) as f32
    }

    pub fn max_chars(&self, column_width: f32) -> usize {
        (column_width / self.char_width).floor() as usize
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Cut `value` to the column's character budget, ending with `...` when the
/// budget has room for it.
pub fn fit_cell(value: &str, max_chars: usize) -> String {
    let flat = value.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    if max_chars <= 3 {
        return flat.chars().take(max_chars).collect();
    }
    let kept: String = flat.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Render a titled, paginated table of `records`.
///
/// An empty sequence renders a single page carrying [`NO_DATA_MARKER`].
pub fn render_pdf(
    records: &[Record],
    title: &str,
    generated_at: &str,
    layout: &PdfLayout,
) -> Result<RenderedPdf> {
    let subtitle = format!("Generated: {}", generated_at);
    let mut pages: Vec<Vec<Operation>> = Vec::new();

    if records.is_empty() {
        let mut ops = page_banner(layout, title, &subtitle);
        push_text(
            &mut ops,
            REGULAR,
            12.0,
            layout.margin_x,
            layout.body_y(),
            NO_DATA_MARKER,
        );
        pages.push(ops);
    } else {
        let columns = column_union(records);
        let rows = normalize(records, &columns);
        let col_width = layout.column_width(columns.len());
        let max_chars = layout.max_chars(col_width);

        for chunk in rows.chunks(layout.rows_per_page()) {
            let mut ops = page_banner(layout, title, &subtitle);
            let mut y = layout.body_y();

            for (i, column) in columns.iter().enumerate() {
                let x = layout.margin_x + col_width * i as f32;
                push_text(&mut ops, BOLD, layout.header_size, x, y, &column.to_uppercase());
            }
            y -= layout.header_gap;

            for row in chunk {
                for (i, (_, value)) in row.iter().enumerate() {
                    let x = layout.margin_x + col_width * i as f32;
                    push_text(&mut ops, REGULAR, layout.row_size, x, y, &fit_cell(value, max_chars));
                }
                y -= layout.row_height;
            }
            pages.push(ops);
        }
    }

    assemble(pages, layout)
}

fn page_banner(layout: &PdfLayout, title: &str, subtitle: &str) -> Vec<Operation> {
    let mut ops = Vec::new();
    let title_y = layout.title_y();
    push_centered(&mut ops, BOLD, layout.title_size, layout, title_y, title);
    push_centered(
        &mut ops,
        REGULAR,
        layout.subtitle_size,
        layout,
        title_y - layout.title_gap,
        subtitle,
    );
    ops
}

fn push_centered(
    ops: &mut Vec<Operation>,
    font: &str,
    size: f32,
    layout: &PdfLayout,
    y: f32,
    text: &str,
) {
    // Helvetica averages roughly half an em per glyph, bold a little wider.
    let em = if font == BOLD { 0.55 } else { 0.5 };
    let width = text.chars().count() as f32 * size * em;
    let x = ((layout.page_width - width) / 2.0).max(layout.margin_x);
    push_text(ops, font, size, x, y, text);
}

fn push_text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

/// Encode for the standard Type1 fonts; unmappable characters print as `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        // C0/C1 controls and everything outside the code page
        _ => b'?',
    }
}

fn assemble(pages: Vec<Vec<Operation>>, layout: &PdfLayout) -> Result<RenderedPdf> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular,
            BOLD => bold,
        },
    });

    let page_count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                layout.page_width.into(),
                layout.page_height.into(),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    Ok(RenderedPdf {
        bytes,
        pages: page_count,
    })
}
