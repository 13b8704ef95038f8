use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::layout::{ChecklistDocument, SectionBody};
use super::RenderError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const PT_TO_MM: f32 = 0.352_778;
/// 50pt margins on every edge.
const MARGIN_MM: f32 = 50.0 * PT_TO_MM;
const LINE_SPACING: f32 = 1.2;
/// Helvetica averages roughly half an em per glyph.
const AVERAGE_GLYPH_EM: f32 = 0.5;
const BULLET_INDENT_MM: f32 = 6.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

fn glyph_width_mm(size: f32) -> f32 {
    size * AVERAGE_GLYPH_EM * PT_TO_MM
}

fn line_height_mm(size: f32) -> f32 {
    size * LINE_SPACING * PT_TO_MM
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * glyph_width_mm(size)
}

/// Greedy word wrap by character budget; words longer than a line are split.
pub(crate) fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let current_len = current.chars().count();
            let needed = if current.is_empty() {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct Painter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl Painter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Page {}", self.pages + 1),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    fn move_down(&mut self, size: f32, lines: f32) {
        self.y -= line_height_mm(size) * lines;
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef, align: Align, indent: f32) {
        let height = line_height_mm(size);
        if self.y - height < MARGIN_MM {
            self.new_page();
        }
        self.y -= height;

        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let x = match align {
            Align::Left => MARGIN_MM + indent,
            Align::Center => MARGIN_MM + ((usable - text_width_mm(text, size)) / 2.0).max(0.0),
            Align::Right => (PAGE_WIDTH_MM - MARGIN_MM - text_width_mm(text, size)).max(MARGIN_MM),
        };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn block(
        &mut self,
        text: &str,
        size: f32,
        font: &IndirectFontRef,
        align: Align,
        indent: f32,
    ) {
        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent;
        let max_chars = (usable / glyph_width_mm(size)).floor() as usize;
        for line in wrap(text, max_chars) {
            self.line(&line, size, font, align, indent);
        }
    }

    fn bullet(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - BULLET_INDENT_MM;
        let max_chars = (usable / glyph_width_mm(size)).floor() as usize;
        for (index, line) in wrap(text, max_chars).iter().enumerate() {
            if index == 0 {
                self.line(&format!("- {line}"), size, font, Align::Left, 0.0);
            } else {
                self.line(line, size, font, Align::Left, BULLET_INDENT_MM);
            }
        }
    }
}

/// Paint the layout onto A4 pages, returning the encoded PDF and its page count.
pub(crate) fn paint(document: &ChecklistDocument) -> Result<(Vec<u8>, usize), RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        document.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Page 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| RenderError::Font(format!("{err:?}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| RenderError::Font(format!("{err:?}")))?;

    let pages = {
        let mut painter = Painter {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        };

        painter.block(document.title, TITLE_SIZE, &bold, Align::Center, 0.0);
        painter.move_down(TITLE_SIZE, 1.0);

        for section in &document.sections {
            painter.block(section.heading, HEADING_SIZE, &bold, Align::Left, 0.0);
            match &section.body {
                SectionBody::Lines(lines) => {
                    for line in lines {
                        painter.block(line, BODY_SIZE, &regular, Align::Left, 0.0);
                    }
                }
                SectionBody::Bullets(items) => {
                    for item in items {
                        painter.bullet(item, BODY_SIZE, &regular);
                    }
                }
                SectionBody::Paragraph(text) => {
                    painter.block(text, BODY_SIZE, &regular, Align::Left, 0.0);
                }
            }
            painter.move_down(BODY_SIZE, 1.0);
        }

        painter.move_down(BODY_SIZE, 1.0);
        painter.block(&document.footer, FOOTER_SIZE, &regular, Align::Right, 0.0);
        painter.pages
    };

    let bytes = doc
        .save_to_bytes()
        .map_err(|err| RenderError::Encode(format!("{err:?}")))?;
    Ok((bytes, pages))
}
