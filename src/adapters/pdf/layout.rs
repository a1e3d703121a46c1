//! Maquetación del informe como una lista de operaciones de dibujo.
//!
//! Separar la maquetación del renderizado permite comprobar el orden de las
//! secciones y la paginación sin interpretar bytes PDF. Las coordenadas están
//! en milímetros con el origen abajo a la izquierda, como en PDF.

use deunicode::deunicode;

use crate::domain::{
    condition::ConditionRecord,
    report::{Advisory, ReportRequest, NO_PROTOCOL_MESSAGE},
};

pub const PAGE_W: f32 = 210.0;
pub const PAGE_H: f32 = 297.0;
pub const MARGIN: f32 = 18.0;
pub const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;
const IMAGE_MAX_H: f32 = 90.0;
const VALUE_COLUMN: f32 = 48.0;
const PT_TO_MM: f32 = 0.3528;
// Ancho medio de un carácter de Helvetica respecto al tamaño de fuente.
const AVG_CHAR_EM: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    NewPage,
    Text { x: f32, y: f32, size: f32, bold: bool, text: String },
    Rule { y: f32 },
    /// La imagen de origen, esquina inferior izquierda en (x, y).
    Image { x: f32, y: f32, width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    CaseMetadata,
    SourceImage,
    Classification,
    Interpretation,
    Treatment,
    NoPathology,
    NoProtocol,
    Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub ops: Vec<DrawOp>,
    pub sections: Vec<Section>,
}

#[cfg(test)]
impl ReportLayout {
    pub fn page_count(&self) -> usize {
        1 + self.ops.iter().filter(|op| matches!(op, DrawOp::NewPage)).count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Pasa el texto a ASCII imprimible: las fuentes base del PDF no cubren Unicode.
pub fn sanitize(text: &str) -> String {
    deunicode(text)
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| (' '..='~').contains(c))
        .collect()
}

/// Partición voraz por palabras; las palabras más largas que la línea se cortan.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut cut = max_chars;
            while !word.is_char_boundary(cut) {
                cut -= 1;
            }
            if cut == 0 {
                cut = word.chars().next().map_or(word.len(), char::len_utf8);
            }
            let (head, tail) = word.split_at(cut);
            lines.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Cursor {
    y: f32,
    ops: Vec<DrawOp>,
    sections: Vec<Section>,
}

impl Cursor {
    fn new() -> Self {
        Self { y: PAGE_H - MARGIN, ops: Vec::new(), sections: Vec::new() }
    }

    fn section(&mut self, section: Section) {
        self.sections.push(section);
    }

    fn ensure(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            self.ops.push(DrawOp::NewPage);
            self.y = PAGE_H - MARGIN;
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn line(&mut self, text: String, size: f32, bold: bool, indent: f32) {
        let h = line_height(size);
        self.ensure(h);
        self.y -= h;
        self.ops.push(DrawOp::Text { x: MARGIN + indent, y: self.y, size, bold, text });
    }

    fn paragraph(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let chars = ((CONTENT_W - indent) / (size * AVG_CHAR_EM * PT_TO_MM)) as usize;
        for l in wrap(&sanitize(text), chars) {
            self.line(l, size, bold, indent);
        }
    }

    fn heading(&mut self, text: &str) {
        self.ensure(line_height(13.0) + line_height(10.0) + 4.0);
        self.gap(4.0);
        self.line(sanitize(text), 13.0, true, 0.0);
    }

    /// Fila de tabla clave/valor; el valor se parte en su propia columna.
    fn row(&mut self, key: &str, value: &str) {
        let size = 10.0;
        let chars = ((CONTENT_W - VALUE_COLUMN) / (size * AVG_CHAR_EM * PT_TO_MM)) as usize;
        let lines = wrap(&sanitize(value), chars);
        let h = line_height(size);
        self.ensure(h);
        self.y -= h;
        self.ops.push(DrawOp::Text { x: MARGIN, y: self.y, size, bold: true, text: sanitize(key) });
        let mut lines = lines.into_iter();
        if let Some(first) = lines.next() {
            self.ops.push(DrawOp::Text { x: MARGIN + VALUE_COLUMN, y: self.y, size, bold: false, text: first });
        }
        for rest in lines {
            self.line(rest, size, false, VALUE_COLUMN);
        }
    }

    fn rule(&mut self) {
        self.ensure(3.0);
        self.gap(2.0);
        self.ops.push(DrawOp::Rule { y: self.y });
        self.gap(1.0);
    }
}

fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.4
}

/// Maqueta el informe completo. `image_px` es el tamaño de la imagen de
/// origen o `None` si no se pudo incrustar.
pub fn layout_report(req: &ReportRequest, image_px: Option<(u32, u32)>) -> ReportLayout {
    let mut c = Cursor::new();

    c.section(Section::Header);
    c.line("TUKLAS Diagnostics".into(), 20.0, true, 0.0);
    c.line("Veterinary Skin Lesion Analysis Report".into(), 11.0, false, 0.0);
    c.rule();

    c.section(Section::CaseMetadata);
    c.row("Case ID:", &req.case.case_id);
    c.row("Date issued:", &req.case.issued_at.format("%Y-%m-%d %H:%M:%S").to_string());

    c.section(Section::SourceImage);
    c.heading("Source Image");
    match image_px {
        Some((w, h)) if w > 0 && h > 0 => {
            let scale = (CONTENT_W / w as f32).min(IMAGE_MAX_H / h as f32);
            let (width, height) = (w as f32 * scale, h as f32 * scale);
            c.ensure(height + 2.0);
            c.gap(height + 2.0);
            c.ops.push(DrawOp::Image { x: MARGIN, y: c.y, width, height });
        }
        _ => c.paragraph("[Source image could not be embedded in this report.]", 10.0, false, 0.0),
    }

    c.section(Section::Classification);
    c.heading("Detected Classification");
    let summary = &req.summary;
    match (&req.advisory, summary.primary_label.as_deref()) {
        (Advisory::NoFindings, _) | (_, None) => {
            c.row("Classification:", "No pathology detected");
            c.row("Confidence:", "-");
        }
        (_, Some(label)) => {
            c.row("Classification:", label);
            c.row("Confidence:", &format!("{:.1}%", summary.confidence_pct()));
            c.row("Detections:", &summary.count.to_string());
            let others: Vec<&str> = summary.labels.iter().map(String::as_str).filter(|l| *l != label).collect();
            if !others.is_empty() {
                c.row("Also observed:", &others.join(", "));
            }
        }
    }

    match &req.advisory {
        Advisory::Protocol { record, matched_key, fuzzy } => {
            if *fuzzy {
                c.row("Protocol match:", matched_key);
            }
            interpretation(&mut c, record);
            treatment(&mut c, record);
        }
        Advisory::NoProtocolOnFile { label, .. } => {
            c.section(Section::NoProtocol);
            c.heading("Clinical Interpretation");
            c.paragraph(&format!("Detected class: {label}"), 10.0, false, 0.0);
            c.paragraph(NO_PROTOCOL_MESSAGE, 10.0, false, 0.0);
        }
        Advisory::NoFindings => {
            c.section(Section::NoPathology);
            c.heading("Result");
            c.paragraph(
                "No pathology detected in the submitted image. No treatment protocol is required; continue routine herd monitoring.",
                10.0,
                false,
                0.0,
            );
        }
    }

    signature(&mut c);

    ReportLayout { ops: c.ops, sections: c.sections }
}

fn interpretation(c: &mut Cursor, record: &ConditionRecord) {
    c.section(Section::Interpretation);
    c.heading("Clinical Interpretation");
    c.row("Severity:", &record.severity);
    c.row("Cause:", &record.cause);
    c.row("Potential harm:", &record.harm);
}

fn treatment(c: &mut Cursor, record: &ConditionRecord) {
    c.section(Section::Treatment);
    c.heading("Treatment Protocol");
    for (i, step) in record.steps.iter().enumerate() {
        c.paragraph(&format!("{}. {}", i + 1, step), 10.0, false, 2.0);
    }
    if !record.materials.is_empty() {
        c.gap(2.0);
        c.line("Required materials".into(), 10.0, true, 0.0);
        for m in &record.materials {
            c.paragraph(&format!("- {m}"), 10.0, false, 2.0);
        }
    }
    if !record.prevention.is_empty() {
        c.gap(2.0);
        c.line("Prevention".into(), 10.0, true, 0.0);
        for p in &record.prevention {
            c.paragraph(&format!("- {p}"), 10.0, false, 2.0);
        }
    }
    if let Some(d) = &record.dosage {
        c.gap(2.0);
        c.row("Medication:", &format!("{} ({})", d.drug_name, d.rate_description()));
    }
}

fn signature(c: &mut Cursor) {
    c.section(Section::Signature);
    c.ensure(40.0);
    c.gap(14.0);
    c.line("______________________________".into(), 10.0, false, 0.0);
    c.line("Attending Veterinarian (signature over printed name)".into(), 10.0, false, 0.0);
    c.line("License No.: ________________".into(), 10.0, false, 0.0);
    c.gap(4.0);
    c.paragraph(
        "This report was generated by an automated screening tool and does not replace examination by a licensed veterinarian.",
        8.0,
        false,
        0.0,
    );
}
