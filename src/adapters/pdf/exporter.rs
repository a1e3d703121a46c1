use anyhow::Result;
use image::DynamicImage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, Line, Mm, PdfDocument, Point,
};
use tracing::warn;

use crate::adapters::imaging;
use crate::adapters::pdf::layout::{layout_report, DrawOp, ReportLayout, MARGIN, PAGE_H, PAGE_W};
use crate::application::ports::ReportExporterPort;
use crate::domain::{
    errors::{DomainError, DomainResult},
    report::ReportRequest,
};

const IMAGE_DPI: f32 = 300.0;

/// Exportador del informe a PDF (A4, fuentes base Helvetica).
pub struct PdfReportExporter;

impl PdfReportExporter {
    pub fn new() -> Self { Self }

    fn render(&self, title: &str, layout: &ReportLayout, image: Option<&DynamicImage>) -> Result<Vec<u8>> {
        let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let mut layer = doc.get_page(page1).get_layer(layer1);

        for op in &layout.ops {
            match op {
                DrawOp::NewPage => {
                    let (page, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
                    layer = doc.get_page(page).get_layer(l);
                }
                DrawOp::Text { x, y, size, bold: is_bold, text } => {
                    let font = if *is_bold { &bold } else { &regular };
                    layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), font);
                }
                DrawOp::Rule { y } => {
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(Mm(MARGIN), Mm(*y)), false),
                            (Point::new(Mm(PAGE_W - MARGIN), Mm(*y)), false),
                        ],
                        is_closed: false,
                    });
                }
                DrawOp::Image { x, y, width, height } => {
                    let Some(img) = image else { continue };
                    // Tamaño natural en mm a IMAGE_DPI; se escala hasta la caja maquetada.
                    let natural_w = img.width() as f32 / IMAGE_DPI * 25.4;
                    let natural_h = img.height() as f32 / IMAGE_DPI * 25.4;
                    Image::from_dynamic_image(img).add_to_layer(
                        layer.clone(),
                        ImageTransform {
                            translate_x: Some(Mm(*x)),
                            translate_y: Some(Mm(*y)),
                            scale_x: Some(width / natural_w),
                            scale_y: Some(height / natural_h),
                            dpi: Some(IMAGE_DPI),
                            ..Default::default()
                        },
                    );
                }
            }
        }

        Ok(doc.save_to_bytes()?)
    }
}

impl ReportExporterPort for PdfReportExporter {
    fn export(&self, request: &ReportRequest) -> DomainResult<Vec<u8>> {
        // Si la imagen no se puede incrustar el informe sigue adelante con un aviso.
        let image = match imaging::decode_upload(&request.image) {
            Ok(img) => Some(DynamicImage::ImageRgb8(img.to_rgb8())),
            Err(e) => {
                warn!("Report image not embedded: {}", e);
                None
            }
        };
        let layout = layout_report(request, image.as_ref().map(|i| (i.width(), i.height())));
        let title = format!("TUKLAS Report {}", request.case.case_id);

        self.render(&title, &layout, image.as_ref())
            .map_err(|e| DomainError::OperationFailed(format!("PDF export failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::knowledge::KnowledgeStore;
    use crate::domain::{
        detection::{det, DetectionSummary},
        report::{Advisory, CaseMeta},
    };

    fn request(image: Vec<u8>, advisory: Advisory, dets: &[crate::domain::detection::Detection]) -> ReportRequest {
        ReportRequest {
            case: CaseMeta::generate(),
            image,
            summary: DetectionSummary::from_detections(dets),
            advisory,
        }
    }

    #[test]
    fn exports_a_pdf_with_embedded_image() {
        let store = KnowledgeStore::embedded().unwrap();
        let record = store.lookup("Diamond-shaped Plaques (Erysipelas)").record().unwrap().clone();
        let advisory = Advisory::Protocol { matched_key: record.label.clone(), fuzzy: false, record };
        let req = request(
            imaging::sample_png(120, 80),
            advisory,
            &[det("Diamond-shaped Plaques (Erysipelas)", 0.91)],
        );
        let pdf = PdfReportExporter::new().export(&req).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn unreadable_image_still_exports() {
        let req = request(b"broken".to_vec(), Advisory::NoFindings, &[]);
        let pdf = PdfReportExporter::new().export(&req).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
