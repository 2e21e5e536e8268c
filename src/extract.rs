//! Plain-text extraction from uploaded documents.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::models::DocumentKind;
use crate::errors::BotError;

const DOCX_BODY_PART: &str = "word/document.xml";

pub trait TextExtractor: Send + Sync {
    /// Extract plain text from the raw bytes of a document.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ExtractError` when the bytes are not a readable
    /// document of the given kind.
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, BotError>;
}

/// Extractor for PDF (`pdf-extract`) and DOCX (zip + WordprocessingML) files.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, BotError> {
        match kind {
            DocumentKind::Pdf => extract_pdf_text(bytes),
            DocumentKind::Docx => extract_docx_text(bytes),
        }
    }
}

/// Run an extractor and fold failures into the descriptive text shown to users.
#[must_use]
pub fn extract_or_describe(extractor: &dyn TextExtractor, bytes: &[u8], kind: DocumentKind) -> String {
    extractor.extract(bytes, kind).unwrap_or_else(|e| {
        let reason = match e {
            BotError::ExtractError(msg) => msg,
            other => other.to_string(),
        };
        format!("Error extracting text from {}: {reason}", kind.label())
    })
}

/// # Errors
///
/// Returns an error if the bytes are not a parseable PDF. Panics inside the
/// PDF parser on hostile input are reported as errors too.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, BotError> {
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| BotError::ExtractError("PDF parser panicked".to_string()))?
        .map_err(|e| BotError::ExtractError(e.to_string()))
}

/// Paragraph text of a DOCX body, one paragraph per line.
///
/// # Errors
///
/// Returns an error if the bytes are not a zip archive, the body part is
/// missing, or the body XML is malformed.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, BotError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| BotError::ExtractError(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| BotError::ExtractError(format!("{DOCX_BODY_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| BotError::ExtractError(format!("{DOCX_BODY_PART}: {e}")))?;

    paragraphs_from_document_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn paragraphs_from_document_xml(xml: &str) -> Result<Vec<String>, BotError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| BotError::ExtractError(format!("bad text run: {e}")))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BotError::ExtractError(format!(
                    "malformed document XML at {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
