//! Turns an uploaded bank statement into plain text for the language model.

use crate::Error;

/// The file extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["csv", "pdf", "xlsx", "xls"];

/// The maximum number of characters of a document sent to the model.
pub const MAX_MODEL_INPUT_CHARS: usize = 80_000;

/// Get the lowercased extension of `file_name` if it is one of [ALLOWED_EXTENSIONS].
///
/// # Errors
/// Returns [Error::NoFileSelected] for an empty file name and
/// [Error::UnsupportedFileType] if the extension is missing or not allowed.
pub fn allowed_extension(file_name: &str) -> Result<String, Error> {
    if file_name.trim().is_empty() {
        return Err(Error::NoFileSelected);
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
        .ok_or_else(|| Error::UnsupportedFileType(file_name.to_owned()))?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::UnsupportedFileType(file_name.to_owned()))
    }
}

/// Extract the text of an uploaded document.
///
/// PDF documents are extracted page by page and the pages joined with a
/// newline. Every other document is read as UTF-8, dropping any bytes that
/// are not valid UTF-8.
///
/// # Errors
/// Returns [Error::DocumentRead] if the PDF cannot be parsed.
pub fn decode_document(bytes: &[u8], extension: &str) -> Result<String, Error> {
    if extension == "pdf" {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|error| {
            tracing::error!("Could not extract text from PDF: {error}");
            Error::DocumentRead(format!("could not extract text from the PDF: {error}"))
        })?;

        tracing::debug!("Extracted {} pages of text from PDF", pages.len());

        return Ok(pages.join("\n"));
    }

    Ok(decode_utf8_dropping_invalid(bytes))
}

fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    bytes
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect()
}

/// Strip NUL characters from `raw` and truncate it to [MAX_MODEL_INPUT_CHARS] characters.
pub fn prepare_model_input(raw: &str) -> String {
    raw.chars()
        .filter(|&c| c != '\0')
        .take(MAX_MODEL_INPUT_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{MAX_MODEL_INPUT_CHARS, allowed_extension, decode_document, prepare_model_input};

    #[test]
    fn accepts_allowed_extensions_in_any_case() {
        assert_eq!(allowed_extension("ing.CSV"), Ok("csv".to_owned()));
        assert_eq!(allowed_extension("statement.pdf"), Ok("pdf".to_owned()));
        assert_eq!(allowed_extension("year.2024.Xlsx"), Ok("xlsx".to_owned()));
        assert_eq!(allowed_extension("old.xls"), Ok("xls".to_owned()));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(
            allowed_extension("notes.docx"),
            Err(Error::UnsupportedFileType("notes.docx".to_owned()))
        );
        assert_eq!(
            allowed_extension("README"),
            Err(Error::UnsupportedFileType("README".to_owned()))
        );
    }

    #[test]
    fn empty_file_name_is_no_file() {
        assert_eq!(allowed_extension(""), Err(Error::NoFileSelected));
    }

    #[test]
    fn drops_invalid_utf8_bytes() {
        let bytes = b"02/01/2020;Virement\xff;1119,28";

        let text = decode_document(bytes, "csv").unwrap();

        assert_eq!(text, "02/01/2020;Virement;1119,28");
    }

    #[test]
    fn unreadable_pdf_is_an_error() {
        let result = decode_document(b"definitely not a pdf", "pdf");

        assert!(matches!(result, Err(Error::DocumentRead(_))));
    }

    #[test]
    fn strips_nul_characters() {
        assert_eq!(prepare_model_input("a\0b\0c"), "abc");
    }

    #[test]
    fn truncates_to_character_limit() {
        let raw = "é".repeat(MAX_MODEL_INPUT_CHARS + 10);

        let prepared = prepare_model_input(&raw);

        assert_eq!(prepared.chars().count(), MAX_MODEL_INPUT_CHARS);
    }
}
