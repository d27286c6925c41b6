//! Extracts transactions from uploaded bank statements with a language model.
//!
//! The pipeline runs in four stages:
//! 1. `document` turns the uploaded file into plain text,
//! 2. `prompt` wraps the text in instructions and `model` asks the model for a JSON array,
//! 3. `response` finds and decodes the array in the raw output,
//! 4. `normalize` validates each record and fills in the category.

mod document;
mod import_endpoint;
mod import_page;
mod model;
mod normalize;
mod prompt;
mod response;

pub use document::{ALLOWED_EXTENSIONS, decode_document};
pub use import_endpoint::import_statement_endpoint;
pub use import_page::get_import_page;
pub use model::{
    CommandModel, DEFAULT_MODEL, DEFAULT_MODEL_COMMAND, DEFAULT_MODEL_TIMEOUT, LanguageModel,
    ModelError,
};
pub use normalize::ParsedTransaction;

use crate::Error;

/// Run the statement text through the model and return the valid transactions.
///
/// A model that cannot be run produces no transactions rather than an error,
/// so the caller sees the same result as for a statement without transactions.
///
/// # Errors
/// Returns [Error::MalformedModelResponse] if the model output contains a
/// JSON array that cannot be decoded.
pub fn extract_transactions(
    model: &dyn LanguageModel,
    statement_text: &str,
) -> Result<Vec<ParsedTransaction>, Error> {
    let input = document::prepare_model_input(statement_text);
    let prompt = prompt::build_prompt(&input);

    let output = model.complete(&prompt).unwrap_or_else(|error| {
        tracing::error!("Could not get a response from the model: {error}");
        String::new()
    });

    let records = response::parse_model_output(&output)?;

    Ok(normalize::normalize_records(&records))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use time::macros::date;

    use crate::{Error, test_utils::StubModel, transaction::Category};

    use super::{ModelError, ParsedTransaction, extract_transactions};

    #[test]
    fn extracts_records_from_chatty_output() {
        let model = StubModel::answering(
            "Sure! Here are the transactions:\n\
            [{\"date\":\"02/01/2020\",\"amount\":1119.28,\"description\":\"Virement\",\"category\":\"\"},\
             {\"date\":\"2020-01-02\",\"amount\":-250.00,\"description\":\"Don Maaser\",\"category\":\"\"}]\n\
            Let me know if you need anything else.",
        );

        let transactions = extract_transactions(&model, "statement").unwrap();

        assert_eq!(
            transactions,
            vec![
                ParsedTransaction {
                    date: date!(2020 - 01 - 02),
                    amount: 1119.28,
                    description: "Virement".to_owned(),
                    category: Category::Income,
                },
                ParsedTransaction {
                    date: date!(2020 - 01 - 02),
                    amount: -250.0,
                    description: "Don Maaser".to_owned(),
                    category: Category::MaaserGiven,
                },
            ]
        );
    }

    #[test]
    fn output_without_array_yields_nothing() {
        let model = StubModel::answering("I could not find any transactions.");

        let transactions = extract_transactions(&model, "statement").unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn model_failure_yields_nothing() {
        let model = StubModel::failing(ModelError::Timeout(Duration::from_secs(120)));

        let transactions = extract_transactions(&model, "statement").unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn malformed_array_fails_the_batch() {
        let model = StubModel::answering("[{\"date\": \"2020-01-02\", \"amount\": }]");

        let result = extract_transactions(&model, "statement");

        assert!(matches!(result, Err(Error::MalformedModelResponse(_))));
    }

    #[test]
    fn prompt_contains_cleaned_statement_text() {
        let model = StubModel::answering("[]");

        extract_transactions(&model, "02/01/2020\0;Virement;1119,28").unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("02/01/2020;Virement;1119,28"));
        assert!(!prompts[0].contains('\0'));
        assert!(prompts[0].ends_with("JSON only:"));
    }
}
