//! The instructions sent to the language model along with the statement text.

/// The words that mark a transaction as maaser given.
///
/// Matched against the lowercased description, so every entry is lowercase.
pub const TITHE_KEYWORDS: [&str; 5] = ["maaser", "tzedaka", "chasdei", "aww", "chasdé"];

const INSTRUCTIONS: &str = r#"Extract every real transaction as JSON array ONLY. No text before/after.

Example:
[
  {"date":"2020-01-02","amount":1119.28,"description":"Virement instantané...","category":"income"},
  {"date":"2020-01-02","amount":-250.00,"description":"Virement vers Maaser...","category":"maaser_given"}
]

Rules:
- Date: YYYY-MM-DD
- maaser_given only if "maaser", "tzedaka", "chasdei", "AWW", "Chasdé" in description
- Ignore zero amounts

Text:
"#;

/// Build the prompt asking the model to turn `statement_text` into a JSON array.
pub fn build_prompt(statement_text: &str) -> String {
    format!("{INSTRUCTIONS}{statement_text}\n\nJSON only:")
}
