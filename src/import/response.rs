//! Finds and decodes the JSON array of transactions in the raw model output.
//!
//! Small models like to wrap their answer in prose or markdown fences, so the
//! output is searched for the first JSON array and everything around it is
//! ignored.

use serde_json::Value;

use crate::Error;

/// Find the first JSON array in `raw`.
///
/// The array starts at the first `[`. Its end is the matching `]`, skipping
/// brackets inside JSON strings. If the brackets never balance, the array is
/// assumed to end at the last `]` in `raw`.
///
/// Returns `None` if `raw` has no `[` followed by a `]`.
pub fn find_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let candidate = &raw[start..];

    let end = matching_bracket(candidate).or_else(|| candidate.rfind(']'))?;

    Some(&candidate[..=end])
}

/// The byte index of the `]` that closes the `[` at the start of `text`.
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the records from the raw model output.
///
/// Output without a JSON array yields no records.
///
/// # Errors
/// Returns [Error::MalformedModelResponse] if an array was found but it is not
/// valid JSON. This fails the whole import.
pub fn parse_model_output(raw: &str) -> Result<Vec<Value>, Error> {
    let Some(array) = find_json_array(raw) else {
        tracing::warn!(
            "No JSON array found in {} characters of model output",
            raw.chars().count()
        );
        tracing::debug!("Model output without a JSON array: {raw}");
        return Ok(Vec::new());
    };

    serde_json::from_str::<Vec<Value>>(array).map_err(|error| {
        tracing::error!("Could not decode the JSON array in the model output: {error}");
        tracing::debug!("Malformed JSON array: {array}");
        Error::MalformedModelResponse(error.to_string())
    })
}
