use std::sync::Mutex;

use crate::import::{LanguageModel, ModelError};

/// A language model that always gives the same answer and remembers its prompts.
#[derive(Debug)]
pub(crate) struct StubModel {
    output: Result<String, ModelError>,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub(crate) fn answering(output: &str) -> Self {
        Self {
            output: Ok(output.to_owned()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: ModelError) -> Self {
        Self {
            output: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LanguageModel for StubModel {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.output.clone()
    }
}
