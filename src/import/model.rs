//! The boundary to the language model that reads bank statements.

use std::{fmt::Debug, process::Stdio, time::Duration};

use tokio::{
    io::AsyncWriteExt,
    process::{Child, Command},
    time::Instant,
};

/// How long to wait for a model before giving up.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// The command used to run the default model.
pub const DEFAULT_MODEL_COMMAND: &str = "ollama";

/// The default local model.
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

/// The ways a model invocation can fail.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ModelError {
    /// The model process could not be started, e.g. the command is not installed.
    #[error("could not start \"{command}\": {reason}")]
    Start {
        /// The program that was run.
        command: String,
        /// Why it could not be started.
        reason: String,
    },

    /// The model did not finish in time and was killed.
    #[error("the model did not respond within {0:?}")]
    Timeout(Duration),

    /// Reading from or writing to the model process failed.
    #[error("could not communicate with the model: {0}")]
    Io(String),
}

/// Something that completes a text prompt.
///
/// Implementations block until the completion is ready, so async callers
/// should run them with [tokio::task::spawn_blocking].
pub trait LanguageModel: Debug + Send + Sync {
    /// Send `prompt` to the model and return its raw output.
    ///
    /// # Errors
    /// Returns a [ModelError] if the model could not be run to completion.
    fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// A model run as a local command that reads the prompt from stdin and
/// writes its answer to stdout.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandModel {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandModel {
    /// Run `program` with `args` for every completion, killing it after `timeout`.
    pub fn new(program: &str, args: &[&str], timeout: Duration) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|&arg| arg.to_owned()).collect(),
            timeout,
        }
    }

    /// Run `model` with ollama, i.e. `<command> run <model>`.
    pub fn ollama(command: &str, model: &str, timeout: Duration) -> Self {
        Self::new(command, &["run", model], timeout)
    }

    fn spawn(&self) -> Result<Child, ModelError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| ModelError::Start {
                command: self.program.clone(),
                reason: error.to_string(),
            })
    }

    /// Write the prompt and collect the output, all within `self.timeout`.
    ///
    /// The deadline covers reading the output to the end, not just the exit
    /// of the model process.
    async fn run(&self, prompt: &str) -> Result<String, ModelError> {
        let start_time = Instant::now();
        let mut child = self.spawn()?;
        let stdin = child.stdin.take();

        // Stdin is closed when the prompt has been written.
        let write_prompt = async move {
            if let Some(mut stdin) = stdin {
                if let Err(error) = stdin.write_all(prompt.as_bytes()).await {
                    tracing::warn!("Could not write the full prompt to the model: {error}");
                }
            }
        };
        let exchange = async {
            let ((), output) = tokio::join!(write_prompt, child.wait_with_output());
            output
        };

        let output = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(output) => output.map_err(|error| ModelError::Io(error.to_string()))?,
            Err(_) => {
                // Dropping the exchange kills the child.
                tracing::warn!(
                    "Killing \"{}\" after waiting {:?}",
                    self.program,
                    self.timeout
                );
                return Err(ModelError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            tracing::error!(
                "\"{}\" exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        tracing::info!(
            "Model responded with {} bytes in {:.1}s",
            output.stdout.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

impl LanguageModel for CommandModel {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| ModelError::Io(error.to_string()))?;

        runtime.block_on(self.run(prompt))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::{Duration, Instant};

    use super::{CommandModel, LanguageModel, ModelError};

    #[test]
    fn returns_stdout_of_command() {
        let model = CommandModel::new("cat", &[], Duration::from_secs(5));

        let output = model.complete("  [1, 2, 3]\n").unwrap();

        assert_eq!(output, "[1, 2, 3]");
    }

    #[test]
    fn keeps_stdout_of_failed_command() {
        let model = CommandModel::new(
            "sh",
            &["-c", "echo '[]'; echo 'model not pulled' >&2; exit 3"],
            Duration::from_secs(5),
        );

        let output = model.complete("prompt").unwrap();

        assert_eq!(output, "[]");
    }

    #[test]
    fn kills_command_after_timeout() {
        let timeout = Duration::from_millis(200);
        let model = CommandModel::new("sleep", &["10"], timeout);
        let start = Instant::now();

        let result = model.complete("prompt");

        assert_eq!(result, Err(ModelError::Timeout(timeout)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn timeout_covers_output_held_open_by_background_process() {
        let timeout = Duration::from_millis(500);
        let model = CommandModel::new("sh", &["-c", "sleep 5 & echo '[]'"], timeout);
        let start = Instant::now();

        let result = model.complete("prompt");

        assert_eq!(result, Err(ModelError::Timeout(timeout)));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn missing_command_fails_to_start() {
        let model = CommandModel::new("definitely-not-a-model-7f3a", &[], Duration::from_secs(1));

        let result = model.complete("prompt");

        assert!(matches!(result, Err(ModelError::Start { .. })));
    }

    #[test]
    fn ollama_runs_model_subcommand() {
        let model = CommandModel::ollama("ollama", "llama3.2:1b", Duration::from_secs(120));

        assert_eq!(
            model,
            CommandModel::new("ollama", &["run", "llama3.2:1b"], Duration::from_secs(120))
        );
    }
}
