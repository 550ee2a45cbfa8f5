use std::process::Command;

use tubelens_core::{SpeechEngine, SpeechError, Utterance};

/// Speaks through the platform's command-line synthesizer, one blocking
/// process per utterance.
pub struct CommandSpeechEngine {
    program: &'static str,
}

impl CommandSpeechEngine {
    pub fn detect() -> Result<Self, SpeechError> {
        let program = if cfg!(target_os = "macos") {
            "say"
        } else {
            "espeak"
        };

        let available = Command::new("which")
            .arg(program)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !available {
            return Err(SpeechError::NotAvailable(format!(
                "`{}` was not found on PATH",
                program
            )));
        }

        Ok(Self { program })
    }

    fn command_for(&self, utterance: &Utterance) -> Command {
        let mut cmd = Command::new(self.program);
        let factor = utterance.rate.factor();
        if self.program == "say" {
            cmd.arg("-r").arg(format!("{:.0}", 175.0 * factor));
        } else {
            cmd.arg("-s").arg(format!("{:.0}", 160.0 * factor));
        }
        cmd.arg(&utterance.text);
        cmd
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        let status = self.command_for(utterance).status()?;
        if !status.success() {
            return Err(SpeechError::Failed(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::NotAvailable(
            "pausing is not supported by command-line speech".to_string(),
        ))
    }

    fn resume(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::NotAvailable(
            "resuming is not supported by command-line speech".to_string(),
        ))
    }

    // Utterances play to completion inside `speak`, so nothing is ever queued.
    fn cancel(&mut self) -> Result<(), SpeechError> {
        Ok(())
    }
}
