use crate::core::message::Message;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text transcript of the session, enabled with `--log <FILE>`.
/// History imported at startup is not written; only turns from this session.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            file_path: log_file,
        }
    }

    pub fn status_string(&self) -> String {
        match &self.file_path {
            None => "off".to_string(),
            Some(path) => Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
        }
    }

    pub fn log_message(&self, message: &Message) -> std::io::Result<()> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        let mut lines = message.text.lines();
        let first = lines.next().unwrap_or_default();
        writeln!(writer, "{}{first}", transcript_prefix(message))?;
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        writer.flush()
    }
}

/// Speaker label written before a message: `You: `, `Bot [intent]: ` and so on.
pub fn transcript_prefix(message: &Message) -> String {
    if message.is_user() {
        return "You: ".to_string();
    }
    match (&message.intent, &message.matched_keyword) {
        (Some(intent), Some(keyword)) => format!("Bot [{intent}, matched '{keyword}']: "),
        (Some(intent), None) => format!("Bot [{intent}]: "),
        _ => "Bot: ".to_string(),
    }
}
