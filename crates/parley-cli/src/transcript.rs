use anyhow::{anyhow, Result};
use parley::models::role::Role;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// One line of a conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
    /// Conversation title, carried by the first entry of a transcript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TranscriptEntry {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            user_id: None,
            agent_id: None,
            title: None,
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            user_id: None,
            agent_id: None,
            title: None,
        }
    }

    pub fn with_participants(mut self, user_id: Option<i64>, agent_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self.agent_id = agent_id;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// True when nothing has been written to the transcript yet
pub fn is_new_transcript(transcript: &Path) -> Result<bool> {
    match fs::metadata(transcript) {
        Ok(metadata) => Ok(metadata.len() == 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(anyhow!("Failed to inspect transcript file: {}", e)),
    }
}

/// Append a completed turn, one JSON object per line
pub fn append_turn(transcript: &Path, entries: &[TranscriptEntry]) -> Result<()> {
    if let Some(parent) = transcript.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(transcript)
        .map_err(|e| anyhow!("Failed to open transcript file: {}", e))?;
    write_entries(file, entries)
}

fn write_entries(file: File, entries: &[TranscriptEntry]) -> Result<()> {
    let mut writer = std::io::BufWriter::new(file);

    for entry in entries {
        serde_json::to_writer(&mut writer, entry)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read every entry back; a missing file is an empty transcript
pub fn read_transcript(transcript: &Path) -> Result<Vec<TranscriptEntry>> {
    if !transcript.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(transcript)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_read() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("transcript.jsonl");

        append_turn(
            &path,
            &[
                TranscriptEntry::user("Halo!").with_participants(Some(7), None),
                TranscriptEntry::assistant("Halo, Rina!").with_participants(Some(7), None),
            ],
        )?;
        append_turn(
            &path,
            &[
                TranscriptEntry::user("Why do we dream?"),
                TranscriptEntry::assistant("Nobody knows for sure.\nBut there are theories."),
            ],
        )?;

        let entries = read_transcript(&path)?;
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].user_id, Some(7));
        assert_eq!(entries[1].content, "Halo, Rina!");
        assert_eq!(entries[3].content, "Nobody knows for sure.\nBut there are theories.");

        let raw = fs::read_to_string(&path)?;
        assert_eq!(raw.lines().count(), 4);
        assert!(raw.lines().next().unwrap().starts_with(r#"{"role":"user""#));
        assert!(!raw.contains("agent_id"));
        Ok(())
    }

    #[test]
    fn test_missing_transcript_is_empty() -> Result<()> {
        let dir = tempdir()?;
        assert!(read_transcript(&dir.path().join("none.jsonl"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_new_transcript() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("chat.jsonl");
        assert!(is_new_transcript(&path)?);

        File::create(&path)?;
        assert!(is_new_transcript(&path)?);

        append_turn(&path, &[TranscriptEntry::user("Halo!")])?;
        assert!(!is_new_transcript(&path)?);
        Ok(())
    }

    #[test]
    fn test_title_is_written_on_the_entry() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("chat.jsonl");

        append_turn(
            &path,
            &[
                TranscriptEntry::user("Any trail near Bandung?")
                    .with_title(Some("Weekend Hike".to_string())),
                TranscriptEntry::assistant("Try Tangkuban Perahu."),
            ],
        )?;

        let raw = fs::read_to_string(&path)?;
        let mut lines = raw.lines();
        assert!(lines.next().unwrap().contains(r#""title":"Weekend Hike""#));
        assert!(!lines.next().unwrap().contains("title"));

        let entries = read_transcript(&path)?;
        assert_eq!(entries[0].title.as_deref(), Some("Weekend Hike"));
        assert_eq!(entries[1].title, None);
        Ok(())
    }
}
