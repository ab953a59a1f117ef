use std::io;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::session::{SessionHandle, SessionId};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// A single inbound line, stamped with its arrival time and the session that sent it.
///
/// Messages are immutable once read off the wire. What other clients see is
/// derived from the stored text with [`normalize`] and [`chat_line`].
#[derive(Debug, Clone)]
pub struct Message {
    received_at: DateTime<Utc>,
    sender: SessionHandle,
    text: String,
}

impl Message {
    pub fn new(sender: SessionHandle, text: impl Into<String>) -> Self {
        Self {
            received_at: Utc::now(),
            sender,
            text: text.into(),
        }
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn sender(&self) -> &SessionHandle {
        &self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Text as other members see it: the leading command token is dropped and
/// anything from the first `[` onwards is cut.
pub fn normalize(text: &str) -> &str {
    let text = match text.find(' ') {
        Some(index) => &text[index..],
        None => text,
    };
    strip_bracket_suffix(text)
}

pub(crate) fn strip_bracket_suffix(text: &str) -> &str {
    let text = match text.find('[') {
        Some(index) => &text[..index],
        None => text,
    };
    text.trim()
}

/// Relayed chat line, `"<sender>: <text>\n"`.
pub fn chat_line(sender: SessionId, text: &str) -> String {
    format!("{sender}: {text}\n")
}

/// Reads one line, stripping the line terminator. `Ok(None)` means the peer hung up.
pub async fn read_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let bytes = reader.read_line(&mut line).await?;
    if bytes == 0 {
        return Ok(None);
    }

    let trimmed = line.trim_end_matches(LINE_ENDINGS);
    Ok(Some(trimmed.to_string()))
}

/// Writes `line` exactly as given and flushes. Callers own the terminator.
pub async fn write_line<W>(writer: &mut W, line: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
