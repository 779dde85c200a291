use std::io::Write;
use tracing::warn;

use crate::handler::ChatHandler;

/// Received messages, oldest first, with a scroll position that follows the
/// newest entry.
#[derive(Debug, Clone)]
pub struct MessageList {
    entries: Vec<String>,
    viewport: usize,
    scroll_top: usize,
}

impl MessageList {
    /// `viewport` is the number of entries visible at once.
    pub fn new(viewport: usize) -> Self {
        Self {
            entries: Vec::new(),
            viewport: viewport.max(1),
            scroll_top: 0,
        }
    }

    /// Append `text` verbatim and scroll to it.
    pub fn push(&mut self, text: &str) {
        self.entries.push(text.to_string());
        self.scroll_to_bottom();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.entries.len().saturating_sub(self.viewport);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn visible(&self) -> &[String] {
        let end = (self.scroll_top + self.viewport).min(self.entries.len());
        &self.entries[self.scroll_top..end]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Make server text safe to print on a terminal. Line breaks fold into
/// spaces and other control characters are shown escaped, so a message
/// cannot move the cursor, recolor output or fake extra lines.
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push(ch),
            '\n' | '\r' => out.push(' '),
            c if c.is_control() => out.extend(c.escape_default()),
            c => out.push(c),
        }
    }
    out
}

/// Terminal rendering of a chat connection: every inbound message is kept
/// in a [`MessageList`] and printed as one line.
pub struct ChatView<W: Write> {
    list: MessageList,
    out: W,
}

impl<W: Write> ChatView<W> {
    pub fn new(out: W, viewport: usize) -> Self {
        Self {
            list: MessageList::new(viewport),
            out,
        }
    }

    pub fn messages(&self) -> &MessageList {
        &self.list
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChatHandler for ChatView<W> {
    fn on_message(&mut self, text: &str) {
        self.list.push(text);
        let line = sanitize_for_terminal(text);
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to render chat message");
        }
    }
}
