//! Incremental printing of the controller's transcript.

use chat_widget::{Message, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Seen {
    role: Role,
    content: String,
    created_at: String,
}

impl From<&Message> for Seen {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            created_at: message.created_at.clone(),
        }
    }
}

/// Remembers what was printed so only changes are written out.
///
/// Placeholders are never printed; the settled reply shows up once it lands.
#[derive(Debug, Default)]
pub struct TranscriptView {
    seen: Vec<Seen>,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, messages: &[Message]) -> Vec<String> {
        let current: Vec<Seen> = messages
            .iter()
            .filter(|message| !message.is_loading)
            .map(Seen::from)
            .collect();

        let lines = if current.starts_with(&self.seen) {
            render(&current[self.seen.len()..])
        } else if current.ends_with(&self.seen) {
            let older = &current[..current.len() - self.seen.len()];
            let mut lines = vec![format!("-- {} older message(s) --", older.len())];
            lines.extend(render(older));
            lines
        } else {
            let mut lines = vec!["-- new conversation --".to_string()];
            lines.extend(render(&current));
            lines
        };

        self.seen = current;
        lines
    }
}

fn render(entries: &[Seen]) -> Vec<String> {
    entries.iter().map(render_line).collect()
}

fn render_line(entry: &Seen) -> String {
    let speaker = match entry.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("{speaker}> {}", entry.content)
}
