use hangman_types::ChatEntry;

/// History reads are capped at the most recent entries.
pub const HISTORY_LIMIT: usize = 100;

/// Append-only per-game message list. Cleared only when a rematch starts
/// a fresh round.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, username: &str, message: &str) -> ChatEntry {
        let entry = ChatEntry {
            username: username.to_string(),
            message: message.to_string(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        };
        self.messages.push(entry.clone());
        entry
    }

    /// Most recent messages, oldest first.
    pub fn history(&self) -> &[ChatEntry] {
        let skip = self.messages.len().saturating_sub(HISTORY_LIMIT);
        &self.messages[skip..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order() {
        let mut chat = ChatLog::new();
        chat.add("alice", "hi");
        chat.add("bob", "hello");

        let history = chat.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].username, "alice");
        assert_eq!(history[1].message, "hello");
    }

    #[test]
    fn history_is_capped_to_most_recent() {
        let mut chat = ChatLog::new();
        for i in 0..(HISTORY_LIMIT + 5) {
            chat.add("alice", &format!("msg{}", i));
        }

        let history = chat.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].message, "msg5");
        assert_eq!(chat.len(), HISTORY_LIMIT + 5);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut chat = ChatLog::new();
        chat.add("alice", "hi");
        chat.clear();
        assert!(chat.is_empty());
    }
}
