use std::sync::Arc;
use anyhow::anyhow;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use emote_core::{send, ChatBackend, ChatReply, Conversation};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    // Chat state
    pub conversation: Conversation,
    pub send_task: Option<JoinHandle<anyhow::Result<ChatReply>>>,

    // Input state (multi-line, cursor is a char index)
    pub input: String,
    pub input_cursor: usize,

    // Chat scrolling; follow_tail keeps the newest message in view
    pub chat_scroll: u16,
    pub chat_max_scroll: u16,
    pub chat_height: u16,
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for typing dots

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_button_area: Option<Rect>,

    pub endpoint: String,
    backend: Arc<dyn ChatBackend>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, endpoint: &str) -> Self {
        Self {
            should_quit: false,

            conversation: Conversation::new(),
            send_task: None,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_max_scroll: 0,
            chat_height: 0,
            follow_tail: true,

            animation_frame: 0,

            chat_area: None,
            send_button_area: None,

            endpoint: endpoint.to_string(),
            backend,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.conversation.is_busy()
    }

    /// Whether the send control is enabled
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && !self.input.trim().is_empty()
    }

    /// Append the input optimistically and start the request in the background.
    /// Returns false (and changes nothing) when sending is disabled.
    pub fn submit(&mut self) -> bool {
        let Some(pending) = send::submit(&self.conversation, &self.input) else {
            return false;
        };

        let messages = pending.messages().to_vec();
        self.conversation = pending;
        self.input.clear();
        self.input_cursor = 0;
        self.follow_tail = true;

        tracing::debug!(messages = messages.len(), "sending conversation");
        let backend = Arc::clone(&self.backend);
        self.send_task = Some(tokio::spawn(async move { backend.send(&messages).await }));
        true
    }

    /// Settle the in-flight send if its task has completed.
    pub async fn poll_send_task(&mut self) {
        let finished = self
            .send_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if finished {
            self.finish_send().await;
        }
    }

    /// Wait for the in-flight send and apply its outcome. A task that
    /// panicked counts as a failed send so busy is always cleared.
    pub async fn finish_send(&mut self) {
        let Some(task) = self.send_task.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(anyhow!("send task did not complete: {}", e)),
        };
        self.conversation = send::settle(&self.conversation, outcome);
        self.follow_tail = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = self.chat_scroll >= self.chat_max_scroll;
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.chat_max_scroll);
        self.follow_tail = self.chat_scroll >= self.chat_max_scroll;
    }

    pub fn scroll_chat_page_up(&mut self) {
        self.scroll_chat_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_chat_page_down(&mut self) {
        self.scroll_chat_down((self.chat_height / 2).max(1));
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_before_cursor(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let char_count = self.input.chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    /// Move to the start of the current input line
    pub fn move_cursor_line_start(&mut self) {
        let (_, col) = self.cursor_line_col();
        self.input_cursor -= col;
    }

    /// Move to the end of the current input line
    pub fn move_cursor_line_end(&mut self) {
        let rest = self
            .input
            .chars()
            .skip(self.input_cursor)
            .take_while(|&c| c != '\n')
            .count();
        self.input_cursor += rest;
    }

    pub fn move_cursor_up(&mut self) {
        let (row, col) = self.cursor_line_col();
        if row > 0 {
            self.input_cursor = self.line_start(row - 1) + col.min(self.line_len(row - 1));
        }
    }

    pub fn move_cursor_down(&mut self) {
        let (row, col) = self.cursor_line_col();
        if row + 1 < self.input_line_count() {
            self.input_cursor = self.line_start(row + 1) + col.min(self.line_len(row + 1));
        }
    }

    /// (line, column) of the cursor, both counted in chars
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut row = 0;
        let mut col = 0;
        for c in self.input.chars().take(self.input_cursor) {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }

    pub fn input_line_count(&self) -> usize {
        self.input.split('\n').count()
    }

    fn line_start(&self, row: usize) -> usize {
        self.input
            .split('\n')
            .take(row)
            .map(|line| line.chars().count() + 1)
            .sum()
    }

    fn line_len(&self, row: usize) -> usize {
        self.input
            .split('\n')
            .nth(row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{app_with, Script};
    use emote_core::{ChatMessage, Emotion};

    #[tokio::test]
    async fn test_submit_is_optimistic() {
        let mut app = app_with(Script::Hang);
        app.input = "  hello  ".to_string();
        app.input_cursor = 9;

        assert!(app.submit());

        assert_eq!(app.conversation.messages(), &[ChatMessage::user("hello")]);
        assert!(app.is_busy());
        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
        assert!(app.send_task.is_some());
    }

    #[tokio::test]
    async fn test_submit_blank_changes_nothing() {
        let mut app = app_with(Script::Hang);
        app.input = " \n ".to_string();

        assert!(!app.can_submit());
        assert!(!app.submit());
        assert!(app.conversation.is_empty());
        assert_eq!(app.input, " \n ");
        assert!(app.send_task.is_none());
    }

    #[tokio::test]
    async fn test_submit_while_busy_changes_nothing() {
        let mut app = app_with(Script::Hang);
        app.input = "first".to_string();
        assert!(app.submit());

        app.input = "second".to_string();
        assert!(!app.can_submit());
        assert!(!app.submit());
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.input, "second");
    }

    #[tokio::test]
    async fn test_finish_send_appends_reply() {
        let mut app = app_with(Script::Reply("hi", Some(Emotion::Happy)));
        app.input = "hello".to_string();
        app.submit();
        app.finish_send().await;

        assert_eq!(app.conversation.last(), Some(&ChatMessage::assistant("hi", Emotion::Happy)));
        assert!(!app.is_busy());
        assert!(app.send_task.is_none());
    }

    #[tokio::test]
    async fn test_finish_send_failure_clears_busy() {
        let mut app = app_with(Script::Fail);
        app.input = "hello".to_string();
        app.submit();
        app.finish_send().await;

        assert_eq!(app.conversation.len(), 2);
        assert_eq!(app.conversation.last(), Some(&ChatMessage::send_failed()));
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_aborted_task_counts_as_failure() {
        let mut app = app_with(Script::Hang);
        app.input = "hello".to_string();
        app.submit();
        if let Some(task) = &app.send_task {
            task.abort();
        }
        app.finish_send().await;

        assert_eq!(app.conversation.last(), Some(&ChatMessage::send_failed()));
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_poll_leaves_unfinished_task() {
        let mut app = app_with(Script::Hang);
        app.input = "hello".to_string();
        app.submit();
        app.poll_send_task().await;

        assert!(app.is_busy());
        assert!(app.send_task.is_some());
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let mut app = app_with(Script::Hang);
        for c in "こんにちは".chars() {
            app.insert_char(c);
        }
        app.move_cursor_left();
        app.delete_before_cursor();
        assert_eq!(app.input, "こんには");
        app.delete_at_cursor();
        assert_eq!(app.input, "こんに");
        assert_eq!(app.input_cursor, 3);
    }

    #[test]
    fn test_cursor_moves_between_lines() {
        let mut app = app_with(Script::Hang);
        for c in "abcdef".chars() {
            app.insert_char(c);
        }
        app.insert_newline();
        app.insert_char('x');
        assert_eq!(app.cursor_line_col(), (1, 1));

        app.move_cursor_up();
        assert_eq!(app.cursor_line_col(), (0, 1));
        app.move_cursor_line_end();
        assert_eq!(app.cursor_line_col(), (0, 6));
        app.move_cursor_down();
        assert_eq!(app.cursor_line_col(), (1, 1));
        app.move_cursor_line_start();
        assert_eq!(app.cursor_line_col(), (1, 0));
        assert_eq!(app.input_line_count(), 2);
    }

    #[test]
    fn test_scrolling_tracks_tail() {
        let mut app = app_with(Script::Hang);
        app.chat_max_scroll = 10;
        app.chat_scroll = 10;
        app.chat_height = 8;

        app.scroll_chat_page_up();
        assert_eq!(app.chat_scroll, 6);
        assert!(!app.follow_tail);

        app.scroll_chat_down(100);
        assert_eq!(app.chat_scroll, 10);
        assert!(app.follow_tail);
    }
}
