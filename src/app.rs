use ratatui::layout::Rect;
use tokio::task::{JoinError, JoinHandle};
use unicode_width::UnicodeWidthChar;

use crate::config::Config;
use crate::enhancer::Enhancer;
use crate::error::EnhancementError;

/// What the output panel shows. Derived from session state only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputView<'a> {
    Busy,
    Error(&'a str),
    Placeholder,
    Result(&'a str),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub api_key_missing: bool,

    // Session state
    pub input: String,
    pub input_cursor: usize, // char index into input
    pub result_text: String,
    pub is_busy: bool,
    pub error_text: Option<String>,
    pub enhance_task: Option<JoinHandle<Result<String, EnhancementError>>>,

    // Output panel (updated during render)
    pub output_scroll: u16,
    pub output_height: u16,
    pub output_width: u16,
    pub output_lines: u16, // wrapped rows of the result at output_width
    pub output_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    enhancer: Enhancer,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl App {
    pub fn new(config: &Config, enhancer: Enhancer) -> Self {
        Self {
            should_quit: false,
            api_key_missing: !config.has_api_key(),
            input: String::new(),
            input_cursor: 0,
            result_text: String::new(),
            is_busy: false,
            error_text: None,
            enhance_task: None,
            output_scroll: 0,
            output_height: 0,
            output_width: 0,
            output_lines: 0,
            output_area: None,
            animation_frame: 0,
            enhancer,
        }
    }

    pub fn model(&self) -> &str {
        self.enhancer.model()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_busy && !self.input.trim().is_empty()
    }

    /// Starts an enhancement of the trimmed input. Returns false (and changes nothing)
    /// when the input is blank or a request is already in flight.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            tracing::debug!(busy = self.is_busy, "submit ignored");
            return false;
        }

        let raw = self.input.trim().to_string();

        self.is_busy = true;
        self.error_text = None;
        self.result_text.clear();
        self.output_scroll = 0;
        self.output_lines = 0;

        tracing::info!(chars = raw.chars().count(), model = self.model(), "enhancing prompt");

        let enhancer = self.enhancer.clone();
        self.enhance_task = Some(tokio::spawn(async move { enhancer.enhance(&raw).await }));
        true
    }

    /// Applies the in-flight result if the task has completed. Called on every tick.
    pub async fn poll_enhancement(&mut self) {
        let finished = self
            .enhance_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if finished {
            self.await_enhancement().await;
        }
    }

    /// Waits for the in-flight task, if any, and applies its result.
    pub async fn await_enhancement(&mut self) {
        if let Some(task) = self.enhance_task.take() {
            let outcome = task.await;
            self.settle(outcome);
        }
    }

    fn settle(&mut self, outcome: Result<Result<String, EnhancementError>, JoinError>) {
        // Cleared on every path, including a panicked task
        self.is_busy = false;

        match outcome {
            Ok(Ok(text)) => {
                tracing::info!(chars = text.chars().count(), "prompt enhanced");
                self.error_text = None;
                self.result_text = text;
            }
            Ok(Err(err)) => {
                self.result_text.clear();
                self.error_text = Some(err.to_string());
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "enhancement task aborted");
                self.result_text.clear();
                self.error_text = Some(EnhancementError::Service.to_string());
            }
        }
    }

    pub fn output_view(&self) -> OutputView<'_> {
        if self.is_busy {
            OutputView::Busy
        } else if let Some(err) = &self.error_text {
            OutputView::Error(err)
        } else if self.result_text.is_empty() {
            OutputView::Placeholder
        } else {
            OutputView::Result(&self.result_text)
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing. The input is locked while a request is in flight.

    pub fn insert_char(&mut self, c: char) {
        if self.is_busy {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        if self.is_busy {
            return;
        }
        // Terminals deliver pasted line breaks as \r or \r\n
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert_str(byte_pos, &text);
        self.input_cursor += text.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.is_busy || self.input_cursor == 0 {
            return;
        }
        self.input_cursor -= 1;
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if self.is_busy || self.input_cursor >= self.input.chars().count() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.remove(byte_pos);
    }

    pub fn clear_input(&mut self) {
        if self.is_busy {
            return;
        }
        self.input.clear();
        self.input_cursor = 0;
    }

    pub fn cursor_left(&mut self) {
        if !self.is_busy {
            self.input_cursor = self.input_cursor.saturating_sub(1);
        }
    }

    pub fn cursor_right(&mut self) {
        if !self.is_busy {
            self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
        }
    }

    /// Moves to the start of the current line.
    pub fn cursor_home(&mut self) {
        if !self.is_busy {
            let (_, col) = self.cursor_line_col();
            self.input_cursor -= col;
        }
    }

    /// Moves to the end of the current line.
    pub fn cursor_end(&mut self) {
        if !self.is_busy {
            let (line, _) = self.cursor_line_col();
            let line_len = self.input.split('\n').nth(line).map_or(0, |l| l.chars().count());
            self.set_cursor_line_col(line, line_len);
        }
    }

    pub fn cursor_up(&mut self) {
        if self.is_busy {
            return;
        }
        let (line, col) = self.cursor_line_col();
        if line > 0 {
            self.set_cursor_line_col(line - 1, col);
        }
    }

    pub fn cursor_down(&mut self) {
        if self.is_busy {
            return;
        }
        let (line, col) = self.cursor_line_col();
        if line + 1 < self.input.split('\n').count() {
            self.set_cursor_line_col(line + 1, col);
        }
    }

    /// Zero-based (line, column) of the cursor, in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.input.chars().take(self.input_cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Terminal columns between the start of the cursor's line and the cursor.
    pub fn cursor_display_col(&self) -> usize {
        let (_, col) = self.cursor_line_col();
        self.input
            .chars()
            .skip(self.input_cursor - col)
            .take(col)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn set_cursor_line_col(&mut self, line: usize, col: usize) {
        let mut idx = 0;
        for (i, text) in self.input.split('\n').enumerate() {
            let len = text.chars().count();
            if i == line {
                self.input_cursor = idx + col.min(len);
                return;
            }
            idx += len + 1; // newline
        }
    }

    // Output scrolling

    fn max_output_scroll(&self) -> u16 {
        self.output_lines.saturating_sub(self.output_height)
    }

    pub fn scroll_output_down(&mut self, lines: u16) {
        self.output_scroll = self.output_scroll.saturating_add(lines).min(self.max_output_scroll());
    }

    pub fn scroll_output_up(&mut self, lines: u16) {
        self.output_scroll = self.output_scroll.saturating_sub(lines);
    }

    pub fn scroll_output_page_down(&mut self) {
        self.scroll_output_down(self.output_height.max(1));
    }

    pub fn scroll_output_page_up(&mut self) {
        self.scroll_output_up(self.output_height.max(1));
    }
}
