use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Word wrapping and scroll math for the transcript pane.
///
/// The transcript is wrapped here and rendered without ratatui's own wrap, so
/// the row count used for scrolling is exactly the number of rows drawn.
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Wrap `lines` to `width` columns at spaces. Words wider than a row are
    /// split across rows. Styles are kept per character.
    pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
        let width = width as usize;
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            if width == 0 {
                out.push(Line::from(
                    line.spans
                        .iter()
                        .map(|s| Span::styled(s.content.to_string(), s.style))
                        .collect::<Vec<_>>(),
                ));
                continue;
            }

            let mut wrapper = RowWrapper::new(width);
            for span in &line.spans {
                for ch in span.content.chars() {
                    wrapper.push(ch, span.style);
                }
            }
            out.extend(wrapper.finish());
        }
        out
    }

    pub fn calculate_max_scroll_offset(total_rows: usize, available_height: u16) -> u16 {
        total_rows
            .saturating_sub(available_height as usize)
            .min(u16::MAX as usize) as u16
    }

    /// Top offset that pins the newest row to the bottom, moved up by
    /// `scroll_back` rows and clamped to the content.
    pub fn scroll_offset_from_bottom(
        total_rows: usize,
        available_height: u16,
        scroll_back: u16,
    ) -> u16 {
        Self::calculate_max_scroll_offset(total_rows, available_height).saturating_sub(scroll_back)
    }
}

struct RowWrapper {
    width: usize,
    rows: Vec<Vec<(char, Style)>>,
    row: Vec<(char, Style)>,
    row_width: usize,
    word: Vec<(char, Style)>,
    word_width: usize,
}

impl RowWrapper {
    fn new(width: usize) -> Self {
        Self {
            width,
            rows: Vec::new(),
            row: Vec::new(),
            row_width: 0,
            word: Vec::new(),
            word_width: 0,
        }
    }

    fn push(&mut self, ch: char, style: Style) {
        if ch == ' ' {
            self.flush_word();
            if self.row_width < self.width {
                self.row.push((ch, style));
                self.row_width += 1;
            } else {
                // a space at the wrap point is dropped
                self.break_row();
            }
        } else {
            self.word.push((ch, style));
            self.word_width += ch.width().unwrap_or(0);
        }
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        if self.row_width > 0 && self.row_width + self.word_width > self.width {
            self.break_row();
        }
        for (ch, style) in std::mem::take(&mut self.word) {
            let ch_width = ch.width().unwrap_or(0);
            if self.row_width > 0 && self.row_width + ch_width > self.width {
                self.break_row();
            }
            self.row.push((ch, style));
            self.row_width += ch_width;
        }
        self.word_width = 0;
    }

    fn break_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.row));
        self.row_width = 0;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_word();
        self.rows.push(std::mem::take(&mut self.row));
        self.rows.into_iter().map(row_to_line).collect()
    }
}

fn row_to_line(row: Vec<(char, Style)>) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;
    for (ch, style) in row {
        if current.is_some_and(|s| s != style) {
            if let Some(s) = current {
                spans.push(Span::styled(std::mem::take(&mut text), s));
            }
        }
        current = Some(style);
        text.push(ch);
    }
    if let Some(style) = current {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}
