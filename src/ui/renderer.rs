use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::core::app::App;
use crate::core::catalog::{CatalogSource, IntentDescriptor};
use crate::core::message::Message;
use crate::core::trace::{ReasoningTrace, TraceView};
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollCalculator;

const EMPTY_CONVERSATION_HINT: &str = "Start the conversation: try typing \"hello\" or \"help\".";
const EMPTY_TRACE_HINT: &str = "Send a message to see the thinking trace.";

pub fn ui(f: &mut Frame, app: &App, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(f.area());

    let title = format!(
        "rulechat v{} • backend: {} • transcript: {}",
        env!("CARGO_PKG_VERSION"),
        app.session.base_url,
        app.session.transcript.status_string()
    );
    f.render_widget(Paragraph::new(title).style(theme.title_style), rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(rows[1]);

    render_chat_column(f, app, theme, columns[0]);
    render_side_column(f, app, theme, columns[1]);
}

fn render_chat_column(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let error_height = if app.turn().error().is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(error_height),
            Constraint::Length(3),
        ])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border_style)
        .title("Chat");
    let inner = block.inner(chunks[0]);
    let lines = ScrollCalculator::prewrap_lines(&build_transcript_lines(app, theme), inner.width);
    let scroll = ScrollCalculator::scroll_offset_from_bottom(
        lines.len(),
        inner.height,
        app.ui.scroll_back,
    );
    let transcript = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(transcript, chunks[0]);

    if let Some(error) = app.turn().error() {
        f.render_widget(
            Paragraph::new(format!(" ✗ {error}")).style(theme.error_style),
            chunks[1],
        );
    }

    let input_title = if app.is_loading() {
        "Waiting for reply... (Ctrl+C to quit)"
    } else if app.turn().error().is_some() {
        "Message (Enter to send, Esc to dismiss error, Ctrl+C to quit)"
    } else {
        "Message (Enter to send, Ctrl+C to quit)"
    };
    let input_area = chunks[2];
    let max_width = input_area.width.saturating_sub(2) as usize;
    let (visible, cursor_offset) = visible_input_tail(&app.ui.input, max_width.saturating_sub(1));
    let input = Paragraph::new(visible.to_string())
        .style(theme.input_text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.input_border_style)
                .title(input_title),
        );
    f.render_widget(input, input_area);
    f.set_cursor_position((input_area.x + 1 + cursor_offset as u16, input_area.y + 1));
}

fn render_side_column(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(0)])
        .split(area);

    let reasoning = Paragraph::new(build_reasoning_lines(app.trace().view(), theme))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border_style)
                .title("Bot reasoning"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(reasoning, chunks[0]);

    let catalog_title = match app.catalog().source() {
        CatalogSource::Remote => "Intent map",
        CatalogSource::Builtin => "Intent map (built-in)",
    };
    let intents = Paragraph::new(build_intent_lines(app, theme))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border_style)
                .title(catalog_title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(intents, chunks[1]);
}

pub fn build_transcript_lines(app: &App, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let conversation = app.conversation();

    if !conversation.history_loaded() {
        lines.push(Line::from(Span::styled(
            "Loading history...",
            theme.loading_indicator_style,
        )));
        lines.push(Line::from(""));
    } else if conversation.is_empty() && !app.is_loading() {
        lines.push(Line::from(Span::styled(
            EMPTY_CONVERSATION_HINT,
            theme.system_text_style,
        )));
    }

    for message in conversation.messages() {
        push_message_lines(&mut lines, message, theme);
    }

    if app.is_loading() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", pulse_symbol(app)),
                theme.loading_indicator_style,
            ),
            Span::styled("Thinking...", theme.system_text_style),
        ]));
    }

    lines
}

fn push_message_lines(lines: &mut Vec<Line<'static>>, message: &Message, theme: &Theme) {
    if message.is_user() {
        let mut text_lines = message.text.lines();
        lines.push(Line::from(vec![
            Span::styled("You: ", theme.user_prefix_style),
            Span::styled(
                text_lines.next().unwrap_or_default().to_string(),
                theme.user_text_style,
            ),
        ]));
        for line in text_lines {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                theme.user_text_style,
            )));
        }
    } else {
        let mut header = vec![Span::styled("Bot", theme.bot_prefix_style)];
        if let Some(intent) = &message.intent {
            header.push(Span::styled(
                format!("  [intent: {intent}]"),
                theme.intent_badge_style,
            ));
        }
        if let Some(keyword) = &message.matched_keyword {
            header.push(Span::styled(
                format!("  [matched: {keyword}]"),
                theme.keyword_badge_style,
            ));
        }
        lines.push(Line::from(header));
        for line in message.text.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                theme.bot_text_style,
            )));
        }
    }
    lines.push(Line::from(""));
}

pub fn build_reasoning_lines(view: TraceView<'_>, theme: &Theme) -> Vec<Line<'static>> {
    match view {
        TraceView::Unset => vec![Line::from(Span::styled(
            EMPTY_TRACE_HINT,
            theme.system_text_style,
        ))],
        TraceView::Empty(trace) => {
            let mut lines = trace_badges(trace, theme);
            lines.push(Line::from(Span::styled(
                "The backend reported no reasoning steps for this reply.",
                theme.system_text_style,
            )));
            lines
        }
        TraceView::Populated(trace) => {
            let mut lines = trace_badges(trace, theme);
            for (index, step) in trace.steps.iter().enumerate() {
                lines.push(Line::from(Span::styled(
                    format!("{}. {step}", index + 1),
                    theme.bot_text_style,
                )));
            }
            lines
        }
    }
}

fn trace_badges(trace: &ReasoningTrace, theme: &Theme) -> Vec<Line<'static>> {
    let mut badges = vec![Span::styled(
        format!("intent: {}", trace.intent),
        theme.intent_badge_style,
    )];
    if !trace.matched_keyword.is_empty() {
        badges.push(Span::styled(
            format!("  keyword: {}", trace.matched_keyword),
            theme.keyword_badge_style,
        ));
    }
    vec![Line::from(badges), Line::from("")]
}

pub fn build_intent_lines(app: &App, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (name, descriptor) in app.catalog().iter() {
        let mut header = vec![Span::styled(name.to_uppercase(), theme.intent_name_style)];
        if let IntentDescriptor::WithKeywords { keywords, .. } = descriptor {
            header.push(Span::styled(
                format!("  {} keywords", keywords.len()),
                theme.system_text_style,
            ));
        }
        lines.push(Line::from(header));

        if let Some(keywords) = descriptor.keywords() {
            if !keywords.is_empty() {
                lines.push(Line::from(Span::styled(
                    keywords.join(", "),
                    theme.keyword_badge_style,
                )));
            }
        }
        lines.push(Line::from(Span::styled(
            descriptor.response().to_string(),
            theme.bot_text_style,
        )));
        lines.push(Line::from(""));
    }
    lines
}

fn pulse_symbol(app: &App) -> &'static str {
    const FRAMES: [&str; 4] = ["○", "◔", "◑", "◕"];
    let elapsed = app.ui.pulse_start.elapsed().as_millis() / 150;
    FRAMES[(elapsed % FRAMES.len() as u128) as usize]
}

/// The longest suffix of `input` that fits in `max_width` columns, plus the
/// cursor column at its end.
pub fn visible_input_tail(input: &str, max_width: usize) -> (&str, usize) {
    let mut width = 0;
    let mut start = input.len();
    for (index, ch) in input.char_indices().rev() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        start = index;
    }
    (&input[start..], width)
}
