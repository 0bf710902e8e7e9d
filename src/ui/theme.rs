use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Conversation
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub bot_prefix_style: Style,
    pub bot_text_style: Style,
    pub system_text_style: Style,
    pub intent_badge_style: Style,
    pub keyword_badge_style: Style,
    pub error_style: Style,

    // Chrome
    pub title_style: Style,
    pub panel_border_style: Style,
    pub loading_indicator_style: Style,
    pub intent_name_style: Style,
    pub input_border_style: Style,
    pub input_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            bot_prefix_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            bot_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default().fg(Color::DarkGray),
            intent_badge_style: Style::default().fg(Color::LightBlue),
            keyword_badge_style: Style::default().fg(Color::LightGreen),
            error_style: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),

            title_style: Style::default().fg(Color::Gray),
            panel_border_style: Style::default().fg(Color::DarkGray),
            loading_indicator_style: Style::default().fg(Color::LightBlue),
            intent_name_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            input_border_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
