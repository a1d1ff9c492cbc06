//! Style tokens
//!
//! Rendering code only ever names a token; the mapping to terminal colors
//! lives here and nowhere else.

use crossterm::style::{Attribute, Color, ContentStyle};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Style {
    #[default]
    Normal,
    Border,
    Title,
    /// Live status token in the title (version)
    Badge,
    /// Unsaved-changes indicator
    Unsaved,
    TabActive,
    TabInactive,
    Selected,
    Emphasis,
    Muted,
    Warning,
    Yes,
    No,
    Marker,
    Error,
}

pub fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();

    match style {
        Style::Normal => {}
        Style::Border => content.foreground_color = Some(Color::DarkGrey),
        Style::Title => {
            content.foreground_color = Some(Color::Cyan);
            content.attributes.set(Attribute::Bold);
        }
        Style::Badge => content.foreground_color = Some(Color::DarkCyan),
        Style::Unsaved => {
            content.foreground_color = Some(Color::Yellow);
            content.attributes.set(Attribute::Bold);
        }
        Style::TabActive => {
            content.foreground_color = Some(Color::Black);
            content.background_color = Some(Color::Cyan);
        }
        Style::TabInactive => content.foreground_color = Some(Color::Grey),
        Style::Selected => content.attributes.set(Attribute::Reverse),
        Style::Emphasis => content.attributes.set(Attribute::Bold),
        Style::Muted => content.foreground_color = Some(Color::DarkGrey),
        Style::Warning => {
            content.foreground_color = Some(Color::Red);
            content.attributes.set(Attribute::Bold);
        }
        Style::Yes => content.foreground_color = Some(Color::Green),
        Style::No => content.foreground_color = Some(Color::Red),
        Style::Marker => content.foreground_color = Some(Color::Magenta),
        Style::Error => content.foreground_color = Some(Color::Red),
    }

    content
}
