use formats::Feature;
use htmlize::{escape_attribute, escape_text};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub html: String,
    pub min_width_px: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    /// Open article links in a new browser tab.
    pub open_in_new_tab: bool,
    pub min_width_px: u32,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            open_in_new_tab: false,
            min_width_px: 200,
        }
    }
}

/// Popup for a feature: a title link, plus the thumbnail when there is one.
/// Features lacking a title or source link get no popup.
pub fn resolve_popup(feature: &Feature, options: &PopupOptions) -> Option<Popup> {
    let title = feature.title()?;
    let url = feature.source_url()?;

    let target = if options.open_in_new_tab {
        " target=\"_blank\""
    } else {
        ""
    };
    let mut html = format!(
        "<a href=\"{}\"{target}>{}</a>",
        escape_attribute(url),
        escape_text(title)
    );
    if let Some(thumbnail) = feature.thumbnail_url() {
        match feature.thumbnail_width() {
            Some(width) => html.push_str(&format!(
                "<p><img src=\"{}\" width=\"{width}\"></p>",
                escape_attribute(thumbnail)
            )),
            None => html.push_str(&format!(
                "<p><img src=\"{}\"></p>",
                escape_attribute(thumbnail)
            )),
        }
    }

    Some(Popup {
        html,
        min_width_px: options.min_width_px,
    })
}

/// What the widget should do with a marker's popup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PopupAction {
    Open,
    Close,
    Keep,
}

/// Hover/click state of one marker's popup.
///
/// Hovering opens a popup that closes again when the pointer leaves; a click
/// pins it open until the next hover cycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub enum PopupState {
    #[default]
    Closed,
    AutoOpened,
    UserOpened,
}

impl PopupState {
    pub fn is_open(&self) -> bool {
        !matches!(self, PopupState::Closed)
    }

    pub fn pointer_enter(&mut self) -> PopupAction {
        *self = PopupState::AutoOpened;
        PopupAction::Open
    }

    pub fn pointer_leave(&mut self) -> PopupAction {
        match self {
            PopupState::AutoOpened => {
                *self = PopupState::Closed;
                PopupAction::Close
            }
            PopupState::Closed | PopupState::UserOpened => PopupAction::Keep,
        }
    }

    pub fn click(&mut self) -> PopupAction {
        *self = PopupState::UserOpened;
        PopupAction::Open
    }
}
