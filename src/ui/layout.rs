use crate::state::app_settings::MatrixSettings;
use tui::layout::{Constraint, Flex, Layout, Rect};

pub const BORDER: u16 = 2;

/// Where the matrix panel and the optional log pane go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAreas {
    pub panel: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    /// One terminal cell per LED column and per two LED rows, plus a border.
    pub fn new(area: Rect, matrix: &MatrixSettings, show_logs: bool) -> Self {
        let width = matrix.width.saturating_add(BORDER).min(area.width);
        let height = (matrix.height / 2).saturating_add(BORDER).min(area.height);

        if show_logs {
            let [left, logs] =
                Layout::horizontal([Constraint::Length(width), Constraint::Fill(1)]).areas(area);
            let [panel] = Layout::vertical([Constraint::Length(height)])
                .flex(Flex::Start)
                .areas(left);
            return LayoutAreas { panel, logs: Some(logs) };
        }

        let [column] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);
        let [panel] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(column);
        LayoutAreas { panel, logs: None }
    }
}
