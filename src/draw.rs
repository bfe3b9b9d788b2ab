use crate::components::colors::Rgb;
use crate::components::scene::Scene;
use crate::components::status::StatusLight;
use crate::state::app_settings::MatrixSettings;
use crate::ui::layout::LayoutAreas;
use std::io::{self, Stdout};
use tui::backend::CrosstermBackend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

/// The surface screens are shown on.
pub trait MatrixDisplay {
    fn show(&mut self, scene: &Scene, status: StatusLight) -> io::Result<()>;

    /// Draw the last scene again, e.g. after a resize.
    fn redraw(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn toggle_logs(&mut self) {}
}

/// Terminal stand-in for the LED panel, with an optional log pane beside it.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    matrix: MatrixSettings,
    show_logs: bool,
    last: Option<(Scene, StatusLight)>,
}

impl TerminalDisplay {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>, matrix: MatrixSettings) -> Self {
        Self { terminal, matrix, show_logs: false, last: None }
    }
}

impl MatrixDisplay for TerminalDisplay {
    fn show(&mut self, scene: &Scene, status: StatusLight) -> io::Result<()> {
        let matrix = &self.matrix;
        let show_logs = self.show_logs;
        self.terminal.draw(|f| {
            let layout = LayoutAreas::new(f.area(), matrix, show_logs);
            draw_panel(f, layout.panel, scene, status, matrix.brightness);
            if let Some(area) = layout.logs {
                draw_logs(f, area);
            }
        })?;
        self.last = Some((scene.clone(), status));
        Ok(())
    }

    fn redraw(&mut self) -> io::Result<()> {
        match self.last.clone() {
            Some((scene, status)) => self.show(&scene, status),
            None => Ok(()),
        }
    }

    fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn color(rgb: Rgb, brightness: f32) -> Color {
    let Rgb(r, g, b) = rgb.scaled(brightness);
    Color::Rgb(r, g, b)
}

pub fn scene_lines(scene: &Scene, brightness: f32) -> Vec<Line<'static>> {
    scene
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|label| Span::styled(label.text.clone(), Style::default().fg(color(label.color, brightness))))
                .collect::<Vec<_>>()
                .into()
        })
        .collect()
}

fn draw_panel(f: &mut Frame, area: Rect, scene: &Scene, status: StatusLight, brightness: f32) {
    let status_title = Line::from(vec![
        Span::styled("●", Style::default().fg(color(status.color(), 1.0))),
        Span::raw(format!(" {} ", status.label())),
    ])
    .alignment(Alignment::Right);

    let block = default_border(Color::DarkGray)
        .title(format!(" {} ", scene.title))
        .title(status_title);

    let panel = Paragraph::new(scene_lines(scene, brightness))
        .block(block)
        .style(Style::default().bg(Color::Black));
    f.render_widget(panel, area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Green))
        .style_debug(Style::default().fg(Color::Gray))
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::scene::Label;

    #[test]
    fn labels_become_coloured_spans() {
        let scene = Scene::new("NYM @ ATL")
            .row(vec![Label::new("ATL ", Rgb(200, 100, 0)), Label::white("5")])
            .line(Label::white("Final"));

        let lines = scene_lines(&scene, 0.5);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[0].content, "ATL ");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(100, 50, 0)));
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Rgb(128, 128, 128)));
    }
}
