//! Top-level UI layout: navigation bar, banner, active panel beside the
//! order sidebar, status bar.

pub mod account_panel;
pub mod chart_panel;
pub mod help_panel;
pub mod nav_bar;
pub mod news_panel;
pub mod overlays;
pub mod sidebar;
pub mod status_bar;
pub mod strategy_panel;
pub mod trades_panel;
pub mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

const SIDEBAR_WIDTH: u16 = 32;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let banner_height = u16::from(app.dashboard.error.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    nav_bar::render(f, chunks[0], app);
    if let Some(error) = &app.dashboard.error {
        overlays::render_banner(f, chunks[1], error);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
        .split(chunks[2]);

    draw_panel(f, body[0], app);
    sidebar::render(f, body[1], app);
    status_bar::render(f, chunks[3], app);

    match app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, chunks[2]),
        Overlay::ErrorHistory => overlays::render_error_history(f, chunks[2], app),
        Overlay::None => {}
    }
}

/// Draw the active panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Chart => chart_panel::render(f, inner, app),
        Panel::Trades => trades_panel::render(f, inner, app),
        Panel::Strategy => strategy_panel::render(f, inner, app),
        Panel::Account => account_panel::render(f, inner, app),
        Panel::News => news_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
