use crate::app::{App, Focus};
use crate::color::Rgba;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 22;
const STATUS_HEIGHT: u16 = 7;
const PARAMS_HEIGHT: u16 = 11;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 12;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

fn terminal_color(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Canvas rectangle inside its border, in terminal cells
pub fn canvas_inner(frame_area: Rect, fullscreen: bool) -> Rect {
    let outer = if fullscreen {
        frame_area
    } else {
        let offset = SIDEBAR_WIDTH.min(frame_area.width);
        Rect {
            x: frame_area.x + offset,
            y: frame_area.y,
            width: frame_area.width - offset,
            height: frame_area.height,
        }
    };
    Rect {
        x: outer.x + 1.min(outer.width),
        y: outer.y + 1.min(outer.height),
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Rows of the controls box left for content at a given terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT + 2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(6),
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Network Field ");

    let (status_text, status_color) = if app.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if app.animator.motion_suppressed() {
        ("STILL", Color::Magenta)
    } else {
        (app.animator.state().name(), Color::Green)
    };

    let stats = app.animator.last_stats();
    let mut content = vec![
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
        Line::from(Span::styled(
            format!("{} points", stats.particles),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("{} links", stats.connections),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("seed {}", app.seed),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];
    if let Some(status) = &app.status {
        content.push(Line::from(Span::styled(status.as_str(), Style::default().fg(DIM_TEXT_COLOR))));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.settings;
    let on_off = |b: bool| (if b { "on" } else { "off" }).to_string();

    let content = vec![
        make_line("Preset", app.preset_name().to_string(), app.focus == Focus::Preset),
        make_line("Points", format!("{}", settings.point_count), app.focus == Focus::Points),
        make_line(
            "Dist",
            format!("{:.0}", settings.connection_distance),
            app.focus == Focus::Distance,
        ),
        make_line("Speed", format!("{:.2}", settings.speed), app.focus == Focus::Speed),
        make_line("Radius", format!("{:.1}", settings.radius_base), app.focus == Focus::RadiusBase),
        make_line(
            "Vary",
            format!("{:.1}", settings.radius_variance),
            app.focus == Focus::RadiusVariance,
        ),
        make_line(
            "Alpha",
            format!("{:.2}", settings.connection_opacity_scale),
            app.focus == Focus::Opacity,
        ),
        make_line("Theme", app.theme.name().to_string(), app.focus == Focus::Theme),
        make_line("Still", on_off(app.reduced_motion), app.focus == Focus::Motion),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0
    } else if focus_line >= visible_height {
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "pause/resume"),
        make_control("H/?", "help"),
        make_control("Tab", "next param"),
        make_control("↑/↓", "adjust param"),
        make_control("1-7", "presets"),
        make_control("T", "theme"),
        make_control("M", "reduced motion"),
        make_control("R", "reseed"),
        make_control("V", "fullscreen"),
        make_control("P", "save PNG"),
        make_control("Mouse", "repel points"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let background = app.theme.palette().background;
    let bg = terminal_color(background);
    let block = styled_block("").style(Style::default().bg(bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(canvas) = app.animator.surface() else {
        return;
    };

    let buffer = frame.buffer_mut();
    for cell in canvas.cells(background) {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            if let Some(target) = buffer.cell_mut((x, y)) {
                target.set_char(cell.char).set_fg(cell.color).set_bg(bg);
            }
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(HIGHLIGHT_COLOR)));
    let content = vec![
        Line::from(""),
        Line::from(Span::styled("NETWORK FIELD", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Points drift and bounce off the edges. Any two closer than the connection distance are joined by a line that fades as they move apart."),
        Line::from(""),
        heading("POINTER:"),
        Line::from("Points within 100px of the mouse are pushed away and drawn half again as large."),
        Line::from(""),
        heading("PARAMETERS (Tab, then Up/Down):"),
        Line::from("Points, connection distance, speed, radius, radius variance, link opacity. Any change restarts the field."),
        Line::from(""),
        heading("PRESETS (1-7):"),
        Line::from("1=Hero, 2=About, 3=Skills, 4=Projects, 5=Experience, 6=Contact, 7=Footer"),
        Line::from(""),
        heading("REDUCED MOTION (M):"),
        Line::from("Freezes the points in place. Links and hover highlights keep drawing."),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Pause, R=Reseed, T=Theme, V=Fullscreen, P=PNG snapshot, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Theme;
    use crate::presets::PresetManager;
    use crate::settings::FieldSettings;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_canvas_inner_with_sidebar() {
        let inner = canvas_inner(Rect::new(0, 0, 80, 24), false);
        assert_eq!(inner, Rect::new(23, 1, 56, 22));
        let full = canvas_inner(Rect::new(0, 0, 80, 24), true);
        assert_eq!(full, Rect::new(1, 1, 78, 22));
        let tiny = canvas_inner(Rect::new(0, 0, 10, 1), false);
        assert_eq!((tiny.width, tiny.height), (0, 0));
    }

    #[test]
    fn test_controls_visible_lines() {
        assert_eq!(get_controls_visible_lines(30), 10);
        assert_eq!(get_controls_visible_lines(10), 0);
    }

    #[test]
    fn test_render_draws_field() {
        let area = Rect::new(0, 0, 80, 24);
        let mut app = App::new(
            canvas_inner(area, false),
            FieldSettings::default(),
            PresetManager::with_dir(None),
            11,
            Theme::Dark,
            false,
        );
        app.tick();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let inner = canvas_inner(area, false);
        let braille_cells = (inner.y..inner.y + inner.height)
            .flat_map(|y| (inner.x..inner.x + inner.width).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                buffer[(x, y)]
                    .symbol()
                    .chars()
                    .next()
                    .is_some_and(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
            })
            .count();
        assert!(braille_cells > 0);
    }
}
