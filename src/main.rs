mod animation;
mod app;
mod braille;
mod color;
mod config;
mod error;
mod export;
mod presets;
mod raster;
mod settings;
mod simulation;
mod surface;
mod ui;

use app::{App, Focus, FrameClock};
use clap::Parser;
use color::Theme;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use error::FieldError;
use export::ExportOptions;
use presets::{Preset, PresetManager};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "network-field")]
#[command(about = "Drifting particle network with pointer repulsion, in the terminal")]
struct Args {
    // === Field Parameters ===
    /// Number of points (2-200)
    #[arg(short = 'p', long)]
    points: Option<usize>,

    /// Max distance in px for two points to be linked (20-400)
    #[arg(short = 'd', long)]
    distance: Option<f32>,

    /// Velocity scale in px per frame (0-3)
    #[arg(short = 's', long)]
    speed: Option<f32>,

    /// Minimum point radius in px (0.5-6)
    #[arg(long = "radius-base")]
    radius_base: Option<f32>,

    /// Random extra radius in px (0-6)
    #[arg(long = "radius-variance")]
    radius_variance: Option<f32>,

    /// Link opacity multiplier (0-1)
    #[arg(long)]
    opacity: Option<f32>,

    // === Appearance ===
    /// Color theme (dark, light)
    #[arg(long)]
    theme: Option<String>,

    /// Seed for point placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the reduced-motion preference on
    #[arg(long = "reduced-motion")]
    reduced_motion: bool,

    /// Keep animating even when reduced motion is requested
    #[arg(long = "ignore-reduced-motion")]
    ignore_reduced_motion: bool,

    // === Presets & Config ===
    /// Start from a named preset (hero, about, skills, projects, experience, contact, footer, or a saved one)
    #[arg(long)]
    preset: Option<String>,

    /// Load settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config to a JSON file
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Save the effective settings as a named user preset
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    /// Delete a saved user preset
    #[arg(long = "delete-preset")]
    delete_preset: Option<String>,

    /// List available presets and exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    // === Headless Export ===
    /// Render headless and save the last frame as a PNG
    #[arg(long = "export-png")]
    export_png: Option<PathBuf>,

    /// Render headless and save every frame into a looping GIF
    #[arg(long = "export-gif")]
    export_gif: Option<PathBuf>,

    /// Frames to simulate for exports
    #[arg(long, default_value = "120")]
    frames: usize,

    /// Export size in px, WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720")]
    size: String,

    /// Write log output to this file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn parse_theme(s: &str) -> Theme {
    match s.to_lowercase().as_str() {
        "light" | "day" => Theme::Light,
        _ => Theme::Dark,
    }
}

/// Log to a file when asked; otherwise stay quiet unless RUST_LOG says so,
/// since stderr shares the screen with the TUI
fn init_logging(log_file: Option<&Path>) -> Result<(), FieldError> {
    let default_level = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Defaults < preset < config file < individual flags
fn resolve_config(args: &Args, presets: &PresetManager) -> Result<AppConfig, FieldError> {
    let mut config = AppConfig::default();

    if let Some(name) = &args.preset {
        match presets.find(name) {
            Some(preset) => config.settings = preset.settings.clone(),
            None => log::warn!("unknown preset '{}', using defaults", name),
        }
    }

    if let Some(path) = &args.config {
        config = AppConfig::load_from_file(path)?;
        log::info!("loaded config from {}", path.display());
    }

    let settings = &mut config.settings;
    if let Some(points) = args.points {
        settings.point_count = points;
    }
    if let Some(distance) = args.distance {
        settings.connection_distance = distance;
    }
    if let Some(speed) = args.speed {
        settings.speed = speed;
    }
    if let Some(radius_base) = args.radius_base {
        settings.radius_base = radius_base;
    }
    if let Some(radius_variance) = args.radius_variance {
        settings.radius_variance = radius_variance;
    }
    if let Some(opacity) = args.opacity {
        settings.connection_opacity_scale = opacity;
    }
    if args.ignore_reduced_motion {
        settings.respect_reduced_motion = false;
    }
    config.settings = config.settings.clone().clamped();

    if let Some(theme) = &args.theme {
        config.theme = parse_theme(theme);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.reduced_motion {
        config.reduced_motion = true;
    }

    Ok(config)
}

fn run_export(args: &Args, config: &AppConfig, seed: u64) -> Result<(), FieldError> {
    let (width, height) = export::parse_size(&args.size)?;
    let options = ExportOptions {
        settings: config.settings.clone(),
        seed,
        width,
        height,
        frames: args.frames,
        theme: config.theme,
        reduced_motion: config.reduced_motion,
        pointer: None,
    };

    if let Some(path) = &args.export_png {
        export::snapshot_png(&options, path)?;
        println!("Saved {}", path.display());
    }
    if let Some(path) = &args.export_gif {
        export::record_gif(&options, path)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut presets = PresetManager::new();

    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<12} {}", preset.name, preset.description);
        }
        return Ok(());
    }
    if let Some(name) = &args.delete_preset {
        presets.delete_preset(name)?;
        println!("Deleted preset {}", name);
        return Ok(());
    }

    let config = resolve_config(&args, &presets)?;
    let seed = config.seed.unwrap_or_else(rand::random);

    if let Some(name) = &args.save_preset {
        presets.save_preset(Preset::new(name.as_str(), "Saved from the command line", config.settings.clone()))?;
        println!("Saved preset {} ({} total)", name, presets.preset_names().len());
    }

    if let Some(path) = &args.save_config {
        let mut saved = config.clone();
        saved.seed = Some(seed);
        saved.save_to_file(path)?;
        log::info!("saved config to {}", path.display());
    }

    if args.export_png.is_some() || args.export_gif.is_some() {
        run_export(&args, &config, seed)?;
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let canvas = ui::canvas_inner(Rect::new(0, 0, size.width, size.height), false);
    let mut app = App::new(
        canvas,
        config.settings,
        presets,
        seed,
        config.theme,
        config.reduced_motion,
    );

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Cleanup
    app.animator.stop();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::warn!("terminal loop failed: {}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Recompute the canvas rectangle after a resize or layout change
fn sync_canvas(app: &mut App, width: u16, height: u16) {
    let canvas = ui::canvas_inner(Rect::new(0, 0, width, height), app.fullscreen_mode);
    app.set_canvas_area(canvas);
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    let mut clock = FrameClock::new(FRAME_DURATION, Instant::now());
    app.tick();
    terminal.draw(|frame| ui::render(frame, app))?;

    loop {
        // Input only waits out the rest of the current frame
        if event::poll(clock.remaining(Instant::now()))? {
            if handle_event(terminal, app, event::read()?)? {
                return Ok(());
            }
        }

        if clock.take_frame(Instant::now()) {
            app.tick();
            terminal.draw(|frame| ui::render(frame, app))?;
        }
    }
}

/// Apply one input event; returns `true` when the app should quit
fn handle_event<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event: Event,
) -> io::Result<bool> {
    match event {
        Event::Key(key) => {
            // Only process Press events
            if key.kind != KeyEventKind::Press {
                return Ok(false);
            }

            // Handle Ctrl+C
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }

            match key.code {
                // System controls
                KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Char('r') | KeyCode::Char('R') => app.reseed(),
                KeyCode::Char('t') | KeyCode::Char('T') => {
                    app.toggle_theme();
                    app.focus = Focus::Theme;
                }
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    app.toggle_reduced_motion();
                    app.focus = Focus::Motion;
                }
                KeyCode::Char('p') | KeyCode::Char('P') => app.save_snapshot(),
                KeyCode::Char('v') | KeyCode::Char('V') => {
                    app.toggle_fullscreen();
                    let size = terminal.size()?;
                    sync_canvas(app, size.width, size.height);
                }
                KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                KeyCode::Char(c @ '1'..='7') => {
                    app.apply_preset(c as usize - '1' as usize);
                    app.focus = Focus::Preset;
                }

                // Navigation
                KeyCode::Tab => app.next_focus(),
                KeyCode::BackTab => app.prev_focus(),
                KeyCode::Up => {
                    if !app.show_help {
                        if app.focus.is_param() {
                            app.adjust_focused_up();
                        } else {
                            app.scroll_controls_up();
                        }
                    }
                }
                KeyCode::Down => {
                    if !app.show_help {
                        if app.focus.is_param() {
                            app.adjust_focused_down();
                        } else {
                            let term_size = terminal.size().unwrap_or_default();
                            let visible = ui::get_controls_visible_lines(term_size.height);
                            app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                        }
                    }
                }
                KeyCode::Esc => {
                    if app.show_help {
                        app.toggle_help();
                    } else if app.focus.is_param() {
                        app.focus = Focus::Controls;
                    }
                }
                KeyCode::Char('j') | KeyCode::Char('J') => {
                    if app.show_help {
                        app.scroll_help_down(ui::HELP_CONTENT_LINES);
                    }
                }
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    if app.show_help {
                        app.scroll_help_up();
                    }
                }
                _ => {}
            }
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => app.pointer_moved(mouse.column, mouse.row),
            _ => {}
        },
        Event::FocusLost => app.pointer_left(),
        Event::Resize(width, height) => sync_canvas(app, width, height),
        _ => {}
    }
    Ok(false)
}
