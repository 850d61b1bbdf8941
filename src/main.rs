use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use statwatch::data::{plan_pages, render_summary, History};
use statwatch::{events, ui, App, ChartOptions, ChartSize, Settings, StatsError};

#[derive(Parser, Debug)]
#[command(name = "statwatch")]
#[command(about = "Charts and diagnostics for librdkafka client statistics")]
struct Args {
    /// File of librdkafka statistics JSON objects
    stats_file: PathBuf,

    /// Write one chart file per page into the output directory
    #[arg(short, long)]
    graph: bool,

    /// Directory for chart and debug artifacts
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write per-chart CSV, summaries and a raw series dump
    #[arg(long)]
    debug_data: bool,

    /// Keep series that have no data at all
    #[arg(long)]
    show_empty: bool,

    /// Leave valid-point counts out of legend labels
    #[arg(long)]
    no_legend_valid: bool,

    /// Hide the per-chart series/constant annotation
    #[arg(long)]
    no_annotate: bool,

    /// Line weight; selects the terminal marker used to draw lines
    #[arg(long)]
    line_width: Option<f64>,

    /// Browse the charts in the terminal
    #[arg(short, long)]
    interactive: bool,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file (the only log output in interactive mode)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {e}; using defaults");
            Settings::default()
        }
    };
    let settings = apply_overrides(settings, &args);

    if args.interactive {
        return run_tui(&args.stats_file, settings);
    }
    run_batch(&args, &settings)
}

/// Install the stderr (or file) log subscriber.
///
/// The terminal browser owns the screen, so it only logs to `--log-file`.
fn init_tracing(args: &Args) -> Result<()> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match (&args.log_file, args.interactive) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (None, false) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        (None, true) => {}
    }
    Ok(())
}

/// Command-line flags win over file and environment settings.
fn apply_overrides(mut settings: Settings, args: &Args) -> Settings {
    if let Some(ref output) = args.output {
        settings.output_dir = output.clone();
    }
    if args.show_empty {
        settings.include_empty_series = true;
    }
    if args.no_legend_valid {
        settings.annotate_legend_with_counts = false;
    }
    if args.no_annotate {
        settings.show_overlay_annotations = false;
    }
    if let Some(width) = args.line_width {
        settings.line_width = width;
    }
    settings.sanitized()
}

/// Print the summary, then write whatever artifacts were asked for.
///
/// Failures are reported and end the run early; none of them are fatal.
fn run_batch(args: &Args, settings: &Settings) -> Result<()> {
    let loaded = match statwatch::load_file(&args.stats_file) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(());
        }
    };

    print!("{}", render_summary(loaded.latest()));

    if !args.graph && !args.debug_data {
        return Ok(());
    }

    let history = match History::build(&loaded.snapshots) {
        Ok(history) => history,
        Err(StatsError::InsufficientData { .. }) => {
            println!("Not enough data points to generate graphs.");
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(());
        }
    };

    let pages = plan_pages(&history, settings.include_empty_series);
    if args.graph {
        let size = ChartSize {
            width: settings.chart_width,
            height: settings.chart_height,
        };
        if let Err(e) = statwatch::write_pages(
            &history,
            &pages,
            &settings.output_dir,
            &ChartOptions::from(settings),
            size,
        ) {
            eprintln!("Error writing charts: {e}");
        }
    }
    if args.debug_data {
        if let Err(e) = statwatch::export_debug(&history, &pages, &settings.output_dir) {
            eprintln!("Error writing debug data: {e}");
        }
    }
    Ok(())
}

/// Run the chart browser on a statistics file
fn run_tui(path: &Path, settings: Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Create app and load the file; a failure is shown in the status bar
    let mut app = App::new(path, settings);
    if let Err(e) = app.reload_data() {
        warn!(error = %e, "initial load failed");
    }

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Charts
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);
            ui::page::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // The file is not watched; 'r' reloads it
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
