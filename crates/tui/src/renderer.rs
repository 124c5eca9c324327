use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use genoview_core::views::Snp;
use genoview_core::{
    BrowserConfig, BrowserHandle, CoordSys, Feature, GenomeBrowser, RasterSurface, TrackCommand, ViewCommand, spawn,
};
use genoview_protocol::{Interval, Point, Size, ThemeToken};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Paragraph},
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

type Handle = BrowserHandle<Feature<Snp>, RasterSurface>;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const SCROLL_STEP: f64 = 0.1;
const ZOOM_IN: f64 = 0.8;
const ZOOM_OUT: f64 = 1.25;
/// Header and status rows.
const CHROME_ROWS: u16 = 2;

pub fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::Border => Color::DarkGray,
        ThemeToken::SegmentBandEven => Color::Rgb(24, 24, 24),
        ThemeToken::SegmentBandOdd => Color::Rgb(40, 40, 40),
        ThemeToken::SegmentBorder => Color::DarkGray,
        ThemeToken::SegmentLabel => Color::Gray,
        ThemeToken::SnpPoint => Color::Rgb(66, 165, 245),
        ThemeToken::SnpSignificant => Color::Red,
        ThemeToken::SignificanceLine => Color::Yellow,
        ThemeToken::GeneFill => Color::Green,
        ThemeToken::GeneBorder => Color::Rgb(46, 125, 50),
        ThemeToken::GeneLabel => Color::LightGreen,
        ThemeToken::AxisLine => Color::Gray,
        ThemeToken::AxisTick => Color::Gray,
        ThemeToken::AxisText => Color::White,
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::Highlight => Color::LightYellow,
    }
}

/// Copy a raster surface into `area` of the terminal buffer.
///
/// Band fills become background color so that glyphs and text drawn over
/// them keep a readable backdrop.
pub fn paint(buf: &mut Buffer, area: Rect, surface: &RasterSurface) {
    let width = surface.width().min(usize::from(area.width));
    let height = surface.height().min(usize::from(area.height));
    for y in 0..height {
        for x in 0..width {
            let Some(cell) = surface.cell(x, y) else {
                continue;
            };
            let pos = (area.x + x as u16, area.y + y as u16);
            let color = theme_to_color(cell.color);
            let target = &mut buf[pos];
            match cell.color {
                ThemeToken::SegmentBandEven | ThemeToken::SegmentBandOdd if cell.ch == '█' => {
                    target.set_char(' ').set_bg(color);
                }
                _ => {
                    target.set_char(cell.ch).set_fg(color);
                }
            }
        }
    }
}

/// Size of the browser canvas for a terminal of `width` x `height` cells.
fn canvas_size(width: u16, height: u16) -> Size {
    Size::new(f64::from(width), f64::from(height.saturating_sub(CHROME_ROWS)))
}

/// Human-readable locus of a global position, e.g. `17:41,196,312`.
fn locus_text(coords: &CoordSys, global: f64) -> String {
    match coords.segment_at_point(global) {
        Some(locus) => format!("{}:{}", locus.segment, group_thousands(locus.offset)),
        None => format!("gap@{}", group_thousands(global.max(0.0) as u64)),
    }
}

fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn describe(coords: &CoordSys, snp: &Feature<Snp>) -> String {
    let mut text = format!(
        "{} -log10(p)={:.2} at {}",
        snp.payload.rsid,
        snp.payload.score,
        locus_text(coords, snp.position as f64)
    );
    if let Some(gene) = snp.extra.get::<String>("gene") {
        text.push_str(&format!(" near {gene}"));
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    handle: Handle,
    coords: Arc<CoordSys>,
    status: String,
}

impl App {
    fn handle_event(&mut self, event: Event) -> Result<Flow> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Quit),
                KeyCode::Left | KeyCode::Char('h') => self.view(ViewCommand::Scroll(-SCROLL_STEP))?,
                KeyCode::Right | KeyCode::Char('l') => self.view(ViewCommand::Scroll(SCROLL_STEP))?,
                KeyCode::Char('+') | KeyCode::Char('=') => self.view(ViewCommand::Zoom(ZOOM_IN))?,
                KeyCode::Char('-') => self.view(ViewCommand::Zoom(ZOOM_OUT))?,
                KeyCode::Char('0') | KeyCode::Home => self.view(ViewCommand::jump(self.coords.full_view()))?,
                _ => {}
            },
            Event::Mouse(mouse) => self.handle_mouse(mouse)?,
            Event::Resize(width, height) => {
                let size = canvas_size(width, height);
                self.handle.queue_command(TrackCommand::Resize {
                    width: size.width,
                    height: size.height,
                })?;
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.view(ViewCommand::Zoom(ZOOM_IN))?,
            MouseEventKind::ScrollDown => self.view(ViewCommand::Zoom(ZOOM_OUT))?,
            MouseEventKind::ScrollLeft => self.view(ViewCommand::Scroll(-SCROLL_STEP))?,
            MouseEventKind::ScrollRight => self.view(ViewCommand::Scroll(SCROLL_STEP))?,
            MouseEventKind::Down(MouseButton::Left) if mouse.row > 0 => {
                let at = Point::new(f64::from(mouse.column), f64::from(mouse.row - 1));
                let hits = self.handle.last_hotspots(1.0, at);
                debug!(x = at.x, y = at.y, hits = hits.len(), "click");
                self.status = match hits.first() {
                    Some(snp) => describe(&self.coords, snp),
                    None => String::new(),
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn view(&self, cmd: ViewCommand) -> Result<()> {
        self.handle.queue_update_view(cmd)?;
        Ok(())
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let view: Interval<f64> = self.handle.view();

        let header = Block::default()
            .title(format!(
                " genoview | {} .. {} | ←→ scroll | +/- zoom | 0 reset | q quit ",
                locus_text(&self.coords, view.low),
                locus_text(&self.coords, view.high),
            ))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(header, Rect::new(0, 0, area.width, 1));

        let content = Rect::new(0, 1, area.width, area.height.saturating_sub(CHROME_ROWS));
        frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), content);
        self.handle.with_frame(|surface| paint(frame.buffer_mut(), content, surface));

        let stats = self.handle.frame_stats();
        let status = format!(
            " {} | renders {} (cancelled {}) | previews {} ",
            if self.status.is_empty() { "click a point for details" } else { &self.status },
            stats.renders_completed,
            stats.renders_cancelled,
            stats.previews,
        );
        let status_row = Rect::new(0, area.height.saturating_sub(1), area.width, 1);
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Gray).bg(Color::DarkGray)),
            status_row,
        );
    }
}

/// Forward terminal events from a blocking reader thread.
fn spawn_input(tx: mpsc::UnboundedSender<Event>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "terminal read failed");
                        break;
                    }
                },
                Ok(false) if tx.is_closed() => break,
                Ok(false) => {}
                Err(err) => {
                    warn!(error = %err, "terminal poll failed");
                    break;
                }
            }
        }
    });
}

pub async fn run_tui(config: &BrowserConfig, coords: Arc<CoordSys>, browser: GenomeBrowser<Snp>) -> Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    let handle = spawn(config, &coords, browser, canvas_size(width, height))?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App {
        handle: handle.clone(),
        coords,
        status: String::new(),
    };

    let (tx, mut events) = mpsc::unbounded_channel();
    spawn_input(tx);
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let result: Result<()> = async {
        loop {
            tokio::select! {
                ev = events.recv() => match ev {
                    Some(ev) => {
                        if app.handle_event(ev)? == Flow::Quit {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    terminal.draw(|frame| app.draw(frame))?;
                }
            }
        }
        Ok(())
    }
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    let container = handle.shutdown().await?;
    let stats = handle.frame_stats();
    info!(
        renders = stats.renders_completed,
        cancelled = stats.renders_cancelled,
        previews = stats.previews,
        errors = stats.errors,
        layers = container.layer_names().len(),
        "browser closed"
    );

    result
}
