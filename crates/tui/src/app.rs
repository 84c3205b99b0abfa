use std::io::{Stdout, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use icicle_core::model::{NodeKey, Profile, ProfileDatabase, ProfileKey, ROOT_NODE_KEY};
use icicle_core::svg::render_svg;
use icicle_core::{CommandBuffer, PartitionView, ViewConfig};
use icicle_protocol::{Point, Rect, SharedStr};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect as Area,
    style::{Color, Style},
    widgets::Paragraph,
};
use tracing::{debug, info};

use crate::nav::{self, Move};
use crate::surface::TerminalSurface;

/// Poll interval while a zoom is running (about 60 fps).
const FRAME: Duration = Duration::from_millis(16);
const IDLE: Duration = Duration::from_millis(250);

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode and the alternate screen, undone on drop so errors and panics
/// leave a usable shell behind.
struct TerminalGuard {
    terminal: Term,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Open the interactive view focused on the root of `profile`.
pub fn run(profile: Profile, config: ViewConfig) -> Result<()> {
    let db = ProfileDatabase::new();
    let profile_key = db.add_profile(profile);
    let mut view = PartitionView::new(config);
    view.attach_data_source(&db)?;
    view.set_active_node(profile_key, ROOT_NODE_KEY)?;

    let mut guard = TerminalGuard::enter()?;
    event_loop(&mut guard.terminal, &db, &mut view, profile_key)
}

/// Render the root view of `profile` to an SVG file.
pub fn export_svg(profile: Profile, config: ViewConfig, size: (u32, u32), out: &Path) -> Result<()> {
    let db = ProfileDatabase::new();
    let profile_key = db.add_profile(profile);
    let mut view = PartitionView::new(config);
    view.attach_data_source(&db)?;
    view.set_active_node(profile_key, ROOT_NODE_KEY)?;

    let (width, height) = (f64::from(size.0), f64::from(size.1));
    let mut buf = CommandBuffer::new(width, height);
    view.render(&mut buf)?;
    let svg = render_svg(buf.commands(), width, height);
    std::fs::write(out, svg).with_context(|| format!("writing {}", out.display()))?;
    info!(path = %out.display(), cells = buf.commands().len(), "svg written");
    Ok(())
}

fn event_loop(
    terminal: &mut Term,
    db: &ProfileDatabase,
    view: &mut PartitionView<'_>,
    profile_key: ProfileKey,
) -> Result<()> {
    let mut last = Instant::now();
    let mut dirty = true;
    let mut content = Area::default();

    loop {
        let now = Instant::now();
        dirty |= view.tick(now - last);
        last = now;

        if dirty {
            let title = header(db, view);
            let mut rendered = Ok(());
            terminal.draw(|frame| {
                let area = frame.area();
                let header_area = Area::new(area.x, area.y, area.width, area.height.min(1));
                content = Area::new(
                    area.x,
                    area.y + header_area.height,
                    area.width,
                    area.height - header_area.height,
                );
                frame.render_widget(
                    Paragraph::new(title).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
                    header_area,
                );
                let mut surface = TerminalSurface::new(frame.buffer_mut(), content);
                rendered = view.render(&mut surface);
            })?;
            rendered?;
            dirty = false;
        }

        let timeout = if view.is_animating() { FRAME } else { IDLE };
        if !event::poll(timeout)? {
            continue;
        }

        let target = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Left | KeyCode::Char('h') => neighbour(db, view, Move::Parent)?,
                KeyCode::Right | KeyCode::Char('l') => neighbour(db, view, Move::FirstChild)?,
                KeyCode::Up | KeyCode::Char('k') => neighbour(db, view, Move::PrevSibling)?,
                KeyCode::Down | KeyCode::Char('j') => neighbour(db, view, Move::NextSibling)?,
                KeyCode::Home | KeyCode::Char('r') => Some(ROOT_NODE_KEY),
                _ => None,
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                clicked(view, content, mouse.column, mouse.row)
            }
            Event::Resize(..) => {
                dirty = true;
                None
            }
            _ => None,
        };

        if let Some(node_key) = target {
            debug!(node_key, "focus requested");
            view.set_active_node(profile_key, node_key)?;
            dirty = true;
        }
    }

    Ok(())
}

fn neighbour(db: &ProfileDatabase, view: &PartitionView<'_>, dir: Move) -> Result<Option<NodeKey>> {
    let active = view.active_key();
    let profile = db.profile(active.profile_key)?;
    Ok(nav::step(&profile, active.node_key, dir))
}

fn clicked(view: &PartitionView<'_>, content: Area, column: u16, row: u16) -> Option<NodeKey> {
    if column < content.x || row < content.y {
        return None;
    }
    // Aim at the middle of the terminal cell.
    let point = Point::new(
        f64::from(column - content.x) + 0.5,
        f64::from(row - content.y) + 0.5,
    );
    let window = Rect::new(
        0.0,
        0.0,
        f64::from(content.width),
        f64::from(content.height),
    );
    view.node_at(point, &window).map(|item| item.node_key)
}

fn header(db: &ProfileDatabase, view: &PartitionView<'_>) -> String {
    let active = view.active_key();
    let path = db
        .profile(active.profile_key)
        .map(|p| {
            p.path_of(active.node_key)
                .iter()
                .map(SharedStr::as_str)
                .collect::<Vec<&str>>()
                .join(" > ")
        })
        .unwrap_or_default();
    format!(" icicle | {path} | hjkl/arrows move | r root | q quit ")
}
