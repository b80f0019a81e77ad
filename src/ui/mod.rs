//! Terminal UI module using ratatui
//!
//! Two pieces:
//! - build progress: current phase, table progress and an activity log
//! - the reference browser (`browser`), opened once the index is built

pub mod browser;
mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout, Write};
use std::time::Duration;

use components::{LogPanel, ProgressPanel, StatusPanel};

/// Application phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Indexing,
    Exporting,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Loading => write!(f, "Loading database"),
            Phase::Indexing => write!(f, "Building cross references"),
            Phase::Exporting => write!(f, "Exporting to SQLite"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress through the tables of the current phase
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Progress sink for index builds and exports. Implemented by the
/// full-screen display, a stderr printer and a silent no-op.
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

/// Everything the progress screen shows, independent of the terminal
struct ProgressScreen {
    status: StatusPanel,
    progress: ProgressPanel,
    log: LogPanel,
}

impl ProgressScreen {
    fn new() -> Self {
        Self {
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            log: LogPanel::new(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Status panel
                Constraint::Length(3), // Progress bar
                Constraint::Min(5),    // Log panel
            ])
            .split(frame.area());

        self.status.render(frame, chunks[0]);
        self.progress.render(frame, chunks[1]);
        self.log.render(frame, chunks[2]);
    }
}

/// Full-screen progress display
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    screen: ProgressScreen,
}

impl UiApp {
    /// Enter raw mode and the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            screen: ProgressScreen::new(),
        })
    }

    fn draw(&mut self) {
        let screen = &self.screen;
        // A failed redraw only loses one frame.
        self.terminal.draw(|frame| screen.render(frame)).ok();
    }

    /// Show a summary, wait for a key, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        self.log(summary);
        self.log("Press any key to exit...");

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// The raw-mode terminal, for screens drawn after the build
    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        restore_terminal(&mut self.terminal)
    }
}

/// Leave raw mode and the alternate screen
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal::disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.screen.status.set_phase(phase);
        self.draw();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.screen.status.set_info(info);
        self.draw();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.screen
            .progress
            .set_progress(Progress::new(current, total, label));
        self.draw();
    }

    fn clear_progress(&mut self) {
        self.screen.progress.clear();
        self.draw();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.screen.log.add(message);
        self.draw();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        restore_terminal(&mut self.terminal).ok();
    }
}

/// Plain-text progress on stderr, for the listing commands whose stdout is
/// the result
#[derive(Default)]
pub struct StderrUi;

impl Ui for StderrUi {
    fn set_phase(&mut self, phase: Phase) {
        eprintln!("{}...", phase);
    }

    fn set_info(&mut self, _info: impl Into<String>) {}

    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        writeln!(io::stderr(), "  {}", message.into()).ok();
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(0, 0, "x").ratio(), 0.0);
        assert_eq!(Progress::new(1, 4, "x").ratio(), 0.25);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::Indexing.to_string(), "Building cross references");
    }

    #[test]
    fn test_progress_screen_layout() {
        let mut screen = ProgressScreen::new();
        screen.status.set_phase(Phase::Exporting);
        screen.progress.set_progress(Progress::new(0, 2, "Variables"));
        screen.log.add("Indexed 13 references across 5 entity types");

        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|frame| screen.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Exporting to SQLite"));
        assert!(text.contains("Variables (1 of 2)"));
        assert!(text.contains("Indexed 13 references"));
    }
}
