//! Panels of the build/export progress screen

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use std::collections::VecDeque;

use super::{Phase, Progress};

const TITLE: &str = " RPG Maker Cross Reference ";
const MAX_LOG_ENTRIES: usize = 100;

fn frame_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

/// Current phase plus one line of context (project path, output file)
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (symbol, color) = match self.phase {
            Phase::Loading => ("…", Color::Yellow),
            Phase::Indexing => ("⚙", Color::Cyan),
            Phase::Exporting => ("⤷", Color::Magenta),
            Phase::Complete => ("✓", Color::Green),
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {symbol} "), style),
                Span::styled(self.phase.to_string(), style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        frame.render_widget(Paragraph::new(lines).block(frame_block(TITLE)), area);
    }
}

/// Table-by-table progress; empty while nothing is running
#[derive(Default)]
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    fn label(progress: &Progress) -> String {
        if progress.total == 0 {
            return progress.label.clone();
        }
        format!(
            "{} ({} of {})",
            progress.label,
            (progress.current + 1).min(progress.total),
            progress.total
        )
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(block, area);
            return;
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().clamp(0.0, 1.0))
            .label(Self::label(progress));
        frame.render_widget(gauge, area);
    }
}

/// Rolling activity log; the newest line is highlighted
pub struct LogPanel {
    entries: VecDeque<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(rows);
        let newest = self.entries.len().saturating_sub(1);

        let lines: Vec<Line> = self
            .entries
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, entry)| {
                let color = if i == newest { Color::White } else { Color::DarkGray };
                Line::from(Span::styled(format!(" {entry}"), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(frame_block(" Activity ")), area);
    }
}
