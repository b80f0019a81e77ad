//! Interactive reference browser: entity types on the left, the ids of the
//! selected type on the right, and the references of the selected id below.

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use crate::xref::{EntityType, XrefManager};

const PAGE: usize = 10;

/// Which list receives cursor keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Types,
    Ids,
    Results,
}

pub struct Browser<'a, M> {
    manager: &'a XrefManager<M>,
    focus: Focus,
    types: ListState,
    ids: ListState,
    results: ListState,
    quit: bool,
}

impl<'a, M> Browser<'a, M> {
    pub fn new(manager: &'a XrefManager<M>) -> Self {
        let first = EntityType::ALL
            .iter()
            .position(|t| !manager.referenced_ids(*t).is_empty())
            .unwrap_or(0);
        Self {
            manager,
            focus: Focus::Types,
            types: ListState::default().with_selected(Some(first)),
            ids: ListState::default(),
            results: ListState::default(),
            quit: false,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn current_type(&self) -> EntityType {
        EntityType::ALL[self.types.selected().unwrap_or(0)]
    }

    /// Selected id, looked up through the entry rows
    pub fn current_id(&self) -> Option<u32> {
        let row = self.ids.selected()?;
        self.entry_ids().get(row).copied()
    }

    /// Every table slot of the current type, then referenced ids past the
    /// end of the table in ascending order
    fn entry_ids(&self) -> Vec<u32> {
        let kind = self.current_type();
        let slots = self.manager.database().table_len(kind).saturating_sub(1) as u32;
        let mut dangling: Vec<u32> = self
            .manager
            .referenced_ids(kind)
            .into_iter()
            .filter(|id| *id > slots)
            .collect();
        dangling.sort_unstable();
        (1..=slots).chain(dangling).collect()
    }

    fn id_count(&self) -> usize {
        self.entry_ids().len()
    }

    fn result_count(&self) -> usize {
        self.current_id()
            .map(|id| self.manager.references(self.current_type(), id).len())
            .unwrap_or(0)
    }

    fn has_references(&self, kind: EntityType, id: u32) -> bool {
        !self.manager.references(kind, id).is_empty()
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.step(-1),
            KeyCode::Down | KeyCode::Char('j') => self.step(1),
            KeyCode::PageUp => self.step(-(PAGE as isize)),
            KeyCode::PageDown => self.step(PAGE as isize),
            KeyCode::Enter | KeyCode::Right | KeyCode::Tab => self.enter(),
            KeyCode::Esc | KeyCode::Left | KeyCode::Backspace => self.back(),
            _ => {}
        }
    }

    fn step(&mut self, delta: isize) {
        let (state, len) = match self.focus {
            Focus::Types => (&mut self.types, EntityType::ALL.len()),
            Focus::Ids => {
                let len = self.id_count();
                (&mut self.ids, len)
            }
            Focus::Results => {
                let len = self.result_count();
                (&mut self.results, len)
            }
        };
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        state.select(Some(next as usize));
    }

    fn enter(&mut self) {
        match self.focus {
            Focus::Types => {
                let kind = self.current_type();
                let entries = self.entry_ids();
                if !entries.is_empty() {
                    let first = entries
                        .iter()
                        .position(|id| self.has_references(kind, *id))
                        .unwrap_or(0);
                    self.ids.select(Some(first));
                    self.focus = Focus::Ids;
                }
            }
            Focus::Ids => {
                if self.result_count() > 0 {
                    self.results.select(Some(0));
                    self.focus = Focus::Results;
                }
            }
            Focus::Results => {}
        }
    }

    fn back(&mut self) {
        match self.focus {
            Focus::Types => self.quit = true,
            Focus::Ids => {
                self.ids.select(None);
                self.focus = Focus::Types;
            }
            Focus::Results => {
                self.results.select(None);
                self.focus = Focus::Ids;
            }
        }
    }

    /// Draw and handle keys until the user quits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.quit {
            terminal.draw(|frame| self.render(frame))?;
            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(22), Constraint::Min(20)])
            .split(frame.area());
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45), // Ids
                Constraint::Length(3),      // Selected entity
                Constraint::Min(5),         // References
            ])
            .split(columns[1]);

        self.render_types(frame, columns[0]);
        self.render_ids(frame, right[0]);
        self.render_help(frame, right[1]);
        self.render_results(frame, right[2]);
    }

    fn block(&self, title: &'static str, focus: Focus) -> Block<'static> {
        let color = if self.focus == focus {
            Color::Cyan
        } else {
            Color::Blue
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(color))
    }

    fn render_types(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = EntityType::ALL
            .iter()
            .map(|t| {
                let style = dim_unless(!self.manager.referenced_ids(*t).is_empty());
                ListItem::new(Span::styled(t.plural(), style))
            })
            .collect();
        let list = List::new(items)
            .block(self.block(" Types ", Focus::Types))
            .highlight_style(highlight());
        frame.render_stateful_widget(list, area, &mut self.types);
    }

    fn render_ids(&mut self, frame: &mut Frame, area: Rect) {
        let kind = self.current_type();
        let items: Vec<ListItem> = self
            .entry_ids()
            .into_iter()
            .map(|id| {
                let style = dim_unless(self.has_references(kind, id));
                ListItem::new(Span::styled(self.manager.entry_label(kind, id), style))
            })
            .collect();
        let list = List::new(items)
            .block(self.block(" Entries ", Focus::Ids))
            .highlight_style(highlight());
        frame.render_stateful_widget(list, area, &mut self.ids);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let kind = self.current_type();
        let text = match self.current_id() {
            Some(id) => format!(" {} {}", kind.title(), self.manager.entry_label(kind, id)),
            None => " Enter: open   Esc: back   q: quit".to_string(),
        };
        let paragraph = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_results(&mut self, frame: &mut Frame, area: Rect) {
        let manager = self.manager;
        let kind = self.current_type();
        let refs = self
            .current_id()
            .map(|id| manager.references(kind, id))
            .unwrap_or(&[]);
        let items: Vec<ListItem> = if refs.is_empty() {
            vec![ListItem::new(Span::styled(
                "No references found",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            refs.iter()
                .map(|r| ListItem::new(manager.describe(r)))
                .collect()
        };
        let list = List::new(items)
            .block(self.block(" References ", Focus::Results))
            .highlight_style(highlight());
        frame.render_stateful_widget(list, area, &mut self.results);
    }
}

fn dim_unless(enabled: bool) -> Style {
    if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Database, Item, Map, Skill};
    use crate::ui::SilentUi;
    use ratatui::backend::TestBackend;
    use std::collections::HashMap;

    fn manager() -> XrefManager<HashMap<u32, Map>> {
        let mut db = Database::default();
        db.system.variables = vec![None, Some("Gold".into()), Some("Keys".into())];
        db.items = vec![
            None,
            Some(Item {
                id: 1,
                name: "Potion".into(),
                ..Default::default()
            }),
        ];
        db.skills = vec![
            None,
            Some(Skill {
                id: 1,
                name: "Fire".into(),
                description: r"Burns \v[2]".into(),
                ..Default::default()
            }),
        ];
        let mut manager = XrefManager::new(db, HashMap::new());
        manager.ensure_built(&mut SilentUi::new()).unwrap();
        manager
    }

    #[test]
    fn test_starts_on_first_referenced_type() {
        let manager = manager();
        let browser = Browser::new(&manager);
        assert_eq!(browser.current_type(), EntityType::Variable);
        assert_eq!(browser.focus(), Focus::Types);
    }

    #[test]
    fn test_enter_jumps_to_first_referenced_id() {
        let manager = manager();
        let mut browser = Browser::new(&manager);
        browser.handle_key(KeyCode::Enter);
        assert_eq!(browser.focus(), Focus::Ids);
        assert_eq!(browser.current_id(), Some(2));

        browser.handle_key(KeyCode::Enter);
        assert_eq!(browser.focus(), Focus::Results);

        browser.handle_key(KeyCode::Esc);
        browser.handle_key(KeyCode::Up);
        assert_eq!(browser.current_id(), Some(1));
        // nothing references variable 1
        browser.handle_key(KeyCode::Enter);
        assert_eq!(browser.focus(), Focus::Ids);

        browser.handle_key(KeyCode::Esc);
        browser.handle_key(KeyCode::Esc);
        assert!(browser.should_quit());
    }

    #[test]
    fn test_ids_past_table_end_are_listed() {
        let mut db = Database::default();
        db.system.variables = vec![None, Some("Gold".into())];
        db.skills = vec![
            None,
            Some(Skill {
                id: 1,
                name: "Fire".into(),
                description: r"Burns \v[9] and \v[5]".into(),
                ..Default::default()
            }),
        ];
        let mut manager = XrefManager::new(db, HashMap::<u32, Map>::new());
        manager.ensure_built(&mut SilentUi::new()).unwrap();

        let mut browser = Browser::new(&manager);
        assert_eq!(browser.entry_ids(), vec![1, 5, 9]);

        browser.handle_key(KeyCode::Enter);
        assert_eq!(browser.current_id(), Some(5));
        browser.handle_key(KeyCode::Down);
        assert_eq!(browser.current_id(), Some(9));
        browser.handle_key(KeyCode::Enter);
        assert_eq!(browser.focus(), Focus::Results);
    }

    #[test]
    fn test_render_shows_reference_line() {
        let manager = manager();
        let mut browser = Browser::new(&manager);
        browser.handle_key(KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| browser.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("Skill 1: Fire"));
        assert!(screen.contains("0002: Keys"));
    }
}
