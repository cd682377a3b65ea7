//! Application state and key handling for the menu, the two forms, and the
//! result screens.

use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::add_product;
use crate::db::Store;
use crate::export::export_to_dir;
use crate::report::{analyze, describe_product, view_product};

use super::forms::{LookupForm, ProductField, ProductForm};
use super::helpers::{centered_rect, key_hints, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// What the main pane shows.
enum Screen {
    Menu,
    Product(Vec<String>),
    Analysis(Vec<String>),
}

/// Modal overlays on top of the current screen.
enum Mode {
    Normal,
    Viewing(LookupForm),
    Adding(ProductForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Menu state. Owns the store for the lifetime of the session.
pub struct App {
    store: Store,
    backup_dir: PathBuf,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Store, backup_dir: PathBuf) -> Self {
        Self {
            store,
            backup_dir,
            screen: Screen::Menu,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Show a message in the footer on the first frame, e.g. the load summary.
    pub fn with_status<S: Into<String>>(mut self, text: S) -> Self {
        self.set_status(text, StatusKind::Info);
        self
    }

    /// Dispatch one key press. Returns `true` when the user asked to quit.
    /// Operation failures land in the footer; only terminal errors propagate.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Viewing(form) => self.handle_view(code, form),
            Mode::Adding(form) => self.handle_add(code, form),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => *exit = true,
            KeyCode::Esc => {
                if matches!(self.screen, Screen::Menu) {
                    *exit = true;
                } else {
                    self.screen = Screen::Menu;
                    self.clear_status();
                }
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.clear_status();
                return Mode::Viewing(LookupForm::default());
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.clear_status();
                return Mode::Adding(ProductForm::default());
            }
            KeyCode::Char('a') | KeyCode::Char('A') => self.run_analysis(),
            KeyCode::Char('b') | KeyCode::Char('B') => self.run_backup(),
            _ => self.set_status(
                "Invalid choice. Please choose V, N, A, or B.",
                StatusKind::Error,
            ),
        }
        Mode::Normal
    }

    fn handle_view(&mut self, code: KeyCode, mut form: LookupForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("View cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let lookup = form
                    .parse_id()
                    .and_then(|id| view_product(&self.store, id).map(|found| (id, found)));
                match lookup {
                    Ok((_, Some(product))) => {
                        self.screen = Screen::Product(describe_product(&product));
                        self.set_status(
                            format!("Showing product {}.", product.product_id),
                            StatusKind::Info,
                        );
                        return Mode::Normal;
                    }
                    Ok((id, None)) => {
                        form.error = Some(format!(
                            "No product found with ID {id}. Please try again."
                        ));
                    }
                    Err(err) => form.error = Some(surface_error(&err)),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Viewing(form)
    }

    fn handle_add(&mut self, code: KeyCode, mut form: ProductForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("New product cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_product(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Adding(form)
    }

    fn save_new_product(&mut self, form: &ProductForm) -> Result<()> {
        let input = form.parse_inputs()?;
        let today = Local::now().date_naive();
        let added = add_product(&mut self.store, input, today)?;

        let mut message = format!("Product '{}' added successfully.", added.product.product_name);
        if added.brand_created {
            message.push_str(&format!(" Created brand '{}'.", added.brand.brand_name));
        }
        self.screen = Screen::Product(describe_product(&added.product));
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn run_analysis(&mut self) {
        match analyze(&self.store) {
            Ok(analysis) => {
                self.screen = Screen::Analysis(analysis.lines());
                self.clear_status();
            }
            Err(err) => self.set_status(
                format!("An error occurred: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    fn run_backup(&mut self) {
        match export_to_dir(&self.store, &self.backup_dir) {
            Ok(summary) => self.set_status(
                format!(
                    "Backed up {} brands to {} and {} products to {}.",
                    summary.brands,
                    summary.brands_path.display(),
                    summary.products,
                    summary.products_path.display()
                ),
                StatusKind::Info,
            ),
            Err(err) => self.set_status(
                format!("Backup failed: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::Product(lines) => self.draw_lines(frame, content_area, "Product", lines),
            Screen::Analysis(lines) => self.draw_lines(frame, content_area, "Analysis", lines),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Viewing(form) => self.draw_lookup_form(frame, area, form),
            Mode::Adding(form) => self.draw_product_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut lines: Vec<Line> = [
            ("V", "View Product"),
            ("N", "New Product"),
            ("A", "Analyze"),
            ("B", "Backup"),
            ("Q", "Quit"),
        ]
        .iter()
        .map(|(key, label)| {
            Line::from(vec![
                Span::styled(format!("{key}: "), key_style),
                Span::raw(*label),
            ])
        })
        .collect();

        if let (Ok(brands), Ok(products)) = (self.store.brand_count(), self.store.product_count()) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{products} products across {brands} brands"),
                Style::default().fg(Color::Gray),
            )));
        }

        let block = Block::default()
            .title("Inventory Manager")
            .borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_lines(&self, frame: &mut Frame, area: Rect, title: &str, lines: &[String]) {
        let body: Vec<Line> = lines.iter().map(|line| Line::from(line.clone())).collect();
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(
            Paragraph::new(body).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::Viewing(_)) => key_hints(&[("Enter", "Look up"), ("Esc", "Cancel")]),
            (_, Mode::Adding(_)) => key_hints(&[
                ("Tab", "Next field"),
                ("Enter", "Save"),
                ("Esc", "Cancel"),
            ]),
            (Screen::Menu, Mode::Normal) => key_hints(&[
                ("v", "View"),
                ("n", "New"),
                ("a", "Analyze"),
                ("b", "Backup"),
                ("q", "Quit"),
            ]),
            (_, Mode::Normal) => key_hints(&[
                ("Esc", "Menu"),
                ("v", "View"),
                ("n", "New"),
                ("a", "Analyze"),
                ("b", "Backup"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_lookup_form(&self, frame: &mut Frame, area: Rect, form: &LookupForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("View Product").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let prefix = "Product ID: ";
        let mut lines = vec![Line::from(format!("{prefix}{}", form.id)), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + prefix.len() as u16 + form.id.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_product_form(&self, frame: &mut Frame, area: Rect, form: &ProductForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("New Product").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ProductField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (dx, dy) = form.cursor_offset();
        frame.set_cursor_position((inner.x + dx, inner.y + dy));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
