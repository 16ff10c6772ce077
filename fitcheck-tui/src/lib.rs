use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fitcheck_client::Assessor;
use fitcheck_core::submission::{EventReceiver, EventSender, create_event_channel};
use fitcheck_core::{FormState, RequestState, format_response, spawn_submission};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

pub mod markup;

const EXPLANATION: &str = "This tool uses AI to analyse your investment fund's mandate and assess \
whether a company is a good fit. Simply input your investment fund's website and the website of \
the company you're considering. The AI will then take it from here, scouring the internet to \
understand your fund's mandate and company profile to evaluate the fit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    FundLink,
    CompanyLink,
    Submit,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::FundLink => Focus::CompanyLink,
            Focus::CompanyLink => Focus::Submit,
            Focus::Submit => Focus::FundLink,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::FundLink => Focus::Submit,
            Focus::CompanyLink => Focus::FundLink,
            Focus::Submit => Focus::CompanyLink,
        }
    }
}

/// Screen regions from the last draw, used for mouse hit-testing
#[derive(Debug, Default, Clone, Copy)]
struct HitAreas {
    fund_link: Rect,
    company_link: Rect,
    button: Rect,
}

pub struct App {
    form: FormState,
    focus: Focus,
    // Cursor position in chars within the focused field
    cursor_position: usize,
    button_hovered: bool,
    notice: Option<String>,
    scroll_offset: u16,
    should_quit: bool,
    areas: HitAreas,
    assessor: Assessor,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

impl App {
    pub fn new(assessor: Assessor) -> Self {
        let (events_tx, events_rx) = create_event_channel();
        Self {
            form: FormState::new(),
            focus: Focus::FundLink,
            cursor_position: 0,
            button_hovered: false,
            notice: None,
            scroll_offset: 0,
            should_quit: false,
            areas: HitAreas::default(),
            assessor,
            events_tx,
            events_rx,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The button only shows its hover colour while it can be pressed
    pub fn button_highlighted(&self) -> bool {
        !self.form.is_in_flight() && (self.button_hovered || self.focus == Focus::Submit)
    }

    /// Apply everything the running submission has reported so far
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.form.apply(event);
        }
    }

    fn focused_field(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::FundLink => Some(&mut self.form.fund_link),
            Focus::CompanyLink => Some(&mut self.form.company_link),
            Focus::Submit => None,
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.cursor_position = self.focused_field().map_or(0, |field| field.chars().count());
    }

    pub fn submit(&mut self) {
        match self.form.begin_submit() {
            Ok(request) => {
                self.notice = None;
                self.scroll_offset = 0;
                spawn_submission(self.assessor.clone(), request, self.events_tx.clone());
            }
            Err(rejected) => {
                self.notice = Some(rejected.message().to_string());
            }
        }
    }

    /// Write the formatted assessment into `dir` and return the file path
    pub fn save_response(&self, dir: &Path) -> Result<PathBuf> {
        let Some(body) = self.form.response_body() else {
            anyhow::bail!("Nothing to save yet");
        };
        let file_name = format!(
            "fitcheck-assessment-{}.html",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        let path = dir.join(file_name);
        fs::write(&path, format_response(body))?;
        Ok(path)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only process KeyPress events, ignore KeyRelease
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('s') => {
                    self.notice = Some(match self.save_response(Path::new(".")) {
                        Ok(path) => format!("Saved to {}", path.display()),
                        Err(e) => e.to_string(),
                    });
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.set_focus(self.focus.next()),
            KeyCode::BackTab | KeyCode::Up => self.set_focus(self.focus.previous()),
            KeyCode::Enter => self.submit(),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::PageDown => self.scroll_offset = self.scroll_offset.saturating_add(10),
            KeyCode::Char(c) => {
                let cursor = self.cursor_position;
                if let Some(field) = self.focused_field() {
                    let at = byte_offset(field, cursor);
                    field.insert(at, c);
                    self.cursor_position += 1;
                }
            }
            KeyCode::Backspace => {
                let cursor = self.cursor_position;
                if cursor > 0
                    && let Some(field) = self.focused_field()
                {
                    let at = byte_offset(field, cursor - 1);
                    field.remove(at);
                    self.cursor_position -= 1;
                }
            }
            KeyCode::Delete => {
                let cursor = self.cursor_position;
                if let Some(field) = self.focused_field()
                    && cursor < field.chars().count()
                {
                    let at = byte_offset(field, cursor);
                    field.remove(at);
                }
            }
            KeyCode::Left => self.cursor_position = self.cursor_position.saturating_sub(1),
            KeyCode::Right => {
                let cursor = self.cursor_position;
                let len = self.focused_field().map_or(0, |field| field.chars().count());
                self.cursor_position = (cursor + 1).min(len);
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => {
                self.cursor_position = self.focused_field().map_or(0, |field| field.chars().count());
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                self.button_hovered = self.areas.button.contains(position);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.areas.button.contains(position) {
                    self.submit();
                } else if self.areas.fund_link.contains(position) {
                    self.set_focus(Focus::FundLink);
                } else if self.areas.company_link.contains(position) {
                    self.set_focus(Focus::CompanyLink);
                }
            }
            MouseEventKind::ScrollUp => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            MouseEventKind::ScrollDown => self.scroll_offset = self.scroll_offset.saturating_add(1),
            _ => {}
        }
    }
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(offset, _)| offset)
}

/// Run the assessment form (blocking; call from a blocking-capable thread
/// inside a tokio runtime so submissions can be spawned)
pub fn run(assessor: Assessor) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(assessor);

    // Main loop
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

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.process_events();
        terminal.draw(|f| ui(f, app))?;

        // Poll so the progress bar keeps moving without input
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let in_flight = app.form.is_in_flight();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(5), // Explanation
            Constraint::Length(3), // Fund link
            Constraint::Length(3), // Company link
            Constraint::Length(3), // Button
            Constraint::Length(3), // Progress / notice
            Constraint::Min(3),    // Response
            Constraint::Length(1), // Hints
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "Investment Fit Assessment Tool",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let explanation = Paragraph::new(EXPLANATION)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    f.render_widget(explanation, chunks[1]);

    let cursor = |focus| (app.focus == focus).then_some(app.cursor_position);
    render_field(
        f,
        chunks[2],
        " Investment fund website ",
        "Enter investment fund website",
        &app.form.fund_link,
        cursor(Focus::FundLink),
    );
    render_field(
        f,
        chunks[3],
        " Company website ",
        "Enter company website",
        &app.form.company_link,
        cursor(Focus::CompanyLink),
    );

    let (label, button_style) = if in_flight {
        ("Processing...", Style::default().fg(Color::DarkGray))
    } else if app.button_highlighted() {
        (
            "Assess Fit",
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("Assess Fit", Style::default().fg(Color::White).bg(Color::LightBlue))
    };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(button_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(button, chunks[4]);

    if in_flight {
        let progress = app.form.progress();
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Assessing "))
            .gauge_style(Style::default().fg(Color::Blue).bg(Color::DarkGray))
            .ratio(progress.ratio())
            .label(format!("{}%", progress.percent()));
        f.render_widget(gauge, chunks[5]);
    } else if let Some(ref notice) = app.notice {
        let notice = Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(notice, chunks[5]);
    }

    if !in_flight && let Some(body) = app.form.response_body() {
        let border_color = match app.form.request() {
            RequestState::Failed(_) => Color::Red,
            _ => Color::Green,
        };
        let pane = Block::default()
            .borders(Borders::ALL)
            .title(" Assessment ")
            .border_style(Style::default().fg(border_color));
        let inner = pane.inner(chunks[6]);
        let rows = markup::wrap_lines(
            markup::markup_to_lines(&format_response(body)),
            usize::from(inner.width),
        );
        // Stop once the last row sits at the bottom of the pane
        let max_scroll = u16::try_from(rows.len())
            .unwrap_or(u16::MAX)
            .saturating_sub(inner.height);
        app.scroll_offset = app.scroll_offset.min(max_scroll);
        let response = Paragraph::new(rows)
            .block(pane)
            .scroll((app.scroll_offset, 0));
        f.render_widget(response, chunks[6]);
    }

    let hints = Paragraph::new(Line::from(vec![
        Span::styled(" Tab ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Next field  "),
        Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Assess  "),
        Span::styled(" PgUp/PgDn ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Scroll  "),
        Span::styled(" Ctrl+S ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Save  "),
        Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Quit"),
    ]))
    .style(Style::default().bg(Color::Black).fg(Color::Gray));
    f.render_widget(hints, chunks[7]);

    app.areas = HitAreas {
        fund_link: chunks[2],
        company_link: chunks[3],
        button: chunks[4],
    };
}

/// Draw a single-line input. When `cursor` is set the field is focused and
/// the terminal cursor is placed at that char index, scrolling the text
/// sideways so the cursor never leaves the box.
fn render_field(
    f: &mut Frame,
    area: Rect,
    title: &str,
    placeholder: &str,
    value: &str,
    cursor: Option<usize>,
) {
    let border_color = if cursor.is_some() { Color::Cyan } else { Color::DarkGray };
    let content = if value.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(value.to_string(), Style::default().fg(Color::Yellow))
    };

    let column = cursor.map_or(0, |chars| {
        let before = &value[..byte_offset(value, chars)];
        u16::try_from(UnicodeWidthStr::width(before)).unwrap_or(u16::MAX)
    });
    let inner_width = area.width.saturating_sub(2);
    let offset = column.saturating_sub(inner_width.saturating_sub(1));

    let field = Paragraph::new(Line::from(content))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(Style::default().fg(border_color)),
        )
        .scroll((0, offset));
    f.render_widget(field, area);

    if cursor.is_some() {
        f.set_cursor_position((area.x + 1 + (column - offset), area.y + 1));
    }
}
