use crate::db::Valuation;
use crate::offer::format_currency;
use crate::vehicle::Condition;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_SIZE: usize = 20;

pub struct App {
    pub valuations: Vec<Valuation>,
    pub filtered: Vec<Valuation>,
    pub state: TableState,
    pub total_count: i64,
    pub show_detail: bool,
    pub condition_filter: Option<Condition>,
}

impl App {
    pub fn new(valuations: Vec<Valuation>, total_count: i64) -> Self {
        let mut state = TableState::default();
        if !valuations.is_empty() {
            state.select(Some(0));
        }

        let filtered = valuations.clone();

        Self {
            valuations,
            filtered,
            state,
            total_count,
            show_detail: false,
            condition_filter: None,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_valuation(&self) -> Option<&Valuation> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    /// Show only valuations priced with `condition`; `None` shows everything
    pub fn filter_by_condition(&mut self, condition: Option<Condition>) {
        self.filtered = match &condition {
            Some(wanted) => self
                .valuations
                .iter()
                .filter(|v| &v.condition == wanted)
                .cloned()
                .collect(),
            None => self.valuations.clone(),
        };
        self.condition_filter = condition;

        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + PAGE_SIZE).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(PAGE_SIZE)).unwrap_or(0);
        self.state.select(Some(i));
    }

    pub fn last(&mut self) {
        if !self.filtered.is_empty() {
            self.state.select(Some(self.filtered.len() - 1));
        }
    }

    pub fn stats(&self) -> OfferStats {
        let mut stats = OfferStats::default();

        for valuation in &self.valuations {
            stats.total_offered += valuation.final_offer;
            if valuation.condition == Condition::NonDrivable {
                stats.non_drivable_count += 1;
            }
        }

        if !self.valuations.is_empty() {
            stats.average_offer = stats.total_offered as f64 / self.valuations.len() as f64;
        }

        stats
    }
}

#[derive(Debug, Default)]
pub struct OfferStats {
    pub total_offered: i64,
    pub average_offer: f64,
    pub non_drivable_count: usize,
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Char(c @ '1'..='5') => {
                    let index = c as usize - '1' as usize;
                    app.filter_by_condition(Some(Condition::ALL[index].clone()));
                }
                KeyCode::Char('0') | KeyCode::Char('c') => app.filter_by_condition(None),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(0));
                    }
                }
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Valuations
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let spans = vec![
        Span::styled(
            "Car Valuations",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(format!("Total: {}", app.total_count), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(
            format!("Avg offer: {}", format_currency(stats.average_offer)),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Non-drivable: {}", stats.non_drivable_count),
            Style::default().fg(Color::Red),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn condition_color(condition: &Condition) -> Color {
    match condition {
        Condition::Great => Color::Green,
        Condition::Good => Color::Cyan,
        Condition::Fair => Color::Yellow,
        Condition::Bad => Color::LightRed,
        Condition::NonDrivable => Color::Red,
        Condition::Unrecognized(_) => Color::White,
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Make", "Model", "Year", "Mileage", "Condition", "Final Offer"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|v| {
        let color = condition_color(&v.condition);

        Row::new(vec![
            Cell::from(v.id.to_string()),
            Cell::from(truncate(&v.make, 14)),
            Cell::from(truncate(&v.model, 18)),
            Cell::from(v.year.to_string()),
            Cell::from(v.mileage.to_string()),
            Cell::from(v.condition.to_string()).style(Style::default().fg(color)),
            Cell::from(format_currency(v.final_offer as f64)).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let title = match &app.condition_filter {
        Some(condition) => format!(" Valuations ({}) ", condition),
        None => " Valuations ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(16),
            Constraint::Length(20),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.filtered.len();

    let key = Style::default().fg(Color::Yellow);
    let status_spans = vec![
        Span::styled(format!(" Row: {}/{} ", selected, total), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::styled("Enter", key),
        Span::raw(" Breakdown | "),
        Span::styled("1-5", key),
        Span::raw(" Condition | "),
        Span::styled("0", key),
        Span::raw(" All | "),
        Span::styled("↑/↓", key),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn amount_line(label: &str, amount: i64) -> Line<'static> {
    let color = if amount < 0 { Color::Red } else { Color::Green };
    Line::from(vec![
        Span::styled(
            format!("  {:<22}", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format_currency(amount as f64), Style::default().fg(color)),
    ])
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Offer Breakdown ");

    let Some(v) = app.selected_valuation() else {
        f.render_widget(Paragraph::new("No valuation selected").block(block), area);
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {} {} {}", v.year, v.make, v.model),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!("  {} miles, ", v.mileage)),
            Span::styled(v.condition.to_string(), Style::default().fg(condition_color(&v.condition))),
        ]),
    ];

    if !v.catalytic_converter {
        content.push(Line::from(Span::styled(
            "  No catalytic converter",
            Style::default().fg(Color::Red),
        )));
    }

    content.extend([
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        amount_line("Market Value:", v.market_value),
        amount_line("Initial Offer:", v.initial_offer),
        amount_line("Mileage Adjustment:", v.mileage_adjustment),
        amount_line("Condition Adjustment:", v.condition_adjustment),
        Line::from("  ─────────────────────────────────────"),
        amount_line("Final Offer:", v.final_offer),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Created: ", Style::default().fg(Color::Cyan)),
            Span::raw(v.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ]);

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
