use super::state::{Control, DashboardAction, DashboardState, Focus, FormField};
use super::view::{
    DashboardView, NoticeKind, PIE_PALETTE_LEN, PieSlice, category_choices, render,
};
use crate::errors::{ExpenseError, Result};
use crate::models::budget::Budget;
use crate::operations::aggregate::BudgetStatus;
use crate::operations::format::DisplayConfig;
use crate::store::LedgerStore;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    layout::Flex,
    prelude::{Alignment, Color, Constraint, Direction, Layout, Modifier, Rect, Style},
    text::{Line, Span},
    widgets::canvas::{Canvas, Points},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};
use std::io;
use tracing::{info, warn};

const PIE_PALETTE: [Color; PIE_PALETTE_LEN] = [
    Color::Rgb(0xFF, 0x6B, 0x6B),
    Color::Rgb(0x4E, 0xCD, 0xC4),
    Color::Rgb(0x45, 0xB7, 0xD1),
    Color::Rgb(0x96, 0xCE, 0xB4),
    Color::Rgb(0xFF, 0xEA, 0xA7),
];

const SIDEBAR_WIDTH: u16 = 34;

fn terminal_err(context: &str) -> impl Fn(io::Error) -> ExpenseError + '_ {
    move |e| ExpenseError::Terminal(format!("{}: {}", context, e))
}

/// Runs the interactive dashboard until the user quits.
pub fn run_dashboard(store: &LedgerStore, budget: Budget, config: &DisplayConfig) -> Result<()> {
    let mut state = DashboardState::load(store, budget, Local::now().date_naive())?;
    info!(
        path = %store.path().display(),
        exists = store.exists(),
        records = state.records.len(),
        "starting dashboard"
    );

    let _guard = TerminalGuard::enter()?;
    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let mut terminal =
        ratatui::Terminal::new(backend).map_err(terminal_err("Failed to initialize terminal"))?;

    loop {
        let view = render(&state, config)?;
        terminal
            .draw(|frame| draw(frame, &view))
            .map_err(terminal_err("Failed to draw terminal UI"))?;

        let Event::Key(key) = event::read().map_err(terminal_err("Failed to read input"))? else {
            continue;
        };
        let Some(action) = action_for_key(state.focus, key) else {
            continue;
        };
        if state.apply(store, action, Local::now().date_naive())? == Control::Quit {
            break;
        }
    }

    Ok(())
}

/// Raw mode plus alternate screen while alive; restored on drop, unwinding included.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().map_err(terminal_err("Failed to enable raw mode"))?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)
            .map_err(terminal_err("Failed to enter alternate screen"))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to disable raw mode");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
            warn!(error = %e, "failed to leave alternate screen");
        }
    }
}

/// Maps a key press to a dashboard action for the focused area.
pub fn action_for_key(focus: Focus, key: KeyEvent) -> Option<DashboardAction> {
    // Key-up events would double every keystroke on terminals that report them.
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(DashboardAction::Quit);
    }

    match focus {
        Focus::Overview => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(DashboardAction::Quit),
            KeyCode::Char('a') => Some(DashboardAction::FocusForm),
            KeyCode::Char('b') => Some(DashboardAction::FocusBudget),
            KeyCode::Char('x') => Some(DashboardAction::RequestClear),
            _ => None,
        },
        Focus::Form(field) => match key.code {
            KeyCode::Esc => Some(DashboardAction::Cancel),
            KeyCode::Enter => Some(DashboardAction::Submit),
            KeyCode::Tab | KeyCode::Down => Some(DashboardAction::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(DashboardAction::PreviousField),
            KeyCode::Right if field == FormField::Category => Some(DashboardAction::NextCategory),
            KeyCode::Left if field == FormField::Category => {
                Some(DashboardAction::PreviousCategory)
            }
            KeyCode::Backspace => Some(DashboardAction::Backspace),
            KeyCode::Char(ch) => Some(DashboardAction::Input(ch)),
            _ => None,
        },
        Focus::Budget => match key.code {
            KeyCode::Esc => Some(DashboardAction::Cancel),
            KeyCode::Enter => Some(DashboardAction::Submit),
            KeyCode::Backspace => Some(DashboardAction::Backspace),
            KeyCode::Char(ch) => Some(DashboardAction::Input(ch)),
            _ => None,
        },
        Focus::ConfirmClear => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(DashboardAction::ConfirmClear),
            KeyCode::Char('n') | KeyCode::Esc => Some(DashboardAction::Cancel),
            _ => None,
        },
    }
}

fn draw(frame: &mut ratatui::Frame, view: &DashboardView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
        .split(frame.area());

    render_sidebar(frame, columns[0], view);

    let has_charts = !view.category_summary.is_empty();
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(5),
    ];
    if has_charts {
        constraints.push(Constraint::Percentage(45));
    }
    constraints.push(Constraint::Length(3));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(columns[1]);

    render_header(frame, rows[0], view);
    render_cards(frame, rows[1], view);
    render_expense_table(frame, rows[2], view);
    if has_charts {
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[3]);
        render_pie_chart(frame, bottom[0], view);
        render_category_table(frame, bottom[1], view);
    }
    render_footer(frame, rows[rows.len() - 1], view);

    if view.confirm_clear {
        render_confirm_modal(frame, frame.area());
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let line = Line::from(vec![
        Span::styled(view.title, bold().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(view.tagline, Style::default().fg(Color::White)),
    ]);
    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn render_cards(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let constraints = vec![Constraint::Ratio(1, view.cards.len().max(1) as u32); view.cards.len()];
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, slot) in view.cards.iter().zip(slots.iter()) {
        let mut lines = vec![Line::from(Span::styled(card.value.clone(), bold()))];
        if let Some(status) = card.status {
            let color = match status {
                BudgetStatus::OnTrack => Color::Green,
                BudgetStatus::OverBudget => Color::Red,
            };
            lines.push(Line::from(Span::styled(
                status.label(),
                Style::default().fg(color),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title(card.title).borders(Borders::ALL));
        frame.render_widget(paragraph, *slot);
    }
}

fn render_expense_table(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let block = Block::default().title("All Expenses").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(message) = view.empty_message {
        let empty = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, inner);
        return;
    }

    let header = Row::new([
        Cell::from("Date").style(bold()),
        Cell::from("Category").style(bold()),
        Cell::from("Amount").style(bold()),
    ])
    .style(Style::default().fg(Color::White));

    // Newest entries stay visible when the table overflows.
    let capacity = inner.height.saturating_sub(1) as usize;
    let skip = view.expenses.len().saturating_sub(capacity);
    let rows = view.expenses.iter().skip(skip).map(|row| {
        Row::new([
            Cell::from(row.date.clone()),
            Cell::from(row.category.clone()),
            Cell::from(row.amount.clone()),
        ])
    });

    let widths = [
        Constraint::Length(12),
        Constraint::Percentage(40),
        Constraint::Length(18),
    ];
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    frame.render_widget(table, inner);
}

fn render_pie_chart(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let block = Block::default()
        .title("Spending by Category")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.pie.is_empty() {
        let empty = Paragraph::new("Nothing to chart").alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for slice in &view.pie {
                let points = slice_points(slice);
                if !points.is_empty() {
                    ctx.draw(&Points {
                        coords: &points,
                        color: PIE_PALETTE[slice.color_index % PIE_PALETTE.len()],
                    });
                }
            }
        });
    frame.render_widget(canvas, halves[0]);

    let legend: Vec<Line> = view
        .pie
        .iter()
        .map(|slice| {
            let color = PIE_PALETTE[slice.color_index % PIE_PALETTE.len()];
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::raw(format!("{} {}", slice.category, slice.label)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(legend), halves[1]);
}

const PIE_RINGS: usize = 25;
const PIE_ANGLE_STEP: f64 = 0.05;

/// Fills a slice with points on concentric rings of the unit circle.
fn slice_points(slice: &PieSlice) -> Vec<(f64, f64)> {
    let steps = (slice.sweep / PIE_ANGLE_STEP).ceil().max(0.0) as usize;
    (0..=PIE_RINGS)
        .flat_map(|ring| {
            let radius = ring as f64 / PIE_RINGS as f64;
            (0..=steps).map(move |i| {
                let angle = slice.start_angle + (i as f64 * PIE_ANGLE_STEP).min(slice.sweep);
                (radius * angle.cos(), radius * angle.sin())
            })
        })
        .collect()
}

fn render_category_table(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let block = Block::default()
        .title("Category-wise Summary")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header = Row::new([
        Cell::from("Category").style(bold()),
        Cell::from("Total Spent").style(bold()),
    ]);
    let rows = view.category_summary.iter().map(|row| {
        Row::new([
            Cell::from(row.category.clone()),
            Cell::from(row.total.clone()),
        ])
    });
    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(header)
        .column_spacing(1);
    frame.render_widget(table, inner);
}

fn render_sidebar(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Min(3),
        ])
        .split(area);

    let budget_line = match &view.budget_input {
        Some(input) => Line::from(Span::styled(
            format!("> {}", input),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(view.cards[0].value.clone()),
    };
    let budget = Paragraph::new(vec![budget_line, Line::from("b to edit")])
        .block(Block::default().title("Monthly Budget").borders(Borders::ALL));
    frame.render_widget(budget, sections[0]);

    let mut lines = Vec::new();
    for field in &view.form {
        let style = if field.focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:9}", field.label), bold()),
            Span::styled(field.value.clone(), style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        category_choices().join(" · "),
        Style::default().fg(Color::DarkGray),
    )));
    let border_style = if view.form_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Add New Expense (a)")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(form, sections[1]);

    let notice_lines = match &view.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            vec![Line::from(Span::styled(
                notice.message.clone(),
                Style::default().fg(color),
            ))]
        }
        None => Vec::new(),
    };
    let notice = Paragraph::new(notice_lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(notice, sections[2]);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let hint = if view.can_clear {
        view.hint.to_string()
    } else {
        view.hint.replace("  x clear all", "")
    };
    frame.render_widget(
        Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_confirm_modal(frame: &mut ratatui::Frame, area: Rect) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(Span::styled("Clear All Expenses", bold().fg(Color::Red))),
        Line::from(""),
        Line::from("This deletes the expense file. y/Enter to confirm, n/Esc to cancel."),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Confirm"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [band] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(band);
    popup
}
