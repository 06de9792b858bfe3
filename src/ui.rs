use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEventKind,
};
use ratatui::{
    backend::CrosstermBackend, Terminal, Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use tracing::warn;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::keypad::{Button, Session, KEYPAD};
use crate::store::KeyValueStore;

const TICK: Duration = Duration::from_millis(33);

struct Areas {
    header: Rect,
    display: Rect,
    keypad: Rect,
    history: Rect,
}

fn split_screen(size: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(size);
    Areas {
        header: chunks[0],
        display: chunks[1],
        keypad: chunks[2],
        history: chunks[3],
    }
}

/// Screen cells of every keypad button inside `area`.
pub fn keypad_cells(area: Rect) -> Vec<(Rect, Button)> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, KEYPAD.len() as u32); KEYPAD.len()])
        .split(area);
    let mut cells = Vec::new();
    for (row_area, buttons) in rows.iter().zip(KEYPAD) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, buttons.len() as u32); buttons.len()])
            .split(*row_area);
        cells.extend(cols.iter().copied().zip(buttons.iter().copied()));
    }
    cells
}

/// The button under a click at (`column`, `row`), if any.
pub fn keypad_hit(area: Rect, column: u16, row: u16) -> Option<Button> {
    keypad_cells(area)
        .into_iter()
        .find(|(cell, _)| {
            column >= cell.x && column < cell.right() && row >= cell.y && row < cell.bottom()
        })
        .map(|(_, button)| button)
}

/// The rightmost part of `text` that fits in `width` columns.
fn tail_fit(text: &str, width: u16) -> &str {
    let width = width as usize;
    if text.width() <= width {
        return text;
    }
    let mut used = 0;
    let mut start = text.len();
    for (i, ch) in text.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > width {
            break;
        }
        start = i;
    }
    &text[start..]
}

fn button_style(button: Button) -> Style {
    match button {
        Button::Digit(_) | Button::Point => Style::default().fg(Color::White),
        Button::Operator(_) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Button::Equal => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Button::Cancel | Button::CancelEntry => Style::default().fg(Color::Red),
        Button::History => Style::default().fg(Color::Magenta),
    }
}

fn draw<S: KeyValueStore>(f: &mut Frame, session: &Session<S>) {
    let areas = split_screen(f.size());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" 🧮 SoulCalc ", Style::default().fg(Color::Cyan)),
        Span::styled("click the keys · q/esc to quit", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, areas.header);

    // Both buffers verbatim; only the visible tail is clipped.
    let calc = session.calculator();
    let inner = areas.display.width.saturating_sub(2);
    let display = Paragraph::new(vec![
        Line::from(Span::styled(
            tail_fit(calc.committed(), inner).to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            tail_fit(calc.pending(), inner).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(display, areas.display);

    for (cell, button) in keypad_cells(areas.keypad) {
        let key = Paragraph::new(Span::styled(button.label(), button_style(button)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(key, cell);
    }

    let entries = match session.history().entries() {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read history: {e}");
            Vec::new()
        }
    };
    let lines: Vec<Line> = entries
        .into_iter()
        .rev()
        .map(|entry| Line::from(Span::styled(entry, Style::default().fg(Color::Gray))))
        .collect();
    let history = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("history"));
    f.render_widget(history, areas.history);
}

pub fn run_loop<S: KeyValueStore>(session: &mut Session<S>) -> anyhow::Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, session);

    let restored = [
        crossterm::terminal::disable_raw_mode(),
        crossterm::execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            crossterm::terminal::LeaveAlternateScreen
        ),
        terminal.show_cursor(),
    ];
    settle(result, restored)
}

/// Every restore step has already run; the loop's own error wins over a
/// failed restore.
fn settle(
    result: anyhow::Result<()>,
    restored: impl IntoIterator<Item = io::Result<()>>,
) -> anyhow::Result<()> {
    result?;
    for step in restored {
        step?;
    }
    Ok(())
}

fn event_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut Session<S>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| draw(f, session))?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => break,
                _ => {}
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let keypad = split_screen(terminal.size()?).keypad;
                if let Some(button) = keypad_hit(keypad, mouse.column, mouse.row) {
                    if let Err(e) = session.press(button) {
                        warn!(?button, "history store failed: {e}");
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
