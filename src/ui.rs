use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;

use keyfall::curve::GameVariant;
use keyfall::field::{Target, TargetState};
use keyfall::session::GamePhase;

use crate::{App, Screen};

const FIELD_TOP_PAD: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Playing => render_playing(self, area, buf),
            Screen::Results => render_results(self, area, buf),
            Screen::History => render_history(self, area, buf),
        }
    }
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    render_hud(app, chunks[0], buf);
    render_field(app, chunks[1], buf);
    render_input_line(app, chunks[2], buf);

    if app.session.phase() == GamePhase::Paused {
        let pause = Paragraph::new(Span::styled(
            "PAUSED - tab to resume",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        let y = chunks[1].y + chunks[1].height / 2;
        pause.render(Rect::new(chunks[1].x, y, chunks[1].width, 1), buf);
    }
}

fn render_hud(app: &App, area: Rect, buf: &mut Buffer) {
    let state = app.session.state();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut spans = vec![
        Span::styled(format!(" {} pts ", state.score), bold),
        Span::styled(format!(" combo x{} ", state.combo), bold.fg(Color::Magenta)),
    ];

    if app.session.variant() == GameVariant::Blockstack {
        let fill = app.session.fill_percent();
        let color = match fill {
            0..=49 => Color::Green,
            50..=79 => Color::Yellow,
            _ => Color::Red,
        };
        spans.push(Span::styled(format!(" fill {}% ", fill), bold.fg(color)));
    } else {
        let hearts = "\u{2665}".repeat(state.lives as usize);
        let lost = "\u{2661}".repeat((state.max_lives - state.lives) as usize);
        spans.push(Span::styled(format!(" {hearts}"), bold.fg(Color::Red)));
        spans.push(Span::styled(format!("{lost} "), dim));
    }

    spans.push(Span::styled(
        format!(" {:>4.0}s ", state.elapsed_seconds()),
        dim,
    ));
    spans.push(Span::styled(
        format!(" {} / {} ", app.session.variant().title(), app.session.tier()),
        dim,
    ));

    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn render_field(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height <= FIELD_TOP_PAD || inner.width == 0 {
        return;
    }

    let rising = app.session.variant() == GameVariant::Balloons;
    let input = app.session.input().to_lowercase();

    // draw near-exit targets last so they stay visible on overlap
    for target in app
        .session
        .targets()
        .iter()
        .sorted_by(|a, b| a.position.partial_cmp(&b.position).unwrap())
    {
        draw_target(target, inner, buf, rising, &input);
    }
}

fn draw_target(target: &Target, inner: Rect, buf: &mut Buffer, rising: bool, input: &str) {
    let rows = (inner.height - FIELD_TOP_PAD) as f64;
    let progress = target.position.clamp(0.0, 1.0);
    let offset = (progress * (rows - 1.0)).round() as u16;
    let y = if rising {
        inner.y + inner.height - 1 - offset
    } else {
        inner.y + FIELD_TOP_PAD + offset
    };

    let width = target.word.width() as u16;
    let max_x = inner.width.saturating_sub(width) as f64;
    let x = inner.x + (target.lane * max_x) as u16;

    let style = match target.state {
        TargetState::Matched => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TargetState::Expired => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::DIM),
        TargetState::Falling => {
            if !input.is_empty() && target.word.to_lowercase().starts_with(input) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        }
    };

    buf.set_string(x, y, &target.word, style);
}

fn render_input_line(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" type a word, tab pauses, esc quits ");
    let inner = block.inner(area);
    block.render(area, buf);

    let line = Line::from(vec![
        Span::styled("> ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            app.session.input().to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    Paragraph::new(line).render(inner, buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let state = app.session.state();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} - game over", app.session.variant().title()),
            bold.fg(Color::Red),
        )),
        Line::default(),
        Line::from(Span::styled(format!("score      {}", state.score), bold)),
        Line::from(Span::raw(format!("words      {}", state.words_typed))),
        Line::from(Span::raw(format!("accuracy   {}%", state.accuracy()))),
        Line::from(Span::raw(format!("max combo  x{}", state.max_combo))),
        Line::from(Span::raw(format!(
            "survived   {:.0}s on {}",
            state.elapsed_seconds(),
            app.session.tier()
        ))),
    ];

    if let Some(best) = app.best_score {
        let note = if state.score >= best {
            Span::styled("new personal best!", bold.fg(Color::Green))
        } else {
            Span::styled(format!("personal best {best}"), dim)
        };
        lines.push(Line::default());
        lines.push(Line::from(note));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(r)etry / (h)istory / (t)weet / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    )));

    centered(lines, area, buf);
}

fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled("recent sessions", bold)),
        Line::default(),
    ];

    if app.history.is_empty() {
        lines.push(Line::from(Span::styled("nothing here yet", dim)));
    }

    for entry in &app.history {
        let ago = (chrono::Local::now() - entry.timestamp).num_seconds();
        lines.push(Line::from(vec![
            Span::styled(format!("{:<18}", HumanTime::from(-ago).to_string()), dim),
            Span::raw(format!(
                "{:<11} {:<7} {:>6} pts  {:>3}%  x{}",
                entry.kind, entry.difficulty, entry.score, entry.accuracy, entry.max_combo
            )),
        ]));
    }

    if let Some(totals) = app.totals {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "{} sessions, {} words, {:.0}% average accuracy",
                totals.sessions, totals.words_typed, totals.avg_accuracy
            ),
            dim,
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(b)ack / (r)etry / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    )));

    centered(lines, area, buf);
}

fn centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let chunk = Rect::new(area.x, area.y + top, area.width, height.min(area.height));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunk, buf);
}
