use crate::application::{App, CategoryState, Completion, Dialog};
use crate::domain::{
    AMOUNT_MAX, AMOUNT_MIN, Field, Step, TERM_MAX, TERM_MIN, path_for_step,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SLIDER_WIDTH: usize = 20;

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_form(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    if let Dialog::Shown(completion) = &app.dialog {
        render_completion_popup(f, completion);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "loan-wizard | Step {}/3: {} | {}",
        app.step.number(),
        app.step.title(),
        path_for_step(app.step)
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    let focused = app.focused_field();

    for field in app.step.fields() {
        let is_focused = *field == focused;
        let marker = if is_focused { "> " } else { "  " };
        let label_style = if is_focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(field_label(app, *field), label_style),
        ]));
        lines.push(Line::from(vec![Span::raw("    "), field_value(app, *field, is_focused)]));
        if let Some(message) = app.errors.get(*field) {
            lines.push(Line::from(Span::styled(
                format!("    {message}"),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(""));
    }

    if let Some(message) = &app.form_error {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        action_hint(app),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(app.step.title()))
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn field_label(app: &App, field: Field) -> String {
    match field {
        Field::Amount => format!("{} - {}$", field.label(), app.loan.amount),
        Field::Term => format!("{} - {} days", field.label(), app.loan.term),
        _ => field.label().to_string(),
    }
}

fn field_value(app: &App, field: Field, focused: bool) -> Span<'static> {
    let text = match field {
        Field::Phone => app.personal.phone.clone(),
        Field::FirstName => app.personal.first_name.clone(),
        Field::LastName => app.personal.last_name.clone(),
        Field::Gender => app
            .personal
            .gender
            .map(|g| format!("< {g} >"))
            .unwrap_or_default(),
        Field::Workplace => return workplace_value(app, focused),
        Field::Address => app.address.address.clone(),
        Field::Amount => slider(&app.loan.amount, AMOUNT_MIN, AMOUNT_MAX),
        Field::Term => slider(&app.loan.term, TERM_MIN, TERM_MAX),
    };

    if text.is_empty() {
        Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray))
    } else if focused && !field.is_choice() && !field.is_slider() {
        Span::styled(format!("{text}_"), Style::default().fg(Color::Green))
    } else {
        Span::styled(text, Style::default().fg(Color::Green))
    }
}

fn workplace_value(app: &App, focused: bool) -> Span<'static> {
    match &app.categories {
        CategoryState::Loading => {
            Span::styled("Loading categories...", Style::default().fg(Color::DarkGray))
        }
        CategoryState::Failed(_) => Span::styled(
            "Error loading categories. Ctrl+R: retry",
            Style::default().fg(Color::Red),
        ),
        CategoryState::Ready(names) => {
            if app.address.workplace.is_empty() {
                let hint = if focused {
                    format!("{} (←/→, {} available)", Field::Workplace.placeholder(), names.len())
                } else {
                    Field::Workplace.placeholder().to_string()
                };
                Span::styled(hint, Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(
                    format!("< {} >", app.address.workplace),
                    Style::default().fg(Color::Green),
                )
            }
        }
    }
}

/// Renders `raw` as a bar between `min` and `max`, e.g. `[#####---------------]`.
fn slider(raw: &str, min: u32, max: u32) -> String {
    let value = raw.trim().parse::<u32>().unwrap_or(min).clamp(min, max);
    let filled = ((value - min) as usize * SLIDER_WIDTH) / (max - min) as usize;
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(SLIDER_WIDTH - filled),
        raw
    )
}

fn action_hint(app: &App) -> String {
    match app.step {
        Step::Personal => "[Enter] Next".to_string(),
        Step::Address => "[Esc] Back   [Enter] Next".to_string(),
        Step::Loan if app.is_submitting() => "[Esc] Back   Submitting...".to_string(),
        Step::Loan => "[Esc] Back   [Enter] Submit Application".to_string(),
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.status_message {
        Some(status) => status.clone(),
        None => "Tab/↑↓: move | ←/→: choose/adjust | Enter: next | Esc: back | Ctrl+Q: quit"
            .to_string(),
    };
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

fn render_completion_popup(f: &mut Frame, completion: &Completion) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 6,
        y: area.height / 4,
        width: area.width * 2 / 3,
        height: area.height / 2,
    };

    f.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from(completion.message()), Line::from("")];
    if let Some(reference) = completion.reference() {
        lines.push(Line::from(format!("Reference #{reference}")));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "[Enter] Start New Application   [Esc] Close",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Application Submitted Successfully!")
                .style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(popup, popup_area);
}
