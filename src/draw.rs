use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::calendar::{DayView, ListView, MonthView, WeekView, YearView};
use crate::state::app_state::Banner;
use crate::state::calendar::Projection;
use crate::state::dialogs::{Dialog, DialogState, GameField, GameForm, ResultsField, ResultsForm};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::schedule::ScheduleState;
use crate::ui::layout::LayoutAreas;

const HELP_LINES: [(&str, &str); 16] = [
    ("d w m y L", "day / week / month / year / list view"),
    ("[ ]", "previous / next period"),
    ("arrows hjkl", "move the cursor"),
    ("Tab S-Tab", "next / previous game"),
    ("Enter", "drill into the cell, or edit the game in day view"),
    ("t", "jump to today"),
    ("f F", "cycle league / team filter"),
    ("c", "clear filters"),
    ("n", "new game"),
    ("e", "edit selected game"),
    ("x", "delete selected game"),
    ("s", "enter results for selected game"),
    ("R", "reload"),
    ("o", "log out"),
    ("z \"", "full screen / log pane"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Schedule => draw_schedule(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        if app.state.dialog.is_open() {
            draw_dialog(f, layout.main, app);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = Projection::ALL.iter().map(|p| Line::from(p.label())).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(app.state.schedule.projection.index())
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_schedule(f: &mut Frame, area: Rect, app: &App) {
    let schedule = &app.state.schedule;
    let title = match &schedule.season {
        Some(season) => format!(" {} Season | {} ", season.name, schedule.window().title()),
        None => " Schedule ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if schedule.season.is_none() {
        let msg = match app.state.last_error() {
            Some(err) => format!("Schedule load failed:\n{err}\n\nPress R to retry"),
            None => "Loading schedule...".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let [header, banner, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    draw_filter_header(f, header, app);
    draw_banner(f, banner, app.state.banner.as_ref());

    let mut calendar_area = content;
    let mut detail_area: Option<Rect> = None;
    if content.width >= 110 {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(content);
        calendar_area = left;
        detail_area = Some(right);
    } else if content.height >= 24 {
        let [top, bottom] = Layout::vertical([Constraint::Fill(1), Constraint::Length(8)]).areas(content);
        calendar_area = top;
        detail_area = Some(bottom);
    }

    let today = schedule.zone.today();
    match schedule.projection {
        Projection::Day => f.render_widget(DayView { schedule }, calendar_area),
        Projection::Week => f.render_widget(WeekView { schedule, today }, calendar_area),
        Projection::Month => f.render_widget(MonthView { schedule, today }, calendar_area),
        Projection::Year => f.render_widget(YearView { schedule, today }, calendar_area),
        Projection::List => f.render_widget(ListView { schedule }, calendar_area),
    }

    if let Some(detail) = detail_area {
        draw_game_detail(f, detail, schedule);
    }
}

fn draw_filter_header(f: &mut Frame, area: Rect, app: &App) {
    let schedule = &app.state.schedule;
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled("League: ", dim),
        Span::raw(schedule.filter.league_label(&schedule.leagues)),
        Span::styled("  Team: ", dim),
        Span::raw(schedule.filter.team_label(&schedule.leagues)),
        Span::styled(format!("  {} games", schedule.filtered_games().len()), dim),
    ];
    let who = if app.state.session.can_edit_schedule() {
        Span::styled("  editor", Style::default().fg(Color::Green))
    } else if app.state.session.is_authenticated() {
        Span::styled("  viewer", dim)
    } else {
        Span::styled("  not logged in", dim)
    };
    spans.push(who);
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_banner(f: &mut Frame, area: Rect, banner: Option<&Banner>) {
    let Some(banner) = banner else {
        return;
    };
    let style = if banner.is_error() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    f.render_widget(Paragraph::new(banner.text()).style(style), area);
}

fn draw_game_detail(f: &mut Frame, area: Rect, schedule: &ScheduleState) {
    let block = default_border(Color::DarkGray).title(" Game ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(game) = schedule.selected() else {
        let msg = match schedule.projection {
            Projection::Year => "Press Enter to open a month",
            _ => "No game selected",
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let local = schedule.zone.naive(game.game_date);
    let mut lines = vec![
        Line::from(Span::styled(schedule.matchup(game), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(vec![Span::styled("When    ", label), Span::raw(local.format("%a %b %-d %Y, %H:%M").to_string())]),
        Line::from(vec![Span::styled("Status  ", label), Span::raw(game.status.label())]),
    ];
    if let Some((visitor, home)) = game.score() {
        lines.push(Line::from(vec![Span::styled("Score   ", label), Span::raw(format!("{visitor} - {home}"))]));
    }
    lines.push(Line::from(vec![Span::styled("League  ", label), Span::raw(game.league.name.clone())]));
    lines.push(Line::from(vec![Span::styled("Type    ", label), Span::raw(game.game_type.label())]));
    if let Some(field) = game.field.as_ref() {
        let full = schedule.fields.iter().find(|f| f.id == field.id);
        let mut text = full.map(|f| f.name.clone()).unwrap_or_else(|| field.name.clone());
        if let Some(address) = full.map(|f| [f.address.as_str(), f.city.as_str()]) {
            let address: Vec<&str> = address.into_iter().filter(|s| !s.is_empty()).collect();
            if !address.is_empty() {
                text = format!("{text}, {}", address.join(", "));
            }
        }
        lines.push(Line::from(vec![Span::styled("Field   ", label), Span::raw(text)]));
    }
    if !game.umpire_ids.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Umpires ", label),
            Span::raw(game.umpire_ids.len().to_string()),
        ]));
    }
    if !game.comment.is_empty() {
        lines.push(Line::from(vec![Span::styled("Note    ", label), Span::raw(game.comment.clone())]));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let key = Style::default().fg(Color::Yellow);
    let mut lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, what)| Line::from(vec![Span::styled(format!("{keys:>12}  "), key), Span::raw(*what)]))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "In dialogs: Tab/arrows move, Left/Right change a choice, Space toggles, Enter saves, Esc cancels.",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_dialog(f: &mut Frame, area: Rect, app: &App) {
    let schedule = &app.state.schedule;
    let (title, mut lines, submitting) = match &app.state.dialog {
        Dialog::Closed => return,
        Dialog::Game(state) => {
            let title = if state.form().is_edit() { " Edit Game " } else { " New Game " };
            (title, game_form_lines(state.form(), schedule), state.is_submitting())
        }
        Dialog::Delete(state) => {
            let lines = vec![
                Line::from("Delete this game?"),
                Line::from(""),
                Line::from(Span::styled(state.form().summary.clone(), Style::default().add_modifier(Modifier::BOLD))),
            ];
            (" Delete Game ", lines, state.is_submitting())
        }
        Dialog::Results(state) => (" Enter Results ", results_form_lines(state.form()), state.is_submitting()),
    };

    lines.push(Line::from(""));
    if let Some(message) = app.state.dialog.message() {
        lines.push(Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))));
    }
    let footer = if submitting {
        "Saving..."
    } else if matches!(app.state.dialog, Dialog::Delete(_)) {
        "Enter=delete  Esc=cancel"
    } else {
        "Enter=save  Esc=cancel  Tab=next field  Left/Right=choose"
    };
    lines.push(Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))));

    let height = lines.len() as u16 + 2;
    let popup = centered(area, 64, height);
    f.render_widget(Clear, popup);
    let border = if dialog_failed(&app.state.dialog) { Color::Red } else { Color::Yellow };
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(default_border(border).title(title)),
        popup,
    );
}

fn dialog_failed(dialog: &Dialog) -> bool {
    matches!(
        dialog,
        Dialog::Game(DialogState::Failed { .. })
            | Dialog::Delete(DialogState::Failed { .. })
            | Dialog::Results(DialogState::Failed { .. })
    )
}

fn field_line<'a>(label: &str, value: String, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{label:>17}  "), Style::default().fg(Color::DarkGray)),
        Span::styled(value, value_style),
    ])
}

fn game_form_lines<'a>(form: &GameForm, schedule: &ScheduleState) -> Vec<Line<'a>> {
    let team = |id: &Option<String>| {
        id.as_deref()
            .map(|id| schedule.team_name(id))
            .unwrap_or_else(|| "(choose)".to_string())
    };
    form.fields()
        .map(|field| {
            let value = match field {
                GameField::League => form
                    .league(&schedule.leagues)
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| "(choose)".to_string()),
                GameField::Date => form.date.clone(),
                GameField::Time => form.time.clone(),
                GameField::Home => team(&form.home_team_id),
                GameField::Visitor => team(&form.visitor_team_id),
                GameField::Field => form
                    .field_id
                    .as_deref()
                    .and_then(|id| schedule.fields.iter().find(|f| f.id == id))
                    .map(|f| f.label().to_string())
                    .unwrap_or_else(|| "(none)".to_string()),
                GameField::GameType => form.game_type.label().to_string(),
                GameField::Comment => form.comment.clone(),
            };
            field_line(field.label(), value, field == form.focus)
        })
        .collect()
}

fn results_form_lines<'a>(form: &ResultsForm) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(form.matchup.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    lines.extend(ResultsField::ORDER.iter().map(|field| {
        let value = match field {
            ResultsField::VisitorScore => form.visitor_score.clone(),
            ResultsField::HomeScore => form.home_score.clone(),
            ResultsField::Status => form.status.label().to_string(),
            other => match form.flag(*other) {
                Some(true) => "[x]".to_string(),
                _ => "[ ]".to_string(),
            },
        };
        field_line(field.label(), value, *field == form.focus)
    }));
    lines
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
