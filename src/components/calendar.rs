use chrono::{Datelike, Duration, NaiveDate};
use draco_api::window;
use draco_api::{Game, GameStatus};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::state::calendar::{DayCell, MonthSummary, list_rows, month_grid, week_columns, year_months};
use crate::state::schedule::ScheduleState;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Months per row in the year view.
pub const YEAR_COLUMNS: u16 = 4;

/// Width of a mini month: seven two-digit days plus separators.
const MINI_MONTH_WIDTH: u16 = 20;

/// Title, weekday header and six week rows.
const MINI_MONTH_HEIGHT: u16 = 8;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn status_color(status: GameStatus) -> Color {
    match status {
        GameStatus::Scheduled => Color::White,
        GameStatus::Completed => Color::Green,
        GameStatus::Rainout | GameStatus::Postponed => Color::Yellow,
        GameStatus::Forfeit => Color::Red,
        GameStatus::DidNotReport => Color::Magenta,
    }
}

/// Three-letter team tag for narrow cells.
fn team_tag(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).take(3).collect::<String>().to_uppercase()
}

/// `18:00 MET@CUB 3-2`; the score only once there is one.
pub fn compact_game(schedule: &ScheduleState, game: &Game) -> String {
    let time = schedule.zone.naive(game.game_date).format("%H:%M");
    let visitor = team_tag(&schedule.team_name(&game.visitor_team_id));
    let home = team_tag(&schedule.team_name(&game.home_team_id));
    match game.score() {
        Some((v, h)) => format!("{time} {visitor}@{home} {v}-{h}"),
        None => format!("{time} {visitor}@{home}"),
    }
}

/// Full one-line description used by the day and list views.
pub fn game_line(schedule: &ScheduleState, game: &Game) -> String {
    let time = schedule.zone.naive(game.game_date).format("%H:%M");
    let score = game
        .score()
        .map(|(v, h)| format!(" {v}-{h}"))
        .unwrap_or_default();
    let field = schedule
        .field_label(game)
        .map(|f| format!("  @ {f}"))
        .unwrap_or_default();
    format!(
        "{time}  {:<3} {}{score}  {}{field}",
        game.status.abbrev(),
        schedule.matchup(game),
        game.league.name,
    )
}

fn selection_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default()
    }
}

// ---------------------------------------------------------------------------
// DayView
// ---------------------------------------------------------------------------

/// Games of the anchor day, one per line.
pub struct DayView<'a> {
    pub schedule: &'a ScheduleState,
}

impl<'a> Widget for DayView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let anchor = self.schedule.anchor;
        buf.set_stringn(
            area.x,
            area.y,
            anchor.format("%A, %B %-d, %Y").to_string(),
            area.width as usize,
            Style::default().add_modifier(Modifier::BOLD),
        );

        let games = self.schedule.focus_games();
        if games.is_empty() {
            if area.height > 2 {
                buf.set_stringn(
                    area.x,
                    area.y + 2,
                    "No games scheduled",
                    area.width as usize,
                    Style::default().fg(Color::DarkGray),
                );
            }
            return;
        }

        render_selectable_lines(
            self.schedule,
            &games,
            Rect::new(area.x, area.y + 2, area.width, area.height.saturating_sub(2)),
            buf,
        );
    }
}

/// Scrolls so the selected game stays visible.
fn render_selectable_lines(schedule: &ScheduleState, games: &[&Game], area: Rect, buf: &mut Buffer) {
    let rows = area.height as usize;
    if rows == 0 {
        return;
    }
    let offset = schedule.selected_game.saturating_sub(rows - 1);
    for (row, (idx, game)) in games.iter().enumerate().skip(offset).take(rows).enumerate() {
        let selected = idx == schedule.selected_game;
        let marker = if selected { '>' } else { ' ' };
        let line = format!("{marker} {}", game_line(schedule, game));
        let style = if selected {
            selection_style(true)
        } else {
            Style::default().fg(status_color(game.status))
        };
        buf.set_stringn(area.x, area.y + row as u16, line, area.width as usize, style);
    }
}

// ---------------------------------------------------------------------------
// WeekView
// ---------------------------------------------------------------------------

/// Seven day columns, Sunday first.
pub struct WeekView<'a> {
    pub schedule: &'a ScheduleState,
    pub today: NaiveDate,
}

impl<'a> Widget for WeekView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 14 || area.height < 2 {
            return;
        }
        let filtered = self.schedule.filtered_games();
        let columns = week_columns(&filtered, self.schedule.anchor, self.today, &self.schedule.zone);
        let col_width = area.width / 7;

        for (idx, cell) in columns.iter().enumerate() {
            let x = area.x + idx as u16 * col_width;
            let is_anchor = cell.date == self.schedule.anchor;
            let header = format!("{} {}", WEEKDAYS[idx], cell.date.format("%-m/%-d"));
            buf.set_stringn(x, area.y, header, col_width.saturating_sub(1) as usize, header_style(cell, is_anchor));

            for (row, game) in cell.games.iter().enumerate() {
                let y = area.y + 1 + row as u16;
                if y >= area.y + area.height {
                    break;
                }
                let selected = is_anchor && row == self.schedule.selected_game;
                let style = if selected {
                    selection_style(true)
                } else {
                    Style::default().fg(status_color(game.status))
                };
                buf.set_stringn(
                    x,
                    y,
                    compact_game(self.schedule, game),
                    col_width.saturating_sub(1) as usize,
                    style,
                );
            }
        }
    }
}

fn header_style(cell: &DayCell, is_anchor: bool) -> Style {
    let mut style = Style::default().add_modifier(Modifier::BOLD);
    if !cell.in_period {
        style = style.fg(Color::DarkGray);
    }
    if cell.is_today {
        style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
    }
    if is_anchor {
        style = style.fg(Color::Black).bg(Color::Yellow);
    }
    style
}

// ---------------------------------------------------------------------------
// MonthView
// ---------------------------------------------------------------------------

/// Month grid: a weekday header row then one row per week.
pub struct MonthView<'a> {
    pub schedule: &'a ScheduleState,
    pub today: NaiveDate,
}

impl<'a> Widget for MonthView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 14 || area.height < 3 {
            return;
        }
        let filtered = self.schedule.filtered_games();
        let grid = month_grid(&filtered, self.schedule.anchor, self.today, &self.schedule.zone);
        let col_width = area.width / 7;
        let row_height = (area.height.saturating_sub(1) / grid.len().max(1) as u16).max(1);

        for (idx, day) in WEEKDAYS.iter().enumerate() {
            buf.set_stringn(
                area.x + idx as u16 * col_width,
                area.y,
                *day,
                col_width as usize,
                Style::default().fg(Color::DarkGray),
            );
        }

        for (row_idx, row) in grid.iter().enumerate() {
            let y = area.y + 1 + row_idx as u16 * row_height;
            if y >= area.y + area.height {
                break;
            }
            for (col_idx, cell) in row.iter().enumerate() {
                let x = area.x + col_idx as u16 * col_width;
                let cell_area = Rect::new(x, y, col_width.saturating_sub(1), row_height.min(area.y + area.height - y));
                render_month_cell(self.schedule, cell, cell_area, buf);
            }
        }
    }
}

fn render_month_cell(schedule: &ScheduleState, cell: &DayCell, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let is_anchor = cell.date == schedule.anchor;
    let count = if cell.games.is_empty() {
        String::new()
    } else {
        format!(" ({})", cell.games.len())
    };
    buf.set_stringn(
        area.x,
        area.y,
        format!("{:>2}{count}", cell.date.day()),
        area.width as usize,
        header_style(cell, is_anchor),
    );

    let lines = area.height.saturating_sub(1) as usize;
    if lines == 0 || !cell.in_period {
        return;
    }
    let overflow = cell.games.len() > lines;
    let shown = if overflow { lines - 1 } else { cell.games.len() };
    for (idx, game) in cell.games.iter().take(shown).enumerate() {
        let selected = is_anchor && idx == schedule.selected_game;
        let style = if selected {
            selection_style(true)
        } else {
            Style::default().fg(status_color(game.status))
        };
        buf.set_stringn(
            area.x,
            area.y + 1 + idx as u16,
            compact_game(schedule, game),
            area.width as usize,
            style,
        );
    }
    if overflow {
        buf.set_stringn(
            area.x,
            area.y + 1 + shown as u16,
            format!("+{} more", cell.games.len() - shown),
            area.width as usize,
            Style::default().fg(Color::DarkGray),
        );
    }
}

// ---------------------------------------------------------------------------
// YearView
// ---------------------------------------------------------------------------

/// Twelve months in a 4x3 grid. Days with games are highlighted when there
/// is room for a mini calendar, otherwise only the totals are shown.
pub struct YearView<'a> {
    pub schedule: &'a ScheduleState,
    pub today: NaiveDate,
}

impl<'a> Widget for YearView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < YEAR_COLUMNS * 8 || area.height < 3 {
            return;
        }
        let filtered = self.schedule.filtered_games();
        let months = year_months(&filtered, self.schedule.anchor, &self.schedule.zone);
        let rows = (months.len() as u16).div_ceil(YEAR_COLUMNS);
        let col_width = area.width / YEAR_COLUMNS;
        let row_height = area.height / rows.max(1);

        for (idx, month) in months.iter().enumerate() {
            let x = area.x + (idx as u16 % YEAR_COLUMNS) * col_width;
            let y = area.y + (idx as u16 / YEAR_COLUMNS) * row_height;
            let block = Rect::new(x, y, col_width.saturating_sub(1), row_height);
            self.render_month(month, block, buf);
        }
    }
}

impl<'a> YearView<'a> {
    fn render_month(&self, month: &MonthSummary, area: Rect, buf: &mut Buffer) {
        let anchor = self.schedule.anchor;
        let is_anchor_month = month.first.month() == anchor.month();
        let title_style = if is_anchor_month {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let games = match month.game_count {
            0 => String::new(),
            1 => " 1 game".to_string(),
            n => format!(" {n} games"),
        };
        buf.set_stringn(
            area.x,
            area.y,
            format!("{}{games}", month.first.format("%B")),
            area.width as usize,
            title_style,
        );

        if area.width < MINI_MONTH_WIDTH || area.height < MINI_MONTH_HEIGHT {
            return;
        }

        buf.set_string(area.x, area.y + 1, "Su Mo Tu We Th Fr Sa", Style::default().fg(Color::DarkGray));
        let last = window::end_of_month(month.first);
        let lead = month.first.weekday().num_days_from_sunday() as u16;
        let mut date = month.first;
        while date <= last {
            let slot = lead + date.day0() as u16;
            let x = area.x + (slot % 7) * 3;
            let y = area.y + 2 + slot / 7;
            let mut style = Style::default();
            if month.game_days.contains(&date.day()) {
                style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
            }
            if date == self.today {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if date == anchor {
                style = style.fg(Color::Black).bg(Color::Yellow);
            }
            buf.set_string(x, y, format!("{:>2}", date.day()), style);
            date += Duration::days(1);
        }
    }
}

// ---------------------------------------------------------------------------
// ListView
// ---------------------------------------------------------------------------

/// Every filtered game in the window, grouped under a date heading.
pub struct ListView<'a> {
    pub schedule: &'a ScheduleState,
}

impl<'a> Widget for ListView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let filtered = self.schedule.filtered_games();
        if filtered.is_empty() {
            buf.set_stringn(
                area.x,
                area.y,
                "No games in this period",
                area.width as usize,
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        // Flatten headings and games so selection can be kept on screen.
        let mut lines: Vec<(String, Style)> = Vec::new();
        let mut selected_line = 0;
        let mut game_idx = 0;
        for (date, games) in list_rows(&filtered, &self.schedule.zone) {
            lines.push((
                date.format("%a %b %-d, %Y").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            for game in games {
                let selected = game_idx == self.schedule.selected_game;
                if selected {
                    selected_line = lines.len();
                }
                let style = if selected {
                    selection_style(true)
                } else {
                    Style::default().fg(status_color(game.status))
                };
                lines.push((format!("  {}", game_line(self.schedule, game)), style));
                game_idx += 1;
            }
        }

        let rows = area.height as usize;
        let offset = selected_line.saturating_sub(rows - 1);
        for (row, (text, style)) in lines.into_iter().skip(offset).take(rows).enumerate() {
            buf.set_stringn(area.x, area.y + row as u16, text, area.width as usize, style);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::calendar::{DisplayZone, Projection};
    use chrono::{DateTime, Utc};
    use draco_api::{IdName, LeagueSeason, Season, Team};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule_with(games: Vec<Game>) -> ScheduleState {
        let mut state = ScheduleState::new(ymd(2024, 6, 15), DisplayZone::utc());
        state.apply_static(
            Season { id: "s1".into(), name: "2024".into() },
            vec![LeagueSeason {
                id: "ls1".into(),
                name: "Majors".into(),
                teams: vec![
                    Team { id: "t1".into(), name: "Cubs".into() },
                    Team { id: "t2".into(), name: "Mets".into() },
                ],
            }],
            vec![],
        );
        let request = state.request_games().unwrap();
        state.apply_games(request.generation, request.window, games);
        state
    }

    fn game(id: &str, when: &str) -> Game {
        Game {
            id: id.into(),
            game_date: DateTime::parse_from_rfc3339(when).unwrap().with_timezone(&Utc),
            home_team_id: "t1".into(),
            visitor_team_id: "t2".into(),
            league: IdName { id: "ls1".into(), name: "Majors".into() },
            ..Default::default()
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_team_tag() {
        assert_eq!(team_tag("Mets"), "MET");
        assert_eq!(team_tag("St. Louis"), "STL");
        assert_eq!(team_tag("A"), "A");
    }

    #[test]
    fn test_compact_game_shows_score_visitor_first() {
        let mut g = game("g", "2024-06-15T18:00:00Z");
        g.visitor_score = Some(3);
        g.home_score = Some(2);
        let schedule = schedule_with(vec![g.clone()]);
        assert_eq!(compact_game(&schedule, &g), "18:00 MET@CUB 3-2");
    }

    #[test]
    fn test_month_view_places_game_on_the_15th() {
        let schedule = schedule_with(vec![game("g", "2024-06-15T18:00:00Z")]);
        let area = Rect::new(0, 0, 98, 25);
        let mut buf = Buffer::empty(area);
        MonthView { schedule: &schedule, today: ymd(2024, 1, 1) }.render(area, &mut buf);

        let text = buffer_text(&buf);
        let line = text.lines().find(|l| l.contains("15 (1)")).expect("15th has one game");
        let col = line.find("15 (1)").unwrap();
        // June 15 2024 is a Saturday, the last column.
        assert_eq!(col / 14, 6);
        assert!(text.contains("18:00 MET@CUB"));
    }

    #[test]
    fn test_day_view_lists_matchups() {
        let mut schedule = schedule_with(vec![
            game("a", "2024-06-15T17:00:00Z"),
            game("b", "2024-06-15T20:00:00Z"),
        ]);
        schedule.set_projection(Projection::Day);
        let area = Rect::new(0, 0, 80, 6);
        let mut buf = Buffer::empty(area);
        DayView { schedule: &schedule }.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Saturday, June 15, 2024"));
        assert!(text.contains("> 17:00  SCH Mets @ Cubs"));
        assert!(text.contains("  20:00  SCH Mets @ Cubs"));
    }

    #[test]
    fn test_week_view_headers_start_on_sunday() {
        let mut schedule = schedule_with(vec![]);
        schedule.set_projection(Projection::Week);
        let area = Rect::new(0, 0, 70, 4);
        let mut buf = Buffer::empty(area);
        WeekView { schedule: &schedule, today: ymd(2024, 1, 1) }.render(area, &mut buf);

        let header = buffer_text(&buf).lines().next().unwrap().to_string();
        assert!(header.starts_with("Sun 6/9"));
        assert!(header.contains("Sat 6/15"));
    }

    #[test]
    fn test_year_view_counts_games_per_month() {
        let mut schedule = schedule_with(vec![]);
        schedule.set_projection(Projection::Year);
        let request = schedule.request_games().unwrap();
        schedule.apply_games(
            request.generation,
            request.window,
            vec![game("a", "2024-06-15T17:00:00Z"), game("b", "2024-06-20T17:00:00Z")],
        );
        let area = Rect::new(0, 0, 88, 24);
        let mut buf = Buffer::empty(area);
        YearView { schedule: &schedule, today: ymd(2024, 1, 1) }.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("June 2 games"));
        assert!(text.contains("January"));
        assert!(!text.contains("January 1 game"));
    }

    #[test]
    fn test_list_view_groups_by_day() {
        let mut schedule = schedule_with(vec![
            game("a", "2024-06-02T17:00:00Z"),
            game("b", "2024-06-15T17:00:00Z"),
        ]);
        schedule.set_projection(Projection::List);
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        ListView { schedule: &schedule }.render(area, &mut buf);

        let lines: Vec<String> = buffer_text(&buf).lines().map(|l| l.trim_end().to_string()).collect();
        assert_eq!(lines[0], "Sun Jun 2, 2024");
        assert!(lines[1].starts_with("  17:00  SCH Mets @ Cubs"));
        assert_eq!(lines[2], "Sat Jun 15, 2024");
    }
}
