use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use draco_api::window::{self, FilterType};
use draco_api::Game;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Which calendar projection is on screen. Exactly one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    Day,
    Week,
    #[default]
    Month,
    Year,
    List,
}

impl Projection {
    pub const ALL: [Projection; 5] =
        [Projection::Day, Projection::Week, Projection::Month, Projection::Year, Projection::List];

    pub fn label(&self) -> &'static str {
        match self {
            Projection::Day => "Day",
            Projection::Week => "Week",
            Projection::Month => "Month",
            Projection::Year => "Year",
            Projection::List => "List",
        }
    }

    pub fn index(&self) -> usize {
        Projection::ALL.iter().position(|p| p == self).unwrap_or_default()
    }

    /// The window kind this projection forces. `List` shows whatever window
    /// was last in effect.
    pub fn filter_type(&self) -> Option<FilterType> {
        match self {
            Projection::Day => Some(FilterType::Day),
            Projection::Week => Some(FilterType::Week),
            Projection::Month => Some(FilterType::Month),
            Projection::Year => Some(FilterType::Year),
            Projection::List => None,
        }
    }

    /// Projection one level deeper, used when drilling into a cell.
    pub fn drill_in(&self) -> Option<Projection> {
        match self {
            Projection::Year => Some(Projection::Month),
            Projection::Month | Projection::Week => Some(Projection::Day),
            Projection::Day | Projection::List => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Display time zone
// ---------------------------------------------------------------------------

/// Zone games are bucketed and entered in. The terminal runs in `Local`;
/// tests pin a fixed offset so day boundaries are deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    pub fn naive(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            DisplayZone::Local => instant.with_timezone(&chrono::Local).naive_local(),
            DisplayZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.naive(instant).date()
    }

    /// Wall-clock time in this zone back to UTC. `None` for times skipped
    /// by a DST jump.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            DisplayZone::Local => chrono::Local
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            DisplayZone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

/// One calendar cell: a date and the games played on it.
#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    /// False for padding days borrowed from the neighbouring month.
    pub in_period: bool,
    pub is_today: bool,
    pub games: Vec<&'a Game>,
}

#[derive(Debug, Clone)]
pub struct MonthSummary {
    pub first: NaiveDate,
    pub game_count: usize,
    /// Day-of-month numbers that have at least one game.
    pub game_days: Vec<u32>,
}

/// Group games by their local calendar day, each day in kick-off order.
pub fn bucket_by_day<'a>(games: &[&'a Game], zone: &DisplayZone) -> BTreeMap<NaiveDate, Vec<&'a Game>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&'a Game>> = BTreeMap::new();
    for game in games {
        buckets.entry(zone.date_of(game.game_date)).or_default().push(game);
    }
    for day in buckets.values_mut() {
        day.sort_by_key(|g| g.game_date);
    }
    buckets
}

pub fn games_on<'a>(games: &[&'a Game], date: NaiveDate, zone: &DisplayZone) -> Vec<&'a Game> {
    let mut on_day: Vec<&'a Game> = games
        .iter()
        .copied()
        .filter(|g| zone.date_of(g.game_date) == date)
        .collect();
    on_day.sort_by_key(|g| g.game_date);
    on_day
}

/// Sunday-to-Saturday columns for the week containing `anchor`.
pub fn week_columns<'a>(
    games: &[&'a Game],
    anchor: NaiveDate,
    today: NaiveDate,
    zone: &DisplayZone,
) -> Vec<DayCell<'a>> {
    let mut buckets = bucket_by_day(games, zone);
    let start = window::start_of_week(anchor);
    (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            DayCell {
                date,
                in_period: true,
                is_today: date == today,
                games: buckets.remove(&date).unwrap_or_default(),
            }
        })
        .collect()
}

/// Week rows covering the month of `anchor`, padded to whole weeks.
pub fn month_grid<'a>(
    games: &[&'a Game],
    anchor: NaiveDate,
    today: NaiveDate,
    zone: &DisplayZone,
) -> Vec<Vec<DayCell<'a>>> {
    let mut buckets = bucket_by_day(games, zone);
    let first = window::start_of_month(anchor);
    let last = window::end_of_month(anchor);
    let mut cursor = window::start_of_week(first);

    let mut rows = Vec::with_capacity(6);
    while cursor <= last {
        let row = (0..7)
            .map(|offset| {
                let date = cursor + Duration::days(offset);
                DayCell {
                    date,
                    in_period: date.month() == anchor.month(),
                    is_today: date == today,
                    games: buckets.remove(&date).unwrap_or_default(),
                }
            })
            .collect();
        rows.push(row);
        cursor += Duration::weeks(1);
    }
    rows
}

/// Twelve month summaries for the year of `anchor`.
pub fn year_months(games: &[&Game], anchor: NaiveDate, zone: &DisplayZone) -> Vec<MonthSummary> {
    let buckets = bucket_by_day(games, zone);
    let jan = window::start_of_year(anchor);
    (0..12)
        .map(|m| {
            let first = window::shift(FilterType::Month, jan, m);
            let last = window::end_of_month(first);
            let days: Vec<(&NaiveDate, &Vec<&Game>)> = buckets.range(first..=last).collect();
            MonthSummary {
                first,
                game_count: days.iter().map(|(_, g)| g.len()).sum(),
                game_days: days.iter().map(|(d, _)| d.day()).collect(),
            }
        })
        .collect()
}

/// Flat list grouped by day, earliest first.
pub fn list_rows<'a>(games: &[&'a Game], zone: &DisplayZone) -> Vec<(NaiveDate, Vec<&'a Game>)> {
    bucket_by_day(games, zone).into_iter().collect()
}
