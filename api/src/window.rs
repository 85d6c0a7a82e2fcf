use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar unit a games window covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl FilterType {
    pub fn label(&self) -> &'static str {
        match self {
            FilterType::Day => "Day",
            FilterType::Week => "Week",
            FilterType::Month => "Month",
            FilterType::Year => "Year",
        }
    }
}

/// The date interval currently driving the games fetch.
///
/// `Day` windows are half-open (`end` is the following midnight); the other
/// kinds run through the last day inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub filter_type: FilterType,
    pub anchor: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ViewWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.filter_type {
            FilterType::Day => self.start <= date && date < self.end,
            _ => self.start <= date && date <= self.end,
        }
    }

    /// The last calendar day inside the window.
    pub fn last_day(&self) -> NaiveDate {
        match self.filter_type {
            FilterType::Day => self.start,
            _ => self.end,
        }
    }

    /// Every calendar day the window shows.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = self.last_day();
        self.start.iter_days().take_while(move |d| *d <= last)
    }

    /// Same kind and bounds; the anchor may differ.
    pub fn same_range(&self, other: &ViewWindow) -> bool {
        self.filter_type == other.filter_type && self.start == other.start && self.end == other.end
    }

    /// Query bounds sent as `startDate`/`endDate`, both inclusive.
    ///
    /// The window's days are local calendar days while the backend compares
    /// UTC instants, so the query reaches one day past each edge. Callers
    /// clip the answer back to the window with [`ViewWindow::contains`].
    pub fn start_param(&self) -> String {
        (self.start - Duration::days(1)).format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        (self.last_day() + Duration::days(1)).format("%Y-%m-%d").to_string()
    }

    pub fn title(&self) -> String {
        match self.filter_type {
            FilterType::Day => self.anchor.format("%A, %B %-d, %Y").to_string(),
            FilterType::Week => format!(
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d, %Y")
            ),
            FilterType::Month => self.anchor.format("%B %Y").to_string(),
            FilterType::Year => self.anchor.format("%Y").to_string(),
        }
    }
}

/// Map a filter kind and anchor date onto the window to fetch.
/// Weeks start on Sunday.
pub fn compute_window(filter_type: FilterType, anchor: NaiveDate) -> ViewWindow {
    let (start, end) = match filter_type {
        FilterType::Day => (anchor, anchor + Duration::days(1)),
        FilterType::Week => {
            let start = start_of_week(anchor);
            (start, start + Duration::days(6))
        }
        FilterType::Month => (start_of_month(anchor), end_of_month(anchor)),
        FilterType::Year => (start_of_year(anchor), end_of_year(anchor)),
    };
    ViewWindow { filter_type, anchor, start, end }
}

/// Move `anchor` by `steps` whole units of `filter_type`. Month and year
/// steps clamp to the last valid day (Jan 31 + 1 month = Feb 28/29).
pub fn shift(filter_type: FilterType, anchor: NaiveDate, steps: i32) -> NaiveDate {
    let months = |n: i32| {
        let magnitude = Months::new(n.unsigned_abs());
        if n >= 0 {
            anchor.checked_add_months(magnitude)
        } else {
            anchor.checked_sub_months(magnitude)
        }
        .unwrap_or(anchor)
    };
    match filter_type {
        FilterType::Day => anchor + Duration::days(i64::from(steps)),
        FilterType::Week => anchor + Duration::weeks(i64::from(steps)),
        FilterType::Month => months(steps),
        FilterType::Year => months(steps.saturating_mul(12)),
    }
}

pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    // 32 days past the 1st always lands in the following month.
    start_of_month(start_of_month(date) + Duration::days(32)) - Duration::days(1)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.ordinal0()))
}

pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    start_of_year(start_of_year(date) + Duration::days(366)) - Duration::days(1)
}
