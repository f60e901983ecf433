//! Driver time off: one-off dates or repeating weekdays, all day or between two wall-clock times.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::{end_of_day, DriverId, TimeWindow};

/// Which days an unavailability entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Date(NaiveDate),
    Weekday(Weekday),
}

impl Recurrence {
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        match self {
            Self::Date(day) => *day == date,
            Self::Weekday(weekday) => date.weekday() == *weekday,
        }
    }
}

/// Part of the day that is blocked. Times carry no date.
///
/// A `Between` span whose start is after its end runs overnight: it blocks from `start` to
/// midnight on the day it applies to, then from midnight to `end` on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSpan {
    AllDay,
    Between { start: NaiveTime, end: NaiveTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityWindow {
    pub driver_id: DriverId,
    pub on: Recurrence,
    pub span: TimeSpan,
}

impl UnavailabilityWindow {
    pub fn all_day(driver_id: DriverId, on: Recurrence) -> Self {
        Self {
            driver_id,
            on,
            span: TimeSpan::AllDay,
        }
    }

    pub fn between(driver_id: DriverId, on: Recurrence, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            driver_id,
            on,
            span: TimeSpan::Between { start, end },
        }
    }

    /// True if this entry blocks any instant of `window`.
    ///
    /// Bounds are inclusive: time off ending at 10:00 still collides with a ride starting
    /// at 10:00.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        window.dates().any(|date| {
            let Some((from, to)) = window.span_on(date) else {
                return false;
            };
            self.blocked_on(date)
                .into_iter()
                .flatten()
                .any(|(start, end)| start <= to && end >= from)
        })
    }

    /// True if the entry blocks part of at least one date touched by `window`.
    pub fn touches(&self, window: &TimeWindow) -> bool {
        window
            .dates()
            .any(|date| self.blocked_on(date).iter().any(Option::is_some))
    }

    /// Blocked time ranges on `date`: the entry's own span, plus the tail of an overnight
    /// span that began the day before.
    fn blocked_on(&self, date: NaiveDate) -> [Option<(NaiveTime, NaiveTime)>; 2] {
        let today = self.on.applies_to(date);
        match self.span {
            TimeSpan::AllDay => [today.then(|| (NaiveTime::MIN, end_of_day())), None],
            TimeSpan::Between { start, end } if start <= end => {
                [today.then_some((start, end)), None]
            }
            TimeSpan::Between { start, end } => {
                let yesterday = date.pred_opt().is_some_and(|prev| self.on.applies_to(prev));
                [
                    today.then(|| (start, end_of_day())),
                    yesterday.then_some((NaiveTime::MIN, end)),
                ]
            }
        }
    }
}

pub fn any_overlap(windows: &[UnavailabilityWindow], ride: &TimeWindow) -> bool {
    windows.iter().any(|entry| entry.overlaps(ride))
}
