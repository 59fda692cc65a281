//! The calendar widget's selection state machine.
//!
//! A widget is a [`PickerState`] value. Every interaction is a
//! [`PickerEvent`] fed through [`PickerState::apply`], which returns the next
//! state and, when a selection completes, the confirmed [`DateRange`] to hand
//! back to the owning form field. Nothing else is mutated.

use chrono::{Datelike, Month, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::candidates::{exact_month, exact_year};
use crate::range::{CalendarMode, DateRange, YearBounds};

/// Where the widget is in a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Closed.
    Idle,
    /// Open, waiting for the first day click.
    SelectingStart,
    /// Range mode only: the first day has been clicked.
    SelectingEnd { anchor: NaiveDate },
    /// A selection was emitted; the widget is still open.
    Confirmed,
}

/// Per-instance widget configuration. Owned by whoever mounts the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerConfig {
    pub number_of_months: u8,
    pub bounds: YearBounds,
    /// Presentation only; rendered as a class name.
    pub variant: &'static str,
}

impl PickerConfig {
    pub fn mode(&self) -> CalendarMode {
        CalendarMode::from_months(self.number_of_months)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    Open,
    Close,
    DayClicked(NaiveDate),
    MonthQueryChanged(String),
    YearQueryChanged(String),
    MonthChosen(Month),
    YearChosen(i32),
    /// Confirm key in the month input.
    MonthConfirmed,
    /// Confirm key in the year input.
    YearConfirmed,
    PreviousMonth,
    NextMonth,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: PickerState,
    pub emitted: Option<DateRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerState {
    /// The value last confirmed into the form field.
    pub committed: DateRange,
    #[serde(flatten)]
    pub phase: Phase,
    /// First day of the first visible month.
    pub view: NaiveDate,
    /// Text in the month input. Travels as the input's own value.
    #[serde(skip)]
    pub month_query: String,
    /// Text in the year input. Travels as the input's own value.
    #[serde(skip)]
    pub year_query: String,
}

impl PickerState {
    /// A closed widget showing `committed`.
    pub fn new(committed: DateRange, config: &PickerConfig) -> Self {
        PickerState {
            committed,
            phase: Phase::Idle,
            view: clamp_view(first_of_month(committed.from), config),
            month_query: String::new(),
            year_query: String::new(),
        }
    }

    /// Re-establish invariants on a snapshot that came back from the client.
    pub fn normalized(mut self, config: &PickerConfig) -> Self {
        self.committed = DateRange::new(self.committed.from, self.committed.to);
        self.view = clamp_view(first_of_month(self.view), config);
        if let Phase::SelectingEnd { anchor } = self.phase {
            if config.mode() == CalendarMode::Single || !config.bounds.contains(anchor.year()) {
                self.phase = Phase::SelectingStart;
            }
        }
        self
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The first day of an unfinished range selection, if any.
    pub fn anchor(&self) -> Option<NaiveDate> {
        match self.phase {
            Phase::SelectingEnd { anchor } => Some(anchor),
            _ => None,
        }
    }

    /// First days of each visible month, in order.
    pub fn visible_months(&self, config: &PickerConfig) -> Vec<NaiveDate> {
        (0..config.number_of_months.max(1))
            .filter_map(|offset| self.view.checked_add_months(Months::new(offset as u32)))
            .collect()
    }

    pub fn can_go_back(&self, config: &PickerConfig) -> bool {
        step_month(self.view, -1)
            .map(|prev| clamp_view(prev, config) == prev)
            .unwrap_or(false)
    }

    pub fn can_go_forward(&self, config: &PickerConfig) -> bool {
        step_month(self.view, 1)
            .map(|next| clamp_view(next, config) == next)
            .unwrap_or(false)
    }

    pub fn apply(self, event: PickerEvent, config: &PickerConfig) -> Transition {
        let mut state = self;

        if !state.is_open() {
            if event == PickerEvent::Open {
                state.phase = Phase::SelectingStart;
                state.view = clamp_view(first_of_month(state.committed.from), config);
            }
            return Transition {
                state,
                emitted: None,
            };
        }

        let mut emitted = None;
        match event {
            PickerEvent::Open => {}
            PickerEvent::Close => {
                state.phase = Phase::Idle;
                state.month_query.clear();
                state.year_query.clear();
            }
            PickerEvent::DayClicked(day) => {
                if config.bounds.contains(day.year()) {
                    emitted = state.click_day(day, config.mode());
                }
            }
            PickerEvent::MonthQueryChanged(text) => state.month_query = text,
            PickerEvent::YearQueryChanged(text) => state.year_query = text,
            PickerEvent::MonthChosen(month) => state.show_month(month, config),
            PickerEvent::YearChosen(year) => state.show_year(year, config),
            PickerEvent::MonthConfirmed => {
                if let Some(month) = exact_month(&state.month_query) {
                    state.show_month(month, config);
                }
            }
            PickerEvent::YearConfirmed => {
                if let Some(year) = exact_year(&state.year_query, config.bounds) {
                    state.show_year(year, config);
                }
            }
            PickerEvent::PreviousMonth => {
                if let Some(prev) = step_month(state.view, -1) {
                    state.view = clamp_view(prev, config);
                }
            }
            PickerEvent::NextMonth => {
                if let Some(next) = step_month(state.view, 1) {
                    state.view = clamp_view(next, config);
                }
            }
        }

        Transition { state, emitted }
    }

    fn click_day(&mut self, day: NaiveDate, mode: CalendarMode) -> Option<DateRange> {
        let selection = match (mode, self.phase) {
            (CalendarMode::Single, _) => DateRange::single(day),
            (CalendarMode::Range, Phase::SelectingEnd { anchor }) => DateRange::new(anchor, day),
            (CalendarMode::Range, _) => {
                self.phase = Phase::SelectingEnd { anchor: day };
                return None;
            }
        };
        self.committed = selection;
        self.phase = Phase::Confirmed;
        Some(selection)
    }

    fn show_month(&mut self, month: Month, config: &PickerConfig) {
        if let Some(first) = NaiveDate::from_ymd_opt(self.view.year(), month.number_from_month(), 1) {
            self.view = clamp_view(first, config);
        }
        self.month_query.clear();
    }

    fn show_year(&mut self, year: i32, config: &PickerConfig) {
        let year = config.bounds.clamp(year);
        if let Some(first) = NaiveDate::from_ymd_opt(year, self.view.month(), 1) {
            self.view = clamp_view(first, config);
        }
        self.year_query.clear();
    }
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn step_month(view: NaiveDate, delta: i32) -> Option<NaiveDate> {
    if delta >= 0 {
        view.checked_add_months(Months::new(delta as u32))
    } else {
        view.checked_sub_months(Months::new(delta.unsigned_abs()))
    }
}

/// Keep every visible month inside the configured years.
fn clamp_view(view: NaiveDate, config: &PickerConfig) -> NaiveDate {
    let bounds = config.bounds;
    let trailing = u32::from(config.number_of_months.max(1)) - 1;

    let Some(earliest) = NaiveDate::from_ymd_opt(bounds.min_year, 1, 1) else {
        return view;
    };
    let latest = NaiveDate::from_ymd_opt(bounds.max_year, 12, 1)
        .and_then(|last| last.checked_sub_months(Months::new(trailing)))
        .map(|latest| latest.max(earliest))
        .unwrap_or(earliest);

    view.clamp(earliest, latest)
}
