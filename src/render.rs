use chrono::{Datelike, NaiveDate};
use hypertext::{Raw, maud_borrow, prelude::*};

use crate::candidates::{month_candidates, year_candidates};
use crate::form::{FormErrors, FormField, FormValues};
use crate::picker::{Phase, PickerConfig, PickerState};
use crate::range::{CalendarMode, DateRange, to_iso};
use crate::routes::EventKind;

/// Suggestion lists are cut off after this many entries.
const MAX_SUGGESTIONS: usize = 12;

// ============================================================================
// Page
// ============================================================================

pub fn render_page(
    values: &FormValues,
    errors: &FormErrors,
    result: Option<&str>,
    today: NaiveDate,
    config_for: impl Fn(FormField) -> PickerConfig,
) -> String {
    let form_html = render_form(values, errors, result, today, config_for);

    maud! {
        !DOCTYPE
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Calendar Picker Component" }
                link rel="stylesheet" href="/static/picker.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                div .page {
                    main {
                        h1 { "Calendar Date Picker" }
                        p {
                            "A calendar date picker component with month and year autocomplete, "
                            "range selection and configurable year bounds."
                        }

                        h2 { "Installation" }
                        p .muted {
                            "For setup and usage details, follow the instructions on our "
                            a href="https://github.com/seu-repo" target="_blank" rel="noopener noreferrer" { "GitHub" }
                            "."
                        }

                        (Raw::dangerously_create(&form_html))

                        h2 { "What has changed?" }
                        ul .changes {
                            li {
                                strong { "Autocomplete for Month and Year: " }
                                "type part of a month name or the leading digits of a year to narrow the suggestions."
                            }
                            li {
                                strong { "Input with Dropdown: " }
                                "text inputs with suggestion lists instead of plain selects."
                            }
                            li {
                                strong { "Range validation: " }
                                code { "min_year" } " and " code { "max_year" }
                                " control the valid year range."
                            }
                            li {
                                strong { "Smart filtering: " }
                                "months match by prefix, years by their leading digits."
                            }
                        }
                    }
                }
            }
        }
    }
    .render()
    .into_inner()
}

/// The form with both pickers, any field messages and the submit result.
pub fn render_form(
    values: &FormValues,
    errors: &FormErrors,
    result: Option<&str>,
    today: NaiveDate,
    config_for: impl Fn(FormField) -> PickerConfig,
) -> String {
    let fields: String = FormField::ALL
        .iter()
        .map(|&field| {
            let config = config_for(field);
            let state = PickerState::new(values.get(field), &config);
            render_form_field(field, &state, &config, today, errors.get(field))
        })
        .collect();

    let result_html = match result {
        Some(text) => maud! {
            div #submit-result .submit-result {
                pre { (text) }
            }
        }
        .render()
        .into_inner(),
        None => String::new(),
    };

    format!(
        r##"<form id="picker-form" class="picker-form" hx-post="/submit" hx-target="#picker-form" hx-swap="outerHTML">
            <div class="form-fields">{fields}</div>
            <button class="btn btn-default" type="submit">Submit</button>
            {result_html}
        </form>"##
    )
}

fn render_form_field(
    field: FormField,
    state: &PickerState,
    config: &PickerConfig,
    today: NaiveDate,
    error: Option<&str>,
) -> String {
    let widget_html = render_widget(WidgetSlot::form(field), state, config, today);
    let message = error.unwrap_or_default();

    maud! {
        div .form-group {
            label .form-label { (field.label()) }
            (Raw::dangerously_create(&widget_html))
            @if !message.is_empty() {
                p .form-message { (message) }
            }
        }
    }
    .render()
    .into_inner()
}

// ============================================================================
// Widget
// ============================================================================

/// Where a widget sits on a page. The form mounts one per field; the
/// storybook mounts several of each and numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSlot {
    pub field: FormField,
    pub instance: Option<u32>,
}

impl WidgetSlot {
    pub fn form(field: FormField) -> Self {
        WidgetSlot {
            field,
            instance: None,
        }
    }

    pub fn numbered(field: FormField, instance: u32) -> Self {
        WidgetSlot {
            field,
            instance: Some(instance),
        }
    }

    /// Element id of the widget wrapper; every htmx request targets it.
    pub fn dom_id(&self) -> String {
        match self.instance {
            Some(n) => format!("picker-{}-{n}", self.field.as_str()),
            None => format!("picker-{}", self.field.as_str()),
        }
    }
}

/// Render one picker. The committed value is carried by `{field}_from` and
/// `{field}_to`, the rest of the state by the `{field}_widget` snapshot.
/// Every input name is prefixed by the field because htmx posts the whole
/// enclosing form along with each widget request.
pub fn render_widget(
    slot: WidgetSlot,
    state: &PickerState,
    config: &PickerConfig,
    today: NaiveDate,
) -> String {
    let name = slot.field.as_str();
    // PickerState serialization cannot fail: every field is a plain value.
    let snapshot = serde_json::to_string(state).unwrap_or_default();

    let popover = if state.is_open() {
        render_popover(slot, state, config, today)
    } else {
        String::new()
    };

    let trigger_event = if state.is_open() {
        EventKind::Close
    } else {
        EventKind::Open
    };
    let trigger_button = format!(
        r##"<button type="button" class="btn picker-trigger" {attrs}>📅 {label}</button>"##,
        attrs = hx_attrs(slot, trigger_event),
        label = trigger_label(state.committed, config.mode()),
    );

    let dom_id = slot.dom_id();
    let class = format!("picker picker-{}", config.variant);
    let from_name = slot.field.from_input_name();
    let to_name = slot.field.to_input_name();
    let from = to_iso(state.committed.from);
    let to = to_iso(state.committed.to);
    let snapshot_name = format!("{name}_widget");
    let instance_name = format!("{name}_instance");
    let instance = slot.instance.map(|n| n.to_string()).unwrap_or_default();

    maud! {
        div class=(class) id=(dom_id) {
            input type="hidden" name=(from_name) value=(from);
            input type="hidden" name=(to_name) value=(to);
            input type="hidden" name=(snapshot_name) value=(snapshot);
            @if !instance.is_empty() {
                input type="hidden" name=(instance_name) value=(instance);
            }
            (Raw::dangerously_create(&trigger_button))
            (Raw::dangerously_create(&popover))
        }
    }
    .render()
    .into_inner()
}

fn render_popover(
    slot: WidgetSlot,
    state: &PickerState,
    config: &PickerConfig,
    today: NaiveDate,
) -> String {
    let dom_id = slot.dom_id();
    let view_month = state.view.format("%B").to_string();
    let view_year = state.view.year().to_string();

    let prev_button = nav_button(slot, EventKind::PreviousMonth, "‹", state.can_go_back(config));
    let next_button = nav_button(slot, EventKind::NextMonth, "›", state.can_go_forward(config));

    let month_suggestions: Vec<String> = if state.month_query.trim().is_empty() {
        Vec::new()
    } else {
        month_candidates(&state.month_query)
            .map(|month| {
                suggestion_button(
                    slot,
                    EventKind::MonthChosen,
                    "month",
                    &month.number_from_month().to_string(),
                    month.name(),
                )
            })
            .collect()
    };

    let year_suggestions: Vec<String> = if state.year_query.trim().is_empty() {
        Vec::new()
    } else {
        year_candidates(&state.year_query, config.bounds)
            .take(MAX_SUGGESTIONS)
            .map(|year| {
                let year = year.to_string();
                suggestion_button(slot, EventKind::YearChosen, "year", &year, &year)
            })
            .collect()
    };

    let month_input = autocomplete_input(
        slot,
        "month",
        &state.month_query,
        &view_month,
        EventKind::MonthQuery,
        EventKind::MonthConfirm,
        &month_suggestions,
    );
    let year_input = autocomplete_input(
        slot,
        "year",
        &state.year_query,
        &view_year,
        EventKind::YearQuery,
        EventKind::YearConfirm,
        &year_suggestions,
    );

    let grids: String = state
        .visible_months(config)
        .into_iter()
        .map(|month| render_month_grid(slot, month, state, config, today))
        .collect();

    let hint = match state.phase {
        Phase::SelectingEnd { .. } => "Pick the last day of the range",
        _ if config.mode() == CalendarMode::Range => "Pick the first day of the range",
        _ => "Pick a day",
    };

    format!(
        r##"<div class="picker-popover" id="{dom_id}-popover">
            <div class="picker-toolbar">
                {prev_button}
                {month_input}
                {year_input}
                {next_button}
            </div>
            <div class="picker-months">{grids}</div>
            <div class="picker-footer">
                <span class="picker-hint">{hint}</span>
                <button type="button" class="btn" {close_attrs}>Close</button>
            </div>
        </div>"##,
        close_attrs = hx_attrs(slot, EventKind::Close),
    )
}

fn autocomplete_input(
    slot: WidgetSlot,
    kind: &str,
    query: &str,
    placeholder: &str,
    on_input: EventKind,
    on_confirm: EventKind,
    suggestions: &[String],
) -> String {
    let input_id = format!("{}-{kind}", slot.dom_id());
    let input_name = format!("{}_{kind}_query", slot.field.as_str());
    let input_class = format!("picker-input picker-input-{kind}");

    let input = maud_borrow! {
        input
            type="text"
            id=(input_id)
            class=(input_class)
            name=(input_name)
            value=(query)
            placeholder=(placeholder)
            autocomplete="off";
    }
    .render()
    .into_inner();

    let list = if suggestions.is_empty() {
        String::new()
    } else {
        format!(
            r#"<ul class="picker-candidates">{}</ul>"#,
            suggestions
                .iter()
                .map(|item| format!("<li>{item}</li>"))
                .collect::<String>()
        )
    };

    // One element can only post to one URL, so typing and the confirm key
    // each get a listener of their own.
    format!(
        r##"<div class="picker-autocomplete" onkeydown="if (event.key === 'Enter') event.preventDefault()">
            {input}
            <span hidden {input_attrs} hx-trigger="input delay:150ms from:#{input_id}"></span>
            <span hidden {confirm_attrs} hx-trigger="keyup[key=='Enter'] from:#{input_id}"></span>
            {list}
        </div>"##,
        input_attrs = hx_attrs(slot, on_input),
        confirm_attrs = hx_attrs(slot, on_confirm),
    )
}

/// Month names and years only; neither needs escaping.
fn suggestion_button(slot: WidgetSlot, event: EventKind, key: &str, value: &str, label: &str) -> String {
    format!(
        r##"<button type="button" class="picker-candidate" {attrs} hx-vals='{{"{key}": "{value}"}}'>{label}</button>"##,
        attrs = hx_attrs(slot, event),
    )
}

fn nav_button(slot: WidgetSlot, event: EventKind, label: &str, enabled: bool) -> String {
    if enabled {
        format!(
            r##"<button type="button" class="btn picker-nav" {attrs}>{label}</button>"##,
            attrs = hx_attrs(slot, event),
        )
    } else {
        format!(r#"<button type="button" class="btn picker-nav" disabled>{label}</button>"#)
    }
}

fn render_month_grid(
    slot: WidgetSlot,
    first_of_month: NaiveDate,
    state: &PickerState,
    config: &PickerConfig,
    today: NaiveDate,
) -> String {
    let days_in_month = days_in_month(first_of_month);
    let start_offset = first_of_month.weekday().num_days_from_sunday();

    let mut cells = String::new();

    // Header row
    cells.push_str(r#"<div class="calendar-header-row">"#);
    for day_name in &["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"] {
        cells.push_str(&format!(r#"<div class="calendar-header-cell">{}</div>"#, day_name));
    }
    cells.push_str("</div>");

    let mut cell_count = 0;
    cells.push_str(r#"<div class="calendar-row">"#);

    // Empty cells before first day
    for _ in 0..start_offset {
        cells.push_str(r#"<div class="calendar-cell calendar-cell-empty"></div>"#);
        cell_count += 1;
    }

    for date in first_of_month.iter_days().take(days_in_month as usize) {
        if cell_count > 0 && cell_count % 7 == 0 {
            cells.push_str("</div>");
            cells.push_str(r#"<div class="calendar-row">"#);
        }

        let class = day_classes(date, state, today);
        if config.bounds.contains(date.year()) {
            cells.push_str(&format!(
                r##"<button type="button" class="{class}" {attrs} hx-vals='{{"day": "{iso}"}}'>{day}</button>"##,
                attrs = hx_attrs(slot, EventKind::Day),
                iso = to_iso(date),
                day = date.day(),
            ));
        } else {
            cells.push_str(&format!(
                r#"<button type="button" class="{class}" disabled>{}</button>"#,
                date.day()
            ));
        }
        cell_count += 1;
    }

    // Fill remaining cells
    while cell_count % 7 != 0 {
        cells.push_str(r#"<div class="calendar-cell calendar-cell-empty"></div>"#);
        cell_count += 1;
    }
    cells.push_str("</div>");

    format!(
        r#"<div class="calendar">
            <div class="calendar-title">{}</div>
            <div class="calendar-grid">{}</div>
        </div>"#,
        first_of_month.format("%B %Y"),
        cells
    )
}

fn day_classes(date: NaiveDate, state: &PickerState, today: NaiveDate) -> String {
    let mut class = "calendar-cell".to_string();
    if date == today {
        class.push_str(" calendar-cell-today");
    }

    match state.anchor() {
        // While the end is being picked only the draft start is highlighted
        Some(anchor) => {
            if date == anchor {
                class.push_str(" calendar-cell-anchor");
            }
        }
        None => {
            let range = state.committed;
            if date == range.from {
                class.push_str(" calendar-cell-start");
            }
            if date == range.to {
                class.push_str(" calendar-cell-end");
            }
            if range.contains(date) && date != range.from && date != range.to {
                class.push_str(" calendar-cell-in-range");
            }
        }
    }
    class
}

fn days_in_month(first_of_month: NaiveDate) -> u32 {
    let (year, month) = (first_of_month.year(), first_of_month.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map(|next| next.signed_duration_since(first_of_month).num_days() as u32)
        .unwrap_or(31)
}

fn trigger_label(range: DateRange, mode: CalendarMode) -> String {
    match mode {
        CalendarMode::Range if !range.is_single_day() => format!(
            "{} - {}",
            range.from.format("%b %d, %Y"),
            range.to.format("%b %d, %Y")
        ),
        _ => range.from.format("%b %d, %Y").to_string(),
    }
}

fn hx_attrs(slot: WidgetSlot, event: EventKind) -> String {
    format!(
        r##"hx-post="/picker/{name}/{event}" hx-target="#{id}" hx-swap="outerHTML" hx-include="#{id}""##,
        name = slot.field.as_str(),
        event = event.as_str(),
        id = slot.dom_id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::PickerEvent;
    use crate::range::YearBounds;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(months: u8) -> PickerConfig {
        PickerConfig {
            number_of_months: months,
            bounds: YearBounds::new(1900, 2100),
            variant: "outline",
        }
    }

    #[test]
    fn test_closed_widget_has_only_trigger() {
        let config = config(2);
        let state = PickerState::new(DateRange::new(ymd(2024, 1, 1), ymd(2024, 12, 31)), &config);
        let html = render_widget(WidgetSlot::form(FormField::Calendar), &state, &config, ymd(2024, 6, 1));

        assert!(html.contains(r#"name="calendar_from" value="2024-01-01""#));
        assert!(html.contains(r#"name="calendar_to" value="2024-12-31""#));
        assert!(html.contains("Jan 01, 2024 - Dec 31, 2024"));
        assert!(html.contains(r#"hx-post="/picker/calendar/open""#));
        assert!(!html.contains("picker-popover"));
        assert!(html.contains("&quot;phase&quot;:&quot;idle&quot;"));
    }

    #[test]
    fn test_open_range_widget_shows_two_months() {
        let config = config(2);
        let state = PickerState::new(DateRange::single(ymd(2024, 1, 5)), &config)
            .apply(PickerEvent::Open, &config)
            .state;
        let html = render_widget(WidgetSlot::form(FormField::Calendar), &state, &config, ymd(2024, 1, 10));

        assert!(html.contains("January 2024"));
        assert!(html.contains("February 2024"));
        assert!(html.contains("calendar-cell-today"));
        assert!(html.contains(r#"hx-vals='{"day": "2024-02-29"}'"#));
        assert!(html.contains("Pick the first day of the range"));
    }

    #[test]
    fn test_month_grid_layout() {
        let config = config(1);
        let state = PickerState::new(DateRange::single(ymd(2024, 9, 1)), &config);
        // September 2024 starts on a Sunday and has 30 days: 5 rows, 5 trailing blanks.
        let html = render_month_grid(WidgetSlot::form(FormField::DatePicker), ymd(2024, 9, 1), &state, &config, ymd(2000, 1, 1));
        assert_eq!(html.matches(r#"<div class="calendar-row">"#).count(), 5);
        assert_eq!(html.matches("calendar-cell-empty").count(), 5);
        assert_eq!(days_in_month(ymd(2024, 2, 1)), 29);
        assert_eq!(days_in_month(ymd(2023, 12, 1)), 31);
    }

    #[test]
    fn test_range_highlighting() {
        let config = config(2);
        let state = PickerState::new(DateRange::new(ymd(2024, 1, 3), ymd(2024, 1, 6)), &config);
        let today = ymd(2000, 1, 1);
        assert!(day_classes(ymd(2024, 1, 3), &state, today).contains("calendar-cell-start"));
        assert!(day_classes(ymd(2024, 1, 4), &state, today).contains("calendar-cell-in-range"));
        assert!(day_classes(ymd(2024, 1, 6), &state, today).contains("calendar-cell-end"));
        assert_eq!(day_classes(ymd(2024, 1, 7), &state, today), "calendar-cell");

        let drafting = state
            .apply(PickerEvent::Open, &config)
            .state
            .apply(PickerEvent::DayClicked(ymd(2024, 1, 20)), &config)
            .state;
        assert!(day_classes(ymd(2024, 1, 20), &drafting, today).contains("calendar-cell-anchor"));
        assert!(!day_classes(ymd(2024, 1, 4), &drafting, today).contains("in-range"));
    }

    #[test]
    fn test_suggestions_follow_queries() {
        let config = config(1);
        let state = PickerState::new(DateRange::single(ymd(2024, 1, 1)), &config)
            .apply(PickerEvent::Open, &config)
            .state
            .apply(PickerEvent::MonthQueryChanged("ju".to_string()), &config)
            .state
            .apply(PickerEvent::YearQueryChanged("19".to_string()), &config)
            .state;
        let html = render_widget(WidgetSlot::form(FormField::DatePicker), &state, &config, ymd(2024, 1, 1));

        assert!(html.contains(">June</button>"));
        assert!(html.contains(">July</button>"));
        assert!(!html.contains(">March</button>"));
        assert!(html.contains(">1900</button>"));
        assert!(html.contains(">1911</button>"));
        assert!(!html.contains(">1912</button>"));
    }

    #[test]
    fn test_query_text_is_escaped() {
        let config = config(1);
        let state = PickerState::new(DateRange::single(ymd(2024, 1, 1)), &config)
            .apply(PickerEvent::Open, &config)
            .state
            .apply(PickerEvent::MonthQueryChanged(r#""><script>"#.to_string()), &config)
            .state;
        let html = render_widget(WidgetSlot::form(FormField::DatePicker), &state, &config, ymd(2024, 1, 1));
        assert!(!html.contains(r#""><script>"#));
        assert!(html.contains(r#"value="&quot;"#));
    }

    #[test]
    fn test_numbered_slot_targets_itself() {
        let config = config(1);
        let state = PickerState::new(DateRange::single(ymd(2024, 1, 1)), &config)
            .apply(PickerEvent::Open, &config)
            .state;
        let html = render_widget(WidgetSlot::numbered(FormField::DatePicker, 3), &state, &config, ymd(2024, 1, 1));

        assert!(html.contains(r#"id="picker-date_picker-3""#));
        assert!(html.contains(r#"name="date_picker_instance" value="3""#));
        assert!(html.contains(r##"hx-target="#picker-date_picker-3""##));
        assert!(html.contains("from:#picker-date_picker-3-month"));
        assert!(!html.contains(r##"hx-target="#picker-date_picker""##));

        let form_html = render_widget(WidgetSlot::form(FormField::DatePicker), &state, &config, ymd(2024, 1, 1));
        assert!(!form_html.contains("date_picker_instance"));
    }

    #[test]
    fn test_form_shows_field_errors_and_result() {
        let values = FormValues::defaults(ymd(2024, 5, 5));
        let errors = FormErrors {
            calendar: Some("Please pick a start date".to_string()),
            date_picker: None,
        };
        let html = render_form(&values, &errors, Some("1. Date range"), ymd(2024, 5, 5), |field| {
            field.picker_config(YearBounds::default())
        });
        assert!(html.contains("Please pick a start date"));
        assert!(html.contains(r#"id="picker-calendar""#));
        assert!(html.contains(r#"id="picker-date_picker""#));
        assert!(html.contains("submit-result"));
    }
}
