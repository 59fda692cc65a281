use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::PickerError;
use crate::picker::PickerConfig;
use crate::range::{DateRange, YearBounds, parse_iso_date, to_date_string};

/// The two independently addressable fields of the demo form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Date range, two visible months.
    Calendar,
    /// Single date, one visible month.
    DatePicker,
}

impl FormField {
    pub const ALL: [FormField; 2] = [FormField::Calendar, FormField::DatePicker];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Calendar => "calendar",
            FormField::DatePicker => "date_picker",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Calendar => "Date Range",
            FormField::DatePicker => "Single Date",
        }
    }

    pub fn parse(name: &str) -> Result<Self, PickerError> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| PickerError::UnknownField {
                name: name.to_string(),
            })
    }

    pub fn picker_config(&self, bounds: YearBounds) -> PickerConfig {
        let number_of_months = match self {
            FormField::Calendar => 2,
            FormField::DatePicker => 1,
        };
        PickerConfig {
            number_of_months,
            bounds,
            variant: "outline",
        }
    }

    pub fn from_input_name(&self) -> String {
        format!("{}_from", self.as_str())
    }

    pub fn to_input_name(&self) -> String {
        format!("{}_to", self.as_str())
    }
}

/// Validated form values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormValues {
    pub calendar: DateRange,
    pub date_picker: DateRange,
}

impl FormValues {
    /// Values shown when the page is first mounted.
    pub fn defaults(today: NaiveDate) -> Self {
        FormValues {
            calendar: DateRange::year_to_date(today),
            date_picker: DateRange::single(today),
        }
    }

    pub fn get(&self, field: FormField) -> DateRange {
        match field {
            FormField::Calendar => self.calendar,
            FormField::DatePicker => self.date_picker,
        }
    }

    /// Human-readable result of a successful submission.
    pub fn summary(&self) -> String {
        format!(
            "1. Date range: {} - {}\n2. Single date: {}",
            to_date_string(self.calendar.from),
            to_date_string(self.calendar.to),
            to_date_string(self.date_picker.from),
        )
    }
}

/// Field-level validation messages.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct FormErrors {
    pub calendar: Option<String>,
    pub date_picker: Option<String>,
}

impl FormErrors {
    pub fn has_errors(&self) -> bool {
        self.calendar.is_some() || self.date_picker.is_some()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Calendar => self.calendar.as_deref(),
            FormField::DatePicker => self.date_picker.as_deref(),
        }
    }
}

// Form data as posted by the page
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PickerForm {
    #[serde(default)]
    pub calendar_from: String,
    #[serde(default)]
    pub calendar_to: String,
    #[serde(default)]
    pub date_picker_from: String,
    #[serde(default)]
    pub date_picker_to: String,
}

impl PickerForm {
    /// Check both fields, collecting a message per failing field.
    pub fn validate(&self) -> Result<FormValues, FormErrors> {
        let calendar = validate_range(&self.calendar_from, &self.calendar_to);
        let date_picker = validate_single(&self.date_picker_from);

        match (calendar, date_picker) {
            (Ok(calendar), Ok(date_picker)) => Ok(FormValues {
                calendar,
                date_picker,
            }),
            (calendar, date_picker) => Err(FormErrors {
                calendar: calendar.err(),
                date_picker: date_picker.err(),
            }),
        }
    }

    /// Whatever parses, with `fallback` for the rest. Used to redraw the
    /// widgets next to validation messages.
    pub fn values_or(&self, fallback: &FormValues) -> FormValues {
        FormValues {
            calendar: validate_range(&self.calendar_from, &self.calendar_to)
                .unwrap_or(fallback.calendar),
            date_picker: validate_single(&self.date_picker_from).unwrap_or(fallback.date_picker),
        }
    }
}

fn validate_range(from: &str, to: &str) -> Result<DateRange, String> {
    let from = required_date(from, "Please pick a start date")?;
    let to = required_date(to, "Please pick an end date")?;
    if from > to {
        return Err(PickerError::InvalidRange { from, to }.to_string());
    }
    Ok(DateRange { from, to })
}

// The end of a single-date field always mirrors its start
fn validate_single(from: &str) -> Result<DateRange, String> {
    required_date(from, "Please pick a date").map(DateRange::single)
}

fn required_date(input: &str, missing: &str) -> Result<NaiveDate, String> {
    if input.trim().is_empty() {
        return Err(missing.to_string());
    }
    parse_iso_date(input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn form(cf: &str, ct: &str, df: &str, dt: &str) -> PickerForm {
        PickerForm {
            calendar_from: cf.to_string(),
            calendar_to: ct.to_string(),
            date_picker_from: df.to_string(),
            date_picker_to: dt.to_string(),
        }
    }

    #[test]
    fn test_valid_submission_summary() {
        let values = form("2024-01-01", "2024-12-31", "2024-01-10", "2024-01-10")
            .validate()
            .unwrap();
        let summary = values.summary();
        assert!(summary.contains("Mon Jan 01 2024 - Tue Dec 31 2024"));
        assert!(summary.contains("2. Single date: Wed Jan 10 2024"));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let errors = form("2024-12-31", "2024-01-01", "2024-01-10", "2024-01-10")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.calendar.as_deref(),
            Some("Start date 2024-12-31 must not be after end date 2024-01-01")
        );
        assert_eq!(errors.date_picker, None);
        assert!(errors.has_errors());
    }

    #[test]
    fn test_missing_and_malformed_dates() {
        let errors = form("", "2024-01-01", "01/10/2024", "").validate().unwrap_err();
        assert_eq!(errors.get(FormField::Calendar), Some("Please pick a start date"));
        assert_eq!(
            errors.get(FormField::DatePicker),
            Some("`01/10/2024` is not a valid date")
        );
    }

    #[test]
    fn test_single_date_to_mirrors_from() {
        let values = form("2024-01-01", "2024-01-02", "2024-03-03", "1999-01-01")
            .validate()
            .unwrap();
        assert_eq!(values.date_picker, DateRange::single(ymd(2024, 3, 3)));
    }

    #[test]
    fn test_defaults() {
        let values = FormValues::defaults(ymd(2026, 10, 19));
        assert_eq!(values.calendar, DateRange::new(ymd(2026, 1, 1), ymd(2026, 10, 19)));
        assert_eq!(values.date_picker, DateRange::single(ymd(2026, 10, 19)));
    }

    #[test]
    fn test_values_or_keeps_what_parses() {
        let fallback = FormValues::defaults(ymd(2026, 10, 19));
        let values = form("2024-01-01", "2024-02-01", "garbage", "").values_or(&fallback);
        assert_eq!(values.calendar, DateRange::new(ymd(2024, 1, 1), ymd(2024, 2, 1)));
        assert_eq!(values.date_picker, fallback.date_picker);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(FormField::parse("date_picker").unwrap(), FormField::DatePicker);
        assert!(FormField::parse("datePicker").is_err());
        assert_eq!(FormField::Calendar.from_input_name(), "calendar_from");
        assert_eq!(FormField::DatePicker.picker_config(YearBounds::default()).number_of_months, 1);
    }
}
