use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, State},
    http::{HeaderName, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service, post},
};
use chrono::Month;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::error::PickerError;
use crate::form::{FormErrors, FormField, FormValues, PickerForm};
use crate::picker::{PickerConfig, PickerEvent, PickerState};
use crate::range::{DateRange, parse_iso_date, to_iso};
use crate::render::{WidgetSlot, render_form, render_page, render_widget};
use crate::storybook;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config: Arc::new(config),
        }
    }

    pub fn picker_config(&self, field: FormField) -> PickerConfig {
        field.picker_config(self.config.bounds)
    }
}

/// The whole site: page, widget events, submission, storybook and static files.
pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(homepage))
        .merge(router())
        .nest("/storybook", storybook::router())
        .with_state(state)
        .nest_service("/static", get_service(static_dir))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/picker/{field}/{event}", post(picker_event))
        .route("/submit", post(submit))
}

/// URL segment of every widget interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Open,
    Close,
    Day,
    MonthQuery,
    YearQuery,
    MonthChosen,
    YearChosen,
    MonthConfirm,
    YearConfirm,
    PreviousMonth,
    NextMonth,
}

impl EventKind {
    const ALL: [EventKind; 11] = [
        EventKind::Open,
        EventKind::Close,
        EventKind::Day,
        EventKind::MonthQuery,
        EventKind::YearQuery,
        EventKind::MonthChosen,
        EventKind::YearChosen,
        EventKind::MonthConfirm,
        EventKind::YearConfirm,
        EventKind::PreviousMonth,
        EventKind::NextMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Day => "day",
            EventKind::MonthQuery => "month-query",
            EventKind::YearQuery => "year-query",
            EventKind::MonthChosen => "month",
            EventKind::YearChosen => "year",
            EventKind::MonthConfirm => "month-confirm",
            EventKind::YearConfirm => "year-confirm",
            EventKind::PreviousMonth => "prev",
            EventKind::NextMonth => "next",
        }
    }

    pub fn parse(name: &str) -> Result<Self, PickerError> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| PickerError::UnknownEvent {
                name: name.to_string(),
            })
    }

    fn to_event(self, request: &WidgetRequest) -> Result<PickerEvent, PickerError> {
        let event = match self {
            EventKind::Open => PickerEvent::Open,
            EventKind::Close => PickerEvent::Close,
            EventKind::Day => {
                let day = request.day.as_deref().ok_or(PickerError::MissingParameter {
                    event: "day",
                    param: "day",
                })?;
                PickerEvent::DayClicked(parse_iso_date(day)?)
            }
            EventKind::MonthQuery => PickerEvent::MonthQueryChanged(request.month_query.clone()),
            EventKind::YearQuery => PickerEvent::YearQueryChanged(request.year_query.clone()),
            EventKind::MonthChosen => {
                let number = request.month.ok_or(PickerError::MissingParameter {
                    event: "month",
                    param: "month",
                })?;
                let month = Month::try_from(number).map_err(|_| PickerError::InvalidDateInput {
                    input: number.to_string(),
                })?;
                PickerEvent::MonthChosen(month)
            }
            EventKind::YearChosen => {
                let year = request.year.ok_or(PickerError::MissingParameter {
                    event: "year",
                    param: "year",
                })?;
                PickerEvent::YearChosen(year)
            }
            EventKind::MonthConfirm => PickerEvent::MonthConfirmed,
            EventKind::YearConfirm => PickerEvent::YearConfirmed,
            EventKind::PreviousMonth => PickerEvent::PreviousMonth,
            EventKind::NextMonth => PickerEvent::NextMonth,
        };
        Ok(event)
    }
}

/// What a widget request carries: its snapshot, the storybook instance
/// number, the two text inputs and the value of the clicked element, if any.
///
/// Requests are decoded from a plain map because htmx also posts every other
/// input of the enclosing form, including the other widget's.
#[derive(Debug, Default)]
pub struct WidgetRequest {
    pub widget: String,
    pub instance: Option<u32>,
    pub month_query: String,
    pub year_query: String,
    pub day: Option<String>,
    pub month: Option<u8>,
    pub year: Option<i32>,
}

impl WidgetRequest {
    pub fn from_params(field: FormField, params: &HashMap<String, String>) -> Result<Self, PickerError> {
        let name = field.as_str();
        let text = |key: String| params.get(&key).cloned().unwrap_or_default();

        let widget = params
            .get(&format!("{name}_widget"))
            .cloned()
            .ok_or_else(|| PickerError::MalformedSnapshot {
                reason: format!("missing `{name}_widget`"),
            })?;

        let instance = params
            .get(&format!("{name}_instance"))
            .map(|n| {
                n.trim().parse::<u32>().map_err(|_| PickerError::MalformedSnapshot {
                    reason: format!("`{name}_instance` is not a number"),
                })
            })
            .transpose()?;

        let month = params
            .get("month")
            .map(|m| {
                m.trim()
                    .parse::<u8>()
                    .map_err(|_| PickerError::InvalidDateInput { input: m.clone() })
            })
            .transpose()?;
        let year = params
            .get("year")
            .map(|y| {
                y.trim()
                    .parse::<i32>()
                    .map_err(|_| PickerError::InvalidDateInput { input: y.clone() })
            })
            .transpose()?;

        Ok(WidgetRequest {
            widget,
            instance,
            month_query: text(format!("{name}_month_query")),
            year_query: text(format!("{name}_year_query")),
            day: params.get("day").cloned(),
            month,
            year,
        })
    }
}

// GET / - The demo page with default values
pub async fn homepage(State(app): State<AppState>) -> Html<String> {
    let today = app.config.today();
    let values = FormValues::defaults(today);

    Html(render_page(&values, &FormErrors::default(), None, today, |field| {
        app.picker_config(field)
    }))
}

// POST /picker/:field/:event - Apply one interaction and re-render the widget
async fn picker_event(
    State(app): State<AppState>,
    Path((field, event)): Path<(String, String)>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Response, PickerError> {
    let field = FormField::parse(&field)?;
    let kind = EventKind::parse(&event)?;
    let config = app.picker_config(field);
    let request = WidgetRequest::from_params(field, &params)?;

    let mut state = serde_json::from_str::<PickerState>(&request.widget)
        .map_err(|e| PickerError::MalformedSnapshot {
            reason: e.to_string(),
        })?
        .normalized(&config);
    state.month_query = request.month_query.clone();
    state.year_query = request.year_query.clone();

    let transition = state.apply(kind.to_event(&request)?, &config);

    tracing::debug!(
        field = field.as_str(),
        event = kind.as_str(),
        phase = ?transition.state.phase,
        emitted = ?transition.emitted,
        "picker event"
    );

    let slot = WidgetSlot {
        field,
        instance: request.instance,
    };
    let html = Html(render_widget(slot, &transition.state, &config, app.config.today()));

    match transition.emitted.and_then(|range| selection_trigger(field, range)) {
        Some(trigger) => Ok(([(HeaderName::from_static("hx-trigger"), trigger)], html).into_response()),
        None => Ok(html.into_response()),
    }
}

/// `HX-Trigger` value announcing a confirmed selection to the page.
fn selection_trigger(field: FormField, range: DateRange) -> Option<HeaderValue> {
    let payload = serde_json::json!({
        "dateSelected": {
            "field": field.as_str(),
            "from": to_iso(range.from),
            "to": to_iso(range.to),
        }
    });
    HeaderValue::from_str(&payload.to_string()).ok()
}

// POST /submit - Validate both fields and show the result or the messages
async fn submit(State(app): State<AppState>, Form(form): Form<PickerForm>) -> Html<String> {
    let today = app.config.today();
    let config_for = |field| app.picker_config(field);

    match form.validate() {
        Ok(values) => {
            tracing::info!(calendar = ?values.calendar, date_picker = ?values.date_picker, "valid submission");
            let summary = values.summary();
            Html(render_form(&values, &FormErrors::default(), Some(&summary), today, config_for))
        }
        Err(errors) => {
            tracing::info!(?errors, "rejected submission");
            let values = form.values_or(&FormValues::defaults(today));
            Html(render_form(&values, &errors, None, today, config_for))
        }
    }
}
