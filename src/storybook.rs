use axum::{Router, extract::State, response::Html, routing::get};
use chrono::NaiveDate;
use hypertext::{Raw, prelude::*};

use crate::form::FormField;
use crate::picker::{PickerEvent, PickerState, first_of_month};
use crate::range::DateRange;
use crate::render::{WidgetSlot, render_widget};
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/picker", get(picker_states))
}

struct Story {
    caption: &'static str,
    html: String,
}

struct StorySection {
    label: &'static str,
    stories: Vec<Story>,
}

/// Widgets driven into each phase, with a caption for each.
fn story_states(field: FormField, today: NaiveDate, app: &AppState) -> Vec<(&'static str, PickerState)> {
    let config = app.picker_config(field);
    let committed = match field {
        FormField::Calendar => DateRange::year_to_date(today),
        FormField::DatePicker => DateRange::single(today),
    };
    let month_start = first_of_month(today);

    let closed = PickerState::new(committed, &config);
    let open = closed.clone().apply(PickerEvent::Open, &config).state;
    let drafting = open
        .clone()
        .apply(PickerEvent::DayClicked(month_start), &config)
        .state;
    let confirmed = open
        .clone()
        .apply(PickerEvent::DayClicked(today), &config)
        .state
        .apply(PickerEvent::DayClicked(month_start), &config)
        .state;
    let typing = open
        .clone()
        .apply(PickerEvent::MonthQueryChanged("ju".to_string()), &config)
        .state
        .apply(PickerEvent::YearQueryChanged("19".to_string()), &config)
        .state;

    vec![
        ("Closed", closed),
        ("Open", open),
        ("First day picked", drafting),
        ("Confirmed", confirmed),
        ("Typing month and year", typing),
    ]
}

// GET /storybook/picker - Show every picker phase in a grid
async fn picker_states(State(app): State<AppState>) -> Html<String> {
    Html(render_storybook(&app, app.config.today()))
}

/// Each story gets its own numbered slot so the widgets never share an id.
fn render_storybook(app: &AppState, today: NaiveDate) -> String {
    let sections: Vec<StorySection> = FormField::ALL
        .iter()
        .map(|&field| {
            let config = app.picker_config(field);
            let stories = story_states(field, today, app)
                .into_iter()
                .zip(0u32..)
                .map(|((caption, state), n)| Story {
                    caption,
                    html: render_widget(WidgetSlot::numbered(field, n), &state, &config, today),
                })
                .collect();
            StorySection {
                label: field.label(),
                stories,
            }
        })
        .collect();

    let html = maud! {
        !DOCTYPE
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Picker - Storybook" }
                link rel="stylesheet" href="/static/picker.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                h1 { "Picker Storybook" }
                p { "Each picker below is live and independent of the others." }

                @for section in &sections {
                    h2 { (section.label) }
                    div .story-grid {
                        @for story in &section.stories {
                            div .story {
                                h3 { (story.caption) }
                                (Raw::dangerously_create(&story.html))
                            }
                        }
                    }
                }
            }
        }
    };

    html.render().into_inner()
}
