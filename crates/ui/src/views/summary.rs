use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::use_navigator;

use services::SummaryState;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{SummaryVm, map_summary};

#[derive(Clone, Debug, PartialEq, Eq)]
enum SummaryData {
    Ready(SummaryVm),
    Incomplete,
    NotAvailable,
}

#[component]
pub fn SummaryView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let summaries = ctx.summary();

    let mut resource = use_resource(move || {
        let summaries = summaries.clone();
        async move {
            let state = summaries.load().await.map_err(|err| {
                tracing::warn!(%err, "summary could not be loaded");
                ViewError::from_api(&err, ViewError::LoadSummary)
            })?;
            Ok::<_, ViewError>(match state {
                SummaryState::Ready(summary) => SummaryData::Ready(map_summary(&summary)),
                SummaryState::Incomplete => SummaryData::Incomplete,
                SummaryState::NotAvailable => SummaryData::NotAvailable,
            })
        }
    });

    let state = view_state_from_resource(&resource);
    let unauthorized = matches!(state, ViewState::Error(ViewError::Unauthorized));
    use_effect(use_reactive!(|unauthorized| {
        if unauthorized {
            navigator.replace(Route::Login {});
        }
    }));

    rsx! {
        div { class: "page summary-page",
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { class: "muted", "Loading summary..." }
                },
                ViewState::Ready(SummaryData::Ready(summary)) => rsx! {
                    SummaryDetails { summary }
                },
                ViewState::Ready(SummaryData::Incomplete) => rsx! {
                    div { class: "notice",
                        p { "Please complete the questionnaire before viewing the summary." }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| {
                                navigator.push(Route::Questionnaire {});
                            },
                            "Continue Questionnaire"
                        }
                    }
                },
                ViewState::Ready(SummaryData::NotAvailable) => rsx! {
                    div { class: "notice",
                        p { "No summary data available. Please complete the questionnaire first." }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| {
                                navigator.push(Route::NewRun {});
                            },
                            "Start Questionnaire"
                        }
                    }
                },
                ViewState::Error(ViewError::Unauthorized) => rsx! {},
                ViewState::Error(err) => rsx! {
                    div { class: "notice",
                        p { class: "alert alert--error", "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| resource.restart(),
                            "Retry"
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn SummaryDetails(summary: SummaryVm) -> Element {
    let navigator = use_navigator();

    rsx! {
        h2 { "Questionnaire Summary" }

        dl { class: "summary",
            dt { "Started" }
            dd { "{summary.started_at}" }

            dt { "Last Activity" }
            dd { "{summary.last_activity}" }

            dt { "Completed" }
            dd { "{summary.completed_at}" }
        }

        div { class: "summary__completion",
            span { "{summary.percentage_label}" }
            div { class: "progress__track",
                div { class: "progress__fill", style: "width: {summary.percentage}%;" }
            }
        }

        h3 { "Your Answers" }
        if summary.answers.is_empty() {
            p { class: "muted", "No answers recorded." }
        } else {
            ol { class: "summary__answers",
                for entry in summary.answers.iter() {
                    li { key: "{entry.number}", class: "summary__answer",
                        h4 { "Question {entry.number}" }
                        p { class: "summary__question", "{entry.question}" }
                        p { class: "summary__value", "{entry.answer}" }
                        p { class: "muted", "Answered: {entry.answered_at}" }
                    }
                }
            }
        }

        div { class: "summary__actions no-print",
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| {
                    navigator.push(Route::NewRun {});
                },
                "Start New Questionnaire"
            }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| {
                    let _ = eval("window.print();");
                },
                "Print Summary"
            }
        }
    }
}
