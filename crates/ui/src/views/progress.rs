use dioxus::prelude::*;

#[component]
pub fn ProgressBar(percentage: u8, completed: u32, total: u32) -> Element {
    let width = percentage.min(100);

    rsx! {
        div { class: "progress",
            div { class: "progress__labels",
                span { "Progress: {width}%" }
                span { "{completed} of {total} questions" }
            }
            div {
                class: "progress__track",
                role: "progressbar",
                aria_valuemin: "0",
                aria_valuemax: "100",
                aria_valuenow: "{width}",
                div { class: "progress__fill", style: "width: {width}%;" }
            }
        }
    }
}
