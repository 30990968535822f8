use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;

const STYLE: Asset = asset!("/assets/style.css");

#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: STYLE }
        document::Title { "Questionnaire" }

        main { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    section { class: "fatal", role: "alert",
                        h1 { "The questionnaire stopped unexpectedly" }
                        p { "Your answers are stored by the service. Restart the app to pick up where you left off." }
                        details {
                            summary { "Details" }
                            pre { "{errors:?}" }
                        }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
