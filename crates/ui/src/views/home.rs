use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;

/// Entry point: sends the user to the questionnaire or to the login page.
#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    use_effect(move || {
        if ctx.is_authenticated() {
            navigator.replace(Route::Questionnaire {});
        } else {
            navigator.replace(Route::Login {});
        }
    });

    rsx! {
        div { class: "page page--center",
            p { "Loading..." }
        }
    }
}
