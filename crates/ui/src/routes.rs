use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator, use_route};

use crate::context::AppContext;
use crate::views::{HomeView, LoginView, NewRunView, QuestionnaireView, RegisterView, SummaryView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/login", LoginView)] Login {},
        #[route("/register", RegisterView)] Register {},
        #[route("/questionnaire", QuestionnaireView)] Questionnaire {},
        #[route("/questionnaire/new", NewRunView)] NewRun {},
        #[route("/summary", SummaryView)] Summary {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            TopBar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn TopBar() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    // Re-render on navigation so the auth links follow the session.
    let _route = use_route::<Route>();
    let logging_out = use_signal(|| false);
    let authenticated = ctx.is_authenticated();

    let on_logout = {
        let auth = ctx.auth();
        use_callback(move |()| {
            let mut logging_out = logging_out;
            let auth = auth.clone();
            spawn(async move {
                logging_out.set(true);
                if let Err(err) = auth.logout().await {
                    tracing::warn!(%err, "logout did not complete cleanly");
                }
                logging_out.set(false);
                navigator.replace(Route::Login {});
            });
        })
    };

    rsx! {
        header { class: "topbar",
            h1 { class: "topbar__title", "Questionnaire" }
            nav { class: "topbar__nav",
                if authenticated {
                    Link { to: Route::Questionnaire {}, "Questionnaire" }
                    Link { to: Route::Summary {}, "Summary" }
                    button {
                        class: "btn btn-link",
                        r#type: "button",
                        disabled: logging_out(),
                        onclick: move |_| on_logout.call(()),
                        "Logout"
                    }
                } else {
                    Link { to: Route::Login {}, "Login" }
                    Link { to: Route::Register {}, "Register" }
                }
            }
        }
    }
}
