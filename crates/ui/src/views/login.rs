use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{FieldErrors, LoginForm};

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut form = use_signal(LoginForm::default);
    let field_errors = use_signal(FieldErrors::default);
    let error = use_signal(|| None::<ViewError>);
    let submitting = use_signal(|| false);

    let on_submit = {
        let auth = ctx.auth();
        use_callback(move |()| {
            let mut field_errors = field_errors;
            let mut error = error;
            let mut submitting = submitting;
            if submitting() {
                return;
            }

            let values = form();
            if let Err(errors) = values.validate() {
                field_errors.set(errors);
                return;
            }
            field_errors.set(FieldErrors::default());

            let auth = auth.clone();
            spawn(async move {
                submitting.set(true);
                match auth.login(values.email.trim(), &values.password).await {
                    Ok(_) => {
                        error.set(None);
                        navigator.replace(Route::Questionnaire {});
                    }
                    Err(err) => {
                        tracing::info!(%err, "login failed");
                        error.set(Some(ViewError::from_login(&err)));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let errors = field_errors();
    let label = if submitting() { "Logging in..." } else { "Log in" };

    rsx! {
        div { class: "page page--center auth",
            h2 { "Log in" }

            if let Some(err) = error() {
                p { class: "alert alert--error", role: "alert", "{err.message()}" }
            }

            form {
                class: "auth__form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                label { r#for: "login-email", "Email" }
                input {
                    id: "login-email",
                    r#type: "email",
                    autocomplete: "email",
                    value: "{form.read().email}",
                    oninput: move |evt: FormEvent| form.write().email = evt.value(),
                }
                if let Some(message) = errors.email {
                    p { class: "field-error", "{message}" }
                }

                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    autocomplete: "current-password",
                    value: "{form.read().password}",
                    oninput: move |evt: FormEvent| form.write().password = evt.value(),
                }
                if let Some(message) = errors.password {
                    p { class: "field-error", "{message}" }
                }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    "{label}"
                }
            }

            p { class: "muted",
                "No account yet? "
                Link { to: Route::Register {}, "Register" }
            }
        }
    }
}
