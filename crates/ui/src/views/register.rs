use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use services::{AuthError, RegisterOutcome};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{FieldErrors, RegisterForm};

#[derive(Clone, Debug, PartialEq, Eq)]
enum RegisterFailure {
    /// Explanation sent by the service, shown verbatim.
    Rejected(String),
    Other(ViewError),
}

impl RegisterFailure {
    fn from_auth(err: &AuthError) -> Self {
        match err {
            AuthError::Rejected(detail) => Self::Rejected(detail.clone()),
            _ => Self::Other(ViewError::Registration),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Rejected(detail) => detail,
            Self::Other(err) => err.message(),
        }
    }
}

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut form = use_signal(RegisterForm::default);
    let field_errors = use_signal(FieldErrors::default);
    let failure = use_signal(|| None::<RegisterFailure>);
    let submitting = use_signal(|| false);

    let on_submit = {
        let auth = ctx.auth();
        use_callback(move |()| {
            let mut field_errors = field_errors;
            let mut failure = failure;
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
                let result = auth
                    .register(values.name.trim(), values.email.trim(), &values.password)
                    .await;
                match result {
                    Ok(RegisterOutcome::SignedIn(_)) => {
                        failure.set(None);
                        navigator.replace(Route::Questionnaire {});
                    }
                    Ok(RegisterOutcome::LoginRequired) => {
                        failure.set(None);
                        navigator.replace(Route::Login {});
                    }
                    Err(err) => {
                        tracing::info!(%err, "registration failed");
                        failure.set(Some(RegisterFailure::from_auth(&err)));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let errors = field_errors();
    let label = if submitting() { "Creating account..." } else { "Register" };

    rsx! {
        div { class: "page page--center auth",
            h2 { "Create an account" }

            if let Some(failure) = failure.read().as_ref() {
                p { class: "alert alert--error", role: "alert", "{failure.message()}" }
            }

            form {
                class: "auth__form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                label { r#for: "register-name", "Name" }
                input {
                    id: "register-name",
                    r#type: "text",
                    autocomplete: "name",
                    value: "{form.read().name}",
                    oninput: move |evt: FormEvent| form.write().name = evt.value(),
                }
                if let Some(message) = errors.name {
                    p { class: "field-error", "{message}" }
                }

                label { r#for: "register-email", "Email" }
                input {
                    id: "register-email",
                    r#type: "email",
                    autocomplete: "email",
                    value: "{form.read().email}",
                    oninput: move |evt: FormEvent| form.write().email = evt.value(),
                }
                if let Some(message) = errors.email {
                    p { class: "field-error", "{message}" }
                }

                label { r#for: "register-password", "Password" }
                input {
                    id: "register-password",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: "{form.read().password}",
                    oninput: move |evt: FormEvent| form.write().password = evt.value(),
                }
                if let Some(message) = errors.password {
                    p { class: "field-error", "{message}" }
                }

                label { r#for: "register-confirmation", "Confirm password" }
                input {
                    id: "register-confirmation",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: "{form.read().confirmation}",
                    oninput: move |evt: FormEvent| form.write().confirmation = evt.value(),
                }
                if let Some(message) = errors.confirmation {
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
                "Already registered? "
                Link { to: Route::Login {}, "Log in" }
            }
        }
    }
}
