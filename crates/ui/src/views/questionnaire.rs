use dioxus::prelude::*;
use dioxus_router::use_navigator;

use services::{NavigationController, NavigationOutcome, StartMode};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ProgressBar, ViewError, ViewState, view_state_from_resource};
use crate::vm::{FormAction, InputWidget, QuestionFormVm};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QuestionAction {
    Submit,
    Previous,
}

/// Progress and navigation flags copied out of the controller after each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StepSnapshot {
    percentage: u8,
    completed: u32,
    total: u32,
    has_previous: bool,
    is_last: bool,
}

impl StepSnapshot {
    fn from_controller(controller: &NavigationController) -> Self {
        let progress = controller.progress();
        Self {
            percentage: progress.percentage,
            completed: progress.completed,
            total: progress.total,
            has_previous: controller.has_previous(),
            is_last: controller.is_last(),
        }
    }
}

fn sync_from_controller(
    controller: &NavigationController,
    mut form: Signal<Option<QuestionFormVm>>,
    mut step: Signal<StepSnapshot>,
) {
    form.set(
        controller
            .current_question()
            .cloned()
            .map(|question| QuestionFormVm::new(question, controller.form_value())),
    );
    step.set(StepSnapshot::from_controller(controller));
}

#[component]
pub fn QuestionnaireView() -> Element {
    rsx! {
        QuestionnairePage { mode: StartMode::Resume }
    }
}

/// Starts a new run, discarding whatever the previous one left behind.
#[component]
pub fn NewRunView() -> Element {
    rsx! {
        QuestionnairePage { mode: StartMode::Fresh }
    }
}

#[component]
fn QuestionnairePage(mode: StartMode) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let controller = use_signal(|| None::<NavigationController>);
    let form = use_signal(|| None::<QuestionFormVm>);
    let step = use_signal(StepSnapshot::default);
    let mut error = use_signal(|| None::<ViewError>);
    let busy = use_signal(|| false);

    let mut resource = use_resource(move || {
        let ctx = ctx.clone();
        let mut controller = controller;
        let mut error = error;
        async move {
            let fallback = match mode {
                StartMode::Resume => ViewError::LoadQuestion,
                StartMode::Fresh => ViewError::StartQuestionnaire,
            };
            let mut nav = ctx.navigation();
            match nav.start(mode).await {
                Ok(_) => {
                    sync_from_controller(&nav, form, step);
                    controller.set(Some(nav));
                    error.set(None);
                    Ok::<_, ViewError>(())
                }
                Err(err) => {
                    tracing::warn!(%err, ?mode, "could not enter the questionnaire");
                    let view_error = ViewError::from_navigation(&err, fallback);
                    error.set(Some(view_error));
                    Err(view_error)
                }
            }
        }
    });

    use_effect(move || {
        if error() == Some(ViewError::Unauthorized) {
            navigator.replace(Route::Login {});
        }
    });

    let dispatch_action = use_callback(move |action: QuestionAction| {
        let mut controller = controller;
        let mut form = form;
        let mut step = step;
        let mut error = error;
        let mut busy = busy;

        if busy() {
            return;
        }

        match action {
            QuestionAction::Submit => {
                let checked = {
                    let mut guard = form.write();
                    let Some(vm) = guard.as_mut() else {
                        return;
                    };
                    vm.validate()
                        .map(|answer| (vm.question().id(), vm.value().clone(), answer))
                };
                // Validation messages are already on the form.
                let Some((question_id, held, answer)) = checked else {
                    return;
                };

                busy.set(true);
                spawn(async move {
                    let taken = controller.write().take();
                    // Another step owns the controller until it puts it back.
                    let Some(mut nav) = taken else {
                        return;
                    };

                    nav.hold_answer(held);
                    let form_action = FormAction::for_last_question(nav.is_last());
                    let (result, fallback) = match form_action {
                        FormAction::Continue => {
                            (nav.submit(question_id, &answer).await, ViewError::SubmitAnswer)
                        }
                        FormAction::Finish => (
                            nav.finish(question_id, &answer).await,
                            ViewError::FinishQuestionnaire,
                        ),
                    };

                    match result {
                        Ok(NavigationOutcome::Completed) => {
                            error.set(None);
                            step.set(StepSnapshot::from_controller(&nav));
                            controller.set(Some(nav));
                            busy.set(false);
                            navigator.push(Route::Summary {});
                            return;
                        }
                        Ok(NavigationOutcome::Question) => {
                            error.set(None);
                            sync_from_controller(&nav, form, step);
                        }
                        Err(err) => {
                            tracing::warn!(%err, question = %question_id, "answer was not accepted");
                            error.set(Some(ViewError::from_navigation(&err, fallback)));
                        }
                    }

                    // Put the controller back so the page stays usable after errors.
                    controller.set(Some(nav));
                    busy.set(false);
                });
            }
            QuestionAction::Previous => {
                busy.set(true);
                spawn(async move {
                    let taken = controller.write().take();
                    let Some(mut nav) = taken else {
                        return;
                    };

                    match nav.previous().await {
                        Ok(()) => {
                            error.set(None);
                            sync_from_controller(&nav, form, step);
                        }
                        Err(err) => {
                            tracing::warn!(%err, "could not step back");
                            error.set(Some(ViewError::from_navigation(&err, ViewError::GoBack)));
                        }
                    }

                    controller.set(Some(nav));
                    busy.set(false);
                });
            }
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuestionnaireTestHandles>() {
                handles.register(dispatch_action, form);
            }
        }
    }

    let load_state = view_state_from_resource(&resource);
    let snapshot = step();
    let has_form = form.read().is_some();
    let shown_error = error().filter(|err| *err != ViewError::Unauthorized);

    rsx! {
        div { class: "page questionnaire",
            ProgressBar {
                percentage: snapshot.percentage,
                completed: snapshot.completed,
                total: snapshot.total,
            }

            if let Some(err) = shown_error {
                p { class: "alert alert--error", role: "alert", "{err.message()}" }
            }

            if has_form {
                QuestionCard {
                    form,
                    snapshot,
                    busy: busy(),
                    on_action: dispatch_action,
                }
            } else {
                match load_state {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { class: "muted", "Loading question..." }
                    },
                    ViewState::Ready(()) => rsx! {
                        p { class: "muted", "No question to show." }
                    },
                    ViewState::Error(_) => rsx! {
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| {
                                error.set(None);
                                resource.restart();
                            },
                            "Retry"
                        }
                    },
                }
            }
        }
    }
}

#[component]
fn QuestionCard(
    form: Signal<Option<QuestionFormVm>>,
    snapshot: StepSnapshot,
    busy: bool,
    on_action: Callback<QuestionAction>,
) -> Element {
    let Some(vm) = form.read().clone() else {
        return rsx! {};
    };
    let question = vm.question();
    let action = FormAction::for_last_question(snapshot.is_last);
    let submit_label = if busy { "Saving..." } else { action.label() };

    rsx! {
        section { class: "question-card",
            h2 { class: "question-card__text",
                "{question.text()}"
                if vm.is_required() {
                    span { class: "question-card__required", aria_hidden: "true", " *" }
                }
            }

            AnswerInput { form, disabled: busy }

            if let Some(message) = vm.error_message() {
                p { class: "field-error", role: "alert", "{message}" }
            }

            div { class: "question-card__actions",
                if snapshot.has_previous {
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        disabled: busy,
                        onclick: move |_| on_action.call(QuestionAction::Previous),
                        "Previous"
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: busy,
                    onclick: move |_| on_action.call(QuestionAction::Submit),
                    "{submit_label}"
                }
            }
        }
    }
}

#[component]
fn AnswerInput(form: Signal<Option<QuestionFormVm>>, disabled: bool) -> Element {
    let mut form = form;
    let Some(vm) = form.read().clone() else {
        return rsx! {};
    };
    let text = vm.value().as_text().to_string();
    let group = format!("answer-{}", vm.question().id());
    let on_text = move |evt: FormEvent| {
        if let Some(vm) = form.write().as_mut() {
            vm.set_text(evt.value());
        }
    };

    match vm.widget().clone() {
        InputWidget::TextArea => rsx! {
            textarea {
                id: "answer",
                class: "answer-input",
                rows: "4",
                value: "{text}",
                disabled,
                oninput: on_text,
            }
        },
        InputWidget::NumberField { min, max } => rsx! {
            input {
                id: "answer",
                class: "answer-input",
                r#type: "number",
                step: "any",
                min: min.map(|value| value.to_string()),
                max: max.map(|value| value.to_string()),
                value: "{text}",
                disabled,
                oninput: on_text,
            }
        },
        InputWidget::DateField => rsx! {
            input {
                id: "answer",
                class: "answer-input",
                r#type: "date",
                value: "{text}",
                disabled,
                oninput: on_text,
            }
        },
        InputWidget::ExclusiveChoices(options) => rsx! {
            div { class: "choices", role: "radiogroup",
                for option in options {
                    label { key: "{option}", class: "choice",
                        input {
                            r#type: "radio",
                            name: "{group}",
                            value: "{option}",
                            checked: text == option,
                            disabled,
                            onchange: {
                                let option = option.clone();
                                move |_| {
                                    if let Some(vm) = form.write().as_mut() {
                                        vm.set_text(option.clone());
                                    }
                                }
                            },
                        }
                        span { "{option}" }
                    }
                }
            }
        },
        InputWidget::InclusiveChoices(options) => rsx! {
            div { class: "choices",
                for option in options {
                    label { key: "{option}", class: "choice",
                        input {
                            r#type: "checkbox",
                            value: "{option}",
                            checked: vm.value().is_selected(&option),
                            disabled,
                            onchange: {
                                let option = option.clone();
                                move |_| {
                                    if let Some(vm) = form.write().as_mut() {
                                        let selected = vm.value().is_selected(&option);
                                        vm.toggle_option(&option, !selected);
                                    }
                                }
                            },
                        }
                        span { "{option}" }
                    }
                }
            }
        },
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuestionnaireTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuestionAction>>>>,
    form: Rc<RefCell<Option<Signal<Option<QuestionFormVm>>>>>,
}

#[cfg(test)]
impl QuestionnaireTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<QuestionAction>,
        form: Signal<Option<QuestionFormVm>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.form.borrow_mut() = Some(form);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuestionAction> {
        (*self.dispatch.borrow()).expect("questionnaire dispatch registered")
    }

    pub(crate) fn form(&self) -> Signal<Option<QuestionFormVm>> {
        (*self.form.borrow()).expect("questionnaire form registered")
    }
}
