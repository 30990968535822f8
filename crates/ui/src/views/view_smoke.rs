use std::sync::Arc;

use dioxus::prelude::*;
use questionnaire_core::model::{AnswerValue, FormValue, QuestionId};
use questionnaire_core::time::fixed_clock;
use serde_json::json;
use services::api::{Endpoint, InjectedFailure};
use services::{SessionStore, StartMode};

use super::questionnaire::QuestionAction;
use super::test_harness::{
    ViewHarness, ViewKind, setup_view_harness, setup_view_harness_with_session, text_questions,
};

fn type_answer(harness: &ViewHarness, text: &str) {
    let mut form = harness.handles().form();
    if let Some(vm) = form.write().as_mut() {
        vm.set_text(text.to_string());
    }
}

async fn complete_run(harness: &ViewHarness, answers: &[&str]) {
    let mut controller = harness.controller();
    controller.start(StartMode::Fresh).await.expect("start run");
    for answer in answers {
        let id = controller.current_question().expect("question").id();
        let value = AnswerValue::Text((*answer).to_string());
        if controller.is_last() {
            controller.finish(id, &value).await.expect("finish run");
        } else {
            controller.submit(id, &value).await.expect("submit answer");
        }
    }
    assert!(harness.api.is_completed());
}

#[tokio::test(flavor = "current_thread")]
async fn questionnaire_view_renders_first_question_and_progress() {
    let mut harness = setup_view_harness(ViewKind::Questionnaire, text_questions(3)).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 1"), "missing question in {html}");
    assert!(html.contains("Progress: 0%"), "missing progress in {html}");
    assert!(html.contains("0 of 3 questions"), "missing counts in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
    assert!(!html.contains("Previous"), "unexpected previous button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn blank_required_answer_is_not_submitted() {
    let mut harness = setup_view_harness(ViewKind::Questionnaire, text_questions(3)).await;
    harness.rebuild();
    harness.settle().await;

    harness.handles().dispatch().call(QuestionAction::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("This field is required"), "missing validation in {html}");
    assert_eq!(harness.api.calls(Endpoint::SubmitAnswer), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn submit_advances_and_previous_restores_answer() {
    let mut harness = setup_view_harness(ViewKind::Questionnaire, text_questions(3)).await;
    harness.rebuild();
    harness.settle().await;

    type_answer(&harness, "Ada");
    harness.handles().dispatch().call(QuestionAction::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 2"), "missing second question in {html}");
    assert!(html.contains("1 of 3 questions"), "missing counts in {html}");
    assert!(html.contains("Progress: 33%"), "missing progress in {html}");
    assert!(html.contains("Previous"), "missing previous button in {html}");
    assert_eq!(harness.api.recorded_answer(QuestionId::new(1)), Some(json!("Ada")));

    harness.handles().dispatch().call(QuestionAction::Previous);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 1"), "missing first question in {html}");
    let form = harness.handles().form();
    let value = form.read().as_ref().map(|vm| vm.value().clone());
    assert_eq!(value, Some(FormValue::Text("Ada".into())));
}

#[tokio::test(flavor = "current_thread")]
async fn double_submit_in_one_tick_posts_once() {
    let mut harness = setup_view_harness(ViewKind::Questionnaire, text_questions(3)).await;
    harness.rebuild();
    harness.settle().await;

    type_answer(&harness, "Ada");
    let dispatch = harness.handles().dispatch();
    dispatch.call(QuestionAction::Submit);
    dispatch.call(QuestionAction::Submit);
    harness.settle().await;

    assert_eq!(harness.api.calls(Endpoint::SubmitAnswer), 1);
    let html = harness.render();
    assert!(html.contains("Question 2"), "missing second question in {html}");
    assert!(!html.contains("alert--error"), "unexpected error banner in {html}");

    // History is [1, 2]: one step back lands on the first question with nothing before it.
    harness.handles().dispatch().call(QuestionAction::Previous);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 1"), "missing first question in {html}");
    assert!(!html.contains("Previous"), "unexpected previous button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn last_question_offers_finish() {
    let mut harness = setup_view_harness(ViewKind::NewRun, text_questions(1)).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Finish"), "missing finish button in {html}");

    type_answer(&harness, "done");
    harness.handles().dispatch().call(QuestionAction::Submit);
    harness.settle().await;
    assert!(harness.api.is_completed());
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_answer_keeps_question_and_shows_error() {
    let mut harness = setup_view_harness(ViewKind::Questionnaire, text_questions(2)).await;
    harness.rebuild();
    harness.settle().await;

    harness
        .api
        .fail_next(Endpoint::SubmitAnswer, InjectedFailure::Unavailable);
    type_answer(&harness, "Ada");
    harness.handles().dispatch().call(QuestionAction::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Failed to submit answer. Please try again."),
        "missing error in {html}"
    );
    assert!(html.contains("Question 1"), "question changed in {html}");
    assert_eq!(harness.api.recorded_answer(QuestionId::new(1)), None);
}

#[tokio::test(flavor = "current_thread")]
async fn unavailable_service_offers_retry() {
    let mut harness = setup_view_harness(ViewKind::Questionnaire, text_questions(2)).await;
    harness
        .api
        .fail_always(Endpoint::InitialQuestion, InjectedFailure::Unavailable);
    harness
        .api
        .fail_always(Endpoint::Progress, InjectedFailure::Unavailable);

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Failed to load question. Please try again."),
        "missing error in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn summary_view_gates_unfinished_run() {
    let mut harness = setup_view_harness(ViewKind::Summary, text_questions(2)).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Please complete the questionnaire before viewing the summary."),
        "missing gate message in {html}"
    );
    assert!(html.contains("Continue Questionnaire"), "missing action in {html}");
    assert_eq!(harness.api.calls(Endpoint::Summary), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn summary_view_renders_finished_run() {
    let mut harness = setup_view_harness(ViewKind::Summary, text_questions(2)).await;
    complete_run(&harness, &["Ada", "Lovelace"]).await;

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Questionnaire Summary"), "missing title in {html}");
    assert!(html.contains("100% Complete"), "missing percentage in {html}");
    assert!(html.contains("Your Answers"), "missing answers in {html}");
    assert!(html.contains("Question 2"), "missing entry in {html}");
    assert!(html.contains("Lovelace"), "missing answer text in {html}");
    assert!(html.contains("Nov 14, 2023"), "missing timestamp in {html}");
    assert!(html.contains("Print Summary"), "missing print action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn summary_view_handles_malformed_summary() {
    let mut harness = setup_view_harness(ViewKind::Summary, text_questions(1)).await;
    complete_run(&harness, &["only"]).await;
    harness
        .api
        .fail_next(Endpoint::Summary, InjectedFailure::Malformed);

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("No summary data available. Please complete the questionnaire first."),
        "missing fallback in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_renders_form() {
    let session = Arc::new(SessionStore::in_memory(fixed_clock()));
    let mut harness = setup_view_harness_with_session(ViewKind::Login, text_questions(1), session);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Email"), "missing email field in {html}");
    assert!(html.contains("Password"), "missing password field in {html}");
    assert!(html.contains("Register"), "missing register link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn register_view_renders_confirmation_field() {
    let session = Arc::new(SessionStore::in_memory(fixed_clock()));
    let mut harness =
        setup_view_harness_with_session(ViewKind::Register, text_questions(1), session);
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Create an account"), "missing title in {html}");
    assert!(html.contains("Confirm password"), "missing confirmation in {html}");
}
