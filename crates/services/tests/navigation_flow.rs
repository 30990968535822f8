use std::sync::Arc;

use questionnaire_core::model::{
    AnswerValue, FormValue, NumberRules, Question, QuestionId, QuestionKind, TextRules,
};
use questionnaire_core::time::fixed_clock;
use serde_json::json;
use services::api::{Endpoint, InjectedFailure};
use services::{
    InMemoryQuestionnaireApi, NavigationController, NavigationError, NavigationOutcome,
    SessionStore, SessionToken, StartMode,
};

fn questions(count: u64) -> Vec<Question> {
    (1..=count)
        .map(|id| {
            let kind = if id % 2 == 0 {
                QuestionKind::Number(NumberRules::default())
            } else {
                QuestionKind::Text(TextRules::default())
            };
            Question::new(QuestionId::new(id), format!("Question {id}"), kind).with_required(true)
        })
        .collect()
}

async fn signed_in_session() -> Arc<SessionStore> {
    let session = Arc::new(SessionStore::in_memory(fixed_clock()));
    session
        .establish(SessionToken::new("test-token"), Some("ada@example.com".into()))
        .await
        .unwrap();
    session
}

async fn fixture(count: u64) -> (Arc<InMemoryQuestionnaireApi>, Arc<SessionStore>, NavigationController) {
    let session = signed_in_session().await;
    let api = Arc::new(
        InMemoryQuestionnaireApi::new(fixed_clock(), questions(count)).with_session(Arc::clone(&session)),
    );
    let controller = NavigationController::new(api.clone(), Arc::clone(&session));
    (api, session, controller)
}

fn text(value: &str) -> AnswerValue {
    AnswerValue::Text(value.to_string())
}

fn current_id(controller: &NavigationController) -> QuestionId {
    controller.current_question().expect("question on screen").id()
}

#[tokio::test]
async fn start_without_session_is_rejected() {
    let session = Arc::new(SessionStore::in_memory(fixed_clock()));
    let api = Arc::new(InMemoryQuestionnaireApi::new(fixed_clock(), questions(3)));
    let mut controller = NavigationController::new(api.clone(), session);

    let err = controller.start(StartMode::Resume).await.unwrap_err();
    assert!(matches!(err, NavigationError::Unauthenticated));
    assert!(err.requires_login());
    assert_eq!(api.calls(Endpoint::InitialQuestion), 0);
}

#[tokio::test]
async fn start_seeds_history_and_progress() {
    let (_api, _session, mut controller) = fixture(10).await;
    let outcome = controller.start(StartMode::Resume).await.unwrap();

    assert_eq!(outcome, NavigationOutcome::Question);
    assert_eq!(current_id(&controller), QuestionId::new(1));
    assert_eq!(controller.history().len(), 1);
    assert!(!controller.has_previous());
    assert_eq!(controller.progress().total, 10);
    assert_eq!(controller.progress().percentage, 0);
    assert!(!controller.is_last());
}

#[tokio::test]
async fn submit_appends_exactly_one_history_entry() {
    let (_api, _session, mut controller) = fixture(5).await;
    controller.start(StartMode::Resume).await.unwrap();

    for expected in 2..=4 {
        let before = controller.history().len();
        let id = current_id(&controller);
        let outcome = controller.submit(id, &text("answer")).await.unwrap();

        assert_eq!(outcome, NavigationOutcome::Question);
        assert_eq!(controller.history().len(), before + 1);
        assert_eq!(controller.history().last(), Some(QuestionId::new(expected)));
        assert_eq!(current_id(&controller), QuestionId::new(expected));
        assert!(controller.has_previous());
        assert_eq!(controller.state().held_answer(), None);
    }
    assert_eq!(controller.progress().completed, 3);
    assert_eq!(controller.progress().percentage, 60);
}

#[tokio::test]
async fn last_question_flag_follows_progress() {
    let (_api, _session, mut controller) = fixture(10).await;
    controller.start(StartMode::Resume).await.unwrap();

    for _ in 0..9 {
        assert!(!controller.is_last());
        let id = current_id(&controller);
        controller.submit(id, &text("x")).await.unwrap();
    }

    assert_eq!(controller.progress().completed, 9);
    assert_eq!(controller.progress().percentage, 90);
    assert!(controller.is_last());
}

#[tokio::test]
async fn submitting_the_last_question_completes() {
    let (api, _session, mut controller) = fixture(2).await;
    controller.start(StartMode::Resume).await.unwrap();
    controller.submit(QuestionId::new(1), &text("a")).await.unwrap();

    let outcome = controller
        .submit(QuestionId::new(2), &AnswerValue::Number(3.0))
        .await
        .unwrap();
    assert_eq!(outcome, NavigationOutcome::Completed);
    assert!(controller.is_last());
    assert!(api.is_completed());
    assert_eq!(controller.progress().percentage, 100);
}

#[tokio::test]
async fn finish_completes_regardless_of_last_flag() {
    let (api, _session, mut controller) = fixture(3).await;
    controller.start(StartMode::Resume).await.unwrap();
    assert!(!controller.is_last());

    let outcome = controller.finish(QuestionId::new(1), &text("early")).await.unwrap();
    assert_eq!(outcome, NavigationOutcome::Completed);
    assert_eq!(api.recorded_answer(QuestionId::new(1)), Some(json!("early")));
}

#[tokio::test]
async fn previous_twice_from_three_entries() {
    let (api, _session, mut controller) = fixture(5).await;
    controller.start(StartMode::Resume).await.unwrap();
    controller.submit(QuestionId::new(1), &text("first")).await.unwrap();
    controller
        .submit(QuestionId::new(2), &AnswerValue::Number(42.0))
        .await
        .unwrap();
    assert_eq!(controller.history().len(), 3);

    controller.previous().await.unwrap();
    assert_eq!(current_id(&controller), QuestionId::new(2));
    assert_eq!(controller.form_value(), FormValue::Text("42".into()));

    controller.previous().await.unwrap();
    assert_eq!(current_id(&controller), QuestionId::new(1));
    assert_eq!(controller.form_value(), FormValue::Text("first".into()));
    assert_eq!(controller.history().len(), 1);
    assert!(!controller.has_previous());

    let calls = api.calls(Endpoint::Question);
    controller.previous().await.unwrap();
    assert_eq!(controller.history().len(), 1);
    assert_eq!(api.calls(Endpoint::Question), calls);
}

#[tokio::test]
async fn failed_submit_leaves_state_intact() {
    let (api, session, mut controller) = fixture(4).await;
    controller.start(StartMode::Resume).await.unwrap();
    controller.submit(QuestionId::new(1), &text("a")).await.unwrap();
    let before = controller.state().clone();

    api.fail_next(Endpoint::SubmitAnswer, InjectedFailure::Unavailable);
    let err = controller
        .submit(QuestionId::new(2), &AnswerValue::Number(1.0))
        .await
        .unwrap_err();

    assert!(!err.requires_login());
    assert_eq!(controller.state(), &before);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn failed_previous_leaves_state_intact() {
    let (api, _session, mut controller) = fixture(4).await;
    controller.start(StartMode::Resume).await.unwrap();
    controller.submit(QuestionId::new(1), &text("a")).await.unwrap();
    let before = controller.state().clone();

    api.fail_next(Endpoint::Question, InjectedFailure::Unavailable);
    assert!(controller.previous().await.is_err());
    assert_eq!(controller.state(), &before);
}

#[tokio::test]
async fn unauthorized_clears_session_and_requires_login() {
    let (api, session, mut controller) = fixture(4).await;
    controller.start(StartMode::Resume).await.unwrap();

    api.fail_next(Endpoint::SubmitAnswer, InjectedFailure::Unauthorized);
    let err = controller.submit(QuestionId::new(1), &text("a")).await.unwrap_err();
    assert!(err.requires_login());
    assert!(!session.is_authenticated());

    let err = controller.submit(QuestionId::new(1), &text("a")).await.unwrap_err();
    assert!(matches!(err, NavigationError::Unauthenticated));
}

#[tokio::test]
async fn failed_reconcile_after_submit_keeps_old_progress() {
    let (api, _session, mut controller) = fixture(4).await;
    controller.start(StartMode::Resume).await.unwrap();
    let progress_before = controller.progress().clone();

    api.fail_next(Endpoint::Progress, InjectedFailure::Unavailable);
    let outcome = controller.submit(QuestionId::new(1), &text("a")).await.unwrap();

    assert_eq!(outcome, NavigationOutcome::Question);
    assert_eq!(current_id(&controller), QuestionId::new(2));
    assert_eq!(controller.progress(), &progress_before);

    controller.reconcile().await.unwrap();
    assert_eq!(controller.progress().completed, 1);
}

#[tokio::test]
async fn resume_falls_back_to_recorded_progress() {
    let (api, session, mut first_visit) = fixture(5).await;
    first_visit.start(StartMode::Resume).await.unwrap();
    first_visit.submit(QuestionId::new(1), &text("a")).await.unwrap();
    first_visit
        .submit(QuestionId::new(2), &AnswerValue::Number(2.0))
        .await
        .unwrap();

    api.fail_next(Endpoint::InitialQuestion, InjectedFailure::Unavailable);
    let mut controller = NavigationController::new(api.clone(), session);
    let outcome = controller.start(StartMode::Resume).await.unwrap();

    assert_eq!(outcome, NavigationOutcome::Question);
    assert_eq!(current_id(&controller), QuestionId::new(3));
    assert_eq!(
        controller.history().as_slice(),
        &[QuestionId::new(1), QuestionId::new(2), QuestionId::new(3)]
    );
    assert!(controller.has_previous());
    assert_eq!(controller.progress().completed, 2);
}

#[tokio::test]
async fn resume_of_completed_run_starts_fresh() {
    let (api, session, mut first_visit) = fixture(2).await;
    first_visit.start(StartMode::Resume).await.unwrap();
    first_visit.submit(QuestionId::new(1), &text("a")).await.unwrap();
    first_visit
        .submit(QuestionId::new(2), &AnswerValue::Number(1.0))
        .await
        .unwrap();
    assert!(api.is_completed());

    api.fail_next(Endpoint::InitialQuestion, InjectedFailure::Unavailable);
    let mut controller = NavigationController::new(api.clone(), session);
    controller.start(StartMode::Resume).await.unwrap();

    assert_eq!(api.calls(Endpoint::InitialQuestion), 3);
    assert_eq!(current_id(&controller), QuestionId::new(1));
    assert_eq!(controller.history().len(), 1);
    assert!(!api.is_completed());
}

#[tokio::test]
async fn resume_surfaces_unauthorized_from_initial_question() {
    let (api, session, mut controller) = fixture(3).await;
    api.fail_next(Endpoint::InitialQuestion, InjectedFailure::Unauthorized);

    let err = controller.start(StartMode::Resume).await.unwrap_err();
    assert!(err.requires_login());
    assert!(!session.is_authenticated());
    assert_eq!(api.calls(Endpoint::Progress), 0);
}

#[tokio::test]
async fn fresh_start_resets_local_state() {
    let (api, _session, mut controller) = fixture(4).await;
    controller.start(StartMode::Resume).await.unwrap();
    controller.submit(QuestionId::new(1), &text("a")).await.unwrap();
    controller
        .submit(QuestionId::new(2), &AnswerValue::Number(2.0))
        .await
        .unwrap();

    controller.start(StartMode::Fresh).await.unwrap();
    assert_eq!(current_id(&controller), QuestionId::new(1));
    assert_eq!(controller.history().len(), 1);
    assert_eq!(controller.progress().completed, 0);
    assert_eq!(api.recorded_answer(QuestionId::new(1)), None);
}

#[tokio::test]
async fn fresh_start_failure_is_surfaced() {
    let (api, _session, mut controller) = fixture(4).await;
    api.fail_next(Endpoint::InitialQuestion, InjectedFailure::Unavailable);

    let err = controller.start(StartMode::Fresh).await.unwrap_err();
    assert!(!err.requires_login());
    assert!(controller.current_question().is_none());
    assert_eq!(api.calls(Endpoint::Progress), 0);
}
