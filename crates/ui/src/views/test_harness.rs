use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use questionnaire_core::model::{Question, QuestionId, QuestionKind, TextRules};
use questionnaire_core::time::fixed_clock;
use services::{
    AuthService, ClientConfig, InMemoryQuestionnaireApi, NavigationController, QuestionnaireApi,
    SessionStore, SessionToken, SummaryService,
};

use crate::context::{UiApp, build_app_context};
use crate::views::questionnaire::QuestionnaireTestHandles;
use crate::views::{LoginView, NewRunView, QuestionnaireView, RegisterView, SummaryView};

struct TestApp {
    session: Arc<SessionStore>,
    api: Arc<InMemoryQuestionnaireApi>,
    auth: Arc<AuthService>,
    summary: Arc<SummaryService>,
}

impl UiApp for TestApp {
    fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    fn summary(&self) -> Arc<SummaryService> {
        Arc::clone(&self.summary)
    }

    fn navigation(&self) -> NavigationController {
        let api: Arc<dyn QuestionnaireApi> = self.api.clone();
        NavigationController::new(api, Arc::clone(&self.session))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Questionnaire,
    NewRun,
    Summary,
    Login,
    Register,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    questionnaire_handles: Option<QuestionnaireTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.questionnaire_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Questionnaire => rsx! { QuestionnaireView {} },
        ViewKind::NewRun => rsx! { NewRunView {} },
        ViewKind::Summary => rsx! { SummaryView {} },
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Register => rsx! { RegisterView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: Arc<InMemoryQuestionnaireApi>,
    pub session: Arc<SessionStore>,
    pub questionnaire_handles: Option<QuestionnaireTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let spawned tasks and resources run to completion.
    pub async fn settle(&mut self) {
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn handles(&self) -> QuestionnaireTestHandles {
        self.questionnaire_handles
            .clone()
            .expect("questionnaire handles installed")
    }

    /// A controller over the same service and session the view uses.
    pub fn controller(&self) -> NavigationController {
        let api: Arc<dyn QuestionnaireApi> = self.api.clone();
        NavigationController::new(api, Arc::clone(&self.session))
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Required free-text questions titled "Question 1" to "Question N".
pub fn text_questions(count: u64) -> Vec<Question> {
    (1..=count)
        .map(|id| {
            Question::new(
                QuestionId::new(id),
                format!("Question {id}"),
                QuestionKind::Text(TextRules::default()),
            )
            .with_required(true)
        })
        .collect()
}

pub async fn setup_view_harness(view: ViewKind, questions: Vec<Question>) -> ViewHarness {
    let session = Arc::new(SessionStore::in_memory(fixed_clock()));
    session
        .establish(SessionToken::new("view-token"), Some("ada@example.com".into()))
        .await
        .expect("establish session");
    setup_view_harness_with_session(view, questions, session)
}

pub fn setup_view_harness_with_session(
    view: ViewKind,
    questions: Vec<Question>,
    session: Arc<SessionStore>,
) -> ViewHarness {
    let api = Arc::new(
        InMemoryQuestionnaireApi::new(fixed_clock(), questions).with_session(Arc::clone(&session)),
    );
    let gateway: Arc<dyn QuestionnaireApi> = api.clone();
    let auth = Arc::new(
        AuthService::new(ClientConfig::default(), Arc::clone(&session)).expect("http client"),
    );
    let summary = Arc::new(SummaryService::new(gateway));

    let questionnaire_handles = match view {
        ViewKind::Questionnaire | ViewKind::NewRun => Some(QuestionnaireTestHandles::default()),
        _ => None,
    };

    let app = Arc::new(TestApp {
        session: Arc::clone(&session),
        api: Arc::clone(&api),
        auth,
        summary,
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            questionnaire_handles: questionnaire_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        api,
        session,
        questionnaire_handles,
    }
}
