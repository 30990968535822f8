mod home;
mod login;
mod progress;
mod questionnaire;
mod register;
mod state;
mod summary;

pub use home::HomeView;
pub use login::LoginView;
pub use progress::ProgressBar;
pub use questionnaire::{NewRunView, QuestionnaireView};
pub use register::RegisterView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use summary::SummaryView;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
