mod auth_form_vm;
mod question_vm;
mod summary_vm;
mod time_fmt;

pub use auth_form_vm::{FieldErrors, LoginForm, RegisterForm};
pub use question_vm::{FormAction, InputWidget, QuestionFormVm};
pub use summary_vm::{SummaryAnswerVm, SummaryVm, format_answer, map_summary};
pub use time_fmt::{format_datetime, format_service_timestamp};
