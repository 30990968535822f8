mod answer;
mod history;
mod ids;
mod progress;
mod question;
mod summary;

pub use ids::{ParseIdError, QuestionId};

pub use answer::{Answer, AnswerValue, FormValue};
pub use history::History;
pub use progress::{Progress, ProgressReport, completion_percentage, is_last_question};
pub use question::{NumberRules, Pattern, Question, QuestionError, QuestionKind, TextRules};
pub use summary::{Summary, SummaryEntry};
