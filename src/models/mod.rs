pub mod bank;
pub mod loaders;
pub mod question;
pub mod quota;

pub use bank::QuestionBank;
pub use loaders::load_question_bank;
pub use question::{MarkValue, QuestionRecord, MCQ_MARKS};
pub use quota::{Quota, RawQuota};
