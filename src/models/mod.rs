pub mod payload;
pub mod placeholder;
pub mod request;
pub mod result;
pub mod stage;

pub use payload::{
    Difficulty, FlowchartPayload, PaperQuestion, QuestionPaperPayload, QuizPayload, QuizQuestion,
    TheoryPayload, Validate,
};
pub use request::{FlowchartRequest, PaperRequest, QuizRequest, TheoryRequest};
pub use result::GenerationResult;
pub use stage::Stage;
