pub mod flowchart_task;
pub mod generation_service;
pub mod paper_task;
pub mod prompt_task;
pub mod quiz_task;
pub mod response_parser;
pub mod task_executor;
pub mod theory_task;

pub use flowchart_task::FlowchartTask;
pub use generation_service::GenerationService;
pub use paper_task::PaperTask;
pub use prompt_task::{PromptTask, RetryPolicy};
pub use quiz_task::QuizTask;
pub use task_executor::TaskExecutor;
pub use theory_task::TheoryTask;
