mod job_runner;
mod model_client;
mod repositories;

pub use job_runner::{Job, JobOptions, JobPriority, JobRunner, JobStatus};
pub use model_client::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChoiceMessage, ModelClient, Role,
    TokenUsage,
};
pub use repositories::{
    SourceInsightRepository, TransformationConfigRepository, TransformationRepository,
    TransformationResultRepository,
};
