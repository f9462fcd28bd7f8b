pub mod expression;
pub mod llm;

pub use expression::evaluate_ebitda;
pub use llm::OpenAiClient;
