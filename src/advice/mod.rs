mod advisor;
mod prompts;

pub use advisor::{
    Advice, Advisor, CONSULT_EXPERT_FALLBACK, CureInfo, SERVICE_DOWN_FALLBACK, is_healthy,
};
pub use prompts::{chat_prompt, cure_prompt};
