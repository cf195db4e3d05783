//! Role-tagged content blocks sent to the generative model.

use serde::{Deserialize, Serialize};

/// Generation-facing role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockRole {
    /// The party asking: the learner, or the application on its behalf.
    Requester,
    /// The model's side of the conversation.
    Responder,
}

/// One block of a stateless generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub role: BlockRole,
    pub text: String,
}

impl ContentBlock {
    pub fn requester(text: impl Into<String>) -> Self {
        Self {
            role: BlockRole::Requester,
            text: text.into(),
        }
    }

    pub fn responder(text: impl Into<String>) -> Self {
        Self {
            role: BlockRole::Responder,
            text: text.into(),
        }
    }
}
