//! HTTP adapter for encounter endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ActionResultResponse, EncounterDetailResponse, EncounterResponse, ErrorResponse,
    HistoryItemResponse, MessageExchangeResponse, SendMessageRequest, StartEncounterRequest,
    StartEncounterResponse, SubmitActionRequest,
};
pub use handlers::EncounterHandlers;
pub use routes::encounter_routes;
