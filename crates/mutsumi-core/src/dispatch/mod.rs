//! Chat dispatch: mirrors one conversation to the persona service.

pub mod attachment;
pub mod context;
pub mod dispatcher;
