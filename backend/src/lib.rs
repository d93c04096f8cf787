//! HTTP adapter for the Andy fulfillment engine
//!
//! `POST /api/fulfill` takes a session id, the client's board and either a
//! classified intent with parameters or raw text, and answers with Andy's
//! reply in the `response_text` / `fulfillment_info` / `board_str` shape.
//! `GET /api/health` reports liveness and the active recommender.

pub mod api;
