//! HTTP transport for the dispatcher
//!
//! Turns query-string, form and JSON request data into a `RequestContext` and
//! writes the resulting envelope back to the client.

pub mod handlers;
