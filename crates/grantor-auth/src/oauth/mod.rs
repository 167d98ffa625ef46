//! OAuth 2.0 request plumbing shared by grant flows.

pub mod context;

pub use context::RequestContext;
