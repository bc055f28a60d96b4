//! odata-endpoint: resolves canonical demo OData service roots to the live
//! roots a test run should use.
//!
//! Re-exports the modules used by the binary and by integration tests in `tests/`.

pub mod config;
pub mod endpoints;
pub mod errors;
pub mod fixture;
pub mod resolver;
pub mod rewrite;
pub mod settings;
pub mod transport;

pub use endpoints::KnownEndpoint;
pub use errors::{ODataError, ResolveError};
pub use resolver::EndpointResolver;
pub use rewrite::RewriteRule;
pub use transport::{HttpTransport, RedirectFollower, TransportConfig};
