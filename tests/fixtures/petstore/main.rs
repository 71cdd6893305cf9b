//! @title Petstore API
//! @version 2.1.0
//! @description A sample pet store server.
//! @termsOfServiceUrl https://example.com/terms
//! @contactName API Support
//! @contactEmail support@example.com
//! @licenseName Apache 2.0
//! @licenseUrl https://www.apache.org/licenses/LICENSE-2.0.html

mod common;
mod handlers;
mod models;

/// @basePath /v2
/// @schemes http, https
fn main() {
    handlers::serve();
}
