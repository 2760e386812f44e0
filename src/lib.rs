// Module layout (Clean Architecture style)
// - bootstrap: configuration, extensions and the application factory
// - infrastructure: DB/filesystem/crypto/realtime adapters
// - presentation: HTTP/WS handlers and routing
// - application: ports and use cases
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
