//! Application Bootstrap
//!
//! Both composition pipelines run once, before anything is served:
//!
//! ```text
//! 1. Configuration Loading
//!    ↓
//! 2. Component Scan  (code units → contract sets → frozen bindings)
//!    ↓
//! 3. DI Container Creation
//!    ↓
//! 4. Feature Composition  (feature modules → route group)
//!    ↓
//! 5. Authorization Gate  (route group → router + route table)
//!    ↓
//! 6. Server Start
//!    ↓
//! [Running...]
//!    ↓
//! 7. Shutdown Signal (SIGTERM/SIGINT) → drain → stop
//! ```

mod application;
mod shutdown;

pub use application::{Application, ApplicationBuilder};
pub use shutdown::shutdown_signal;
