//! Infrastructure layer for codebase-judge
//!
//! Adapters for the application ports: the child-process agent runner
//! (pipe-backed batch capture and pseudo-terminal streaming capture), the
//! synthesis adapter, session-transcript discovery, and the configuration
//! loader.

pub mod agent;
pub mod config;
pub mod session;

pub use agent::resolver::ExecutableResolver;
pub use agent::runner::CliAgentRunner;
pub use agent::synthesizer::CliSynthesizer;
pub use config::file_config::FileConfig;
pub use config::loader::ConfigLoader;
pub use session::context::{SessionMessage, extract_context, parse_session};
pub use session::discovery::{MIN_SESSION_SIZE, SessionInfo, SessionStore};
