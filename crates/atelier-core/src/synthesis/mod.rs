//! Plan synthesis: strategies, the policy service that chooses between
//! them, and the pieces of the live request.

pub mod credentials;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod schema;
pub mod service;
pub mod trait_def;

pub use credentials::{API_KEY_ENV, ApiKey, CredentialSource, resolve_api_key};
pub use error::{ResponseDefect, SynthesisError, TransportError};
pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig, GeminiSynthesizer};
pub use mock::{DEFAULT_MOCK_DELAY, MOCK_PLAN_ID, MockSynthesizer, mock_plan};
pub use prompt::{SYSTEM_INSTRUCTION, build_synthesis_prompt};
pub use schema::response_schema;
pub use service::SynthesisService;
pub use trait_def::PlanSynthesizer;
