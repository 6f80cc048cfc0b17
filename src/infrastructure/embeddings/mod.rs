pub mod azure_provider;
#[cfg(feature = "clip")]
pub mod clip_provider;
#[cfg(feature = "compat")]
pub mod compat_adapter;
#[cfg(feature = "local")]
pub mod local_provider;
mod model;
pub mod mock_provider;
#[cfg(feature = "openai")]
pub mod openai_provider;
pub mod registry;

pub use azure_provider::AzureOpenAiEmbedding;
#[cfg(feature = "clip")]
pub use clip_provider::ClipEmbedding;
#[cfg(feature = "compat")]
pub use compat_adapter::CompatEmbedding;
#[cfg(feature = "local")]
pub use local_provider::LocalEmbedding;
pub use mock_provider::MockEmbedding;
#[cfg(feature = "openai")]
pub use openai_provider::OpenAiEmbedding;
pub use registry::{BackendFamily, BackendRegistry, BackendRequest};
