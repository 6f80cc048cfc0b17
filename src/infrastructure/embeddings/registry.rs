use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::embedding::Embedder;
#[cfg(feature = "compat")]
use crate::domain::embedding::LegacyEmbedding;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Backend families whose support is optional at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    OpenAi,
    Local,
    Clip,
    Compat,
}

impl BackendFamily {
    pub const ALL: [BackendFamily; 4] = [
        BackendFamily::OpenAi,
        BackendFamily::Local,
        BackendFamily::Clip,
        BackendFamily::Compat,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BackendFamily::OpenAi => "OpenAI",
            BackendFamily::Local => "local",
            BackendFamily::Clip => "CLIP",
            BackendFamily::Compat => "legacy-compat",
        }
    }

    /// Cargo feature that compiles this family in.
    pub fn feature(&self) -> &'static str {
        match self {
            BackendFamily::OpenAi => "openai",
            BackendFamily::Local => "local",
            BackendFamily::Clip => "clip",
            BackendFamily::Compat => "compat",
        }
    }
}

impl fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Construction parameters, one variant per family.
pub enum BackendRequest {
    OpenAi {
        api_url: String,
    },
    Local {
        model: Option<String>,
        cache_folder: PathBuf,
    },
    Clip {
        model: Option<String>,
    },
    #[cfg(feature = "compat")]
    Compat {
        inner: Arc<dyn LegacyEmbedding>,
    },
}

pub type BackendConstructor = fn(BackendRequest) -> ApplicationResult<Arc<dyn Embedder>>;

/// Capability registry mapping each backend family to its constructor.
///
/// Probed once per resolver. Families absent from the map were not compiled
/// into this binary; constructing them yields a `MissingDependency` error
/// naming the cargo feature to enable.
pub struct BackendRegistry {
    constructors: HashMap<BackendFamily, BackendConstructor>,
}

impl BackendRegistry {
    /// Registers every family compiled into this binary.
    pub fn probe() -> Self {
        #[allow(unused_mut)]
        let mut constructors: HashMap<BackendFamily, BackendConstructor> = HashMap::new();
        #[cfg(feature = "openai")]
        constructors.insert(
            BackendFamily::OpenAi,
            super::openai_provider::build as BackendConstructor,
        );
        #[cfg(feature = "local")]
        constructors.insert(
            BackendFamily::Local,
            super::local_provider::build as BackendConstructor,
        );
        #[cfg(feature = "clip")]
        constructors.insert(
            BackendFamily::Clip,
            super::clip_provider::build as BackendConstructor,
        );
        #[cfg(feature = "compat")]
        constructors.insert(
            BackendFamily::Compat,
            super::compat_adapter::build as BackendConstructor,
        );

        debug!("Probed backend registry: {:?}", constructors.keys().collect::<Vec<_>>());
        Self { constructors }
    }

    /// A registry with no families registered, for exercising unavailability
    /// handling without rebuilding with different features.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn is_available(&self, family: BackendFamily) -> bool {
        self.constructors.contains_key(&family)
    }

    pub fn available(&self) -> Vec<BackendFamily> {
        BackendFamily::ALL
            .iter()
            .filter(|family| self.is_available(**family))
            .copied()
            .collect()
    }

    pub fn construct(
        &self,
        family: BackendFamily,
        request: BackendRequest,
    ) -> ApplicationResult<Arc<dyn Embedder>> {
        let constructor = self
            .constructors
            .get(&family)
            .ok_or(ApplicationError::MissingDependency(family))?;
        constructor(request)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::probe()
    }
}
