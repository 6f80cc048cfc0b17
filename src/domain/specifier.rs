// src/domain/specifier.rs
use crate::domain::embedding::Embedder;
#[cfg(feature = "compat")]
use crate::domain::embedding::LegacyEmbedding;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// The reserved descriptor meaning "use the system default backend".
pub const DEFAULT_SENTINEL: &str = "default";

/// Model used by the CLIP family when the descriptor names none.
pub const DEFAULT_CLIP_MODEL: &str = "ViT-B/32";

/// Input to embedder resolution.
///
/// Resolution itself takes `Option<EmbedSpec>`; an absent specifier falls
/// back to the configured default backend descriptor.
pub enum EmbedSpec {
    /// A delimited text descriptor, parsed by [`BackendDescriptor`].
    Descriptor(String),
    /// An already-constructed embedder, passed through after the tracker
    /// binding is overwritten.
    Instance(Arc<dyn Embedder>),
    /// An implementation of the legacy v1 interface, to be wrapped.
    #[cfg(feature = "compat")]
    Legacy(Arc<dyn LegacyEmbedding>),
    /// Embeddings are explicitly disabled.
    Disabled,
}

impl fmt::Debug for EmbedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedSpec::Descriptor(s) => f.debug_tuple("Descriptor").field(s).finish(),
            EmbedSpec::Instance(_) => f.write_str("Instance(Arc<dyn Embedder>)"),
            #[cfg(feature = "compat")]
            EmbedSpec::Legacy(_) => f.write_str("Legacy(Arc<dyn LegacyEmbedding>)"),
            EmbedSpec::Disabled => f.write_str("Disabled"),
        }
    }
}

impl From<&str> for EmbedSpec {
    fn from(descriptor: &str) -> Self {
        EmbedSpec::Descriptor(descriptor.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseSpecifierError(String);

/// A text descriptor parsed into its backend family and parameters.
///
/// Parsing is pure: no environment reads, no filesystem access, no
/// construction side effects. Prefix checks run in a fixed order because the
/// raw grammar is ambiguous ("clip..." and "azure-openai..." would otherwise
/// fall through to the `local` rule and be rejected there).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendDescriptor {
    Default,
    Clip {
        model: Option<String>,
    },
    Local {
        model: Option<String>,
    },
    AzureOpenAi {
        endpoint: String,
        model: String,
        api_version: String,
    },
}

impl FromStr for BackendDescriptor {
    type Err = ParseSpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == DEFAULT_SENTINEL {
            return Ok(BackendDescriptor::Default);
        }

        if s.starts_with("clip") {
            return Ok(BackendDescriptor::Clip {
                model: model_after_colon(s),
            });
        }

        if s.starts_with("azure-openai") {
            let fields: Vec<&str> = s.split(':').collect();
            if fields.len() != 4 {
                return Err(ParseSpecifierError(format!(
                    "azure specifier must be of the form \
                     \"azure-openai:<endpoint>:<model-name>:<api-version>\", got {} fields",
                    fields.len()
                )));
            }
            return Ok(BackendDescriptor::AzureOpenAi {
                endpoint: fields[1].to_string(),
                model: fields[2].to_string(),
                api_version: fields[3].to_string(),
            });
        }

        let prefix = s.split(':').next().unwrap_or(s);
        if prefix != "local" {
            return Err(ParseSpecifierError(format!(
                "embed specifier must start with \"local\" or be a concrete embedder instance; \
                 accepted forms: \"{DEFAULT_SENTINEL}\", \"local[:<model-name>]\", \
                 \"clip[:<model-name>]\", \
                 \"azure-openai:<endpoint>:<model-name>:<api-version>\"; got \"{s}\""
            )));
        }
        Ok(BackendDescriptor::Local {
            model: model_after_colon(s),
        })
    }
}

/// Everything after the first colon, or `None` when absent or empty.
fn model_after_colon(s: &str) -> Option<String> {
    s.splitn(2, ':')
        .nth(1)
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_sentinel_when_parse_then_default() {
        assert_eq!(
            "default".parse::<BackendDescriptor>().unwrap(),
            BackendDescriptor::Default
        );
    }

    #[test]
    fn given_bare_clip_when_parse_then_no_model() {
        assert_eq!(
            "clip".parse::<BackendDescriptor>().unwrap(),
            BackendDescriptor::Clip { model: None }
        );
    }

    #[test]
    fn given_clip_with_model_when_parse_then_model_extracted() {
        assert_eq!(
            "clip:ViT-L/14".parse::<BackendDescriptor>().unwrap(),
            BackendDescriptor::Clip {
                model: Some("ViT-L/14".to_string())
            }
        );
    }

    #[test]
    fn given_clip_with_empty_model_when_parse_then_no_model() {
        assert_eq!(
            "clip:".parse::<BackendDescriptor>().unwrap(),
            BackendDescriptor::Clip { model: None }
        );
    }

    #[test]
    fn given_bare_local_when_parse_then_no_model() {
        assert_eq!(
            "local".parse::<BackendDescriptor>().unwrap(),
            BackendDescriptor::Local { model: None }
        );
    }

    #[test]
    fn given_local_with_model_when_parse_then_model_extracted() {
        assert_eq!(
            "local:BAAI/bge-small-en-v1.5"
                .parse::<BackendDescriptor>()
                .unwrap(),
            BackendDescriptor::Local {
                model: Some("BAAI/bge-small-en-v1.5".to_string())
            }
        );
    }

    #[test]
    fn given_azure_with_four_fields_when_parse_then_all_fields_extracted() {
        assert_eq!(
            "azure-openai:myhost:ada:2023-05-15"
                .parse::<BackendDescriptor>()
                .unwrap(),
            BackendDescriptor::AzureOpenAi {
                endpoint: "myhost".to_string(),
                model: "ada".to_string(),
                api_version: "2023-05-15".to_string(),
            }
        );
    }

    #[test]
    fn given_azure_with_three_fields_when_parse_then_error() {
        let err = "azure-openai:myhost:ada"
            .parse::<BackendDescriptor>()
            .unwrap_err();
        assert!(err.to_string().contains("got 3 fields"));
    }

    #[test]
    fn given_azure_with_five_fields_when_parse_then_error() {
        assert!("azure-openai:https://h:ada:2023-05-15"
            .parse::<BackendDescriptor>()
            .is_err());
    }

    #[test]
    fn given_unknown_prefix_when_parse_then_error_names_grammar() {
        let err = "huggingface:foo".parse::<BackendDescriptor>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("must start with \"local\""));
        assert!(msg.contains("azure-openai:<endpoint>"));
    }

    #[test]
    fn given_empty_string_when_parse_then_error() {
        assert!("".parse::<BackendDescriptor>().is_err());
    }
}
