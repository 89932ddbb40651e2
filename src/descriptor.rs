//! Service descriptor loading.
//!
//! Only the `services` mapping is read; everything else in the compose file
//! is ignored so descriptors with extra keys still load.
use crate::error::ProvenanceError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// One entry under `services`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ServiceDefinition {
    #[serde(default)]
    pub image: Option<String>,
}

impl ServiceDefinition {
    /// The image reference, if the service declares a non-empty one.
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }
}

/// Services keyed by name, in descriptor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub services: IndexMap<String, ServiceDefinition>,
}

impl ServiceDescriptor {
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceDefinition)> {
        self.services
            .iter()
            .map(|(name, service)| (name.as_str(), service))
    }
}

/// Load the descriptor at `path`.
pub fn parse_descriptor(path: &Path) -> Result<ServiceDescriptor, ProvenanceError> {
    if !path.exists() {
        return Err(ProvenanceError::DescriptorNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)
        .map_err(|err| ProvenanceError::parse(path, format!("read failed: {err}")))?;
    parse_descriptor_str(&text).map_err(|message| ProvenanceError::parse(path, message))
}

/// Parse descriptor text. Errors are plain messages; the caller attaches the path.
pub fn parse_descriptor_str(text: &str) -> Result<ServiceDescriptor, String> {
    let mut document: Value =
        serde_yaml::from_str(text).map_err(|err| format!("invalid YAML: {err}"))?;
    // Compose files share settings through `<<: *anchor`.
    document
        .apply_merge()
        .map_err(|err| format!("invalid merge key: {err}"))?;
    let services = match document.get("services") {
        Some(Value::Mapping(services)) => services,
        Some(_) => return Err("`services` is not a mapping".to_string()),
        None => return Err("missing `services` mapping".to_string()),
    };

    let mut parsed = IndexMap::with_capacity(services.len());
    for (key, value) in services {
        let name = service_name(key)?;
        // `db:` with no body parses as null.
        let definition = match value {
            Value::Null => ServiceDefinition::default(),
            other => serde_yaml::from_value::<ServiceDefinition>(other.clone())
                .map_err(|err| format!("service '{name}': {err}"))?,
        };
        parsed.insert(name, definition);
    }
    Ok(ServiceDescriptor { services: parsed })
}

fn service_name(key: &Value) -> Result<String, String> {
    match key {
        Value::String(name) => Ok(name.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(format!("unsupported service name: {other:?}")),
    }
}
