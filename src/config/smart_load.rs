use figment::providers::{Format, Json, Toml, Yaml};
use std::path::Path;

/// Configuration file loader that chooses the format from the file extension
/// Returns a provider that can be directly used with figment.merge()
pub fn auto<P: AsRef<Path>>(path: P) -> impl figment::Provider {
    let path = path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "toml" => SmartProvider::Toml(Toml::file(path)),
        "json" => SmartProvider::Json(Json::file(path)),
        "yaml" | "yml" => SmartProvider::Yaml(Yaml::file(path)),
        _ => {
            let detected = std::fs::read_to_string(path)
                .ok()
                .and_then(|content| detect_format_from_content(&content));
            tracing::debug!(
                "No known extension on {}, detected format: {:?}",
                path.display(),
                detected
            );
            match detected {
                Some(FileFormat::Json) => SmartProvider::Json(Json::file(path)),
                Some(FileFormat::Yaml) => SmartProvider::Yaml(Yaml::file(path)),
                Some(FileFormat::Toml) | None => SmartProvider::Toml(Toml::file(path)),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Json,
    Yaml,
}

/// Wrapper enum to handle different provider types
enum SmartProvider {
    Toml(figment::providers::Data<Toml>),
    Json(figment::providers::Data<Json>),
    Yaml(figment::providers::Data<Yaml>),
}

impl figment::Provider for SmartProvider {
    fn metadata(&self) -> figment::Metadata {
        match self {
            SmartProvider::Toml(p) => p.metadata(),
            SmartProvider::Json(p) => p.metadata(),
            SmartProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(
        &self,
    ) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        match self {
            SmartProvider::Toml(p) => p.data(),
            SmartProvider::Json(p) => p.data(),
            SmartProvider::Yaml(p) => p.data(),
        }
    }
}

/// Attempt to detect configuration format from file content
fn detect_format_from_content(content: &str) -> Option<FileFormat> {
    let trimmed = content.trim();

    if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']') && !trimmed.contains('='))
    {
        return Some(FileFormat::Json);
    }

    // TOML: key = value lines
    if trimmed.lines().any(|line| {
        let line = line.trim();
        !line.starts_with('#') && line.contains('=') && !line.contains(':')
    }) {
        return Some(FileFormat::Toml);
    }

    // YAML: document separator or key: value lines
    if trimmed.contains("---")
        || trimmed.lines().any(|line| {
            let line = line.trim();
            line.contains(':') && !line.starts_with('[')
        })
    {
        return Some(FileFormat::Yaml);
    }

    None
}
