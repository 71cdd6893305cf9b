//! Rendering the Swagger document as YAML or JSON and writing it out.

use crate::openapi_builder::SwaggerDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &SwaggerDocument) -> Result<String> {
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a document to pretty-printed JSON.
///
/// Map keys (paths, definitions, properties, response codes) come out sorted, so the same
/// source tree always yields the same bytes.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &SwaggerDocument) -> Result<String> {
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes `content` to `path`, creating parent directories as needed and overwriting any
/// existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::{Info, Operation, PathItem, Response, Tag};
    use crate::schema::{Property, Schema};
    use crate::type_expr::Primitive;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_document() -> SwaggerDocument {
        let mut pet = Schema::object();
        pet.properties
            .insert("id".to_string(), Property::primitive(Primitive::Int64).unwrap());
        pet.require("id");

        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "a list of pets".to_string(),
                schema: Some(Property::array(Property::reference("models.Pet"))),
            },
        );
        let mut paths = BTreeMap::new();
        paths.insert(
            "/pets".to_string(),
            PathItem {
                get: Some(Operation {
                    tags: vec!["pets".to_string()],
                    operation_id: Some("list_pets".to_string()),
                    responses,
                    package: "handlers".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        SwaggerDocument {
            swagger: "2.0".to_string(),
            info: Info {
                title: "Petstore".to_string(),
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: "1.0.0".to_string(),
            },
            base_path: Some("/v1".to_string()),
            schemes: vec![],
            paths,
            definitions: BTreeMap::from([("models.Pet".to_string(), pet)]),
            tags: vec![Tag {
                name: "pets".to_string(),
                description: None,
            }],
        }
    }

    #[test]
    fn test_serialize_json_layout() {
        let json = serialize_json(&sample_document()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["swagger"], "2.0");
        assert_eq!(value["basePath"], "/v1");
        assert!(value.get("schemes").is_none());
        assert_eq!(
            value["paths"]["/pets"]["get"]["responses"]["200"]["schema"]["items"]["$ref"],
            "#/definitions/models.Pet"
        );
        assert_eq!(value["definitions"]["models.Pet"]["required"][0], "id");
        assert!(value["paths"]["/pets"]["get"].get("package").is_none());
        assert!(json.contains("\n  \"info\""));
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&sample_document()).unwrap();

        assert!(yaml.contains("swagger: '2.0'") || yaml.contains("swagger: \"2.0\""));
        assert!(yaml.contains("operationId: list_pets"));
        assert!(yaml.contains("#/definitions/models.Pet"));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let doc = sample_document();
        assert_eq!(serialize_json(&doc).unwrap(), serialize_json(&doc.clone()).unwrap());
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs/api/swagger.json");

        write_to_file("{}", &path).unwrap();
        write_to_file("{\"swagger\": \"2.0\"}", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"swagger\": \"2.0\"}");
    }

    #[test]
    fn test_write_yaml_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("swagger.yaml");

        let yaml = serialize_yaml(&sample_document()).unwrap();
        write_to_file(&yaml, &path).unwrap();

        let parsed: SwaggerDocument =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.info.title, "Petstore");
        assert_eq!(parsed.definitions.len(), 1);
    }
}
