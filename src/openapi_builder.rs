use crate::annotation::{self, Annotation, HttpMethod, InfoBlock, ParameterLocation};
use crate::error::Diagnostic;
use crate::schema::{Definitions, Property};
use crate::source::FunctionDecl;
use crate::type_resolver::{ResolvedType, TypeResolver};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Swagger document builder
///
/// Operations are built one declaration at a time from annotated doc comments and folded into
/// the path table. A method slot keeps the first operation attached to it.
pub struct OpenApiBuilder {
    info: Info,
    base_path: Option<String>,
    schemes: Vec<String>,
    /// URL path -> PathItem
    paths: BTreeMap<String, PathItem>,
    /// Tag catalogue in first-seen order
    tags: Vec<Tag>,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Swagger PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    pub fn slot(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }
}

/// Swagger Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Status code -> response
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    /// Package the declaration lives in
    #[serde(skip)]
    pub package: String,
}

/// Swagger Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Property>,
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    pub swagger: String,
    pub info: Info,
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: Definitions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        Self {
            info: Info {
                title: "API".to_string(),
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: "1.0.0".to_string(),
            },
            base_path: None,
            schemes: Vec::new(),
            paths: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Set document-level fields read from the main file; absent fields keep their defaults
    pub fn with_info(mut self, block: InfoBlock) -> Self {
        if let Some(title) = block.title {
            self.info.title = title;
        }
        if let Some(version) = block.version {
            self.info.version = version;
        }
        self.info.description = block.description;
        self.info.terms_of_service = block.terms_of_service;
        if block.contact_name.is_some()
            || block.contact_url.is_some()
            || block.contact_email.is_some()
        {
            self.info.contact = Some(Contact {
                name: block.contact_name,
                url: block.contact_url,
                email: block.contact_email,
            });
        }
        if block.license_name.is_some() || block.license_url.is_some() {
            self.info.license = Some(License {
                name: block.license_name.unwrap_or_default(),
                url: block.license_url,
            });
        }
        self.base_path = block.base_path;
        self.schemes = block.schemes;
        self
    }

    /// Builds the operation described by a function's doc comment and attaches it to every
    /// `@router` line it carries.
    ///
    /// Returns the diagnostics recorded while doing so: grammar errors of skipped lines and
    /// resolution errors of referenced types.
    pub fn add_declaration(
        &mut self,
        resolver: &mut TypeResolver,
        package: &str,
        function: &FunctionDecl,
    ) -> Vec<Diagnostic> {
        let declaration = function.qualified_name();
        let mut operation = Operation {
            operation_id: Some(declaration.clone()),
            package: package.to_string(),
            ..Default::default()
        };
        let mut routes = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, raw) in function.doc_lines.iter().enumerate() {
            let line = index + 1;
            let annotation = match annotation::parse_line(raw) {
                Ok(Some(annotation)) => annotation,
                Ok(None) => continue,
                Err(e) => {
                    warn!("{}::{}: {}", package, declaration, e);
                    diagnostics.push(Diagnostic::grammar(package, &declaration, line, &e));
                    continue;
                }
            };

            match annotation {
                Annotation::Router { path, method } => routes.push((path, method)),
                Annotation::Resource { name, description } => {
                    self.add_tag(&name, description);
                    if !operation.tags.contains(&name) {
                        operation.tags.push(name);
                    }
                }
                Annotation::Title(title) => operation.summary = Some(title),
                Annotation::Description(description) => operation.description = Some(description),
                Annotation::Response {
                    code,
                    kind,
                    type_name,
                    description,
                } => {
                    let schema = match resolver.register_type(&type_name, package) {
                        Ok(resolved) => response_schema(code, &kind, &resolved),
                        Err(e) => {
                            warn!("{}::{}: {}", package, declaration, e);
                            diagnostics.push(
                                Diagnostic::resolution(package, Some(declaration.as_str()), &e)
                                    .at_line(line),
                            );
                            None
                        }
                    };
                    operation.responses.insert(
                        code.to_string(),
                        Response {
                            description: description.unwrap_or_default(),
                            schema,
                        },
                    );
                }
                Annotation::Param {
                    name,
                    location,
                    type_name,
                    required,
                    description,
                } => {
                    let resolved = match resolver.register_type(&type_name, package) {
                        Ok(resolved) => Some(resolved),
                        Err(e) => {
                            warn!("{}::{}: {}", package, declaration, e);
                            diagnostics.push(
                                Diagnostic::resolution(package, Some(declaration.as_str()), &e)
                                    .at_line(line),
                            );
                            None
                        }
                    };
                    let mut parameter = Parameter {
                        name,
                        location: location.as_str().to_string(),
                        required,
                        description,
                        param_type: None,
                        format: None,
                        items: None,
                        schema: None,
                    };
                    describe_parameter(&mut parameter, location, &type_name, resolved, resolver);
                    operation.parameters.push(parameter);
                }
                Annotation::Accept(media) => extend_unique(&mut operation.consumes, media),
                Annotation::Produce(media) => extend_unique(&mut operation.produces, media),
            }
        }

        diagnostics.extend(resolver.take_diagnostics());

        for (path, method) in routes {
            self.attach(&path, method, operation.clone());
        }
        diagnostics
    }

    /// Puts `operation` in the `method` slot of `path` unless the slot is taken
    fn attach(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        let path = Self::convert_path_format(path);
        let path_item = self.paths.entry(path.clone()).or_default();
        let slot = path_item.slot_mut(method);

        if let Some(existing) = slot {
            debug!(
                "{} {} already documented by {:?}, ignoring {:?}",
                method.as_str(),
                path,
                existing.operation_id,
                operation.operation_id
            );
            return;
        }
        debug!("Adding route: {} {}", method.as_str(), path);
        *slot = Some(operation);
    }

    /// Adds a tag to the catalogue unless one with the same name exists
    fn add_tag(&mut self, name: &str, description: Option<String>) {
        if self.tags.iter().any(|tag| tag.name == name) {
            return;
        }
        self.tags.push(Tag {
            name: name.to_string(),
            description,
        });
    }

    /// Convert path parameters written as `:param` or `*param` to `{param}`
    fn convert_path_format(path: &str) -> String {
        path.split('/')
            .map(|part| match part.strip_prefix(':').or_else(|| part.strip_prefix('*')) {
                Some(name) if !name.is_empty() => format!("{{{}}}", name),
                _ => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Build the final document, taking the Definitions table from the resolver
    pub fn build(self, resolver: TypeResolver) -> SwaggerDocument {
        debug!(
            "Building document: {} paths, {} tags",
            self.paths.len(),
            self.tags.len()
        );

        SwaggerDocument {
            swagger: "2.0".to_string(),
            info: self.info,
            base_path: self.base_path,
            schemes: self.schemes,
            paths: self.paths,
            definitions: resolver.into_definitions(),
            tags: self.tags,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `{array}` on a 200 response documents a list of the named type, unless the type
/// is already a list (`[]models.Pet`)
fn response_schema(code: u16, kind: &str, resolved: &ResolvedType) -> Option<Property> {
    let schema = Property::from_resolved(resolved)?;
    let listed = matches!(resolved, ResolvedType::Array(_));
    if code == 200 && kind.eq_ignore_ascii_case("array") && !listed {
        Some(Property::array(schema))
    } else {
        Some(schema)
    }
}

fn describe_parameter(
    parameter: &mut Parameter,
    location: ParameterLocation,
    type_name: &str,
    resolved: Option<ResolvedType>,
    resolver: &TypeResolver,
) {
    match resolved {
        Some(ResolvedType::Primitive(primitive)) if primitive.wire().is_some() => {
            if let Some(property) = Property::primitive(primitive) {
                parameter.param_type = property.property_type;
                parameter.format = property.format;
            }
        }
        Some(ResolvedType::Model(id)) if resolver.has_definition(&id) => {
            parameter.schema = Some(Property::reference(&id));
        }
        Some(resolved @ (ResolvedType::Array(_) | ResolvedType::Wildcard)) => {
            match Property::from_resolved(&resolved) {
                Some(property) if location == ParameterLocation::Body => {
                    parameter.schema = Some(property);
                }
                Some(property) => {
                    parameter.param_type = property.property_type;
                    parameter.items = property.items;
                }
                None => parameter.param_type = Some(type_name.to_string()),
            }
        }
        _ => parameter.param_type = Some(type_name.to_string()),
    }
}

fn extend_unique(target: &mut Vec<String>, values: Vec<String>) {
    for value in values {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}
