use crate::error::{Diagnostic, ResolveError};
use crate::imports::{normalize_package_path, package_segments};
use crate::package_registry::PackageRegistry;
use crate::schema::{Definitions, Property, Schema};
use crate::source::{FieldDecl, PackageSource, TypeDeclKind};
use crate::type_expr::{Primitive, TypeExpr};
use log::{debug, warn};
use std::collections::btree_map::Entry;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Type resolver - turns type names into schema references and fills the Definitions table.
///
/// Resolution is depth-first. Records currently being resolved are tracked on a stack; a
/// reference back to one of them is emitted as a `$ref` without descending and verified once
/// the top-level call returns. Resolution failures below the top level drop the affected
/// property and are kept as diagnostics.
pub struct TypeResolver {
    registry: PackageRegistry,
    definitions: Definitions,
    /// Canonical id of a type alias to what it stands for
    translations: HashMap<String, ResolvedType>,
    /// Ids whose Definitions entry is complete
    completed: HashSet<String>,
    resolving: Vec<InProgress>,
    /// Types being flattened into a parent, guards against embedding cycles
    embedding: Vec<String>,
    pending_refs: Vec<PendingRef>,
    diagnostics: Vec<Diagnostic>,
}

/// What a type name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(Primitive),
    /// Value of unknown shape
    Wildcard,
    /// Definitions entry with this canonical id
    Model(String),
    /// Sequence or map; documented through its items
    Array(Box<ResolvedType>),
}

impl ResolvedType {
    pub fn model_id(&self) -> Option<&str> {
        match self {
            ResolvedType::Model(id) => Some(id),
            _ => None,
        }
    }
}

struct InProgress {
    id: String,
    alias: bool,
}

struct PendingRef {
    id: String,
    package: String,
}

/// A declaration found for a type name
struct Located {
    package: String,
    source: Rc<PackageSource>,
    name: String,
}

impl Located {
    fn id(&self) -> String {
        canonical_id(&self.package, &self.name)
    }
}

/// Canonical id of `name` declared in `package`: the package segments and the name, joined
/// with dots (`api/v1` + `Pet` gives `api.v1.Pet`).
pub fn canonical_id(package: &str, name: &str) -> String {
    let mut segments = package_segments(package);
    segments.push(name);
    segments.join(".")
}

impl TypeResolver {
    pub fn new(registry: PackageRegistry) -> Self {
        Self {
            registry,
            definitions: Definitions::new(),
            translations: HashMap::new(),
            completed: HashSet::new(),
            resolving: Vec::new(),
            embedding: Vec::new(),
            pending_refs: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Resolves a type name written in `package` and registers every record it needs.
    ///
    /// Accepts the annotation type syntax understood by [`TypeExpr::parse`].
    ///
    /// # Errors
    ///
    /// Returns an error when the named type itself can not be resolved. Problems with the
    /// types of its fields are recorded as diagnostics instead.
    pub fn register_type(
        &mut self,
        type_name: &str,
        package: &str,
    ) -> Result<ResolvedType, ResolveError> {
        let expr = TypeExpr::parse(type_name);
        self.register_expr(&expr, package)
    }

    /// Like [`TypeResolver::register_type`], for an already parsed expression.
    pub fn register_expr(
        &mut self,
        expr: &TypeExpr,
        package: &str,
    ) -> Result<ResolvedType, ResolveError> {
        self.resolving.clear();
        self.embedding.clear();
        let result = self.resolve_expr(expr, package);
        self.verify_pending_refs();
        result
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn has_definition(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn into_definitions(self) -> Definitions {
        self.definitions
    }

    pub fn registry_mut(&mut self) -> &mut PackageRegistry {
        &mut self.registry
    }

    /// Diagnostics recorded since the last call
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn resolve_expr(
        &mut self,
        expr: &TypeExpr,
        package: &str,
    ) -> Result<ResolvedType, ResolveError> {
        match expr {
            TypeExpr::Primitive(primitive) => Ok(ResolvedType::Primitive(*primitive)),
            TypeExpr::Wildcard => Ok(ResolvedType::Wildcard),
            TypeExpr::Array(items) | TypeExpr::MapLike(items) => {
                let items = self.resolve_expr(items, package)?;
                Ok(ResolvedType::Array(Box::new(items)))
            }
            TypeExpr::Named(name) => {
                let located = self.locate_unqualified(name, package)?;
                self.resolve_declared(located)
            }
            TypeExpr::Qualified { path, name } => match self.locate_qualified(path, name, package) {
                Ok(located) => self.resolve_declared(located),
                Err(e) => match TypeExpr::builtin(name) {
                    // `chrono::DateTime`, `time.Time`, `serde_json::Value`
                    Some(builtin) => {
                        debug!(
                            "{}.{} is not declared, using the built-in type",
                            path.join("."),
                            name
                        );
                        self.resolve_expr(&builtin, package)
                    }
                    None => Err(e),
                },
            },
        }
    }

    /// Finds an unqualified name: declared in `package`, or brought in by an item import.
    fn locate_unqualified(&mut self, name: &str, package: &str) -> Result<Located, ResolveError> {
        let source = self.registry.package(package)?;
        if source.declares(name) {
            return Ok(Located {
                package: package.to_string(),
                source,
                name: name.to_string(),
            });
        }

        let imports = self.registry.import_map(package)?;
        for candidate in imports.candidates(name) {
            let (parent, item) = candidate.rsplit_once('/').unwrap_or(("", candidate.as_str()));
            if let Ok(parent_source) = self.registry.package(parent) {
                if parent_source.declares(item) {
                    return Ok(Located {
                        package: parent.to_string(),
                        source: parent_source,
                        name: item.to_string(),
                    });
                }
            }
        }

        Err(ResolveError::TypeNotFound {
            name: name.to_string(),
            package: package.to_string(),
        })
    }

    /// Finds `path.name`: the qualifier as a package path first, then as an imported alias.
    fn locate_qualified(
        &mut self,
        path: &[String],
        name: &str,
        package: &str,
    ) -> Result<Located, ResolveError> {
        let qualifier = path.join(".");
        let mut found_package = false;

        if let Some(absolute) = normalize_package_path(path, package) {
            if let Ok(source) = self.registry.package(&absolute) {
                found_package = true;
                if source.declares(name) {
                    return Ok(Located {
                        package: absolute,
                        source,
                        name: name.to_string(),
                    });
                }
            }
        }

        let Some((alias, rest)) = path.split_first() else {
            return Err(ResolveError::TypeNotFound {
                name: name.to_string(),
                package: package.to_string(),
            });
        };

        let imports = self.registry.import_map(package)?;
        let candidates = imports.candidates(alias);
        if candidates.is_empty() && !found_package {
            return Err(ResolveError::NotImported {
                alias: qualifier,
                package: package.to_string(),
            });
        }

        let mut missing = None;
        for candidate in candidates {
            let mut target = candidate.clone();
            for segment in rest {
                target.push('/');
                target.push_str(segment);
            }
            match self.registry.package(&target) {
                Ok(source) => {
                    found_package = true;
                    if source.declares(name) {
                        return Ok(Located {
                            package: target,
                            source,
                            name: name.to_string(),
                        });
                    }
                }
                Err(e) => {
                    missing.get_or_insert(e);
                }
            }
        }

        match missing {
            Some(err) if !found_package => Err(err),
            _ => Err(ResolveError::TypeNotFound {
                name: name.to_string(),
                package: qualifier,
            }),
        }
    }

    fn resolve_declared(&mut self, located: Located) -> Result<ResolvedType, ResolveError> {
        let id = located.id();
        if let Some(translation) = self.translations.get(&id) {
            return Ok(translation.clone());
        }
        if self.completed.contains(&id) {
            return Ok(ResolvedType::Model(id));
        }

        let Some(decl) = located.source.types.get(&located.name) else {
            return Err(ResolveError::TypeNotFound {
                name: located.name.clone(),
                package: located.package.clone(),
            });
        };

        match &decl.kind {
            TypeDeclKind::Alias(target) => self.resolve_alias(id, &located.package, target),
            TypeDeclKind::Struct(fields) => self.resolve_record(id, &located.package, fields),
            TypeDeclKind::Enum(values) => {
                self.add_definition(&id, Schema::string_enum(values.clone()));
                Ok(ResolvedType::Model(id))
            }
        }
    }

    fn resolve_alias(
        &mut self,
        id: String,
        package: &str,
        target: &TypeExpr,
    ) -> Result<ResolvedType, ResolveError> {
        if let Some(pos) = self.resolving.iter().position(|frame| frame.id == id) {
            // Only aliases between here and the top: the chain never reaches a record
            if self.resolving[pos + 1..].iter().all(|frame| frame.alias) {
                return Err(ResolveError::AliasCycle { id });
            }
            return self.resolve_expr(target, package);
        }

        self.resolving.push(InProgress {
            id: id.clone(),
            alias: true,
        });
        let result = self.resolve_expr(target, package);
        self.resolving.pop();

        let resolved = result?;
        debug!("Type alias {} translates to {:?}", id, resolved);
        self.translations.insert(id, resolved.clone());
        Ok(resolved)
    }

    fn resolve_record(
        &mut self,
        id: String,
        package: &str,
        fields: &[FieldDecl],
    ) -> Result<ResolvedType, ResolveError> {
        if self.resolving.iter().any(|frame| frame.id == id) {
            debug!("{} is being resolved, emitting a reference", id);
            self.pending_refs.push(PendingRef {
                id: id.clone(),
                package: package.to_string(),
            });
            return Ok(ResolvedType::Model(id));
        }

        debug!("Resolving record {}", id);
        self.resolving.push(InProgress {
            id: id.clone(),
            alias: false,
        });
        let mut schema = Schema::object();
        self.collect_properties(&id, package, fields, &mut schema);
        self.resolving.pop();

        self.add_definition(&id, schema);
        Ok(ResolvedType::Model(id))
    }

    fn collect_properties(
        &mut self,
        owner: &str,
        package: &str,
        fields: &[FieldDecl],
        schema: &mut Schema,
    ) {
        for field in fields {
            if field.tags.excluded {
                continue;
            }
            if field.tags.embedded {
                self.merge_embedded(owner, package, &field.ty, schema);
                continue;
            }

            let resolved = match self.resolve_expr(&field.ty, package) {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("Dropping field {} of {}: {}", field.name, owner, e);
                    self.diagnostics
                        .push(Diagnostic::resolution(package, Some(owner), &e));
                    continue;
                }
            };
            let Some(property) = Property::from_resolved(&resolved) else {
                debug!("Dropping field {} of {}: unsupported type", field.name, owner);
                continue;
            };

            let name = field.wire_name().to_string();
            schema
                .properties
                .insert(name.clone(), property.with_description(field.description.clone()));
            if field.is_required() {
                schema.require(&name);
            }
        }
    }

    /// Flattens the properties of an embedded type into `schema`.
    ///
    /// The embedded type gets no Definitions entry of its own; types its fields refer to do.
    fn merge_embedded(&mut self, owner: &str, package: &str, ty: &TypeExpr, schema: &mut Schema) {
        let located = match ty {
            TypeExpr::Named(name) => self.locate_unqualified(name, package),
            TypeExpr::Qualified { path, name } => self.locate_qualified(path, name, package),
            other => {
                debug!("Can not flatten {:?} into {}", other, owner);
                return;
            }
        };
        let located = match located {
            Ok(located) => located,
            Err(_) if names_builtin(ty) => {
                debug!("Can not flatten built-in type {:?} into {}", ty, owner);
                return;
            }
            Err(e) => {
                warn!("Can not flatten into {}: {}", owner, e);
                self.diagnostics
                    .push(Diagnostic::resolution(package, Some(owner), &e));
                return;
            }
        };

        let id = located.id();
        if self.embedding.contains(&id) {
            debug!("{} is already being flattened into {}", id, owner);
            return;
        }
        let Some(decl) = located.source.types.get(&located.name) else {
            return;
        };

        self.embedding.push(id);
        match &decl.kind {
            TypeDeclKind::Struct(fields) => {
                self.collect_properties(owner, &located.package, fields, schema)
            }
            TypeDeclKind::Alias(target) => {
                self.merge_embedded(owner, &located.package, target, schema)
            }
            TypeDeclKind::Enum(_) => debug!("Can not flatten enum {} into {}", located.name, owner),
        }
        self.embedding.pop();
    }

    fn add_definition(&mut self, id: &str, schema: Schema) {
        match self.definitions.entry(id.to_string()) {
            Entry::Occupied(mut existing) => existing.get_mut().merge(schema),
            Entry::Vacant(slot) => {
                slot.insert(schema);
            }
        }
        self.completed.insert(id.to_string());
    }

    fn verify_pending_refs(&mut self) {
        for pending in std::mem::take(&mut self.pending_refs) {
            if !self.completed.contains(&pending.id) {
                let err = ResolveError::TypeNotFound {
                    name: pending.id.clone(),
                    package: pending.package.clone(),
                };
                warn!("Dangling reference: {}", err);
                self.diagnostics
                    .push(Diagnostic::resolution(&pending.package, None, &err));
            }
        }
    }
}

/// Qualified name of a well-known type, such as `serde_json::Value`
fn names_builtin(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Qualified { name, .. } if TypeExpr::builtin(name).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_registry::FsSourceProvider;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::create_dir_all(file_path.parent().unwrap()).unwrap();
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    /// Helper function to lay out a source tree and create a TypeResolver over it
    fn create_resolver(files: &[(&str, &str)]) -> (TempDir, TypeResolver) {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in files {
            create_temp_file(&temp_dir, name, content);
        }
        let provider = FsSourceProvider::new(vec![temp_dir.path().to_path_buf()]);
        let registry = PackageRegistry::new(Box::new(provider), None);
        (temp_dir, TypeResolver::new(registry))
    }

    fn model(id: &str) -> ResolvedType {
        ResolvedType::Model(id.to_string())
    }

    const PET: &str = r#"
        pub struct Pet {
            /// Unique id
            pub id: i64,
            #[serde(rename = "petName")]
            pub name: String,
            pub tag: Option<String>,
            #[serde(skip)]
            pub internal_notes: String,
        }
    "#;

    #[test]
    fn test_primitives_create_no_definition() {
        let (_dir, mut resolver) = create_resolver(&[("models/pet.rs", PET)]);

        assert_eq!(
            resolver.register_type("int", "models").unwrap(),
            ResolvedType::Primitive(Primitive::Int64)
        );
        assert_eq!(
            resolver.register_type("string", "models").unwrap(),
            ResolvedType::Primitive(Primitive::String)
        );
        assert_eq!(
            resolver.register_type("interface{}", "models").unwrap(),
            ResolvedType::Wildcard
        );
        assert!(resolver.definitions().is_empty());
    }

    #[test]
    fn test_register_record() {
        let (_dir, mut resolver) = create_resolver(&[("models/pet.rs", PET)]);

        let resolved = resolver.register_type("Pet", "models").unwrap();
        assert_eq!(resolved, model("models.Pet"));

        let schema = &resolver.definitions()["models.Pet"];
        assert_eq!(schema.schema_type.as_deref(), Some("object"));
        assert_eq!(schema.required, vec!["id".to_string(), "petName".to_string()]);

        let keys: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(keys, vec!["id", "petName", "tag"]);
        assert_eq!(schema.properties["id"].description.as_deref(), Some("Unique id"));
        assert_eq!(schema.properties["id"].format.as_deref(), Some("int64"));
        assert!(!schema.properties.contains_key("internal_notes"));
    }

    #[test]
    fn test_one_definition_per_canonical_id() {
        let (_dir, mut resolver) = create_resolver(&[
            ("models/pet.rs", PET),
            (
                "models/store.rs",
                r#"
                pub struct Order { pub pet: Pet, pub extra: Option<Box<Pet>> }
                pub struct Store { pub pets: Vec<Pet>, pub orders: Vec<Order> }
                "#,
            ),
        ]);

        resolver.register_type("Store", "models").unwrap();
        resolver.register_type("Order", "models").unwrap();
        resolver.register_type("Pet", "models").unwrap();

        let ids: Vec<&String> = resolver.definitions().keys().collect();
        assert_eq!(ids, vec!["models.Order", "models.Pet", "models.Store"]);
        assert_eq!(
            resolver.definitions()["models.Order"].properties["pet"].reference.as_deref(),
            Some("#/definitions/models.Pet")
        );
        assert!(resolver.take_diagnostics().is_empty());
    }

    #[test]
    fn test_two_node_cycle_terminates() {
        let (_dir, mut resolver) = create_resolver(&[(
            "models/graph.rs",
            r#"
            pub struct Owner { pub pets: Vec<Pet> }
            pub struct Pet { pub owner: Option<Box<Owner>> }
            "#,
        )]);

        assert_eq!(resolver.register_type("Owner", "models").unwrap(), model("models.Owner"));

        let definitions = resolver.definitions();
        assert_eq!(definitions.len(), 2);
        assert_eq!(
            definitions["models.Pet"].properties["owner"].reference.as_deref(),
            Some("#/definitions/models.Owner")
        );
        assert_eq!(
            definitions["models.Owner"].properties["pets"]
                .items
                .as_ref()
                .unwrap()
                .reference
                .as_deref(),
            Some("#/definitions/models.Pet")
        );
        assert!(resolver.take_diagnostics().is_empty());
    }

    #[test]
    fn test_recursion_through_alias() {
        let (_dir, mut resolver) = create_resolver(&[(
            "models/tree.rs",
            r#"
            pub type Children = Vec<Node>;
            pub struct Node { pub value: i32, pub children: Children }
            "#,
        )]);

        resolver.register_type("Node", "models").unwrap();

        let children = &resolver.definitions()["models.Node"].properties["children"];
        assert_eq!(children.property_type.as_deref(), Some("array"));
        assert_eq!(
            children.items.as_ref().unwrap().reference.as_deref(),
            Some("#/definitions/models.Node")
        );
        assert!(!resolver.has_definition("models.Children"));
    }

    #[test]
    fn test_alias_cycle_is_an_error() {
        let (_dir, mut resolver) = create_resolver(&[(
            "models/alias.rs",
            r#"
            pub type A = B;
            pub type B = A;
            pub type PetId = i64;
            "#,
        )]);

        assert_eq!(
            resolver.register_type("A", "models").unwrap_err(),
            ResolveError::AliasCycle {
                id: "models.A".to_string()
            }
        );
        assert_eq!(
            resolver.register_type("PetId", "models").unwrap(),
            ResolvedType::Primitive(Primitive::Int64)
        );
        assert!(resolver.definitions().is_empty());
    }

    #[test]
    fn test_embedding_flattens_properties() {
        let (_dir, mut resolver) = create_resolver(&[
            ("models/pet.rs", PET),
            (
                "common/base.rs",
                r#"
                pub struct Base {
                    pub created_at: String,
                    pub owner: Option<crate::models::Pet>,
                }
                "#,
            ),
            (
                "models/dog.rs",
                r#"
                use crate::common;

                pub struct Dog {
                    #[serde(flatten)]
                    pub base: common::Base,
                    pub breed: String,
                }
                "#,
            ),
        ]);

        resolver.register_type("Dog", "models").unwrap();

        let dog = &resolver.definitions()["models.Dog"];
        let keys: Vec<&String> = dog.properties.keys().collect();
        assert_eq!(keys, vec!["breed", "created_at", "owner"]);
        assert_eq!(dog.required, vec!["created_at".to_string(), "breed".to_string()]);
        assert!(!resolver.has_definition("common.Base"));
        assert!(resolver.has_definition("models.Pet"));
    }

    #[test]
    fn test_qualified_names_through_imports() {
        let (_dir, mut resolver) = create_resolver(&[
            ("models/pet.rs", PET),
            (
                "handlers/pets.rs",
                r#"
                use crate::models;
                use crate::models as m;
                use crate::models::Pet;
                use crate::models::Pet as Animal;
                "#,
            ),
        ]);

        for name in ["models.Pet", "models::Pet", "m.Pet", "Pet", "Animal", "[]m.Pet"] {
            let resolved = resolver.register_type(name, "handlers").unwrap();
            let id = match &resolved {
                ResolvedType::Array(items) => items.model_id(),
                other => other.model_id(),
            };
            assert_eq!(id, Some("models.Pet"), "resolving {}", name);
        }
        assert_eq!(resolver.definitions().len(), 1);
    }

    #[test]
    fn test_nested_package_ids() {
        let (_dir, mut resolver) = create_resolver(&[
            ("api/v1/dto/pet.rs", "pub struct PetDto { pub id: i64 }"),
            ("handlers/pets.rs", "use crate::api;"),
        ]);

        assert_eq!(
            resolver.register_type("api.v1.dto.PetDto", "handlers").unwrap(),
            model("api.v1.dto.PetDto")
        );
    }

    #[test]
    fn test_resolution_errors() {
        let (_dir, mut resolver) = create_resolver(&[
            ("models/pet.rs", PET),
            ("handlers/pets.rs", "use crate::models;"),
        ]);

        assert_eq!(
            resolver.register_type("Missing", "models").unwrap_err(),
            ResolveError::TypeNotFound {
                name: "Missing".to_string(),
                package: "models".to_string()
            }
        );
        assert_eq!(
            resolver.register_type("nope.Pet", "handlers").unwrap_err(),
            ResolveError::NotImported {
                alias: "nope".to_string(),
                package: "handlers".to_string()
            }
        );
        assert_eq!(
            resolver.register_type("models.Cat", "handlers").unwrap_err(),
            ResolveError::TypeNotFound {
                name: "Cat".to_string(),
                package: "models".to_string()
            }
        );
        assert_eq!(
            resolver.register_type("Pet", "nowhere").unwrap_err(),
            ResolveError::PackageNotFound {
                package: "nowhere".to_string()
            }
        );
    }

    #[test]
    fn test_declared_types_shadow_well_known_names() {
        let (_dir, mut resolver) = create_resolver(&[
            (
                "models/calendar.rs",
                "pub struct Date { pub day: i32 }\npub struct Value { pub v: i32 }",
            ),
            ("handlers/pets.rs", "use crate::models;"),
        ]);

        assert_eq!(
            resolver.register_type("models.Date", "handlers").unwrap(),
            model("models.Date")
        );
        assert_eq!(
            resolver.register_type("models::Value", "handlers").unwrap(),
            model("models.Value")
        );
        assert_eq!(
            resolver.register_type("time.Time", "handlers").unwrap(),
            ResolvedType::Primitive(Primitive::DateTime)
        );
        assert_eq!(
            resolver.register_type("serde_json::Value", "handlers").unwrap(),
            ResolvedType::Wildcard
        );
        assert_eq!(
            resolver.register_type("models.Uuid", "handlers").unwrap(),
            ResolvedType::Primitive(Primitive::Uuid)
        );

        let ids: Vec<&String> = resolver.definitions().keys().collect();
        assert_eq!(ids, vec!["models.Date", "models.Value"]);
        assert!(resolver.take_diagnostics().is_empty());
    }

    #[test]
    fn test_unresolvable_field_is_dropped_with_diagnostic() {
        let (_dir, mut resolver) = create_resolver(&[(
            "models/pet.rs",
            r#"
            pub struct Pet {
                pub id: i64,
                pub owner: Owner,
                pub pairs: Vec<(i32, i32)>,
                pub err: error,
            }
            "#,
        )]);

        resolver.register_type("Pet", "models").unwrap();

        let pet = &resolver.definitions()["models.Pet"];
        let keys: Vec<&str> = pet.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id"]);
        assert_eq!(pet.required, vec!["id".to_string()]);

        let diagnostics = resolver.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].declaration.as_deref(), Some("models.Pet"));
        assert!(diagnostics[0].message.contains("Owner"));
    }

    #[test]
    fn test_enums_and_maps() {
        let (_dir, mut resolver) = create_resolver(&[(
            "models/pet.rs",
            r#"
            use std::collections::HashMap;

            pub enum Status { Available, Sold }

            pub struct Pet {
                pub status: Status,
                pub labels: HashMap<String, String>,
                pub attributes: serde_json::Value,
            }
            "#,
        )]);

        resolver.register_type("Pet", "models").unwrap();

        let definitions = resolver.definitions();
        assert_eq!(
            definitions["models.Status"].enum_values,
            Some(vec!["Available".to_string(), "Sold".to_string()])
        );
        let pet = &definitions["models.Pet"];
        assert_eq!(
            pet.properties["status"].reference.as_deref(),
            Some("#/definitions/models.Status")
        );
        assert_eq!(pet.properties["labels"].property_type.as_deref(), Some("array"));
        assert_eq!(
            pet.properties["labels"].items.as_ref().unwrap().property_type.as_deref(),
            Some("string")
        );
        assert_eq!(pet.properties["attributes"].property_type.as_deref(), Some("object"));
    }

    #[test]
    fn test_rename_all_sets_wire_names() {
        let (_dir, mut resolver) = create_resolver(&[(
            "models/pet.rs",
            r#"
            #[serde(rename_all = "camelCase")]
            pub struct Pet {
                pub pet_name: String,
                pub status: Status,
            }

            #[serde(rename_all = "lowercase")]
            pub enum Status { Available, Sold }
            "#,
        )]);

        resolver.register_type("Pet", "models").unwrap();

        let definitions = resolver.definitions();
        let pet = &definitions["models.Pet"];
        let keys: Vec<&str> = pet.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["petName", "status"]);
        assert_eq!(pet.required, vec!["petName".to_string(), "status".to_string()]);
        assert_eq!(
            definitions["models.Status"].enum_values,
            Some(vec!["available".to_string(), "sold".to_string()])
        );
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("models", "Pet"), "models.Pet");
        assert_eq!(canonical_id("api/v1", "Pet"), "api.v1.Pet");
        assert_eq!(canonical_id("", "Pet"), "Pet");
    }
}
