//! Declarations of one package, extracted from its parsed source files.
//!
//! A [`PackageSource`] is the read-only view the rest of the pipeline works from: declared
//! types, functions with their doc comment lines, and the flattened `use` list.

use crate::parser::{doc_comment_lines, doc_description, ParsedFile};
use crate::type_expr::TypeExpr;
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::visit::Visit;

/// Everything a package declares.
#[derive(Debug, Clone, Default)]
pub struct PackageSource {
    /// Canonical directory of the package
    pub location: PathBuf,
    /// Declared types by local name
    pub types: HashMap<String, TypeDecl>,
    /// Functions in file order, then source order
    pub functions: Vec<FunctionDecl>,
    /// Flattened `use` declarations
    pub imports: Vec<ImportDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclKind {
    /// Record with named fields
    Struct(Vec<FieldDecl>),
    /// `type A = B;` or a newtype struct
    Alias(TypeExpr),
    /// Fieldless enumeration; wire names of the variants
    Enum(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Identifier as written in the struct
    pub name: String,
    pub ty: TypeExpr,
    /// Declared as `Option<T>`
    pub optional: bool,
    pub tags: FieldTags,
    /// Joined doc comment of the field
    pub description: Option<String>,
}

impl FieldDecl {
    /// Property name on the wire
    pub fn wire_name(&self) -> &str {
        self.tags.rename.as_deref().unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        !self.optional && !self.tags.optional
    }
}

/// Serialization metadata read from `#[serde(...)]` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    pub rename: Option<String>,
    /// `skip` / `skip_serializing`: the field is not part of the wire format
    pub excluded: bool,
    /// `flatten`: the field's properties are merged into the parent
    pub embedded: bool,
    /// `default` / `skip_serializing_if`: the field may be absent
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    /// Self type of the enclosing `impl` block
    pub receiver: Option<String>,
    /// Raw doc comment lines
    pub doc_lines: Vec<String>,
}

impl FunctionDecl {
    /// `Receiver.name` for methods, the bare name otherwise
    pub fn qualified_name(&self) -> String {
        match &self.receiver {
            Some(receiver) => format!("{}.{}", receiver, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Path segments as written, e.g. `["crate", "models"]`
    pub path: Vec<String>,
    /// Name given with `as`
    pub alias: Option<String>,
}

impl ImportDecl {
    /// The name the import is visible under in the importing file
    pub fn visible_name(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .or_else(|| self.path.last().map(String::as_str))
    }
}

impl PackageSource {
    /// Collects declarations from the parsed files of one package.
    ///
    /// Files are expected in name order. A type declared twice keeps the later declaration.
    pub fn from_files(location: PathBuf, files: &[ParsedFile]) -> Self {
        let mut collector = DeclarationCollector::default();
        for file in files {
            collector.visit_file(&file.syntax_tree);
        }

        let mut types = HashMap::new();
        for decl in collector.types {
            if types.contains_key(&decl.name) {
                debug!("Type {} declared more than once in {}", decl.name, location.display());
            }
            types.insert(decl.name.clone(), decl);
        }

        PackageSource {
            location,
            types,
            functions: collector.functions,
            imports: collector.imports,
        }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

/// Visitor collecting package-level declarations.
///
/// Only items at file level (and methods of `impl` blocks) are collected; function bodies and
/// inline modules are not descended into.
#[derive(Default)]
struct DeclarationCollector {
    types: Vec<TypeDecl>,
    functions: Vec<FunctionDecl>,
    imports: Vec<ImportDecl>,
    current_receiver: Option<String>,
}

impl<'ast> Visit<'ast> for DeclarationCollector {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let name = node.ident.to_string();
        let kind = match &node.fields {
            syn::Fields::Named(named) => {
                let rule = rename_rule(&node.attrs);
                TypeDeclKind::Struct(
                    named
                        .named
                        .iter()
                        .filter_map(|field| field_decl(field, rule))
                        .collect(),
                )
            }
            syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                let (ty, _) = TypeExpr::from_syn(&unnamed.unnamed[0].ty);
                TypeDeclKind::Alias(ty)
            }
            _ => TypeDeclKind::Struct(Vec::new()),
        };
        debug!("Found struct: {}", name);
        self.types.push(TypeDecl { name, kind });
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        let name = node.ident.to_string();
        // serde encodes data-carrying variants as objects
        if !node
            .variants
            .iter()
            .all(|variant| matches!(variant.fields, syn::Fields::Unit))
        {
            debug!("Enum {} has data-carrying variants, documenting it as an object", name);
            self.types.push(TypeDecl {
                name,
                kind: TypeDeclKind::Struct(Vec::new()),
            });
            return;
        }

        let rule = rename_rule(&node.attrs);
        let variants = node
            .variants
            .iter()
            .map(|variant| {
                let ident = variant.ident.to_string();
                parse_serde_attributes(&variant.attrs)
                    .rename
                    .or_else(|| rule.map(|rule| rule.apply_to_variant(&ident)))
                    .unwrap_or(ident)
            })
            .collect();
        self.types.push(TypeDecl {
            name,
            kind: TypeDeclKind::Enum(variants),
        });
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        let (target, _) = TypeExpr::from_syn(&node.ty);
        self.types.push(TypeDecl {
            name: node.ident.to_string(),
            kind: TypeDeclKind::Alias(target),
        });
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.functions.push(FunctionDecl {
            name: node.sig.ident.to_string(),
            receiver: None,
            doc_lines: doc_comment_lines(&node.attrs),
        });
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let receiver = match node.self_ty.as_ref() {
            syn::Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string()),
            _ => None,
        };
        self.current_receiver = receiver;
        for item in &node.items {
            if let syn::ImplItem::Fn(method) = item {
                self.visit_impl_item_fn(method);
            }
        }
        self.current_receiver = None;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.functions.push(FunctionDecl {
            name: node.sig.ident.to_string(),
            receiver: self.current_receiver.clone(),
            doc_lines: doc_comment_lines(&node.attrs),
        });
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let mut prefix = Vec::new();
        flatten_use_tree(&node.tree, &mut prefix, &mut self.imports);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        debug!("Skipping inline module {}", node.ident);
    }
}

fn field_decl(field: &syn::Field, rule: Option<RenameRule>) -> Option<FieldDecl> {
    let name = field.ident.as_ref()?.unraw().to_string();
    let (ty, optional) = TypeExpr::from_syn(&field.ty);
    let mut tags = parse_serde_attributes(&field.attrs);
    if tags.rename.is_none() {
        tags.rename = rule.map(|rule| rule.apply_to_field(&name));
    }
    Some(FieldDecl {
        name,
        ty,
        optional,
        tags,
        description: doc_description(&field.attrs),
    })
}

/// Casing applied by `#[serde(rename_all = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_name(name: &str) -> Option<Self> {
        let rule = match name {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        };
        Some(rule)
    }

    /// Wire name of a `snake_case` field
    fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            RenameRule::Camel => lower_first(&RenameRule::Pascal.apply_to_field(field)),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }

    /// Wire name of a `PascalCase` variant
    fn apply_to_variant(self, variant: &str) -> String {
        match self {
            RenameRule::Pascal => variant.to_string(),
            RenameRule::Lower => variant.to_ascii_lowercase(),
            RenameRule::Upper => variant.to_ascii_uppercase(),
            RenameRule::Camel => lower_first(variant),
            RenameRule::Snake => {
                let mut snake = String::with_capacity(variant.len() + 4);
                for (i, ch) in variant.char_indices() {
                    if i > 0 && ch.is_ascii_uppercase() {
                        snake.push('_');
                    }
                    snake.push(ch.to_ascii_lowercase());
                }
                snake
            }
            RenameRule::ScreamingSnake => {
                RenameRule::Snake.apply_to_variant(variant).to_ascii_uppercase()
            }
            RenameRule::Kebab => RenameRule::Snake.apply_to_variant(variant).replace('_', "-"),
            RenameRule::ScreamingKebab => RenameRule::ScreamingSnake
                .apply_to_variant(variant)
                .replace('_', "-"),
        }
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Items of every `#[serde(...)]` attribute, in order.
fn serde_metas(attrs: &[syn::Attribute]) -> Vec<syn::Meta> {
    let mut metas = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        match attr.parse_args_with(Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated) {
            Ok(items) => metas.extend(items),
            Err(e) => debug!("Ignoring unreadable serde attribute: {}", e),
        }
    }
    metas
}

fn string_value(expr: &syn::Expr) -> Option<String> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(value),
            ..
        }) => Some(value.value()),
        _ => None,
    }
}

/// Container-level `rename_all`, or its `serialize` half.
fn rename_rule(attrs: &[syn::Attribute]) -> Option<RenameRule> {
    let mut rule = None;
    for meta in serde_metas(attrs) {
        let value = match &meta {
            syn::Meta::NameValue(name_value) if name_value.path.is_ident("rename_all") => {
                string_value(&name_value.value)
            }
            syn::Meta::List(list) if list.path.is_ident("rename_all") => list
                .parse_args_with(Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated)
                .ok()
                .and_then(|items| {
                    items.iter().find_map(|item| match item {
                        syn::Meta::NameValue(nv) if nv.path.is_ident("serialize") => {
                            string_value(&nv.value)
                        }
                        _ => None,
                    })
                }),
            _ => None,
        };
        if let Some(value) = value {
            rule = RenameRule::from_name(&value);
            if rule.is_none() {
                debug!("Ignoring unknown rename_all rule {}", value);
            }
        }
    }
    rule
}

/// Reads the `#[serde(...)]` attributes relevant to the wire format.
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> FieldTags {
    let mut tags = FieldTags::default();

    for meta in serde_metas(attrs) {
        match &meta {
            syn::Meta::Path(path) => {
                if path.is_ident("skip") || path.is_ident("skip_serializing") {
                    tags.excluded = true;
                } else if path.is_ident("flatten") {
                    tags.embedded = true;
                } else if path.is_ident("default") {
                    tags.optional = true;
                }
            }
            syn::Meta::NameValue(name_value) => {
                let path = &name_value.path;
                if path.is_ident("rename") {
                    if let Some(value) = string_value(&name_value.value) {
                        tags.rename = Some(value);
                    }
                } else if path.is_ident("default") || path.is_ident("skip_serializing_if") {
                    tags.optional = true;
                }
            }
            // rename(serialize = "..") and friends
            syn::Meta::List(_) => {}
        }
    }

    tags
}

fn flatten_use_tree(tree: &syn::UseTree, prefix: &mut Vec<String>, out: &mut Vec<ImportDecl>) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            flatten_use_tree(&path.tree, prefix, out);
            prefix.pop();
        }
        syn::UseTree::Name(name) => {
            let mut path = prefix.clone();
            if name.ident != "self" {
                path.push(name.ident.to_string());
            }
            if !path.is_empty() {
                out.push(ImportDecl { path, alias: None });
            }
        }
        syn::UseTree::Rename(rename) => {
            if rename.rename == "_" {
                return;
            }
            let mut path = prefix.clone();
            if rename.ident != "self" {
                path.push(rename.ident.to_string());
            }
            if !path.is_empty() {
                out.push(ImportDecl {
                    path,
                    alias: Some(rename.rename.to_string()),
                });
            }
        }
        syn::UseTree::Glob(_) => {
            debug!("Skipping glob import {}::*", prefix.join("::"));
        }
        syn::UseTree::Group(group) => {
            for item in &group.items {
                flatten_use_tree(item, prefix, out);
            }
        }
    }
}
