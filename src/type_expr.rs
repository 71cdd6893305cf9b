//! Type expressions shared by the source model and the annotation grammar.
//!
//! A field type such as `Option<Vec<models::Pet>>` and an annotation type name such as
//! `models.Pet` are both reduced to a [`TypeExpr`], a closed set of shapes the type resolver
//! matches on exhaustively.

use log::debug;

/// Built-in scalar with a fixed wire type and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    String,
    DateTime,
    Date,
    Uuid,
    File,
    /// Known scalar without a wire representation (`error`, `complex128`, `undefined`, ...)
    Undefined,
}

impl Primitive {
    /// Look up a type name in the static translation table.
    pub fn from_name(name: &str) -> Option<Primitive> {
        let primitive = match name {
            "bool" | "NullBool" => Primitive::Boolean,
            "int8" | "int16" | "int32" | "uint8" | "uint16" | "uint32" | "i8" | "i16" | "i32"
            | "u8" | "u16" | "u32" | "byte" | "rune" => Primitive::Int32,
            "int" | "int64" | "uint" | "uint64" | "i64" | "i128" | "u64" | "u128" | "isize"
            | "usize" | "NullInt64" => Primitive::Int64,
            "float32" | "f32" => Primitive::Float,
            "float64" | "f64" | "NullFloat64" => Primitive::Double,
            "string" | "String" | "str" | "char" | "NullString" => Primitive::String,
            "Time" | "DateTime" | "NaiveDateTime" | "SystemTime" | "OffsetDateTime" => {
                Primitive::DateTime
            }
            "NaiveDate" | "Date" => Primitive::Date,
            "Uuid" => Primitive::Uuid,
            "file" => Primitive::File,
            "error" | "complex64" | "complex128" | "uintptr" | "undefined" => Primitive::Undefined,
            _ => return None,
        };
        Some(primitive)
    }

    /// Wire type and format, or `None` for unsupported scalars.
    pub fn wire(&self) -> Option<(&'static str, Option<&'static str>)> {
        match self {
            Primitive::Boolean => Some(("boolean", None)),
            Primitive::Int32 => Some(("integer", Some("int32"))),
            Primitive::Int64 => Some(("integer", Some("int64"))),
            Primitive::Float => Some(("number", Some("float"))),
            Primitive::Double => Some(("number", Some("double"))),
            Primitive::String => Some(("string", None)),
            Primitive::DateTime => Some(("string", Some("date-time"))),
            Primitive::Date => Some(("string", Some("date"))),
            Primitive::Uuid => Some(("string", Some("uuid"))),
            Primitive::File => Some(("file", None)),
            Primitive::Undefined => None,
        }
    }
}

/// Shape of a referenced type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(Primitive),
    /// Unqualified identifier, declared in (or imported into) the current package
    Named(String),
    /// `path::Name` or `path.Name`; `path` holds the qualifier segments as written
    Qualified { path: Vec<String>, name: String },
    /// Any sequence type; documented through its items
    Array(Box<TypeExpr>),
    /// Any map type; documented as an array of its values
    MapLike(Box<TypeExpr>),
    /// Value of unknown shape, never expanded
    Wildcard,
}

impl TypeExpr {
    /// Convert a field type into a type expression.
    ///
    /// Returns the expression and whether the outermost wrapper was `Option<T>`. Smart pointers
    /// and references are transparent.
    pub fn from_syn(ty: &syn::Type) -> (TypeExpr, bool) {
        match ty {
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Ptr(ptr) => Self::from_syn(&ptr.elem),
            syn::Type::Array(array) => {
                let (inner, _) = Self::from_syn(&array.elem);
                (TypeExpr::Array(Box::new(inner)), false)
            }
            syn::Type::Slice(slice) => {
                let (inner, _) = Self::from_syn(&slice.elem);
                (TypeExpr::Array(Box::new(inner)), false)
            }
            syn::Type::TraitObject(_) | syn::Type::ImplTrait(_) => (TypeExpr::Wildcard, false),
            syn::Type::Path(type_path) if type_path.qself.is_none() => {
                Self::from_path(&type_path.path)
            }
            _ => {
                debug!("Unsupported type shape, treating as undefined");
                (TypeExpr::Primitive(Primitive::Undefined), false)
            }
        }
    }

    fn from_path(path: &syn::Path) -> (TypeExpr, bool) {
        let Some(segment) = path.segments.last() else {
            return (TypeExpr::Primitive(Primitive::Undefined), false);
        };
        let type_name = segment.ident.to_string();

        let generic_args: Vec<&syn::Type> = match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        match type_name.as_str() {
            "Option" => {
                if let Some(inner) = generic_args.first() {
                    let (inner, _) = Self::from_syn(inner);
                    return (inner, true);
                }
            }
            "Box" | "Rc" | "Arc" | "Cow" | "RefCell" | "Cell" | "Mutex" | "RwLock" => {
                if let Some(inner) = generic_args.first() {
                    return Self::from_syn(inner);
                }
            }
            "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet" => {
                if let Some(inner) = generic_args.first() {
                    let (inner, _) = Self::from_syn(inner);
                    return (TypeExpr::Array(Box::new(inner)), false);
                }
            }
            "HashMap" | "BTreeMap" | "IndexMap" => {
                if let Some(value) = generic_args.get(1) {
                    let (value, _) = Self::from_syn(value);
                    return (TypeExpr::MapLike(Box::new(value)), false);
                }
            }
            _ => {}
        }

        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        (Self::from_segments(segments), false)
    }

    /// Parse a type name written in an annotation.
    ///
    /// Accepts `Pet`, `models.Pet`, `models::Pet`, `[]Pet`, `map[string]Pet` and Rust type
    /// syntax such as `Vec<Pet>`.
    pub fn parse(text: &str) -> TypeExpr {
        let text = text.trim();

        if let Some(items) = text.strip_prefix("[]") {
            return TypeExpr::Array(Box::new(Self::parse(items)));
        }
        if let Some(rest) = text.strip_prefix("map[") {
            if let Some(close) = rest.find(']') {
                return TypeExpr::MapLike(Box::new(Self::parse(&rest[close + 1..])));
            }
        }
        if text.contains("interface") {
            return TypeExpr::Wildcard;
        }
        if text.contains("::") || text.contains('<') || text.starts_with('&') {
            return match syn::parse_str::<syn::Type>(text) {
                Ok(ty) => Self::from_syn(&ty).0,
                Err(e) => {
                    debug!("Can not parse type name {}: {}", text, e);
                    TypeExpr::Primitive(Primitive::Undefined)
                }
            };
        }

        let segments: Vec<String> = text
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return TypeExpr::Primitive(Primitive::Undefined);
        }
        Self::from_segments(segments)
    }

    fn from_segments(mut segments: Vec<String>) -> TypeExpr {
        let name = match segments.pop() {
            Some(name) => name,
            None => return TypeExpr::Primitive(Primitive::Undefined),
        };

        // Left to the resolver: the qualifier's package may declare its own `Date`
        if !segments.is_empty() {
            return TypeExpr::Qualified {
                path: segments,
                name,
            };
        }
        Self::builtin(&name).unwrap_or(TypeExpr::Named(name))
    }

    /// Primitive or wildcard a well-known type name stands for.
    pub fn builtin(name: &str) -> Option<TypeExpr> {
        if let Some(primitive) = Primitive::from_name(name) {
            return Some(TypeExpr::Primitive(primitive));
        }
        is_wildcard_name(name).then_some(TypeExpr::Wildcard)
    }
}

fn is_wildcard_name(name: &str) -> bool {
    matches!(name, "interface" | "any" | "Any" | "Value")
}
