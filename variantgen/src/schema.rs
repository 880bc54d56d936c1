//! Type arena shared by every variant of a generation run
//!
//! Parameters refer to their semantic type through a [`TypeId`]. Structured
//! types may refer to each other (including themselves), so the arena allows a
//! type to be declared first and defined later.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name used for boolean-flag-like parameters
pub const SWITCH_TYPE_NAME: &str = "SwitchParameter";

/// Stable handle to a type stored in a [`Schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(usize);

impl TypeId {
    /// Position of this type inside its arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named member of a structured type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub type_id: TypeId,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub serialized_name: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            required: false,
            read_only: false,
            description: String::new(),
            serialized_name: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_serialized_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }
}

/// Shape of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    /// Presence-only flag; never annotated with a value type in syntax lines
    Switch,
    /// Opaque scalar value (string, integer, date...)
    Scalar,
    /// Closed set of string values
    Enum { values: Vec<String> },
    /// Sequence of another type
    Array { element: TypeId },
    /// Optional wrapper around another type
    Nullable { inner: TypeId },
    /// Structured type documented recursively
    Object { properties: Vec<Property> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: TypeKind,
}

/// Immutable arena of type definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    types: Vec<TypeDef>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, id: TypeId) -> bool {
        id.0 < self.types.len()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.0)
    }

    /// Look a type up by its declared name
    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|def| def.name == name)
            .map(TypeId)
    }

    /// Follow nullable (and optionally array) wrappers to the wrapped type
    ///
    /// At most one step per arena entry, so a wrapper that wraps itself yields
    /// `None` instead of looping.
    fn unwrap_wrappers(&self, id: TypeId, through_arrays: bool) -> Option<(TypeId, &TypeDef)> {
        let mut current = id;
        for _ in 0..=self.types.len() {
            let def = self.get(current)?;
            match &def.kind {
                TypeKind::Nullable { inner } => current = *inner,
                TypeKind::Array { element } if through_arrays => current = *element,
                _ => return Some((current, def)),
            }
        }
        None
    }

    /// Whether the type is a presence-only flag, looking through nullable wrappers
    pub fn is_switch(&self, id: TypeId) -> bool {
        matches!(
            self.unwrap_wrappers(id, false),
            Some((_, TypeDef { kind: TypeKind::Switch, .. }))
        )
    }

    /// Whether array and nullable wrappers starting at `id` loop back on themselves
    pub fn has_wrapper_cycle(&self, id: TypeId) -> bool {
        self.contains(id) && self.unwrap_wrappers(id, true).is_none()
    }

    /// Type name as shown in syntax lines and help
    ///
    /// Arrays render as `Element[]` and nullable wrappers as `Inner?`.
    pub fn syntax_name(&self, id: TypeId) -> String {
        self.syntax_name_bounded(id, self.types.len())
    }

    fn syntax_name_bounded(&self, id: TypeId, budget: usize) -> String {
        let Some(def) = self.get(id) else {
            return format!("#{}", id.0);
        };
        if budget == 0 {
            return def.name.clone();
        }
        match &def.kind {
            TypeKind::Array { element } => {
                format!("{}[]", self.syntax_name_bounded(*element, budget - 1))
            }
            TypeKind::Nullable { inner } => {
                format!("{}?", self.syntax_name_bounded(*inner, budget - 1))
            }
            _ => def.name.clone(),
        }
    }

    /// The structured type behind `id`, unwrapping arrays and nullable wrappers
    ///
    /// Returns `None` for scalar-like types, which need no complex-parameter notes.
    pub fn complex_root(&self, id: TypeId) -> Option<TypeId> {
        match self.unwrap_wrappers(id, true)? {
            (root, TypeDef { kind: TypeKind::Object { .. }, .. }) => Some(root),
            _ => None,
        }
    }

    /// Properties of a structured type, empty for anything else
    pub fn properties(&self, id: TypeId) -> &[Property] {
        match self.get(id).map(|def| &def.kind) {
            Some(TypeKind::Object { properties }) => properties,
            _ => &[],
        }
    }
}

/// Incremental construction of a [`Schema`]
///
/// Named types are deduplicated: asking for the same scalar twice yields the
/// same [`TypeId`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeDef>,
    names: IndexMap<String, TypeId>,
}

impl SchemaBuilder {
    fn push(&mut self, name: String, kind: TypeKind) -> TypeId {
        if let Some(id) = self.names.get(&name) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(TypeDef {
            name: name.clone(),
            description: String::new(),
            kind,
        });
        self.names.insert(name, id);
        id
    }

    /// Get or create a scalar type
    pub fn scalar(&mut self, name: impl Into<String>) -> TypeId {
        self.push(name.into(), TypeKind::Scalar)
    }

    /// Get or create the switch type
    pub fn switch(&mut self) -> TypeId {
        self.push(SWITCH_TYPE_NAME.to_string(), TypeKind::Switch)
    }

    pub fn enumeration(&mut self, name: impl Into<String>, values: Vec<String>) -> TypeId {
        self.push(name.into(), TypeKind::Enum { values })
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let name = match self.types.get(element.0) {
            Some(def) => format!("{}[]", def.name),
            None => format!("#{}[]", element.0),
        };
        self.push(name, TypeKind::Array { element })
    }

    pub fn nullable(&mut self, inner: TypeId) -> TypeId {
        let name = match self.types.get(inner.0) {
            Some(def) => format!("{}?", def.name),
            None => format!("#{}?", inner.0),
        };
        self.push(name, TypeKind::Nullable { inner })
    }

    /// Reserve a name so that properties can refer to it before it is defined
    pub fn declare(&mut self, name: impl Into<String>) -> TypeId {
        self.push(name.into(), TypeKind::Scalar)
    }

    /// Replace the shape of a previously declared type
    pub fn define(&mut self, id: TypeId, kind: TypeKind) -> &mut Self {
        if let Some(def) = self.types.get_mut(id.0) {
            def.kind = kind;
        }
        self
    }

    /// Declare and define a structured type in one step
    pub fn object(&mut self, name: impl Into<String>, properties: Vec<Property>) -> TypeId {
        let id = self.declare(name);
        self.define(id, TypeKind::Object { properties });
        id
    }

    pub fn describe(&mut self, id: TypeId, description: impl Into<String>) -> &mut Self {
        if let Some(def) = self.types.get_mut(id.0) {
            def.description = description.into();
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn build(self) -> Schema {
        Schema { types: self.types }
    }
}
