//! The schema describing the data a template is executed against.
//! Callers describe the root data type (and everything reachable from
//! it) in a [`TypeRegistry`], and the functions the template may call
//! in a [`FunctionTable`].

mod functions;

pub use self::functions::{FunctionTable, Signature};

pub type TypeId = usize;

pub const BOOL: TypeId = 0;
pub const INT: TypeId = 1;
pub const FLOAT: TypeId = 2;
pub const STRING: TypeId = 3;
/// The error interface. Only meaningful as a trailing return value.
pub const ERROR: TypeId = 4;
/// A value whose concrete type is only known at runtime.
pub const DYNAMIC: TypeId = 5;

#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool,
    Int,
    Float,
    String,
    Error,
    Dynamic,
    Pointer(TypeId),
    Sequence(TypeId),
    /// Key, value
    Map(TypeId, TypeId),
    Record(Record),
}

/// A named struct-like type with fields and methods.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: String,
    fields: Vec<(String, TypeId)>,
    methods: Vec<(String, Signature)>,
}

impl Record {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn add_field(&mut self, name: impl ToString, ty: TypeId) -> &mut Self {
        self.fields.push((name.to_string(), ty));
        self
    }

    pub fn add_method(&mut self, name: impl ToString, signature: Signature) -> &mut Self {
        self.methods.push((name.to_string(), signature));
        self
    }

    pub fn field(&self, name: &str) -> Option<TypeId> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| *ty)
    }

    pub fn method(&self, name: &str) -> Option<&Signature> {
        self.methods
            .iter()
            .find(|(method, _)| method == name)
            .map(|(_, signature)| signature)
    }
}

/// The outcome of walking a field path from some base type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PathResolution {
    /// The type of the whole path, [`DYNAMIC`] if the walk hit a hole.
    pub ty: TypeId,
    /// Index of the first segment that had to be looked up on a
    /// dynamic value, if any. Everything from there on is untyped.
    pub hole: Option<usize>,
}

/// Holds information on the type universe.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    type_id_to_type: Vec<Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        // Order must match the constants above
        Self {
            type_id_to_type: vec![
                Type::Bool,
                Type::Int,
                Type::Float,
                Type::String,
                Type::Error,
                Type::Dynamic,
            ],
        }
    }

    /// Gets the given type or adds it to the universe if it doesn't exist.
    /// Records are nominal, so they always get a fresh id;
    /// use [`TypeRegistry::add_record`] for those.
    pub fn get_or_add_type(&mut self, ty: Type) -> TypeId {
        if !matches!(ty, Type::Record(_)) {
            if let Some(id) = self.type_id_to_type.iter().position(|x| *x == ty) {
                return id;
            }
        }

        self.type_id_to_type.push(ty);
        self.type_id_to_type.len() - 1
    }

    pub fn get_type(&self, id: TypeId) -> Option<&Type> {
        self.type_id_to_type.get(id)
    }

    pub fn pointer_to(&mut self, id: TypeId) -> TypeId {
        self.get_or_add_type(Type::Pointer(id))
    }

    pub fn sequence_of(&mut self, id: TypeId) -> TypeId {
        self.get_or_add_type(Type::Sequence(id))
    }

    pub fn map_of(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.get_or_add_type(Type::Map(key, value))
    }

    /// Adds an empty record. Fill it in through [`TypeRegistry::record_mut`];
    /// declaring first lets a record refer to itself.
    pub fn add_record(&mut self, name: impl ToString) -> TypeId {
        self.get_or_add_type(Type::Record(Record::new(name)))
    }

    pub fn record_mut(&mut self, id: TypeId) -> Option<&mut Record> {
        match self.type_id_to_type.get_mut(id) {
            Some(Type::Record(record)) => Some(record),
            _ => None,
        }
    }

    /// Follows pointers until reaching a non-pointer type.
    pub fn deref(&self, mut id: TypeId) -> TypeId {
        while let Some(Type::Pointer(pointee)) = self.get_type(id) {
            id = *pointee;
        }

        id
    }

    pub fn is_dynamic(&self, id: TypeId) -> bool {
        matches!(self.get_type(self.deref(id)), Some(Type::Dynamic))
    }

    /// The (key, element) types produced by ranging over a value of type `id`.
    /// Sequences are keyed by their integer index. Pointers are followed.
    pub fn range_types(&self, id: TypeId) -> Option<(TypeId, TypeId)> {
        match self.get_type(self.deref(id))? {
            Type::Sequence(element) => Some((INT, *element)),
            Type::Map(key, value) => Some((*key, *value)),
            Type::Dynamic => Some((DYNAMIC, DYNAMIC)),
            _ => None,
        }
    }

    /// Resolves a single `.name` access on a value of type `id`:
    /// a record field, then a method (yielding its result), then a
    /// string-keyed map entry.
    pub fn resolve_segment(&self, id: TypeId, name: &str) -> Result<TypeId, String> {
        let id = self.deref(id);

        match self.get_type(id) {
            Some(Type::Dynamic) => Ok(DYNAMIC),

            Some(Type::Record(record)) => {
                if let Some(field) = record.field(name) {
                    Ok(field)
                } else if let Some(method) = record.method(name) {
                    method
                        .output(self)
                        .map_err(|err| format!("method `{}.{}` {}", record.name, name, err))
                } else {
                    Err(format!(
                        "type `{}` has no field or method `{}`",
                        record.name, name
                    ))
                }
            },

            Some(Type::Map(key, value)) if *key == STRING => Ok(*value),

            _ => Err(format!(
                "can't access `.{}` on a value of type `{}`",
                name,
                self.type_name(id)
            )),
        }
    }

    /// Walks `segments` starting from `base`, stopping as soon as a
    /// dynamic value is reached.
    pub fn walk_path(&self, base: TypeId, segments: &[String]) -> Result<PathResolution, String> {
        let mut current = base;

        for (i, segment) in segments.iter().enumerate() {
            if self.is_dynamic(current) {
                return Ok(PathResolution {
                    ty: DYNAMIC,
                    hole: Some(i),
                });
            }

            current = self.resolve_segment(current, segment)?;
        }

        Ok(PathResolution {
            ty: current,
            hole: None,
        })
    }

    /// Returns a string, suitable for display, that represents the type.
    pub fn type_name(&self, id: TypeId) -> String {
        match self.get_type(id) {
            None => format!("{{unknown type #{}}}", id),
            Some(Type::Bool) => "bool".to_owned(),
            Some(Type::Int) => "int".to_owned(),
            Some(Type::Float) => "float64".to_owned(),
            Some(Type::String) => "string".to_owned(),
            Some(Type::Error) => "error".to_owned(),
            Some(Type::Dynamic) => "interface{}".to_owned(),
            Some(Type::Pointer(pointee)) => format!("*{}", self.type_name(*pointee)),
            Some(Type::Sequence(element)) => format!("[]{}", self.type_name(*element)),
            Some(Type::Map(key, value)) => {
                format!("map[{}]{}", self.type_name(*key), self.type_name(*value))
            },
            Some(Type::Record(record)) => record.name.clone(),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
