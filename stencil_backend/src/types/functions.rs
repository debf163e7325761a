use std::collections::HashMap;

use super::{Type, TypeId, TypeRegistry, BOOL, DYNAMIC, INT, STRING};

/// The shape of a callable: a function from the table or a record method.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub params: Vec<TypeId>,
    /// The last parameter may be repeated.
    pub variadic: bool,
    pub returns: Vec<TypeId>,
}

impl Signature {
    pub fn new(params: Vec<TypeId>, returns: Vec<TypeId>) -> Self {
        Self {
            params,
            variadic: false,
            returns,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// The type of the value a call produces. Callables may return a
    /// single value, or a value and an error.
    pub fn output(&self, registry: &TypeRegistry) -> Result<TypeId, String> {
        match self.returns.as_slice() {
            [ty] => Ok(*ty),
            [ty, err] if registry.get_type(*err) == Some(&Type::Error) => Ok(*ty),
            [] => Err("returns no value".to_owned()),
            _ => Err(format!(
                "has an unsupported return arity ({} values)",
                self.returns.len()
            )),
        }
    }
}

/// Maps function names to their signatures.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, Signature>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table pre-populated with the template language's builtin functions
    /// and the default runtime lookup function.
    pub fn with_builtins() -> Self {
        let mut res = Self::new();

        let bool_ops = ["and", "or"];
        for name in &bool_ops {
            res.insert(*name, Signature::new(vec![DYNAMIC], vec![DYNAMIC]).variadic());
        }

        let comparisons = ["ne", "lt", "le", "gt", "ge"];
        for name in &comparisons {
            res.insert(*name, Signature::new(vec![DYNAMIC, DYNAMIC], vec![BOOL]));
        }

        res.insert("eq", Signature::new(vec![DYNAMIC, DYNAMIC], vec![BOOL]).variadic());
        res.insert("not", Signature::new(vec![DYNAMIC], vec![BOOL]));
        res.insert("len", Signature::new(vec![DYNAMIC], vec![INT]));

        for name in &["index", "slice", "call"] {
            res.insert(*name, Signature::new(vec![DYNAMIC, DYNAMIC], vec![DYNAMIC]).variadic());
        }

        for name in &["print", "printf", "println", "html", "js", "urlquery"] {
            res.insert(*name, Signature::new(vec![DYNAMIC], vec![STRING]).variadic());
        }

        res.insert(crate::options::DEFAULT_LOOKUP_FUNCTION, Self::lookup_signature());
        res
    }

    /// `lookup(base, "A.B", extra...)`
    pub fn lookup_signature() -> Signature {
        Signature::new(vec![DYNAMIC, STRING, DYNAMIC], vec![DYNAMIC]).variadic()
    }

    pub fn insert(&mut self, name: impl ToString, signature: Signature) -> Option<Signature> {
        self.functions.insert(name.to_string(), signature)
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}
