//! Builders shared by the tests.

/// `cmd![Arg::ident("up"), Arg::Dot]`
macro_rules! cmd {
    ($($arg:expr),* $(,)?) => {
        $crate::tree::Command::new(vec![$($arg),*])
    };
}

/// A pipe without declarations.
macro_rules! pipe {
    ($($cmd:expr),* $(,)?) => {
        $crate::tree::Pipe::new(vec![$($cmd),*])
    };
}

/// `decl!("$x", "$y" => cmd![...], cmd![...])`
macro_rules! decl {
    ($($name:literal),+ => $($cmd:expr),+ $(,)?) => {
        $crate::tree::Pipe::declare(&[$($name),+], vec![$($cmd),+])
    };
}

use crate::{
    types::{FunctionTable, Signature, TypeId, TypeRegistry, DYNAMIC, INT, STRING},
    Environment,
};

/// The record types the pass tests run against.
pub(crate) struct Schema {
    pub(crate) types: TypeRegistry,
    /// `{ Some []string }`
    pub(crate) type1: TypeId,
    /// `{ Some string }`
    pub(crate) type2: TypeId,
    /// `{ Some type2 }`
    pub(crate) type3: TypeId,
    /// `{ Some interface{} }` with `Method() interface{}`
    /// and `MethodArgs(string) string`
    pub(crate) type4: TypeId,
    /// `{ Some *type3 }`
    pub(crate) type5: TypeId,
    /// `{ Some []type1; SomeSlicePtr []*type1 }`
    pub(crate) type6: TypeId,
    /// `{ Some []*type7 }`
    pub(crate) type7: TypeId,
}

impl Schema {
    pub(crate) fn new() -> Self {
        let mut types = TypeRegistry::new();

        let strings = types.sequence_of(STRING);
        let type1 = types.add_record("type1");
        record(&mut types, type1).add_field("Some", strings);

        let type2 = types.add_record("type2");
        record(&mut types, type2).add_field("Some", STRING);

        let type3 = types.add_record("type3");
        record(&mut types, type3).add_field("Some", type2);

        let type4 = types.add_record("type4");
        record(&mut types, type4)
            .add_field("Some", DYNAMIC)
            .add_method("Method", Signature::new(Vec::new(), vec![DYNAMIC]))
            .add_method("MethodArgs", Signature::new(vec![STRING], vec![STRING]));

        let type3_ptr = types.pointer_to(type3);
        let type5 = types.add_record("type5");
        record(&mut types, type5).add_field("Some", type3_ptr);

        let type1_seq = types.sequence_of(type1);
        let type1_ptr = types.pointer_to(type1);
        let type1_ptr_seq = types.sequence_of(type1_ptr);
        let type6 = types.add_record("type6");
        record(&mut types, type6)
            .add_field("Some", type1_seq)
            .add_field("SomeSlicePtr", type1_ptr_seq);

        let type7 = types.add_record("type7");
        let type7_ptr = types.pointer_to(type7);
        let type7_ptr_seq = types.sequence_of(type7_ptr);
        record(&mut types, type7).add_field("Some", type7_ptr_seq);

        Self {
            types,
            type1,
            type2,
            type3,
            type4,
            type5,
            type6,
            type7,
        }
    }

    /// An environment with `root` as the data type and [`functions`].
    pub(crate) fn environment(self, root: TypeId) -> Environment {
        let mut types = self.types;
        let functions = functions(&mut types);
        Environment::new(types, functions, root)
    }
}

fn record(types: &mut TypeRegistry, id: TypeId) -> &mut crate::types::Record {
    types
        .record_mut(id)
        .expect("fixture ids always point at records")
}

/// The builtins plus the helpers the tests call.
pub(crate) fn functions(types: &mut TypeRegistry) -> FunctionTable {
    let strings = types.sequence_of(STRING);
    let mut res = FunctionTable::with_builtins();

    res.insert("split", Signature::new(vec![STRING, STRING], vec![strings]));
    res.insert("join", Signature::new(vec![STRING, strings], vec![STRING]));
    res.insert("up", Signature::new(vec![STRING], vec![STRING]));
    res.insert("lower", Signature::new(vec![STRING], vec![STRING]));
    res.insert("incr", Signature::new(vec![INT], vec![INT]));
    res.insert("mul", Signature::new(vec![INT, INT], vec![INT]));
    res.insert("intf", Signature::new(Vec::new(), vec![DYNAMIC]));
    res
}

/// `environment(|s| s.type1)`
pub(crate) fn environment(root: impl FnOnce(&Schema) -> TypeId) -> Environment {
    let schema = Schema::new();
    let root = root(&schema);
    schema.environment(root)
}
