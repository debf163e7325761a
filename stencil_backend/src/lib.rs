#![allow(clippy::comparison_chain)]
#![warn(unused_imports)]
#![warn(unused_must_use)]

#[cfg(test)]
#[macro_use]
mod fixtures;

pub mod analysis;
pub mod errors;
pub mod options;
pub mod simplify;
pub mod tree;
pub mod typecheck;
pub mod types;
pub mod unhole;
pub mod unshadow;


use anyhow::Context;
use stencil_log::info;

pub use errors::{Span, TransformError};
pub use options::{OptionsError, PipelineOptions};
pub use simplify::simplify;
pub use tree::Template;
pub use typecheck::{typecheck, ScopeFrame, ScopeStack};
pub use types::{FunctionTable, TypeId, TypeRegistry};
pub use unhole::unhole;
pub use unshadow::unshadow;

/// Everything the passes need to know about the outside world.
#[derive(Clone, Debug)]
pub struct Environment {
    pub types: TypeRegistry,
    pub functions: FunctionTable,
    /// The type of the data the template is executed with.
    pub root: TypeId,
}

impl Environment {
    pub fn new(types: TypeRegistry, functions: FunctionTable, root: TypeId) -> Self {
        Self {
            types,
            functions,
            root,
        }
    }

    /// No schema at all: the data is dynamic and only builtins are known.
    pub fn untyped() -> Self {
        Self::new(
            TypeRegistry::new(),
            FunctionTable::with_builtins(),
            types::DYNAMIC,
        )
    }
}

/// Runs every pass over `template` in order: unshadow, simplify,
/// type check, unhole. Returns the scopes type checking recorded,
/// rewound so the caller can replay them over the transformed tree.
pub fn transform(
    template: &mut Template,
    env: &Environment,
    options: &PipelineOptions,
) -> Result<ScopeStack, TransformError> {
    unshadow(template)?;
    simplify(template, options)?;
    let mut scopes = typecheck(template, env, options)?;

    if options.unhole {
        unhole(template, &mut scopes, env, options)?;
    }

    info!(
        "transformed `{}` ({} scopes)",
        template.name,
        scopes.frames().len()
    );

    Ok(scopes)
}

/// Transforms a whole template set (a main tree and the trees it
/// defines). Each tree is independent; the first failure stops the run.
pub fn transform_all(
    templates: &mut [Template],
    env: &Environment,
    options: &PipelineOptions,
) -> anyhow::Result<Vec<ScopeStack>> {
    templates
        .iter_mut()
        .map(|template| {
            let name = template.name.clone();
            transform(template, env, options)
                .with_context(|| format!("couldn't transform template `{}`", name))
        })
        .collect()
}
