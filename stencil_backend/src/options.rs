//! Settings for the pipeline. These affect which rewrites run,
//! not the meaning of the template.

use std::convert::TryFrom;
use thiserror::Error;

/// The runtime function used to resolve paths through dynamic values.
pub const DEFAULT_LOOKUP_FUNCTION: &str = "browsePropertyPath";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("unknown pipeline flag `{0}`")]
    UnknownFlag(String),

    #[error("flag `{0}` needs a value")]
    MissingValue(String),
}

/// Controls the optional parts of the pipeline. The [`Default`]
/// implementation enables everything.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOptions {
    /// Rename user variables to `$tplName` before simplifying.
    pub rename_variables: bool,
    /// Rewrite paths through dynamic values into lookup calls.
    pub unhole: bool,
    pub lookup_function: String,
}

impl PipelineOptions {
    pub fn new(rename_variables: bool, unhole: bool) -> Self {
        Self {
            rename_variables,
            unhole,
            lookup_function: DEFAULT_LOOKUP_FUNCTION.to_owned(),
        }
    }

    pub fn with_lookup_function(mut self, name: impl ToString) -> Self {
        self.lookup_function = name.to_string();
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Goes from a list of flags to a `PipelineOptions` struct.
/// This is useful for command line drivers.
impl TryFrom<Vec<String>> for PipelineOptions {
    type Error = OptionsError;

    fn try_from(flags: Vec<String>) -> Result<Self, Self::Error> {
        let mut res = PipelineOptions::default();

        for flag in flags {
            match flag.as_str() {
                "no-rename" => res.rename_variables = false,
                "no-unhole" => res.unhole = false,

                "lookup" => return Err(OptionsError::MissingValue(flag)),
                _ if flag.starts_with("lookup=") => {
                    let name = &flag["lookup=".len()..];

                    if name.is_empty() {
                        return Err(OptionsError::MissingValue("lookup".to_owned()));
                    }

                    res.lookup_function = name.to_owned();
                },

                _ => return Err(OptionsError::UnknownFlag(flag)),
            }
        }

        Ok(res)
    }
}
