//! The generation pass: catalog in, runnable per-function parsers out.
//!
//! Each function is analysed on its own (type derivation, then flag
//! abbreviation), optionally in parallel. The shared tables (conversion
//! routines and indirection helpers) are then filled by a sequential merge in
//! catalog order, so the result does not depend on scheduling.
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;

use crate::bind::{self, BoundCall};
use crate::cast::{CastSynthesizer, ConversionTable};
use crate::catalog::{Catalog, FunctionSignature};
use crate::error::{BindError, GenerateError, InternalError};
use crate::help::HelpInput;
use crate::tokenize::FlagLookup;
use crate::trie::NameTrie;
use crate::types::{BaseKind, Flag, ParameterType};

/// Reserved for the catalog-level help page.
pub const HELP_COMMAND: &str = "help";

#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Analyse functions on the rayon pool.
    pub parallel: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT
// ————————————————————————————————————————————————————————————————————————————

/// Pointer-wrapping helpers the generated parsers rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndirectionHelper {
    /// `depth` pointers around a single value.
    Value { base: BaseKind, depth: u32 },
    /// `depth` pointers around a whole array or list.
    Collection { shape: String, element: String, depth: u32 },
}

/// Parsing support shared by every generated function; emitted once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportBlock {
    pub tokenizer: bool,
    pub required_check: bool,
    pub complex_parser: bool,
    pub indirection_helpers: IndexSet<IndirectionHelper>,
}

impl SupportBlock {
    /// Only functions with parameters pull in any support code.
    pub fn is_needed(&self) -> bool {
        self.tokenizer
    }

    fn register(&mut self, flags: &[Flag]) {
        if flags.is_empty() {
            return;
        }
        self.tokenizer = true;
        for flag in flags {
            let ty = &flag.ty;
            if flag.is_required() {
                self.required_check = true;
            }
            if ty.base_indirection > 0 {
                self.indirection_helpers
                    .insert(IndirectionHelper::Value { base: ty.base, depth: ty.base_indirection });
            }
            if let Some(layer) = ty.array.filter(|layer| layer.indirection > 0) {
                self.indirection_helpers.insert(IndirectionHelper::Collection {
                    shape: layer.shape(),
                    element: ty.element_text(),
                    depth: layer.indirection,
                });
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedFunction {
    pub name: String,
    /// The flag-holder record, in declaration order.
    pub flags: Vec<Flag>,
    pub lookup: FlagLookup,
}

impl GeneratedFunction {
    fn new(name: &str, flags: Vec<Flag>) -> Self {
        let lookup = FlagLookup::new(&flags);
        Self { name: name.to_string(), flags, lookup }
    }

    pub fn required(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter().filter(|flag| flag.is_required())
    }

    pub fn help_input(&self) -> HelpInput {
        HelpInput::new(&self.name, &self.flags)
    }

    /// Parse this function's arguments (everything after its name).
    pub fn parse<S: AsRef<str>>(&self, args: &[S], table: &ConversionTable) -> Result<BoundCall, BindError> {
        bind::bind_args(&self.name, &self.flags, &self.lookup, args, table)
    }
}

#[derive(Debug, Clone)]
pub struct SkippedFunction {
    pub name: String,
    pub reason: GenerateError,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub functions: IndexMap<String, GeneratedFunction>,
    pub conversions: ConversionTable,
    pub support: SupportBlock,
    pub skipped: Vec<SkippedFunction>,
}

impl Generated {
    pub fn function(&self, name: &str) -> Option<&GeneratedFunction> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Machine-readable summary of the pass.
    pub fn report(&self) -> serde_json::Value {
        let functions = self
            .functions
            .values()
            .map(|function| {
                let flags = function
                    .flags
                    .iter()
                    .map(|flag| {
                        json!({
                            "name": flag.name,
                            "short_name": flag.short_name,
                            "type": flag.ty,
                            "required": flag.is_required(),
                        })
                    })
                    .collect::<Vec<_>>();
                let required = function.required().map(|flag| flag.name.as_str()).collect::<Vec<_>>();
                json!({ "name": function.name, "flags": flags, "required": required })
            })
            .collect::<Vec<_>>();
        let skipped = self
            .skipped
            .iter()
            .map(|skip| json!({ "name": skip.name, "reason": skip.reason.to_string() }))
            .collect::<Vec<_>>();
        let conversions = self.conversions.kinds().collect::<Vec<_>>();
        let support = if self.support.is_needed() { json!(self.support) } else { serde_json::Value::Null };
        json!({
            "functions": functions,
            "conversions": conversions,
            "support": support,
            "skipped": skipped,
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PASS
// ————————————————————————————————————————————————————————————————————————————

/// Outcome of analysing one function on its own.
#[derive(Debug)]
enum Analysis {
    Ready(Vec<Flag>),
    Skip(GenerateError),
}

/// Run the pass. Functions that fail analysis are logged and skipped; an
/// `InternalError` from any function aborts the whole pass.
pub fn generate(catalog: &Catalog, options: &GenerateOptions) -> Result<Generated, InternalError> {
    let analysed: Vec<Analysis> = if options.parallel {
        catalog.functions.par_iter().map(analyse).collect::<Result<_, _>>()?
    } else {
        catalog.functions.iter().map(analyse).collect::<Result<_, _>>()?
    };
    log::debug!("analysed {} functions (parallel: {})", analysed.len(), options.parallel);

    let mut synth = CastSynthesizer::default();
    let mut support = SupportBlock::default();
    let mut functions = IndexMap::<String, GeneratedFunction>::new();
    let mut skipped = Vec::new();

    for (signature, analysis) in catalog.functions.iter().zip(analysed) {
        let name = signature.name.as_str();
        let analysis = if name == HELP_COMMAND {
            Analysis::Skip(GenerateError::ReservedName(name.to_string()))
        } else if functions.contains_key(name) {
            Analysis::Skip(GenerateError::DuplicateFunction(name.to_string()))
        } else {
            analysis
        };
        match analysis {
            Analysis::Ready(flags) => {
                for flag in &flags {
                    synth.require(flag.ty.base);
                }
                support.register(&flags);
                functions.insert(name.to_string(), GeneratedFunction::new(name, flags));
            }
            Analysis::Skip(reason) => {
                log::warn!("skipping function {name}: {reason}");
                skipped.push(SkippedFunction { name: name.to_string(), reason });
            }
        }
    }
    support.complex_parser = synth.needs_complex_parser();

    Ok(Generated { functions, conversions: synth.finish(), support, skipped })
}

/// Derive every parameter's type and the function's short names.
fn analyse(signature: &FunctionSignature) -> Result<Analysis, InternalError> {
    let mut types = Vec::with_capacity(signature.params.len());
    for (index, param) in signature.params.iter().enumerate() {
        match ParameterType::parse(&param.declared) {
            Ok(ty) => types.push(ty),
            Err(source) => {
                let name = param.name.clone();
                return Ok(Analysis::Skip(GenerateError::Parameter { index, name, source }));
            }
        }
    }
    if types.is_empty() {
        return Ok(Analysis::Ready(Vec::new()));
    }

    let names: Vec<&str> = signature.params.iter().map(|param| param.name.as_str()).collect();
    let trie = match NameTrie::build(names.iter().copied()) {
        Ok(trie) => trie,
        Err(err) => return Ok(Analysis::Skip(err.into())),
    };
    let mut short_names = trie.abbreviate(&names)?;
    Ok(Analysis::Ready(
        signature
            .params
            .iter()
            .zip(types)
            .map(|(param, ty)| Flag {
                name: param.name.clone(),
                short_name: short_names.swap_remove(&param.name).flatten(),
                ty,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AbbreviationError, TypeModelError};
    use crate::value::{Scalar, Value};

    fn catalog(functions: Vec<FunctionSignature>) -> Catalog {
        Catalog { functions }
    }

    fn run(parallel: bool) -> Generated {
        generate(&sample(), &GenerateOptions { parallel }).unwrap()
    }

    fn sample() -> Catalog {
        catalog(vec![
            FunctionSignature::new("Ints", &[("n", "int"), ("n8", "*int8"), ("n16", "[]int16")]),
            FunctionSignature::new("Broken", &[("ok", "int"), ("bad", "[][]int")]),
            FunctionSignature::new("Nums", &[("c", "*[2]*complex64"), ("flag", "bool")]),
            FunctionSignature::new("Ping", &[]),
            FunctionSignature::new("Ints", &[("x", "int")]),
            FunctionSignature::new("help", &[]),
            FunctionSignature::new("Dup", &[("a", "int"), ("a", "string")]),
        ])
    }

    #[test]
    fn failing_functions_are_skipped_and_the_rest_survive() {
        let generated = run(false);
        assert_eq!(generated.names().collect::<Vec<_>>(), vec!["Ints", "Nums", "Ping"]);
        let skipped: Vec<_> = generated.skipped.iter().map(|s| (s.name.as_str(), &s.reason)).collect();
        assert_eq!(skipped.len(), 4);
        assert_eq!(skipped[0].0, "Broken");
        assert!(matches!(
            skipped[0].1,
            GenerateError::Parameter { index: 1, source: TypeModelError::UnsupportedShape(_), .. }
        ));
        assert_eq!(skipped[1].1, &GenerateError::DuplicateFunction("Ints".into()));
        assert_eq!(skipped[2].1, &GenerateError::ReservedName("help".into()));
        assert_eq!(
            skipped[3].1,
            &GenerateError::Abbreviation(AbbreviationError::Duplicate("a".into()))
        );
    }

    #[test]
    fn analysis_separates_skips_from_ready_functions() {
        let dup = FunctionSignature::new("Dup", &[("a", "int"), ("a", "string")]);
        assert!(matches!(
            analyse(&dup),
            Ok(Analysis::Skip(GenerateError::Abbreviation(AbbreviationError::Duplicate(_))))
        ));
        let typo = FunctionSignature::new("Typo", &[("n", "int[]")]);
        assert!(matches!(
            analyse(&typo),
            Ok(Analysis::Skip(GenerateError::Parameter { source: TypeModelError::Malformed { .. }, .. }))
        ));
        let Ok(Analysis::Ready(flags)) = analyse(&FunctionSignature::new("Ok", &[("n", "int")])) else {
            panic!("expected a ready function");
        };
        assert_eq!(flags[0].short_name.as_deref(), Some("n"));
    }

    #[test]
    fn short_names_and_required_flags() {
        let generated = run(false);
        let ints = generated.function("Ints").unwrap();
        let shorts: Vec<_> = ints.flags.iter().map(|f| f.short_name.as_deref()).collect();
        assert_eq!(shorts, vec![None, Some("n8"), Some("n1")]);
        let required: Vec<_> = ints.required().map(|f| f.name.as_str()).collect();
        assert_eq!(required, vec!["n", "n16"]);
    }

    #[test]
    fn shared_tables_are_memoized_across_functions() {
        let generated = run(false);
        assert_eq!(
            generated.conversions.kinds().collect::<Vec<_>>(),
            vec![BaseKind::Int, BaseKind::Int8, BaseKind::Int16, BaseKind::Float32, BaseKind::Complex64, BaseKind::Bool]
        );
        let support = &generated.support;
        assert!(support.is_needed() && support.required_check && support.complex_parser);
        assert_eq!(
            support.indirection_helpers.iter().cloned().collect::<Vec<_>>(),
            vec![
                IndirectionHelper::Value { base: BaseKind::Int8, depth: 1 },
                IndirectionHelper::Value { base: BaseKind::Complex64, depth: 1 },
                IndirectionHelper::Collection { shape: "[2]".into(), element: "*complex64".into(), depth: 1 },
            ]
        );
    }

    #[test]
    fn parallel_and_sequential_passes_agree() {
        let sequential = run(false);
        let parallel = run(true);
        assert_eq!(sequential.report(), parallel.report());
    }

    #[test]
    fn parameterless_catalogs_need_no_support() {
        let only_ping = catalog(vec![FunctionSignature::new("Ping", &[])]);
        let generated = generate(&only_ping, &GenerateOptions::default()).unwrap();
        assert!(!generated.support.is_needed());
        assert_eq!(generated.conversions.kinds().count(), 0);
        assert_eq!(generated.report()["support"], json!(null));
    }

    #[test]
    fn generated_parse_routine_binds_with_the_shared_table() {
        let generated = run(true);
        let nums = generated.function("Nums").unwrap();
        let call = nums.parse(&["-c", "i", "-f"], &generated.conversions).unwrap();
        assert_eq!(
            call.get("c"),
            Some(&Value::Array(vec![Value::Scalar(Scalar::Complex64 { re: 0.0, im: 1.0 }).wrap(1), Value::Nil]).wrap(1))
        );
        assert_eq!(call.get("flag"), Some(&Value::Scalar(Scalar::Bool(true))));
    }

    #[test]
    fn report_shape() {
        let generated = run(true);
        let report = generated.report();
        assert_eq!(
            report["functions"][0]["flags"][1],
            json!({ "name": "n8", "short_name": "n8", "type": "*int8", "required": false })
        );
        assert_eq!(report["functions"][0]["required"], json!(["n", "n16"]));
        assert_eq!(report["conversions"][4], json!("complex64"));
        assert_eq!(report["support"]["indirection_helpers"][2]["kind"], json!("collection"));
        assert_eq!(report["skipped"][2], json!({ "name": "help", "reason": "function name \"help\" is reserved" }));
    }
}
