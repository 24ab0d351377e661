//! Binds tokenized argument runs to a function's typed parameters.
use indexmap::IndexMap;
use serde_json::json;

use crate::cast::ConversionTable;
use crate::error::{BindError, CastError, InternalError};
use crate::tokenize::{self, FlagLookup, TokenGroup};
use crate::types::{BaseKind, Flag};
use crate::value::Value;

/// A function name plus one value per parameter, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCall {
    pub function: String,
    pub args: IndexMap<String, Value>,
}

impl BoundCall {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let args = self
            .args
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        json!({ "function": self.function, "args": args })
    }
}

/// Tokenize `args` and bind every group to its parameter.
///
/// Groups are applied in argument order and the first failing flag aborts the
/// call. Required parameters that never showed up are reported together once
/// everything else has bound.
pub fn bind_args<S: AsRef<str>>(
    function: &str,
    flags: &[Flag],
    lookup: &FlagLookup,
    args: &[S],
    table: &ConversionTable,
) -> Result<BoundCall, BindError> {
    let mut call = BoundCall { function: function.to_string(), args: IndexMap::new() };
    if flags.is_empty() {
        return Ok(call);
    }

    let groups = tokenize::tokenize(args, lookup)?;
    let mut chosen: Vec<Option<&TokenGroup>> = vec![None; flags.len()];
    for (name, group) in &groups {
        let index = lookup
            .resolve(name)
            .ok_or_else(|| InternalError::new(format!("flag {name} was tokenized but has no parameter")))?;
        // the same parameter may be spelled by its full and its short name
        if chosen[index].is_none_or(|previous| previous.position < group.position) {
            chosen[index] = Some(group);
        }
    }

    let mut present: Vec<(usize, &TokenGroup)> = chosen
        .iter()
        .enumerate()
        .filter_map(|(index, group)| group.map(|group| (index, group)))
        .collect();
    present.sort_by_key(|(_, group)| group.position);

    let mut bound: Vec<Option<Value>> = vec![None; flags.len()];
    for (index, group) in present {
        bound[index] = Some(bind_flag(&flags[index], group, table)?);
    }

    let missing: Vec<String> = flags
        .iter()
        .zip(&bound)
        .filter(|(flag, value)| value.is_none() && flag.is_required())
        .map(|(flag, _)| flag.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(BindError::MissingRequired(missing));
    }

    for (flag, value) in flags.iter().zip(bound) {
        let value = match value {
            Some(value) => value,
            None => Value::absent(&flag.ty).ok_or_else(|| {
                InternalError::new(format!("optional flag {} has no zero value", flag.name))
            })?,
        };
        call.args.insert(flag.name.clone(), value);
    }
    Ok(call)
}

/// Cast one flag's values according to its parameter type.
pub fn bind_flag(flag: &Flag, group: &TokenGroup, table: &ConversionTable) -> Result<Value, BindError> {
    let ty = &flag.ty;
    let cast = table.routine(ty.base)?;
    let element = |raw: &str| -> Result<Value, CastError> {
        Ok(Value::Scalar(cast(raw)?).wrap(ty.base_indirection))
    };

    let Some(layer) = ty.array else {
        let raw = match ty.base {
            BaseKind::Bool => tokenize::bool_value(group)?,
            _ => tokenize::single_value(group)?,
        };
        return Ok(element(raw)?);
    };

    let collection = match layer.length {
        None => Value::List(group.values.iter().map(|raw| element(raw)).collect::<Result<Vec<_>, _>>()?),
        Some(length) => {
            // arrays of values need every slot; arrays of pointers may leave a nil tail
            let fits = match ty.base_indirection {
                0 => group.values.len() == length,
                _ => group.values.len() <= length,
            };
            if !fits {
                return Err(BindError::ArrayLength {
                    flag: group.flag_token.clone(),
                    expected: length,
                    actual: group.values.clone(),
                });
            }
            let mut slots = group.values.iter().map(|raw| element(raw)).collect::<Result<Vec<_>, _>>()?;
            slots.resize(length, Value::Nil);
            Value::Array(slots)
        }
    };
    Ok(collection.wrap(layer.indirection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::NameTrie;
    use crate::types::ParameterType;
    use crate::value::Scalar;

    fn flags(params: &[(&str, &str)]) -> Vec<Flag> {
        if params.is_empty() {
            return Vec::new();
        }
        let names: Vec<&str> = params.iter().map(|(name, _)| *name).collect();
        let shorts = NameTrie::build(names.iter().copied()).unwrap().abbreviate(&names).unwrap();
        params
            .iter()
            .map(|(name, ty)| Flag {
                name: name.to_string(),
                short_name: shorts[*name].clone(),
                ty: ParameterType::parse(ty).unwrap(),
            })
            .collect()
    }

    fn bind(params: &[(&str, &str)], args: &[&str]) -> Result<BoundCall, BindError> {
        let flags = flags(params);
        let lookup = FlagLookup::new(&flags);
        bind_args("f", &flags, &lookup, args, &ConversionTable::complete())
    }

    fn s(scalar: Scalar) -> Value {
        Value::Scalar(scalar)
    }

    #[test]
    fn scalars_pointers_and_switches() {
        let call = bind(
            &[("count", "int32"), ("ratio", "**float64"), ("verbose", "bool"), ("name", "*string")],
            &["--count", "7", "-ratio", "0.5", "-verbose"],
        )
        .unwrap();
        assert_eq!(call.get("count"), Some(&s(Scalar::I32(7))));
        assert_eq!(call.get("ratio"), Some(&s(Scalar::F64(0.5)).wrap(2)));
        assert_eq!(call.get("verbose"), Some(&s(Scalar::Bool(true))));
        assert_eq!(call.get("name"), Some(&Value::Nil));
        assert_eq!(call.args.keys().collect::<Vec<_>>(), vec!["count", "ratio", "verbose", "name"]);
    }

    #[test]
    fn absent_switch_is_false_and_explicit_value_is_cast() {
        let call = bind(&[("dry", "bool"), ("n", "int")], &["-n", "1"]).unwrap();
        assert_eq!(call.get("dry"), Some(&s(Scalar::Bool(false))));
        let call = bind(&[("dry", "bool"), ("n", "int")], &["-n", "1", "-dry", "F"]).unwrap();
        assert_eq!(call.get("dry"), Some(&s(Scalar::Bool(false))));
        assert_eq!(
            bind(&[("dry", "bool")], &["-dry", "yes"]).unwrap_err().to_string(),
            "cast failed: expected zero or one argument that must be any of [true, t, false, f] (case insensitive), got: yes"
        );
    }

    #[test]
    fn lists_and_pointer_to_lists() {
        let call = bind(&[("xs", "[]uint8"), ("ys", "*[]*rune")], &["-xs", "1", "2", "3", "-ys", "a", "b"]).unwrap();
        assert_eq!(
            call.get("xs"),
            Some(&Value::List(vec![s(Scalar::U8(1)), s(Scalar::U8(2)), s(Scalar::U8(3))]))
        );
        assert_eq!(
            call.get("ys"),
            Some(&Value::List(vec![s(Scalar::Rune('a')).wrap(1), s(Scalar::Rune('b')).wrap(1)]).wrap(1))
        );
        // an empty run is an empty list
        let call = bind(&[("xs", "[]int")], &["-xs"]).unwrap();
        assert_eq!(call.get("xs"), Some(&Value::List(vec![])));
    }

    #[test]
    fn bounded_arrays_of_values_need_every_slot() {
        let call = bind(&[("nums", "[3]int16")], &["-nums", "1", "2", "3"]).unwrap();
        assert_eq!(
            call.get("nums"),
            Some(&Value::Array(vec![s(Scalar::I16(1)), s(Scalar::I16(2)), s(Scalar::I16(3))]))
        );
        assert_eq!(
            bind(&[("nums", "[3]int16")], &["-nums", "1", "2"]).unwrap_err(),
            BindError::ArrayLength { flag: "-nums".into(), expected: 3, actual: vec!["1".into(), "2".into()] }
        );
        assert_eq!(
            bind(&[("nums", "[3]int16")], &["-nums", "1", "2", "3", "4"]).unwrap_err().to_string(),
            "flag -nums: expected 3 arguments, but got 4 ([1 2 3 4])"
        );
    }

    #[test]
    fn bounded_arrays_of_pointers_pad_with_nil() {
        let call = bind(&[("nums", "*[3]*int")], &["--nums", "1"]).unwrap();
        assert_eq!(
            call.get("nums"),
            Some(&Value::Array(vec![s(Scalar::Int(1)).wrap(1), Value::Nil, Value::Nil]).wrap(1))
        );
        assert!(matches!(
            bind(&[("nums", "[2]*int")], &["-nums", "1", "2", "3"]),
            Err(BindError::ArrayLength { expected: 2, .. })
        ));
    }

    #[test]
    fn missing_required_flags_are_reported_together() {
        let err = bind(&[("a", "int"), ("opt", "*int"), ("b", "string"), ("c", "[]int")], &["-c", "1"]).unwrap_err();
        assert_eq!(err, BindError::MissingRequired(vec!["a".into(), "b".into()]));
        assert_eq!(err.to_string(), "required flags were not passed: \"-a\", \"-b\"");
    }

    #[test]
    fn cast_errors_fail_fast_in_argument_order() {
        let err = bind(&[("a", "int8"), ("b", "uint8")], &["-b", "-1", "-a", "1000"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cast failed: failed to cast -1 to uint8: parsing \"-1\": invalid syntax"
        );
    }

    #[test]
    fn single_valued_flags_reject_runs() {
        assert_eq!(
            bind(&[("n8", "int8")], &["-n8", "8", "9"]).unwrap_err().to_string(),
            "could not get the argument passed to the flag \"-n8\": expected a single argument, got 2 ([8 9])"
        );
        assert_eq!(
            bind(&[("n8", "int8")], &["-n8"]).unwrap_err().to_string(),
            "could not get the argument passed to the flag \"-n8\": no arguments passed"
        );
    }

    #[test]
    fn short_and_full_spellings_resolve_to_the_latest() {
        let params = [("n", "int8"), ("n8", "int8"), ("n16", "int16")];
        let call = bind(&params, &["-n", "1", "-n8", "8", "--n1", "16", "-n16", "17"]).unwrap();
        assert_eq!(call.get("n"), Some(&s(Scalar::I8(1))));
        assert_eq!(call.get("n8"), Some(&s(Scalar::I8(8))));
        assert_eq!(call.get("n16"), Some(&s(Scalar::I16(17))));

        let call = bind(&params, &["-n16", "17", "-n", "1", "-n8", "8", "-n1", "16"]).unwrap();
        assert_eq!(call.get("n16"), Some(&s(Scalar::I16(16))));
    }

    #[test]
    fn functions_without_parameters_ignore_arguments() {
        let call = bind(&[], &["--anything", "goes"]).unwrap();
        assert!(call.args.is_empty());
        assert_eq!(call.to_json(), json!({ "function": "f", "args": {} }));
    }

    #[test]
    fn complex_and_failure_values() {
        let call = bind(
            &[("c", "complex64"), ("e", "*error")],
            &["-c", "(1.5, -2i)", "-e", "\"disk full\""],
        )
        .unwrap();
        assert_eq!(call.get("c"), Some(&s(Scalar::Complex64 { re: 1.5, im: -2.0 })));
        assert_eq!(call.get("e"), Some(&s(Scalar::Failure("disk full".into())).wrap(1)));
        assert_eq!(
            call.to_json(),
            json!({ "function": "f", "args": { "c": { "re": 1.5, "im": -2.0 }, "e": { "error": "disk full" } } })
        );
    }

    #[test]
    fn missing_routine_is_an_internal_error() {
        let flags = flags(&[("n", "int")]);
        let lookup = FlagLookup::new(&flags);
        let err = bind_args("f", &flags, &lookup, &["-n", "1"], &ConversionTable::default()).unwrap_err();
        assert!(matches!(err, BindError::Internal(_)));
    }
}
