//! Groups a flat argument vector into per-flag value runs.
use std::hash::BuildHasher;

use indexmap::{IndexMap, IndexSet};

use crate::error::{ArgCountReason, InternalError, TokenizeError};
use crate::types::Flag;

/// The end-of-options marker; reserved and rejected.
pub const TERMINATOR: &str = "--";

// ————————————————————————————————————————————————————————————————————————————
// KNOWN FLAG NAMES
// ————————————————————————————————————————————————————————————————————————————

/// The set of flag names a function accepts.
pub trait KnownFlags {
    fn is_known(&self, name: &str) -> bool;
    fn is_empty(&self) -> bool;
}

impl<S: BuildHasher> KnownFlags for IndexSet<String, S> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
    fn is_empty(&self) -> bool {
        IndexSet::is_empty(self)
    }
}

/// Every spelling of a function's flags (full names and short names),
/// resolved to the parameter's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagLookup {
    names: IndexMap<String, usize>,
}

impl FlagLookup {
    pub fn new(flags: &[Flag]) -> Self {
        let mut names = IndexMap::new();
        for (index, flag) in flags.iter().enumerate() {
            names.insert(flag.name.clone(), index);
        }
        // full names always win over another parameter's short name
        for (index, flag) in flags.iter().enumerate() {
            if let Some(short) = &flag.short_name {
                names.entry(short.clone()).or_insert(index);
            }
        }
        Self { names }
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}

impl KnownFlags for FlagLookup {
    fn is_known(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }
    fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TOKEN GROUPS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGroup {
    /// The flag as typed, dashes included.
    pub flag_token: String,
    /// Index of `flag_token` in the argument vector.
    pub position: usize,
    pub values: Vec<String>,
}

/// Split `args` into one group per flag, keyed by the bare flag name.
///
/// A repeated flag replaces its earlier group and moves to the end, so the
/// map is always in argument order.
pub fn tokenize<S, K>(args: &[S], known: &K) -> Result<IndexMap<String, TokenGroup>, TokenizeError>
where
    S: AsRef<str>,
    K: KnownFlags + ?Sized,
{
    if known.is_empty() {
        return Err(InternalError::new("function flags map cannot be empty").into());
    }
    let mut groups = IndexMap::<String, TokenGroup>::new();
    let mut cursor = 0;
    while cursor < args.len() {
        let flag_token = args[cursor].as_ref();
        let position = cursor;
        cursor += 1;

        let name = extract_flag(flag_token)?;
        if name == TERMINATOR {
            return Err(TokenizeError::Terminator);
        }
        if !known.is_known(name) {
            return Err(TokenizeError::UnexpectedFlag(flag_token.to_string()));
        }

        let values = read_values(&args[cursor..], known);
        cursor += values.len();
        groups.shift_remove(name);
        groups.insert(
            name.to_string(),
            TokenGroup { flag_token: flag_token.to_string(), position, values },
        );
    }
    Ok(groups)
}

/// Bare flag name of a token that must be a flag.
pub fn extract_flag(token: &str) -> Result<&str, TokenizeError> {
    if token.is_empty() {
        return Err(InternalError::new("expected a flag, got an empty string").into());
    }
    if !token.starts_with('-') {
        return Err(TokenizeError::NotAFlag(token.to_string()));
    }
    match strip_dashes(token) {
        "" => Err(TokenizeError::EmptyFlag(token.to_string())),
        name => Ok(name),
    }
}

/// `-` → empty, `--` → `--`, `--name` → `name`, `-name` → `name`.
pub fn strip_dashes(token: &str) -> &str {
    if token == TERMINATOR {
        return TERMINATOR;
    }
    if token.len() > 2 && token.starts_with("--") {
        return &token[2..];
    }
    token.strip_prefix('-').unwrap_or(token)
}

/// Values for the flag just read: everything up to the next token that is a
/// known flag or the terminator.
fn read_values<S, K>(rest: &[S], known: &K) -> Vec<String>
where
    S: AsRef<str>,
    K: KnownFlags + ?Sized,
{
    rest.iter()
        .map(AsRef::as_ref)
        .take_while(|token| !ends_run(token, known))
        .map(|token| unquote(token).into_owned())
        .collect()
}

fn ends_run<K: KnownFlags + ?Sized>(token: &str, known: &K) -> bool {
    if !token.starts_with('-') {
        return false;
    }
    let name = strip_dashes(token);
    name == TERMINATOR || known.is_known(name)
}

/// `"x"` → `x`; `\"x\"` → `"x"`; everything else unchanged.
pub fn unquote(arg: &str) -> std::borrow::Cow<'_, str> {
    use std::borrow::Cow;
    if arg.len() < 2 {
        return Cow::Borrowed(arg);
    }
    if arg.starts_with('"') && arg.ends_with('"') {
        return Cow::Borrowed(&arg[1..arg.len() - 1]);
    }
    if arg.len() >= 4 && arg.starts_with("\\\"") && arg.ends_with("\\\"") {
        return Cow::Owned(format!("{}\"", &arg[1..arg.len() - 2]));
    }
    Cow::Borrowed(arg)
}

// ————————————————————————————————————————————————————————————————————————————
// VALUE RUN READERS
// ————————————————————————————————————————————————————————————————————————————

/// The one value of a single-valued flag.
pub fn single_value(group: &TokenGroup) -> Result<&str, TokenizeError> {
    match group.values.as_slice() {
        [value] => Ok(value),
        [] => Err(TokenizeError::ArgumentCount {
            flag: group.flag_token.clone(),
            reason: ArgCountReason::Missing,
        }),
        values => Err(TokenizeError::ArgumentCount {
            flag: group.flag_token.clone(),
            reason: ArgCountReason::TooMany(values.to_vec()),
        }),
    }
}

/// Like [`single_value`], but a bare switch means `true`.
pub fn bool_value(group: &TokenGroup) -> Result<&str, TokenizeError> {
    if group.values.is_empty() {
        return Ok("true");
    }
    single_value(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn runs(args: &[&str], names: &[&str]) -> Vec<(String, String, Vec<String>)> {
        tokenize(args, &known(names))
            .unwrap()
            .into_iter()
            .map(|(name, group)| (name, group.flag_token, group.values))
            .collect()
    }

    fn run(name: &str, token: &str, values: &[&str]) -> (String, String, Vec<String>) {
        (name.into(), token.into(), values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn groups_values_under_each_flag() {
        assert_eq!(
            runs(&["-a", "aArg1", "aArg2", "-b", "bArg1"], &["a", "b"]),
            vec![run("a", "-a", &["aArg1", "aArg2"]), run("b", "-b", &["bArg1"])]
        );
    }

    #[test]
    fn quoting_and_empty_runs() {
        let args = ["-a", "aArg1", "aArg2", "-b", "bArg1", "--c", "\"-a\"", "\\\"-b\\\"", "-d", "\"\"", "-e"];
        assert_eq!(
            runs(&args, &["a", "b", "c", "d", "e"]),
            vec![
                run("a", "-a", &["aArg1", "aArg2"]),
                run("b", "-b", &["bArg1"]),
                run("c", "--c", &["-a", "\"-b\""]),
                run("d", "-d", &[""]),
                run("e", "-e", &[]),
            ]
        );
    }

    #[test]
    fn unknown_dash_tokens_and_bare_dashes_are_values() {
        assert_eq!(runs(&["-a", "aArg1", "-b", "-b"], &["a"]), vec![run("a", "-a", &["aArg1", "-b", "-b"])]);
        assert_eq!(runs(&["-a", "aArg", "-"], &["a"]), vec![run("a", "-a", &["aArg", "-"])]);
        assert_eq!(runs(&["-a", "aArg", "---"], &["a"]), vec![run("a", "-a", &["aArg", "---"])]);
    }

    #[test]
    fn later_groups_replace_earlier_ones() {
        assert_eq!(runs(&["-a", "x", "-a", "y"], &["a"]), vec![run("a", "-a", &["y"])]);

        let args = [
            "--a", "aArg1", "-b", "bArg1", "--b", "bArg2", "-a", "aArg3", "--b", "bArg3", "-c", "cArg1", "-c",
            "cArg2", "-d", "dArg1", "--d",
        ];
        assert_eq!(
            runs(&args, &["a", "b", "c", "d"]),
            vec![
                run("a", "-a", &["aArg3"]),
                run("b", "--b", &["bArg3"]),
                run("c", "-c", &["cArg2"]),
                run("d", "--d", &[]),
            ]
        );
        let groups = tokenize(&args, &known(&["a", "b", "c", "d"])).unwrap();
        assert_eq!(groups["a"].position, 6);
        assert_eq!(groups["d"].position, 16);
    }

    #[test]
    fn empty_argument_vector() {
        assert!(tokenize::<&str, _>(&[], &known(&["a", "b", "c"])).unwrap().is_empty());
    }

    #[test]
    fn tokenizer_errors() {
        let err = |args: &[&str], names: &[&str]| tokenize(args, &known(names)).unwrap_err().to_string();
        assert_eq!(
            err(&["-a", "aArg", "-b", "bArg"], &[]),
            "internal error: function flags map cannot be empty"
        );
        assert_eq!(
            err(&["-a", "aArg", "--"], &["a"]),
            "\"--\" found, but ending command options and passing positional arguments is NYI"
        );
        assert_eq!(
            err(&["----"], &["a"]),
            "\"--\" found, but ending command options and passing positional arguments is NYI"
        );
        assert_eq!(err(&["-z"], &["a"]), "an unexpected flag \"-z\" found");
        assert_eq!(
            err(&["value", "-a"], &["a"]),
            "an error occurred during the flag \"value\" extraction: expected a flag (e.g. --flag), got an argument \"value\""
        );
        assert_eq!(
            err(&["-"], &["a"]),
            "an error occurred during the flag \"-\" extraction: passed flag \"-\" is treated as empty and empty flags are not allowed"
        );
        assert!(matches!(
            tokenize(&[""], &known(&["a"])),
            Err(TokenizeError::Internal(_))
        ));
    }

    #[test]
    fn dash_stripping() {
        assert_eq!(strip_dashes("-"), "");
        assert_eq!(strip_dashes("--"), "--");
        assert_eq!(strip_dashes("-a"), "a");
        assert_eq!(strip_dashes("--a"), "a");
        assert_eq!(strip_dashes("---a"), "-a");
        assert_eq!(strip_dashes("----"), "--");
    }

    #[test]
    fn unquoting() {
        let cases = [
            ("arg", "arg"),
            ("-arg", "-arg"),
            ("\"-arg\"", "-arg"),
            ("\"\"", ""),
            ("", ""),
            ("\\\"-arg\\\"", "\"-arg\""),
            ("\"", "\""),
            ("\\\"\\\"", "\"\""),
            ("\\\"\"\"\\\"", "\"\"\"\""),
        ];
        for (input, expected) in cases {
            assert_eq!(unquote(input), expected, "input: {input}");
        }
    }

    #[test]
    fn value_readers() {
        let group = |values: &[&str]| TokenGroup {
            flag_token: "--n".into(),
            position: 0,
            values: values.iter().map(|v| v.to_string()).collect(),
        };
        assert_eq!(bool_value(&group(&[])), Ok("true"));
        assert_eq!(bool_value(&group(&["f"])), Ok("f"));
        assert_eq!(single_value(&group(&["7"])), Ok("7"));
        assert_eq!(
            single_value(&group(&[])).unwrap_err().to_string(),
            "could not get the argument passed to the flag \"--n\": no arguments passed"
        );
        assert_eq!(
            bool_value(&group(&["t", "f"])).unwrap_err().to_string(),
            "could not get the argument passed to the flag \"--n\": expected a single argument, got 2 ([t f])"
        );
    }

    #[test]
    fn lookup_resolves_short_and_full_names() {
        use crate::types::ParameterType;
        let flag = |name: &str, short: Option<&str>| Flag {
            name: name.into(),
            short_name: short.map(str::to_string),
            ty: ParameterType::parse("int").unwrap(),
        };
        let lookup = FlagLookup::new(&[flag("n", None), flag("n8", Some("n8")), flag("n16", Some("n1"))]);
        assert_eq!(lookup.resolve("n"), Some(0));
        assert_eq!(lookup.resolve("n8"), Some(1));
        assert_eq!(lookup.resolve("n1"), Some(2));
        assert_eq!(lookup.resolve("n16"), Some(2));
        assert_eq!(lookup.resolve("n3"), None);
        assert_eq!(lookup.names().collect::<Vec<_>>(), vec!["n", "n8", "n16", "n1"]);

        let groups = tokenize(&["--n1", "3", "-n", "1"], &lookup).unwrap();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["n1", "n"]);
    }
}
