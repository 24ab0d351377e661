//! Help text for the generated program and for each function.
use serde::Serialize;

use crate::types::Flag;

const MIN_LABEL_WIDTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpFlag {
    pub name: String,
    /// Only set when it differs from `name`.
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub type_text: String,
    pub required: bool,
}

impl From<&Flag> for HelpFlag {
    fn from(flag: &Flag) -> Self {
        Self {
            name: flag.name.clone(),
            short_name: flag.distinct_short_name().map(str::to_string),
            type_text: flag.ty.to_string(),
            required: flag.is_required(),
        }
    }
}

impl HelpFlag {
    fn label(&self) -> String {
        match &self.short_name {
            Some(short) => format!("{} (-{short})", self.name),
            None => self.name.clone(),
        }
    }
}

/// Everything a function's help page is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpInput {
    pub function: String,
    pub flags: Vec<HelpFlag>,
}

impl HelpInput {
    pub fn new(function: &str, flags: &[Flag]) -> Self {
        Self { function: function.to_string(), flags: flags.iter().map(HelpFlag::from).collect() }
    }

    pub fn required(&self) -> impl Iterator<Item = &HelpFlag> {
        self.flags.iter().filter(|flag| flag.required)
    }
}

pub fn catalog_help<'a, I>(program: &str, functions: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::from("The following functions are available:\n");
    let mut example = None;
    for name in functions {
        example.get_or_insert(name);
        out.push('\t');
        out.push_str(name);
        out.push('\n');
    }
    out.push_str("To run a function pass its name as the first argument:\n");
    out.push_str(&format!("e.g. {program} {}\n", example.unwrap_or("MyFunc")));
    out
}

pub fn function_help(input: &HelpInput) -> String {
    let width = input
        .flags
        .iter()
        .map(|flag| flag.label().chars().count() + 2)
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH);
    let row = |flag: &HelpFlag| format!("\t\t--{:<width$}{}\n", flag.label(), flag.type_text);

    let mut out = format!("Function {}\n", input.function);
    out.push_str("\tRequired options:\n");
    input.required().for_each(|flag| out.push_str(&row(flag)));
    out.push_str("\tAvailable options:\n");
    input.flags.iter().for_each(|flag| out.push_str(&row(flag)));
    out
}
