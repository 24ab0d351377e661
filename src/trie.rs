//! Shortest-unique-prefix abbreviation of a function's parameter names.
//!
//! Every name is inserted into a character trie. Walking a name from the
//! root, the last node that either branches or terminates a shorter name is
//! the point after which the name can no longer be confused with a sibling.
//! A name that is itself a strict prefix of another name never gets an
//! abbreviation.
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::{AbbreviationError, InternalError};

#[derive(Debug, Default)]
struct Node {
    terminal: bool,
    children: BTreeMap<char, usize>,
}

/// Arena-backed trie; nodes refer to their children by index.
#[derive(Debug)]
pub struct NameTrie {
    nodes: Vec<Node>,
}

impl NameTrie {
    const ROOT: usize = 0;

    pub fn build<'a, I>(names: I) -> Result<Self, AbbreviationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut trie = Self { nodes: vec![Node::default()] };
        let mut inserted = 0usize;
        for name in names {
            trie.insert(name)?;
            inserted += 1;
        }
        if inserted == 0 {
            return Err(AbbreviationError::NoNames);
        }
        Ok(trie)
    }

    fn insert(&mut self, name: &str) -> Result<(), AbbreviationError> {
        if name.is_empty() {
            return Err(AbbreviationError::EmptyName);
        }
        let mut node = Self::ROOT;
        for ch in name.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(ch, next);
                    next
                }
            };
        }
        if self.nodes[node].terminal {
            return Err(AbbreviationError::Duplicate(name.to_string()));
        }
        self.nodes[node].terminal = true;
        Ok(())
    }

    /// Shortest prefix of `name` that no sibling shares, or `None` when the
    /// full name must be typed.
    pub fn short_name(&self, name: &str) -> Result<Option<String>, InternalError> {
        let not_found = || InternalError::new(format!("name {name} not found in the trie"));
        let chars: Vec<char> = name.chars().collect();
        let mut node = Self::ROOT;
        let mut last_split = 0usize;
        for (idx, ch) in chars.iter().enumerate() {
            let current = &self.nodes[node];
            if current.terminal {
                last_split = idx + 1;
            }
            if current.children.len() > 1 {
                last_split = idx;
            }
            node = *current.children.get(ch).ok_or_else(not_found)?;
        }
        let end = &self.nodes[node];
        if !end.terminal {
            return Err(not_found());
        }
        if !end.children.is_empty() || last_split >= chars.len() {
            return Ok(None);
        }
        Ok(Some(chars[..=last_split].iter().collect()))
    }

    /// Short names for `names`, keyed and ordered like the input. Every name
    /// must have been inserted when the trie was built.
    pub fn abbreviate<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<IndexMap<String, Option<String>>, InternalError> {
        let mut out = IndexMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            out.insert(name.to_string(), self.short_name(name)?);
        }
        Ok(out)
    }
}
