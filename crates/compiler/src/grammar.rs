// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The grammar registry: which statements exist, what arguments each accepts, and which
//! statements may nest inside which.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};

use crate::ast::Expr;
use crate::errors::GrammarError;

/// How many nested statements a call statement takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ChildPolicy {
    None,
    /// Exactly one child; a default container is supplied when the block holds more or none.
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Positional,
    Keyword,
    /// A style property, accepted under every style prefix.
    Style,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// The closed set of statement shapes, each with its own parse routine.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementShape {
    /// Call `function` with the statement's arguments, then parse its children.
    Call {
        function: Expr,
        children: ChildPolicy,
    },
    If,
    For,
    Use,
    Pass,
    Python {
        one_line: bool,
    },
}

impl StatementShape {
    pub fn child_bearing(&self) -> bool {
        match self {
            StatementShape::Call { children, .. } => *children != ChildPolicy::None,
            StatementShape::If | StatementShape::For => true,
            StatementShape::Use | StatementShape::Pass | StatementShape::Python { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementDefinition {
    pub name: String,
    pub shape: StatementShape,
    pub positionals: Vec<GrammarEntry>,
    /// Keyed by the name as written in source, so a style family appears once per prefix.
    pub keywords: IndexMap<String, GrammarEntry>,
    pub children: IndexSet<String>,
}

impl StatementDefinition {
    fn new(name: &str, shape: StatementShape) -> Self {
        Self {
            name: name.to_string(),
            shape,
            positionals: vec![],
            keywords: IndexMap::new(),
            children: IndexSet::new(),
        }
    }

    pub fn accepts_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }
}

/// One thing that can be attached to a statement definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Positional(String),
    Keyword(String),
    Style(String),
    /// Another statement, accepted as a child.
    Statement(String),
}

impl Clause {
    pub fn keywords(names: &[&str]) -> Vec<Clause> {
        names.iter().map(|n| Clause::Keyword(n.to_string())).collect()
    }

    pub fn styles(names: &[&str]) -> Vec<Clause> {
        names.iter().map(|n| Clause::Style(n.to_string())).collect()
    }
}

/// Builds a [`Grammar`] from an ordered sequence of declarations.
#[derive(Debug)]
pub struct GrammarBuilder {
    prefixes: Vec<String>,
    statements: IndexMap<String, StatementDefinition>,
    keyword_names: BTreeSet<String>,
}

/// The statement most recently declared, open for clauses.
pub struct Declaration<'a> {
    builder: &'a mut GrammarBuilder,
    name: String,
}

impl Declaration<'_> {
    pub fn positional(self, name: &str) -> Result<Self, GrammarError> {
        self.clauses([Clause::Positional(name.to_string())])
    }

    pub fn keyword(self, name: &str) -> Result<Self, GrammarError> {
        self.clauses([Clause::Keyword(name.to_string())])
    }

    pub fn style(self, family: &str) -> Result<Self, GrammarError> {
        self.clauses([Clause::Style(family.to_string())])
    }

    pub fn clauses(self, clauses: impl IntoIterator<Item = Clause>) -> Result<Self, GrammarError> {
        self.builder.attach(&self.name, clauses)?;
        Ok(self)
    }
}

impl GrammarBuilder {
    pub fn new(prefixes: &[String]) -> Self {
        Self {
            prefixes: prefixes.to_vec(),
            statements: IndexMap::new(),
            keyword_names: BTreeSet::new(),
        }
    }

    pub fn declare(
        &mut self,
        name: &str,
        shape: StatementShape,
    ) -> Result<Declaration<'_>, GrammarError> {
        if self.statements.contains_key(name) {
            return Err(GrammarError::DuplicateStatement(name.to_string()));
        }
        self.statements
            .insert(name.to_string(), StatementDefinition::new(name, shape));
        Ok(Declaration {
            builder: self,
            name: name.to_string(),
        })
    }

    /// Merge clauses into an already declared statement.
    pub fn attach(
        &mut self,
        name: &str,
        clauses: impl IntoIterator<Item = Clause>,
    ) -> Result<(), GrammarError> {
        for clause in clauses {
            if let Clause::Statement(child) = &clause {
                if !self.statements.contains_key(child) {
                    return Err(GrammarError::UnknownStatement(child.clone()));
                }
            }
            let definition = self
                .statements
                .get_mut(name)
                .ok_or_else(|| GrammarError::UnknownStatement(name.to_string()))?;
            let duplicate = |keyword: &str| GrammarError::DuplicateKeyword {
                statement: name.to_string(),
                keyword: keyword.to_string(),
            };
            match clause {
                Clause::Positional(positional) => {
                    if definition.positionals.iter().any(|p| p.name == positional) {
                        return Err(duplicate(&positional));
                    }
                    definition.positionals.push(GrammarEntry {
                        name: positional,
                        kind: EntryKind::Positional,
                    });
                }
                Clause::Keyword(keyword) => {
                    if definition.keywords.contains_key(&keyword) {
                        return Err(duplicate(&keyword));
                    }
                    self.keyword_names.insert(keyword.clone());
                    let entry = GrammarEntry {
                        name: keyword.clone(),
                        kind: EntryKind::Keyword,
                    };
                    definition.keywords.insert(keyword, entry);
                }
                Clause::Style(family) => {
                    for prefix in &self.prefixes {
                        let keyword = format!("{prefix}{family}");
                        if definition.keywords.contains_key(&keyword) {
                            return Err(duplicate(&keyword));
                        }
                        self.keyword_names.insert(keyword.clone());
                        let entry = GrammarEntry {
                            name: family.clone(),
                            kind: EntryKind::Style,
                        };
                        definition.keywords.insert(keyword, entry);
                    }
                }
                Clause::Statement(child) => {
                    definition.children.insert(child);
                }
            }
        }
        Ok(())
    }

    /// Seal the grammar: every statement becomes a legal child of every child-bearing statement
    /// and of the screen itself.
    pub fn finish(mut self) -> Grammar {
        let all: IndexSet<String> = self.statements.keys().cloned().collect();
        for definition in self.statements.values_mut() {
            if definition.shape.child_bearing() {
                definition.children.extend(all.iter().cloned());
            }
        }
        Grammar {
            statements: self.statements,
            root_children: all,
            keyword_names: self.keyword_names,
        }
    }
}

/// A sealed, read-only grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    statements: IndexMap<String, StatementDefinition>,
    root_children: IndexSet<String>,
    keyword_names: BTreeSet<String>,
}

impl Grammar {
    pub fn statement(&self, name: &str) -> Option<&StatementDefinition> {
        self.statements.get(name)
    }

    pub fn statements(&self) -> impl Iterator<Item = &StatementDefinition> {
        self.statements.values()
    }

    /// Resolve `name` as a child of `parent`, or of the screen when `parent` is `None`.
    pub fn child(
        &self,
        parent: Option<&StatementDefinition>,
        name: &str,
    ) -> Option<&StatementDefinition> {
        let children = parent.map_or(&self.root_children, |p| &p.children);
        if !children.contains(name) {
            return None;
        }
        self.statements.get(name)
    }

    /// Every keyword name any statement accepts, style prefixes applied.
    pub fn keyword_names(&self) -> &BTreeSet<String> {
        &self.keyword_names
    }
}
