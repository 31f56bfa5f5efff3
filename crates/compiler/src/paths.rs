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

use std::cell::Cell;

use crate::ast::{Expr, Stmt, Target};

/// Hands out the synthetic variables that hold each statement's runtime address.
///
/// Names are drawn from a serial that is bumped on entry to a nesting level and restored when
/// the level is left, so sibling subtrees reuse names while a live chain of levels never does.
/// One generator serves one top-level compile.
#[derive(Debug, Default)]
pub struct PathGenerator {
    serial: Cell<usize>,
}

/// A live nesting level. Dropping it releases the level's variable name.
#[derive(Debug)]
pub struct PathLevel<'a> {
    generator: &'a PathGenerator,
    name: String,
}

/// The second element of a path tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingIndex<'a> {
    /// A position fixed at compile time.
    Static(usize),
    /// A variable counting loop iterations at runtime.
    Counter(&'a str),
}

impl PathGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the variable name for a new nesting level.
    pub fn enter_level(&self) -> PathLevel<'_> {
        let serial = self.serial.get() + 1;
        self.serial.set(serial);
        PathLevel {
            generator: self,
            name: format!("_{serial}"),
        }
    }

    /// How many levels are currently live.
    pub fn depth(&self) -> usize {
        self.serial.get()
    }
}

impl PathLevel<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `name = (parent, index)`: binds this level's variable to the address of one child.
    pub fn bind(&self, parent: &str, index: SiblingIndex, line: usize) -> Stmt {
        let index = match index {
            SiblingIndex::Static(i) => Expr::int(i as i64),
            SiblingIndex::Counter(counter) => Expr::name(counter),
        };
        Stmt::assign(
            Target::name(&self.name),
            Expr::Tuple(vec![Expr::name(parent), index]),
            line,
        )
    }
}

impl Drop for PathLevel<'_> {
    fn drop(&mut self) {
        let serial = self.generator.serial.get();
        self.generator.serial.set(serial.saturating_sub(1));
    }
}
