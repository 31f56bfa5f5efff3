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

//! Line-number post-processing over compiled statement trees.

use crate::ast::Stmt;

/// Rewrite line numbers so they never decrease in pre-order, starting from `first_line`.
/// Synthetic statements are attributed to the line of the nearest real statement before them.
pub fn normalize_line_numbers(body: &mut [Stmt], first_line: usize) {
    let mut last = first_line;
    raise(body, &mut last);
}

fn raise(body: &mut [Stmt], last: &mut usize) {
    for stmt in body {
        *last = (*last).max(stmt.line);
        stmt.line = *last;
        for nested in stmt.bodies_mut() {
            raise(nested, last);
        }
    }
}

/// Move every statement in the tree down by `amount` lines.
pub fn shift_line_numbers(body: &mut [Stmt], amount: usize) {
    for stmt in body {
        stmt.line += amount;
        for nested in stmt.bodies_mut() {
            shift_line_numbers(nested, amount);
        }
    }
}

/// Line numbers of the tree in pre-order.
pub fn line_numbers(body: &[Stmt]) -> Vec<usize> {
    let mut lines = vec![];
    for stmt in body {
        lines.push(stmt.line);
        for nested in stmt.bodies() {
            lines.extend(line_numbers(nested));
        }
    }
    lines
}
