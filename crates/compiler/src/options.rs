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

use serde::{Deserialize, Serialize};

/// The prefixes each style property is available under, e.g. `color`, `hover_color`,
/// `selected_idle_color`. The empty prefix must stay first.
pub const DEFAULT_STYLE_PREFIXES: &[&str] = &[
    "",
    "hover_",
    "idle_",
    "insensitive_",
    "activate_",
    "selected_",
    "selected_hover_",
    "selected_idle_",
    "selected_insensitive_",
    "selected_activate_",
];

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Prefixes used to expand every style property family into keyword arguments.
    pub style_prefixes: Vec<String>,
    /// The variable holding the address of the screen itself; every statement's path is rooted here.
    pub root_path_variable: String,
    /// The variable holding the runtime scope, handed to included screens.
    pub scope_variable: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            style_prefixes: DEFAULT_STYLE_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            root_path_variable: "_name".to_string(),
            scope_variable: "_scope".to_string(),
        }
    }
}
