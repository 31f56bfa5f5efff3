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

use std::collections::BTreeMap;

use screenlang_compiler::{CompiledScreen, ScreenRegistry, unparse};
use tracing::warn;

/// Screens defined so far, by name. A later definition replaces an earlier one.
#[derive(Debug, Default)]
pub struct ScreenCatalog {
    screens: BTreeMap<String, CompiledScreen>,
}

impl ScreenRegistry for ScreenCatalog {
    fn define_screen(
        &mut self,
        name: String,
        screen: CompiledScreen,
        _modal: bool,
        _zorder: i64,
        _tag: Option<String>,
    ) {
        if let Some(previous) = self.screens.get(&name) {
            let (file, line) = &previous.location;
            warn!(screen = %name, %file, line, "screen redefined; replacing the earlier definition");
        }
        self.screens.insert(name, screen);
    }
}

impl ScreenCatalog {
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.screens)
    }

    /// Each screen's header line, then its body rendered as source.
    pub fn to_text(&self) -> Vec<String> {
        let mut lines = vec![];
        for screen in self.screens.values() {
            let (file, line) = &screen.location;
            let tag = screen.tag.as_deref().unwrap_or("-");
            lines.push(format!(
                "screen {} (modal={}, zorder={}, tag={tag}) from {file}:{line}",
                screen.name, screen.modal, screen.zorder
            ));
            lines.extend(unparse(&screen.body).into_iter().map(|l| format!("    {l}")));
            lines.push(String::new());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use screenlang_compiler::{CompileOptions, ScreenCompiler};

    fn catalog(source: &str) -> ScreenCatalog {
        let compiler = ScreenCompiler::new(CompileOptions::default()).unwrap();
        let mut catalog = ScreenCatalog::default();
        for screen in compiler.compile_file("menu.rpy", source).unwrap() {
            screen.define(&mut catalog);
        }
        catalog
    }

    #[test]
    fn test_text_output() {
        let catalog = catalog("screen m modal True tag menu:\n    text \"hi\"\n");
        assert_eq!(
            catalog.to_text(),
            vec![
                "screen m (modal=true, zorder=0, tag=menu) from menu.rpy:1",
                "    _1 = (_name, 0)",
                "    ui.text(\"hi\", id=_1)",
                "",
            ]
        );
    }

    #[test]
    fn test_redefinition_replaces() {
        let catalog = catalog("screen m:\n    null\nscreen m zorder 4:\n    null\n");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.screens["m"].zorder, 4);
    }

    #[test]
    fn test_json_output() {
        let catalog = catalog("screen m:\n    null\n");
        let json: serde_json::Value = serde_json::from_str(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(json["m"]["name"], "m");
        assert_eq!(json["m"]["location"][1], 1);
    }
}
