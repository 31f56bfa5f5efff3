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

//! Benchmarks for compiling screen language source.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use screenlang_compiler::{CompileOptions, ScreenCompiler, group_logical_lines, standard_grammar};
use std::hint::black_box;

const MAIN_MENU: &str = r#"
screen main_menu modal True zorder 10:
    tag menu
    window:
        style "mm_root"
        frame:
            xalign 0.98
            yalign 0.98
            textbutton "Start Game" action Start()
            textbutton "Load Game" action ShowMenu("load")
            textbutton "Preferences" action ShowMenu("preferences")
            textbutton "Help" action Help()
            textbutton "Quit" action Quit(confirm=False)
"#;

const INVENTORY: &str = r#"
screen inventory:
    grid 4 3:
        spacing 8
        for item in inventory.items:
            if item.count > 0:
                imagebutton idle item.icon hover item.hover_icon action Use(item)
            else:
                null width 64 height 64
    python:
        total = len(inventory.items)
        full = total >= 12
    text "[total] items" xalign 0.5 size 22 hover_color "#ffcc00"
"#;

/// A screen of `count` sibling buttons inside a viewport.
fn wide_screen(count: usize) -> String {
    let mut source = String::from("screen wide:\n    viewport:\n        vbox:\n");
    for i in 0..count {
        source.push_str(&format!(
            "            textbutton \"Item {i}\" action Jump(\"label_{i}\") xfill True\n"
        ));
    }
    source
}

fn compile_screens(c: &mut Criterion) {
    let compiler = ScreenCompiler::new(CompileOptions::default()).unwrap();
    let wide = wide_screen(200);
    let cases = [
        ("Main menu", MAIN_MENU.to_string()),
        ("Inventory", INVENTORY.to_string()),
        ("Wide", wide),
    ];

    let mut group = c.benchmark_group("compile");
    for (name, source) in &cases {
        group.bench_with_input(BenchmarkId::new("Compile", name), source, |b, source| {
            b.iter(|| black_box(compiler.compile_file("bench.rpy", black_box(source))))
        });
        group.bench_with_input(BenchmarkId::new("Lines", name), source, |b, source| {
            b.iter(|| black_box(group_logical_lines("bench.rpy", black_box(source))))
        });
    }
    group.finish();
}

fn build_grammar(c: &mut Criterion) {
    let options = CompileOptions::default();
    c.bench_function("standard_grammar", |b| {
        b.iter(|| black_box(standard_grammar(black_box(&options))))
    });
}

criterion_group!(benches, compile_screens, build_grammar);
criterion_main!(benches);
