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

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use unindent::unindent;

    use crate::ast::StmtNode;
    use crate::normalize::line_numbers;
    use crate::{
        CompileOptions, CompiledScreen, ParseError, ScreenCompiler, ScreenRegistry, unparse,
    };

    fn compiler() -> ScreenCompiler {
        ScreenCompiler::new(CompileOptions::default()).unwrap()
    }

    fn compile(source: &str) -> Result<Vec<CompiledScreen>, ParseError> {
        compiler().compile_file("screens.rpy", source)
    }

    /// Compile a single screen and render its body.
    fn compile_body(source: &str) -> Vec<String> {
        let screens = compile(&unindent(source)).unwrap();
        assert_eq!(screens.len(), 1);
        unparse(&screens[0].body)
    }

    fn compile_error(source: &str) -> ParseError {
        compile(&unindent(source)).unwrap_err()
    }

    #[test]
    fn test_single_text() {
        let body = compile_body(
            r#"
            screen s:
                text "a"
            "#,
        );
        assert_eq!(body, vec!["_1 = (_name, 0)", "ui.text(\"a\", id=_1)"]);
    }

    #[test]
    fn test_container_children_get_sibling_paths() {
        let body = compile_body(
            r#"
            screen s:
                vbox:
                    text "a"
                    text "b"
                    text "c"
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.vbox(id=_1)",
                "_2 = (_1, 0)",
                "ui.text(\"a\", id=_2)",
                "_2 = (_1, 1)",
                "ui.text(\"b\", id=_2)",
                "_2 = (_1, 2)",
                "ui.text(\"c\", id=_2)",
                "ui.close()",
            ]
        );
    }

    #[test]
    fn test_screen_level_siblings_count_up() {
        let body = compile_body(
            r#"
            screen s:
                text "a"
                null
                text "b"
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.text(\"a\", id=_1)",
                "_1 = (_name, 1)",
                "ui.null(id=_1)",
                "_1 = (_name, 2)",
                "ui.text(\"b\", id=_1)",
            ]
        );
    }

    #[test]
    fn test_keywords_mixed_into_block() {
        let body = compile_body(
            r#"
            screen s:
                vbox spacing 5:
                    xalign 0.5 yalign 1.0
                    text "a" size 12
                    style "menu"
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.vbox(spacing=5, xalign=0.5, yalign=1.0, style=\"menu\", id=_1)",
                "_2 = (_1, 0)",
                "ui.text(\"a\", size=12, id=_2)",
                "ui.close()",
            ]
        );
    }

    #[test]
    fn test_explicit_id_is_kept() {
        let body = compile_body(
            r#"
            screen s:
                text "a" id "title"
            "#,
        );
        assert_eq!(body, vec!["_1 = (_name, 0)", "ui.text(\"a\", id=\"title\")"]);
    }

    #[test]
    fn test_single_child_container() {
        let body = compile_body(
            r#"
            screen s:
                window:
                    text "a"
                    text "b"
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.window(id=_1)",
                "ui.child_or_fixed()",
                "_2 = (_1, 0)",
                "ui.text(\"a\", id=_2)",
                "_2 = (_1, 1)",
                "ui.text(\"b\", id=_2)",
                "ui.close()",
            ]
        );
    }

    #[test]
    fn test_styled_prefixed_keywords() {
        let body = compile_body(
            r##"
            screen s:
                textbutton "Start" action Start() hover_color "#fff" selected_idle_sound "a.ogg"
            "##,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.textbutton(\"Start\", action=Start(), hover_color=\"#fff\", \
                 selected_idle_sound=\"a.ogg\", id=_1)",
            ]
        );
    }

    #[test]
    fn test_if_elif_else() {
        let body = compile_body(
            r#"
            screen s:
                if a:
                    text "x"
                elif b > 1:
                    text "y"
                else:
                    null
                text "z"
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "if a:",
                "    _2 = (_1, 0)",
                "    _3 = (_2, 0)",
                "    ui.text(\"x\", id=_3)",
                "elif b > 1:",
                "    _2 = (_1, 1)",
                "    _3 = (_2, 0)",
                "    ui.text(\"y\", id=_3)",
                "else:",
                "    _2 = (_1, 2)",
                "    _3 = (_2, 0)",
                "    ui.null(id=_3)",
                "_1 = (_name, 1)",
                "ui.text(\"z\", id=_1)",
            ]
        );
    }

    #[test]
    fn test_long_elif_chain_nests() {
        let source = r#"
            screen s:
                if a:
                    null
                elif b:
                    null
                elif c:
                    null
                else:
                    null
            "#;
        let screens = compile(&unindent(source)).unwrap();

        // Each elif is the only statement in the else branch of the one before it.
        let mut depth = 0;
        let mut branch = &screens[0].body[1..];
        while let [stmt] = branch {
            let StmtNode::If { orelse, .. } = &stmt.node else {
                break;
            };
            depth += 1;
            branch = orelse;
        }
        assert_eq!(depth, 3);

        assert_eq!(
            unparse(&screens[0].body),
            vec![
                "_1 = (_name, 0)",
                "if a:",
                "    _2 = (_1, 0)",
                "    _3 = (_2, 0)",
                "    ui.null(id=_3)",
                "elif b:",
                "    _2 = (_1, 1)",
                "    _3 = (_2, 0)",
                "    ui.null(id=_3)",
                "elif c:",
                "    _2 = (_1, 2)",
                "    _3 = (_2, 0)",
                "    ui.null(id=_3)",
                "else:",
                "    _2 = (_1, 3)",
                "    _3 = (_2, 0)",
                "    ui.null(id=_3)",
            ]
        );
    }

    #[test]
    fn test_if_without_else_leaves_following_line() {
        let body = compile_body(
            r#"
            screen s:
                vbox:
                    if a:
                        text "x"
                    text "y"
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.vbox(id=_1)",
                "_2 = (_1, 0)",
                "if a:",
                "    _3 = (_2, 0)",
                "    _4 = (_3, 0)",
                "    ui.text(\"x\", id=_4)",
                "_2 = (_1, 1)",
                "ui.text(\"y\", id=_2)",
                "ui.close()",
            ]
        );
    }

    #[test]
    fn test_for_loop_paths_use_counter() {
        let body = compile_body(
            r#"
            screen s:
                for i in items:
                    text i
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "_2 = 0",
                "for i in items:",
                "    _3 = (_1, _2)",
                "    _4 = (_3, 0)",
                "    ui.text(i, id=_4)",
                "    _2 += 1",
            ]
        );
    }

    #[test]
    fn test_nested_for_loops_use_separate_counters() {
        let body = compile_body(
            r#"
            screen s:
                for i in x:
                    for j in y:
                        text j
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "_2 = 0",
                "for i in x:",
                "    _3 = (_1, _2)",
                "    _4 = (_3, 0)",
                "    _5 = 0",
                "    for j in y:",
                "        _6 = (_4, _5)",
                "        _7 = (_6, 0)",
                "        ui.text(j, id=_7)",
                "        _5 += 1",
                "    _2 += 1",
            ]
        );
    }

    #[test]
    fn test_for_loop_tuple_pattern() {
        let body = compile_body(
            r#"
            screen s:
                for (k, v), n in pairs:
                    text k
            "#,
        );
        assert_eq!(body[2], "for ((k, v), n) in pairs:");
    }

    #[test]
    fn test_use_statement() {
        let body = compile_body(
            r#"
            screen s:
                use other(title="x", count=n + 1, **extra)
                use plain
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "ui.use_screen(\"other\", _name=_1, _scope=_scope, title=\"x\", count=n + 1, \
                 **extra)",
                "_1 = (_name, 1)",
                "ui.use_screen(\"plain\", _name=_1, _scope=_scope)",
            ]
        );
    }

    #[test]
    fn test_python_statements() {
        let body = compile_body(
            r#"
            screen s:
                $ x = 1
                python:
                    y = [x,
                         2]
                    y[0] += 1; z = None
            "#,
        );
        assert_eq!(
            body,
            vec![
                "_1 = (_name, 0)",
                "x = 1",
                "_1 = (_name, 1)",
                "y = [x, 2]",
                "y[0] += 1",
                "z = None",
            ]
        );
    }

    #[test]
    fn test_text_with_keyword_block() {
        let body = compile_body(
            r##"
            screen s:
                text "a":
                    size 12
                    color "#fff"
            "##,
        );
        assert_eq!(
            body,
            vec!["_1 = (_name, 0)", "ui.text(\"a\", size=12, color=\"#fff\", id=_1)"]
        );
    }

    #[test]
    fn test_text_operand_may_be_a_screen_word() {
        let body = compile_body(
            r#"
            screen s:
                text screen
            "#,
        );
        assert_eq!(body, vec!["_1 = (_name, 0)", "ui.text(screen, id=_1)"]);
    }

    #[test]
    fn test_slices_and_prefixed_strings_in_operands() {
        let body = compile_body(
            r#"
            screen s:
                text x[1:2] + r"\d"
            "#,
        );
        assert_eq!(body, vec!["_1 = (_name, 0)", "ui.text(x[1:2] + \"\\\\d\", id=_1)"]);
    }

    #[test]
    fn test_python_block_error_on_later_line_keeps_indentation() {
        let err = compile("screen s:\n    python:\n        x = 1\n        y = = 2\n").unwrap_err();
        let first = compile("screen s:\n    python:\n        y = = 2\n").unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(err.message, "Syntax error while parsing python code.");
        assert_eq!(err.line_text, "        y = = 2");
        assert_eq!(err.column, first.column);
        assert!(err.column > 8);
    }

    #[test]
    fn test_pass_statement() {
        let body = compile_body(
            r#"
            screen s:
                pass
            "#,
        );
        assert_eq!(body, vec!["_1 = (_name, 0)", "pass"]);
    }

    #[test]
    fn test_screen_metadata() {
        let screens = compile(&unindent(
            r#"
            screen menu modal True zorder -1:
                tag overlay
                zorder 3
                text "a"
            "#,
        ))
        .unwrap();
        let screen = &screens[0];
        assert_eq!(screen.name, "menu");
        assert!(screen.modal);
        assert_eq!(screen.zorder, 3);
        assert_eq!(screen.tag.as_deref(), Some("overlay"));
        assert_eq!(screen.location, ("screens.rpy".to_string(), 1));
        assert_eq!(unparse(&screen.body), vec!["_1 = (_name, 0)", "ui.text(\"a\", id=_1)"]);
    }

    #[test]
    fn test_metadata_defaults() {
        let screens = compile("screen s:\n    null\n").unwrap();
        assert!(!screens[0].modal);
        assert_eq!(screens[0].zorder, 0);
        assert_eq!(screens[0].tag, None);
    }

    #[test]
    fn test_several_screens_restart_paths() {
        let screens = compile(&unindent(
            r#"
            screen a:
                vbox:
                    null
            screen b:
                null
            "#,
        ))
        .unwrap();
        let names: Vec<_> = screens.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(screens[1].location.1, 4);
        assert_eq!(unparse(&screens[1].body), vec!["_1 = (_name, 0)", "ui.null(id=_1)"]);
    }

    #[test]
    fn test_line_numbers_are_attributed_and_monotonic() {
        let source = [
            "screen s:",
            "    vbox:",
            "        text \"a\"",
            "    python:",
            "        x = 1",
            "",
            "        y = 2",
            "",
        ]
        .join("\n");
        let screens = compile(&source).unwrap();
        assert_eq!(line_numbers(&screens[0].body), vec![2, 2, 3, 3, 3, 4, 5, 7]);
    }

    #[test]
    fn test_custom_path_variables() {
        let options = CompileOptions {
            root_path_variable: "_root".to_string(),
            scope_variable: "_env".to_string(),
            ..CompileOptions::default()
        };
        let compiler = ScreenCompiler::new(options).unwrap();
        let screens = compiler
            .compile_file("screens.rpy", "screen s:\n    use other\n")
            .unwrap();
        assert_eq!(
            unparse(&screens[0].body),
            vec![
                "_1 = (_root, 0)",
                "ui.use_screen(\"other\", _root=_1, _env=_env)"
            ]
        );
    }

    #[derive(Default)]
    struct Catalog {
        screens: BTreeMap<String, (bool, i64, Option<String>, usize)>,
    }

    impl ScreenRegistry for Catalog {
        fn define_screen(
            &mut self,
            name: String,
            screen: CompiledScreen,
            modal: bool,
            zorder: i64,
            tag: Option<String>,
        ) {
            self.screens
                .insert(name, (modal, zorder, tag, screen.body.len()));
        }
    }

    #[test]
    fn test_define_hands_screen_to_registry() {
        let screens = compile("screen s modal True tag t:\n    null\n").unwrap();
        let mut catalog = Catalog::default();
        for screen in screens {
            screen.define(&mut catalog);
        }
        assert_eq!(
            catalog.screens.get("s"),
            Some(&(true, 0, Some("t".to_string()), 2))
        );
    }

    #[test_case(
        "screen s:\n    text \"a\" bogus 1\n",
        2,
        "'bogus' is not a keyword argument or valid child for the text statement.";
        "unknown keyword"
    )]
    #[test_case(
        "screen s:\n    text \"a\" size 1 size 2\n",
        2,
        "keyword argument 'size' appears more than once in a text statement.";
        "duplicate keyword"
    )]
    #[test_case(
        "screen s:\n    vbox spacing 1:\n        spacing 2\n",
        3,
        "keyword argument 'spacing' appears more than once in a vbox statement.";
        "duplicate keyword across lines"
    )]
    #[test_case(
        "screen s:\n    text \"a\" \"b\"\n",
        2,
        "expected a keyword argument, colon, or end of line.";
        "extra positional"
    )]
    #[test_case(
        "screen s:\n    text\n",
        2,
        "expected 'simple expression' not found.";
        "missing positional"
    )]
    #[test_case(
        "screen s:\n    bogus 1\n",
        2,
        "Expected a screen language statement.";
        "unknown statement"
    )]
    #[test_case(
        "text \"a\"\n",
        1,
        "expected 'screen' statement.";
        "not a screen"
    )]
    #[test_case(
        "screen s:\n    vbox:\n    null\n",
        2,
        "vbox expects a non-empty block.";
        "empty block"
    )]
    #[test_case(
        "screen s:\n    text \"a\"\n        null\n",
        2,
        "text does not expect a block. Please check the indentation of the line after this one.";
        "unexpected block"
    )]
    #[test_case(
        "screen s:\n    if a:\n        spacing 3\n",
        3,
        "Expected screen language statement.";
        "keyword inside if"
    )]
    #[test_case(
        "screen s:\n    if a:\n        null\n    else\n        null\n",
        4,
        "expected ':' not found.";
        "else without colon"
    )]
    #[test_case(
        "screen s:\n    for in x:\n        null\n",
        2,
        "Expected tuple pattern.";
        "missing loop pattern"
    )]
    #[test_case(
        "screen s:\n    use other(1)\n",
        2,
        "The use statement only takes keyword arguments.";
        "positional use argument"
    )]
    #[test_case(
        "screen s:\n    text (1 +)\n",
        2,
        "Syntax error while parsing python expression.";
        "bad expression"
    )]
    #[test_case(
        "screen s:\n    python:\n        x = 1\n        y = = 2\n",
        4,
        "Syntax error while parsing python code.";
        "bad python block"
    )]
    #[test_case(
        "screen s modal flag:\n    null\n",
        1,
        "modal expects a constant value.";
        "non constant modal"
    )]
    #[test_case(
        "screen s:\n",
        1,
        "screen statement expects a non-empty block.";
        "empty screen"
    )]
    #[test_case(
        "screen s:\n    $ x = 1\n        y = 2\n",
        2,
        "one-line python statement does not expect a block. Please check the indentation of the \
         line after this one.";
        "one line python with block"
    )]
    fn test_compile_errors(source: &str, line: usize, message: &str) {
        let err = compile(source).unwrap_err();
        assert_eq!(err.message, message);
        assert_eq!(err.line, line);
        assert_eq!(err.file, "screens.rpy");
    }

    #[test]
    fn test_error_points_at_offending_column() {
        let err = compile_error(
            r#"
            screen s:
                bogus 1
            "#,
        );
        assert_eq!(err.column, 5);
        assert_eq!(err.line_text, "    bogus 1");
    }

    #[test]
    fn test_error_in_continuation_line() {
        let err = compile("screen s:\n    text (\"a\" +\n          \"b\") size = 3\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.message, "expected 'simple expression' not found.");
        assert_eq!(err.line_text, "          \"b\") size = 3");
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use crate::normalize::line_numbers;
    use crate::{
        CompileOptions, Embedder, Lexer, ScreenCompiler, StatementParser, group_logical_lines,
        standard_grammar, unparse,
    };

    /// A screen of nested vboxes, `depth` deep, each level holding `width` texts before the
    /// next box.
    fn nested_screen(depth: usize, width: usize) -> String {
        let mut source = String::from("screen s:\n");
        for level in 0..depth {
            let indent = "    ".repeat(level + 1);
            source.push_str(&format!("{indent}vbox:\n"));
            for i in 0..width {
                source.push_str(&format!("{indent}    text \"{level}.{i}\"\n"));
            }
        }
        source
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn proptest_sibling_indexes_count_up(count in 1usize..24) {
            let mut source = String::from("screen s:\n    vbox:\n");
            for i in 0..count {
                source.push_str(&format!("        text \"{i}\"\n"));
            }
            let compiler = ScreenCompiler::new(CompileOptions::default()).unwrap();
            let screens = compiler.compile_file("s.rpy", &source).unwrap();
            let bindings: Vec<String> = unparse(&screens[0].body)
                .into_iter()
                .filter(|line| line.starts_with("_2 = "))
                .collect();
            let expected: Vec<String> = (0..count).map(|i| format!("_2 = (_1, {i})")).collect();
            prop_assert_eq!(bindings, expected);
        }

        #[test]
        fn proptest_line_numbers_never_decrease(depth in 1usize..6, width in 1usize..4) {
            let source = nested_screen(depth, width);
            let total = source.lines().count();
            let compiler = ScreenCompiler::new(CompileOptions::default()).unwrap();
            let screens = compiler.compile_file("s.rpy", &source).unwrap();
            let lines = line_numbers(&screens[0].body);
            prop_assert!(lines.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(lines.iter().all(|&l| (1..=total).contains(&l)));
        }

        #[test]
        fn proptest_paths_are_released_between_siblings(depth in 1usize..6) {
            let mut source = nested_screen(depth, 1);
            source.push_str("    null\n");
            let compiler = ScreenCompiler::new(CompileOptions::default()).unwrap();
            let screens = compiler.compile_file("s.rpy", &source).unwrap();
            let body = unparse(&screens[0].body);
            let tail: Vec<&str> = body.iter().rev().take(2).map(|s| s.as_str()).collect();
            prop_assert_eq!(tail, vec!["ui.null(id=_1)", "_1 = (_name, 1)"]);
        }

        #[test]
        fn proptest_failed_child_attempt_reverts_exactly(word in "[a-z][a-z_]{0,11}", value in 0i64..1000) {
            let grammar = standard_grammar(&CompileOptions::default()).unwrap();
            prop_assume!(grammar.statement(&word).is_none());

            let source = format!("{word} {value}\n");
            let lines = group_logical_lines("s.rpy", &source).unwrap();
            let mut l = Lexer::new("s.rpy", &lines);
            prop_assert!(l.advance());

            let embedder = Embedder::default();
            let options = CompileOptions::default();
            let parser = StatementParser::new(&grammar, &embedder, &options);
            let before = l.checkpoint();
            let attempt = parser
                .parse_statement(&mut l, grammar.statement("vbox"), "_1")
                .unwrap();
            prop_assert!(attempt.is_none());

            l.revert(before);
            prop_assert_eq!(l.checkpoint(), before);
            prop_assert_eq!(l.word(), Some(word));
        }
    }
}
