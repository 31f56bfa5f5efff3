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

//! Rich rendering of compile errors against the source they came from.

use std::io::{self, Write};
use std::ops::Range;

use ariadne::{CharSet, Config, Label, Report, ReportKind, Source};

use crate::errors::ParseError;

/// Write a parse error to stderr with the offending source line in context.
///
/// Falls back to the classic plain rendering when the error's location cannot be found in
/// `source`.
pub fn emit_parse_error(error: &ParseError, source: &str, use_color: bool) {
    let rendered = render_parse_error(error, source, use_color);
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_all(rendered.as_bytes());
    let _ = stderr.flush();
}

/// Render a parse error the way `emit_parse_error` prints it.
pub fn render_parse_error(error: &ParseError, source: &str, use_color: bool) -> String {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(span) = error_span(error, source) else {
        return error.report();
    };

    let report = Report::build(ReportKind::Error, (error.file.as_str(), span.clone()))
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_char_set(CharSet::Unicode),
        )
        .with_message(&error.message)
        .with_label(
            Label::new((error.file.as_str(), span)).with_message("compilation stopped here"),
        )
        .finish();

    let mut buffer = Vec::new();
    if report
        .write((error.file.as_str(), Source::from(source)), &mut buffer)
        .is_err()
    {
        return error.report();
    }
    String::from_utf8(buffer).unwrap_or_else(|_| error.report())
}

/// The character span of the error's column, as an offset into the whole source.
fn error_span(error: &ParseError, source: &str) -> Option<Range<usize>> {
    let mut offset = 0;
    for (number, text) in source.split_inclusive('\n').enumerate() {
        if number + 1 == error.line {
            let width = text.trim_end_matches(['\n', '\r']).chars().count();
            let column = (error.column - 1).min(width);
            let start = offset + column;
            return Some(start..start + 1);
        }
        offset += text.chars().count();
    }
    None
}
