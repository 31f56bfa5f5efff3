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

mod args;
mod catalog;

use crate::args::{Args, OutputFormat};
use crate::catalog::ScreenCatalog;
use clap::Parser;
use eyre::{WrapErr, eyre};
use screenlang_compiler::{ScreenCompiler, emit_parse_error};
use tracing::{debug, error, info};
use tracing_subscriber::fmt::format::FmtSpan;

fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    let args: Args = Args::parse();

    let main_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(args.color)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE)
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(main_subscriber).unwrap_or_else(|e| {
        eprintln!("Unable to set configure logging: {e}");
        std::process::exit(1);
    });

    let options = args.load_options()?;
    debug!(?options, "compile options");
    let compiler =
        ScreenCompiler::new(options).map_err(|e| eyre!("Unable to build the grammar: {e}"))?;

    if args.list_keywords {
        for keyword in compiler.grammar().keyword_names() {
            println!("{keyword}");
        }
        return Ok(());
    }

    let mut catalog = ScreenCatalog::default();
    let mut failures = 0;
    for path in &args.files {
        let source = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read {}", path.display()))?;
        let filename = path.display().to_string();
        match compiler.compile_file(&filename, &source) {
            Ok(screens) => {
                info!(file = %filename, screens = screens.len(), "compiled");
                for screen in screens {
                    screen.define(&mut catalog);
                }
            }
            Err(e) => {
                error!(file = %filename, line = e.line, "compilation failed");
                emit_parse_error(&e, &source, args.color);
                failures += 1;
            }
        }
    }

    info!(screens = catalog.len(), "defined screens");
    if !catalog.is_empty() {
        match args.format {
            OutputFormat::Text => {
                for line in catalog.to_text() {
                    println!("{line}");
                }
            }
            OutputFormat::Json => println!("{}", catalog.to_json()?),
        }
    }

    if failures > 0 {
        return Err(eyre!("{failures} of {} files failed to compile", args.files.len()));
    }
    Ok(())
}
