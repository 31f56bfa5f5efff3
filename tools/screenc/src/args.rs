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

use std::path::PathBuf;

use clap_derive::{Parser, ValueEnum};
use eyre::eyre;
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Yaml};
use screenlang_compiler::CompileOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Screen metadata followed by the IR rendered as source.
    Text,
    /// The compiled screens serialized as JSON.
    Json,
}

#[derive(Parser, Debug)]
pub struct Args {
    #[clap(
        help = "Screen language files to compile",
        required_unless_present = "list_keywords"
    )]
    pub files: Vec<PathBuf>,

    #[clap(
        long,
        help = "YAML or JSON file holding compile options; values given on the command line win"
    )]
    pub config_file: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    pub format: OutputFormat,

    #[clap(long, help = "Variable holding the address of the screen being compiled")]
    pub root_path_variable: Option<String>,

    #[clap(long, help = "Variable holding the runtime scope handed to included screens")]
    pub scope_variable: Option<String>,

    #[clap(
        long = "style-prefix",
        help = "A style prefix such as `hover_`; repeat to replace the default set"
    )]
    pub style_prefixes: Vec<String>,

    #[clap(long, help = "Print every keyword argument the grammar accepts, and exit")]
    pub list_keywords: bool,

    #[clap(long, help = "Render errors with color")]
    pub color: bool,

    #[clap(long, help = "Enable debug logging")]
    pub debug: bool,
}

impl Args {
    fn merge_options(&self, options: &mut CompileOptions) {
        if let Some(root) = &self.root_path_variable {
            options.root_path_variable = root.clone();
        }
        if let Some(scope) = &self.scope_variable {
            options.scope_variable = scope.clone();
        }
        if !self.style_prefixes.is_empty() {
            // The bare property name is always accepted.
            let mut prefixes = vec![String::new()];
            prefixes.extend(self.style_prefixes.iter().filter(|p| !p.is_empty()).cloned());
            options.style_prefixes = prefixes;
        }
    }

    /// Load the configuration file if we have it, then merge the arguments over it.
    pub fn load_options(&self) -> Result<CompileOptions, eyre::Report> {
        let mut figment = Figment::new().merge(Serialized::defaults(CompileOptions::default()));
        if let Some(config_path) = &self.config_file {
            if !config_path.exists() {
                return Err(eyre!("Configuration file {:?} does not exist", config_path));
            }
            let is_json = config_path.extension().is_some_and(|e| e == "json");
            figment = if is_json {
                figment.merge(Json::file(config_path))
            } else {
                figment.merge(Yaml::file(config_path))
            };
        }
        let mut options: CompileOptions = figment.extract().map_err(|e| {
            eyre!(
                "Failed to parse configuration from {:?}: {}",
                self.config_file,
                e
            )
        })?;
        self.merge_options(&mut options);
        Ok(options)
    }
}
