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

//! The standard screen language statements.

use indexmap::IndexSet;

use crate::ast::Expr;
use crate::errors::GrammarError;
use crate::grammar::{ChildPolicy, Clause, Grammar, GrammarBuilder, StatementShape};
use crate::options::CompileOptions;

pub const POSITION_PROPERTIES: &[&str] = &[
    "anchor", "xanchor", "yanchor", "pos", "xpos", "ypos", "align", "xalign", "yalign", "xoffset",
    "yoffset", "xmaximum", "ymaximum", "area", "clipping",
];

pub const TEXT_PROPERTIES: &[&str] = &[
    "antialias",
    "black_color",
    "bold",
    "color",
    "drop_shadow",
    "drop_shadow_color",
    "first_indent",
    "font",
    "size",
    "italic",
    "justify",
    "language",
    "layout",
    "line_spacing",
    "minwidth",
    "min_width",
    "outlines",
    "rest_indent",
    "slow_cps",
    "slow_cps_multiplier",
    "slow_abortable",
    "text_align",
    "text_y_fudge",
    "underline",
    "xmaximum",
    "ymaximum",
    "xminimum",
    "yminimum",
    "xfill",
    "yfill",
];

pub const WINDOW_PROPERTIES: &[&str] = &[
    "background",
    "foreground",
    "left_margin",
    "right_margin",
    "bottom_margin",
    "top_margin",
    "xmargin",
    "ymargin",
    "left_padding",
    "right_padding",
    "top_padding",
    "bottom_padding",
    "xpadding",
    "ypadding",
    "size_group",
    "xminimum",
    "yminimum",
    "xfill",
    "yfill",
];

pub const BUTTON_PROPERTIES: &[&str] = &["sound", "mouse"];

pub const BAR_PROPERTIES: &[&str] = &[
    "bar_vertical",
    "bar_invert",
    "bar_resizing",
    "left_gutter",
    "right_gutter",
    "top_gutter",
    "bottom_gutter",
    "left_bar",
    "right_bar",
    "top_bar",
    "bottom_bar",
    "thumb",
    "thumb_shadow",
    "thumb_offset",
    "mouse",
    "unscrollable",
];

pub const BOX_PROPERTIES: &[&str] = &["box_layout", "spacing", "first_spacing", "xfill", "yfill"];

/// Properties of the transform statements.
pub const TRANSFORM_PROPERTIES: &[&str] = &[
    "pos", "xpos", "ypos", "anchor", "xanchor", "yanchor", "align", "xalign", "yalign", "rotate",
    "zoom", "xzoom", "yzoom", "alpha", "around", "alignaround", "angle", "radius", "crop",
    "corner1", "corner2", "size", "subpixel", "delay",
];

const UI_KEYWORDS: &[&str] = &["at", "id", "style"];

const CLICK_KEYWORDS: &[&str] = &["action", "clicked", "hovered", "unhovered"];

/// Style families drawn from several property groups. Groups overlap (`xfill` is both a text
/// and a box property), so each family is kept once.
fn styles(groups: &[&[&str]]) -> Vec<Clause> {
    let families: IndexSet<&str> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    families
        .into_iter()
        .map(|family| Clause::Style(family.to_string()))
        .collect()
}

fn call(function: &str, children: ChildPolicy) -> StatementShape {
    StatementShape::Call {
        function: Expr::dotted(function),
        children,
    }
}

/// Declare the standard statement set and seal it into a grammar.
pub fn standard_grammar(options: &CompileOptions) -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new(&options.style_prefixes);
    let ui = || Clause::keywords(UI_KEYWORDS);

    g.declare("null", call("ui.null", ChildPolicy::None))?
        .clauses(Clause::keywords(&["width", "height"]))?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES]))?;

    g.declare("text", call("ui.text", ChildPolicy::None))?
        .positional("text")?
        .keyword("slow")?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES, TEXT_PROPERTIES]))?;

    for name in ["hbox", "vbox", "fixed"] {
        g.declare(name, call(&format!("ui.{name}"), ChildPolicy::Many))?
            .clauses(ui())?
            .clauses(styles(&[POSITION_PROPERTIES, BOX_PROPERTIES]))?;
    }

    g.declare("grid", call("ui.grid", ChildPolicy::Many))?
        .positional("cols")?
        .positional("rows")?
        .keyword("transpose")?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES]))?;

    g.declare("side", call("ui.side", ChildPolicy::Many))?
        .positional("positions")?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES]))?;

    for name in ["window", "frame"] {
        g.declare(name, call(&format!("ui.{name}"), ChildPolicy::One))?
            .clauses(ui())?
            .clauses(styles(&[POSITION_PROPERTIES, WINDOW_PROPERTIES]))?;
    }

    g.declare("key", call("ui.key", ChildPolicy::None))?
        .positional("key")?
        .keyword("action")?;

    g.declare("timer", call("ui.timer", ChildPolicy::None))?
        .positional("delay")?
        .keyword("action")?
        .keyword("repeat")?;

    g.declare("input", call("ui.input", ChildPolicy::None))?
        .clauses(Clause::keywords(&[
            "default", "length", "allow", "exclude", "prefix", "suffix", "changed",
        ]))?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES, TEXT_PROPERTIES]))?;

    g.declare("image", call("ui.image", ChildPolicy::None))?
        .positional("im")?;

    let button_styles = || {
        styles(&[
            POSITION_PROPERTIES,
            WINDOW_PROPERTIES,
            BUTTON_PROPERTIES,
        ])
    };

    g.declare("button", call("ui.button", ChildPolicy::One))?
        .clauses(Clause::keywords(CLICK_KEYWORDS))?
        .clauses(ui())?
        .clauses(button_styles())?;

    g.declare("imagebutton", call("ui.imagebutton", ChildPolicy::None))?
        .clauses(Clause::keywords(&[
            "auto",
            "idle",
            "hover",
            "insensitive",
            "selected_idle",
            "selected_hover",
        ]))?
        .clauses(Clause::keywords(CLICK_KEYWORDS))?
        .keyword("image_style")?
        .clauses(ui())?
        .clauses(button_styles())?;

    g.declare("textbutton", call("ui.textbutton", ChildPolicy::None))?
        .positional("label")?
        .clauses(Clause::keywords(CLICK_KEYWORDS))?
        .keyword("text_style")?
        .clauses(ui())?
        .clauses(button_styles())?;

    for name in ["bar", "vbar"] {
        g.declare(name, call(&format!("ui.{name}"), ChildPolicy::None))?
            .clauses(Clause::keywords(&["adjustment", "range", "value", "changed"]))?
            .clauses(ui())?
            .clauses(styles(&[POSITION_PROPERTIES, BAR_PROPERTIES]))?;
    }

    g.declare("viewport", call("ui.viewport", ChildPolicy::One))?
        .clauses(Clause::keywords(&[
            "child_size",
            "mousewheel",
            "draggable",
            "xadjustment",
            "yadjustment",
        ]))?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES]))?;

    g.declare("imagemap", call("ui.imagemap", ChildPolicy::Many))?
        .clauses(Clause::keywords(&[
            "ground",
            "hover",
            "insensitive",
            "idle",
            "selected_hover",
            "selected_idle",
            "auto",
        ]))?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES]))?;

    g.declare("hotspot", call("ui.hotspot_with_child", ChildPolicy::One))?
        .positional("spot")?
        .clauses(Clause::keywords(CLICK_KEYWORDS))?
        .clauses(ui())?
        .clauses(button_styles())?;

    g.declare("hotbar", call("ui.hotbar", ChildPolicy::None))?
        .positional("spot")?
        .clauses(Clause::keywords(&["adjustment", "range", "value"]))?
        .clauses(ui())?
        .clauses(styles(&[POSITION_PROPERTIES, BAR_PROPERTIES]))?;

    g.declare("transform", call("ui.transform", ChildPolicy::One))?
        .keyword("at")?
        .keyword("id")?
        .clauses(styles(&[TRANSFORM_PROPERTIES]))?;

    g.declare("add", call("ui.add", ChildPolicy::None))?
        .positional("im")?
        .keyword("at")?
        .keyword("id")?
        .clauses(styles(&[TRANSFORM_PROPERTIES]))?;

    g.declare("on", call("ui.on", ChildPolicy::None))?
        .positional("event")?
        .keyword("action")?;

    g.declare("pass", StatementShape::Pass)?;
    g.declare("use", StatementShape::Use)?;
    g.declare("if", StatementShape::If)?;
    g.declare("for", StatementShape::For)?;
    g.declare("$", StatementShape::Python { one_line: true })?;
    g.declare("python", StatementShape::Python { one_line: false })?;

    Ok(g.finish())
}
