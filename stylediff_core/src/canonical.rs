//! Stable text form of a parsed stylesheet.
//!
//! Two stylesheets that differ only in formatting produce the same canonical
//! text. Source line numbers never appear in the output.

use crate::{AtRuleBody, Declaration, Rule, Stylesheet};

const INDENT: &str = "  ";

/// Serialize a stylesheet, one declaration per line, rules separated by a
/// blank line. Non-empty output ends with a newline.
#[must_use]
pub fn to_canonical_text(sheet: &Stylesheet) -> String {
    let mut out = String::new();
    write_rules(&mut out, &sheet.rules, 0);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Serialize a single rule at the top level, without a trailing newline.
#[must_use]
pub fn rule_to_canonical_text(rule: &Rule) -> String {
    let mut out = String::new();
    write_rule(&mut out, rule, 0);
    out
}

fn write_rules(out: &mut String, rules: &[Rule], depth: usize) {
    for (index, rule) in rules.iter().enumerate() {
        if index > 0 {
            out.push_str("\n\n");
        }
        write_rule(out, rule, depth);
    }
}

fn write_rule(out: &mut String, rule: &Rule, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);

    match rule {
        Rule::Style(style) => {
            out.push_str(&style.selectors.join(&format!(",\n{indent}")));
            write_block(out, &style.declarations, &style.rules, depth);
        }
        Rule::At(at) => {
            out.push('@');
            out.push_str(&at.name);
            if !at.prelude.is_empty() {
                out.push(' ');
                out.push_str(&at.prelude);
            }

            match &at.body {
                AtRuleBody::None => out.push(';'),
                AtRuleBody::Declarations(declarations) => {
                    write_block(out, declarations, &[], depth);
                }
                AtRuleBody::Rules(rules) => write_block(out, &[], rules, depth),
                AtRuleBody::Block {
                    declarations,
                    rules,
                } => write_block(out, declarations, rules, depth),
            }
        }
        Rule::Comment(comment) => {
            out.push_str("/*");
            out.push_str(&comment.text);
            out.push_str("*/");
        }
    }
}

/// Declarations one per line, then nested rules after a blank line.
fn write_block(out: &mut String, declarations: &[Declaration], rules: &[Rule], depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(" {\n");
    for declaration in declarations {
        out.push_str(&indent);
        out.push_str(INDENT);
        out.push_str(&declaration.property);
        out.push_str(": ");
        out.push_str(&declaration.value);
        out.push_str(";\n");
    }
    if !rules.is_empty() {
        if !declarations.is_empty() {
            out.push('\n');
        }
        write_rules(out, rules, depth + 1);
        out.push('\n');
    }
    out.push_str(&indent);
    out.push('}');
}
