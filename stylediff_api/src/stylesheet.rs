use serde::{Deserialize, Serialize};

/// A parsed stylesheet: the rule list plus anything the lenient parser skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Recoverable problems recorded while parsing.
    #[serde(default)]
    pub warnings: Vec<ParseWarning>,
}

impl Stylesheet {
    /// Returns `true` when parsing recorded no warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// One entry of a rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Selector block with declarations.
    Style(StyleRule),
    /// `@`-rule, with or without a block.
    At(AtRule),
    /// Comment found between rules.
    Comment(Comment),
}

impl Rule {
    /// Short human-readable name used in structural reports.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Style(rule) => rule.selectors.join(", "),
            Self::At(rule) if rule.prelude.is_empty() => format!("@{}", rule.name),
            Self::At(rule) => format!("@{} {}", rule.name, rule.prelude),
            Self::Comment(_) => "comment".to_owned(),
        }
    }

    /// 1-based line where the rule starts.
    #[must_use]
    pub const fn line(&self) -> u32 {
        match self {
            Self::Style(rule) => rule.line,
            Self::At(rule) => rule.line,
            Self::Comment(comment) => comment.line,
        }
    }
}

/// A selector list and its block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Comma-separated selectors, whitespace-collapsed.
    pub selectors: Vec<String>,
    /// Declarations in source order.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Nested rules (`&:hover { ... }`, `@media ... { ... }`) after the
    /// declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// 1-based line of the selector.
    pub line: u32,
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Property name as written.
    pub property: String,
    /// Value text including any `!important` flag.
    pub value: String,
    /// 1-based source line.
    pub line: u32,
}

/// An at-rule such as `@media`, `@import` or `@font-face`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtRule {
    /// Name without the leading `@`.
    pub name: String,
    /// Text between the name and the block or semicolon.
    #[serde(default)]
    pub prelude: String,
    /// Block contents, if the rule has one.
    pub body: AtRuleBody,
    /// 1-based line of the `@` keyword.
    pub line: u32,
}

/// Contents of an at-rule block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum AtRuleBody {
    /// Statement at-rule terminated by `;`.
    None,
    /// Nested rule list (`@media`, `@supports`, `@keyframes`, ...).
    Rules(Vec<Rule>),
    /// Declaration block (`@font-face`, `@page`, ...).
    Declarations(Vec<Declaration>),
    /// Declarations followed by nested rules, as in at-rules nested inside
    /// style rules.
    Block {
        /// Declarations in source order.
        declarations: Vec<Declaration>,
        /// Nested rules in source order.
        rules: Vec<Rule>,
    },
}

/// A `/* ... */` comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Text between the comment delimiters.
    pub text: String,
    /// 1-based line where the comment opens.
    pub line: u32,
}

/// Recoverable problem the parser skipped over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Description of the skipped construct.
    pub message: String,
    /// 1-based line of the problem.
    pub line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_rule() -> Rule {
        Rule::Style(StyleRule {
            selectors: vec!["body".into(), "html".into()],
            declarations: vec![Declaration {
                property: "color".into(),
                value: "black".into(),
                line: 2,
            }],
            rules: Vec::new(),
            line: 1,
        })
    }

    #[test]
    fn labels_describe_each_rule_kind() {
        assert_eq!(body_rule().label(), "body, html");

        let media = Rule::At(AtRule {
            name: "media".into(),
            prelude: "screen".into(),
            body: AtRuleBody::Rules(vec![body_rule()]),
            line: 4,
        });
        assert_eq!(media.label(), "@media screen");

        let font_face = Rule::At(AtRule {
            name: "font-face".into(),
            prelude: String::new(),
            body: AtRuleBody::Declarations(Vec::new()),
            line: 9,
        });
        assert_eq!(font_face.label(), "@font-face");

        let comment = Rule::Comment(Comment {
            text: " reset ".into(),
            line: 12,
        });
        assert_eq!(comment.label(), "comment");
        assert_eq!(comment.line(), 12);
    }

    #[test]
    fn rules_serialize_with_type_tag() {
        let json = serde_json::to_string(&body_rule()).expect("serialize rule");
        assert!(json.contains("\"type\":\"style\""));

        let decoded: Rule = serde_json::from_str(&json).expect("deserialize rule");
        assert_eq!(decoded, body_rule());
    }

    #[test]
    fn stylesheet_defaults_are_applied() {
        let sheet: Stylesheet = serde_json::from_str("{}").expect("deserialize sheet");
        assert!(sheet.rules.is_empty());
        assert!(sheet.is_clean());
    }

    #[test]
    fn at_rule_body_uses_kind_tag() {
        let json = serde_json::to_string(&AtRuleBody::None).expect("serialize body");
        assert_eq!(json, "{\"kind\":\"none\"}");

        let block = AtRuleBody::Block {
            declarations: Vec::new(),
            rules: vec![body_rule()],
        };
        let json = serde_json::to_string(&block).expect("serialize body");
        assert!(json.starts_with("{\"kind\":\"block\",\"items\":{"));
        let decoded: AtRuleBody = serde_json::from_str(&json).expect("deserialize body");
        assert_eq!(decoded, block);
    }

    #[test]
    fn nested_rules_are_omitted_when_empty() {
        let json = serde_json::to_string(&body_rule()).expect("serialize rule");
        assert!(!json.contains("\"rules\""));

        let Rule::Style(mut outer) = body_rule() else {
            unreachable!("body_rule is a style rule");
        };
        outer.rules.push(body_rule());
        let json = serde_json::to_string(&Rule::Style(outer.clone())).expect("serialize rule");
        let decoded: Rule = serde_json::from_str(&json).expect("deserialize rule");
        assert_eq!(decoded, Rule::Style(outer));
    }
}
