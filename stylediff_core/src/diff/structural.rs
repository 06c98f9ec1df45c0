use crate::{canonical::rule_to_canonical_text, RuleChange, RuleChangeKind, Stylesheet};

/// Compare two rule lists position by position.
///
/// Rules are paired by index, not by selector: moving a rule shows up as a
/// modification at both positions.
#[must_use]
pub fn rule_changes(old: &Stylesheet, new: &Stylesheet) -> Vec<RuleChange> {
    let mut changes = Vec::new();

    for (index, rule) in old.rules.iter().enumerate() {
        let kind = match new.rules.get(index) {
            None => RuleChangeKind::Removed,
            Some(other) if rule_to_canonical_text(rule) != rule_to_canonical_text(other) => {
                RuleChangeKind::Modified
            }
            Some(_) => continue,
        };
        changes.push(RuleChange {
            kind,
            label: rule.label(),
            index,
        });
    }

    changes.extend(
        new.rules
            .iter()
            .enumerate()
            .skip(old.rules.len())
            .map(|(index, rule)| RuleChange {
                kind: RuleChangeKind::Added,
                label: rule.label(),
                index,
            }),
    );

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn changes(old: &str, new: &str) -> Vec<String> {
        rule_changes(&parse(old).expect("parse old"), &parse(new).expect("parse new"))
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    }

    #[test]
    fn unchanged_rules_are_not_reported() {
        assert!(changes("a { color: red }", "a {\n  color:red;\n}").is_empty());
    }

    #[test]
    fn source_position_does_not_count_as_modification() {
        assert!(changes("a { color: red }", "\n\n\na { color: red }").is_empty());
    }

    #[test]
    fn trailing_rules_are_removed_or_added() {
        assert_eq!(
            changes("a { x: 1 }\nb { x: 2 }\nc { x: 3 }", "a { x: 1 }"),
            ["Removed: b", "Removed: c"]
        );
        assert_eq!(
            changes("a { x: 1 }", "a { x: 1 }\n@media print { b { x: 2 } }\n/* end */"),
            ["Added: @media print", "Added: comment"]
        );
    }

    #[test]
    fn reordering_is_reported_positionally() {
        assert_eq!(
            changes("a { x: 1 }\nb { x: 2 }", "b { x: 2 }\na { x: 1 }"),
            ["Modified: a", "Modified: b"]
        );
    }

    #[test]
    fn added_count_is_length_difference() {
        let old = parse("a { x: 1 }").expect("parse");
        let new = parse("z { x: 9 }\nb { x: 2 }\nc { x: 3 }").expect("parse");
        let changes = rule_changes(&old, &new);
        let added = changes
            .iter()
            .filter(|change| change.kind == RuleChangeKind::Added)
            .count();
        assert_eq!(added, new.rules.len() - old.rules.len());
        assert_eq!(changes[0].kind, RuleChangeKind::Modified);
        assert_eq!(changes[1].index, 1);
    }
}
