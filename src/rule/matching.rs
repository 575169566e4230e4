//! Description matching between fixed rules and transactions.

/// Check whether a rule description and a transaction description refer to
/// the same entry.
///
/// Comparison is case-insensitive and ignores surrounding whitespace. Besides
/// exact equality, one description may contain the other, but only when the
/// contained side is longer than three characters so that short fragments
/// like "luz" do not match everything.
pub fn descriptions_match(rule_description: &str, transaction_description: &str) -> bool {
    let rule = normalize(rule_description);
    let transaction = normalize(transaction_description);

    if rule == transaction {
        return true;
    }

    (rule.chars().count() > 3 && transaction.contains(&rule))
        || (transaction.chars().count() > 3 && rule.contains(&transaction))
}

fn normalize(description: &str) -> String {
    description.trim().to_lowercase()
}

#[cfg(test)]
mod descriptions_match_tests {
    use super::descriptions_match;

    #[test]
    fn exact_match_ignores_case_and_whitespace() {
        assert!(descriptions_match("Aluguel", "  aluguel "));
    }

    #[test]
    fn rule_contained_in_transaction_matches() {
        assert!(descriptions_match("Aluguel", "Aluguel apartamento 101"));
    }

    #[test]
    fn transaction_contained_in_rule_matches() {
        assert!(descriptions_match("Conta de luz CEMIG", "cemig"));
    }

    #[test]
    fn short_fragments_only_match_exactly() {
        // "luz" has three characters, so substring matching is off.
        assert!(!descriptions_match("luz", "luzes de natal"));
        assert!(descriptions_match("luz", "Luz"));
    }

    #[test]
    fn unrelated_descriptions_do_not_match() {
        assert!(!descriptions_match("Aluguel", "Mercado"));
    }

    #[test]
    fn empty_descriptions_match_each_other_only() {
        assert!(descriptions_match("", "  "));
        assert!(!descriptions_match("", "Aluguel"));
    }
}