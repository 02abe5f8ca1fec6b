//! Skip-sharding detection.

use strata_route::ShardingRule;

/// Decides whether a statement can bypass sharding entirely.
///
/// Sits behind a trait so the default lexical check can be swapped for a
/// parse-driven one without touching callers.
pub trait SkipShardingDetector: Send + Sync {
    fn should_skip(&self, sql: &str, rule: &ShardingRule) -> bool;
}

/// Best-effort lexical check: split the raw SQL on whitespace and look for
/// any sharded logical table among the tokens.
///
/// This is a text scan, not a parse: a table name glued to punctuation
/// (`t_order,`) is not recognized, and a name appearing inside a string
/// literal is. Statements naming no sharding rule at all never skip, since
/// an empty rule set routes through other decorators anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSkipDetector;

impl SkipShardingDetector for LexicalSkipDetector {
    fn should_skip(&self, sql: &str, rule: &ShardingRule) -> bool {
        if rule.logic_tables().next().is_none() {
            return false;
        }
        let tokens: Vec<&str> = sql.split_whitespace().collect();
        !rule.contains_sharding_table(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use strata_core::{DataNode, ShardingValue};
    use strata_route::{KeyGenerator, TableRule};

    struct SequenceKeys(AtomicI64);

    impl KeyGenerator for SequenceKeys {
        fn generate(&self) -> ShardingValue {
            ShardingValue::Int(self.0.fetch_add(1, Ordering::Relaxed))
        }
    }

    fn order_rule() -> ShardingRule {
        ShardingRule::new(vec![TableRule::new(
            "t_order",
            vec![DataNode::new("ds_0", "t_order_0")],
            "order_id",
            None,
            Arc::new(SequenceKeys(AtomicI64::new(0))),
        )])
    }

    #[test]
    fn statement_naming_sharded_table_does_not_skip() {
        let rule = order_rule();
        assert!(!LexicalSkipDetector.should_skip("SELECT * FROM t_order WHERE id = 1", &rule));
    }

    #[test]
    fn statement_without_sharded_table_skips() {
        let rule = order_rule();
        assert!(LexicalSkipDetector.should_skip("SELECT * FROM t_user WHERE id = 1", &rule));
    }

    #[test]
    fn empty_rule_set_never_skips() {
        let rule = ShardingRule::new(Vec::new());
        assert!(!LexicalSkipDetector.should_skip("SELECT * FROM t_user", &rule));
    }

    #[test]
    fn lexical_scan_misses_glued_table_name() {
        // Documented limitation of the whitespace tokenization.
        let rule = order_rule();
        assert!(LexicalSkipDetector.should_skip("SELECT * FROM t_order,t_user", &rule));
    }
}
