//! Numeric-range grouping of generic entity properties.
//!
//! Buckets are closed ranges `[k*limit + 1, (k+1)*limit]`: with a limit of 100,
//! `CFIHOS-10000001` and `CFIHOS-10000100` share `CFIHOS_1_10000001_10000100`
//! while `CFIHOS-10000101` starts the next bucket.

use regex::Regex;
use std::sync::OnceLock;

use cfihos_model::constants::{EXTENSION_SUFFIX, RELATION_SUFFIX};

fn digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

#[derive(Debug, Clone)]
pub struct PropertyPartitioner {
    /// Group prefixes such as `CFIHOS_0` … `CFIHOS_9`, tried in order.
    groupings: Vec<String>,
    limit: u64,
}

impl PropertyPartitioner {
    pub fn new(groupings: Vec<String>, limit: u64) -> Self {
        Self {
            groupings,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// First configured grouping the normalized id starts with.
    pub fn group_prefix(&self, property_id: &str) -> Option<&str> {
        let normalized = property_id.replace('-', "_");
        self.groupings
            .iter()
            .find(|g| normalized.starts_with(g.as_str()))
            .map(String::as_str)
    }

    /// Closed bucket `(low, high)` holding `number`.
    pub fn bucket(&self, number: u64) -> (u64, u64) {
        let low = (number.saturating_sub(1) / self.limit) * self.limit + 1;
        (low, low + self.limit - 1)
    }

    /// Group key for a property, or `None` when no grouping prefix matches or
    /// the id carries no number.
    pub fn assign(&self, property_id: &str) -> Option<String> {
        let normalized = property_id.replace('-', "_");
        let prefix = self.group_prefix(&normalized)?;
        let number: u64 = digits().find(&normalized)?.as_str().parse().ok()?;
        let (low, high) = self.bucket(number);

        let lower = normalized.to_lowercase();
        let companion = lower.ends_with(RELATION_SUFFIX) || lower.ends_with("_uom");
        let ext = if companion { EXTENSION_SUFFIX } else { "" };
        Some(format!("{prefix}_{low}_{high}{ext}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partitioner() -> PropertyPartitioner {
        PropertyPartitioner::new((0..10).map(|i| format!("CFIHOS_{i}")).collect(), 100)
    }

    #[test]
    fn test_bucket_boundaries() {
        let p = partitioner();
        assert_eq!(p.bucket(10000001), (10000001, 10000100));
        assert_eq!(p.bucket(10000099), (10000001, 10000100));
        assert_eq!(p.bucket(10000100), (10000001, 10000100));
        assert_eq!(p.bucket(10000101), (10000101, 10000200));
    }

    #[test]
    fn test_assign_groups() {
        let p = partitioner();
        assert_eq!(
            p.assign("CFIHOS-10000050").as_deref(),
            Some("CFIHOS_1_10000001_10000100")
        );
        assert_eq!(p.assign("CFIHOS-10000001"), p.assign("CFIHOS-10000099"));
        assert_ne!(p.assign("CFIHOS-10000001"), p.assign("CFIHOS-10000101"));
    }

    #[test]
    fn test_companions_go_to_ext() {
        let p = partitioner();
        assert_eq!(
            p.assign("CFIHOS-10000050_rel").as_deref(),
            Some("CFIHOS_1_10000001_10000100_ext")
        );
        assert_eq!(
            p.assign("CFIHOS-40000007_UOM").as_deref(),
            Some("CFIHOS_4_40000001_40000100_ext")
        );
    }

    #[test]
    fn test_unknown_prefix_has_no_group() {
        let p = partitioner();
        assert_eq!(p.assign("EPC-10000050"), None);
        assert_eq!(p.assign("CFIHOS_x"), None);
    }
}
