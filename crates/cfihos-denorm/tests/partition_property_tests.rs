use cfihos_denorm::PropertyPartitioner;
use proptest::prelude::*;

fn partitioner(limit: u64) -> PropertyPartitioner {
    PropertyPartitioner::new((0..10).map(|i| format!("CFIHOS_{i}")).collect(), limit)
}

fn bounds(group: &str) -> (u64, u64) {
    let parts: Vec<&str> = group.split('_').collect();
    (parts[2].parse().unwrap(), parts[3].parse().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn bucket_holds_its_number(n in 1u64..100_000_000, limit in 1u64..1_000) {
        let (low, high) = partitioner(limit).bucket(n);
        prop_assert!(low <= n && n <= high);
        prop_assert_eq!(high - low + 1, limit);
        prop_assert_eq!((low - 1) % limit, 0);
    }

    #[test]
    fn assignment_is_deterministic(n in 10_000_000u64..99_999_999) {
        let p = partitioner(100);
        let id = format!("CFIHOS-{n}");
        let group = p.assign(&id);
        prop_assert!(group.is_some());
        prop_assert_eq!(p.assign(&id), group);
    }

    #[test]
    fn group_brackets_the_property_number(n in 10_000_000u64..99_999_999) {
        let group = partitioner(100).assign(&format!("CFIHOS-{n}")).unwrap();
        let (low, high) = bounds(&group);
        prop_assert!(low <= n && n <= high);
        let prefix = format!("CFIHOS_{}", n / 10_000_000);
        prop_assert!(group.starts_with(&prefix));
    }

    #[test]
    fn companions_share_the_bucket_of_their_property(n in 10_000_000u64..99_999_999) {
        let p = partitioner(100);
        let plain = p.assign(&format!("CFIHOS-{n}")).unwrap();
        let rel = p.assign(&format!("CFIHOS-{n}_rel")).unwrap();
        let uom = p.assign(&format!("CFIHOS-{n}_UOM")).unwrap();
        prop_assert_eq!(&rel, &format!("{plain}_ext"));
        prop_assert_eq!(uom, rel);
    }
}
