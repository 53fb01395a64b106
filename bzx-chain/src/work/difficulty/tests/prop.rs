use proptest::prelude::*;

use super::super::*;

proptest! {
    #![proptest_config(ProptestConfig {
        max_global_rejects: 1_000_000,
        ..ProptestConfig::default()
    })]

    /// Check Expanded and Compact conversions.
    ///
    /// Make sure the conversions don't panic, and that they round-trip and
    /// compare correctly.
    #[test]
    fn prop_difficulty_conversion(expanded_seed in any::<[u8; 32]>()) {
        let expanded_seed = ExpandedDifficulty::from_hash(&block::Hash(expanded_seed));

        let zero = ExpandedDifficulty(U256::zero());
        prop_assume!(expanded_seed != zero);

        let compact = expanded_seed.to_compact();
        let expanded_trunc = compact.to_expanded();

        if let Some(expanded_trunc) = expanded_trunc {
            // zero compact values are invalid, and return None on conversion
            prop_assert!(expanded_trunc > zero);

            // the truncated value should be less than or equal to the seed
            prop_assert!(expanded_trunc <= expanded_seed);

            // roundtrip
            let compact_trip = expanded_trunc.to_compact();
            prop_assert_eq!(compact, compact_trip);

            let expanded_trip = compact_trip.to_expanded().expect("roundtrip expanded is valid");
            prop_assert_eq!(expanded_trunc, expanded_trip);
        }
    }

    /// Check that a random ExpandedDifficulty and block::Hash compare
    /// without panicking.
    #[test]
    #[allow(clippy::double_comparisons)]
    fn prop_expanded_hash_cmp(seed in any::<[u8; 32]>(), hash in any::<[u8; 32]>()) {
        let expanded = ExpandedDifficulty::from_hash(&block::Hash(seed));
        let hash = block::Hash(hash);
        prop_assert!(expanded < hash || expanded > hash || expanded == hash);
    }

    /// Check that two random CompactDifficulty values compare and round-trip
    /// correctly.
    #[test]
    fn prop_compact_roundtrip(compact1 in any::<u32>(), compact2 in any::<u32>()) {
        let compact1 = CompactDifficulty(compact1);
        let compact2 = CompactDifficulty(compact2);

        prop_assume!(compact1.to_expanded().is_some());
        prop_assume!(compact2.to_expanded().is_some());

        let expanded1 = compact1.to_expanded().expect("just checked");
        let expanded2 = compact2.to_expanded().expect("just checked");

        let compact1_trip = expanded1.to_compact();
        let compact2_trip = expanded2.to_compact();

        if expanded1 == expanded2 {
            prop_assert_eq!(compact1_trip, compact2_trip);
        }

        // expanding a re-encoded value must be lossless
        prop_assert_eq!(compact1_trip.to_expanded(), Some(expanded1));
        prop_assert_eq!(compact2_trip.to_expanded(), Some(expanded2));
    }
}
