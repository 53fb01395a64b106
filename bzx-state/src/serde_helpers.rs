//! Serde adapters for map types whose keys are not strings.
//!
//! The block-index maps are keyed by `(denomination, group id)` pairs,
//! which self-describing formats cannot use as map keys; persist them as
//! sequences of entries instead.

pub(crate) mod group_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::chain::GroupKey;

    pub(crate) fn serialize<S, V>(
        map: &BTreeMap<GroupKey, V>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(map.iter())
    }

    pub(crate) fn deserialize<'de, D, V>(
        deserializer: D,
    ) -> Result<BTreeMap<GroupKey, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let entries = Vec::<(GroupKey, V)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
