use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Read helpers that copy out of a `DashMap` instead of returning a guard.
///
/// Reconciliations await on the platform between reads and writes of the
/// snapshot and lock maps. A `Ref`/`RefMut` kept alive over such an await
/// would pin its shard; these helpers release it before returning.
pub trait DashMapExt<K, V> {
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone;

    /// Value for `key`, created with `V::default()` on first use.
    fn get_or_default_cloned(&self, key: K) -> V
    where
        V: Clone + Default;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash,
{
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|slot| slot.value().clone())
    }

    fn get_or_default_cloned(&self, key: K) -> V
    where
        V: Clone + Default,
    {
        self.entry(key).or_default().value().clone()
    }
}
