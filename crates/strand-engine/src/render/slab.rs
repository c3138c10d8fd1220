/// Id-indexed storage that hands freed ids back out.
///
/// Ids stay small and dense, so long-running create/delete churn does not
/// grow the backing `Vec`.
#[derive(Debug)]
pub(crate) struct Slab<T> {
    entries: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slab<T> {
    pub(crate) fn insert(&mut self, value: T) -> u32 {
        match self.free.pop() {
            Some(id) => {
                self.entries[id as usize] = Some(value);
                id
            }
            None => {
                self.entries.push(Some(value));
                (self.entries.len() - 1) as u32
            }
        }
    }

    /// Removes and returns the entry. Removing a vacant id is a no-op.
    pub(crate) fn remove(&mut self, id: u32) -> Option<T> {
        let value = self.entries.get_mut(id as usize)?.take()?;
        self.free.push(id);
        Some(value)
    }

    pub(crate) fn get(&self, id: u32) -> Option<&T> {
        self.entries.get(id as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.entries.get_mut(id as usize).and_then(Option::as_mut)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.iter_mut().filter_map(Option::as_mut)
    }

    /// Slots ever allocated, live or free.
    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_reuses_ids() {
        let mut slab = Slab::default();
        let keep = slab.insert("keep");

        // One voice's worth of resources created and released per frame.
        for _ in 0..10_000 {
            let vao = slab.insert("vao");
            let a = slab.insert("positions");
            let b = slab.insert("colors");
            assert!(slab.remove(b).is_some());
            assert!(slab.remove(a).is_some());
            assert!(slab.remove(vao).is_some());
        }

        assert_eq!(slab.slots(), 4);
        assert_eq!(slab.len(), 1);
        assert_eq!(slab.get(keep), Some(&"keep"));
    }

    #[test]
    fn removing_twice_frees_once() {
        let mut slab = Slab::default();
        let id = slab.insert(1);
        assert_eq!(slab.remove(id), Some(1));
        assert_eq!(slab.remove(id), None);
        assert_eq!(slab.remove(99), None);

        let a = slab.insert(2);
        let b = slab.insert(3);
        assert_eq!(a, id);
        assert_ne!(a, b);
    }

    #[test]
    fn get_mut_and_values_mut_see_live_entries() {
        let mut slab = Slab::default();
        let a = slab.insert(1);
        let b = slab.insert(2);
        slab.remove(a);
        *slab.get_mut(b).unwrap() += 10;
        assert!(slab.get_mut(a).is_none());
        assert_eq!(slab.values_mut().map(|v| *v).collect::<Vec<_>>(), vec![12]);
    }
}
