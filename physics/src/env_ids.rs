/// Lifecycle of one environment within an episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvPhase {
    #[default]
    Active,
    Terminated,
}

/// Sorted, de-duplicated set of environment indices a batched operation
/// applies to. Reset operations take one of these and touch nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvIds(Vec<usize>);

impl EnvIds {
    pub fn all(num_envs: usize) -> Self {
        Self((0..num_envs).collect())
    }

    /// Indices `>= num_envs` are dropped.
    pub fn new(ids: impl IntoIterator<Item = usize>, num_envs: usize) -> Self {
        let mut v: Vec<usize> = ids.into_iter().filter(|&i| i < num_envs).collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    pub fn from_mask(mask: &[bool]) -> Self {
        Self(
            mask.iter()
                .enumerate()
                .filter_map(|(i, &m)| m.then_some(i))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Run `f` on the selected elements of a per-environment buffer.
    pub fn apply<T>(&self, buf: &mut [T], mut f: impl FnMut(usize, &mut T)) {
        for &id in &self.0 {
            f(id, &mut buf[id]);
        }
    }

    /// Overwrite the selected elements of `buf` with `value`.
    pub fn fill<T: Clone>(&self, buf: &mut [T], value: T) {
        self.apply(buf, |_, slot| *slot = value.clone());
    }
}
