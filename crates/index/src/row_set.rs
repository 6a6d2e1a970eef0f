// Copyright 2026 the strataq authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Segment-local row position sets.
//!
//! `spec.md` §4.7 asks for "two interchangeable forms... a dense
//! bitset-backed form (efficient for high-density results) and an
//! array-backed form (efficient for sparse results)". `roaring::RoaringBitmap`
//! already makes exactly that trade-off internally — each 2^16-wide chunk is
//! stored as a sorted array or a dense bitmap depending on its cardinality,
//! switching automatically as elements are added or removed. `RowPositions`
//! is a thin, `SecondaryIndex`-flavored wrapper over it rather than a
//! hand-rolled reimplementation of the same idea.

use roaring::RoaringBitmap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowPositions(RoaringBitmap);

impl RowPositions {
    pub fn new() -> Self {
        Self(RoaringBitmap::new())
    }

    pub fn from_iter(iter: impl IntoIterator<Item = u32>) -> Self {
        Self(RoaringBitmap::from_iter(iter))
    }

    pub fn add(&mut self, pos: u32) {
        self.0.insert(pos);
    }

    pub fn contains(&self, pos: u32) -> bool {
        self.0.contains(pos)
    }

    pub fn size(&self) -> u64 {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn union(&mut self, other: &RowPositions) {
        self.0 |= &other.0;
    }

    pub fn union_all<'a>(sets: impl IntoIterator<Item = &'a RowPositions>) -> RowPositions {
        let mut out = RowPositions::new();
        for s in sets {
            out.union(s);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter()
    }

    /// Approximate resident size, used by the adaptive policy's memory
    /// budgeting (`spec.md` §4.10); roaring containers are far denser than
    /// this in practice, so this is a conservative (over-)estimate.
    pub fn memory_bytes(&self) -> usize {
        (self.0.len() as usize).max(1) * 4
    }
}

impl<'a> IntoIterator for &'a RowPositions {
    type Item = u32;
    type IntoIter = roaring::bitmap::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_combines_positions() {
        let mut a = RowPositions::from_iter([1, 2, 3]);
        let b = RowPositions::from_iter([3, 4]);
        a.union(&b);
        assert_eq!(a.size(), 4);
        assert!(a.contains(4));
    }

    #[test]
    fn union_all_merges_many_sets() {
        let sets = vec![
            RowPositions::from_iter([1, 2]),
            RowPositions::from_iter([2, 3]),
            RowPositions::from_iter([5]),
        ];
        let merged = RowPositions::union_all(sets.iter());
        assert_eq!(merged.size(), 4);
    }
}
