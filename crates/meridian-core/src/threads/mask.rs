// Copyright 2025 eraflo
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

//! A growable bitset over hardware processing units.

use std::fmt;
use std::ops::{BitAnd, BitOrAssign};

const WORD_BITS: usize = u64::BITS as usize;

/// A set of processing units, one bit per unit.
///
/// The mask has a logical `size` (usually the hardware's processing-unit
/// count). Setting a bit past the end grows the mask. Equality compares the
/// set bits only, so two masks of different sizes with the same units are
/// equal.
#[derive(Clone, Default)]
pub struct PuMask {
    words: Vec<u64>,
    size: usize,
}

impl PuMask {
    /// Creates an empty mask of size 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mask able to hold `size` units, all clear.
    pub fn with_size(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(WORD_BITS)],
            size,
        }
    }

    /// Creates a mask containing exactly `units`.
    pub fn from_units(units: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::new();
        for unit in units {
            mask.set(unit);
        }
        mask
    }

    /// The number of units the mask can currently describe.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Changes the logical size. Units at or past `size` are dropped.
    pub fn resize(&mut self, size: usize) {
        self.words.resize(size.div_ceil(WORD_BITS), 0);
        self.size = size;
        let tail = size % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Clears every unit, keeping the size.
    pub fn reset(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Marks `unit` as used, growing the mask if needed.
    pub fn set(&mut self, unit: usize) {
        if unit >= self.size {
            self.resize(unit + 1);
        }
        self.words[unit / WORD_BITS] |= 1u64 << (unit % WORD_BITS);
    }

    /// Marks `unit` as unused.
    pub fn unset(&mut self, unit: usize) {
        if unit < self.size {
            self.words[unit / WORD_BITS] &= !(1u64 << (unit % WORD_BITS));
        }
    }

    /// Returns `true` if `unit` is marked.
    pub fn test(&self, unit: usize) -> bool {
        unit < self.size && self.words[unit / WORD_BITS] & (1u64 << (unit % WORD_BITS)) != 0
    }

    /// Returns `true` if at least one unit is marked.
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// Number of marked units.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the marked units in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let bit = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(index * WORD_BITS + bit)
            })
        })
    }

    /// Returns `true` if `self` and `other` share at least one unit.
    pub fn overlaps(&self, other: &PuMask) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }
}

impl BitOrAssign<&PuMask> for PuMask {
    fn bitor_assign(&mut self, other: &PuMask) {
        if other.size > self.size {
            self.resize(other.size);
        }
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= *src;
        }
    }
}

impl BitAnd for &PuMask {
    type Output = PuMask;

    fn bitand(self, other: &PuMask) -> PuMask {
        let size = self.size.min(other.size);
        let mut out = PuMask::with_size(size);
        for (dst, (a, b)) in out
            .words
            .iter_mut()
            .zip(self.words.iter().zip(other.words.iter()))
        {
            *dst = a & b;
        }
        out
    }
}

impl PartialEq for PuMask {
    fn eq(&self, other: &Self) -> bool {
        let longest = self.words.len().max(other.words.len());
        (0..longest).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for PuMask {}

impl FromIterator<usize> for PuMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_units(iter)
    }
}

impl fmt::Debug for PuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PuMask[{}]", self.size)?;
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for PuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Highest unit first, like a printed bitset.
        for unit in (0..self.size).rev() {
            f.write_str(if self.test(unit) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
