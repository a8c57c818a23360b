// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Flat, bounds-checked Intcode memory
//!
//! Memory is a contiguous run of `i64` cells addressed from zero. Addresses are `i64`s, because
//! that is what parameters are, and any address outside of `0..len` is rejected rather than
//! silently growing memory.

use itertools::Itertools;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::LoadError;

/// The amount of zero-padded scratch memory that long-running programs are usually given
pub const DEFAULT_SCRATCH_SIZE: usize = 100_000;

/// Parse comma-separated base-10 integers, as found in puzzle input files
///
/// Leading and trailing whitespace around the whole text and around each token is ignored.
///
/// # Example
///
/// ```
/// use intcode::memory::parse_program;
/// assert_eq!(parse_program(" 1,-2, 3\n").unwrap(), vec![1, -2, 3]);
/// assert!(parse_program("1,two,3").is_err());
/// ```
pub fn parse_program(text: &str) -> Result<Vec<i64>, LoadError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LoadError::Empty);
    }
    text.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, token)| {
            token
                .parse()
                .map_err(|source| LoadError::InvalidToken {
                    index,
                    token: token.to_owned(),
                    source,
                })
        })
        .collect()
}

/// The memory of a single machine
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Memory {
    cells: Vec<i64>,
}

impl Memory {
    /// Create memory holding exactly `cells`
    pub fn new(cells: Vec<i64>) -> Self {
        Self { cells }
    }

    /// Number of addressable cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether there are no addressable cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Zero-pad memory so that it holds at least `len` cells. Never shrinks.
    pub fn reserve_scratch(&mut self, len: usize) {
        if len > self.cells.len() {
            self.cells.resize(len, 0);
        }
    }

    /// Convert `address` to an index, if it's in bounds
    pub fn index_of(&self, address: i64) -> Option<usize> {
        usize::try_from(address)
            .ok()
            .filter(|&i| i < self.cells.len())
    }

    /// Whether `address` refers to a cell
    pub fn contains(&self, address: i64) -> bool {
        self.index_of(address).is_some()
    }

    /// Read the cell at `address`
    pub fn get(&self, address: i64) -> Option<i64> {
        self.index_of(address).map(|i| self.cells[i])
    }

    /// Get a mutable reference to the cell at `address`
    pub fn get_mut(&mut self, address: i64) -> Option<&mut i64> {
        self.index_of(address).map(|i| &mut self.cells[i])
    }

    /// View all of memory
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Render memory as comma-separated integers, which [`parse_program`] reads back unchanged
    ///
    /// # Example
    ///
    /// ```
    /// use intcode::memory::Memory;
    /// let mem: Memory = "1, 0,0 ,0,99".parse().unwrap();
    /// assert_eq!(mem.dump(), "1,0,0,0,99");
    /// ```
    pub fn dump(&self) -> String {
        self.cells.iter().join(",")
    }
}

impl From<Vec<i64>> for Memory {
    fn from(cells: Vec<i64>) -> Self {
        Self::new(cells)
    }
}

impl FromIterator<i64> for Memory {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromStr for Memory {
    type Err = LoadError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_program(s).map(Self::new)
    }
}

impl IntoIterator for Memory {
    type Item = i64;
    type IntoIter = std::vec::IntoIter<i64>;
    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Panics if `i` is out of bounds. Use [`Memory::get`] for a checked read.
impl Index<i64> for Memory {
    type Output = i64;
    fn index(&self, i: i64) -> &i64 {
        match self.index_of(i) {
            Some(i) => &self.cells[i],
            None => panic!("address {i} is out of bounds for memory of length {}", self.len()),
        }
    }
}

/// Panics if `i` is out of bounds. Use [`Memory::get_mut`] for a checked write.
impl IndexMut<i64> for Memory {
    fn index_mut(&mut self, i: i64) -> &mut i64 {
        let len = self.len();
        match self.index_of(i) {
            Some(i) => &mut self.cells[i],
            None => panic!("address {i} is out of bounds for memory of length {len}"),
        }
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cells.iter().format(","))
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // trailing scratch space is nearly always zeroes, so skip it
        let used = self
            .cells
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        f.debug_struct("Memory")
            .field("len", &self.cells.len())
            .field("cells", &&self.cells[..used])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_reports_offending_token() {
        let err = parse_program("1,2,x3,4").unwrap_err();
        let LoadError::InvalidToken { index, token, .. } = err else {
            panic!("wrong error: {err:?}");
        };
        assert_eq!((index, token.as_str()), (2, "x3"));
        assert_eq!(parse_program("   \n"), Err(LoadError::Empty));
        assert!(matches!(
            parse_program("1,,2"),
            Err(LoadError::InvalidToken { index: 1, .. })
        ));
    }

    #[test]
    fn bounds() {
        let mut mem = Memory::new(vec![5, 6, 7]);
        assert_eq!(mem.get(0), Some(5));
        assert_eq!(mem.get(2), Some(7));
        assert_eq!(mem.get(3), None);
        assert_eq!(mem.get(-1), None);
        assert!(mem.get_mut(3).is_none());
        *mem.get_mut(1).unwrap() = 60;
        assert_eq!(mem[1], 60);
    }

    #[test]
    fn scratch_space_is_zeroed_and_never_shrinks() {
        let mut mem = Memory::new(vec![1, 2]);
        mem.reserve_scratch(5);
        assert_eq!(mem.as_slice(), &[1, 2, 0, 0, 0]);
        mem.reserve_scratch(1);
        assert_eq!(mem.len(), 5);
        assert_eq!(mem.dump(), "1,2,0,0,0");
    }

    proptest! {
        #[test]
        fn dump_parses_back(cells in prop::collection::vec(any::<i64>(), 1..64)) {
            let mem = Memory::new(cells);
            let parsed: Memory = mem.dump().parse().unwrap();
            prop_assert_eq!(parsed, mem);
        }
    }
}
