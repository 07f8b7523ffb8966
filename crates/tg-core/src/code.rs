//! Cell identifier codec.
//!
//! # Format
//!
//! A cell identifier is the coarse ancestor's letter code followed by one
//! character per subdivision level:
//!
//! ```text
//! AB 2 C 0
//! ^^ ^ ^ ^
//! |  | | └─ depth 2: digit
//! |  | └─── depth 1: letter
//! |  └───── depth 0: digit
//! └──────── root code (bijective base-26)
//! ```
//!
//! Even depths use `0`–`3`, odd depths use `A`–`D`, both encoding the same
//! quadrant number `row_bit * 2 + col_bit`.  Rows grow southward from the
//! grid origin, so quadrant 0 is the north-west child.
//!
//! Because the root code is letters only and the path always starts with a
//! digit, an identifier parses unambiguously.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, RootIndex};

// ── Root codes ────────────────────────────────────────────────────────────────

/// Bijective base-26 letter code for a root index: 0 → `A`, 25 → `Z`,
/// 26 → `AA`, 701 → `ZZ`, 702 → `AAA`.
pub fn encode_root(index: RootIndex) -> String {
    let mut n = index.0 as u64 + 1;
    let mut buf = Vec::with_capacity(4);
    while n > 0 {
        n -= 1;
        buf.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    buf.reverse();
    // Only ASCII uppercase bytes were pushed.
    buf.into_iter().map(char::from).collect()
}

/// Inverse of [`encode_root`].  Returns `None` for empty input, characters
/// outside `A`–`Z`, or codes that overflow `u32`.
pub fn decode_root(code: &str) -> Option<RootIndex> {
    if code.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for b in code.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        n = n.checked_mul(26)?.checked_add((b - b'A') as u64 + 1)?;
        if n > u32::MAX as u64 {
            return None;
        }
    }
    Some(RootIndex((n - 1) as u32))
}

// ── Quadrant ──────────────────────────────────────────────────────────────────

/// One of the four children of a cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Build from the row bit (1 = southern half) and column bit
    /// (1 = eastern half).
    #[inline]
    pub fn from_bits(row_bit: bool, col_bit: bool) -> Self {
        Self::ALL[(row_bit as usize) * 2 + col_bit as usize]
    }

    #[inline]
    pub fn number(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn row_bit(self) -> bool {
        self.number() & 0b10 != 0
    }

    #[inline]
    pub fn col_bit(self) -> bool {
        self.number() & 0b01 != 0
    }

    /// The label character at subdivision `depth` (0-based).
    #[inline]
    pub fn to_char(self, depth: usize) -> char {
        if depth % 2 == 0 {
            char::from(b'0' + self.number())
        } else {
            char::from(b'A' + self.number())
        }
    }

    /// Parse a label character expected at subdivision `depth`.
    pub fn from_char(depth: usize, c: char) -> Option<Self> {
        let n = if depth % 2 == 0 {
            match c {
                '0'..='3' => c as u8 - b'0',
                _ => return None,
            }
        } else {
            match c {
                'A'..='D' => c as u8 - b'A',
                _ => return None,
            }
        };
        Some(Self::ALL[n as usize])
    }
}

// ── CellId ────────────────────────────────────────────────────────────────────

/// A parsed hierarchical cell identifier.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CellId {
    /// Coarse ancestor's assignment index.
    pub root: RootIndex,
    /// Quadrant chosen at each subdivision level, coarse to fine.
    pub path: Vec<Quadrant>,
}

impl CellId {
    pub fn new(root: RootIndex, path: Vec<Quadrant>) -> Self {
        Self { root, path }
    }

    /// Number of subdivisions below the coarse tier.
    #[inline]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn root_code(&self) -> String {
        encode_root(self.root)
    }

    /// The enclosing cell one level up, or `None` for a coarse cell.
    pub fn parent(&self) -> Option<CellId> {
        if self.path.is_empty() {
            return None;
        }
        Some(CellId {
            root: self.root,
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// `true` if `self` strictly contains `other`.
    pub fn is_ancestor_of(&self, other: &CellId) -> bool {
        self.root == other.root
            && self.path.len() < other.path.len()
            && other.path.starts_with(&self.path)
    }

    /// Integer (column, row) offset of this cell inside its coarse ancestor,
    /// in units of this cell's own size.
    pub fn offset_in_root(&self) -> (u64, u64) {
        self.path.iter().fold((0u64, 0u64), |(c, r), q| {
            ((c << 1) | q.col_bit() as u64, (r << 1) | q.row_bit() as u64)
        })
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_root(self.root))?;
        for (depth, q) in self.path.iter().enumerate() {
            write!(f, "{}", q.to_char(depth))?;
        }
        Ok(())
    }
}

impl FromStr for CellId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .char_indices()
            .find(|(_, c)| !c.is_ascii_uppercase())
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        let (root_code, rest) = s.split_at(split);

        let root = decode_root(root_code)
            .ok_or_else(|| CoreError::Parse(format!("invalid root code in cell id {s:?}")))?;

        let path = rest
            .chars()
            .enumerate()
            .map(|(depth, c)| {
                Quadrant::from_char(depth, c).ok_or_else(|| {
                    CoreError::Parse(format!(
                        "invalid character {c:?} at subdivision {depth} in cell id {s:?}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CellId { root, path })
    }
}
