//! The 12-bit permission mode and its bit-level vocabulary.

use std::fmt;

pub const SETUID: u32 = 0o4000;
pub const SETGID: u32 = 0o2000;
pub const STICKY: u32 = 0o1000;
pub const SETID: u32 = SETUID | SETGID;

pub const OWNER_WRITE: u32 = 0o200;
pub const GROUP_WRITE: u32 = 0o020;
pub const WORLD_WRITE: u32 = 0o002;
pub const WRITE_ALL: u32 = 0o222;

pub const OWNER_EXEC: u32 = 0o100;
pub const GROUP_EXEC: u32 = 0o010;
pub const WORLD_EXEC: u32 = 0o001;
pub const EXEC_ALL: u32 = 0o111;

const TRIADS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];

/// Render a 3-bit permission class (rwx) the way `ls` would.
pub fn triad(class: u32) -> &'static str {
    TRIADS[(class & 0o7) as usize]
}

/// Immutable snapshot of an entry's permission bits.
///
/// Wraps the low 12 bits of `st_mode` (set-uid, set-gid, sticky, and the
/// three rwx classes). Fixed candidates are derived functionally; a `Mode`
/// is never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(u32);

impl Mode {
    /// Create a Mode from raw `st_mode` bits; the file-type bits are masked off.
    pub fn new(bits: u32) -> Self {
        Self(bits & 0o7777)
    }

    /// Get the raw permission bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Owner permission class (0..=7).
    pub fn owner(self) -> u32 {
        (self.0 >> 6) & 0o7
    }

    /// Group permission class (0..=7).
    pub fn group(self) -> u32 {
        (self.0 >> 3) & 0o7
    }

    /// Other permission class (0..=7).
    pub fn other(self) -> u32 {
        self.0 & 0o7
    }

    /// True when any bit of `mask` is set.
    pub fn intersects(self, mask: u32) -> bool {
        self.0 & mask != 0
    }
}

impl From<u32> for Mode {
    fn from(bits: u32) -> Self {
        Self::new(bits)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
