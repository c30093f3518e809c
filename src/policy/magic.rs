//! Content-based sniffing of the executable bit.
//!
//! Given a regular file that claims to be executable, the sniffer reads the
//! first four bytes and checks them against an allow-list of known binary
//! and script signatures. Anything unrecognized is flagged rather than
//! trusted: an accidentally-set executable bit is a common misconfiguration.

use crate::mode::{self, Mode};
use crate::policy::types::Finding;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::trace;

/// The first four bytes of a candidate executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix([u8; 4]);

impl Prefix {
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    fn bytes(self) -> [u8; 4] {
        self.0
    }

    /// The prefix packed into one big-endian word, for whole-word magics.
    fn word(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

struct Signature {
    name: &'static str,
    matches: fn(Prefix) -> bool,
}

/// Known-good executable signatures, checked in order, first match wins.
static SIGNATURES: &[Signature] = &[
    Signature {
        name: "ELF binary",
        matches: |p| p.bytes() == *b"\x7fELF",
    },
    Signature {
        name: "DOS/Windows binary",
        matches: |p| p.bytes()[..2] == *b"MZ",
    },
    Signature {
        name: "AIX binary",
        matches: |p| p.word() == 0x01df_0004,
    },
    Signature {
        name: "AIX library",
        matches: |p| p.bytes() == *b"<big",
    },
    Signature {
        name: "Mach-O ppc binary",
        matches: |p| p.word() == 0xfeed_face,
    },
    Signature {
        name: "Mach-O ppc64 binary",
        matches: |p| p.word() == 0xfeed_facf,
    },
    Signature {
        name: "Mach-O i386 binary",
        matches: |p| p.word() == 0xcefa_edfe,
    },
    Signature {
        name: "Mach-O x86_64 binary",
        matches: |p| p.word() == 0xcffa_edfe,
    },
    Signature {
        // Same magic as Java class files.
        name: "Mach-O universal binary",
        matches: |p| p.word() == 0xcafe_babe,
    },
];

/// What the sniffer concluded about a file's executable bit.
#[derive(Debug, Clone)]
pub struct SniffVerdict {
    /// True when the content does not justify the executable bit.
    pub clear_exec: bool,
    pub findings: Vec<Finding>,
}

impl SniffVerdict {
    fn keep() -> Self {
        Self {
            clear_exec: false,
            findings: Vec::new(),
        }
    }
}

/// Inspect the first four bytes of `path` and decide whether its executable
/// bit is justified. Only called for regular files with at least one
/// execute bit set.
pub fn sniff(path: &Path, mode: Mode) -> SniffVerdict {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            trace!(path = %path.display(), %err, "open failed during content check");
            // Set-uid/set-gid binaries are often unreadable on purpose.
            if mode.intersects(mode::SETID) {
                return SniffVerdict::keep();
            }
            return SniffVerdict {
                clear_exec: false,
                findings: vec![Finding::warning(path, "could not be read.")],
            };
        }
    };

    let mut buf = [0u8; 4];
    if read_prefix(&mut file, &mut buf) < buf.len() {
        return SniffVerdict {
            clear_exec: true,
            findings: vec![Finding::warning(
                path,
                "too small to be a valid executable file.",
            )],
        };
    }

    classify(path, Prefix::new(buf))
}

fn read_prefix(file: &mut File, buf: &mut [u8; 4]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    filled
}

/// Classify a four-byte prefix. Pure; all I/O happens in [`sniff`].
pub fn classify(path: &Path, prefix: Prefix) -> SniffVerdict {
    let bytes = prefix.bytes();
    let mut findings = Vec::new();

    // #!-style scripts. A shebang not followed by a slash is suspicious but
    // does not short-circuit the remaining signatures.
    if bytes[0] == b'#' && bytes[1] == b'!' {
        if bytes[2] == b'/' || (bytes[2] == b' ' && bytes[3] == b'/') {
            return SniffVerdict::keep();
        }
        findings.push(Finding::warning(path, "#! without a following slash."));
    }

    for signature in SIGNATURES {
        if (signature.matches)(prefix) {
            trace!(path = %path.display(), signature = signature.name, "recognized executable");
            return SniffVerdict {
                clear_exec: false,
                findings,
            };
        }
    }

    // Libtool archives routinely carry a spurious executable bit; their
    // first line looks like "# libfoo.la - a libtool library file".
    if path.as_os_str().as_encoded_bytes().ends_with(b".la") && bytes[..2] == *b"# " {
        return SniffVerdict {
            clear_exec: false,
            findings,
        };
    }

    findings.push(Finding::warning(
        path,
        "executable bit is set on non-executable file.",
    ));
    SniffVerdict {
        clear_exec: true,
        findings,
    }
}
