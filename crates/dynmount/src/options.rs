//! Mount option tokens.
//!
//! Configuration writes mount options the way `mount(8)` does: a list of
//! tokens such as `ro`, `nosuid` or `mode=0755`. Tokens that name a kernel
//! mount flag become [`MsFlags`]; the rest is filesystem data and keeps its
//! relative order.

use nix::mount::MsFlags;

/// What a flag token does to the accumulated flags.
#[derive(Debug, Clone, Copy)]
enum FlagOp {
    Set(MsFlags),
    Clear(MsFlags),
}

/// Known flag tokens.
const FLAG_TOKENS: &[(&str, FlagOp)] = &[
    ("ro", FlagOp::Set(MsFlags::MS_RDONLY)),
    ("rw", FlagOp::Clear(MsFlags::MS_RDONLY)),
    ("nosuid", FlagOp::Set(MsFlags::MS_NOSUID)),
    ("suid", FlagOp::Clear(MsFlags::MS_NOSUID)),
    ("nodev", FlagOp::Set(MsFlags::MS_NODEV)),
    ("dev", FlagOp::Clear(MsFlags::MS_NODEV)),
    ("noexec", FlagOp::Set(MsFlags::MS_NOEXEC)),
    ("exec", FlagOp::Clear(MsFlags::MS_NOEXEC)),
    ("sync", FlagOp::Set(MsFlags::MS_SYNCHRONOUS)),
    ("async", FlagOp::Clear(MsFlags::MS_SYNCHRONOUS)),
    ("dirsync", FlagOp::Set(MsFlags::MS_DIRSYNC)),
    ("remount", FlagOp::Set(MsFlags::MS_REMOUNT)),
    ("mand", FlagOp::Set(MsFlags::MS_MANDLOCK)),
    ("nomand", FlagOp::Clear(MsFlags::MS_MANDLOCK)),
    ("noatime", FlagOp::Set(MsFlags::MS_NOATIME)),
    ("atime", FlagOp::Clear(MsFlags::MS_NOATIME)),
    ("nodiratime", FlagOp::Set(MsFlags::MS_NODIRATIME)),
    ("diratime", FlagOp::Clear(MsFlags::MS_NODIRATIME)),
    ("relatime", FlagOp::Set(MsFlags::MS_RELATIME)),
    ("norelatime", FlagOp::Clear(MsFlags::MS_RELATIME)),
    ("strictatime", FlagOp::Set(MsFlags::MS_STRICTATIME)),
    ("nostrictatime", FlagOp::Clear(MsFlags::MS_STRICTATIME)),
    ("silent", FlagOp::Set(MsFlags::MS_SILENT)),
    ("loud", FlagOp::Clear(MsFlags::MS_SILENT)),
    ("rbind", FlagOp::Set(MsFlags::MS_REC)),
    // The executor always adds MS_BIND.
    ("bind", FlagOp::Set(MsFlags::empty())),
];

/// Result of splitting option tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOptions {
    /// Flags named by the tokens.
    pub flags: MsFlags,
    /// Remaining tokens, in their original order.
    pub data: Vec<String>,
}

impl Default for ParsedOptions {
    fn default() -> Self {
        Self {
            flags: MsFlags::empty(),
            data: Vec::new(),
        }
    }
}

/// Split mount option tokens into kernel flags and filesystem data.
///
/// Tokens are applied left to right, so `["ro", "rw"]` leaves the mount
/// writable. Duplicated data tokens are kept as-is.
#[must_use]
pub fn parse_mount_options<S: AsRef<str>>(tokens: &[S]) -> ParsedOptions {
    let mut parsed = ParsedOptions::default();

    for token in tokens {
        let token = token.as_ref();
        match flag_op(token) {
            Some(FlagOp::Set(flag)) => parsed.flags.insert(flag),
            Some(FlagOp::Clear(flag)) => parsed.flags.remove(flag),
            None => parsed.data.push(token.to_string()),
        }
    }

    tracing::trace!(
        flags = ?parsed.flags,
        data = ?parsed.data,
        "Parsed mount options"
    );
    parsed
}

fn flag_op(token: &str) -> Option<FlagOp> {
    FLAG_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, op)| *op)
}
