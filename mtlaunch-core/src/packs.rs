/// Pack every launch needs, added when the launcher is created.
pub const BASE_PACK: &str = "base";

/// Games compiled into the engine itself; they have no pack to fetch.
pub const BUILTIN_GAMES: &[&str] = &["minetest_game", "devtest"];

pub fn is_builtin_game(name: &str) -> bool {
    BUILTIN_GAMES.contains(&name)
}

pub fn fetched_condition(name: &str) -> String {
    format!("fetched:{name}")
}

pub fn installed_condition(name: &str) -> String {
    format!("installed:{name}")
}

/// Where a pack is served from: `<packs_dir>/<name>.pack`.
pub fn pack_url(packs_dir: &str, name: &str) -> String {
    format!("{}/{name}.pack", packs_dir.trim_end_matches('/'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackStatus {
    NotAdded,
    /// Added, but not installed yet (still fetching or waiting on the module).
    Downloading,
    Installed,
}

impl PackStatus {
    /// Numeric form exposed to the embedding page.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAdded => 0,
            Self::Downloading => 1,
            Self::Installed => 2,
        }
    }
}

/// Bytes of one pack, kept as received until installation.
#[derive(Debug, Default)]
pub struct PackBuffer {
    chunks: Vec<Vec<u8>>,
    received: usize,
}

impl PackBuffer {
    pub fn push(&mut self, chunk: Vec<u8>) {
        self.received += chunk.len();
        self.chunks.push(chunk);
    }

    pub fn received(&self) -> usize {
        self.received
    }

    /// Concatenate and release the received chunks.
    pub fn take(&mut self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.received);
        for chunk in self.chunks.drain(..) {
            data.extend_from_slice(&chunk);
        }
        self.received = 0;
        data
    }
}

/// Byte totals across every pack that announced its length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadTotals {
    pub downloaded: u64,
    pub needed: u64,
}

impl DownloadTotals {
    pub fn add(&mut self, downloaded: u64, needed: u64) {
        self.downloaded += downloaded;
        self.needed += needed;
    }

    /// Rounded completion percentage, 0 when nothing is expected.
    pub fn percent(&self) -> u32 {
        if self.needed == 0 {
            return 0;
        }
        ((100 * self.downloaded) as f64 / self.needed as f64).round() as u32
    }

    /// A progress bar is only shown while something is outstanding.
    pub fn in_progress(&self) -> bool {
        self.downloaded != self.needed
    }
}
