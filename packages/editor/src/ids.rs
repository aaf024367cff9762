use crc32fast::Hasher;

/// Derive a short stable seed from a session name using CRC32
pub fn session_seed(session: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(session.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for new sections and blocks.
///
/// Ids look like `section-<seed>-<n>`. The counter only moves forward, and
/// candidates the document already uses are skipped, so two calls never
/// return the same id within one engine.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(session: &str) -> Self {
        Self::from_seed(session_seed(session))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Next id with this prefix that `taken` does not reject
    pub fn next_id(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            self.count += 1;
            let candidate = format!("{}-{}-{}", prefix, self.seed, self.count);
            if !taken(&candidate) {
                return candidate;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_seed_is_stable() {
        assert_eq!(session_seed("page"), session_seed("page"));
        assert_ne!(session_seed("page"), session_seed("other"));
    }

    #[test]
    fn test_sequential_ids_are_distinct() {
        let mut gen = IdGenerator::new("test");
        let ids: HashSet<_> = (0..100).map(|_| gen.next_id("block", |_| false)).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_taken_ids_are_skipped() {
        let mut gen = IdGenerator::from_seed("abc".to_string());
        let id = gen.next_id("section", |candidate| candidate == "section-abc-1");
        assert_eq!(id, "section-abc-2");
        assert_eq!(gen.seed(), "abc");
    }
}
