//! Bounded full-ledger corpus for reanalysis.
//!
//! Records are joined oldest to newest, each under a `[#<seq>]` header.
//! Over the bound, whole oldest records go first, then the oldest
//! characters of the oldest remaining record. Newer evidence is kept.

use wsd_core::entities::EvidenceRecord;
use wsd_core::responses::TruncationNotice;

const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub text: String,
    pub records: u32,
    pub original_chars: u64,
    pub retained_chars: u64,
    pub dropped_records: u32,
}

impl Corpus {
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.retained_chars < self.original_chars
    }

    #[must_use]
    pub const fn notice(&self) -> Option<TruncationNotice> {
        if self.is_truncated() {
            Some(TruncationNotice {
                original_chars: self.original_chars,
                retained_chars: self.retained_chars,
                dropped_records: self.dropped_records,
            })
        } else {
            None
        }
    }
}

fn char_len(s: &str) -> u64 {
    s.chars().count() as u64
}

/// Keep the last `n` characters of `s`.
fn tail_chars(s: &str, n: u64) -> &str {
    let total = char_len(s);
    if n >= total {
        return s;
    }
    let skip = usize::try_from(total - n).unwrap_or(usize::MAX);
    s.char_indices().nth(skip).map_or("", |(i, _)| &s[i..])
}

#[must_use]
pub fn build_corpus(records: &[EvidenceRecord], max_chars: u64) -> Corpus {
    let blocks: Vec<(String, &str)> = records
        .iter()
        .map(|r| (format!("[#{}]\n", r.sequence_index), r.raw_text.as_str()))
        .collect();
    let block_len = |(header, body): &(String, &str)| char_len(header) + char_len(body);
    let sep_len = char_len(SEPARATOR);

    let original_chars = blocks.iter().map(block_len).sum::<u64>()
        + sep_len * (blocks.len().saturating_sub(1) as u64);

    // A record whose whole body would be cut goes with its header and
    // trailing separator, so every header left in the text is complete.
    let mut start = 0;
    let mut excess = original_chars.saturating_sub(max_chars);
    while excess > 0 && start + 1 < blocks.len() && excess >= char_len(blocks[start].1) {
        excess = excess.saturating_sub(block_len(&blocks[start]) + sep_len);
        start += 1;
    }

    let mut parts: Vec<String> = Vec::with_capacity(blocks.len() - start);
    for (i, (header, body)) in blocks[start..].iter().enumerate() {
        if i == 0 && excess > 0 {
            let body_len = char_len(body);
            let part = format!("{header}{}", tail_chars(body, body_len.saturating_sub(excess)));
            parts.push(part);
        } else {
            parts.push(format!("{header}{body}"));
        }
    }
    let mut text = parts.join(SEPARATOR);
    // A bound smaller than the newest header cuts into the header itself.
    if char_len(&text) > max_chars {
        text = tail_chars(&text, max_chars).to_string();
    }

    Corpus {
        retained_chars: char_len(&text),
        text,
        records: u32::try_from(records.len()).unwrap_or(u32::MAX),
        original_chars,
        dropped_records: u32::try_from(start).unwrap_or(u32::MAX),
    }
}
