//! Splits the ordered feed into bounded chunks.

use crate::error::{FeedError, Result};
use crate::record::FeedRecord;

/// A contiguous, ordered slice of the feed applied under one transaction.
pub type Chunk<'a> = &'a [FeedRecord];

/// Partitions `feed` into chunks of at most `chunk_size` records.
///
/// Concatenating the returned chunks reproduces `feed` exactly; only the
/// final chunk may be shorter than `chunk_size`. An empty feed yields no
/// chunks.
pub fn partition(feed: &[FeedRecord], chunk_size: usize) -> Result<Vec<Chunk<'_>>> {
    if chunk_size == 0 {
        return Err(FeedError::InvalidConfiguration(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    Ok(feed.chunks(chunk_size).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(len: usize) -> Vec<FeedRecord> {
        (0..len)
            .map(|i| FeedRecord::delete(&format!("acct-{}", i)))
            .collect()
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let records = feed(3);
        let err = partition(&records, 0).unwrap_err();
        assert!(matches!(err, FeedError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_empty_feed_has_no_chunks() {
        assert!(partition(&[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_concatenation_reproduces_feed() {
        for len in 0..12 {
            let records = feed(len);
            for size in 1..6 {
                let chunks = partition(&records, size).unwrap();
                let joined: Vec<FeedRecord> = chunks.concat();
                assert_eq!(joined, records, "len={} size={}", len, size);

                for (idx, chunk) in chunks.iter().enumerate() {
                    if idx + 1 < chunks.len() {
                        assert_eq!(chunk.len(), size);
                    } else {
                        assert!(!chunk.is_empty() && chunk.len() <= size);
                    }
                }
            }
        }
    }

    #[test]
    fn test_chunk_larger_than_feed() {
        let records = feed(3);
        let chunks = partition(&records, 10).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
    }
}
