//! Header verification and payload concatenation.

use super::{HeaderConflict, ReassemblyError};
use crate::chunk::{ChunkHeader, ChunkIndex, decode_chunk};

/// Rebuild a file from chunk blobs given in any order.
///
/// Buffers shorter than a header or with the wrong magic are dropped. The
/// rest are sorted by index, checked for agreement on the set size and for
/// repeated positions, and their payloads concatenated.
///
/// # Errors
///
/// Returns [`ReassemblyError::InconsistentHeaders`] when headers contradict
/// each other and [`ReassemblyError::MissingChunks`] when the surviving
/// chunks do not cover `0..=count`, including when none survive.
///
/// # Examples
///
/// ```
/// use chunkpost::{
///     chunk::{ChunkHeader, ChunkIndex, encode_chunk},
///     reassembly::reassemble,
/// };
///
/// let last = ChunkIndex::new(1);
/// let tail = encode_chunk(ChunkHeader::new(ChunkIndex::new(1), last), b"world");
/// let head = encode_chunk(ChunkHeader::new(ChunkIndex::new(0), last), b"hello ");
/// assert_eq!(reassemble(&[tail, head]).expect("complete set"), b"hello world");
/// ```
pub fn reassemble<B: AsRef<[u8]>>(buffers: &[B]) -> Result<Vec<u8>, ReassemblyError> {
    let mut chunks: Vec<(ChunkHeader, &[u8])> = buffers
        .iter()
        .enumerate()
        .filter_map(|(position, buffer)| match decode_chunk(buffer.as_ref()) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                log::debug!("discarding buffer {position}: {e}");
                None
            }
        })
        .collect();
    chunks.sort_by_key(|(header, _)| header.index());

    let Some(count) = chunks.first().map(|(header, _)| header.count()) else {
        return Err(ReassemblyError::MissingChunks {
            missing: Vec::new(),
            expected: 0,
        });
    };

    let mut output = Vec::with_capacity(chunks.iter().map(|(_, payload)| payload.len()).sum());
    let mut previous: Option<ChunkIndex> = None;
    for (header, payload) in &chunks {
        if !header.is_consistent() {
            return Err(HeaderConflict::IndexBeyondCount {
                index: header.index(),
                count: header.count(),
            }
            .into());
        }
        if header.count() != count {
            return Err(HeaderConflict::CountMismatch {
                expected: count,
                found: header.count(),
            }
            .into());
        }
        if previous == Some(header.index()) {
            return Err(HeaderConflict::DuplicateIndex {
                index: header.index(),
            }
            .into());
        }
        previous = Some(header.index());
        output.extend_from_slice(payload);
    }

    let expected = count.as_usize() + 1;
    if chunks.len() != expected {
        let missing = (0..=count.get())
            .map(ChunkIndex::new)
            .filter(|index| chunks.binary_search_by_key(index, |(h, _)| h.index()).is_err())
            .collect();
        return Err(ReassemblyError::MissingChunks { missing, expected });
    }
    Ok(output)
}
