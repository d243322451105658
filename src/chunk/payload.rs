//! Payload slicing and blob framing.
//!
//! Splitting never copies: [`split_payload`] hands back borrowed slices and
//! only [`encode_chunk`] allocates the final blob.

use std::num::NonZeroUsize;

use bytes::{BufMut, Bytes, BytesMut};

use super::{ChunkHeader, HEADER_LEN, HeaderError, decode_header};

/// Most chunks a single set can hold; the `count` byte tops out at 255.
pub const MAX_CHUNKS: usize = u8::MAX as usize + 1;

/// Number of chunks needed to carry `size` bytes.
///
/// A zero-length input still occupies one (empty) chunk.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use chunkpost::chunk::chunk_count_for;
/// let cap = NonZeroUsize::new(100).expect("non-zero");
/// assert_eq!(chunk_count_for(0, cap), 1);
/// assert_eq!(chunk_count_for(100, cap), 1);
/// assert_eq!(chunk_count_for(101, cap), 2);
/// ```
#[must_use]
pub fn chunk_count_for(size: usize, max_chunk_payload: NonZeroUsize) -> usize {
    size.div_ceil(max_chunk_payload.get()).max(1)
}

/// Split `data` into ordered slices of at most `max_chunk_payload` bytes.
///
/// Concatenating the slices in order reproduces `data` exactly. An empty
/// input yields a single empty slice so it still maps onto one chunk.
#[must_use]
pub fn split_payload(data: &[u8], max_chunk_payload: NonZeroUsize) -> Vec<&[u8]> {
    if data.is_empty() {
        return vec![data];
    }
    data.chunks(max_chunk_payload.get()).collect()
}

/// Frame `payload` behind `header`.
#[must_use]
pub fn encode_chunk(header: ChunkHeader, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_slice(&header.to_bytes());
    buf.put_slice(payload);
    buf.freeze()
}

/// Separate a chunk blob into its header and payload.
///
/// # Errors
///
/// Propagates any [`HeaderError`] raised by [`decode_header`].
pub fn decode_chunk(blob: &[u8]) -> Result<(ChunkHeader, &[u8]), HeaderError> {
    let header = decode_header(blob)?;
    let payload = blob.get(HEADER_LEN..).unwrap_or_default();
    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkIndex;

    fn cap(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero cap") }

    #[test]
    fn round_trip_chunk_blob() {
        let header = ChunkHeader::new(ChunkIndex::new(2), ChunkIndex::new(4));
        let payload = [9_u8, 8, 7];

        let blob = encode_chunk(header, &payload);
        assert_eq!(&blob[..HEADER_LEN], &[0xDF, 0x00, 2, 4]);

        let (decoded, body) = decode_chunk(&blob).expect("decode chunk");
        assert_eq!(decoded, header);
        assert_eq!(body, payload);
    }

    #[test]
    fn header_only_blob_has_empty_payload() {
        let header = ChunkHeader::new(ChunkIndex::zero(), ChunkIndex::zero());
        let blob = encode_chunk(header, &[]);
        let (_, body) = decode_chunk(&blob).expect("decode chunk");
        assert!(body.is_empty());
    }

    #[test]
    fn split_respects_cap_and_order() {
        let data: Vec<u8> = (0..10).collect();
        let slices = split_payload(&data, cap(4));
        assert_eq!(slices, vec![&data[0..4], &data[4..8], &data[8..10]]);
        assert_eq!(slices.len(), chunk_count_for(data.len(), cap(4)));
    }

    #[test]
    fn split_of_empty_input_is_one_empty_slice() {
        let slices = split_payload(&[], cap(100));
        assert_eq!(slices.len(), 1);
        assert!(slices.first().is_some_and(|slice| slice.is_empty()));
        assert_eq!(chunk_count_for(0, cap(100)), 1);
    }

    #[test]
    fn max_chunks_matches_header_range() {
        assert_eq!(MAX_CHUNKS, 256);
        assert_eq!(ChunkIndex::try_from(MAX_CHUNKS - 1), Ok(ChunkIndex::MAX));
        assert!(ChunkIndex::try_from(MAX_CHUNKS).is_err());
    }
}
