use derive_new::new;

use hyperlane_core::{IsmError, IsmResult};

/// Bytes used to store one member of the (start, end) range tuple
const METADATA_RANGE_SIZE: usize = 4;

/// Metadata for the member at `index` of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct SubModuleMetadata {
    /// Position of the member in the aggregation's module list
    pub index: usize,
    /// The member's own metadata
    pub metadata: Vec<u8>,
}

/// Pack member metadata for an aggregation of `ism_count` members.
///
/// Members without an entry get a zero range and are skipped by the
/// aggregation.
pub fn format_metadata(metadatas: &mut [SubModuleMetadata], ism_count: usize) -> Vec<u8> {
    fn encode_byte_index(i: usize) -> [u8; 4] {
        (i as u32).to_be_bytes()
    }
    let range_tuples_size = METADATA_RANGE_SIZE * 2 * ism_count;
    //  Format of metadata:
    //  [????:????] Metadata start/end uint32 ranges, packed as uint64
    //  [????:????] ISM metadata, packed encoding
    let mut buffer = vec![0; range_tuples_size];
    for SubModuleMetadata { index, metadata } in metadatas.iter_mut() {
        let range_start = buffer.len();
        buffer.append(metadata);
        let range_end = buffer.len();

        let encoded_range_start = METADATA_RANGE_SIZE * 2 * (*index);
        buffer.splice(
            encoded_range_start..(encoded_range_start + METADATA_RANGE_SIZE * 2),
            [encode_byte_index(range_start), encode_byte_index(range_end)].concat(),
        );
    }
    buffer
}

fn read_index(metadata: &[u8], offset: usize, index: usize) -> IsmResult<usize> {
    let bytes = metadata
        .get(offset..offset + METADATA_RANGE_SIZE)
        .ok_or(IsmError::MetadataOutOfBounds(index))?;
    let mut word = [0u8; METADATA_RANGE_SIZE];
    word.copy_from_slice(bytes);
    Ok(u32::from_be_bytes(word) as usize)
}

fn metadata_range(metadata: &[u8], index: usize) -> IsmResult<(usize, usize)> {
    let offset = METADATA_RANGE_SIZE * 2 * index;
    let start = read_index(metadata, offset, index)?;
    let end = read_index(metadata, offset + METADATA_RANGE_SIZE, index)?;
    Ok((start, end))
}

/// The metadata for the member at `index`, `None` if it has none.
pub fn metadata_at(metadata: &[u8], index: usize) -> IsmResult<Option<&[u8]>> {
    let (start, end) = metadata_range(metadata, index)?;
    if start == 0 {
        return Ok(None);
    }
    metadata
        .get(start..end)
        .map(Some)
        .ok_or(IsmError::MetadataOutOfBounds(index))
}
