//! Round-trip properties of the tile codecs and the metadata table

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use artmerge_formats::index::{build_entries, parse_entries};
use artmerge_formats::land::LAND_ENCODED_SIZE;
use artmerge_formats::{
    IndexEntry, LandCodec, MetadataTable, PRESENCE_BIT, Raster, StaticCodec, TileCodec,
    TileDataFormat,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Raster whose cells are either empty or carry the presence bit
fn static_raster() -> impl Strategy<Value = Raster> {
    (1u16..24, 1u16..24).prop_flat_map(|(width, height)| {
        let cells = usize::from(width) * usize::from(height);
        prop::collection::vec(
            prop_oneof![Just(0u16), (0u16..0x7FFF).prop_map(|p| (p + 1) | PRESENCE_BIT)],
            cells,
        )
        .prop_map(move |pixels| Raster::from_pixels(width, height, pixels).unwrap())
    })
}

/// Rasters large enough that some rows start past the 16-bit lookup range
fn large_static_raster() -> impl Strategy<Value = Raster> {
    (150u16..320, 120u16..260).prop_flat_map(|(width, height)| {
        let cells = usize::from(width) * usize::from(height);
        prop::collection::vec(prop_oneof![Just(0u16), Just(0x801Fu16)], cells)
            .prop_map(move |pixels| Raster::from_pixels(width, height, pixels).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn large_static_encodability_matches_encoder(raster in large_static_raster()) {
        match StaticCodec::encode(&raster) {
            Ok(encoded) => {
                prop_assert!(StaticCodec::check_encodable(&raster).is_ok());
                prop_assert_eq!(StaticCodec::decode(&encoded).unwrap(), raster);
            }
            Err(_) => prop_assert!(StaticCodec::check_encodable(&raster).is_err()),
        }
    }
}

proptest! {
    #[test]
    fn land_decode_encode_decode(words in prop::collection::vec(0u16..0x8000, 1012)) {
        let data: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let raster = LandCodec::decode(&data).unwrap();
        let encoded = LandCodec::encode(&raster).unwrap();
        prop_assert_eq!(&encoded, &data);
        prop_assert_eq!(LandCodec::decode(&encoded).unwrap(), raster);
    }

    #[test]
    fn static_encode_decode(raster in static_raster()) {
        let encoded = StaticCodec::encode(&raster).unwrap();
        prop_assert_eq!(StaticCodec::decode(&encoded).unwrap(), raster);
        prop_assert!(StaticCodec::verify_round_trip(&encoded).unwrap());
    }

    #[test]
    fn index_entries_round_trip(raw in prop::collection::vec(any::<(i32, i32, i32)>(), 0..64)) {
        let entries: Vec<IndexEntry> = raw
            .into_iter()
            .map(|(offset, length, extra)| IndexEntry::new(offset, length, extra))
            .collect();
        let bytes = build_entries(&entries).unwrap();
        prop_assert_eq!(bytes.len(), entries.len() * IndexEntry::SIZE);
        prop_assert_eq!(parse_entries(&bytes).unwrap(), entries);
    }
}

#[test]
fn static_single_pixel_scenario() {
    let words: [u16; 10] = [1234, 0, 3, 1, 0, 1, 1, 0x7C00, 0, 0];
    let data: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    let raster = StaticCodec::decode(&data).unwrap();
    assert_eq!(raster.width(), 3);
    assert_eq!(raster.height(), 1);
    assert_eq!(raster.pixel(0, 0), Some(0));
    assert_eq!(raster.pixel(1, 0), Some(0xFC00));
    assert_eq!(raster.pixel(2, 0), Some(0));
    assert!(StaticCodec::verify_round_trip(&data).unwrap());
}

#[test]
fn static_dense_and_sparse_rows() {
    let mut pixels = vec![0u16; 8 * 3];
    for cell in &mut pixels[0..8] {
        *cell = 0x8421;
    }
    pixels[8 + 1] = 0x8001;
    pixels[8 + 6] = 0x8002;
    let raster = Raster::from_pixels(8, 3, pixels).unwrap();
    let encoded = StaticCodec::encode(&raster).unwrap();
    assert_eq!(StaticCodec::decode(&encoded).unwrap(), raster);
}

#[test]
fn solid_land_block_encodes_full_footprint() {
    let raster = Raster::from_pixels(44, 44, vec![0x801F; 44 * 44]).unwrap();
    let encoded = LandCodec::encode(&raster).unwrap();
    assert_eq!(encoded.len(), LAND_ENCODED_SIZE);
    assert!(encoded.chunks_exact(2).all(|w| w == [0x1F, 0x00]));
}

#[test]
fn metadata_round_trip_with_names() {
    let format = TileDataFormat::Legacy;
    let mut data = vec![0u8; format.land_section_size() + format.item_group_size() + 3];

    // land record 0: flags, texture, name with bytes after the terminator
    data[4..8].copy_from_slice(&0x0000_0040u32.to_le_bytes());
    data[8..10].copy_from_slice(&0x0042u16.to_le_bytes());
    data[10..14].copy_from_slice(b"rock");
    data[20] = 0x7A;

    let table = MetadataTable::parse(&data, format).unwrap();
    let land = table.land(0).unwrap();
    assert_eq!(land.name(), "rock");
    assert_eq!(land.texture_id, 0x42);
    assert_eq!(table.item_count(), 32);
    assert_eq!(table.trailing(), &[0, 0, 0]);

    let mut rebuilt = table.clone();
    let mut record = land.clone();
    record.set_name("rock");
    rebuilt.set_land(0, record);
    assert_eq!(rebuilt.build().unwrap(), data);
}
