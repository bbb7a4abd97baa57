//! PROPERTY-BASED TESTS: packing invariants
//!
//! Uses proptest to check the bit costs and round trips of the packers that
//! state units build their payloads from.

use proptest::prelude::*;
use replica_shared::{BitReader, BitWriter, RangedPacker, StateUnit, VarIntPacker};
use replica_test::PositionUnit;

const HEADING: RangedPacker = RangedPacker::new(-1, 1);
const COUNTER: VarIntPacker = VarIntPacker::new(4, 64);

fn position_strategy() -> impl Strategy<Value = [f32; 3]> {
    prop::array::uniform3(-100.0f32..100.0f32)
}

proptest! {
    /// Every value of a [-1, 1] range costs exactly 2 bits
    #[test]
    fn prop_ranged_values_cost_two_bits(value in -1i64..=1) {
        let mut writer = BitWriter::new();
        HEADING.pack(&mut writer, value);
        prop_assert_eq!(writer.bits_written(), 2);

        let bytes = writer.to_bytes();
        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(HEADING.unpack(&mut reader).unwrap(), value);
    }

    /// Small values take the 4 bit tier, medium ones the 9 bit tier
    #[test]
    fn prop_var_int_tiers(value in 0u64..128) {
        let mut writer = BitWriter::new();
        COUNTER.pack(&mut writer, value);

        let expected = if value <= 7 { 4 } else { 9 };
        prop_assert_eq!(writer.bits_written(), expected);
        prop_assert_eq!(COUNTER.bit_length(value), expected);

        let bytes = writer.to_bytes();
        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(COUNTER.unpack(&mut reader).unwrap(), value);
    }

    /// A position survives a round trip within the packer's precision
    #[test]
    fn prop_position_round_trip(position in position_strategy(), heading in -1i64..=1) {
        let source = PositionUnit::new(position, heading);
        let mut writer = BitWriter::new();
        source.serialize(&mut writer, true).unwrap();
        prop_assert_eq!(writer.bits_written(), source.bit_length());

        let bytes = writer.to_bytes();
        let mut reader = BitReader::new(&bytes);
        let mut target = PositionUnit::new([0.0; 3], 0);
        target.deserialize(&mut reader, true).unwrap();

        prop_assert_eq!(target.heading, heading);
        for (actual, expected) in target.position.iter().zip(position.iter()) {
            prop_assert!((actual - expected).abs() <= source.precision());
        }
    }
}
