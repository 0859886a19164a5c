//! Wire protocol for the segment panel.
//!
//! One frame is five HID writes: packet 0 carries a fixed header followed by
//! the first chunk of the color stream, packets 1-4 carry the rest behind a
//! single zero byte. The stream holds three color bytes per LED, `000000`
//! for every LED whose flag is off.

use crate::render::color::Rgb;

// =============================================================================
// Constants
// =============================================================================

/// Total LED count of the panel.
pub const NUM_LEDS: usize = 100;

/// Fixed header opening every frame (packet 0).
pub const PROTOCOL_HEADER: [u8; 20] = [
    0xda, 0xdb, 0xdc, 0xdd, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xfc, 0x00, 0x00, 0xff,
];

/// Payload bytes per packet, fixed by the device.
pub const PACKET_LENGTH: usize = 64;

/// HID writes per frame.
pub const PACKETS_PER_FRAME: usize = 5;

/// Color bytes per LED.
const BYTES_PER_LED: usize = 3;

/// Color-stream bytes carried by packet 0 after the header.
const FIRST_CHUNK: usize = PACKET_LENGTH - PROTOCOL_HEADER.len();

// The packet sizes are device constants, not derived from the LED count;
// they must agree with it by construction.
const _: () = assert!(
    PROTOCOL_HEADER.len() + NUM_LEDS * BYTES_PER_LED == PACKET_LENGTH * PACKETS_PER_FRAME
);

// =============================================================================
// Serialization
// =============================================================================

/// Serialize one frame into the device's five packets.
///
/// Both slices must be exactly [`NUM_LEDS`] long; the composer guarantees
/// this by construction.
pub fn serialize_frame(leds: &[u8], colors: &[Rgb]) -> Vec<Vec<u8>> {
    debug_assert_eq!(leds.len(), NUM_LEDS);
    debug_assert_eq!(colors.len(), NUM_LEDS);

    let mut stream = Vec::with_capacity(NUM_LEDS * BYTES_PER_LED);
    for (flag, color) in leds.iter().zip(colors) {
        let color = if *flag != 0 { *color } else { Rgb::BLACK };
        stream.extend_from_slice(&[color.r, color.g, color.b]);
    }

    let mut packets = Vec::with_capacity(PACKETS_PER_FRAME);

    let mut packet0 = Vec::with_capacity(PACKET_LENGTH);
    packet0.extend_from_slice(&PROTOCOL_HEADER);
    packet0.extend_from_slice(&stream[..FIRST_CHUNK]);
    packets.push(packet0);

    for chunk in stream[FIRST_CHUNK..].chunks(PACKET_LENGTH) {
        let mut packet = Vec::with_capacity(PACKET_LENGTH + 1);
        packet.push(0x00);
        packet.extend_from_slice(chunk);
        packets.push(packet);
    }

    packets
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn black_colors() -> Vec<Rgb> {
        vec![Rgb::BLACK; NUM_LEDS]
    }

    #[test]
    fn test_all_off_frame() {
        let leds = vec![0u8; NUM_LEDS];
        let colors = vec![
            Rgb {
                r: 0xff,
                g: 0xe0,
                b: 0x00
            };
            NUM_LEDS
        ];
        let packets = serialize_frame(&leds, &colors);

        assert_eq!(packets.len(), PACKETS_PER_FRAME);
        assert_eq!(packets[0].len(), PACKET_LENGTH);
        assert_eq!(&packets[0][..20], &PROTOCOL_HEADER[..]);
        // Colors of unlit LEDs are forced to zero.
        assert!(packets[0][20..].iter().all(|&b| b == 0));

        for packet in &packets[1..] {
            assert_eq!(packet.len(), PACKET_LENGTH + 1);
            assert_eq!(packet[0], 0x00);
            assert!(packet[1..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_lit_led_colors_are_transmitted() {
        let mut leds = vec![0u8; NUM_LEDS];
        leds[0] = 1;
        let mut colors = black_colors();
        colors[0] = Rgb {
            r: 0x12,
            g: 0x34,
            b: 0x56,
        };
        let packets = serialize_frame(&leds, &colors);

        assert_eq!(packets[0][20..23], [0x12, 0x34, 0x56]);
        assert!(packets[0][23..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stream_position_across_packet_boundary() {
        // LED 20 starts at stream offset 60, which lands 16 bytes into
        // packet 1 (packet 0 carries stream bytes 0..44).
        let mut leds = vec![0u8; NUM_LEDS];
        leds[20] = 1;
        let mut colors = black_colors();
        colors[20] = Rgb {
            r: 0xaa,
            g: 0xbb,
            b: 0xcc,
        };
        let packets = serialize_frame(&leds, &colors);

        assert_eq!(packets[1][17..20], [0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn test_all_on_frame_fills_every_packet() {
        let leds = vec![1u8; NUM_LEDS];
        let colors = vec![
            Rgb {
                r: 0xff,
                g: 0xff,
                b: 0xff
            };
            NUM_LEDS
        ];
        let packets = serialize_frame(&leds, &colors);

        assert!(packets[0][20..].iter().all(|&b| b == 0xff));
        for packet in &packets[1..] {
            assert_eq!(packet[0], 0x00);
            assert!(packet[1..].iter().all(|&b| b == 0xff));
        }
    }
}
