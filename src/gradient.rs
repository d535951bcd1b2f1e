//! Gradients computed on the host.
//!
//! The booster reserves a gradient opcode but the driver never uses it. Instead
//! each visible LED gets its own fused `SETRGB` + `SETLED` packet. A gradient may
//! start before LED 0 or end past the last LED; only the visible part is sent,
//! with colors interpolated over the whole conceptual range.

use core::iter::FusedIterator;

use smart_leds::RGB8;

use crate::command::Packet;

/// Iterator over the packets that paint a gradient.
///
/// Built by [`Session::gradient`](crate::Session::gradient).
///
/// Channels are interpolated with truncating integer division, so the result
/// steps the same way the booster's own 8-bit math would.
///
/// Positions are kept in `i64` rather than bytes. Up to 255 LEDs wide the result
/// matches byte arithmetic exactly; wider gradients keep their true slope
/// instead of wrapping, and a gradient over the full 256-LED strip terminates.
#[derive(Clone, Debug)]
pub struct Gradient {
    start: i64,
    steps: i64,
    from: RGB8,
    to: RGB8,
    next_step: i64,
    last_step: i64,
    color_only: Option<RGB8>,
}

impl Gradient {
    /// `None` when `start > end` or the gradient starts past `last_index`.
    pub(crate) fn new(start: i32, end: i32, from: RGB8, to: RGB8, last_index: u8) -> Option<Self> {
        let last_index = i64::from(last_index);
        let (start, end) = (i64::from(start), i64::from(end));
        if start > end || start > last_index {
            return None;
        }

        let steps = end - start;
        if steps == 0 {
            // Nothing to interpolate: stage the color and address nothing.
            return Some(Self {
                start,
                steps,
                from,
                to,
                next_step: 1,
                last_step: 0,
                color_only: Some(from),
            });
        }

        let first_step = (-start).max(0);
        let last_step = steps - (end - last_index).max(0);
        Some(Self {
            start,
            steps,
            from,
            to,
            next_step: first_step,
            last_step,
            color_only: None,
        })
    }

    fn color_at(&self, step: i64) -> RGB8 {
        RGB8::new(
            lerp(self.from.r, self.to.r, step, self.steps),
            lerp(self.from.g, self.to.g, step, self.steps),
            lerp(self.from.b, self.to.b, step, self.steps),
        )
    }

    fn remaining(&self) -> usize {
        let span = (self.last_step - self.next_step + 1).max(0);
        let span = usize::try_from(span).unwrap_or(usize::MAX);
        span + usize::from(self.color_only.is_some())
    }
}

impl Iterator for Gradient {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        if let Some(color) = self.color_only.take() {
            return Some(Packet::set_rgb(color));
        }
        if self.next_step > self.last_step {
            return None;
        }
        let step = self.next_step;
        self.next_step += 1;
        let index = u8::try_from(self.start + step).ok()?;
        Some(Packet::set_rgb_led(self.color_at(step), index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Gradient {}

impl FusedIterator for Gradient {}

/// `from + (to - from) * step / steps`, truncating toward zero.
fn lerp(from: u8, to: u8, step: i64, steps: i64) -> u8 {
    let (from, to) = (i64::from(from), i64::from(to));
    let value = from + (to - from) * step / steps;
    // 0 <= step <= steps keeps the value between `from` and `to`.
    u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    const BLACK: RGB8 = RGB8::new(0, 0, 0);
    const WHITE: RGB8 = RGB8::new(255, 255, 255);

    fn bytes(gradient: Gradient) -> Vec<Vec<u8>> {
        gradient.map(|packet| packet.as_bytes().to_vec()).collect()
    }

    #[test]
    fn clips_both_ends_to_the_strip() {
        let gradient = Gradient::new(-2, 5, BLACK, WHITE, 3).expect("gradient is visible");
        assert_eq!(gradient.len(), 4);
        assert_eq!(
            bytes(gradient),
            [
                [0xA1, 72, 72, 72, 0xA4, 0],
                [0xA1, 109, 109, 109, 0xA4, 1],
                [0xA1, 145, 145, 145, 0xA4, 2],
                [0xA1, 182, 182, 182, 0xA4, 3],
            ]
        );
    }

    #[test]
    fn fully_visible_gradient_hits_both_endpoints() {
        let from = RGB8::new(10, 200, 0);
        let to = RGB8::new(20, 100, 255);
        let packets = bytes(Gradient::new(0, 2, from, to, 9).expect("gradient is visible"));
        assert_eq!(
            packets,
            [
                [0xA1, 10, 200, 0, 0xA4, 0],
                [0xA1, 15, 150, 127, 0xA4, 1],
                [0xA1, 20, 100, 255, 0xA4, 2],
            ]
        );
    }

    #[test]
    fn descending_channels_truncate_toward_zero() {
        // 255 + (0 - 255) * 1 / 3 = 255 - 85 = 170
        let packets = bytes(Gradient::new(0, 3, WHITE, BLACK, 9).expect("gradient is visible"));
        assert_eq!(packets[1], [0xA1, 170, 170, 170, 0xA4, 1]);
    }

    #[test]
    fn zero_width_gradient_only_stages_the_color() {
        let packets = bytes(Gradient::new(4, 4, WHITE, BLACK, 9).expect("gradient is accepted"));
        assert_eq!(packets, [[0xA1_u8, 255, 255, 255].to_vec()]);
    }

    #[test]
    fn rejected_gradients() {
        assert!(Gradient::new(5, 4, BLACK, WHITE, 9).is_none());
        assert!(Gradient::new(10, 20, BLACK, WHITE, 9).is_none());
    }

    #[test]
    fn gradient_entirely_before_the_strip_sends_nothing() {
        let gradient = Gradient::new(-10, -3, BLACK, WHITE, 9).expect("gradient is accepted");
        assert_eq!(gradient.len(), 0);
        assert_eq!(bytes(gradient).len(), 0);
    }

    #[test]
    fn wide_gradients_keep_their_slope() {
        let packets = bytes(Gradient::new(0, 1000, BLACK, WHITE, 9).expect("gradient is visible"));
        assert_eq!(packets.len(), 10);
        assert_eq!(packets[9], [0xA1, 2, 2, 2, 0xA4, 9]);
    }

    #[test]
    fn full_strip_gradient_ends() {
        let packets = bytes(Gradient::new(0, 255, BLACK, WHITE, 255).expect("gradient is visible"));
        assert_eq!(packets.len(), 256);
        assert_eq!(packets[0], [0xA1, 0, 0, 0, 0xA4, 0]);
        assert_eq!(packets[255], [0xA1, 255, 255, 255, 0xA4, 255]);
    }
}
