//! Colour conversions used by light entities.

/// Convert hue (degrees), saturation and brightness (`0.0..=1.0`) to an
/// 8-bit RGB triple.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn hsb_to_rgb(hue: f64, saturation: f64, brightness: f64) -> [u8; 3] {
    let s = saturation.clamp(0.0, 1.0);
    let v = brightness.clamp(0.0, 1.0);
    if s == 0.0 {
        return [to_byte(v); 3];
    }
    let h = (hue / 360.0).rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    #[allow(clippy::cast_possible_truncation)]
    let (r, g, b) = match sector as i64 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [to_byte(r), to_byte(g), to_byte(b)]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Mired (micro reciprocal degree) to Kelvin, truncated.
#[must_use]
pub fn mired_to_kelvin(mired: f64) -> f64 {
    (1_000_000.0 / mired).floor()
}

/// Kelvin to mired, truncated.
#[must_use]
pub fn kelvin_to_mired(kelvin: f64) -> f64 {
    (1_000_000.0 / kelvin).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_primary_colors() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsb_to_rgb(120.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsb_to_rgb(240.0, 1.0, 1.0), [0, 0, 255]);
    }

    #[test]
    fn should_produce_grey_when_unsaturated() {
        assert_eq!(hsb_to_rgb(300.0, 0.0, 0.5), [128, 128, 128]);
    }

    #[test]
    fn should_wrap_full_turn_hue() {
        assert_eq!(hsb_to_rgb(360.0, 1.0, 1.0), [255, 0, 0]);
    }

    #[test]
    fn should_convert_between_mired_and_kelvin() {
        assert_eq!(mired_to_kelvin(333.0), 3003.0);
        assert_eq!(kelvin_to_mired(2000.0), 500.0);
    }
}
