//! Packed lightmap coordinates.
//!
//! A lightmap coordinate packs the sky level in bits 20.. and the block
//! level in bits 4..20, each as a level times 16.

const SKY_MASK: u32 = 0xfff0_0000;
const BLOCK_MASK: u32 = 0x000f_ffff;

/// Pack sky and block light levels into a lightmap coordinate.
#[inline]
#[must_use]
pub const fn pack_lightmap(sky: u8, block: u8) -> u32 {
    ((sky as u32) << 20) | ((block as u32) << 4)
}

/// Block light level stored in a lightmap coordinate.
#[inline]
#[must_use]
pub const fn block_level(lightmap: u32) -> u32 {
    (lightmap >> 4) & 0xffff
}

/// Sky light level stored in a lightmap coordinate.
#[inline]
#[must_use]
pub const fn sky_level(lightmap: u32) -> u32 {
    (lightmap >> 20) & 0xffff
}

/// Merge a dynamic light level into a lightmap coordinate.
///
/// The block field is replaced only when the dynamic level is brighter. The
/// fractional part of the level is kept in the low bits of the field.
#[must_use]
pub fn lightmap_with_dynamic_light(level: f64, lightmap: u32) -> u32 {
    if level <= 0.0 || level <= f64::from(block_level(lightmap)) {
        return lightmap;
    }

    let luminance = (level * 16.0) as u32;
    (lightmap & SKY_MASK) | (luminance & BLOCK_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brighter_dynamic_light_replaces_block_level() {
        let lightmap = pack_lightmap(12, 3);
        let merged = lightmap_with_dynamic_light(9.5, lightmap);
        assert_eq!(sky_level(merged), 12);
        assert_eq!(block_level(merged), 9);
        assert_eq!(merged & BLOCK_MASK, 152);
    }

    #[test]
    fn dimmer_dynamic_light_is_ignored() {
        let lightmap = pack_lightmap(15, 11);
        assert_eq!(lightmap_with_dynamic_light(10.0, lightmap), lightmap);
        assert_eq!(lightmap_with_dynamic_light(11.0, lightmap), lightmap);
        assert_eq!(lightmap_with_dynamic_light(0.0, pack_lightmap(0, 0)), 0);
    }
}
