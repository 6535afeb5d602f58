pub mod drift;
pub mod dust;
pub mod orbit;
pub mod rising;
pub mod spiral;
pub mod stars;

use bytemuck::{Pod, Zeroable};
use rand::Rng;

pub use drift::{DriftParams, DriftPetal, PetalDrift};
pub use dust::{BackgroundDust, DustParams};
pub use orbit::{ORBIT_STEP, OrbitGroup, OrbitParams, OrbitParticle};
pub use rising::{RisingField, RisingParams};
pub use spiral::{PetalSpiral, SpiralParams};
pub use stars::{StarParams, StarShell};

/// One billboarded particle as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

/// `0xRRGGBB` to an sRGB `[r, g, b, a]`.
pub const fn hex_color(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Uniform draw in `[lo, hi)`, or `lo` when the range is empty.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.gen_range(0.0f32..1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex_color(0x000000, 0.5), [0.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = jitter(&mut rng, -2.0, 3.0);
            assert!((-2.0..3.0).contains(&v));
        }
        assert_eq!(jitter(&mut rng, 1.5, 1.5), 1.5);
    }

    #[test]
    fn test_instance_layout_is_32_bytes() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
    }
}
