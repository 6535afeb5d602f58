use std::f32::consts::PI;

use glam::Vec3;

use crate::particles::{OrbitParams, hex_color};

/// Orbit layers around the procedural heart. The last two counter-rotate.
pub const HEART_ORBIT_LAYERS: [OrbitParams; 5] = [
    OrbitParams::new(6.0, 2.0, 150, 1.0, 0xff69b4),
    OrbitParams::new(8.0, 3.0, 120, 0.8, 0xff1493),
    OrbitParams::new(10.0, 4.0, 100, 0.6, 0xff69b4),
    OrbitParams::new(7.0, 2.5, 80, -0.7, 0xffb6c1),
    OrbitParams::new(9.0, 3.5, 60, -0.5, 0xff69b4),
];

pub const TRAIL_ORBIT_LAYERS: [OrbitParams; 3] = [
    OrbitParams::new(6.0, 2.0, 150, 1.0, 0xffc0cb),
    OrbitParams::new(8.0, 3.0, 120, 0.8, 0xff69b4),
    OrbitParams::new(10.0, 4.0, 100, 0.6, 0xff1493),
];

/// Petal models, relative to the asset directory.
pub const PETAL_MODELS: [&str; 4] = ["flower1.obj", "flower2.obj", "flower3.obj", "flower4.obj"];

/// Pink palette; the repeats weight the draw toward the two stronger pinks.
pub const PETAL_COLORS: [u32; 6] = [0xff69b4, 0xff1493, 0xffb6c1, 0xffc0cb, 0xff69b4, 0xff1493];

pub const HEART_MODEL: &str = "heart/Love+OBJ/Love.obj";

pub const DEFAULT_VIEWER_MODEL: &str = "flower1.obj";

pub fn petal_palette(alpha: f32) -> Vec<[f32; 4]> {
    PETAL_COLORS.iter().map(|&c| hex_color(c, alpha)).collect()
}

/// Vertical three-stop gradient drawn behind a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Background {
    pub name: &'static str,
    pub top: u32,
    pub middle: u32,
    pub bottom: u32,
}

impl Background {
    pub const fn solid(name: &'static str, color: u32) -> Self {
        Self {
            name,
            top: color,
            middle: color,
            bottom: color,
        }
    }
}

pub const BACKGROUND_PRESETS: [Background; 4] = [
    Background {
        name: "Romantic Purple-Pink",
        top: 0x581c87,
        middle: 0x831843,
        bottom: 0x000000,
    },
    Background {
        name: "Dreamy Blue-Purple",
        top: 0x1e3a8a,
        middle: 0x581c87,
        bottom: 0x000000,
    },
    Background {
        name: "Warm Orange-Pink",
        top: 0x7c2d12,
        middle: 0x831843,
        bottom: 0x000000,
    },
    Background {
        name: "Starry Black-Gold",
        top: 0x030712,
        middle: 0x09090b,
        bottom: 0x000000,
    },
];

pub const TUNNEL_BACKGROUND: Background = Background::solid("Tunnel", 0x000000);
pub const VIEWER_BACKGROUND: Background = Background::solid("Viewer", 0x1a1a1a);

pub fn background_preset(index: usize) -> Background {
    BACKGROUND_PRESETS[index % BACKGROUND_PRESETS.len()]
}

/// Where the camera starts and how far the user may move it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPreset {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub auto_rotate_speed: f32,
}

pub const HEART_CAMERA: CameraPreset = CameraPreset {
    position: Vec3::new(0.0, 0.0, 20.0),
    target: Vec3::ZERO,
    fov_degrees: 50.0,
    min_distance: 10.0,
    max_distance: 40.0,
    min_polar: PI / 6.0,
    max_polar: PI - PI / 6.0,
    auto_rotate_speed: 0.3,
};

pub const TUNNEL_CAMERA: CameraPreset = CameraPreset {
    position: Vec3::new(0.0, 0.0, 10.0),
    target: Vec3::new(0.0, 0.0, -10.0),
    fov_degrees: 60.0,
    min_distance: 10.0,
    max_distance: 30.0,
    min_polar: PI / 3.0,
    max_polar: PI - PI / 3.0,
    auto_rotate_speed: 0.0,
};

pub const VIEWER_CAMERA: CameraPreset = CameraPreset {
    position: Vec3::new(5.0, 2.0, 5.0),
    target: Vec3::ZERO,
    fov_degrees: 45.0,
    min_distance: 2.0,
    max_distance: 50.0,
    min_polar: 0.05,
    max_polar: PI - 0.05,
    auto_rotate_speed: 1.0,
};

/// Ambient term plus two directional lights. Colors are sRGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: [f32; 3],
    pub key_direction: Vec3,
    pub key_color: [f32; 3],
    pub fill_direction: Vec3,
    pub fill_color: [f32; 3],
}

const fn rgb(hex: u32, intensity: f32) -> [f32; 3] {
    let c = hex_color(hex, 1.0);
    [c[0] * intensity, c[1] * intensity, c[2] * intensity]
}

pub const HEART_LIGHTING: Lighting = Lighting {
    ambient: rgb(0xff69b4, 0.2),
    key_direction: Vec3::new(1.0, 1.0, 1.0),
    key_color: rgb(0xff1493, 0.8),
    fill_direction: Vec3::new(-1.0, -1.0, -1.0),
    fill_color: rgb(0xff69b4, 0.4),
};

pub const TUNNEL_LIGHTING: Lighting = Lighting {
    ambient: rgb(0x404040, 2.5),
    key_direction: Vec3::new(1.0, 1.0, 1.0),
    key_color: rgb(0xffffff, 3.0),
    fill_direction: Vec3::new(0.0, 0.0, 1.0),
    fill_color: [0.0; 3],
};

pub const VIEWER_LIGHTING: Lighting = Lighting {
    ambient: rgb(0x404040, 1.0),
    key_direction: Vec3::new(1.0, 1.0, 1.0),
    key_color: rgb(0xffffff, 1.0),
    fill_direction: Vec3::new(-1.0, 0.5, -1.0),
    fill_color: rgb(0xffffff, 0.3),
};

/// Surface look of a mesh instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub shininess: f32,
    pub specular: f32,
}

impl Material {
    pub const fn phong(color: u32, opacity: f32) -> Self {
        Self {
            color: hex_color(color, opacity),
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            shininess: 100.0,
            specular: 0.07,
        }
    }

    pub const fn with_emissive(mut self, color: u32, intensity: f32) -> Self {
        let c = hex_color(color, 1.0);
        self.emissive = [c[0], c[1], c[2]];
        self.emissive_intensity = intensity;
        self
    }

    pub const fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

pub const HEART_MATERIAL: Material = Material {
    color: hex_color(0xff69b4, 0.95),
    emissive: rgb(0xff1493, 1.0),
    emissive_intensity: 0.15,
    shininess: 60.0,
    specular: 0.5,
};

pub const TRAIL_HEART_MATERIAL: Material = Material::phong(0xff69b4, 1.0).with_emissive(0xff1493, 0.3);

pub const HALO_MATERIAL: Material = Material::phong(0xff69b4, 0.3).with_emissive(0xff1493, 0.3);

pub const PETAL_MATERIAL: Material = Material::phong(0xff69b4, 1.0);

pub const VIEWER_MATERIAL: Material = Material::phong(0x2194ce, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_index_wraps() {
        assert_eq!(background_preset(0), BACKGROUND_PRESETS[0]);
        assert_eq!(background_preset(5), BACKGROUND_PRESETS[1]);
    }

    #[test]
    fn test_heart_layers_match_reference_values() {
        let counts: Vec<usize> = HEART_ORBIT_LAYERS.iter().map(|l| l.particle_count).collect();
        assert_eq!(counts, vec![150, 120, 100, 80, 60]);
        assert_eq!(HEART_ORBIT_LAYERS.iter().filter(|l| l.speed < 0.0).count(), 2);
        assert!(TRAIL_ORBIT_LAYERS.iter().all(|l| l.ellipse_factor == 0.6));
    }

    #[test]
    fn test_camera_presets_start_inside_their_limits() {
        for preset in [HEART_CAMERA, TUNNEL_CAMERA, VIEWER_CAMERA] {
            let d = preset.position.distance(preset.target);
            assert!(d >= preset.min_distance && d <= preset.max_distance, "{d}");
        }
    }

    #[test]
    fn test_emissive_builder() {
        let m = Material::phong(0x000000, 1.0).with_emissive(0xff0000, 0.5);
        assert_eq!(m.emissive, [1.0, 0.0, 0.0]);
        assert_eq!(m.emissive_intensity, 0.5);
    }
}
