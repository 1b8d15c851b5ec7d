//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for runner elements
pub mod colors {
    /// `0xRRGGBB` to RGBA, as written to a non-sRGB surface
    pub const fn hex(rgb: u32, alpha: f32) -> [f32; 4] {
        [
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            alpha,
        ]
    }

    pub const BACKGROUND: [f32; 4] = hex(0xFFFFFF, 1.0);
    pub const GROUND: [f32; 4] = hex(0xE6C229, 1.0);
    pub const PLAYER: [f32; 4] = hex(0x1A2F4B, 1.0);
    /// Water carried on the player's head
    pub const WATER: [f32; 4] = hex(0x0000FF, 1.0);
    pub const ROCK: [f32; 4] = hex(0x8B4513, 1.0);
    pub const FIRE: [f32; 4] = hex(0xFF4500, 1.0);
    pub const FIRE_CORE: [f32; 4] = hex(0xFFFF00, 1.0);
    /// Game over dimming
    pub const OVERLAY: [f32; 4] = hex(0x000000, 0.7);
}
