//! Camera description shared by the placeholder and the asset camera.

use glam::{Mat4, Vec3};

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        fovy_radians: f32,
        aspect: f32,
        znear: f32,
        /// `None` for an infinite far plane.
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

impl Projection {
    /// Compute the clip-space projection matrix.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fovy_radians,
                aspect,
                znear,
                zfar: Some(zfar),
            } => Mat4::perspective_rh(fovy_radians, aspect, znear, zfar),
            Projection::Perspective {
                fovy_radians,
                aspect,
                znear,
                zfar: None,
            } => Mat4::perspective_infinite_rh(fovy_radians, aspect, znear),
            Projection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => Mat4::orthographic_rh(-xmag, xmag, -ymag, ymag, znear, zfar),
        }
    }
}

/// Where the camera's world transform comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraMount {
    /// Fixed world transform.
    Free(Mat4),
    /// Follows a scene node (and therefore its animation).
    Node(usize),
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub projection: Projection,
    pub mount: CameraMount,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(projection: Projection, mount: CameraMount) -> Self {
        Self {
            projection,
            mount,
            projection_matrix: projection.matrix(),
        }
    }

    /// Default camera shown until the stage camera is installed.
    pub fn placeholder(aspect: f32) -> Self {
        Self::new(
            Projection::Perspective {
                fovy_radians: PLACEHOLDER_FOV_DEG.to_radians(),
                aspect,
                znear: PLACEHOLDER_ZNEAR,
                zfar: Some(PLACEHOLDER_ZFAR),
            },
            CameraMount::Free(Mat4::from_translation(placeholder_position())),
        )
    }

    /// Aspect ratio of a perspective camera; `None` for orthographic ones.
    pub fn aspect(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { aspect, .. } => Some(aspect),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Orthographic cameras keep their authored extents.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = new_aspect;
        }
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = self.projection.matrix();
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Camera-to-world transform given the scene's world matrices.
    pub fn world_matrix(&self, world: &[Mat4]) -> Mat4 {
        match self.mount {
            CameraMount::Free(m) => m,
            CameraMount::Node(i) => world.get(i).copied().unwrap_or(Mat4::IDENTITY),
        }
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self, world: &[Mat4]) -> Mat4 {
        self.world_matrix(world).inverse()
    }

    pub fn position(&self, world: &[Mat4]) -> Vec3 {
        self.world_matrix(world).w_axis.truncate()
    }
}
