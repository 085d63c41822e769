//! Camera view presets

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::CAMERA_TWEEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraView {
    #[default]
    Side,
    SideTop,
    BackTilt,
    BackTop,
}

impl CameraView {
    /// Next view in cycle order
    pub fn next(self) -> Self {
        match self {
            CameraView::Side => CameraView::SideTop,
            CameraView::SideTop => CameraView::BackTilt,
            CameraView::BackTilt => CameraView::BackTop,
            CameraView::BackTop => CameraView::Side,
        }
    }

    /// Euler rotation target in degrees
    pub fn rotation(self) -> Vec3 {
        match self {
            CameraView::Side => Vec3::new(30.0, 0.0, 0.0),
            CameraView::SideTop => Vec3::new(80.0, 0.0, 0.0),
            CameraView::BackTilt => Vec3::new(45.0, 90.0, 0.0),
            CameraView::BackTop => Vec3::new(80.0, 90.0, 0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CameraView::Side => "side",
            CameraView::SideTop => "side-top",
            CameraView::BackTilt => "back-tilt",
            CameraView::BackTop => "back-top",
        }
    }
}

/// A tween request for the host's game and ground cameras
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraMove {
    pub view: CameraView,
    pub rotation: Vec3,
    pub seconds: f32,
}

#[derive(Debug, Clone, Default)]
pub struct CameraDirector {
    current: CameraView,
}

impl CameraDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CameraView {
        self.current
    }

    pub fn cycle(&mut self) -> CameraMove {
        let next = self.current.next();
        self.current = next;
        Self::tween(next)
    }

    /// `None` when already on that view
    pub fn change(&mut self, view: CameraView) -> Option<CameraMove> {
        if view == self.current {
            return None;
        }
        self.current = view;
        log::debug!("camera view -> {}", view.as_str());
        Some(Self::tween(view))
    }

    fn tween(view: CameraView) -> CameraMove {
        CameraMove {
            view,
            rotation: view.rotation(),
            seconds: CAMERA_TWEEN,
        }
    }
}
