use emissions::{CountryCode, RenderPoint};
use foundation::math::{LatLng, lat_lng_to_sphere};
use scene::{CameraState, Projector, Rotation, SelectionState, Viewport};

/// One marker as laid out in the instance buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointInstance {
    /// Globe-space position, before the view rotation.
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
}

impl PointInstance {
    pub fn from_point(point: &RenderPoint, altitude: f64) -> Self {
        let p = lat_lng_to_sphere(LatLng::new(point.lat, point.lng), 1.0 + altitude);
        Self {
            position: [p.x as f32, p.y as f32, p.z as f32],
            size: point.size as f32,
            color: point.color.rgb(),
        }
    }
}

pub fn build_instances(points: &[RenderPoint], altitude: f64) -> Vec<PointInstance> {
    points
        .iter()
        .map(|p| PointInstance::from_point(p, altitude))
        .collect()
}

/// View state applied to the whole globe for one draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTransform {
    pub rotation: Rotation,
    pub distance: f64,
    pub fov_y_rad: f64,
    pub viewport: Viewport,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HighlightKind {
    Hovered,
    Selected,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    Globe,
    /// Instanced draw over the uploaded marker buffer.
    Markers { count: usize },
    Highlight { index: usize, kind: HighlightKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub transform: RenderTransform,
    pub commands: Vec<RenderCommand>,
}

impl DrawCall {
    pub fn marker_count(&self) -> usize {
        self.commands
            .iter()
            .find_map(|c| match c {
                RenderCommand::Markers { count } => Some(*count),
                _ => None,
            })
            .unwrap_or(0)
    }
}

pub struct Renderer;

impl Renderer {
    /// Builds the draw for one tick from the damped camera rotation.
    pub fn collect(
        camera: &CameraState,
        projector: &Projector,
        points: &[RenderPoint],
        selection: &SelectionState,
    ) -> DrawCall {
        let mut commands = vec![RenderCommand::Globe];
        if !points.is_empty() {
            commands.push(RenderCommand::Markers {
                count: points.len(),
            });
        }

        let index_of = |code: &CountryCode| points.iter().position(|p| &p.country == code);
        if let Some(index) = selection.selected().and_then(index_of) {
            commands.push(RenderCommand::Highlight {
                index,
                kind: HighlightKind::Selected,
            });
        }
        if let Some(index) = selection.hovered().and_then(index_of) {
            commands.push(RenderCommand::Highlight {
                index,
                kind: HighlightKind::Hovered,
            });
        }

        DrawCall {
            transform: RenderTransform {
                rotation: camera.current(),
                distance: camera.distance(),
                fov_y_rad: projector.fov_y_rad,
                viewport: projector.viewport,
            },
            commands,
        }
    }
}
