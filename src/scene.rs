//! Retained drawable tree walked depth-first with the transform stack.

use nalgebra::Matrix4;

use crate::anim::TileLayout;
use crate::error::HiveError;
use crate::transform::TransformStack;

/// The seam between the transform walk and the graphics backend: bind the
/// program, upload the matrices, issue the draw call. The wasm layer supplies
/// a WebGL painter; tests use a recording one.
pub trait Painter {
    fn paint(
        &mut self,
        projection: &Matrix4<f32>,
        model_view: &Matrix4<f32>,
    ) -> Result<(), HiveError>;
}

/// One node of the drawable hierarchy: a painter plus a local transform and
/// owned children. Children inherit the accumulated transform and must not
/// form cycles (ownership makes that hard to do by accident, but `add_child`
/// performs no detection).
pub struct Node<P> {
    painter: P,
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
    children: Vec<Node<P>>,
}

impl<P: Painter> Node<P> {
    pub fn new(painter: P) -> Self {
        Self {
            painter,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            children: Vec::new(),
        }
    }

    pub fn set_position(&mut self, v: [f32; 3]) {
        self.position = v;
    }

    pub fn set_rotation(&mut self, v: [f32; 3]) {
        self.rotation = v;
    }

    pub fn set_scale(&mut self, v: [f32; 3]) {
        self.scale = v;
    }

    /// Apply a whole layout at once; takes effect on the next draw.
    pub fn set_layout(&mut self, layout: &TileLayout) {
        self.position = layout.position;
        self.rotation = layout.rotation;
        self.scale = layout.scale;
    }

    pub fn add_child(&mut self, child: Node<P>) {
        self.children.push(child);
    }

    /// Depth-first draw. The order is load-bearing: push, translate, rotate,
    /// scale, paint self, then children in list order, then pop.
    pub fn draw(&mut self, stack: &mut TransformStack) -> Result<(), HiveError> {
        stack.push();

        stack.translate(self.position);
        stack.rotate(self.rotation);
        stack.scale(self.scale);

        self.painter
            .paint(stack.projection(), stack.model_view())?;

        for child in &mut self.children {
            child.draw(stack)?;
        }

        stack.pop()
    }
}
