//! Model-view matrix stack shared by every drawable during a frame walk.

use nalgebra::{Matrix4, Vector3};

use crate::error::HiveError;

const FOV_Y: f32 = std::f32::consts::FRAC_PI_4; // 45 degrees
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Current model-view and projection matrices plus the save stack used to
/// scope nested drawable transforms.
pub struct TransformStack {
    model_view: Matrix4<f32>,
    projection: Matrix4<f32>,
    stack: Vec<Matrix4<f32>>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            model_view: Matrix4::identity(),
            projection: Matrix4::identity(),
            stack: Vec::new(),
        }
    }

    /// Reset for a new frame: empty stack, identity model-view, perspective
    /// projection for the given aspect ratio.
    pub fn start_frame(&mut self, aspect: f32) {
        self.stack.clear();
        self.model_view = Matrix4::identity();
        self.projection = Matrix4::new_perspective(aspect, FOV_Y, Z_NEAR, Z_FAR);
    }

    /// Save the current model-view matrix.
    pub fn push(&mut self) {
        self.stack.push(self.model_view);
    }

    /// Restore the most recently saved model-view matrix.
    pub fn pop(&mut self) -> Result<(), HiveError> {
        self.model_view = self.stack.pop().ok_or(HiveError::StackUnderflow)?;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn translate(&mut self, v: [f32; 3]) {
        self.model_view *= Matrix4::new_translation(&Vector3::from(v));
    }

    /// Three sequential axis rotations, X then Y then Z.
    pub fn rotate(&mut self, v: [f32; 3]) {
        self.model_view *= Matrix4::new_rotation(Vector3::new(v[0], 0.0, 0.0));
        self.model_view *= Matrix4::new_rotation(Vector3::new(0.0, v[1], 0.0));
        self.model_view *= Matrix4::new_rotation(Vector3::new(0.0, 0.0, v[2]));
    }

    pub fn scale(&mut self, v: [f32; 3]) {
        self.model_view *= Matrix4::new_nonuniform_scaling(&Vector3::from(v));
    }

    pub fn model_view(&self) -> &Matrix4<f32> {
        &self.model_view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_push_pop_restores_exactly() {
        let mut ts = TransformStack::new();
        ts.start_frame(16.0 / 9.0);
        ts.translate([1.0, 2.0, -10.0]);
        ts.rotate([0.3, 0.1, 0.7]);
        let before = *ts.model_view();

        ts.push();
        ts.scale([5.0, 5.0, 1.0]);
        ts.translate([0.0, 20.0, 0.0]);
        ts.pop().unwrap();

        // bit-identical, not just approximately equal
        assert_eq!(before, *ts.model_view());
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let mut ts = TransformStack::new();
        ts.start_frame(1.0);
        assert!(matches!(ts.pop(), Err(HiveError::StackUnderflow)));
    }

    #[test]
    fn start_frame_clears_stale_stack() {
        let mut ts = TransformStack::new();
        ts.start_frame(1.0);
        ts.push();
        ts.push();
        ts.start_frame(1.0);
        assert_eq!(ts.depth(), 0);
        assert_eq!(*ts.model_view(), Matrix4::identity());
    }

    #[test]
    fn rotation_order_is_x_then_y_then_z() {
        let mut ts = TransformStack::new();
        ts.start_frame(1.0);
        ts.rotate([0.2, 0.5, 0.9]);
        let combined = *ts.model_view();

        let mut ts2 = TransformStack::new();
        ts2.start_frame(1.0);
        ts2.rotate([0.2, 0.0, 0.0]);
        ts2.rotate([0.0, 0.5, 0.0]);
        ts2.rotate([0.0, 0.0, 0.9]);

        assert!((combined - ts2.model_view()).norm() < 1e-6);
    }
}
