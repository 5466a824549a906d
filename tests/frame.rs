//! Host-side integration tests: drive the animation controller and the
//! drawable tree through whole simulated sessions, the way the frame loop
//! does, and check the invariants that hold across frames.

use nalgebra::Matrix4;

use hivelens::anim::{Button, SceneState, ROOT_OFFSET};
use hivelens::error::HiveError;
use hivelens::scene::{Node, Painter};
use hivelens::transform::TransformStack;

const DT: f32 = 1.0 / 60.0;

struct CountingPainter {
    paints: usize,
}

impl Painter for CountingPainter {
    fn paint(
        &mut self,
        _projection: &Matrix4<f32>,
        _model_view: &Matrix4<f32>,
    ) -> Result<(), HiveError> {
        self.paints += 1;
        Ok(())
    }
}

fn scene_nodes(n: usize) -> Vec<Node<CountingPainter>> {
    (0..n)
        .map(|_| Node::new(CountingPainter { paints: 0 }))
        .collect()
}

/// One update-then-draw pass over the arrow plus the hive ring, mirroring the
/// wasm frame loop.
fn run_frame(
    state: &mut SceneState,
    stack: &mut TransformStack,
    arrow: &mut Node<CountingPainter>,
    tiles: &mut [Node<CountingPainter>],
) {
    state.update(DT);

    stack.start_frame(state.viewport[0] / state.viewport[1]);
    stack.translate(ROOT_OFFSET);

    arrow.set_layout(&state.arrow_layout());
    arrow.draw(stack).unwrap();

    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.set_layout(&state.tile_layout(i));
        tile.draw(stack).unwrap();
    }
}

#[test]
fn stack_depth_is_zero_after_every_frame() {
    let mut state = SceneState::new(4);
    state.viewport = [800.0, 600.0];
    let mut stack = TransformStack::new();
    let mut arrow = Node::new(CountingPainter { paints: 0 });
    let mut tiles = scene_nodes(4);

    state.pointer_move(400.0, 300.0, 100.0);
    state.pointer_down(Button::Primary);
    for frame in 0..120 {
        if frame == 30 {
            state.pointer_down(Button::Secondary);
        }
        run_frame(&mut state, &mut stack, &mut arrow, &mut tiles);
        assert_eq!(stack.depth(), 0, "frame {frame}");
    }
}

#[test]
fn a_full_selection_cycle_returns_to_rest() {
    let mut state = SceneState::new(4);
    state.viewport = [800.0, 600.0];
    state.pointer_down(Button::Primary); // grow

    // click through all four tiles, letting each transition settle
    for _ in 0..4 {
        state.pointer_down(Button::Secondary);
        for _ in 0..120 {
            state.update(DT);
        }
    }
    assert_eq!(state.selected_index, 0);
    assert_eq!(state.selection_state, 0.0);

    // shrink back and settle
    state.pointer_down(Button::Primary);
    for _ in 0..120 {
        state.update(DT);
    }
    assert_eq!(state.size_state, 0.0);
    // every tile back at rest scale
    for i in 0..4 {
        assert_eq!(state.tile_layout(i).scale, [1.0, 1.0, 1.0]);
    }
}

#[test]
fn only_the_selected_tile_reaches_full_size() {
    let mut state = SceneState::new(4);
    state.viewport = [800.0, 600.0];
    state.pointer_down(Button::Primary);
    state.pointer_down(Button::Secondary); // select tile 1
    for _ in 0..240 {
        state.update(DT);
    }

    assert_eq!(state.tile_layout(1).scale[0], 5.0);
    for i in [0usize, 2, 3] {
        assert_eq!(state.tile_layout(i).scale[0], 1.0, "tile {i}");
        // deselected tiles are tilted away and lifted out of view
        assert!(state.tile_layout(i).position[1] > state.hexagon_pos[1]);
    }
}

#[test]
fn arrow_parks_further_out_while_a_tile_is_enlarged() {
    let mut state = SceneState::new(4);
    state.viewport = [800.0, 600.0];
    let rest_x = state.arrow_layout().position[0];

    state.pointer_down(Button::Primary);
    for _ in 0..120 {
        state.update(DT);
    }
    let grown_x = state.arrow_layout().position[0];
    assert!((rest_x - grown_x - 4.0).abs() < 1e-4);
}

#[test]
fn mid_wrap_selection_state_is_usable_for_layout() {
    let mut state = SceneState::new(4);
    state.viewport = [800.0, 600.0];
    state.size_state = 1.0;
    state.selected_index = 3;
    state.selection_state = 3.0;
    state.pointer_down(Button::Secondary); // wrap toward 0 through 4

    // part-way through the wrap, the seam tile is already growing
    for _ in 0..10 {
        state.update(DT);
    }
    assert!(state.selection_state > 3.0 && state.selection_state < 4.0);
    let seam = state.tile_layout(0);
    assert!(seam.scale[0] > 1.0);
}

#[test]
fn deep_nesting_still_balances_the_stack() {
    // a 32-deep chain built leaf-first
    let mut node = Node::new(CountingPainter { paints: 0 });
    for _ in 0..32 {
        let mut parent = Node::new(CountingPainter { paints: 0 });
        parent.add_child(node);
        node = parent;
    }

    let mut stack = TransformStack::new();
    stack.start_frame(1.0);
    node.draw(&mut stack).unwrap();
    assert_eq!(stack.depth(), 0);
}
