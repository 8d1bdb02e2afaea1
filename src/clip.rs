use burn::{prelude::Backend, tensor::Tensor};

use crate::boxes::{Window, boxes_to_components};

/// Clamps every box coordinate into `window` and returns the clipped boxes as a new tensor.
///
/// `y1`/`y2` are clamped to `[window.y1, window.y2]` and `x1`/`x2` to `[window.x1, window.x2]`,
/// each column on its own.
///
/// # Arguments
///
/// * `boxes` - Tensor of shape `[num_boxes, 4]` in `(y1, x1, y2, x2)` format.
/// * `window` - The clipping boundary.
///
/// # Returns
///
/// * `Tensor<B, 2>` - Clipped boxes, shape `[num_boxes, 4]`.
///
/// # Notes
///
/// - Coordinates are not reordered after clamping, an inverted window can produce boxes with
///   `y1 > y2` or `x1 > x2`.
/// - See [`clip_to_window`] for the variant writing back into the caller's tensor.
pub fn clip_boxes<B: Backend>(boxes: Tensor<B, 2>, window: &Window) -> Tensor<B, 2> {
    tracing::trace!(boxes = ?boxes.dims(), %window, "clip_boxes");

    if boxes.dims()[0] == 0 {
        return boxes;
    }

    let (y1, x1, y2, x2) = boxes_to_components(boxes);

    Tensor::cat(
        vec![
            clamp_column(y1, window.y1, window.y2),
            clamp_column(x1, window.x1, window.x2),
            clamp_column(y2, window.y1, window.y2),
            clamp_column(x2, window.x1, window.x2),
        ],
        1,
    )
}

/// Clamps every box coordinate into `window`, assigning the result back into `boxes`.
///
/// Produces the same values as [`clip_boxes`]. The caller's tensor is updated column by column
/// and the same reference is returned so calls can be chained.
pub fn clip_to_window<'a, B: Backend>(
    window: &Window,
    boxes: &'a mut Tensor<B, 2>,
) -> &'a mut Tensor<B, 2> {
    let [num_boxes, _] = boxes.dims();
    tracing::trace!(num_boxes, %window, "clip_to_window");

    if num_boxes == 0 {
        return boxes;
    }

    for (col, (min, max)) in window.column_bounds().into_iter().enumerate() {
        let clamped = clamp_column(boxes.clone().slice([0..num_boxes, col..col + 1]), min, max);
        *boxes = boxes
            .clone()
            .slice_assign([0..num_boxes, col..col + 1], clamped);
    }

    boxes
}

// Lower bound first, then upper: with an inverted range the upper bound wins.
fn clamp_column<B: Backend>(column: Tensor<B, 2>, min: f32, max: f32) -> Tensor<B, 2> {
    column.clamp_min(min).clamp_max(max)
}
