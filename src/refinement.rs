use burn::{config::Config, prelude::Backend, tensor::Tensor};

use crate::boxes::{boxes_to_components, from_center_form, to_center_form};

/// Computes the refinement needed to transform `boxes` into `gt_boxes`.
///
/// Rows are matched by position: `gt_boxes[i]` is the target of `boxes[i]`. Picking the
/// matches is up to the caller.
///
/// ```text
///      gt_cy - cy           gt_cx - cx
/// dy = ──────────     dx = ──────────
///        height               width
///
///          ⎛gt_height⎞          ⎛gt_width⎞
/// dh = log ⎜─────────⎟   dw = log ⎜────────⎟
///          ⎝ height  ⎠          ⎝ width  ⎠
/// ```
///
/// # Arguments
///
/// * `boxes` - Source boxes, shape `[num_boxes, 4]` in `(y1, x1, y2, x2)` format.
/// * `gt_boxes` - Target boxes, same shape and format.
///
/// # Returns
///
/// * `Tensor<B, 2>` - Deltas of shape `[num_boxes, 4]` as `(dy, dx, dh, dw)`.
///
/// # Notes
///
/// Source boxes need a positive height and width, otherwise the division yields inf or NaN
/// which is passed through unchanged.
pub fn box_refinement<B: Backend>(boxes: Tensor<B, 2>, gt_boxes: Tensor<B, 2>) -> Tensor<B, 2> {
    tracing::trace!(boxes = ?boxes.dims(), gt_boxes = ?gt_boxes.dims(), "box_refinement");

    if boxes.dims()[0] == 0 {
        return Tensor::zeros([0, 4], &boxes.device());
    }

    let (center_y, center_x, height, width) = to_center_form(boxes);
    let (gt_center_y, gt_center_x, gt_height, gt_width) = to_center_form(gt_boxes);

    let dy = (gt_center_y - center_y) / height.clone();
    let dx = (gt_center_x - center_x) / width.clone();
    let dh = (gt_height / height).log();
    let dw = (gt_width / width).log();

    Tensor::cat(vec![dy, dx, dh, dw], 1)
}

/// Applies `(dy, dx, dh, dw)` deltas to boxes, the inverse of [`box_refinement`].
///
/// The center is shifted by `(dy * height, dx * width)` and the size is scaled by
/// `(exp(dh), exp(dw))`, then the result is converted back to `(y1, x1, y2, x2)`.
///
/// # Arguments
///
/// * `boxes` - Base boxes, shape `[num_boxes, 4]`.
/// * `deltas` - Deltas, shape `[num_boxes, 4]`.
///
/// # Returns
///
/// * `Tensor<B, 2>` - Refined boxes of shape `[num_boxes, 4]`.
pub fn apply_box_deltas<B: Backend>(boxes: Tensor<B, 2>, deltas: Tensor<B, 2>) -> Tensor<B, 2> {
    tracing::trace!(boxes = ?boxes.dims(), deltas = ?deltas.dims(), "apply_box_deltas");

    if boxes.dims()[0] == 0 {
        return Tensor::zeros([0, 4], &boxes.device());
    }

    let (center_y, center_x, height, width) = to_center_form(boxes);
    let (dy, dx, dh, dw) = boxes_to_components(deltas);

    let center_y = center_y + dy * height.clone();
    let center_x = center_x + dx * width.clone();
    let height = height * dh.exp();
    let width = width * dw.exp();

    from_center_form(center_y, center_x, height, width)
}

/// Normalization applied to refinement deltas before they are used as regression targets.
///
/// Raw deltas are divided column-wise by `std_dev` when encoding and multiplied back when
/// decoding, so a regression head sees targets of roughly unit scale.
#[derive(Config, Debug)]
pub struct BoxRefinementConfig {
    /// Standard deviation of `(dy, dx, dh, dw)`.
    #[config(default = "[0.1, 0.1, 0.2, 0.2]")]
    pub std_dev: [f32; 4],
}

impl BoxRefinementConfig {
    /// No normalization, `encode`/`decode` behave like the raw functions.
    pub fn identity() -> Self {
        Self::new().with_std_dev([1.0; 4])
    }

    /// [`box_refinement`] followed by division by `std_dev`.
    pub fn encode<B: Backend>(&self, boxes: Tensor<B, 2>, gt_boxes: Tensor<B, 2>) -> Tensor<B, 2> {
        let deltas = box_refinement(boxes, gt_boxes);
        if deltas.dims()[0] == 0 {
            return deltas;
        }

        let (dy, dx, dh, dw) = boxes_to_components(deltas);
        let [s_dy, s_dx, s_dh, s_dw] = self.std_dev;

        Tensor::cat(vec![dy / s_dy, dx / s_dx, dh / s_dh, dw / s_dw], 1)
    }

    /// Multiplication by `std_dev` followed by [`apply_box_deltas`].
    pub fn decode<B: Backend>(&self, boxes: Tensor<B, 2>, deltas: Tensor<B, 2>) -> Tensor<B, 2> {
        if deltas.dims()[0] == 0 {
            return apply_box_deltas(boxes, deltas);
        }

        let (dy, dx, dh, dw) = boxes_to_components(deltas);
        let [s_dy, s_dx, s_dh, s_dw] = self.std_dev;

        let deltas = Tensor::cat(vec![dy * s_dy, dx * s_dx, dh * s_dh, dw * s_dw], 1);
        apply_box_deltas(boxes, deltas)
    }
}
