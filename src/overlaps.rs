use burn::{prelude::Backend, tensor::Tensor};

use crate::boxes::{box_areas, boxes_to_components};

/// Computes the Intersection over Union (IoU) between every box of `boxes1` and every box of
/// `boxes2`, both in `(y1, x1, y2, x2)` format.
///
/// Rather than looping, each box of `boxes1` is repeated once per box of `boxes2` and `boxes2`
/// is tiled once per box of `boxes1`, so every pair lines up on the same row of two
/// `[rows * cols, 4]` tensors:
///
/// ```text
///   boxes1 repeated        boxes2 tiled
///   [a0]                   [b0]
///   [a0]                   [b1]
///   [a0]                   [b2]
///   [a1]                   [b0]
///   [a1]                   [b1]
///   ...                    ...
/// ```
///
/// The per-pair IoU column is then reshaped back to `[rows, cols]`.
///
/// # Arguments
///
/// * `boxes1` - Tensor of shape `[rows, 4]`.
/// * `boxes2` - Tensor of shape `[cols, 4]`.
///
/// # Returns
///
/// * `Tensor<B, 2>` - IoU matrix of shape `[rows, cols]` where entry `(i, j)` is the IoU between
///   `boxes1[i]` and `boxes2[j]`.
///
/// # Notes
///
/// - Pairs of zero area boxes divide 0 by 0 and come out as NaN; they are not filtered.
/// - Empty inputs give an empty (all zero) matrix of the matching shape.
pub fn bbox_overlaps<B: Backend>(boxes1: Tensor<B, 2>, boxes2: Tensor<B, 2>) -> Tensor<B, 2> {
    let [rows, _] = boxes1.dims();
    let [cols, _] = boxes2.dims();
    tracing::trace!(rows, cols, "bbox_overlaps");

    if rows == 0 || cols == 0 {
        return Tensor::zeros([rows, cols], &boxes1.device());
    }

    // 1. Repeat boxes1 and tile boxes2 so every pair shares a row
    let boxes1 = boxes1.repeat_dim(1, cols).reshape([-1, 4]);
    let boxes2 = boxes2.repeat_dim(0, rows);

    // 2. Intersections
    let (a_y1, a_x1, a_y2, a_x2) = boxes_to_components(boxes1.clone());
    let (b_y1, b_x1, b_y2, b_x2) = boxes_to_components(boxes2.clone());

    let y1 = a_y1.max_pair(b_y1);
    let x1 = a_x1.max_pair(b_x1);
    let y2 = a_y2.min_pair(b_y2);
    let x2 = a_x2.min_pair(b_x2);
    let intersection = (y2 - y1).clamp_min(0.0) * (x2 - x1).clamp_min(0.0);

    // 3. Unions
    let union = box_areas(boxes1) + box_areas(boxes2) - intersection.clone();

    // 4. IoU, back to [rows, cols]
    (intersection / union).reshape([rows, cols])
}

/// Calculates the IoU of a single box against every box of a set.
///
/// The areas are passed in rather than computed here, the caller computes them once for the
/// whole set instead of once per comparison.
///
/// # Arguments
///
/// * `bx` - The box to compare, shape `[1, 4]`.
/// * `boxes` - Boxes to compare against, shape `[num_boxes, 4]`.
/// * `box_area` - Area of `bx`, shape `[1, 1]`.
/// * `boxes_area` - Area of each box in `boxes`, shape `[num_boxes, 1]`.
///
/// # Returns
///
/// * `Tensor<B, 2>` - IoU column of shape `[num_boxes, 1]`.
pub fn compute_iou<B: Backend>(
    bx: Tensor<B, 2>,
    boxes: Tensor<B, 2>,
    box_area: Tensor<B, 2>,
    boxes_area: Tensor<B, 2>,
) -> Tensor<B, 2> {
    let [num_boxes, _] = boxes.dims();

    let bx = bx.repeat_dim(0, num_boxes);
    let (b_y1, b_x1, b_y2, b_x2) = boxes_to_components(bx);
    let (y1, x1, y2, x2) = boxes_to_components(boxes);

    let y1 = b_y1.max_pair(y1);
    let y2 = b_y2.min_pair(y2);
    let x1 = b_x1.max_pair(x1);
    let x2 = b_x2.min_pair(x2);
    let intersection = (x2 - x1).clamp_min(0.0) * (y2 - y1).clamp_min(0.0);

    let union = box_area.repeat_dim(0, num_boxes) + boxes_area - intersection.clone();

    intersection / union
}

/// Same result as [`bbox_overlaps`], computed one column at a time with [`compute_iou`].
///
/// Areas of both sets are computed once up front. Useful as a reference for the vectorized
/// version and for small sets where tiling is not worth the memory.
///
/// # Returns
///
/// * `Tensor<B, 2>` - IoU matrix of shape `[rows, cols]`, entry `(i, j)` pairs `boxes1[i]`
///   with `boxes2[j]`.
pub fn bbox_overlaps_loops<B: Backend>(boxes1: Tensor<B, 2>, boxes2: Tensor<B, 2>) -> Tensor<B, 2> {
    let [rows, _] = boxes1.dims();
    let [cols, _] = boxes2.dims();
    tracing::trace!(rows, cols, "bbox_overlaps_loops");

    let mut overlaps = Tensor::zeros([rows, cols], &boxes1.device());
    if rows == 0 || cols == 0 {
        return overlaps;
    }

    let area1 = box_areas(boxes1.clone());
    let area2 = box_areas(boxes2.clone());

    for col in 0..cols {
        let bx = boxes2.clone().slice([col..col + 1, 0..4]);
        let bx_area = area2.clone().slice([col..col + 1, 0..1]);
        let iou = compute_iou(bx, boxes1.clone(), bx_area, area1.clone());
        overlaps = overlaps.slice_assign([0..rows, col..col + 1], iou);
    }

    overlaps
}
