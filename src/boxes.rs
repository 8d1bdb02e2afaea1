use std::fmt;

use burn::{
    prelude::Backend,
    tensor::{Tensor, s},
};

use crate::error::{BoxError, InvalidWindowSnafu};

/// Splits a tensor of boxes in `(y1, x1, y2, x2)` format into its four coordinate columns.
///
/// # Arguments
///
/// * `boxes` - Tensor of shape `[num_boxes, 4]`.
///
/// # Returns
///
/// * Tuple of four tensors `(y1, x1, y2, x2)`, each of shape `[num_boxes, 1]`.
pub fn boxes_to_components<B: Backend>(
    boxes: Tensor<B, 2>,
) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
    (
        boxes.clone().slice(s![.., 0]),
        boxes.clone().slice(s![.., 1]),
        boxes.clone().slice(s![.., 2]),
        boxes.slice(s![.., 3]),
    )
}

/// Area of every box in the set, `(y2 - y1) * (x2 - x1)`, as a `[num_boxes, 1]` column.
///
/// Inverted boxes give a negative or zero area, nothing is clamped here.
pub fn box_areas<B: Backend>(boxes: Tensor<B, 2>) -> Tensor<B, 2> {
    let (y1, x1, y2, x2) = boxes_to_components(boxes);

    (y2 - y1) * (x2 - x1)
}

/// Converts corner boxes `(y1, x1, y2, x2)` into their center form.
///
/// # Returns
///
/// * Tuple `(center_y, center_x, height, width)`, each of shape `[num_boxes, 1]`.
pub fn to_center_form<B: Backend>(
    boxes: Tensor<B, 2>,
) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
    let (y1, x1, y2, x2) = boxes_to_components(boxes);

    let height = y2 - y1.clone();
    let width = x2 - x1.clone();
    let center_y = y1 + height.clone() * 0.5;
    let center_x = x1 + width.clone() * 0.5;

    (center_y, center_x, height, width)
}

/// Converts center form columns back into a `[num_boxes, 4]` tensor of `(y1, x1, y2, x2)`.
///
/// The far corner is rebuilt as `y1 + height` / `x1 + width` rather than `center + 0.5 * size`.
pub fn from_center_form<B: Backend>(
    center_y: Tensor<B, 2>,
    center_x: Tensor<B, 2>,
    height: Tensor<B, 2>,
    width: Tensor<B, 2>,
) -> Tensor<B, 2> {
    let y1 = center_y - height.clone() * 0.5;
    let x1 = center_x - width.clone() * 0.5;
    let y2 = y1.clone() + height;
    let x2 = x1.clone() + width;

    Tensor::cat(vec![y1, x1, y2, x2], 1)
}

/// A clipping boundary in `(y1, x1, y2, x2)` order, usually the image area the boxes live in.
///
/// No ordering is enforced, an inverted window is accepted and simply produces inverted boxes
/// when used for clipping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub y1: f32,
    pub x1: f32,
    pub y2: f32,
    pub x2: f32,
}

impl Window {
    pub fn new(y1: f32, x1: f32, y2: f32, x2: f32) -> Self {
        Self { y1, x1, y2, x2 }
    }

    /// Window covering a whole `height` x `width` image, anchored at the origin.
    pub fn from_image_shape(height: usize, width: usize) -> Self {
        Self::new(0.0, 0.0, height as f32, width as f32)
    }

    /// `(min, max)` clamp bounds for each of the four box columns.
    pub fn column_bounds(&self) -> [(f32, f32); 4] {
        [
            (self.y1, self.y2),
            (self.x1, self.x2),
            (self.y1, self.y2),
            (self.x1, self.x2),
        ]
    }
}

impl TryFrom<&[f32]> for Window {
    type Error = BoxError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        match values {
            [y1, x1, y2, x2] => Ok(Self::new(*y1, *x1, *y2, *x2)),
            _ => InvalidWindowSnafu { len: values.len() }.fail(),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.y1, self.x1, self.y2, self.x2)
    }
}
