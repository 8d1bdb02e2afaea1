use std::fs;

use burn::{
    prelude::Backend,
    tensor::{Device, Tensor, TensorData},
};
use snafu::ResultExt;

use crate::{
    boxes::Window,
    error::{ConvertOutputSnafu, ParseBoxesSnafu, ParseWindowSnafu, ReadBoxesSnafu, Result},
};

/// Builds a `[num_rows, 4]` box set from plain rows.
pub fn box_set_from_rows<B: Backend>(rows: &[[f32; 4]], device: &Device<B>) -> Tensor<B, 2> {
    let values = rows.iter().flatten().copied().collect::<Vec<f32>>();

    Tensor::from_data(TensorData::new(values, [rows.len(), 4]), device)
}

/// Reads a JSON file holding an array of `[a, b, c, d]` rows into a `[num_rows, 4]` tensor.
pub fn read_box_set<B: Backend>(path: &str, device: &Device<B>) -> Result<Tensor<B, 2>> {
    let content = fs::read_to_string(path).context(ReadBoxesSnafu { path })?;
    let rows: Vec<[f32; 4]> = serde_json::from_str(&content).context(ParseBoxesSnafu { path })?;

    tracing::debug!("read {} rows from {}", rows.len(), path);

    Ok(box_set_from_rows(&rows, device))
}

/// Turns any `[num_rows, cols]` tensor back into plain rows, e.g. to print it as JSON.
pub fn box_set_to_rows<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<Vec<f32>>> {
    let [rows, cols] = tensor.dims();

    if cols == 0 {
        return Ok(vec![Vec::new(); rows]);
    }

    // convert first, the backend may hold another float type
    let values = tensor
        .into_data()
        .convert::<f32>()
        .into_vec::<f32>()
        .map_err(|err| {
            ConvertOutputSnafu {
                message: format!("{err:?}"),
            }
            .build()
        })?;

    Ok(values.chunks(cols).map(<[f32]>::to_vec).collect())
}

/// Parses `y1,x1,y2,x2` into a [`Window`].
pub fn parse_window(value: &str) -> Result<Window> {
    let values = value
        .split(',')
        .map(str::trim)
        .map(|v| v.parse::<f32>().context(ParseWindowSnafu { value: v }))
        .collect::<Result<Vec<_>>>()?;

    Window::try_from(values.as_slice())
}
