use burn::{config::Config, prelude::Backend, tensor::Tensor};
use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::{
    boxfile::{box_set_to_rows, parse_window, read_box_set},
    clip::{clip_boxes, clip_to_window},
    config::{Commands, SubCommandApply, SubCommandClip, SubCommandOverlaps, SubCommandRefine},
    debug::non_finite_count,
    error::{LoadConfigSnafu, Result, RowCountMismatchSnafu, WriteOutputSnafu},
    overlaps::{bbox_overlaps, bbox_overlaps_loops},
    refinement::BoxRefinementConfig,
};

/// Runs one CLI command and returns its result serialized as JSON.
pub fn run<B: Backend>(command: &Commands, device: &B::Device) -> Result<String> {
    let output = match command {
        Commands::Overlaps(cmd) => overlaps::<B>(cmd, device)?,
        Commands::Refine(cmd) => refine::<B>(cmd, device)?,
        Commands::Apply(cmd) => apply::<B>(cmd, device)?,
        Commands::Clip(cmd) => clip::<B>(cmd, device)?,
    };

    debug!("output = {}", output);

    let count = non_finite_count(output.clone());
    if count > 0 {
        warn!("{} output values are NaN or infinite, check for degenerate boxes", count);
    }

    serde_json::to_string(&box_set_to_rows(output)?).context(WriteOutputSnafu)
}

fn overlaps<B: Backend>(cmd: &SubCommandOverlaps, device: &B::Device) -> Result<Tensor<B, 2>> {
    let boxes1 = read_box_set::<B>(&cmd.a, device)?;
    let boxes2 = read_box_set::<B>(&cmd.b, device)?;

    info!(
        "Computing overlaps of {} x {} boxes (looped: {})",
        boxes1.dims()[0],
        boxes2.dims()[0],
        cmd.looped
    );

    Ok(if cmd.looped {
        bbox_overlaps_loops(boxes1, boxes2)
    } else {
        bbox_overlaps(boxes1, boxes2)
    })
}

fn refine<B: Backend>(cmd: &SubCommandRefine, device: &B::Device) -> Result<Tensor<B, 2>> {
    let boxes = read_box_set::<B>(&cmd.boxes, device)?;
    let gt_boxes = read_box_set::<B>(&cmd.gt, device)?;
    ensure_same_rows(&boxes, &gt_boxes)?;

    let config = load_refinement_config(cmd.config.as_deref())?;
    info!("Computing refinement deltas for {} boxes", boxes.dims()[0]);

    Ok(config.encode(boxes, gt_boxes))
}

fn apply<B: Backend>(cmd: &SubCommandApply, device: &B::Device) -> Result<Tensor<B, 2>> {
    let boxes = read_box_set::<B>(&cmd.boxes, device)?;
    let deltas = read_box_set::<B>(&cmd.deltas, device)?;
    ensure_same_rows(&boxes, &deltas)?;

    let config = load_refinement_config(cmd.config.as_deref())?;
    info!("Applying deltas to {} boxes", boxes.dims()[0]);

    Ok(config.decode(boxes, deltas))
}

fn clip<B: Backend>(cmd: &SubCommandClip, device: &B::Device) -> Result<Tensor<B, 2>> {
    let mut boxes = read_box_set::<B>(&cmd.boxes, device)?;
    let window = parse_window(&cmd.window)?;

    info!(
        "Clipping {} boxes to {} (in place: {})",
        boxes.dims()[0],
        window,
        cmd.in_place
    );

    if cmd.in_place {
        clip_to_window(&window, &mut boxes);
        Ok(boxes)
    } else {
        Ok(clip_boxes(boxes, &window))
    }
}

/// Raw deltas unless a config file is given.
fn load_refinement_config(path: Option<&str>) -> Result<BoxRefinementConfig> {
    match path {
        Some(path) => BoxRefinementConfig::load(path).map_err(|err| {
            LoadConfigSnafu {
                path,
                message: format!("{err:?}"),
            }
            .build()
        }),
        None => Ok(BoxRefinementConfig::identity()),
    }
}

// The library leaves row mismatches to the backend, which panics; catch it before that.
fn ensure_same_rows<B: Backend>(boxes: &Tensor<B, 2>, other: &Tensor<B, 2>) -> Result<()> {
    let [left, _] = boxes.dims();
    let [right, _] = other.dims();

    snafu::ensure!(left == right, RowCountMismatchSnafu { left, right });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use burn::backend::{NdArray, ndarray::NdArrayDevice};
    use std::path::PathBuf;

    type B = NdArray<f32>;

    fn write_temp(name: &str, content: &str) -> String {
        let path: PathBuf = std::env::temp_dir().join(format!("rcnn_boxes_cmd_{name}.json"));
        std::fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn parse_output(output: &str) -> Vec<Vec<f32>> {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_overlaps_command() {
        let device = &NdArrayDevice::default();
        let a = write_temp("overlaps_a", "[[0, 0, 10, 10], [20, 20, 30, 30]]");
        let b = write_temp("overlaps_b", "[[5, 5, 15, 15]]");

        for looped in [false, true] {
            let cmd = Commands::Overlaps(SubCommandOverlaps {
                a: a.clone(),
                b: b.clone(),
                looped,
            });

            let rows = parse_output(&run::<B>(&cmd, device).unwrap());
            assert_eq!(rows.len(), 2);
            assert!((rows[0][0] - 25.0 / 175.0).abs() < 1e-6);
            assert_eq!(rows[1][0], 0.0);
        }
    }

    #[test]
    fn test_refine_then_apply_commands() {
        let device = &NdArrayDevice::default();
        let boxes = write_temp("refine_boxes", "[[0, 0, 10, 10]]");
        let gt = write_temp("refine_gt", "[[5, 0, 15, 20]]");
        let config = write_temp("refine_config", r#"{"std_dev": [0.1, 0.1, 0.2, 0.2]}"#);

        let cmd = Commands::Refine(SubCommandRefine {
            boxes: boxes.clone(),
            gt,
            config: Some(config.clone()),
        });
        let deltas = run::<B>(&cmd, device).unwrap();
        let rows = parse_output(&deltas);
        assert!((rows[0][0] - 5.0).abs() < 1e-4);
        assert!((rows[0][1] - 5.0).abs() < 1e-4);

        let delta_file = write_temp("refine_deltas", &deltas);
        let cmd = Commands::Apply(SubCommandApply {
            boxes,
            deltas: delta_file,
            config: Some(config),
        });
        let rows = parse_output(&run::<B>(&cmd, device).unwrap());
        for (a, b) in rows[0].iter().zip([5.0, 0.0, 15.0, 20.0]) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn test_refine_rejects_row_mismatch() {
        let device = &NdArrayDevice::default();
        let boxes = write_temp("mismatch_boxes", "[[0, 0, 10, 10], [0, 0, 5, 5]]");
        let gt = write_temp("mismatch_gt", "[[0, 0, 10, 10]]");

        let cmd = Commands::Refine(SubCommandRefine {
            boxes,
            gt,
            config: None,
        });

        assert!(matches!(
            run::<B>(&cmd, device).unwrap_err(),
            BoxError::RowCountMismatch { left: 2, right: 1 }
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let device = &NdArrayDevice::default();
        let boxes = write_temp("config_boxes", "[[0, 0, 10, 10]]");

        let cmd = Commands::Apply(SubCommandApply {
            boxes: boxes.clone(),
            deltas: boxes,
            config: Some("/nonexistent/config.json".into()),
        });

        assert!(matches!(
            run::<B>(&cmd, device).unwrap_err(),
            BoxError::LoadConfig { .. }
        ));
    }

    #[test]
    fn test_empty_box_file() {
        let device = &NdArrayDevice::default();
        let empty = write_temp("empty_boxes", "[]");
        let boxes = write_temp("empty_other", "[[0, 0, 10, 10], [1, 1, 2, 2]]");

        let commands = [
            Commands::Clip(SubCommandClip {
                boxes: empty.clone(),
                window: "0,0,10,10".into(),
                in_place: false,
            }),
            Commands::Clip(SubCommandClip {
                boxes: empty.clone(),
                window: "0,0,10,10".into(),
                in_place: true,
            }),
            Commands::Refine(SubCommandRefine {
                boxes: empty.clone(),
                gt: empty.clone(),
                config: None,
            }),
            Commands::Apply(SubCommandApply {
                boxes: empty.clone(),
                deltas: empty.clone(),
                config: None,
            }),
        ];
        for cmd in &commands {
            assert_eq!(run::<B>(cmd, device).unwrap(), "[]");
        }

        // rows of the first file are kept, each with no columns
        let cmd = Commands::Overlaps(SubCommandOverlaps {
            a: boxes,
            b: empty,
            looped: false,
        });
        assert_eq!(run::<B>(&cmd, device).unwrap(), "[[],[]]");
    }

    #[test]
    fn test_clip_rejects_bad_window() {
        let device = &NdArrayDevice::default();
        let boxes = write_temp("bad_window_boxes", "[[0, 0, 10, 10]]");

        let cmd = Commands::Clip(SubCommandClip {
            boxes,
            window: "0,abc,10,10,20".into(),
            in_place: false,
        });

        assert!(matches!(
            run::<B>(&cmd, device).unwrap_err(),
            BoxError::ParseWindow { .. }
        ));
    }

    #[test]
    fn test_clip_command_variants_agree() {
        let device = &NdArrayDevice::default();
        let boxes = write_temp("clip_boxes", "[[-5, -5, 20, 20], [2, 3, 4, 5]]");

        let outputs = [false, true].map(|in_place| {
            let cmd = Commands::Clip(SubCommandClip {
                boxes: boxes.clone(),
                window: "0,0,10,10".into(),
                in_place,
            });
            parse_output(&run::<B>(&cmd, device).unwrap())
        });

        assert_eq!(outputs[0], vec![vec![0.0, 0.0, 10.0, 10.0], vec![2.0, 3.0, 4.0, 5.0]]);
        assert_eq!(outputs[0], outputs[1]);
    }
}
