use {argh::FromArgs, std::fmt::Debug};

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(FromArgs, PartialEq, Debug)]
/// Box geometry helpers: overlaps, refinement deltas and clipping.
pub struct BoxCmd {
    #[argh(option)]
    /// decimals shown when tensors are logged at debug level
    pub precision: Option<usize>,
    #[argh(subcommand)]
    pub commands: Commands,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub enum Commands {
    Overlaps(SubCommandOverlaps),
    Refine(SubCommandRefine),
    Apply(SubCommandApply),
    Clip(SubCommandClip),
}

#[derive(FromArgs, PartialEq, Debug)]
/// IoU matrix between two box files, rows follow the first file
#[argh(subcommand, name = "overlaps")]
pub struct SubCommandOverlaps {
    #[argh(option)]
    /// first box file (JSON array of [y1, x1, y2, x2])
    pub a: String,
    #[argh(option)]
    /// second box file
    pub b: String,
    #[argh(switch)]
    /// compute column by column instead of tiling
    pub looped: bool,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Refinement deltas (dy, dx, dh, dw) turning each box into its matched ground truth box
#[argh(subcommand, name = "refine")]
pub struct SubCommandRefine {
    #[argh(option)]
    /// box file
    pub boxes: String,
    #[argh(option)]
    /// ground truth box file, one row per box
    pub gt: String,
    #[argh(option)]
    /// refinement config (JSON), raw deltas when omitted
    pub config: Option<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Apply (dy, dx, dh, dw) deltas to boxes
#[argh(subcommand, name = "apply")]
pub struct SubCommandApply {
    #[argh(option)]
    /// box file
    pub boxes: String,
    #[argh(option)]
    /// delta file, one row per box
    pub deltas: String,
    #[argh(option)]
    /// refinement config (JSON), raw deltas when omitted
    pub config: Option<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Clamp boxes to a window
#[argh(subcommand, name = "clip")]
pub struct SubCommandClip {
    #[argh(option)]
    /// box file
    pub boxes: String,
    #[argh(option)]
    /// clipping window as y1,x1,y2,x2
    pub window: String,
    #[argh(switch)]
    /// clip into the loaded tensor instead of a copy
    pub in_place: bool,
}
