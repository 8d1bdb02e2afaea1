use burn::backend::{NdArray, ndarray::NdArrayDevice};
use rcnn_boxes::{
    commands,
    config::{BoxCmd, DEFAULT_LOG_FILTER},
    debug::set_print_precision,
};
use tracing_subscriber::EnvFilter;

fn main() {
    type Backend = NdArray<f32>;
    let device = NdArrayDevice::default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli_cmd: BoxCmd = argh::from_env();

    if let Some(precision) = cli_cmd.precision {
        set_print_precision(precision);
    }

    match commands::run::<Backend>(&cli_cmd.commands, &device) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
}
