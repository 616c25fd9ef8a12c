use std::path::{Path, PathBuf};
use std::process::ExitCode;

use astrobloom::app::DEFAULT_OPTIONS_PATH;
use astrobloom::{Options, Viewer};

/// Load options from `path`, falling back to defaults when the file does
/// not exist yet. Saves go back to the same path either way.
fn load_options(path: &Path) -> Result<Options, astrobloom::AppError> {
    if path.exists() {
        let options = Options::load(path)?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    } else {
        log::info!("{} not found, using default options", path.display());
        Ok(Options::default())
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let options_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_OPTIONS_PATH), PathBuf::from);

    let options = match load_options(&options_path) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let result = Viewer::builder()
        .with_options(options)
        .with_options_path(options_path)
        .build()
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
