// SPDX-License-Identifier: GPL-3.0-or-later

use ccparse::{args, config, modes};
use std::env;
use std::process::ExitCode;

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Initialize the logging system.
    env_logger::init();
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");

    // Parse the command line arguments.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;
    log::info!("{arguments}");
    // Load the configuration.
    let current_directory = env::current_dir()?;
    let configuration = config::Loader::load(&current_directory, arguments.config.as_deref().map(std::path::Path::new))?;
    log::info!("{configuration}");

    // Run the application.
    let application = modes::Application::configure(arguments, configuration)?;
    log::debug!("Configuration complete, scanning the build log now...");
    let result = application.run();
    log::debug!("Exit code: {result:?}");

    Ok(result)
}
