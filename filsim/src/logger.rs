// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use log::LevelFilter;

pub(crate) fn setup_logger() {
    let mut logger_builder = pretty_env_logger::formatted_timed_builder();

    // Info for the simulator, quiet for everything else; RUST_LOG overrides.
    logger_builder.filter(None, LevelFilter::Warn);
    logger_builder.filter(Some("filsim"), LevelFilter::Info);
    logger_builder.filter(Some("engine"), LevelFilter::Info);
    logger_builder.filter(Some("chain"), LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger_builder.parse_filters(&filters);
    }

    logger_builder.init();
}
