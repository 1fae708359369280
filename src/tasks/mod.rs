pub mod status_updater;
