#[cfg(feature = "cli")]
pub mod cli;
pub mod session_script;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use session_script::SessionScript;
pub use toml_config::WizardConfig;
