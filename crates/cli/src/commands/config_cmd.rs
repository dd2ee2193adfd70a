//! `switchyard config`: prints the default configuration.

use switchyard_config::AppConfig;

pub fn show() {
    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!();
    print!("{}", AppConfig::default_toml());
}
