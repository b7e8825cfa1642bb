pub mod config;
pub mod data;
pub mod error;
pub mod import;
pub mod report;

use colored::Colorize;

pub use error::{CoreError, Result};

pub fn print_banner() {
    let banner = r#"
  _ _       _
 | (_)_ __ | | ____      _____  __ ___   _____
 | | | '_ \| |/ /\ \ /\ / / _ \/ _` \ \ / / _ \
 | | | | | |   <  \ V  V /  __/ (_| |\ V /  __/
 |_|_|_| |_|_|\_\  \_/\_/ \___|\__,_| \_/ \___|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "internal link graph analysis".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
